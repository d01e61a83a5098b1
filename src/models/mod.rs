//! Day-planning domain models.
//!
//! Provides the data types shared by every strategy and by the editing
//! operations that run after a strategy.
//!
//! # Domain Mappings
//!
//! | u-dayplan | Field survey | Inspections | Sales |
//! |-----------|--------------|-------------|-------|
//! | Point | Property visit | Site | Customer |
//! | DayLabel | Campaign day | Inspection day | Route day |
//! | Assignment | Visit plan | Inspection plan | Territory plan |

mod assignment;
mod label;
mod point;

pub use assignment::Assignment;
pub use label::DayLabel;
pub use point::{Point, PointSet};
