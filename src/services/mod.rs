pub mod backend;
pub mod dates;
pub mod reconciler;
pub mod report;
pub mod trips;
