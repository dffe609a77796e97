// Domain layer - Web vitals models and pure transformations
pub mod crux;
pub mod distribution;
pub mod insights;
pub mod metric;
pub mod submission;
