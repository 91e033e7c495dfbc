pub mod budget;
pub mod category;
pub(crate) mod common;
pub mod insights;
pub mod progress;
pub mod transaction;
