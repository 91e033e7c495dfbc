pub mod analysis;
pub mod date;
pub mod policy;
pub mod progress;
pub mod query;
pub mod types;
