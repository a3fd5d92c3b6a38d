pub mod categories;
pub mod config;
pub mod convert;
pub mod progress;
