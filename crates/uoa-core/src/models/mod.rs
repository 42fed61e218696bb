//! Data models for the application
//!
//! Directory records, resolved people and the serialisable views used for JSON output.

mod attributes;
mod person;
mod unit;

pub use attributes::*;
pub use person::*;
pub use unit::*;
