//! Read-only lookups offered by the provider

pub mod names;
pub mod person;

pub use names::NamesDataSource;
pub use person::PersonDataSource;
