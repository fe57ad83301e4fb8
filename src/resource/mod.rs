//! Managed resource types offered by the provider

pub mod person;

pub use person::PersonResource;
