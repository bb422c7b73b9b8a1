//! Shared library for the Hotel Room Availability Lambda functions.
//!
//! This crate provides the configuration, error types, action group models, and
//! the availability store used by the Lambda binaries.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::Config;
pub use db::{AvailabilityStore, DynamoAvailabilityStore};
pub use error::{Error, Result};
pub use models::{
    ActionGroupEvent, ActionGroupResponse, ActionResponse, AvailabilityRecord, ContentBody,
    Parameter, ResponseBody,
};
