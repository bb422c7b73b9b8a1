//! Configuration management for Lambda functions.

use std::env;

use crate::{Error, Result};

const DEFAULT_REGION: &str = "us-east-1";

/// Application configuration, loaded once at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DynamoDB table holding room inventory keyed by date
    pub table_name: String,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Build a configuration for the given table in the default region.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            aws_region: DEFAULT_REGION.to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let table_name = lookup("TABLE_NAME")
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| Error::Config("TABLE_NAME not set".to_string()))?;

        Ok(Self {
            table_name,
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
        })
    }
}
