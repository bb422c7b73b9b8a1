//! Availability store backed by DynamoDB.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::{AvailabilityRecord, Config, Error, Result};

/// Partition key attribute of the availability table.
pub const DATE_KEY: &str = "date";

/// Point lookups of room inventory by date.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Fetch the record stored under `date`, or `None` when there is none.
    async fn get_availability(&self, date: &str) -> Result<Option<AvailabilityRecord>>;
}

/// [`AvailabilityStore`] reading a DynamoDB table keyed by `date`.
pub struct DynamoAvailabilityStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoAvailabilityStore {
    /// Create a store over an existing client.
    pub fn new(client: DynamoClient, config: &Config) -> Self {
        Self {
            client,
            table_name: config.table_name.clone(),
        }
    }

    /// Load AWS credentials for the configured region and build a client.
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;

        Self::new(DynamoClient::new(&sdk_config), config)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl AvailabilityStore for DynamoAvailabilityStore {
    async fn get_availability(&self, date: &str) -> Result<Option<AvailabilityRecord>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(DATE_KEY, AttributeValue::S(date.to_string()))
            .send()
            .await
            .map_err(|e| {
                Error::StoreUnavailable(format!(
                    "GetItem on {} failed: {}",
                    self.table_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        let Some(item) = output.item else {
            debug!(table = %self.table_name, date, "No item for date");
            return Ok(None);
        };

        AvailabilityRecord::from_item(item_to_json(item)).map(Some)
    }
}

/// Convert a DynamoDB item into a plain JSON object.
pub fn item_to_json(item: HashMap<String, AttributeValue>) -> Map<String, Value> {
    item.into_iter()
        .map(|(name, value)| (name, attribute_to_json(value)))
        .collect()
}

/// Convert one DynamoDB attribute value into JSON.
///
/// Numbers keep the exact decimal text DynamoDB returned, so values beyond
/// 64-bit or f64 precision are not rounded. Binary values are base64 encoded.
pub fn attribute_to_json(value: AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(list) => Value::Array(list.into_iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(item_to_json(map)),
        AttributeValue::Ss(set) => Value::Array(set.into_iter().map(Value::String).collect()),
        AttributeValue::Ns(set) => Value::Array(set.into_iter().map(number_to_json).collect()),
        AttributeValue::B(blob) => Value::String(BASE64.encode(blob.as_ref())),
        AttributeValue::Bs(set) => Value::Array(
            set.into_iter()
                .map(|blob| Value::String(BASE64.encode(blob.as_ref())))
                .collect(),
        ),
        other => {
            warn!(attribute = ?other, "Unsupported attribute type, returning null");
            Value::Null
        }
    }
}

fn number_to_json(n: String) -> Value {
    match serde_json::from_str::<Number>(&n) {
        Ok(number) => Value::Number(number),
        Err(_) => {
            warn!(number = %n, "Number is not valid JSON, returning it as a string");
            Value::String(n)
        }
    }
}
