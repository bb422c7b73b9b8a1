//! Action group invocation models and the availability record.
//!
//! The agent runtime invokes the Lambda with an [`ActionGroupEvent`] and
//! expects an [`ActionGroupResponse`] echoing the routing fields back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::DATE_KEY;
use crate::{Error, Result};

/// Version literal the agent runtime expects on every response.
pub const MESSAGE_VERSION: &str = "1.0";

/// Action group invocation event sent by the agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_version: Option<String>,
    /// Agent identity (name, id, alias, version); passed through untouched
    pub agent: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    pub session_attributes: Map<String, Value>,
    pub prompt_session_attributes: Map<String, Value>,
}

/// A single name/type/value parameter of the invoked API operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ActionGroupEvent {
    /// The requested date, taken from the first parameter.
    pub fn date_parameter(&self) -> Result<&str> {
        let first = self
            .parameters
            .first()
            .ok_or_else(|| Error::MissingParameter("parameters list is empty".to_string()))?;

        match first.value.as_deref() {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::MissingParameter(format!(
                "first parameter {} has no value",
                first.name.as_deref().unwrap_or("<unnamed>")
            ))),
        }
    }
}

/// Room inventory for one date, as stored in the availability table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityRecord {
    pub date: String,
    /// Every other attribute of the stored item
    #[serde(flatten)]
    pub inventory: Map<String, Value>,
}

impl AvailabilityRecord {
    /// Split a stored item into its `date` key and the remaining attributes.
    ///
    /// Values are moved as-is so numbers keep their exact decimal text.
    pub fn from_item(mut item: Map<String, Value>) -> Result<Self> {
        match item.remove(DATE_KEY) {
            Some(Value::String(date)) => Ok(Self {
                date,
                inventory: item,
            }),
            Some(other) => Err(Error::InvalidRecord(format!(
                "{DATE_KEY} attribute is not a string: {other}"
            ))),
            None => Err(Error::InvalidRecord(format!("item has no {DATE_KEY} attribute"))),
        }
    }
}

/// Response envelope returned to the agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupResponse {
    pub message_version: String,
    pub response: ActionResponse,
    pub session_attributes: Map<String, Value>,
    pub prompt_session_attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    pub http_status_code: u16,
    pub response_body: ResponseBody,
}

/// Response payloads keyed by content type. Only JSON is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "application/json")]
    pub json: ContentBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBody {
    /// JSON document encoded as a string
    pub body: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    status: u16,
}

impl ActionGroupResponse {
    /// Build an envelope for `event` carrying an already-encoded JSON body.
    pub fn with_body(event: &ActionGroupEvent, http_status_code: u16, body: String) -> Self {
        Self {
            message_version: MESSAGE_VERSION.to_string(),
            response: ActionResponse {
                action_group: event.action_group.clone(),
                api_path: event.api_path.clone(),
                http_method: event.http_method.clone(),
                http_status_code,
                response_body: ResponseBody {
                    json: ContentBody { body },
                },
            },
            session_attributes: event.session_attributes.clone(),
            prompt_session_attributes: event.prompt_session_attributes.clone(),
        }
    }

    /// 200 response carrying `data` serialized as JSON.
    pub fn success<T: Serialize>(event: &ActionGroupEvent, data: &T) -> Result<Self> {
        Ok(Self::with_body(event, 200, serde_json::to_string(data)?))
    }

    /// Error response whose status code and message come from `error`.
    pub fn error(event: &ActionGroupEvent, error: &Error) -> Result<Self> {
        let status = error.status_code();
        let message = error.to_string();
        let body = serde_json::to_string(&ErrorBody {
            error: &message,
            status,
        })?;
        Ok(Self::with_body(event, status, body))
    }

    pub fn status_code(&self) -> u16 {
        self.response.http_status_code
    }

    /// The JSON text carried in the response body.
    pub fn body(&self) -> &str {
        &self.response.response_body.json.body
    }
}
