//! Room Availability Lambda - Answers agent action group lookups of room
//! inventory by date.
//!
//! The agent runtime invokes this Lambda with the requested date as the first
//! API parameter. The Lambda:
//! 1. Reads the date from the first parameter
//! 2. Looks up the inventory record for that date in DynamoDB
//! 3. Returns the record as the JSON body of the action group response
//!
//! A missing date or an unknown date is answered with a 400 or 404 envelope.
//! Store failures fail the invocation.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::{
    ActionGroupEvent, ActionGroupResponse, AvailabilityStore, Config, DynamoAvailabilityStore,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

struct AppState {
    store: Box<dyn AvailabilityStore>,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let store = DynamoAvailabilityStore::from_config(&config).await;

        info!(
            table = %store.table_name(),
            region = %config.aws_region,
            "Availability store initialised"
        );

        Ok(Self {
            store: Box::new(store),
        })
    }
}

/// Look up the record for the event's date and wrap it in a 200 envelope.
async fn lookup_availability(
    store: &dyn AvailabilityStore,
    event: &ActionGroupEvent,
) -> shared::Result<ActionGroupResponse> {
    let date = event.date_parameter()?;

    let record = store
        .get_availability(date)
        .await?
        .ok_or_else(|| shared::Error::RecordNotFound(date.to_string()))?;

    debug!(?record, "Found availability record");

    ActionGroupResponse::success(event, &record)
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<ActionGroupEvent>,
) -> Result<ActionGroupResponse, Error> {
    let LambdaEvent {
        payload: event,
        context,
    } = event;

    info!(
        request_id = %context.request_id,
        action_group = %event.action_group,
        api_path = %event.api_path,
        http_method = %event.http_method,
        parameters = event.parameters.len(),
        "Received action group invocation"
    );

    match lookup_availability(state.store.as_ref(), &event).await {
        Ok(response) => {
            info!(status = response.status_code(), "Availability lookup complete");
            Ok(response)
        }
        Err(e) if e.is_client_visible() => {
            warn!(error = %e, status = e.status_code(), "Availability lookup rejected");
            Ok(ActionGroupResponse::error(&event, &e)?)
        }
        Err(e) => {
            error!(error = %e, "Availability lookup failed");
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lambda_runtime::Context;
    use serde_json::{json, Value};
    use shared::AvailabilityRecord;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store that counts lookups.
    #[derive(Default)]
    struct MemoryStore {
        records: HashMap<String, Value>,
        calls: AtomicUsize,
    }

    impl MemoryStore {
        fn with(records: &[Value]) -> Self {
            Self {
                records: records
                    .iter()
                    .map(|r| (r["date"].as_str().unwrap().to_string(), r.clone()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AvailabilityStore for MemoryStore {
        async fn get_availability(&self, date: &str) -> shared::Result<Option<AvailabilityRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.records
                .get(date)
                .map(|r| AvailabilityRecord::from_item(r.as_object().unwrap().clone()))
                .transpose()
        }
    }

    /// Store whose every read fails as if the table were unreachable.
    struct UnreachableStore;

    #[async_trait]
    impl AvailabilityStore for UnreachableStore {
        async fn get_availability(&self, _date: &str) -> shared::Result<Option<AvailabilityRecord>> {
            Err(shared::Error::StoreUnavailable("connection reset by peer".to_string()))
        }
    }

    fn event_with(parameters: Value) -> ActionGroupEvent {
        serde_json::from_value(json!({
            "messageVersion": "1.0",
            "agent": { "name": "HotelAgent", "id": "AGENT123", "alias": "TSTALIASID", "version": "1" },
            "inputText": "How many rooms are free?",
            "sessionId": "session-1",
            "actionGroup": "room-availability",
            "apiPath": "/availability",
            "httpMethod": "GET",
            "parameters": parameters,
            "sessionAttributes": { "guest": "alice", "loyalty": "gold" },
            "promptSessionAttributes": { "hotel": "harbor-view" }
        }))
        .unwrap()
    }

    fn state_with(store: impl AvailabilityStore + 'static) -> Arc<AppState> {
        Arc::new(AppState {
            store: Box::new(store),
        })
    }

    fn body_json(response: &ActionGroupResponse) -> Value {
        serde_json::from_str(response.body()).unwrap()
    }

    #[tokio::test]
    async fn test_returns_stored_record() {
        let store = MemoryStore::with(&[
            json!({ "date": "2024-07-01", "rooms": 12 }),
            json!({ "date": "2024-07-02", "rooms": 3 }),
        ]);
        let event = event_with(json!([{ "name": "date", "type": "string", "value": "2024-07-01" }]));

        let response = lookup_availability(&store, &event).await.unwrap();

        assert_eq!(response.status_code(), 200);
        assert_eq!(body_json(&response), json!({ "date": "2024-07-01", "rooms": 12 }));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_echoes_routing_and_session_fields() {
        let store = MemoryStore::with(&[json!({ "date": "2024-07-01", "rooms": 12 })]);
        let event = event_with(json!([{ "value": "2024-07-01" }]));

        let response = lookup_availability(&store, &event).await.unwrap();

        assert_eq!(response.message_version, "1.0");
        assert_eq!(response.response.action_group, event.action_group);
        assert_eq!(response.response.api_path, event.api_path);
        assert_eq!(response.response.http_method, event.http_method);
        assert_eq!(response.session_attributes, event.session_attributes);
        assert_eq!(response.prompt_session_attributes, event.prompt_session_attributes);
    }

    #[tokio::test]
    async fn test_empty_parameters_skip_store() {
        let store = MemoryStore::with(&[json!({ "date": "2024-07-01", "rooms": 12 })]);
        let event = event_with(json!([]));

        let err = lookup_availability(&store, &event).await.unwrap_err();

        assert!(matches!(err, shared::Error::MissingParameter(_)));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_date_is_not_found() {
        let store = MemoryStore::with(&[json!({ "date": "2024-07-01", "rooms": 12 })]);
        let event = event_with(json!([{ "value": "2031-01-01" }]));

        let err = lookup_availability(&store, &event).await.unwrap_err();

        assert!(matches!(err, shared::Error::RecordNotFound(ref date) if date == "2031-01-01"));
    }

    #[tokio::test]
    async fn test_store_failure_is_distinct_from_not_found() {
        let event = event_with(json!([{ "value": "2024-07-01" }]));

        let err = lookup_availability(&UnreachableStore, &event).await.unwrap_err();

        assert!(matches!(err, shared::Error::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_handler_answers_not_found_with_404() {
        let state = state_with(MemoryStore::default());
        let event = event_with(json!([{ "value": "2024-07-01" }]));

        let response = handler(state, LambdaEvent::new(event, Context::default()))
            .await
            .unwrap();

        assert_eq!(response.status_code(), 404);
        assert_eq!(response.response.action_group, "room-availability");
        assert!(body_json(&response)["error"]
            .as_str()
            .unwrap()
            .contains("2024-07-01"));
    }

    #[tokio::test]
    async fn test_handler_answers_missing_date_with_400() {
        let state = state_with(MemoryStore::default());
        let event = event_with(json!([{ "name": "date", "type": "string" }]));

        let response = handler(state, LambdaEvent::new(event, Context::default()))
            .await
            .unwrap();

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.message_version, "1.0");
    }

    #[tokio::test]
    async fn test_handler_fails_invocation_when_store_unreachable() {
        let state = state_with(UnreachableStore);
        let event = event_with(json!([{ "value": "2024-07-01" }]));

        let err = handler(state, LambdaEvent::new(event, Context::default()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Store unavailable"));
    }

    #[tokio::test]
    async fn test_handler_success() {
        let state = state_with(MemoryStore::with(&[json!({
            "date": "2024-07-01",
            "rooms": 12,
            "roomTypes": { "king": 4, "queen": 8 }
        })]));
        let event = event_with(json!([{ "value": "2024-07-01" }]));

        let response = handler(state, LambdaEvent::new(event, Context::default()))
            .await
            .unwrap();

        assert_eq!(response.status_code(), 200);
        assert_eq!(body_json(&response)["roomTypes"]["queen"], 8);
    }
}
