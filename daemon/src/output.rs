//! JSON rendering of command outcomes and events for the CLI.

use serde_json::{json, Map, Value};
use strato_pot::PotEvent;
use strato_register::{CommandResponse, RegisterEvent};

use crate::runner::ApplyOutcome;

fn attributes(pairs: Vec<(&'static str, String)>) -> Value {
    let map: Map<String, Value> = pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v)))
        .collect();
    Value::Object(map)
}

pub fn event(event: &RegisterEvent) -> Value {
    json!({ "type": event.event_type(), "attributes": attributes(event.attributes()) })
}

pub fn pot_event(event: &PotEvent) -> Value {
    json!({ "type": event.event_type(), "attributes": attributes(event.attributes()) })
}

fn response(response: &CommandResponse) -> Value {
    match response {
        CommandResponse::Created { network_address } => {
            json!({ "created": network_address.to_string() })
        }
        CommandResponse::Removed { completion_time } => {
            json!({ "completion_time": completion_time.as_secs() })
        }
        CommandResponse::Updated => json!({ "updated": true }),
        CommandResponse::Voted { candidate_status } => {
            json!({ "candidate_status": candidate_status.to_string() })
        }
    }
}

pub fn outcome(outcome: &ApplyOutcome) -> Value {
    match &outcome.result {
        Ok(result) => json!({
            "index": outcome.index,
            "command": outcome.command,
            "ok": true,
            "response": response(&result.response),
            "events": result.events.iter().map(event).collect::<Vec<_>>(),
        }),
        Err(e) => json!({
            "index": outcome.index,
            "command": outcome.command,
            "ok": false,
            "code": e.code(),
            "error": e.to_string(),
        }),
    }
}
