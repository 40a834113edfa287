//! JSON wire codec for [`Command`].

use serde_json::Value;

use crate::error::RegisterError;
use crate::msgs::Command;

/// Every command type name the registry routes.
pub const COMMAND_TYPES: &[&str] = &[
    "register/MsgCreateResourceNode",
    "register/MsgRemoveResourceNode",
    "register/MsgUpdateResourceNode",
    "register/MsgCreateIndexingNode",
    "register/MsgRemoveIndexingNode",
    "register/MsgUpdateIndexingNode",
    "register/MsgIndexingNodeRegistrationVote",
];

pub fn is_known_type(name: &str) -> bool {
    COMMAND_TYPES.contains(&name)
}

/// Decode one command.
///
/// A missing or unknown `type` is [`RegisterError::UnrecognizedCommand`];
/// a known type with a malformed body is [`RegisterError::Decode`].
pub fn decode_command(bytes: &[u8]) -> Result<Command, RegisterError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| RegisterError::Decode(e.to_string()))?;
    command_from_value(value)
}

/// Like [`decode_command`], for an already parsed JSON value.
pub fn command_from_value(value: Value) -> Result<Command, RegisterError> {
    let type_name = match value.get("type") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => return Err(RegisterError::UnrecognizedCommand(other.to_string())),
        None => return Err(RegisterError::UnrecognizedCommand(String::new())),
    };
    if !is_known_type(&type_name) {
        tracing::debug!(type_name = %type_name, "unrecognized command type");
        return Err(RegisterError::UnrecognizedCommand(type_name));
    }
    serde_json::from_value(value).map_err(|e| RegisterError::Decode(format!("{type_name}: {e}")))
}

pub fn encode_command(cmd: &Command) -> Result<Vec<u8>, RegisterError> {
    serde_json::to_vec(cmd).map_err(|e| RegisterError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msgs::RemoveResourceNode;
    use strato_types::Address;

    #[test]
    fn table_matches_command_names() {
        let cmd = Command::RemoveResourceNode(RemoveResourceNode {
            resource_node_address: Address::new([1; 20]),
            owner_address: Address::new([2; 20]),
        });
        assert!(is_known_type(cmd.type_name()));
        assert_eq!(COMMAND_TYPES.len(), 7);
    }

    #[test]
    fn encoded_command_decodes() {
        let cmd = Command::RemoveResourceNode(RemoveResourceNode {
            resource_node_address: Address::new([1; 20]),
            owner_address: Address::new([2; 20]),
        });
        let bytes = encode_command(&cmd).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"type\":\"register/MsgRemoveResourceNode\""));
        assert_eq!(decode_command(&bytes).unwrap(), cmd);
    }

    #[test]
    fn unknown_type_is_unrecognized() {
        let err = decode_command(br#"{"type":"register/MsgFrobnicate"}"#).unwrap_err();
        assert!(matches!(err, RegisterError::UnrecognizedCommand(ref t) if t == "register/MsgFrobnicate"));

        let err = decode_command(br#"{"owner_address":""}"#).unwrap_err();
        assert!(matches!(err, RegisterError::UnrecognizedCommand(_)));
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let err = decode_command(br#"{"type":"register/MsgIndexingNodeRegistrationVote","opinion":"yes"}"#)
            .unwrap_err();
        assert!(matches!(err, RegisterError::Decode(_)));

        assert!(matches!(
            decode_command(b"not json"),
            Err(RegisterError::Decode(_))
        ));
    }

    #[test]
    fn omitted_addresses_decode_empty() {
        let cmd = decode_command(br#"{"type":"register/MsgRemoveIndexingNode"}"#).unwrap();
        match cmd {
            Command::RemoveIndexingNode(m) => assert!(m.indexing_node_address.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }
}
