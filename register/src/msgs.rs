//! Registry commands and their structural validation.
//!
//! On the wire a command is a JSON object whose `type` field names the
//! command (`register/MsgCreateResourceNode`, ...) and whose remaining fields
//! are the command body. Fields a client omits decode to empty values so
//! that [`Command::validate_basic`] can report the precise problem.

use serde::{Deserialize, Deserializer, Serialize};
use strato_types::{Address, Coin, Description, NodeType, PubKey};

use crate::error::RegisterError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResourceNode {
    #[serde(default)]
    pub network_id: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub pub_key: Option<PubKey>,
    pub value: Coin,
    #[serde(default)]
    pub owner_address: Address,
    #[serde(default)]
    pub description: Description,
    #[serde(default)]
    pub node_type: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveResourceNode {
    #[serde(default)]
    pub resource_node_address: Address,
    #[serde(default)]
    pub owner_address: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResourceNode {
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub description: Description,
    #[serde(default)]
    pub node_type: u8,
    #[serde(default)]
    pub network_address: Address,
    #[serde(default)]
    pub owner_address: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexingNode {
    #[serde(default)]
    pub network_id: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub pub_key: Option<PubKey>,
    pub value: Coin,
    #[serde(default)]
    pub owner_address: Address,
    #[serde(default)]
    pub description: Description,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveIndexingNode {
    #[serde(default)]
    pub indexing_node_address: Address,
    #[serde(default)]
    pub owner_address: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateIndexingNode {
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub description: Description,
    #[serde(default)]
    pub network_address: Address,
    #[serde(default)]
    pub owner_address: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingNodeRegistrationVote {
    #[serde(default)]
    pub candidate_network_address: Address,
    #[serde(default)]
    pub candidate_owner_address: Address,
    /// `true` approves the candidate, `false` rejects it.
    pub opinion: bool,
    #[serde(default)]
    pub voter_network_address: Address,
    #[serde(default)]
    pub voter_owner_address: Address,
}

/// Every command the registry accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    #[serde(rename = "register/MsgCreateResourceNode")]
    CreateResourceNode(CreateResourceNode),
    #[serde(rename = "register/MsgRemoveResourceNode")]
    RemoveResourceNode(RemoveResourceNode),
    #[serde(rename = "register/MsgUpdateResourceNode")]
    UpdateResourceNode(UpdateResourceNode),
    #[serde(rename = "register/MsgCreateIndexingNode")]
    CreateIndexingNode(CreateIndexingNode),
    #[serde(rename = "register/MsgRemoveIndexingNode")]
    RemoveIndexingNode(RemoveIndexingNode),
    #[serde(rename = "register/MsgUpdateIndexingNode")]
    UpdateIndexingNode(UpdateIndexingNode),
    #[serde(rename = "register/MsgIndexingNodeRegistrationVote")]
    IndexingNodeRegistrationVote(IndexingNodeRegistrationVote),
}

impl Command {
    /// The wire type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CreateResourceNode(_) => "register/MsgCreateResourceNode",
            Self::RemoveResourceNode(_) => "register/MsgRemoveResourceNode",
            Self::UpdateResourceNode(_) => "register/MsgUpdateResourceNode",
            Self::CreateIndexingNode(_) => "register/MsgCreateIndexingNode",
            Self::RemoveIndexingNode(_) => "register/MsgRemoveIndexingNode",
            Self::UpdateIndexingNode(_) => "register/MsgUpdateIndexingNode",
            Self::IndexingNodeRegistrationVote(_) => "register/MsgIndexingNodeRegistrationVote",
        }
    }

    /// The account that must authorize the command.
    pub fn signer(&self) -> &Address {
        match self {
            Self::CreateResourceNode(m) => &m.owner_address,
            Self::RemoveResourceNode(m) => &m.owner_address,
            Self::UpdateResourceNode(m) => &m.owner_address,
            Self::CreateIndexingNode(m) => &m.owner_address,
            Self::RemoveIndexingNode(m) => &m.owner_address,
            Self::UpdateIndexingNode(m) => &m.owner_address,
            Self::IndexingNodeRegistrationVote(m) => &m.voter_owner_address,
        }
    }

    /// Stateless checks. Runs before any store access.
    pub fn validate_basic(&self) -> Result<(), RegisterError> {
        match self {
            Self::CreateResourceNode(m) => {
                require_network_id(&m.network_id)?;
                require_pub_key(&m.pub_key)?;
                require_positive(&m.value)?;
                require(&m.owner_address, RegisterError::EmptyOwnerAddr)?;
                require_moniker(&m.description)?;
                node_type(m.node_type)?;
            }
            Self::RemoveResourceNode(m) => {
                require(&m.resource_node_address, RegisterError::EmptyResourceNodeAddr)?;
                require(&m.owner_address, RegisterError::EmptyOwnerAddr)?;
            }
            Self::UpdateResourceNode(m) => {
                require_network_id(&m.network_id)?;
                require(&m.network_address, RegisterError::EmptyNetworkAddr)?;
                require(&m.owner_address, RegisterError::EmptyOwnerAddr)?;
                require_moniker(&m.description)?;
                node_type(m.node_type)?;
            }
            Self::CreateIndexingNode(m) => {
                require_network_id(&m.network_id)?;
                require_pub_key(&m.pub_key)?;
                require_positive(&m.value)?;
                require(&m.owner_address, RegisterError::EmptyOwnerAddr)?;
                require_moniker(&m.description)?;
            }
            Self::RemoveIndexingNode(m) => {
                require(&m.indexing_node_address, RegisterError::EmptyIndexingNodeAddr)?;
                require(&m.owner_address, RegisterError::EmptyOwnerAddr)?;
            }
            Self::UpdateIndexingNode(m) => {
                require_network_id(&m.network_id)?;
                require(&m.network_address, RegisterError::EmptyNetworkAddr)?;
                require(&m.owner_address, RegisterError::EmptyOwnerAddr)?;
                require_moniker(&m.description)?;
            }
            Self::IndexingNodeRegistrationVote(m) => {
                require(
                    &m.candidate_network_address,
                    RegisterError::EmptyCandidateNetworkAddr,
                )?;
                require(
                    &m.candidate_owner_address,
                    RegisterError::EmptyCandidateOwnerAddr,
                )?;
                require(&m.voter_network_address, RegisterError::EmptyVoterNetworkAddr)?;
                require(&m.voter_owner_address, RegisterError::EmptyVoterOwnerAddr)?;
                if m.candidate_network_address == m.voter_network_address {
                    return Err(RegisterError::SameAddr(m.candidate_network_address.clone()));
                }
            }
        }
        Ok(())
    }
}

/// Parse a wire node type, rejecting values outside 1..=7.
pub fn node_type(raw: u8) -> Result<NodeType, RegisterError> {
    NodeType::try_from(raw).map_err(|_| RegisterError::InvalidNodeType(raw))
}

/// An absent or blank `pub_key` decodes to `None` so that validation, not
/// decoding, reports it.
fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PubKey>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn require(addr: &Address, err: RegisterError) -> Result<(), RegisterError> {
    if addr.is_empty() {
        return Err(err);
    }
    Ok(())
}

fn require_network_id(network_id: &str) -> Result<(), RegisterError> {
    if network_id.trim().is_empty() {
        return Err(RegisterError::EmptyNodeId);
    }
    Ok(())
}

fn require_pub_key(pub_key: &Option<PubKey>) -> Result<(), RegisterError> {
    match pub_key {
        Some(k) if !k.as_bytes().is_empty() => Ok(()),
        _ => Err(RegisterError::EmptyPubKey),
    }
}

fn require_positive(value: &Coin) -> Result<(), RegisterError> {
    if !value.is_positive() {
        return Err(RegisterError::ValueNotPositive);
    }
    Ok(())
}

fn require_moniker(description: &Description) -> Result<(), RegisterError> {
    if !description.has_moniker() {
        return Err(RegisterError::EmptyMoniker);
    }
    Ok(())
}
