//! Command routing.
//!
//! Each command is validated structurally, then checked against the store,
//! then applied. Events are only produced for commands that succeed.

use strato_bank::BalanceMover;
use strato_store::KvStore;
use strato_types::{Address, NodeKind, NodeStatus, Timestamp};

use crate::context::Context;
use crate::error::RegisterError;
use crate::events::RegisterEvent;
use crate::keeper::Keeper;
use crate::msgs::{self, Command};

/// Command-specific outcome returned to the submitter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandResponse {
    Created { network_address: Address },
    Removed { completion_time: Timestamp },
    Updated,
    Voted { candidate_status: NodeStatus },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandResult {
    pub response: CommandResponse,
    pub events: Vec<RegisterEvent>,
}

impl CommandResult {
    fn new(response: CommandResponse, events: Vec<RegisterEvent>) -> Self {
        Self { response, events }
    }
}

/// Apply one command to the keeper's store.
///
/// Writes go straight to the keeper's store; callers that need
/// all-or-nothing semantics run this on a cache branch.
pub fn handle_command<S: KvStore, B: BalanceMover>(
    keeper: &Keeper<S, B>,
    ctx: &Context,
    cmd: &Command,
) -> Result<CommandResult, RegisterError> {
    cmd.validate_basic()?;

    match cmd {
        Command::CreateResourceNode(m) => {
            let pub_key = m.pub_key.as_ref().ok_or(RegisterError::EmptyPubKey)?;
            let node = keeper.register_resource_node(
                ctx,
                &m.network_id,
                pub_key,
                &m.owner_address,
                &m.description,
                msgs::node_type(m.node_type)?,
                &m.value,
            )?;
            let event = RegisterEvent::CreateResourceNode {
                sender: m.owner_address.clone(),
                network_address: node.network_address.clone(),
                pub_key: hex::encode(pub_key.as_bytes()),
            };
            Ok(CommandResult::new(
                CommandResponse::Created {
                    network_address: node.network_address,
                },
                vec![event],
            ))
        }

        Command::CreateIndexingNode(m) => {
            let pub_key = m.pub_key.as_ref().ok_or(RegisterError::EmptyPubKey)?;
            let node = keeper.register_indexing_node(
                ctx,
                &m.network_id,
                pub_key,
                &m.owner_address,
                &m.description,
                &m.value,
            )?;
            let event = RegisterEvent::CreateIndexingNode {
                sender: m.owner_address.clone(),
                network_address: node.network_address.clone(),
            };
            Ok(CommandResult::new(
                CommandResponse::Created {
                    network_address: node.network_address,
                },
                vec![event],
            ))
        }

        Command::RemoveResourceNode(m) => {
            let completion_time = remove(
                keeper,
                ctx,
                NodeKind::Resource,
                &m.resource_node_address,
                &m.owner_address,
            )?;
            Ok(CommandResult::new(
                CommandResponse::Removed { completion_time },
                vec![RegisterEvent::RemoveResourceNode {
                    sender: m.owner_address.clone(),
                    resource_node: m.resource_node_address.clone(),
                    completion_time,
                }],
            ))
        }

        Command::RemoveIndexingNode(m) => {
            let completion_time = remove(
                keeper,
                ctx,
                NodeKind::Indexing,
                &m.indexing_node_address,
                &m.owner_address,
            )?;
            Ok(CommandResult::new(
                CommandResponse::Removed { completion_time },
                vec![RegisterEvent::RemoveIndexingNode {
                    sender: m.owner_address.clone(),
                    indexing_node: m.indexing_node_address.clone(),
                    completion_time,
                }],
            ))
        }

        Command::UpdateResourceNode(m) => {
            keeper.update_resource_node(
                &m.network_id,
                &m.description,
                msgs::node_type(m.node_type)?,
                &m.network_address,
                &m.owner_address,
            )?;
            Ok(CommandResult::new(
                CommandResponse::Updated,
                vec![RegisterEvent::UpdateResourceNode {
                    sender: m.owner_address.clone(),
                    network_address: m.network_address.clone(),
                }],
            ))
        }

        Command::UpdateIndexingNode(m) => {
            keeper.update_indexing_node(
                &m.network_id,
                &m.description,
                &m.network_address,
                &m.owner_address,
            )?;
            Ok(CommandResult::new(
                CommandResponse::Updated,
                vec![RegisterEvent::UpdateIndexingNode {
                    sender: m.owner_address.clone(),
                    network_address: m.network_address.clone(),
                }],
            ))
        }

        Command::IndexingNodeRegistrationVote(m) => {
            let outcome = keeper.handle_registration_vote(
                ctx,
                &m.candidate_network_address,
                &m.candidate_owner_address,
                m.opinion,
                &m.voter_network_address,
                &m.voter_owner_address,
            )?;

            let mut events = vec![RegisterEvent::IndexingNodeRegistrationVote {
                voter: m.voter_network_address.clone(),
                candidate: m.candidate_network_address.clone(),
                candidate_status: outcome.status,
            }];
            match outcome.status {
                NodeStatus::Bonded => events.push(RegisterEvent::IndexingNodeAdmitted {
                    network_address: m.candidate_network_address.clone(),
                    tokens: outcome.tokens,
                }),
                NodeStatus::Removed => events.push(RegisterEvent::IndexingNodeRejected {
                    network_address: m.candidate_network_address.clone(),
                    refunded: outcome.tokens,
                }),
                _ => {}
            }
            Ok(CommandResult::new(
                CommandResponse::Voted {
                    candidate_status: outcome.status,
                },
                events,
            ))
        }
    }
}

/// Owner-checked removal of the node's entire stake.
fn remove<S: KvStore, B: BalanceMover>(
    keeper: &Keeper<S, B>,
    ctx: &Context,
    kind: NodeKind,
    address: &Address,
    owner: &Address,
) -> Result<Timestamp, RegisterError> {
    let node = keeper.require_owned_live_node(kind, address, owner)?;
    keeper.do_remove_node(ctx, kind, address, node.tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msgs::{CreateResourceNode, RemoveResourceNode, UpdateResourceNode};
    use strato_bank::{AccountId, StoreBank};
    use strato_crypto::address_from_pubkey;
    use strato_nullables::NullStore;
    use strato_types::{Coin, Description, KeyAlgorithm, PubKey};

    fn owner() -> Address {
        Address::new([0xAA; 20])
    }

    fn pub_key(seed: u8) -> PubKey {
        let mut bytes = vec![0x02];
        bytes.extend_from_slice(&[seed; 32]);
        PubKey::new(KeyAlgorithm::Secp256k1, bytes).unwrap()
    }

    fn setup() -> Keeper<NullStore, StoreBank<NullStore>> {
        let bank = StoreBank::new(NullStore::new());
        bank.mint(&AccountId::Owner(owner()), &Coin::new("ustos", 1_000))
            .unwrap();
        Keeper::new(NullStore::new(), bank)
    }

    fn create(seed: u8) -> Command {
        Command::CreateResourceNode(CreateResourceNode {
            network_id: format!("sds://r{seed}"),
            pub_key: Some(pub_key(seed)),
            value: Coin::new("ustos", 100),
            owner_address: owner(),
            description: Description::new(format!("r{seed}")),
            node_type: 4,
        })
    }

    #[test]
    fn create_reports_derived_address_and_pubkey_hex() {
        let keeper = setup();
        let ctx = Context::new(1, Timestamp::new(10));
        let result = handle_command(&keeper, &ctx, &create(1)).unwrap();

        let expected = address_from_pubkey(&pub_key(1));
        assert_eq!(
            result.response,
            CommandResponse::Created {
                network_address: expected.clone()
            }
        );
        match &result.events[..] {
            [RegisterEvent::CreateResourceNode {
                sender,
                network_address,
                pub_key: hex_key,
            }] => {
                assert_eq!(sender, &owner());
                assert_eq!(network_address, &expected);
                assert_eq!(hex_key, &hex::encode(pub_key(1).as_bytes()));
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn structural_errors_win_over_state() {
        let keeper = setup();
        let ctx = Context::new(1, Timestamp::new(10));
        let cmd = Command::RemoveResourceNode(RemoveResourceNode {
            resource_node_address: Address::empty(),
            owner_address: owner(),
        });
        assert!(matches!(
            handle_command(&keeper, &ctx, &cmd),
            Err(RegisterError::EmptyResourceNodeAddr)
        ));
    }

    #[test]
    fn remove_by_stranger_is_unauthorized() {
        let keeper = setup();
        let ctx = Context::new(1, Timestamp::new(10));
        handle_command(&keeper, &ctx, &create(2)).unwrap();

        let cmd = Command::RemoveResourceNode(RemoveResourceNode {
            resource_node_address: address_from_pubkey(&pub_key(2)),
            owner_address: Address::new([0xBB; 20]),
        });
        assert!(matches!(
            handle_command(&keeper, &ctx, &cmd),
            Err(RegisterError::Unauthorized { .. })
        ));
    }

    #[test]
    fn update_keeps_stake() {
        let keeper = setup();
        let ctx = Context::new(1, Timestamp::new(10));
        handle_command(&keeper, &ctx, &create(3)).unwrap();
        let address = address_from_pubkey(&pub_key(3));

        let cmd = Command::UpdateResourceNode(UpdateResourceNode {
            network_id: "sds://moved".into(),
            description: Description::new("renamed"),
            node_type: 7,
            network_address: address.clone(),
            owner_address: owner(),
        });
        let result = handle_command(&keeper, &ctx, &cmd).unwrap();
        assert_eq!(result.response, CommandResponse::Updated);

        let node = keeper.require_node(NodeKind::Resource, &address).unwrap();
        assert_eq!(node.network_id, "sds://moved");
        assert_eq!(node.moniker(), "renamed");
        assert_eq!(node.tokens, 100);
        assert_eq!(node.status, NodeStatus::Bonded);
    }
}
