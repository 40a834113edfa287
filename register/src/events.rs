//! Events emitted by commands and end-of-block sweeps.

use strato_types::{Address, NodeKind, NodeStatus, Timestamp};

/// Registry events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterEvent {
    CreateResourceNode {
        sender: Address,
        network_address: Address,
        /// Hex of the raw public key bytes.
        pub_key: String,
    },
    CreateIndexingNode {
        sender: Address,
        network_address: Address,
    },
    RemoveResourceNode {
        sender: Address,
        resource_node: Address,
        completion_time: Timestamp,
    },
    RemoveIndexingNode {
        sender: Address,
        indexing_node: Address,
        completion_time: Timestamp,
    },
    UpdateResourceNode {
        sender: Address,
        network_address: Address,
    },
    UpdateIndexingNode {
        sender: Address,
        network_address: Address,
    },
    IndexingNodeRegistrationVote {
        voter: Address,
        candidate: Address,
        candidate_status: NodeStatus,
    },
    /// A candidate reached the admission quorum.
    IndexingNodeAdmitted {
        network_address: Address,
        tokens: u128,
    },
    /// A candidate reached the rejection quorum; stake refunded.
    IndexingNodeRejected {
        network_address: Address,
        refunded: u128,
    },
    /// A candidate's voting window closed without a decision.
    CandidateExpired {
        network_address: Address,
        refunded: u128,
    },
    /// Stake of a removed node was returned to its owner.
    UnbondingCompleted {
        kind: NodeKind,
        network_address: Address,
        owner_address: Address,
        amount: u128,
    },
    /// A Bonding resource node was settled to Bonded.
    BondingSettled {
        network_address: Address,
        tokens: u128,
    },
}

impl RegisterEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CreateResourceNode { .. } => "create_resource_node",
            Self::CreateIndexingNode { .. } => "create_indexing_node",
            Self::RemoveResourceNode { .. } => "remove_resource_node",
            Self::RemoveIndexingNode { .. } => "remove_indexing_node",
            Self::UpdateResourceNode { .. } => "update_resource_node",
            Self::UpdateIndexingNode { .. } => "update_indexing_node",
            Self::IndexingNodeRegistrationVote { .. } => "indexing_node_reg_vote",
            Self::IndexingNodeAdmitted { .. } => "indexing_node_admitted",
            Self::IndexingNodeRejected { .. } => "indexing_node_rejected",
            Self::CandidateExpired { .. } => "candidate_expired",
            Self::UnbondingCompleted { .. } => "complete_unbonding",
            Self::BondingSettled { .. } => "bonding_settled",
        }
    }

    /// Flat `(key, value)` rendering for log sinks and clients.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::CreateResourceNode {
                sender,
                network_address,
                pub_key,
            } => vec![
                ("sender", sender.to_string()),
                ("network_address", network_address.to_string()),
                ("pub_key", pub_key.clone()),
            ],
            Self::CreateIndexingNode {
                sender,
                network_address,
            }
            | Self::UpdateResourceNode {
                sender,
                network_address,
            }
            | Self::UpdateIndexingNode {
                sender,
                network_address,
            } => vec![
                ("sender", sender.to_string()),
                ("network_address", network_address.to_string()),
            ],
            Self::RemoveResourceNode {
                sender,
                resource_node,
                completion_time,
            } => vec![
                ("sender", sender.to_string()),
                ("resource_node", resource_node.to_string()),
                ("completion_time", completion_time.as_secs().to_string()),
            ],
            Self::RemoveIndexingNode {
                sender,
                indexing_node,
                completion_time,
            } => vec![
                ("sender", sender.to_string()),
                ("indexing_node", indexing_node.to_string()),
                ("completion_time", completion_time.as_secs().to_string()),
            ],
            Self::IndexingNodeRegistrationVote {
                voter,
                candidate,
                candidate_status,
            } => vec![
                ("sender", voter.to_string()),
                ("candidate_network_address", candidate.to_string()),
                ("candidate_status", candidate_status.to_string()),
            ],
            Self::IndexingNodeAdmitted {
                network_address,
                tokens,
            }
            | Self::BondingSettled {
                network_address,
                tokens,
            } => vec![
                ("network_address", network_address.to_string()),
                ("amount", tokens.to_string()),
            ],
            Self::IndexingNodeRejected {
                network_address,
                refunded,
            }
            | Self::CandidateExpired {
                network_address,
                refunded,
            } => vec![
                ("network_address", network_address.to_string()),
                ("refunded", refunded.to_string()),
            ],
            Self::UnbondingCompleted {
                kind,
                network_address,
                owner_address,
                amount,
            } => vec![
                ("node_kind", kind.to_string()),
                ("network_address", network_address.to_string()),
                ("owner", owner_address.to_string()),
                ("amount", amount.to_string()),
            ],
        }
    }
}

/// Synchronous fan-out event bus for registry events.
///
/// Listeners are invoked inline on the emitting thread, after the command's
/// writes have been committed.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&RegisterEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&RegisterEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &RegisterEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));

        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&RegisterEvent::CreateIndexingNode {
            sender: addr(1),
            network_address: addr(2),
        });

        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::default();
        bus.emit(&RegisterEvent::BondingSettled {
            network_address: addr(1),
            tokens: 5,
        });
        assert!(bus.listeners.is_empty());
    }

    #[test]
    fn create_resource_node_attributes() {
        let ev = RegisterEvent::CreateResourceNode {
            sender: addr(1),
            network_address: addr(2),
            pub_key: "02ab".into(),
        };
        assert_eq!(ev.event_type(), "create_resource_node");
        let attrs = ev.attributes();
        assert_eq!(attrs[0], ("sender", addr(1).to_string()));
        assert_eq!(attrs[2], ("pub_key", "02ab".to_string()));
    }

    #[test]
    fn vote_event_reports_candidate_status() {
        let ev = RegisterEvent::IndexingNodeRegistrationVote {
            voter: addr(3),
            candidate: addr(4),
            candidate_status: NodeStatus::Bonded,
        };
        assert!(ev
            .attributes()
            .contains(&("candidate_status", "Bonded".to_string())));
    }
}
