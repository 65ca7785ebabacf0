//! The cluster state aggregate

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::serializer::{self, SerializeOptions};
use crate::{DiskState, Node, NodeState, NodeType, State, StateContext, parser};

/// A versioned snapshot of the availability of every node in the cluster
///
/// Node states are stored sparsely: a node below its role's count that has
/// no entry is up, and any node at or beyond the count is down. Trailing
/// down nodes are trimmed from the count after every change, so a state has
/// exactly one minimal representation.
///
/// The value is immutable by convention. To publish a new version, clone it,
/// mutate the clone and bump the version.
///
/// ```
/// use fabric_cluster_state::{ClusterState, Node, State};
///
/// let state: ClusterState = "version:3 distributor:4 .1.s:d storage:2".parse().unwrap();
/// assert_eq!(state.version(), 3);
/// assert_eq!(state.node_state(Node::distributor(1)).state(), State::Down);
/// assert_eq!(state.node_state(Node::storage(7)).state(), State::Down);
/// assert_eq!(state.to_string(), "version:3 distributor:4 .1.s:d storage:2");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClusterState {
    pub(crate) version: u32,
    pub(crate) cluster_state: State,
    pub(crate) node_counts: [u16; 2],
    pub(crate) node_states: BTreeMap<Node, NodeState>,
}

impl ClusterState {
    /// Create an empty cluster state: version 0, up, no nodes
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the wire text form
    ///
    /// # Errors
    ///
    /// Fails on malformed tokens and on illegal values for known keys.
    /// Unknown keys are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        parser::parse_cluster_state(text)
    }

    /// Get the version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Set the version
    pub fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    /// Get the overall cluster state
    pub fn cluster_state(&self) -> State {
        self.cluster_state
    }

    /// Set the overall cluster state; maintenance and retired are rejected
    pub fn set_cluster_state(&mut self, state: State) -> Result<()> {
        self.cluster_state = state.check_legal(StateContext::Cluster)?;
        Ok(())
    }

    /// Get the number of nodes of a role
    pub fn node_count(&self, node_type: NodeType) -> u16 {
        self.node_counts[node_type.slot()]
    }

    /// Get the effective state of any node, stored or not
    pub fn node_state(&self, node: Node) -> Cow<'_, NodeState> {
        if node.index() >= self.node_count(node.node_type()) {
            return Cow::Owned(NodeState::down(node.node_type()));
        }
        self.node_states
            .get(&node)
            .map_or_else(|| Cow::Owned(NodeState::up(node.node_type())), Cow::Borrowed)
    }

    /// Iterate over the explicitly stored states of a role, by index
    pub fn node_states(&self, node_type: NodeType) -> impl Iterator<Item = (Node, &NodeState)> {
        self.node_states
            .range(Node::new(node_type, 0)..=Node::new(node_type, u16::MAX))
            .map(|(node, state)| (*node, state))
    }

    /// Get the disks of a node; empty for distributors and unset nodes
    pub fn disk_states(&self, node: Node) -> &[DiskState] {
        if node.index() >= self.node_count(node.node_type()) {
            return &[];
        }
        self.node_states
            .get(&node)
            .map(NodeState::disks)
            .unwrap_or_default()
    }

    /// Store the state of a node
    ///
    /// Setting a node at or beyond the count grows the count to include it
    /// and marks every node in the gap as down. Storing the default state
    /// removes the entry. Trailing down nodes are trimmed afterwards.
    pub fn set_node_state(&mut self, node: Node, state: NodeState) -> Result<()> {
        let node_type = node.node_type();
        if state.node_type() != node_type {
            return Err(Error::NodeTypeMismatch {
                expected: node_type,
                actual: state.node_type(),
                index: node.index(),
            });
        }

        let count = self.node_count(node_type);
        if node.index() >= count {
            let grown = node
                .index()
                .checked_add(1)
                .ok_or(Error::NodeIndexOutOfRange {
                    node_type,
                    index: node.index(),
                    count,
                })?;
            for index in count..node.index() {
                self.node_states
                    .insert(Node::new(node_type, index), NodeState::down(node_type));
            }
            trace!("Growing {} count from {} to {}", node_type, count, grown);
            self.node_counts[node_type.slot()] = grown;
        }

        if state.is_default() {
            self.node_states.remove(&node);
        } else {
            self.node_states.insert(node, state);
        }

        self.trim_trailing_down_nodes();
        Ok(())
    }

    /// Renders the wire text form
    pub fn serialize(&self, options: SerializeOptions) -> String {
        serializer::serialize_cluster_state(self, options)
    }

    /// Drops entries that carry no information and checks every remaining
    /// entry against the final node count
    pub(crate) fn normalize(&mut self) -> Result<()> {
        self.node_states.retain(|_, state| !state.is_default());

        let beyond_count = self
            .node_states
            .keys()
            .find(|node| node.index() >= self.node_count(node.node_type()))
            .copied();
        if let Some(node) = beyond_count {
            return Err(Error::NodeIndexOutOfRange {
                node_type: node.node_type(),
                index: node.index(),
                count: self.node_count(node.node_type()),
            });
        }

        self.trim_trailing_down_nodes();
        Ok(())
    }

    /// Nodes beyond the count read as down, so trailing down nodes without a
    /// description are redundant
    fn trim_trailing_down_nodes(&mut self) {
        for node_type in NodeType::ALL {
            let slot = node_type.slot();
            while let Some(index) = self.node_counts[slot].checked_sub(1) {
                let node = Node::new(node_type, index);
                match self.node_states.get(&node) {
                    Some(state)
                        if state.state() == State::Down && state.description().is_empty() =>
                    {
                        self.node_states.remove(&node);
                        self.node_counts[slot] = index;
                        debug!("Trimmed trailing down node {}", node);
                    }
                    _ => break,
                }
            }
        }
    }
}

impl FromStr for ClusterState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClusterState {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ClusterState> for String {
    fn from(state: ClusterState) -> Self {
        state.serialize(SerializeOptions::verbose())
    }
}

/// Terse current format; `{:#}` renders the verbose form
impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = if f.alternate() {
            SerializeOptions::verbose()
        } else {
            SerializeOptions::default()
        };
        f.write_str(&self.serialize(options))
    }
}
