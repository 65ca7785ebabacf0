//! Node identity types

use std::fmt;

use serde::{Deserialize, Serialize};

/// The role a node plays in the cluster
///
/// Distributors order before storage nodes; the wire format emits them in
/// that order too.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Routes requests and owns bucket distribution.
    Distributor,

    /// Holds data, split into disks.
    Storage,
}

impl NodeType {
    /// Both roles, in wire order
    pub const ALL: [Self; 2] = [Self::Distributor, Self::Storage];

    /// The absolute wire key for this role (also its display form)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Distributor => "distributor",
            Self::Storage => "storage",
        }
    }

    /// Looks up a role by its absolute wire key
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "distributor" => Some(Self::Distributor),
            "storage" => Some(Self::Storage),
            _ => None,
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Self::Distributor => 0,
            Self::Storage => 1,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the cluster, identified by role and index
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Node {
    node_type: NodeType,
    index: u16,
}

impl Node {
    /// Create a new node identity
    pub fn new(node_type: NodeType, index: u16) -> Self {
        Self { node_type, index }
    }

    /// Shorthand for a distributor node
    pub fn distributor(index: u16) -> Self {
        Self::new(NodeType::Distributor, index)
    }

    /// Shorthand for a storage node
    pub fn storage(index: u16) -> Self {
        Self::new(NodeType::Storage, index)
    }

    /// Get the role of this node
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Get the index of this node within its role
    pub fn index(&self) -> u16 {
        self.index
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node_type, self.index)
    }
}
