//! Cluster state model for a distributed storage cluster
//!
//! This crate provides:
//! - The state of every distributor and storage node, and of storage disks
//! - The versioned cluster state aggregate with sparse, minimal storage
//! - Parsing and rendering of the whitespace separated wire text form,
//!   including the legacy dialect understood by old readers
//!
//! ```
//! use fabric_cluster_state::{ClusterState, Node, NodeState, NodeType, State};
//!
//! let mut state = ClusterState::parse("version:4 distributor:3 storage:2").unwrap();
//! state.set_version(5);
//! let maintenance = NodeState::new(NodeType::Storage, State::Maintenance).unwrap();
//! state.set_node_state(Node::storage(1), maintenance).unwrap();
//! assert_eq!(state.to_string(), "version:5 distributor:3 storage:2 .1.s:m");
//! ```

pub mod cluster_state;
pub mod disk_state;
pub mod error;
pub mod escape;
pub mod node;
pub mod node_state;
mod parser;
pub mod serializer;
pub mod state;

pub use cluster_state::ClusterState;
pub use disk_state::DiskState;
pub use error::{Error, ErrorKind, Result};
pub use escape::{escape, unescape};
pub use node::{Node, NodeType};
pub use node_state::NodeState;
pub use serializer::{SerializeOptions, WireFormat};
pub use state::{State, StateContext, is_legal};
