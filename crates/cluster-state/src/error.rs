//! Error types for cluster state parsing and mutation

use std::fmt;

use thiserror::Error as ThisError;

use crate::{NodeType, State, StateContext};

/// Result type for cluster state operations
pub type Result<T> = std::result::Result<T, Error>;

/// Cluster state errors
///
/// Every variant renders a human-readable diagnostic. Callers should display
/// it rather than pick it apart; use [`Error::kind`] to tell malformed input
/// apart from well-formed input carrying illegal values.
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Error {
    /// A token has no key/value separator
    #[error("Token '{token}' does not contain ':'")]
    MissingSeparator {
        /// The offending token
        token: String,
    },

    /// A relative path appeared before any absolute path
    #[error("The first path in system state string needs to be absolute: '{token}'")]
    RelativeBeforeAbsolute {
        /// The offending token
        token: String,
    },

    /// A state code that maps to no known state
    #[error("Unknown state {value} given.")]
    UnknownState {
        /// The raw wire value
        value: String,
    },

    /// A known state used where it is not allowed
    #[error("{} is not a legal {context} state", .state.name())]
    IllegalState {
        /// The rejected state
        state: State,
        /// Where it was used
        context: StateContext,
    },

    /// A node index at or beyond the declared node count
    #[error("Cannot index {node_type} node {index} of {count}")]
    NodeIndexOutOfRange {
        /// The role of the node
        node_type: NodeType,
        /// The referenced index
        index: u16,
        /// The declared count
        count: u16,
    },

    /// A disk index at or beyond the declared disk count
    #[error("Cannot index disk {index} of {count}")]
    DiskIndexOutOfRange {
        /// The referenced index
        index: u16,
        /// The declared count
        count: u16,
    },

    /// A node index that is not a 16-bit unsigned integer
    #[error("Invalid {node_type} node index '{value}'. Need a positive integer value")]
    InvalidNodeIndex {
        /// The role of the node
        node_type: NodeType,
        /// The raw wire value
        value: String,
    },

    /// A node count that is not a 16-bit unsigned integer
    #[error("Invalid {node_type} node count '{value}'. Need a positive integer value")]
    InvalidNodeCount {
        /// The role being counted
        node_type: NodeType,
        /// The raw wire value
        value: String,
    },

    /// A version that is not a 32-bit unsigned integer
    #[error("Invalid cluster state version '{value}'. Need a positive integer value")]
    InvalidVersion {
        /// The raw wire value
        value: String,
    },

    /// Init progress that is not a number in `[0.0, 1.0]`
    #[error("Init progress must be a floating point number from 0.0 to 1.0, got '{value}'")]
    InvalidInitProgress {
        /// The raw wire value
        value: String,
    },

    /// Node capacity that is not a positive number
    #[error("Illegal capacity '{value}'. Capacity must be a positive floating point number")]
    InvalidCapacity {
        /// The raw wire value
        value: String,
    },

    /// Disk capacity that is not a positive number
    #[error("Illegal disk capacity '{value}'. Capacity must be a positive floating point number")]
    InvalidDiskCapacity {
        /// The raw wire value
        value: String,
    },

    /// Reliability that is not a positive integer
    #[error("Illegal reliability '{value}'. Reliability must be a positive integer")]
    InvalidReliability {
        /// The raw wire value
        value: String,
    },

    /// A disk count that is not a 16-bit unsigned integer
    #[error("Invalid disk count '{value}'. Need a positive integer value")]
    InvalidDiskCount {
        /// The raw wire value
        value: String,
    },

    /// A disk index that is not a 16-bit unsigned integer
    #[error("Invalid disk index '{value}'. Need a positive integer value")]
    InvalidDiskIndex {
        /// The raw wire value
        value: String,
    },

    /// A description with a broken escape sequence
    #[error("Invalid escape sequence in '{value}': {reason}")]
    InvalidEscape {
        /// The raw wire value
        value: String,
        /// What is wrong with it
        reason: String,
    },

    /// An attribute set on a node role that does not carry it
    #[error("{node_type} nodes have no {attribute}")]
    UnsupportedAttribute {
        /// The role of the node state
        node_type: NodeType,
        /// The attribute name
        attribute: &'static str,
    },

    /// A node state stored under a node of another role
    #[error("Cannot store a {actual} node state for {expected} node {index}")]
    NodeTypeMismatch {
        /// The role of the node key
        expected: NodeType,
        /// The role of the node state
        actual: NodeType,
        /// The node index
        index: u16,
    },
}

impl Error {
    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingSeparator { .. } | Self::RelativeBeforeAbsolute { .. } => {
                ErrorKind::Structural
            }
            _ => ErrorKind::Semantic,
        }
    }
}

/// The kind of cluster state error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The text is not shaped like a cluster state
    Structural,

    /// The text is well-formed but carries an illegal value
    Semantic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
