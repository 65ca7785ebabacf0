//! The state vocabulary shared by the cluster, its nodes and their disks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::NodeType;
use crate::error::{Error, Result};

/// Availability state, ordered by precedence
///
/// The derived ordering follows declaration order, so `Up < Initializing <
/// Stopping < Down < Maintenance < Retired`.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum State {
    /// Serving.
    #[default]
    Up,

    /// Coming up; carries an init progress on node level.
    Initializing,

    /// Shutting down gracefully.
    Stopping,

    /// Not serving.
    Down,

    /// Deliberately taken out, data is kept.
    Maintenance,

    /// Being drained before removal.
    Retired,
}

impl State {
    /// Every state, in precedence order
    pub const ALL: [Self; 6] = [
        Self::Up,
        Self::Initializing,
        Self::Stopping,
        Self::Down,
        Self::Maintenance,
        Self::Retired,
    ];

    /// The short code used on the wire
    pub fn code(self) -> &'static str {
        match self {
            Self::Up => "u",
            Self::Initializing => "i",
            Self::Stopping => "s",
            Self::Down => "d",
            Self::Maintenance => "m",
            Self::Retired => "r",
        }
    }

    /// The name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Initializing => "Initializing",
            Self::Stopping => "Stopping",
            Self::Down => "Down",
            Self::Maintenance => "Maintenance",
            Self::Retired => "Retired",
        }
    }

    /// Looks up a state by its wire code
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownState`] if the code is not one of `u i s d m r`.
    pub fn from_code(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.code() == code)
            .ok_or_else(|| Error::UnknownState {
                value: code.to_string(),
            })
    }

    /// Returns true if this state may be used in `context`
    pub fn is_legal_in(self, context: StateContext) -> bool {
        is_legal(self, context)
    }

    /// Fails with [`Error::IllegalState`] unless this state is legal in `context`
    pub(crate) fn check_legal(self, context: StateContext) -> Result<Self> {
        if is_legal(self, context) {
            Ok(self)
        } else {
            Err(Error::IllegalState {
                state: self,
                context,
            })
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a state is used, which decides the legal values
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StateContext {
    /// The overall cluster state
    Cluster,

    /// A node of the given role
    Node(NodeType),

    /// A disk of a storage node
    Disk,
}

impl fmt::Display for StateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cluster => f.write_str("cluster"),
            Self::Node(node_type) => write!(f, "{node_type}"),
            Self::Disk => f.write_str("disk"),
        }
    }
}

/// Decides whether `state` may appear in `context`
///
/// Maintenance and retired describe individual nodes only. Disks are either
/// up or down. Retired distributors are accepted even though retiring is a
/// storage concept.
pub fn is_legal(state: State, context: StateContext) -> bool {
    match context {
        StateContext::Cluster => matches!(
            state,
            State::Up | State::Down | State::Initializing | State::Stopping
        ),
        StateContext::Node(_) => true,
        StateContext::Disk => matches!(state, State::Up | State::Down),
    }
}
