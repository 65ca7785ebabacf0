//! Node state type

use std::fmt;

use serde::Serialize;

use crate::disk_state::is_positive;
use crate::error::{Error, Result};
use crate::serializer::{self, SerializeOptions};
use crate::{DiskState, NodeType, State, StateContext, parser};

/// The observable state of a distributor or storage node
///
/// Capacity, reliability and disks only exist on storage nodes; setting them
/// on a distributor state fails with [`Error::UnsupportedAttribute`].
#[derive(Clone, Debug, Serialize)]
pub struct NodeState {
    node_type: NodeType,
    state: State,
    init_progress: f64,
    description: String,
    capacity: f64,
    reliability: u16,
    disks: Vec<DiskState>,
}

impl NodeState {
    /// Create a node state with every other attribute at its default
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] if `state` is not legal for the role.
    pub fn new(node_type: NodeType, state: State) -> Result<Self> {
        let mut node_state = Self::up(node_type);
        node_state.set_state(state)?;
        Ok(node_state)
    }

    /// The default state of a node within the declared node count
    pub fn up(node_type: NodeType) -> Self {
        Self {
            node_type,
            state: State::Up,
            init_progress: 0.0,
            description: String::new(),
            capacity: 1.0,
            reliability: 1,
            disks: Vec::new(),
        }
    }

    /// The state of a node beyond the declared node count
    pub fn down(node_type: NodeType) -> Self {
        Self {
            state: State::Down,
            ..Self::up(node_type)
        }
    }

    /// Parses the prefix-free form a node uses to report its own state,
    /// e.g. `s:i i:0.3 d:2 d.1.s:d`
    pub fn parse(node_type: NodeType, text: &str) -> Result<Self> {
        parser::parse_node_state(node_type, text)
    }

    /// Get the role this state describes
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Get the state
    pub fn state(&self) -> State {
        self.state
    }

    /// Get the init progress; only meaningful while initializing
    pub fn init_progress(&self) -> f64 {
        self.init_progress
    }

    /// Get the diagnostic description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the relative capacity
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Get the reliability weight
    pub fn reliability(&self) -> u16 {
        self.reliability
    }

    /// Get the number of disks
    pub fn disk_count(&self) -> u16 {
        // Bounded by set_disk_count
        u16::try_from(self.disks.len()).unwrap_or(u16::MAX)
    }

    /// Get a single disk, if the index is below the disk count
    pub fn disk_state(&self, index: u16) -> Option<&DiskState> {
        self.disks.get(usize::from(index))
    }

    /// Get every disk, in index order
    pub fn disks(&self) -> &[DiskState] {
        &self.disks
    }

    /// Set the state. Leaving initializing resets the init progress.
    pub fn set_state(&mut self, state: State) -> Result<()> {
        let state = state.check_legal(StateContext::Node(self.node_type))?;
        if state != State::Initializing {
            self.init_progress = 0.0;
        }
        self.state = state;
        Ok(())
    }

    /// Set the init progress, a fraction in `[0.0, 1.0]`
    pub fn set_init_progress(&mut self, progress: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&progress) {
            return Err(Error::InvalidInitProgress {
                value: progress.to_string(),
            });
        }
        self.init_progress = progress;
        Ok(())
    }

    /// Set the diagnostic description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Set the relative capacity of a storage node
    pub fn set_capacity(&mut self, capacity: f64) -> Result<()> {
        self.require_storage("capacity")?;
        if !is_positive(capacity) {
            return Err(Error::InvalidCapacity {
                value: capacity.to_string(),
            });
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Set the reliability weight of a storage node
    pub fn set_reliability(&mut self, reliability: u16) -> Result<()> {
        self.require_storage("reliability")?;
        if reliability == 0 {
            return Err(Error::InvalidReliability {
                value: reliability.to_string(),
            });
        }
        self.reliability = reliability;
        Ok(())
    }

    /// Set the number of disks of a storage node
    ///
    /// Growing adds default disks; shrinking drops the highest indexes.
    pub fn set_disk_count(&mut self, count: u16) -> Result<()> {
        self.require_storage("disks")?;
        self.disks.resize(usize::from(count), DiskState::default());
        Ok(())
    }

    /// Replace the state of one disk of a storage node
    pub fn set_disk_state(&mut self, index: u16, disk: DiskState) -> Result<()> {
        *self.disk_mut(index)? = disk;
        Ok(())
    }

    pub(crate) fn disk_mut(&mut self, index: u16) -> Result<&mut DiskState> {
        self.require_storage("disks")?;
        let count = self.disk_count();
        self.disks
            .get_mut(usize::from(index))
            .ok_or(Error::DiskIndexOutOfRange { index, count })
    }

    /// Returns true if this equals the default up state of its role
    pub fn is_default(&self) -> bool {
        *self == Self::up(self.node_type)
    }

    /// Renders the prefix-free form; it always contains the state
    pub fn serialize(&self, options: SerializeOptions) -> String {
        serializer::serialize_node_state(self, options)
    }

    fn require_storage(&self, attribute: &'static str) -> Result<()> {
        match self.node_type {
            NodeType::Storage => Ok(()),
            NodeType::Distributor => Err(Error::UnsupportedAttribute {
                node_type: self.node_type,
                attribute,
            }),
        }
    }
}

/// Init progress only takes part while initializing
impl PartialEq for NodeState {
    fn eq(&self, other: &Self) -> bool {
        self.node_type == other.node_type
            && self.state == other.state
            && (self.state != State::Initializing || self.init_progress == other.init_progress)
            && self.description == other.description
            && self.capacity == other.capacity
            && self.reliability == other.reliability
            && self.disks == other.disks
    }
}

/// Terse form; `{:#}` includes descriptions
impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = if f.alternate() {
            SerializeOptions::verbose()
        } else {
            SerializeOptions::default()
        };
        f.write_str(&self.serialize(options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let up = NodeState::up(NodeType::Storage);
        assert_eq!(up.state(), State::Up);
        assert_eq!(up.init_progress(), 0.0);
        assert_eq!(up.capacity(), 1.0);
        assert_eq!(up.reliability(), 1);
        assert_eq!(up.disk_count(), 0);
        assert!(up.is_default());

        assert!(!NodeState::down(NodeType::Storage).is_default());
        assert_ne!(up, NodeState::up(NodeType::Distributor));
    }

    #[test]
    fn test_description_is_not_default() {
        let mut state = NodeState::up(NodeType::Distributor);
        state.set_description("foo bar");
        assert!(!state.is_default());
    }

    #[test]
    fn test_distributor_attributes() {
        let mut state = NodeState::new(NodeType::Distributor, State::Retired).unwrap();
        assert_eq!(
            state.set_capacity(2.0),
            Err(Error::UnsupportedAttribute {
                node_type: NodeType::Distributor,
                attribute: "capacity",
            })
        );
        assert!(state.set_reliability(3).is_err());
        assert!(state.set_disk_count(2).is_err());
        assert_eq!(
            Error::UnsupportedAttribute {
                node_type: NodeType::Distributor,
                attribute: "reliability",
            }
            .to_string(),
            "distributor nodes have no reliability"
        );
    }

    #[test]
    fn test_storage_attributes() {
        let mut state = NodeState::up(NodeType::Storage);
        state.set_capacity(1.3).unwrap();
        state.set_reliability(4).unwrap();
        assert_eq!(state.capacity(), 1.3);
        assert_eq!(state.reliability(), 4);

        assert!(matches!(
            state.set_capacity(-2.0),
            Err(Error::InvalidCapacity { .. })
        ));
        assert!(matches!(
            state.set_reliability(0),
            Err(Error::InvalidReliability { .. })
        ));
    }

    #[test]
    fn test_init_progress() {
        let mut state = NodeState::new(NodeType::Distributor, State::Initializing).unwrap();
        state.set_init_progress(0.5).unwrap();
        assert_eq!(state.init_progress(), 0.5);
        assert!(matches!(
            state.set_init_progress(1.5),
            Err(Error::InvalidInitProgress { .. })
        ));
        assert!(state.set_init_progress(f64::NAN).is_err());

        // Leaving initializing resets the progress
        state.set_state(State::Up).unwrap();
        assert_eq!(state.init_progress(), 0.0);
        assert!(state.is_default());
    }

    #[test]
    fn test_disks() {
        let mut state = NodeState::up(NodeType::Storage);
        state.set_disk_count(4).unwrap();
        assert_eq!(state.disk_count(), 4);
        assert!(state.disks().iter().all(DiskState::is_default));

        state
            .set_disk_state(1, DiskState::new(State::Down).unwrap())
            .unwrap();
        assert_eq!(state.disk_state(1).map(DiskState::state), Some(State::Down));
        assert_eq!(
            state.set_disk_state(4, DiskState::default()),
            Err(Error::DiskIndexOutOfRange { index: 4, count: 4 })
        );
        assert_eq!(state.disk_state(4), None);

        state.set_disk_count(1).unwrap();
        assert_eq!(state.disk_count(), 1);
        assert_eq!(state.disk_state(1), None);
    }

    #[test]
    fn test_text_form() {
        let state =
            NodeState::parse(NodeType::Storage, "s:i i:0.3 c:2 d:3 d.1.s:d m:slow").unwrap();
        assert_eq!(state.state(), State::Initializing);
        assert_eq!(state.init_progress(), 0.3);
        assert_eq!(state.capacity(), 2.0);
        assert_eq!(state.disk_count(), 3);
        assert_eq!(state.description(), "slow");

        assert_eq!(state.to_string(), "s:i c:2 i:0.3 d:3 d.1.s:d");
        assert_eq!(format!("{state:#}"), "s:i c:2 i:0.3 d:3 d.1.s:d m:slow");
        assert_eq!(
            NodeState::parse(NodeType::Storage, &format!("{state:#}")).unwrap(),
            state
        );

        assert_eq!(NodeState::up(NodeType::Distributor).to_string(), "s:u");
    }
}
