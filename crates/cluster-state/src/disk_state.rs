//! Disk state type

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::serializer::{self, SerializeOptions};
use crate::{State, StateContext, parser};

/// The observable state of a single disk on a storage node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiskState {
    state: State,
    capacity: f64,
    description: String,
}

impl DiskState {
    /// Create a disk state with default capacity and no description
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] unless `state` is up or down.
    pub fn new(state: State) -> Result<Self> {
        let mut disk = Self::default();
        disk.set_state(state)?;
        Ok(disk)
    }

    /// Parses the prefix-free disk form, e.g. `s:d c:0.5`
    pub fn parse(text: &str) -> Result<Self> {
        parser::parse_disk_state(text)
    }

    /// Get the state of this disk
    pub fn state(&self) -> State {
        self.state
    }

    /// Get the relative capacity of this disk
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Get the diagnostic description of this disk
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the state; only up and down are legal for disks
    pub fn set_state(&mut self, state: State) -> Result<()> {
        self.state = state.check_legal(StateContext::Disk)?;
        Ok(())
    }

    /// Set the relative capacity, which must be finite and positive
    pub fn set_capacity(&mut self, capacity: f64) -> Result<()> {
        if !is_positive(capacity) {
            return Err(Error::InvalidDiskCapacity {
                value: capacity.to_string(),
            });
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Set the diagnostic description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Returns true if every attribute holds its default
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Renders the prefix-free disk form
    pub fn serialize(&self, options: SerializeOptions) -> String {
        serializer::serialize_disk_state(self, options)
    }
}

impl Default for DiskState {
    fn default() -> Self {
        Self {
            state: State::Up,
            capacity: 1.0,
            description: String::new(),
        }
    }
}

impl FromStr for DiskState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DiskState {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DiskState> for String {
    fn from(disk: DiskState) -> Self {
        disk.serialize(SerializeOptions::verbose())
    }
}

/// Terse form; `{:#}` includes the description
impl fmt::Display for DiskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = if f.alternate() {
            SerializeOptions::verbose()
        } else {
            SerializeOptions::default()
        };
        f.write_str(&self.serialize(options))
    }
}

pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
