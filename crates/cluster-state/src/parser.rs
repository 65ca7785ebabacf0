//! Decoding of the wire text form.
//!
//! A cluster state is a whitespace separated list of `key:value` tokens.
//! Absolute keys (`version`, `cluster`, `distributor`, `storage`) stand on
//! their own; keys starting with a dot are appended to the last absolute key,
//! so `distributor:4 .2.s:d` addresses the state of distributor 2.
//!
//! Known keys are validated strictly. Unknown keys are logged and skipped so
//! that states written by newer versions can still be read.

use tracing::debug;

use crate::error::{Error, Result};
use crate::escape::unescape;
use crate::{ClusterState, DiskState, Node, NodeState, NodeType, State};

/// What the last absolute key made relative keys refer to
#[derive(Clone, Copy)]
enum Scope<'a> {
    Nodes(NodeType),
    Other(&'a str),
}

impl<'a> Scope<'a> {
    fn of(key: &'a str) -> Self {
        NodeType::from_key(key).map_or(Scope::Other(key), Scope::Nodes)
    }
}

pub(crate) fn parse_cluster_state(text: &str) -> Result<ClusterState> {
    let mut state = ClusterState::new();
    let mut scope = None;

    for token in text.split_ascii_whitespace() {
        let (key, value) = split_token(token)?;

        let Some(path) = key.strip_prefix('.') else {
            scope = Some(Scope::of(key));
            apply_absolute(&mut state, key, value)?;
            continue;
        };

        match scope {
            None => {
                return Err(Error::RelativeBeforeAbsolute {
                    token: token.to_string(),
                });
            }
            Some(Scope::Nodes(node_type)) => apply_indexed(&mut state, node_type, path, value)?,
            Some(Scope::Other(absolute)) => ignore(&format!("{absolute}{key}")),
        }
    }

    state.normalize()?;
    Ok(state)
}

pub(crate) fn parse_node_state(node_type: NodeType, text: &str) -> Result<NodeState> {
    let mut node_state = NodeState::up(node_type);
    for token in text.split_ascii_whitespace() {
        let (key, value) = split_token(token)?;
        if !apply_node_attribute(&mut node_state, key, value)? {
            ignore(key);
        }
    }
    Ok(node_state)
}

pub(crate) fn parse_disk_state(text: &str) -> Result<DiskState> {
    let mut disk = DiskState::default();
    for token in text.split_ascii_whitespace() {
        let (key, value) = split_token(token)?;
        if !apply_disk_attribute(&mut disk, key, value)? {
            ignore(key);
        }
    }
    Ok(disk)
}

fn split_token(token: &str) -> Result<(&str, &str)> {
    token.split_once(':').ok_or_else(|| Error::MissingSeparator {
        token: token.to_string(),
    })
}

fn ignore(key: &str) {
    debug!(
        "Ignoring unknown key {} in cluster state, assuming it is a newer feature",
        key
    );
}

fn apply_absolute(state: &mut ClusterState, key: &str, value: &str) -> Result<()> {
    match key {
        "version" => {
            state.version = value.parse().map_err(|_| Error::InvalidVersion {
                value: value.to_string(),
            })?;
        }
        "cluster" => state.set_cluster_state(State::from_code(value)?)?,
        _ => match NodeType::from_key(key) {
            Some(node_type) => {
                state.node_counts[node_type.slot()] =
                    value.parse().map_err(|_| Error::InvalidNodeCount {
                        node_type,
                        value: value.to_string(),
                    })?;
            }
            None => ignore(key),
        },
    }
    Ok(())
}

/// Handles `<index>[.<attribute>]` below a `distributor` or `storage` key
fn apply_indexed(
    state: &mut ClusterState,
    node_type: NodeType,
    path: &str,
    value: &str,
) -> Result<()> {
    let (index, attribute) = path.split_once('.').unwrap_or((path, ""));
    let index: u16 = index.parse().map_err(|_| Error::InvalidNodeIndex {
        node_type,
        value: index.to_string(),
    })?;

    // Checked before the attribute is looked at, so out of range indexes fail
    // even for keys that would otherwise be ignored
    let count = state.node_count(node_type);
    if index >= count {
        return Err(Error::NodeIndexOutOfRange {
            node_type,
            index,
            count,
        });
    }

    if attribute.is_empty() {
        ignore(&format!("{node_type}.{path}"));
        return Ok(());
    }

    let node_state = state
        .node_states
        .entry(Node::new(node_type, index))
        .or_insert_with(|| NodeState::up(node_type));
    if !apply_node_attribute(node_state, attribute, value)? {
        ignore(&format!("{node_type}.{path}"));
    }
    Ok(())
}

/// Applies one node level attribute; returns false for unknown keys
pub(crate) fn apply_node_attribute(
    node_state: &mut NodeState,
    key: &str,
    value: &str,
) -> Result<bool> {
    match key {
        "s" => node_state.set_state(State::from_code(value)?)?,
        "i" => {
            let invalid = || Error::InvalidInitProgress {
                value: value.to_string(),
            };
            let progress = value.parse().map_err(|_| invalid())?;
            node_state
                .set_init_progress(progress)
                .map_err(|_| invalid())?;
        }
        "m" => node_state.set_description(unescape(value)?),
        // Capacity, reliability and disks are storage attributes
        _ if node_state.node_type() == NodeType::Distributor => return Ok(false),
        "c" => {
            let invalid = || Error::InvalidCapacity {
                value: value.to_string(),
            };
            let capacity = value.parse().map_err(|_| invalid())?;
            node_state.set_capacity(capacity).map_err(|_| invalid())?;
        }
        "r" => {
            let invalid = || Error::InvalidReliability {
                value: value.to_string(),
            };
            let reliability = value.parse().map_err(|_| invalid())?;
            node_state
                .set_reliability(reliability)
                .map_err(|_| invalid())?;
        }
        "d" => {
            let count = value.parse().map_err(|_| Error::InvalidDiskCount {
                value: value.to_string(),
            })?;
            node_state.set_disk_count(count)?;
        }
        _ => match key.strip_prefix("d.") {
            Some(path) => return apply_disk_path(node_state, path, value),
            None => return Ok(false),
        },
    }
    Ok(true)
}

/// Handles `<index>` and `<index>.<attribute>` below a node's `d` key
///
/// The bare form is the legacy way of setting a disk's state, kept readable
/// for states written by older nodes.
fn apply_disk_path(node_state: &mut NodeState, path: &str, value: &str) -> Result<bool> {
    let (index, attribute) = match path.split_once('.') {
        Some((index, attribute)) => (index, Some(attribute)),
        None => (path, None),
    };
    let index: u16 = index.parse().map_err(|_| Error::InvalidDiskIndex {
        value: index.to_string(),
    })?;

    let disk = node_state.disk_mut(index)?;
    match attribute {
        None => {
            disk.set_state(State::from_code(value)?)?;
            Ok(true)
        }
        Some(attribute) => apply_disk_attribute(disk, attribute, value),
    }
}

/// Applies one disk level attribute; returns false for unknown keys
fn apply_disk_attribute(disk: &mut DiskState, key: &str, value: &str) -> Result<bool> {
    match key {
        "s" => disk.set_state(State::from_code(value)?)?,
        "c" => {
            let invalid = || Error::InvalidDiskCapacity {
                value: value.to_string(),
            };
            let capacity = value.parse().map_err(|_| invalid())?;
            disk.set_capacity(capacity).map_err(|_| invalid())?;
        }
        "m" => disk.set_description(unescape(value)?),
        _ => return Ok(false),
    }
    Ok(true)
}
