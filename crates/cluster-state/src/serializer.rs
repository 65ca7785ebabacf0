//! Encoding of the wire text form.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::escape::escape;
use crate::{ClusterState, DiskState, NodeState, NodeType, State};

/// Which dialect of the text form to write
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// The full form understood by current readers
    #[default]
    Current,
    /// The reduced form understood by old readers: no version, no cluster
    /// state, no init progress, no descriptions, stopping written as down
    Legacy,
}

/// Options for rendering the text form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializeOptions {
    /// Dialect to write
    pub format: WireFormat,
    /// Include free-text descriptions
    pub verbose: bool,
}

impl SerializeOptions {
    /// Current format including descriptions
    pub fn verbose() -> Self {
        Self {
            format: WireFormat::Current,
            verbose: true,
        }
    }

    /// Legacy format
    pub fn legacy() -> Self {
        Self {
            format: WireFormat::Legacy,
            verbose: false,
        }
    }

    /// Set whether descriptions are included
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the dialect
    #[must_use]
    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    fn is_legacy(self) -> bool {
        self.format == WireFormat::Legacy
    }

    fn describes(self) -> bool {
        self.verbose && !self.is_legacy()
    }

    fn state_code(self, state: State) -> &'static str {
        match state {
            State::Stopping if self.is_legacy() => State::Down.code(),
            _ => state.code(),
        }
    }
}

/// Space separated `key:value` tokens
#[derive(Default)]
struct Tokens(String);

impl Tokens {
    fn push(&mut self, prefix: &str, key: &str, value: impl Display) {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        self.0.push_str(&format!("{prefix}{key}:{value}"));
    }

    fn finish(self) -> String {
        self.0
    }
}

pub(crate) fn serialize_cluster_state(state: &ClusterState, options: SerializeOptions) -> String {
    let mut tokens = Tokens::default();

    if !options.is_legacy() {
        if state.version() != 0 {
            tokens.push("", "version", state.version());
        }
        if state.cluster_state() != State::Up {
            tokens.push("", "cluster", state.cluster_state().code());
        }
    }

    for node_type in NodeType::ALL {
        let count = state.node_count(node_type);
        // Old readers require both counts to be present
        if count == 0 && !options.is_legacy() {
            continue;
        }
        tokens.push("", node_type.as_str(), count);
        for (node, node_state) in state.node_states(node_type) {
            write_node(&mut tokens, &format!(".{}.", node.index()), node_state, options, false);
        }
    }

    tokens.finish()
}

pub(crate) fn serialize_node_state(node_state: &NodeState, options: SerializeOptions) -> String {
    let mut tokens = Tokens::default();
    write_node(&mut tokens, "", node_state, options, true);
    tokens.finish()
}

pub(crate) fn serialize_disk_state(disk: &DiskState, options: SerializeOptions) -> String {
    let mut tokens = Tokens::default();
    write_disk(&mut tokens, "", disk, options, true);
    tokens.finish()
}

fn write_node(
    tokens: &mut Tokens,
    prefix: &str,
    node_state: &NodeState,
    options: SerializeOptions,
    always_state: bool,
) {
    if always_state || node_state.state() != State::Up {
        tokens.push(prefix, "s", options.state_code(node_state.state()));
    }
    if node_state.capacity() != 1.0 {
        tokens.push(prefix, "c", node_state.capacity());
    }
    if node_state.reliability() != 1 {
        tokens.push(prefix, "r", node_state.reliability());
    }
    if node_state.state() == State::Initializing && !options.is_legacy() {
        tokens.push(prefix, "i", node_state.init_progress());
    }
    if node_state.disk_count() > 0 {
        tokens.push(prefix, "d", node_state.disk_count());
        for (index, disk) in node_state.disks().iter().enumerate() {
            let disk_prefix = format!("{prefix}d.{index}");
            // Old readers only know the bare disk state key
            if options.is_legacy() && disk.state() != State::Up {
                tokens.push(&disk_prefix, "", disk.state().code());
            }
            write_disk(tokens, &format!("{disk_prefix}."), disk, options, false);
        }
    }
    if options.describes() && !node_state.description().is_empty() {
        tokens.push(prefix, "m", escape(node_state.description()));
    }
}

fn write_disk(
    tokens: &mut Tokens,
    prefix: &str,
    disk: &DiskState,
    options: SerializeOptions,
    always_state: bool,
) {
    if always_state || (disk.state() != State::Up && !options.is_legacy()) {
        tokens.push(prefix, "s", disk.state().code());
    }
    if disk.capacity() != 1.0 {
        tokens.push(prefix, "c", disk.capacity());
    }
    if options.describes() && !disk.description().is_empty() {
        tokens.push(prefix, "m", escape(disk.description()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;

    fn storage(state: State) -> NodeState {
        NodeState::new(NodeType::Storage, state).unwrap()
    }

    #[test]
    fn test_empty_state() {
        let state = ClusterState::new();
        assert_eq!(state.serialize(SerializeOptions::default()), "");
        assert_eq!(state.serialize(SerializeOptions::verbose()), "");
        assert_eq!(
            state.serialize(SerializeOptions::legacy()),
            "distributor:0 storage:0"
        );
    }

    #[test]
    fn test_node_token_order() {
        let mut node_state = storage(State::Initializing);
        node_state.set_init_progress(0.0).unwrap();
        node_state.set_capacity(2.5).unwrap();
        node_state.set_reliability(3).unwrap();
        node_state.set_disk_count(2).unwrap();
        let mut disk = DiskState::new(State::Down).unwrap();
        disk.set_capacity(0.5).unwrap();
        disk.set_description("worn");
        node_state.set_disk_state(0, disk).unwrap();
        node_state.set_description("booting up");

        let mut state = ClusterState::new();
        state.set_node_state(Node::storage(0), node_state).unwrap();

        assert_eq!(
            state.serialize(SerializeOptions::default()),
            "storage:1 .0.s:i .0.c:2.5 .0.r:3 .0.i:0 .0.d:2 .0.d.0.s:d .0.d.0.c:0.5"
        );
        assert_eq!(
            state.serialize(SerializeOptions::verbose()),
            "storage:1 .0.s:i .0.c:2.5 .0.r:3 .0.i:0 .0.d:2 .0.d.0.s:d .0.d.0.c:0.5 \
             .0.d.0.m:worn .0.m:booting\\x20up"
        );
    }

    #[test]
    fn test_legacy_format() {
        let mut state = ClusterState::parse(
            "version:12 cluster:s distributor:3 .1.s:s .2.s:i .2.i:0.4 \
             storage:2 .0.s:s .0.d:3 .0.d.1.s:d .0.d.2.c:0.5 .1.m:gone",
        )
        .unwrap();
        state.set_version(13);

        assert_eq!(
            state.serialize(SerializeOptions::legacy().with_verbose(true)),
            "distributor:3 .1.s:d .2.s:i storage:2 .0.s:d .0.d:3 .0.d.1:d .0.d.2.c:0.5"
        );
        assert_eq!(
            state.serialize(SerializeOptions::default()),
            "version:13 cluster:s distributor:3 .1.s:s .2.s:i .2.i:0.4 \
             storage:2 .0.s:s .0.d:3 .0.d.1.s:d .0.d.2.c:0.5"
        );
    }

    #[test]
    fn test_standalone_forms_name_the_state() {
        assert_eq!(
            NodeState::up(NodeType::Storage).serialize(SerializeOptions::default()),
            "s:u"
        );
        assert_eq!(
            storage(State::Stopping).serialize(SerializeOptions::legacy()),
            "s:d"
        );
        assert_eq!(
            DiskState::default().serialize(SerializeOptions::verbose()),
            "s:u"
        );
        assert_eq!(
            DiskState::new(State::Down)
                .unwrap()
                .serialize(SerializeOptions::legacy()),
            "s:d"
        );
    }

    #[test]
    fn test_options_builders() {
        assert_eq!(
            SerializeOptions::default().with_verbose(true),
            SerializeOptions::verbose()
        );
        assert_eq!(
            SerializeOptions::default().with_format(WireFormat::Legacy),
            SerializeOptions::legacy()
        );
    }
}
