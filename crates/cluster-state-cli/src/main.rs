//! CLI binary to decode, validate and re-encode cluster state strings.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

use std::io::{self, Read};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use fabric_cluster_state::{ClusterState, NodeState, NodeType, SerializeOptions, WireFormat};
use serde::Serialize;
use tracing::{debug, error};

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is not a valid cluster state
    #[error("invalid cluster state ({kind}): {0}", kind = .0.kind())]
    ClusterState(#[from] fabric_cluster_state::Error),

    /// Reading stdin failed
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    /// Rendering the JSON report failed
    #[error("failed to render report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Dialect of the re-encoded text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Format {
    #[default]
    Current,
    Legacy,
}

impl From<Format> for WireFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Current => Self::Current,
            Format::Legacy => Self::Legacy,
        }
    }
}

/// What to print on success
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Output {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Cluster state text; read from stdin when omitted
    state: Option<String>,

    /// Wire dialect to re-encode in
    #[arg(long, value_enum, default_value_t = Format::Current, env = "CLUSTER_STATE_FORMAT")]
    format: Format,

    /// Include node and disk descriptions
    #[arg(long, env = "CLUSTER_STATE_VERBOSE")]
    verbose: bool,

    /// Print the re-encoded text or a JSON report
    #[arg(long, value_enum, default_value_t = Output::Text, env = "CLUSTER_STATE_OUTPUT")]
    output: Output,
}

impl Args {
    fn options(&self) -> SerializeOptions {
        SerializeOptions::default()
            .with_format(self.format.into())
            .with_verbose(self.verbose)
    }
}

/// One explicitly stored node in the JSON report
#[derive(Debug, Serialize)]
struct NodeEntry<'a> {
    node: String,
    #[serde(flatten)]
    node_state: &'a NodeState,
}

/// Everything a decoded state carries, plus its re-encoding
#[derive(Debug, Serialize)]
struct Report<'a> {
    encoded: String,
    version: u32,
    cluster: &'static str,
    distributors: u16,
    storage: u16,
    nodes: Vec<NodeEntry<'a>>,
}

impl<'a> Report<'a> {
    fn new(state: &'a ClusterState, options: SerializeOptions) -> Self {
        let nodes = NodeType::ALL
            .into_iter()
            .flat_map(|node_type| state.node_states(node_type))
            .map(|(node, node_state)| NodeEntry {
                node: node.to_string(),
                node_state,
            })
            .collect();

        Self {
            encoded: state.serialize(options),
            version: state.version(),
            cluster: state.cluster_state().name(),
            distributors: state.node_count(NodeType::Distributor),
            storage: state.node_count(NodeType::Storage),
            nodes,
        }
    }
}

fn render(args: &Args, input: &str) -> Result<String, Error> {
    let state = ClusterState::parse(input.trim())?;
    debug!(
        "Decoded cluster state version {} with {} distributors and {} storage nodes",
        state.version(),
        state.node_count(NodeType::Distributor),
        state.node_count(NodeType::Storage)
    );

    match args.output {
        Output::Text => Ok(state.serialize(args.options())),
        Output::Json => Ok(serde_json::to_string_pretty(&Report::new(
            &state,
            args.options(),
        ))?),
    }
}

fn run(args: &Args) -> Result<String, Error> {
    let input = match &args.state {
        Some(state) => state.clone(),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    render(args, &input)
}

fn main() -> ExitCode {
    // Keep stdout for the rendered state
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let args = Args::parse();
    match run(&args) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
