//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Arena-backed fixed-branching N-ary trees with per-layer width tracking
#[derive(Parser, Debug)]
#[command(name = "cce-tree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a tree layer by layer and report its layer widths
    Build(BuildArgs),

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Maximum children per node (default: tree.branching_factor)
    #[arg(short, long)]
    pub branching: Option<usize>,

    /// Layers below the root for a complete tree (default: tree.depth)
    #[arg(short = 'D', long, conflicts_with = "fanout")]
    pub depth: Option<usize>,

    /// Children per node for each layer, e.g. 3,2,1
    #[arg(short, long, value_delimiter = ',')]
    pub fanout: Option<Vec<usize>>,

    /// Node slots per arena block (default: arena.block_nodes)
    #[arg(long)]
    pub block_nodes: Option<usize>,

    /// Maximum arena blocks (default: arena.max_blocks)
    #[arg(long)]
    pub max_blocks: Option<usize>,

    /// Print the tree
    #[arg(short, long)]
    pub show: bool,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show global config file location
    Path,
    /// Print a config template
    Template,
}
