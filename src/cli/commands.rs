//! Command dispatch

use std::io;

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{BuildRequest, TreeService};
use crate::cli::args::{BuildArgs, Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{TreeRender, MAX_RENDER_DEPTH};

pub fn execute(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Build(args)) => cmd_build(cli, args),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            clap_complete::generate(*shell, &mut Cli::command(), "cce-tree", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, try 'cce-tree --help'".into(),
        )),
    }
}

#[instrument(level = "debug", skip(cli))]
fn cmd_build(cli: &Cli, args: &BuildArgs) -> CliResult<()> {
    if args.fanout.as_ref().is_some_and(|f| f.is_empty()) {
        return Err(CliError::InvalidArgs("--fanout needs at least one value".into()));
    }

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(block_nodes) = args.block_nodes {
        settings.arena.block_nodes = block_nodes;
    }
    if let Some(max_blocks) = args.max_blocks {
        settings.arena.max_blocks = Some(max_blocks);
    }
    settings.validate()?;
    debug!("settings: {:?}", settings);

    let service = TreeService::new(settings);
    let request = BuildRequest {
        branching_factor: args.branching,
        depth: args.depth,
        fanouts: args.fanout.clone(),
    };
    let (mut tree, report) = service.build(&request)?;

    output::header(&format!("tree (b={})", report.branching_factor));
    output::action("layer widths", &report.layer_widths.iter().join(", "));
    output::detail(&format!("depth: {}", report.depth));
    output::detail(&format!("nodes: {}", report.node_count));
    output::detail(&format!("leaves: {}", report.leaf_count));
    output::detail(&format!(
        "arena: {} blocks, {} slots, {} bytes",
        report.arena.blocks, report.arena.capacity_nodes, report.arena.bytes_outstanding
    ));

    if args.show {
        if report.depth > MAX_RENDER_DEPTH {
            output::warning(&format!(
                "tree is {} levels deep, showing the first {MAX_RENDER_DEPTH}",
                report.depth
            ));
        }
        output::info(&tree.to_tree_string());
    }

    let released = service.release(&mut tree)?;
    output::success(&format!(
        "released {} nodes ({} bytes)",
        released.allocated_nodes, released.bytes_outstanding
    ));
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory available"),
        },
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
