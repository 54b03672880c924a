//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::report::format_coords;
use crate::application::RecordPolicy;
use crate::cli::args::{Cli, Commands, InputArgs, RecordArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let config_dir = resolve_config_dir(cli.config_dir.as_deref())?;
    let settings = Settings::load(Some(&config_dir))?;
    debug!(?settings, "settings loaded");
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Run {
            input,
            output: output_path,
            stdout,
        } => _run(&container, input, output_path.as_deref(), *stdout),
        Commands::Tree { input, at } => _tree(&container, input, *at),
        Commands::Frontier { file, records } => _frontier(&container, file, records),
        Commands::Config => _config(&container, &config_dir),
        Commands::Completion { .. } => Ok(()),
    }
}

fn resolve_config_dir(explicit: Option<&Path>) -> CliResult<PathBuf> {
    match explicit {
        Some(dir) if !dir.is_dir() => Err(CliError::InvalidArgs(format!(
            "not a directory: {}",
            dir.display()
        ))),
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine working directory", e).into()),
    }
}

fn resolve_records(
    settings: &Settings,
    coords: &Path,
    records: &RecordArgs,
) -> CliResult<(usize, RecordPolicy)> {
    let dimension = records
        .dimension
        .unwrap_or_else(|| settings.resolve_dimension(coords));
    if dimension == 0 {
        return Err(CliError::InvalidArgs(
            "--dimension must be at least 1".to_string(),
        ));
    }
    let policy = if records.lenient {
        RecordPolicy::Lenient
    } else {
        settings.record_policy()
    };
    Ok((dimension, policy))
}

#[instrument(skip(container))]
fn _run(
    container: &ServiceContainer,
    input: &InputArgs,
    output_path: Option<&Path>,
    stdout: bool,
) -> CliResult<()> {
    let (dimension, policy) = resolve_records(&container.settings, &input.coords, &input.records)?;
    let dataset = container
        .skyline
        .load(&input.coords, &input.times, dimension, policy)?;

    let summary = if stdout {
        let mut lock = io::stdout().lock();
        container.skyline.replay(dataset, &mut lock)?
    } else {
        let path = output_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| container.settings.output.clone());
        let summary = container.skyline.replay_to_file(dataset, &path)?;
        output::action(
            "Wrote",
            &format!("{} ticks to {}", summary.ticks, path.display()),
        );
        summary
    };

    if summary.stats.skipped > 0 {
        output::warning(&format!("{} records skipped", summary.stats.skipped));
    }
    if summary.stats.unscheduled > 0 {
        output::warning(&format!(
            "{} points have no lifetime record",
            summary.stats.unscheduled
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, input: &InputArgs, at: Option<i64>) -> CliResult<()> {
    let (dimension, policy) = resolve_records(&container.settings, &input.coords, &input.records)?;
    let dataset = container
        .skyline
        .load(&input.coords, &input.times, dimension, policy)?;

    let view = container.skyline.hierarchy(dataset, at);
    match view.tick {
        Some(tick) => output::header(&format!(
            "Tick {}: {} active, {} on skyline, depth {}",
            tick,
            view.tree.len(),
            view.tree.skyline().len(),
            view.tree.depth()
        )),
        None => output::header("No tick reached"),
    }
    output::info(&view.tree.to_tree_string());
    Ok(())
}

#[instrument(skip(container))]
fn _frontier(container: &ServiceContainer, file: &Path, records: &RecordArgs) -> CliResult<()> {
    let dimension = records.dimension.or(container.settings.dimension);
    if dimension == Some(0) {
        return Err(CliError::InvalidArgs(
            "--dimension must be at least 1".to_string(),
        ));
    }
    let policy = if records.lenient {
        RecordPolicy::Lenient
    } else {
        container.settings.record_policy()
    };

    let result = container.skyline.frontier(file, dimension, policy)?;
    output::header(&format!(
        "Frontier: {} of {} points (dimension {})",
        result.cache.len(),
        result.offered,
        result.dimension
    ));
    for point in result.cache.points() {
        output::detail(&format!("{:>6}  {}", point.id().ordinal(), format_coords(point)));
    }
    Ok(())
}

fn _config(container: &ServiceContainer, config_dir: &Path) -> CliResult<()> {
    let rendered = container.settings.to_toml()?;
    if let Some(global) = global_config_path() {
        output::detail(&format!("global: {}", global.display()));
    }
    output::detail(&format!("local:  {}", local_config_path(config_dir).display()));
    output::info(&rendered);
    Ok(())
}
