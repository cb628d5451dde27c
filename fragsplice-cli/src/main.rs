mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use config::{ConfigMerger, MergedConfig};
use fragsplice_core::adapters::{CommandFormatter, NoopFormatter};
use fragsplice_core::ports::Formatter;
use fragsplice_core::{Dialect, FragspliceError, Invocation, Outcome, RunSettings};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "fragsplice",
    version,
    about = "Embed file bytes into host sources at recorded insertion points.",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the declaration an input file would be encoded as.
    Render(RenderArgs),
    /// Show the pending ledger for a host file.
    Status(StatusArgs),
    /// Discard a pending cycle for a host file.
    Reset(ResetArgs),
}

/// Arguments of a build-step invocation.
#[derive(Debug, Args)]
struct RunArgs {
    /// File to encode. Omit to record the end of the insertion list.
    input: Option<Utf8PathBuf>,

    /// Host source file that receives the fragments.
    #[arg(long = "file", env = "FRAGSPLICE_FILE")]
    target_file: Option<Utf8PathBuf>,

    /// 1-based line of the host the fragment is inserted before.
    #[arg(long = "line", env = "FRAGSPLICE_LINE")]
    target_line: Option<u64>,

    /// Last call for this host: splice the recorded fragments.
    #[arg(
        long = "final",
        env = "FRAGSPLICE_FINAL",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    final_call: bool,

    #[command(flatten)]
    common: CommonArgs,

    /// Skip the formatting pass after a splice.
    #[arg(long, default_value_t = false)]
    no_format: bool,
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Declaration syntax for fragments (rust or c).
    #[arg(long)]
    dialect: Option<Dialect>,

    /// Directory for ledger and fragment files (default: next to the host).
    #[arg(long)]
    work_dir: Option<Utf8PathBuf>,

    /// Config file (default: ./fragsplice.toml if present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// File to encode.
    input: Utf8PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Host source file.
    #[arg(long = "file", env = "FRAGSPLICE_FILE")]
    target_file: Utf8PathBuf,

    /// Output format.
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Args)]
struct ResetArgs {
    /// Host source file.
    #[arg(long = "file", env = "FRAGSPLICE_FILE")]
    target_file: Utf8PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:#}", e);
        let code = e
            .downcast_ref::<FragspliceError>()
            .map_or(1, FragspliceError::exit_code);
        return ExitCode::from(code);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    // Stdout carries `render` and `status` output, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Some(Command::Render(args)) => cmd_render(args),
        Some(Command::Status(args)) => cmd_status(args),
        Some(Command::Reset(args)) => cmd_reset(args),
        None => cmd_run(cli.run),
    }
}

fn merged_config(common: &CommonArgs, no_format: bool) -> anyhow::Result<MergedConfig> {
    let file_config = match &common.config {
        Some(path) => config::load_config(path)?,
        None => config::load_or_default(Utf8Path::new(".")).context("load fragsplice.toml")?,
    };
    let merged =
        ConfigMerger::new(file_config).merge(common.dialect, common.work_dir.clone(), no_format);
    debug!(
        "merged config: dialect={}, work_dir={:?}, format_command={:?}",
        merged.dialect, merged.work_dir, merged.format_command
    );
    Ok(merged)
}

fn settings(merged: &MergedConfig) -> RunSettings {
    RunSettings {
        work_dir: merged.work_dir.clone(),
        dialect: merged.dialect,
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let Some(invocation) = Invocation::classify(
        args.input.as_deref(),
        args.target_file.as_deref(),
        args.target_line,
        args.final_call,
    )?
    else {
        debug!("no input and no target; nothing to do");
        return Ok(());
    };

    let merged = merged_config(&args.common, args.no_format)?;
    let formatter: Box<dyn Formatter> = match merged
        .format_command
        .as_deref()
        .and_then(CommandFormatter::from_command)
    {
        Some(cmd) => Box::new(cmd),
        None => Box::new(NoopFormatter),
    };

    let outcome = fragsplice_core::run(&invocation, &settings(&merged), formatter.as_ref())?;
    match outcome {
        Outcome::Recorded(entry) => debug!(%entry, "fragment recorded"),
        Outcome::Deferred(entry) => debug!(%entry, "sentinel recorded"),
        Outcome::Spliced(summary) => info!(
            host = %summary.host,
            plans = summary.plans,
            formatted = summary.formatted,
            "host rewritten"
        ),
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let merged = merged_config(&args.common, true)?;
    let fragment = fragsplice_encode::encode(&args.input, merged.dialect)?;
    print!("{}", fragment.text);
    Ok(())
}

fn cmd_status(args: StatusArgs) -> anyhow::Result<()> {
    let merged = merged_config(&args.common, true)?;
    let status = fragsplice_core::status(&args.target_file, &settings(&merged))?;

    match args.format {
        OutputFormat::Text => {
            println!("host:   {}", status.host);
            println!("ledger: {}", status.ledger);
            if status.entries.is_empty() {
                println!("no pending entries");
                return Ok(());
            }
            println!();
            println!("  {:<8} FRAGMENT", "LINE");
            for item in &status.entries {
                let note = match item.present {
                    Some(false) => "  (missing)",
                    _ => "",
                };
                println!("  {:<8} {}{}", item.entry.line, item.entry.fragment, note);
            }
            println!();
            if status.closed {
                println!("closed: the next final call splices these entries");
            } else {
                println!("open: awaiting more fragments");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&status).context("serialize status")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn cmd_reset(args: ResetArgs) -> anyhow::Result<()> {
    let merged = merged_config(&args.common, true)?;
    let removed = fragsplice_core::reset(&args.target_file, &settings(&merged))?;
    for path in &removed {
        println!("removed {}", path);
    }
    Ok(())
}
