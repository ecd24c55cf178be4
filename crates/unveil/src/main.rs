//! pdf-unveil — locate content hidden under overlay objects in a PDF page.
//!
//! Three independent operations plus a combined run:
//! - `extract`: dump content streams to text files
//! - `step`: write truncated snapshots for bisecting the covering operator
//! - `remove`: comment out drawing operators and write a modified PDF
//! - `analyze`: all three in order

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use unveil_core::options::UnveilOptions;
use unveil_core::plan::StepMode;
use unveil_core::port::{Confirmation, FixedAnswer};
use unveil_pdf::remover::{RemoveRequest, Remover, SuppressStatus};
use unveil_pdf::stepper::{StepReport, StepRequest, Stepper};

#[derive(Parser)]
#[command(
    name = "pdf-unveil",
    version,
    about = "Find and reveal content hidden under PDF overlay objects"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Flate-compress content streams of written PDFs
    #[arg(long, global = true)]
    compress: bool,

    /// Planned snapshot count above which confirmation is required
    #[arg(long, global = true)]
    confirm_threshold: Option<usize>,

    /// Dump effective merged config as TOML and exit
    #[arg(long, global = true)]
    dump_config: bool,
}

#[derive(Args, Clone)]
struct RangeArgs {
    /// Target page (0-based)
    #[arg(short, long, default_value_t = 0)]
    page: usize,

    /// First line of the range
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Last line of the range (default: total line count)
    #[arg(long)]
    end: Option<usize>,
}

#[derive(Args, Clone)]
struct PlanArgs {
    /// Lines per step (ignored if --bins is set)
    #[arg(long)]
    step: Option<usize>,

    /// Divide the range into N equal steps
    #[arg(long, allow_negative_numbers = true)]
    bins: Option<i64>,

    /// Skip the confirmation prompt for large batches
    #[arg(short, long)]
    yes: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write each content stream to a text file
    Extract {
        input: PathBuf,

        /// Output directory (default: <input>_streams)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// One file per page with all streams joined
        #[arg(long)]
        join: bool,
    },

    /// Generate incremental truncated snapshots of a page
    Step {
        input: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        #[command(flatten)]
        plan: PlanArgs,

        /// Output directory (default: <input>_steps)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Comment out drawing operators on a page
    Remove {
        input: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        /// Line to suppress regardless of content (repeatable)
        #[arg(short = 'l', long = "line")]
        lines: Vec<usize>,

        /// Output file (default: <input>_rem.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Substring identifying the operator (default: " Do")
        #[arg(long)]
        operator: Option<String>,

        /// Regex over raw line bytes, replacing --operator
        #[arg(long)]
        regex: Option<String>,
    },

    /// Extract, step and remove in one run
    Analyze {
        input: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Write a sample PDF with text hidden under an image
    Sample {
        #[arg(default_value = "sample/target.pdf")]
        output: PathBuf,
    },
}

/// Load config from global and project-local TOML files.
/// Later files override earlier ones. Missing files are silently ignored.
fn load_config() -> UnveilOptions {
    let mut opts = UnveilOptions::default();

    // 1. Global config: ~/.config/pdf-unveil/config.toml
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("pdf-unveil").join("config.toml");
        if let Some(parsed) = read_config(&global_path) {
            opts = parsed;
        }
    }

    // 2. Project-local config: ./.pdf-unveil.toml
    if let Some(parsed) = read_config(Path::new(".pdf-unveil.toml")) {
        opts = parsed;
    }

    opts
}

fn read_config(path: &Path) -> Option<UnveilOptions> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<UnveilOptions>(&contents) {
        Ok(parsed) => {
            log::debug!("Loaded config from {}", path.display());
            Some(parsed)
        }
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

/// Apply flags that were given on the command line on top of the config.
fn apply_cli_overrides(opts: &mut UnveilOptions, cli: &Cli) {
    if cli.compress {
        opts.compress_output = true;
    }
    if let Some(threshold) = cli.confirm_threshold {
        opts.confirm_threshold = threshold;
    }
    if let Some(Commands::Remove {
        ref operator,
        ref regex,
        ..
    }) = cli.command
    {
        if let Some(op) = operator {
            opts.operator = op.clone();
        }
        if regex.is_some() {
            opts.operator_regex = regex.clone();
        }
    }
}

/// Asks on stderr and reads the answer from stdin.
struct PromptConfirmation;

impl Confirmation for PromptConfirmation {
    fn confirm(&self, planned: usize) -> bool {
        eprint!("Warning: Generate {} PDFs? (y/n): ", planned);
        io::stderr().flush().ok();
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
            Err(_) => false,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut opts = load_config();
    apply_cli_overrides(&mut opts, &cli);

    if cli.dump_config {
        match toml::to_string_pretty(&opts) {
            Ok(s) => {
                println!("{}", s);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
    }

    let Some(command) = cli.command else {
        eprintln!("Usage: pdf-unveil <extract|step|remove|analyze|sample> <input> [options]");
        process::exit(1);
    };

    if let Err(e) = run(command, &opts) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(command: Commands, opts: &UnveilOptions) -> Result<()> {
    match command {
        Commands::Extract {
            input,
            output,
            join,
        } => {
            let report = unveil_pdf::extract(&input, output.as_deref(), join)
                .with_context(|| format!("Extracting streams from {}", input.display()))?;
            log::info!("Success: Extracted streams to {}", report.output_dir.display());
        }
        Commands::Step {
            input,
            range,
            plan,
            output,
        } => {
            let request = step_request(&range, &plan, output, opts);
            let confirmation = confirmation_for(&plan);
            let report = Stepper::new(opts, confirmation.as_ref())
                .run(&input, &request)
                .with_context(|| format!("Stepping {}", input.display()))?;
            check_step_report(&report)?;
        }
        Commands::Remove {
            input,
            range,
            lines,
            output,
            ..
        } => {
            let request = RemoveRequest {
                page: range.page,
                start_line: range.start,
                end_line: range.end,
                target_lines: lines,
                output_path: output,
            };
            let remover = Remover::new(opts).context("Building operator matcher")?;
            let report = remover
                .run(&input, &request)
                .with_context(|| format!("Removing operators from {}", input.display()))?;
            if report.status == SuppressStatus::Modified {
                log::info!("Success: {}", report.output_path.display());
            }
        }
        Commands::Analyze { input, range, plan } => {
            let request = step_request(&range, &plan, None, opts);
            let confirmation = confirmation_for(&plan);
            let report = unveil_pdf::analyze(&input, &request, opts, confirmation.as_ref())
                .with_context(|| format!("Analyzing {}", input.display()))?;
            check_step_report(&report.step)?;
            log::info!("Analysis complete. Check the output files.");
        }
        Commands::Sample { output } => {
            unveil_pdf::sample::write_hidden_message(&output)
                .with_context(|| format!("Writing sample to {}", output.display()))?;
        }
    }
    Ok(())
}

fn step_mode(plan: &PlanArgs, opts: &UnveilOptions) -> StepMode {
    match plan.bins {
        Some(bins) => StepMode::Bins(bins),
        None => StepMode::Stride(plan.step.unwrap_or(opts.step)),
    }
}

fn step_request(
    range: &RangeArgs,
    plan: &PlanArgs,
    output_dir: Option<PathBuf>,
    opts: &UnveilOptions,
) -> StepRequest {
    StepRequest {
        page: range.page,
        start_line: range.start,
        end_line: range.end,
        mode: step_mode(plan, opts),
        output_dir,
    }
}

fn confirmation_for(plan: &PlanArgs) -> Box<dyn Confirmation> {
    if plan.yes {
        Box::new(FixedAnswer(true))
    } else {
        Box::new(PromptConfirmation)
    }
}

fn check_step_report(report: &StepReport) -> Result<()> {
    if let Some(first) = report.failures.first() {
        bail!(
            "{} of {} snapshots failed (first at cutoff {}: {})",
            report.failures.len(),
            report.failures.len() + report.written.len(),
            first.cutoff,
            first.error
        );
    }
    log::info!("Success: PDF steps generated in '{}'", report.output_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_step_mode_prefers_bins() {
        let opts = UnveilOptions::default();
        let cli = Cli::parse_from(["pdf-unveil", "step", "in.pdf", "--bins", "8", "--step", "5"]);
        match cli.command {
            Some(Commands::Step { plan, .. }) => {
                assert_eq!(step_mode(&plan, &opts), StepMode::Bins(8));
            }
            _ => panic!("expected step command"),
        }
    }

    #[test]
    fn test_step_defaults_from_config() {
        let opts = UnveilOptions {
            step: 250,
            ..UnveilOptions::default()
        };
        let cli = Cli::parse_from(["pdf-unveil", "step", "in.pdf", "-p", "2", "--end", "900"]);
        match cli.command {
            Some(Commands::Step {
                range,
                plan,
                output,
                ..
            }) => {
                let request = step_request(&range, &plan, output, &opts);
                assert_eq!(request.page, 2);
                assert_eq!(request.end_line, Some(900));
                assert_eq!(request.mode, StepMode::Stride(250));
                assert!(!plan.yes);
            }
            _ => panic!("expected step command"),
        }
    }

    #[test]
    fn test_negative_bins_parse() {
        let cli = Cli::parse_from(["pdf-unveil", "step", "in.pdf", "--bins", "-2"]);
        match cli.command {
            Some(Commands::Step { plan, .. }) => assert_eq!(plan.bins, Some(-2)),
            _ => panic!("expected step command"),
        }
    }

    #[test]
    fn test_remove_overrides() {
        let cli = Cli::parse_from([
            "pdf-unveil",
            "remove",
            "in.pdf",
            "-l",
            "3",
            "-l",
            "7",
            "--regex",
            "^/Im",
            "--compress",
        ]);
        let mut opts = UnveilOptions::default();
        apply_cli_overrides(&mut opts, &cli);
        assert!(opts.compress_output);
        assert_eq!(opts.operator_regex.as_deref(), Some("^/Im"));
        assert_eq!(opts.operator, " Do");
        match cli.command {
            Some(Commands::Remove { lines, .. }) => assert_eq!(lines, vec![3, 7]),
            _ => panic!("expected remove command"),
        }
    }

    #[test]
    fn test_bad_regex_reports_context() {
        let opts = UnveilOptions {
            operator_regex: Some("(unclosed".to_string()),
            ..UnveilOptions::default()
        };
        let command = Commands::Remove {
            input: PathBuf::from("in.pdf"),
            range: RangeArgs {
                page: 0,
                start: 0,
                end: None,
            },
            lines: Vec::new(),
            output: None,
            operator: None,
            regex: None,
        };
        let err = run(command, &opts).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("Building operator matcher: "), "{}", message);
        assert!(message.contains("Invalid operator pattern"), "{}", message);
    }

    #[test]
    fn test_read_config_ignores_bad_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let bad = tmp.path().join("bad.toml");
        std::fs::write(&bad, "step = \"many\"").unwrap();
        assert!(read_config(&bad).is_none());

        let good = tmp.path().join("good.toml");
        std::fs::write(&good, "progress_every = 5").unwrap();
        let opts = read_config(&good).unwrap();
        assert_eq!(opts.progress_every, 5);
        assert_eq!(opts.step, 1000);
    }
}
