use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use kitforge_core::{
    run_generate, run_migrate, run_substitute, BatchReport, GenerationPlan, Indent, PipelineOptions,
    Result, SubstitutionTable, LOADOUTS_ROOT, PROCESSING_ROOT,
};

#[derive(Debug, Parser)]
#[command(name = "kitforge", version, about = "Ground Branch AI loadout kit tool")]
struct Args {
    /// Log every substitution and skipped file.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum IndentArg {
    Tab,
    Spaces,
}

impl From<IndentArg> for Indent {
    fn from(value: IndentArg) -> Self {
        match value {
            IndentArg::Tab => Indent::Tab,
            IndentArg::Spaces => Indent::Spaces,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Expand `<prefix>-template.json` files into numbered `.kit` variants.
    Generate {
        /// Generation plan; the stock Narcos plan is used when omitted.
        #[arg(long, value_name = "JSON")]
        plan: Option<PathBuf>,

        /// Directory template prefixes are resolved against.
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = IndentArg::Spaces)]
        indent: IndentArg,

        #[arg(long)]
        dry_run: bool,
    },

    /// Upgrade version 10 kits under DIR to version 11 in place.
    Migrate {
        #[arg(value_name = "DIR", default_value = LOADOUTS_ROOT)]
        dir: PathBuf,

        #[arg(long, value_enum, default_value_t = IndentArg::Tab)]
        indent: IndentArg,

        #[arg(long)]
        dry_run: bool,
    },

    /// Replace equipment items throughout every kit under DIR in place.
    Substitute {
        #[arg(value_name = "DIR", default_value = PROCESSING_ROOT)]
        dir: PathBuf,

        /// Substitution table; the stock swaps are used when omitted.
        #[arg(long, value_name = "JSON")]
        table: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = IndentArg::Tab)]
        indent: IndentArg,

        #[arg(long)]
        dry_run: bool,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn options(indent: IndentArg, dry_run: bool) -> PipelineOptions {
    PipelineOptions {
        indent: indent.into(),
        dry_run,
    }
}

fn run(command: Command) -> Result<BatchReport> {
    match command {
        Command::Generate {
            plan,
            root,
            indent,
            dry_run,
        } => {
            let plan = match plan {
                Some(path) => GenerationPlan::load(&path)?,
                None => GenerationPlan::builtin(),
            };
            run_generate(&plan, root.as_deref(), options(indent, dry_run))
        }
        Command::Migrate {
            dir,
            indent,
            dry_run,
        } => run_migrate(&dir, options(indent, dry_run)),
        Command::Substitute {
            dir,
            table,
            indent,
            dry_run,
        } => {
            let table = match table {
                Some(path) => SubstitutionTable::load(&path)?,
                None => SubstitutionTable::builtin(),
            };
            info!(entries = table.len(), "substitution table loaded");
            for item in table.items() {
                debug!(item, "will replace");
            }
            run_substitute(&dir, &table, options(indent, dry_run))
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(args.command) {
        Ok(report) => info!(
            seen = report.files_seen,
            written = report.files_written,
            substitutions = report.substitutions,
            "done"
        ),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
