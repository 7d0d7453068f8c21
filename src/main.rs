use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use anicompare::blast;
use anicompare::error::Result;
use anicompare::identity::ExtractionPolicy;
use anicompare::metrics::SourceKind;
use anicompare::pipeline::{self, Overrides};
use anicompare::settings::Settings;

#[derive(Parser)]
#[command(name = "anicompare", version, about = "Reconcile pairwise genome identity estimates")]
struct Cli {
    /// Configuration file (defaults to ./anicompare.toml when present).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Join two or three sources and export the merged differences.
    Compare(CompareArgs),
    /// Read one source and export its pairs in the semicolon extract format.
    Extract(ExtractArgs),
    /// Gather `.out` search result files below a folder into one report.
    Blast(BlastArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Start,
    Anywhere,
}

impl From<PolicyArg> for ExtractionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Start => ExtractionPolicy::Start,
            PolicyArg::Anywhere => ExtractionPolicy::Anywhere,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Dnadiff,
    Fastani,
    Mash,
}

#[derive(Args)]
struct InputArgs {
    /// Read the semicolon separated extract variant instead of raw tool output.
    #[arg(long)]
    extract: bool,
    /// Where the accession marker may appear in filename fields.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,
}

#[derive(Args)]
struct CompareArgs {
    /// Aligner summary file.
    #[arg(long, value_name = "FILE")]
    dnadiff: Option<PathBuf>,
    /// Directory of ANI estimator batches (or one file with --extract).
    #[arg(long, value_name = "PATH")]
    fastani: Option<PathBuf>,
    /// Sketch distance estimator file.
    #[arg(long, value_name = "FILE")]
    mash: Option<PathBuf>,
    /// Merged output, must not exist yet.
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Report of pairs missing from at least one source.
    #[arg(long, value_name = "FILE")]
    unmatched: Option<PathBuf>,
    /// Directory for the records whose codes could not be extracted.
    #[arg(long, value_name = "DIR")]
    unhandled_dir: Option<PathBuf>,
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args)]
struct ExtractArgs {
    #[arg(long, value_enum)]
    source: SourceArg,
    input: PathBuf,
    #[arg(long, short, value_name = "FILE")]
    output: PathBuf,
    #[command(flatten)]
    options: InputArgs,
}

#[derive(Args)]
struct BlastArgs {
    #[arg(long, default_value = ".")]
    root: PathBuf,
    #[arg(long, short, default_value = "resultados_blastn.csv")]
    output: PathBuf,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Dnadiff => SourceKind::DnaDiff,
            SourceArg::Fastani => SourceKind::FastAni,
            SourceArg::Mash => SourceKind::Mash,
        }
    }
}

impl InputArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            extract: self.extract,
            policy: self.policy.map(Into::into),
            ..Overrides::default()
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    match cli.command {
        Command::Compare(args) => {
            let sources = [
                (SourceKind::DnaDiff, args.dnadiff),
                (SourceKind::FastAni, args.fastani),
                (SourceKind::Mash, args.mash),
            ];
            Overrides {
                sources: sources
                    .into_iter()
                    .filter_map(|(source, path)| path.map(|p| (source, p)))
                    .collect(),
                output: args.output,
                unmatched: args.unmatched,
                unhandled_dir: args.unhandled_dir,
                ..args.input.overrides()
            }
            .apply(&mut settings);
            let summary = pipeline::compare(&settings)?;
            println!("{}", summary.to_json()?);
        }
        Command::Extract(args) => {
            args.options.overrides().apply(&mut settings);
            pipeline::extract_source(&settings, args.source.into(), &args.input, &args.output)?;
        }
        Command::Blast(args) => {
            let results = blast::collect(&args.root)?;
            if blast::write_report(&results, &args.output)?.is_none() {
                println!("no search results below {}", args.root.display());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
