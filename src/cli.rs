use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::ArgAction;
use coursematch::{
    audit::DEFAULT_HEADING_LOOKBACK, AuditParser, DegreeAudit, OpenSection, PrereqIndex, Ranker,
    WeightedGpaTable,
};
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run()
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Parse degree-audit text into JSON
    Parse(Parse),

    /// Build a prerequisite index from catalog records
    Index(Index),

    /// Aggregate semester grade rows into weighted GPA per course and instructor
    WeightGpa(WeightGpa),

    /// Rank open sections against a parsed audit
    Recommend(Recommend),
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Parse(command) => command.run(),
            Self::Index(command) => command.run(),
            Self::WeightGpa(command) => command.run(),
            Self::Recommend(command) => command.run(),
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct Parse {
    /// Audit text file, one report line per line
    #[arg(long, short)]
    input: PathBuf,

    /// Where to write the JSON (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Lines scanned above each NEEDS: marker for its heading
    #[arg(long, default_value_t = DEFAULT_HEADING_LOOKBACK)]
    lookback: usize,
}

impl Parse {
    #[instrument]
    fn run(self) -> anyhow::Result<()> {
        let audit = AuditParser::new()
            .heading_lookback(self.lookback)
            .parse_file(&self.input)
            .with_context(|| format!("failed to read audit {}", self.input.display()))?;
        tracing::info!(
            requirements = audit.requirements_needed.len(),
            "parsed {}",
            self.input.display()
        );
        emit(&audit.to_json_pretty()?, self.output.as_deref())
    }
}

#[derive(Debug, clap::Args)]
pub struct Index {
    /// JSON array of course records, or an existing index
    #[arg(long, short)]
    input: PathBuf,

    /// Where to write the index JSON (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also write the binary cache to this path
    #[cfg(feature = "binary-cache")]
    #[arg(long)]
    cache: Option<PathBuf>,
}

impl Index {
    #[instrument]
    fn run(self) -> anyhow::Result<()> {
        let index = PrereqIndex::from_file(&self.input)
            .with_context(|| format!("failed to load course records {}", self.input.display()))?;
        tracing::info!(entries = index.len(), "built prerequisite index");

        #[cfg(feature = "binary-cache")]
        if let Some(cache) = &self.cache {
            index
                .save_cache(cache)
                .with_context(|| format!("failed to write cache {}", cache.display()))?;
        }

        emit(&index.to_json_pretty()?, self.output.as_deref())
    }
}

#[derive(Debug, clap::Args)]
pub struct WeightGpa {
    /// JSON array of semester grade rows
    #[arg(long, short)]
    input: PathBuf,

    /// Where to write the weighted table (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl WeightGpa {
    #[instrument]
    fn run(self) -> anyhow::Result<()> {
        let table = WeightedGpaTable::from_file(&self.input)
            .with_context(|| format!("failed to load grade rows {}", self.input.display()))?;
        tracing::info!(pairs = table.len(), "weighted GPA table ready");
        emit(&table.to_json_pretty()?, self.output.as_deref())
    }
}

#[derive(Debug, clap::Args)]
pub struct Recommend {
    /// Parsed audit JSON (output of `parse`)
    #[arg(long, short)]
    audit: PathBuf,

    /// JSON array of open sections
    #[arg(long, short)]
    sections: PathBuf,

    /// Prerequisite index JSON or course records; no prerequisites when omitted
    #[arg(long, short)]
    prereqs: Option<PathBuf>,

    /// Weighted GPA table JSON; every section scores 0 when omitted
    #[arg(long, short)]
    gpa: Option<PathBuf>,

    /// Write JSON here instead of printing a summary
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl Recommend {
    #[instrument]
    fn run(self) -> anyhow::Result<()> {
        let audit = DegreeAudit::from_file(&self.audit)
            .with_context(|| format!("failed to load audit {}", self.audit.display()))?;
        let sections = OpenSection::list_from_file(&self.sections)
            .with_context(|| format!("failed to load sections {}", self.sections.display()))?;
        let prereqs = match &self.prereqs {
            Some(path) => load_prereqs(path)?,
            None => PrereqIndex::new(),
        };
        let gpa = match &self.gpa {
            Some(path) => WeightedGpaTable::from_file(path)
                .with_context(|| format!("failed to load GPA table {}", path.display()))?,
            None => WeightedGpaTable::new(),
        };

        let recommendations = Ranker::new(&sections, &prereqs, &gpa).recommend(&audit);
        match self.output.as_deref() {
            Some(path) => {
                let json = serde_json::to_string_pretty(&recommendations)?;
                emit(&json, Some(path))
            }
            None => {
                print!("{recommendations}");
                Ok(())
            }
        }
    }
}

#[cfg(feature = "binary-cache")]
fn load_prereqs(path: &Path) -> anyhow::Result<PrereqIndex> {
    if path.extension().is_some_and(|ext| ext == "bin") {
        return PrereqIndex::load_cache(path)
            .with_context(|| format!("failed to load prerequisite cache {}", path.display()));
    }
    PrereqIndex::from_file(path)
        .with_context(|| format!("failed to load prerequisites {}", path.display()))
}

#[cfg(not(feature = "binary-cache"))]
fn load_prereqs(path: &Path) -> anyhow::Result<PrereqIndex> {
    PrereqIndex::from_file(path)
        .with_context(|| format!("failed to load prerequisites {}", path.display()))
}

fn emit(json: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Saved to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
