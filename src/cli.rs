use crate::classify::BugfixMatcher;
use crate::filter::FilterOptions;
use crate::hotspot::{HotspotQuery, DEFAULT_TOP};
use crate::report::Format;
use anyhow::Result;
use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bugspot")]
#[command(about = "Rank bug-prone files by how often they change and how often they get fixed")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, action = ArgAction::Count, global = true, help = "Increase log verbosity (-v info, -vv debug)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Only print errors and results")]
    pub quiet: bool,

    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
pub struct CommonArgs {
    #[arg(long, global = true, env = "BUGSPOT_REPO", help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(long, global = true, env = "BUGSPOT_CACHE", help = "Directory for the commit cache database")]
    pub cache: Option<PathBuf>,

    #[arg(long, global = true, env = "BUGSPOT_SINCE", help = "Only commits on or after this date (YYYY-MM-DD or RFC3339)")]
    pub since: Option<String>,

    #[arg(long, global = true, env = "BUGSPOT_UNTIL", help = "Only commits on or before this date (YYYY-MM-DD or RFC3339)")]
    pub until: Option<String>,

    #[arg(long = "ext", global = true, env = "BUGSPOT_EXT", help = "Only files with this extension (e.g. py or .py)")]
    pub extension: Option<String>,

    #[arg(
        long = "keyword",
        global = true,
        value_delimiter = ',',
        help = "Only commits whose message contains one of these keywords"
    )]
    pub keywords: Vec<String>,

    #[arg(
        long = "bugfix-keyword",
        global = true,
        value_delimiter = ',',
        help = "Replace the default bugfix keywords (fix, bug, error, correction, bug-fix, bugfix)"
    )]
    pub bugfix_keywords: Vec<String>,
}

impl CommonArgs {
    pub fn query(&self, top: Option<usize>, time_series: bool) -> HotspotQuery {
        HotspotQuery {
            filters: FilterOptions {
                since: self.since.clone(),
                until: self.until.clone(),
                extension: self.extension.clone(),
                keywords: self.keywords.clone(),
            },
            bugfix: BugfixMatcher::with_keywords(&self.bugfix_keywords),
            top,
            time_series,
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct OutputArgs {
    #[arg(long, help = "Output as JSON", conflicts_with_all = ["ndjson", "csv"])]
    pub json: bool,

    #[arg(long, help = "Output as NDJSON", conflicts_with = "csv")]
    pub ndjson: bool,

    #[arg(long, help = "Output as CSV")]
    pub csv: bool,

    #[arg(short, long, help = "Write the report to this file instead of stdout")]
    pub output: Option<PathBuf>,
}

impl OutputArgs {
    pub fn format(&self) -> Format {
        if self.json {
            Format::Json
        } else if self.ndjson {
            Format::Ndjson
        } else if self.csv {
            Format::Csv
        } else {
            Format::Table
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank files by bugfix and modification counts
    Scan {
        #[arg(
            short = 'n',
            long,
            default_value_t = DEFAULT_TOP,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..),
            help = "Number of files to show"
        )]
        top: usize,

        #[clap(flatten)]
        output: OutputArgs,
    },
    /// Count qualifying file changes per month
    Trend {
        #[clap(flatten)]
        output: OutputArgs,
    },
    /// Group hotspot counts by file extension
    Extensions {
        #[clap(flatten)]
        output: OutputArgs,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        let quiet = self.quiet;
        match self.command {
            Commands::Scan { top, output } => crate::scan::exec(&self.common, top, &output, quiet),
            Commands::Trend { output } => crate::trend::exec(&self.common, &output, quiet),
            Commands::Extensions { output } => crate::extensions::exec(&self.common, &output, quiet),
        }
    }
}
