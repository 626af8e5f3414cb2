/// Command-line arguments and their translation into a [`Config`].
use anyhow::Context;
use clap::{Parser, ValueEnum};
use shadowsleuth_core::scanner::HashAlgorithm;
use shadowsleuth_core::{Config, Zone};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Report on every file of every shadow copy.
    Full,
    /// Baseline report plus reports of files created after it.
    Compare,
}

#[derive(Debug, Parser)]
#[command(
    name = "ShadowSleuth",
    version,
    about = "Walks every file in every Volume Shadow Copy and writes hash/MAC-time reports"
)]
pub struct Cli {
    /// List every Volume Shadow Copy on the current volume.
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Process all shadow copies or compare them against a baseline.
    #[arg(short = 'p', long)]
    pub parse: bool,

    /// Derive chart data from the generated reports.
    #[arg(short = 'v', long)]
    pub visualize: bool,

    /// Processing mode; prompted for when omitted.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Baseline shadow copy number (1-based, as shown by --list).
    #[arg(long)]
    pub baseline: Option<usize>,

    /// Read the shadow copy listing from a file instead of running vssadmin.
    #[arg(long, value_name = "FILE")]
    pub listing: Option<PathBuf>,

    /// Output directory for reports.
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Digest algorithm (md5 or sha256).
    #[arg(long)]
    pub hash: Option<HashAlgorithm>,

    /// Read and write timestamps in UTC instead of local time.
    #[arg(long)]
    pub utc: bool,

    /// Only walk this sub-directory of each shadow copy (e.g. Users).
    #[arg(long, value_name = "DIR")]
    pub subpath: Option<PathBuf>,

    /// File types to chart, comma separated (e.g. jpg,png,pdf).
    #[arg(long, value_delimiter = ',')]
    pub filetypes: Vec<String>,

    /// JSON configuration file; flags override its values.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse the process arguments.
    pub fn from_env() -> Self {
        Self::parse()
    }

    /// Whether any action was requested.
    pub fn has_action(&self) -> bool {
        self.list || self.parse || self.visualize
    }

    /// Build the run configuration: file (if any), then flag overrides.
    pub fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(hash) = self.hash {
            config.hash = hash;
        }
        if self.utc {
            config.time_zone = Zone::Utc;
        }
        if let Some(subpath) = &self.subpath {
            config.walk_subpath = Some(subpath.clone());
        }
        Ok(config)
    }

    /// Chart type filter, or `None` for every type.
    pub fn type_filter(&self) -> Option<&[String]> {
        (!self.filetypes.is_empty()).then_some(self.filetypes.as_slice())
    }
}
