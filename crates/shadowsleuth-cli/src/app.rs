/// Drives one invocation: listing, processing and visualisation.
///
/// Input and output are generic so the whole flow, prompts included, can
/// be exercised with in-memory buffers.
use crate::args::{Cli, ModeArg};
use crate::failure_log::JsonLinesSink;
use crate::prompt;
use crate::render::{self, ProgressLine};
use anyhow::Context;
use shadowsleuth_core::platform::{capture_listing, is_elevated};
use shadowsleuth_core::report::{summarise_directory, write_visualisation};
use shadowsleuth_core::{
    start_session, Config, Failure, FailureSink, RunMode, SessionSummary, SnapshotCatalog,
    TimeCodec, TracingSink,
};
use std::fs;
use std::io::{BufRead, Write};
use tracing::{info, warn};

pub struct App<R, W> {
    cli: Cli,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> App<R, W> {
    pub fn new(cli: Cli, input: R, out: W) -> Self {
        Self { cli, input, out }
    }

    /// Run every requested action in order: list, parse, visualize.
    pub fn run(&mut self) -> anyhow::Result<()> {
        if !self.cli.has_action() {
            render::print_banner(&mut self.out)?;
            return Ok(());
        }
        let config = self.cli.resolve_config()?;

        if self.cli.list || self.cli.parse {
            let (catalog, issues) = self.load_catalog(&config)?;
            if self.cli.list {
                render::print_listing(&mut self.out, &catalog)?;
            }
            if self.cli.parse {
                self.process(&config, catalog, issues)?;
            } else {
                record_all(&mut TracingSink, issues);
            }
        }

        if self.cli.visualize {
            self.visualize(&config)?;
        }
        Ok(())
    }

    fn load_catalog(&mut self, config: &Config) -> anyhow::Result<(SnapshotCatalog, Vec<Failure>)> {
        let text = match &self.cli.listing {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("reading listing {}", path.display()))?,
            None => {
                if !is_elevated() {
                    warn!("Not running elevated; listing and reading shadow copies requires administrator rights");
                }
                capture_listing()?
            }
        };

        let codec = TimeCodec::new(config.time_zone);
        let (catalog, issues) = SnapshotCatalog::from_listing(&text, &codec)?;
        info!("Catalog holds {} snapshots", catalog.len());
        let issues = issues.iter().map(|issue| issue.to_failure()).collect();
        Ok((catalog, issues))
    }

    fn select_mode(&mut self, catalog: &SnapshotCatalog) -> anyhow::Result<RunMode> {
        let mode = match self.cli.mode {
            Some(mode) => mode,
            None => prompt::prompt_mode(&mut self.input, &mut self.out)?,
        };
        Ok(match mode {
            ModeArg::Full => RunMode::Full,
            ModeArg::Compare => {
                let baseline = match self.cli.baseline {
                    Some(choice) => prompt::baseline_index(choice, catalog.len())?,
                    None => prompt::prompt_baseline(&mut self.input, &mut self.out, catalog)?,
                };
                RunMode::Compare { baseline }
            }
        })
    }

    fn process(
        &mut self,
        config: &Config,
        catalog: SnapshotCatalog,
        issues: Vec<Failure>,
    ) -> anyhow::Result<SessionSummary> {
        let mode = self.select_mode(&catalog)?;
        let sink = JsonLinesSink::new(&config.output_dir);
        let log_path = sink.path().to_path_buf();

        let handle = start_session(config.clone(), catalog, mode, sink);
        let mut line = ProgressLine::new();
        for msg in handle.progress_rx.iter() {
            line.handle(&mut self.out, &msg)?;
        }

        let (summary, mut sink) = match handle.join() {
            Ok(done) => done,
            Err(err) => {
                record_all(&mut TracingSink, issues);
                return Err(err).context("processing shadow copies");
            }
        };
        record_all(&mut sink, issues);
        render::print_summary(&mut self.out, &summary, &log_path)?;
        if sink.recorded() > summary.error_count {
            writeln!(
                self.out,
                "{} listing entries skipped, see {}",
                sink.recorded() - summary.error_count,
                log_path.display()
            )?;
        }
        Ok(summary)
    }

    fn visualize(&mut self, config: &Config) -> anyhow::Result<()> {
        let mut sink = JsonLinesSink::new(&config.output_dir);
        let summaries = summarise_directory(
            &config.output_dir,
            &config.report_extension,
            self.cli.type_filter(),
            &mut sink,
        )
        .context("no reports to visualise; run with --parse first")?;

        if summaries.is_empty() {
            writeln!(
                self.out,
                "No .{} reports found in {}",
                config.report_extension,
                config.output_dir.display()
            )?;
            return Ok(());
        }
        let written_to = write_visualisation(&config.output_dir, &summaries)?;
        render::print_visualisation(&mut self.out, &summaries, &written_to)?;
        Ok(())
    }
}

fn record_all(sink: &mut dyn FailureSink, failures: Vec<Failure>) {
    for failure in failures {
        sink.record(failure);
    }
}
