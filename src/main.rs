//! CLI entry point for tubemeta.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use tubemeta_core::util::unique_by;
use tubemeta_core::{
    BatchStats, FetchOptions, PlaylistFetcher, PlaylistRecord, VideoFetcher, run_batch,
};

mod cli;
mod output;

use cli::{Cli, Command};
use output::OutputWriter;

/// Process outcome, mapped to the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    /// Every id was extracted and written.
    Success,
    /// At least one id failed; the others were written.
    ItemsFailed,
    /// The batch itself could not run to completion.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(outcome: ProcessExit) -> Self {
        match outcome {
            ProcessExit::Success => Self::SUCCESS,
            ProcessExit::ItemsFailed => Self::from(1),
            ProcessExit::Failure => Self::from(2),
        }
    }
}

fn determine_exit_outcome(stats: BatchStats) -> ProcessExit {
    if stats.failed() == 0 {
        ProcessExit::Success
    } else {
        ProcessExit::ItemsFailed
    }
}

fn should_show_progress(stderr_is_terminal: bool, quiet: bool) -> bool {
    stderr_is_terminal && !quiet
}

fn default_log_level(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(default_log_level(cli.quiet, cli.verbose))
    });
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    debug!(?cli, "CLI arguments parsed");

    match run(cli).await {
        Ok(outcome) => outcome.into(),
        Err(failure) => {
            error!(error = %format!("{failure:#}"), "Unexpected error");
            ProcessExit::Failure.into()
        }
    }
}

async fn run(cli: Cli) -> Result<ProcessExit> {
    let args = cli.command.args();
    let mut options = FetchOptions::default()
        .with_chunk_size(usize::try_from(args.chunk_size)?)
        .with_timeouts(
            Duration::from_secs(args.connect_timeout),
            Duration::from_secs(args.read_timeout),
        );
    if let Some(base_url) = &args.base_url {
        options = options.with_origin(base_url.clone());
    }

    let writer = OutputWriter::new(cli.command.output_pattern(), args.pretty);
    let progress = progress_bar(
        args.ids.len(),
        should_show_progress(io::stderr().is_terminal(), cli.quiet),
    );
    let ids = args.ids.clone();
    let concurrency = usize::from(args.concurrency);

    info!(items = ids.len(), "tubemeta starting");

    let stats = match &cli.command {
        Command::Playlist(args) => {
            let unique = args.unique;
            drive(
                ids,
                concurrency,
                |id| {
                    let options = options.clone();
                    async move {
                        let fetched = PlaylistFetcher::over_http(options)?.fetch(&id).await;
                        let mut record = fetched.inspect_err(|failure| {
                            if failure.is_shape_error() {
                                warn!(
                                    id = %id,
                                    "Playlist page layout did not match; the site markup may have changed"
                                );
                            }
                        })?;
                        if unique {
                            dedupe_items(&mut record);
                        }
                        Ok::<_, tubemeta_core::PlaylistError>(record)
                    }
                },
                &writer,
                &progress,
            )
            .await?
        }
        Command::Video(_) => {
            drive(
                ids,
                concurrency,
                |id| {
                    let options = options.clone();
                    async move { VideoFetcher::over_http(options)?.fetch(&id).await }
                },
                &writer,
                &progress,
            )
            .await?
        }
    };

    progress.finish_and_clear();
    info!(
        completed = stats.completed(),
        failed = stats.failed(),
        total = stats.total(),
        "Batch complete"
    );
    Ok(determine_exit_outcome(stats))
}

/// Runs the batch, writing every successful record as it arrives.
async fn drive<T, E, F, Fut>(
    ids: Vec<String>,
    concurrency: usize,
    fetch: F,
    writer: &OutputWriter,
    progress: &ProgressBar,
) -> Result<BatchStats>
where
    T: Serialize,
    E: std::fmt::Display,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    run_batch(ids, concurrency, fetch, |id, result| {
        progress.set_message(id.to_string());
        progress.inc(1);
        match result {
            Ok(record) => progress.suspend(|| writer.write(id, &record)),
            Err(_) => Ok(()),
        }
    })
    .await
}

/// Drops repeated items by id; items without an id are always kept.
fn dedupe_items(record: &mut PlaylistRecord) {
    let items = std::mem::take(&mut record.items);
    record.items = unique_by(items.into_iter().enumerate(), |(index, item)| {
        item.id.clone().ok_or(*index)
    })
    .map(|(_, item)| item)
    .collect();
}

fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
