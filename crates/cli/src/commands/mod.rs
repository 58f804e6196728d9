//! Command handlers, one module per product

mod pingdata;
mod pingmaps;
mod pingradar;
mod pingvision;
mod sovfixer;

pub use pingdata::{handle_pingdata_command, PingDataCommands};
pub use pingmaps::{handle_pingmaps_command, PingMapsCommands};
pub use pingradar::{handle_pingradar_command, PingRadarCommands};
pub use pingvision::{handle_pingvision_command, PingVisionCommands};
pub use sovfixer::{handle_sovfixer_command, SovFixerCommands};

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, ValueEnum};
use pingintel_domain::{ClientSettings, Environment, JobResult, JobSnapshot, ProductSpec};
use pingintel_infra::{ApiClient, DownloadTarget, OutputFetcher, OverwritePolicy};
use serde::Serialize;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Options shared by every command
pub struct Context {
    pub settings: ClientSettings,
    pub environment: Option<Environment>,
    pub api_url: Option<String>,
    pub auth_token: Option<String>,
    pub format: OutputFormat,
}

impl Context {
    /// Client for `spec`; command-line values win over loaded settings.
    pub fn client(&self, spec: ProductSpec) -> anyhow::Result<ApiClient> {
        let mut builder = ApiClient::builder(spec).settings(self.settings.clone());
        if let Some(environment) = self.environment {
            builder = builder.environment(environment);
        }
        if let Some(api_url) = &self.api_url {
            builder = builder.api_url(api_url.clone());
        }
        if let Some(token) = &self.auth_token {
            builder = builder.auth_token(token.clone());
        }
        builder.build().with_context(|| format!("Could not configure {} client", spec.product))
    }

    /// Print `value` as pretty JSON, or through `table` in table mode.
    pub fn emit<T, F>(&self, value: &T, table: F) -> anyhow::Result<()>
    where
        T: Serialize,
        F: FnOnce(&T),
    {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Table => table(value),
        }
        Ok(())
    }
}

/// Where and how job outputs are saved
#[derive(Debug, Clone, Args)]
pub struct DownloadArgs {
    /// Directory for downloaded outputs (default: current directory)
    #[arg(short = 'd', long)]
    pub output_dir: Option<PathBuf>,

    /// Download outputs without writing them to disk
    #[arg(long)]
    pub noop: bool,

    /// Overwrite existing files without asking
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Print one progress line per snapshot, skipping repeats.
pub fn progress_printer() -> impl FnMut(&JobSnapshot) {
    let mut last = String::new();
    move |snapshot: &JobSnapshot| {
        let line = snapshot.describe();
        if line != last {
            println!("  {}: {line}", snapshot.job_id);
            last = line;
        }
    }
}

/// Report a successful job and save its outputs, or fail with its message.
pub fn finish_job(
    ctx: &Context,
    client: &ApiClient,
    result: JobResult,
    download: &DownloadArgs,
) -> anyhow::Result<()> {
    if !result.is_success() {
        anyhow::bail!(
            "Job {} finished with {}: {}",
            result.job.id,
            result.snapshot.status(),
            result.message()
        );
    }
    ctx.emit(&result, |result| {
        println!("Job {} complete: {}", result.job.id, result.message());
    })?;
    save_outputs(client, &result, download, ctx.format == OutputFormat::Table)
}

fn save_outputs(
    client: &ApiClient,
    result: &JobResult,
    download: &DownloadArgs,
    verbose: bool,
) -> anyhow::Result<()> {
    for artifact in result.outputs() {
        let path = OutputFetcher::target_path(artifact, download.output_dir.as_deref())?;
        let replace = download.noop || download.yes || !path.exists() || confirm_overwrite(&path)?;
        let policy = if replace { OverwritePolicy::Always } else { OverwritePolicy::Skip };

        let report = OutputFetcher::new(client)
            .actually_write(!download.noop)
            .overwrite(policy)
            .fetch(artifact, DownloadTarget::Path(path))?;
        if !verbose {
            continue;
        }
        match (&report.path, report.skipped) {
            (Some(path), true) => println!("  Skipped {}", path.display()),
            (Some(path), false) => println!("  Wrote {} ({} bytes)", path.display(), report.bytes),
            (None, _) => {
                println!("  Fetched {} ({} bytes, not written)", report.filename, report.bytes)
            }
        }
    }
    Ok(())
}

/// Ask on stdin whether `path` may be replaced.
pub fn confirm_overwrite(path: &Path) -> anyhow::Result<bool> {
    print!("{} exists. Overwrite? [y/N] ", path.display());
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

/// Split `key=value`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("Expected key=value, got {raw}"))?;
    if key.trim().is_empty() {
        return Err(format!("Empty key in {raw}"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

/// Parse an optional JSON object argument.
pub fn parse_json_object(
    raw: Option<&str>,
    what: &str,
) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    match raw {
        None => Ok(serde_json::Map::new()),
        Some(raw) => match serde_json::from_str(raw) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => anyhow::bail!("{what} must be a JSON object"),
            Err(err) => Err(err).with_context(|| format!("Invalid JSON in {what}")),
        },
    }
}
