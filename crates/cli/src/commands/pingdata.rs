//! Ping Data command handlers

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Subcommand;
use pingintel_domain::{
    DataSource, EnhanceRequest, JobKind, JobOptions, LocationRecord, PINGDATA,
};
use pingintel_infra::PingDataClient;

use super::sovfixer::JobArgs;
use super::{finish_job, parse_key_value, progress_printer, Context, DownloadArgs};

#[derive(Debug, Subcommand)]
pub enum PingDataCommands {
    /// Enhance addresses synchronously
    Enhance {
        /// Address to enhance (repeatable)
        #[arg(short = 'a', long = "address", required = true)]
        addresses: Vec<String>,
        /// Data source code, e.g. GG (repeatable)
        #[arg(short = 's', long = "source", required = true)]
        sources: Vec<DataSource>,
        /// Server-side time budget in seconds
        #[arg(short = 't', long)]
        timeout: Option<f64>,
        /// Include each provider's raw response
        #[arg(long)]
        include_raw_response: bool,
        /// Extra location attribute as key=value (repeatable)
        #[arg(short = 'f', long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },
    /// Enhance a batch of locations as a background job
    BulkEnhance {
        /// JSON file holding an array of locations (each with an `id`)
        #[arg(short = 'i', long)]
        input: PathBuf,
        /// Data source code (repeatable)
        #[arg(short = 's', long = "source", required = true)]
        sources: Vec<DataSource>,
        /// URL notified when the job finishes
        #[arg(long)]
        callback_url: Option<String>,
        #[command(flatten)]
        job: JobArgs,
        #[command(flatten)]
        download: DownloadArgs,
    },
}

fn read_locations(path: &Path) -> anyhow::Result<Vec<LocationRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of locations", path.display()))
}

pub fn handle_pingdata_command(cmd: PingDataCommands, ctx: &Context) -> anyhow::Result<()> {
    let client = PingDataClient::new(ctx.client(PINGDATA)?);

    match cmd {
        PingDataCommands::Enhance {
            addresses,
            sources,
            timeout,
            include_raw_response,
            fields,
        } => {
            let request = EnhanceRequest {
                addresses,
                sources,
                timeout,
                include_raw_response,
                extra_location_fields: fields,
            };
            let response = client.enhance(&request)?;
            ctx.emit(&response, |response| {
                for (code, result) in &response.location_data {
                    let outcome = match (result.is_success, &result.error_message) {
                        (Some(false), Some(message)) => format!("failed: {message}"),
                        (Some(false), None) => "failed".to_string(),
                        _ => result.formatted_address.clone().unwrap_or_else(|| "ok".into()),
                    };
                    let coordinates = match (result.latitude, result.longitude) {
                        (Some(lat), Some(lng)) => format!("{lat:.6},{lng:.6}"),
                        _ => "-".to_string(),
                    };
                    println!("{code:<6} {coordinates:<24} {outcome}");
                }
            })
        }
        PingDataCommands::BulkEnhance { input, sources, callback_url, job, download } => {
            let records = read_locations(&input)?;
            let options = JobOptions { callback_url, ..job.options() };
            if job.no_wait {
                let started = client.bulk_enhance_start(records, sources, &options)?;
                return ctx.emit(&started, |started| println!("Started {}", started.id));
            }
            println!("Submitting {} location(s)", records.len());
            let policy = job.policy(client.api(), JobKind::BulkEnhance);
            let result =
                client.bulk_enhance(records, sources, &options, Some(policy), progress_printer())?;
            finish_job(ctx, client.api(), result, &download)
        }
    }
}
