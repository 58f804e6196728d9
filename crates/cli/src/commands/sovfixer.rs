//! SOV Fixer command handlers

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use pingintel_core::PollPolicy;
use pingintel_domain::{
    ActivityOrigin, ActivityQuery, ActivityStatus, JobKind, JobOptions, SOVFIXER,
};
use pingintel_infra::{read_uploads, ApiClient, SovFixerClient};
use serde_json::Value;

use super::{finish_job, parse_json_object, progress_printer, Context, DownloadArgs};

#[derive(Debug, Subcommand)]
pub enum SovFixerCommands {
    /// Upload documents for parsing and download the outputs
    Fix {
        /// Documents to parse
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
        /// Document type hint (e.g. SOV)
        #[arg(short = 't', long)]
        document_type: Option<String>,
        #[command(flatten)]
        job: JobArgs,
        /// Integrations to notify (repeatable)
        #[arg(long = "integration")]
        integrations: Vec<String>,
        /// Delegate the parse to another organization
        #[arg(long)]
        delegate_to: Option<String>,
        /// URL notified when the job finishes
        #[arg(long)]
        callback_url: Option<String>,
        #[command(flatten)]
        download: DownloadArgs,
    },
    /// List recent SOV activity
    Activity(ActivityArgs),
    /// Regenerate the outputs of a parsed SOV
    Reoutput {
        /// SOV id
        sovid: String,
        /// Revised location files
        #[arg(short = 'l', long = "locations", value_name = "FILE")]
        location_files: Vec<PathBuf>,
        #[command(flatten)]
        job: JobArgs,
        #[command(flatten)]
        download: DownloadArgs,
    },
    /// Update a parsed SOV with new locations and metadata
    Update {
        /// SOV id
        sovid: String,
        /// Revised location files
        #[arg(short = 'l', long = "locations", value_name = "FILE")]
        location_files: Vec<PathBuf>,
        /// Metadata changes as a JSON object
        #[arg(short = 'm', long)]
        metadata: Option<String>,
        #[command(flatten)]
        job: JobArgs,
        #[command(flatten)]
        download: DownloadArgs,
    },
}

/// Options shared by the job-starting commands
#[derive(Debug, Clone, Args)]
pub struct JobArgs {
    /// Output formats to produce (repeatable)
    #[arg(short = 'o', long = "output-format")]
    pub output_formats: Vec<String>,
    /// Caller reference stored with the job
    #[arg(short = 'c', long)]
    pub client_ref: Option<String>,
    /// Print the job id and exit without waiting
    #[arg(long)]
    pub no_wait: bool,
    /// Give up waiting after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl JobArgs {
    pub fn options(&self) -> JobOptions {
        JobOptions {
            client_ref: self.client_ref.clone(),
            ..JobOptions::default()
        }
        .with_output_formats(self.output_formats.iter().cloned())
    }

    /// Client policy for `kind`, with `--timeout` applied.
    pub fn policy(&self, client: &ApiClient, kind: JobKind) -> PollPolicy {
        let policy = client.poll_policy(kind);
        match self.timeout {
            Some(secs) => policy.with_timeout(Some(Duration::from_secs(secs))),
            None => policy,
        }
    }
}

/// Activity listing filters
#[derive(Debug, Clone, Args)]
pub struct ActivityArgs {
    /// Only this id
    #[arg(long)]
    pub id: Option<String>,
    /// Rows per page
    #[arg(short = 'n', long)]
    pub page_size: Option<u32>,
    /// Free-text search
    #[arg(short = 's', long)]
    pub search: Option<String>,
    /// Start after this cursor
    #[arg(long)]
    pub cursor_id: Option<String>,
    /// Fields to return (repeatable)
    #[arg(short = 'f', long = "field")]
    pub fields: Vec<String>,
    /// Origin filter (api, email); SOV Fixer only
    #[arg(long)]
    pub origin: Option<ActivityOrigin>,
    /// Status filter (P, I, E, R, C, F); SOV Fixer only
    #[arg(long)]
    pub status: Option<ActivityStatus>,
    /// Organization short name
    #[arg(long)]
    pub organization: Option<String>,
    /// Follow cursors through every page
    #[arg(long)]
    pub all: bool,
}

impl ActivityArgs {
    pub fn query(&self) -> ActivityQuery {
        ActivityQuery {
            id: self.id.clone(),
            cursor_id: self.cursor_id.clone(),
            prev_cursor_id: None,
            page_size: self.page_size,
            fields: self.fields.clone(),
            search: self.search.clone(),
            origin: self.origin,
            status: self.status,
            organization_short_name: self.organization.clone(),
        }
    }
}

pub fn handle_sovfixer_command(cmd: SovFixerCommands, ctx: &Context) -> anyhow::Result<()> {
    let client = SovFixerClient::new(ctx.client(SOVFIXER)?);

    match cmd {
        SovFixerCommands::Fix {
            files,
            document_type,
            job,
            integrations,
            delegate_to,
            callback_url,
            download,
        } => {
            let uploads = read_uploads(&files)?;
            let options = JobOptions {
                document_type,
                integrations: (!integrations.is_empty()).then_some(integrations),
                delegate_to,
                callback_url,
                ..job.options()
            };

            if job.no_wait {
                let started = client.fix_sov_start(uploads, &options)?;
                return ctx.emit(&started, |started| println!("Started {}", started.id));
            }
            println!("Uploading {} file(s)", files.len());
            let policy = job.policy(client.api(), JobKind::ParseDocument);
            let result = client.fix_sov(uploads, &options, Some(policy), progress_printer())?;
            finish_job(ctx, client.api(), result, &download)
        }
        SovFixerCommands::Activity(args) => {
            let query = args.query();
            let rows = if args.all {
                let mut rows = Vec::new();
                for page in client.activity_pages(&query) {
                    rows.extend(page?.results);
                }
                rows
            } else {
                client.list_activity(&query)?.results
            };
            ctx.emit(&rows, |rows| {
                for row in rows {
                    println!(
                        "{:<24} {:<12} {}",
                        row.id,
                        row.status.as_deref().unwrap_or("-"),
                        row.filename.as_deref().unwrap_or("-")
                    );
                }
            })
        }
        SovFixerCommands::Reoutput { sovid, location_files, job, download } => {
            let uploads = read_uploads(&location_files)?;
            let options = job.options();
            if job.no_wait {
                let started = client.reoutput_start(&sovid, uploads, &options)?;
                return ctx.emit(&started, |started| println!("Started {}", started.id));
            }
            let policy = job.policy(client.api(), JobKind::RegenerateOutput);
            let result =
                client.reoutput(&sovid, uploads, &options, Some(policy), progress_printer())?;
            finish_job(ctx, client.api(), result, &download)
        }
        SovFixerCommands::Update { sovid, location_files, metadata, job, download } => {
            let uploads = read_uploads(&location_files)?;
            let metadata = parse_json_object(metadata.as_deref(), "--metadata")?;
            let options = job.options().with_extra("metadata", Value::Object(metadata));
            if job.no_wait {
                let started = client.update_start(&sovid, uploads, &options)?;
                return ctx.emit(&started, |started| println!("Started {}", started.id));
            }
            let policy = job.policy(client.api(), JobKind::Update);
            let result =
                client.update(&sovid, uploads, &options, Some(policy), progress_printer())?;
            finish_job(ctx, client.api(), result, &download)
        }
    }
}
