//! Ping Vision command handlers

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Subcommand};
use pingintel_domain::{SubmissionEventsQuery, SubmissionOptions, UploadFile, PINGVISION};
use pingintel_infra::{read_uploads, PingVisionClient, ReadinessPolicy};

use super::sovfixer::ActivityArgs;
use super::{confirm_overwrite, Context};

#[derive(Debug, Subcommand)]
pub enum PingVisionCommands {
    /// Create a submission from documents
    Create {
        /// Documents to submit
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
        /// Caller reference
        #[arg(short = 'c', long)]
        client_ref: Option<String>,
        /// Insured name
        #[arg(long)]
        insured_name: Option<String>,
        /// Team to assign
        #[arg(long)]
        team_uuid: Option<String>,
        /// Policy inception date (YYYY-MM-DD)
        #[arg(long)]
        inception_date: Option<NaiveDate>,
        /// Policy expiration date (YYYY-MM-DD)
        #[arg(long)]
        expiration_date: Option<NaiveDate>,
        /// Delegate processing to another team
        #[arg(long)]
        delegate_to_team: Option<String>,
        /// Wait until processing completes
        #[arg(short = 'w', long)]
        wait: bool,
    },
    /// Show one submission
    Get {
        /// Submission id
        pingid: String,
    },
    /// List submissions
    Activity(ActivityArgs),
    /// Download a submission document
    Download(DocumentArgs),
    /// List the workflow statuses of a division
    Statuses {
        /// Division short name
        division: String,
    },
    /// Move a submission to another workflow status
    ChangeStatus {
        /// Submission id
        pingid: String,
        /// Workflow status UUID
        status_uuid: String,
    },
    /// List the teams of the authenticated user
    Teams,
    /// List submission events
    Events {
        /// Only events of this submission
        #[arg(long)]
        pingid: Option<String>,
        /// Division short name
        #[arg(long)]
        division: Option<String>,
        /// Team UUID
        #[arg(long)]
        team: Option<String>,
        /// Events since (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        start: Option<NaiveDateTime>,
        /// Rows per page
        #[arg(short = 'n', long)]
        page_size: Option<u32>,
        /// Start after this cursor
        #[arg(long)]
        cursor_id: Option<String>,
        /// Follow cursors through every page
        #[arg(long)]
        all: bool,
    },
}

/// Document download arguments shared with Ping Radar
#[derive(Debug, Clone, Args)]
pub struct DocumentArgs {
    /// Submission id
    pub pingid: String,
    /// Document file name
    pub filename: String,
    /// Output path (default: the document's file name)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
    /// Overwrite an existing file without asking
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl DocumentArgs {
    /// Destination file, or `None` when the user declined to overwrite it.
    pub fn open_target(&self) -> anyhow::Result<Option<(PathBuf, File)>> {
        let path = match &self.output {
            Some(path) => path.clone(),
            None => Path::new(&self.filename)
                .file_name()
                .map(PathBuf::from)
                .context("Document file name is empty")?,
        };
        if path.exists() && !self.yes && !confirm_overwrite(&path)? {
            return Ok(None);
        }
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Some((path, file)))
    }
}

pub(crate) fn print_upload_summary(files: &[UploadFile]) {
    for file in files {
        println!("  {} ({} bytes)", file.filename, file.bytes.len());
    }
}

pub fn handle_pingvision_command(cmd: PingVisionCommands, ctx: &Context) -> anyhow::Result<()> {
    let client = PingVisionClient::new(ctx.client(PINGVISION)?);

    match cmd {
        PingVisionCommands::Create {
            files,
            client_ref,
            insured_name,
            team_uuid,
            inception_date,
            expiration_date,
            delegate_to_team,
            wait,
        } => {
            let uploads = read_uploads(&files)?;
            print_upload_summary(&uploads);
            let options = SubmissionOptions {
                client_ref,
                insured_name,
                team_uuid,
                inception_date,
                expiration_date,
                delegate_to_team,
            };
            let created = client.create_submission(uploads, &options)?;
            if !wait {
                return ctx.emit(&created, |created| println!("Created {}", created.id));
            }
            println!("Created {}, waiting for processing", created.id);
            let detail =
                client.wait_until_ready(&created.id, &ReadinessPolicy::default(), |detail| {
                    let status = detail.workflow_status.as_deref().unwrap_or("unknown");
                    tracing::info!(pingid = %created.id, status, "Submission status");
                })?;
            ctx.emit(&detail, |_| println!("Submission {} is ready", created.id))
        }
        PingVisionCommands::Get { pingid } => {
            let detail = client.submission_detail(&pingid)?;
            ctx.emit(&detail, |detail| {
                println!("id:     {}", detail.id.as_deref().unwrap_or(&pingid));
                println!("status: {}", detail.workflow_status.as_deref().unwrap_or("-"));
                for (key, value) in &detail.fields {
                    println!("{key}: {value}");
                }
            })
        }
        PingVisionCommands::Activity(args) => {
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
                        "{:<24} {:<20} {:<24} {}",
                        row.id,
                        row.workflow_status_name.as_deref().unwrap_or("-"),
                        row.division_name.as_deref().unwrap_or("-"),
                        row.created_time.as_deref().unwrap_or("-")
                    );
                }
            })
        }
        PingVisionCommands::Download(args) => {
            let url = client.document_url(&args.pingid, &args.filename);
            let Some((path, mut file)) = args.open_target()? else {
                println!("Skipped {}", args.filename);
                return Ok(());
            };
            let bytes = client.download_document(&url, &mut file)?;
            file.flush()?;
            println!("Wrote {} ({bytes} bytes)", path.display());
            Ok(())
        }
        PingVisionCommands::Statuses { division } => {
            let statuses = client.list_submission_statuses(&division)?;
            ctx.emit(&statuses, |statuses| {
                for status in statuses {
                    println!(
                        "{:<38} {}",
                        status.uuid.as_deref().unwrap_or("-"),
                        status.name.as_deref().unwrap_or("-")
                    );
                }
            })
        }
        PingVisionCommands::ChangeStatus { pingid, status_uuid } => {
            let response = client.change_status(&pingid, &status_uuid)?;
            ctx.emit(&response, |_| println!("Moved {pingid} to {status_uuid}"))
        }
        PingVisionCommands::Teams => {
            let teams = client.list_teams()?;
            ctx.emit(&teams, |teams| {
                for team in teams {
                    println!(
                        "{:<38} {}",
                        team.uuid.as_deref().unwrap_or("-"),
                        team.name.as_deref().unwrap_or("-")
                    );
                }
            })
        }
        PingVisionCommands::Events {
            pingid,
            division,
            team,
            start,
            page_size,
            cursor_id,
            all,
        } => {
            let query =
                SubmissionEventsQuery { pingid, division, team, start, cursor_id, page_size };
            let events = if all {
                let mut events = Vec::new();
                for page in client.event_pages(&query) {
                    events.extend(page?.results);
                }
                events
            } else {
                client.list_events(&query)?.results
            };
            ctx.emit(&events, |events| {
                for event in events {
                    println!("{event}");
                }
            })
        }
    }
}
