//! Ping Radar command handlers

use std::io::Write;
use std::path::PathBuf;

use clap::Subcommand;
use pingintel_domain::PINGRADAR;
use pingintel_infra::{read_uploads, PingRadarClient, ReadinessPolicy};

use super::pingvision::{print_upload_summary, DocumentArgs};
use super::sovfixer::ActivityArgs;
use super::Context;

#[derive(Debug, Subcommand)]
pub enum PingRadarCommands {
    /// Create a submission from documents
    Create {
        /// Documents to submit
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
        /// Caller reference
        #[arg(short = 'c', long)]
        client_ref: Option<String>,
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
}

pub fn handle_pingradar_command(cmd: PingRadarCommands, ctx: &Context) -> anyhow::Result<()> {
    let client = PingRadarClient::new(ctx.client(PINGRADAR)?);

    match cmd {
        PingRadarCommands::Create { files, client_ref, wait } => {
            let uploads = read_uploads(&files)?;
            print_upload_summary(&uploads);
            let created = client.create_submission(uploads, client_ref.as_deref())?;
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
        PingRadarCommands::Get { pingid } => {
            let detail = client.submission_detail(&pingid)?;
            ctx.emit(&detail, |detail| {
                println!("id:     {}", detail.id.as_deref().unwrap_or(&pingid));
                println!("status: {}", detail.workflow_status.as_deref().unwrap_or("-"));
                for (key, value) in &detail.fields {
                    println!("{key}: {value}");
                }
            })
        }
        PingRadarCommands::Activity(args) => {
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
                    let documents: Vec<&str> =
                        row.documents.iter().map(|doc| doc.filename.as_str()).collect();
                    println!(
                        "{:<24} {:<20} {}",
                        row.id,
                        row.workflow_status_name.as_deref().unwrap_or("-"),
                        documents.join(", ")
                    );
                }
            })
        }
        PingRadarCommands::Download(args) => {
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
    }
}
