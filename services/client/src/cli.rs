//! services/client/src/cli.rs
//!
//! Command-line surface: argument parsing and the per-command handlers that
//! drive the core orchestrators through the injected adapters.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::error::ClientError;
use crate::session::SessionManager;
use lep_inspect_core::aggregate::BatchAggregator;
use lep_inspect_core::domain::{BatchListQuery, ProcessingStatus};
use lep_inspect_core::pending::PendingSet;
use lep_inspect_core::ports::{
    FileTransfer, GpsReader, InspectionApi, ProgressSink, UploadEvent,
};
use lep_inspect_core::upload::UploadOrchestrator;

#[derive(Parser)]
#[command(name = "lep", about = "Power-line photo inspection client", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and start a session.
    Login {
        email: String,
        /// Read from the environment rather than the command line where
        /// possible.
        #[arg(long, env = "LEP_PASSWORD", hide_env_values = true)]
        password: String,
        /// Persist the session so later invocations resume it.
        #[arg(long)]
        remember: bool,
    },
    /// End the session and clear any persisted state.
    Logout,
    /// Show the authenticated user.
    Whoami,
    /// List the available detection models.
    Models,
    /// List batches in ascending id order, optionally filtered by upload date.
    Batches {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
        /// Inclusive lower bound, YYYY-MM-DD.
        #[arg(long)]
        date_from: Option<String>,
        /// Inclusive upper bound, YYYY-MM-DD.
        #[arg(long)]
        date_to: Option<String>,
    },
    /// Show one batch: status, damage summary, and a photo window.
    Batch {
        id: u64,
        /// 1-based thumbnail-grid page to print.
        #[arg(long)]
        grid_page: Option<usize>,
        /// 1-based detail-table page to print.
        #[arg(long, default_value_t = 1)]
        table_page: usize,
    },
    /// Delete a batch and all of its photos.
    Delete { id: u64 },
    /// Upload photos as a new batch and queue it for processing.
    Upload {
        /// Project name for the new batch.
        name: String,
        /// Image files or directories of images.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Detection model id; defaults to the first available model.
        #[arg(long)]
        model: Option<u64>,
    },
    /// Show global image-processing statistics.
    Stats,
}

/// Everything a command handler needs, wired once at startup.
pub struct AppContext {
    pub api: Arc<dyn InspectionApi>,
    pub transfer: Arc<dyn FileTransfer>,
    pub gps: Arc<dyn GpsReader>,
    pub session: Arc<SessionManager>,
}

pub async fn run(cli: Cli, ctx: AppContext) -> Result<(), ClientError> {
    match cli.command {
        Command::Login {
            email,
            password,
            remember,
        } => {
            let user = ctx.session.login(&email, &password, remember).await?;
            println!("logged in as {} {} <{}>", user.first_name, user.last_name, user.email);
        }
        Command::Logout => {
            ctx.session.logout().await;
            println!("logged out");
        }
        Command::Whoami => {
            require_session(&ctx)?;
            let user = ctx.api.whoami().await?;
            println!("{} {} <{}> (id {})", user.first_name, user.last_name, user.email, user.id);
        }
        Command::Models => {
            require_session(&ctx)?;
            for model in ctx.api.list_models().await? {
                println!("{:>4}  {}", model.id, model.name);
            }
        }
        Command::Batches {
            page,
            size,
            date_from,
            date_to,
        } => {
            require_session(&ctx)?;
            let query = BatchListQuery {
                page,
                size,
                date_from,
                date_to,
            };
            let listing = ctx.api.list_batches(&query).await?;
            println!("{} batch(es) total", listing.count);
            for batch in presented_batches(listing.results) {
                println!(
                    "{:>6}  {:<24}  {}  {:>5} photo(s)  {}",
                    batch.id,
                    batch.name,
                    batch.uploaded_at.format("%Y-%m-%d %H:%M"),
                    batch.photo_count,
                    batch.processing_status.label(),
                );
            }
            if listing.next.is_some() {
                println!("(more pages available)");
            }
        }
        Command::Batch {
            id,
            grid_page,
            table_page,
        } => {
            require_session(&ctx)?;
            let aggregator = BatchAggregator::new(Arc::clone(&ctx.api));
            let detail = aggregator.load(id).await?;
            print_status_rail(detail.status.processing_status);
            println!(
                "batch {} \"{}\", uploaded {}",
                detail.status.id,
                detail.status.name,
                detail.status.uploaded_at.format("%Y-%m-%d %H:%M"),
            );
            let summary = detail.view.damage_summary();
            println!(
                "{} photo(s): {} with damage, {} clean",
                summary.total, summary.with_damage, summary.without_damage
            );
            if let Some(grid_page) = grid_page {
                println!("-- grid page {grid_page} --");
                for photo in detail.view.grid_page(grid_page) {
                    let marker = if photo.has_damage() { "!" } else { " " };
                    println!("{marker} {:>6}  {}", photo.id, photo.file_key);
                }
            } else {
                println!("-- table page {table_page} --");
                for photo in detail.view.table_page(table_page) {
                    let labels: Vec<String> = photo
                        .detections
                        .iter()
                        .map(|d| format!("{} ({:.0}%)", d.label, d.confidence * 100.0))
                        .collect();
                    println!(
                        "{:>6}  {:<48}  {},{}  {}",
                        photo.id,
                        photo.file_key,
                        photo.latitude,
                        photo.longitude,
                        labels.join(", "),
                    );
                }
            }
        }
        Command::Delete { id } => {
            require_session(&ctx)?;
            ctx.api.delete_batch(id).await?;
            println!("batch {id} deleted");
        }
        Command::Upload { name, paths, model } => {
            require_session(&ctx)?;
            let model_id = match model {
                Some(id) => Some(id),
                None => {
                    let models = ctx.api.list_models().await?;
                    models.first().map(|m| m.id)
                }
            };

            let candidates = crate::ingest::collect_candidates(&paths, ctx.gps.as_ref())?;
            let mut pending = PendingSet::default();
            for candidate in candidates {
                pending.push(candidate);
            }

            let orchestrator =
                UploadOrchestrator::new(Arc::clone(&ctx.api), Arc::clone(&ctx.transfer));
            let outcome = orchestrator
                .submit(&name, model_id, &mut pending, &CliProgressSink)
                .await?;
            println!(
                "batch {} created, {} file(s) uploaded and queued for processing",
                outcome.batch_id, outcome.files_uploaded
            );
        }
        Command::Stats => {
            require_session(&ctx)?;
            let stats = ctx.api.batch_stats().await?;
            println!("total photos:  {}", stats.total);
            println!("processed:     {}", stats.processed);
            println!("not processed: {}", stats.not_processed);
        }
    }
    Ok(())
}

/// Batch rows are presented in ascending id order regardless of the order
/// the backend returned them in.
fn presented_batches(
    mut results: Vec<lep_inspect_core::domain::BatchSummary>,
) -> Vec<lep_inspect_core::domain::BatchSummary> {
    results.sort_by_key(|b| b.id);
    results
}

fn require_session(ctx: &AppContext) -> Result<(), ClientError> {
    if ctx.session.is_logged_in() {
        Ok(())
    } else {
        Err(ClientError::Internal(
            "not logged in; run `lep login` first".to_string(),
        ))
    }
}

/// The four forward-only lifecycle steps, with everything reached so far
/// marked done.
fn print_status_rail(status: ProcessingStatus) {
    const STEPS: [ProcessingStatus; 4] = [
        ProcessingStatus::NotProcessed,
        ProcessingStatus::Processing,
        ProcessingStatus::Completed,
        ProcessingStatus::Reviewed,
    ];
    let rail: Vec<String> = STEPS
        .iter()
        .map(|step| {
            let mark = if status >= *step { "x" } else { " " };
            format!("[{mark}] {}", step.label())
        })
        .collect();
    println!("{}", rail.join("  ->  "));
}

/// Renders upload progress on stdout as the orchestrator reports it.
struct CliProgressSink;

impl ProgressSink for CliProgressSink {
    fn on_event(&self, event: UploadEvent) {
        match event {
            UploadEvent::Started { total_files } => {
                println!("uploading {total_files} file(s)");
            }
            UploadEvent::FileStarted { index, filename } => {
                print!("  [{}] {filename} ", index + 1);
                let _ = std::io::stdout().flush();
            }
            UploadEvent::FileProgress { .. } => {}
            UploadEvent::FileCompleted {
                overall_percent, ..
            } => {
                println!("done ({overall_percent:.0}% overall)");
            }
            UploadEvent::Confirming => {
                println!("confirming batch...");
            }
            UploadEvent::Completed { batch_id } => {
                println!("batch {batch_id} confirmed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lep_inspect_core::domain::{BatchSummary, ProcessingStatus};

    fn summary(id: u64) -> BatchSummary {
        BatchSummary {
            id,
            name: format!("batch {id}"),
            uploaded_at: Utc::now(),
            photo_count: 0,
            processing_status: ProcessingStatus::NotProcessed,
        }
    }

    #[test]
    fn batch_rows_are_presented_in_ascending_id_order() {
        let rows = presented_batches(vec![summary(31), summary(3), summary(17)]);
        let ids: Vec<u64> = rows.iter().map(|b| b.id).collect();
        assert_eq!(ids, [3, 17, 31]);
    }
}
