//! `generate`: submit a prompt, wait for it, archive the result.

use std::io::Write;

use anyhow::{bail, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use novagen_archive::ArchiveWriter;
use novagen_client::events::PollEvent;
use novagen_client::poller::{poll_until_complete, PollConfig, PollOutcome, StatusSource};
use novagen_core::generation::validate_prompt;

use crate::session::Session;

/// How waiting on one job ended, from the user's point of view.
#[derive(Debug, PartialEq)]
pub enum JobReport {
    /// `DONE`. `local_paths` may be shorter than `remote_urls` when some
    /// downloads failed.
    Finished {
        remote_urls: Vec<String>,
        local_paths: Vec<String>,
    },
    Failed { status: String, progress: String },
    Cancelled,
    TimedOut,
}

/// Read prompts from stdin until `exit`, `quit`, end of input or Ctrl-C.
pub async fn interactive(session: &Session, cancel: &CancellationToken) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\nEnter a prompt (or 'exit' to quit): ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        let input = line.trim();
        if is_exit_command(input) {
            break;
        }
        if input.is_empty() {
            continue;
        }

        if let Err(e) = once(session, input, cancel).await {
            eprintln!("Error: {e:#}");
        }
        if cancel.is_cancelled() {
            break;
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Submit one prompt and wait for it.
pub async fn once(session: &Session, prompt: &str, cancel: &CancellationToken) -> Result<()> {
    let prompt = validate_prompt(prompt, session.max_prompt_length)?;

    let Some(message_id) = session.api.submit(&prompt).await? else {
        bail!("Failed to get a message ID from the imagine response");
    };
    println!("Submitted, message id: {message_id}");

    let report = watch_job(
        &session.api,
        &session.writer,
        &session.poll,
        &message_id,
        &prompt,
        cancel,
    )
    .await?;
    print_report(&message_id, &report);
    Ok(())
}

/// Poll `job_id` to a terminal state, printing progress, and archive its
/// images once it is done.
pub async fn watch_job<S>(
    source: &S,
    writer: &ArchiveWriter,
    poll: &PollConfig,
    job_id: &str,
    prompt: &str,
    cancel: &CancellationToken,
) -> Result<JobReport>
where
    S: StatusSource + ?Sized,
{
    let outcome = poll_until_complete(source, job_id, poll, cancel, |event| {
        if let Some(line) = render_event(event) {
            println!("{line}");
        }
    })
    .await?;

    let report = match outcome {
        PollOutcome::Completed { status, raw } => {
            let local_paths = if status.image_urls.is_empty() {
                Vec::new()
            } else {
                writer.persist(job_id, &status.image_urls, prompt, &raw).await
            };
            JobReport::Finished {
                remote_urls: status.image_urls,
                local_paths,
            }
        }
        PollOutcome::Failed(status) => JobReport::Failed {
            status: status.status.to_string(),
            progress: status.progress,
        },
        PollOutcome::Cancelled => JobReport::Cancelled,
        PollOutcome::TimedOut => JobReport::TimedOut,
    };
    Ok(report)
}

/// One console line per poll event.
pub fn render_event(event: &PollEvent) -> Option<String> {
    match event {
        PollEvent::Progress {
            status, progress, ..
        } => Some(format!("Status: {status} | Progress: {progress}")),
        PollEvent::Completed { image_urls, .. } => {
            Some(format!("Generation complete: {} image(s)", image_urls.len()))
        }
        PollEvent::Failed { .. } => None,
    }
}

pub fn is_exit_command(input: &str) -> bool {
    matches!(input.to_ascii_lowercase().as_str(), "exit" | "quit")
}

pub fn print_report(job_id: &str, report: &JobReport) {
    match report {
        JobReport::Finished {
            remote_urls,
            local_paths,
        } => {
            if remote_urls.is_empty() {
                println!("Job {job_id} finished but returned no images.");
                return;
            }
            if local_paths.is_empty() {
                println!("Could not save images locally; remote URLs:");
                for url in remote_urls {
                    println!("  {url}");
                }
                return;
            }
            println!("Saved {} of {} image(s):", local_paths.len(), remote_urls.len());
            for path in local_paths {
                println!("  {path}");
            }
        }
        JobReport::Failed { status, progress } => {
            println!("Job {job_id} ended with status {status} ({progress}).");
        }
        JobReport::Cancelled => println!("Stopped waiting for job {job_id}."),
        JobReport::TimedOut => println!("Gave up waiting for job {job_id}."),
    }
}
