//! `button`: derive a new job from an earlier one, then wait for it.

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use novagen_core::button::{action_prompt, ButtonCode};

use crate::cmd::generate::{print_report, watch_job};
use crate::session::Session;

pub async fn run(
    session: &Session,
    message_id: &str,
    code: &str,
    original_prompt: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    let button = ButtonCode::parse(code)?;
    let message_id = message_id.trim();
    let original_prompt = original_prompt_for(session, message_id, original_prompt).await;
    let outcome = session.api.apply_button(message_id, &button).await?;

    let prompt = action_prompt(button.as_str(), &original_prompt);
    println!("{prompt}");
    println!("Submitted, message id: {}", outcome.message_id);

    let report = watch_job(
        &session.api,
        &session.writer,
        &session.poll,
        &outcome.message_id,
        &prompt,
        cancel,
    )
    .await?;
    print_report(&outcome.message_id, &report);
    Ok(())
}

/// The prompt given on the command line, or else the one archived with the
/// original job.
async fn original_prompt_for(session: &Session, message_id: &str, given: &str) -> String {
    if !given.trim().is_empty() {
        return given.to_string();
    }
    match session.index.find(message_id).await {
        Ok(Some((_, record))) => record.prompt,
        Ok(None) => String::new(),
        Err(e) => {
            tracing::warn!(message_id, error = %e, "Could not look up archived prompt");
            String::new()
        }
    }
}
