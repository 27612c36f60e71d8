//! `list` and `delete`: browse and clean up the local archive.

use anyhow::{bail, Result};

use crate::session::Session;

pub async fn list(session: &Session) -> Result<()> {
    let records = session.index.list_all().await?;
    if records.is_empty() {
        println!("No generations archived yet.");
        return Ok(());
    }

    for record in &records {
        println!(
            "{}  {}  {} image(s)  {}",
            record.timestamp, record.message_id, record.image_count, record.prompt
        );
        for path in &record.images {
            println!("    {path}");
        }
    }
    Ok(())
}

pub async fn delete(session: &Session, message_id: &str) -> Result<()> {
    if !session.index.delete(message_id).await? {
        bail!("Generation {message_id} not found");
    }
    println!("Deleted generation {message_id}.");
    Ok(())
}
