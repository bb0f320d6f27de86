//! Selection command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use artsel_core::BlobStore;

use super::AppSession;
use crate::output::Output;

/// Show the current selection
pub fn show<B: BlobStore>(session: &AppSession<B>, output: &Output) -> Result<()> {
    output.print_selection(&session.selected_values());
    Ok(())
}

/// Write the selection as JSON to a file, or stdout
pub fn export<B: BlobStore>(
    session: &AppSession<B>,
    path: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let records = session.selected_values();
    let json = serde_json::to_string_pretty(&records).context("Failed to encode selection")?;

    match path {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {:?}", path))?;
            output.success(&format!(
                "Exported {} artwork(s) to {}",
                records.len(),
                path.display()
            ));
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Clear the selection and end the session
pub fn clear<B: BlobStore>(session: &mut AppSession<B>, output: &Output) -> Result<()> {
    let count = session.end().context("Failed to remove session data")?;
    output.success(&format!("Cleared {} selected artwork(s)", count));
    Ok(())
}
