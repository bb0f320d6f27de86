//! Status command handler

use anyhow::Result;

use artsel_core::{BlobStore, Config};

use super::AppSession;
use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show<B: BlobStore>(config: &Config, session: &AppSession<B>, output: &Output) -> Result<()> {
    let location = session.blobs().location();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "session": config.session,
                    "session_dir": location,
                    "ephemeral": location.is_none(),
                    "selected": session.total_selected(),
                    "api_url": config.api_url,
                    "page_size": config.page_size
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", session.total_selected());
        }
        OutputFormat::Human => {
            println!("artsel Status");
            println!("=============");
            println!();
            println!("Session:");
            println!("  Name:     {}", config.session);
            match location {
                Some(dir) => println!("  Location: {}", dir.display()),
                None => println!("  Location: in memory (not saved)"),
            }
            println!("  Selected: {}", session.total_selected());
            if let Some(err) = session.restore_error() {
                println!("  Warning:  {}", err);
            }
            println!();
            println!("Source:");
            println!("  API:       {}", config.api_url);
            println!("  Page size: {}", config.page_size);
        }
    }

    Ok(())
}
