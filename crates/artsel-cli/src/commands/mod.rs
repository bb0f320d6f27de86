//! Command handlers

pub mod config;
pub mod page;
pub mod selection;
pub mod status;

use anyhow::{Context, Result};

use artsel_core::{ArticClient, BlobStore, Config, Session};

/// Session type used by the binary, over file or in-memory blobs
pub type AppSession<B> = Session<ArticClient, B>;

/// Open a session over `blobs` and restore its selection
pub fn open_session<B: BlobStore>(config: &Config, blobs: B) -> Result<AppSession<B>> {
    let source = ArticClient::from_config(config).context("Failed to create API client")?;
    let mut session = Session::new(source, blobs, config.page_size, config.fields.clone());
    session.restore();
    Ok(session)
}
