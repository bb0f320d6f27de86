//! Page command handlers: list, select, toggle

use anyhow::{bail, Context, Result};

use artsel_core::BlobStore;

use super::AppSession;
use crate::output::{Output, PageRow};

/// Print one page with selection marks
pub async fn list<B: BlobStore>(
    session: &mut AppSession<B>,
    page: usize,
    limit: Option<usize>,
    output: &Output,
) -> Result<()> {
    let limit = limit.unwrap_or(session.page_size());

    session
        .on_page_change(page, limit)
        .await
        .with_context(|| format!("Failed to load page {}", page))?;

    let rows: Vec<PageRow> = session
        .visible_records()
        .iter()
        .map(|record| PageRow {
            record,
            selected: session.is_selected(record.id),
        })
        .collect();

    output.print_page(
        session.current_page(),
        session.total_pages(),
        &rows,
        session.total_selected(),
    );
    Ok(())
}

/// Select the first `count` records starting at `from_page`
pub async fn select<B: BlobStore>(
    session: &mut AppSession<B>,
    count: i64,
    from_page: usize,
    limit: Option<usize>,
    output: &Output,
) -> Result<()> {
    if count <= 0 {
        bail!("Count must be a positive number, got {}", count);
    }

    let limit = limit.unwrap_or(session.page_size());

    session
        .on_page_change(from_page, limit)
        .await
        .with_context(|| format!("Failed to load page {}", from_page))?;

    let outcome = session.on_bulk_count_submit(count).await?;
    if let Some(err) = session.last_persist_error() {
        output.warn(&format!("Selection not saved: {}", err));
    }

    output.print_bulk_outcome(&outcome, session.total_selected());
    Ok(())
}

/// Toggle rows on a page by id
pub async fn toggle<B: BlobStore>(
    session: &mut AppSession<B>,
    ids: Vec<u64>,
    page: usize,
    limit: Option<usize>,
    output: &Output,
) -> Result<()> {
    let limit = limit.unwrap_or(session.page_size());

    session
        .on_page_change(page, limit)
        .await
        .with_context(|| format!("Failed to load page {}", page))?;

    let mut new_visible = session.visible_selection();
    let mut missing = Vec::new();
    for id in ids {
        let Some(record) = session.visible_records().iter().find(|r| r.id == id) else {
            missing.push(id);
            continue;
        };
        if let Some(pos) = new_visible.iter().position(|r| r.id == id) {
            new_visible.remove(pos);
        } else {
            new_visible.push(record.clone());
        }
    }

    let result = session.on_selection_toggle(&new_visible);
    if let Some(err) = session.last_persist_error() {
        output.warn(&format!("Selection not saved: {}", err));
    }
    for id in &missing {
        output.warn(&format!("Artwork {} is not on page {}", id, page));
    }

    output.success(&format!(
        "{} selected, {} deselected ({} total)",
        result.added.len(),
        result.removed.len(),
        session.total_selected()
    ));
    Ok(())
}
