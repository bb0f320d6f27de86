//! Application state and key handling

use std::time::{Duration, Instant};

use artsel_core::{Artwork, BlobStore, RecordSource, Session, SessionError};

use crate::output::describe_outcome;

/// Page sizes cycled with +/-
pub const PAGE_SIZES: &[usize] = &[5, 10, 12, 20, 50];

/// Longest accepted bulk count input
const MAX_COUNT_DIGITS: usize = 9;

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Typing a bulk selection count (after pressing #)
    Count,
}

/// Work a key press asks for that needs the record source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Load a page at a page size
    Goto { page: usize, page_size: usize },
    /// Change the page size, keeping position
    Resize(usize),
    /// Reload the current page
    Refresh,
    /// Select the first N records from the current page onwards
    Bulk(i64),
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Bulk count being typed
    pub count_input: String,
    /// Highlighted row on the current page
    pub row_index: usize,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Error shown in a modal until a key is pressed
    pub error_message: Option<String>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Whether a page load or bulk scan is running
    pub is_loading: bool,
    /// Text shown while loading
    pub loading_label: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            count_input: String::new(),
            row_index: 0,
            status_message: None,
            status_message_time: None,
            error_message: None,
            show_help: false,
            is_loading: false,
            loading_label: String::new(),
        }
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Highlighted record, if the page has one at the cursor
    pub fn current_record<'a>(&self, records: &'a [Artwork]) -> Option<&'a Artwork> {
        records.get(self.row_index)
    }

    pub fn move_up(&mut self) {
        self.row_index = self.row_index.saturating_sub(1);
    }

    pub fn move_down(&mut self, row_count: usize) {
        if self.row_index < row_count.saturating_sub(1) {
            self.row_index += 1;
        }
    }

    /// Keep the cursor inside the loaded page
    pub fn clamp_row(&mut self, row_count: usize) {
        if row_count == 0 {
            self.row_index = 0;
        } else {
            self.row_index = self.row_index.min(row_count - 1);
        }
    }

    pub fn enter_count_mode(&mut self) {
        self.input_mode = InputMode::Count;
        self.count_input.clear();
        self.status_message = None;
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.count_input.clear();
    }

    /// Append a digit to the count input; other characters are ignored
    pub fn insert_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.count_input.len() < MAX_COUNT_DIGITS {
            self.count_input.push(c);
        }
    }

    pub fn delete_char(&mut self) {
        self.count_input.pop();
    }

    /// Parse the typed count
    pub fn parsed_count(&self) -> Option<i64> {
        self.count_input.parse().ok()
    }

    /// Mark the start of a slow operation
    pub fn begin_loading(&mut self, label: impl Into<String>) {
        self.is_loading = true;
        self.loading_label = label.into();
    }

    pub fn end_loading(&mut self) {
        self.is_loading = false;
        self.loading_label.clear();
    }
}

/// Next page size up or down from `current`
pub fn step_page_size(current: usize, up: bool) -> usize {
    if up {
        PAGE_SIZES
            .iter()
            .copied()
            .find(|&size| size > current)
            .unwrap_or(current)
    } else {
        PAGE_SIZES
            .iter()
            .rev()
            .copied()
            .find(|&size| size < current)
            .unwrap_or(current)
    }
}

/// Toggle the highlighted row
pub fn toggle_current<S: RecordSource, B: BlobStore>(app: &mut App, session: &mut Session<S, B>) {
    let Some(id) = app.current_record(session.visible_records()).map(|r| r.id) else {
        return;
    };
    if session.toggle_record(id).is_some() {
        report_persist_error(app, session);
    }
}

/// Select the whole page, or deselect it when every row is already selected
pub fn toggle_page<S: RecordSource, B: BlobStore>(app: &mut App, session: &mut Session<S, B>) {
    let all_selected = !session.visible_records().is_empty()
        && session.visible_selection().len() == session.visible_records().len();

    let result = session.select_page(!all_selected);
    if all_selected {
        app.set_status(format!("Deselected {} on this page", result.removed.len()));
    } else {
        app.set_status(format!("Selected {} on this page", result.added.len()));
    }
    report_persist_error(app, session);
}

/// Clear the whole selection
pub fn clear_all<S: RecordSource, B: BlobStore>(app: &mut App, session: &mut Session<S, B>) {
    let count = session.total_selected();
    session.on_clear_all();
    app.set_status(format!("Cleared {} selected", count));
    report_persist_error(app, session);
}

/// Run an action against the session and report the result
pub async fn perform<S: RecordSource, B: BlobStore>(
    app: &mut App,
    session: &mut Session<S, B>,
    action: Action,
) {
    match action {
        Action::Goto { page, page_size } => {
            if let Err(e) = session.on_page_change(page, page_size).await {
                report_load_error(app, format!("Could not load page {}", page), &e);
            } else {
                app.clamp_row(session.visible_records().len());
            }
        }
        Action::Resize(page_size) => {
            if let Err(e) = session.set_page_size(page_size).await {
                report_load_error(app, "Could not change page size".to_string(), &e);
            } else {
                app.clamp_row(session.visible_records().len());
                app.set_status(format!("{} rows per page", page_size));
            }
        }
        Action::Refresh => {
            if let Err(e) = session.refresh().await {
                report_load_error(app, "Could not reload".to_string(), &e);
            } else {
                app.clamp_row(session.visible_records().len());
            }
        }
        Action::Bulk(count) => match session.on_bulk_count_submit(count).await {
            Ok(outcome) => {
                app.set_status(describe_outcome(&outcome, session.total_selected()));
                report_persist_error(app, session);
            }
            Err(e) => app.set_status(e.to_string()),
        },
    }
}

/// Show a failed page load in the error modal
fn report_load_error(app: &mut App, context: String, error: &SessionError) {
    if error.is_transient() {
        app.set_error(format!("{}: {}. Press r to retry.", context, error));
    } else {
        app.set_error(format!("{}: {}", context, error));
    }
}

/// Surface a failed save in the status line
fn report_persist_error<S: RecordSource, B: BlobStore>(app: &mut App, session: &Session<S, B>) {
    if let Some(err) = session.last_persist_error() {
        app.set_status(format!("Selection not saved: {}", err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artsel_core::source::StaticSource;
    use artsel_core::MemoryBlobStore;

    async fn loaded_session(count: u64, page_size: usize) -> Session<StaticSource, MemoryBlobStore> {
        let mut session = Session::new(
            StaticSource::with_ids(count),
            MemoryBlobStore::new(),
            page_size,
            vec!["id".to_string()],
        );
        session.on_page_change(1, page_size).await.unwrap();
        session
    }

    #[test]
    fn test_step_page_size() {
        assert_eq!(step_page_size(12, true), 20);
        assert_eq!(step_page_size(12, false), 10);
        assert_eq!(step_page_size(50, true), 50);
        assert_eq!(step_page_size(5, false), 5);
        // Sizes outside the list snap to the nearest step
        assert_eq!(step_page_size(15, true), 20);
        assert_eq!(step_page_size(15, false), 12);
    }

    #[test]
    fn test_count_input_accepts_digits_only() {
        let mut app = App::new();
        app.enter_count_mode();
        for c in "1a2-3".chars() {
            app.insert_digit(c);
        }
        assert_eq!(app.count_input, "123");
        assert_eq!(app.parsed_count(), Some(123));

        app.delete_char();
        assert_eq!(app.parsed_count(), Some(12));

        app.exit_input_mode();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.parsed_count(), None);
    }

    #[test]
    fn test_row_movement() {
        let mut app = App::new();
        app.move_up();
        assert_eq!(app.row_index, 0);

        app.move_down(3);
        app.move_down(3);
        app.move_down(3);
        assert_eq!(app.row_index, 2);

        app.clamp_row(1);
        assert_eq!(app.row_index, 0);
    }

    #[tokio::test]
    async fn test_toggle_current_row() {
        let mut app = App::new();
        let mut session = loaded_session(6, 3).await;

        app.move_down(3);
        toggle_current(&mut app, &mut session);
        assert!(session.is_selected(2));

        toggle_current(&mut app, &mut session);
        assert!(!session.is_selected(2));
    }

    #[tokio::test]
    async fn test_toggle_page_flips() {
        let mut app = App::new();
        let mut session = loaded_session(6, 3).await;

        toggle_page(&mut app, &mut session);
        assert_eq!(session.total_selected(), 3);

        toggle_page(&mut app, &mut session);
        assert_eq!(session.total_selected(), 0);
    }

    #[tokio::test]
    async fn test_perform_bulk_and_clear() {
        let mut app = App::new();
        let mut session = loaded_session(10, 3).await;

        perform(&mut app, &mut session, Action::Bulk(7)).await;
        assert_eq!(session.total_selected(), 7);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Selected 7 more (7 total)")
        );

        clear_all(&mut app, &mut session);
        assert_eq!(session.total_selected(), 0);
    }

    #[tokio::test]
    async fn test_perform_goto_failure_reports() {
        let mut app = App::new();
        let mut session = Session::new(
            StaticSource::with_ids(10).fail_on(2),
            MemoryBlobStore::new(),
            3,
            vec!["id".to_string()],
        );
        session.on_page_change(1, 3).await.unwrap();

        perform(
            &mut app,
            &mut session,
            Action::Goto {
                page: 2,
                page_size: 3,
            },
        )
        .await;

        assert_eq!(session.current_page(), 1);
        assert!(app.has_error());
        let message = app.error_message.as_deref().unwrap();
        assert!(message.starts_with("Could not load page 2"));
        assert!(message.ends_with("Press r to retry."));
    }

    #[tokio::test]
    async fn test_perform_goto_clamps_cursor() {
        let mut app = App::new();
        let mut session = loaded_session(7, 5).await;
        app.row_index = 4;

        // Page 1 at size 5 -> page 2 at size 5 holds ids 6 and 7
        perform(
            &mut app,
            &mut session,
            Action::Goto {
                page: 2,
                page_size: 5,
            },
        )
        .await;

        assert_eq!(session.visible_records().len(), 2);
        assert_eq!(app.row_index, 1);
    }
}
