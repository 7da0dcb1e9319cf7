//! Preview/edit orchestration for a document surface
//!
//! A [`DocumentSession`] owns one live editable surface, one store handle,
//! and the canonical Markdown for one document. It orchestrates the mode
//! transitions between read-only preview and live editing, records edit
//! history, autosaves after a quiet period, and commits synchronously when
//! the surface is closed so no edit is ever lost.
//!
//! Everything is single-threaded and event-driven: the host calls
//! [`DocumentSession::note_input`] from its input handlers and drives
//! [`DocumentSession::poll_autosave`] from its event loop. The trailing
//! debounce is a deadline, not a background timer — each new input event
//! re-arms it, and closing the surface cancels it after the final commit,
//! so nothing can fire after teardown.
//!
//! Each surface instance gets its own session; sessions share no state.

use crate::history::EditHistory;
use crate::markup::{markdown_to_markup, markup_to_markdown};
use crate::storage::{storage_key, DocumentStore};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// Surface Contract
// ─────────────────────────────────────────────────────────────────────────────

/// The live editable region, as seen from the session.
///
/// This is the sole interface between the sync/history layer and the
/// rendered UI: the surface exposes its current markup snapshot and accepts
/// a replacement.
pub trait EditableSurface {
    /// Current markup snapshot of the editable content.
    fn snapshot(&self) -> String;

    /// Replace the editable content with new markup.
    fn replace(&mut self, markup: &str);

    /// Move the edit cursor to the end of the content. Surfaces without a
    /// cursor (headless hosts, tests) can ignore this.
    fn place_cursor_at_end(&mut self) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// View Mode
// ─────────────────────────────────────────────────────────────────────────────

/// The viewing mode for a document surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Read-only rendering of the canonical Markdown
    #[default]
    Preview,
    /// Live editable surface, possibly diverged until committed
    Edit,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for session behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Quiet period after the last input before an autosave commit, in
    /// milliseconds
    pub autosave_quiet_ms: u64,
    /// Capacity of each history stack
    pub history_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            autosave_quiet_ms: 1500,
            history_capacity: 100,
        }
    }
}

impl SyncConfig {
    pub const MIN_QUIET_MS: u64 = 100;
    pub const MAX_QUIET_MS: u64 = 60_000;
    pub const MIN_HISTORY: usize = 1;
    pub const MAX_HISTORY: usize = 1000;

    /// Sanitize the configuration by clamping values to valid ranges.
    pub fn sanitized(mut self) -> Self {
        self.autosave_quiet_ms = self
            .autosave_quiet_ms
            .clamp(Self::MIN_QUIET_MS, Self::MAX_QUIET_MS);
        self.history_capacity = self
            .history_capacity
            .clamp(Self::MIN_HISTORY, Self::MAX_HISTORY);
        self
    }

    /// The quiet period as a [`Duration`].
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.autosave_quiet_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document Session
// ─────────────────────────────────────────────────────────────────────────────

/// One document surface: canonical Markdown, live surface, history, and
/// autosave state.
#[derive(Debug)]
pub struct DocumentSession<S: EditableSurface, P: DocumentStore> {
    mode: ViewMode,
    markdown: String,
    surface: S,
    store: P,
    storage_key: String,
    history: EditHistory,
    autosave_deadline: Option<Instant>,
    config: SyncConfig,
}

impl<S: EditableSurface, P: DocumentStore> DocumentSession<S, P> {
    /// Open a session in preview mode.
    ///
    /// Reads the persisted document for the conversation back from the
    /// store when present; otherwise starts from `initial_markdown` (the
    /// freshly generated document).
    pub fn open(
        surface: S,
        store: P,
        conversation_id: Option<&str>,
        initial_markdown: &str,
        config: SyncConfig,
    ) -> Self {
        let config = config.sanitized();
        let storage_key = storage_key(conversation_id);
        let markdown = store
            .load(&storage_key)
            .unwrap_or_else(|| initial_markdown.to_string());
        debug!("Opened session '{}' in preview mode", storage_key);
        Self {
            mode: ViewMode::Preview,
            markdown,
            surface,
            store,
            history: EditHistory::with_capacity("", config.history_capacity),
            storage_key,
            autosave_deadline: None,
            config,
        }
    }

    /// Current viewing mode.
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// The canonical Markdown. While editing, the surface may have
    /// uncommitted changes not yet reflected here.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// Borrow the surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Borrow the surface mutably, for routing user edits into it.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Borrow the store.
    pub fn store(&self) -> &P {
        &self.store
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.mode == ViewMode::Edit && self.history.can_undo()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.mode == ViewMode::Edit && self.history.can_redo()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mode Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Switch to edit mode: compile the canonical Markdown into markup,
    /// inject it into the surface, start a fresh history, and place the
    /// cursor at the end.
    pub fn enter_edit(&mut self) {
        if self.mode == ViewMode::Edit {
            return;
        }
        let markup = markdown_to_markup(&self.markdown);
        self.surface.replace(&markup);
        self.surface.place_cursor_at_end();
        self.history =
            EditHistory::with_capacity(&self.surface.snapshot(), self.config.history_capacity);
        self.autosave_deadline = None;
        self.mode = ViewMode::Edit;
        debug!("Session '{}' entered edit mode", self.storage_key);
    }

    /// Switch back to preview: serialize the live surface, replace the
    /// canonical Markdown, and persist it.
    pub fn show_preview(&mut self) {
        if self.mode == ViewMode::Preview {
            return;
        }
        self.commit();
        self.autosave_deadline = None;
        self.mode = ViewMode::Preview;
        debug!("Session '{}' returned to preview mode", self.storage_key);
    }

    /// Dismiss the surface. When editing, the live content is committed
    /// synchronously before teardown — bypassing the quiet period — and
    /// the pending autosave is cancelled so nothing fires afterwards.
    pub fn close(&mut self) {
        if self.mode == ViewMode::Edit {
            self.commit();
        }
        self.autosave_deadline = None;
        debug!("Session '{}' closed", self.storage_key);
    }

    /// A regenerated or refined document arrived: replace the canonical
    /// Markdown wholesale. When currently editing, the surface is forced
    /// back through a preview → edit transition so it matches the new
    /// content (discarding the old history).
    pub fn apply_generated(&mut self, markdown: &str) {
        self.markdown = markdown.to_string();
        self.persist();
        if self.mode == ViewMode::Edit {
            self.mode = ViewMode::Preview;
            self.autosave_deadline = None;
            self.enter_edit();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edit Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Record the surface state before a discrete formatting command runs,
    /// so the command becomes one undo step.
    pub fn prepare_command(&mut self) {
        if self.mode != ViewMode::Edit {
            return;
        }
        self.history.record_if_changed(&self.surface.snapshot());
    }

    /// Note an input event on the surface: record history and re-arm the
    /// autosave deadline. Call after every raw-input event and after every
    /// formatting command has mutated the surface.
    pub fn note_input(&mut self) {
        self.note_input_at(Instant::now());
    }

    /// [`DocumentSession::note_input`] with an explicit clock, for
    /// deterministic hosts and tests.
    pub fn note_input_at(&mut self, now: Instant) {
        if self.mode != ViewMode::Edit {
            return;
        }
        self.history.record_if_changed(&self.surface.snapshot());
        self.autosave_deadline = Some(now + self.config.quiet_period());
    }

    /// Drive the trailing-debounce autosave: when the quiet period since
    /// the last input has elapsed, serialize the surface and commit.
    /// Returns whether a commit happened.
    pub fn poll_autosave(&mut self) -> bool {
        self.poll_autosave_at(Instant::now())
    }

    /// [`DocumentSession::poll_autosave`] with an explicit clock.
    pub fn poll_autosave_at(&mut self, now: Instant) -> bool {
        match self.autosave_deadline {
            Some(deadline) if self.mode == ViewMode::Edit && now >= deadline => {
                self.autosave_deadline = None;
                self.commit();
                true
            }
            _ => false,
        }
    }

    /// Undo one edit step. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        self.undo_at(Instant::now())
    }

    /// [`DocumentSession::undo`] with an explicit clock.
    pub fn undo_at(&mut self, now: Instant) -> bool {
        if self.mode != ViewMode::Edit {
            return false;
        }
        let live = self.surface.snapshot();
        match self.history.undo(&live) {
            Some(snapshot) => {
                self.surface.replace(&snapshot);
                // Restoring a snapshot is itself an edit for autosave purposes
                self.autosave_deadline = Some(now + self.config.quiet_period());
                true
            }
            None => false,
        }
    }

    /// Redo one edit step. Returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        self.redo_at(Instant::now())
    }

    /// [`DocumentSession::redo`] with an explicit clock.
    pub fn redo_at(&mut self, now: Instant) -> bool {
        if self.mode != ViewMode::Edit {
            return false;
        }
        let live = self.surface.snapshot();
        match self.history.redo(&live) {
            Some(snapshot) => {
                self.surface.replace(&snapshot);
                self.autosave_deadline = Some(now + self.config.quiet_period());
                true
            }
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commit & Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize the live surface into canonical Markdown and persist it.
    fn commit(&mut self) {
        let snapshot = self.surface.snapshot();
        self.markdown = markup_to_markdown(&snapshot);
        self.persist();
    }

    /// Best-effort write to the store. Failures are logged and swallowed;
    /// the canonical Markdown lives on in memory for the session.
    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.storage_key, &self.markdown) {
            warn!(
                "Failed to persist document '{}': {}. Keeping it in memory.",
                self.storage_key, err
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::MemoryStore;
    use std::time::Duration;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Test Doubles
    // ─────────────────────────────────────────────────────────────────────────

    /// A headless surface: a markup string plus a cursor flag.
    #[derive(Debug, Default)]
    struct TestSurface {
        markup: String,
        cursor_at_end: bool,
    }

    impl TestSurface {
        fn type_text(&mut self, text: &str) {
            // Crude but sufficient: append a paragraph of typed text
            self.markup.push_str(&format!("<p>{}</p>", text));
            self.cursor_at_end = false;
        }
    }

    impl EditableSurface for TestSurface {
        fn snapshot(&self) -> String {
            self.markup.clone()
        }

        fn replace(&mut self, markup: &str) {
            self.markup = markup.to_string();
            self.cursor_at_end = false;
        }

        fn place_cursor_at_end(&mut self) {
            self.cursor_at_end = true;
        }
    }

    /// A store that counts saves.
    #[derive(Debug, Default)]
    struct CountingStore {
        inner: MemoryStore,
        saves: usize,
    }

    impl DocumentStore for CountingStore {
        fn load(&self, key: &str) -> Option<String> {
            self.inner.load(key)
        }

        fn save(&mut self, key: &str, markdown: &str) -> crate::error::Result<()> {
            self.saves += 1;
            self.inner.save(key, markdown)
        }
    }

    /// A store whose writes always fail.
    #[derive(Debug, Default)]
    struct BrokenStore;

    impl DocumentStore for BrokenStore {
        fn load(&self, _key: &str) -> Option<String> {
            None
        }

        fn save(&mut self, _key: &str, _markdown: &str) -> crate::error::Result<()> {
            Err(Error::Application("storage unavailable".to_string()))
        }
    }

    fn open_session(initial: &str) -> DocumentSession<TestSurface, CountingStore> {
        DocumentSession::open(
            TestSurface::default(),
            CountingStore::default(),
            Some("conv-1"),
            initial,
            SyncConfig::default(),
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mode Transitions
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_opens_in_preview_mode() {
        let session = open_session("# Doc");
        assert_eq!(session.mode(), ViewMode::Preview);
        assert_eq!(session.markdown(), "# Doc");
    }

    #[test]
    fn test_open_prefers_persisted_document() {
        let mut store = CountingStore::default();
        store.save("conv-1", "# Persisted").unwrap();
        store.saves = 0;

        let session = DocumentSession::open(
            TestSurface::default(),
            store,
            Some("conv-1"),
            "# Fresh",
            SyncConfig::default(),
        );
        assert_eq!(session.markdown(), "# Persisted");
    }

    #[test]
    fn test_enter_edit_injects_compiled_markup() {
        let mut session = open_session("# Title\n\nbody");
        session.enter_edit();

        assert_eq!(session.mode(), ViewMode::Edit);
        assert_eq!(session.surface().markup, "<h1>Title</h1>\n<p>body</p>");
        assert!(session.surface().cursor_at_end);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_enter_edit_twice_is_noop() {
        let mut session = open_session("# Doc");
        session.enter_edit();
        session.surface_mut().type_text("extra");
        session.enter_edit();
        // Content untouched by the second call
        assert!(session.surface().markup.contains("extra"));
    }

    #[test]
    fn test_show_preview_commits_surface() {
        let mut session = open_session("");
        session.enter_edit();
        session.surface_mut().replace("<h2>Edited</h2>");
        session.note_input();

        session.show_preview();
        assert_eq!(session.mode(), ViewMode::Preview);
        assert_eq!(session.markdown(), "## Edited");
        assert_eq!(session.store().load("conv-1").as_deref(), Some("## Edited"));
    }

    #[test]
    fn test_history_resets_on_each_edit_entry() {
        let mut session = open_session("start");
        session.enter_edit();
        session.surface_mut().type_text("more");
        session.note_input();
        assert!(session.can_undo());

        session.show_preview();
        session.enter_edit();
        assert!(!session.can_undo());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Undo / Redo Routing
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_undo_restores_surface() {
        let mut session = open_session("start");
        session.enter_edit();
        let injected = session.surface().markup.clone();

        session.surface_mut().type_text("typed");
        session.note_input();

        assert!(session.undo());
        assert_eq!(session.surface().markup, injected);
        assert!(session.can_redo());
    }

    #[test]
    fn test_redo_restores_undone_edit() {
        let mut session = open_session("start");
        session.enter_edit();
        session.surface_mut().type_text("typed");
        session.note_input();
        let edited = session.surface().markup.clone();

        session.undo();
        assert!(session.redo());
        assert_eq!(session.surface().markup, edited);
    }

    #[test]
    fn test_undo_outside_edit_mode_is_noop() {
        let mut session = open_session("start");
        assert!(!session.undo());
        assert!(!session.redo());
    }

    #[test]
    fn test_prepare_command_records_pending_typing() {
        let mut session = open_session("start");
        session.enter_edit();

        // Typing that was never noted gets captured before the command
        session.surface_mut().type_text("typed");
        session.prepare_command();
        assert!(session.can_undo());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Debounced Autosave
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_autosave_after_quiet_period() {
        let mut session = open_session("start");
        session.enter_edit();
        let base = Instant::now();

        session.surface_mut().type_text("x");
        session.note_input_at(base);

        assert!(!session.poll_autosave_at(base + Duration::from_millis(1499)));
        assert!(session.poll_autosave_at(base + Duration::from_millis(1500)));
        assert!(session.markdown().contains('x'));
    }

    #[test]
    fn test_autosave_deadline_fires_once() {
        let mut session = open_session("start");
        session.enter_edit();
        let base = Instant::now();

        session.surface_mut().type_text("x");
        session.note_input_at(base);
        assert!(session.poll_autosave_at(base + Duration::from_millis(1500)));
        assert!(!session.poll_autosave_at(base + Duration::from_millis(3000)));
    }

    #[test]
    fn test_debounce_coalesces_input_burst() {
        let mut session = open_session("start");
        session.enter_edit();
        let saves_before = session.store().saves;
        let base = Instant::now();

        // Ten inputs 100ms apart, each re-arming the deadline
        let mut last = base;
        for i in 0..10u64 {
            last = base + Duration::from_millis(100 * i);
            session.surface_mut().type_text(&format!("w{}", i));
            session.note_input_at(last);
            assert!(!session.poll_autosave_at(last + Duration::from_millis(50)));
        }

        // Nothing commits inside the quiet window measured from the last event
        assert!(!session.poll_autosave_at(last + Duration::from_millis(1499)));
        // Exactly one commit, 1.5s after the final event
        assert!(session.poll_autosave_at(last + Duration::from_millis(1500)));
        assert_eq!(session.store().saves, saves_before + 1);
    }

    #[test]
    fn test_autosave_ignored_in_preview_mode() {
        let mut session = open_session("start");
        assert!(!session.poll_autosave_at(Instant::now() + Duration::from_secs(10)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Close & Regeneration
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_close_commits_pending_edit() {
        let mut session = open_session("start");
        session.enter_edit();
        let base = Instant::now();

        session.surface_mut().replace("<p>final words</p>");
        session.note_input_at(base);

        // Closed well inside the quiet window: the commit is synchronous
        session.close();
        assert_eq!(session.markdown(), "final words");
        assert_eq!(
            session.store().load("conv-1").as_deref(),
            Some("final words")
        );

        // The cancelled deadline can never fire afterwards
        assert!(!session.poll_autosave_at(base + Duration::from_secs(60)));
    }

    #[test]
    fn test_close_in_preview_does_not_save() {
        let mut session = open_session("start");
        let saves_before = session.store().saves;
        session.close();
        assert_eq!(session.store().saves, saves_before);
    }

    #[test]
    fn test_apply_generated_replaces_markdown() {
        let mut session = open_session("old");
        session.apply_generated("# Regenerated");
        assert_eq!(session.markdown(), "# Regenerated");
        assert_eq!(
            session.store().load("conv-1").as_deref(),
            Some("# Regenerated")
        );
    }

    #[test]
    fn test_apply_generated_while_editing_reenters_edit() {
        let mut session = open_session("old");
        session.enter_edit();
        session.surface_mut().type_text("stale edit");
        session.note_input();

        session.apply_generated("# Regenerated");
        assert_eq!(session.mode(), ViewMode::Edit);
        assert_eq!(session.surface().markup, "<h1>Regenerated</h1>");
        assert!(session.surface().cursor_at_end);
        // Old history does not survive the regeneration
        assert!(!session.can_undo());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence Degradation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_store_failure_is_swallowed() {
        init_logging();
        let mut session = DocumentSession::open(
            TestSurface::default(),
            BrokenStore,
            None,
            "start",
            SyncConfig::default(),
        );
        session.enter_edit();
        session.surface_mut().replace("<p>kept in memory</p>");
        session.note_input();

        // Neither the commit nor the close panics or errors out
        session.show_preview();
        assert_eq!(session.markdown(), "kept in memory");
        session.close();
    }

    #[test]
    fn test_default_key_when_no_conversation_id() {
        let mut session = DocumentSession::open(
            TestSurface::default(),
            CountingStore::default(),
            None,
            "doc",
            SyncConfig::default(),
        );
        session.enter_edit();
        session.surface_mut().replace("<p>saved</p>");
        session.note_input();
        session.close();
        assert_eq!(session.store().load("default").as_deref(), Some("saved"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_config_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.autosave_quiet_ms, 1500);
        assert_eq!(config.history_capacity, 100);
    }

    #[test]
    fn test_config_sanitized_clamps_values() {
        let config = SyncConfig {
            autosave_quiet_ms: 5,
            history_capacity: 0,
        }
        .sanitized();
        assert_eq!(config.autosave_quiet_ms, SyncConfig::MIN_QUIET_MS);
        assert_eq!(config.history_capacity, SyncConfig::MIN_HISTORY);

        let config = SyncConfig {
            autosave_quiet_ms: 999_999,
            history_capacity: 99_999,
        }
        .sanitized();
        assert_eq!(config.autosave_quiet_ms, SyncConfig::MAX_QUIET_MS);
        assert_eq!(config.history_capacity, SyncConfig::MAX_HISTORY);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = SyncConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let loaded: SyncConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, loaded);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conformance Across Independent Surfaces
    // ─────────────────────────────────────────────────────────────────────────

    /// The same engine backs multiple independent surface instances (chat
    /// summaries and prepared documents each get their own). Running the
    /// same scenario through two sessions must produce identical results,
    /// so the call sites cannot drift in behavior.
    #[test]
    fn test_two_sessions_behave_identically_and_share_nothing() {
        let scenario = |session: &mut DocumentSession<TestSurface, CountingStore>| {
            let base = Instant::now();
            session.enter_edit();
            session.surface_mut().type_text("alpha");
            session.note_input_at(base);
            session.surface_mut().type_text("beta");
            session.note_input_at(base + Duration::from_millis(100));
            session.undo_at(base + Duration::from_millis(200));
            session.poll_autosave_at(base + Duration::from_millis(1700) + Duration::from_millis(1));
            session.close();
            session.markdown().to_string()
        };

        let mut first = open_session("# Shared Start\n\n- a\n- b");
        let mut second = open_session("# Shared Start\n\n- a\n- b");

        let first_result = scenario(&mut first);
        let second_result = scenario(&mut second);

        assert_eq!(first_result, second_result);
        assert!(first_result.contains("alpha"));
        assert!(!first_result.contains("beta"));

        // Fully independent state: one session's store never sees the other's
        assert_eq!(first.store().saves, second.store().saves);
    }
}
