//! Session controller for the text layer.
//!
//! `ViewerSession` owns every piece of mutable state (page store, search
//! results, layout overrides, selection, spacing) and changes it only through
//! [`Command`]s. The presentation layer reads a [`ViewSnapshot`] after each
//! change and never mutates anything itself.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::ViewerConfig;
use crate::gesture::{PinchGesture, SpacingLimits, TouchPoint};
use crate::highlight::{render_line, Segment};
use crate::layout::{z_order, Layer, LayoutEngine};
use crate::lines::PageStore;
use crate::navigator::{Direction, SearchNavigator};
use crate::search::{search_with_min_len, MatchSpan};
use crate::selection::SelectionSet;
use crate::{DocumentBackend, DocumentId, DocumentInfo, DocumentProvider};

/// Tags a text extraction request with the page it targets.
///
/// Results are only accepted while the ticket is the outstanding one; a
/// page change in between makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtractionTicket {
    pub page: usize,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub enum Command {
    SetQuery { query: String },
    SearchNext,
    SearchPrev,
    ToggleLine { line: usize },
    DragStart { line: usize },
    DragOver { offset: f32 },
    DragEnd,
    TouchStart { points: Vec<TouchPoint> },
    TouchMove { points: Vec<TouchPoint> },
    TouchEnd { remaining: usize },
    PinchBy { delta_y: f32 },
    ResetLayout,
    NextPage { count: usize },
    PrevPage { count: usize },
    GotoPage { page: usize },
    ExtractionFinished {
        ticket: ExtractionTicket,
        text: Result<String, String>,
    },
    PageIndexed { page: usize, text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ExtractionRequested(ExtractionTicket),
    PageChanged { page: usize },
    SearchUpdated { matches: usize },
    RedrawNeeded(DocumentId),
}

#[derive(Debug, Clone, Serialize)]
pub struct LineView {
    pub index: usize,
    pub text: String,
    pub offset: f32,
    pub layer: Layer,
    pub segments: Vec<Segment>,
}

/// Read-only projection of the session for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub document_id: DocumentId,
    pub title: String,
    pub page: usize,
    pub page_count: usize,
    pub loading: bool,
    pub spacing: f32,
    pub query: String,
    pub selected: Vec<usize>,
    pub overrides: BTreeMap<usize, f32>,
    pub dragging: Option<usize>,
    pub lines: Vec<LineView>,
    pub matches: Vec<MatchSpan>,
    pub cursor: Option<usize>,
    pub status: String,
}

impl ViewSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct ViewerSession {
    info: DocumentInfo,
    backend: Arc<dyn DocumentBackend>,
    config: ViewerConfig,
    limits: SpacingLimits,
    pages: PageStore,
    active_page: usize,
    lines: Vec<String>,
    generation: u64,
    pending: Option<ExtractionTicket>,
    query: String,
    navigator: SearchNavigator,
    layout: LayoutEngine,
    selection: SelectionSet,
    pinch: PinchGesture,
    spacing: f32,
    events: Mutex<Vec<SessionEvent>>,
}

impl ViewerSession {
    /// Starts a session on page 0 and requests its text.
    pub fn new(backend: Arc<dyn DocumentBackend>, config: ViewerConfig) -> Self {
        let info = backend.info().clone();
        let limits = config.spacing_limits();
        let mut session = Self {
            pages: PageStore::with_page_count(info.page_count),
            layout: LayoutEngine::new(config.base_unit),
            spacing: limits.reset_spacing(),
            info,
            backend,
            config,
            limits,
            active_page: 0,
            lines: Vec::new(),
            generation: 0,
            pending: None,
            query: String::new(),
            navigator: SearchNavigator::new(),
            selection: SelectionSet::new(),
            pinch: PinchGesture::new(),
            events: Mutex::new(Vec::new()),
        };
        if session.info.page_count > 0 {
            session.request_extraction();
        }
        session
    }

    #[instrument(skip(provider, config))]
    pub async fn open_with<P: DocumentProvider>(
        provider: &P,
        path: PathBuf,
        config: ViewerConfig,
    ) -> Result<Self> {
        let backend = provider.open(&path).await?;
        info!(
            id = %backend.info().id,
            pages = backend.info().page_count,
            "document opened"
        );
        Ok(Self::new(backend, config))
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    pub fn backend(&self) -> Arc<dyn DocumentBackend> {
        Arc::clone(&self.backend)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn drain_events(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn active_page(&self) -> usize {
        self.active_page
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn navigator(&self) -> &SearchNavigator {
        &self.navigator
    }

    pub fn pending_extraction(&self) -> Option<ExtractionTicket> {
        self.pending
    }

    pub fn is_page_loaded(&self, page: usize) -> bool {
        self.pages.is_loaded(page)
    }

    /// Selected lines joined in index order.
    pub fn selected_text(&self) -> String {
        self.selection
            .iter()
            .filter_map(|idx| self.lines.get(idx))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[instrument(level = "debug", skip(self))]
    pub fn apply(&mut self, command: Command) {
        let changed = match command {
            Command::SetQuery { query } => {
                self.set_query(query);
                true
            }
            Command::SearchNext => self.advance(Direction::Next),
            Command::SearchPrev => self.advance(Direction::Previous),
            Command::ToggleLine { line } => {
                if line < self.lines.len() {
                    self.selection.toggle(line);
                    true
                } else {
                    false
                }
            }
            Command::DragStart { line } => {
                if self.selection.contains(line) {
                    self.layout.begin_drag(line);
                    true
                } else {
                    debug!(line, "drag ignored for unselected line");
                    false
                }
            }
            Command::DragOver { offset } => self.layout.drag_over(offset).is_some(),
            Command::DragEnd => self.layout.end_drag().is_some(),
            Command::TouchStart { points } => {
                self.pinch.touch_start(&points);
                false
            }
            Command::TouchMove { points } => {
                match self.pinch.touch_move(&points, self.spacing, &self.limits) {
                    Some(spacing) => self.set_spacing(spacing),
                    None => false,
                }
            }
            Command::TouchEnd { remaining } => {
                self.pinch.touch_end(remaining);
                false
            }
            Command::PinchBy { delta_y } => {
                let spacing = self.limits.nudge_spacing(self.spacing, delta_y);
                self.set_spacing(spacing)
            }
            Command::ResetLayout => {
                self.layout.clear_overrides();
                self.selection.clear();
                self.pinch.touch_end(0);
                self.spacing = self.limits.reset_spacing();
                true
            }
            Command::NextPage { count } => {
                let last = self.info.page_count.saturating_sub(1);
                self.change_page((self.active_page.saturating_add(count)).min(last))
            }
            Command::PrevPage { count } => {
                self.change_page(self.active_page.saturating_sub(count))
            }
            Command::GotoPage { page } => {
                let last = self.info.page_count.saturating_sub(1);
                self.change_page(page.min(last))
            }
            Command::ExtractionFinished { ticket, text } => self.finish_extraction(ticket, text),
            Command::PageIndexed { page, text } => self.index_page(page, text),
        };

        if changed {
            self.events
                .lock()
                .push(SessionEvent::RedrawNeeded(self.info.id));
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let current = self.navigator.current();
        let dragging = self.layout.dragging();
        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let line_matches = self.navigator.matches_on_line(self.active_page, index);
                LineView {
                    index,
                    text: text.clone(),
                    offset: self.layout.position_of(index, self.spacing),
                    layer: z_order(self.selection.contains(index), dragging == Some(index)),
                    segments: render_line(text, &line_matches, current),
                }
            })
            .collect();

        ViewSnapshot {
            document_id: self.info.id,
            title: self.info.display_name(),
            page: self.active_page,
            page_count: self.info.page_count,
            loading: self.pending.is_some(),
            spacing: self.spacing,
            query: self.query.clone(),
            selected: self.selection.iter().collect(),
            overrides: self.layout.overrides().clone(),
            dragging,
            lines,
            matches: self.navigator.matches().to_vec(),
            cursor: self.navigator.cursor(),
            status: self.status_line(),
        }
    }

    pub fn status_line(&self) -> String {
        let page = if self.info.page_count == 0 {
            "No pages".to_owned()
        } else {
            format!("Page {} of {}", self.active_page + 1, self.info.page_count)
        };
        let mut status = format!(
            "{} · spacing {:.2} · {}",
            page,
            self.spacing,
            self.navigator.position_label()
        );
        if !self.navigator.matches().is_empty() {
            let on_page = self.navigator.matches_on_page(self.active_page).len();
            status.push_str(&format!(" · {} on this page", on_page));
        }
        status
    }

    fn set_query(&mut self, query: String) {
        self.query = query;
        let matches = search_with_min_len(&self.query, self.pages.loaded(), self.config.min_query_len);
        debug!(query = %self.query, matches = matches.len(), "search updated");
        self.navigator.set_results(matches);
        self.push_search_updated();
    }

    fn rerun_search(&mut self) {
        if self.query.is_empty() {
            return;
        }
        let matches = search_with_min_len(&self.query, self.pages.loaded(), self.config.min_query_len);
        self.navigator.refresh_results(matches);
        self.push_search_updated();
    }

    fn push_search_updated(&self) {
        self.events.lock().push(SessionEvent::SearchUpdated {
            matches: self.navigator.matches().len(),
        });
    }

    fn advance(&mut self, direction: Direction) -> bool {
        if self.navigator.matches().is_empty() {
            return false;
        }
        if let Some(change) = self.navigator.advance(direction, self.active_page) {
            self.change_page(change.page);
        }
        true
    }

    fn set_spacing(&mut self, spacing: f32) -> bool {
        if (self.spacing - spacing).abs() > f32::EPSILON {
            self.spacing = spacing;
            true
        } else {
            false
        }
    }

    /// Arrival on a different page always starts from a clean layout.
    fn change_page(&mut self, page: usize) -> bool {
        if page == self.active_page || page >= self.info.page_count {
            return false;
        }
        self.active_page = page;
        self.selection.clear();
        self.layout.clear_overrides();
        self.events.lock().push(SessionEvent::PageChanged { page });

        if self.pages.is_loaded(page) {
            self.pending = None;
            self.lines = self.pages.lines(page);
        } else {
            self.lines.clear();
            self.request_extraction();
        }
        true
    }

    fn request_extraction(&mut self) {
        self.generation += 1;
        let ticket = ExtractionTicket {
            page: self.active_page,
            generation: self.generation,
        };
        self.pending = Some(ticket);
        self.events
            .lock()
            .push(SessionEvent::ExtractionRequested(ticket));
    }

    fn finish_extraction(&mut self, ticket: ExtractionTicket, text: Result<String, String>) -> bool {
        if self.pending != Some(ticket) {
            debug!(
                page = ticket.page,
                generation = ticket.generation,
                "discarding stale extraction result"
            );
            return false;
        }
        self.pending = None;
        match text {
            Ok(text) => {
                self.pages.insert(ticket.page, text);
                self.lines = self.pages.lines(ticket.page);
                self.rerun_search();
            }
            Err(err) => {
                warn!(page = ticket.page, %err, "text extraction failed");
                self.lines.clear();
            }
        }
        true
    }

    fn index_page(&mut self, page: usize, text: String) -> bool {
        if !self.pages.insert(page, text) {
            return false;
        }
        let mut changed = false;
        // Newly stored, so the active page has no lines of its own yet.
        if page == self.active_page {
            self.pending = None;
            self.lines = self.pages.lines(page);
            changed = true;
        }
        if !self.query.is_empty() {
            self.rerun_search();
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::SegmentKind;
    use crate::MemoryDocument;

    const SAMPLE: [&str; 3] = [
        "Hello\n\nWorld\nHello again",
        "Duis aute irure dolor\nExcepteur sint\nmollit anim dolor",
        "Nam libero tempore\nFacere possimus dolor",
    ];

    fn session() -> ViewerSession {
        let backend = Arc::new(MemoryDocument::new(
            PathBuf::from("sample.txt"),
            SAMPLE.iter().map(|s| s.to_string()).collect(),
        ));
        ViewerSession::new(backend, ViewerConfig::default())
    }

    fn loaded_session() -> ViewerSession {
        let mut session = session();
        let ticket = session.pending_extraction().unwrap();
        session.apply(Command::ExtractionFinished {
            ticket,
            text: Ok(SAMPLE[0].to_owned()),
        });
        session
    }

    fn index_all(session: &mut ViewerSession) {
        for (page, text) in SAMPLE.iter().enumerate() {
            session.apply(Command::PageIndexed {
                page,
                text: text.to_string(),
            });
        }
    }

    #[test]
    fn opening_requests_first_page() {
        let session = session();
        let events = session.drain_events();
        assert_eq!(
            events,
            vec![SessionEvent::ExtractionRequested(ExtractionTicket {
                page: 0,
                generation: 1
            })]
        );
        assert!(session.lines().is_empty());
        assert!(session.snapshot().loading);
    }

    #[test]
    fn extraction_fills_active_lines() {
        let session = loaded_session();
        assert_eq!(session.lines(), &["Hello", "World", "Hello again"]);
        assert!(session.pending_extraction().is_none());
    }

    #[test]
    fn stale_extraction_is_discarded() {
        let mut session = session();
        let first = session.pending_extraction().unwrap();
        session.apply(Command::NextPage { count: 1 });
        let second = session.pending_extraction().unwrap();
        assert_eq!(second.page, 1);

        session.apply(Command::ExtractionFinished {
            ticket: first,
            text: Ok(SAMPLE[0].to_owned()),
        });
        assert!(session.lines().is_empty());
        assert!(!session.is_page_loaded(0));

        session.apply(Command::ExtractionFinished {
            ticket: second,
            text: Ok(SAMPLE[1].to_owned()),
        });
        assert_eq!(session.lines().len(), 3);
        assert_eq!(session.active_page(), 1);
    }

    #[test]
    fn ticket_for_revisited_page_is_still_stale() {
        let mut session = session();
        let first = session.pending_extraction().unwrap();
        session.apply(Command::NextPage { count: 1 });
        session.apply(Command::PrevPage { count: 1 });
        session.apply(Command::ExtractionFinished {
            ticket: first,
            text: Ok(SAMPLE[0].to_owned()),
        });
        assert!(session.lines().is_empty());
        assert_eq!(session.pending_extraction().unwrap().generation, 3);
    }

    #[test]
    fn failed_extraction_yields_empty_page() {
        let mut session = session();
        let ticket = session.pending_extraction().unwrap();
        session.apply(Command::ExtractionFinished {
            ticket,
            text: Err("broken page".into()),
        });
        assert!(session.lines().is_empty());
        assert!(!session.snapshot().loading);
        session.apply(Command::SetQuery {
            query: "hello".into(),
        });
        assert!(session.navigator().matches().is_empty());
    }

    #[test]
    fn search_and_wraparound_on_one_page() {
        let mut session = loaded_session();
        session.apply(Command::SetQuery {
            query: "hello".into(),
        });
        let nav = session.navigator();
        assert_eq!(nav.matches().len(), 2);
        assert_eq!(nav.cursor(), Some(0));
        assert_eq!(
            (nav.matches()[1].line_index, nav.matches()[1].start, nav.matches()[1].end),
            (2, 0, 5)
        );

        session.apply(Command::SearchNext);
        assert_eq!(session.navigator().cursor(), Some(1));
        session.apply(Command::SearchNext);
        assert_eq!(session.navigator().cursor(), Some(0));
        assert_eq!(session.active_page(), 0);
    }

    #[test]
    fn search_navigation_crosses_pages_and_clears_layout() {
        let mut session = loaded_session();
        index_all(&mut session);
        session.apply(Command::ToggleLine { line: 1 });
        session.apply(Command::DragStart { line: 1 });
        session.apply(Command::DragOver { offset: 40.0 });
        session.apply(Command::SetQuery {
            query: "dolor".into(),
        });
        assert_eq!(session.navigator().matches().len(), 3);
        assert_eq!(session.active_page(), 0);

        session.apply(Command::SearchNext);
        assert_eq!(session.navigator().cursor(), Some(1));
        assert_eq!(session.active_page(), 1);
        assert!(session.selection().is_empty());
        assert!(session.layout().overrides().is_empty());
        assert_eq!(session.layout().dragging(), None);
        assert_eq!(session.lines()[2], "mollit anim dolor");
        assert!(session.pending_extraction().is_none());

        session.apply(Command::SearchPrev);
        assert_eq!(session.active_page(), 1);
        assert_eq!(session.navigator().cursor(), Some(0));
    }

    #[test]
    fn background_indexing_extends_search_without_moving_cursor() {
        let mut session = loaded_session();
        session.apply(Command::SetQuery {
            query: "hello".into(),
        });
        session.apply(Command::SearchNext);
        session.apply(Command::PageIndexed {
            page: 2,
            text: "hello from page three".into(),
        });
        let nav = session.navigator();
        assert_eq!(nav.matches().len(), 3);
        assert_eq!(nav.cursor(), Some(1));
        assert_eq!(session.active_page(), 0);
    }

    #[test]
    fn short_and_special_queries_do_not_fail() {
        let mut session = loaded_session();
        for query in ["h", "(", "[a-", "\\"] {
            session.apply(Command::SetQuery {
                query: query.into(),
            });
            assert!(session.navigator().matches().is_empty());
            assert_eq!(session.navigator().cursor(), None);
        }
        session.apply(Command::SearchNext);
        assert_eq!(session.navigator().cursor(), None);
    }

    #[test]
    fn only_selected_lines_can_be_dragged() {
        let mut session = loaded_session();
        session.apply(Command::DragStart { line: 2 });
        session.apply(Command::DragOver { offset: 120.0 });
        assert!(session.layout().overrides().is_empty());

        session.apply(Command::ToggleLine { line: 2 });
        session.apply(Command::DragStart { line: 2 });
        session.apply(Command::DragOver { offset: 120.0 });
        session.apply(Command::DragEnd);
        assert_eq!(session.layout().position_of(2, 0.8), 120.0);
        assert_eq!(session.layout().position_of(2, 3.0), 120.0);

        session.apply(Command::ResetLayout);
        assert_eq!(session.layout().position_of(2, 1.5), 4.5);
        assert!(session.selection().is_empty());
    }

    #[test]
    fn toggling_out_of_range_lines_is_ignored() {
        let mut session = loaded_session();
        session.apply(Command::ToggleLine { line: 9 });
        assert!(session.selection().is_empty());
    }

    #[test]
    fn pinch_and_emulated_pinch_stay_clamped() {
        let mut session = loaded_session();
        session.apply(Command::TouchStart {
            points: vec![TouchPoint::new(0.0, 0.0), TouchPoint::new(10.0, 0.0)],
        });
        session.apply(Command::TouchMove {
            points: vec![TouchPoint::new(0.0, 0.0), TouchPoint::new(1000.0, 0.0)],
        });
        assert_eq!(session.spacing(), 3.0);
        session.apply(Command::TouchEnd { remaining: 1 });
        session.apply(Command::TouchMove {
            points: vec![TouchPoint::new(0.0, 0.0), TouchPoint::new(1.0, 0.0)],
        });
        assert_eq!(session.spacing(), 3.0);

        session.apply(Command::PinchBy { delta_y: -1.0e6 });
        assert_eq!(session.spacing(), 0.8);

        session.apply(Command::ResetLayout);
        assert_eq!(session.spacing(), 1.5);
    }

    #[test]
    fn spacing_survives_page_changes() {
        let mut session = loaded_session();
        session.apply(Command::PinchBy { delta_y: 50.0 });
        let spacing = session.spacing();
        session.apply(Command::NextPage { count: 1 });
        assert_eq!(session.spacing(), spacing);
    }

    #[test]
    fn page_navigation_is_clamped() {
        let mut session = loaded_session();
        session.drain_events();
        session.apply(Command::PrevPage { count: 3 });
        assert_eq!(session.active_page(), 0);
        assert!(session.drain_events().is_empty());

        session.apply(Command::NextPage { count: 10 });
        assert_eq!(session.active_page(), 2);
        session.apply(Command::GotoPage { page: usize::MAX });
        assert_eq!(session.active_page(), 2);
    }

    #[test]
    fn indexing_recovers_a_page_whose_extraction_failed() {
        let mut session = session();
        let ticket = session.pending_extraction().unwrap();
        session.apply(Command::ExtractionFinished {
            ticket,
            text: Err("broken page".into()),
        });
        assert!(session.lines().is_empty());

        session.apply(Command::PageIndexed {
            page: 0,
            text: "Hello\nWorld".into(),
        });
        session.apply(Command::SetQuery {
            query: "hello".into(),
        });
        assert_eq!(session.lines(), &["Hello", "World"]);
        assert_eq!(session.navigator().cursor(), Some(0));
        assert_eq!(session.snapshot().lines.len(), 2);
    }

    #[test]
    fn indexing_the_pending_page_drops_its_ticket() {
        let mut session = session();
        let ticket = session.pending_extraction().unwrap();
        session.apply(Command::PageIndexed {
            page: 0,
            text: SAMPLE[0].to_owned(),
        });
        assert!(session.pending_extraction().is_none());
        assert_eq!(session.lines().len(), 3);

        session.apply(Command::ExtractionFinished {
            ticket,
            text: Err("late failure".into()),
        });
        assert_eq!(session.lines().len(), 3);
    }

    #[test]
    fn status_line_counts_matches_on_the_shown_page() {
        let mut session = loaded_session();
        index_all(&mut session);
        session.apply(Command::SetQuery {
            query: "dolor".into(),
        });
        assert_eq!(
            session.status_line(),
            "Page 1 of 3 · spacing 1.50 · 1 of 3 · 0 on this page"
        );
        session.apply(Command::SearchNext);
        assert_eq!(session.active_page(), 1);
        assert!(session.status_line().ends_with("· 2 of 3 · 2 on this page"));
    }

    #[test]
    fn staying_on_a_page_preserves_selection() {
        let mut session = loaded_session();
        session.apply(Command::ToggleLine { line: 0 });
        session.apply(Command::GotoPage { page: 0 });
        assert!(session.selection().contains(0));
    }

    #[test]
    fn snapshot_projects_layout_and_highlights() {
        let mut session = loaded_session();
        session.apply(Command::SetQuery {
            query: "hello".into(),
        });
        session.apply(Command::ToggleLine { line: 1 });
        session.apply(Command::DragStart { line: 1 });
        session.apply(Command::DragOver { offset: 10.0 });

        let snapshot = session.snapshot();
        assert_eq!(snapshot.lines.len(), 3);
        assert_eq!(snapshot.lines[0].segments[0].kind, SegmentKind::CurrentMatch);
        assert_eq!(snapshot.lines[2].segments[0].kind, SegmentKind::Match);
        assert_eq!(snapshot.lines[1].layer, Layer::Dragged);
        assert_eq!(snapshot.lines[1].offset, 10.0);
        assert_eq!(snapshot.lines[2].offset, 4.5);
        assert_eq!(
            snapshot.status,
            "Page 1 of 3 · spacing 1.50 · 1 of 2 · 2 on this page"
        );

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"CurrentMatch\""));
    }

    #[test]
    fn selected_text_joins_in_line_order() {
        let mut session = loaded_session();
        session.apply(Command::ToggleLine { line: 2 });
        session.apply(Command::ToggleLine { line: 0 });
        assert_eq!(session.selected_text(), "Hello\nHello again");
    }

    #[tokio::test]
    async fn open_with_uses_provider() {
        struct FakeProvider;

        #[async_trait::async_trait]
        impl DocumentProvider for FakeProvider {
            async fn open(&self, path: &std::path::Path) -> Result<Arc<dyn DocumentBackend>> {
                Ok(Arc::new(MemoryDocument::new(
                    path.to_path_buf(),
                    vec!["only page".into()],
                )))
            }
        }

        let session =
            ViewerSession::open_with(&FakeProvider, PathBuf::from("/tmp/doc.txt"), ViewerConfig::default())
                .await
                .unwrap();
        assert_eq!(session.info().page_count, 1);
        let text = session.backend().page_text(0).unwrap();
        assert_eq!(text, "only page");
    }
}
