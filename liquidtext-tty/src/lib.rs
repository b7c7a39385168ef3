use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{
        Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};
use liquidtext_core::{Command, Layer, SegmentKind, ViewSnapshot};

mod pointer;

pub use pointer::PointerTracker;

/// Spacing delta for one `+`/`-` press or ctrl+scroll notch.
pub const PINCH_STEP: f32 = 10.0;

#[derive(Debug, Clone)]
pub enum UiEvent {
    Command(Command),
    BeginSearch,
    SearchQueryChanged { query: String },
    SearchSubmit { query: String },
    SearchCancel,
    PointerDown { row: u16 },
    PointerDrag { row: u16 },
    PointerUp,
    Yank,
    Quit,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

#[derive(Debug, Default)]
pub struct EventMapper {
    pending_count: Option<usize>,
    pending_digits: String,
    mode: InputMode,
    search_buffer: String,
}

impl EventMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        if self.mode != mode {
            self.reset_count();
            self.search_buffer.clear();
            self.mode = mode;
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn map_event(&mut self, event: Event) -> UiEvent {
        match event {
            Event::Mouse(mouse) => self.map_mouse(mouse),
            Event::Key(key) => match self.mode {
                InputMode::Normal => self.map_key_normal(key),
                InputMode::Search => self.map_key_search(key),
            },
            _ => UiEvent::None,
        }
    }

    fn map_mouse(&mut self, mouse: MouseEvent) -> UiEvent {
        let pinch = mouse.modifiers.contains(KeyModifiers::CONTROL);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => UiEvent::PointerDown { row: mouse.row },
            MouseEventKind::Drag(MouseButton::Left) => UiEvent::PointerDrag { row: mouse.row },
            MouseEventKind::Up(MouseButton::Left) => UiEvent::PointerUp,
            MouseEventKind::ScrollUp if pinch => {
                UiEvent::Command(Command::PinchBy { delta_y: PINCH_STEP })
            }
            MouseEventKind::ScrollDown if pinch => UiEvent::Command(Command::PinchBy {
                delta_y: -PINCH_STEP,
            }),
            _ => UiEvent::None,
        }
    }

    fn map_key_normal(&mut self, key: KeyEvent) -> UiEvent {
        let KeyEvent {
            code, modifiers, ..
        } = key;
        match (code, modifiers) {
            (KeyCode::Char(c), KeyModifiers::NONE) if c.is_ascii_digit() => {
                if let Some(digit) = c.to_digit(10) {
                    self.push_digit(digit as usize);
                }
                UiEvent::None
            }
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::PageDown, _) => {
                let count = self.take_count();
                UiEvent::Command(Command::NextPage { count })
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::PageUp, _) => {
                let count = self.take_count();
                UiEvent::Command(Command::PrevPage { count })
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                let page = self.pending_count.take().map_or(0, |n| n.saturating_sub(1));
                self.reset_count();
                UiEvent::Command(Command::GotoPage { page })
            }
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
                self.reset_count();
                UiEvent::Command(Command::GotoPage { page: usize::MAX })
            }
            (KeyCode::Char('/'), KeyModifiers::NONE) => {
                self.set_mode(InputMode::Search);
                UiEvent::BeginSearch
            }
            (KeyCode::Char('n'), KeyModifiers::NONE) => {
                self.reset_count();
                UiEvent::Command(Command::SearchNext)
            }
            (KeyCode::Char('N'), modifiers)
                if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT =>
            {
                self.reset_count();
                UiEvent::Command(Command::SearchPrev)
            }
            (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => {
                let steps = self.take_count() as f32;
                UiEvent::Command(Command::PinchBy {
                    delta_y: PINCH_STEP * steps,
                })
            }
            (KeyCode::Char('-'), _) => {
                let steps = self.take_count() as f32;
                UiEvent::Command(Command::PinchBy {
                    delta_y: -PINCH_STEP * steps,
                })
            }
            (KeyCode::Char('r'), KeyModifiers::NONE) => {
                self.reset_count();
                UiEvent::Command(Command::ResetLayout)
            }
            (KeyCode::Char('y'), KeyModifiers::NONE) => {
                self.reset_count();
                UiEvent::Yank
            }
            (KeyCode::Char('q'), _) => {
                self.reset_count();
                UiEvent::Quit
            }
            _ => {
                self.reset_count();
                UiEvent::None
            }
        }
    }

    fn map_key_search(&mut self, key: KeyEvent) -> UiEvent {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.set_mode(InputMode::Normal);
                UiEvent::SearchCancel
            }
            (KeyCode::Enter, _) => {
                let query = self.search_buffer.clone();
                self.set_mode(InputMode::Normal);
                UiEvent::SearchSubmit { query }
            }
            (KeyCode::Backspace, _) => {
                self.search_buffer.pop();
                UiEvent::SearchQueryChanged {
                    query: self.search_buffer.clone(),
                }
            }
            (KeyCode::Char(c), mods) if mods.is_empty() || mods == KeyModifiers::SHIFT => {
                self.search_buffer.push(c);
                UiEvent::SearchQueryChanged {
                    query: self.search_buffer.clone(),
                }
            }
            _ => UiEvent::None,
        }
    }

    fn push_digit(&mut self, digit: usize) {
        let current = self.pending_count.unwrap_or(0);
        let next = current.saturating_mul(10).saturating_add(digit);
        self.pending_count = Some(next);
        if let Some(c) = char::from_digit(digit as u32, 10) {
            self.pending_digits.push(c);
        }
    }

    fn take_count(&mut self) -> usize {
        let count = self
            .pending_count
            .take()
            .filter(|&count| count > 0)
            .unwrap_or(1);
        self.pending_digits.clear();
        count
    }

    fn reset_count(&mut self) {
        self.pending_count = None;
        self.pending_digits.clear();
    }

    pub fn pending_input(&self) -> Option<String> {
        if matches!(self.mode, InputMode::Search) {
            return Some(format!("/{}", self.search_buffer));
        }
        if self.pending_digits.is_empty() {
            None
        } else {
            Some(self.pending_digits.clone())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedLine {
    pub index: usize,
    pub row: u16,
    pub layer: Layer,
}

/// Maps layout offsets to terminal rows for one snapshot.
///
/// Lines are kept in draw order (plain, then selected, then dragged), so the
/// last line placed on a row is the one visible there.
#[derive(Debug, Clone)]
pub struct ScreenLayout {
    top: u16,
    height: u16,
    rows_per_unit: f32,
    placed: Vec<PlacedLine>,
}

impl ScreenLayout {
    pub fn new(snapshot: &ViewSnapshot, top: u16, height: u16, rows_per_unit: f32) -> Self {
        let mut placed: Vec<PlacedLine> = snapshot
            .lines
            .iter()
            .filter_map(|line| {
                let row = (line.offset * rows_per_unit).round();
                if !row.is_finite() || row < 0.0 || row >= f32::from(height) {
                    return None;
                }
                Some(PlacedLine {
                    index: line.index,
                    row: top + row as u16,
                    layer: line.layer,
                })
            })
            .collect();
        placed.sort_by_key(|line| (line.layer, line.index));
        Self {
            top,
            height,
            rows_per_unit,
            placed,
        }
    }

    pub fn placed(&self) -> &[PlacedLine] {
        &self.placed
    }

    pub fn line_at(&self, row: u16) -> Option<usize> {
        self.placed
            .iter()
            .rev()
            .find(|line| line.row == row)
            .map(|line| line.index)
    }

    /// Layout offset for a pointer at `row`, clamped to the text area.
    pub fn offset_for_row(&self, row: u16) -> f32 {
        let local = row
            .saturating_sub(self.top)
            .min(self.height.saturating_sub(1));
        f32::from(local) / self.rows_per_unit
    }
}

pub struct LineRenderer<W: Write> {
    writer: W,
}

impl<W: Write> LineRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Draws the header, the placed lines and the status line.
    pub fn draw(
        &mut self,
        snapshot: &ViewSnapshot,
        screen: &ScreenLayout,
        columns: u16,
        rows: u16,
        status: &str,
    ) -> Result<()> {
        let width = usize::from(columns.max(1));
        crossterm::queue!(
            self.writer,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            SetAttribute(Attribute::Bold),
            Print(truncate(&snapshot.title, width)),
            SetAttribute(Attribute::Reset)
        )?;

        if snapshot.loading {
            crossterm::queue!(self.writer, cursor::MoveTo(0, 1), Print("loading…"))?;
        }

        for placed in screen.placed() {
            let Some(line) = snapshot.lines.get(placed.index) else {
                continue;
            };
            let marker = match placed.layer {
                Layer::Dragged => "≡ ",
                Layer::Selected => "▌ ",
                Layer::Plain => "  ",
            };
            crossterm::queue!(
                self.writer,
                cursor::MoveTo(0, placed.row),
                Clear(ClearType::CurrentLine),
                Print(marker)
            )?;
            if placed.layer != Layer::Plain {
                crossterm::queue!(self.writer, SetAttribute(Attribute::Bold))?;
            }

            let mut remaining = width.saturating_sub(2);
            for segment in &line.segments {
                if remaining == 0 {
                    break;
                }
                let text = truncate(&segment.text, remaining);
                remaining = remaining.saturating_sub(text.chars().count());
                match segment.kind {
                    SegmentKind::Plain => crossterm::queue!(self.writer, Print(text))?,
                    SegmentKind::Match => crossterm::queue!(
                        self.writer,
                        SetAttribute(Attribute::Underlined),
                        Print(text),
                        SetAttribute(Attribute::NoUnderline)
                    )?,
                    SegmentKind::CurrentMatch => crossterm::queue!(
                        self.writer,
                        SetAttribute(Attribute::Reverse),
                        Print(text),
                        SetAttribute(Attribute::NoReverse)
                    )?,
                }
            }
            crossterm::queue!(self.writer, SetAttribute(Attribute::Reset))?;
        }

        crossterm::queue!(
            self.writer,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            Clear(ClearType::CurrentLine)
        )?;
        write_status_line(&mut self.writer, &truncate(status, width))?;
        Ok(())
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

pub fn write_status_line<W: Write>(writer: &mut W, label: &str) -> io::Result<()> {
    write!(writer, "{}", label)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use liquidtext_core::{LineView, Segment};
    use std::collections::BTreeMap;

    fn key_event(code: KeyCode) -> Event {
        key_event_with_modifiers(code, KeyModifiers::NONE)
    }

    fn key_event_with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse_event(kind: MouseEventKind, row: u16, modifiers: KeyModifiers) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 4,
            row,
            modifiers,
        })
    }

    fn line(index: usize, text: &str, offset: f32, layer: Layer) -> LineView {
        LineView {
            index,
            text: text.into(),
            offset,
            layer,
            segments: vec![Segment {
                kind: SegmentKind::Plain,
                text: text.into(),
            }],
        }
    }

    fn snapshot(lines: Vec<LineView>) -> ViewSnapshot {
        ViewSnapshot {
            document_id: Default::default(),
            title: "sample.txt".into(),
            page: 0,
            page_count: 1,
            loading: false,
            spacing: 1.5,
            query: String::new(),
            selected: Vec::new(),
            overrides: BTreeMap::new(),
            dragging: None,
            lines,
            matches: Vec::new(),
            cursor: None,
            status: String::new(),
        }
    }

    #[test]
    fn event_mapper_uses_numeric_prefix_for_next_page() {
        let mut mapper = EventMapper::new();
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char('1'))),
            UiEvent::None
        ));
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char('2'))),
            UiEvent::None
        ));
        assert_eq!(mapper.pending_input().as_deref(), Some("12"));

        match mapper.map_event(key_event(KeyCode::Char('j'))) {
            UiEvent::Command(Command::NextPage { count }) => assert_eq!(count, 12),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(mapper.pending_input(), None);
    }

    #[test]
    fn event_mapper_resets_prefix_after_use() {
        let mut mapper = EventMapper::new();
        mapper.map_event(key_event(KeyCode::Char('3')));

        match mapper.map_event(key_event(KeyCode::Char('k'))) {
            UiEvent::Command(Command::PrevPage { count }) => assert_eq!(count, 3),
            other => panic!("unexpected event: {:?}", other),
        }

        match mapper.map_event(key_event(KeyCode::Char('k'))) {
            UiEvent::Command(Command::PrevPage { count }) => assert_eq!(count, 1),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn numeric_prefix_before_g_is_a_one_based_page() {
        let mut mapper = EventMapper::new();
        mapper.map_event(key_event(KeyCode::Char('4')));
        match mapper.map_event(key_event(KeyCode::Char('g'))) {
            UiEvent::Command(Command::GotoPage { page }) => assert_eq!(page, 3),
            other => panic!("unexpected event: {:?}", other),
        }
        match mapper.map_event(key_event(KeyCode::Char('g'))) {
            UiEvent::Command(Command::GotoPage { page }) => assert_eq!(page, 0),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn event_mapper_maps_n_and_uppercase_n_to_search_navigation() {
        let mut mapper = EventMapper::new();
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char('n'))),
            UiEvent::Command(Command::SearchNext)
        ));
        assert!(matches!(
            mapper.map_event(key_event_with_modifiers(
                KeyCode::Char('N'),
                KeyModifiers::SHIFT
            )),
            UiEvent::Command(Command::SearchPrev)
        ));
    }

    #[test]
    fn event_mapper_slash_enters_search_mode_and_collects_input() {
        let mut mapper = EventMapper::new();
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char('/'))),
            UiEvent::BeginSearch
        ));
        assert_eq!(mapper.mode(), InputMode::Search);

        for c in ['a', '(', 'b'] {
            mapper.map_event(key_event(KeyCode::Char(c)));
        }
        match mapper.map_event(key_event(KeyCode::Backspace)) {
            UiEvent::SearchQueryChanged { query } => assert_eq!(query, "a("),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(mapper.pending_input().as_deref(), Some("/a("));

        match mapper.map_event(key_event(KeyCode::Enter)) {
            UiEvent::SearchSubmit { query } => assert_eq!(query, "a("),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(mapper.mode(), InputMode::Normal);
    }

    #[test]
    fn escape_cancels_search() {
        let mut mapper = EventMapper::new();
        mapper.map_event(key_event(KeyCode::Char('/')));
        mapper.map_event(key_event(KeyCode::Char('x')));
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Esc)),
            UiEvent::SearchCancel
        ));
        assert_eq!(mapper.pending_input(), None);
    }

    #[test]
    fn plus_minus_and_ctrl_scroll_emulate_pinch() {
        let mut mapper = EventMapper::new();
        match mapper.map_event(key_event(KeyCode::Char('+'))) {
            UiEvent::Command(Command::PinchBy { delta_y }) => assert_eq!(delta_y, PINCH_STEP),
            other => panic!("unexpected event: {:?}", other),
        }
        mapper.map_event(key_event(KeyCode::Char('2')));
        match mapper.map_event(key_event(KeyCode::Char('-'))) {
            UiEvent::Command(Command::PinchBy { delta_y }) => {
                assert_eq!(delta_y, -2.0 * PINCH_STEP)
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match mapper.map_event(mouse_event(
            MouseEventKind::ScrollDown,
            3,
            KeyModifiers::CONTROL,
        )) {
            UiEvent::Command(Command::PinchBy { delta_y }) => assert_eq!(delta_y, -PINCH_STEP),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(
            mapper.map_event(mouse_event(MouseEventKind::ScrollDown, 3, KeyModifiers::NONE)),
            UiEvent::None
        ));
    }

    #[test]
    fn left_button_maps_to_pointer_events() {
        let mut mapper = EventMapper::new();
        assert!(matches!(
            mapper.map_event(mouse_event(
                MouseEventKind::Down(MouseButton::Left),
                5,
                KeyModifiers::NONE
            )),
            UiEvent::PointerDown { row: 5 }
        ));
        assert!(matches!(
            mapper.map_event(mouse_event(
                MouseEventKind::Drag(MouseButton::Left),
                8,
                KeyModifiers::NONE
            )),
            UiEvent::PointerDrag { row: 8 }
        ));
        assert!(matches!(
            mapper.map_event(mouse_event(
                MouseEventKind::Up(MouseButton::Left),
                8,
                KeyModifiers::NONE
            )),
            UiEvent::PointerUp
        ));
    }

    #[test]
    fn reset_and_yank_keys() {
        let mut mapper = EventMapper::new();
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char('r'))),
            UiEvent::Command(Command::ResetLayout)
        ));
        assert!(matches!(
            mapper.map_event(key_event(KeyCode::Char('y'))),
            UiEvent::Yank
        ));
    }

    #[test]
    fn screen_layout_hits_topmost_line() {
        let snap = snapshot(vec![
            line(0, "first", 0.0, Layer::Plain),
            line(1, "second", 2.0, Layer::Plain),
            line(2, "third", 0.0, Layer::Selected),
            line(3, "off screen", 500.0, Layer::Plain),
        ]);
        let screen = ScreenLayout::new(&snap, 1, 20, 1.0);
        assert_eq!(screen.placed().len(), 3);
        assert_eq!(screen.line_at(1), Some(2));
        assert_eq!(screen.line_at(3), Some(1));
        assert_eq!(screen.line_at(2), None);
        assert_eq!(screen.offset_for_row(5), 4.0);
        assert_eq!(screen.offset_for_row(0), 0.0);
        assert_eq!(screen.offset_for_row(200), 19.0);
    }

    #[test]
    fn renderer_draws_lines_and_status() {
        let mut snap = snapshot(vec![line(0, "Lorem ipsum", 0.0, Layer::Plain)]);
        snap.lines[0].segments = vec![
            Segment {
                kind: SegmentKind::CurrentMatch,
                text: "Lorem".into(),
            },
            Segment {
                kind: SegmentKind::Plain,
                text: " ipsum".into(),
            },
        ];
        let screen = ScreenLayout::new(&snap, 1, 10, 1.0);
        let mut renderer = LineRenderer::new(Vec::new());
        renderer
            .draw(&snap, &screen, 40, 12, "Page 1 of 1")
            .unwrap();
        let output = String::from_utf8(renderer.writer().clone()).unwrap();
        assert!(output.contains("sample.txt"));
        assert!(output.contains("Lorem"));
        assert!(output.contains(" ipsum"));
        assert!(output.ends_with("Page 1 of 1"));
    }
}
