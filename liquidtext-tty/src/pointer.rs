use liquidtext_core::Command;
use tracing::trace;

/// Turns raw left-button events into click and drag commands.
///
/// A press followed by a release is a click (toggle selection). Movement
/// while pressed drags the pressed line, but only when it is selected;
/// movement over an unselected line still ends as a click.
#[derive(Debug, Default)]
pub struct PointerTracker {
    pressed: Option<usize>,
    draggable: bool,
    dragging: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn down(&mut self, line: Option<usize>, draggable: bool) {
        self.pressed = line;
        self.draggable = draggable;
        self.dragging = false;
    }

    pub fn drag(&mut self, offset: f32) -> Vec<Command> {
        let Some(line) = self.pressed.filter(|_| self.draggable) else {
            return Vec::new();
        };
        let mut commands = Vec::with_capacity(2);
        if !self.dragging {
            trace!(line, "drag started");
            self.dragging = true;
            commands.push(Command::DragStart { line });
        }
        commands.push(Command::DragOver { offset });
        commands
    }

    pub fn up(&mut self) -> Vec<Command> {
        let pressed = self.pressed.take();
        if std::mem::take(&mut self.dragging) {
            return vec![Command::DragEnd];
        }
        pressed
            .map(|line| vec![Command::ToggleLine { line }])
            .unwrap_or_default()
    }
}
