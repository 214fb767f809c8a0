use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::input_metrics::clamp_to_char_boundary_left;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorSnapshot {
    pub buffer: String,
    pub cursor: usize,
}

#[derive(Default, Debug)]
pub struct InputState {
    pub buffer: String,
    pub cursor: usize,
    pub history: Vec<String>,
    pub history_index: Option<usize>,
    pub history_stash: Option<EditorSnapshot>,
}

/// Single-line prompt editor with in-memory history.
pub struct InputEditor {
    pub input_state: InputState,
}

#[derive(Debug, PartialEq, Eq)]
pub enum InputAction {
    None,
    Submit(String),
    Quit,
}

impl InputEditor {
    pub fn new() -> Self {
        Self {
            input_state: InputState::default(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.input_state.buffer
    }

    pub fn cursor(&self) -> usize {
        self.input_state.cursor
    }

    pub fn history(&self) -> &[String] {
        &self.input_state.history
    }

    fn prev_char_boundary(&self, idx: usize) -> usize {
        let i = clamp_to_char_boundary_left(&self.input_state.buffer, idx);
        self.input_state.buffer[..i]
            .char_indices()
            .next_back()
            .map_or(0, |(pos, _)| pos)
    }

    fn next_char_boundary(&self, idx: usize) -> usize {
        let i = clamp_to_char_boundary_left(&self.input_state.buffer, idx);
        match self.input_state.buffer[i..].chars().next() {
            Some(ch) => i + ch.len_utf8(),
            None => self.input_state.buffer.len(),
        }
    }

    fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            buffer: self.input_state.buffer.clone(),
            cursor: self.input_state.cursor,
        }
    }

    fn restore(&mut self, snap: EditorSnapshot) {
        self.input_state.buffer = snap.buffer;
        self.input_state.cursor = clamp_to_char_boundary_left(&self.input_state.buffer, snap.cursor);
    }

    fn leave_history(&mut self) {
        self.input_state.history_index = None;
        self.input_state.history_stash = None;
    }

    pub fn insert_str(&mut self, value: &str) {
        // The prompt is a single line; pasted line breaks become spaces.
        let value: String = value
            .chars()
            .filter(|ch| *ch != '\r')
            .map(|ch| if ch == '\n' { ' ' } else { ch })
            .collect();
        if value.is_empty() {
            return;
        }
        self.leave_history();
        let cursor = clamp_to_char_boundary_left(&self.input_state.buffer, self.input_state.cursor);
        self.input_state.buffer.insert_str(cursor, &value);
        self.input_state.cursor = cursor + value.len();
    }

    pub fn backspace(&mut self) {
        let end = clamp_to_char_boundary_left(&self.input_state.buffer, self.input_state.cursor);
        if end == 0 {
            return;
        }
        self.leave_history();
        let start = self.prev_char_boundary(end);
        self.input_state.buffer.replace_range(start..end, "");
        self.input_state.cursor = start;
    }

    pub fn delete(&mut self) {
        let start = clamp_to_char_boundary_left(&self.input_state.buffer, self.input_state.cursor);
        if start >= self.input_state.buffer.len() {
            return;
        }
        self.leave_history();
        let end = self.next_char_boundary(start);
        self.input_state.buffer.replace_range(start..end, "");
        self.input_state.cursor = start;
    }

    pub fn clear_line(&mut self) {
        self.leave_history();
        self.input_state.buffer.clear();
        self.input_state.cursor = 0;
    }

    /// Takes the current line. Blank lines are not submitted.
    pub fn submit(&mut self) -> Option<String> {
        let value = self.input_state.buffer.trim().to_string();
        if value.is_empty() {
            return None;
        }
        if self.input_state.history.last() != Some(&value) {
            self.input_state.history.push(value.clone());
        }
        self.clear_line();
        Some(value)
    }

    pub fn history_up(&mut self) {
        if self.input_state.history.is_empty() {
            return;
        }

        if self.input_state.history_index.is_none() {
            self.input_state.history_stash = Some(self.snapshot());
        }
        let next_index = match self.input_state.history_index {
            Some(idx) if idx > 0 => idx - 1,
            Some(_) => 0,
            None => self.input_state.history.len().saturating_sub(1),
        };
        self.input_state.history_index = Some(next_index);
        self.input_state.buffer = self.input_state.history[next_index].clone();
        self.input_state.cursor = self.input_state.buffer.len();
    }

    pub fn history_down(&mut self) {
        let Some(idx) = self.input_state.history_index else {
            return;
        };

        if idx + 1 >= self.input_state.history.len() {
            self.input_state.history_index = None;
            if let Some(stash) = self.input_state.history_stash.take() {
                self.restore(stash);
            } else {
                self.input_state.buffer.clear();
                self.input_state.cursor = 0;
            }
        } else {
            let next = idx + 1;
            self.input_state.history_index = Some(next);
            self.input_state.buffer = self.input_state.history[next].clone();
            self.input_state.cursor = self.input_state.buffer.len();
        }
    }

    pub fn apply_event(&mut self, event: Event) -> InputAction {
        match event {
            Event::Paste(text) => {
                self.insert_str(&text);
                InputAction::None
            }
            Event::Key(key) if key.kind != KeyEventKind::Release => self.apply_key(key),
            _ => InputAction::None,
        }
    }

    pub fn apply_key(&mut self, key: KeyEvent) -> InputAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return InputAction::Quit,
            KeyCode::Char('d') if ctrl => {
                if self.input_state.buffer.is_empty() {
                    return InputAction::Quit;
                }
                self.delete();
            }
            KeyCode::Char('u') if ctrl => self.clear_line(),
            KeyCode::Char('a') if ctrl => self.input_state.cursor = 0,
            KeyCode::Char('e') if ctrl => self.input_state.cursor = self.input_state.buffer.len(),
            KeyCode::Enter => {
                if let Some(value) = self.submit() {
                    return InputAction::Submit(value);
                }
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => {
                self.input_state.cursor = self.prev_char_boundary(self.input_state.cursor);
            }
            KeyCode::Right => {
                self.input_state.cursor = self.next_char_boundary(self.input_state.cursor);
            }
            KeyCode::Home => self.input_state.cursor = 0,
            KeyCode::End => self.input_state.cursor = self.input_state.buffer.len(),
            KeyCode::Up => self.history_up(),
            KeyCode::Down => self.history_down(),
            KeyCode::Char(ch) if !ctrl => self.insert_str(ch.encode_utf8(&mut [0; 4])),
            _ => {}
        }

        InputAction::None
    }
}

impl Default for InputEditor {
    fn default() -> Self {
        Self::new()
    }
}
