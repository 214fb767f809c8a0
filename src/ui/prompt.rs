use super::editor::{InputAction, InputEditor};
use super::input_metrics::{cursor_column, display_width};
use crate::terminal::RawModeGuard;
use anyhow::Result;
use crossterm::{
    cursor::MoveToColumn,
    event, queue,
    terminal::{Clear, ClearType},
};
use std::io::{self, Read, Write};

pub const PROMPT: &str = ">>> ";

/// Where user turns come from.
pub trait InputSource {
    /// `Ok(None)` ends the session; `Ok(Some(""))` is skipped by the caller.
    fn read_input(&mut self) -> Result<Option<String>>;

    /// Interactive sources keep the session going turn after turn.
    fn is_interactive(&self) -> bool;
}

/// Maps a raw line to a turn: `exit`/`quit` end the session.
pub fn submitted_input(line: &str) -> Option<String> {
    let value = line.trim();
    if value.eq_ignore_ascii_case("exit") || value.eq_ignore_ascii_case("quit") {
        return None;
    }
    Some(value.to_string())
}

pub struct TerminalPrompt {
    editor: InputEditor,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            editor: InputEditor::new(),
        }
    }

    fn redraw(&self, out: &mut impl Write) -> Result<()> {
        let column =
            display_width(PROMPT) + cursor_column(self.editor.buffer(), self.editor.cursor());
        queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        write!(out, "{PROMPT}{}", self.editor.buffer())?;
        queue!(out, MoveToColumn(u16::try_from(column).unwrap_or(u16::MAX)))?;
        out.flush()?;
        Ok(())
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for TerminalPrompt {
    fn read_input(&mut self) -> Result<Option<String>> {
        let _raw_mode = RawModeGuard::enable()?;
        let mut stdout = io::stdout();
        self.redraw(&mut stdout)?;

        loop {
            let action = self.editor.apply_event(event::read()?);
            match action {
                InputAction::None => self.redraw(&mut stdout)?,
                InputAction::Submit(line) => {
                    write!(stdout, "\r\n")?;
                    stdout.flush()?;
                    return Ok(submitted_input(&line));
                }
                InputAction::Quit => {
                    write!(stdout, "\r\n")?;
                    stdout.flush()?;
                    return Ok(None);
                }
            }
        }
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

/// Reads the whole of a non-terminal stdin as one message.
pub struct PipedInput<R: Read> {
    reader: Option<R>,
}

impl<R: Read> PipedInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl<R: Read> InputSource for PipedInput<R> {
    fn read_input(&mut self) -> Result<Option<String>> {
        let Some(mut reader) = self.reader.take() else {
            return Ok(None);
        };
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        Ok(submitted_input(&input))
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
