use crate::ui::render::RenderSink;
use anyhow::Result;

/// Pending text this long without a newline may be emitted at a word
/// boundary.
const MAX_PENDING_BYTES: usize = 256;

/// Buffers the fragments of one channel and decides when they may be
/// painted.
///
/// Pending text is emitted up to its last newline. A run longer than
/// [`MAX_PENDING_BYTES`] with no newline is emitted up to its last
/// whitespace, but only where the unterminated line has balanced inline
/// markup and the cut does not split a backslash escape. Appended text is
/// scanned once, so finding a cut does not depend on the line length.
/// Without a sink the streamer only accumulates.
pub struct TokenStreamer<'a> {
    text: String,
    emitted: usize,
    scanned: usize,
    markup: MarkupScan,
    last_newline_end: Option<usize>,
    last_balanced_cut: Option<usize>,
    sink: Option<Box<dyn RenderSink + 'a>>,
}

impl<'a> TokenStreamer<'a> {
    pub fn new(sink: Box<dyn RenderSink + 'a>) -> Self {
        Self::with_sink(Some(sink))
    }

    pub fn detached() -> Self {
        Self::with_sink(None)
    }

    fn with_sink(sink: Option<Box<dyn RenderSink + 'a>>) -> Self {
        Self {
            text: String::new(),
            emitted: 0,
            scanned: 0,
            markup: MarkupScan::default(),
            last_newline_end: None,
            last_balanced_cut: None,
            sink,
        }
    }

    pub fn add_tokens(&mut self, tokens: &str) -> Result<()> {
        if tokens.is_empty() {
            return Ok(());
        }
        self.text.push_str(tokens);
        self.scan_appended();
        match self.safe_boundary() {
            Some(end) => self.emit(end),
            None => Ok(()),
        }
    }

    /// Emits everything pending. A no-op when nothing is pending.
    pub fn flush(&mut self) -> Result<()> {
        if self.emitted == self.text.len() {
            return Ok(());
        }
        self.emit(self.text.len())
    }

    /// Stops painting; later fragments are still accumulated.
    pub fn detach_sink(&mut self) {
        self.sink = None;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pending(&self) -> &str {
        &self.text[self.emitted..]
    }

    pub fn into_text(self) -> String {
        self.text
    }

    fn scan_appended(&mut self) {
        let start = self.scanned;
        for (offset, ch) in self.text[start..].char_indices() {
            let end = start + offset + ch.len_utf8();
            if ch == '\n' {
                self.markup = MarkupScan::default();
                self.last_newline_end = Some(end);
                self.last_balanced_cut = None;
                continue;
            }
            self.markup.step(ch);
            if ch.is_whitespace() && self.markup.is_balanced() {
                self.last_balanced_cut = Some(end);
            }
        }
        self.scanned = self.text.len();
    }

    fn safe_boundary(&self) -> Option<usize> {
        let unemitted = |end: &usize| *end > self.emitted;
        if let Some(end) = self.last_newline_end.filter(unemitted) {
            return Some(end);
        }
        if self.text.len() - self.emitted <= MAX_PENDING_BYTES {
            return None;
        }
        self.last_balanced_cut.filter(unemitted)
    }

    fn emit(&mut self, end: usize) -> Result<()> {
        self.emitted = end;
        match self.sink.as_mut() {
            Some(sink) => sink.render(&self.text[..end]),
            None => Ok(()),
        }
    }
}

/// Inline markup state of the current line.
///
/// Delimiter runs (`**`, a single backtick, ...) toggle their marker once.
/// `*` and `_` runs with whitespace on both sides are literal, as is an
/// `_` run inside a word, so bullets, arithmetic and snake_case names never
/// hold a line open.
#[derive(Debug, Default, Clone, Copy)]
struct MarkupScan {
    prev: Option<char>,
    escaped: bool,
    run: Option<DelimiterRun>,
    open_code: bool,
    open_stars: bool,
    open_underscores: bool,
}

#[derive(Debug, Clone, Copy)]
struct DelimiterRun {
    delim: char,
    before: Option<char>,
}

impl MarkupScan {
    fn step(&mut self, ch: char) {
        if let Some(run) = self.run {
            if ch == run.delim {
                self.prev = Some(ch);
                return;
            }
            self.run = None;
            self.close_run(run, ch);
        }

        if self.escaped {
            self.escaped = false;
        } else if ch == '\\' {
            self.escaped = true;
        } else if matches!(ch, '`' | '*' | '_') {
            self.run = Some(DelimiterRun {
                delim: ch,
                before: self.prev,
            });
        }
        self.prev = Some(ch);
    }

    fn close_run(&mut self, run: DelimiterRun, after: char) {
        let spaced = run.before.map_or(true, char::is_whitespace) && after.is_whitespace();
        let intraword = run.before.is_some_and(char::is_alphanumeric) && after.is_alphanumeric();
        match run.delim {
            '`' => self.open_code = !self.open_code,
            '*' if !spaced => self.open_stars = !self.open_stars,
            '_' if !spaced && !intraword => self.open_underscores = !self.open_underscores,
            _ => {}
        }
    }

    fn is_balanced(&self) -> bool {
        self.run.is_none()
            && !self.escaped
            && !self.open_code
            && !self.open_stars
            && !self.open_underscores
    }
}
