use anyhow::Result;
use std::io::{self, Stdout, Write};
use termimad::crossterm::{
    cursor::MoveToPreviousLine,
    queue,
    style::Attribute,
    terminal::{self, Clear, ClearType},
};
use termimad::{FmtText, MadSkin};

const FALLBACK_VIEWPORT: (usize, usize) = (80, 24);

/// Paints the accumulated markdown of one channel.
///
/// Every call receives the whole text emitted so far, not the latest
/// fragment, so implementations repaint rather than append.
pub trait RenderSink {
    fn render(&mut self, markdown: &str) -> Result<()>;
}

impl<F> RenderSink for F
where
    F: FnMut(&str) -> Result<()>,
{
    fn render(&mut self, markdown: &str) -> Result<()> {
        self(markdown)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStyle {
    pub dim: bool,
    pub italic: bool,
}

impl ChannelStyle {
    pub const REASONING: Self = Self {
        dim: true,
        italic: true,
    };
    pub const CONTENT: Self = Self {
        dim: false,
        italic: false,
    };
}

pub fn channel_skin(style: ChannelStyle) -> MadSkin {
    let mut skin = MadSkin::default();
    let attrs = [
        (style.dim, Attribute::Dim),
        (style.italic, Attribute::Italic),
    ];
    for (_, attr) in attrs.into_iter().filter(|(enabled, _)| *enabled) {
        skin.paragraph.compound_style.add_attr(attr);
        skin.code_block.compound_style.add_attr(attr);
        skin.bold.add_attr(attr);
        skin.italic.add_attr(attr);
        skin.strikeout.add_attr(attr);
        skin.inline_code.add_attr(attr);
        for header in skin.headers.iter_mut() {
            header.compound_style.add_attr(attr);
        }
    }
    skin
}

/// Markdown renderer for one channel's region of the terminal.
///
/// The region starts wherever the cursor was on the first render. Each
/// later render walks back over the rows it painted last time, clears to
/// the end of the screen and paints the new text. Rows that have already
/// scrolled out of the viewport cannot be revisited.
pub struct TerminalSink<W: Write> {
    out: W,
    skin: MadSkin,
    painted_rows: usize,
    fixed_width: Option<usize>,
}

impl TerminalSink<Stdout> {
    pub fn stdout(style: ChannelStyle) -> Self {
        Self::new(io::stdout(), style)
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, style: ChannelStyle) -> Self {
        Self {
            out,
            skin: channel_skin(style),
            painted_rows: 0,
            fixed_width: None,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.fixed_width = Some(width.max(1));
        self
    }

    pub fn painted_rows(&self) -> usize {
        self.painted_rows
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn width(&self) -> usize {
        self.fixed_width.unwrap_or_else(|| {
            terminal::size()
                .map(|(cols, _)| usize::from(cols).max(1))
                .unwrap_or(FALLBACK_VIEWPORT.0)
        })
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn render(&mut self, markdown: &str) -> Result<()> {
        let text = FmtText::from(&self.skin, markdown, Some(self.width()));

        if self.painted_rows > 0 {
            let rows = u16::try_from(self.painted_rows).unwrap_or(u16::MAX);
            queue!(
                self.out,
                MoveToPreviousLine(rows),
                Clear(ClearType::FromCursorDown)
            )?;
        }
        write!(self.out, "{text}")?;
        self.out.flush()?;

        self.painted_rows = text.lines.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(sink: TerminalSink<Vec<u8>>) -> String {
        String::from_utf8_lossy(&sink.into_inner()).to_string()
    }

    #[test]
    fn test_first_render_paints_without_moving_cursor() {
        let mut sink = TerminalSink::new(Vec::new(), ChannelStyle::CONTENT).with_width(40);
        sink.render("Hello").expect("render");
        assert_eq!(sink.painted_rows(), 1);

        let out = written(sink);
        assert!(out.contains("Hello"));
        assert!(!out.contains("\x1b[J"));
    }

    #[test]
    fn test_second_render_repaints_previous_region() {
        let mut sink = TerminalSink::new(Vec::new(), ChannelStyle::CONTENT).with_width(40);
        sink.render("Hello").expect("first render");
        sink.render("Hello\n\nworld").expect("second render");
        assert!(sink.painted_rows() >= 2);

        let out = written(sink);
        let repaint = out.find("\x1b[1F").expect("cursor moved back one row");
        assert!(out[repaint..].contains("\x1b[J"));
        assert!(out[repaint..].contains("world"));
    }

    #[test]
    fn test_reasoning_skin_is_dim_and_italic() {
        let skin = channel_skin(ChannelStyle::REASONING);
        let attrs = skin.paragraph.compound_style.object_style.attributes;
        assert!(attrs.has(Attribute::Dim));
        assert!(attrs.has(Attribute::Italic));

        let plain = channel_skin(ChannelStyle::CONTENT);
        let attrs = plain.paragraph.compound_style.object_style.attributes;
        assert!(!attrs.has(Attribute::Dim));
    }
}
