use super::token_streamer::TokenStreamer;
use crate::api::events::{decode_line, Delta, SseEvent};
use crate::api::stream::FrameAssembler;
use crate::ui::render::RenderSink;
use anyhow::Result;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::io::Write;

/// Put between the reasoning and the answer when both are present.
pub const REASONING_SEPARATOR: &str = "\n---\n";
const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Reasoning,
    Content,
    Done,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutput {
    pub reasoning: String,
    /// Everything written to the content channel, including the separator
    /// when one was injected.
    pub content: String,
    separator_injected: bool,
}

impl TurnOutput {
    /// The assistant's reply without the injected separator.
    pub fn answer(&self) -> &str {
        if self.separator_injected {
            self.content
                .strip_prefix(REASONING_SEPARATOR)
                .unwrap_or(&self.content)
        } else {
            &self.content
        }
    }
}

/// Per-turn pipeline: body chunks in, two rendered channels out.
///
/// Interactive sessions paint each channel through its sink while the body
/// streams. Buffered sessions only accumulate and write both sections once
/// the stream has ended.
pub struct StreamSession<'a> {
    phase: StreamPhase,
    assembler: FrameAssembler,
    reasoning: TokenStreamer<'a>,
    content: TokenStreamer<'a>,
    separator_injected: bool,
    buffered_out: Option<Box<dyn Write + 'a>>,
}

impl<'a> StreamSession<'a> {
    pub fn interactive(
        reasoning_sink: Box<dyn RenderSink + 'a>,
        content_sink: Box<dyn RenderSink + 'a>,
    ) -> Self {
        Self {
            phase: StreamPhase::Reasoning,
            assembler: FrameAssembler::new(),
            reasoning: TokenStreamer::new(reasoning_sink),
            content: TokenStreamer::new(content_sink),
            separator_injected: false,
            buffered_out: None,
        }
    }

    pub fn buffered(out: Box<dyn Write + 'a>) -> Self {
        Self {
            phase: StreamPhase::Reasoning,
            assembler: FrameAssembler::new(),
            reasoning: TokenStreamer::detached(),
            content: TokenStreamer::detached(),
            separator_injected: false,
            buffered_out: Some(out),
        }
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Consumes `body` until the done sentinel or its end.
    ///
    /// A transport error still flushes and prints whatever arrived before it,
    /// then surfaces the error.
    pub async fn run<S>(mut self, mut body: S) -> Result<TurnOutput>
    where
        S: Stream<Item = Result<Bytes>> + Unpin,
    {
        while self.phase != StreamPhase::Done {
            match body.next().await {
                Some(Ok(chunk)) => self.feed(&chunk)?,
                Some(Err(error)) => {
                    let error = error.context("response stream interrupted");
                    return Err(match self.complete() {
                        Ok(_) => error,
                        Err(write_error) => error.context(format!(
                            "partial output could not be written: {write_error:#}"
                        )),
                    });
                }
                None => {
                    if let Some(line) = self.assembler.finish() {
                        self.handle_line(&line)?;
                    }
                    break;
                }
            }
        }
        self.complete()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        for line in self.assembler.feed(chunk) {
            if self.phase == StreamPhase::Done {
                break;
            }
            self.handle_line(&line)?;
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Result<()> {
        match decode_line(line) {
            SseEvent::Delta(delta) => self.apply_delta(delta),
            SseEvent::Done => {
                self.phase = StreamPhase::Done;
                Ok(())
            }
            SseEvent::Ignorable => Ok(()),
        }
    }

    fn apply_delta(&mut self, delta: Delta) -> Result<()> {
        if let Some(reasoning) = delta.reasoning.as_deref() {
            self.reasoning.add_tokens(reasoning)?;
        }
        if let Some(content) = delta.content.as_deref() {
            if self.phase == StreamPhase::Reasoning {
                self.enter_content()?;
            }
            self.content.add_tokens(content)?;
        }
        Ok(())
    }

    fn enter_content(&mut self) -> Result<()> {
        self.reasoning.flush()?;
        // The content region is painted below the reasoning region, so the
        // reasoning channel must not repaint from here on.
        self.reasoning.detach_sink();
        self.phase = StreamPhase::Content;

        if !self.separator_injected && !self.reasoning.text().is_empty() {
            self.separator_injected = true;
            self.content.add_tokens(REASONING_SEPARATOR)?;
        }
        Ok(())
    }

    /// Flushes both channels and, for buffered sessions, writes the output.
    pub fn complete(&mut self) -> Result<TurnOutput> {
        self.reasoning.flush()?;
        self.content.flush()?;
        self.phase = StreamPhase::Done;

        let output = TurnOutput {
            reasoning: self.reasoning.text().to_string(),
            content: self.content.text().to_string(),
            separator_injected: self.separator_injected,
        };
        if let Some(out) = self.buffered_out.as_mut() {
            write_sections(out, &output)?;
        }
        Ok(output)
    }
}

fn write_sections(out: &mut dyn Write, output: &TurnOutput) -> Result<()> {
    if !output.reasoning.is_empty() {
        writeln!(out, "{THINK_OPEN}\n{}\n{THINK_CLOSE}", output.reasoning)?;
    }
    if !output.answer().is_empty() {
        writeln!(out, "{}", output.answer())?;
    }
    out.flush()?;
    Ok(())
}
