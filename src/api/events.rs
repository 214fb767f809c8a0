use super::logging::emit_sse_skipped_line;
use crate::types::ChatCompletionChunk;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// Incremental model output carried by one data line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub reasoning: Option<String>,
    pub content: Option<String>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.reasoning.is_none() && self.content.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Delta(Delta),
    Done,
    /// Comments, keep-alives, blank separators and payloads that are not
    /// completion chunks.
    Ignorable,
}

pub fn decode_line(line: &str) -> SseEvent {
    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return SseEvent::Ignorable;
    };
    let data = rest.strip_prefix(' ').unwrap_or(rest);

    if data == DONE_SENTINEL {
        return SseEvent::Done;
    }

    let chunk = match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk,
        Err(error) => {
            emit_sse_skipped_line(data, &error);
            return SseEvent::Ignorable;
        }
    };

    let Some(choice) = chunk.choices.into_iter().next() else {
        return SseEvent::Delta(Delta::default());
    };

    SseEvent::Delta(Delta {
        reasoning: choice.delta.reasoning.filter(|text| !text.is_empty()),
        content: choice.delta.content.filter(|text| !text.is_empty()),
    })
}
