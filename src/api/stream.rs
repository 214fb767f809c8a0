/// Accumulates raw body chunks and hands back complete, trimmed lines.
///
/// Text after the last newline stays buffered until a later chunk completes
/// it. A UTF-8 sequence cut by a chunk boundary is held back as raw bytes
/// so it decodes intact once the rest arrives; genuinely invalid bytes are
/// replaced with U+FFFD.
#[derive(Default)]
pub struct FrameAssembler {
    buffer: String,
    undecoded: Vec<u8>,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.undecoded.extend_from_slice(chunk);
        let decodable = self.undecoded.len() - incomplete_utf8_suffix_len(&self.undecoded);
        if decodable > 0 {
            self.buffer
                .push_str(&String::from_utf8_lossy(&self.undecoded[..decodable]));
            self.undecoded.drain(..decodable);
        }

        let mut lines = Vec::new();
        let mut start = 0;

        while let Some(offset) = self.buffer[start..].find('\n') {
            let line_end = start + offset;
            lines.push(self.buffer[start..line_end].trim().to_string());
            start = line_end + 1;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }

        lines
    }

    /// Drains whatever is left once the body has ended. Returns the
    /// unterminated last line, if it holds anything besides whitespace.
    pub fn finish(&mut self) -> Option<String> {
        if !self.undecoded.is_empty() {
            self.buffer
                .push_str(&String::from_utf8_lossy(&self.undecoded));
            self.undecoded.clear();
        }
        let rest = std::mem::take(&mut self.buffer);
        let line = rest.trim();
        if line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }

    pub fn buffered(&self) -> &str {
        &self.buffer
    }
}

/// Length of a trailing multibyte sequence that is still missing bytes.
fn incomplete_utf8_suffix_len(bytes: &[u8]) -> usize {
    let window_start = bytes.len().saturating_sub(3);
    for start in (window_start..bytes.len()).rev() {
        let lead = bytes[start];
        if lead & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        let needed = match lead {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return 0,
        };
        let available = bytes.len() - start;
        return if available < needed { available } else { 0 };
    }
    0
}
