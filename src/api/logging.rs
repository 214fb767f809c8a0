use crate::util::parse_switch;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{IsTerminal, Write};

const DEFAULT_API_LOG_PATH: &str = "/tmp/openrouter-cli-debug.log";
const DEBUG_PAYLOAD_ENV: &str = "OPENROUTER_DEBUG_PAYLOAD";
const API_LOG_PATH_ENV: &str = "OPENROUTER_LOG_PATH";

pub fn debug_payload_enabled() -> bool {
    std::env::var(DEBUG_PAYLOAD_ENV)
        .ok()
        .as_deref()
        .and_then(parse_switch)
        .unwrap_or(false)
}

pub fn emit_debug_payload(request_url: &str, payload: &Value) {
    let formatted_payload = serde_json::to_string_pretty(payload)
        .unwrap_or_else(|_| "<payload serialization error>".to_string());
    let message = format!(
        "OPENROUTER_API DEBUG payload_request url={request_url}\npayload:\n{formatted_payload}\n"
    );
    emit_log_message(&message);
}

/// Records a data line that was skipped because its payload was not a
/// usable completion chunk. Only written when debug logging is enabled.
pub fn emit_sse_skipped_line(json_data: &str, parse_error: &serde_json::Error) {
    if !debug_payload_enabled() {
        return;
    }
    let message =
        format!("OPENROUTER_API DEBUG sse_line_skipped error={parse_error}\ndata:\n{json_data}\n");
    emit_log_message(&message);
}

pub fn emit_stream_failure(request_url: &str, error: &anyhow::Error) {
    let message = format!("OPENROUTER_API ERROR stream_failed url={request_url} error={error:#}\n");
    emit_log_message(&message);
}

fn emit_log_message(message: &str) {
    if let Some(path) = resolve_log_path() {
        if append_log_file(&path, message).is_ok() {
            return;
        }
    }

    eprintln!("{message}");
}

fn resolve_log_path() -> Option<String> {
    std::env::var(API_LOG_PATH_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            if std::io::stderr().is_terminal() {
                Some(DEFAULT_API_LOG_PATH.to_string())
            } else {
                None
            }
        })
}

fn append_log_file(path: &str, message: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(message.as_bytes())
}
