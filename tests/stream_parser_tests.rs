use openrouter_cli::api::events::{decode_line, Delta, SseEvent};
use openrouter_cli::api::stream::FrameAssembler;

#[test]
fn test_fragmented_line_is_held_until_complete() {
    let mut assembler = FrameAssembler::new();

    let lines = assembler.feed(b"data: {\"choices\":[{\"delta\":{\"con");
    assert!(lines.is_empty());
    assert_eq!(assembler.buffered(), "data: {\"choices\":[{\"delta\":{\"con");

    let lines = assembler.feed(b"tent\":\"Hi\"}}]}\n\n");
    assert_eq!(lines.len(), 2);
    assert_eq!(
        decode_line(&lines[0]),
        SseEvent::Delta(Delta {
            reasoning: None,
            content: Some("Hi".to_string()),
        })
    );
    assert_eq!(decode_line(&lines[1]), SseEvent::Ignorable);
    assert_eq!(assembler.buffered(), "");
}

#[test]
fn test_multibyte_character_split_across_chunks() {
    let mut assembler = FrameAssembler::new();
    let line = "data: {\"choices\":[{\"delta\":{\"content\":\"€\"}}]}\n".as_bytes();
    let euro = line
        .windows(3)
        .position(|window| window == "€".as_bytes())
        .expect("euro sign present");

    assert!(assembler.feed(&line[..euro + 1]).is_empty());
    assert!(assembler.feed(&line[euro + 1..euro + 2]).is_empty());
    let lines = assembler.feed(&line[euro + 2..]);

    assert_eq!(lines.len(), 1);
    match decode_line(&lines[0]) {
        SseEvent::Delta(delta) => assert_eq!(delta.content.as_deref(), Some("€")),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_unterminated_last_line_is_recovered_on_finish() {
    let mut assembler = FrameAssembler::new();
    assert!(assembler.feed(b"data: [DONE]").is_empty());
    assert_eq!(assembler.finish().as_deref(), Some("data: [DONE]"));
    assert_eq!(assembler.finish(), None);
}

#[test]
fn test_parse_error_handling() {
    assert_eq!(decode_line("data: {invalid json}"), SseEvent::Ignorable);
    assert_eq!(decode_line("data: \"just a string\""), SseEvent::Ignorable);
}

#[test]
fn test_keepalive_and_other_fields_are_ignored() {
    assert_eq!(decode_line(": OPENROUTER PROCESSING"), SseEvent::Ignorable);
    assert_eq!(decode_line("event: message"), SseEvent::Ignorable);
    assert_eq!(decode_line("id: 42"), SseEvent::Ignorable);
    assert_eq!(decode_line(""), SseEvent::Ignorable);
}

#[test]
fn test_done_sentinel_with_and_without_space() {
    assert_eq!(decode_line("data: [DONE]"), SseEvent::Done);
    assert_eq!(decode_line("data:[DONE]"), SseEvent::Done);
}

#[test]
fn test_role_only_delta_is_empty() {
    match decode_line(r#"data: {"choices":[{"delta":{"role":"assistant","content":""}}]}"#) {
        SseEvent::Delta(delta) => assert!(delta.is_empty()),
        other => panic!("unexpected event: {other:?}"),
    }
}
