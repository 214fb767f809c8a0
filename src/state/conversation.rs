use super::stream_session::TurnOutput;
use crate::types::ApiMessage;

/// Message history sent with every request.
///
/// A user turn is pushed before its request goes out. It is either answered
/// with [`Conversation::record_reply`] or taken back with
/// [`Conversation::discard_pending_user`] when the turn fails, so the
/// history never ends with an unanswered user message between turns.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    messages: Vec<ApiMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user_message(&mut self, input: String) {
        self.messages.push(ApiMessage::user(input));
    }

    pub fn record_reply(&mut self, output: &TurnOutput) {
        self.messages.push(ApiMessage::assistant(output.answer()));
    }

    pub fn discard_pending_user(&mut self) -> Option<ApiMessage> {
        match self.messages.last() {
            Some(message) if message.role == "user" => self.messages.pop(),
            _ => None,
        }
    }

    pub fn messages(&self) -> &[ApiMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::stream_session::StreamSession;

    #[test]
    fn test_reply_is_recorded_without_separator() {
        let mut out = Vec::new();
        let mut session = StreamSession::buffered(Box::new(&mut out));
        session
            .feed(
                b"data: {\"choices\":[{\"delta\":{\"reasoning\":\"Hi\"}}]}\n\
                  data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n",
            )
            .unwrap();
        let output = session.complete().unwrap();

        let mut conversation = Conversation::new();
        conversation.push_user_message("greet me".to_string());
        conversation.record_reply(&output);

        assert_eq!(
            conversation.messages(),
            &[ApiMessage::user("greet me"), ApiMessage::assistant("Hello")]
        );
    }

    #[test]
    fn test_discard_only_removes_trailing_user_turn() {
        let mut conversation = Conversation::new();
        conversation.push_user_message("first".to_string());
        conversation.record_reply(&TurnOutput::default());
        assert!(conversation.discard_pending_user().is_none());
        assert_eq!(conversation.len(), 2);

        conversation.push_user_message("second".to_string());
        let discarded = conversation.discard_pending_user().expect("user turn");
        assert_eq!(discarded.content, "second");
        assert_eq!(conversation.len(), 2);
    }
}
