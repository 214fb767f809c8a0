use crate::api::{ApiClient, ChatOptions};
use crate::config::Config;
use crate::state::{Conversation, StreamSession, TurnOutput};
use crate::ui::prompt::{InputSource, PipedInput, TerminalPrompt};
use crate::ui::render::{ChannelStyle, TerminalSink};
use anyhow::{bail, Result};
use std::io::{self, IsTerminal};

/// One chat session against a single model.
pub struct App {
    client: ApiClient,
    options: ChatOptions,
    conversation: Conversation,
}

impl App {
    pub fn new(config: &Config, options: ChatOptions) -> Result<Self> {
        Ok(Self::with_client(ApiClient::new(config)?, options))
    }

    pub fn with_client(client: ApiClient, options: ChatOptions) -> Self {
        Self {
            client,
            options,
            conversation: Conversation::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub async fn ensure_model_available(&self) -> Result<()> {
        let models = self.client.list_models().await?;
        if !models.iter().any(|model| model.id == self.options.model) {
            bail!(
                "The specified model was not supported. Run 'openrouter models' for available models."
            );
        }
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        self.ensure_model_available().await?;

        let mut input: Box<dyn InputSource> = if io::stdin().is_terminal() {
            Box::new(TerminalPrompt::new())
        } else {
            Box::new(PipedInput::new(io::stdin()))
        };
        let render_live = io::stdout().is_terminal();

        while let Some(line) = input.read_input()? {
            if line.is_empty() {
                continue;
            }

            let session = if render_live {
                StreamSession::interactive(
                    Box::new(TerminalSink::stdout(ChannelStyle::REASONING)),
                    Box::new(TerminalSink::stdout(ChannelStyle::CONTENT)),
                )
            } else {
                StreamSession::buffered(Box::new(io::stdout()))
            };

            match self.run_turn(line, session).await {
                Ok(_) => {}
                Err(error) if input.is_interactive() => eprintln!("Error: {error:#}"),
                Err(error) => return Err(error),
            }

            if !input.is_interactive() {
                break;
            }
        }

        Ok(())
    }

    /// Sends `input` with the history so far and streams the reply through
    /// `session`. The history only keeps the turn when the reply completed.
    pub async fn run_turn(
        &mut self,
        input: String,
        session: StreamSession<'_>,
    ) -> Result<TurnOutput> {
        self.conversation.push_user_message(input);

        let result = match self
            .client
            .create_stream(self.conversation.messages(), &self.options)
            .await
        {
            Ok(body) => session.run(body).await,
            Err(error) => Err(error),
        };

        match &result {
            Ok(output) => self.conversation.record_reply(output),
            Err(_) => {
                self.conversation.discard_pending_user();
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_client::{MockApiClient, MockResponse};
    use crate::types::ApiMessage;
    use std::sync::Arc;

    fn app_with(mock: &MockApiClient, model: &str) -> App {
        App::with_client(
            ApiClient::new_mock(Arc::new(mock.clone())),
            ChatOptions {
                model: model.to_string(),
                temperature: None,
            },
        )
    }

    fn body(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| format!("{line}\n")).collect()
    }

    #[tokio::test]
    async fn test_unknown_model_is_rejected() {
        let mock = MockApiClient::new(Vec::new()).with_models(&["openai/gpt-4o"]);
        let app = app_with(&mock, "nope/model");
        let error = app.ensure_model_available().await.unwrap_err();
        assert!(error.to_string().contains("was not supported"));

        let app = app_with(&mock, "openai/gpt-4o");
        assert!(app.ensure_model_available().await.is_ok());
    }

    #[tokio::test]
    async fn test_history_carries_previous_answers() {
        let mock = MockApiClient::new(vec![
            MockResponse::Body(body(&[
                r#"data: {"choices":[{"delta":{"reasoning":"User greets."}}]}"#,
                r#"data: {"choices":[{"delta":{"content":"Hello!"}}]}"#,
                "data: [DONE]",
            ])),
            MockResponse::Body(body(&[
                r#"data: {"choices":[{"delta":{"content":"Fine."}}]}"#,
                "data: [DONE]",
            ])),
        ]);
        let mut app = app_with(&mock, "m");

        let mut out = Vec::new();
        let first = app
            .run_turn("hi".to_string(), StreamSession::buffered(Box::new(&mut out)))
            .await
            .unwrap();
        assert_eq!(first.content, "\n---\nHello!");

        let mut out = Vec::new();
        app.run_turn(
            "how are you".to_string(),
            StreamSession::buffered(Box::new(&mut out)),
        )
        .await
        .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1],
            vec![
                ApiMessage::user("hi"),
                ApiMessage::assistant("Hello!"),
                ApiMessage::user("how are you"),
            ]
        );
        assert_eq!(app.conversation().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_turns_leave_history_untouched() {
        let mock = MockApiClient::new(vec![
            MockResponse::Rejected("status code 402".to_string()),
            MockResponse::Interrupted {
                chunks: body(&[r#"data: {"choices":[{"delta":{"content":"par"}}]}"#]),
                error: "connection reset".to_string(),
            },
        ]);
        let mut app = app_with(&mock, "m");

        let mut out = Vec::new();
        let error = app
            .run_turn("one".to_string(), StreamSession::buffered(Box::new(&mut out)))
            .await
            .unwrap_err();
        assert!(error.to_string().contains("402"));
        assert!(app.conversation().is_empty());

        let mut out = Vec::new();
        let error = app
            .run_turn("two".to_string(), StreamSession::buffered(Box::new(&mut out)))
            .await
            .unwrap_err();
        assert!(format!("{error:#}").contains("connection reset"));
        assert!(app.conversation().is_empty());
        assert_eq!(String::from_utf8(out).unwrap(), "par\n");
    }
}
