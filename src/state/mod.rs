pub mod conversation;
pub mod stream_session;
pub mod token_streamer;

pub use conversation::Conversation;
pub use stream_session::{StreamPhase, StreamSession, TurnOutput, REASONING_SEPARATOR};
pub use token_streamer::TokenStreamer;
