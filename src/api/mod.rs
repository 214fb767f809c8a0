pub mod client;
pub mod events;
pub mod logging;
#[cfg(test)]
pub mod mock_client;
pub mod mock_stream;
pub mod stream;

pub use client::{ApiClient, ByteStream, ChatOptions};
