use crate::api::client::ByteStream;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use futures::stream;

/// Builds an in-memory response body that yields `chunks` in order, the way
/// the HTTP transport would hand them over.
pub fn chunked_body<I, C>(chunks: I) -> ByteStream
where
    I: IntoIterator<Item = C>,
    C: Into<Vec<u8>>,
{
    let items: Vec<Result<Bytes>> = chunks
        .into_iter()
        .map(|chunk| Ok(Bytes::from(chunk.into())))
        .collect();
    Box::pin(stream::iter(items))
}

/// Like [`chunked_body`], but the transport fails with `error` after the
/// last chunk.
pub fn failing_body<I, C>(chunks: I, error: &str) -> ByteStream
where
    I: IntoIterator<Item = C>,
    C: Into<Vec<u8>>,
{
    let mut items: Vec<Result<Bytes>> = chunks
        .into_iter()
        .map(|chunk| Ok(Bytes::from(chunk.into())))
        .collect();
    items.push(Err(anyhow!(error.to_string())));
    Box::pin(stream::iter(items))
}

/// Splits `body` into pieces of at most `size` bytes, ignoring UTF-8 and
/// line boundaries.
pub fn split_every(body: &[u8], size: usize) -> Vec<Vec<u8>> {
    body.chunks(size.max(1)).map(<[u8]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_failing_body_yields_chunks_then_error() {
        let mut body = failing_body(["a", "b"], "reset by peer");
        assert_eq!(body.next().await.unwrap().unwrap(), Bytes::from("a"));
        assert_eq!(body.next().await.unwrap().unwrap(), Bytes::from("b"));
        let error = body.next().await.unwrap().unwrap_err();
        assert_eq!(error.to_string(), "reset by peer");
        assert!(body.next().await.is_none());
    }

    #[test]
    fn test_split_every_covers_whole_body() {
        let pieces = split_every("héllo".as_bytes(), 2);
        assert_eq!(pieces.concat(), "héllo".as_bytes());
        assert_eq!(pieces.len(), 3);
    }
}
