//! Streaming support types and the event stream driver.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::pin::Pin;
use tracing::{debug, trace};

use crate::client::ClientError;
use crate::sse::{decode_frame, FrameSplitter};

/// Raw response body chunks as delivered by a transport.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>;

/// Typed events decoded from a streaming response.
///
/// The stream ends after the `[DONE]` terminator or a clean close. Any failure
/// is yielded once as the final item; nothing follows it.
pub type EventStream<T> = Pin<Box<dyn Stream<Item = Result<T, ClientError>> + Send>>;

enum Driver {
    Reading {
        body: ByteStream,
        splitter: FrameSplitter,
    },
    Finished,
}

/// Decode a raw SSE body into a stream of `T` events.
///
/// The body is owned by the returned stream, so dropping the stream before it
/// ends releases the connection. Events are yielded in arrival order, one per
/// non-empty data frame.
///
/// # Example
/// ```
/// use bytes::Bytes;
/// use futures::{stream, StreamExt};
/// use oaikit::stream::decode_event_stream;
/// use oaikit::ClientError;
///
/// # futures::executor::block_on(async {
/// let chunks: Vec<Result<Bytes, ClientError>> = vec![
///     Ok(Bytes::from_static(b"data: {\"n\":1}\n\n")),
///     Ok(Bytes::from_static(b"data: [DONE]\n\n")),
/// ];
/// let mut events = decode_event_stream::<serde_json::Value>(Box::pin(stream::iter(chunks)));
/// assert_eq!(events.next().await.unwrap().unwrap()["n"], 1);
/// assert!(events.next().await.is_none());
/// # });
/// ```
pub fn decode_event_stream<T>(body: ByteStream) -> EventStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let initial = Driver::Reading {
        body,
        splitter: FrameSplitter::new(),
    };

    Box::pin(stream::unfold(initial, |state| async move {
        let Driver::Reading {
            mut body,
            mut splitter,
        } = state
        else {
            return None;
        };

        loop {
            // Drain frames already buffered before reading more data
            while let Some(frame) = splitter.next_frame() {
                trace!(len = frame.payload().len(), "received frame");
                match decode_frame::<T>(&frame) {
                    Ok(Some(event)) => {
                        return Some((Ok(event), Driver::Reading { body, splitter }));
                    }
                    Ok(None) => {
                        debug!("stream terminated by done marker");
                        return None;
                    }
                    Err(e) => {
                        debug!(error = %e, "stream failed while decoding frame");
                        return Some((Err(e), Driver::Finished));
                    }
                }
            }

            match body.next().await {
                Some(Ok(chunk)) => splitter.push(&chunk),
                Some(Err(e)) => {
                    debug!(error = %e, "stream failed in transport");
                    return Some((Err(e), Driver::Finished));
                }
                None => {
                    return match splitter.finish() {
                        Ok(()) => {
                            debug!("stream closed by server");
                            None
                        }
                        Err(failure) => {
                            debug!(error = %failure, "stream closed mid-frame");
                            Some((Err(failure.into()), Driver::Finished))
                        }
                    };
                }
            }
        }
    }))
}
