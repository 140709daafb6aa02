//! Server-Sent Events (SSE) framing.
//!
//! This module turns an arbitrarily chunked byte stream into complete
//! `data:` frames and decodes each frame payload as JSON. It is shared by
//! every streaming endpoint; only the event type differs.
//!
//! SSE format:
//! ```text
//! data: {"key": "value"}
//!
//! data: {"another": "event"}
//!
//! data: [DONE]
//! ```

use bytes::{Bytes, BytesMut};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::trace;

use crate::client::{ApiErrorEnvelope, ClientError};

const DATA_FIELD: &[u8] = b"data:";
const DONE_MARKER: &[u8] = b"[DONE]";

/// A streaming decode failure, carrying the bytes that could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeFailure {
    /// The stream closed while a partial frame was still buffered.
    #[error("stream truncated mid-frame ({} bytes buffered)", .raw.len())]
    Framing { raw: Bytes },

    /// A complete frame whose payload is not the expected event shape.
    #[error("malformed stream payload: {source}")]
    Payload {
        raw: Bytes,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeFailure {
    /// The offending raw bytes.
    pub fn raw(&self) -> &Bytes {
        match self {
            DecodeFailure::Framing { raw } | DecodeFailure::Payload { raw, .. } => raw,
        }
    }

    /// Whether this failure happened at the framing level rather than in the payload.
    pub fn is_framing(&self) -> bool {
        matches!(self, DecodeFailure::Framing { .. })
    }
}

/// One `data:` line split off the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Bytes,
    terminal: bool,
}

impl Frame {
    fn new(payload: Bytes) -> Self {
        let terminal = is_done_marker(&payload);
        Self { payload, terminal }
    }

    /// The frame payload with the `data:` prefix stripped.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Whether this frame is the `[DONE]` terminator.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

/// Reassembles complete frames from chunks that ignore frame boundaries.
///
/// Bytes are buffered until a line terminator arrives, so multi-byte UTF-8
/// sequences and the terminator itself may be split across chunks freely.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buffer: BytesMut,
    // Prefix of `buffer` already known to hold no line terminator
    scanned: usize,
}

impl FrameSplitter {
    /// Create an empty splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transport chunk. Empty chunks are no-ops.
    pub fn push(&mut self, chunk: &[u8]) {
        if !chunk.is_empty() {
            self.buffer.extend_from_slice(chunk);
        }
    }

    /// Split off the next complete data frame, if one is buffered.
    ///
    /// Blank lines, keep-alive comments (`:`), empty `data:` lines and the
    /// other SSE fields (`event:`, `id:`, `retry:`) are consumed without
    /// producing a frame.
    pub fn next_frame(&mut self) -> Option<Frame> {
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            let pos = self.scanned + offset;
            self.scanned = 0;
            let line = self.buffer.split_to(pos + 1).freeze();
            let line = trim_line_end(line);

            match parse_sse_line(&line) {
                Some(range) if range.is_empty() => trace!("dropping keep-alive data frame"),
                Some(range) => return Some(Frame::new(line.slice(range))),
                None => trace!(len = line.len(), "skipping non-data line"),
            }
        }
        self.scanned = self.buffer.len();
        None
    }

    /// Number of bytes waiting for a line terminator.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Check the residual buffer once the transport has closed cleanly.
    ///
    /// Whitespace-only residue and an unterminated `data: [DONE]` line are
    /// accepted; anything else means the final frame was truncated.
    pub fn finish(&mut self) -> Result<(), DecodeFailure> {
        self.scanned = 0;
        let residue = self.buffer.split().freeze();
        let line = trim_line_end(residue.clone());
        if line.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        match parse_sse_line(&line) {
            Some(range) if is_done_marker(&line[range.clone()]) => Ok(()),
            _ => Err(DecodeFailure::Framing { raw: residue }),
        }
    }
}

/// Decode one frame into an event.
///
/// Returns `Ok(None)` for the terminator. A payload shaped like the API error
/// envelope becomes [`ClientError::Api`]; any other payload that does not match
/// `T` becomes [`DecodeFailure::Payload`]. Unknown fields are ignored.
pub fn decode_frame<T: DeserializeOwned>(frame: &Frame) -> Result<Option<T>, ClientError> {
    if frame.is_terminal() {
        return Ok(None);
    }

    let payload = frame.payload();
    if let Ok(envelope) = serde_json::from_slice::<ApiErrorEnvelope>(payload) {
        return Err(envelope.into_error(None));
    }

    serde_json::from_slice(payload)
        .map(Some)
        .map_err(|source| {
            DecodeFailure::Payload {
                raw: payload.clone(),
                source,
            }
            .into()
        })
}

/// Locate the data portion of an SSE line.
///
/// Lines are in the format `data: <content>`; the single optional space after
/// the colon and surrounding whitespace are not part of the content. Returns
/// `None` for lines that are not `data` fields.
///
/// # Example
/// ```
/// use oaikit::sse::parse_sse_line;
///
/// let line = b"data: {\"key\": \"value\"}";
/// assert_eq!(&line[parse_sse_line(line).unwrap()], b"{\"key\": \"value\"}");
///
/// assert_eq!(parse_sse_line(b"event: ping"), None);
/// ```
pub fn parse_sse_line(line: &[u8]) -> Option<std::ops::Range<usize>> {
    line.strip_prefix(DATA_FIELD)?;
    let mut start = DATA_FIELD.len();
    let mut end = line.len();
    while start < end && line[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && line[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    Some(start..end)
}

/// Check if an SSE data payload marks the end of the stream.
///
/// # Example
/// ```
/// use oaikit::sse::is_done_marker;
///
/// assert!(is_done_marker(b"[DONE]"));
/// assert!(!is_done_marker(b""));
/// assert!(!is_done_marker(b"{\"data\": \"value\"}"));
/// ```
pub fn is_done_marker(data: &[u8]) -> bool {
    data == DONE_MARKER
}

fn trim_line_end(mut line: Bytes) -> Bytes {
    while line.last().is_some_and(|b| *b == b'\n' || *b == b'\r') {
        line.truncate(line.len() - 1);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Choice {
        choice: String,
    }

    fn frames(splitter: &mut FrameSplitter) -> Vec<Frame> {
        std::iter::from_fn(|| splitter.next_frame()).collect()
    }

    #[test]
    fn test_parse_sse_line() {
        let range = |line: &'static [u8]| parse_sse_line(line).map(|r| &line[r]);
        assert_eq!(range(b"data: hello"), Some(&b"hello"[..]));
        assert_eq!(range(b"data:hello"), Some(&b"hello"[..]));
        assert_eq!(range(b"data:   spaces  "), Some(&b"spaces"[..]));
        assert_eq!(range(b"data:"), Some(&b""[..]));
        assert_eq!(range(b": keep-alive"), None);
        assert_eq!(range(b"invalid"), None);
        assert_eq!(range(b""), None);
    }

    #[test]
    fn test_is_done_marker() {
        assert!(is_done_marker(b"[DONE]"));
        assert!(!is_done_marker(b""));
        assert!(!is_done_marker(b"data"));
        assert!(!is_done_marker(b"[DONE"));
    }

    #[test]
    fn splits_complete_frames_and_keeps_partial_tail() {
        let mut splitter = FrameSplitter::new();
        splitter.push(b"data: {\"choice\":\"A\"}\n\ndata: {\"cho");

        let out = frames(&mut splitter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload().as_ref(), b"{\"choice\":\"A\"}");
        assert!(splitter.buffered() > 0);

        splitter.push(b"ice\":\"B\"}\n\n");
        let out = frames(&mut splitter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload().as_ref(), b"{\"choice\":\"B\"}");
        assert_eq!(splitter.buffered(), 0);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let mut splitter = FrameSplitter::new();
        splitter.push(b"data: [DONE]\r\n\r\n");
        let out = frames(&mut splitter);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_terminal());
    }

    #[test]
    fn drops_keep_alive_and_non_data_lines() {
        let mut splitter = FrameSplitter::new();
        splitter.push(b": ping\n\ndata:   \n\nevent: message\nid: 7\nretry: 10\n\n");
        assert!(frames(&mut splitter).is_empty());
        assert!(splitter.finish().is_ok());
    }

    #[test]
    fn empty_chunks_are_ignored() {
        let mut splitter = FrameSplitter::new();
        splitter.push(b"");
        assert_eq!(splitter.buffered(), 0);
        assert!(splitter.next_frame().is_none());
    }

    #[test]
    fn terminator_split_across_chunks() {
        let mut splitter = FrameSplitter::new();
        splitter.push(b"data: [DO");
        assert!(splitter.next_frame().is_none());
        splitter.push(b"NE]\n");
        let frame = splitter.next_frame().unwrap();
        assert!(frame.is_terminal());
    }

    #[test]
    fn long_line_in_small_chunks_is_reassembled() {
        let payload = format!("{{\"choice\":\"{}\"}}", "x".repeat(10_000));
        let script = format!("data: {payload}\n\ndata: {{\"choice\":\"B\"}}\n");

        let mut splitter = FrameSplitter::new();
        let mut out = Vec::new();
        for chunk in script.as_bytes().chunks(7) {
            splitter.push(chunk);
            out.extend(frames(&mut splitter));
        }

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].payload().as_ref(), payload.as_bytes());
        assert_eq!(
            decode_frame::<Choice>(&out[1]).unwrap(),
            Some(Choice { choice: "B".into() })
        );
        assert_eq!(splitter.buffered(), 0);
    }

    #[test]
    fn terminator_after_scanned_prefix_is_found() {
        let mut splitter = FrameSplitter::new();
        splitter.push(b"data: {\"choice\":\"A\"}");
        assert!(splitter.next_frame().is_none());
        assert!(splitter.next_frame().is_none());
        splitter.push(b"\ndata: [DONE]\n");
        assert_eq!(splitter.next_frame().unwrap().payload().as_ref(), b"{\"choice\":\"A\"}");
        assert!(splitter.next_frame().unwrap().is_terminal());
    }

    #[test]
    fn finish_reports_truncated_frame() {
        let mut splitter = FrameSplitter::new();
        splitter.push(b"data: {\"choice\":");
        let failure = splitter.finish().unwrap_err();
        assert!(failure.is_framing());
        assert_eq!(failure.raw().as_ref(), b"data: {\"choice\":");
    }

    #[test]
    fn finish_accepts_whitespace_and_unterminated_done() {
        let mut splitter = FrameSplitter::new();
        splitter.push(b"  \r");
        assert!(splitter.finish().is_ok());

        splitter.push(b"data: [DONE]");
        assert!(splitter.finish().is_ok());

        splitter.push(b"data:[DONE]  \r\n");
        assert!(splitter.next_frame().unwrap().is_terminal());
        splitter.push(b"data: [DONE]x");
        assert!(splitter.finish().is_err());
    }

    #[test]
    fn decode_frame_parses_payload_and_ignores_unknown_fields() {
        let frame = Frame::new(Bytes::from_static(b"{\"choice\":\"A\",\"extra\":1}"));
        let event: Option<Choice> = decode_frame(&frame).unwrap();
        assert_eq!(event, Some(Choice { choice: "A".into() }));
    }

    #[test]
    fn decode_frame_returns_none_for_terminator() {
        let frame = Frame::new(Bytes::from_static(b"[DONE]"));
        assert!(decode_frame::<Choice>(&frame).unwrap().is_none());
    }

    #[test]
    fn decode_frame_reports_payload_failure() {
        let frame = Frame::new(Bytes::from_static(b"{not json"));
        match decode_frame::<Choice>(&frame) {
            Err(ClientError::Decode(failure)) => {
                assert!(!failure.is_framing());
                assert_eq!(failure.raw().as_ref(), b"{not json");
            }
            other => panic!("expected payload failure, got {:?}", other),
        }
    }

    #[test]
    fn decode_frame_reports_shape_mismatch() {
        let frame = Frame::new(Bytes::from_static(b"{\"other\":true}"));
        assert!(matches!(
            decode_frame::<Choice>(&frame),
            Err(ClientError::Decode(DecodeFailure::Payload { .. }))
        ));
    }

    #[test]
    fn decode_frame_surfaces_api_error_envelope() {
        let frame = Frame::new(Bytes::from_static(
            b"{\"error\":{\"message\":\"overloaded\",\"type\":\"server_error\"}}",
        ));
        match decode_frame::<Choice>(&frame) {
            Err(ClientError::Api { message, kind, status, .. }) => {
                assert_eq!(message, "overloaded");
                assert_eq!(kind.as_deref(), Some("server_error"));
                assert_eq!(status, None);
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }
}
