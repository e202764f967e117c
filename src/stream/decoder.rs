//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes are assembled into lines; every `data:` line becomes one
//! [`StreamEvent`] handed to the caller in arrival order.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{Error, Result};
use crate::stream::event::StreamEvent;
use crate::utils::constants::{SSE_DATA_FIELD, SSE_DONE_SENTINEL, SSE_MAX_LINE_BYTES};

enum Line<T> {
    Skip,
    Event(StreamEvent<T>),
}

/// Drive `source` to completion, pushing every decoded event into `handler`.
///
/// Returns as soon as `[DONE]` is seen, without reading further. A payload
/// that fails to parse is reported as [`StreamEvent::Failed`] and decoding
/// continues. A failing source ends decoding with [`Error::Stream`]. Reaching
/// the end of the source without `[DONE]` is not an error.
pub async fn decode<S, E, T, F>(source: S, mut handler: F) -> Result<()>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
    T: DeserializeOwned,
    F: FnMut(StreamEvent<T>),
{
    let mut source = std::pin::pin!(source);
    let mut buffer: Vec<u8> = Vec::new();
    // bytes of `buffer` already known to hold no newline
    let mut scanned = 0;

    while let Some(chunk) = source.next().await {
        let chunk = chunk.map_err(|e| Error::Stream(e.into()))?;
        buffer.extend_from_slice(&chunk);

        while let Some(offset) = buffer[scanned..].iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = buffer.drain(..=scanned + offset).collect();
            scanned = 0;
            if deliver(parse_line(&raw), &mut handler) {
                return Ok(());
            }
        }
        scanned = buffer.len();

        if buffer.len() > SSE_MAX_LINE_BYTES {
            return Err(Error::Stream(
                format!("event-stream line exceeds {} bytes", SSE_MAX_LINE_BYTES).into(),
            ));
        }
    }

    // last line without a trailing newline
    if !buffer.is_empty() {
        deliver(parse_line::<T>(&buffer), &mut handler);
    }
    Ok(())
}

/// Returns true once the completion marker has been delivered.
fn deliver<T, F>(line: Line<T>, handler: &mut F) -> bool
where
    F: FnMut(StreamEvent<T>),
{
    match line {
        Line::Skip => false,
        Line::Event(event) => {
            let done = event.is_done();
            handler(event);
            done
        }
    }
}

fn parse_line<T: DeserializeOwned>(raw: &[u8]) -> Line<T> {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim();
    if line.is_empty() {
        return Line::Skip;
    }

    let Some(data) = line.strip_prefix(SSE_DATA_FIELD) else {
        trace!(line = %line, "ignoring non-data line");
        return Line::Skip;
    };

    let data = data.trim();
    if data == SSE_DONE_SENTINEL {
        return Line::Event(StreamEvent::Done);
    }

    match serde_json::from_str::<T>(data) {
        Ok(payload) => Line::Event(StreamEvent::Chunk(payload)),
        Err(e) => Line::Event(StreamEvent::Failed(Error::Decode(e))),
    }
}
