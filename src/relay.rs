use axum::body::Bytes;
use futures::{ future, Stream, StreamExt };
use log::error;
use serde_json::json;
use std::error::Error as StdError;

/// Terminal marker the inference provider sends as the final SSE payload.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Re-streams provider SSE event payloads as newline-delimited JSON frames
/// for the browser.
///
/// Per event, in arrival order:
/// - the `[DONE]` sentinel closes the outbound stream without emitting;
/// - a payload that parses as JSON is wrapped as `{"type":"chunk","data":…}`
///   and emitted as one line;
/// - a payload that fails to parse is logged and dropped, the stream
///   continues;
/// - an upstream transport error is forwarded and ends the stream.
///
/// Nothing is buffered across events and nothing is reordered; the caller
/// sees each chunk as soon as the provider sends it.
pub fn ndjson_relay<S>(
    events: S
) -> impl Stream<Item = Result<Bytes, Box<dyn StdError + Send + Sync>>>
    where S: Stream<Item = Result<String, Box<dyn StdError + Send + Sync>>>
{
    events
        .take_while(|event| {
            let open = !matches!(event, Ok(payload) if payload.trim() == DONE_SENTINEL);
            future::ready(open)
        })
        .filter_map(|event| {
            future::ready(match event {
                Ok(payload) =>
                    match serde_json::from_str::<serde_json::Value>(&payload) {
                        Ok(data) => {
                            let mut line = json!({ "type": "chunk", "data": data }).to_string();
                            line.push('\n');
                            Some(Ok(Bytes::from(line)))
                        }
                        Err(e) => {
                            error!("Dropping unparseable stream event: {} (payload: {})", e, payload);
                            None
                        }
                    }
                Err(e) => Some(Err(e)),
            })
        })
}
