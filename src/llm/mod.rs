use futures::{ Stream, StreamExt };
use log::{ error, info };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::Serialize;
use std::error::Error as StdError;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::models::chat::ChatMessage;

/// Raw SSE event payloads from the provider, in arrival order. The stream
/// yields the payload of each `data:` line, including the terminal
/// `[DONE]` sentinel; interpreting the sentinel is the relay's job.
pub type EventStream = Pin<
    Box<dyn Stream<Item = Result<String, Box<dyn StdError + Send + Sync>>> + Send>
>;

#[derive(Serialize)]
struct ChatCompletionRequest {
    messages: Vec<ChatMessage>,
    model: String,
    stream: bool,
    max_tokens: u32,
    temperature: f32,
    stream_options: StreamOptions,
}

#[derive(Serialize)]
struct StreamOptions {
    include_usage: bool,
}

/// Thin adapter around the remote chat-completion endpoint: owns
/// authentication, request construction, and SSE line framing. One
/// outbound streamed request per call, no retries.
pub struct InferenceClient {
    http: HttpClient,
    endpoint: String,
}

impl InferenceClient {
    pub fn new(
        token: String,
        endpoint: String
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e|
                format!("Invalid inference token format: {}", e)
            )?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self { http, endpoint })
    }

    /// Issues one streamed chat-completion request and returns the SSE
    /// event payloads as they arrive. The response status is awaited here,
    /// so a rejected request fails the call itself; transport failures
    /// after that surface as an error item on the stream.
    pub async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        max_tokens: u32,
        temperature: f32
    ) -> Result<EventStream, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let req = ChatCompletionRequest {
            messages,
            model: model.to_string(),
            stream: true,
            max_tokens,
            temperature,
            stream_options: StreamOptions { include_usage: true },
        };

        info!("Inference request: model {}", req.model);

        let resp = self.http
            .post(&url)
            .json(&req)
            .send().await
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        if let Err(e) = resp.error_for_status_ref() {
            error!("Inference endpoint returned error status: {}", e);
            return Err(Box::new(e) as _);
        }

        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut stream = resp.bytes_stream();
            let mut framing = SseFraming::new();

            while let Some(chunk_result) = stream.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        for payload in framing.push(&chunk) {
                            if tx.send(Ok(payload)).await.is_err() {
                                // Receiver dropped, the browser is gone.
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(Box::new(e) as _)).await;
                        return;
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Reassembles SSE `data:` payloads from raw byte chunks. A network read
/// can end mid-line, so incomplete tails are carried into the next push
/// instead of being dropped.
pub(crate) struct SseFraming {
    carry: Vec<u8>,
}

impl SseFraming {
    pub(crate) fn new() -> Self {
        Self { carry: Vec::new() }
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.carry.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.carry.drain(..=pos).collect();
            match std::str::from_utf8(&line) {
                Ok(text) => {
                    if let Some(payload) = parse_sse_line(text) {
                        payloads.push(payload);
                    }
                }
                Err(e) => {
                    error!("Skipping non-UTF8 SSE line: {}", e);
                }
            }
        }
        payloads
    }
}

/// Extracts the payload of a `data:` line. Comments, `event:`/`id:`/`retry:`
/// fields, and blank separator lines carry no payload.
fn parse_sse_line(line: &str) -> Option<String> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let payload = line.strip_prefix("data:")?;
    Some(payload.strip_prefix(' ').unwrap_or(payload).to_string())
}
