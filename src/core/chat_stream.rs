use std::borrow::Cow;

use futures_util::StreamExt;
use memchr::memchr;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{GenerateContentRequest, GenerateContentResponse};
use crate::core::provider::{ChunkStream, StreamMessage};

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

fn send_error(tx: &mpsc::UnboundedSender<StreamMessage>, error: String) {
    let _ = tx.send(StreamMessage::Error(error));
    let _ = tx.send(StreamMessage::End);
}

/// Returns true once the stream has been terminated.
fn handle_data_payload(payload: &str, tx: &mpsc::UnboundedSender<StreamMessage>) -> bool {
    if payload.trim().is_empty() {
        return false;
    }

    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(_) => {
            send_error(tx, format_api_error(payload));
            return true;
        }
    };

    if value.get("error").is_some() {
        send_error(tx, format_api_error(payload));
        return true;
    }

    match serde_json::from_value::<GenerateContentResponse>(value) {
        Ok(response) => {
            let text = response.text();
            if !text.is_empty() {
                let _ = tx.send(StreamMessage::Chunk(text));
            }
        }
        Err(err) => debug!("skipping unrecognized stream payload: {err}"),
    }
    false
}

fn process_sse_line(line: &str, tx: &mpsc::UnboundedSender<StreamMessage>) -> bool {
    extract_data_payload(line)
        .map(|payload| handle_data_payload(payload, tx))
        .unwrap_or(false)
}

/// Invalid UTF-8 is replaced rather than dropped so the rest of the line's
/// text still reaches the reply.
fn process_sse_bytes(line: &[u8], tx: &mpsc::UnboundedSender<StreamMessage>) -> bool {
    let line = String::from_utf8_lossy(line);
    if let Cow::Owned(_) = line {
        warn!("invalid UTF-8 in stream line; decoding lossily");
    }
    process_sse_line(line.trim(), tx)
}

fn extract_error_summary(value: &Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            // Some gateways wrap the error object in a one-element array.
            value
                .pointer("/0/error/message")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| collapse_whitespace(&text))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Single-line, human-readable summary of an API error body.
pub(crate) fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "API Error: <empty response>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value) {
            if !summary.is_empty() {
                return format!("API Error: {summary}");
            }
        }
        return format!("API Error: {}", collapse_whitespace(&json_value.to_string()));
    }

    format!("API Error: {}", collapse_whitespace(trimmed))
}

pub struct StreamParams {
    pub client: reqwest::Client,
    pub url: String,
    pub api_key: String,
    pub request: GenerateContentRequest,
}

/// Issues the streaming request on a background task and returns the events
/// in arrival order.
pub fn spawn_stream(params: StreamParams) -> ChunkStream {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let StreamParams {
            client,
            url,
            api_key,
            request,
        } = params;

        let response = match client
            .post(url)
            .query(&[("alt", "sse")])
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                send_error(&tx, format_api_error(&e.to_string()));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            warn!("stream request failed with status {status}");
            send_error(&tx, format_api_error(&error_text));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk_bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    send_error(&tx, format!("Connection lost: {e}"));
                    return;
                }
            };
            buffer.extend_from_slice(&chunk_bytes);

            while let Some(newline_pos) = memchr(b'\n', &buffer) {
                let should_end = process_sse_bytes(&buffer[..newline_pos], &tx);
                buffer.drain(..=newline_pos);
                if should_end {
                    return;
                }
            }
        }

        if process_sse_bytes(&buffer, &tx) {
            return;
        }

        let _ = tx.send(StreamMessage::End);
    });

    futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|message| (message, rx))
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<StreamMessage>) -> Vec<StreamMessage> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    #[test]
    fn process_sse_line_handles_spacing_variants() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let lines = [
            r#"data: {"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#,
            r#"data:{"candidates":[{"content":{"parts":[{"text":" World"}]}}]}"#,
        ];

        for line in lines {
            assert!(!process_sse_line(line, &tx));
        }

        assert_eq!(
            drain(&mut rx),
            vec![
                StreamMessage::Chunk("Hello".into()),
                StreamMessage::Chunk(" World".into()),
            ]
        );
    }

    #[test]
    fn invalid_utf8_line_keeps_its_text() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut line = br#"data: {"candidates":[{"content":{"parts":[{"text":"caf"#.to_vec();
        line.push(0xff);
        line.extend_from_slice(br#" ok"}]}}]}"#);
        line.push(b'\r');

        assert!(!process_sse_bytes(&line, &tx));
        assert_eq!(
            drain(&mut rx),
            vec![StreamMessage::Chunk("caf\u{FFFD} ok".into())]
        );
    }

    #[test]
    fn non_data_lines_and_empty_parts_are_ignored() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(!process_sse_line(": keep-alive", &tx));
        assert!(!process_sse_line("event: message", &tx));
        assert!(!process_sse_line(
            r#"data: {"candidates":[{"finishReason":"STOP"}]}"#,
            &tx
        ));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn process_sse_line_routes_stream_errors() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let error_line =
            r#"data: {"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#;

        assert!(process_sse_line(error_line, &tx));
        assert_eq!(
            drain(&mut rx),
            vec![
                StreamMessage::Error("API Error: The model is overloaded.".into()),
                StreamMessage::End,
            ]
        );
    }

    #[test]
    fn garbage_payload_terminates_stream() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(process_sse_line("data: <html>bad gateway</html>", &tx));
        assert_eq!(
            drain(&mut rx),
            vec![
                StreamMessage::Error("API Error: <html>bad gateway</html>".into()),
                StreamMessage::End,
            ]
        );
    }

    #[test]
    fn format_api_error_reads_nested_and_array_messages() {
        let nested = r#"{"error":{"message":"API key not valid.  Please pass a valid API key."}}"#;
        let wrapped = r#"[{"error":{"code":400,"message":"bad request"}}]"#;
        assert_eq!(
            format_api_error(nested),
            "API Error: API key not valid. Please pass a valid API key."
        );
        assert_eq!(format_api_error(wrapped), "API Error: bad request");
    }

    #[test]
    fn format_api_error_handles_json_without_summary_and_plaintext() {
        assert_eq!(
            format_api_error(r#"{"status": "failed"}"#),
            r#"API Error: {"status":"failed"}"#
        );
        assert_eq!(format_api_error("  api\nfailure "), "API Error: api failure");
        assert_eq!(format_api_error(""), "API Error: <empty response>");
    }
}
