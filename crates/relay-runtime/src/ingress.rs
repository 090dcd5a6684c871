//! Ingress listener translating webapp notification reports into registry
//! upserts.
//!
//! Web applications report their unread state with
//! `POST /{source-identifier}` carrying a JSON body `{"label": "<count>"}`.
//! The listener speaks just enough HTTP/1.1 for that exchange: one request
//! per connection, answered with an empty `200` on success or `400` when the
//! path or body is unusable. Nothing here authenticates or rate-limits
//! callers; a successful report unconditionally overwrites the source's
//! previous state.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use relay_core::error::RelayError;
use relay_core::registry::Registry;
use relay_core::settings::RelayConfig;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Inbound report payload. A body without a `label` field decodes to the
/// empty string, which the renderer suppresses.
#[derive(Debug, Deserialize)]
struct Report {
    #[serde(default)]
    label: String,
}

// ── Listener ──────────────────────────────────────────────────────────────────

/// Bind the notification listener and serve until the task is aborted.
///
/// A bind failure is returned to the caller; everything after a successful
/// bind is per-connection and non-fatal.
pub async fn run_listener(config: &RelayConfig, registry: Arc<Registry>) -> Result<()> {
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind notification listener on {addr}"))?;

    tracing::info!("notification listener started on {addr}");
    serve(listener, registry).await
}

/// Accept loop over an already-bound listener.
///
/// Split out from [`run_listener`] so tests can bind port 0 themselves.
pub async fn serve(listener: TcpListener, registry: Arc<Registry>) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, _peer)) => {
                let registry = registry.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, registry).await {
                        tracing::warn!(error = %e, "error handling notification request");
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
            }
        }
    }
}

// ── Connection handling ───────────────────────────────────────────────────────

async fn handle_connection(stream: TcpStream, registry: Arc<Registry>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    match read_report(&mut reader).await {
        Ok((source, label)) => {
            registry.upsert(&source, &label);
            tracing::debug!(source = %source, label = %label, "notification updated");
            respond(&mut writer, "200 OK").await
        }
        Err(e) => {
            tracing::warn!(error = %e, "rejecting notification request");
            respond(&mut writer, "400 Bad Request").await
        }
    }
}

/// Read one request and extract the `(source, label)` pair.
///
/// The method token is parsed but not enforced, and the registry is untouched
/// on any error.
async fn read_report<R>(reader: &mut R) -> std::result::Result<(String, String), RelayError>
where
    R: AsyncBufRead + Unpin,
{
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let source = source_from_request_line(request_line.trim_end())?;

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        let n = reader.read_line(&mut header).await?;
        let header = header.trim_end();
        if n == 0 || header.is_empty() {
            break;
        }
        if let Some(value) = header_value(header, "content-length") {
            content_length = value
                .parse()
                .map_err(|_| RelayError::MalformedRequest(format!("bad content-length: {value:?}")))?;
        }
    }
    if content_length > MAX_BODY_BYTES {
        return Err(RelayError::BodyTooLarge(content_length));
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;

    let report: Report = serde_json::from_slice(&body)?;
    Ok((source, report.label))
}

async fn respond<W>(writer: &mut W, status: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let response = format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
    writer
        .write_all(response.as_bytes())
        .await
        .context("failed to write response")?;
    writer.shutdown().await.context("failed to close connection")?;
    Ok(())
}

// ── Request parsing ───────────────────────────────────────────────────────────

/// Extract the source identifier from a request line of the form
/// `METHOD /{source} HTTP/1.1`.
fn source_from_request_line(line: &str) -> std::result::Result<String, RelayError> {
    let mut parts = line.split_whitespace();
    let _method = parts
        .next()
        .ok_or_else(|| RelayError::MalformedRequest("empty request line".to_string()))?;
    let target = parts
        .next()
        .ok_or_else(|| RelayError::MalformedRequest(format!("no request target in {line:?}")))?;
    source_from_path(target)
}

/// Extract the source identifier from a request target of the form
/// `/{source}`, ignoring any query string.
fn source_from_path(target: &str) -> std::result::Result<String, RelayError> {
    let path = match target.split_once('?') {
        Some((path, _query)) => path,
        None => target,
    };
    match path.strip_prefix('/') {
        Some(source) if !source.is_empty() => Ok(source.to_string()),
        _ => Err(RelayError::InvalidPath(target.to_string())),
    }
}

/// The value of `header` when its name matches `name` case-insensitively.
fn header_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    let (key, value) = header.split_once(':')?;
    key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
