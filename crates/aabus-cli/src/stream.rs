//! `monitor` and `replay`: decode one byte stream and print its records.

use std::fs::File;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use aabus_core::{ChunkSource, ReaderSource, StreamDecoder};
use anyhow::Context;
use tracing::{debug, info};

use crate::CliError;
use crate::render::{json_line, text_line};

#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
    pub json: bool,
    /// Stamp JSON lines with the current time.
    pub stamped: bool,
}

pub fn cmd_monitor(
    addr: &str,
    connect_timeout: Option<u64>,
    chunk_size: usize,
    print: PrintOptions,
) -> Result<(), CliError> {
    let target = resolve_addr(addr)?;
    let connected = match connect_timeout {
        Some(secs) => TcpStream::connect_timeout(&target, Duration::from_secs(secs)),
        None => TcpStream::connect(target),
    };
    let stream = connected.map_err(|err| {
        CliError::new(
            format!("failed to connect to {addr}: {err}"),
            Some("check the bridge address or set AABUS_ADDR".to_string()),
        )
    })?;
    info!(%target, "connected");

    let source = ReaderSource::with_chunk_size(target.to_string(), stream, chunk_size);
    let mut out = io::stdout().lock();
    pump(source, print, &mut out)?;
    info!(%target, "connection closed");
    Ok(())
}

pub fn cmd_replay(input: &Path, chunk_size: usize, print: PrintOptions) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    if input == Path::new("-") {
        let source = ReaderSource::with_chunk_size("stdin", io::stdin().lock(), chunk_size);
        return pump(source, print, &mut out);
    }

    if !input.is_file() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a raw dump of the bridge stream, or '-' for stdin".to_string()),
        ));
    }
    let file = File::open(input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let source = ReaderSource::with_chunk_size(input.display().to_string(), file, chunk_size);
    pump(source, print, &mut out)
}

/// Decode `source` to its end, writing one line per record to `out`.
pub fn pump<S: ChunkSource, W: Write>(
    mut source: S,
    print: PrintOptions,
    out: &mut W,
) -> Result<(), CliError> {
    let mut decoder = StreamDecoder::new();
    while let Some(chunk) = source.next_chunk().context("Failed to read input")? {
        for record in decoder.feed(&chunk.data) {
            let line = if print.json {
                json_line(&record, print.stamped).context("JSON serialization failed")?
            } else {
                text_line(&record)
            };
            writeln!(out, "{line}").context("Failed to write output")?;
        }
        out.flush().context("Failed to write output")?;
    }

    let stats = decoder.stats();
    debug!(
        frames = stats.frames,
        records = stats.records,
        rejections = stats.rejections,
        retained = decoder.retained().len(),
        "stream ended"
    );
    Ok(())
}

fn resolve_addr(addr: &str) -> Result<SocketAddr, CliError> {
    let invalid = |detail: String| {
        CliError::new(
            format!("invalid bridge address '{addr}'"),
            Some(format!("expected host:port ({detail})")),
        )
    };
    addr.to_socket_addrs()
        .map_err(|err| invalid(err.to_string()))?
        .next()
        .ok_or_else(|| invalid("no address found".to_string()))
}

#[cfg(test)]
mod tests {
    use aabus_core::ReaderSource;

    use super::{PrintOptions, pump, resolve_addr};

    const TEXT: PrintOptions = PrintOptions {
        json: false,
        stamped: false,
    };

    #[test]
    fn pump_prints_one_line_per_record() {
        let input = b"<U>getCAN 0103031200501010205010100 0103</U=4c><U>Ping</U=00>";
        let source = ReaderSource::with_chunk_size("test", &input[..], 5);
        let mut out = Vec::new();
        pump(source, TEXT, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("getCAN unit:03120 from:CB register:05:Sys Status"));
    }

    #[test]
    fn pump_json_lines() {
        let input = b"<U>setCAN 0101aabbc0aaabbcc0000 0101aabbc0a112233</U=2f>";
        let source = ReaderSource::new("test", &input[..]);
        let mut out = Vec::new();
        pump(
            source,
            PrintOptions {
                json: true,
                stamped: false,
            },
            &mut out,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let uids: Vec<String> = text
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["decoded"]["uid"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(uids, vec!["aabbcc", "112233"]);
    }

    #[test]
    fn resolve_rejects_missing_port() {
        let err = resolve_addr("192.168.1.2").unwrap_err();
        assert!(err.message.contains("invalid bridge address"));
        assert!(resolve_addr("127.0.0.1:10002").is_ok());
    }
}
