use std::fs;
use std::io;
use std::path::Path;
use std::io::BufRead;

use log::warn;
use memtally_accesslog::{AccessEvent, AccessKind};

use crate::hook::Hook;
use crate::error::SourceError;
use crate::registry::{decode_line, ParsePolicy};
use crate::source::EventSource;

/// Reads a plain-text access trace, one access per line: `R <address> <size>` or
/// `W <address> <size>`. Addresses may be decimal or `0x` hex. `#` starts a comment.
pub struct TextTraceSource<R: BufRead> {
    reader: R,
    policy: ParsePolicy,
}

impl<R: BufRead> TextTraceSource<R> {
    pub fn new(reader: R, policy: ParsePolicy) -> Self {
        Self { reader, policy }
    }
}

impl TextTraceSource<io::BufReader<fs::File>> {
    pub fn open(path: impl AsRef<Path>, policy: ParsePolicy) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = fs::File::open(path)
            .map_err(|source| SourceError::Open { path: path.to_path_buf(), source })?;

        Ok(Self::new(io::BufReader::new(file), policy))
    }
}

impl<R: BufRead> EventSource for TextTraceSource<R> {
    fn drive(&mut self, hook: &Hook) -> Result<u64, SourceError> {
        let mut delivered = 0;
        let mut buffer = Vec::new();
        let mut line_number = 0;

        loop {
            buffer.clear();
            if self.reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            line_number += 1;

            let parsed = decode_line(&buffer, self.policy)
                .and_then(|line| parse_trace_line(&line));

            match parsed {
                Ok(Some(event)) => {
                    hook.on_access(event.address, event.size, event.kind);
                    delivered += 1;
                },
                Ok(None) => {},
                Err(reason) => match self.policy {
                    ParsePolicy::Strict => return Err(SourceError::Malformed { line: line_number, reason }),
                    ParsePolicy::Permissive => warn!("Skipping access trace line {}: {}", line_number, reason),
                },
            }
        }

        Ok(delivered)
    }
}

fn parse_trace_line(line: &str) -> Result<Option<AccessEvent>, String> {
    let content = match line.split_once('#') {
        Some((before, _)) => before,
        None => line,
    };

    let fields = content.split_whitespace().collect::<Vec<&str>>();
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() != 3 {
        return Err(format!("expected `<R|W> <address> <size>`, found {} field(s)", fields.len()));
    }

    let kind = match fields[0].to_ascii_lowercase().as_str() {
        "r" | "read" => AccessKind::Read,
        "w" | "write" => AccessKind::Write,
        other => return Err(format!("unknown access kind `{}`", other)),
    };

    Ok(Some(AccessEvent {
        address: parse_integer(fields[1]).ok_or_else(|| format!("invalid address `{}`", fields[1]))?,
        size: parse_integer(fields[2]).ok_or_else(|| format!("invalid size `{}`", fields[2]))?,
        kind,
    }))
}

fn parse_integer(field: &str) -> Option<u64> {
    match field.strip_prefix("0x").or_else(|| field.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => field.parse().ok(),
    }
}
