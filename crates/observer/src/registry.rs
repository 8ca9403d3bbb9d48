use std::fs;
use std::str;
use std::borrow;
use std::io;
use std::path::Path;
use std::collections;
use std::io::BufRead;

use log::{debug, info};
use memtally_address::AddressRange;

use crate::error::{ParseError, RegistryError};

/// How descriptor lines that don't decode into `id, address, size` are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Fail the whole load on the first malformed line.
    Strict,
    /// Undecodable or missing fields become zero, extra fields are ignored.
    #[default]
    Permissive,
}

/// What happens when a descriptor line reuses an ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The later line replaces the earlier entry.
    #[default]
    Replace,
    /// Fail the load.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    pub parse: ParsePolicy,
    pub duplicates: DuplicatePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub id: u64,
    pub range: AddressRange,
}

/// Monitored regions keyed by their externally assigned ID. Iteration is always by ascending ID.
#[derive(Debug, Default, Clone)]
pub struct RegionRegistry {
    regions: collections::BTreeMap<u64, AddressRange>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a region, returning the range it replaced if the ID was already known.
    pub fn insert(&mut self, id: u64, base: u64, size: u64) -> Option<AddressRange> {
        self.regions.insert(id, AddressRange::new(base, size))
    }

    pub fn get(&self, id: u64) -> Option<Region> {
        self.regions.get(&id).map(|range| Region { id, range: *range })
    }

    pub fn contains(&self, id: u64) -> bool {
        self.regions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Region> + '_ {
        self.regions.iter().map(|(id, range)| Region { id: *id, range: *range })
    }

    pub fn load_file(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let file = fs::File::open(path)
            .map_err(|source| RegistryError::Io { path: path.to_path_buf(), source })?;

        let registry = Self::load(io::BufReader::new(file), options)
            .map_err(|e| match e {
                RegistryError::Read(source) => RegistryError::Io { path: path.to_path_buf(), source },
                e => e,
            })?;

        info!("Loaded {} monitored region(s) from {}", registry.len(), path.display());
        Ok(registry)
    }

    pub fn load(mut reader: impl BufRead, options: LoadOptions) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        let mut buffer = Vec::new();
        let mut line_number = 0;

        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer).map_err(RegistryError::Read)? == 0 {
                break;
            }
            line_number += 1;

            let line = decode_line(&buffer, options.parse)
                .map_err(|reason| ParseError::MalformedLine { line: line_number, reason })?;
            if line.trim().is_empty() {
                continue;
            }

            let (id, base, size) = parse_descriptor_line(&line, line_number, options.parse)?;

            if registry.contains(id) {
                match options.duplicates {
                    DuplicatePolicy::Replace => {
                        debug!("Region {} redefined on line {}, keeping the later definition", id, line_number);
                    },
                    DuplicatePolicy::Reject => {
                        return Err(ParseError::DuplicateId { line: line_number, id }.into());
                    },
                }
            }

            registry.insert(id, base, size);
        }

        Ok(registry)
    }

    pub fn parse_str(input: &str, options: LoadOptions) -> Result<Self, RegistryError> {
        Self::load(input.as_bytes(), options)
    }
}

/// Decodes one raw input line. Invalid UTF-8 is malformed under the strict policy and replaced
/// with U+FFFD otherwise, so the affected fields degrade like any other undecodable field.
pub(crate) fn decode_line(bytes: &[u8], policy: ParsePolicy) -> Result<borrow::Cow<'_, str>, String> {
    match policy {
        ParsePolicy::Strict => str::from_utf8(bytes)
            .map(borrow::Cow::Borrowed)
            .map_err(|e| format!("invalid UTF-8 at byte {}", e.valid_up_to())),
        ParsePolicy::Permissive => Ok(String::from_utf8_lossy(bytes)),
    }
}

const FIELD_NAMES: [&str; 3] = ["id", "address", "size"];

fn parse_descriptor_line(
    line: &str,
    line_number: usize,
    policy: ParsePolicy,
) -> Result<(u64, u64, u64), ParseError> {
    let fields = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .collect::<Vec<&str>>();

    let mut values = [0u64; 3];
    match policy {
        ParsePolicy::Permissive => {
            for (value, field) in values.iter_mut().zip(fields.iter()) {
                *value = field.parse().unwrap_or(0);
            }
        },
        ParsePolicy::Strict => {
            if fields.len() != FIELD_NAMES.len() {
                return Err(ParseError::MalformedLine {
                    line: line_number,
                    reason: format!("expected 3 fields (id, address, size), found {}", fields.len()),
                });
            }

            for ((value, field), name) in values.iter_mut().zip(fields.iter()).zip(FIELD_NAMES) {
                *value = field.parse().map_err(|_| ParseError::MalformedLine {
                    line: line_number,
                    reason: format!("{} `{}` is not a decimal integer", name, field),
                })?;
            }
        },
    }

    Ok((values[0], values[1], values[2]))
}
