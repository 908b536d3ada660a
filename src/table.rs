use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::section::{Diagnostic, Query, Section};

/// Widest integer [`SectionTable::get_unsigned_int`] can return, in bytes.
pub const MAX_INT_SIZE: usize = 16;

/// Byte order used to combine bytes into an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl FromStr for Endian {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LE" => Ok(Endian::Little),
            "BE" => Ok(Endian::Big),
            _ => Err(Error::InvalidEndian(s.to_string())),
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endian::Little => "LE",
            Endian::Big => "BE",
        })
    }
}

/// All sections found in one `objdump -s` dump, in input order.
///
/// Chunks of input that did not parse are kept as `None` entries so that
/// entry indices follow the input; lookups skip them.
#[derive(Debug, Clone, Default)]
pub struct SectionTable {
    entries: Vec<Option<Section>>,
    diagnostics: Vec<Diagnostic>,
}

impl SectionTable {
    /// Reads and parses the dump at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(&raw))
    }

    /// Parses raw dump contents. Invalid UTF-8 is replaced, `\r\n` line
    /// endings are accepted.
    pub fn from_bytes(raw: &[u8]) -> Self {
        let lines: Vec<Cow<'_, str>> = raw
            .split_inclusive(|&b| b == b'\n')
            .map(|line| {
                let line = line.strip_suffix(b"\n").unwrap_or(line);
                String::from_utf8_lossy(line.strip_suffix(b"\r").unwrap_or(line))
            })
            .collect();
        Self::from_lines(&lines)
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut table = Self::default();
        let mut rest = lines;
        while !rest.is_empty() {
            let consumed = lines.len() - rest.len();
            let (parsed, remaining) = Section::parse_one(rest);
            match parsed {
                Ok(section) => table.entries.push(Some(section)),
                Err(mut diagnostic) => {
                    diagnostic.line += consumed;
                    table.diagnostics.push(diagnostic);
                    table.entries.push(None);
                }
            }
            rest = remaining;
        }
        table
    }

    /// Every parse result in input order, including failed chunks.
    pub fn entries(&self) -> &[Option<Section>] {
        &self.entries
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> + '_ {
        self.entries.iter().flatten()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of successfully parsed sections.
    pub fn len(&self) -> usize {
        self.sections().count()
    }

    pub fn is_empty(&self) -> bool {
        self.sections().next().is_none()
    }

    /// First section in table order that contains the query. Overlapping
    /// sections are not resolved further.
    pub fn find(&self, query: Query<'_>) -> Option<&Section> {
        self.sections().find(|section| section.contains(&query))
    }

    /// Reads a `size`-byte unsigned integer at `address`.
    ///
    /// `section` may be [`ANY_SECTION`](crate::ANY_SECTION). Returns `None`
    /// if no section contains `address`, the read runs past the end of the
    /// matching section, or `size` is wider than [`MAX_INT_SIZE`].
    pub fn get_unsigned_int(
        &self,
        section: &str,
        address: u64,
        size: usize,
        endian: Endian,
    ) -> Option<u128> {
        if address % 4 != 0 || size % 4 != 0 {
            eprintln!("warning: unaligned access of {size} bytes at {address:#010x}");
        }
        if size > MAX_INT_SIZE {
            eprintln!("warning: cannot read {size} bytes into a {MAX_INT_SIZE}-byte integer");
            return None;
        }

        let found = self.find(Query::new(section, address))?;
        let bytes = found.slice(address..address.checked_add(size as u64)?)?;
        let value = bytes.iter().enumerate().fold(0u128, |value, (i, &byte)| {
            let shift = match endian {
                Endian::Little => i * 8,
                Endian::Big => (size - 1 - i) * 8,
            };
            value | (u128::from(byte) << shift)
        });
        Some(value)
    }

    /// Little-endian 32-bit read.
    pub fn read_u32(&self, section: &str, address: u64) -> Option<u32> {
        self.get_unsigned_int(section, address, 4, Endian::Little)
            .map(|value| value as u32)
    }

    /// Reads the NUL-terminated string at `address`. The string runs to the
    /// end of the section if there is no NUL.
    pub fn get_string(&self, section: &str, address: u64) -> Option<String> {
        let found = self.find(Query::new(section, address))?;
        let tail = found.slice(address..)?;
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Some(String::from_utf8_lossy(&tail[..end]).into_owned())
    }
}
