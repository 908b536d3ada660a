use std::fmt;
use std::ops::{Bound, RangeBounds};

use crate::hexdump::{parse_data_line, parse_header};

/// Section name that matches every section in a [`Query`].
pub const ANY_SECTION: &str = "any";

/// A lookup key: a section name (or [`ANY_SECTION`]) and an absolute address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query<'a> {
    pub section: &'a str,
    pub address: u64,
}

impl<'a> Query<'a> {
    pub fn new(section: &'a str, address: u64) -> Self {
        Self { section, address }
    }

    pub fn any(address: u64) -> Self {
        Self::new(ANY_SECTION, address)
    }
}

/// Why a chunk of input did not produce a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// No section header in the rest of the input.
    NoHeader,
    /// The header was found, but the line after it is not a data line.
    MalformedFirstLine { section: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number of the offending line.
    pub line: usize,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::NoHeader => {
                write!(f, "line {}: no section header in remaining input", self.line)
            }
            DiagnosticKind::MalformedFirstLine { section } => write!(
                f,
                "line {}: section {} has no valid data line, dropped",
                self.line, section
            ),
        }
    }
}

/// One named, contiguous range of bytes at a virtual address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    start_address: u64,
    data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    SeekHeader,
    ReadFirstLine,
    ReadDataLines,
    Done,
}

impl Section {
    pub fn new(name: impl Into<String>, start_address: u64, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            start_address,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_address(&self) -> u64 {
        self.start_address
    }

    /// First address past the end of the section.
    pub fn end_address(&self) -> u64 {
        self.start_address.saturating_add(self.data.len() as u64)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if the query names this section (or any section) and its
    /// address falls inside the section.
    pub fn contains(&self, query: &Query<'_>) -> bool {
        (query.section == ANY_SECTION || query.section == self.name)
            && self.start_address <= query.address
            && query.address < self.end_address()
    }

    pub fn byte_at(&self, address: u64) -> Option<u8> {
        self.data.get(self.offset(address)?).copied()
    }

    /// Returns the bytes covered by an absolute address range, or `None` if
    /// the range is not inside the section.
    pub fn slice(&self, range: impl RangeBounds<u64>) -> Option<&[u8]> {
        let start = match range.start_bound() {
            Bound::Included(&address) => self.offset(address)?,
            Bound::Excluded(&address) => self.offset(address.checked_add(1)?)?,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&address) => self.offset(address)?.checked_add(1)?,
            Bound::Excluded(&address) => self.offset(address)?,
            Bound::Unbounded => self.data.len(),
        };
        self.data.get(start..end)
    }

    /// Offset of `address` relative to the section start. Not bounded by
    /// the section length.
    fn offset(&self, address: u64) -> Option<usize> {
        usize::try_from(address.checked_sub(self.start_address)?).ok()
    }

    /// Parses the next section out of `lines`.
    ///
    /// Lines before the first `Contents of section` header are skipped. The
    /// section ends at the first line that is not a data line; that line is
    /// left unconsumed at the head of the returned remainder. When no header
    /// is left the remainder is empty. When the header is not followed by a
    /// data line, the remainder starts at that line so parsing can resume.
    pub fn parse_one<S: AsRef<str>>(lines: &[S]) -> (Result<Section, Diagnostic>, &[S]) {
        let mut state = ParseState::SeekHeader;
        let mut cursor = 0;
        let mut name = "";
        let mut start_address = 0;
        let mut data = Vec::new();

        loop {
            match state {
                ParseState::SeekHeader => {
                    let Some(line) = lines.get(cursor) else {
                        let diagnostic = Diagnostic {
                            line: 1,
                            kind: DiagnosticKind::NoHeader,
                        };
                        return (Err(diagnostic), &[]);
                    };
                    if let Some(found) = parse_header(line.as_ref()) {
                        name = found;
                        state = ParseState::ReadFirstLine;
                    }
                    cursor += 1;
                }
                ParseState::ReadFirstLine => {
                    match lines.get(cursor).and_then(|line| parse_data_line(line.as_ref())) {
                        Some(first) => {
                            start_address = first.address;
                            data = first.data;
                            cursor += 1;
                            state = ParseState::ReadDataLines;
                        }
                        None => {
                            let diagnostic = Diagnostic {
                                line: cursor + 1,
                                kind: DiagnosticKind::MalformedFirstLine {
                                    section: name.to_string(),
                                },
                            };
                            return (Err(diagnostic), &lines[cursor..]);
                        }
                    }
                }
                ParseState::ReadDataLines => {
                    match lines.get(cursor).and_then(|line| parse_data_line(line.as_ref())) {
                        Some(next) => {
                            data.extend(next.data);
                            cursor += 1;
                        }
                        None => state = ParseState::Done,
                    }
                }
                ParseState::Done => {
                    let section = Section::new(name, start_address, data);
                    return (Ok(section), &lines[cursor..]);
                }
            }
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:08x} - {:08x}]",
            self.name,
            self.start_address,
            self.end_address()
        )
    }
}
