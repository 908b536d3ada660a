//! Section table built from `objdump -s` output.
//!
//! [`SectionTable`] parses the textual hex dump of an executable's sections
//! and answers integer and string reads at virtual addresses, for tooling
//! that needs to peek into a firmware image without an object-file parser.
//!
//! ```no_run
//! use secdump::{Endian, SectionTable, ANY_SECTION};
//!
//! let table = SectionTable::open("firmware.dump")?;
//! let magic = table.get_unsigned_int(ANY_SECTION, 0x3f40_0020, 4, Endian::Little);
//! let banner = table.get_string(".rodata", 0x3f40_0100);
//! # Ok::<(), secdump::Error>(())
//! ```

pub mod error;
pub mod hexdump;
mod section;
mod table;

pub use crate::error::{Error, Result};
pub use crate::section::{Diagnostic, DiagnosticKind, Query, Section, ANY_SECTION};
pub use crate::table::{Endian, SectionTable, MAX_INT_SIZE};
