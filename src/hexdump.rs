//! Line-level tokenizer for `objdump -s` output.
//!
//! A dump is a sequence of section headers, each followed by data lines:
//!
//! ```text
//! Contents of section .rodata:
//!  3f400020 48656c6c 6f000000 01020304 abcdef    Hello..........
//! ```
//!
//! The ASCII rendering on the right is discarded; only the address and the
//! hex groups are used.

use crate::error::{Error, Result};

const SECTION_HEADER: &str = "Contents of section ";

/// Address tokens are 4 to 8 hex digits wide.
const ADDRESS_DIGITS: std::ops::RangeInclusive<usize> = 4..=8;

/// One decoded data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLine {
    pub address: u64,
    pub data: Vec<u8>,
}

/// Returns the section name if `line` is a `Contents of section <name>:`
/// header.
pub fn parse_header(line: &str) -> Option<&str> {
    let rest = &line[line.find(SECTION_HEADER)? + SECTION_HEADER.len()..];
    // The name is never empty, even if it starts with a colon.
    let first = rest.chars().next()?.len_utf8();
    let end = rest[first..].find(':')? + first;
    Some(&rest[..end])
}

pub fn parse_data_line(line: &str) -> Option<DataLine> {
    let line = line.trim_start();
    let hex_part = match line.find("  ") {
        Some(ascii) => &line[..ascii],
        None => line,
    };

    let mut tokens = hex_part.split_whitespace();
    let address = tokens
        .next()
        .filter(|token| ADDRESS_DIGITS.contains(&token.len()) && is_hex(token))?;
    let address = u64::from_str_radix(address, 16).ok()?;

    let mut data = Vec::new();
    for token in tokens.take_while(|token| is_hex(token)) {
        decode_token(token, &mut data);
    }
    Some(DataLine { address, data })
}

/// Parses `0x`-prefixed hex or plain decimal.
pub fn parse_address(text: &str) -> Result<u64> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| Error::InvalidAddress(text.to_string()))
}

fn is_hex(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_hexdigit())
}

fn decode_token(token: &str, out: &mut Vec<u8>) {
    let digits = token.as_bytes();
    let (head, pairs) = digits.split_at(digits.len() % 2);
    if let [lone] = head {
        out.push(nibble(*lone));
    }
    out.extend(
        pairs
            .chunks_exact(2)
            .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1])),
    );
}

fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_name() {
        assert_eq!(parse_header("Contents of section .text:"), Some(".text"));
        assert_eq!(
            parse_header("Contents of section .dram0.data:"),
            Some(".dram0.data")
        );
        assert_eq!(parse_header("Contents of section ::"), Some(":"));
        assert_eq!(parse_header("Contents of section :"), None);
        assert_eq!(parse_header("Contents of section .text"), None);
        assert_eq!(parse_header("foo.elf:     file format elf32-xtensa-le"), None);
    }

    #[test]
    fn data_line_with_ascii() {
        let line = parse_data_line(" 3f400020 48656c6c 6f000000  Hello...").unwrap();
        assert_eq!(line.address, 0x3f40_0020);
        assert_eq!(line.data, b"Hello\0\0\0");
    }

    #[test]
    fn data_line_short_address() {
        let line = parse_data_line(" 0010 01020304 0506           ........").unwrap();
        assert_eq!(line.address, 0x10);
        assert_eq!(line.data, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn ascii_with_hex_letters_is_ignored() {
        // "cafe" in the rendering must not be read as data.
        let line = parse_data_line(" 1000 63616665  cafe").unwrap();
        assert_eq!(line.data, b"cafe");
    }

    #[test]
    fn odd_length_token_is_padded() {
        let line = parse_data_line(" 1000 abc").unwrap();
        assert_eq!(line.data, [0x0a, 0xbc]);
        let line = parse_data_line(" 1000 01020304 5").unwrap();
        assert_eq!(line.data, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn rejects_non_data_lines() {
        assert_eq!(parse_data_line(""), None);
        assert_eq!(parse_data_line("Contents of section .cafe:"), None);
        assert_eq!(parse_data_line(" 12 34567890"), None);
        assert_eq!(parse_data_line(" 123456789 00"), None);
        assert_eq!(parse_data_line("foo.elf:     file format elf32-littleriscv"), None);
    }

    #[test]
    fn address_only_line() {
        let line = parse_data_line("deadbeef").unwrap();
        assert_eq!(line.address, 0xdead_beef);
        assert!(line.data.is_empty());
    }

    #[test]
    fn addresses() {
        assert_eq!(parse_address("0x3f400020").unwrap(), 0x3f40_0020);
        assert_eq!(parse_address("4096").unwrap(), 4096);
        assert!(matches!(
            parse_address("0xzz"),
            Err(Error::InvalidAddress(_))
        ));
    }
}
