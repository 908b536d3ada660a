use std::path::Path;

use anyhow::{Context, Result};

/// An address range from the symbol table, used to label the hex view.
#[derive(Debug, PartialEq, Eq)]
pub struct Symbol {
    pub addr: u64,
    pub size: u64,
    pub name: String,
}

/// Loads symbols from `objdump -t` output taken from the same image as the
/// section dump.
pub fn load(path: &Path, hide_empty: bool, demangle: bool) -> Result<Vec<Symbol>> {
    let raw = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(parse(&String::from_utf8_lossy(&raw), hide_empty, demangle))
}

pub fn parse(text: &str, hide_empty: bool, demangle: bool) -> Vec<Symbol> {
    let mut symbols: Vec<Symbol> = text
        .lines()
        .filter_map(parse_line)
        .filter(|sym| !(hide_empty && sym.size == 0))
        .map(|mut sym| {
            if demangle {
                sym.name = format!("{:#}", rustc_demangle::demangle(&sym.name));
            }
            sym
        })
        .collect();
    symbols.sort_by_key(|s| (s.addr, s.size));
    symbols
}

/// Parses one symbol line:
///
/// ```text
/// 3ffb0000 g     O .dram0.data	00000004 counter
/// ```
///
/// The flag columns may contain spaces, so the line is split at the tab
/// that follows the section name.
fn parse_line(line: &str) -> Option<Symbol> {
    let (left, right) = line.split_once('\t')?;

    let mut left = left.split_whitespace();
    let addr = u64::from_str_radix(left.next()?, 16).ok()?;
    if left.last()? == "*UND*" {
        return None;
    }

    let mut right = right.split_whitespace();
    let size = u64::from_str_radix(right.next()?, 16).ok()?;
    // `.hidden` and similar visibility markers come before the name.
    let name = right.last()?;

    Some(Symbol {
        addr,
        size,
        name: name.to_string(),
    })
}
