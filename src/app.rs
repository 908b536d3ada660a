use ansi_term::{Color, Style};
use std::collections::BTreeSet;
use std::io::{self, Write};

use secdump::Section;

use crate::{hexprinter::HexPrinter, symbols::Symbol};

const BG_COLORS: [u8; 2] = [232, 236];
const FG_COLORS: [u8; 7] = [1, 2, 3, 4, 5, 6, 7];
const PLAIN_FG: u8 = 8;

/// Renders `sections` in the given order, coloring each byte by the
/// innermost symbol that covers it.
pub fn render<W: Write>(
    sections: &[&Section],
    symbols: Vec<Symbol>,
    printer: &mut HexPrinter<W>,
) -> io::Result<()> {
    let mut symbol_events = SymbolEvents::new(symbols);

    for (i, s) in sections.iter().enumerate() {
        let addr = s.start_address();
        let bg = BG_COLORS[i % BG_COLORS.len()];

        if let Some(before) = addr.checked_sub(1) {
            symbol_events.advance(before, printer)?;
        }

        printer.set_addr(addr)?;
        printer.add_label(
            format!("[{}]", s.name()),
            Style::default().on(Color::Fixed(bg)),
        );

        for (j, b) in s.data().iter().enumerate() {
            let addr = addr + j as u64;

            symbol_events.advance(addr, printer)?;

            printer.push_byte(
                *b,
                symbol_events
                    .get()
                    .map(|i| FG_COLORS[i % FG_COLORS.len()])
                    .unwrap_or(PLAIN_FG),
                bg,
            )?;
        }

        printer.bound()?;
    }
    symbol_events.advance(u64::MAX, printer)?;
    printer.flush_line()
}

struct SymbolEvents {
    symbols: Vec<Symbol>,
    events: Vec<(u64, usize, bool)>,
    idx: usize,
    cur_symbols: BTreeSet<usize>,
}

impl SymbolEvents {
    fn new(symbols: Vec<Symbol>) -> Self {
        let mut events = vec![];
        for (i, sym) in symbols.iter().enumerate() {
            events.push((sym.addr, i, true));
            events.push((sym.addr.saturating_add(sym.size), i, false));
        }
        events.sort_by_key(|(addr, idx, is_start)| (*addr, !is_start, *idx));
        Self {
            symbols,
            events,
            idx: 0,
            cur_symbols: BTreeSet::new(),
        }
    }

    fn advance<W: Write>(&mut self, addr: u64, printer: &mut HexPrinter<W>) -> io::Result<()> {
        let mut last_break_addr = 0;
        while let Some(&(at, i, is_start)) = self.events.get(self.idx) {
            if at > addr {
                break;
            }
            if last_break_addr != at {
                printer.bound()?;
                printer.set_addr(at)?;
                last_break_addr = at;
            }
            self.idx += 1;
            if is_start {
                self.cur_symbols.insert(i);
                let sym = &self.symbols[i];
                printer.add_label(
                    format!("{:#010x}+{:#x}: {}", sym.addr, sym.size, sym.name),
                    Style::default().fg(Color::Fixed(FG_COLORS[i % FG_COLORS.len()])),
                );
            } else {
                self.cur_symbols.remove(&i);
            }
        }
        Ok(())
    }

    fn get(&self) -> Option<usize> {
        self.cur_symbols.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_plain(sections: &[&Section], symbols: Vec<Symbol>) -> String {
        let mut printer = HexPrinter::new(Vec::new(), 8, true, false);
        render(sections, symbols, &mut printer).unwrap();
        String::from_utf8(printer.finish().unwrap()).unwrap()
    }

    #[test]
    fn labels_sections() {
        let data = Section::new(".data", 0x1000, b"hi\0\0".to_vec());
        assert_eq!(
            render_plain(&[&data], Vec::new()),
            "0x00001000 | 68 69 00 00              | hi..     | [.data]\n"
        );
    }

    #[test]
    fn labels_symbols() {
        let data = Section::new(".data", 0x1000, vec![0; 4]);
        let symbols = vec![Symbol {
            addr: 0x1002,
            size: 2,
            name: "COUNTER".to_string(),
        }];
        let out = render_plain(&[&data], symbols);
        assert!(out.contains("[.data]"));
        assert!(out.contains("0x00001002+0x2: COUNTER"));
    }
}
