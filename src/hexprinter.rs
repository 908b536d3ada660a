use std::io::{self, Write};

use ansi_term::{Color, Style};

/// Writes `addr | hex bytes | ascii | labels` rows, one row per `cols`
/// bytes.
pub struct HexPrinter<W: Write> {
    cols: u64,
    break_on_bounds: bool,
    bytes: Vec<Option<(u8, u8, u8)>>,
    labels: Vec<(String, Style)>,
    line_addr: u64,
    last_line_addr: Option<u64>,
    printer: ColorPrinter<W>,
    has_data: bool,
}

impl<W: Write> HexPrinter<W> {
    pub fn new(out: W, cols: u64, break_on_bounds: bool, color: bool) -> Self {
        Self {
            cols,
            break_on_bounds,
            bytes: Vec::new(),
            labels: Vec::new(),
            line_addr: 0,
            last_line_addr: None,
            printer: ColorPrinter::new(out, color),
            has_data: false,
        }
    }

    pub fn flush_line(&mut self) -> io::Result<()> {
        if !self.has_data {
            return Ok(());
        }
        self.flush_line_force()
    }

    pub fn flush_line_force(&mut self) -> io::Result<()> {
        while self.bytes.len() < self.cols as usize {
            self.bytes.push(None);
        }

        if self.last_line_addr == Some(self.line_addr) {
            self.printer.print("           | ", Style::default())?;
        } else {
            self.printer
                .print(&format!("{:#010x} | ", self.line_addr), Style::default())?;
        }
        self.last_line_addr = Some(self.line_addr);

        for i in 0..self.cols as usize {
            match self.bytes[i] {
                Some((byte, fg, bg)) => {
                    self.printer.print(
                        &format!("{:02x} ", byte),
                        Style::default().fg(Color::Fixed(fg)).on(Color::Fixed(bg)),
                    )?;
                }
                None => self.printer.print("   ", Style::default())?,
            }
            if self.cols % 8 == 0 && (i + 1) % 8 == 0 {
                self.printer.print(" ", Style::default())?;
            }
        }
        self.printer.print("| ", Style::default())?;
        for i in 0..self.cols as usize {
            match self.bytes[i] {
                Some((byte, fg, bg)) => {
                    let style = Style::default()
                        .bold()
                        .fg(Color::Fixed(fg))
                        .on(Color::Fixed(bg));
                    if byte.is_ascii_graphic() {
                        self.printer.print(&format!("{}", byte as char), style)?;
                    } else {
                        self.printer.print(".", style)?;
                    }
                }
                None => self.printer.print(" ", Style::default())?,
            }
        }
        self.printer.print(" |", Style::default())?;
        for (label, style) in std::mem::take(&mut self.labels) {
            self.printer.print(" ", Style::default())?;
            self.printer.print(&label, style)?;
        }
        self.printer.newline()?;

        self.bytes.clear();
        self.has_data = false;
        Ok(())
    }

    pub fn push_byte(&mut self, byte: u8, fg: u8, bg: u8) -> io::Result<()> {
        self.bytes.push(Some((byte, fg, bg)));
        self.has_data = true;
        if self.bytes.len() == self.cols as usize {
            self.flush_line()?;
            self.line_addr += self.cols;
        }
        Ok(())
    }

    pub fn set_addr(&mut self, addr: u64) -> io::Result<()> {
        let base = addr / self.cols * self.cols;
        let col = addr % self.cols;
        if base != self.line_addr {
            if !self.bytes.is_empty() {
                self.flush_line()?;
                self.bytes.clear();
            }
            // Mark skipped rows, but not before the first row.
            if self.last_line_addr.is_some() && base > self.line_addr + self.cols {
                self.printer.print("...", Style::default())?;
                self.printer.newline()?;
            }
            self.line_addr = base;
        }
        if (col as usize) < self.bytes.len() {
            self.flush_line()?;
            self.bytes.clear();
        }
        while self.bytes.len() < col as usize {
            self.bytes.push(None);
        }
        Ok(())
    }

    pub fn add_label(&mut self, label: String, style: Style) {
        self.labels.push((label, style));
        self.has_data = true;
    }

    pub fn bound(&mut self) -> io::Result<()> {
        if self.break_on_bounds {
            self.flush_line()?;
        }
        Ok(())
    }

    /// Flushes the pending row and returns the writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush_line()?;
        self.printer.finish()
    }
}

/// Emits only the escape codes needed to move from one style to the next.
struct ColorPrinter<W: Write> {
    out: W,
    color: bool,
    last_style: Style,
}

impl<W: Write> ColorPrinter<W> {
    fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            last_style: Style::default(),
        }
    }

    fn print(&mut self, s: &str, style: Style) -> io::Result<()> {
        if self.color && self.last_style != style {
            write!(self.out, "{}", self.last_style.infix(style))?;
            self.last_style = style;
        }
        self.out.write_all(s.as_bytes())
    }

    fn newline(&mut self) -> io::Result<()> {
        self.print("\n", Style::default())
    }

    fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(cols: u64, break_on_bounds: bool) -> HexPrinter<Vec<u8>> {
        HexPrinter::new(Vec::new(), cols, break_on_bounds, false)
    }

    fn output(printer: HexPrinter<Vec<u8>>) -> String {
        String::from_utf8(printer.finish().unwrap()).unwrap()
    }

    #[test]
    fn full_row() {
        let mut printer = plain(4, false);
        printer.set_addr(0x10).unwrap();
        printer.add_label("[.data]".to_string(), Style::default());
        for b in b"ABCD" {
            printer.push_byte(*b, 7, 0).unwrap();
        }
        assert_eq!(
            output(printer),
            "0x00000010 | 41 42 43 44 | ABCD | [.data]\n"
        );
    }

    #[test]
    fn partial_row_is_padded() {
        let mut printer = plain(4, false);
        printer.set_addr(0x12).unwrap();
        printer.push_byte(0, 7, 0).unwrap();
        assert_eq!(output(printer), "0x00000010 |       00    |   .  |\n");
    }

    #[test]
    fn gap_between_rows() {
        let mut printer = plain(4, false);
        printer.set_addr(0).unwrap();
        for b in [1, 2, 3, 4] {
            printer.push_byte(b, 7, 0).unwrap();
        }
        printer.set_addr(0x20).unwrap();
        printer.push_byte(0x41, 7, 0).unwrap();
        assert_eq!(
            output(printer),
            "0x00000000 | 01 02 03 04 | .... |\n\
             ...\n\
             0x00000020 | 41          | A    |\n"
        );
    }

    #[test]
    fn colored_output_resets_style() {
        let mut printer = HexPrinter::new(Vec::new(), 4, false, true);
        printer.push_byte(0x41, 1, 232).unwrap();
        let out = output(printer);
        assert!(out.contains("\x1b[0m"));
        assert!(out.ends_with(" |\n"));
    }
}
