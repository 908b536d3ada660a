use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use secdump::hexdump::parse_address;
use secdump::{Endian, Section, SectionTable, ANY_SECTION, MAX_INT_SIZE};

use crate::app::render;
use crate::hexprinter::HexPrinter;

mod app;
mod hexprinter;
mod symbols;

/// Query the section contents of an `objdump -s` dump
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the sections found in a dump
    List { dump: PathBuf },

    /// Read an unsigned integer at an address
    Int {
        dump: PathBuf,

        #[arg(value_parser = parse_address)]
        address: u64,

        /// Section name, or "any"
        #[arg(short, long, default_value = ANY_SECTION)]
        section: String,

        /// Size in bytes
        #[arg(short = 'n', long, default_value = "4", value_parser = clap::value_parser!(u8).range(..=MAX_INT_SIZE as i64))]
        size: u8,

        /// Byte order, LE or BE
        #[arg(short, long, default_value = "LE")]
        endian: Endian,
    },

    /// Read a NUL-terminated string at an address
    Str {
        dump: PathBuf,

        #[arg(value_parser = parse_address)]
        address: u64,

        /// Section name, or "any"
        #[arg(short, long, default_value = ANY_SECTION)]
        section: String,
    },

    /// Print the sections as a hex view
    View {
        dump: PathBuf,

        /// Bytes per line
        #[arg(short, default_value = "16", value_parser = clap::value_parser!(u64).range(1..))]
        cols: u64,

        /// Break on section boundaries
        #[arg(short, long)]
        break_on_bounds: bool,

        /// `objdump -t` output to take symbol labels from
        #[arg(long)]
        symbols: Option<PathBuf>,

        /// Hide 0-byte symbols
        #[arg(short = 'e', long)]
        hide_empty: bool,

        /// Demangle symbols
        #[arg(short, long)]
        demangle: bool,

        /// Disable colors
        #[arg(long)]
        no_color: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::List { dump } => {
            let table = open(&dump)?;
            for entry in table.entries() {
                match entry {
                    Some(section) => println!("{section}"),
                    None => println!("<missing>"),
                }
            }
            for diagnostic in table.diagnostics() {
                eprintln!("warning: {diagnostic}");
            }
        }
        Command::Int {
            dump,
            address,
            section,
            size,
            endian,
        } => {
            let table = open(&dump)?;
            let Some(value) = table.get_unsigned_int(&section, address, size.into(), endian)
            else {
                bail!("no {size}-byte value in section {section} at {address:#010x}");
            };
            println!("{value:#0width$x}", width = usize::from(size) * 2 + 2);
        }
        Command::Str {
            dump,
            address,
            section,
        } => {
            let table = open(&dump)?;
            let Some(value) = table.get_string(&section, address) else {
                bail!("no string in section {section} at {address:#010x}");
            };
            println!("{value}");
        }
        Command::View {
            dump,
            cols,
            break_on_bounds,
            symbols,
            hide_empty,
            demangle,
            no_color,
        } => {
            let table = open(&dump)?;
            let mut sections: Vec<&Section> = table.sections().collect();
            sections.sort_by_key(|s| (s.start_address(), s.len()));

            let symbols = match symbols {
                Some(path) => symbols::load(&path, hide_empty, demangle)?,
                None => Vec::new(),
            };

            let out = BufWriter::new(io::stdout().lock());
            let mut printer = HexPrinter::new(out, cols, break_on_bounds, !no_color);
            render(&sections, symbols, &mut printer)?;
            printer.finish()?;
        }
    }
    Ok(())
}

fn open(dump: &Path) -> Result<SectionTable> {
    SectionTable::open(dump).with_context(|| format!("cannot load dump {}", dump.display()))
}
