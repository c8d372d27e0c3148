//! bex - extract modules from a Phoenix BIOS ROM image.
//!
//! Usage:
//!   bex image.rom --name-offset 0x6577 --bcp-offset 0x60d0
//!   bex image.rom --name-offset 0x6577 --bcp-offset 0x60d0 -o out/
//!
//! The two offsets locate the product name string and the BCP identifier
//! segment inside the image; they come from whatever identified the image as
//! Phoenix-format in the first place (format detection is not this tool's
//! job). `--trusted` selects the TrustedCore entry point, which currently
//! only reports that the variant is unsupported.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bex_core::{extract, extract_trusted, DelharcLh5, DirSink, RomImage};

/// Phoenix BIOS module extractor
#[derive(Parser, Debug)]
#[command(name = "bex")]
#[command(about = "Extract modules from a Phoenix BIOS ROM image")]
struct Args {
    /// ROM image file (length must be a power of two)
    image: PathBuf,

    /// Offset of the product name string (hex with 0x prefix, or decimal)
    #[arg(long, value_parser = parse_offset)]
    name_offset: u32,

    /// Offset of the BCP identifier segment
    #[arg(long, value_parser = parse_offset)]
    bcp_offset: u32,

    /// Directory to write extracted modules into (created if missing)
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Treat the image as a Phoenix TrustedCore ROM
    #[arg(long)]
    trusted: bool,
}

fn parse_offset(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| format!("invalid offset: {}", s))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let data = match std::fs::read(&args.image) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.image.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let image = match RomImage::new(&data) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&args.output) {
        eprintln!("Failed to create {}: {}", args.output.display(), e);
        return ExitCode::FAILURE;
    }
    let mut sink = DirSink::new(&args.output);

    let result = if args.trusted {
        extract_trusted(&image, args.name_offset, args.bcp_offset, &mut sink, &DelharcLh5)
    } else {
        extract(&image, args.name_offset, args.bcp_offset, &mut sink, &DelharcLh5)
    };

    match result {
        Ok(report) => {
            eprintln!(
                "Extracted {} of {} modules.",
                report.extracted(),
                report.modules.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset_hex_and_decimal() {
        assert_eq!(parse_offset("0x60d0"), Ok(0x60D0));
        assert_eq!(parse_offset("0X1A"), Ok(0x1A));
        assert_eq!(parse_offset("4096"), Ok(4096));
        assert!(parse_offset("zz").is_err());
        assert!(parse_offset("0x").is_err());
    }
}
