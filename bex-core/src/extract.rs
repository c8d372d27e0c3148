//! Module chain walk and payload extraction.
//!
//! Starting from the BCPSYS anchor, the walker follows each header's
//! `previous` pointer backward until it reaches zero, masking every hop into
//! the image's address range. Failures are local: a corrupt header or an
//! unsupported codec skips that module and the walk continues. Only a
//! missing anchor or an invalid modules offset fails the whole run.

use std::collections::HashSet;

use crate::anchor::{locate_bcpsys, BcpSummary};
use crate::codec::Lh5Codec;
use crate::error::{BiosError, BiosResult};
use crate::image::RomImage;
use crate::module::{ModuleHeader, COMPRESSION_LH5, COMPRESSION_NONE};
use crate::output::OutputSink;
use crate::registry::module_name;

/// Outcome for one module visited by the chain walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleStatus {
    /// Payload decoded (or copied verbatim) and written out.
    Extracted { compression: u8, written: u32 },
    /// Unknown compression code; raw packed bytes written as-is.
    Salvaged { compression: u8 },
    /// Signature bytes did not match; module skipped.
    InvalidSignature,
    /// Header plus payload would run past the image end; module skipped.
    Overrun,
    /// The fixed header itself did not fit in the image.
    TruncatedHeader,
    /// Output artifact could not be written; module skipped.
    WriteFailed(String),
    /// The LH5 decoder rejected the payload; module skipped.
    CodecFailed(String),
}

/// One entry per module offset the walker visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Image offset of the module header.
    pub offset: u32,
    /// Raw back-pointer read from the header (zero when the header itself
    /// was unreadable).
    pub previous: u32,
    /// Resolved output filename, once validation got that far.
    pub file_name: Option<String>,
    pub status: ModuleStatus,
}

/// Result of a successful extraction run.
///
/// "Successful" means the anchor was found and the chain exhausted; any
/// number of individual modules may still have been skipped, visible in
/// `modules`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub product: String,
    pub version: String,
    pub date: String,
    pub time: String,
    pub modules: Vec<ModuleRecord>,
    /// Set when a `previous` pointer revisited an offset and the walk was
    /// cut short. Well-formed images never set this.
    pub loop_detected: bool,
}

impl ExtractionReport {
    /// Number of modules whose payload was fully extracted.
    pub fn extracted(&self) -> usize {
        self.modules
            .iter()
            .filter(|m| matches!(m.status, ModuleStatus::Extracted { .. }))
            .count()
    }
}

/// Resolve the output filename for a module.
///
/// Registered types use their descriptive name; anything else falls back to
/// the two-digit uppercase hex type code.
pub fn module_file_name(type_code: u8, id: u8) -> String {
    match module_name(type_code) {
        Some(name) => format!("{}_{}.rom", name, id),
        None => format!("{:02X}_{}.rom", type_code, id),
    }
}

/// Extract every module reachable from the BCPSYS anchor.
///
/// `product_offset` and `bcp_offset` come from the caller that identified
/// the image as Phoenix-format. Per-module failures are reported on the
/// returned [`ExtractionReport`]; only [`BiosError::AnchorNotFound`] and
/// [`BiosError::InvalidModulesOffset`] fail the call.
pub fn extract<S: OutputSink, C: Lh5Codec>(
    image: &RomImage,
    product_offset: u32,
    bcp_offset: u32,
    sink: &mut S,
    codec: &C,
) -> BiosResult<ExtractionReport> {
    let product = image.cstr_at(product_offset as usize).unwrap_or_default();
    println!("Found Phoenix BIOS \"{}\"", product);

    let BcpSummary {
        version,
        date,
        time,
        modules_offset,
        ..
    } = locate_bcpsys(image, bcp_offset)?;
    println!("Version \"{}\", created on {} at {}.", version, date, time);

    let mut modules = Vec::new();
    let mut visited: HashSet<u32> = HashSet::new();
    let mut loop_detected = false;

    let mut offset = modules_offset;
    while offset != 0 {
        if !visited.insert(offset) {
            eprintln!("Error: circular module chain revisits 0x{:05X}", offset);
            loop_detected = true;
            break;
        }
        let record = extract_module(image, offset, sink, codec);
        offset = image.mask(record.previous);
        modules.push(record);
    }

    Ok(ExtractionReport {
        product,
        version,
        date,
        time,
        modules,
        loop_detected,
    })
}

/// Entry point for Phoenix TrustedCore images.
///
/// The TrustedCore module packing has not been reverse engineered; this
/// boundary exists so the caller gets a clean failure instead of garbage
/// output. No parsing is attempted.
pub fn extract_trusted<S: OutputSink, C: Lh5Codec>(
    _image: &RomImage,
    _product_offset: u32,
    _bcp_offset: u32,
    _sink: &mut S,
    _codec: &C,
) -> BiosResult<ExtractionReport> {
    eprintln!("Error: Phoenix TrustedCore images are not supported.");
    println!("Feel free to RE the decompression routine :)");
    Err(BiosError::UnsupportedFormat)
}

/// Validate and extract a single module, returning its record.
///
/// The header's `previous` field is returned on the record even when
/// validation fails; the walker keeps following the chain past corrupt
/// modules. A header that does not fit at all yields `previous == 0`,
/// terminating that branch.
fn extract_module<S: OutputSink, C: Lh5Codec>(
    image: &RomImage,
    offset: u32,
    sink: &mut S,
    codec: &C,
) -> ModuleRecord {
    let Some(header) = ModuleHeader::parse(image, offset) else {
        eprintln!("Error: Module header overruns buffer at 0x{:05X}", offset);
        return ModuleRecord {
            offset,
            previous: 0,
            file_name: None,
            status: ModuleStatus::TruncatedHeader,
        };
    };

    let skipped = |status: ModuleStatus, file_name: Option<String>| ModuleRecord {
        offset,
        previous: header.previous,
        file_name,
        status,
    };

    if !header.signature_ok() {
        eprintln!("Error: Invalid module signature at 0x{:05X}", offset);
        return skipped(ModuleStatus::InvalidSignature, None);
    }

    if header.overruns(offset, image.len()) {
        eprintln!("Error: Module overruns buffer at 0x{:05X}", offset);
        return skipped(ModuleStatus::Overrun, None);
    }

    let file_name = module_file_name(header.type_code, header.id);
    let payload_base = offset as usize + header.head_len as usize;
    let packed_len = header.packed_len as usize;

    let status = match header.compression {
        COMPRESSION_LH5 => {
            print!(
                "0x{:05X} ({:6} bytes)   ->   {}\t({} bytes)",
                payload_base + 4,
                header.packed_len,
                file_name,
                header.expanded_len
            );
            match image.slice(payload_base + 4, packed_len) {
                Some(packed) => {
                    let mut expanded = vec![0u8; header.expanded_len as usize];
                    match codec.decode(packed, &mut expanded) {
                        Ok(()) => write_payload(sink, &file_name, &expanded, &header),
                        Err(e) => {
                            eprintln!("Error: LH5 decode failed for {}: {}", file_name, e);
                            ModuleStatus::CodecFailed(e.to_string())
                        }
                    }
                }
                // The overrun check above makes this unreachable; classify
                // it the same way if it ever trips.
                None => ModuleStatus::Overrun,
            }
        }
        COMPRESSION_NONE => {
            // The uncompressed layout starts 4 bytes earlier than the
            // compressed ones; a quirk of the format, kept as-is.
            print!(
                "0x{:05X} ({:6} bytes)   ->   {}",
                payload_base, header.packed_len, file_name
            );
            match image.slice(payload_base, packed_len) {
                Some(raw) => write_payload(sink, &file_name, raw, &header),
                None => ModuleStatus::Overrun,
            }
        }
        other => {
            eprintln!(
                "Unsupported compression type for {}: {}",
                file_name, other
            );
            print!(
                "0x{:05X} ({:6} bytes)   ->   {}\t({} bytes)",
                payload_base + 4,
                header.packed_len,
                file_name,
                header.expanded_len
            );
            // Best effort: salvage the raw packed bytes.
            match image.slice(payload_base + 4, packed_len) {
                Some(packed) => match sink.write_module(&file_name, packed) {
                    Ok(()) => ModuleStatus::Salvaged { compression: other },
                    Err(e) => {
                        eprintln!("Error: unable to write {}: {}", file_name, e);
                        ModuleStatus::WriteFailed(e.to_string())
                    }
                },
                None => ModuleStatus::Overrun,
            }
        }
    };

    // Real-mode load address, shown only when the header carries one. The
    // extra tab padding on the uncompressed path aligns the columns.
    if header.load_offset != 0 || header.load_segment != 0 {
        if header.compression == COMPRESSION_NONE {
            print!("\t\t");
        }
        println!(
            "\t [0x{:04X}:0x{:04X}]",
            (header.load_segment as u32) << 12,
            header.load_offset
        );
    } else {
        println!();
    }

    ModuleRecord {
        offset,
        previous: header.previous,
        file_name: Some(file_name),
        status,
    }
}

fn write_payload<S: OutputSink>(
    sink: &mut S,
    file_name: &str,
    data: &[u8],
    header: &ModuleHeader,
) -> ModuleStatus {
    match sink.write_module(file_name, data) {
        Ok(()) => ModuleStatus::Extracted {
            compression: header.compression,
            written: data.len() as u32,
        },
        Err(e) => {
            eprintln!("Error: unable to write {}: {}", file_name, e);
            ModuleStatus::WriteFailed(e.to_string())
        }
    }
}
