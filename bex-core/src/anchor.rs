//! BCPSYS anchor record location.
//!
//! A Phoenix image carries a forward chain of variable-length identifier
//! records starting 10 bytes past the BCP segment offset. Each record is a
//! 6-byte ASCII name, a 16-bit flags word and a 16-bit total length; the next
//! record starts `length` bytes after the current one. The record named
//! `BCPSYS` holds build metadata and, at offset +0x77, the image offset of
//! the most recently added module header - the head of the backward module
//! chain.

use crate::error::{BiosError, BiosResult};
use crate::image::RomImage;

/// Size of the fixed identifier record header (name + flags + length).
const ID_RECORD_HEADER_LEN: usize = 10;

/// Displacements of the metadata fields inside the BCPSYS record.
const BCPSYS_DATE: usize = 0x0F;
const BCPSYS_TIME: usize = 0x18;
const BCPSYS_VERSION: usize = 0x37;
const BCPSYS_MODULES: usize = 0x77;

/// Metadata recovered from the BCPSYS record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BcpSummary {
    /// Image offset of the BCPSYS record itself.
    pub record_offset: usize,
    /// BIOS core version string.
    pub version: String,
    /// Build date.
    pub date: String,
    /// Build time.
    pub time: String,
    /// Masked, non-zero offset of the newest module header.
    pub modules_offset: u32,
}

/// Scan the identifier-record chain for BCPSYS and read the module anchor.
///
/// Fails with [`BiosError::AnchorNotFound`] when the chain terminates (first
/// name byte zero) or runs past the buffer end before a match, and with
/// [`BiosError::InvalidModulesOffset`] when the matched record is truncated
/// or its anchor field masks to zero.
pub fn locate_bcpsys(image: &RomImage, bcp_offset: u32) -> BiosResult<BcpSummary> {
    let mut pos = (bcp_offset as usize).saturating_add(ID_RECORD_HEADER_LEN);

    let record_offset = loop {
        let Some(name) = image.slice(pos, 6) else {
            return Err(BiosError::AnchorNotFound);
        };
        if name[0] == 0 {
            return Err(BiosError::AnchorNotFound);
        }
        if name == b"BCPSYS" {
            break pos;
        }
        let Some(length) = image.u16_at(pos + 8) else {
            return Err(BiosError::AnchorNotFound);
        };
        // A zero length would loop on the same record forever.
        if length == 0 {
            return Err(BiosError::AnchorNotFound);
        }
        pos += length as usize;
    };

    // The anchor field is the furthest read; checking it first guarantees the
    // metadata fields below are in bounds.
    let Some(raw) = image.u32_at(record_offset + BCPSYS_MODULES) else {
        return Err(BiosError::InvalidModulesOffset);
    };
    let modules_offset = image.mask(raw);
    if modules_offset == 0 {
        return Err(BiosError::InvalidModulesOffset);
    }

    let date = image.ascii_field(record_offset + BCPSYS_DATE, 8).unwrap_or_default();
    let time = image.ascii_field(record_offset + BCPSYS_TIME, 8).unwrap_or_default();
    let version = image.ascii_field(record_offset + BCPSYS_VERSION, 8).unwrap_or_default();

    Ok(BcpSummary {
        record_offset,
        version,
        date,
        time,
        modules_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lay out an identifier record at `off`: name, flags, total length.
    fn put_record(buf: &mut [u8], off: usize, name: &[u8; 6], length: u16) {
        buf[off..off + 6].copy_from_slice(name);
        buf[off + 6..off + 8].copy_from_slice(&0u16.to_le_bytes());
        buf[off + 8..off + 10].copy_from_slice(&length.to_le_bytes());
    }

    fn put_bcpsys(buf: &mut [u8], off: usize, modules_offset: u32) {
        put_record(buf, off, b"BCPSYS", 0x100);
        buf[off + BCPSYS_DATE..off + BCPSYS_DATE + 8].copy_from_slice(b"01/02/03");
        buf[off + BCPSYS_TIME..off + BCPSYS_TIME + 8].copy_from_slice(b"12:34:56");
        buf[off + BCPSYS_VERSION..off + BCPSYS_VERSION + 8].copy_from_slice(b"1.03    ");
        buf[off + BCPSYS_MODULES..off + BCPSYS_MODULES + 4]
            .copy_from_slice(&modules_offset.to_le_bytes());
    }

    #[test]
    fn test_finds_bcpsys_after_other_records() {
        let mut buf = vec![0u8; 4096];
        // Chain starts at bcp_offset + 10 = 0x10A.
        put_record(&mut buf, 0x10A, b"BCPDMI", 0x20);
        put_record(&mut buf, 0x12A, b"BCPOST", 0x30);
        put_bcpsys(&mut buf, 0x15A, 0x800);

        let image = RomImage::new(&buf).unwrap();
        let summary = locate_bcpsys(&image, 0x100).unwrap();
        assert_eq!(summary.record_offset, 0x15A);
        assert_eq!(summary.version, "1.03");
        assert_eq!(summary.date, "01/02/03");
        assert_eq!(summary.time, "12:34:56");
        assert_eq!(summary.modules_offset, 0x800);
    }

    #[test]
    fn test_anchor_offset_is_masked() {
        let mut buf = vec![0u8; 4096];
        put_bcpsys(&mut buf, 0x10A, 0x800 + 4096);
        let image = RomImage::new(&buf).unwrap();
        assert_eq!(locate_bcpsys(&image, 0x100).unwrap().modules_offset, 0x800);
    }

    #[test]
    fn test_name_terminator_means_not_found() {
        let mut buf = vec![0u8; 4096];
        put_record(&mut buf, 0x10A, b"BCPDMI", 0x20);
        // Record at 0x12A left zeroed: name[0] == 0 terminates the chain.
        let image = RomImage::new(&buf).unwrap();
        assert!(matches!(
            locate_bcpsys(&image, 0x100),
            Err(BiosError::AnchorNotFound)
        ));
    }

    #[test]
    fn test_chain_past_buffer_end_means_not_found() {
        let mut buf = vec![0u8; 4096];
        // The only record points 0xF00 bytes ahead, past the buffer end.
        put_record(&mut buf, 0x10A, b"BCPDMI", 0xF00);
        let image = RomImage::new(&buf).unwrap();
        assert!(matches!(
            locate_bcpsys(&image, 0x100),
            Err(BiosError::AnchorNotFound)
        ));
    }

    #[test]
    fn test_zero_length_record_means_not_found() {
        let mut buf = vec![0u8; 4096];
        put_record(&mut buf, 0x10A, b"BCPDMI", 0);
        let image = RomImage::new(&buf).unwrap();
        assert!(matches!(
            locate_bcpsys(&image, 0x100),
            Err(BiosError::AnchorNotFound)
        ));
    }

    #[test]
    fn test_zero_anchor_is_invalid() {
        let mut buf = vec![0u8; 4096];
        put_bcpsys(&mut buf, 0x10A, 0);
        let image = RomImage::new(&buf).unwrap();
        assert!(matches!(
            locate_bcpsys(&image, 0x100),
            Err(BiosError::InvalidModulesOffset)
        ));
    }

    #[test]
    fn test_truncated_bcpsys_record_is_invalid() {
        // BCPSYS name fits but the +0x77 anchor field does not.
        let mut buf = vec![0u8; 4096];
        put_record(&mut buf, 4096 - 16, b"BCPSYS", 0x100);
        let image = RomImage::new(&buf).unwrap();
        assert!(matches!(
            locate_bcpsys(&image, (4096 - 16 - 10) as u32),
            Err(BiosError::InvalidModulesOffset)
        ));
    }
}
