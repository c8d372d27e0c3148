//! Module header layout and validation.
//!
//! Module headers form a backward chain: each header's `previous` field is
//! the image offset of the header added before it, with zero terminating the
//! chain. The on-image layout is fixed at 32 bytes, including one reserved
//! byte between the compression selector and the load-offset field.

use crate::image::RomImage;

/// Total size of the fixed module header overlay.
pub const MODULE_HEADER_LEN: usize = 32;

/// Expected signature bytes at header offset +4.
pub const MODULE_SIGNATURE: [u8; 3] = [0x00, 0x31, 0x31];

/// Payload stored verbatim.
pub const COMPRESSION_NONE: u8 = 0;
/// Payload compressed with the LH5 (LZHUF) scheme.
pub const COMPRESSION_LH5: u8 = 5;

/// Decoded module header fields.
///
/// `reserved_packed` and `reserved_expanded` are carried for completeness but
/// never interpreted; the format defines them, extraction does not use them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleHeader {
    pub previous: u32,
    pub signature: [u8; 3],
    pub id: u8,
    pub type_code: u8,
    pub head_len: u8,
    pub compression: u8,
    pub load_offset: u16,
    pub load_segment: u16,
    pub expanded_len: u32,
    pub packed_len: u32,
    pub reserved_packed: u32,
    pub reserved_expanded: u32,
}

impl ModuleHeader {
    /// Decode the header overlay at `offset`. Returns `None` when the fixed
    /// layout does not fit in the buffer.
    pub fn parse(image: &RomImage, offset: u32) -> Option<ModuleHeader> {
        let base = offset as usize;
        image.slice(base, MODULE_HEADER_LEN)?;

        // All reads below are within the checked 32-byte window.
        Some(ModuleHeader {
            previous: image.u32_at(base)?,
            signature: [
                image.u8_at(base + 4)?,
                image.u8_at(base + 5)?,
                image.u8_at(base + 6)?,
            ],
            id: image.u8_at(base + 7)?,
            type_code: image.u8_at(base + 8)?,
            head_len: image.u8_at(base + 9)?,
            compression: image.u8_at(base + 10)?,
            // +11 is a reserved pad byte.
            load_offset: image.u16_at(base + 12)?,
            load_segment: image.u16_at(base + 14)?,
            expanded_len: image.u32_at(base + 16)?,
            packed_len: image.u32_at(base + 20)?,
            reserved_packed: image.u32_at(base + 24)?,
            reserved_expanded: image.u32_at(base + 28)?,
        })
    }

    pub fn signature_ok(&self) -> bool {
        self.signature == MODULE_SIGNATURE
    }

    /// True when the header plus its payload would run past the buffer end.
    ///
    /// The bound is `offset + head_len + 4 + packed_len`, the layout used by
    /// the compressed paths; the uncompressed path reads 4 bytes earlier but
    /// is checked against the same bound, matching the format's behavior.
    pub fn overruns(&self, offset: u32, image_len: usize) -> bool {
        let end = offset as u64 + self.head_len as u64 + 4 + self.packed_len as u64;
        end > image_len as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes() -> [u8; MODULE_HEADER_LEN] {
        let mut b = [0u8; MODULE_HEADER_LEN];
        b[0..4].copy_from_slice(&0x0000_1234u32.to_le_bytes()); // previous
        b[4..7].copy_from_slice(&MODULE_SIGNATURE);
        b[7] = 2; // id
        b[8] = b'A'; // type
        b[9] = 32; // head_len
        b[10] = COMPRESSION_LH5;
        b[12..14].copy_from_slice(&0x0010u16.to_le_bytes()); // load offset
        b[14..16].copy_from_slice(&0xE000u16.to_le_bytes()); // load segment
        b[16..20].copy_from_slice(&0x400u32.to_le_bytes()); // expanded
        b[20..24].copy_from_slice(&0x100u32.to_le_bytes()); // packed
        b[24..28].copy_from_slice(&0xAAu32.to_le_bytes());
        b[28..32].copy_from_slice(&0xBBu32.to_le_bytes());
        b
    }

    #[test]
    fn test_parse_field_layout() {
        let mut buf = vec![0u8; 4096];
        buf[0x800..0x800 + MODULE_HEADER_LEN].copy_from_slice(&header_bytes());
        let image = RomImage::new(&buf).unwrap();

        let header = ModuleHeader::parse(&image, 0x800).unwrap();
        assert_eq!(header.previous, 0x1234);
        assert!(header.signature_ok());
        assert_eq!(header.id, 2);
        assert_eq!(header.type_code, b'A');
        assert_eq!(header.head_len, 32);
        assert_eq!(header.compression, COMPRESSION_LH5);
        assert_eq!(header.load_offset, 0x0010);
        assert_eq!(header.load_segment, 0xE000);
        assert_eq!(header.expanded_len, 0x400);
        assert_eq!(header.packed_len, 0x100);
        assert_eq!(header.reserved_packed, 0xAA);
        assert_eq!(header.reserved_expanded, 0xBB);
    }

    #[test]
    fn test_parse_rejects_truncated_header() {
        let buf = vec![0u8; 4096];
        let image = RomImage::new(&buf).unwrap();
        assert!(ModuleHeader::parse(&image, 4096 - 16).is_none());
        assert!(ModuleHeader::parse(&image, 4096 - 31).is_none());
        assert!(ModuleHeader::parse(&image, 4096 - 32).is_some());
    }

    #[test]
    fn test_signature_check() {
        let mut bytes = header_bytes();
        bytes[4] = 0xFF;
        let mut buf = vec![0u8; 4096];
        buf[..MODULE_HEADER_LEN].copy_from_slice(&bytes);
        let image = RomImage::new(&buf).unwrap();
        assert!(!ModuleHeader::parse(&image, 0).unwrap().signature_ok());
    }

    #[test]
    fn test_overrun_bound_includes_codec_prefix() {
        let mut buf = vec![0u8; 4096];
        buf[..MODULE_HEADER_LEN].copy_from_slice(&header_bytes());
        let image = RomImage::new(&buf).unwrap();
        let mut header = ModuleHeader::parse(&image, 0).unwrap();

        // 32 + 32 + 4 + packed must stay within 4096.
        header.packed_len = 4096 - 32 - 32 - 4;
        assert!(!header.overruns(32, image.len()));
        header.packed_len += 1;
        assert!(header.overruns(32, image.len()));

        // Huge packed lengths must not wrap the arithmetic.
        header.packed_len = u32::MAX;
        assert!(header.overruns(32, image.len()));
    }
}
