//! Phoenix BIOS module extraction.
//!
//! This crate pulls embedded firmware sub-images ("modules") out of a
//! Phoenix-format ROM image: a metadata anchor record plus a backward-linked
//! chain of module headers, each optionally LH5-compressed.
//!
//! # Architecture
//!
//! - [`RomImage`]: bounds-checked view over the untrusted image buffer
//! - [`anchor`]: BCPSYS identifier-record scan yielding the chain anchor
//! - [`extract`]: chain walker, header validation and codec dispatch
//! - [`Lh5Codec`] trait: the external decompression collaborator
//! - [`OutputSink`] trait: where extracted payloads land
//!
//! Everything operates read-only on the input; the only state produced is
//! one output artifact per extracted module.

pub mod anchor;
pub mod codec;
pub mod error;
pub mod extract;
pub mod image;
pub mod module;
pub mod output;
pub mod registry;

pub use anchor::{locate_bcpsys, BcpSummary};
pub use codec::{DelharcLh5, Lh5Codec};
pub use error::{BiosError, BiosResult};
pub use extract::{
    extract, extract_trusted, module_file_name, ExtractionReport, ModuleRecord, ModuleStatus,
};
pub use image::RomImage;
pub use module::{ModuleHeader, COMPRESSION_LH5, COMPRESSION_NONE, MODULE_SIGNATURE};
pub use output::{DirSink, MemorySink, OutputSink};
pub use registry::module_name;
