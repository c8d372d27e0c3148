//! Output sinks for extracted module payloads.
//!
//! The extractor materializes one artifact per module through the
//! `OutputSink` trait: a directory-backed sink for the tool, an in-memory
//! sink for tests.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Destination for extracted module payloads.
///
/// Names are the deterministic `<name>_<id>.rom` filenames. Two modules
/// resolving to the same (type, id) pair silently overwrite each other;
/// the format does not guard against this and neither does the sink.
pub trait OutputSink {
    /// Create the named artifact, truncating any existing one, and write the
    /// full payload.
    fn write_module(&mut self, name: &str, data: &[u8]) -> io::Result<()>;
}

/// Sink writing one file per module into a directory.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Sink writing into the current working directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }
}

impl OutputSink for DirSink {
    fn write_module(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        fs::write(self.dir.join(name), data)
    }
}

/// In-memory sink for tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        names
    }
}

impl OutputSink for MemorySink {
    fn write_module(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        self.files.insert(name.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_overwrites_colliding_names() {
        let mut sink = MemorySink::new();
        sink.write_module("acpi_1.rom", b"first").unwrap();
        sink.write_module("acpi_1.rom", b"second").unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get("acpi_1.rom"), Some(&b"second"[..]));
    }

    #[test]
    fn test_dir_sink_writes_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirSink::new(dir.path());

        sink.write_module("display_0.rom", b"payload bytes").unwrap();
        let path = dir.path().join("display_0.rom");
        assert_eq!(fs::read(&path).unwrap(), b"payload bytes");

        sink.write_module("display_0.rom", b"x").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"x");
    }

    #[test]
    fn test_dir_sink_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let mut sink = DirSink::new(&missing);
        assert!(sink.write_module("acpi_1.rom", b"data").is_err());
    }
}
