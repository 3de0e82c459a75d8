//! Persist decoded audio payloads.

use std::path::Path;

use tracing::info;

use crate::error::{ExtractError, Result};

/// Write a decoded audio payload into the extraction directory.
///
/// Truncate-create semantics: an existing file at the destination is
/// silently replaced. Returns the bare filename on success.
pub fn write_audio(extract_dir: &Path, filename: &str, payload: &[u8]) -> Result<String> {
    let path = extract_dir.join(filename);
    std::fs::write(&path, payload).map_err(|e| ExtractError::AttachmentWrite {
        filename: filename.to_string(),
        source: e,
    })?;

    info!(filename, bytes = payload.len(), "Extracted audio recording");
    Ok(filename.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_back() {
        let tmp = tempfile::tempdir().unwrap();
        let name = write_audio(tmp.path(), "call_1_20230102_030405.mp3", b"payload").unwrap();
        assert_eq!(name, "call_1_20230102_030405.mp3");
        let content = std::fs::read(tmp.path().join(name)).unwrap();
        assert_eq!(content, b"payload");
    }

    #[test]
    fn test_write_overwrites_existing() {
        let tmp = tempfile::tempdir().unwrap();
        write_audio(tmp.path(), "call.mp3", b"first").unwrap();
        write_audio(tmp.path(), "call.mp3", b"second").unwrap();
        let content = std::fs::read(tmp.path().join("call.mp3")).unwrap();
        assert_eq!(content, b"second");
    }

    #[test]
    fn test_missing_directory_is_write_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let err = write_audio(&missing, "call.mp3", b"x").unwrap_err();
        assert!(matches!(err, ExtractError::AttachmentWrite { .. }));
    }
}
