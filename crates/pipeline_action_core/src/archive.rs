//! Zip container handling for pipeline artifacts.
//!
//! Every artifact exchanged between pipeline steps is a zip holding exactly one
//! JSON document. Outputs are always written under [`OUTPUT_ENTRY_NAME`]; inputs
//! may use any entry name as long as there is only one.

use std::io::{Cursor, Read, Write};

use serde_json::Value;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const OUTPUT_ENTRY_NAME: &str = "output.json";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive is not a readable zip: {0}")]
    Unreadable(#[source] zip::result::ZipError),

    #[error("archive contains {0} entries but exactly one was expected")]
    EntryCount(usize),

    #[error("failed to read archive entry: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write archive: {0}")]
    Write(String),

    #[error("failed to serialize artifact document: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Writes the given entries, in order, into a deflate-compressed zip.
pub fn write_archive(entries: &[(&str, &[u8])]) -> Result<Vec<u8>, ArchiveError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, contents) in entries {
        zip.start_file(*name, options)
            .map_err(|error| ArchiveError::Write(format!("failed to start entry {name}: {error}")))?;
        zip.write_all(contents)
            .map_err(|error| ArchiveError::Write(format!("failed to write entry {name}: {error}")))?;
    }

    let cursor = zip
        .finish()
        .map_err(|error| ArchiveError::Write(format!("failed to finish zip: {error}")))?;
    Ok(cursor.into_inner())
}

/// Returns the raw contents of the sole entry of `bytes`.
pub fn read_single_entry(bytes: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(ArchiveError::Unreadable)?;
    if archive.len() != 1 {
        return Err(ArchiveError::EntryCount(archive.len()));
    }

    let mut entry = archive.by_index(0).map_err(ArchiveError::Unreadable)?;
    let mut contents = Vec::new();
    entry.read_to_end(&mut contents).map_err(ArchiveError::Read)?;
    Ok(contents)
}

/// Serializes `value` and packs it as the single `output.json` entry of a new zip.
pub fn encode_json_artifact(value: &Value) -> Result<Vec<u8>, ArchiveError> {
    let document = serde_json::to_vec(value).map_err(ArchiveError::Serialize)?;
    write_archive(&[(OUTPUT_ENTRY_NAME, document.as_slice())])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("zip should open");
        (0..archive.len())
            .map(|index| {
                archive
                    .by_index(index)
                    .expect("entry should exist")
                    .name()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn json_artifact_has_single_output_entry() {
        let bytes = encode_json_artifact(&json!({"b": 2})).expect("encode should succeed");

        assert!(bytes.starts_with(b"PK"));
        assert_eq!(entry_names(&bytes), vec![OUTPUT_ENTRY_NAME.to_string()]);
    }

    #[test]
    fn decoded_entry_parses_back_to_original_value() {
        let value = json!({"nested": {"list": [1, 2.5, "three", null, true]}, "name": "ü"});
        let bytes = encode_json_artifact(&value).expect("encode should succeed");

        let contents = read_single_entry(&bytes).expect("decode should succeed");
        let parsed: Value = serde_json::from_slice(&contents).expect("entry should be json");
        assert_eq!(parsed, value);
    }

    #[test]
    fn accepts_any_single_entry_name() {
        let bytes = write_archive(&[("some/dir/input.json", &b"{\"a\":1}"[..])]).expect("zip");
        assert_eq!(read_single_entry(&bytes).expect("decode"), b"{\"a\":1}");
    }

    #[test]
    fn returns_entry_bytes_that_are_not_utf8() {
        let bytes = write_archive(&[("input.json", &[0xff, 0xfe, 0x7b][..])]).expect("zip");
        assert_eq!(read_single_entry(&bytes).expect("decode"), vec![0xff, 0xfe, 0x7b]);
    }

    #[test]
    fn rejects_empty_archive_with_entry_count() {
        let bytes = write_archive(&[]).expect("zip");
        let error = read_single_entry(&bytes).expect_err("empty archive should fail");
        assert!(matches!(error, ArchiveError::EntryCount(0)));
    }

    #[test]
    fn rejects_multi_entry_archive_with_entry_count() {
        let bytes = write_archive(&[("a.json", &b"{}"[..]), ("b.json", &b"{}"[..])]).expect("zip");
        let error = read_single_entry(&bytes).expect_err("two entries should fail");
        assert!(matches!(error, ArchiveError::EntryCount(2)));
        assert_eq!(
            error.to_string(),
            "archive contains 2 entries but exactly one was expected"
        );
    }

    #[test]
    fn rejects_bytes_that_are_not_a_zip() {
        let error = read_single_entry(b"{\"a\":1}").expect_err("plain json is not a zip");
        assert!(matches!(error, ArchiveError::Unreadable(_)));
    }
}
