//! Artifact envelope.
//!
//! Binary artifacts are a 16-byte header followed by a Postcard payload:
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     Magic ("OBML")
//! 4       2     Schema version (little-endian)
//! 6       2     Reserved
//! 8       4     Payload size (bytes)
//! 12      4     CRC32 checksum of payload
//! ```
//!
//! JSON artifacts wrap the value as `{"schema_version": .., "payload": ..}`.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::PersistError;

/// Magic bytes identifying an artifact file.
pub const MAGIC: &[u8; 4] = b"OBML";

/// Current artifact schema version. Readers reject any other version.
pub const SCHEMA_VERSION: u16 = 1;

/// Size of the binary header in bytes.
pub const HEADER_SIZE: usize = 16;

/// On-disk encoding, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Header + Postcard payload.
    Binary,
    /// Pretty-printed JSON.
    Json,
}

impl Format {
    /// `.json` selects JSON, anything else is binary.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Binary,
        }
    }
}

/// Parsed binary header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactHeader {
    pub version: u16,
    pub payload_size: u32,
    pub checksum: u32,
}

impl ArtifactHeader {
    fn for_payload(payload: &[u8]) -> Self {
        Self {
            version: SCHEMA_VERSION,
            payload_size: payload.len() as u32,
            checksum: crc32fast::hash(payload),
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4..6].copy_from_slice(&self.version.to_le_bytes());
        buf[8..12].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, PersistError> {
        if &buf[0..4] != MAGIC {
            return Err(PersistError::BadMagic);
        }
        let version = u16::from_le_bytes([buf[4], buf[5]]);
        if version != SCHEMA_VERSION {
            return Err(PersistError::UnsupportedVersion { found: version, expected: SCHEMA_VERSION });
        }
        Ok(Self {
            version,
            payload_size: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            checksum: u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
        })
    }
}

#[derive(Serialize)]
struct JsonEnvelopeRef<'a, T> {
    schema_version: u16,
    payload: &'a T,
}

#[derive(Deserialize)]
struct JsonEnvelope<T> {
    schema_version: u16,
    payload: T,
}

/// Encode a value as header + Postcard payload.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, PersistError> {
    let payload = postcard::to_allocvec(value).map_err(PersistError::Encode)?;
    let header = ArtifactHeader::for_payload(&payload);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a value written by [`encode`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PersistError> {
    let Some((head, payload)) = bytes.split_first_chunk::<HEADER_SIZE>() else {
        return Err(PersistError::Truncated { expected: HEADER_SIZE, actual: bytes.len() });
    };
    let header = ArtifactHeader::from_bytes(head)?;
    let expected = header.payload_size as usize;
    if payload.len() != expected {
        return Err(PersistError::Truncated { expected, actual: payload.len() });
    }
    let actual = crc32fast::hash(payload);
    if actual != header.checksum {
        return Err(PersistError::ChecksumMismatch { expected: header.checksum, actual });
    }
    postcard::from_bytes(payload).map_err(PersistError::Decode)
}

/// Encode a value as a versioned JSON document.
pub fn encode_json<T: Serialize>(value: &T) -> Result<Vec<u8>, PersistError> {
    let envelope = JsonEnvelopeRef { schema_version: SCHEMA_VERSION, payload: value };
    Ok(serde_json::to_vec_pretty(&envelope)?)
}

/// Decode a value written by [`encode_json`].
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PersistError> {
    let envelope: JsonEnvelope<T> = serde_json::from_slice(bytes)?;
    if envelope.schema_version != SCHEMA_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: envelope.schema_version,
            expected: SCHEMA_VERSION,
        });
    }
    Ok(envelope.payload)
}

/// Write an artifact, picking the format from the extension. Parent
/// directories are created as needed.
pub fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let bytes = match Format::from_path(path) {
        Format::Binary => encode(value)?,
        Format::Json => encode_json(value)?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    Ok(())
}

/// Read an artifact written by [`write_artifact`].
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let bytes = fs::read(path)?;
    match Format::from_path(path) {
        Format::Binary => decode(&bytes),
        Format::Json => decode_json(&bytes),
    }
}

/// Write a plain pretty-printed JSON report (no envelope).
pub fn write_report<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        values: Vec<f64>,
        lookup: BTreeMap<String, usize>,
    }

    fn sample() -> Sample {
        Sample {
            name: "bundle".into(),
            values: vec![1.5, -2.0],
            lookup: BTreeMap::from([("Male".into(), 1), ("Female".into(), 0)]),
        }
    }

    #[test]
    fn header_layout() {
        let header = ArtifactHeader { version: SCHEMA_VERSION, payload_size: 77, checksum: 0xDEADBEEF };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"OBML");
        assert_eq!(ArtifactHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn binary_roundtrip() {
        let bytes = encode(&sample()).unwrap();
        assert_eq!(decode::<Sample>(&bytes).unwrap(), sample());
    }

    #[test]
    fn rejects_foreign_files() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode::<Sample>(&bytes), Err(PersistError::BadMagic)));
        assert!(matches!(decode::<Sample>(b"OBM"), Err(PersistError::Truncated { .. })));
    }

    #[test]
    fn rejects_other_schema_versions() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[4..6].copy_from_slice(&(SCHEMA_VERSION + 1).to_le_bytes());
        assert!(matches!(
            decode::<Sample>(&bytes),
            Err(PersistError::UnsupportedVersion { expected: SCHEMA_VERSION, .. })
        ));
    }

    #[test]
    fn detects_corruption() {
        let mut bytes = encode(&sample()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(decode::<Sample>(&bytes), Err(PersistError::ChecksumMismatch { .. })));
        bytes.pop();
        assert!(matches!(decode::<Sample>(&bytes), Err(PersistError::Truncated { .. })));
    }

    #[test]
    fn extension_selects_format() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("nested/model.json");
        let bin = dir.path().join("model.bin");
        write_artifact(&json, &sample()).unwrap();
        write_artifact(&bin, &sample()).unwrap();

        let text = std::fs::read_to_string(&json).unwrap();
        assert!(text.contains("\"schema_version\": 1"));
        assert_eq!(read_artifact::<Sample>(&json).unwrap(), sample());
        assert_eq!(read_artifact::<Sample>(&bin).unwrap(), sample());
    }
}
