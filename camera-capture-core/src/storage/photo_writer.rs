use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::models::error::CameraError;

/// Write raw JPEG bytes from the sensor to `path`.
///
/// Creates missing parent directories. Returns the SHA-256 hex digest of
/// the bytes written.
pub fn write_photo(path: &Path, bytes: &[u8]) -> Result<String, CameraError> {
    if bytes.is_empty() {
        return Err(CameraError::CaptureWrite("camera delivered an empty frame".into()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| CameraError::CaptureWrite(format!("failed to create directory: {}", e)))?;
    }

    fs::write(path, bytes).map_err(|e| {
        CameraError::CaptureWrite(format!("failed to write {}: {}", path.display(), e))
    })?;

    Ok(sha256_hex(bytes))
}

/// SHA-256 hex digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("camera_capture_test_{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn writes_bytes_and_creates_directories() {
        let path = temp_file_path("photo.jpg");
        let checksum = write_photo(&path, &[0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(checksum.len(), 64);

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn empty_frame_is_rejected() {
        let path = temp_file_path("empty.jpg");
        assert!(matches!(write_photo(&path, &[]), Err(CameraError::CaptureWrite(_))));
        assert!(!path.exists());
    }
}
