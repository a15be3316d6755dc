use std::{fs, thread, time::Duration};

use super::sampler::SampleError;

const MAX_ATTEMPTS: usize = 20;
const ATTEMPT_DELAY_MS: u64 = 25;

/// Reads the screenshot behind a `file://` URI and deletes the file.
///
/// Portals may hand out the URI before the file is fully written, so empty or
/// missing files are retried briefly. Blocking; call from `spawn_blocking`.
pub fn read_sample_file(uri: &str) -> Result<Vec<u8>, SampleError> {
    let url = url::Url::parse(uri)
        .map_err(|e| SampleError::InvalidResponse(format!("Invalid file URI '{}': {}", uri, e)))?;
    let path = url
        .to_file_path()
        .map_err(|_| SampleError::InvalidResponse(format!("Cannot convert URI to path: {}", uri)))?;

    let mut attempt = 0;
    let data = loop {
        match fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => break bytes,
            Ok(_) => log::trace!("Sample file {} still empty", path.display()),
            Err(e) => log::trace!("Sample file {} not ready: {}", path.display(), e),
        }

        attempt += 1;
        if attempt == MAX_ATTEMPTS {
            return Err(SampleError::Decode(format!(
                "Screenshot file {} not ready after {} attempts",
                path.display(),
                MAX_ATTEMPTS
            )));
        }
        thread::sleep(Duration::from_millis(ATTEMPT_DELAY_MS));
    };

    // Sampling runs several times a second; never leave files behind
    if let Err(e) = fs::remove_file(&path) {
        log::warn!("Failed to remove sample file {}: {}", path.display(), e);
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_percent_encoded_path_and_removes_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("screen shot.png");
        std::fs::write(&file_path, b"png-bytes").unwrap();
        let uri = url::Url::from_file_path(&file_path).unwrap().to_string();
        assert!(uri.contains("%20"));

        let data = read_sample_file(&uri).unwrap();
        assert_eq!(data, b"png-bytes");
        assert!(!file_path.exists());
    }

    #[test]
    fn rejects_non_file_uris() {
        assert!(matches!(
            read_sample_file("https://example.com/a.png"),
            Err(SampleError::InvalidResponse(_))
        ));
    }
}
