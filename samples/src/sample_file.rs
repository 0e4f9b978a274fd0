//! Temporary text file used as the object payload

use std::io::{self, Write};
use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use service_clients::{ObjectMetadata, ServiceError, ServiceResult};
use tempfile::NamedTempFile;

/// Lines written to every sample file
pub const SAMPLE_LINES: [&str; 5] = [
    "abcdefghijklmnopqrstuvwxyz",
    "01234567890112345678901234",
    "!@#$%^&*()-=[]{};':',.<>/?",
    "01234567890112345678901234",
    "abcdefghijklmnopqrstuvwxyz",
];

/// A temporary file with sample text, removed from disk when dropped
pub struct SampleFile {
    file: NamedTempFile,
}

impl SampleFile {
    /// Creates the file and writes the sample lines
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be created or written
    pub fn create() -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("cloud-samples-")
            .suffix(".txt")
            .tempfile()?;

        for line in SAMPLE_LINES {
            writeln!(file, "{line}")?;
        }
        file.flush()?;

        Ok(Self { file })
    }

    /// Location of the file on disk
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Expected file contents
    #[must_use]
    pub fn contents() -> String {
        SAMPLE_LINES.iter().map(|line| format!("{line}\n")).collect()
    }

    /// Metadata describing the upload
    ///
    /// # Errors
    ///
    /// Returns `ClientUnavailable` if the file cannot be inspected
    pub fn metadata(&self) -> ServiceResult<ObjectMetadata> {
        let length = self
            .file
            .as_file()
            .metadata()
            .map_err(|e| ServiceError::unavailable(format!("Failed to inspect sample file: {e}")))?
            .len();

        Ok(ObjectMetadata {
            content_length: i64::try_from(length).ok(),
            ..ObjectMetadata::with_content_type("text/plain")
        })
    }

    /// Opens the file as an upload body
    ///
    /// # Errors
    ///
    /// Returns `ClientUnavailable` if the file cannot be opened
    pub async fn byte_stream(&self) -> ServiceResult<ByteStream> {
        ByteStream::from_path(self.path())
            .await
            .map_err(|e| ServiceError::unavailable(format!("Failed to open sample file: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_sample_file_contents() {
        let sample = SampleFile::create().unwrap();

        let bytes = sample
            .byte_stream()
            .await
            .unwrap()
            .collect()
            .await
            .unwrap()
            .into_bytes();

        assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), SampleFile::contents());
        assert_eq!(
            sample.metadata().unwrap().content_length,
            Some(i64::try_from(SampleFile::contents().len()).unwrap())
        );
    }

    #[test]
    fn test_sample_file_removed_on_drop() {
        let sample = SampleFile::create().unwrap();
        let path = sample.path().to_path_buf();
        assert!(path.exists());

        drop(sample);

        assert!(!path.exists());
    }
}
