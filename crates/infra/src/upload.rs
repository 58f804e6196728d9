//! Loading local files into upload parts

use std::path::Path;

use pingintel_domain::{PingError, Result, UploadFile};

/// Read `path` into memory, named after its final component unless
/// `filename` overrides it.
///
/// # Errors
/// `Validation` when the path does not exist or has no file name, `Io` when
/// it cannot be read.
pub fn read_upload(path: &Path, filename: Option<&str>) -> Result<UploadFile> {
    if !path.is_file() {
        return Err(PingError::Validation(format!("Path {} does not exist.", path.display())));
    }
    let name = match filename.filter(|name| !name.trim().is_empty()) {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                PingError::Validation(format!("Path {} has no file name.", path.display()))
            })?,
    };
    let bytes = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), filename = %name, bytes = bytes.len(), "Read upload");
    Ok(UploadFile::new(name, bytes))
}

/// Read several files, failing on the first missing one.
pub fn read_uploads<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<UploadFile>> {
    paths.iter().map(|path| read_upload(path.as_ref(), None)).collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn reads_bytes_and_filename() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test_sov.xlsx");
        std::fs::File::create(&path).unwrap().write_all(b"PK\x03\x04").unwrap();

        let upload = read_upload(&path, None).unwrap();
        assert_eq!(upload.filename, "test_sov.xlsx");
        assert_eq!(upload.bytes, b"PK\x03\x04");

        let renamed = read_upload(&path, Some("renamed.xlsx")).unwrap();
        assert_eq!(renamed.filename, "renamed.xlsx");
    }

    #[test]
    fn missing_file_is_validation_error() {
        let err = read_uploads(&["/nonexistent/sov.xlsx"]).unwrap_err();
        assert!(
            matches!(err, PingError::Validation(message) if message.contains("does not exist"))
        );
    }
}
