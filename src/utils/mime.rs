//! Upload type checks.

use std::path::Path;

/// File kinds accepted by the workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Csv,
    Xls,
    Xlsx,
    Other,
}

impl FileKind {
    /// Classify a file by its extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        match extension_of(path).as_deref() {
            Some("pdf") => Self::Pdf,
            Some("csv") => Self::Csv,
            Some("xls") => Self::Xls,
            Some("xlsx") => Self::Xlsx,
            _ => Self::Other,
        }
    }

    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, Self::Csv | Self::Xls | Self::Xlsx)
    }
}

/// Lower-cased extension of `path`, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Detect a MIME type from leading magic bytes.
pub fn detect_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::from_path(Path::new("a/brief.PDF")), FileKind::Pdf);
        assert_eq!(FileKind::from_path(Path::new("data.xlsx")), FileKind::Xlsx);
        assert_eq!(FileKind::from_path(Path::new("notes.txt")), FileKind::Other);
        assert_eq!(FileKind::from_path(Path::new("README")), FileKind::Other);
        assert!(FileKind::Xls.is_spreadsheet());
        assert!(!FileKind::Pdf.is_spreadsheet());
    }

    #[test]
    fn test_detect_pdf() {
        assert_eq!(detect_mime(b"%PDF-1.7\n%"), Some("application/pdf"));
        assert_eq!(detect_mime(b"plain"), None);
    }
}
