use std::path::PathBuf;

/// Transfer status reported by the web layer for a form upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferError {
    #[default]
    Ok,
    IniSize,
    FormSize,
    Partial,
    NoFile,
    NoTmpDir,
    CantWrite,
    Extension,
}

impl TransferError {
    /// Map the conventional numeric form-upload error codes (0-8, 5 unused).
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(TransferError::Ok),
            1 => Some(TransferError::IniSize),
            2 => Some(TransferError::FormSize),
            3 => Some(TransferError::Partial),
            4 => Some(TransferError::NoFile),
            6 => Some(TransferError::NoTmpDir),
            7 => Some(TransferError::CantWrite),
            8 => Some(TransferError::Extension),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            TransferError::Ok => "",
            TransferError::IniSize => "file exceeds the server size limit",
            TransferError::FormSize => "file exceeds the form size limit",
            TransferError::Partial => "file was only partially uploaded",
            TransferError::NoFile => "no uploaded file found",
            TransferError::NoTmpDir => "missing temporary upload directory",
            TransferError::CantWrite => "failed to write uploaded file",
            TransferError::Extension => "upload stopped by a server extension",
        }
    }
}

/// Descriptor of a file received from a browser form.
///
/// Passed explicitly by the web layer instead of being read from ambient
/// request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-supplied file name
    pub name: String,
    /// Where the web layer spooled the body
    pub temp_path: PathBuf,
    pub size: u64,
    /// Declared MIME type
    pub content_type: String,
    pub error: TransferError,
}
