use thiserror::Error;

#[derive(Debug, Error)]
pub enum StampError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Page {index} does not exist (document has {page_count} pages)")]
    PageIndexError { index: u32, page_count: u32 },

    #[error("Invalid color: {0}")]
    InvalidColorError(String),

    #[error("PDF read error: {0}")]
    PdfReadError(String),

    #[error("PDF write error: {0}")]
    PdfWriteError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Logo error: {0}")]
    LogoError(String),

    #[error("Protection error: {0}")]
    ProtectionError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// 終了コード
pub const EXIT_FILE_NOT_FOUND: u8 = 1;
pub const EXIT_PDF_ERROR: u8 = 2;
pub const EXIT_INVALID_ARGS: u8 = 3;
pub const EXIT_PERMISSION_DENIED: u8 = 4;
pub const EXIT_FAILURE: u8 = 5;

/// Generates factory methods for [`StampError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl StampError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a configuration error.
    config => ConfigError,
    /// Create an invalid color error.
    invalid_color => InvalidColorError,
    /// Create a PDF read error.
    pdf_read => PdfReadError,
    /// Create a PDF write error.
    pdf_write => PdfWriteError,
    /// Create a render error.
    render => RenderError,
    /// Create a logo error.
    logo => LogoError,
    /// Create a protection error.
    protection => ProtectionError,
}

impl StampError {
    /// Create a page index error.
    pub fn page_index(index: u32, page_count: u32) -> Self {
        Self::PageIndexError { index, page_count }
    }

    /// Stable short code for structured (JSON) reporting.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "config",
            Self::PageIndexError { .. } => "page_index",
            Self::InvalidColorError(_) => "invalid_color",
            Self::PdfReadError(_) => "pdf_read",
            Self::PdfWriteError(_) => "pdf_write",
            Self::RenderError(_) => "render",
            Self::LogoError(_) => "logo",
            Self::ProtectionError(_) => "protection",
            Self::IoError(_) => "io",
        }
    }

    /// CLI のプロセス終了コード。
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigError(_) | Self::PageIndexError { .. } | Self::InvalidColorError(_) => {
                EXIT_INVALID_ARGS
            }
            Self::IoError(e) => match e.kind() {
                std::io::ErrorKind::NotFound => EXIT_FILE_NOT_FOUND,
                std::io::ErrorKind::PermissionDenied => EXIT_PERMISSION_DENIED,
                _ => EXIT_FAILURE,
            },
            Self::PdfReadError(_) | Self::PdfWriteError(_) => EXIT_PDF_ERROR,
            Self::RenderError(_) | Self::LogoError(_) | Self::ProtectionError(_) => EXIT_FAILURE,
        }
    }
}

impl From<lopdf::Error> for StampError {
    fn from(e: lopdf::Error) -> Self {
        Self::PdfReadError(e.to_string())
    }
}

impl From<serde_json::Error> for StampError {
    fn from(e: serde_json::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

impl From<serde_yml::Error> for StampError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

impl From<image::ImageError> for StampError {
    fn from(e: image::ImageError) -> Self {
        Self::LogoError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StampError>;
