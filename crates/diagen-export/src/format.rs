//! Export formats and rendered artifacts.

use std::fmt;
use std::str::FromStr;

use crate::error::ExportError;

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    /// Every export format.
    pub const ALL: [Self; 3] = [Self::Svg, Self::Png, Self::Pdf];

    /// File extension without the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    /// Media type of the exported bytes.
    #[must_use]
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == s)
            .ok_or_else(|| ExportError::UnsupportedFormat(s.to_owned()))
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Bytes produced by an export, with their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
}

impl ExportArtifact {
    /// Media type of [`Self::bytes`].
    #[must_use]
    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }

    /// File extension of [`Self::bytes`].
    #[must_use]
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// Download filename `<title>.<ext>`.
    ///
    /// Quotes, path separators, and control characters in `title` are
    /// replaced so the name is safe inside a `Content-Disposition` header.
    #[must_use]
    pub fn attachment_filename(&self, title: &str) -> String {
        let stem: String = title
            .trim()
            .chars()
            .map(|c| match c {
                '"' | '\\' | '/' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        let stem = if stem.is_empty() { "diagram" } else { &stem };
        format!("{stem}.{}", self.extension())
    }
}
