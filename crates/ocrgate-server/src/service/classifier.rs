//! Upload classification by declared content type.

use ocrgate_paddle::FileType;
use serde::Serialize;

/// Kind of document accepted by the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[derive(strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Any `image/*` upload.
    Image,
    /// An `application/pdf` upload.
    Pdf,
}

/// Returned when an upload's content type is neither an image nor a PDF.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported content type: {}", content_type.as_deref().unwrap_or("<none>"))]
pub struct UnsupportedType {
    /// The rejected content type, if the client sent one.
    pub content_type: Option<String>,
}

impl ArtifactKind {
    /// Maps a declared content type to an artifact kind.
    ///
    /// The match is exact: `image/` prefix for images and the literal
    /// `application/pdf` for PDFs.
    pub fn classify(content_type: Option<&str>) -> Result<Self, UnsupportedType> {
        match content_type {
            Some(ct) if ct.starts_with("image/") => Ok(Self::Image),
            Some("application/pdf") => Ok(Self::Pdf),
            other => Err(UnsupportedType {
                content_type: other.map(str::to_owned),
            }),
        }
    }

    /// Name under which the upload is staged in its workspace.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Image => "file.png",
            Self::Pdf => "file.pdf",
        }
    }
}

impl From<ArtifactKind> for FileType {
    fn from(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Image => FileType::Image,
            ArtifactKind::Pdf => FileType::Pdf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_are_classified_by_prefix() {
        assert_eq!(ArtifactKind::classify(Some("image/png")), Ok(ArtifactKind::Image));
        assert_eq!(ArtifactKind::classify(Some("image/jpeg")), Ok(ArtifactKind::Image));
        assert_eq!(ArtifactKind::classify(Some("image/tiff")), Ok(ArtifactKind::Image));
    }

    #[test]
    fn pdf_requires_exact_type() {
        assert_eq!(ArtifactKind::classify(Some("application/pdf")), Ok(ArtifactKind::Pdf));
        assert!(ArtifactKind::classify(Some("application/pdf; charset=binary")).is_err());
    }

    #[test]
    fn other_types_are_rejected() {
        for content_type in ["text/plain", "text/csv", "", "application/json"] {
            let err = ArtifactKind::classify(Some(content_type)).unwrap_err();
            assert_eq!(err.content_type.as_deref(), Some(content_type));
        }

        let err = ArtifactKind::classify(None).unwrap_err();
        assert_eq!(err.content_type, None);
        assert_eq!(err.to_string(), "unsupported content type: <none>");
    }

    #[test]
    fn staging_names_and_engine_codes() {
        assert_eq!(ArtifactKind::Image.file_name(), "file.png");
        assert_eq!(ArtifactKind::Pdf.file_name(), "file.pdf");
        assert_eq!(FileType::from(ArtifactKind::Image), FileType::Image);
        assert_eq!(FileType::from(ArtifactKind::Pdf), FileType::Pdf);
        assert_eq!(ArtifactKind::Pdf.to_string(), "pdf");
    }
}
