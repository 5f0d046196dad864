//! Flattens engine pages into the upload response.

use std::cmp::Ordering;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::service::{OcrPage, Workspace};
use crate::{Error, Result};

/// Tracing target for result assembly.
const TRACING_TARGET: &str = "ocrgate_server::service::assembler";

/// Prefix of every encoded annotation image.
const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Order in which annotation images are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ImageOrder {
    /// Plain byte-wise file name order: `1.png`, `10.png`, `2.png`.
    #[default]
    Lexicographic,
    /// Page number order: `1.png`, `2.png`, `10.png`.
    Numeric,
}

impl ImageOrder {
    /// Sorts file names in place.
    pub fn sort(self, names: &mut [String]) {
        match self {
            Self::Lexicographic => names.sort(),
            Self::Numeric => names.sort_by(|a, b| compare_numeric(a, b)),
        }
    }
}

/// Numeric stems first, in value order; the rest after, lexicographically.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let key = |name: &str| {
        Path::new(name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<u64>().ok())
    };

    match (key(a), key(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Texts and encoded images of one upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembled {
    /// All recognized lines, page by page.
    pub texts: Vec<String>,
    /// Annotation images as `data:image/png;base64,...` URIs.
    pub images: Vec<String>,
}

/// Builds the upload response from engine pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler {
    order: ImageOrder,
}

impl ResultAssembler {
    /// Creates an assembler listing images in `order`.
    pub fn new(order: ImageOrder) -> Self {
        Self { order }
    }

    /// Returns the configured image order.
    pub fn order(&self) -> ImageOrder {
        self.order
    }

    /// Saves each page's annotation as `<n>.png` in the workspace, then reads
    /// every `.png` except the staged upload back as data URIs.
    pub async fn assemble(&self, pages: &[OcrPage], workspace: &Workspace) -> Result<Assembled> {
        let mut texts = Vec::new();

        for (index, page) in pages.iter().enumerate() {
            let name = format!("{}.png", index + 1);
            page.save_annotated_image(&workspace.path().join(&name))
                .await
                .map_err(|e| {
                    Error::file_system(format!("failed to save '{}': {}", name, e)).with_source(e)
                })?;
            texts.extend(page.recognized_texts().iter().cloned());
        }

        let mut names = self.list_images(workspace).await?;
        self.order.sort(&mut names);

        let mut images = Vec::with_capacity(names.len());
        for name in &names {
            let png = tokio::fs::read(workspace.path().join(name))
                .await
                .map_err(|e| {
                    Error::file_system(format!("failed to read '{}': {}", name, e)).with_source(e)
                })?;
            images.push(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(png)));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            pages = pages.len(),
            texts = texts.len(),
            images = images.len(),
            "ocr result assembled"
        );

        Ok(Assembled { texts, images })
    }

    async fn list_images(&self, workspace: &Workspace) -> Result<Vec<String>> {
        let list_error =
            |e: std::io::Error| Error::file_system("failed to list workspace").with_source(e);

        let mut entries = tokio::fs::read_dir(workspace.path())
            .await
            .map_err(list_error)?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.ends_with(".png") && workspace.staged_name() != Some(name.as_str()) {
                names.push(name);
            }
        }

        Ok(names)
    }
}
