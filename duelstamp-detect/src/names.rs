//! Contestant identification against a per-side gallery of name-label
//! templates. Layout and font differ between the two sides, so each side
//! carries its own gallery.

use opencv::core::Mat;

use crate::matchers::{self, ColorMode};
use crate::utils::Region;

pub struct NameGallery {
    entries: Vec<(String, Mat)>,
}

impl NameGallery {
    pub fn new(entries: Vec<(String, Mat)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NameRead {
    /// Resolved display name, or `None` below the confidence floor.
    pub name: Option<String>,
    /// Best confidence seen across the whole gallery.
    pub confidence: f32,
}

pub struct NameIdentifier {
    region: Region,
    threshold: f32,
    gallery: NameGallery,
}

impl NameIdentifier {
    pub fn new(region: Region, threshold: f32, gallery: NameGallery) -> Self {
        Self {
            region,
            threshold,
            gallery,
        }
    }

    /// Scores every gallery entry; confidence is not monotonic across
    /// unrelated templates, so only the best of the full scan is
    /// authoritative.
    pub fn identify(&self, frame: &Mat) -> opencv::Result<NameRead> {
        let mut best: Option<(&str, f32)> = None;
        for (name, template) in &self.gallery.entries {
            let c =
                matchers::confidence(frame, self.region, template, ColorMode::Intensity)?;
            tracing::trace!(name = name.as_str(), confidence = c, "gallery candidate");
            if best.map_or(true, |(_, bc)| c > bc) {
                best = Some((name, c));
            }
        }
        Ok(match best {
            Some((name, confidence)) if confidence > self.threshold => NameRead {
                name: Some(name.to_string()),
                confidence,
            },
            Some((_, confidence)) => NameRead {
                name: None,
                confidence,
            },
            None => NameRead {
                name: None,
                confidence: -1.0,
            },
        })
    }
}
