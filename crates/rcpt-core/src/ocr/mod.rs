//! OCR input shapes and line stitching.

mod stitcher;

pub use stitcher::LineStitcher;

use serde::{Deserialize, Serialize};

/// Bounding geometry of a recognized fragment, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub top: f32,
    pub left: f32,
    pub height: f32,
}

impl Geometry {
    pub fn new(top: f32, left: f32, height: f32) -> Self {
        Self { top, left, height }
    }

    /// Vertical center of the box.
    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }
}

/// One recognized text unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Recognized text content.
    pub text: String,

    /// Bounding box; absent when the recognizer reports bare lines.
    #[serde(flatten)]
    pub geometry: Option<Geometry>,
}

impl TextFragment {
    /// A fragment with bounding geometry.
    pub fn new(text: impl Into<String>, top: f32, left: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            geometry: Some(Geometry::new(top, left, height)),
        }
    }

    /// A fragment without geometry (already a logical line).
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            geometry: None,
        }
    }
}

/// A recognizer-defined group of fragments (block, paragraph, line).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub fragments: Vec<TextFragment>,
}

/// Output of an OCR recognizer, in either of the shapes recognizers produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrInput {
    /// Flat list of recognized lines without geometry.
    Lines(Vec<String>),
    /// Fragments with bounding geometry, grouped by the recognizer.
    Blocks(Vec<TextBlock>),
}

impl OcrInput {
    /// Build input from plain text, one line per row.
    pub fn from_text(text: &str) -> Self {
        OcrInput::Lines(text.lines().map(str::to_string).collect())
    }
}
