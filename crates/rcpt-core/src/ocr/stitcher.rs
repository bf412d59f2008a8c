//! Regroups OCR fragments into logical receipt lines.
//!
//! Recognizers often detect a column-aligned label and its value ("MILK" and
//! "2.99") as separate blocks. Reading blocks top-to-bottom interleaves
//! unrelated rows, so fragments are re-bucketed into rows by vertical center
//! and read left-to-right within each row.

use std::cmp::Ordering;

use tracing::debug;

use super::{Geometry, OcrInput};

/// Spatial line stitcher.
#[derive(Debug, Clone)]
pub struct LineStitcher {
    row_threshold_ratio: f32,
}

impl LineStitcher {
    /// Create a stitcher with the default half-height row threshold.
    pub fn new() -> Self {
        Self {
            row_threshold_ratio: 0.5,
        }
    }

    /// Set the row threshold as a fraction of the mean fragment height.
    pub fn with_row_threshold_ratio(mut self, ratio: f32) -> Self {
        self.row_threshold_ratio = ratio;
        self
    }

    /// Stitch OCR output into logical lines, top to bottom.
    ///
    /// Geometry-free input is already line-shaped and is returned unchanged.
    pub fn stitch(&self, input: &OcrInput) -> Vec<String> {
        let blocks = match input {
            OcrInput::Lines(lines) => return lines.clone(),
            OcrInput::Blocks(blocks) => blocks,
        };

        let fragments: Vec<_> = blocks.iter().flat_map(|b| b.fragments.iter()).collect();

        if fragments.iter().all(|f| f.geometry.is_none()) {
            return fragments.iter().map(|f| f.text.clone()).collect();
        }

        let mut placed: Vec<(Geometry, &str)> = fragments
            .iter()
            .filter_map(|f| f.geometry.map(|g| (g, f.text.as_str())))
            .collect();

        if placed.len() < fragments.len() {
            debug!(
                "Dropped {} fragments without geometry",
                fragments.len() - placed.len()
            );
        }

        self.stitch_placed(&mut placed)
    }

    /// Stitch and join the lines with newlines.
    pub fn stitch_text(&self, input: &OcrInput) -> String {
        self.stitch(input).join("\n")
    }

    fn stitch_placed(&self, placed: &mut [(Geometry, &str)]) -> Vec<String> {
        if placed.is_empty() {
            return Vec::new();
        }

        placed.sort_by(|a, b| a.0.top.partial_cmp(&b.0.top).unwrap_or(Ordering::Equal));

        let avg_height = placed.iter().map(|(g, _)| g.height).sum::<f32>() / placed.len() as f32;
        let threshold = avg_height * self.row_threshold_ratio;

        // Forward scan: a row is anchored on its first fragment and never revisited.
        let mut rows: Vec<Vec<(Geometry, &str)>> = Vec::new();
        for &(geometry, text) in placed.iter() {
            match rows.last_mut() {
                Some(row) if (geometry.center_y() - row[0].0.center_y()).abs() < threshold => {
                    row.push((geometry, text));
                }
                _ => rows.push(vec![(geometry, text)]),
            }
        }

        debug!(
            "Stitched {} fragments into {} rows (threshold {:.1}px)",
            placed.len(),
            rows.len(),
            threshold
        );

        rows.into_iter()
            .map(|mut row| {
                row.sort_by(|a, b| a.0.left.partial_cmp(&b.0.left).unwrap_or(Ordering::Equal));
                row.iter().map(|(_, text)| *text).collect::<Vec<_>>().join(" ")
            })
            .collect()
    }
}

impl Default for LineStitcher {
    fn default() -> Self {
        Self::new()
    }
}
