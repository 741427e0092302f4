//! Radar chart rendering.
//!
//! Draws one spoke per score label on a fixed 0-10 scale. The chart carries no
//! text: labels are listed next to it in the document, so no font backend is
//! needed.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::Path;

use plotters::prelude::*;

use speakerlab_core::ScoreMap;

use super::ReportError;

/// Chart width and height in pixels.
pub const CHART_SIZE: u32 = 600;

const SCALE_MAX: f64 = 10.0;
const RINGS: [f64; 5] = [2.0, 4.0, 6.0, 8.0, 10.0];
const RADIUS: f64 = 260.0;

const BACKGROUND: RGBColor = RGBColor(0x1a, 0x1a, 0x1a);
const GRID: RGBColor = RGBColor(0x55, 0x55, 0x55);
const ACCENT: RGBColor = RGBColor(0xbe, 0x12, 0x3c);

/// An RGB bitmap.
#[derive(Debug, Clone)]
pub struct RadarChart {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB8 pixels.
    pub rgb: Vec<u8>,
}

impl RadarChart {
    /// Write the chart as a PNG.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Image` if encoding or writing fails.
    pub fn save_png(&self, path: &Path) -> Result<(), ReportError> {
        let image = image::RgbImage::from_raw(self.width, self.height, self.rgb.clone())
            .ok_or_else(|| ReportError::Chart("pixel buffer does not match chart size".into()))?;
        image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Render `scores` as a radar chart. Returns `None` when there is nothing to plot.
///
/// # Errors
///
/// Returns `ReportError::Chart` if drawing fails.
pub fn render(scores: &ScoreMap) -> Result<Option<RadarChart>, ReportError> {
    if scores.is_empty() {
        return Ok(None);
    }

    let axes = scores.len();
    let mut rgb = vec![0_u8; (CHART_SIZE * CHART_SIZE * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut rgb, (CHART_SIZE, CHART_SIZE)).into_drawing_area();
        root.fill(&BACKGROUND).map_err(chart_error)?;

        let center = point_at(0, axes, 0.0);
        for ring in RINGS {
            #[allow(clippy::cast_possible_truncation)] // bounded by RADIUS
            let radius = (RADIUS * ring / SCALE_MAX).round() as i32;
            root.draw(&Circle::new(center, radius, GRID.stroke_width(1)))
                .map_err(chart_error)?;
        }
        for axis in 0..axes {
            root.draw(&PathElement::new(
                vec![center, point_at(axis, axes, SCALE_MAX)],
                GRID.stroke_width(1),
            ))
            .map_err(chart_error)?;
        }

        let outline: Vec<(i32, i32)> = scores
            .iter()
            .enumerate()
            .map(|(axis, (_, score))| point_at(axis, axes, score.clamp(0.0, SCALE_MAX)))
            .collect();

        if outline.len() >= 3 {
            root.draw(&Polygon::new(outline.clone(), ACCENT.mix(0.25).filled()))
                .map_err(chart_error)?;
        }
        let mut closed = outline.clone();
        closed.push(outline[0]);
        root.draw(&PathElement::new(closed, ACCENT.stroke_width(3)))
            .map_err(chart_error)?;
        for vertex in outline {
            root.draw(&Circle::new(vertex, 5, ACCENT.filled()))
                .map_err(chart_error)?;
        }

        root.present().map_err(chart_error)?;
    }

    Ok(Some(RadarChart {
        width: CHART_SIZE,
        height: CHART_SIZE,
        rgb,
    }))
}

/// Pixel position of `value` on spoke `axis` of `axes`, first spoke pointing up.
fn point_at(axis: usize, axes: usize, value: f64) -> (i32, i32) {
    #[allow(clippy::cast_precision_loss)] // a handful of axes
    let angle = TAU * axis as f64 / axes as f64 - FRAC_PI_2;
    let r = RADIUS * value / SCALE_MAX;
    let c = f64::from(CHART_SIZE) / 2.0;

    #[allow(clippy::cast_possible_truncation)] // inside the bitmap
    (
        (c + r * angle.cos()).round() as i32,
        (c + r * angle.sin()).round() as i32,
    )
}

fn chart_error(e: impl std::fmt::Display) -> ReportError {
    ReportError::Chart(e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use speakerlab_core::Tier;

    use super::*;

    fn pixel(chart: &RadarChart, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * chart.width + x) * 3) as usize;
        [chart.rgb[i], chart.rgb[i + 1], chart.rgb[i + 2]]
    }

    #[test]
    fn test_empty_scores_render_nothing() {
        assert!(render(&ScoreMap::default()).unwrap().is_none());
    }

    #[test]
    fn test_first_spoke_points_up() {
        assert_eq!(point_at(0, 4, 10.0), (300, 40));
        assert_eq!(point_at(1, 4, 10.0), (560, 300));
        assert_eq!(point_at(0, 4, 0.0), (300, 300));
    }

    #[test]
    fn test_render_draws_on_background() {
        let scores = ScoreMap::from_analysis(
            Tier::Curator,
            &json!({"nine_principles_check": {
                "Pasiunea": {"score": 9}, "Povestea": {"score": 7}, "Umor": {"score": 12}
            }}),
        );
        let chart = render(&scores).unwrap().unwrap();
        assert_eq!(chart.rgb.len(), 600 * 600 * 3);
        assert_eq!(pixel(&chart, 2, 2), [0x1a, 0x1a, 0x1a]);
        // Vertex marker of the first score on the upward spoke.
        let (x, y) = point_at(0, 3, 9.0);
        assert_ne!(pixel(&chart, x.try_into().unwrap(), y.try_into().unwrap()), [0x1a, 0x1a, 0x1a]);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let scores = ScoreMap::from_analysis(
            Tier::Free,
            &json!({"Idea Strength": {"score": 8, "recommendation": "x"}}),
        );
        let chart = render(&scores).unwrap().unwrap();
        let path = dir.path().join("chart.png");
        chart.save_png(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
