//! Trim geometry: parsing `convert -trim -verbose` output and unifying it.
//!
//! ImageMagick reports the result of a trim on the second line of its
//! verbose output. The only part we rely on is the geometry pair:
//!
//! ```text
//! a.png=>/tmp/tmp.png PNG 640x480=>501x396 640x480+75+38 8-bit sRGB 0.010u
//!                                  ^^^^^^^ ^^^^^^^^^^^^^
//!                                  size    size  offset offset
//! ```
//!
//! Grammar (matched anywhere in the line, leftmost match wins):
//!
//! ```text
//! geometry := size " " size offset offset
//! size     := DIGITS "x" DIGITS
//! offset   := ("+" | "-") DIGITS
//! ```
//!
//! The first `size` is read as the original width/height, the second as the
//! trimmed width/height, followed by the horizontal and vertical offsets.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::Regex;
use thiserror::Error;

use super::BatchError;
use crate::utils::exec::FilterRule;

/// Zero-based index of the report line among the non-noise output lines.
const REPORT_LINE: usize = 1;

/// Output noise that is not part of the trim report.
pub const TRIM_REPORT_FILTER: FilterRule =
    FilterRule::new(&["WARNING: The convert command is deprecated"]);

/// Position and size of the content region within one image.
///
/// Fields are named by position in the report. With ImageMagick's actual
/// output `original_*` holds the trimmed content size and `trimmed_*` the
/// canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropGeometry {
    pub original_width: u32,
    pub original_height: u32,
    pub trimmed_width: u32,
    pub trimmed_height: u32,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Why a trim report could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected at least {} lines of output, found {found}", .index + 1)]
    MissingLine { index: usize, found: usize },

    #[error("no `WxH WxH+X+Y` geometry in `{line}`")]
    NoMatch { line: String },

    #[error("{field} `{value}` is out of range")]
    OutOfRange { field: &'static str, value: String },
}

fn geometry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([0-9]+)x([0-9]+) ([0-9]+)x([0-9]+)([+-][0-9]+)([+-][0-9]+)").unwrap()
    })
}

/// Parse one geometry line.
pub fn parse_geometry_line(line: &str) -> Result<CropGeometry, ParseError> {
    let caps = geometry_regex()
        .captures(line)
        .ok_or_else(|| ParseError::NoMatch {
            line: line.trim().to_string(),
        })?;

    fn field<T: std::str::FromStr>(
        caps: &regex::Captures<'_>,
        index: usize,
        name: &'static str,
    ) -> Result<T, ParseError> {
        let raw = &caps[index];
        raw.parse().map_err(|_| ParseError::OutOfRange {
            field: name,
            value: raw.to_string(),
        })
    }

    Ok(CropGeometry {
        original_width: field(&caps, 1, "original width")?,
        original_height: field(&caps, 2, "original height")?,
        trimmed_width: field(&caps, 3, "trimmed width")?,
        trimmed_height: field(&caps, 4, "trimmed height")?,
        offset_x: field(&caps, 5, "horizontal offset")?,
        offset_y: field(&caps, 6, "vertical offset")?,
    })
}

/// Parse the full output of a `-trim -verbose` dry run.
pub fn parse_trim_report(output: &str) -> Result<CropGeometry, ParseError> {
    let lines = TRIM_REPORT_FILTER.lines(output);
    let line = lines.get(REPORT_LINE).ok_or(ParseError::MissingLine {
        index: REPORT_LINE,
        found: lines.len(),
    })?;
    parse_geometry_line(line)
}

// ============================================================================
// Unified crop
// ============================================================================

/// Which trimmed dimension disagrees across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width => f.write_str("width"),
            Self::Height => f.write_str("height"),
        }
    }
}

/// Images whose trimmed size differs from the first image of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub dimension: Dimension,
    pub reference: (PathBuf, u32),
    pub offending: Vec<(PathBuf, u32)>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trimmed {} differs across the batch: `{}` reports {}",
            self.dimension,
            self.reference.0.display(),
            self.reference.1
        )?;
        for (path, value) in &self.offending {
            write!(f, ", `{}` reports {}", path.display(), value)?;
        }
        Ok(())
    }
}

/// One crop window shared by every image of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnifiedCrop {
    pub width: u64,
    pub height: u64,
    pub x: i32,
    pub y: i32,
}

impl UnifiedCrop {
    /// Compute the shared crop from per-image measurements.
    ///
    /// The window is the largest measured size, widened by the spread of the
    /// offsets, and anchored at the smallest offset. Every image keeps its
    /// content at the same relative position.
    pub fn from_samples(samples: &[(PathBuf, CropGeometry)]) -> Result<Self, BatchError> {
        let Some((first_path, first)) = samples.first() else {
            return Err(BatchError::EmptyBatch);
        };

        check_uniform(samples, first_path, first.trimmed_width, Dimension::Width, |g| {
            g.trimmed_width
        })?;
        check_uniform(samples, first_path, first.trimmed_height, Dimension::Height, |g| {
            g.trimmed_height
        })?;

        let geometries = samples.iter().map(|(_, g)| g);
        let max_w = geometries.clone().map(|g| g.original_width).max().unwrap_or(0);
        let max_h = geometries.clone().map(|g| g.original_height).max().unwrap_or(0);
        let (min_x, max_x) = min_max(geometries.clone().map(|g| g.offset_x));
        let (min_y, max_y) = min_max(geometries.map(|g| g.offset_y));

        Ok(Self {
            width: u64::from(max_w) + spread(min_x, max_x),
            height: u64::from(max_h) + spread(min_y, max_y),
            x: min_x,
            y: min_y,
        })
    }
}

impl fmt::Display for UnifiedCrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}{:+}{:+}", self.width, self.height, self.x, self.y)
    }
}

fn check_uniform(
    samples: &[(PathBuf, CropGeometry)],
    first_path: &Path,
    expected: u32,
    dimension: Dimension,
    value: impl Fn(&CropGeometry) -> u32,
) -> Result<(), BatchError> {
    let offending: Vec<_> = samples
        .iter()
        .filter(|(_, g)| value(g) != expected)
        .map(|(path, g)| (path.clone(), value(g)))
        .collect();

    if offending.is_empty() {
        return Ok(());
    }
    Err(BatchError::GeometryInvariant(Mismatch {
        dimension,
        reference: (first_path.to_path_buf(), expected),
        offending,
    }))
}

fn min_max(values: impl Iterator<Item = i32>) -> (i32, i32) {
    values.fold((i32::MAX, i32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

#[inline]
fn spread(min: i32, max: i32) -> u64 {
    (i64::from(max) - i64::from(min)) as u64
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(w: u32, h: u32, tw: u32, th: u32, x: i32, y: i32) -> CropGeometry {
        CropGeometry {
            original_width: w,
            original_height: h,
            trimmed_width: tw,
            trimmed_height: th,
            offset_x: x,
            offset_y: y,
        }
    }

    fn samples(items: &[CropGeometry]) -> Vec<(PathBuf, CropGeometry)> {
        items
            .iter()
            .enumerate()
            .map(|(i, g)| (PathBuf::from(format!("/frames/image_{i}.png")), *g))
            .collect()
    }

    // ------------------------------------------------------------------------
    // parse_geometry_line
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_imagemagick_line() {
        let line = "a.png=>/tmp/tmp.png PNG 640x480=>501x396 640x480+75+38 8-bit sRGB 0.010u 0:00.001";
        let g = parse_geometry_line(line).unwrap();
        assert_eq!(g, geometry(501, 396, 640, 480, 75, 38));
    }

    #[test]
    fn test_geometry_regex_compiles() {
        assert_eq!(geometry_regex().captures_len(), 7);
    }

    #[test]
    fn test_parse_ascii_digits_only() {
        let err = parse_geometry_line("\u{0661}x\u{0661} 2x2+0+0").unwrap_err();
        assert!(matches!(err, ParseError::NoMatch { .. }));
    }

    #[test]
    fn test_parse_each_field() {
        let g = parse_geometry_line("11x22 33x44+55+66").unwrap();
        assert_eq!(g.original_width, 11);
        assert_eq!(g.original_height, 22);
        assert_eq!(g.trimmed_width, 33);
        assert_eq!(g.trimmed_height, 44);
        assert_eq!(g.offset_x, 55);
        assert_eq!(g.offset_y, 66);
    }

    #[test]
    fn test_parse_signed_offsets() {
        let g = parse_geometry_line("10x10 20x20+10+0").unwrap();
        assert_eq!((g.offset_x, g.offset_y), (10, 0));

        let g = parse_geometry_line("10x10 20x20+0-5").unwrap();
        assert_eq!((g.offset_x, g.offset_y), (0, -5));

        let g = parse_geometry_line("10x10 20x20-3-4").unwrap();
        assert_eq!((g.offset_x, g.offset_y), (-3, -4));
    }

    #[test]
    fn test_parse_ignores_trailing_text() {
        let g = parse_geometry_line("  8x9 10x12+1+2 16-bit sRGB 42KB\r").unwrap();
        assert_eq!(g, geometry(8, 9, 10, 12, 1, 2));
    }

    #[test]
    fn test_parse_no_match() {
        for line in ["", "PNG 640x480", "640x480 640x480", "640x480 640x480+1", "axb cxd+1+2"] {
            let err = parse_geometry_line(line).unwrap_err();
            assert!(matches!(err, ParseError::NoMatch { .. }), "{line:?} -> {err:?}");
        }
    }

    #[test]
    fn test_parse_out_of_range() {
        let err = parse_geometry_line("99999999999x1 1x1+0+0").unwrap_err();
        assert_eq!(
            err,
            ParseError::OutOfRange {
                field: "original width",
                value: "99999999999".to_string()
            }
        );

        let err = parse_geometry_line("1x1 1x1+0-99999999999").unwrap_err();
        assert!(matches!(
            err,
            ParseError::OutOfRange {
                field: "vertical offset",
                ..
            }
        ));
    }

    // ------------------------------------------------------------------------
    // parse_trim_report
    // ------------------------------------------------------------------------

    #[test]
    fn test_report_uses_second_line() {
        let output = "a.png PNG 640x480 640x480+0+0 8-bit sRGB 2KB\n\
                      a.png=>tmp.png PNG 640x480=>500x400 640x480+70+40 8-bit sRGB\n";
        let g = parse_trim_report(output).unwrap();
        assert_eq!(g, geometry(500, 400, 640, 480, 70, 40));
    }

    #[test]
    fn test_report_skips_deprecation_banner() {
        let output = "WARNING: The convert command is deprecated in IMv7, use \"magick\"\n\
                      \n\
                      a.png PNG 640x480 640x480+0+0 8-bit sRGB 2KB\n\
                      a.png=>tmp.png PNG 640x480=>500x400 640x480+70+40 8-bit sRGB\n";
        let g = parse_trim_report(output).unwrap();
        assert_eq!(g.offset_x, 70);
    }

    #[test]
    fn test_report_missing_line() {
        let err = parse_trim_report("a.png PNG 640x480 640x480+0+0\n").unwrap_err();
        assert_eq!(err, ParseError::MissingLine { index: 1, found: 1 });
        assert!(err.to_string().contains("at least 2 lines"));
    }

    // ------------------------------------------------------------------------
    // UnifiedCrop
    // ------------------------------------------------------------------------

    #[test]
    fn test_unify_hand_computed_x() {
        let crop = UnifiedCrop::from_samples(&samples(&[
            geometry(100, 50, 640, 480, 0, 0),
            geometry(100, 50, 640, 480, 5, 0),
            geometry(100, 50, 640, 480, -3, 0),
        ]))
        .unwrap();
        assert_eq!(crop.x, -3);
        assert_eq!(crop.width, 108);
        assert_eq!(crop.y, 0);
        assert_eq!(crop.height, 50);
    }

    #[test]
    fn test_unify_uses_largest_size_and_both_spreads() {
        let crop = UnifiedCrop::from_samples(&samples(&[
            geometry(90, 40, 200, 100, 10, 20),
            geometry(95, 42, 200, 100, 12, 18),
            geometry(93, 45, 200, 100, 7, 25),
        ]))
        .unwrap();
        assert_eq!(
            crop,
            UnifiedCrop {
                width: 95 + (12 - 7),
                height: 45 + (25 - 18),
                x: 7,
                y: 18,
            }
        );
    }

    #[test]
    fn test_unify_single_image_is_its_own_crop() {
        let crop =
            UnifiedCrop::from_samples(&samples(&[geometry(30, 20, 64, 64, 4, 6)])).unwrap();
        assert_eq!(crop.to_string(), "30x20+4+6");
    }

    #[test]
    fn test_unify_rejects_width_mismatch() {
        let err = UnifiedCrop::from_samples(&samples(&[
            geometry(10, 10, 640, 480, 0, 0),
            geometry(10, 10, 640, 480, 0, 0),
            geometry(10, 10, 600, 480, 0, 0),
        ]))
        .unwrap_err();

        let BatchError::GeometryInvariant(mismatch) = err else {
            panic!("expected invariant error, got {err:?}");
        };
        assert_eq!(mismatch.dimension, Dimension::Width);
        assert_eq!(mismatch.reference, (PathBuf::from("/frames/image_0.png"), 640));
        assert_eq!(
            mismatch.offending,
            vec![(PathBuf::from("/frames/image_2.png"), 600)]
        );
    }

    #[test]
    fn test_unify_rejects_height_mismatch() {
        let err = UnifiedCrop::from_samples(&samples(&[
            geometry(10, 10, 640, 480, 0, 0),
            geometry(10, 10, 640, 470, 0, 0),
        ]))
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("trimmed height"));
        assert!(message.contains("image_0.png` reports 480"));
        assert!(message.contains("image_1.png` reports 470"));
    }

    #[test]
    fn test_unify_empty_batch() {
        assert!(matches!(
            UnifiedCrop::from_samples(&[]),
            Err(BatchError::EmptyBatch)
        ));
    }

    #[test]
    fn test_crop_display_has_explicit_signs() {
        let crop = UnifiedCrop {
            width: 108,
            height: 50,
            x: -3,
            y: 0,
        };
        assert_eq!(crop.to_string(), "108x50-3+0");
    }
}
