//! HSV-band color classification of the round-point marks, and frame
//! brightness for blackout detection.

use opencv::core::{self, Mat, Scalar};
use opencv::prelude::*;

use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FlagColor {
    White,
    Red,
    NotAFlag,
}

/// Inclusive hue/saturation/value ranges on OpenCV's 8-bit HSV scale
/// (H in 0..180, S and V in 0..255).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HsvBand {
    pub h: (u8, u8),
    pub s: (u8, u8),
    pub v: (u8, u8),
}

impl HsvBand {
    pub const fn new(h: (u8, u8), s: (u8, u8), v: (u8, u8)) -> Self {
        Self { h, s, v }
    }
}

/// The band sets a mark is judged against. Bands within one set must be
/// disjoint; red carries two to cover the hue wraparound.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarkBands {
    pub white: Vec<HsvBand>,
    pub red: Vec<HsvBand>,
    /// Fraction of pixels a band set must cover to claim the mark.
    pub min_ratio: f64,
}

/// Fraction of `sub`'s pixels falling inside the union of `bands`.
pub fn color_ratio(sub: &Mat, bands: &[HsvBand]) -> opencv::Result<f64> {
    let total = (sub.rows() * sub.cols()) as f64;
    if total == 0.0 {
        return Ok(0.0);
    }
    let hsv = utils::hsv(sub)?;
    let mut hits = 0;
    for band in bands {
        let lo = Scalar::new(band.h.0 as f64, band.s.0 as f64, band.v.0 as f64, 0.0);
        let hi = Scalar::new(band.h.1 as f64, band.s.1 as f64, band.v.1 as f64, 255.0);
        let mut mask = Mat::default();
        core::in_range(&hsv, &lo, &hi, &mut mask)?;
        hits += core::count_non_zero(&mask)?;
    }
    Ok(hits as f64 / total)
}

/// Classifies one mark box. Red takes precedence when both ratios clear
/// the bar, which is the tie-break the score reader relies on.
pub fn classify_mark(sub: &Mat, bands: &MarkBands) -> opencv::Result<FlagColor> {
    if color_ratio(sub, &bands.red)? > bands.min_ratio {
        return Ok(FlagColor::Red);
    }
    if color_ratio(sub, &bands.white)? > bands.min_ratio {
        return Ok(FlagColor::White);
    }
    Ok(FlagColor::NotAFlag)
}

/// Mean single-channel intensity of `sub` on the 0..255 scale.
pub fn brightness(sub: &Mat) -> opencv::Result<f64> {
    let g = utils::gray(sub)?;
    Ok(core::mean(&g, &core::no_array())?[0])
}

#[cfg(test)]
mod tests {
    use opencv::core::CV_8UC3;

    use super::*;
    use crate::config::DetectConfig;

    fn solid(b: f64, g: f64, r: f64) -> Mat {
        Mat::new_rows_cols_with_default(16, 16, CV_8UC3, Scalar::new(b, g, r, 0.0)).unwrap()
    }

    fn bands() -> MarkBands {
        DetectConfig::default().bands
    }

    #[test]
    fn pure_white_is_white() {
        let mark = solid(255.0, 255.0, 255.0);
        assert_eq!(classify_mark(&mark, &bands()).unwrap(), FlagColor::White);
    }

    #[test]
    fn pure_red_is_red() {
        let mark = solid(0.0, 0.0, 255.0);
        assert_eq!(classify_mark(&mark, &bands()).unwrap(), FlagColor::Red);
    }

    #[test]
    fn wraparound_hue_is_still_red() {
        // BGR (17, 0, 255) lands at H ~= 178 with full saturation/value.
        let mark = solid(17.0, 0.0, 255.0);
        assert_eq!(classify_mark(&mark, &bands()).unwrap(), FlagColor::Red);
    }

    #[test]
    fn unrelated_color_is_not_a_flag() {
        let mark = solid(255.0, 0.0, 0.0);
        assert_eq!(classify_mark(&mark, &bands()).unwrap(), FlagColor::NotAFlag);
    }

    #[test]
    fn black_frame_brightness_is_near_zero() {
        let dark = solid(0.0, 0.0, 0.0);
        assert!(brightness(&dark).unwrap() < 0.1);
        let lit = solid(128.0, 128.0, 128.0);
        assert!(brightness(&lit).unwrap() > 100.0);
    }
}
