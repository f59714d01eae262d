//! Template matching against fixed frame regions.

use opencv::core::{self, Mat};
use opencv::imgproc;
use opencv::prelude::*;

use crate::utils::{self, Region};

/// Whether both images are reduced to single-channel intensity before
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Intensity,
    Color,
}

/// Normalized cross-correlation of `template` against the sub-image at
/// `region`, in `[-1, 1]`. A template that does not fit inside the region
/// scores -1.
pub fn confidence(
    frame: &Mat,
    region: Region,
    template: &Mat,
    mode: ColorMode,
) -> opencv::Result<f32> {
    let roi = utils::crop(frame, region)?;
    let (roi, template) = match mode {
        ColorMode::Intensity => (utils::gray(&roi)?, utils::gray(template)?),
        ColorMode::Color => (roi, template.try_clone()?),
    };
    if template.cols() > roi.cols() || template.rows() > roi.rows() {
        return Ok(-1.0);
    }
    // A constant region carries no signal and makes the normalized
    // correlation undefined.
    let (mut lo, mut hi) = (0f64, 0f64);
    core::min_max_loc(
        &utils::gray(&roi)?,
        Some(&mut lo),
        Some(&mut hi),
        None,
        None,
        &core::no_array(),
    )?;
    if lo == hi {
        return Ok(0.0);
    }

    let mut scores = Mat::default();
    imgproc::match_template_def(&roi, &template, &mut scores, imgproc::TM_CCOEFF_NORMED)?;
    let mut best = 0f64;
    core::min_max_loc(
        &scores,
        None,
        Some(&mut best),
        None,
        None,
        &core::no_array(),
    )?;
    // Zero-variance inputs make the correlation undefined.
    if !best.is_finite() {
        return Ok(0.0);
    }
    Ok(best.clamp(-1.0, 1.0) as f32)
}

pub fn matches(
    frame: &Mat,
    region: Region,
    template: &Mat,
    mode: ColorMode,
    threshold: f32,
) -> opencv::Result<bool> {
    Ok(confidence(frame, region, template, mode)? > threshold)
}
