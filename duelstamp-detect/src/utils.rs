use opencv::core::{Mat, Rect};
use opencv::imgproc;
use opencv::prelude::*;

/// A rectangle in baseline-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Region {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// Owned copy of the sub-image under `region`.
pub fn crop(frame: &Mat, region: Region) -> opencv::Result<Mat> {
    Mat::roi(frame, region.rect())?.try_clone()
}

/// Single-channel view of `src`; already-gray inputs pass through.
pub fn gray(src: &Mat) -> opencv::Result<Mat> {
    if src.channels() == 1 {
        return src.try_clone();
    }
    let mut out = Mat::default();
    imgproc::cvt_color_def(src, &mut out, imgproc::COLOR_BGR2GRAY)?;
    Ok(out)
}

pub fn hsv(src: &Mat) -> opencv::Result<Mat> {
    let mut out = Mat::default();
    imgproc::cvt_color_def(src, &mut out, imgproc::COLOR_BGR2HSV)?;
    Ok(out)
}
