//! Detection geometry and thresholds.
//!
//! Everything the classifiers need is carried explicitly in this one
//! structure; nothing reads ambient state. The defaults are tuned against
//! 1280x720 footage of one game's HUD and travel with the baseline the
//! frame store resizes to.

use crate::color::{HsvBand, MarkBands};
use crate::flags::{FlagLayout, FLAG_POSITIONS};
use crate::utils::Region;

#[derive(Debug, Clone)]
pub struct DetectConfig {
    /// Resolution all regions below are expressed against.
    pub baseline: (i32, i32),
    pub flags: FlagLayout,
    pub bands: MarkBands,
    pub name_left: Region,
    pub name_right: Region,
    pub name_threshold: f32,
    pub select_region: Region,
    pub select_threshold: f32,
    pub blackout_max_brightness: f64,
}

impl Default for DetectConfig {
    fn default() -> Self {
        // Mark boxes run outward from each side's innermost slot along the
        // top score rail.
        let mut left = [Region::new(0, 0, 0, 0); FLAG_POSITIONS];
        let mut right = [Region::new(0, 0, 0, 0); FLAG_POSITIONS];
        for i in 0..FLAG_POSITIONS {
            left[i] = Region::new(84 + 30 * i as i32, 54, 14, 14);
            right[i] = Region::new(1182 - 30 * i as i32, 54, 14, 14);
        }

        Self {
            baseline: (1280, 720),
            flags: FlagLayout { left, right },
            bands: MarkBands {
                white: vec![HsvBand::new((0, 180), (0, 60), (170, 255))],
                // Red wraps around the hue origin, hence one band at each
                // end of the scale.
                red: vec![
                    HsvBand::new((0, 10), (90, 255), (80, 255)),
                    HsvBand::new((170, 180), (90, 255), (80, 255)),
                ],
                min_ratio: 0.65,
            },
            name_left: Region::new(120, 600, 280, 48),
            name_right: Region::new(880, 600, 280, 48),
            name_threshold: 0.6,
            select_region: Region::new(440, 16, 400, 96),
            select_threshold: 0.7,
            blackout_max_brightness: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_regions_stay_inside_the_baseline() {
        let cfg = DetectConfig::default();
        let (w, h) = cfg.baseline;
        let mut regions = vec![
            cfg.name_left,
            cfg.name_right,
            cfg.select_region,
        ];
        regions.extend(cfg.flags.left);
        regions.extend(cfg.flags.right);
        for r in regions {
            assert!(r.x >= 0 && r.y >= 0, "{r:?}");
            assert!(r.x + r.w <= w && r.y + r.h <= h, "{r:?}");
        }
    }
}
