//! Per-frame classifiers.
//!
//! ## Conventions
//! - Frames arrive as BGR 3-channel U8 mats already normalized to the
//!   1280x720 baseline, so every region here is a plain pixel rectangle
//!   at that resolution.
//! - Classifiers are stateless over a single frame. Anything that spans
//!   frames lives in the engine, not here.
//! - Hue uses OpenCV's half-degree scale (0..180); red therefore needs
//!   two bands, one at each end of the range.

pub mod color;
pub mod config;
pub mod flags;
pub mod matchers;
pub mod names;
pub mod screen;
pub mod utils;

pub use color::{classify_mark, FlagColor, HsvBand, MarkBands};
pub use config::DetectConfig;
pub use flags::{FlagBoard, FlagLayout, FlagReader, MatchPulse, Side};
pub use matchers::ColorMode;
pub use names::{NameGallery, NameIdentifier, NameRead};
pub use screen::{ScreenClassifier, ScreenState};
pub use utils::Region;
