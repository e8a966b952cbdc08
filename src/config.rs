//! Pipeline parameter tables.
//!
//! Defaults are the calibrated values for the expected camera distance and
//! pip size. The structs deserialize from `config.json` so a deployment can
//! retune without recompiling, but the library itself never reads files.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    /// Gaussian kernel side length, must be odd.
    pub blur_kernel: i32,
    pub blur_sigma: f64,
    /// Canny hysteresis thresholds, OpenCV gradient-magnitude convention.
    pub canny_low: f64,
    pub canny_high: f64,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        PreprocessParams {
            blur_kernel: 3,
            blur_sigma: 1.0,
            canny_low: 300.0,
            canny_high: 500.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    /// Inverse accumulator resolution; 1.0 matches the image resolution.
    pub dp: f64,
    /// Minimum distance between circle centers, in pixels. Suppresses
    /// duplicate detections of the same pip.
    pub min_dist: f64,
    /// Gradient threshold for the transform's internal edge pass.
    pub param1: f64,
    /// Accumulator vote threshold. Lower finds more (possibly false)
    /// circles, higher finds fewer, more confident ones.
    pub param2: f64,
    pub min_radius: i32,
    pub max_radius: i32,
}

impl Default for HoughParams {
    fn default() -> Self {
        HoughParams {
            dp: 1.0,
            min_dist: 20.0,
            param1: 30.0,
            param2: 18.0,
            min_radius: 10,
            max_radius: 20,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capture device index for the demo binary.
    pub camera_index: i32,
    pub preprocess: PreprocessParams,
    pub hough: HoughParams,
}
