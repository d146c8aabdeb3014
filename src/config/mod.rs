//! Plot configuration with YAML schema and validation.
//!
//! Every option the renderer understands is an enumerated, typed field here;
//! there is no open-ended pass-through dictionary. Unknown YAML keys are
//! rejected at parse time, out-of-range values at validation time.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{ReelError, ReelResult};
use crate::tensor::FramePolicy;

/// An RGB color triple for plot elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Black, the default sample color.
    pub const BLACK: Self = Self(0, 0, 0);
    /// Steel blue, the default truth-marker color.
    pub const STEEL_BLUE: Self = Self(0x46, 0x82, 0xb4);
}

/// Corner-plot and animation configuration.
///
/// Loadable from YAML with full schema validation, or built programmatically:
///
/// ```rust
/// use cornerreel::prelude::*;
///
/// let config = CornerConfig::builder()
///     .fps(24)
///     .labels(["mass", "radius"])
///     .build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CornerConfig {
    /// Frame width in pixels. Odd values are rounded down to even for
    /// YUV420 encoder compatibility.
    #[validate(range(min = 64, max = 4096))]
    #[serde(default = "default_width")]
    pub width: u32,

    /// Frame height in pixels.
    #[validate(range(min = 64, max = 4096))]
    #[serde(default = "default_height")]
    pub height: u32,

    /// Color for histogram outlines and scatter points.
    #[serde(default = "default_color")]
    pub color: Rgb,

    /// Color for truth markers.
    #[serde(default = "default_truth_color")]
    pub truth_color: Rgb,

    /// Scatter marker radius in pixels.
    #[validate(range(min = 1, max = 32))]
    #[serde(default = "default_marker_size")]
    pub marker_size: u32,

    /// Per-dimension labels, stamped as diagonal panel titles.
    /// Length must equal the tensor's dimension count.
    #[serde(default)]
    pub labels: Option<Vec<String>>,

    /// Per-dimension true parameter values, drawn as reference lines.
    /// Length must equal the tensor's dimension count.
    #[serde(default)]
    pub truths: Option<Vec<f64>>,

    /// Number of bins spanned by the final iteration's posterior; the shared
    /// bin grid for all frames is derived from this.
    #[validate(range(min = 2, max = 512))]
    #[serde(default = "default_final_bins")]
    pub final_bins: usize,

    /// Rough number of timesteps represented by one frame before thinning.
    #[validate(range(min = 1))]
    #[serde(default = "default_samps_per_frame")]
    pub samps_per_frame: usize,

    /// Playback frame rate; also drives iteration thinning together with
    /// `target_secs`.
    #[validate(range(min = 1, max = 240))]
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Rough requested animation duration in seconds, used to thin long runs.
    #[validate(range(min = 0.1))]
    #[serde(default = "default_target_secs")]
    pub target_secs: f64,

    /// Which sample slice each frame shows: the ensemble's trailing window
    /// or everything accumulated so far.
    #[serde(default)]
    pub policy: FramePolicy,
}

const fn default_width() -> u32 {
    720
}

const fn default_height() -> u32 {
    720
}

const fn default_color() -> Rgb {
    Rgb::BLACK
}

const fn default_truth_color() -> Rgb {
    Rgb::STEEL_BLUE
}

const fn default_marker_size() -> u32 {
    2
}

const fn default_final_bins() -> usize {
    50
}

const fn default_samps_per_frame() -> usize {
    10
}

const fn default_fps() -> u32 {
    30
}

const fn default_target_secs() -> f64 {
    10.0
}

impl CornerConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, YAML parsing fails, or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> ReelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> ReelResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> CornerConfigBuilder {
        CornerConfigBuilder::default()
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns error if any field is out of range or semantically invalid.
    pub fn validate_all(&self) -> ReelResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Validate semantic constraints beyond per-field ranges.
    fn validate_semantic(&self) -> ReelResult<()> {
        if !self.target_secs.is_finite() {
            return Err(ReelError::config("target_secs must be finite"));
        }

        if let Some(truths) = &self.truths {
            if let Some(bad) = truths.iter().find(|t| !t.is_finite()) {
                return Err(ReelError::config(format!(
                    "truth values must be finite, got {bad}"
                )));
            }
        }

        // Both optional per-dimension lists must agree with each other here;
        // agreement with the tensor is checked when sequencing starts.
        if let (Some(labels), Some(truths)) = (&self.labels, &self.truths) {
            if labels.len() != truths.len() {
                return Err(ReelError::config(format!(
                    "labels ({}) and truths ({}) disagree on dimension count",
                    labels.len(),
                    truths.len()
                )));
            }
        }

        Ok(())
    }
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            color: default_color(),
            truth_color: default_truth_color(),
            marker_size: default_marker_size(),
            labels: None,
            truths: None,
            final_bins: default_final_bins(),
            samps_per_frame: default_samps_per_frame(),
            fps: default_fps(),
            target_secs: default_target_secs(),
            policy: FramePolicy::default(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct CornerConfigBuilder {
    width: Option<u32>,
    height: Option<u32>,
    color: Option<Rgb>,
    truth_color: Option<Rgb>,
    marker_size: Option<u32>,
    labels: Option<Vec<String>>,
    truths: Option<Vec<f64>>,
    final_bins: Option<usize>,
    samps_per_frame: Option<usize>,
    fps: Option<u32>,
    target_secs: Option<f64>,
    policy: Option<FramePolicy>,
}

impl CornerConfigBuilder {
    /// Set the frame size in pixels.
    #[must_use]
    pub const fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the sample color.
    #[must_use]
    pub const fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the truth-marker color.
    #[must_use]
    pub const fn truth_color(mut self, color: Rgb) -> Self {
        self.truth_color = Some(color);
        self
    }

    /// Set the scatter marker radius in pixels.
    #[must_use]
    pub const fn marker_size(mut self, pixels: u32) -> Self {
        self.marker_size = Some(pixels);
        self
    }

    /// Set per-dimension axis labels.
    #[must_use]
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Set per-dimension true parameter values.
    #[must_use]
    pub fn truths<I>(mut self, truths: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        self.truths = Some(truths.into_iter().collect());
        self
    }

    /// Set the final-posterior bin count.
    #[must_use]
    pub const fn final_bins(mut self, bins: usize) -> Self {
        self.final_bins = Some(bins);
        self
    }

    /// Set the rough timesteps-per-frame factor.
    #[must_use]
    pub const fn samps_per_frame(mut self, samps: usize) -> Self {
        self.samps_per_frame = Some(samps);
        self
    }

    /// Set the playback frame rate.
    #[must_use]
    pub const fn fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Set the rough animation duration in seconds.
    #[must_use]
    pub const fn target_secs(mut self, secs: f64) -> Self {
        self.target_secs = Some(secs);
        self
    }

    /// Set the frame slicing policy.
    #[must_use]
    pub const fn policy(mut self, policy: FramePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> CornerConfig {
        let defaults = CornerConfig::default();
        CornerConfig {
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            color: self.color.unwrap_or(defaults.color),
            truth_color: self.truth_color.unwrap_or(defaults.truth_color),
            marker_size: self.marker_size.unwrap_or(defaults.marker_size),
            labels: self.labels,
            truths: self.truths,
            final_bins: self.final_bins.unwrap_or(defaults.final_bins),
            samps_per_frame: self.samps_per_frame.unwrap_or(defaults.samps_per_frame),
            fps: self.fps.unwrap_or(defaults.fps),
            target_secs: self.target_secs.unwrap_or(defaults.target_secs),
            policy: self.policy.unwrap_or_default(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// In-range field combinations always validate.
        #[test]
        fn prop_in_range_configs_validate(
            width in 64u32..=4096,
            height in 64u32..=4096,
            fps in 1u32..=240,
            final_bins in 2usize..=512,
            marker in 1u32..=32,
        ) {
            let config = CornerConfig::builder()
                .size(width, height)
                .fps(fps)
                .final_bins(final_bins)
                .marker_size(marker)
                .build();
            prop_assert!(config.validate_all().is_ok());
        }

        /// Serialization roundtrips preserve every field.
        #[test]
        fn prop_yaml_roundtrip(fps in 1u32..=240, bins in 2usize..=512) {
            let config = CornerConfig::builder().fps(fps).final_bins(bins).build();
            let yaml = serde_yaml::to_string(&config).map_err(|e| {
                TestCaseError::fail(e.to_string())
            })?;
            let parsed = CornerConfig::from_yaml(&yaml).map_err(|e| {
                TestCaseError::fail(e.to_string())
            })?;
            prop_assert_eq!(parsed.fps, config.fps);
            prop_assert_eq!(parsed.final_bins, config.final_bins);
        }
    }
}
