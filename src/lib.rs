//! # cornerreel
//!
//! Animated corner plots of evolving sample ensembles.
//!
//! Given a T x N x D cube of sampled parameter values (iteration x walker x
//! dimension), `cornerreel` renders one corner plot per retained iteration
//! and assembles the frames into a video, for visual inspection of sampler
//! convergence.
//!
//! ## Example
//!
//! ```no_run
//! use cornerreel::prelude::*;
//!
//! # fn main() -> ReelResult<()> {
//! // 200 iterations of 32 walkers exploring a 3-dimensional posterior
//! let samples = SampleTensor::from_vec(200, 32, 3, vec![0.1; 200 * 32 * 3])?;
//!
//! let config = CornerConfig::builder()
//!     .labels(["alpha", "beta", "gamma"])
//!     .truths([0.0, 1.0, -0.5])
//!     .fps(30)
//!     .build();
//!
//! let animation = corner(&samples, &config)?;
//! animation.save("chain.mp4", 30)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_const_for_fn, // Many functions can't be const in stable Rust
)]

pub mod animation;
pub mod config;
pub mod encode;
pub mod error;
pub mod render;
pub mod sequencer;
pub mod tensor;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::animation::{Animation, AnimationMeta, Frame};
    pub use crate::config::{CornerConfig, CornerConfigBuilder, Rgb};
    pub use crate::encode::{EncodeOptions, VideoFormat};
    pub use crate::error::{ReelError, ReelResult};
    pub use crate::sequencer::{corner, FrameSequencer, SequencePlan};
    pub use crate::tensor::{FramePolicy, SampleTensor};
}

/// Re-export for public API
pub use error::{ReelError, ReelResult};
pub use sequencer::corner;
