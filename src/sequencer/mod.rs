//! The frame sequencer: ordered slice -> render -> collect.
//!
//! Frames are generated strictly in iteration order on a single thread; the
//! renderer's shared surface carries per-animation state (axis extents, bin
//! grid) fixed before the first frame. A render failure aborts the sequence
//! with no partial output.

use crate::animation::{Animation, AnimationMeta, Frame};
use crate::config::CornerConfig;
use crate::error::ReelResult;
use crate::render::CornerRenderer;
use crate::tensor::SampleTensor;

/// How a tensor's iterations map onto animation frames.
///
/// Long runs are thinned so the animation lands near the configured target
/// duration: `thin = floor(floor(T / target_secs) / fps)`, keeping every
/// `thin`-th iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencePlan {
    /// Source iterations.
    pub iterations: usize,
    /// Subsampling factor (1 = every iteration).
    pub thin: usize,
    /// Number of frames the animation will contain.
    pub retained: usize,
    /// Effective timesteps represented per frame, scaled by `thin`.
    pub samps_per_frame: usize,
}

impl SequencePlan {
    /// Compute the plan for a tensor of `iterations` timesteps.
    #[must_use]
    pub fn for_iterations(iterations: usize, config: &CornerConfig) -> Self {
        let per_target = (iterations as f64 / config.target_secs).floor() as usize;
        let thin = (per_target / config.fps as usize).max(1);
        let retained = iterations.div_ceil(thin);
        Self {
            iterations,
            thin,
            retained,
            samps_per_frame: config.samps_per_frame * thin,
        }
    }
}

/// Sequences a sample tensor into an ordered frame sequence.
pub struct FrameSequencer<'a> {
    tensor: &'a SampleTensor,
    config: CornerConfig,
    renderer: CornerRenderer,
    plan: SequencePlan,
}

impl<'a> FrameSequencer<'a> {
    /// Validate inputs and fix the per-animation rendering state.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-range configuration, or a
    /// configuration error when `labels`/`truths` disagree with the tensor's
    /// dimension count. The tensor itself was validated at construction.
    pub fn new(tensor: &'a SampleTensor, config: &CornerConfig) -> ReelResult<Self> {
        config.validate_all()?;
        let renderer = CornerRenderer::new(tensor, config)?;
        let plan = SequencePlan::for_iterations(tensor.iterations(), config);

        tracing::debug!(
            iterations = plan.iterations,
            thin = plan.thin,
            frames = plan.retained,
            width = renderer.width(),
            height = renderer.height(),
            "planned animation"
        );

        Ok(Self {
            tensor,
            config: config.clone(),
            renderer,
            plan,
        })
    }

    /// The computed sequencing plan.
    #[must_use]
    pub const fn plan(&self) -> &SequencePlan {
        &self.plan
    }

    /// Render every retained iteration, in order, into an [`Animation`].
    ///
    /// # Errors
    ///
    /// Propagates the first renderer failure unmodified; no frames are
    /// retained past a failure.
    pub fn run(mut self) -> ReelResult<Animation> {
        let mut frames = Vec::with_capacity(self.plan.retained);

        for (index, iteration) in (0..self.plan.iterations)
            .step_by(self.plan.thin)
            .enumerate()
        {
            let slice = self.tensor.visible(iteration, self.config.policy);
            let raster = self.renderer.render(slice)?;
            frames.push(Frame::new(index as u64, iteration, raster));
        }

        tracing::info!(
            frames = frames.len(),
            fps = self.config.fps,
            "sequenced animation"
        );

        let meta = AnimationMeta {
            iterations: self.plan.iterations,
            thin: self.plan.thin,
            samps_per_frame: self.plan.samps_per_frame,
            fps: self.config.fps,
        };
        Ok(Animation::new(
            frames,
            self.renderer.width(),
            self.renderer.height(),
            meta,
        ))
    }
}

/// Animate a corner plot of an evolving sample ensemble.
///
/// For each retained iteration this renders the corner plot of the sample
/// slice visible under the configured policy, and returns the ordered frames
/// as an [`Animation`] ready to [`save`](Animation::save).
///
/// ```no_run
/// use cornerreel::prelude::*;
///
/// # fn main() -> ReelResult<()> {
/// let samples = SampleTensor::from_vec(100, 32, 2, vec![0.5; 100 * 32 * 2])?;
/// let config = CornerConfig::builder().labels(["x", "y"]).build();
/// let animation = corner(&samples, &config)?;
/// animation.save("chain.mp4", 30)?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an invalid-input error for bad configuration, and propagates any
/// renderer failure.
pub fn corner(samples: &SampleTensor, config: &CornerConfig) -> ReelResult<Animation> {
    FrameSequencer::new(samples, config)?.run()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ReelError;
    use crate::tensor::FramePolicy;

    fn spiral_tensor(iterations: usize, walkers: usize, dims: usize) -> SampleTensor {
        let len = iterations * walkers * dims;
        let data: Vec<f64> = (0..len).map(|i| (i as f64 * 0.37).cos() * 2.0).collect();
        SampleTensor::from_vec(iterations, walkers, dims, data).unwrap()
    }

    #[test]
    fn test_plan_short_run_keeps_everything() {
        let config = CornerConfig::default(); // 10 s target at 30 fps
        let plan = SequencePlan::for_iterations(50, &config);
        assert_eq!(plan.thin, 1);
        assert_eq!(plan.retained, 50);
        assert_eq!(plan.samps_per_frame, config.samps_per_frame);
    }

    #[test]
    fn test_plan_long_run_thins() {
        let config = CornerConfig::default();
        // 3000 iterations / 10 s = 300 per second; / 30 fps = thin 10
        let plan = SequencePlan::for_iterations(3000, &config);
        assert_eq!(plan.thin, 10);
        assert_eq!(plan.retained, 300);
        assert_eq!(plan.samps_per_frame, config.samps_per_frame * 10);
    }

    #[test]
    fn test_plan_uneven_division_rounds_up() {
        let config = CornerConfig::builder().fps(30).target_secs(10.0).build();
        let plan = SequencePlan::for_iterations(3001, &config);
        assert_eq!(plan.thin, 10);
        assert_eq!(plan.retained, 301);
    }

    #[test]
    fn test_corner_frame_count_and_order() {
        let tensor = spiral_tensor(6, 8, 2);
        let config = CornerConfig::builder().size(120, 120).build();

        let animation = corner(&tensor, &config).unwrap();
        assert_eq!(animation.len(), 6);
        for (i, frame) in animation.frames().iter().enumerate() {
            assert_eq!(frame.index(), i as u64);
            assert_eq!(frame.iteration(), i);
        }
    }

    #[test]
    fn test_corner_thinned_iterations() {
        let tensor = spiral_tensor(100, 4, 1);
        // 100 iterations / 2 s = 50 per second; / 10 fps = thin 5 -> 20 frames
        let config = CornerConfig::builder()
            .size(100, 100)
            .fps(10)
            .target_secs(2.0)
            .build();

        let animation = corner(&tensor, &config).unwrap();
        assert_eq!(animation.len(), 20);
        assert_eq!(animation.meta().thin, 5);
        assert_eq!(animation.frame(1).map(Frame::iteration), Some(5));
    }

    #[test]
    fn test_corner_rejects_invalid_config() {
        let tensor = spiral_tensor(4, 4, 2);
        let mut config = CornerConfig::builder().size(100, 100).build();
        config.fps = 0;
        let result = corner(&tensor, &config);
        assert!(matches!(result, Err(ReelError::Validation(_))));
    }

    #[test]
    fn test_cumulative_policy_flows_through() {
        let tensor = spiral_tensor(5, 6, 2);
        let config = CornerConfig::builder()
            .size(120, 120)
            .policy(FramePolicy::Cumulative)
            .build();

        let animation = corner(&tensor, &config).unwrap();
        assert_eq!(animation.len(), 5);
    }

    #[test]
    fn test_animation_carries_sanitized_size() {
        let tensor = spiral_tensor(3, 4, 2);
        let config = CornerConfig::builder().size(121, 81).build();
        let animation = corner(&tensor, &config).unwrap();
        assert_eq!(animation.width(), 120);
        assert_eq!(animation.height(), 80);
        let frame = animation.frame(0).unwrap();
        assert_eq!(frame.width(), 120);
        assert_eq!(frame.height(), 80);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The plan always retains at least one frame and covers the tensor.
        #[test]
        fn prop_plan_covers_tensor(
            iterations in 1usize..20_000,
            fps in 1u32..120,
            target in 1.0f64..60.0,
        ) {
            let config = CornerConfig::builder().fps(fps).target_secs(target).build();
            let plan = SequencePlan::for_iterations(iterations, &config);
            prop_assert!(plan.thin >= 1);
            prop_assert!(plan.retained >= 1);
            prop_assert_eq!(plan.retained, iterations.div_ceil(plan.thin));
            // Every retained frame maps to a real iteration
            prop_assert!((plan.retained - 1) * plan.thin < iterations);
        }
    }
}
