//! Rendered frames and the animation they form.
//!
//! An [`Animation`] is the sequencer's product: the ordered frame sequence
//! plus a playback rate, owned by the caller. Saving delegates to the
//! encoder; nothing is written until every frame has rendered.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ndarray::Array3;

use crate::encode::{self, EncodeOptions};
use crate::error::{ReelError, ReelResult};

/// One rendered corner plot, one animation timestep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    index: u64,
    iteration: usize,
    raster: Array3<u8>,
}

impl Frame {
    pub(crate) const fn new(index: u64, iteration: usize, raster: Array3<u8>) -> Self {
        Self {
            index,
            iteration,
            raster,
        }
    }

    /// Position of this frame in the animation.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Source tensor iteration this frame was rendered from.
    #[must_use]
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// The RGB24 raster as a (height x width x 3) array.
    #[must_use]
    pub const fn raster(&self) -> &Array3<u8> {
        &self.raster
    }

    /// Frame width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.raster.dim().1 as u32
    }

    /// Frame height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.raster.dim().0 as u32
    }

    pub(crate) fn to_rgb_image(&self) -> ReelResult<image::RgbImage> {
        let bytes = self
            .raster
            .as_slice()
            .ok_or_else(|| ReelError::render("frame raster is not contiguous"))?;
        image::RgbImage::from_raw(self.width(), self.height(), bytes.to_vec())
            .ok_or_else(|| ReelError::render("frame raster does not match its dimensions"))
    }

    pub(crate) fn to_rgba_image(&self) -> ReelResult<image::RgbaImage> {
        Ok(image::DynamicImage::ImageRgb8(self.to_rgb_image()?).into_rgba8())
    }
}

/// Provenance of an animation: how the frame sequence was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationMeta {
    /// Iterations in the source tensor.
    pub iterations: usize,
    /// Thinning factor applied (1 = every iteration became a frame).
    pub thin: usize,
    /// Effective timesteps represented per frame after thinning.
    pub samps_per_frame: usize,
    /// Default playback rate.
    pub fps: u32,
}

/// An ordered sequence of rendered frames plus a playback rate.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<Frame>,
    width: u32,
    height: u32,
    meta: AnimationMeta,
}

impl Animation {
    pub(crate) fn new(frames: Vec<Frame>, width: u32, height: u32, meta: AnimationMeta) -> Self {
        Self {
            frames,
            width,
            height,
            meta,
        }
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the animation has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at the given position.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// All frames in order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Default playback rate.
    #[must_use]
    pub const fn fps(&self) -> u32 {
        self.meta.fps
    }

    /// Provenance metadata.
    #[must_use]
    pub const fn meta(&self) -> &AnimationMeta {
        &self.meta
    }

    /// Playback duration in seconds at the given rate.
    #[must_use]
    pub fn duration_secs(&self, fps: u32) -> f64 {
        if fps == 0 {
            return 0.0;
        }
        self.frames.len() as f64 / f64::from(fps)
    }

    /// Save the animation to `path` at the given frame rate, inferring the
    /// container from the extension (`.mp4`, `.webm`, `.mkv`, `.gif`).
    ///
    /// Returns the path actually written; an encoder fallback may substitute
    /// its own container extension.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::EmptyAnimation`] for a frameless animation,
    /// [`ReelError::Config`] for an unrecognized extension or zero fps, and
    /// [`ReelError::Encode`] when every encoder plan fails.
    pub fn save<P: AsRef<Path>>(&self, path: P, fps: u32) -> ReelResult<PathBuf> {
        let path = path.as_ref();
        let options = EncodeOptions::for_path(path, fps)?;
        self.save_with(path, &options)
    }

    /// Save with explicit encoder options.
    ///
    /// # Errors
    ///
    /// Same as [`Animation::save`].
    pub fn save_with<P: AsRef<Path>>(&self, path: P, options: &EncodeOptions) -> ReelResult<PathBuf> {
        if self.frames.is_empty() {
            return Err(ReelError::EmptyAnimation);
        }
        encode::encode(&self.frames, self.width, self.height, options, path.as_ref())
    }

    /// Dump every frame as a PNG (`frame_00000.png`, ...) into `dir`,
    /// returning the number written.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::EmptyAnimation`] for a frameless animation or an
    /// I/O / codec error from the PNG writer.
    pub fn save_frames<P: AsRef<Path>>(&self, dir: P) -> ReelResult<usize> {
        if self.frames.is_empty() {
            return Err(ReelError::EmptyAnimation);
        }

        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        for frame in &self.frames {
            let name = format!("frame_{:05}.png", frame.index());
            frame.to_rgb_image()?.save(dir.join(name))?;
        }
        Ok(self.frames.len())
    }

    /// Encode to MP4 and return an inline HTML `<video>` tag with the
    /// base64-encoded payload, for embedding in notebooks and reports.
    ///
    /// # Errors
    ///
    /// Same as [`Animation::save`]; requires a working ffmpeg with H.264.
    pub fn to_html(&self) -> ReelResult<String> {
        let tmp = tempfile::Builder::new()
            .prefix("cornerreel-")
            .suffix(".mp4")
            .tempfile()?
            .into_temp_path();

        let options = EncodeOptions::for_path(&tmp, self.meta.fps)?;
        let written = self.save_with(&tmp, &options)?;
        let bytes = std::fs::read(&written)?;
        if written.as_path() != &*tmp {
            std::fs::remove_file(&written).ok();
        }
        tmp.close().ok();

        Ok(format!(
            "<video controls>\n  <source src=\"data:video/mp4;base64,{}\" type=\"video/mp4\">\n  Your browser does not support the video tag.\n</video>",
            STANDARD.encode(bytes)
        ))
    }
}
