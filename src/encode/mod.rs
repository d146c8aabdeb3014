//! Video assembly: delegated encoding of rendered frames.
//!
//! MP4/WebM/MKV go through the `ffmpeg` binary: frames are staged as raw
//! RGB24 in a temporary file and ffmpeg is tried against an ordered list of
//! encoder plans, falling back to lossless FFV1 when the preferred codec is
//! unavailable. GIF is encoded in-process. No custom codec lives here.

use std::env;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use image::codecs::gif::{GifEncoder, Repeat};
use image::Delay;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::animation::Frame;
use crate::error::{ReelError, ReelResult};

/// Environment variable overriding the ffmpeg binary to invoke.
pub const FFMPEG_ENV: &str = "CORNERREEL_FFMPEG";

/// Output container/codec family, inferred from the target path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    /// MP4 container, H.264 (libx264).
    Mp4,
    /// WebM container, VP9 (libvpx-vp9).
    WebM,
    /// Matroska container, FFV1 lossless.
    Mkv,
    /// GIF, encoded in-process.
    Gif,
}

impl VideoFormat {
    /// Infer the format from a path extension.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Config`] for missing or unrecognized extensions.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("mp4") => Ok(Self::Mp4),
            Some("webm") => Ok(Self::WebM),
            Some("mkv") => Ok(Self::Mkv),
            Some("gif") => Ok(Self::Gif),
            other => Err(ReelError::config(format!(
                "unrecognized output extension {:?} (expected mp4, webm, mkv, or gif)",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Canonical file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::WebM => "webm",
            Self::Mkv => "mkv",
            Self::Gif => "gif",
        }
    }
}

/// Delegated-encoder options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Output format.
    pub format: VideoFormat,
    /// Playback frame rate.
    pub fps: u32,
    /// Constant rate factor for lossy codecs (clamped to 0..=51; default 18).
    pub crf: Option<u32>,
    /// Extra arguments passed verbatim to ffmpeg, after the plan's own.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl EncodeOptions {
    /// Options for the given target path and frame rate.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Config`] if the extension is unrecognized or
    /// `fps` is zero.
    pub fn for_path(path: &Path, fps: u32) -> ReelResult<Self> {
        if fps == 0 {
            return Err(ReelError::config("fps must be at least 1"));
        }
        Ok(Self {
            format: VideoFormat::from_path(path)?,
            fps,
            crf: None,
            extra_args: Vec::new(),
        })
    }

    /// Set the constant rate factor.
    #[must_use]
    pub const fn with_crf(mut self, crf: u32) -> Self {
        self.crf = Some(crf);
        self
    }

    /// Append extra ffmpeg arguments.
    #[must_use]
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Encode frames to `path`, returning the path actually written (a fallback
/// plan may substitute its own container extension).
pub(crate) fn encode(
    frames: &[Frame],
    width: u32,
    height: u32,
    options: &EncodeOptions,
    path: &Path,
) -> ReelResult<PathBuf> {
    match options.format {
        VideoFormat::Gif => write_gif(frames, options.fps, path),
        _ => encode_with_ffmpeg(frames, width, height, options, path),
    }
}

struct EncoderPlan {
    description: &'static str,
    args: Vec<String>,
    extension: Option<&'static str>,
    requires_faststart: bool,
}

fn encoder_plans(options: &EncodeOptions) -> Vec<EncoderPlan> {
    let crf = options.crf.unwrap_or(18).clamp(0, 51).to_string();
    let mut plans = Vec::new();

    match options.format {
        VideoFormat::Mp4 => plans.push(EncoderPlan {
            description: "H.264 (libx264)",
            args: vec![
                "-c:v".into(),
                "libx264".into(),
                "-preset".into(),
                "slow".into(),
                "-crf".into(),
                crf,
                "-pix_fmt".into(),
                "yuv420p".into(),
            ],
            extension: None,
            requires_faststart: true,
        }),
        VideoFormat::WebM => plans.push(EncoderPlan {
            description: "VP9 (libvpx-vp9)",
            args: vec![
                "-c:v".into(),
                "libvpx-vp9".into(),
                "-crf".into(),
                crf,
                "-b:v".into(),
                "0".into(),
                "-pix_fmt".into(),
                "yuv420p".into(),
            ],
            extension: None,
            requires_faststart: false,
        }),
        VideoFormat::Mkv | VideoFormat::Gif => {}
    }

    // Lossless fallback when the preferred codec is missing from the local
    // ffmpeg build; for MKV targets it is the primary plan.
    plans.push(EncoderPlan {
        description: "FFV1 lossless",
        args: vec![
            "-c:v".into(),
            "ffv1".into(),
            "-level".into(),
            "3".into(),
            "-pix_fmt".into(),
            "rgb24".into(),
        ],
        extension: Some("mkv"),
        requires_faststart: false,
    });

    plans
}

fn ffmpeg_binary() -> String {
    env::var(FFMPEG_ENV).unwrap_or_else(|_| "ffmpeg".into())
}

/// Full argument vector for one encoder plan invocation.
#[allow(clippy::too_many_arguments)]
fn ffmpeg_args(
    plan: &EncoderPlan,
    raw_path: &str,
    width: u32,
    height: u32,
    fps: u32,
    frame_count: usize,
    extra_args: &[String],
    output: &Path,
) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgb24".into(),
        "-s".into(),
        format!("{width}x{height}"),
        "-r".into(),
        fps.to_string(),
        "-i".into(),
        raw_path.into(),
        "-frames:v".into(),
        frame_count.to_string(),
    ];
    args.extend(plan.args.iter().cloned());
    args.extend(extra_args.iter().cloned());
    if plan.requires_faststart {
        args.push("-movflags".into());
        args.push("+faststart".into());
    }
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Stage all frames as raw RGB24 into a temporary file.
fn stage_raw_frames(frames: &[Frame]) -> ReelResult<(tempfile::TempPath, usize)> {
    let mut raw_file = NamedTempFile::new()?;
    let mut writer = BufWriter::new(raw_file.as_file_mut());
    let mut count = 0usize;

    for frame in frames {
        let bytes = frame
            .raster()
            .as_slice()
            .ok_or_else(|| ReelError::encode("frame raster is not contiguous"))?;
        writer.write_all(bytes)?;
        count += 1;
    }
    writer.flush()?;
    drop(writer);

    Ok((raw_file.into_temp_path(), count))
}

fn encode_with_ffmpeg(
    frames: &[Frame],
    width: u32,
    height: u32,
    options: &EncodeOptions,
    path: &Path,
) -> ReelResult<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let (raw_path, count) = stage_raw_frames(frames)?;
    let raw_str = raw_path
        .to_str()
        .ok_or_else(|| ReelError::encode("temporary raw frame path is not valid UTF-8"))?
        .to_owned();

    let ffmpeg = ffmpeg_binary();
    let mut failures: Vec<(&'static str, String)> = Vec::new();

    for plan in encoder_plans(options) {
        let mut output_path = path.to_path_buf();
        if let Some(ext) = plan.extension {
            output_path.set_extension(ext);
        }

        let args = ffmpeg_args(
            &plan,
            &raw_str,
            width,
            height,
            options.fps,
            count,
            &options.extra_args,
            &output_path,
        );

        tracing::debug!(
            encoder = plan.description,
            frames = count,
            fps = options.fps,
            "invoking ffmpeg"
        );

        match Command::new(&ffmpeg).args(&args).output() {
            Ok(output) if output.status.success() => {
                if output_path != path {
                    tracing::warn!(
                        requested = %path.display(),
                        written = %output_path.display(),
                        "preferred encoder unavailable; wrote fallback container"
                    );
                }
                tracing::info!(
                    encoder = plan.description,
                    frames = count,
                    path = %output_path.display(),
                    "encoded animation"
                );
                raw_path.close().ok();
                return Ok(output_path);
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
                failures.push((plan.description, stderr));
            }
            Err(err) => {
                failures.push((plan.description, err.to_string()));
            }
        }
    }

    raw_path.close().ok();

    let mut report = String::new();
    for (description, stderr) in failures {
        report.push_str(&format!("- {description}: {stderr}\n"));
    }
    Err(ReelError::encode(report.trim_end().to_owned()))
}

/// In-process GIF encoding with a per-frame delay of `1000 / fps` ms.
///
/// Frames are staged through a temporary file in the target directory and
/// persisted only once every frame encoded, so a mid-sequence failure leaves
/// no partial output behind.
fn write_gif(frames: &[Frame], fps: u32, path: &Path) -> ReelResult<PathBuf> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let staged = tempfile::Builder::new()
        .prefix(".cornerreel-")
        .suffix(".gif")
        .tempfile_in(&parent)?;

    {
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(staged.as_file()), 10);
        encoder.set_repeat(Repeat::Infinite)?;

        let delay = Delay::from_numer_denom_ms(1000, fps);
        for frame in frames {
            let rgba = frame.to_rgba_image()?;
            encoder.encode_frame(image::Frame::from_parts(rgba, 0, 0, delay))?;
        }
    }

    staged
        .persist(path)
        .map_err(|e| ReelError::encode(format!("failed to persist GIF output: {e}")))?;

    tracing::info!(
        frames = frames.len(),
        fps,
        path = %path.display(),
        "encoded animation"
    );
    Ok(path.to_path_buf())
}
