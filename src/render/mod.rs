//! Static corner-plot rendering.
//!
//! One [`CornerRenderer`] is built per animation and owns the reusable
//! figure surface: the raster is cleared and redrawn for every frame instead
//! of allocating a new figure, and is released when the renderer drops,
//! error paths included.
//!
//! Panels avoid the system font stack entirely (axis ticks are suppressed,
//! titles go through the bitmap glyph font), so identical input produces
//! byte-identical rasters on every platform.

mod glyphs;
mod layout;

use ndarray::{s, Array3, ArrayView3};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackendError;

use crate::config::{CornerConfig, Rgb};
use crate::error::{ReelError, ReelResult};
use crate::tensor::summary::histogram_density;
use crate::tensor::{summarize, DimensionSummary, SampleTensor};

use layout::{Panel, PanelGrid};

type PlotResult = Result<(), DrawingAreaErrorKind<BitMapBackendError>>;

const AXIS_COLOR: RGBColor = RGBColor(110, 110, 110);
const LABEL_COLOR: (u8, u8, u8) = (60, 60, 60);
const LABEL_SCALE: u32 = 2;

/// Round a frame dimension down to the nearest even value, floored at 2.
/// YUV420 encoders require even dimensions.
pub(crate) const fn sanitize_dimension(dim: u32) -> u32 {
    let dim = if dim < 2 { 2 } else { dim };
    dim - dim % 2
}

/// The reusable RGB24 raster a corner plot is drawn onto.
#[derive(Debug)]
pub struct FigureSurface {
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl FigureSurface {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buffer: vec![0u8; (width * height * 3) as usize],
        }
    }

    /// Surface width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Renders one static corner plot per sample slice into the owned surface.
#[derive(Debug)]
pub struct CornerRenderer {
    config: CornerConfig,
    summaries: Vec<DimensionSummary>,
    grid: PanelGrid,
    surface: FigureSurface,
}

impl CornerRenderer {
    /// Build a renderer for the given tensor and configuration.
    ///
    /// Axis extents and the shared bin grid are fixed here, from the whole
    /// tensor, so every later frame shares axes.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Config`] if `labels` or `truths` disagree with
    /// the tensor's dimension count.
    pub fn new(tensor: &SampleTensor, config: &CornerConfig) -> ReelResult<Self> {
        let dims = tensor.dimensions();

        if let Some(labels) = &config.labels {
            if labels.len() != dims {
                return Err(ReelError::config(format!(
                    "{} labels given for a {dims}-dimensional tensor",
                    labels.len()
                )));
            }
        }
        if let Some(truths) = &config.truths {
            if truths.len() != dims {
                return Err(ReelError::config(format!(
                    "{} truths given for a {dims}-dimensional tensor",
                    truths.len()
                )));
            }
        }

        let width = sanitize_dimension(config.width);
        let height = sanitize_dimension(config.height);
        if width != config.width || height != config.height {
            tracing::debug!(
                requested_width = config.width,
                requested_height = config.height,
                width,
                height,
                "adjusted frame size for YUV420 encoder compatibility"
            );
        }

        Ok(Self {
            config: config.clone(),
            summaries: summarize(tensor, config.final_bins),
            grid: PanelGrid::new(dims),
            surface: FigureSurface::new(width, height),
        })
    }

    /// Frame width in pixels (after even-dimension sanitization).
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.surface.width()
    }

    /// Frame height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Per-dimension summaries shared by all frames.
    #[must_use]
    pub fn summaries(&self) -> &[DimensionSummary] {
        &self.summaries
    }

    /// Render the corner plot of one sample slice, returning the frame
    /// raster as a (height x width x 3) array.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Render`] if the plotting backend fails.
    pub fn render(&mut self, slice: ArrayView3<'_, f64>) -> ReelResult<Array3<u8>> {
        let width = self.surface.width;
        let height = self.surface.height;

        draw_panels(
            &mut self.surface.buffer,
            width,
            height,
            &slice,
            &self.config,
            &self.summaries,
            self.grid,
        )
        .map_err(|e| ReelError::render(e.to_string()))?;

        stamp_titles(
            &mut self.surface.buffer,
            width,
            height,
            &self.config,
            self.grid,
        );

        Array3::from_shape_vec(
            (height as usize, width as usize, 3),
            self.surface.buffer.clone(),
        )
        .map_err(|e| ReelError::render(e.to_string()))
    }
}

fn style_of(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

#[allow(clippy::too_many_arguments)]
fn draw_panels(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    slice: &ArrayView3<'_, f64>,
    config: &CornerConfig,
    summaries: &[DimensionSummary],
    grid: PanelGrid,
) -> PlotResult {
    let root = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((grid.dims(), grid.dims()));
    for panel in grid.lower_triangle() {
        let area = &panels[grid.flat_index(panel)];
        if panel.is_diagonal() {
            draw_marginal(area, slice, panel.row, config, &summaries[panel.row])?;
        } else {
            draw_joint(area, slice, panel, config, summaries)?;
        }
    }

    root.present()?;
    Ok(())
}

/// Diagonal panel: step-outline density histogram of one dimension.
fn draw_marginal(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    slice: &ArrayView3<'_, f64>,
    dim: usize,
    config: &CornerConfig,
    summary: &DimensionSummary,
) -> PlotResult {
    let values = slice.slice(s![.., .., dim]);
    let density = histogram_density(values.iter().copied(), &summary.edges);

    let mut chart = ChartBuilder::on(area)
        .margin(4)
        .x_label_area_size(8)
        .y_label_area_size(8)
        .build_cartesian_2d(summary.lo..summary.hi, 0.0..summary.ymax)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(0)
        .y_labels(0)
        .axis_style(&AXIS_COLOR)
        .draw()?;

    let color = style_of(config.color);
    let mut outline = Vec::with_capacity(2 * density.len() + 2);
    outline.push((summary.edges[0], 0.0));
    for (j, d) in density.iter().enumerate() {
        outline.push((summary.edges[j], *d));
        outline.push((summary.edges[j + 1], *d));
    }
    outline.push((summary.edges[density.len()], 0.0));
    chart.draw_series(LineSeries::new(outline, color.stroke_width(1)))?;

    if let Some(truths) = &config.truths {
        let t = truths[dim];
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(t, 0.0), (t, summary.ymax)],
            ShapeStyle::from(&style_of(config.truth_color)).stroke_width(1),
        )))?;
    }

    Ok(())
}

/// Off-diagonal panel: scatter of dimension `col` (x) against `row` (y).
fn draw_joint(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    slice: &ArrayView3<'_, f64>,
    panel: Panel,
    config: &CornerConfig,
    summaries: &[DimensionSummary],
) -> PlotResult {
    let sx = &summaries[panel.col];
    let sy = &summaries[panel.row];

    let mut chart = ChartBuilder::on(area)
        .margin(4)
        .x_label_area_size(8)
        .y_label_area_size(8)
        .build_cartesian_2d(sx.lo..sx.hi, sy.lo..sy.hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(0)
        .y_labels(0)
        .axis_style(&AXIS_COLOR)
        .draw()?;

    let (window, walkers, _) = slice.dim();
    let mut points = Vec::with_capacity(window * walkers);
    for step in slice.outer_iter() {
        for walker in step.outer_iter() {
            points.push((walker[panel.col], walker[panel.row]));
        }
    }

    let style = style_of(config.color).filled();
    let radius = config.marker_size as i32;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), radius, style)),
    )?;

    if let Some(truths) = &config.truths {
        let (tx, ty) = (truths[panel.col], truths[panel.row]);
        let style = ShapeStyle::from(&style_of(config.truth_color)).stroke_width(1);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(tx, sy.lo), (tx, sy.hi)],
            style,
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(sx.lo, ty), (sx.hi, ty)],
            style,
        )))?;
    }

    Ok(())
}

/// Stamp the configured dimension labels as diagonal panel titles.
fn stamp_titles(buffer: &mut [u8], width: u32, height: u32, config: &CornerConfig, grid: PanelGrid) {
    let Some(labels) = &config.labels else {
        return;
    };

    for (dim, label) in labels.iter().enumerate() {
        let rect = grid.panel_rect(Panel { row: dim, col: dim }, width, height);
        if rect.height < 8 * LABEL_SCALE {
            continue;
        }
        let max_chars = (rect.width.saturating_sub(12) / (4 * LABEL_SCALE)) as usize;
        let shown: String = label.chars().take(max_chars).collect();
        glyphs::draw_text(
            buffer,
            width,
            height,
            rect.x + 8,
            rect.y + 6,
            &shown,
            LABEL_SCALE,
            LABEL_COLOR,
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid_tensor(iterations: usize, walkers: usize, dims: usize) -> SampleTensor {
        // Deterministic, well-spread values
        let len = iterations * walkers * dims;
        let data: Vec<f64> = (0..len)
            .map(|i| (i as f64 * 0.618_034).sin() * 3.0)
            .collect();
        SampleTensor::from_vec(iterations, walkers, dims, data).unwrap()
    }

    #[test]
    fn test_sanitize_dimension() {
        assert_eq!(sanitize_dimension(0), 2);
        assert_eq!(sanitize_dimension(1), 2);
        assert_eq!(sanitize_dimension(2), 2);
        assert_eq!(sanitize_dimension(721), 720);
        assert_eq!(sanitize_dimension(720), 720);
    }

    #[test]
    fn test_render_raster_shape() {
        let tensor = grid_tensor(4, 8, 2);
        let config = CornerConfig::builder().size(200, 160).build();
        let mut renderer = CornerRenderer::new(&tensor, &config).unwrap();
        let raster = renderer.render(tensor.visible(3, config.policy)).unwrap();
        assert_eq!(raster.dim(), (160, 200, 3));
    }

    #[test]
    fn test_render_draws_something() {
        let tensor = grid_tensor(4, 8, 2);
        let config = CornerConfig::builder().size(200, 200).build();
        let mut renderer = CornerRenderer::new(&tensor, &config).unwrap();
        let raster = renderer.render(tensor.visible(0, config.policy)).unwrap();
        // Not a blank white frame
        assert!(raster.iter().any(|&b| b != 255));
    }

    #[test]
    fn test_render_deterministic() {
        let tensor = grid_tensor(5, 6, 3);
        let config = CornerConfig::builder().size(240, 240).build();

        let mut first = CornerRenderer::new(&tensor, &config).unwrap();
        let mut second = CornerRenderer::new(&tensor, &config).unwrap();

        let a = first.render(tensor.visible(4, config.policy)).unwrap();
        let b = second.render(tensor.visible(4, config.policy)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_surface_reuse_is_clean() {
        // Rendering a busy frame then a sparse one must not leak pixels
        let tensor = grid_tensor(10, 8, 2);
        let config = CornerConfig::builder().size(200, 200).build();
        let mut renderer = CornerRenderer::new(&tensor, &config).unwrap();

        let _busy = renderer
            .render(tensor.visible(9, crate::tensor::FramePolicy::Cumulative))
            .unwrap();
        let sparse_after = renderer.render(tensor.visible(0, config.policy)).unwrap();

        let mut fresh = CornerRenderer::new(&tensor, &config).unwrap();
        let sparse_fresh = fresh.render(tensor.visible(0, config.policy)).unwrap();
        assert_eq!(sparse_after, sparse_fresh);
    }

    #[test]
    fn test_one_dimensional_tensor_renders() {
        let tensor = grid_tensor(3, 10, 1);
        let config = CornerConfig::builder().size(120, 120).build();
        let mut renderer = CornerRenderer::new(&tensor, &config).unwrap();
        let raster = renderer.render(tensor.visible(2, config.policy)).unwrap();
        assert_eq!(raster.dim(), (120, 120, 3));
    }

    #[test]
    fn test_truths_change_pixels() {
        let tensor = grid_tensor(4, 8, 2);
        let plain = CornerConfig::builder().size(200, 200).build();
        let marked = CornerConfig::builder()
            .size(200, 200)
            .truths([0.0, 0.0])
            .build();

        let mut a = CornerRenderer::new(&tensor, &plain).unwrap();
        let mut b = CornerRenderer::new(&tensor, &marked).unwrap();
        let fa = a.render(tensor.visible(3, plain.policy)).unwrap();
        let fb = b.render(tensor.visible(3, marked.policy)).unwrap();
        assert_ne!(fa, fb);
    }

    #[test]
    fn test_labels_change_pixels() {
        let tensor = grid_tensor(4, 8, 2);
        let plain = CornerConfig::builder().size(200, 200).build();
        let labeled = CornerConfig::builder()
            .size(200, 200)
            .labels(["mass", "radius"])
            .build();

        let mut a = CornerRenderer::new(&tensor, &plain).unwrap();
        let mut b = CornerRenderer::new(&tensor, &labeled).unwrap();
        let fa = a.render(tensor.visible(3, plain.policy)).unwrap();
        let fb = b.render(tensor.visible(3, labeled.policy)).unwrap();
        assert_ne!(fa, fb);
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let tensor = grid_tensor(4, 8, 3);
        let config = CornerConfig::builder().labels(["only", "two"]).build();
        let result = CornerRenderer::new(&tensor, &config);
        assert!(matches!(result, Err(ReelError::Config { .. })));
    }

    #[test]
    fn test_truth_count_mismatch_rejected() {
        let tensor = grid_tensor(4, 8, 2);
        let config = CornerConfig::builder().truths([1.0, 2.0, 3.0]).build();
        let result = CornerRenderer::new(&tensor, &config);
        assert!(matches!(result, Err(ReelError::Config { .. })));
    }

    #[test]
    fn test_odd_size_sanitized() {
        let tensor = grid_tensor(2, 4, 2);
        let config = CornerConfig::builder().size(201, 161).build();
        let renderer = CornerRenderer::new(&tensor, &config).unwrap();
        assert_eq!(renderer.width(), 200);
        assert_eq!(renderer.height(), 160);
    }
}
