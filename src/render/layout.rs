//! Panel grid geometry for the corner layout.
//!
//! A D-dimensional corner plot is a D x D grid of which only the lower
//! triangle is drawn: marginal histograms on the diagonal, pairwise scatter
//! panels below it.

/// Pixel-space rectangle of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One panel of the corner grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Panel {
    /// Grid row; equals the dimension plotted on the y axis (or the marginal
    /// dimension on the diagonal).
    pub row: usize,
    /// Grid column; equals the dimension plotted on the x axis.
    pub col: usize,
}

impl Panel {
    pub(crate) const fn is_diagonal(self) -> bool {
        self.row == self.col
    }
}

/// The D x D corner grid.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PanelGrid {
    dims: usize,
}

impl PanelGrid {
    pub(crate) const fn new(dims: usize) -> Self {
        Self { dims }
    }

    pub(crate) const fn dims(self) -> usize {
        self.dims
    }

    /// Panels of the lower triangle in row-major order.
    pub(crate) fn lower_triangle(self) -> impl Iterator<Item = Panel> {
        let dims = self.dims;
        (0..dims).flat_map(move |row| (0..=row).map(move |col| Panel { row, col }))
    }

    /// Index of a panel in the row-major vector produced by splitting the
    /// drawing area evenly into D x D cells.
    pub(crate) const fn flat_index(self, panel: Panel) -> usize {
        panel.row * self.dims + panel.col
    }

    /// Pixel rectangle of a panel on a surface of the given size.
    pub(crate) fn panel_rect(self, panel: Panel, width: u32, height: u32) -> Rect {
        let dims = self.dims as u32;
        let cell_w = width / dims;
        let cell_h = height / dims;
        Rect {
            x: panel.col as u32 * cell_w,
            y: panel.row as u32 * cell_h,
            width: cell_w,
            height: cell_h,
        }
    }
}
