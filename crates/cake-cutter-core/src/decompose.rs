//! Splitting oversized matrices into container-sized tiles and edge pieces.

use std::fmt::Debug;
use std::ops::{Add, AddAssign};
use tracing::debug;

use crate::config::CutterConfig;
use crate::error::Result;
use crate::model::{PieceKind, Rect, Shape};

/// Sub-rectangles of one or more matrices, grouped by how they relate to the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiecesCollection<I> {
    /// Exactly container-sized tiles.
    pub full: Vec<(I, Rect)>,
    /// Container-wide strips (height is smaller than the container).
    pub fit_width: Vec<(I, Rect)>,
    /// Container-tall strips (width is smaller than the container).
    pub fit_height: Vec<(I, Rect)>,
    /// Pieces smaller than the container on both axes.
    pub small: Vec<(I, Rect)>,
}

impl<I> Default for PiecesCollection<I> {
    fn default() -> Self {
        Self {
            full: Vec::new(),
            fit_width: Vec::new(),
            fit_height: Vec::new(),
            small: Vec::new(),
        }
    }
}

impl<I> PiecesCollection<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.full.len() + self.fit_width.len() + self.fit_height.len() + self.small.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Each list paired with the kind of piece it holds.
    pub fn groups(&self) -> [(PieceKind, &[(I, Rect)]); 4] {
        [
            (PieceKind::Full, self.full.as_slice()),
            (PieceKind::FitWidth, self.fit_width.as_slice()),
            (PieceKind::FitHeight, self.fit_height.as_slice()),
            (PieceKind::Small, self.small.as_slice()),
        ]
    }

    /// Emits one debug event per piece.
    pub fn log_pieces(&self)
    where
        I: Debug,
    {
        for (kind, pieces) in self.groups() {
            debug!(?kind, count = pieces.len(), "pieces");
            for (id, rect) in pieces {
                debug!(?kind, ?id, piece = %rect, "piece");
            }
        }
    }
}

impl<I> AddAssign for PiecesCollection<I> {
    fn add_assign(&mut self, other: Self) {
        self.full.extend(other.full);
        self.fit_width.extend(other.fit_width);
        self.fit_height.extend(other.fit_height);
        self.small.extend(other.small);
    }
}

impl<I> Add for PiecesCollection<I> {
    type Output = Self;
    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl<I> FromIterator<PiecesCollection<I>> for PiecesCollection<I> {
    fn from_iter<T: IntoIterator<Item = PiecesCollection<I>>>(iter: T) -> Self {
        iter.into_iter().fold(Self::new(), Add::add)
    }
}

/// Splits matrix `id` of shape `matrix` into pieces relative to `cfg`.
///
/// A matrix strictly smaller than the container becomes a single `small` piece. Otherwise the
/// matrix is covered by a grid of container-sized tiles that overlap their neighbours by the
/// padding margin, one strip per column along the bottom edge, one strip per row along the
/// right edge and a single corner piece. A remainder no larger than twice the padding on an
/// axis produces no strip (and no corner) on that axis; the last tile already covers it.
///
/// Fails when `cfg` is invalid or the matrix is not larger than twice the padding.
pub fn decompose<I: Clone + Debug>(
    id: I,
    matrix: Shape,
    cfg: &CutterConfig,
) -> Result<PiecesCollection<I>> {
    cfg.validate()?;
    cfg.check_matrix(&id, matrix)?;
    let mut pieces = PiecesCollection::new();
    let container = cfg.container;
    if container.contains(&matrix) {
        pieces
            .small
            .push((id, Rect::new(0, 0, matrix.width, matrix.height)));
        return Ok(pieces);
    }

    let margin = cfg.padding.doubled();
    let valid = cfg.valid_shape();
    let col_count = matrix.width.saturating_sub(margin.width) / valid.width;
    let row_count = matrix.height.saturating_sub(margin.height) / valid.height;

    for i in 0..col_count {
        for j in 0..row_count {
            pieces
                .full
                .push((id.clone(), Rect::at(i * valid.width, j * valid.height, container)));
        }
    }

    let x_start = valid.width * col_count;
    let y_start = valid.height * row_count;
    let remain_width = matrix.width - x_start;
    let remain_height = matrix.height - y_start;
    let keep_bottom = remain_height > margin.height;
    let keep_right = remain_width > margin.width;

    if keep_bottom {
        for i in 0..col_count {
            pieces.fit_width.push((
                id.clone(),
                Rect::new(i * valid.width, y_start, container.width, remain_height),
            ));
        }
    }
    if keep_right {
        for j in 0..row_count {
            pieces.fit_height.push((
                id.clone(),
                Rect::new(x_start, j * valid.height, remain_width, container.height),
            ));
        }
    }
    if keep_bottom && keep_right {
        pieces
            .small
            .push((id, Rect::new(x_start, y_start, remain_width, remain_height)));
    }
    Ok(pieces)
}
