use std::fmt::Debug;
use tracing::trace;

use crate::error::Result;
use crate::model::{PieceKind, PieceMapping, Rect, Shape};

/// Fills a free region with leftover pieces, largest first, splitting the rest guillotine-style.
///
/// Pieces are removed from the borrowed pool as they are placed, so one pool can be threaded
/// through several regions and containers without a piece ever being placed twice.
pub struct CornerPacker<'p, I> {
    pool: &'p mut Vec<(I, Rect)>,
    min_shape: Option<Shape>,
    padding: Shape,
}

impl<'p, I: Clone + Debug> CornerPacker<'p, I> {
    pub fn new(pool: &'p mut Vec<(I, Rect)>) -> Self {
        Self {
            pool,
            min_shape: None,
            padding: Shape::default(),
        }
    }

    /// Regions that do not strictly contain `shape` are left empty.
    pub fn min_shape(mut self, shape: Option<Shape>) -> Self {
        self.min_shape = shape;
        self
    }

    /// Padding recorded on every emitted mapping.
    pub fn padding(mut self, padding: Shape) -> Self {
        self.padding = padding;
        self
    }

    /// Places as many pool pieces as possible inside `region`.
    pub fn pack(&mut self, region: Rect) -> Result<Vec<PieceMapping<I>>> {
        let mut out = Vec::new();
        self.fill(region, &mut out)?;
        Ok(out)
    }

    fn fill(&mut self, region: Rect, out: &mut Vec<PieceMapping<I>>) -> Result<()> {
        let room = region.shape();
        if self.min_shape.is_some_and(|min| !room.contains(&min)) {
            return Ok(());
        }
        let Some(idx) = self.choose(&room) else {
            return Ok(());
        };
        let (id, piece) = self.pool.remove(idx);
        let placed = Rect::at(region.left, region.top, piece.shape());
        trace!(?id, piece = %piece, at = %placed, "corner placement");
        out.push(PieceMapping::new(id, PieceKind::Small, piece, placed)?.with_padding(self.padding));

        let (first, second) = Self::split(&region, &placed);
        for r in [first, second].into_iter().flatten() {
            self.fill(r, out)?;
        }
        Ok(())
    }

    /// Index of the largest-area piece strictly contained in `room`; the earliest wins ties.
    fn choose(&self, room: &Shape) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (i, (_, rect)) in self.pool.iter().enumerate() {
            if !room.contains(&rect.shape()) {
                continue;
            }
            let area = rect.area();
            if best.is_none_or(|(_, a)| area > a) {
                best = Some((i, area));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Splits what is left of `region` after `placed` (at its top-left) into two disjoint parts.
    ///
    /// The part holding the larger leftover bar is returned first and kept whole: either a
    /// full-height right column plus a bottom row under the piece, or a full-width bottom row
    /// plus a right column beside the piece. Equal bars pick the right column.
    fn split(region: &Rect, placed: &Rect) -> (Option<Rect>, Option<Rect>) {
        let w_right = region.width - placed.width;
        let h_bottom = region.height - placed.height;
        let right_bar = w_right as u64 * region.height as u64;
        let bottom_bar = h_bottom as u64 * region.width as u64;

        let (first, second) = if right_bar >= bottom_bar {
            (
                Rect::new(placed.right(), region.top, w_right, region.height),
                Rect::new(region.left, placed.bottom(), placed.width, h_bottom),
            )
        } else {
            (
                Rect::new(region.left, placed.bottom(), region.width, h_bottom),
                Rect::new(placed.right(), region.top, w_right, placed.height),
            )
        };
        let keep = |r: Rect| (r.width > 0 && r.height > 0).then_some(r);
        (keep(first), keep(second))
    }
}

/// Packs `pool` pieces into `region` with no padding recorded on the mappings.
pub fn pack_corner<I: Clone + Debug>(
    region: Rect,
    pool: &mut Vec<(I, Rect)>,
    min_shape: Option<Shape>,
) -> Result<Vec<PieceMapping<I>>> {
    CornerPacker::new(pool).min_shape(min_shape).pack(region)
}
