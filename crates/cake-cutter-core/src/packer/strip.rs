use std::fmt::Debug;
use tracing::debug;

use super::Axis;
use super::corner::CornerPacker;
use crate::error::{CutterError, Result};
use crate::model::{Container, PieceKind, PieceMapping, Rect, Shape};
use crate::pool::SortedPool;

/// Stacks edge strips into containers best-fit-decreasing along one axis.
///
/// Each container is opened empty and repeatedly receives the largest strip that still fits
/// the remaining capacity. When no strip fits any more, the leftover band is handed to a
/// [`CornerPacker`] over the shared `small` pool before the container is closed.
pub struct StripPacker {
    container: Shape,
    padding: Shape,
    axis: Axis,
}

impl StripPacker {
    pub fn new(container: Shape, padding: Shape, axis: Axis) -> Self {
        Self {
            container,
            padding,
            axis,
        }
    }

    fn capacity(&self) -> u32 {
        match self.axis {
            Axis::Vertical => self.container.height,
            Axis::Horizontal => self.container.width,
        }
    }

    fn key(&self, rect: &Rect) -> u32 {
        match self.axis {
            Axis::Vertical => rect.height,
            Axis::Horizontal => rect.width,
        }
    }

    /// Whether `rect` fits the container across the packing axis.
    fn fits_across(&self, rect: &Rect) -> bool {
        match self.axis {
            Axis::Vertical => rect.width <= self.container.width,
            Axis::Horizontal => rect.height <= self.container.height,
        }
    }

    fn kind(&self) -> PieceKind {
        match self.axis {
            Axis::Vertical => PieceKind::FitWidth,
            Axis::Horizontal => PieceKind::FitHeight,
        }
    }

    /// Slot for a strip of `shape` starting `offset` along the packing axis.
    fn slot(&self, offset: u32, shape: Shape) -> Rect {
        match self.axis {
            Axis::Vertical => Rect::at(0, offset, shape),
            Axis::Horizontal => Rect::at(offset, 0, shape),
        }
    }

    /// The unused band once `used` of the capacity is taken.
    fn residual(&self, used: u32) -> Rect {
        let Shape { width, height } = self.container;
        match self.axis {
            Axis::Vertical => Rect::new(0, used, width, height - used),
            Axis::Horizontal => Rect::new(used, 0, width - used, height),
        }
    }

    /// Packs every strip, consuming leftovers from `small` to fill unused bands.
    pub fn pack<I: Clone + Debug>(
        &self,
        strips: Vec<(I, Rect)>,
        small: &mut Vec<(I, Rect)>,
    ) -> Result<Vec<Container<I>>> {
        let capacity = self.capacity();
        let kind = self.kind();
        if let Some((_, rect)) = strips.iter().find(|(_, r)| !self.fits_across(r)) {
            return Err(CutterError::PieceTooLarge {
                piece: rect.shape(),
                container: self.container,
            });
        }
        let mut pool = SortedPool::new(strips, |r| self.key(r));
        let mut containers = Vec::new();

        while !pool.is_empty() {
            let mut container = Container::default();
            let mut used = 0u32;
            while let Some((id, rect)) = pool.pop_at_most(capacity - used) {
                let slot = self.slot(used, rect.shape());
                used += self.key(&rect);
                container
                    .pieces
                    .push(PieceMapping::new(id, kind, rect, slot)?.with_padding(self.padding));
            }
            if container.is_empty() {
                let piece = pool
                    .pop_at_most(u32::MAX)
                    .map(|(_, r)| r.shape())
                    .unwrap_or_default();
                return Err(CutterError::PieceTooLarge {
                    piece,
                    container: self.container,
                });
            }
            let strips_placed = container.len();
            if used < capacity {
                let fill = CornerPacker::new(small)
                    .padding(self.padding)
                    .pack(self.residual(used))?;
                container.pieces.extend(fill);
            }
            debug!(
                axis = ?self.axis,
                strips = strips_placed,
                leftovers = container.len() - strips_placed,
                used,
                capacity,
                "strip container closed"
            );
            containers.push(container);
        }
        Ok(containers)
    }
}
