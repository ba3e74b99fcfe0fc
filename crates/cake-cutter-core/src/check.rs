//! Post-hoc checks of a finished layout: overlap, bounds, shape fidelity and coverage.

use std::fmt::Debug;
use thiserror::Error;

use crate::model::{Container, Layout, PieceMapping, Shape};

/// A property a layout failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("container {container}: piece {piece} changes shape between source and destination")]
    ShapeMismatch { container: usize, piece: usize },
    #[error("container {container}: piece {piece} lies outside the container")]
    OutOfBounds { container: usize, piece: usize },
    #[error("container {container}: pieces {first} and {second} overlap")]
    Overlap {
        container: usize,
        first: usize,
        second: usize,
    },
    #[error("container {container}: piece {piece} reads outside matrix {id}")]
    OutsideMatrix {
        container: usize,
        piece: usize,
        id: String,
    },
    #[error("container {container}: piece {piece} references unknown matrix {id}")]
    UnknownMatrix {
        container: usize,
        piece: usize,
        id: String,
    },
    #[error("matrix {id}: {cells} cells not covered by any piece")]
    Uncovered { id: String, cells: u64 },
}

/// First pair of pieces whose destinations overlap.
pub fn find_overlap<I>(container: &Container<I>) -> Option<(usize, usize)> {
    let pieces = &container.pieces;
    for i in 0..pieces.len() {
        for j in (i + 1)..pieces.len() {
            if pieces[i].destination().overlaps(&pieces[j].destination()) {
                return Some((i, j));
            }
        }
    }
    None
}

/// First piece whose destination escapes `bounds`.
pub fn out_of_bounds<I>(container: &Container<I>, bounds: &Shape) -> Option<usize> {
    container
        .pieces
        .iter()
        .position(|p| !p.destination().fits_in(bounds))
}

/// Number of cells of a `matrix`-shaped source that no mapping reads.
///
/// A non-zero `clip` shrinks every source rectangle by that margin on each side and only
/// requires the matrix interior (minus the same margin) to be covered; this is what survives
/// when overlapping borders are thrown away on reconstruction.
pub fn uncovered_cells<'a, I: 'a>(
    matrix: Shape,
    mappings: impl IntoIterator<Item = &'a PieceMapping<I>>,
    clip: Shape,
) -> u64 {
    let (w, h) = (matrix.width as usize, matrix.height as usize);
    let (mx, my) = (clip.width as usize, clip.height as usize);
    let mut covered = vec![false; w * h];
    for m in mappings {
        let src = m.source();
        let x0 = src.left as usize + mx;
        let x1 = (src.right() as usize).saturating_sub(mx).min(w);
        let y0 = src.top as usize + my;
        let y1 = (src.bottom() as usize).saturating_sub(my).min(h);
        for y in y0..y1 {
            for x in x0..x1 {
                covered[y * w + x] = true;
            }
        }
    }
    let mut missing = 0u64;
    for y in my..h.saturating_sub(my) {
        for x in mx..w.saturating_sub(mx) {
            if !covered[y * w + x] {
                missing += 1;
            }
        }
    }
    missing
}

/// Runs every check over `layout` against the matrices it was built from.
///
/// Returns an empty list when the layout is sound.
pub fn verify<I: PartialEq + Debug>(layout: &Layout<I>, matrices: &[(I, Shape)]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (ci, container) in layout.containers.iter().enumerate() {
        for (pi, piece) in container.pieces.iter().enumerate() {
            if piece.source().shape() != piece.destination().shape() {
                violations.push(Violation::ShapeMismatch {
                    container: ci,
                    piece: pi,
                });
            }
            match matrices.iter().find(|(id, _)| id == piece.source_id()) {
                None => violations.push(Violation::UnknownMatrix {
                    container: ci,
                    piece: pi,
                    id: format!("{:?}", piece.source_id()),
                }),
                Some((id, shape)) if !piece.source().fits_in(shape) => {
                    violations.push(Violation::OutsideMatrix {
                        container: ci,
                        piece: pi,
                        id: format!("{id:?}"),
                    })
                }
                Some(_) => {}
            }
        }
        if let Some(pi) = out_of_bounds(container, &layout.container) {
            violations.push(Violation::OutOfBounds {
                container: ci,
                piece: pi,
            });
        }
        if let Some((first, second)) = find_overlap(container) {
            violations.push(Violation::Overlap {
                container: ci,
                first,
                second,
            });
        }
    }
    for (id, shape) in matrices {
        let cells = uncovered_cells(*shape, layout.pieces_of(id), Shape::default());
        if cells > 0 {
            violations.push(Violation::Uncovered {
                id: format!("{id:?}"),
                cells,
            });
        }
    }
    violations
}
