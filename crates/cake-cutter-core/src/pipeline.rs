use std::fmt::Debug;
use tracing::{debug, info, instrument};

use crate::config::CutterConfig;
use crate::decompose::{PiecesCollection, decompose};
use crate::error::{CutterError, Result};
use crate::model::{Container, Layout, PieceKind, PieceMapping, Rect, Shape};
use crate::packer::Axis;
use crate::packer::corner::CornerPacker;
use crate::packer::strip::StripPacker;

#[instrument(skip_all)]
/// Cuts `matrices` into containers of `cfg.container` and returns the containers in order.
///
/// Phases:
/// - every matrix is validated first; the first offending matrix (or an invalid `cfg`) fails
///   the whole run and no containers are produced;
/// - matrices are decomposed in iteration order and their pieces merged into one pool;
/// - one container per full tile;
/// - width strips stacked vertically, then height strips stacked horizontally, both filling
///   their unused bands from the shared leftover pool;
/// - remaining leftovers packed into fresh containers until none are left.
///
/// Identifiers are cloned into the mappings; pass references (e.g. `map.iter()`) to borrow.
pub fn arrange<I, M>(matrices: M, cfg: &CutterConfig) -> Result<Vec<Container<I>>>
where
    I: Clone + Debug,
    M: IntoIterator<Item = (I, Shape)>,
{
    cfg.validate()?;
    let matrices: Vec<(I, Shape)> = matrices.into_iter().collect();
    for (id, shape) in &matrices {
        cfg.check_matrix(id, *shape)?;
    }

    let pieces: PiecesCollection<I> = matrices
        .into_iter()
        .map(|(id, shape)| decompose(id, shape, cfg))
        .collect::<Result<_>>()?;
    pieces.log_pieces();
    debug!(
        full = pieces.full.len(),
        fit_width = pieces.fit_width.len(),
        fit_height = pieces.fit_height.len(),
        small = pieces.small.len(),
        "decomposed"
    );

    let PiecesCollection {
        full,
        fit_width,
        fit_height,
        mut small,
    } = pieces;
    let whole = Rect::at(0, 0, cfg.container);

    let mut containers: Vec<Container<I>> = Vec::with_capacity(full.len());
    for (id, rect) in full {
        let mapping = PieceMapping::new(id, PieceKind::Full, rect, whole)?.with_padding(cfg.padding);
        containers.push(Container::new(vec![mapping]));
    }
    let n_full = containers.len();

    let by_width = StripPacker::new(cfg.container, cfg.padding, Axis::Vertical)
        .pack(fit_width, &mut small)?;
    let n_width = by_width.len();
    containers.extend(by_width);

    let by_height = StripPacker::new(cfg.container, cfg.padding, Axis::Horizontal)
        .pack(fit_height, &mut small)?;
    let n_height = by_height.len();
    containers.extend(by_height);

    let mut n_small = 0usize;
    while !small.is_empty() {
        let pieces = CornerPacker::new(&mut small)
            .padding(cfg.padding)
            .pack(whole)?;
        if pieces.is_empty() {
            let piece = small.first().map(|(_, r)| r.shape()).unwrap_or_default();
            return Err(CutterError::PieceTooLarge {
                piece,
                container: cfg.container,
            });
        }
        containers.push(Container::new(pieces));
        n_small += 1;
    }

    info!(
        containers = containers.len(),
        full = n_full,
        width_strips = n_width,
        height_strips = n_height,
        leftovers = n_small,
        "arranged"
    );
    Ok(containers)
}

/// Like [`arrange`] for a plain sequence of shapes; identifiers are the indices `0..n`.
pub fn arrange_indexed(shapes: &[Shape], cfg: &CutterConfig) -> Result<Vec<Container<usize>>> {
    arrange(shapes.iter().copied().enumerate(), cfg)
}

/// Runs [`arrange`] and bundles the containers with the sizes that produced them.
pub fn arrange_layout<I, M>(matrices: M, cfg: &CutterConfig) -> Result<Layout<I>>
where
    I: Clone + Debug,
    M: IntoIterator<Item = (I, Shape)>,
{
    let containers = arrange(matrices, cfg)?;
    Ok(Layout::new(cfg, containers))
}
