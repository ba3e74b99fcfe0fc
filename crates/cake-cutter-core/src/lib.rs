//! Core engine for cutting oversized matrices into fixed-size containers.
//!
//! - Decomposition: each matrix becomes full tiles, bottom/right edge strips and a corner piece,
//!   with tiles overlapping by a padding margin for seam-free stitching
//! - Packing: edge strips are stacked best-fit-decreasing; leftovers fill the gaps through a
//!   recursive largest-first guillotine packer, then fresh containers
//! - Output is geometry only (`PieceMapping`: source rect -> container rect); moving pixels is up
//!   to the caller
//!
//! Quick example:
//! ```
//! use cake_cutter_core::{CutterConfig, Shape, arrange};
//! # fn main() -> cake_cutter_core::Result<()> {
//! let cfg = CutterConfig::new(Shape::new(120, 120)).with_padding(Shape::new(10, 10));
//! let matrices = vec![("a", Shape::new(121, 121)), ("b", Shape::new(300, 80))];
//! let containers = arrange(matrices, &cfg)?;
//! for (i, c) in containers.iter().enumerate() {
//!     for piece in &c.pieces {
//!         println!("container {i}: {piece}");
//!     }
//! }
//! # Ok(()) }
//! ```

pub mod check;
pub mod config;
pub mod decompose;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod pool;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `cake_cutter_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::check::{Violation, verify};
    pub use crate::config::{CutterConfig, CutterConfigBuilder};
    pub use crate::decompose::{PiecesCollection, decompose};
    pub use crate::model::{
        Container, Layout, LayoutStats, PieceKind, PieceMapping, Rect, Shape,
    };
    pub use crate::packer::Axis;
    pub use crate::packer::corner::{CornerPacker, pack_corner};
    pub use crate::packer::strip::StripPacker;
    pub use crate::pool::SortedPool;
    pub use crate::{CutterError, Result, arrange, arrange_indexed, arrange_layout, to_json};
}
