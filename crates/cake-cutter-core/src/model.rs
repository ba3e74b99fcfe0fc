use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::CutterConfig;
use crate::error::{CutterError, Result};

/// Size of a matrix, a container or a padding margin (`width x height`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Shape {
    pub width: u32,
    pub height: u32,
}

impl Shape {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if `other` fits strictly inside `self` on both axes.
    ///
    /// Equal sides do not count: a 120x100 shape is not contained in 120x120.
    pub fn contains(&self, other: &Shape) -> bool {
        other.width < self.width && other.height < self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// The shape covered by a margin of `self` on both sides of each axis.
    pub fn doubled(&self) -> Shape {
        Shape::new(self.width.saturating_mul(2), self.height.saturating_mul(2))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Shape {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X', ','])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("bad width '{w}': {e}"))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("bad height '{h}': {e}"))?;
        Ok(Shape::new(width, height))
    }
}

/// Axis-aligned rectangle. `left,top` is the top-left corner; `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A rectangle of `shape` placed at `(left, top)`.
    pub const fn at(left: u32, top: u32, shape: Shape) -> Self {
        Self::new(left, top, shape.width, shape.height)
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.width, self.height)
    }

    pub fn area(&self) -> u64 {
        self.shape().area()
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    /// Returns true if the two rectangles share at least one cell.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// Returns true if the rectangle lies inside `[0, bounds.width) x [0, bounds.height)`.
    pub fn fits_in(&self, bounds: &Shape) -> bool {
        self.right() <= bounds.width && self.bottom() <= bounds.height
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{},{}:{}]",
            self.left,
            self.right(),
            self.top,
            self.bottom()
        )
    }
}

/// Why a decomposed piece did not match the container directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    /// Exactly the container size.
    Full,
    /// Container-wide strip from the bottom edge of a matrix.
    FitWidth,
    /// Container-tall strip from the right edge of a matrix.
    FitHeight,
    /// Corner remainder, or a whole matrix smaller than the container.
    Small,
}

/// Copies `source` of matrix `source_id` to `destination` inside a container.
///
/// Deserializing goes through [`PieceMapping::new`], so mismatched shapes are rejected there too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawPieceMapping<I>")]
pub struct PieceMapping<I> {
    source_id: I,
    kind: PieceKind,
    source: Rect,
    destination: Rect,
    padding: Shape,
}

impl<I> PieceMapping<I> {
    /// Builds a mapping; both rectangles must have the same shape.
    pub fn new(source_id: I, kind: PieceKind, source: Rect, destination: Rect) -> Result<Self> {
        if source.shape() != destination.shape() {
            return Err(CutterError::ShapeMismatch {
                piece: source.shape(),
                slot: destination.shape(),
            });
        }
        Ok(Self {
            source_id,
            kind,
            source,
            destination,
            padding: Shape::default(),
        })
    }

    pub fn with_padding(mut self, padding: Shape) -> Self {
        self.padding = padding;
        self
    }

    pub fn source_id(&self) -> &I {
        &self.source_id
    }
    pub fn kind(&self) -> PieceKind {
        self.kind
    }
    pub fn source(&self) -> Rect {
        self.source
    }
    pub fn destination(&self) -> Rect {
        self.destination
    }
    pub fn padding(&self) -> Shape {
        self.padding
    }

    /// Replaces the identifier, e.g. to turn borrowed keys into owned strings.
    pub fn map_id<J>(self, f: impl FnOnce(I) -> J) -> PieceMapping<J> {
        PieceMapping {
            source_id: f(self.source_id),
            kind: self.kind,
            source: self.source,
            destination: self.destination,
            padding: self.padding,
        }
    }
}

#[derive(Deserialize)]
struct RawPieceMapping<I> {
    source_id: I,
    kind: PieceKind,
    source: Rect,
    destination: Rect,
    #[serde(default)]
    padding: Shape,
}

impl<I> TryFrom<RawPieceMapping<I>> for PieceMapping<I> {
    type Error = CutterError;

    fn try_from(raw: RawPieceMapping<I>) -> Result<Self> {
        Ok(PieceMapping::new(raw.source_id, raw.kind, raw.source, raw.destination)?
            .with_padding(raw.padding))
    }
}

impl<I: fmt::Debug> fmt::Display for PieceMapping<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}:{}->{}",
            self.source_id, self.source, self.destination
        )
    }
}

/// One fixed-size destination buffer and the pieces copied into it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Container<I> {
    pub pieces: Vec<PieceMapping<I>>,
}

impl<I> Default for Container<I> {
    fn default() -> Self {
        Self { pieces: Vec::new() }
    }
}

impl<I> Container<I> {
    pub fn new(pieces: Vec<PieceMapping<I>>) -> Self {
        Self { pieces }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Sum of the destination areas of all pieces.
    pub fn used_area(&self) -> u64 {
        self.pieces.iter().map(|p| p.destination.area()).sum()
    }

    pub fn map_id<J>(self, mut f: impl FnMut(I) -> J) -> Container<J> {
        Container {
            pieces: self.pieces.into_iter().map(|p| p.map_id(&mut f)).collect(),
        }
    }
}

/// Result of a run together with the sizes that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout<I> {
    pub container: Shape,
    pub padding: Shape,
    pub containers: Vec<Container<I>>,
}

impl<I> Layout<I> {
    pub fn new(config: &CutterConfig, containers: Vec<Container<I>>) -> Self {
        Self {
            container: config.container,
            padding: config.padding,
            containers,
        }
    }

    pub fn map_id<J>(self, mut f: impl FnMut(I) -> J) -> Layout<J> {
        Layout {
            container: self.container,
            padding: self.padding,
            containers: self
                .containers
                .into_iter()
                .map(|c| c.map_id(&mut f))
                .collect(),
        }
    }

    /// All mappings copying from matrix `id`, in container order.
    pub fn pieces_of<'a>(&'a self, id: &'a I) -> impl Iterator<Item = &'a PieceMapping<I>> + 'a
    where
        I: PartialEq,
    {
        self.containers
            .iter()
            .flat_map(|c| c.pieces.iter())
            .filter(move |p| &p.source_id == id)
    }

    /// Computes packing statistics for this layout.
    pub fn stats(&self) -> LayoutStats {
        let mut stats = LayoutStats {
            num_containers: self.containers.len(),
            total_container_area: self.container.area() * self.containers.len() as u64,
            ..Default::default()
        };
        for piece in self.containers.iter().flat_map(|c| c.pieces.iter()) {
            stats.num_pieces += 1;
            stats.used_area += piece.destination.area();
            match piece.kind {
                PieceKind::Full => stats.num_full += 1,
                PieceKind::FitWidth => stats.num_fit_width += 1,
                PieceKind::FitHeight => stats.num_fit_height += 1,
                PieceKind::Small => stats.num_small += 1,
            }
        }
        stats.occupancy = if stats.total_container_area > 0 {
            stats.used_area as f64 / stats.total_container_area as f64
        } else {
            0.0
        };
        stats
    }
}

/// Statistics about container utilisation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LayoutStats {
    pub num_containers: usize,
    pub num_pieces: usize,
    pub num_full: usize,
    pub num_fit_width: usize,
    pub num_fit_height: usize,
    pub num_small: usize,
    /// Sum of the areas of all containers.
    pub total_container_area: u64,
    /// Sum of the areas of all placed pieces.
    pub used_area: u64,
    /// used_area / total_container_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl LayoutStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Containers: {}, Pieces: {} (full {}, width strips {}, height strips {}, small {}), Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px²",
            self.num_containers,
            self.num_pieces,
            self.num_full,
            self.num_fit_width,
            self.num_fit_height,
            self.num_small,
            self.occupancy * 100.0,
            self.total_container_area,
            self.used_area,
        )
    }

    pub fn wasted_area(&self) -> u64 {
        self.total_container_area.saturating_sub(self.used_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_container_area > 0 {
            (self.wasted_area() as f64 / self.total_container_area as f64) * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_strict() {
        let container = Shape::new(120, 120);
        assert!(container.contains(&Shape::new(119, 119)));
        assert!(!container.contains(&Shape::new(120, 119)));
        assert!(!container.contains(&Shape::new(119, 120)));
        assert!(!Shape::new(121, 121).contains(&Shape::new(20, 121)));
    }

    #[test]
    fn shape_parses_from_str() {
        assert_eq!("120x80".parse::<Shape>(), Ok(Shape::new(120, 80)));
        assert_eq!(" 10 , 20 ".parse::<Shape>(), Ok(Shape::new(10, 20)));
        assert!("120".parse::<Shape>().is_err());
        assert!("ax3".parse::<Shape>().is_err());
    }

    #[test]
    fn rect_edges_are_exclusive() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        let c = Rect::new(9, 9, 2, 2);
        assert_eq!(a.right(), 10);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
        assert!(b.fits_in(&Shape::new(20, 10)));
        assert!(!b.fits_in(&Shape::new(19, 10)));
        assert_eq!(c.to_string(), "[9:11,9:11]");
    }

    #[test]
    fn mapping_rejects_mismatched_shapes() {
        let err = PieceMapping::new(
            "a",
            PieceKind::Small,
            Rect::new(0, 0, 10, 20),
            Rect::new(5, 5, 20, 10),
        )
        .unwrap_err();
        assert!(matches!(err, CutterError::ShapeMismatch { .. }));

        let ok = PieceMapping::new(
            "a",
            PieceKind::Small,
            Rect::new(0, 0, 10, 20),
            Rect::new(5, 5, 10, 20),
        )
        .unwrap();
        assert_eq!(ok.padding(), Shape::new(0, 0));
    }
}
