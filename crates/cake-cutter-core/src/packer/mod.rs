//! Packers that fill containers with the pieces decomposition could not map 1:1.
//!
//! - [`strip::StripPacker`]: container-wide or container-tall edge strips, best-fit-decreasing.
//! - [`corner::CornerPacker`]: leftover pieces, largest-area first with guillotine splits.

use serde::{Deserialize, Serialize};

pub mod corner;
pub mod strip;

/// Direction in which strips are stacked inside a container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Container-wide strips stacked top to bottom (keyed by height).
    Vertical,
    /// Container-tall strips stacked left to right (keyed by width).
    Horizontal,
}
