use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::{CutterError, Result};
use crate::model::Shape;

/// Sizes shared by a whole cutting run.
///
/// - `container` is the fixed shape every output container has.
/// - `padding` is the overlap margin kept on each side of a tile so that neighbouring tiles
///   can be stitched back without seams. Defaults to `0x0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CutterConfig {
    pub container: Shape,
    #[serde(default)]
    pub padding: Shape,
}

impl Default for CutterConfig {
    fn default() -> Self {
        Self {
            container: Shape::new(512, 512),
            padding: Shape::default(),
        }
    }
}

impl CutterConfig {
    pub fn new(container: Shape) -> Self {
        Self {
            container,
            padding: Shape::default(),
        }
    }

    pub fn with_padding(mut self, padding: Shape) -> Self {
        self.padding = padding;
        self
    }

    /// Width and height of the content a tile contributes once the overlap is discounted.
    pub fn valid_shape(&self) -> Shape {
        let margin = self.padding.doubled();
        Shape::new(
            self.container.width.saturating_sub(margin.width),
            self.container.height.saturating_sub(margin.height),
        )
    }

    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - The container has a zero dimension
    /// - The container does not strictly contain twice the padding
    pub fn validate(&self) -> Result<()> {
        if self.container.width == 0 || self.container.height == 0 {
            return Err(CutterError::InvalidDimensions {
                width: self.container.width,
                height: self.container.height,
            });
        }
        if !self.container.contains(&self.padding.doubled()) {
            return Err(CutterError::InvalidConfig {
                container: self.container,
                padding: self.padding,
            });
        }
        Ok(())
    }

    /// Checks that a matrix is large enough to be cut with this padding.
    pub fn check_matrix<I: Debug>(&self, id: &I, shape: Shape) -> Result<()> {
        let min = self.padding.doubled();
        if !shape.contains(&min) {
            return Err(CutterError::MatrixTooSmall {
                id: format!("{id:?}"),
                shape,
                min,
            });
        }
        Ok(())
    }
}

/// Builder for `CutterConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct CutterConfigBuilder {
    cfg: CutterConfig,
}

impl CutterConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: CutterConfig::default(),
        }
    }
    pub fn container(mut self, w: u32, h: u32) -> Self {
        self.cfg.container = Shape::new(w, h);
        self
    }
    pub fn padding(mut self, w: u32, h: u32) -> Self {
        self.cfg.padding = Shape::new(w, h);
        self
    }
    pub fn build(self) -> CutterConfig {
        self.cfg
    }
}

impl CutterConfig {
    /// Create a fluent builder for `CutterConfig`.
    pub fn builder() -> CutterConfigBuilder {
        CutterConfigBuilder::new()
    }
}
