use thiserror::Error;

use crate::model::Shape;

#[derive(Debug, Error)]
pub enum CutterError {
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Container size {container} must be larger than twice the padding ({padding})")]
    InvalidConfig { container: Shape, padding: Shape },
    #[error("Matrix {id} is too small: {shape} must be larger than {min}")]
    MatrixTooSmall { id: String, shape: Shape, min: Shape },
    #[error("Piece {piece} does not fit into a {container} container")]
    PieceTooLarge { piece: Shape, container: Shape },
    #[error("Can't map a {piece} piece onto a {slot} slot")]
    ShapeMismatch { piece: Shape, slot: Shape },
}

pub type Result<T> = std::result::Result<T, CutterError>;
