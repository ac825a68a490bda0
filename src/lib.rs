pub mod config;
pub mod error;
pub mod estimate;
pub mod grid;
pub mod packer;
pub mod puzzle;
pub mod shape;

pub use error::{PackError, PackResult};
pub use grid::Grid;
pub use packer::{can_pack, AttemptResult, CancelToken, PackOutcome, Packer, Placement};
pub use shape::{rotations, RotationSet, Shape};
