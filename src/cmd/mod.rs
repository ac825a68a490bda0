pub mod estimate;
pub mod solve;
