pub mod percent;
pub mod primitives;
