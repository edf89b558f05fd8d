pub mod level_set;

pub use level_set::{HalfSpace, LevelSet, Sphere};
