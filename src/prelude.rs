pub use crate::galaxy::{generate, GalaxyConfig, PointCloud, RegenerateGalaxy};
pub use crate::graphics::GalaxyPoints;
