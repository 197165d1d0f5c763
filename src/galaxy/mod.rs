mod galaxy_config;
mod generator;

pub use galaxy_config::{GalaxyConfig, GalaxyConfigPlugin, RegenerateGalaxy};
pub use generator::{generate, PointCloud};
