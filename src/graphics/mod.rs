use bevy::prelude::*;

mod galaxy_points;
mod points_material;

pub use galaxy_points::{GalaxyPoints, GalaxyPointsPlugin};
pub use points_material::GalaxyPointsMaterial;

pub struct GraphicsPlugin;

impl Plugin for GraphicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            MaterialPlugin::<GalaxyPointsMaterial>::default(),
            GalaxyPointsPlugin,
        ));
    }
}
