use super::camera::ViewerConfig;
use bevy::{prelude::*, window::PrimaryWindow};

/// Caps the window's pixel density. Camera aspect follows the window through
/// Bevy's own `camera_system`, which rebuilds the projection on resize.
pub struct ViewportPlugin;

impl Plugin for ViewportPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, cap_pixel_ratio);
    }
}

/// Override that keeps the rendered pixel density at or below `max`.
pub fn scale_factor_override(device_scale: f32, max: f32) -> Option<f32> {
    (device_scale > max).then_some(max)
}

fn cap_pixel_ratio(
    mut windows: Query<&mut Window, (With<PrimaryWindow>, Changed<Window>)>,
    viewer: Res<ViewerConfig>,
) {
    for mut window in &mut windows {
        let device_scale = window.resolution.base_scale_factor();
        let wanted = scale_factor_override(device_scale, viewer.max_pixel_ratio);

        // only write on a real change, or Changed<Window> fires every frame
        if window.resolution.scale_factor_override() != wanted {
            debug!(
                "Device scale {device_scale}, rendering at {}",
                wanted.unwrap_or(device_scale)
            );
            window.resolution.set_scale_factor_override(wanted);
        }
    }
}
