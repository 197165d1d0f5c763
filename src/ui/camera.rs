use bevy::{
    input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
    window::PrimaryWindow,
};
use bevy_egui::EguiContexts;
use std::f32::consts::{FRAC_PI_2, TAU};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewerConfig>()
            .add_systems(Startup, spawn_camera)
            .add_systems(Update, camera_control_system);
    }
}

/// Camera and viewport settings fixed at startup.
#[derive(Resource, Clone, Debug)]
pub struct ViewerConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub start_position: Vec3,
    /// share of the pending orbit motion applied each frame
    pub damping: f32,
    pub max_pixel_ratio: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            start_position: Vec3::splat(3.0),
            damping: 0.05,
            max_pixel_ratio: 2.0,
        }
    }
}

fn spawn_camera(mut commands: Commands, mut clearcolor: ResMut<ClearColor>, viewer: Res<ViewerConfig>) {
    *clearcolor = ClearColor(Color::BLACK);
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: viewer.fov_degrees.to_radians(),
            near: viewer.near,
            far: viewer.far,
            ..default()
        }),
        Transform::from_translation(viewer.start_position).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCamera::looking_from(viewer.start_position, Vec3::ZERO),
    ));
}

const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;
const MIN_DISTANCE: f32 = 0.2;
const MAX_DISTANCE: f32 = 60.0;

/// Orbit-style camera rig. Input is buffered into pending motion that is
/// drained a little every frame, so movement eases out after release.
#[derive(Component, Clone, Debug)]
pub struct OrbitCamera {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,

    pending_yaw: f32,
    pending_pitch: f32,
    // in log-distance units
    pending_zoom: f32,
    pending_pan: Vec3,
}

impl OrbitCamera {
    pub fn looking_from(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let distance = offset.length().max(MIN_DISTANCE);
        Self {
            target,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
            pending_pan: Vec3::ZERO,
        }
    }

    pub fn translation(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + vec3(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.translation()).looking_at(self.target, Vec3::Y)
    }

    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.pending_yaw += yaw;
        self.pending_pitch += pitch;
    }

    /// Positive zooms in.
    pub fn zoom(&mut self, amount: f32) {
        self.pending_zoom -= amount;
    }

    pub fn pan(&mut self, offset: Vec3) {
        self.pending_pan += offset;
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Applies `damping` of the pending motion and keeps the rest for later frames.
    pub fn step(&mut self, damping: f32) {
        let yaw = self.pending_yaw * damping;
        let pitch = self.pending_pitch * damping;
        let zoom = self.pending_zoom * damping;
        let pan = self.pending_pan * damping;

        self.pending_yaw -= yaw;
        self.pending_pitch -= pitch;
        self.pending_zoom -= zoom;
        self.pending_pan -= pan;

        self.yaw += yaw;
        self.pitch = (self.pitch + pitch).clamp(-MAX_PITCH, MAX_PITCH);
        self.distance = (self.distance * zoom.exp()).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.target += pan;
    }
}

pub fn camera_control_system(
    mut query: Query<(&mut Transform, &Projection, &mut OrbitCamera)>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut motion_evr: EventReader<MouseMotion>,
    mut scroll_evr: EventReader<MouseWheel>,
    viewer: Res<ViewerConfig>,
    mut contexts: EguiContexts,
) {
    let ctx = contexts.ctx_mut();
    let over_panel = ctx.wants_pointer_input() || ctx.is_pointer_over_area();

    let drag: Vec2 = motion_evr.read().map(|ev| ev.delta).sum();
    let mut scroll = 0.0;
    for ev in scroll_evr.read() {
        scroll += match ev.unit {
            MouseScrollUnit::Line => ev.y * 0.1,
            MouseScrollUnit::Pixel => ev.y * 0.002,
        };
    }

    let Ok((mut transform, projection, mut orbit)) = query.single_mut() else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let height = window.height().max(1.0);

    if !over_panel {
        if mouse_buttons.pressed(MouseButton::Left) {
            // a drag across the full window height turns the camera once around
            orbit.rotate(-TAU * drag.x / height, TAU * drag.y / height);
        } else if mouse_buttons.any_pressed([MouseButton::Right, MouseButton::Middle]) {
            let fov = match projection {
                Projection::Perspective(perspective) => perspective.fov,
                _ => viewer.fov_degrees.to_radians(),
            };
            let units_per_pixel = 2.0 * orbit.distance() * (fov * 0.5).tan() / height;
            let offset = (transform.left() * drag.x + transform.up() * drag.y) * units_per_pixel;
            orbit.pan(offset);
        }
        orbit.zoom(scroll);
    }

    orbit.step(viewer.damping);
    *transform = orbit.transform();
}
