use crate::prelude::*;
use bevy::{color::ColorToPacked, prelude::*};
use bevy_egui::{egui, EguiContexts};

pub struct ConfigEguiPlugin;

impl Plugin for ConfigEguiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, configure_visuals_system)
            .add_systems(Update, ui_system);
    }
}

fn configure_visuals_system(mut contexts: EguiContexts) {
    contexts.ctx_mut().set_visuals(egui::Visuals {
        window_corner_radius: 0.0.into(),
        ..egui::Visuals::dark()
    });
}

/// Turns per-frame widget changes into one "edit finished" signal.
///
/// A change marks the edit as pending; it is committed on the first frame
/// no pointer button is held, so a slider drag fires once on release.
#[derive(Default)]
struct EditTracker {
    pending: bool,
}

impl EditTracker {
    fn update(&mut self, changed: bool, pointer_down: bool) -> bool {
        self.pending |= changed;
        if self.pending && !pointer_down {
            self.pending = false;
            return true;
        }
        false
    }
}

fn color_ui(color: &mut Color, label: &str, ui: &mut egui::Ui) -> bool {
    let mut rgb = color.to_srgba().to_u8_array_no_alpha();
    let changed = ui
        .horizontal(|ui| {
            let changed = ui.color_edit_button_srgb(&mut rgb).changed();
            ui.label(label);
            changed
        })
        .inner;

    if changed {
        *color = Color::srgb_u8(rgb[0], rgb[1], rgb[2]);
    }
    changed
}

// DragValue edits through f64, keep seeds exactly representable
const MAX_SEED: u64 = u32::MAX as u64;

fn fresh_seed() -> u64 {
    u64::from(rand::random::<u32>())
}

fn seed_ui(seed: &mut Option<u64>, ui: &mut egui::Ui) -> bool {
    let mut fixed = seed.is_some();
    let mut changed = ui.checkbox(&mut fixed, "Fixed seed").changed();
    if changed {
        *seed = fixed.then(fresh_seed);
    }
    if let Some(value) = seed.as_mut() {
        changed |= ui
            .add(
                egui::DragValue::new(value)
                    .range(0..=MAX_SEED)
                    .prefix("seed "),
            )
            .changed();
    }
    changed
}

fn ui_system(
    mut contexts: EguiContexts,
    mut galaxy_config: ResMut<GalaxyConfig>,
    galaxy_points: Res<GalaxyPoints>,
    mut edits: Local<EditTracker>,
    mut regenerate: EventWriter<RegenerateGalaxy>,
) {
    let ctx = contexts.ctx_mut();

    let minval = GalaxyConfig::MIN;
    let maxval = GalaxyConfig::MAX;

    // widgets edit a copy so idle frames leave change detection alone
    let mut config = galaxy_config.clone();
    let mut changed = false;

    egui::SidePanel::right("galaxy_panel")
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.heading("Galaxy");

            changed |= ui
                .add(
                    egui::Slider::new(&mut config.count, minval.count..=maxval.count)
                        .step_by(100.0)
                        .text("Count"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(
                        &mut config.point_size,
                        minval.point_size..=maxval.point_size,
                    )
                    .step_by(0.001)
                    .text("Size"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut config.radius, minval.radius..=maxval.radius)
                        .step_by(0.01)
                        .text("Radius"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut config.branches, minval.branches..=maxval.branches)
                        .text("Branches"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut config.spin, minval.spin..=maxval.spin)
                        .step_by(0.001)
                        .text("Spin"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(
                        &mut config.randomness,
                        minval.randomness..=maxval.randomness,
                    )
                    .step_by(0.001)
                    .text("Randomness"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(
                        &mut config.randomness_power,
                        minval.randomness_power..=maxval.randomness_power,
                    )
                    .step_by(0.01)
                    .text("Randomness Power"),
                )
                .changed();

            ui.separator();
            changed |= color_ui(&mut config.inside_color, "Inside Color", ui);
            changed |= color_ui(&mut config.outside_color, "Outside Color", ui);

            ui.separator();
            changed |= seed_ui(&mut config.seed, ui);

            ui.separator();
            let points = galaxy_points.live().map_or(0, |live| live.count);
            ui.label(format!("Points: {points}"));
            ui.label(format!("Generation: {}", config.generation));
        });

    if changed {
        *galaxy_config = config;
    }

    let pointer_down = ctx.input(|i| i.pointer.any_down());
    if edits.update(changed, pointer_down) {
        regenerate.write(RegenerateGalaxy);
    }
}
