use bevy::prelude::*;

/// Generation parameters for the galaxy point cloud.
///
/// Edited by the control panel and read by the generator whenever a
/// [`RegenerateGalaxy`] event fires.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct GalaxyConfig {
    pub generation: i32,

    pub count: u32,
    pub point_size: f32,
    pub radius: f32,
    pub branches: u32,
    pub spin: f32,
    pub randomness: f32,
    pub randomness_power: f32,

    pub inside_color: Color,
    pub outside_color: Color,

    /// `None` gives a fresh cloud on every regeneration
    pub seed: Option<u64>,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            generation: 0,
            count: 70_000,
            point_size: 0.01,
            radius: 5.0,
            branches: 3,
            spin: 0.2,
            randomness: 0.2,
            randomness_power: 3.0,
            inside_color: Color::srgb_u8(0xff, 0x60, 0x30),
            outside_color: Color::srgb_u8(0x1b, 0x39, 0x84),
            seed: None,
        }
    }
}

impl GalaxyConfig {
    pub const MIN: Self = Self {
        generation: 0,
        count: 100,
        point_size: 0.001,
        radius: 0.01,
        branches: 2,
        spin: -5.0,
        randomness: 0.0,
        randomness_power: 1.0,
        inside_color: Color::BLACK,
        outside_color: Color::BLACK,
        seed: None,
    };
    pub const MAX: Self = Self {
        generation: 0,
        count: 100_000,
        point_size: 0.1,
        radius: 20.0,
        branches: 20,
        spin: 5.0,
        randomness: 2.0,
        randomness_power: 10.0,
        inside_color: Color::WHITE,
        outside_color: Color::WHITE,
        seed: None,
    };

    /// Copy of `self` with every numeric parameter forced into its valid range.
    pub fn clamped(&self) -> Self {
        let (min, max) = (&Self::MIN, &Self::MAX);
        Self {
            count: self.count.clamp(min.count, max.count),
            point_size: self.point_size.clamp(min.point_size, max.point_size),
            radius: self.radius.clamp(min.radius, max.radius),
            branches: self.branches.clamp(min.branches, max.branches),
            spin: self.spin.clamp(min.spin, max.spin),
            randomness: self.randomness.clamp(min.randomness, max.randomness),
            randomness_power: self
                .randomness_power
                .clamp(min.randomness_power, max.randomness_power),
            ..self.clone()
        }
    }
}

/// Fired once per completed parameter edit. Every firing replaces the live
/// cloud with a freshly generated one.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct RegenerateGalaxy;

pub struct GalaxyConfigPlugin;

impl Plugin for GalaxyConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GalaxyConfig>()
            .add_event::<RegenerateGalaxy>()
            .add_systems(Startup, request_initial_galaxy);
    }
}

fn request_initial_galaxy(mut regenerate: EventWriter<RegenerateGalaxy>) {
    regenerate.write(RegenerateGalaxy);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::color::ColorToPacked;

    #[test]
    fn defaults_match_initial_parameters() {
        let config = GalaxyConfig::default();
        assert_eq!(config.count, 70_000);
        assert_eq!(config.branches, 3);
        assert_eq!(config.radius, 5.0);
        assert_eq!(
            config.inside_color.to_srgba().to_u8_array_no_alpha(),
            [0xff, 0x60, 0x30]
        );
        assert_eq!(
            config.outside_color.to_srgba().to_u8_array_no_alpha(),
            [0x1b, 0x39, 0x84]
        );
        assert_eq!(config.seed, None);
    }

    #[test]
    fn defaults_are_already_in_range() {
        let config = GalaxyConfig::default();
        assert_eq!(config.clamped(), config);
    }

    #[test]
    fn clamped_pulls_values_into_range() {
        let config = GalaxyConfig {
            count: 5,
            point_size: 1.0,
            radius: -3.0,
            branches: 64,
            spin: -12.0,
            randomness: 9.0,
            randomness_power: 0.0,
            seed: Some(7),
            ..default()
        }
        .clamped();

        assert_eq!(config.count, 100);
        assert_eq!(config.point_size, 0.1);
        assert_eq!(config.radius, 0.01);
        assert_eq!(config.branches, 20);
        assert_eq!(config.spin, -5.0);
        assert_eq!(config.randomness, 2.0);
        assert_eq!(config.randomness_power, 1.0);
        // non-range fields pass through
        assert_eq!(config.seed, Some(7));
    }
}
