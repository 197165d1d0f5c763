use super::GalaxyConfig;
use bevy::color::Mix;
use bevy::prelude::*;
use rand::prelude::*;
use rayon::prelude::*;
use std::f32::consts::TAU;

/// Points per parallel work unit. Each chunk owns its own RNG.
const CHUNK_SIZE: usize = 4096;

/// Positions and linear RGB colors of every point, index aligned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

/// Linear interpolation between the core color and the rim color.
#[derive(Clone, Copy, Debug)]
pub struct ColorRamp {
    inside: LinearRgba,
    outside: LinearRgba,
}

impl ColorRamp {
    pub fn new(inside: Color, outside: Color) -> Self {
        Self {
            inside: inside.to_linear(),
            outside: outside.to_linear(),
        }
    }

    /// `t = 0` is the center of the galaxy, `t = 1` the outer edge
    pub fn at(&self, t: f32) -> [f32; 3] {
        let color = self.inside.mix(&self.outside, t);
        [color.red, color.green, color.blue]
    }
}

/// Base angle of the arm that point `index` belongs to.
///
/// Arms are assigned round-robin so each arm receives `count / branches`
/// points (plus at most one).
pub fn branch_angle(index: usize, branches: u32) -> f32 {
    let branches = branches as usize;
    (index % branches) as f32 / branches as f32 * TAU
}

/// Signed offset in `[-1, 1]`. Higher `power` pulls samples toward zero,
/// giving tight arms with the occasional straggler.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, power: f32) -> f32 {
    let magnitude = rng.random::<f32>().powf(power);
    if rng.random_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

/// Samples a fresh spiral galaxy from `config`.
///
/// Without a seed every call produces a different cloud with the same
/// structure. With a seed the result depends only on the config.
/// Ranges are not checked here; pass a [`GalaxyConfig::clamped`] config.
pub fn generate(config: &GalaxyConfig) -> PointCloud {
    let count = config.count as usize;
    let ramp = ColorRamp::new(config.inside_color, config.outside_color);

    let mut cloud = PointCloud {
        positions: vec![[0.0; 3]; count],
        colors: vec![[0.0; 3]; count],
    };

    cloud
        .positions
        .par_chunks_mut(CHUNK_SIZE)
        .zip(cloud.colors.par_chunks_mut(CHUNK_SIZE))
        .enumerate()
        .for_each(|(chunk, (positions, colors))| {
            let first_index = chunk * CHUNK_SIZE;
            match config.seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(chunk_seed(seed, chunk));
                    fill_points(config, &ramp, first_index, positions, colors, &mut rng);
                }
                None => {
                    let mut rng = rand::rng();
                    fill_points(config, &ramp, first_index, positions, colors, &mut rng);
                }
            }
        });

    cloud
}

fn chunk_seed(seed: u64, chunk: usize) -> u64 {
    seed.wrapping_add((chunk as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn fill_points<R: Rng + ?Sized>(
    config: &GalaxyConfig,
    ramp: &ColorRamp,
    first_index: usize,
    positions: &mut [[f32; 3]],
    colors: &mut [[f32; 3]],
    rng: &mut R,
) {
    for (offset, (position, color)) in positions.iter_mut().zip(colors.iter_mut()).enumerate() {
        let index = first_index + offset;

        // linear in r rather than area-uniform, so the core is denser
        let radius = rng.random::<f32>() * config.radius;
        let angle = branch_angle(index, config.branches) + radius * config.spin;

        let scatter = vec3(
            jitter(rng, config.randomness_power),
            jitter(rng, config.randomness_power),
            jitter(rng, config.randomness_power),
        );

        *position = [
            angle.cos() * radius + scatter.x,
            scatter.y,
            angle.sin() * radius + scatter.z,
        ];
        *color = ramp.at(radius / config.radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::SQRT_2;

    fn seeded(count: u32, seed: u64) -> GalaxyConfig {
        GalaxyConfig {
            count,
            seed: Some(seed),
            ..default()
        }
    }

    fn assert_close(a: [f32; 3], b: [f32; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn one_color_per_point() {
        for count in [9, 100, 4097, 70_000] {
            let cloud = generate(&GalaxyConfig {
                count,
                ..default()
            });
            assert_eq!(cloud.len(), count as usize);
            assert_eq!(cloud.colors.len(), count as usize);
        }
    }

    #[test]
    fn points_stay_within_radius_plus_jitter() {
        let config = GalaxyConfig {
            radius: 5.0,
            randomness_power: 1.0,
            ..seeded(20_000, 11)
        };
        let cloud = generate(&config);

        for [x, y, z] in &cloud.positions {
            let xz = (x * x + z * z).sqrt();
            assert!(xz <= config.radius + SQRT_2 + 1e-4, "xz distance {xz}");
            assert!(y.abs() <= 1.0);
        }
    }

    #[test]
    fn branch_angle_repeats_every_branch() {
        let branches = 3;
        for i in 0..6 {
            assert_eq!(branch_angle(i, branches), branch_angle(i + 3, branches));
        }
        assert_eq!(branch_angle(0, branches), 0.0);
        assert!((branch_angle(1, branches) - TAU / 3.0).abs() < 1e-6);
        assert!((branch_angle(2, branches) - 2.0 * TAU / 3.0).abs() < 1e-6);
    }

    #[test]
    fn arms_receive_equal_share() {
        let branches = 4;
        let mut per_arm = [0usize; 4];
        for i in 0..10 {
            let arm = (branch_angle(i, branches) / TAU * branches as f32).round() as usize;
            per_arm[arm] += 1;
        }
        assert_eq!(per_arm, [3, 3, 2, 2]);
    }

    #[test]
    fn color_ramp_endpoints() {
        let config = GalaxyConfig::default();
        let ramp = ColorRamp::new(config.inside_color, config.outside_color);

        let inside = config.inside_color.to_linear();
        let outside = config.outside_color.to_linear();
        assert_close(ramp.at(0.0), [inside.red, inside.green, inside.blue]);
        assert_close(ramp.at(1.0), [outside.red, outside.green, outside.blue]);
    }

    #[test]
    fn colors_are_normalized() {
        let cloud = generate(&seeded(5_000, 3));
        for color in &cloud.colors {
            assert!(color.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn higher_power_tightens_jitter() {
        let mut rng = StdRng::seed_from_u64(5);
        let mean_abs = |rng: &mut StdRng, power: f32| {
            (0..10_000).map(|_| jitter(rng, power).abs()).sum::<f32>() / 10_000.0
        };

        let loose = mean_abs(&mut rng, 1.0);
        let tight = mean_abs(&mut rng, 10.0);
        // expected means are 1/2 and 1/11
        assert!((loose - 0.5).abs() < 0.05, "{loose}");
        assert!(tight < 0.15, "{tight}");
    }

    #[test]
    fn jitter_takes_both_signs() {
        let mut rng = StdRng::seed_from_u64(9);
        let samples: Vec<f32> = (0..1_000).map(|_| jitter(&mut rng, 3.0)).collect();
        assert!(samples.iter().any(|s| *s > 0.0));
        assert!(samples.iter().any(|s| *s < 0.0));
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn same_seed_same_cloud() {
        let a = generate(&seeded(10_000, 42));
        let b = generate(&seeded(10_000, 42));
        assert_eq!(a, b);

        let c = generate(&seeded(10_000, 43));
        assert_ne!(a.positions, c.positions);
    }

    /// Large radius and tight jitter so the spiral dominates the scatter.
    fn spiral(count: u32, seed: Option<u64>) -> GalaxyConfig {
        GalaxyConfig {
            count,
            radius: 20.0,
            branches: 3,
            spin: 0.3,
            randomness_power: 10.0,
            seed,
            ..default()
        }
    }

    fn angle_between(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    /// Arm a point lies on, or `None` when it sits too close to the core
    /// for jitter to be told apart from arm spacing.
    fn arm_of(position: [f32; 3], config: &GalaxyConfig) -> Option<usize> {
        let [x, _, z] = position;
        let r = x.hypot(z);
        if r < 6.0 {
            return None;
        }
        let base = (z.atan2(x) - r * config.spin).rem_euclid(TAU);
        let spacing = TAU / config.branches as f32;
        Some((base / spacing).round() as usize % config.branches as usize)
    }

    #[test]
    fn points_follow_their_arm() {
        let config = spiral(3_000, Some(17));
        let cloud = generate(&config);

        // xz jitter is at most sqrt(2): it bounds both the angular error and
        // the error in the recovered radius
        for (i, [x, _, z]) in cloud.positions.iter().enumerate() {
            let r = x.hypot(*z);
            if r < 4.0 {
                continue;
            }
            let expected = branch_angle(i, config.branches) + r * config.spin;
            let tolerance = (SQRT_2 / (r - SQRT_2)).asin() + config.spin * SQRT_2 + 1e-3;
            let error = angle_between(z.atan2(*x), expected);
            assert!(error <= tolerance, "point {i}: off by {error}, allowed {tolerance}");
        }
    }

    #[test]
    fn color_tracks_distance_from_center() {
        let config = spiral(3_000, Some(23));
        let cloud = generate(&config);
        let ramp = ColorRamp::new(config.inside_color, config.outside_color);

        let inside = ramp.at(0.0);
        let outside = ramp.at(1.0);
        let slack = SQRT_2 / config.radius;

        for (i, ([x, _, z], color)) in cloud.positions.iter().zip(&cloud.colors).enumerate() {
            let t = (x.hypot(*z) / config.radius).min(1.0);
            let expected = ramp.at(t);
            for c in 0..3 {
                let allowed = (outside[c] - inside[c]).abs() * slack + 1e-4;
                let error = (color[c] - expected[c]).abs();
                assert!(error <= allowed, "point {i} channel {c}: off by {error}");
            }
        }
    }

    #[test]
    fn arm_assignment_repeats_every_branch() {
        let config = spiral(3_000, Some(29));
        let cloud = generate(&config);
        let branches = config.branches as usize;

        let mut checked = 0;
        for i in 0..cloud.len() - branches {
            let (Some(a), Some(b)) = (
                arm_of(cloud.positions[i], &config),
                arm_of(cloud.positions[i + branches], &config),
            ) else {
                continue;
            };
            assert_eq!(a, b, "points {i} and {}", i + branches);
            assert_eq!(a, i % branches);
            checked += 1;
        }
        assert!(checked > 1_000);
    }

    #[test]
    fn unseeded_clouds_share_structure_not_values() {
        let config = spiral(9_000, None);
        let a = generate(&config);
        let b = generate(&config);

        assert_eq!(a.len(), b.len());
        assert_ne!(a.positions, b.positions);

        for cloud in [&a, &b] {
            for (i, position) in cloud.positions.iter().enumerate() {
                if let Some(arm) = arm_of(*position, &config) {
                    assert_eq!(arm, i % config.branches as usize, "point {i}");
                }
            }
        }
    }
}
