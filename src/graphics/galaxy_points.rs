use super::GalaxyPointsMaterial;
use crate::prelude::*;
use bevy::{
    platform::time::Instant,
    prelude::*,
    render::{
        mesh::{Indices, PrimitiveTopology},
        render_asset::RenderAssetUsages,
        view::NoFrustumCulling,
    },
};

pub struct GalaxyPointsPlugin;

impl Plugin for GalaxyPointsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GalaxyPoints>()
            .add_systems(Update, regenerate_galaxy)
            .add_systems(Last, release_on_exit);
    }
}

#[derive(Component)]
pub struct GalaxyPointsMarker;

/// GPU-side resources backing the point cloud currently in the scene.
pub struct LivePoints {
    pub entity: Entity,
    pub mesh: Handle<Mesh>,
    pub material: Handle<GalaxyPointsMaterial>,
    pub count: usize,
}

/// Holds at most one attached point cloud. Replacing it always goes through
/// [`GalaxyPoints::release`] first.
#[derive(Resource, Default)]
pub struct GalaxyPoints {
    live: Option<LivePoints>,
}

impl GalaxyPoints {
    pub fn live(&self) -> Option<&LivePoints> {
        self.live.as_ref()
    }

    /// Detaches the live cloud and frees its mesh and material.
    /// Returns false if nothing was attached.
    pub fn release(
        &mut self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<GalaxyPointsMaterial>,
    ) -> bool {
        let Some(live) = self.live.take() else {
            return false;
        };
        commands.entity(live.entity).despawn();
        meshes.remove(&live.mesh);
        materials.remove(&live.material);
        debug!("Released galaxy of {} points", live.count);
        true
    }

    fn attach(
        &mut self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<GalaxyPointsMaterial>,
        cloud: &PointCloud,
        point_size: f32,
    ) {
        let mesh = meshes.add(point_cloud_mesh(cloud));
        let material = materials.add(GalaxyPointsMaterial::new(point_size));
        let entity = commands
            .spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::IDENTITY,
                // quads extend past the vertex aabb by half a point
                NoFrustumCulling,
                GalaxyPointsMarker,
            ))
            .id();

        self.live = Some(LivePoints {
            entity,
            mesh,
            material,
            count: cloud.len(),
        });
    }
}

/// Expands every point into a quad. All four vertices share the point's
/// position and color; the shader spreads them apart by `corner`.
pub fn point_cloud_mesh(cloud: &PointCloud) -> Mesh {
    const CORNERS: [[f32; 2]; 4] = [[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]];

    let vertex_count = cloud.len() * 4;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut corners = Vec::with_capacity(vertex_count);
    let mut colors = Vec::with_capacity(vertex_count);
    let mut indices = Vec::with_capacity(cloud.len() * 6);

    for (i, (position, color)) in cloud.positions.iter().zip(&cloud.colors).enumerate() {
        let base = (i * 4) as u32;
        for corner in CORNERS {
            positions.push(*position);
            corners.push(corner);
            colors.push([color[0], color[1], color[2], 1.0]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, corners)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
        .with_inserted_indices(Indices::U32(indices))
}

/// Replaces the live cloud once per frame in which any edit finished.
fn regenerate_galaxy(
    mut commands: Commands,
    mut requests: EventReader<RegenerateGalaxy>,
    mut galaxy_config: ResMut<GalaxyConfig>,
    mut galaxy_points: ResMut<GalaxyPoints>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<GalaxyPointsMaterial>>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    // old buffers go before new ones are built
    galaxy_points.release(&mut commands, &mut meshes, &mut materials);

    let config = galaxy_config.clamped();
    let started = Instant::now();
    let cloud = generate(&config);
    galaxy_points.attach(
        &mut commands,
        &mut meshes,
        &mut materials,
        &cloud,
        config.point_size,
    );

    galaxy_config.generation += 1;
    info!(
        "Generated galaxy #{}: {} points on {} arms in {:.1?}",
        galaxy_config.generation,
        cloud.len(),
        config.branches,
        started.elapsed()
    );
}

fn release_on_exit(
    mut commands: Commands,
    mut exit: EventReader<AppExit>,
    mut galaxy_points: ResMut<GalaxyPoints>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<GalaxyPointsMaterial>>,
) {
    if exit.is_empty() {
        return;
    }
    exit.clear();

    if galaxy_points.release(&mut commands, &mut meshes, &mut materials) {
        info!("Galaxy released on exit");
    }
}
