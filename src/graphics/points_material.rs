use bevy::{
    pbr::{MaterialPipeline, MaterialPipelineKey},
    prelude::*,
    reflect::TypePath,
    render::{
        mesh::MeshVertexBufferLayoutRef,
        render_resource::{
            AsBindGroup, RenderPipelineDescriptor, ShaderRef, ShaderType,
            SpecializedMeshPipelineError,
        },
    },
};
use bytemuck::{Pod, Zeroable};

const SHADER_ASSET_PATH: &str = "shaders/galaxy_points.wgsl";

// Duplicated in galaxy_points.wgsl, keep both in sync
#[derive(ShaderType, Pod, Zeroable, Clone, Copy, Debug, Default)]
#[repr(C)]
pub struct PointsParams {
    /// world space edge length of one point
    pub point_size: f32,
}

/// Camera facing, additively blended points with per-vertex color.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct GalaxyPointsMaterial {
    #[uniform(0)]
    pub params: PointsParams,
}

impl GalaxyPointsMaterial {
    pub fn new(point_size: f32) -> Self {
        Self {
            params: PointsParams { point_size },
        }
    }
}

impl Material for GalaxyPointsMaterial {
    fn vertex_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(2),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];

        // overlapping points must all contribute
        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = false;
        }
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}
