//! Vertex layout and palette for the playfield

use bytemuck::{Pod, Zeroable};

/// Coloured vertex, in playfield pixels until `RenderState::render` maps it to NDC
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const SHIP_HULL: [f32; 4] = [0.75, 0.8, 0.9, 1.0];
    pub const SHIP_COCKPIT: [f32; 4] = [0.3, 0.7, 1.0, 1.0];
    pub const SHIP_FLAME: [f32; 4] = [1.0, 0.6, 0.1, 1.0];
    pub const SHIP_WRECKED: [f32; 4] = [0.8, 0.15, 0.1, 1.0];
    pub const METEOR: [f32; 4] = [0.55, 0.4, 0.3, 1.0];
    pub const METEOR_CRATER: [f32; 4] = [0.38, 0.27, 0.2, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
}
