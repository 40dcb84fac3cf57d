//! WebGPU rendering module
//!
//! The session is projected to coloured triangles in playfield space
//! (`shapes`), then mapped to clip space and drawn in one pass (`pipeline`).

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, playfield_to_ndc};
pub use shapes::session_vertices;
pub use vertex::Vertex;
