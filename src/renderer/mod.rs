//! Rendering: the instanced mesh pass, the post-processing passes, and the
//! dual pipeline that ties them together.

pub mod mesh_pass;
pub mod pipeline;
pub mod postprocess;

pub use pipeline::DualPipeline;
pub use postprocess::blend::BlendShaderSource;
