//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization (windowed or headless),
//! render targets, growable buffers, pipeline boilerplate, and shader
//! composition.

/// Growable GPU buffers with automatic reallocation.
pub mod dynamic_buffer;
/// Shared wgpu boilerplate helpers for screen-space post-process pipelines.
pub mod pipeline_helpers;
/// wgpu device, output, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Render-target textures.
pub mod texture;
