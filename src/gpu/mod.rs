//! GPU resource management utilities.
//!
//! Device/surface initialization, growable buffers, texture uploads,
//! pipeline boilerplate and shader composition.

/// Growable GPU buffers with automatic reallocation.
pub mod dynamic_buffer;
/// Shared wgpu boilerplate for layouts, samplers and screen pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Render targets and image uploads.
pub mod texture;
