// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (default clippy thresholds)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Interactive 3D scene viewer with click-to-toggle selective bloom, built
//! on wgpu.
//!
//! A hub sphere and a cloud of satellites are drawn twice per frame: once
//! with every object that is not bloom-eligible blanked to black, producing
//! a glow layer through a multi-level Gaussian bloom, and once normally.
//! A host-supplied blend shader combines the two before tone mapping.
//! Clicking an object flips its eligibility.
//!
//! # Key entry points
//!
//! - [`viewer::Viewer`] - the context owning scene, camera, and pipelines
//! - [`scene::SceneGraph`] - objects, materials, and the bloom layer
//! - [`renderer::DualPipeline`] - bloom and composite sub-pipelines
//! - [`options::Options`] - runtime configuration with TOML presets
//! - `app::App` - winit window host (feature `viewer`)
//!
//! # Frame
//!
//! Each [`viewer::Viewer::tick`] updates the camera controls, blanks
//! non-eligible meshes through the [`scene::MaterialSwapCache`], renders
//! and submits the bloom sub-pipeline, restores every material, then
//! renders the composite sub-pipeline into the output.

#[cfg(feature = "viewer")]
pub mod app;
pub mod camera;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod options;
pub mod picking;
pub mod renderer;
pub mod scene;
pub mod viewer;

pub use error::HaloError;
pub use input::{InputEvent, MouseButton};
pub use renderer::BlendShaderSource;
pub use viewer::Viewer;
