//! Click-to-toggle picking: pointer position to camera ray to front-most
//! mesh, whose bloom layer is then flipped.

mod ray;
mod raycaster;
mod toggle;

pub use ray::{Ray, ViewportRect};
pub use raycaster::{intersect_mesh, intersect_scene, Hit};
pub use toggle::{pick, toggle_bloom_at, Toggled};
