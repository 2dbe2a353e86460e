//! Post-processing passes.
//!
//! Provides the selective bloom chain, the host blend shader pass, and the
//! tone-mapping output pass.

pub mod blend;
pub mod bloom;
pub mod output;
pub mod screen_pass;
