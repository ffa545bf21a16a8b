//! Post-processing chain: FXAA, bloom and the final output pass.

pub mod bloom;
pub mod composer;
pub mod fxaa;
pub mod output;
pub mod screen_pass;

pub use composer::Composer;
