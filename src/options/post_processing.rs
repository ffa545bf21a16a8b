use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Anti-aliasing, bloom and tone parameters of the composer.
pub struct PostProcessingOptions {
    /// Run the FXAA pass.
    pub fxaa: bool,
    /// Linear multiplier applied by the output pass before encoding.
    pub exposure: f32,
    /// Luminance above which pixels bloom.
    pub bloom_threshold: f32,
    /// Soft knee width around the threshold.
    pub bloom_smooth_width: f32,
    /// Bloom multiplier.
    pub bloom_strength: f32,
    /// Mix between tight (0) and wide (1) bloom.
    pub bloom_radius: f32,
}

impl Default for PostProcessingOptions {
    fn default() -> Self {
        Self {
            fxaa: true,
            exposure: 1.0,
            bloom_threshold: 0.7,
            bloom_smooth_width: 0.01,
            bloom_strength: 5.74,
            bloom_radius: 0.0,
        }
    }
}
