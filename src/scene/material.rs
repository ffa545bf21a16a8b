//! Surface descriptions consumed by the mesh pass.

use glam::{Vec2, Vec3};

use super::{CubemapHandle, TextureHandle};

/// Which faces are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Counter-clockwise faces only.
    #[default]
    Front,
    /// Clockwise faces only (seen from inside).
    Back,
    /// Both.
    Double,
}

/// Color blending against the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Blending {
    /// Standard alpha blending (or opaque when the material is not
    /// transparent).
    #[default]
    Normal,
    /// `src * alpha + dst`.
    Additive,
}

/// Lighting model and its model-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Shading {
    /// Metal/roughness surface lit by scene lights and the env map.
    Standard,
    /// Diffuse-only surface.
    Lambert,
    /// Unlit color × map.
    Basic,
    /// Animated cloud/lava planet surface with its own exp2 fog.
    Planet {
        /// Noise texture that distorts the surface lookup.
        cloud: TextureHandle,
        /// Surface color texture.
        surface: TextureHandle,
        /// Animation clock.
        time: f32,
        /// Exp2 fog density applied by depth.
        fog_density: f32,
        /// UV multiplier.
        uv_scale: Vec2,
    },
    /// Fresnel rim shell: `color * pow(c - dot(n, v), p)`.
    Glow {
        /// Rim offset.
        c: f32,
        /// Rim falloff exponent.
        p: f32,
        /// Reference view direction in world space.
        view_vector: Vec3,
    },
}

/// A material shared by any number of mesh nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Lighting model.
    pub shading: Shading,
    /// Base color (multiplied with the map).
    pub color: [f32; 3],
    /// Emissive color added after lighting.
    pub emissive: [f32; 3],
    /// Color map.
    pub map: Option<TextureHandle>,
    /// Reflection cubemap.
    pub env_map: Option<CubemapHandle>,
    /// Metalness in `[0, 1]`.
    pub metalness: f32,
    /// Roughness in `[0, 1]`.
    pub roughness: f32,
    /// Alpha multiplier, only honoured when `transparent`.
    pub opacity: f32,
    /// Draw in the blended pass, sorted back to front.
    pub transparent: bool,
    /// Face culling.
    pub side: Side,
    /// Blend mode.
    pub blending: Blending,
    /// Faceted normals from screen-space derivatives.
    pub flat: bool,
    /// Whether scene fog applies.
    pub fog: bool,
    /// UV translation applied before sampling the map.
    pub uv_offset: Vec2,
    /// UV rotation (radians) about the texture centre.
    pub uv_rotation: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shading: Shading::Standard,
            color: [1.0; 3],
            emissive: [0.0; 3],
            map: None,
            env_map: None,
            metalness: 0.0,
            roughness: 1.0,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            blending: Blending::Normal,
            flat: false,
            fog: true,
            uv_offset: Vec2::ZERO,
            uv_rotation: 0.0,
        }
    }
}

impl Material {
    /// Metal/roughness material.
    #[must_use]
    pub fn standard() -> Self {
        Self::default()
    }

    /// Diffuse-only material.
    #[must_use]
    pub fn lambert() -> Self {
        Self {
            shading: Shading::Lambert,
            ..Self::default()
        }
    }

    /// Unlit material.
    #[must_use]
    pub fn basic() -> Self {
        Self {
            shading: Shading::Basic,
            ..Self::default()
        }
    }

    /// Set the base color from `0xRRGGBB`.
    #[must_use]
    pub fn with_color(mut self, hex: u32) -> Self {
        self.color = crate::util::rgb(hex);
        self
    }

    /// Set the color map.
    #[must_use]
    pub fn with_map(mut self, map: TextureHandle) -> Self {
        self.map = Some(map);
        self
    }

    /// Set the reflection cubemap.
    #[must_use]
    pub fn with_env_map(mut self, env: CubemapHandle) -> Self {
        self.env_map = Some(env);
        self
    }

    /// Set metalness.
    #[must_use]
    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness;
        self
    }

    /// Set face culling.
    #[must_use]
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Mark transparent with the given opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.transparent = true;
        self.opacity = opacity;
        self
    }

    /// Set the blend mode.
    #[must_use]
    pub fn with_blending(mut self, blending: Blending) -> Self {
        self.blending = blending;
        self
    }

    /// Use faceted normals.
    #[must_use]
    pub fn with_flat_shading(mut self) -> Self {
        self.flat = true;
        self
    }

    /// Whether this material writes depth (opaque materials only).
    #[must_use]
    pub fn writes_depth(&self) -> bool {
        !self.transparent
    }
}
