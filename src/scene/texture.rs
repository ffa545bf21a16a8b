//! CPU-side image data for 2D textures and cubemaps.

/// RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixels (`width * height * 4` bytes).
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// A single-colour image.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let rgba = rgba.repeat((width * height) as usize);
        Self {
            width,
            height,
            rgba,
        }
    }

    /// 1×1 magenta image shown in place of textures that failed to load.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::solid(1, 1, [255, 0, 255, 255])
    }

    /// 1×1 white image, the neutral map for untextured materials.
    #[must_use]
    pub fn white() -> Self {
        Self::solid(1, 1, [255; 4])
    }

    /// Byte offset of pixel `(x, y)`.
    #[must_use]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let o = self.offset(x, y);
        self.rgba
            .get(o..o + 4)
            .and_then(|p| p.try_into().ok())
    }
}

/// Six square faces in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubemapData {
    /// Face edge length in pixels.
    pub size: u32,
    /// One RGBA8 face per layer.
    pub faces: [TextureData; 6],
}

impl CubemapData {
    /// Uniform grey cubemap used when the environment map is unavailable.
    #[must_use]
    pub fn placeholder() -> Self {
        let face = TextureData::solid(1, 1, [96, 96, 96, 255]);
        Self {
            size: 1,
            faces: std::array::from_fn(|_| face.clone()),
        }
    }

    /// Build from six faces, rejecting mismatched or non-square sizes.
    #[must_use]
    pub fn from_faces(faces: [TextureData; 6]) -> Option<Self> {
        let size = faces[0].width;
        let uniform = faces
            .iter()
            .all(|f| f.width == size && f.height == size);
        uniform.then_some(Self { size, faces })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_fills_every_pixel() {
        let tex = TextureData::solid(3, 2, [1, 2, 3, 4]);
        assert_eq!(tex.rgba.len(), 24);
        assert_eq!(tex.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(tex.pixel(3, 0), None);
    }

    #[test]
    fn cubemap_rejects_mismatched_faces() {
        let a = TextureData::solid(4, 4, [0; 4]);
        let b = TextureData::solid(2, 2, [0; 4]);
        let faces = [a.clone(), a.clone(), a.clone(), a.clone(), a, b];
        assert!(CubemapData::from_faces(faces).is_none());
    }
}
