//! Image decoding into [`TextureData`] / [`CubemapData`].

use crate::scene::{CubemapData, TextureData};

use super::AssetError;

/// Decode a PNG or JPEG into RGBA8.
///
/// # Errors
///
/// Returns [`AssetError::Decode`] if the bytes are not a supported image.
pub fn decode_texture(name: &str, bytes: &[u8]) -> Result<TextureData, AssetError> {
    let image = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
        name: name.to_owned(),
        reason: e.to_string(),
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureData {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

/// Decode six face images into a cubemap.
///
/// # Errors
///
/// Returns [`AssetError::Decode`] if there are not exactly six faces, a face
/// fails to decode, or the faces are not equally sized squares.
pub fn decode_cubemap(name: &str, faces: &[Vec<u8>]) -> Result<CubemapData, AssetError> {
    let decode_error = |reason: String| AssetError::Decode {
        name: name.to_owned(),
        reason,
    };
    let decoded = faces
        .iter()
        .map(|bytes| decode_texture(name, bytes))
        .collect::<Result<Vec<_>, _>>()?;
    let faces: [TextureData; 6] = decoded
        .try_into()
        .map_err(|v: Vec<_>| decode_error(format!("expected 6 faces, got {}", v.len())))?;
    CubemapData::from_faces(faces)
        .ok_or_else(|| decode_error("faces are not equally sized squares".to_owned()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn png_decodes_to_rgba() {
        let tex = decode_texture("t", &png(3, 2)).unwrap();
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(tex.pixel(1, 1), Some([10, 20, 30, 255]));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_texture("bad", b"not an image").unwrap_err();
        assert!(matches!(err, AssetError::Decode { ref name, .. } if name == "bad"));
    }

    #[test]
    fn cubemap_needs_six_square_faces() {
        let square = png(4, 4);
        let faces = vec![square.clone(); 6];
        assert_eq!(decode_cubemap("c", &faces).unwrap().size, 4);
        assert!(decode_cubemap("c", &faces[..5]).is_err());
        let mut mixed = faces;
        mixed[2] = png(4, 2);
        assert!(decode_cubemap("c", &mixed).is_err());
    }
}
