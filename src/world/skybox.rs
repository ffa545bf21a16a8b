//! Procedural starfield cube and the nebula backdrop.

use std::sync::Arc;

use glam::Vec3;

use super::AssetBinder;
use crate::options::SceneOptions;
use crate::scene::{Material, MeshData, NodeId, Scene, Side, TextureData, Transform};
use crate::util::frames;
use crate::util::random::Dice;

const SKY_SIZE: f32 = 2000.0;
const SKY_SPIN: f32 = 0.0001;

/// Black image with `stars` white anti-aliased discs of radius `[0, 2)`
/// centred on random integer pixels.
#[must_use]
pub fn star_field(dice: &mut Dice, stars: u32, width: u32, height: u32) -> TextureData {
    let mut image = TextureData::solid(width, height, [0, 0, 0, 255]);
    for _ in 0..stars {
        let radius = dice.unit() * 2.0;
        let cx = (dice.unit() * image.width as f32).floor();
        let cy = (dice.unit() * image.height as f32).floor();
        paint_disc(&mut image, cx, cy, radius);
    }
    image
}

/// Composite a white disc over `image`, with one pixel of edge coverage.
fn paint_disc(image: &mut TextureData, cx: f32, cy: f32, radius: f32) {
    let reach = radius.ceil() as i64 + 1;
    let (x0, y0) = (cx as i64, cy as i64);
    for y in (y0 - reach)..=(y0 + reach) {
        for x in (x0 - reach)..=(x0 + reach) {
            if x < 0 || y < 0 || x >= i64::from(image.width) || y >= i64::from(image.height) {
                continue;
            }
            // Pixel centres sit at half-integers; disc centres on integers.
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let coverage = (radius - dx.hypot(dy) + 0.5).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }
            let o = image.offset(x as u32, y as u32);
            for c in &mut image.rgba[o..o + 3] {
                let v = f32::from(*c);
                *c = (v + (255.0 - v) * coverage).round() as u8;
            }
        }
    }
}

/// Star cube around everything, plus the nebula plane.
#[derive(Debug)]
pub struct Skybox {
    sky: NodeId,
}

impl Skybox {
    /// Paint the starfield and add the sky cube and nebula.
    pub fn new(
        scene: &mut Scene,
        assets: &mut AssetBinder<'_>,
        dice: &mut Dice,
        options: &SceneOptions,
    ) -> Self {
        let count = u32::try_from(options.star_count).unwrap_or(u32::MAX);
        let size = options.star_texture_size.max(1);
        let stars = star_field(dice, count, size, size);
        let map = scene.add_texture(Arc::new(stars), false);
        let material = scene.add_material(Material::basic().with_map(map).with_side(Side::Back));
        let cube = scene.add_mesh_data(Arc::new(MeshData::cube(SKY_SIZE)));
        let sky = scene.add_mesh(None, "sky", Transform::default(), cube, material);

        let nebula_map = assets.texture(scene, "nebula", false);
        let nebula_material = scene.add_material(
            Material::standard()
                .with_map(nebula_map)
                .with_metalness(1.0)
                .with_side(Side::Double)
                .with_opacity(0.7),
        );
        let plane = scene.add_mesh_data(Arc::new(MeshData::plane(100.0, 100.0)));
        let _ = scene.add_mesh(
            None,
            "nebula",
            Transform::at(Vec3::new(30.0, -50.0, -100.0)),
            plane,
            nebula_material,
        );

        log::debug!("starfield of {count} stars on {size}x{size} generated");
        Self { sky }
    }

    /// Slowly tumble the star cube.
    pub fn animate(&self, dt: f32, scene: &mut Scene) {
        let step = SKY_SPIN * frames(dt);
        let rotation = &mut scene.transform_mut(self.sky).rotation;
        rotation.x += step;
        rotation.y += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_pixels(image: &TextureData) -> usize {
        image.rgba.chunks(4).filter(|p| p[0] > 0).count()
    }

    #[test]
    fn star_field_is_black_with_white_stars() {
        let mut dice = Dice::new(Some(5));
        let image = star_field(&mut dice, 50, 128, 128);
        assert_eq!(image.rgba.len(), 128 * 128 * 4);
        let lit = lit_pixels(&image);
        assert!(lit > 0 && lit < 128 * 128 / 4);
        for p in image.rgba.chunks(4) {
            assert_eq!(p[0], p[1]);
            assert_eq!(p[1], p[2]);
            assert_eq!(p[3], 255);
        }
    }

    #[test]
    fn no_stars_stays_black() {
        let mut dice = Dice::new(Some(5));
        let image = star_field(&mut dice, 0, 16, 16);
        assert_eq!(lit_pixels(&image), 0);
    }

    #[test]
    fn disc_is_bright_at_centre_and_soft_at_edge() {
        let mut image = TextureData::solid(16, 16, [0, 0, 0, 255]);
        paint_disc(&mut image, 8.0, 8.0, 2.0);
        assert_eq!(image.pixel(8, 8).map(|p| p[0]), Some(255));
        let edge = image.pixel(9, 9).map_or(0, |p| p[0]);
        assert!(edge > 0 && edge < 255);
        assert_eq!(image.pixel(13, 8).map(|p| p[0]), Some(0));
    }

    #[test]
    fn discs_near_the_border_are_clipped() {
        let mut image = TextureData::solid(4, 4, [0, 0, 0, 255]);
        paint_disc(&mut image, 0.0, 0.0, 1.9);
        paint_disc(&mut image, 3.0, 3.0, 1.9);
        assert!(lit_pixels(&image) > 0);
    }

    #[test]
    fn same_seed_same_sky() {
        let a = star_field(&mut Dice::new(Some(9)), 20, 32, 32);
        let b = star_field(&mut Dice::new(Some(9)), 20, 32, 32);
        assert_eq!(a, b);
    }
}
