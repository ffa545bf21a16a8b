//! HUD panels pinned to points on the bridge, and the rotating hologram.
//!
//! Panels are screen-space rectangles that follow world anchors through the
//! bridge camera. The two bottom panels scroll random alien text; the main
//! panel only frames the view. From any other camera the HUD is hidden.

use std::collections::VecDeque;

use glam::{Vec2, Vec3};

use super::AssetBinder;
use crate::camera::{CameraRig, CameraSlot};
use crate::renderer::TextBlock;
use crate::scene::{Material, MaterialHandle, NodeId, Scene, Side, Transform};
use crate::util::frames;
use crate::util::random::Dice;

/// Reference viewport height the panel heights were laid out against.
const LAYOUT_HEIGHT: f32 = 731.0;
const BOTTOM_HEIGHT: f32 = 60.0;
const MAIN_HEIGHT: f32 = 405.0;
/// Bottom panel width as a share of the viewport width.
const BOTTOM_WIDTH: f32 = 0.25;

const MAX_LINES: usize = 10;
const NEW_LINE_ODDS: u32 = 11;

const PROJECTION_SPIN_DEGREES: f32 = 1.0;
const PROJECTION_OPACITY: f32 = 0.5;

/// Pool of alien strings shared by every panel.
///
/// Starts with blank lines so the panels scroll in gradually; grows with
/// fresh random strings until it is full, then recycles.
#[derive(Debug, Clone)]
pub struct AlienText {
    pool: Vec<String>,
}

impl AlienText {
    /// Blank lines the pool starts with.
    pub const BLANKS: usize = 20;
    /// Pool size after which strings are reused.
    pub const CAPACITY: usize = 100;
    /// Longest generated string.
    pub const MAX_CHARS: f32 = 25.0;

    /// A pool holding only the starting blank lines.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: vec![String::new(); Self::BLANKS],
        }
    }

    /// Next line to show.
    #[must_use]
    pub fn next_line(&mut self, dice: &mut Dice) -> String {
        if self.pool.len() < Self::CAPACITY {
            let len = (dice.unit() * Self::MAX_CHARS).ceil() as usize;
            let line: String = (0..len)
                .map(|_| char::from(b'a' + dice.index(26) as u8))
                .collect();
            self.pool.push(line.clone());
            line
        } else {
            self.pool[dice.index(self.pool.len())].clone()
        }
    }

    /// Number of strings in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether the pool holds no strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

impl Default for AlienText {
    fn default() -> Self {
        Self::new()
    }
}

/// Screen rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width, never negative.
    pub width: f32,
    /// Height.
    pub height: f32,
}

#[derive(Debug)]
struct Panel {
    name: &'static str,
    anchor: NodeId,
    /// Second anchor whose projected x gives the right edge.
    width_anchor: Option<NodeId>,
    layout_height: f32,
    lines: Option<VecDeque<String>>,
}

impl Panel {
    fn rect(&self, scene: &Scene, rig: &CameraRig, size: Vec2) -> PanelRect {
        let at = rig.project(scene, scene.world_position(self.anchor), size);
        let width = match self.width_anchor {
            Some(edge) => rig.project(scene, scene.world_position(edge), size).x - at.x,
            None => size.x * BOTTOM_WIDTH,
        };
        PanelRect {
            left: at.x,
            top: at.y,
            width: width.max(0.0),
            height: self.layout_height / LAYOUT_HEIGHT * size.y,
        }
    }

    /// Append `line`, recycling the oldest once full.
    fn push_line(lines: &mut VecDeque<String>, line: String) {
        if lines.len() == MAX_LINES {
            let _ = lines.pop_front();
        }
        lines.push_back(line);
    }
}

/// The three HUD panels, their scrolling text and the hologram projector.
#[derive(Debug)]
pub struct Panels {
    slots: Vec<Panel>,
    text: AlienText,
    projection: MaterialHandle,
}

impl Panels {
    /// Place the panel anchors and the hologram on the bridge.
    pub fn new(scene: &mut Scene, assets: &mut AssetBinder<'_>) -> Self {
        let anchor =
            |scene: &mut Scene, name: &str, at: Vec3| scene.add_group(None, name, Transform::at(at));
        let left = anchor(scene, "panel leftbottom", Vec3::new(-1.0, 0.0, 1.3));
        let right = anchor(scene, "panel rightbottom", Vec3::new(0.2, 0.0, 1.3));
        let main = anchor(scene, "panel main", Vec3::new(-0.545, 1.47043, 0.71409));
        let main_edge = anchor(scene, "panel main edge", Vec3::new(0.545, 1.47043, 0.71409));

        let slots = vec![
            Panel {
                name: "leftbottom",
                anchor: left,
                width_anchor: None,
                layout_height: BOTTOM_HEIGHT,
                lines: Some(VecDeque::with_capacity(MAX_LINES)),
            },
            Panel {
                name: "rightbottom",
                anchor: right,
                width_anchor: None,
                layout_height: BOTTOM_HEIGHT,
                lines: Some(VecDeque::with_capacity(MAX_LINES)),
            },
            Panel {
                name: "main",
                anchor: main,
                width_anchor: Some(main_edge),
                layout_height: MAIN_HEIGHT,
                lines: None,
            },
        ];

        let map = assets.texture(scene, "projection", false);
        let env = assets.cubemap(scene, "ship");
        let projection = scene.add_material(
            Material::standard()
                .with_map(map)
                .with_env_map(env)
                .with_metalness(1.0)
                .with_flat_shading()
                .with_side(Side::Double)
                .with_opacity(PROJECTION_OPACITY),
        );
        let model = assets.model(scene, "projection");
        let _ = scene.add_mesh(None, "projection", Transform::default(), model, projection);

        Self {
            slots,
            text: AlienText::new(),
            projection,
        }
    }

    /// Scroll alien text while the bridge camera is active, spin the
    /// hologram texture and flicker its opacity.
    pub fn animate(&mut self, dt: f32, scene: &mut Scene, rig: &CameraRig, dice: &mut Dice) {
        if rig.active() == CameraSlot::Bridge {
            for panel in &mut self.slots {
                let Some(lines) = panel.lines.as_mut() else {
                    continue;
                };
                if dice.one_in(NEW_LINE_ODDS) {
                    Panel::push_line(lines, self.text.next_line(dice));
                }
            }
        }

        let material = scene.material_mut(self.projection);
        material.uv_rotation += PROJECTION_SPIN_DEGREES.to_radians() * frames(dt);
        material.opacity = PROJECTION_OPACITY + dice.unit() / 5.0;
    }

    /// Panel rectangles for a `size` viewport, or nothing when hidden.
    #[must_use]
    pub fn layout(&self, scene: &Scene, rig: &CameraRig, size: Vec2) -> Vec<(&'static str, PanelRect)> {
        if rig.active() != CameraSlot::Bridge {
            return Vec::new();
        }
        self.slots
            .iter()
            .map(|p| (p.name, p.rect(scene, rig, size)))
            .collect()
    }

    /// Text blocks for the panels that carry text.
    #[must_use]
    pub fn text_blocks(&self, scene: &Scene, rig: &CameraRig, size: Vec2) -> Vec<TextBlock> {
        if rig.active() != CameraSlot::Bridge {
            return Vec::new();
        }
        self.slots
            .iter()
            .filter_map(|panel| {
                let lines = panel.lines.as_ref()?;
                let rect = panel.rect(scene, rig, size);
                Some(TextBlock {
                    left: rect.left,
                    top: rect.top,
                    width: rect.width,
                    height: rect.height,
                    line_height: rect.height / MAX_LINES as f32,
                    lines: lines.iter().cloned().collect(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetStore;
    use crate::options::CameraOptions;

    fn setup() -> (Scene, CameraRig, Panels) {
        let store = AssetStore::new();
        let mut scene = Scene::new();
        let rig = CameraRig::new(&mut scene, 1.5, &CameraOptions::default());
        let panels = Panels::new(&mut scene, &mut AssetBinder::new(&store));
        (scene, rig, panels)
    }

    #[test]
    fn pool_grows_then_recycles() {
        let mut text = AlienText::new();
        let mut dice = Dice::new(Some(2));
        assert_eq!(text.len(), AlienText::BLANKS);
        for _ in 0..(AlienText::CAPACITY - AlienText::BLANKS) {
            let line = text.next_line(&mut dice);
            assert!(line.len() <= 25);
            assert!(line.chars().all(|c| c.is_ascii_lowercase()));
        }
        assert_eq!(text.len(), AlienText::CAPACITY);
        for _ in 0..50 {
            let _ = text.next_line(&mut dice);
        }
        assert_eq!(text.len(), AlienText::CAPACITY);
    }

    #[test]
    fn panels_keep_the_last_ten_lines() {
        let mut lines = VecDeque::new();
        for i in 0..15 {
            Panel::push_line(&mut lines, i.to_string());
        }
        assert_eq!(lines.len(), MAX_LINES);
        assert_eq!(lines.front().map(String::as_str), Some("5"));
        assert_eq!(lines.back().map(String::as_str), Some("14"));
    }

    #[test]
    fn text_appears_only_from_the_bridge() {
        let (mut scene, mut rig, mut panels) = setup();
        let mut dice = Dice::new(Some(6));
        for _ in 0..600 {
            panels.animate(1.0 / 60.0, &mut scene, &rig, &mut dice);
        }
        let size = Vec2::new(1462.0, 731.0);
        let blocks = panels.text_blocks(&scene, &rig, size);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| !b.lines.is_empty() && b.lines.len() <= MAX_LINES));
        assert!(blocks.iter().all(|b| (b.height - 60.0).abs() < 1e-3));

        rig.select(CameraSlot::Outside);
        assert!(panels.text_blocks(&scene, &rig, size).is_empty());
        assert!(panels.layout(&scene, &rig, size).is_empty());
    }

    #[test]
    fn main_panel_spans_its_anchors() {
        let (scene, rig, panels) = setup();
        let size = Vec2::new(1462.0, 731.0);
        let layout = panels.layout(&scene, &rig, size);
        assert!(
            layout.iter().any(|(name, _)| *name == "main"),
            "no main panel in {layout:?}"
        );
        let (_, main) = layout.iter().find(|(name, _)| *name == "main").unwrap();
        assert!(main.width > 0.0);
        assert!((main.height - 405.0).abs() < 1e-3);
    }

    #[test]
    fn projection_spins_and_flickers() {
        let (mut scene, rig, mut panels) = setup();
        let mut dice = Dice::new(Some(6));
        panels.animate(1.0 / 60.0, &mut scene, &rig, &mut dice);
        let m = scene.material(panels.projection);
        assert!((m.uv_rotation - 1f32.to_radians()).abs() < 1e-5);
        assert!((0.5..0.7).contains(&m.opacity));
    }
}
