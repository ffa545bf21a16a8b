//! HUD text drawn with glyphon straight onto the swapchain image.

use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping,
    SwashCache, TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};

/// A block of lines placed in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Left edge in pixels.
    pub left: f32,
    /// Top edge in pixels.
    pub top: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Line height in pixels; the font size is 80% of it.
    pub line_height: f32,
    /// Lines top to bottom.
    pub lines: Vec<String>,
}

const TEXT_COLOR: Color = Color::rgb(118, 198, 232);

/// Glyphon text drawn over the composed frame.
pub struct TextLayer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    atlas: TextAtlas,
    renderer: TextRenderer,
    viewport: Viewport,
    buffers: Vec<Buffer>,
    family: Option<String>,
}

impl TextLayer {
    /// Text layer for a surface of `format`. No font is set yet.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
    ) -> Self {
        let font_system = FontSystem::new();
        let cache = Cache::new(device);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        let renderer =
            TextRenderer::new(&mut atlas, device, wgpu::MultisampleState::default(), None);
        let viewport = Viewport::new(device, &cache);
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            atlas,
            renderer,
            viewport,
            buffers: Vec::new(),
            family: None,
        }
    }

    /// Register the HUD font and use its family for every block.
    pub fn set_font(&mut self, bytes: Vec<u8>) {
        let db = self.font_system.db_mut();
        let before = db.len();
        db.load_font_data(bytes);
        self.family = db
            .faces()
            .nth(before)
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone());
        match &self.family {
            Some(name) => log::info!("HUD font family '{name}'"),
            None => log::warn!("HUD font could not be parsed, using the default family"),
        }
    }

    /// Shape `blocks` and upload glyphs for a `width`×`height` surface.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        blocks: &[TextBlock],
    ) {
        self.viewport.update(queue, Resolution { width, height });

        let Self {
            font_system,
            buffers,
            family,
            ..
        } = self;
        let attrs = match family.as_deref() {
            Some(name) => Attrs::new().family(Family::Name(name)),
            None => Attrs::new().family(Family::Monospace),
        };
        while buffers.len() < blocks.len() {
            buffers.push(Buffer::new(font_system, Metrics::new(12.0, 15.0)));
        }
        for (buffer, block) in buffers.iter_mut().zip(blocks) {
            let line_height = block.line_height.max(1.0);
            buffer.set_metrics(font_system, Metrics::new(line_height * 0.8, line_height));
            buffer.set_size(font_system, Some(block.width.max(1.0)), Some(block.height.max(1.0)));
            buffer.set_text(font_system, &block.lines.join("\n"), &attrs, Shaping::Advanced);
            buffer.shape_until_scroll(font_system, false);
        }

        let areas = self.buffers.iter().zip(blocks).map(|(buffer, block)| TextArea {
            buffer,
            left: block.left,
            top: block.top,
            scale: 1.0,
            bounds: TextBounds {
                left: block.left as i32,
                top: block.top as i32,
                right: (block.left + block.width) as i32,
                bottom: (block.top + block.height) as i32,
            },
            default_color: TEXT_COLOR,
            custom_glyphs: &[],
        });
        if let Err(e) = self.renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            areas,
            &mut self.swash_cache,
        ) {
            log::warn!("HUD text prepare failed: {e}");
        }
    }

    /// Draw the prepared text into an open pass.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        if let Err(e) = self.renderer.render(&self.atlas, &self.viewport, pass) {
            log::warn!("HUD text render failed: {e}");
        }
    }

    /// Evict glyphs unused since the last prepare.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}
