//! Vello-based renderer implementation.

use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use clusterpad_core::{Bitmap, Rgba, Surface};
use kurbo::{Affine, BezPath, Circle, Point, Rect, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Blob, Brush, Color, Fill, ImageAlphaType, ImageData, ImageFormat};
use std::collections::HashMap;
use std::sync::Arc;
use vello::Scene;
use vello::wgpu;

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Font context for text rendering (cached to avoid rescanning system fonts).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
    /// Open clip layers.
    clip_depth: usize,
    /// Uploaded images keyed by pixel buffer address. The entry holds the
    /// buffer so the address stays unique while cached.
    image_cache: HashMap<usize, (Arc<[u8]>, ImageData)>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VelloRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VelloRenderer")
            .field("clip_depth", &self.clip_depth)
            .field("cached_images", &self.image_cache.len())
            .finish()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            clip_depth: 0,
            image_cache: HashMap::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        self.close_clips();
        std::mem::take(&mut self.scene)
    }

    fn close_clips(&mut self) {
        if self.clip_depth > 0 {
            log::warn!("{} clip layer(s) left open, closing", self.clip_depth);
        }
        while self.clip_depth > 0 {
            self.scene.pop_layer();
            self.clip_depth -= 1;
        }
    }

    /// Upload data for `image`, reusing the entry for the same pixel buffer.
    fn image_data(&mut self, image: &Bitmap) -> ImageData {
        let key = Arc::as_ptr(&image.pixels) as *const u8 as usize;
        if let Some((pixels, data)) = self.image_cache.get(&key)
            && Arc::ptr_eq(pixels, &image.pixels)
        {
            return data.clone();
        }
        let data = ImageData {
            data: Blob::new(Arc::new(image.pixels.to_vec())),
            format: ImageFormat::Rgba8,
            width: image.width,
            height: image.height,
            alpha_type: ImageAlphaType::Alpha,
        };
        self.image_cache
            .insert(key, (Arc::clone(&image.pixels), data.clone()));
        data
    }

    /// Drop cached images whose bitmaps no longer exist outside the cache.
    fn evict_unused_images(&mut self) {
        self.image_cache
            .retain(|_, (pixels, _)| Arc::strong_count(pixels) > 1);
    }

    /// Render the current scene into `target`.
    ///
    /// Vello needs a storage-capable Rgba8Unorm texture, so the scene is
    /// rendered into an intermediate texture and blitted onto the target
    /// (which may be Bgra8Unorm).
    #[allow(clippy::too_many_arguments)]
    pub fn render_to_view(
        &mut self,
        gpu: &mut vello::Renderer,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        blitter: &wgpu::util::TextureBlitter,
        target: &wgpu::TextureView,
        width: u32,
        height: u32,
        base_color: Color,
    ) -> RenderResult<()> {
        let scene = self.take_scene();
        let params = vello::RenderParams {
            base_color,
            width,
            height,
            antialiasing_method: vello::AaConfig::Area,
        };

        let render_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vello render texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let render_view = render_texture.create_view(&wgpu::TextureViewDescriptor::default());

        gpu.render_to_texture(device, queue, &scene, &render_view, &params)
            .map_err(|e| RendererError::RenderFailed(e.to_string()))?;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("blit encoder"),
        });
        blitter.copy(device, &mut encoder, &render_view, target);
        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

impl Renderer for VelloRenderer {
    fn begin_frame(&mut self, ctx: &RenderContext) {
        self.close_clips();
        self.scene.reset();
        self.evict_unused_images();
        let viewport = Rect::from_origin_size(Point::ZERO, ctx.viewport_size);
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            ctx.background_color,
            None,
            &viewport,
        );
    }
}

impl Surface for VelloRenderer {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, Color::from(color), None, &rect);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, width: f64) {
        // Keep the stroke inside the rectangle like a bordered box.
        let inset = rect.inset(-width / 2.0);
        self.scene.stroke(
            &Stroke::new(width),
            Affine::IDENTITY,
            Color::from(color),
            None,
            &inset,
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            Color::from(color),
            None,
            &Circle::new(center, radius),
        );
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, width: f64) {
        self.scene.stroke(
            &Stroke::new(width),
            Affine::IDENTITY,
            Color::from(color),
            None,
            &Circle::new(center, radius - width / 2.0),
        );
    }

    fn stroke_polygon(&mut self, points: &[Point], color: Rgba, width: f64) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut path = BezPath::new();
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
        self.scene.stroke(
            &Stroke::new(width),
            Affine::IDENTITY,
            Color::from(color),
            None,
            &path,
        );
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f64, color: Rgba) {
        if text.is_empty() {
            return;
        }

        let brush = Brush::Solid(Color::from(color));
        let mut builder = self
            .layout_cx
            .ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(size as f32));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Single(
            parley::FontFamily::Generic(parley::GenericFamily::SansSerif),
        )));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

        // Parley layouts have y=0 at the top with the baseline offset down.
        let transform = Affine::translate(origin.to_vec2());
        let mut glyph_count = 0;

        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        glyph_count += 1;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(run.font())
                        .brush(&brush)
                        .hint(true)
                        .transform(transform)
                        .glyph_transform(glyph_xform)
                        .font_size(run.font_size())
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }

        // No system font matched: show where the text would be.
        if glyph_count == 0 {
            let width = text.chars().count() as f64 * size * 0.6;
            let rect = Rect::from_origin_size(origin, (width, size * 1.2));
            let faint = Color::from(Rgba { a: 60, ..color });
            self.scene
                .fill(Fill::NonZero, Affine::IDENTITY, faint, None, &rect);
        }
    }

    fn draw_image(&mut self, image: &Bitmap, rect: Rect) {
        if image.width == 0 || image.height == 0 {
            return;
        }
        let data = self.image_data(image);
        let transform = Affine::translate((rect.x0, rect.y0))
            * Affine::scale_non_uniform(
                rect.width() / image.width as f64,
                rect.height() / image.height as f64,
            );
        self.scene.draw_image(&data.into(), transform);
    }

    fn push_clip(&mut self, rect: Rect) {
        self.scene.push_clip_layer(Affine::IDENTITY, &rect);
        self.clip_depth += 1;
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            log::warn!("pop_clip without a matching push_clip");
            return;
        }
        self.scene.pop_layer();
        self.clip_depth -= 1;
    }
}
