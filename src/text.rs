use std::collections::HashMap;

use cosmic_text::{
    Attrs, Buffer, CacheKey, Family, FontSystem, Metrics, Shaping, SwashCache, SwashContent,
};

use crate::ui::TextCommand;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextUniforms {
    pub projection: [[f32; 4]; 4],
}

/// Atlas placement and bearing for one rasterized glyph.
#[derive(Clone, Copy)]
struct GlyphInfo {
    width: u32,
    height: u32,
    left: i32,
    top: i32,
    u0: f32,
    v0: f32,
    u1: f32,
    v1: f32,
}

/// Line height multiplier applied to every font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.25;

struct PendingGlyphUpload {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Text renderer: cosmic-text shapes each run, swash rasterizes glyphs on
/// demand into a shelf-packed R8 atlas, and quads are batched per frame.
/// Glyphs are cached by their full cosmic-text cache key, so the same
/// codepoint at different sizes occupies separate atlas slots.
pub struct TextRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    frame_vertices: Vec<TextVertex>,

    font_system: FontSystem,
    swash_cache: SwashCache,
    /// None marks glyphs that failed to rasterize (color emoji, atlas full).
    glyphs: HashMap<CacheKey, Option<GlyphInfo>>,

    atlas_texture: wgpu::Texture,
    atlas_width: u32,
    atlas_height: u32,
    atlas_shelf_x: u32,
    atlas_shelf_y: u32,
    atlas_shelf_height: u32,
    pending_atlas_uploads: Vec<PendingGlyphUpload>,
}

impl TextRenderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let font_system = FontSystem::new();
        let swash_cache = SwashCache::new();

        let atlas_width: u32 = 512;
        let atlas_height: u32 = 4096;

        let atlas_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glyph_atlas"),
            size: wgpu::Extent3d {
                width: atlas_width,
                height: atlas_height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let atlas_view = atlas_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let atlas_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("glyph_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("text_uniforms"),
            size: std::mem::size_of::<TextUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let initial_capacity = 6000;
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("text_vertices"),
            size: (initial_capacity * std::mem::size_of::<TextVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("text_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("text_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&atlas_sampler),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("text_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("text.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("text_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_attributes = wgpu::vertex_attr_array![
            0 => Float32x2, // position
            1 => Float32x2, // uv
            2 => Float32x4, // color
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("text_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<TextVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &vertex_attributes,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group,
            uniform_buffer,
            vertex_buffer,
            vertex_capacity: initial_capacity,
            frame_vertices: Vec::new(),
            font_system,
            swash_cache,
            glyphs: HashMap::new(),
            atlas_texture,
            atlas_width,
            atlas_height,
            atlas_shelf_x: 0,
            atlas_shelf_y: 0,
            atlas_shelf_height: 0,
            pending_atlas_uploads: Vec::new(),
        }
    }

    /// Start a new frame. Clears accumulated vertices and writes uniforms.
    pub fn begin_frame(&mut self, queue: &wgpu::Queue, screen_w: u32, screen_h: u32) {
        self.frame_vertices.clear();

        let sw = screen_w as f32;
        let sh = screen_h as f32;

        #[rustfmt::skip]
        let projection: [[f32; 4]; 4] = [
            [2.0 / sw,  0.0,        0.0, 0.0],
            [0.0,      -2.0 / sh,   0.0, 0.0],
            [0.0,       0.0,        1.0, 0.0],
            [-1.0,      1.0,        0.0, 1.0],
        ];

        let uniforms = TextUniforms { projection };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Shape one text run with cosmic-text and append its glyph quads.
    pub fn prepare_text(&mut self, cmd: &TextCommand) {
        let metrics = Metrics::new(cmd.font_size, cmd.font_size * LINE_HEIGHT_FACTOR);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        let attrs = Attrs::new().family(Family::SansSerif);
        buffer.set_text(&mut self.font_system, &cmd.text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);

        // Collect placements first: rasterization below needs &mut self.
        let mut placements: Vec<(CacheKey, i32, i32)> = Vec::new();
        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((cmd.x, cmd.y + run.line_y), 1.0);
                placements.push((physical.cache_key, physical.x, physical.y));
            }
        }
        drop(buffer);

        for &(key, px, py) in &placements {
            let Some(info) = self.glyph_info(key) else {
                continue;
            };
            if info.width == 0 || info.height == 0 {
                continue;
            }

            let x0 = (px + info.left) as f32;
            let y0 = (py - info.top) as f32;
            let x1 = x0 + info.width as f32;
            let y1 = y0 + info.height as f32;

            let quad = [
                ([x0, y0], [info.u0, info.v0]),
                ([x1, y0], [info.u1, info.v0]),
                ([x0, y1], [info.u0, info.v1]),
                ([x1, y0], [info.u1, info.v0]),
                ([x1, y1], [info.u1, info.v1]),
                ([x0, y1], [info.u0, info.v1]),
            ];
            for (position, uv) in quad {
                self.frame_vertices.push(TextVertex {
                    position,
                    uv,
                    color: cmd.color,
                });
            }
        }
    }

    /// Look up a glyph, rasterizing and packing it into the atlas on miss.
    fn glyph_info(&mut self, key: CacheKey) -> Option<GlyphInfo> {
        if let Some(cached) = self.glyphs.get(&key) {
            return *cached;
        }

        let info = self.rasterize(key);
        self.glyphs.insert(key, info);
        info
    }

    fn rasterize(&mut self, key: CacheKey) -> Option<GlyphInfo> {
        let image = self
            .swash_cache
            .get_image_uncached(&mut self.font_system, key)?;

        // Alpha masks only; color glyphs (emoji) are skipped.
        if image.content != SwashContent::Mask {
            return None;
        }

        let w = image.placement.width;
        let h = image.placement.height;
        if w == 0 || h == 0 {
            return Some(GlyphInfo {
                width: 0,
                height: 0,
                left: image.placement.left,
                top: image.placement.top,
                u0: 0.0,
                v0: 0.0,
                u1: 0.0,
                v1: 0.0,
            });
        }

        let padding: u32 = 1;
        if self.atlas_shelf_x + w + padding > self.atlas_width {
            self.atlas_shelf_y += self.atlas_shelf_height + padding;
            self.atlas_shelf_x = 0;
            self.atlas_shelf_height = 0;
        }
        if self.atlas_shelf_y + h > self.atlas_height {
            log::warn!("glyph atlas full, dropping glyph {:?}", key.glyph_id);
            return None;
        }

        let pos_x = self.atlas_shelf_x;
        let pos_y = self.atlas_shelf_y;
        self.atlas_shelf_height = self.atlas_shelf_height.max(h);
        self.atlas_shelf_x += w + padding;

        // Deferred GPU upload; flushed before the next draw.
        self.pending_atlas_uploads.push(PendingGlyphUpload {
            x: pos_x,
            y: pos_y,
            width: w,
            height: h,
            pixels: image.data,
        });

        let aw = self.atlas_width as f32;
        let ah = self.atlas_height as f32;
        Some(GlyphInfo {
            width: w,
            height: h,
            left: image.placement.left,
            top: image.placement.top,
            u0: pos_x as f32 / aw,
            v0: pos_y as f32 / ah,
            u1: (pos_x + w) as f32 / aw,
            v1: (pos_y + h) as f32 / ah,
        })
    }

    /// Upload pending atlas regions and vertices. Returns vertex count.
    pub fn flush(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) -> u32 {
        for upload in self.pending_atlas_uploads.drain(..) {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &self.atlas_texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: upload.x,
                        y: upload.y,
                        z: 0,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                &upload.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(upload.width),
                    rows_per_image: Some(upload.height),
                },
                wgpu::Extent3d {
                    width: upload.width,
                    height: upload.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let vertex_count = self.frame_vertices.len() as u32;
        if self.frame_vertices.is_empty() {
            return 0;
        }

        if self.frame_vertices.len() > self.vertex_capacity {
            self.vertex_capacity = self.frame_vertices.len().next_power_of_two();
            self.vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("text_vertices"),
                size: (self.vertex_capacity * std::mem::size_of::<TextVertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }

        queue.write_buffer(
            &self.vertex_buffer,
            0,
            bytemuck::cast_slice(&self.frame_vertices),
        );

        vertex_count
    }

    pub fn render<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>, vertex_count: u32) {
        if vertex_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..vertex_count, 0..1);
    }
}
