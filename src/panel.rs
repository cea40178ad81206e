use crate::ui::PanelCommand;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PanelVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub size_px: [f32; 2],
    pub bg_color: [f32; 4],
    pub border_color: [f32; 4],
    pub border_width: f32,
    pub shadow_width: f32,
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PanelUniforms {
    pub projection: [[f32; 4]; 4],
}

/// Batched quad renderer for panels, cards, buttons, and scrollbar thumbs.
/// All quads for a frame share one vertex buffer and one draw call.
pub struct PanelRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    frame_vertices: Vec<PanelVertex>,
}

impl PanelRenderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("panel_uniforms"),
            size: std::mem::size_of::<PanelUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // A full frame (cards + chrome + overlay) sits well under 200 quads.
        let initial_capacity = 1200;
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("panel_vertices"),
            size: (initial_capacity * std::mem::size_of::<PanelVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("panel_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("panel_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("panel_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("panel.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("panel_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_attributes = wgpu::vertex_attr_array![
            0 => Float32x2, // position
            1 => Float32x2, // uv
            2 => Float32x2, // size_px
            3 => Float32x4, // bg_color
            4 => Float32x4, // border_color
            5 => Float32,   // border_width
            6 => Float32,   // shadow_width
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("panel_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<PanelVertex>() as u64,
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
        }
    }

    /// Clear vertices and write the ortho projection uniform.
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

        let uniforms = PanelUniforms { projection };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Push one quad (two triangles) from a draw command.
    pub fn add_quad(&mut self, cmd: &PanelCommand) {
        let x0 = cmd.rect.x;
        let y0 = cmd.rect.y;
        let x1 = cmd.rect.x + cmd.rect.width;
        let y1 = cmd.rect.y + cmd.rect.height;
        let size_px = [cmd.rect.width, cmd.rect.height];

        let make = |px: f32, py: f32, u: f32, v: f32| PanelVertex {
            position: [px, py],
            uv: [u, v],
            size_px,
            bg_color: cmd.bg_color,
            border_color: cmd.border_color,
            border_width: cmd.border_width,
            shadow_width: cmd.shadow_width,
        };

        self.frame_vertices.push(make(x0, y0, 0.0, 0.0));
        self.frame_vertices.push(make(x1, y0, 1.0, 0.0));
        self.frame_vertices.push(make(x0, y1, 0.0, 1.0));

        self.frame_vertices.push(make(x1, y0, 1.0, 0.0));
        self.frame_vertices.push(make(x1, y1, 1.0, 1.0));
        self.frame_vertices.push(make(x0, y1, 0.0, 1.0));
    }

    /// Upload vertices to GPU. Returns vertex count for render().
    pub fn flush(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) -> u32 {
        let vertex_count = self.frame_vertices.len() as u32;
        if self.frame_vertices.is_empty() {
            return 0;
        }

        if self.frame_vertices.len() > self.vertex_capacity {
            self.vertex_capacity = self.frame_vertices.len().next_power_of_two();
            self.vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("panel_vertices"),
                size: (self.vertex_capacity * std::mem::size_of::<PanelVertex>()) as u64,
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
