use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowId};

mod catalog;
mod external;
mod filter;
mod panel;
mod session;
mod text;
#[allow(dead_code)] // Public API: widget system surface exceeds what main uses.
mod ui;

use catalog::Catalog;
use filter::FilterCache;
use session::{CloseReason, Focus, GallerySession, PointerMode};
use ui::{
    Action, Animator, Easing, InputResponse, KeyCombo, ModifierFlags, Size, Theme, UiState,
    ViewHandles, ViewInputs, WidgetId, WidgetTree, build_views,
};

/// Convert sRGB component (0-1) to linear for use as wgpu clear color.
fn srgb_to_linear(s: f64) -> f64 {
    if s <= 0.04045 {
        s / 12.92
    } else {
        ((s + 0.055) / 1.055).powf(2.4)
    }
}

const BG_SRGB: [f32; 3] = [5.0 / 255.0, 5.0 / 255.0, 5.0 / 255.0]; // #050505

/// Card expansion / contraction time.
const CARD_ANIM: Duration = Duration::from_millis(180);
/// Rail fade time on each side of a category swap.
const FADE_ANIM: Duration = Duration::from_millis(140);

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    window: Arc<Window>,
}

impl GpuState {
    fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("failed to find a suitable GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("kinorail_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .expect("failed to create GPU device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Self {
            surface,
            device,
            queue,
            config,
            window,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn render(
        &self,
        panel: &panel::PanelRenderer,
        panel_vertex_count: u32,
        text: &text::TextRenderer,
        text_vertex_count: u32,
    ) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory");
                return;
            }
            Err(e) => {
                log::warn!("surface error: {e:?}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gallery_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: srgb_to_linear(BG_SRGB[0] as f64),
                            g: srgb_to_linear(BG_SRGB[1] as f64),
                            b: srgb_to_linear(BG_SRGB[2] as f64),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            panel.render(&mut render_pass, panel_vertex_count);
            text.render(&mut render_pass, text_vertex_count);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

struct App {
    gpu: Option<GpuState>,
    panel: Option<panel::PanelRenderer>,
    text: Option<text::TextRenderer>,

    catalog: Catalog,
    session: GallerySession,
    filter_cache: FilterCache,
    animator: Animator,
    theme: Theme,
    bindings: ui::KeyBindings,

    ui_state: UiState,
    ui_tree: WidgetTree,
    /// Handles from the most recent rebuild; ids are valid for `ui_tree` only.
    handles: ViewHandles,
    /// Rail scroll offset carried across per-frame tree rebuilds.
    rail_scroll: f32,

    cursor_pos: winit::dpi::PhysicalPosition<f64>,
    modifiers: ModifiersState,
    /// Last touch position while a finger is down.
    touch_anchor: Option<(f32, f32)>,
    /// Whether the current touch moved far enough to count as a scroll.
    touch_dragged: bool,
}

impl App {
    fn new(catalog: Catalog) -> Self {
        Self {
            gpu: None,
            panel: None,
            text: None,
            catalog,
            session: GallerySession::new(),
            filter_cache: FilterCache::new(),
            animator: Animator::new(),
            theme: Theme::default(),
            bindings: ui::KeyBindings::defaults(),
            ui_state: UiState::new(),
            ui_tree: WidgetTree::new(),
            handles: ViewHandles::default(),
            rail_scroll: 0.0,
            cursor_pos: winit::dpi::PhysicalPosition::new(0.0, 0.0),
            modifiers: ModifiersState::empty(),
            touch_anchor: None,
            touch_dragged: false,
        }
    }

    /// Pull the rail scroll offset out of the current tree before a rebuild.
    fn sync_rail_scroll(&mut self) {
        if let Some(rail) = self.handles.rail {
            self.rail_scroll = self.ui_tree.rail_scroll(rail);
        }
    }

    /// Id of the card whose horizontal span contains the screen point, or
    /// `None` when the pointer is outside the rail. Spans live in rail
    /// content coordinates, so the pointer is shifted by the scroll offset.
    fn card_under_pointer(&self, x: f32, y: f32) -> Option<String> {
        let rail = self.handles.rail?;
        let node = self.ui_tree.get(rail)?;
        if !node.rect.contains(x, y) {
            return None;
        }
        let content_x = x - (node.rect.x + node.padding.left) + self.ui_tree.rail_scroll(rail);

        let spans = self.ui_tree.rail_card_spans(rail);
        let cards: Vec<(&str, f32, f32)> = spans
            .iter()
            .filter_map(|&(wid, start, end)| {
                let (index, _) = self.handles.cards.iter().find(|(_, c)| *c == wid)?;
                let entry = self.catalog.get(*index)?;
                Some((entry.id.as_str(), start, end))
            })
            .collect();

        GallerySession::resolve_active(content_x, cards).map(str::to_owned)
    }

    /// Card at the horizontal center of the rail viewport. Touch mode picks
    /// this once scrolling settles.
    fn center_band_card(&self) -> Option<String> {
        let rail = self.handles.rail?;
        let node = self.ui_tree.get(rail)?;
        let cx = node.rect.x + node.padding.left
            + (node.rect.width - node.padding.horizontal()) / 2.0;
        let cy = node.rect.y + node.rect.height / 2.0;
        self.card_under_pointer(cx, cy)
    }

    /// Change the active card and animate the width of both the card losing
    /// the slot and the one gaining it.
    fn activate_card(&mut self, id: Option<&str>, now: Instant) {
        let prev = self.session.active_card().map(str::to_owned);
        if !self.session.set_active(id) {
            return;
        }
        let (resting, expanded) = (self.theme.card_width, self.theme.card_width_active);

        if let Some(prev_id) = prev {
            let key = format!("card:{prev_id}");
            let from = self.animator.value_or(&key, now, expanded);
            self.animator
                .start(&key, from, resting, CARD_ANIM, Easing::EaseOut, now);
        }
        if let Some(new_id) = id {
            let key = format!("card:{new_id}");
            let from = self.animator.value_or(&key, now, resting);
            self.animator
                .start(&key, from, expanded, CARD_ANIM, Easing::EaseOut, now);
        }
    }

    /// Map a completed click onto a domain action. Walks the parent chain so
    /// a hit on a card's title label still counts as a hit on the card.
    fn on_click(&mut self, hit: WidgetId, now: Instant) {
        // Only a direct backdrop hit closes; the detail panel is a child of
        // the backdrop and swallows its own clicks.
        if Some(hit) == self.handles.overlay_backdrop {
            self.session.close(CloseReason::Backdrop);
            return;
        }

        let open_entry = match self.session.focus() {
            Focus::Open(index) => self.catalog.get(index),
            Focus::Closed => None,
        };

        let mut current = Some(hit);
        while let Some(wid) = current {
            if Some(wid) == self.handles.overlay_close {
                self.session.close(CloseReason::Button);
                return;
            }
            if Some(wid) == self.handles.overlay_explore {
                if let Some(entry) = open_entry {
                    let _ = external::open_in_browser(&external::explore_url(&entry.title));
                }
                return;
            }
            if Some(wid) == self.handles.overlay_trailer {
                if let Some(entry) = open_entry {
                    let url = external::trailer_url(&entry.title, entry.trailer_url.as_deref());
                    let _ = external::open_in_browser(&url);
                }
                return;
            }
            if Some(wid) == self.handles.search_field {
                self.session.search_focused = true;
                return;
            }
            if Some(wid) == self.handles.genre_button {
                self.session.cycle_genre(&self.catalog);
                return;
            }
            if let Some(&(_, filter)) = self
                .handles
                .category_buttons
                .iter()
                .find(|(b, _)| *b == wid)
            {
                if self.session.request_category(filter, now) {
                    let from = self.animator.value_or("rail_fade", now, 1.0);
                    self.animator
                        .start("rail_fade", from, 0.15, FADE_ANIM, Easing::EaseInOut, now);
                }
                return;
            }
            if let Some(&(index, _)) = self.handles.cards.iter().find(|(_, c)| *c == wid) {
                if let Some(entry) = self.catalog.get(index) {
                    let id = entry.id.clone();
                    self.session.search_focused = false;
                    let prev = self.session.active_card().map(str::to_owned);
                    self.session.card_clicked(&id, index);

                    // Opening releases the active card; ease the expanded one
                    // back to its resting width under the backdrop.
                    if self.session.active_card().is_none()
                        && let Some(prev_id) = prev
                    {
                        let key = format!("card:{prev_id}");
                        let from =
                            self.animator
                                .value_or(&key, now, self.theme.card_width_active);
                        self.animator.start(
                            &key,
                            from,
                            self.theme.card_width,
                            CARD_ANIM,
                            Easing::EaseOut,
                            now,
                        );
                    }
                }
                return;
            }
            current = self.ui_tree.get(wid).and_then(|n| n.parent);
        }

        // Clicked chrome with no action behind it.
        self.session.search_focused = false;
    }

    fn handle_key(&mut self, event: &winit::event::KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed {
            return;
        }

        let action = if let PhysicalKey::Code(code) = event.physical_key {
            self.bindings.lookup(KeyCombo {
                modifiers: ModifierFlags {
                    shift: self.modifiers.shift_key(),
                    ctrl: self.modifiers.control_key(),
                    alt: self.modifiers.alt_key(),
                },
                key: code,
            })
        } else {
            None
        };

        // While the search field has focus, keys edit the query.
        if self.session.search_focused {
            if action == Some(Action::CloseTopmost) {
                self.session.search_focused = false;
                return;
            }
            if let PhysicalKey::Code(KeyCode::Backspace) = event.physical_key {
                self.session.pop_query_char();
                return;
            }
            if let PhysicalKey::Code(KeyCode::Enter) = event.physical_key {
                self.session.search_focused = false;
                return;
            }
            if let Some(typed) = &event.text {
                for c in typed.chars() {
                    self.session.push_query_char(c);
                }
            }
            return;
        }

        match action {
            Some(Action::CloseTopmost) => {
                if !self.session.close(CloseReason::Escape) {
                    event_loop.exit();
                }
            }
            Some(Action::FocusSearch) => {
                if self.session.focus() == Focus::Closed {
                    self.session.search_focused = true;
                }
            }
            Some(Action::RailHome) => {
                if let Some(rail) = self.handles.rail {
                    self.ui_tree.set_rail_scroll(rail, 0.0);
                    self.rail_scroll = 0.0;
                }
            }
            Some(Action::RailEnd) => {
                if let Some(rail) = self.handles.rail {
                    let max = self.ui_tree.max_rail_scroll(rail);
                    self.ui_tree.set_rail_scroll(rail, max);
                    self.rail_scroll = max;
                }
            }
            None => {}
        }
    }

    fn handle_touch(&mut self, touch: winit::event::Touch) {
        let now = Instant::now();
        self.session.note_touch();
        let x = touch.location.x as f32;
        let y = touch.location.y as f32;

        match touch.phase {
            TouchPhase::Started => {
                self.touch_anchor = Some((x, y));
                self.touch_dragged = false;
            }
            TouchPhase::Moved => {
                if let Some((ax, _)) = self.touch_anchor {
                    let dx = ax - x;
                    if dx.abs() >= 3.0 {
                        self.touch_dragged = true;
                    }
                    // Drags while the overlay is open must not move the
                    // gallery underneath it.
                    if dx != 0.0
                        && self.session.rail_scroll_allowed()
                        && let Some(rail) = self.handles.rail
                    {
                        self.ui_tree.scroll_rail_by(rail, dx);
                        self.rail_scroll = self.ui_tree.rail_scroll(rail);
                        self.session.touch_scrolled(now);
                    }
                    self.touch_anchor = Some((x, y));
                }
            }
            TouchPhase::Ended => {
                if !self.touch_dragged
                    && let Some(hit) = self.ui_tree.hit_test(x, y)
                {
                    self.on_click(hit, now);
                }
                self.touch_anchor = None;
                self.touch_dragged = false;
            }
            TouchPhase::Cancelled => {
                self.touch_anchor = None;
                self.touch_dragged = false;
            }
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();

        // A settled category swap applies the filter, resets the rail, and
        // fades the cards back in.
        if self.session.tick(&self.catalog, now) {
            self.rail_scroll = 0.0;
            self.ui_state.reset_frame_ids();
            let from = self.animator.value_or("rail_fade", now, 0.15);
            self.animator
                .start("rail_fade", from, 1.0, FADE_ANIM, Easing::EaseInOut, now);
        }

        self.sync_rail_scroll();

        let visible: Vec<usize> = self
            .filter_cache
            .visible(&self.catalog, &self.session.criteria)
            .to_vec();
        self.session.retain_valid(&self.catalog, &visible);

        // Pointer resolution runs every frame, not just on pointer events:
        // the card under a stationary pointer changes when the rail scrolls
        // or a neighbour expands.
        match self.session.pointer_mode() {
            PointerMode::Mouse => {
                if !self.session.hover_locked() {
                    let (cx, cy) = self.ui_state.cursor;
                    let under = self.card_under_pointer(cx, cy);
                    self.activate_card(under.as_deref(), now);
                }
            }
            PointerMode::Touch => {
                if !self.session.hover_locked() && self.session.touch_settle_due(now) {
                    if let Some(id) = self.center_band_card() {
                        self.activate_card(Some(&id), now);
                    }
                }
            }
        }

        self.animator.gc(now);

        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };
        let screen = Size {
            width: gpu.config.width as f32,
            height: gpu.config.height as f32,
        };

        // Rebuild the widget tree from scratch.
        self.ui_tree = WidgetTree::new();
        let inputs = ViewInputs {
            catalog: &self.catalog,
            visible: &visible,
            criteria: &self.session.criteria,
            active_card: self.session.active_card(),
            focus: self.session.focus(),
            search_focused: self.session.search_focused,
            rail_scroll: self.rail_scroll,
            rail_alpha: self.animator.value_or("rail_fade", now, 1.0),
        };
        self.handles = build_views(
            &mut self.ui_tree,
            &self.theme,
            &self.bindings,
            &inputs,
            &self.animator,
            now,
            screen,
        );

        let line_height = self.theme.font_body_size * text::LINE_HEIGHT_FACTOR;
        self.ui_tree.layout(screen, line_height);

        // A shrinking result set can strand the carried offset past the end
        // of the new content; clamp and re-lay out when that happens.
        if let Some(rail) = self.handles.rail {
            let max = self.ui_tree.max_rail_scroll(rail);
            if self.rail_scroll > max {
                self.ui_tree.set_rail_scroll(rail, max);
                self.rail_scroll = max;
                self.ui_tree.layout(screen, line_height);
            }
        }

        let mut draw_list = ui::DrawList::new();
        self.ui_tree.draw(&mut draw_list);

        if let (Some(panel), Some(text)) = (self.panel.as_mut(), self.text.as_mut()) {
            panel.begin_frame(&gpu.queue, gpu.config.width, gpu.config.height);
            for cmd in &draw_list.panels {
                panel.add_quad(cmd);
            }
            let panel_vertex_count = panel.flush(&gpu.queue, &gpu.device);

            text.begin_frame(&gpu.queue, gpu.config.width, gpu.config.height);
            for cmd in &draw_list.texts {
                text.prepare_text(cmd);
            }
            let text_vertex_count = text.flush(&gpu.queue, &gpu.device);

            gpu.render(panel, panel_vertex_count, text, text_vertex_count);
        }

        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("kinorail")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 800.0));

        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));
        let gpu = GpuState::new(window);

        let panel_renderer = panel::PanelRenderer::new(&gpu.device, gpu.surface_format());
        let text_renderer = text::TextRenderer::new(&gpu.device, gpu.surface_format());

        self.gpu = Some(gpu);
        self.panel = Some(panel_renderer);
        self.text = Some(text_renderer);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_pos = position;
                self.ui_state
                    .handle_cursor_moved(&mut self.ui_tree, position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } if self.session.rail_scroll_allowed() => {
                // Dominant axis wins, so trackpad horizontal pans work too.
                let d = match delta {
                    winit::event::MouseScrollDelta::LineDelta(x, y) => {
                        if x.abs() > y.abs() { x } else { -y }
                    }
                    winit::event::MouseScrollDelta::PixelDelta(pos) => {
                        if pos.x.abs() > pos.y.abs() {
                            pos.x as f32 / 20.0
                        } else {
                            -pos.y as f32 / 20.0
                        }
                    }
                };
                self.ui_state.handle_scroll(&mut self.ui_tree, d);
                self.sync_rail_scroll();
            }
            WindowEvent::MouseInput {
                state: btn_state,
                button,
                ..
            } => {
                let px = self.cursor_pos.x as f32;
                let py = self.cursor_pos.y as f32;
                let ui_btn = match button {
                    MouseButton::Left => ui::MouseButton::Left,
                    MouseButton::Right => ui::MouseButton::Right,
                    MouseButton::Middle => ui::MouseButton::Middle,
                    _ => ui::MouseButton::Left,
                };
                let pressed = btn_state == ElementState::Pressed;

                let response =
                    self.ui_state
                        .handle_mouse_input(&mut self.ui_tree, ui_btn, pressed, px, py);
                match response {
                    InputResponse::Clicked(hit) => self.on_click(hit, Instant::now()),
                    InputResponse::Consumed => self.sync_rail_scroll(),
                    InputResponse::Ignored => {
                        if pressed {
                            self.session.search_focused = false;
                        }
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(&event, event_loop);
            }
            WindowEvent::Touch(touch) => {
                self.handle_touch(touch);
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }
}

fn main() {
    env_logger::init();

    let catalog = Catalog::load("data/catalog.ron");
    #[cfg(debug_assertions)]
    catalog::validate_catalog(&catalog);
    log::info!("catalog loaded: {} entries", catalog.len());

    let event_loop = EventLoop::new().expect("create event loop");
    let mut app = App::new(catalog);
    event_loop.run_app(&mut app).expect("run event loop");
}
