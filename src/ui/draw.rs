use super::Rect;

/// A filled quad in screen pixels, with an optional border and inner shadow.
/// Fed to `PanelRenderer::add_quad()`.
#[derive(Debug, Clone)]
pub struct PanelCommand {
    pub rect: Rect,
    pub bg_color: [f32; 4],     // sRGB RGBA
    pub border_color: [f32; 4], // sRGB RGBA
    pub border_width: f32,
    pub shadow_width: f32,
}

impl PanelCommand {
    /// A borderless, shadowless fill. Most chrome is this.
    pub fn flat(rect: Rect, bg_color: [f32; 4]) -> Self {
        Self {
            rect,
            bg_color,
            border_color: [0.0; 4],
            border_width: 0.0,
            shadow_width: 0.0,
        }
    }
}

/// One text run anchored at its top-left corner in screen pixels.
/// Fed to `TextRenderer::prepare_text()`.
#[derive(Debug, Clone)]
pub struct TextCommand {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub color: [f32; 4], // sRGB RGBA
    pub font_size: f32,
}

/// Frame-local command buffers filled by the widget tree walk and drained by
/// the quad and glyph renderers. Keeps the widgets free of GPU types.
#[derive(Default)]
pub struct DrawList {
    pub panels: Vec<PanelCommand>,
    pub texts: Vec<TextCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.panels.clear();
        self.texts.clear();
    }
}
