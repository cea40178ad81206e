/// Flat enum widget identity. Closed set — no trait objects.
#[derive(Debug, Clone)]
pub enum Widget {
    /// Container with background, border, and optional inner shadow.
    Panel {
        bg_color: [f32; 4],     // sRGB RGBA
        border_color: [f32; 4], // sRGB RGBA
        border_width: f32,      // pixels
        shadow_width: f32,      // pixels
    },

    /// Single-line text.
    Label {
        text: String,
        color: [f32; 4], // sRGB RGBA
        font_size: f32,  // pixels
    },

    /// Clickable element with text and background.
    Button {
        text: String,
        color: [f32; 4],        // text color sRGB RGBA
        bg_color: [f32; 4],     // background sRGB RGBA
        border_color: [f32; 4], // border sRGB RGBA
        font_size: f32,         // pixels
    },

    /// Horizontally scrolling card strip with virtual layout.
    /// Children are laid out left-to-right; each child's width comes from its
    /// own `Sizing::Fixed`, so one card can be wider than the rest. Children
    /// scrolled out of the viewport are skipped (zero rect) during layout.
    Rail {
        bg_color: [f32; 4],        // background sRGB RGBA
        gap: f32,                  // pixels between cards
        scroll_offset: f32,        // horizontal scroll (pixels from start)
        scrollbar_color: [f32; 4], // scrollbar thumb sRGB RGBA
        scrollbar_height: f32,     // scrollbar track height (pixels)
    },
}
