/// Centralized visual style constants.
///
/// Single global theme. No runtime switching. View builders read from Theme
/// at construction time instead of hardcoding colors.
#[derive(Debug, Clone)]
pub struct Theme {
    // -- Color palette (sRGB RGBA) --
    /// Window background: #050505
    pub bg: [f32; 4],
    /// Card / panel surface: #111827
    pub surface: [f32; 4],
    /// Raised surface (overlay detail panel): #1F2937
    pub surface_raised: [f32; 4],
    /// Gold accent (active card border, highlighted buttons): #EAB308
    pub accent: [f32; 4],
    /// Primary text: #F5F5F4
    pub text: [f32; 4],
    /// Muted text (metadata rows, hints): #A8A29E
    pub text_muted: [f32; 4],
    /// Empty-state heading red: #DC2626
    pub alert: [f32; 4],
    /// Overlay backdrop (dims the gallery).
    pub backdrop: [f32; 4],

    // -- Panel defaults --
    pub panel_border_color: [f32; 4],
    pub panel_border_width: f32,
    pub panel_shadow_width: f32,
    pub panel_padding: f32,

    // -- Font sizes (pixels) --
    pub font_title_size: f32,
    pub font_body_size: f32,
    pub font_small_size: f32,

    // -- Rail / card geometry --
    /// Resting card width in pixels.
    pub card_width: f32,
    /// Expanded (active) card width in pixels.
    pub card_width_active: f32,
    /// Gap between cards in pixels.
    pub card_gap: f32,
    /// Rail strip height in pixels.
    pub rail_height: f32,
    /// Horizontal scrollbar thumb height.
    pub scrollbar_height: f32,
    pub scrollbar_color: [f32; 4],

    // -- Chrome --
    /// Vertical gap between stacked labels.
    pub label_gap: f32,
    pub button_pad_h: f32,
    pub button_pad_v: f32,
    /// Footer category indicator dot diameter.
    pub dot_size: f32,
    pub dot_gap: f32,

    // -- Overlay --
    /// Detail panel width as a fraction of the screen.
    pub overlay_width_frac: f32,
    pub overlay_padding: f32,
}

/// Convert a hex color (#RRGGBB) to sRGB [f32; 4] with alpha 1.0.
const fn hex(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// Convert a hex color with custom alpha.
const fn hex_a(r: u8, g: u8, b: u8, a: f32) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a]
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: hex(0x05, 0x05, 0x05),
            surface: hex(0x11, 0x18, 0x27),
            surface_raised: hex(0x1F, 0x29, 0x37),
            accent: hex(0xEA, 0xB3, 0x08),
            text: hex(0xF5, 0xF5, 0xF4),
            text_muted: hex(0xA8, 0xA2, 0x9E),
            alert: hex(0xDC, 0x26, 0x26),
            backdrop: hex_a(0x00, 0x00, 0x00, 0.72),

            panel_border_color: hex_a(0xEA, 0xB3, 0x08, 0.4),
            panel_border_width: 1.0,
            panel_shadow_width: 6.0,
            panel_padding: 12.0,

            font_title_size: 20.0,
            font_body_size: 13.0,
            font_small_size: 10.0,

            card_width: 180.0,
            card_width_active: 320.0,
            card_gap: 12.0,
            rail_height: 340.0,
            scrollbar_height: 5.0,
            scrollbar_color: hex_a(0xEA, 0xB3, 0x08, 0.5),

            label_gap: 4.0,
            button_pad_h: 8.0,
            button_pad_v: 4.0,
            dot_size: 6.0,
            dot_gap: 8.0,

            overlay_width_frac: 0.62,
            overlay_padding: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette() {
        let t = Theme::default();

        // Accent #EAB308
        assert!((t.accent[0] - 0.918).abs() < 0.01);
        assert!((t.accent[1] - 0.702).abs() < 0.01);
        assert!((t.accent[2] - 0.031).abs() < 0.01);

        // Background is near-black and opaque.
        assert!(t.bg[0] < 0.03 && t.bg[1] < 0.03 && t.bg[2] < 0.03);
        assert!((t.bg[3] - 1.0).abs() < 0.001);

        // Backdrop dims but doesn't blank the gallery.
        assert!(t.backdrop[3] > 0.5 && t.backdrop[3] < 1.0);
    }

    #[test]
    fn hex_conversion() {
        let white = hex(0xFF, 0xFF, 0xFF);
        assert!((white[0] - 1.0).abs() < 0.001);
        assert!((white[3] - 1.0).abs() < 0.001);

        let half = hex_a(0x80, 0x80, 0x80, 0.5);
        assert!((half[3] - 0.5).abs() < 0.001);
    }

    #[test]
    fn active_card_is_wider_than_resting() {
        let t = Theme::default();
        assert!(t.card_width_active > t.card_width);
    }
}
