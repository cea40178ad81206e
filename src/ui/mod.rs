mod animation;
mod draw;
mod input;
mod keybindings;
mod theme;
mod views;
mod widget;

#[allow(unused_imports)] // Public API: used by view builders constructing widgets.
pub use animation::{Animator, Easing};
pub use draw::{DrawList, PanelCommand, TextCommand};
#[allow(unused_imports)] // Public API: used by main.rs for input routing.
pub use input::{InputResponse, MouseButton, UiState};
#[allow(unused_imports)] // Public API: used by main.rs for shortcut dispatch.
pub use keybindings::{Action, KeyBindings, KeyCombo, ModifierFlags};
pub use theme::Theme;
pub use views::{ViewHandles, ViewInputs, build_views};
pub use widget::Widget;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle into the widget arena. Stable across insertions/removals.
    pub struct WidgetId;
}

// ---------------------------------------------------------------------------
// Geometry primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Returns true if the point (px, py) is inside this rectangle.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Padding / margin edges (top, right, bottom, left — CSS order).
#[derive(Debug, Clone, Copy, Default)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

// ---------------------------------------------------------------------------
// Positioning mode
// ---------------------------------------------------------------------------

/// How a widget is positioned within its parent.
#[derive(Debug, Clone, Copy)]
pub enum Position {
    /// Fixed pixel offset from parent's content origin.
    Fixed { x: f32, y: f32 },
    /// Percentage of parent's content area (0.0–1.0).
    Percent { x: f32, y: f32 },
}

impl Default for Position {
    fn default() -> Self {
        Position::Fixed { x: 0.0, y: 0.0 }
    }
}

/// How a widget's width/height is determined.
#[derive(Debug, Clone, Copy, Default)]
pub enum Sizing {
    /// Fixed pixel size.
    Fixed(f32),
    /// Percentage of parent's content dimension (0.0–1.0).
    Percent(f32),
    /// Fit to content (intrinsic size from measure).
    #[default]
    Fit,
}

// ---------------------------------------------------------------------------
// Widget node (arena entry)
// ---------------------------------------------------------------------------

/// Internal arena entry pairing a widget with tree/layout metadata.
pub struct WidgetNode {
    pub widget: Widget,
    pub parent: Option<WidgetId>,
    pub children: Vec<WidgetId>,
    pub position: Position,
    pub width: Sizing,
    pub height: Sizing,
    pub padding: Edges,
    pub margin: Edges,
    pub dirty: bool,
    /// Computed layout rect (set by layout pass).
    pub rect: Rect,
    /// Measured intrinsic size (set by measure pass).
    pub measured: Size,
}

// ---------------------------------------------------------------------------
// WidgetTree
// ---------------------------------------------------------------------------

/// Arena-backed retained widget tree.
pub struct WidgetTree {
    arena: SlotMap<WidgetId, WidgetNode>,
    roots: Vec<WidgetId>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
            roots: Vec::new(),
        }
    }

    /// Insert a widget as a root (no parent).
    pub fn insert_root(&mut self, widget: Widget) -> WidgetId {
        let id = self.arena.insert(WidgetNode {
            widget,
            parent: None,
            children: Vec::new(),
            position: Position::default(),
            width: Sizing::default(),
            height: Sizing::default(),
            padding: Edges::ZERO,
            margin: Edges::ZERO,
            dirty: true,
            rect: Rect::default(),
            measured: Size::default(),
        });
        self.roots.push(id);
        id
    }

    /// Insert a widget as a child of `parent`. Returns the new widget's id.
    pub fn insert(&mut self, parent: WidgetId, widget: Widget) -> WidgetId {
        let id = self.arena.insert(WidgetNode {
            widget,
            parent: Some(parent),
            children: Vec::new(),
            position: Position::default(),
            width: Sizing::default(),
            height: Sizing::default(),
            padding: Edges::ZERO,
            margin: Edges::ZERO,
            dirty: true,
            rect: Rect::default(),
            measured: Size::default(),
        });
        if let Some(parent_node) = self.arena.get_mut(parent) {
            parent_node.children.push(id);
            parent_node.dirty = true;
        }
        id
    }

    /// Remove a widget and all its descendants.
    pub fn remove(&mut self, id: WidgetId) {
        // Collect descendants depth-first.
        let mut to_remove = Vec::new();
        Self::collect_subtree(&self.arena, id, &mut to_remove);

        // Unlink from parent.
        if let Some(node) = self.arena.get(id)
            && let Some(parent_id) = node.parent
            && let Some(parent) = self.arena.get_mut(parent_id)
        {
            parent.children.retain(|c| *c != id);
            parent.dirty = true;
        }

        // Remove from roots if present.
        self.roots.retain(|r| *r != id);

        // Remove all nodes.
        for rid in to_remove {
            self.arena.remove(rid);
        }
    }

    fn collect_subtree(
        arena: &SlotMap<WidgetId, WidgetNode>,
        id: WidgetId,
        out: &mut Vec<WidgetId>,
    ) {
        out.push(id);
        if let Some(node) = arena.get(id) {
            for &child in &node.children {
                Self::collect_subtree(arena, child, out);
            }
        }
    }

    /// Get a reference to a widget node.
    pub fn get(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.arena.get(id)
    }

    /// Get a mutable reference to a widget node.
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetNode> {
        self.arena.get_mut(id)
    }

    /// Set position mode for a widget.
    pub fn set_position(&mut self, id: WidgetId, pos: Position) {
        if let Some(node) = self.arena.get_mut(id) {
            node.position = pos;
            node.dirty = true;
        }
    }

    /// Set sizing for a widget.
    pub fn set_sizing(&mut self, id: WidgetId, w: Sizing, h: Sizing) {
        if let Some(node) = self.arena.get_mut(id) {
            node.width = w;
            node.height = h;
            node.dirty = true;
        }
    }

    /// Set padding for a widget.
    pub fn set_padding(&mut self, id: WidgetId, padding: Edges) {
        if let Some(node) = self.arena.get_mut(id) {
            node.padding = padding;
            node.dirty = true;
        }
    }

    /// Set margin for a widget.
    pub fn set_margin(&mut self, id: WidgetId, margin: Edges) {
        if let Some(node) = self.arena.get_mut(id) {
            node.margin = margin;
            node.dirty = true;
        }
    }

    /// Mark a widget and its ancestors as dirty.
    pub fn mark_dirty(&mut self, id: WidgetId) {
        let mut current = Some(id);
        while let Some(cid) = current {
            if let Some(node) = self.arena.get_mut(cid) {
                if node.dirty {
                    break; // already dirty up from here
                }
                node.dirty = true;
                current = node.parent;
            } else {
                break;
            }
        }
    }

    /// Root widget ids.
    pub fn roots(&self) -> &[WidgetId] {
        &self.roots
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    /// Find the topmost widget whose rect contains the point (x, y).
    /// Walks back-to-front: last child / last root is topmost.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<WidgetId> {
        for &root in self.roots.iter().rev() {
            if let Some(hit) = self.hit_test_node(root, x, y) {
                return Some(hit);
            }
        }
        None
    }

    fn hit_test_node(&self, id: WidgetId, x: f32, y: f32) -> Option<WidgetId> {
        let node = self.arena.get(id)?;
        if !node.rect.contains(x, y) {
            return None;
        }
        // Children drawn on top — check last child first.
        for &child in node.children.iter().rev() {
            if let Some(hit) = self.hit_test_node(child, x, y) {
                return Some(hit);
            }
        }
        Some(id)
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Run the full layout pass over the tree. `screen` is the available area.
    pub fn layout(&mut self, screen: Size, line_height: f32) {
        let root_ids: Vec<WidgetId> = self.roots.clone();
        for root in root_ids {
            self.layout_node(
                root,
                Rect {
                    x: 0.0,
                    y: 0.0,
                    width: screen.width,
                    height: screen.height,
                },
                line_height,
            );
        }
    }

    fn layout_node(&mut self, id: WidgetId, parent_content: Rect, line_height: f32) {
        // Measure intrinsic size.
        let measured = self.measure_node(id, line_height);

        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        node.measured = measured;

        // Resolve width/height from Sizing.
        let resolved_w = match node.width {
            Sizing::Fixed(px) => px,
            Sizing::Percent(frac) => parent_content.width * frac,
            Sizing::Fit => measured.width + node.padding.horizontal(),
        };
        let resolved_h = match node.height {
            Sizing::Fixed(px) => px,
            Sizing::Percent(frac) => parent_content.height * frac,
            Sizing::Fit => measured.height + node.padding.vertical(),
        };

        // Resolve position.
        let (ox, oy) = match node.position {
            Position::Fixed { x, y } => (x, y),
            Position::Percent { x, y } => (parent_content.width * x, parent_content.height * y),
        };

        node.rect = Rect {
            x: parent_content.x + node.margin.left + ox,
            y: parent_content.y + node.margin.top + oy,
            width: resolved_w,
            height: resolved_h,
        };
        node.dirty = false;

        // Content area for children (inside padding).
        let content = Rect {
            x: node.rect.x + node.padding.left,
            y: node.rect.y + node.padding.top,
            width: (node.rect.width - node.padding.horizontal()).max(0.0),
            height: (node.rect.height - node.padding.vertical()).max(0.0),
        };

        // Rail positions children left-to-right with virtual scrolling.
        // Each card's width comes from its own Sizing, so the expanded card
        // can be wider than its neighbours without disturbing the walk.
        if let Widget::Rail {
            gap, scroll_offset, ..
        } = &node.widget
        {
            let gap = *gap;
            let so = *scroll_offset;
            let children: Vec<WidgetId> = node.children.clone();
            let viewport_w = content.width;

            let mut cursor = 0.0;
            for child_id in children {
                let child_w = self.resolve_rail_child_width(child_id, viewport_w, line_height);
                let item_x = cursor - so;
                cursor += child_w + gap;

                // Virtual layout: cards outside the viewport get a zero rect.
                if item_x + child_w < 0.0 || item_x >= viewport_w {
                    if let Some(child_node) = self.arena.get_mut(child_id) {
                        child_node.rect = Rect::default();
                        child_node.dirty = false;
                    }
                    continue;
                }

                self.layout_rail_card(
                    child_id,
                    content.x + item_x,
                    content.y,
                    child_w,
                    content.height,
                    line_height,
                );
            }
            return;
        }

        let children: Vec<WidgetId> = node.children.clone();
        for child in children {
            self.layout_node(child, content, line_height);
        }
    }

    /// Resolve the width a rail assigns to one of its cards.
    fn resolve_rail_child_width(
        &self,
        id: WidgetId,
        viewport_w: f32,
        line_height: f32,
    ) -> f32 {
        let Some(node) = self.arena.get(id) else {
            return 0.0;
        };
        match node.width {
            Sizing::Fixed(px) => px,
            Sizing::Percent(frac) => viewport_w * frac,
            Sizing::Fit => {
                self.measure_node(id, line_height).width + node.padding.horizontal()
            }
        }
    }

    /// Layout a rail card: set its rect directly and recurse into its children.
    fn layout_rail_card(
        &mut self,
        id: WidgetId,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_height: f32,
    ) {
        let measured = self.measure_node(id, line_height);

        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        node.measured = measured;
        node.rect = Rect {
            x,
            y,
            width,
            height,
        };
        node.dirty = false;

        // Content area for children (inside padding).
        let content = Rect {
            x: x + node.padding.left,
            y: y + node.padding.top,
            width: (width - node.padding.horizontal()).max(0.0),
            height: (height - node.padding.vertical()).max(0.0),
        };

        let children: Vec<WidgetId> = node.children.clone();
        for child in children {
            self.layout_node(child, content, line_height);
        }
    }

    /// Measure intrinsic size of a widget (content only, no padding).
    pub fn measure_node(&self, id: WidgetId, line_height: f32) -> Size {
        let Some(node) = self.arena.get(id) else {
            return Size::default();
        };

        match &node.widget {
            Widget::Label {
                text, font_size, ..
            } => {
                // Approximate: char count * estimated glyph width, one line height.
                // Font size ratio relative to base line_height.
                let scale = font_size / line_height;
                let char_w = line_height * 0.6 * scale; // rough estimate
                let h = line_height * scale;
                Size {
                    width: text.chars().count() as f32 * char_w,
                    height: h,
                }
            }
            Widget::Button {
                text, font_size, ..
            } => {
                let scale = font_size / line_height;
                let char_w = line_height * 0.6 * scale;
                let h = line_height * scale;
                // Button adds internal padding (8px horizontal, 4px vertical).
                Size {
                    width: text.chars().count() as f32 * char_w + 16.0,
                    height: h + 8.0,
                }
            }
            Widget::Panel { .. } => {
                // Panel measures from children bounding box.
                let mut max_w: f32 = 0.0;
                let mut max_h: f32 = 0.0;
                for &child_id in &node.children {
                    if let Some(child) = self.arena.get(child_id) {
                        let child_measured = self.measure_node(child_id, line_height);
                        let (cx, cy) = match child.position {
                            Position::Fixed { x, y } => (x, y),
                            Position::Percent { .. } => (0.0, 0.0),
                        };
                        max_w = max_w.max(
                            cx + child_measured.width
                                + child.padding.horizontal()
                                + child.margin.horizontal(),
                        );
                        max_h = max_h.max(
                            cy + child_measured.height
                                + child.padding.vertical()
                                + child.margin.vertical(),
                        );
                    }
                }
                Size {
                    width: max_w,
                    height: max_h,
                }
            }
            Widget::Rail { gap, .. } => {
                // Total content width = sum of card widths + gaps.
                let mut total_w: f32 = 0.0;
                let mut max_h: f32 = 0.0;
                for (i, &child_id) in node.children.iter().enumerate() {
                    let child_measured = self.measure_node(child_id, line_height);
                    let w = if let Some(child) = self.arena.get(child_id) {
                        match child.width {
                            Sizing::Fixed(px) => px,
                            _ => child_measured.width,
                        }
                    } else {
                        0.0
                    };
                    if i > 0 {
                        total_w += gap;
                    }
                    total_w += w;
                    max_h = max_h.max(child_measured.height);
                }
                Size {
                    width: total_w,
                    height: max_h,
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Draw
    // ------------------------------------------------------------------

    /// Walk the tree and emit draw commands into a `DrawList`.
    pub fn draw(&self, draw_list: &mut DrawList) {
        for &root in &self.roots {
            self.draw_node(root, draw_list);
        }
    }

    fn draw_node(&self, id: WidgetId, draw_list: &mut DrawList) {
        let Some(node) = self.arena.get(id) else {
            return;
        };

        match &node.widget {
            Widget::Panel {
                bg_color,
                border_color,
                border_width,
                shadow_width,
            } => {
                draw_list.panels.push(PanelCommand {
                    rect: node.rect,
                    bg_color: *bg_color,
                    border_color: *border_color,
                    border_width: *border_width,
                    shadow_width: *shadow_width,
                });
            }
            Widget::Label {
                text,
                color,
                font_size,
            } => {
                draw_list.texts.push(TextCommand {
                    text: text.clone(),
                    x: node.rect.x,
                    y: node.rect.y,
                    color: *color,
                    font_size: *font_size,
                });
            }
            Widget::Button {
                text,
                color,
                bg_color,
                border_color,
                font_size,
            } => {
                // Button = panel background + offset text.
                draw_list.panels.push(PanelCommand {
                    rect: node.rect,
                    bg_color: *bg_color,
                    border_color: *border_color,
                    border_width: 1.0,
                    shadow_width: 0.0,
                });
                // Text offset by internal button padding.
                draw_list.texts.push(TextCommand {
                    text: text.clone(),
                    x: node.rect.x + 8.0,
                    y: node.rect.y + 4.0,
                    color: *color,
                    font_size: *font_size,
                });
            }
            Widget::Rail {
                bg_color,
                scroll_offset,
                scrollbar_color,
                scrollbar_height,
                ..
            } => {
                // Background panel.
                draw_list
                    .panels
                    .push(PanelCommand::flat(node.rect, *bg_color));

                let viewport_w = (node.rect.width - node.padding.horizontal()).max(0.0);
                let total_w = self.rail_content_width(id);
                let content_x = node.rect.x + node.padding.left;
                let sb_h = *scrollbar_height;
                let sb_color = *scrollbar_color;
                let so = *scroll_offset;
                let rect = node.rect;
                let padding = node.padding;

                // Draw only visible cards (those with non-zero rects from layout).
                for &child in &node.children {
                    if let Some(cn) = self.arena.get(child)
                        && cn.rect.width > 0.0
                        && cn.rect.height > 0.0
                    {
                        self.draw_node(child, draw_list);
                    }
                }

                // Horizontal scrollbar thumb (auto-hides when content fits).
                if total_w > viewport_w && viewport_w > 0.0 {
                    let thumb_ratio = viewport_w / total_w;
                    let thumb_w = (viewport_w * thumb_ratio).max(Self::MIN_THUMB_WIDTH);
                    let track_range = viewport_w - thumb_w;
                    let max_scroll = total_w - viewport_w;
                    let thumb_x = if max_scroll > 0.0 {
                        content_x + (so / max_scroll) * track_range
                    } else {
                        content_x
                    };
                    let sb_y = rect.y + rect.height - sb_h - padding.bottom;

                    draw_list.panels.push(PanelCommand::flat(
                        Rect {
                            x: thumb_x,
                            y: sb_y,
                            width: thumb_w,
                            height: sb_h,
                        },
                        sb_color,
                    ));
                }

                return; // Rail handles its own children.
            }
        }

        // Draw children on top (non-Rail widgets).
        for &child in &node.children {
            self.draw_node(child, draw_list);
        }
    }

    // ------------------------------------------------------------------
    // Rail helpers
    // ------------------------------------------------------------------

    /// Minimum scrollbar thumb width in pixels.
    const MIN_THUMB_WIDTH: f32 = 20.0;

    /// Total content width of a rail: card widths plus gaps between them.
    pub fn rail_content_width(&self, id: WidgetId) -> f32 {
        let Some(node) = self.arena.get(id) else {
            return 0.0;
        };
        let Widget::Rail { gap, .. } = &node.widget else {
            return 0.0;
        };
        let viewport_w = (node.rect.width - node.padding.horizontal()).max(0.0);
        let mut total = 0.0;
        for (i, &child_id) in node.children.iter().enumerate() {
            if i > 0 {
                total += gap;
            }
            // Card heights fill the rail; widths use a default line height since
            // rail cards are fixed- or percent-sized, never text-measured.
            total += self.resolve_rail_child_width(child_id, viewport_w, 16.0);
        }
        total
    }

    /// Per-card horizontal spans (start, end) in rail content coordinates,
    /// ignoring the scroll offset. Used for pointer resolution against cards
    /// that may be scrolled out of the viewport.
    pub fn rail_card_spans(&self, id: WidgetId) -> Vec<(WidgetId, f32, f32)> {
        let Some(node) = self.arena.get(id) else {
            return Vec::new();
        };
        let Widget::Rail { gap, .. } = &node.widget else {
            return Vec::new();
        };
        let viewport_w = (node.rect.width - node.padding.horizontal()).max(0.0);
        let mut spans = Vec::with_capacity(node.children.len());
        let mut cursor = 0.0;
        for &child_id in &node.children {
            let w = self.resolve_rail_child_width(child_id, viewport_w, 16.0);
            spans.push((child_id, cursor, cursor + w));
            cursor += w + gap;
        }
        spans
    }

    /// Compute maximum scroll offset for a rail.
    /// Returns 0.0 if content fits in the viewport.
    pub fn max_rail_scroll(&self, id: WidgetId) -> f32 {
        let Some(node) = self.arena.get(id) else {
            return 0.0;
        };
        if !matches!(node.widget, Widget::Rail { .. }) {
            return 0.0;
        }
        let viewport_w = (node.rect.width - node.padding.horizontal()).max(0.0);
        (self.rail_content_width(id) - viewport_w).max(0.0)
    }

    /// Set scroll offset for a rail, clamped to valid range.
    pub fn set_rail_scroll(&mut self, id: WidgetId, offset: f32) {
        let max = self.max_rail_scroll(id);
        if let Some(node) = self.arena.get_mut(id)
            && let Widget::Rail { scroll_offset, .. } = &mut node.widget
        {
            *scroll_offset = offset.clamp(0.0, max);
        }
        self.mark_dirty(id);
    }

    /// Scroll a rail by a delta (positive = right).
    pub fn scroll_rail_by(&mut self, id: WidgetId, delta: f32) {
        let current = self.rail_scroll(id);
        self.set_rail_scroll(id, current + delta);
    }

    /// Current scroll offset of a rail (0.0 for non-rails).
    pub fn rail_scroll(&self, id: WidgetId) -> f32 {
        self.arena
            .get(id)
            .and_then(|n| {
                if let Widget::Rail { scroll_offset, .. } = &n.widget {
                    Some(*scroll_offset)
                } else {
                    None
                }
            })
            .unwrap_or(0.0)
    }

    /// Scroll so that the card at `child_index` is fully inside the viewport.
    pub fn ensure_card_visible(&mut self, id: WidgetId, child_index: usize) {
        let spans = self.rail_card_spans(id);
        let Some(&(_, card_left, card_right)) = spans.get(child_index) else {
            return;
        };
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let viewport_w = (node.rect.width - node.padding.horizontal()).max(0.0);
        if viewport_w <= 0.0 {
            return;
        }
        let so = self.rail_scroll(id);

        let new_offset = if card_left < so {
            card_left
        } else if card_right > so + viewport_w {
            card_right - viewport_w
        } else {
            return; // already visible
        };

        self.set_rail_scroll(id, new_offset);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Widget {
        Widget::Panel {
            bg_color: [0.0; 4],
            border_color: [0.0; 4],
            border_width: 0.0,
            shadow_width: 0.0,
        }
    }

    #[test]
    fn insert_root_and_child() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(panel());
        assert_eq!(tree.roots().len(), 1);

        let child = tree.insert(
            root,
            Widget::Label {
                text: "Hello".into(),
                color: [1.0; 4],
                font_size: 14.0,
            },
        );
        let root_node = tree.get(root).expect("root exists");
        assert_eq!(root_node.children.len(), 1);
        assert_eq!(root_node.children[0], child);

        let child_node = tree.get(child).expect("child exists");
        assert_eq!(child_node.parent, Some(root));
    }

    #[test]
    fn remove_subtree() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(panel());
        let child = tree.insert(
            root,
            Widget::Label {
                text: "A".into(),
                color: [1.0; 4],
                font_size: 14.0,
            },
        );
        let grandchild = tree.insert(
            child,
            Widget::Label {
                text: "B".into(),
                color: [1.0; 4],
                font_size: 14.0,
            },
        );

        tree.remove(child);

        // Child and grandchild gone.
        assert!(tree.get(child).is_none());
        assert!(tree.get(grandchild).is_none());
        // Root still exists, no children.
        let root_node = tree.get(root).expect("root exists");
        assert!(root_node.children.is_empty());
    }

    #[test]
    fn dirty_propagation() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(panel());
        let child = tree.insert(
            root,
            Widget::Label {
                text: "X".into(),
                color: [1.0; 4],
                font_size: 14.0,
            },
        );

        // Clear dirty flags via layout.
        tree.layout(
            Size {
                width: 800.0,
                height: 600.0,
            },
            14.0,
        );
        assert!(!tree.get(root).expect("root").dirty);
        assert!(!tree.get(child).expect("child").dirty);

        // Mark child dirty — should propagate to root.
        tree.mark_dirty(child);
        assert!(tree.get(child).expect("child").dirty);
        assert!(tree.get(root).expect("root").dirty);
    }

    #[test]
    fn layout_fixed_position() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(panel());
        tree.set_position(root, Position::Fixed { x: 20.0, y: 30.0 });
        tree.set_sizing(root, Sizing::Fixed(200.0), Sizing::Fixed(100.0));
        tree.set_padding(root, Edges::all(10.0));

        let label = tree.insert(
            root,
            Widget::Label {
                text: "Hello".into(),
                color: [1.0; 4],
                font_size: 14.0,
            },
        );
        tree.set_position(label, Position::Fixed { x: 0.0, y: 0.0 });

        tree.layout(
            Size {
                width: 800.0,
                height: 600.0,
            },
            14.0,
        );

        let root_rect = tree.get(root).expect("root").rect;
        assert!((root_rect.x - 20.0).abs() < 0.01);
        assert!((root_rect.y - 30.0).abs() < 0.01);
        assert!((root_rect.width - 200.0).abs() < 0.01);
        assert!((root_rect.height - 100.0).abs() < 0.01);

        // Label inside panel's content area (offset by padding).
        let label_rect = tree.get(label).expect("label").rect;
        assert!((label_rect.x - 30.0).abs() < 0.01); // 20 + 10 padding
        assert!((label_rect.y - 40.0).abs() < 0.01); // 30 + 10 padding
    }

    #[test]
    fn layout_percent_sizing() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(panel());
        tree.set_sizing(root, Sizing::Percent(0.5), Sizing::Percent(0.25));

        tree.layout(
            Size {
                width: 800.0,
                height: 600.0,
            },
            14.0,
        );

        let rect = tree.get(root).expect("panel").rect;
        assert!((rect.width - 400.0).abs() < 0.01);
        assert!((rect.height - 150.0).abs() < 0.01);
    }

    #[test]
    fn hit_test_topmost_wins() {
        let mut tree = WidgetTree::new();
        let below = tree.insert_root(panel());
        tree.set_position(below, Position::Fixed { x: 0.0, y: 0.0 });
        tree.set_sizing(below, Sizing::Fixed(100.0), Sizing::Fixed(100.0));

        let above = tree.insert_root(panel());
        tree.set_position(above, Position::Fixed { x: 50.0, y: 50.0 });
        tree.set_sizing(above, Sizing::Fixed(100.0), Sizing::Fixed(100.0));

        tree.layout(
            Size {
                width: 800.0,
                height: 600.0,
            },
            14.0,
        );

        // Overlap region: later root wins.
        assert_eq!(tree.hit_test(75.0, 75.0), Some(above));
        // Non-overlap region: only the first root.
        assert_eq!(tree.hit_test(25.0, 25.0), Some(below));
        // Outside both.
        assert_eq!(tree.hit_test(300.0, 300.0), None);
    }

    #[test]
    fn draw_list_output() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Panel {
            bg_color: [0.5, 0.5, 0.5, 0.9],
            border_color: [1.0, 0.8, 0.2, 1.0],
            border_width: 2.0,
            shadow_width: 6.0,
        });
        tree.set_position(root, Position::Fixed { x: 10.0, y: 10.0 });
        tree.set_sizing(root, Sizing::Fixed(260.0), Sizing::Fixed(120.0));
        tree.set_padding(root, Edges::all(12.0));

        let _label = tree.insert(
            root,
            Widget::Label {
                text: "Peak of Anime".into(),
                color: [0.92, 0.7, 0.03, 1.0],
                font_size: 16.0,
            },
        );

        tree.layout(
            Size {
                width: 800.0,
                height: 600.0,
            },
            14.0,
        );

        let mut dl = DrawList::new();
        tree.draw(&mut dl);

        assert_eq!(dl.panels.len(), 1);
        assert_eq!(dl.texts.len(), 1);
        assert!((dl.panels[0].border_width - 2.0).abs() < 0.01);
        assert_eq!(dl.texts[0].text, "Peak of Anime");
    }

    // ------------------------------------------------------------------
    // Rail tests
    // ------------------------------------------------------------------

    /// Helper: build a rail with N cards of the given widths.
    fn rail_tree(card_widths: &[f32]) -> (WidgetTree, WidgetId, Vec<WidgetId>) {
        let mut tree = WidgetTree::new();
        let rail = tree.insert_root(Widget::Rail {
            bg_color: [0.1; 4],
            gap: 10.0,
            scroll_offset: 0.0,
            scrollbar_color: [0.8, 0.6, 0.3, 0.5],
            scrollbar_height: 5.0,
        });
        tree.set_position(rail, Position::Fixed { x: 0.0, y: 0.0 });
        // 400px wide viewport.
        tree.set_sizing(rail, Sizing::Fixed(400.0), Sizing::Fixed(200.0));
        tree.set_padding(rail, Edges::all(0.0));

        let mut cards = Vec::new();
        for &w in card_widths {
            let card = tree.insert(rail, panel());
            tree.set_sizing(card, Sizing::Fixed(w), Sizing::Percent(1.0));
            cards.push(card);
        }

        tree.layout(
            Size {
                width: 800.0,
                height: 600.0,
            },
            14.0,
        );
        (tree, rail, cards)
    }

    #[test]
    fn rail_lays_cards_left_to_right() {
        let (tree, _rail, cards) = rail_tree(&[100.0, 100.0, 100.0]);

        let a = tree.get(cards[0]).unwrap().rect;
        let b = tree.get(cards[1]).unwrap().rect;
        let c = tree.get(cards[2]).unwrap().rect;

        assert!((a.x - 0.0).abs() < 0.01);
        assert!((b.x - 110.0).abs() < 0.01); // 100 + 10 gap
        assert!((c.x - 220.0).abs() < 0.01);
        // Cards fill the rail height.
        assert!((a.height - 200.0).abs() < 0.01);
    }

    #[test]
    fn rail_honors_per_card_width() {
        // Middle card is expanded.
        let (tree, _rail, cards) = rail_tree(&[100.0, 250.0, 100.0]);

        let b = tree.get(cards[1]).unwrap().rect;
        let c = tree.get(cards[2]).unwrap().rect;
        assert!((b.width - 250.0).abs() < 0.01);
        // Third card is pushed right by the wider middle card.
        assert!((c.x - (100.0 + 10.0 + 250.0 + 10.0)).abs() < 0.01);
    }

    #[test]
    fn rail_virtual_layout_zeroes_offscreen_cards() {
        // 8 cards at 100px + gaps = 870px content in a 400px viewport.
        let widths = [100.0; 8];
        let (tree, _rail, cards) = rail_tree(&widths);

        // Cards 0-3 visible (card 3 starts at 330 < 400), cards 4+ offscreen.
        assert!(tree.get(cards[3]).unwrap().rect.width > 0.0);
        for &card in &cards[4..] {
            let rect = tree.get(card).unwrap().rect;
            assert!(rect.width == 0.0 && rect.height == 0.0);
        }
    }

    #[test]
    fn rail_scroll_shifts_visibility() {
        let widths = [100.0; 8];
        let (mut tree, rail, cards) = rail_tree(&widths);

        tree.set_rail_scroll(rail, 330.0);
        tree.layout(
            Size {
                width: 800.0,
                height: 600.0,
            },
            14.0,
        );

        // Card 0 (span 0..100) is now fully left of the viewport.
        let rect = tree.get(cards[0]).unwrap().rect;
        assert!(rect.width == 0.0);
        // Card 6 (span 660..760, item_x 330..430) is now visible.
        assert!(tree.get(cards[6]).unwrap().rect.width > 0.0);
    }

    #[test]
    fn rail_scroll_clamping() {
        let widths = [100.0; 8];
        let (mut tree, rail, _cards) = rail_tree(&widths);

        // Content = 8*100 + 7*10 = 870; max scroll = 870 - 400 = 470.
        assert!((tree.max_rail_scroll(rail) - 470.0).abs() < 0.01);

        tree.set_rail_scroll(rail, 9999.0);
        assert!((tree.rail_scroll(rail) - 470.0).abs() < 0.01);

        tree.set_rail_scroll(rail, -50.0);
        assert!(tree.rail_scroll(rail).abs() < 0.01);
    }

    #[test]
    fn rail_scrollbar_only_when_content_overflows() {
        // Fits: 3 cards * 100 + 2 gaps = 320 < 400.
        let (tree, _rail, _) = rail_tree(&[100.0, 100.0, 100.0]);
        let mut dl = DrawList::new();
        tree.draw(&mut dl);
        // rail bg + 3 card panels, no thumb.
        assert_eq!(dl.panels.len(), 4);

        // Overflows: thumb appears.
        let (tree, _rail, _) = rail_tree(&[100.0; 8]);
        let mut dl = DrawList::new();
        tree.draw(&mut dl);
        // rail bg + 4 visible cards + thumb.
        assert_eq!(dl.panels.len(), 6);
    }

    #[test]
    fn rail_card_spans_ignore_scroll() {
        let (mut tree, rail, cards) = rail_tree(&[100.0, 250.0, 100.0]);
        tree.set_rail_scroll(rail, 200.0);

        let spans = tree.rail_card_spans(rail);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].0, cards[0]);
        assert!((spans[0].1 - 0.0).abs() < 0.01 && (spans[0].2 - 100.0).abs() < 0.01);
        assert!((spans[1].1 - 110.0).abs() < 0.01 && (spans[1].2 - 360.0).abs() < 0.01);
        assert!((spans[2].1 - 370.0).abs() < 0.01);
    }

    #[test]
    fn ensure_card_visible_scrolls_right_then_left() {
        let widths = [100.0; 8];
        let (mut tree, rail, _cards) = rail_tree(&widths);

        // Card 6 spans 660..760; viewport is 400 wide.
        tree.ensure_card_visible(rail, 6);
        assert!((tree.rail_scroll(rail) - 360.0).abs() < 0.01);

        // Already visible: no change.
        tree.ensure_card_visible(rail, 6);
        assert!((tree.rail_scroll(rail) - 360.0).abs() < 0.01);

        // Scroll back to the first card.
        tree.ensure_card_visible(rail, 0);
        assert!(tree.rail_scroll(rail).abs() < 0.01);
    }
}
