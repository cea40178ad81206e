use super::widget::Widget;
use super::{WidgetId, WidgetTree};

/// Mouse button identifier (decoupled from winit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Outcome of routing a mouse event through the widget tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResponse {
    /// Event hit no widget.
    Ignored,
    /// Event hit a widget but produced no click.
    Consumed,
    /// A full click (press + release on the same widget) completed.
    Clicked(WidgetId),
}

/// Minimum pixel distance before a press becomes a drag.
const DRAG_THRESHOLD: f32 = 4.0;

/// Pixels scrolled per mouse wheel line.
const SCROLL_SPEED: f32 = 40.0;

/// Active scrollbar thumb drag state.
struct ScrollDrag {
    widget: WidgetId,
    start_mouse_x: f32,
    start_scroll_offset: f32,
    content_width: f32,
    viewport_width: f32,
}

/// Interaction state for the widget system. Lives on App, rebuilt never —
/// the widget tree is rebuilt each frame, so ids stored here are only
/// compared against the tree they came from.
pub struct UiState {
    /// Widget currently under the cursor.
    pub hovered: Option<WidgetId>,
    /// Widget being pressed (mouse down, not yet released).
    pressed: Option<WidgetId>,
    /// Mouse button that initiated the press.
    pressed_button: Option<MouseButton>,
    /// Widget with mouse capture (for drag operations).
    /// While captured, all mouse events route to this widget even if
    /// the cursor leaves its rect. Released on mouse-up.
    pub captured: Option<WidgetId>,
    /// Screen coords where the press started (for drag threshold).
    press_origin: Option<(f32, f32)>,
    /// Whether we've crossed the drag threshold for the current press.
    dragging: bool,
    /// Last known cursor position (screen coords).
    pub cursor: (f32, f32),
    /// Active scrollbar drag (if user is dragging a rail thumb).
    scroll_drag: Option<ScrollDrag>,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            hovered: None,
            pressed: None,
            pressed_button: None,
            captured: None,
            press_origin: None,
            dragging: false,
            cursor: (0.0, 0.0),
            scroll_drag: None,
        }
    }

    /// Forget widget ids from a previous frame's tree. Call before handing
    /// out ids from a freshly rebuilt tree.
    pub fn reset_frame_ids(&mut self) {
        self.hovered = None;
        self.pressed = None;
        self.captured = None;
        self.scroll_drag = None;
        self.press_origin = None;
        self.dragging = false;
    }

    /// Handle cursor movement. Returns true if the cursor is over a widget.
    pub fn handle_cursor_moved(&mut self, tree: &mut WidgetTree, x: f32, y: f32) -> bool {
        self.cursor = (x, y);

        // Active scrollbar drag — update scroll offset from mouse position.
        if let Some(ref drag) = self.scroll_drag {
            let delta_x = x - drag.start_mouse_x;
            let thumb_w = (drag.viewport_width * drag.viewport_width / drag.content_width)
                .max(WidgetTree::MIN_THUMB_WIDTH);
            let available_track = drag.viewport_width - thumb_w;
            if available_track > 0.0 {
                let max_scroll = drag.content_width - drag.viewport_width;
                let new_offset = drag.start_scroll_offset + delta_x * max_scroll / available_track;
                let widget_id = drag.widget;
                tree.set_rail_scroll(widget_id, new_offset);
            }
            self.hovered = tree.hit_test(x, y);
            return true;
        }

        // If a widget has capture, track the drag threshold.
        if self.captured.is_some() {
            if let Some(origin) = self.press_origin {
                let dx = x - origin.0;
                let dy = y - origin.1;
                if !self.dragging && (dx * dx + dy * dy).sqrt() >= DRAG_THRESHOLD {
                    self.dragging = true;
                }
            }
            self.hovered = tree.hit_test(x, y);
            return true;
        }

        let hit = tree.hit_test(x, y);
        self.hovered = hit;
        hit.is_some()
    }

    /// Handle mouse button press/release.
    pub fn handle_mouse_input(
        &mut self,
        tree: &mut WidgetTree,
        button: MouseButton,
        pressed: bool,
        x: f32,
        y: f32,
    ) -> InputResponse {
        self.cursor = (x, y);

        if pressed {
            // Mouse down
            let hit = if let Some(cap) = self.captured {
                Some(cap)
            } else {
                tree.hit_test(x, y)
            };

            if let Some(widget_id) = hit {
                self.pressed = Some(widget_id);
                self.pressed_button = Some(button);
                self.press_origin = Some((x, y));
                self.dragging = false;

                // Pressing a rail's scrollbar strip starts a thumb drag.
                if button == MouseButton::Left
                    && let Some(scroll_drag) = Self::try_start_scrollbar_drag(tree, widget_id, x, y)
                {
                    self.scroll_drag = Some(scroll_drag);
                    self.captured = Some(widget_id);
                    return InputResponse::Consumed;
                }

                self.captured = Some(widget_id);
                return InputResponse::Consumed;
            }

            return InputResponse::Ignored;
        }

        // Mouse up
        let was_pressed = self.pressed.take();
        let was_captured = self.captured.take();
        let was_dragging = self.dragging;
        let was_scrollbar_drag = self.scroll_drag.take().is_some();
        self.pressed_button.take();
        self.press_origin = None;
        self.dragging = false;

        if was_captured.is_some() {
            if !was_scrollbar_drag
                && !was_dragging
                && let Some(pressed_id) = was_pressed
            {
                let release_hit = tree.hit_test(x, y);
                if release_hit == Some(pressed_id) {
                    return InputResponse::Clicked(pressed_id);
                }
            }
            return InputResponse::Consumed;
        }

        InputResponse::Ignored
    }

    /// Handle scroll wheel. Wheel lines scroll the rail under the cursor
    /// horizontally. Returns true if consumed.
    pub fn handle_scroll(&mut self, tree: &mut WidgetTree, delta: f32) -> bool {
        let hit = tree.hit_test(self.cursor.0, self.cursor.1);
        if let Some(widget_id) = hit {
            if let Some(rail_id) = Self::find_rail_ancestor(tree, widget_id) {
                tree.scroll_rail_by(rail_id, delta * SCROLL_SPEED);
                return true;
            }
            return true;
        }
        false
    }

    /// Walk from `start` up the parent chain to find a Rail widget.
    pub fn find_rail_ancestor(tree: &WidgetTree, start: WidgetId) -> Option<WidgetId> {
        let mut current = Some(start);
        while let Some(id) = current {
            let node = tree.get(id)?;
            if matches!(node.widget, Widget::Rail { .. }) {
                return Some(id);
            }
            current = node.parent;
        }
        None
    }

    /// Check if a mouse press at height `y` is on a rail's scrollbar strip.
    /// If so, return a ScrollDrag to begin thumb dragging.
    fn try_start_scrollbar_drag(
        tree: &WidgetTree,
        widget_id: WidgetId,
        x: f32,
        y: f32,
    ) -> Option<ScrollDrag> {
        let node = tree.get(widget_id)?;
        let Widget::Rail {
            scroll_offset,
            scrollbar_height,
            ..
        } = &node.widget
        else {
            return None;
        };

        let viewport_w = (node.rect.width - node.padding.horizontal()).max(0.0);
        let total_w = tree.rail_content_width(widget_id);

        // No scrollbar if content fits.
        if total_w <= viewport_w {
            return None;
        }

        // Scrollbar strip is the bottom scrollbar_height pixels of the rail.
        let sb_y = node.rect.y + node.rect.height - scrollbar_height - node.padding.bottom;
        if y >= sb_y {
            return Some(ScrollDrag {
                widget: widget_id,
                start_mouse_x: x,
                start_scroll_offset: *scroll_offset,
                content_width: total_w,
                viewport_width: viewport_w,
            });
        }

        None
    }
}
