use std::collections::HashMap;

use winit::keyboard::KeyCode;

/// Modifier flags for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModifierFlags {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl ModifierFlags {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };
}

/// A key combination: modifier flags + a physical key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifiers: ModifierFlags,
    pub key: KeyCode,
}

impl KeyCombo {
    /// Plain key, no modifiers.
    pub const fn plain(key: KeyCode) -> Self {
        Self {
            modifiers: ModifierFlags::NONE,
            key,
        }
    }
}

/// Actions that can be triggered by keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Close topmost surface (search focus → detail overlay → exit).
    CloseTopmost,
    /// Move keyboard focus into the search field.
    FocusSearch,
    /// Jump the rail to its first card.
    RailHome,
    /// Jump the rail to its last card.
    RailEnd,
}

/// Configurable keyboard shortcut map.
pub struct KeyBindings {
    map: HashMap<KeyCombo, Action>,
    /// Reverse lookup: action → first combo that maps to it.
    reverse: HashMap<Action, KeyCombo>,
}

impl KeyBindings {
    pub fn defaults() -> Self {
        let mut map = HashMap::new();

        map.insert(KeyCombo::plain(KeyCode::Escape), Action::CloseTopmost);
        map.insert(KeyCombo::plain(KeyCode::Slash), Action::FocusSearch);
        map.insert(KeyCombo::plain(KeyCode::Home), Action::RailHome);
        map.insert(KeyCombo::plain(KeyCode::End), Action::RailEnd);

        let reverse = Self::build_reverse(&map);
        Self { map, reverse }
    }

    /// Look up the action for a key combination.
    pub fn lookup(&self, combo: KeyCombo) -> Option<Action> {
        self.map.get(&combo).copied()
    }

    /// Get the display label for an action's keybinding (e.g. "Esc", "/").
    pub fn label_for(&self, action: Action) -> Option<String> {
        self.reverse.get(&action).map(|combo| {
            let mut parts = Vec::new();
            if combo.modifiers.ctrl {
                parts.push("Ctrl");
            }
            if combo.modifiers.alt {
                parts.push("Alt");
            }
            if combo.modifiers.shift {
                parts.push("Shift");
            }
            parts.push(key_name(combo.key));
            parts.join("+")
        })
    }

    fn build_reverse(map: &HashMap<KeyCombo, Action>) -> HashMap<Action, KeyCombo> {
        let mut reverse = HashMap::new();
        for (&combo, &action) in map {
            // First combo wins; HashMap iteration order is arbitrary but the
            // defaults map one combo per action.
            reverse.entry(action).or_insert(combo);
        }
        reverse
    }
}

/// Human-readable name for a key code.
fn key_name(key: KeyCode) -> &'static str {
    match key {
        KeyCode::Space => "Space",
        KeyCode::Escape => "Esc",
        KeyCode::Tab => "Tab",
        KeyCode::Slash => "/",
        KeyCode::Enter => "Enter",
        KeyCode::Backspace => "Bksp",
        KeyCode::Delete => "Del",
        KeyCode::ArrowUp => "Up",
        KeyCode::ArrowDown => "Down",
        KeyCode::ArrowLeft => "Left",
        KeyCode::ArrowRight => "Right",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PgUp",
        KeyCode::PageDown => "PgDn",
        _ => "?",
    }
}
