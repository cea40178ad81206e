//! Per-frame widget tree construction. The tree is rebuilt from scratch
//! every frame from catalog + session state; handles returned here let
//! main.rs map clicks back onto domain actions.

use std::time::Instant;

use smallvec::SmallVec;

use crate::catalog::{Catalog, Category, CategoryFilter};
use crate::filter::FilterCriteria;
use crate::session::Focus;

use super::animation::Animator;
use super::keybindings::{Action, KeyBindings};
use super::theme::Theme;
use super::widget::Widget;
use super::{Edges, Position, Size, Sizing, WidgetId, WidgetTree};

/// Everything the view builders read. Collected by main.rs from the
/// session and filter cache before the rebuild.
pub struct ViewInputs<'a> {
    pub catalog: &'a Catalog,
    /// Catalog indices currently visible in the rail.
    pub visible: &'a [usize],
    pub criteria: &'a FilterCriteria,
    pub active_card: Option<&'a str>,
    pub focus: Focus,
    pub search_focused: bool,
    pub rail_scroll: f32,
    /// Brightness multiplier for the rail during a category swap.
    pub rail_alpha: f32,
}

/// Widget ids handed back to main.rs for click dispatch and pointer
/// resolution. Valid only for the tree they were built into.
#[derive(Default)]
pub struct ViewHandles {
    pub rail: Option<WidgetId>,
    /// (catalog index, card widget) pairs in rail order.
    pub cards: SmallVec<[(usize, WidgetId); 16]>,
    /// (button widget, filter it applies) pairs for the category bar.
    pub category_buttons: Vec<(WidgetId, CategoryFilter)>,
    pub genre_button: Option<WidgetId>,
    pub search_field: Option<WidgetId>,
    pub overlay_backdrop: Option<WidgetId>,
    pub overlay_close: Option<WidgetId>,
    pub overlay_explore: Option<WidgetId>,
    pub overlay_trailer: Option<WidgetId>,
}

/// Scale a color's brightness, keeping alpha.
fn dim(color: [f32; 4], factor: f32) -> [f32; 4] {
    [
        color[0] * factor,
        color[1] * factor,
        color[2] * factor,
        color[3],
    ]
}

/// First `max` characters of a description with an ellipsis.
fn snippet(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}…", cut.trim_end())
}

/// Build the complete frame: header, category bar, rail (or empty state),
/// footer, and the detail overlay when an entry is open.
pub fn build_views(
    tree: &mut WidgetTree,
    theme: &Theme,
    bindings: &KeyBindings,
    inputs: &ViewInputs,
    animator: &Animator,
    now: Instant,
    screen: Size,
) -> ViewHandles {
    let mut handles = ViewHandles::default();

    build_header(tree, theme, inputs, screen, &mut handles);
    build_category_bar(tree, theme, inputs, screen, &mut handles);

    if inputs.visible.is_empty() {
        build_empty_state(tree, theme, screen);
    } else {
        build_rail(tree, theme, inputs, animator, now, screen, &mut handles);
    }

    build_footer(tree, theme, inputs, screen);

    if let Focus::Open(index) = inputs.focus
        && let Some(entry_index) = Some(index).filter(|&i| inputs.catalog.get(i).is_some())
    {
        build_overlay(tree, theme, bindings, inputs, entry_index, screen, &mut handles);
    }

    handles
}

fn build_header(
    tree: &mut WidgetTree,
    theme: &Theme,
    inputs: &ViewInputs,
    screen: Size,
    handles: &mut ViewHandles,
) {
    let header = tree.insert_root(Widget::Panel {
        bg_color: theme.bg,
        border_color: [0.0; 4],
        border_width: 0.0,
        shadow_width: 0.0,
    });
    tree.set_position(header, Position::Fixed { x: 0.0, y: 0.0 });
    tree.set_sizing(header, Sizing::Percent(1.0), Sizing::Fixed(64.0));
    tree.set_padding(header, Edges::all(16.0));

    let title = tree.insert(
        header,
        Widget::Label {
            text: "KINORAIL".into(),
            color: theme.accent,
            font_size: theme.font_title_size,
        },
    );
    tree.set_position(title, Position::Fixed { x: 0.0, y: 0.0 });

    let subtitle = tree.insert(
        header,
        Widget::Label {
            text: "an opinionated anime shelf".into(),
            color: theme.text_muted,
            font_size: theme.font_small_size,
        },
    );
    tree.set_position(
        subtitle,
        Position::Fixed {
            x: 0.0,
            y: theme.font_title_size + theme.label_gap,
        },
    );

    // Search field on the right edge of the header.
    let field_w = 240.0;
    let search = tree.insert(
        header,
        Widget::Panel {
            bg_color: theme.surface,
            border_color: if inputs.search_focused {
                theme.accent
            } else {
                theme.panel_border_color
            },
            border_width: 1.0,
            shadow_width: 0.0,
        },
    );
    tree.set_position(
        search,
        Position::Fixed {
            x: screen.width - 32.0 - field_w,
            y: 2.0,
        },
    );
    tree.set_sizing(search, Sizing::Fixed(field_w), Sizing::Fixed(28.0));
    tree.set_padding(search, Edges::all(6.0));
    handles.search_field = Some(search);

    let query = inputs.criteria.query.as_str();
    let (text, color) = if query.is_empty() && !inputs.search_focused {
        ("Search titles  [/]".to_string(), theme.text_muted)
    } else if inputs.search_focused {
        (format!("{query}_"), theme.text)
    } else {
        (query.to_string(), theme.text)
    };
    tree.insert(
        search,
        Widget::Label {
            text,
            color,
            font_size: theme.font_body_size,
        },
    );

    // Genre cycle button to the left of the search field.
    let genre_text = match &inputs.criteria.genre {
        Some(g) => g.clone(),
        None => "All genres".to_string(),
    };
    let genre = tree.insert(
        header,
        Widget::Button {
            text: genre_text,
            color: if inputs.criteria.genre.is_some() {
                theme.accent
            } else {
                theme.text_muted
            },
            bg_color: theme.surface,
            border_color: theme.panel_border_color,
            font_size: theme.font_body_size,
        },
    );
    tree.set_position(
        genre,
        Position::Fixed {
            x: screen.width - 32.0 - field_w - 140.0,
            y: 2.0,
        },
    );
    tree.set_sizing(genre, Sizing::Fixed(128.0), Sizing::Fixed(28.0));
    handles.genre_button = Some(genre);
}

fn build_category_bar(
    tree: &mut WidgetTree,
    theme: &Theme,
    inputs: &ViewInputs,
    _screen: Size,
    handles: &mut ViewHandles,
) {
    let bar = tree.insert_root(Widget::Panel {
        bg_color: theme.bg,
        border_color: [0.0; 4],
        border_width: 0.0,
        shadow_width: 0.0,
    });
    tree.set_position(bar, Position::Fixed { x: 16.0, y: 72.0 });
    tree.set_sizing(bar, Sizing::Percent(1.0), Sizing::Fixed(32.0));

    let mut x = 0.0;
    let mut filters: Vec<CategoryFilter> = vec![CategoryFilter::All];
    filters.extend(Category::ALL.iter().map(|&c| CategoryFilter::Only(c)));

    for filter in filters {
        let selected = inputs.criteria.category == filter;
        let label = match filter {
            CategoryFilter::All => "All".to_string(),
            CategoryFilter::Only(c) => c.short_label().to_string(),
        };
        let width = label.chars().count() as f32 * theme.font_body_size * 0.6 + 20.0;

        let button = tree.insert(
            bar,
            Widget::Button {
                text: label,
                color: if selected { theme.bg } else { theme.text_muted },
                bg_color: if selected { theme.accent } else { theme.surface },
                border_color: if selected {
                    theme.accent
                } else {
                    theme.panel_border_color
                },
                font_size: theme.font_body_size,
            },
        );
        tree.set_position(button, Position::Fixed { x, y: 0.0 });
        tree.set_sizing(button, Sizing::Fixed(width), Sizing::Fixed(26.0));
        handles.category_buttons.push((button, filter));

        x += width + 8.0;
    }
}

fn build_rail(
    tree: &mut WidgetTree,
    theme: &Theme,
    inputs: &ViewInputs,
    animator: &Animator,
    now: Instant,
    screen: Size,
    handles: &mut ViewHandles,
) {
    let fade = inputs.rail_alpha;
    let rail_y = 120.0 + ((screen.height - 120.0 - 60.0) - theme.rail_height).max(0.0) / 2.0;

    let rail = tree.insert_root(Widget::Rail {
        bg_color: dim(theme.bg, fade),
        gap: theme.card_gap,
        scroll_offset: inputs.rail_scroll,
        scrollbar_color: dim(theme.scrollbar_color, fade),
        scrollbar_height: theme.scrollbar_height,
    });
    tree.set_position(rail, Position::Fixed { x: 0.0, y: rail_y });
    tree.set_sizing(rail, Sizing::Percent(1.0), Sizing::Fixed(theme.rail_height));
    tree.set_padding(
        rail,
        Edges {
            top: 0.0,
            right: 16.0,
            bottom: 0.0,
            left: 16.0,
        },
    );
    handles.rail = Some(rail);

    let card_h = theme.rail_height - theme.scrollbar_height - 8.0;

    for &index in inputs.visible {
        let Some(entry) = inputs.catalog.get(index) else {
            continue;
        };
        let is_active = inputs.active_card == Some(entry.id.as_str());
        let resting = if is_active {
            theme.card_width_active
        } else {
            theme.card_width
        };
        let width = animator.value_or(&format!("card:{}", entry.id), now, resting);

        let card = tree.insert(
            rail,
            Widget::Panel {
                bg_color: dim(theme.surface, fade),
                border_color: if is_active {
                    dim(theme.accent, fade)
                } else {
                    dim(theme.panel_border_color, fade)
                },
                border_width: if is_active { 2.0 } else { 1.0 },
                shadow_width: if is_active { theme.panel_shadow_width } else { 0.0 },
            },
        );
        tree.set_sizing(card, Sizing::Fixed(width), Sizing::Fixed(card_h));
        tree.set_padding(card, Edges::all(theme.panel_padding));
        handles.cards.push((index, card));

        // Cover block tinted with the entry's accent color.
        let (r, g, b) = entry.cover_accent;
        let accent = dim(
            [
                r as f32 / 255.0,
                g as f32 / 255.0,
                b as f32 / 255.0,
                1.0,
            ],
            fade,
        );
        let cover = tree.insert(
            card,
            Widget::Panel {
                bg_color: accent,
                border_color: [0.0; 4],
                border_width: 0.0,
                shadow_width: 0.0,
            },
        );
        tree.set_position(cover, Position::Fixed { x: 0.0, y: 0.0 });
        tree.set_sizing(cover, Sizing::Percent(1.0), Sizing::Fixed(card_h * 0.45));

        let mut y = card_h * 0.45 + 10.0;
        let title = tree.insert(
            card,
            Widget::Label {
                text: entry.title.clone(),
                color: dim(theme.text, fade),
                font_size: theme.font_body_size,
            },
        );
        tree.set_position(title, Position::Fixed { x: 0.0, y });
        y += theme.font_body_size + theme.label_gap;

        let meta = tree.insert(
            card,
            Widget::Label {
                text: format!("{} · {}", entry.release_year, entry.status.label()),
                color: dim(theme.text_muted, fade),
                font_size: theme.font_small_size,
            },
        );
        tree.set_position(meta, Position::Fixed { x: 0.0, y });
        y += theme.font_small_size + theme.label_gap * 2.0;

        // Expanded cards reveal genres and a description snippet.
        if is_active {
            let genres = tree.insert(
                card,
                Widget::Label {
                    text: entry.genres.join(" / "),
                    color: dim(theme.accent, fade),
                    font_size: theme.font_small_size,
                },
            );
            tree.set_position(genres, Position::Fixed { x: 0.0, y });
            y += theme.font_small_size + theme.label_gap;

            let desc = tree.insert(
                card,
                Widget::Label {
                    text: snippet(&entry.description, 60),
                    color: dim(theme.text_muted, fade),
                    font_size: theme.font_small_size,
                },
            );
            tree.set_position(desc, Position::Fixed { x: 0.0, y });
        }
    }
}

fn build_empty_state(tree: &mut WidgetTree, theme: &Theme, screen: Size) {
    let panel = tree.insert_root(Widget::Panel {
        bg_color: theme.bg,
        border_color: [0.0; 4],
        border_width: 0.0,
        shadow_width: 0.0,
    });
    tree.set_position(
        panel,
        Position::Fixed {
            x: screen.width / 2.0 - 120.0,
            y: screen.height / 2.0 - 30.0,
        },
    );
    tree.set_sizing(panel, Sizing::Fixed(240.0), Sizing::Fixed(60.0));

    let heading = tree.insert(
        panel,
        Widget::Label {
            text: "No results".into(),
            color: theme.alert,
            font_size: theme.font_title_size,
        },
    );
    tree.set_position(heading, Position::Fixed { x: 0.0, y: 0.0 });

    let hint = tree.insert(
        panel,
        Widget::Label {
            text: "Try a different search or category".into(),
            color: theme.text_muted,
            font_size: theme.font_small_size,
        },
    );
    tree.set_position(
        hint,
        Position::Fixed {
            x: 0.0,
            y: theme.font_title_size + theme.label_gap,
        },
    );
}

fn build_footer(tree: &mut WidgetTree, theme: &Theme, inputs: &ViewInputs, screen: Size) {
    let footer = tree.insert_root(Widget::Panel {
        bg_color: theme.bg,
        border_color: [0.0; 4],
        border_width: 0.0,
        shadow_width: 0.0,
    });
    tree.set_position(
        footer,
        Position::Fixed {
            x: 0.0,
            y: screen.height - 40.0,
        },
    );
    tree.set_sizing(footer, Sizing::Percent(1.0), Sizing::Fixed(40.0));
    tree.set_padding(footer, Edges::all(12.0));

    // One indicator dot per category, the selected one in accent.
    let dots_w =
        Category::ALL.len() as f32 * (theme.dot_size + theme.dot_gap) - theme.dot_gap;
    let mut x = (screen.width - dots_w) / 2.0 - 12.0;
    for &category in &Category::ALL {
        let selected = inputs.criteria.category == CategoryFilter::Only(category);
        let dot = tree.insert(
            footer,
            Widget::Panel {
                bg_color: if selected {
                    theme.accent
                } else {
                    theme.surface_raised
                },
                border_color: [0.0; 4],
                border_width: 0.0,
                shadow_width: 0.0,
            },
        );
        tree.set_position(dot, Position::Fixed { x, y: 4.0 });
        tree.set_sizing(
            dot,
            Sizing::Fixed(theme.dot_size),
            Sizing::Fixed(theme.dot_size),
        );
        x += theme.dot_size + theme.dot_gap;
    }

    let count = tree.insert(
        footer,
        Widget::Label {
            text: format!("{} titles", inputs.visible.len()),
            color: theme.text_muted,
            font_size: theme.font_small_size,
        },
    );
    tree.set_position(count, Position::Fixed { x: 4.0, y: 2.0 });
}

fn build_overlay(
    tree: &mut WidgetTree,
    theme: &Theme,
    bindings: &KeyBindings,
    inputs: &ViewInputs,
    index: usize,
    screen: Size,
    handles: &mut ViewHandles,
) {
    let Some(entry) = inputs.catalog.get(index) else {
        return;
    };

    // Backdrop is the last root, so it sits above everything; the detail
    // panel is its child, so a hit on the panel never reports the backdrop.
    let backdrop = tree.insert_root(Widget::Panel {
        bg_color: theme.backdrop,
        border_color: [0.0; 4],
        border_width: 0.0,
        shadow_width: 0.0,
    });
    tree.set_position(backdrop, Position::Fixed { x: 0.0, y: 0.0 });
    tree.set_sizing(backdrop, Sizing::Percent(1.0), Sizing::Percent(1.0));
    handles.overlay_backdrop = Some(backdrop);

    let panel_w = screen.width * theme.overlay_width_frac;
    let panel_h = (screen.height * 0.7).min(560.0);
    let detail = tree.insert(
        backdrop,
        Widget::Panel {
            bg_color: theme.surface_raised,
            border_color: theme.accent,
            border_width: 1.0,
            shadow_width: theme.panel_shadow_width * 2.0,
        },
    );
    tree.set_position(
        detail,
        Position::Fixed {
            x: (screen.width - panel_w) / 2.0,
            y: (screen.height - panel_h) / 2.0,
        },
    );
    tree.set_sizing(detail, Sizing::Fixed(panel_w), Sizing::Fixed(panel_h));
    tree.set_padding(detail, Edges::all(theme.overlay_padding));

    let esc = bindings
        .label_for(Action::CloseTopmost)
        .unwrap_or_else(|| "Esc".to_string());
    let close = tree.insert(
        detail,
        Widget::Button {
            text: format!("✕ {esc}"),
            color: theme.text_muted,
            bg_color: theme.surface,
            border_color: theme.panel_border_color,
            font_size: theme.font_small_size,
        },
    );
    tree.set_position(
        close,
        Position::Fixed {
            x: panel_w - theme.overlay_padding * 2.0 - 56.0,
            y: 0.0,
        },
    );
    tree.set_sizing(close, Sizing::Fixed(56.0), Sizing::Fixed(22.0));
    handles.overlay_close = Some(close);

    let mut y = 0.0;
    let title = tree.insert(
        detail,
        Widget::Label {
            text: entry.title.clone(),
            color: theme.accent,
            font_size: theme.font_title_size,
        },
    );
    tree.set_position(title, Position::Fixed { x: 0.0, y });
    y += theme.font_title_size + theme.label_gap;

    // Optional rows simply don't exist when the field is absent.
    if let Some(original) = &entry.original_title {
        let row = tree.insert(
            detail,
            Widget::Label {
                text: original.clone(),
                color: theme.text_muted,
                font_size: theme.font_body_size,
            },
        );
        tree.set_position(row, Position::Fixed { x: 0.0, y });
        y += theme.font_body_size + theme.label_gap;
    }

    let mut meta = format!(
        "{} · {} · {}",
        entry.release_year,
        entry.status.label(),
        entry.category.label()
    );
    if let Some(episodes) = entry.episodes {
        meta.push_str(&format!(" · {episodes} ep"));
    }
    if let Some(rating) = entry.rating {
        meta.push_str(&format!(" · {rating:.1}/10"));
    }
    let meta_row = tree.insert(
        detail,
        Widget::Label {
            text: meta,
            color: theme.text_muted,
            font_size: theme.font_body_size,
        },
    );
    tree.set_position(meta_row, Position::Fixed { x: 0.0, y });
    y += theme.font_body_size + theme.label_gap;

    let genres_row = tree.insert(
        detail,
        Widget::Label {
            text: entry.genres.join(" / "),
            color: theme.text,
            font_size: theme.font_small_size,
        },
    );
    tree.set_position(genres_row, Position::Fixed { x: 0.0, y });
    y += theme.font_small_size + theme.label_gap * 2.0;

    let desc = tree.insert(
        detail,
        Widget::Label {
            text: snippet(&entry.description, 200),
            color: theme.text,
            font_size: theme.font_body_size,
        },
    );
    tree.set_position(desc, Position::Fixed { x: 0.0, y });
    y += theme.font_body_size + theme.label_gap * 2.0;

    if let Some(comment) = &entry.comment {
        let row = tree.insert(
            detail,
            Widget::Label {
                text: format!("“{comment}”"),
                color: theme.accent,
                font_size: theme.font_body_size,
            },
        );
        tree.set_position(row, Position::Fixed { x: 0.0, y });
        y += theme.font_body_size + theme.label_gap * 2.0;
    }

    let explore = tree.insert(
        detail,
        Widget::Button {
            text: "Open on MyAnimeList".into(),
            color: theme.bg,
            bg_color: theme.accent,
            border_color: theme.accent,
            font_size: theme.font_body_size,
        },
    );
    tree.set_position(explore, Position::Fixed { x: 0.0, y: y + 8.0 });
    tree.set_sizing(explore, Sizing::Fixed(180.0), Sizing::Fixed(30.0));
    handles.overlay_explore = Some(explore);

    let trailer = tree.insert(
        detail,
        Widget::Button {
            text: "Watch trailer".into(),
            color: theme.text,
            bg_color: theme.surface,
            border_color: theme.panel_border_color,
            font_size: theme.font_body_size,
        },
    );
    tree.set_position(trailer, Position::Fixed { x: 192.0, y: y + 8.0 });
    tree.set_sizing(trailer, Sizing::Fixed(140.0), Sizing::Fixed(30.0));
    handles.overlay_trailer = Some(trailer);
}
