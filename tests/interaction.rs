//! End-to-end interaction tests: session state machine, widget tree, and
//! pointer resolution working together the way the frame loop drives them.

use std::time::{Duration, Instant};

use kinorail::catalog::{Catalog, Category, CategoryFilter};
use kinorail::filter::{FilterCriteria, visible_entries};
use kinorail::session::{CloseReason, Focus, GallerySession, PointerMode, SETTLE_DELAY};
use kinorail::ui::{
    Animator, KeyBindings, Size, ViewInputs, WidgetTree, build_views, Theme,
};

const FIXTURE: &str = r#"(
    entries: [
        (
            id: "bleach",
            title: "Bleach",
            category: MustWatch,
            genres: ["Action", "Supernatural"],
            description: "Substitute soul reaper.",
            cover_accent: (249, 115, 22),
            release_year: 2004,
            status: Finished,
        ),
        (
            id: "death-note",
            title: "Death Note",
            category: Goats,
            genres: ["Thriller", "Supernatural"],
            description: "A notebook that kills.",
            cover_accent: (31, 41, 55),
            release_year: 2006,
            status: Finished,
        ),
        (
            id: "haikyuu",
            title: "Haikyuu!!",
            category: Sports,
            genres: ["Sports", "Drama"],
            description: "Volleyball.",
            cover_accent: (234, 179, 8),
            release_year: 2014,
            status: Finished,
        ),
    ],
)"#;

fn fixture() -> Catalog {
    Catalog::from_ron(FIXTURE).expect("fixture parses")
}

fn screen() -> Size {
    Size {
        width: 1280.0,
        height: 800.0,
    }
}

/// Build a full frame the way the redraw path does and return the tree plus
/// the handles for dispatch.
fn build_frame<'a>(
    catalog: &'a Catalog,
    session: &'a GallerySession,
    visible: &'a [usize],
) -> (WidgetTree, kinorail::ui::ViewHandles) {
    let mut tree = WidgetTree::new();
    let inputs = ViewInputs {
        catalog,
        visible,
        criteria: &session.criteria,
        active_card: session.active_card(),
        focus: session.focus(),
        search_focused: session.search_focused,
        rail_scroll: 0.0,
        rail_alpha: 1.0,
    };
    let handles = build_views(
        &mut tree,
        &Theme::default(),
        &KeyBindings::defaults(),
        &inputs,
        &Animator::new(),
        Instant::now(),
        screen(),
    );
    tree.layout(screen(), 16.0);
    (tree, handles)
}

/// Pointer resolution through a laid-out rail: the card picked is the first
/// one whose span contains the pointer, with edges belonging to the earlier
/// card in rail order.
#[test]
fn pointer_resolution_through_real_rail_spans() {
    let catalog = fixture();
    let session = GallerySession::new();
    let visible = [0, 1, 2];
    let (tree, handles) = build_frame(&catalog, &session, &visible);

    let rail = handles.rail.expect("rail built");
    let spans = tree.rail_card_spans(rail);
    assert_eq!(spans.len(), 3);

    let cards: Vec<(&str, f32, f32)> = spans
        .iter()
        .map(|&(wid, start, end)| {
            let (index, _) = handles
                .cards
                .iter()
                .find(|(_, c)| *c == wid)
                .expect("span belongs to a card");
            (catalog.get(*index).expect("index valid").id.as_str(), start, end)
        })
        .collect();

    // Inside the second card.
    let (_, b_start, b_end) = cards[1];
    let mid = (b_start + b_end) / 2.0;
    assert_eq!(
        GallerySession::resolve_active(mid, cards.iter().copied()),
        Some("death-note")
    );

    // The exact right edge of a card still belongs to it: span edges are
    // inclusive and the first match wins, so an edge never skips ahead to
    // the next card.
    let (_, _, a_end) = cards[0];
    assert_eq!(
        GallerySession::resolve_active(a_end, cards.iter().copied()),
        Some("bleach")
    );
    assert_eq!(
        GallerySession::resolve_active(b_start, cards.iter().copied()),
        Some("death-note")
    );

    // Beyond the last card: nothing.
    let (_, _, last_end) = cards[2];
    assert_eq!(
        GallerySession::resolve_active(last_end + 1.0, cards.iter().copied()),
        None
    );
}

#[test]
fn open_close_cycle_restores_hover() {
    let catalog = fixture();
    let mut session = GallerySession::new();

    assert!(session.set_active(Some("bleach")));
    session.card_clicked("bleach", 0);
    assert_eq!(session.focus(), Focus::Open(0));

    // Opening clears the active card, so nothing renders expanded under the
    // backdrop, and it freezes both activation and rail scrolling.
    assert_eq!(session.active_card(), None);
    assert!(!session.set_active(Some("death-note")));
    assert_eq!(session.active_card(), None);
    assert!(!session.rail_scroll_allowed());

    // Closing restores hover tracking and scrolling; the next pointer event
    // re-derives the active card.
    assert!(session.close(CloseReason::Escape));
    assert_eq!(session.active_card(), None);
    assert!(session.rail_scroll_allowed());
    assert!(session.set_active(Some("death-note")));

    // The catalog is untouched by the whole cycle.
    assert_eq!(catalog.len(), 3);
}

#[test]
fn overlay_is_gone_from_the_next_frame_after_close() {
    let catalog = fixture();
    let mut session = GallerySession::new();
    let visible = [0, 1, 2];

    session.card_clicked("bleach", 0);
    let (_, handles) = build_frame(&catalog, &session, &visible);
    assert!(handles.overlay_backdrop.is_some());

    session.close(CloseReason::Backdrop);
    let (_, handles) = build_frame(&catalog, &session, &visible);
    assert!(handles.overlay_backdrop.is_none());
    assert!(handles.overlay_close.is_none());
}

#[test]
fn category_transition_lifecycle() {
    let catalog = fixture();
    let mut session = GallerySession::new();
    let t0 = Instant::now();
    session.set_active(Some("bleach"));

    assert!(session.request_category(CategoryFilter::Only(Category::Sports), t0));
    // Active card clears immediately, before the filter applies.
    assert_eq!(session.active_card(), None);
    assert_eq!(session.criteria.category, CategoryFilter::All);

    // Re-entry during the settle window is ignored.
    assert!(!session.request_category(CategoryFilter::Only(Category::Goats), t0));

    // Mid-transition the old visible set still renders.
    let visible = visible_entries(&catalog, &session.criteria);
    assert_eq!(visible, vec![0, 1, 2]);

    // After the settle delay the new filter is live.
    assert!(session.tick(&catalog, t0 + SETTLE_DELAY));
    let visible = visible_entries(&catalog, &session.criteria);
    assert_eq!(visible, vec![2]);

    // And a fresh request is accepted again.
    assert!(session.request_category(CategoryFilter::All, t0 + SETTLE_DELAY));
}

#[test]
fn genre_reset_applies_only_when_absent_from_new_scope() {
    let catalog = fixture();
    let mut session = GallerySession::new();
    let t0 = Instant::now();

    // Supernatural exists under both MustWatch and Goats.
    session.criteria.genre = Some("Supernatural".to_string());
    session.request_category(CategoryFilter::Only(Category::Goats), t0);
    session.tick(&catalog, t0 + SETTLE_DELAY);
    assert_eq!(session.criteria.genre, Some("Supernatural".to_string()));

    // But not under Sports.
    session.request_category(CategoryFilter::Only(Category::Sports), t0 + SETTLE_DELAY);
    session.tick(&catalog, t0 + SETTLE_DELAY + SETTLE_DELAY);
    assert_eq!(session.criteria.genre, None);
}

#[test]
fn stale_active_card_cannot_survive_a_filter_change() {
    let catalog = fixture();
    let mut session = GallerySession::new();

    session.set_active(Some("bleach"));
    session.criteria.query = "death".to_string();
    let visible = visible_entries(&catalog, &session.criteria);
    session.retain_valid(&catalog, &visible);

    assert_eq!(session.active_card(), None);
}

#[test]
fn touch_mode_requires_two_taps_to_open() {
    let catalog = fixture();
    let mut session = GallerySession::new();

    session.note_touch();
    assert_eq!(session.pointer_mode(), PointerMode::Touch);

    session.card_clicked("haikyuu", 2);
    assert_eq!(session.active_card(), Some("haikyuu"));
    assert_eq!(session.focus(), Focus::Closed);

    session.card_clicked("haikyuu", 2);
    assert_eq!(session.focus(), Focus::Open(2));

    // Sanity: the entry the overlay would show is the one tapped.
    assert_eq!(catalog.get(2).expect("index valid").id, "haikyuu");
}

#[test]
fn touch_settle_debounce_survives_repeated_scrolls() {
    let mut session = GallerySession::new();
    session.note_touch();
    let t0 = Instant::now();

    // Scroll events every 50ms keep pushing the deadline out.
    for i in 0..4 {
        session.touch_scrolled(t0 + Duration::from_millis(50 * i));
        assert!(!session.touch_settle_due(t0 + Duration::from_millis(50 * i + 40)));
    }

    // 120ms after the last scroll it fires, exactly once.
    let last = t0 + Duration::from_millis(150);
    assert!(session.touch_settle_due(last + Duration::from_millis(120)));
    assert!(!session.touch_settle_due(last + Duration::from_secs(1)));
}

#[test]
fn rail_scroll_state_is_reusable_across_rebuilds() {
    let catalog = fixture();
    let session = GallerySession::new();
    let visible = [0, 1, 2];

    // First frame: try to scroll the rail. Three resting cards fit inside a
    // 1280px viewport, so every offset clamps to zero.
    let (mut tree, handles) = build_frame(&catalog, &session, &visible);
    let rail = handles.rail.expect("rail built");
    assert!(tree.max_rail_scroll(rail).abs() < 0.01);
    tree.set_rail_scroll(rail, 300.0);
    let carried = tree.rail_scroll(rail);
    assert!(carried.abs() < 0.01);

    // Second frame: the offset feeds back in via ViewInputs and clamps the
    // same way, so a rebuild never teleports the rail.
    let mut tree2 = WidgetTree::new();
    let inputs = ViewInputs {
        catalog: &catalog,
        visible: &visible,
        criteria: &session.criteria,
        active_card: None,
        focus: Focus::Closed,
        search_focused: false,
        rail_scroll: carried,
        rail_alpha: 1.0,
    };
    let handles2 = build_views(
        &mut tree2,
        &Theme::default(),
        &KeyBindings::defaults(),
        &inputs,
        &Animator::new(),
        Instant::now(),
        screen(),
    );
    tree2.layout(screen(), 16.0);

    let rail2 = handles2.rail.expect("rail built");
    assert!((tree2.rail_scroll(rail2) - carried).abs() < 0.01);
}
