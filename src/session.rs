use std::time::{Duration, Instant};

use log::debug;

use crate::catalog::{Catalog, CategoryFilter};
use crate::filter::FilterCriteria;

/// How long a category swap dims the rail before the new cards settle in.
pub const SETTLE_DELAY: Duration = Duration::from_millis(280);

/// Debounce after a touch scroll stops before the center-band card is picked.
pub const TOUCH_SETTLE: Duration = Duration::from_millis(120);

/// Detail overlay state. At most one entry is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Closed,
    /// Catalog index of the opened entry.
    Open(usize),
}

/// Why the overlay is closing. All paths converge on the same state change;
/// the reason only feeds logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Button,
    Backdrop,
    Escape,
}

/// Which input family is driving card activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMode {
    /// Hover picks the card under the pointer.
    Mouse,
    /// No hover: the card nearest the rail center is picked after scrolling
    /// settles, and opening an entry takes two taps.
    Touch,
}

/// A category change waiting for its settle delay to elapse.
#[derive(Debug, Clone, Copy)]
struct PendingSwap {
    target: CategoryFilter,
    settle_at: Instant,
}

/// Central interaction state for the gallery: what is filtered, which card
/// is active, whether the detail overlay is open, and any in-flight category
/// transition. Pure state machine; rendering and input routing live in main.
pub struct GallerySession {
    pub criteria: FilterCriteria,
    /// Id of the card currently expanded in the rail.
    active_card: Option<String>,
    focus: Focus,
    swap: Option<PendingSwap>,
    pointer_mode: PointerMode,
    /// Deadline after which a settled touch scroll picks a new active card.
    touch_settle: Option<Instant>,
    pub search_focused: bool,
}

impl GallerySession {
    pub fn new() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            active_card: None,
            focus: Focus::Closed,
            swap: None,
            pointer_mode: PointerMode::Mouse,
            touch_settle: None,
            search_focused: false,
        }
    }

    pub fn active_card(&self) -> Option<&str> {
        self.active_card.as_deref()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn pointer_mode(&self) -> PointerMode {
        self.pointer_mode
    }

    pub fn is_transitioning(&self) -> bool {
        self.swap.is_some()
    }

    /// Card activation is suspended while the overlay is open or a category
    /// swap is settling.
    pub fn hover_locked(&self) -> bool {
        self.focus != Focus::Closed || self.swap.is_some()
    }

    /// Rail scrolling is suspended for as long as the overlay is open; the
    /// gallery underneath must not move.
    pub fn rail_scroll_allowed(&self) -> bool {
        self.focus == Focus::Closed
    }

    // ------------------------------------------------------------------
    // Active card
    // ------------------------------------------------------------------

    /// Update the active card. Returns true only when the value actually
    /// changed; redundant updates are suppressed so callers can key
    /// animations off the transition.
    pub fn set_active(&mut self, id: Option<&str>) -> bool {
        if self.hover_locked() {
            return false;
        }
        if self.active_card.as_deref() == id {
            return false;
        }
        debug!(
            "active card: {:?} -> {:?}",
            self.active_card.as_deref(),
            id
        );
        self.active_card = id.map(str::to_owned);
        true
    }

    /// Pointer left the rail entirely.
    pub fn pointer_left(&mut self) -> bool {
        self.set_active(None)
    }

    /// First card whose horizontal span contains `pointer_x`, walking cards
    /// in rail order. Both span edges are inclusive; a pointer exactly on a
    /// shared edge stays with the earlier card because the first match wins.
    pub fn resolve_active<'a, I>(pointer_x: f32, cards: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = (&'a str, f32, f32)>,
    {
        cards
            .into_iter()
            .find(|&(_, start, end)| pointer_x >= start && pointer_x <= end)
            .map(|(id, _, _)| id)
    }

    // ------------------------------------------------------------------
    // Touch
    // ------------------------------------------------------------------

    /// Flip into touch mode on the first touch event. One-way for the life
    /// of the session; mixed-input devices keep the touch behaviour.
    pub fn note_touch(&mut self) {
        if self.pointer_mode != PointerMode::Touch {
            debug!("switching to touch pointer mode");
            self.pointer_mode = PointerMode::Touch;
        }
    }

    /// A touch scroll moved the rail; re-arm the settle debounce.
    pub fn touch_scrolled(&mut self, now: Instant) {
        self.touch_settle = Some(now + TOUCH_SETTLE);
    }

    /// Returns true once when the settle deadline passes, then disarms.
    pub fn touch_settle_due(&mut self, now: Instant) -> bool {
        match self.touch_settle {
            Some(deadline) if now >= deadline => {
                self.touch_settle = None;
                true
            }
            _ => false,
        }
    }

    /// A card was tapped or clicked. In mouse mode this opens the entry
    /// directly (hover already made it active). In touch mode the first tap
    /// promotes the card and the second tap opens it.
    pub fn card_clicked(&mut self, id: &str, index: usize) {
        match self.pointer_mode {
            PointerMode::Mouse => self.open_entry(index),
            PointerMode::Touch => {
                if self.active_card.as_deref() == Some(id) {
                    self.open_entry(index);
                } else {
                    self.set_active(Some(id));
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Detail overlay
    // ------------------------------------------------------------------

    /// Open the detail overlay. The active card is cleared so nothing stays
    /// expanded under the backdrop; closing re-derives it from the pointer.
    pub fn open_entry(&mut self, index: usize) {
        if self.swap.is_some() {
            return;
        }
        debug!("opening detail overlay for entry {index}");
        self.focus = Focus::Open(index);
        self.active_card = None;
        self.search_focused = false;
    }

    /// Close the overlay. Clears the active card so hover re-derives it from
    /// the next pointer event. Returns false if it was already closed.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        if self.focus == Focus::Closed {
            return false;
        }
        debug!("closing detail overlay ({reason:?})");
        self.focus = Focus::Closed;
        self.active_card = None;
        true
    }

    // ------------------------------------------------------------------
    // Category transition
    // ------------------------------------------------------------------

    /// Request a category change. Ignored when the target already matches
    /// the current filter or another swap is still settling. The active card
    /// clears immediately; the filter itself applies when the swap settles.
    pub fn request_category(&mut self, target: CategoryFilter, now: Instant) -> bool {
        if self.swap.is_some() || self.criteria.category == target {
            return false;
        }
        debug!("category swap -> {}", target.label());
        self.active_card = None;
        self.swap = Some(PendingSwap {
            target,
            settle_at: now + SETTLE_DELAY,
        });
        true
    }

    /// Advance time-based state. Returns true when a pending category swap
    /// settled this tick; the caller resets the rail scroll in response.
    pub fn tick(&mut self, catalog: &Catalog, now: Instant) -> bool {
        let Some(swap) = self.swap else {
            return false;
        };
        if now < swap.settle_at {
            return false;
        }
        self.swap = None;
        self.criteria.category = swap.target;

        // A genre chosen under the old category may not exist in the new
        // scope; fall back to the wildcard rather than show nothing.
        if let Some(genre) = &self.criteria.genre
            && !catalog
                .genres_in(self.criteria.category)
                .iter()
                .any(|g| g == genre)
        {
            debug!("genre {:?} absent from new scope, resetting", genre);
            self.criteria.genre = None;
        }
        true
    }

    /// Drop references to entries the catalog no longer exposes. Guards
    /// against a stale id surviving a filter change.
    pub fn retain_valid(&mut self, catalog: &Catalog, visible: &[usize]) {
        if let Some(id) = &self.active_card {
            let still_visible = visible
                .iter()
                .filter_map(|&i| catalog.get(i))
                .any(|e| &e.id == id);
            if !still_visible {
                self.active_card = None;
            }
        }
        if let Focus::Open(index) = self.focus
            && catalog.get(index).is_none()
        {
            self.focus = Focus::Closed;
        }
    }

    // ------------------------------------------------------------------
    // Search and genre
    // ------------------------------------------------------------------

    pub fn push_query_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        self.criteria.query.push(c);
    }

    pub fn pop_query_char(&mut self) {
        self.criteria.query.pop();
    }

    pub fn clear_query(&mut self) {
        self.criteria.query.clear();
    }

    /// Advance the genre filter through the scoped vocabulary:
    /// wildcard, each genre in order, back to wildcard.
    pub fn cycle_genre(&mut self, catalog: &Catalog) {
        let vocab = catalog.genres_in(self.criteria.category);
        self.criteria.genre = match &self.criteria.genre {
            None => vocab.first().cloned(),
            Some(current) => match vocab.iter().position(|g| g == current) {
                Some(i) if i + 1 < vocab.len() => Some(vocab[i + 1].clone()),
                _ => None,
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Entry, Status};

    fn entry(id: &str, title: &str, category: Category, genres: &[&str]) -> Entry {
        Entry {
            id: id.to_string(),
            title: title.to_string(),
            category,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            description: String::new(),
            cover_accent: (0, 0, 0),
            release_year: 2006,
            status: Status::Finished,
            trailer_url: None,
            comment: None,
            rating: None,
            episodes: None,
            original_title: None,
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_entries(vec![
            entry("bleach", "Bleach", Category::MustWatch, &["Action"]),
            entry("death-note", "Death Note", Category::Goats, &["Thriller"]),
            entry("haikyuu", "Haikyuu!!", Category::Sports, &["Sports"]),
        ])
    }

    #[test]
    fn redundant_active_updates_are_suppressed() {
        let mut s = GallerySession::new();
        assert!(s.set_active(Some("bleach")));
        assert!(!s.set_active(Some("bleach")));
        assert!(s.set_active(Some("death-note")));
        assert!(s.set_active(None));
        assert!(!s.set_active(None));
    }

    #[test]
    fn pointer_picks_first_containing_card() {
        // Adjacent cards sharing an edge at x=100 and x=200.
        let cards = [("a", 0.0, 100.0), ("b", 100.0, 200.0), ("c", 200.0, 300.0)];
        assert_eq!(GallerySession::resolve_active(150.0, cards), Some("b"));
        // A shared edge stays with the earlier card: first match wins.
        assert_eq!(GallerySession::resolve_active(100.0, cards), Some("a"));
        assert_eq!(GallerySession::resolve_active(200.0, cards), Some("b"));
        assert_eq!(GallerySession::resolve_active(0.0, cards), Some("a"));
        // Both edges are inclusive, so the rightmost edge still hits.
        assert_eq!(GallerySession::resolve_active(300.0, cards), Some("c"));
        assert_eq!(GallerySession::resolve_active(300.5, cards), None);
        assert_eq!(GallerySession::resolve_active(-5.0, cards), None);
    }

    #[test]
    fn opening_clears_active_card_and_locks_hover() {
        let mut s = GallerySession::new();
        s.set_active(Some("bleach"));
        s.card_clicked("bleach", 0);

        // The expanded card collapses the moment the overlay opens.
        assert_eq!(s.active_card(), None);
        assert!(s.hover_locked());
        assert!(!s.set_active(Some("death-note")));
        assert_eq!(s.active_card(), None);
    }

    #[test]
    fn overlay_suspends_rail_scrolling() {
        let mut s = GallerySession::new();
        assert!(s.rail_scroll_allowed());

        s.open_entry(0);
        assert!(!s.rail_scroll_allowed());

        s.close(CloseReason::Button);
        assert!(s.rail_scroll_allowed());
    }

    #[test]
    fn close_clears_active_and_resumes_hover() {
        let mut s = GallerySession::new();
        s.set_active(Some("bleach"));
        s.open_entry(0);

        assert!(s.close(CloseReason::Escape));
        assert_eq!(s.focus(), Focus::Closed);
        assert_eq!(s.active_card(), None);

        // Hover works again after closing.
        assert!(s.set_active(Some("death-note")));
        assert_eq!(s.active_card(), Some("death-note"));

        // Closing twice is a no-op.
        assert!(!s.close(CloseReason::Button));
    }

    #[test]
    fn category_swap_settles_after_delay() {
        let c = catalog();
        let mut s = GallerySession::new();
        let t0 = Instant::now();

        assert!(s.request_category(CategoryFilter::Only(Category::Goats), t0));
        assert!(s.is_transitioning());
        assert_eq!(s.criteria.category, CategoryFilter::All); // not yet applied

        // Before the settle deadline nothing changes.
        assert!(!s.tick(&c, t0 + Duration::from_millis(100)));
        assert!(s.is_transitioning());

        // At the deadline the filter applies.
        assert!(s.tick(&c, t0 + SETTLE_DELAY));
        assert!(!s.is_transitioning());
        assert_eq!(s.criteria.category, CategoryFilter::Only(Category::Goats));
    }

    #[test]
    fn category_swap_ignores_reentry_and_same_target() {
        let mut s = GallerySession::new();
        let t0 = Instant::now();

        // Same as current filter: ignored.
        assert!(!s.request_category(CategoryFilter::All, t0));

        assert!(s.request_category(CategoryFilter::Only(Category::Peak), t0));
        // Second request while settling: ignored, even for a new target.
        assert!(!s.request_category(CategoryFilter::Only(Category::Goats), t0));
    }

    #[test]
    fn category_swap_clears_active_card() {
        let mut s = GallerySession::new();
        s.set_active(Some("bleach"));
        s.request_category(CategoryFilter::Only(Category::Sports), Instant::now());
        assert_eq!(s.active_card(), None);
    }

    #[test]
    fn hover_suppressed_while_transitioning() {
        let mut s = GallerySession::new();
        s.request_category(CategoryFilter::Only(Category::Sports), Instant::now());
        assert!(!s.set_active(Some("haikyuu")));
    }

    #[test]
    fn genre_resets_when_absent_from_new_scope() {
        let c = catalog();
        let mut s = GallerySession::new();
        s.criteria.genre = Some("Action".to_string());
        let t0 = Instant::now();

        s.request_category(CategoryFilter::Only(Category::Sports), t0);
        s.tick(&c, t0 + SETTLE_DELAY);
        // "Action" does not appear under Sports.
        assert_eq!(s.criteria.genre, None);
    }

    #[test]
    fn genre_survives_when_present_in_new_scope() {
        let c = catalog();
        let mut s = GallerySession::new();
        s.criteria.genre = Some("Sports".to_string());
        let t0 = Instant::now();

        s.request_category(CategoryFilter::Only(Category::Sports), t0);
        s.tick(&c, t0 + SETTLE_DELAY);
        assert_eq!(s.criteria.genre, Some("Sports".to_string()));
    }

    #[test]
    fn cycle_genre_walks_scoped_vocabulary() {
        let c = catalog();
        let mut s = GallerySession::new();

        // Catalog-wide vocabulary, sorted: Action, Sports, Thriller.
        s.cycle_genre(&c);
        assert_eq!(s.criteria.genre, Some("Action".to_string()));
        s.cycle_genre(&c);
        assert_eq!(s.criteria.genre, Some("Sports".to_string()));
        s.cycle_genre(&c);
        assert_eq!(s.criteria.genre, Some("Thriller".to_string()));
        s.cycle_genre(&c);
        assert_eq!(s.criteria.genre, None); // wraps to wildcard
    }

    #[test]
    fn stale_active_card_is_dropped() {
        let c = catalog();
        let mut s = GallerySession::new();
        s.set_active(Some("bleach"));

        // Visible set no longer includes bleach (index 0).
        s.retain_valid(&c, &[1, 2]);
        assert_eq!(s.active_card(), None);
    }

    #[test]
    fn out_of_range_focus_is_closed() {
        let c = catalog();
        let mut s = GallerySession::new();
        s.open_entry(99);
        s.retain_valid(&c, &[0, 1, 2]);
        assert_eq!(s.focus(), Focus::Closed);
    }

    #[test]
    fn touch_two_tap_promote_then_open() {
        let mut s = GallerySession::new();
        s.note_touch();
        assert_eq!(s.pointer_mode(), PointerMode::Touch);

        // First tap promotes.
        s.card_clicked("bleach", 0);
        assert_eq!(s.active_card(), Some("bleach"));
        assert_eq!(s.focus(), Focus::Closed);

        // Second tap opens and the promotion is released.
        s.card_clicked("bleach", 0);
        assert_eq!(s.focus(), Focus::Open(0));
        assert_eq!(s.active_card(), None);
    }

    #[test]
    fn mouse_click_opens_directly() {
        let mut s = GallerySession::new();
        s.set_active(Some("bleach"));
        s.card_clicked("bleach", 0);
        assert_eq!(s.focus(), Focus::Open(0));
        assert_eq!(s.active_card(), None);
    }

    #[test]
    fn touch_settle_fires_once_after_debounce() {
        let mut s = GallerySession::new();
        let t0 = Instant::now();
        s.touch_scrolled(t0);

        assert!(!s.touch_settle_due(t0 + Duration::from_millis(60)));
        // A later scroll pushes the deadline back.
        s.touch_scrolled(t0 + Duration::from_millis(60));
        assert!(!s.touch_settle_due(t0 + TOUCH_SETTLE));
        assert!(s.touch_settle_due(t0 + Duration::from_millis(60) + TOUCH_SETTLE));
        // Disarmed after firing.
        assert!(!s.touch_settle_due(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn query_editing() {
        let mut s = GallerySession::new();
        s.push_query_char('b');
        s.push_query_char('l');
        s.push_query_char('\u{8}'); // control chars ignored
        assert_eq!(s.criteria.query, "bl");
        s.pop_query_char();
        assert_eq!(s.criteria.query, "b");
        s.clear_query();
        assert!(s.criteria.query.is_empty());
    }
}
