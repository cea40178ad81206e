//! Cross-module filtering tests: catalog parsing, predicate composition,
//! and the memoized visible set, exercised together through the public API.

use kinorail::catalog::{Catalog, Category, CategoryFilter};
use kinorail::filter::{FilterCache, FilterCriteria, visible_entries};

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
            episodes: Some(366),
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
            rating: Some(9.0),
        ),
        (
            id: "monster",
            title: "Monster",
            category: Goats,
            genres: ["Thriller", "Drama"],
            description: "A surgeon hunts the killer he saved.",
            cover_accent: (68, 64, 60),
            release_year: 2004,
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
        (
            id: "blue-lock",
            title: "Blue Lock",
            category: Sports,
            genres: ["Sports", "Thriller"],
            description: "Striker deathmatch.",
            cover_accent: (37, 99, 235),
            release_year: 2022,
            status: Ongoing,
        ),
    ],
)"#;

fn fixture() -> Catalog {
    Catalog::from_ron(FIXTURE).expect("fixture parses")
}

/// The visible set contains exactly the entries that satisfy every active
/// predicate, in catalog order.
#[test]
fn visible_set_is_sound_and_complete() {
    let catalog = fixture();
    let criteria = FilterCriteria {
        category: CategoryFilter::Only(Category::Goats),
        query: "o".to_string(),
        genre: Some("Thriller".to_string()),
    };

    let visible = visible_entries(&catalog, &criteria);

    for (index, entry) in catalog.entries().iter().enumerate() {
        let matches = criteria.category.admits(entry.category)
            && entry.title.to_lowercase().contains("o")
            && entry.genres.iter().any(|g| g == "Thriller");
        assert_eq!(
            visible.contains(&index),
            matches,
            "entry {:?} membership disagrees with the predicates",
            entry.id
        );
    }

    let mut sorted = visible.clone();
    sorted.sort_unstable();
    assert_eq!(visible, sorted, "catalog order must be preserved");
}

#[test]
fn search_and_category_compose_with_and() {
    let catalog = fixture();

    // "death" alone matches Death Note.
    let by_query = FilterCriteria {
        query: "death".to_string(),
        ..FilterCriteria::default()
    };
    assert_eq!(visible_entries(&catalog, &by_query), vec![1]);

    // Same query scoped to Sports matches nothing.
    let crossed = FilterCriteria {
        category: CategoryFilter::Only(Category::Sports),
        query: "death".to_string(),
        genre: None,
    };
    assert!(visible_entries(&catalog, &crossed).is_empty());
}

#[test]
fn query_matching_ignores_case_and_surrounding_whitespace() {
    let catalog = fixture();
    for query in ["HAIKYUU", "haikyuu", "  HaIkYuU  ", "ikyu"] {
        let criteria = FilterCriteria {
            query: query.to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(
            visible_entries(&catalog, &criteria),
            vec![3],
            "query {query:?} should match Haikyuu!! only"
        );
    }
}

#[test]
fn genre_filter_is_exact_membership_not_substring() {
    let catalog = fixture();

    let exact = FilterCriteria {
        genre: Some("Drama".to_string()),
        ..FilterCriteria::default()
    };
    assert_eq!(visible_entries(&catalog, &exact), vec![2, 3]);

    let prefix = FilterCriteria {
        genre: Some("Dra".to_string()),
        ..FilterCriteria::default()
    };
    assert!(visible_entries(&catalog, &prefix).is_empty());
}

#[test]
fn all_three_predicates_together() {
    let catalog = fixture();
    let criteria = FilterCriteria {
        category: CategoryFilter::Only(Category::Sports),
        query: "lock".to_string(),
        genre: Some("Thriller".to_string()),
    };
    assert_eq!(visible_entries(&catalog, &criteria), vec![4]);
}

#[test]
fn cache_tracks_criteria_changes() {
    let catalog = fixture();
    let mut cache = FilterCache::new();

    let wide = FilterCriteria::default();
    assert_eq!(cache.visible(&catalog, &wide), &[0, 1, 2, 3, 4]);

    let narrow = FilterCriteria {
        category: CategoryFilter::Only(Category::Sports),
        ..FilterCriteria::default()
    };
    assert_eq!(cache.visible(&catalog, &narrow), &[3, 4]);

    // Widening again recomputes; the memo never serves a stale set.
    assert_eq!(cache.visible(&catalog, &wide), &[0, 1, 2, 3, 4]);
}

#[test]
fn genre_vocabulary_respects_category_scope() {
    let catalog = fixture();

    assert_eq!(
        catalog.genres_in(CategoryFilter::Only(Category::Sports)),
        vec!["Drama", "Sports", "Thriller"]
    );
    assert_eq!(
        catalog.genres_in(CategoryFilter::Only(Category::MustWatch)),
        vec!["Action", "Supernatural"]
    );

    // The wildcard vocabulary is the union of all scopes.
    let all = catalog.genres_in(CategoryFilter::All);
    for category in Category::ALL {
        for genre in catalog.genres_in(CategoryFilter::Only(category)) {
            assert!(all.contains(&genre));
        }
    }
}

#[test]
fn empty_result_is_represented_not_an_error() {
    let catalog = fixture();
    let criteria = FilterCriteria {
        query: "zzz no such title".to_string(),
        ..FilterCriteria::default()
    };
    assert!(visible_entries(&catalog, &criteria).is_empty());
}
