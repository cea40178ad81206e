use std::collections::HashSet;

use serde::Deserialize;

/// Catalog shipped inside the binary. Used whenever the on-disk copy is
/// missing or malformed.
pub const BUILTIN_CATALOG: &str = include_str!("../data/catalog.ron");

/// Publication status of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Status {
    Finished,
    Ongoing,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Ongoing => "Ongoing",
        }
    }
}

/// Fixed grouping labels. Every entry belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Category {
    MustWatch,
    Goats,
    Peak,
    Good,
    NothingElse,
    Sports,
    Underrated,
    MoreUnknown,
}

impl Category {
    /// Display order for the category bar and footer dots.
    pub const ALL: [Category; 8] = [
        Category::MustWatch,
        Category::Goats,
        Category::Peak,
        Category::Good,
        Category::NothingElse,
        Category::Sports,
        Category::Underrated,
        Category::MoreUnknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::MustWatch => "Must Watch Anime",
            Category::Goats => "Goats of Anime",
            Category::Peak => "Peak of Anime",
            Category::Good => "Good Anime",
            Category::NothingElse => "Anime to Watch When There's Nothing Else",
            Category::Sports => "Sports Anime",
            Category::Underrated => "Underrated Anime",
            Category::MoreUnknown => "More Unknown Anime",
        }
    }

    /// Compact label for the category bar buttons.
    pub fn short_label(self) -> &'static str {
        match self {
            Category::MustWatch => "Must Watch",
            Category::Goats => "Goats",
            Category::Peak => "Peak",
            Category::Good => "Good",
            Category::NothingElse => "Nothing Else",
            Category::Sports => "Sports",
            Category::Underrated => "Underrated",
            Category::MoreUnknown => "More Unknown",
        }
    }
}

/// Category scope for the rail. `All` is the wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn admits(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(c) => c.short_label(),
        }
    }
}

/// One catalog record. Immutable after load; optional fields stay `None`
/// rather than carrying placeholder strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub genres: Vec<String>,
    pub description: String,
    /// sRGB accent for the card face, stands in for cover art.
    pub cover_accent: (u8, u8, u8),
    pub release_year: u16,
    pub status: Status,
    #[serde(default)]
    pub trailer_url: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub episodes: Option<u16>,
    #[serde(default)]
    pub original_title: Option<String>,
}

/// The full entry list, loaded once at startup and never mutated.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    entries: Vec<Entry>,
}

impl Catalog {
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Read the catalog from disk, falling back to the compiled-in copy on
    /// any failure. Never returns an error: a browsable gallery beats a
    /// startup abort over a bad data file.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match Self::from_ron(&text) {
                Ok(catalog) => return catalog,
                Err(e) => {
                    log::warn!("failed to parse {}: {}, using built-in catalog", path, e);
                }
            },
            Err(e) => {
                log::warn!("failed to read {}: {}, using built-in catalog", path, e);
            }
        }
        match Self::from_ron(BUILTIN_CATALOG) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("built-in catalog is malformed: {}", e);
                Self {
                    entries: Vec::new(),
                }
            }
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Sorted, deduplicated genre vocabulary of the entries the scope admits.
    /// Drives the genre filter control.
    pub fn genres_in(&self, scope: CategoryFilter) -> Vec<String> {
        let mut genres: Vec<String> = self
            .entries
            .iter()
            .filter(|e| scope.admits(e.category))
            .flat_map(|e| e.genres.iter().cloned())
            .collect();
        genres.sort();
        genres.dedup();
        genres
    }

    #[cfg(test)]
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

/// Structural checks on a loaded catalog. Panics on violation; call sites
/// gate on debug builds and tests.
pub fn validate_catalog(catalog: &Catalog) {
    let mut seen = HashSet::new();
    for entry in catalog.entries() {
        assert!(
            seen.insert(entry.id.as_str()),
            "duplicate entry id {:?}",
            entry.id
        );
        assert!(
            !entry.title.trim().is_empty(),
            "entry {:?} has a blank title",
            entry.id
        );
        assert!(
            (1917..=2100).contains(&entry.release_year),
            "entry {:?} has implausible release year {}",
            entry.id,
            entry.release_year
        );
        if let Some(rating) = entry.rating {
            assert!(
                (0.0..=10.0).contains(&rating),
                "entry {:?} has out-of-range rating {}",
                entry.id,
                rating
            );
        }
    }
}
