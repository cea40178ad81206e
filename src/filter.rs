use crate::catalog::{Catalog, CategoryFilter};

/// What the user is currently asking the rail to show. Owned by the session,
/// recomputed from input; no lifecycle beyond the running app.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub category: CategoryFilter,
    pub query: String,
    /// `None` is the wildcard.
    pub genre: Option<String>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            category: CategoryFilter::All,
            query: String::new(),
            genre: None,
        }
    }
}

/// Indices, in catalog order, of the entries that satisfy every active
/// predicate. Pure: identical inputs yield identical output.
pub fn visible_entries(catalog: &Catalog, criteria: &FilterCriteria) -> Vec<usize> {
    let needle = criteria.query.trim().to_lowercase();
    catalog
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, e)| criteria.category.admits(e.category))
        .filter(|(_, e)| needle.is_empty() || e.title.to_lowercase().contains(&needle))
        .filter(|(_, e)| match &criteria.genre {
            None => true,
            Some(genre) => e.genres.iter().any(|g| g == genre),
        })
        .map(|(index, _)| index)
        .collect()
}

/// One-slot memo over the criteria triple. The catalog is immutable after
/// load, so the criteria alone key the result.
#[derive(Default)]
pub struct FilterCache {
    key: Option<FilterCriteria>,
    visible: Vec<usize>,
}

impl FilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&mut self, catalog: &Catalog, criteria: &FilterCriteria) -> &[usize] {
        if self.key.as_ref() != Some(criteria) {
            self.visible = visible_entries(catalog, criteria);
            self.key = Some(criteria.clone());
        }
        &self.visible
    }
}
