//! Category catalog: display-only grouping descriptors for the sidebar.
//!
//! Categories live in local view memory. Where the list comes from and whether
//! the counts track note membership are both explicit settings
//! ([`CategorySource`], [`CountPolicy`]) rather than implied behavior.
//!
//! Notes snapshot a category's colors when they are written. Recoloring a
//! category afterwards does not restyle notes that already exist; they pick up
//! the new colors only when they are explicitly updated.

use crate::note::Note;
use serde::{Deserialize, Serialize};

/// Background token used when a note's category is not in the catalog.
pub const DEFAULT_COLOR: &str = "bg-gray-50";

/// Border token used when a note's category is not in the catalog.
pub const DEFAULT_BORDER_COLOR: &str = "border-l-4 border-l-gray-500";

pub const DEFAULT_TEXT_COLOR: &str = "text-gray-800";

/// Name given to categories created through "add category".
pub const PLACEHOLDER_NAME: &str = "New category";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub name: String,
    /// Sidebar count. Only recomputed under [`CountPolicy::Derived`].
    pub count: u32,
    pub color: String,
    pub text_color: String,
    pub accent_color: String,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        count: u32,
        color: impl Into<String>,
        text_color: impl Into<String>,
        accent_color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            count,
            color: color.into(),
            text_color: text_color.into(),
            accent_color: accent_color.into(),
        }
    }

    fn placeholder(name: String) -> Self {
        Self {
            name,
            count: 0,
            color: DEFAULT_COLOR.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            accent_color: DEFAULT_BORDER_COLOR.to_string(),
        }
    }
}

/// Colors copied onto a note at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStyle {
    pub color: String,
    pub border_color: String,
}

impl Default for CategoryStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            border_color: DEFAULT_BORDER_COLOR.to_string(),
        }
    }
}

/// Where the catalog's initial contents come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    /// Start from the configured seed list.
    Seeded,
    /// Start empty; the user builds the list with "add category".
    UserBuilt,
}

/// Whether category counts follow note membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountPolicy {
    /// Counts are cosmetic and never recomputed.
    Static,
    /// Counts are recomputed from every delivered snapshot.
    Derived,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
    count_policy: CountPolicy,
}

impl CategoryCatalog {
    pub fn new(source: CategorySource, count_policy: CountPolicy, seed: Vec<Category>) -> Self {
        let categories = match source {
            CategorySource::Seeded => seed,
            CategorySource::UserBuilt => Vec::new(),
        };
        Self {
            categories,
            count_policy,
        }
    }

    /// Seeded list with static counts.
    pub fn canonical() -> Self {
        Self::new(
            CategorySource::Seeded,
            CountPolicy::Static,
            Self::default_seed(),
        )
    }

    pub fn default_seed() -> Vec<Category> {
        vec![
            Category::new(
                "Machine learning",
                31,
                "bg-purple-100",
                "text-purple-800",
                "border-l-purple-500",
            ),
            Category::new(
                "Neuroscience",
                12,
                "bg-blue-100",
                "text-blue-800",
                "border-l-blue-500",
            ),
            Category::new(
                "Philosophy",
                8,
                "bg-amber-100",
                "text-amber-800",
                "border-l-amber-500",
            ),
            Category::new(
                "Economics",
                5,
                "bg-green-100",
                "text-green-800",
                "border-l-green-500",
            ),
        ]
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn count_policy(&self) -> CountPolicy {
        self.count_policy
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Colors for a note filed under `name`.
    ///
    /// Exact name match, first match wins; unknown names get the default pair.
    pub fn resolve(&self, name: &str) -> CategoryStyle {
        match self.get(name) {
            Some(category) => CategoryStyle {
                color: category.color.clone(),
                border_color: category.accent_color.clone(),
            },
            None => CategoryStyle::default(),
        }
    }

    /// Append a default-named placeholder category and return it.
    pub fn add_placeholder(&mut self) -> &Category {
        let mut name = PLACEHOLDER_NAME.to_string();
        let mut suffix = 2;
        while self.get(&name).is_some() {
            name = format!("{} {}", PLACEHOLDER_NAME, suffix);
            suffix += 1;
        }
        let index = self.categories.len();
        self.categories.push(Category::placeholder(name));
        &self.categories[index]
    }

    /// Change a category's display colors. Returns false for unknown names.
    ///
    /// Existing notes keep the colors they were written with.
    pub fn recolor(&mut self, name: &str, color: &str, accent_color: &str) -> bool {
        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(category) => {
                category.color = color.to_string();
                category.accent_color = accent_color.to_string();
                true
            }
            None => false,
        }
    }

    /// Recompute counts from note membership. No-op under [`CountPolicy::Static`].
    pub fn refresh_counts(&mut self, notes: &[Note]) {
        if self.count_policy != CountPolicy::Derived {
            return;
        }
        for category in &mut self.categories {
            category.count = notes
                .iter()
                .filter(|note| note.category == category.name)
                .count() as u32;
        }
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::canonical()
    }
}
