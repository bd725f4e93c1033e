//! Collection filter applied before due selection.

use review_core::{Category, CefrLevel, LearningItem};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Case-insensitive substring of term, translation or example.
    pub search: Option<String>,
    pub category: Option<Category>,
    pub level: Option<CefrLevel>,
}

impl ItemFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.category.is_none() && self.level.is_none()
    }

    pub fn matches(&self, item: &LearningItem) -> bool {
        let content = &item.content;
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = [&content.term, &content.translation, &content.example]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if self.category.is_some_and(|category| category != content.category) {
            return false;
        }
        if self.level.is_some_and(|level| level != content.level_or_default()) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&'a self, items: &'a [LearningItem]) -> impl Iterator<Item = &'a LearningItem> {
        items.iter().filter(move |item| self.matches(item))
    }
}
