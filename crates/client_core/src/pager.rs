//! Paged detail view over a snapshot of the gallery.

use shared::domain::CapturedItem;

/// Text shown on the detail card, plus the image URL handed to the image
/// loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailCard {
    pub title: String,
    pub location: String,
    pub date: String,
    pub probability: String,
    pub image_url: String,
}

impl DetailCard {
    pub fn from_item(item: &CapturedItem) -> Self {
        Self {
            title: item.image_classification.clone(),
            location: format!("Location: {}", item.location_preview()),
            date: format!("Date: {}", item.date_added),
            probability: format!("Probability: {}", item.probability),
            image_url: item.cropped_image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DetailPager {
    items: Vec<CapturedItem>,
    index: usize,
}

impl DetailPager {
    pub fn new(items: Vec<CapturedItem>) -> Self {
        Self { items, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn item_at(&self, index: usize) -> Option<&CapturedItem> {
        self.items.get(index)
    }

    pub fn current(&self) -> Option<&CapturedItem> {
        self.item_at(self.index)
    }

    pub fn card(&self) -> Option<DetailCard> {
        self.current().map(DetailCard::from_item)
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.items.len()
    }

    pub fn next(&mut self) -> Option<&CapturedItem> {
        if self.has_next() {
            self.index += 1;
        }
        self.current()
    }

    pub fn previous(&mut self) -> Option<&CapturedItem> {
        self.index = self.index.saturating_sub(1);
        self.current()
    }
}
