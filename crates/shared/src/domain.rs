use std::{collections::HashMap, fmt, str::FromStr};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{protocol::ImageRecord, timestamp::parse_capture_timestamp};

const LOCATION_PREVIEW_CHARS: usize = 20;

/// Identity of a captured item within the gallery.
///
/// Derived from server-provided content so that the same record keeps its id
/// across re-fetches. Identical records in one batch are told apart by an
/// occurrence suffix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    fn content_digest(record: &ImageRecord) -> String {
        let mut hasher = Sha256::new();
        for field in [
            &record.user_id,
            &record.date_added,
            &record.image_url,
            &record.cropped_image_url,
        ] {
            hasher.update(field.as_bytes());
            hasher.update([0x1f_u8]);
        }
        let digest = hasher.finalize();
        URL_SAFE_NO_PAD.encode(&digest[..16])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    TimeAscending,
    TimeDescending,
}

impl SortOrder {
    pub fn label(self) -> &'static str {
        match self {
            Self::TimeAscending => "Time Ascending",
            Self::TimeDescending => "Time Descending",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "time ascending" => Ok(Self::TimeAscending),
            "desc" | "descending" | "time descending" => Ok(Self::TimeDescending),
            other => Err(format!(
                "unknown sort order '{other}' (expected asc or desc)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedItem {
    pub id: ItemId,
    pub user_id: String,
    pub date_added: String,
    pub location_taken: String,
    pub details: String,
    pub probability: String,
    pub image_classification: String,
    pub cropped_image_url: String,
    pub image_url: String,
}

impl CapturedItem {
    /// Maps wire records into items, preserving array order.
    pub fn from_records(records: Vec<ImageRecord>) -> Vec<CapturedItem> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        records
            .into_iter()
            .map(|record| {
                let digest = ItemId::content_digest(&record);
                let occurrence = seen.entry(digest.clone()).or_insert(0);
                let id = if *occurrence == 0 {
                    ItemId(digest)
                } else {
                    ItemId(format!("{digest}#{occurrence}"))
                };
                *occurrence += 1;
                CapturedItem::with_id(id, record)
            })
            .collect()
    }

    fn with_id(id: ItemId, record: ImageRecord) -> Self {
        Self {
            id,
            user_id: record.user_id,
            date_added: record.date_added,
            location_taken: record.location_taken,
            details: record.details,
            probability: record.probability,
            image_classification: record.image_classification,
            cropped_image_url: record.cropped_image_url,
            image_url: record.image_url,
        }
    }

    pub fn captured_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_capture_timestamp(&self.date_added)
    }

    pub fn location_preview(&self) -> String {
        let preview: String = self
            .location_taken
            .chars()
            .take(LOCATION_PREVIEW_CHARS)
            .collect();
        format!("{preview}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(classification: &str, date_added: &str, image_url: &str) -> ImageRecord {
        ImageRecord {
            user_id: "dog".into(),
            date_added: date_added.into(),
            image_classification: classification.into(),
            image_url: image_url.into(),
            ..ImageRecord::default()
        }
    }

    #[test]
    fn ids_are_stable_across_batches() {
        let first = CapturedItem::from_records(vec![record(
            "Oak",
            "2024-01-01T10:00:00.000+00:00",
            "https://img/1.jpg",
        )]);
        let second = CapturedItem::from_records(vec![record(
            "Oak",
            "2024-01-01T10:00:00.000+00:00",
            "https://img/1.jpg",
        )]);
        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn duplicate_records_get_distinct_ids() {
        let items = CapturedItem::from_records(vec![
            record("Oak", "2024-01-01T10:00:00.000+00:00", "https://img/1.jpg"),
            record("Oak", "2024-01-01T10:00:00.000+00:00", "https://img/1.jpg"),
            record("Elm", "2024-02-01T10:00:00.000+00:00", "https://img/2.jpg"),
        ]);
        assert_ne!(items[0].id, items[1].id);
        assert_ne!(items[0], items[1]);
        assert!(items[1].id.as_str().ends_with("#1"));
        assert_ne!(items[0].id, items[2].id);
    }

    #[test]
    fn from_records_preserves_array_order() {
        let items = CapturedItem::from_records(vec![
            record("Elm", "2024-02-01T10:00:00.000+00:00", "b"),
            record("Oak", "2024-01-01T10:00:00.000+00:00", "a"),
        ]);
        let titles: Vec<_> = items
            .iter()
            .map(|item| item.image_classification.as_str())
            .collect();
        assert_eq!(titles, ["Elm", "Oak"]);
    }

    #[test]
    fn location_preview_truncates_to_twenty_chars() {
        let mut items = CapturedItem::from_records(vec![ImageRecord::default()]);
        let item = &mut items[0];
        item.location_taken = "1600 Amphitheatre Parkway, Mountain View".into();
        assert_eq!(item.location_preview(), "1600 Amphitheatre Pa...");

        item.location_taken = "Park".into();
        assert_eq!(item.location_preview(), "Park...");
    }

    #[test]
    fn sort_order_parses_labels_and_short_forms() {
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::TimeAscending));
        assert_eq!(
            "Time Descending".parse::<SortOrder>(),
            Ok(SortOrder::TimeDescending)
        );
        assert_eq!("DESC".parse::<SortOrder>(), Ok(SortOrder::TimeDescending));
        assert!("sideways".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::default(), SortOrder::TimeAscending);
    }
}
