//! Structured attribute bags stored on the remote platform as metafields.
//!
//! Every field is an optional string. An empty string is treated the same as an
//! absent value: it produces no tag, no description row and no metafield, which
//! is also how a patch clears a field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::EntityKind;

/// A detail schema: the metafield namespace plus the fields stored under it.
///
/// The tag rule engine and the description generator only see a schema through
/// the accessors below; schemas without a notion of year or dimensions keep the
/// default `None`.
pub trait DetailSchema:
    Clone + Default + PartialEq + core::fmt::Debug + Serialize + Send + Sync + 'static
{
    /// Metafield namespace on the remote platform.
    const NAMESPACE: &'static str;

    const KIND: EntityKind;

    /// All fields as `(metafield key, value)`, in declaration order.
    fn fields(&self) -> Vec<(&'static str, Option<&str>)>;

    /// Set a field by metafield key. Returns `false` for unknown keys.
    fn set_field(&mut self, key: &str, value: Option<String>) -> bool;

    /// Rows of the generated description list as `(label, value)`.
    fn description_rows(&self, vendor: &str, product_type: &str) -> Vec<(&'static str, String)>;

    /// Called once on load, after metafields were applied.
    fn on_load(&mut self, _vendor: &str) {}

    fn year(&self) -> Option<&str> {
        None
    }

    fn location(&self) -> Option<&str> {
        None
    }

    fn medium(&self) -> Option<&str> {
        None
    }

    fn height(&self) -> Option<&str> {
        None
    }

    fn width(&self) -> Option<&str> {
        None
    }

    /// Overlay every present field of `patch` onto `self`.
    fn merge(&mut self, patch: &Self) {
        for (key, value) in patch.fields() {
            if let Some(value) = value {
                self.set_field(key, Some(value.to_string()));
            }
        }
    }

    /// Fields with a non-empty value, i.e. what is worth pushing as metafields.
    fn present_fields(&self) -> Vec<(&'static str, &str)> {
        self.fields()
            .into_iter()
            .filter_map(|(key, value)| present(value).map(|v| (key, v)))
            .collect()
    }
}

/// `Some` only for non-blank strings.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Details of an artwork (`art_details` namespace).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkDetails {
    pub artist: Option<String>,
    pub medium: Option<String>,
    pub year: Option<String>,
    pub height: Option<String>,
    pub width: Option<String>,
    pub depth: Option<String>,
    pub serie: Option<String>,
    pub location: Option<String>,
}

impl ArtworkDetails {
    /// `height x width x depth`, skipping absent dimensions.
    pub fn dimensions(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.height, &self.width, &self.depth]
            .into_iter()
            .filter_map(|v| present(v.as_deref()))
            .collect();
        (!parts.is_empty()).then(|| parts.join(" x "))
    }
}

impl DetailSchema for ArtworkDetails {
    const NAMESPACE: &'static str = "art_details";
    const KIND: EntityKind = EntityKind::Product;

    fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("artist", self.artist.as_deref()),
            ("medium", self.medium.as_deref()),
            ("year", self.year.as_deref()),
            ("height", self.height.as_deref()),
            ("width", self.width.as_deref()),
            ("depth", self.depth.as_deref()),
            ("serie", self.serie.as_deref()),
            ("location", self.location.as_deref()),
        ]
    }

    fn set_field(&mut self, key: &str, value: Option<String>) -> bool {
        let slot = match key {
            "artist" => &mut self.artist,
            "medium" => &mut self.medium,
            "year" => &mut self.year,
            "height" => &mut self.height,
            "width" => &mut self.width,
            "depth" => &mut self.depth,
            "serie" => &mut self.serie,
            "location" => &mut self.location,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn description_rows(&self, vendor: &str, product_type: &str) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        let mut push = |label: &'static str, value: Option<&str>| {
            if let Some(v) = present(value) {
                rows.push((label, v.to_string()));
            }
        };

        push("Artista", Some(vendor));
        push("Técnica", self.medium.as_deref());
        push("Tipo", Some(product_type));
        // The measurements row is keyed on height, like the storefront expects.
        if present(self.height.as_deref()).is_some() {
            push("Medidas (cm)", self.dimensions().as_deref());
        }
        push("Año", self.year.as_deref());
        push("Localización", self.location.as_deref());
        rows
    }

    fn on_load(&mut self, vendor: &str) {
        if present(self.artist.as_deref()).is_none() && !vendor.is_empty() {
            self.artist = Some(vendor.to_string());
        }
    }

    fn year(&self) -> Option<&str> {
        present(self.year.as_deref())
    }

    fn location(&self) -> Option<&str> {
        present(self.location.as_deref())
    }

    fn medium(&self) -> Option<&str> {
        present(self.medium.as_deref())
    }

    fn height(&self) -> Option<&str> {
        present(self.height.as_deref())
    }

    fn width(&self) -> Option<&str> {
        present(self.width.as_deref())
    }
}

/// Details of an event (`event_details` namespace).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub date: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub organizer: Option<String>,
}

impl EventDetails {
    /// Event day, accepting `YYYY-MM-DD` optionally followed by a time part.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = present(self.date.as_deref())?.trim();
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// Whether the event day is strictly before `today`. Undated events never pass.
    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.parsed_date().is_some_and(|date| date < today)
    }

    /// Whole days from `today` until the event (negative once it has passed).
    pub fn days_until(&self, today: NaiveDate) -> Option<i64> {
        self.parsed_date().map(|date| (date - today).num_days())
    }

    /// One-line summary: date, start time, place and organizer, when known.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(date) = self.parsed_date() {
            parts.push(format!("📅 {}", date.format("%-d/%-m/%Y")));
        }
        if let Some(start) = present(self.start_time.as_deref()) {
            parts.push(format!("🕐 {start}"));
        }
        if let Some(location) = present(self.location.as_deref()) {
            parts.push(format!("📍 {location}"));
        }
        if let Some(organizer) = present(self.organizer.as_deref()) {
            parts.push(format!("👤 {organizer}"));
        }
        parts.join(" • ")
    }

    fn schedule(&self) -> Option<String> {
        match (
            present(self.start_time.as_deref()),
            present(self.end_time.as_deref()),
        ) {
            (Some(start), Some(end)) => Some(format!("{start} - {end}")),
            (Some(start), None) => Some(start.to_string()),
            (None, Some(end)) => Some(format!("hasta {end}")),
            (None, None) => None,
        }
    }
}

impl DetailSchema for EventDetails {
    const NAMESPACE: &'static str = "event_details";
    const KIND: EntityKind = EntityKind::Event;

    fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("date", self.date.as_deref()),
            ("location", self.location.as_deref()),
            ("startTime", self.start_time.as_deref()),
            ("endTime", self.end_time.as_deref()),
            ("organizer", self.organizer.as_deref()),
        ]
    }

    fn set_field(&mut self, key: &str, value: Option<String>) -> bool {
        let slot = match key {
            "date" => &mut self.date,
            "location" => &mut self.location,
            "startTime" => &mut self.start_time,
            "endTime" => &mut self.end_time,
            "organizer" => &mut self.organizer,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn description_rows(&self, _vendor: &str, _product_type: &str) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        if let Some(date) = present(self.date.as_deref()) {
            rows.push(("Fecha", date.to_string()));
        }
        if let Some(schedule) = self.schedule() {
            rows.push(("Horario", schedule));
        }
        if let Some(location) = present(self.location.as_deref()) {
            rows.push(("Lugar", location.to_string()));
        }
        if let Some(organizer) = present(self.organizer.as_deref()) {
            rows.push(("Organiza", organizer.to_string()));
        }
        rows
    }

    fn location(&self) -> Option<&str> {
        present(self.location.as_deref())
    }
}
