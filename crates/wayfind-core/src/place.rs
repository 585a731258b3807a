//! Place catalogue domain types.

use serde::{Deserialize, Serialize};

/// Broad category assigned to a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Food,
    Drink,
    Sightseeing,
    Shopping,
    Activity,
    Lodging,
    #[default]
    Other,
}

impl Category {
    /// Maps a free-text label to a category, falling back to [`Category::Other`].
    ///
    /// Matching is case-insensitive on the canonical upper-case names.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "FOOD" => Self::Food,
            "DRINK" => Self::Drink,
            "SIGHTSEEING" => Self::Sightseeing,
            "SHOPPING" => Self::Shopping,
            "ACTIVITY" => Self::Activity,
            "LODGING" => Self::Lodging,
            _ => Self::Other,
        }
    }
}

/// Relative price band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PriceLevel {
    Free,
    #[serde(rename = "$")]
    Inexpensive,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Expensive,
    #[serde(rename = "$$$$")]
    VeryExpensive,
    #[default]
    Unknown,
}

impl PriceLevel {
    /// Maps a free-text label (`"Free"`, `"$$"`, …) to a price level.
    ///
    /// Anything unrecognised becomes [`PriceLevel::Unknown`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("free") {
            return Self::Free;
        }
        match label {
            "$" | "1" => Self::Inexpensive,
            "$$" | "2" => Self::Moderate,
            "$$$" | "3" => Self::Expensive,
            "$$$$" | "4" => Self::VeryExpensive,
            _ => Self::Unknown,
        }
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Returns coordinates only when both values are finite and in range.
    #[must_use]
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        let coords = Self { lat, lng };
        coords.is_valid().then_some(coords)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// One discovered point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    /// Stable identifier. Never reassigned once the record exists.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Predicted rating in `[1.0, 5.0]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_prediction: Option<f32>,
    #[serde(default)]
    pub price_level: PriceLevel,
    /// Free-text "Region Subregion" label.
    #[serde(default)]
    pub location_guess: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_uri: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_uri: Option<String>,
}

impl PlaceRecord {
    /// Creates a bare record with only an id and a name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: Category::Other,
            sub_category: None,
            description: String::new(),
            tags: Vec::new(),
            rating_prediction: None,
            price_level: PriceLevel::Unknown,
            location_guess: String::new(),
            address: None,
            coordinates: None,
            opening_hours: None,
            map_uri: None,
            is_verified: false,
            image_uri: None,
            website_uri: None,
        }
    }

    /// Coordinates that pass the range and finiteness check, if any.
    ///
    /// Out-of-range values are reported as absent rather than rejected.
    #[must_use]
    pub fn valid_coordinates(&self) -> Option<Coordinates> {
        self.coordinates.filter(Coordinates::is_valid)
    }

    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.valid_coordinates().is_some()
    }

    #[must_use]
    pub fn has_address(&self) -> bool {
        self.address.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image_uri
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

/// One extraction batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub places: Vec<PlaceRecord>,
}

/// A grounding citation returned alongside generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Citation {
    Web {
        title: Option<String>,
        uri: Option<String>,
    },
    Map {
        title: Option<String>,
        uri: Option<String>,
    },
}

impl Citation {
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Citation::Web { title, .. } | Citation::Map { title, .. } => title.as_deref(),
        }
    }

    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            Citation::Web { uri, .. } | Citation::Map { uri, .. } => uri.as_deref(),
        }
    }
}

/// Generates a fresh place identifier.
#[must_use]
pub fn new_place_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
