//! Destination signatures used by the image search fallback classifier.
//!
//! Classification runs in stages: an external landmark detector (outside
//! this crate), then [`classify_by_filename`], then [`pick_by_hash`] which
//! always yields a category.

use serde::{Deserialize, Serialize};

use crate::hashing::sha256_prefix_u64;

/// Landscape category of a recognisable destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Beach,
    Mountain,
    City,
    Temple,
    Forest,
    Desert,
}

impl Category {
    /// Categories in signature order; [`pick_by_hash`] indexes into this.
    pub const ALL: [Category; 6] = [
        Category::Beach,
        Category::Mountain,
        Category::City,
        Category::Temple,
        Category::Forest,
        Category::Desert,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Beach => "beach",
            Self::Mountain => "mountain",
            Self::City => "city",
            Self::Temple => "temple",
            Self::Forest => "forest",
            Self::Desert => "desert",
        }
    }

    /// Keywords matched against an uploaded file's name.
    pub fn filename_keywords(self) -> &'static [&'static str] {
        match self {
            Self::Beach => &["beach", "sandy", "coast"],
            Self::Mountain => &["mountain", "peak", "snow"],
            Self::City => &["city", "urban", "street"],
            Self::Temple => &["temple", "ancient", "religious"],
            Self::Forest => &["forest", "trees", "green"],
            Self::Desert => &["desert", "sand", "dune"],
        }
    }

    /// The fixed destination signature for this category.
    pub fn signature(self) -> &'static Signature {
        &SIGNATURES[self as usize]
    }
}

/// A canned destination a category resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signature {
    pub category: Category,
    /// Visual keywords describing the scene.
    pub keywords: &'static [&'static str],
    pub confidence: f64,
    pub location: &'static str,
    pub country: &'static str,
    pub lat: f64,
    pub lng: f64,
}

/// Signatures indexed by `Category as usize`.
pub static SIGNATURES: [Signature; 6] = [
    Signature {
        category: Category::Beach,
        keywords: &["sand", "water", "blue", "coast"],
        confidence: 0.92,
        location: "Sandy Cove Beach",
        country: "USA",
        lat: 25.7617,
        lng: -80.1918,
    },
    Signature {
        category: Category::Mountain,
        keywords: &["peak", "snow", "altitude", "rock"],
        confidence: 0.88,
        location: "Alpine Peak",
        country: "Italy",
        lat: 45.3731,
        lng: 11.9865,
    },
    Signature {
        category: Category::City,
        keywords: &["buildings", "street", "urban", "architecture"],
        confidence: 0.85,
        location: "Downtown City",
        country: "USA",
        lat: 40.7128,
        lng: -74.0060,
    },
    Signature {
        category: Category::Temple,
        keywords: &["temple", "ancient", "religious", "structure"],
        confidence: 0.90,
        location: "Sacred Temple",
        country: "Thailand",
        lat: 13.3611,
        lng: 100.9842,
    },
    Signature {
        category: Category::Forest,
        keywords: &["forest", "trees", "green", "nature"],
        confidence: 0.87,
        location: "Green Forest",
        country: "Germany",
        lat: 50.1109,
        lng: 8.6821,
    },
    Signature {
        category: Category::Desert,
        keywords: &["desert", "sand", "dune", "dry"],
        confidence: 0.89,
        location: "Great Desert",
        country: "Egypt",
        lat: 26.8206,
        lng: 30.8025,
    },
];

/// Confidence reported for a landmark found by the vision provider.
pub const LANDMARK_CONFIDENCE: f64 = 0.95;

/// Match a file name against the category keywords (case-insensitive).
pub fn classify_by_filename(filename: &str) -> Option<Category> {
    let filename = filename.to_lowercase();
    Category::ALL.into_iter().find(|category| {
        category
            .filename_keywords()
            .iter()
            .any(|kw| filename.contains(kw))
    })
}

/// Deterministically pick a category from the image bytes.
pub fn pick_by_hash(data: &[u8]) -> Category {
    let index = sha256_prefix_u64(data) % Category::ALL.len() as u64;
    Category::ALL[index as usize]
}

/// Classify an upload without external help: filename first, then hash.
pub fn classify_offline(filename: &str, data: &[u8]) -> Category {
    classify_by_filename(filename).unwrap_or_else(|| pick_by_hash(data))
}

/// Generic travel hints attached to every signature match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelDetails {
    pub estimated_travel_time: &'static str,
    pub transportation: [&'static str; 3],
    pub budget_range: &'static str,
    pub best_season: &'static str,
}

impl Default for TravelDetails {
    fn default() -> Self {
        Self {
            estimated_travel_time: "2-4 hours",
            transportation: ["Flight", "Train", "Car"],
            budget_range: "$1000-3000",
            best_season: "Spring/Fall",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signatures_are_indexed_by_category() {
        for category in Category::ALL {
            assert_eq!(category.signature().category, category);
        }
        assert_eq!(Category::Temple.signature().country, "Thailand");
    }

    #[test]
    fn filename_keywords_match() {
        assert_eq!(classify_by_filename("My_Beach_Trip.JPG"), Some(Category::Beach));
        assert_eq!(classify_by_filename("snowy-alps.png"), Some(Category::Mountain));
        assert_eq!(classify_by_filename("old_temple.webp"), Some(Category::Temple));
        assert_eq!(classify_by_filename("IMG_0001.jpg"), None);
    }

    #[test]
    fn earlier_category_wins_on_overlap() {
        // "sandy" (beach) is checked before "sand" (desert).
        assert_eq!(classify_by_filename("sandy_dunes.jpg"), Some(Category::Beach));
        assert_eq!(classify_by_filename("sand_dunes.jpg"), Some(Category::Desert));
    }

    #[test]
    fn hash_pick_is_deterministic() {
        let bytes = b"\x89PNG fake image payload";
        assert_eq!(pick_by_hash(bytes), pick_by_hash(bytes));
        // SHA-256("") starts with 0xe3b0c44298fc1c14, which is 4 mod 6.
        assert_eq!(pick_by_hash(b""), Category::Forest);
    }

    #[test]
    fn classify_offline_prefers_filename() {
        assert_eq!(classify_offline("city_lights.jpg", b""), Category::City);
        assert_eq!(classify_offline("IMG_0001.jpg", b""), Category::Forest);
    }
}
