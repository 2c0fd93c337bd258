//! Voice command intents and keyword matching.
//!
//! Intents are checked in declaration order and the first intent with a
//! keyword contained in the command wins, so "find a cafe near the park"
//! resolves to [`Intent::Coffee`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A place category a voice command can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Coffee,
    Restaurant,
    Hotel,
    Beach,
    Mountain,
    Museum,
    Park,
    Hospital,
    Pharmacy,
    Atm,
}

impl Intent {
    /// All intents in matching priority order.
    pub const ALL: [Intent; 10] = [
        Intent::Coffee,
        Intent::Restaurant,
        Intent::Hotel,
        Intent::Beach,
        Intent::Mountain,
        Intent::Museum,
        Intent::Park,
        Intent::Hospital,
        Intent::Pharmacy,
        Intent::Atm,
    ];

    /// Wire name, e.g. `"coffee"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Coffee => "coffee",
            Self::Restaurant => "restaurant",
            Self::Hotel => "hotel",
            Self::Beach => "beach",
            Self::Mountain => "mountain",
            Self::Museum => "museum",
            Self::Park => "park",
            Self::Hospital => "hospital",
            Self::Pharmacy => "pharmacy",
            Self::Atm => "atm",
        }
    }

    /// Parse a wire name.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        let needle = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|intent| intent.name() == needle)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown search type '{name}'. Must be one of: {}",
                    Self::ALL.map(Intent::name).join(", ")
                ))
            })
    }

    /// Words that trigger this intent.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Coffee => &["coffee", "cafe", "espresso", "latte", "cappuccino"],
            Self::Restaurant => &["restaurant", "food", "eat", "dining", "lunch", "dinner"],
            Self::Hotel => &["hotel", "accommodation", "stay", "lodge", "room"],
            Self::Beach => &["beach", "sandy", "coast", "seaside", "ocean"],
            Self::Mountain => &["mountain", "hiking", "peak", "trail", "climbing"],
            Self::Museum => &["museum", "gallery", "art", "history", "exhibit"],
            Self::Park => &["park", "garden", "nature", "outdoor", "green"],
            Self::Hospital => &["hospital", "doctor", "medical", "emergency", "clinic"],
            Self::Pharmacy => &["pharmacy", "medicine", "drug", "prescription"],
            Self::Atm => &["atm", "cash", "bank", "money"],
        }
    }

    /// Free-text query sent to the places provider.
    pub fn place_query(self) -> &'static str {
        match self {
            Self::Coffee => "coffee shop",
            other => other.name(),
        }
    }

    /// Google Places `type` filter.
    pub fn place_type(self) -> &'static str {
        match self {
            Self::Coffee => "cafe",
            Self::Restaurant => "restaurant",
            Self::Hotel => "lodging",
            Self::Beach | Self::Mountain => "natural_feature",
            Self::Museum => "museum",
            Self::Park => "park",
            Self::Hospital => "hospital",
            Self::Pharmacy => "pharmacy",
            Self::Atm => "atm",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Detect the intent of a transcribed voice command.
///
/// Matching is a plain substring test against the lower-cased, trimmed text.
pub fn detect_intent(text: &str) -> Option<Intent> {
    let text = text.trim().to_lowercase();
    Intent::ALL
        .into_iter()
        .find(|intent| intent.keywords().iter().any(|kw| text.contains(kw)))
}

/// Hint returned when no intent matches.
pub const UNRECOGNISED_COMMAND_MESSAGE: &str =
    "Could not understand. Try: 'Find coffee' or 'Show restaurants'";

/// Transcription used for uploaded audio until real speech-to-text exists.
pub const SIMULATED_TRANSCRIPTION: &str = "Find restaurants nearby";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_coffee_is_coffee() {
        assert_eq!(detect_intent("find coffee"), Some(Intent::Coffee));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(detect_intent("  Show me RESTAURANTS "), Some(Intent::Restaurant));
        assert_eq!(detect_intent("Need CASH"), Some(Intent::Atm));
    }

    #[test]
    fn first_intent_in_order_wins() {
        // "cafe" (coffee) and "park" both appear; coffee is checked first.
        assert_eq!(detect_intent("cafe near the park"), Some(Intent::Coffee));
    }

    #[test]
    fn substring_matching_is_preserved() {
        // "eat" is a substring of "great", so this resolves to restaurant.
        assert_eq!(detect_intent("a great view"), Some(Intent::Restaurant));
    }

    #[test]
    fn unknown_text_has_no_intent() {
        assert_eq!(detect_intent("sing me a song"), None);
        assert_eq!(detect_intent(""), None);
    }

    #[test]
    fn simulated_transcription_is_restaurant() {
        assert_eq!(detect_intent(SIMULATED_TRANSCRIPTION), Some(Intent::Restaurant));
    }

    #[test]
    fn from_name_round_trips_all() {
        for intent in Intent::ALL {
            assert_eq!(Intent::from_name(intent.name()).unwrap(), intent);
        }
        assert!(Intent::from_name("casino").is_err());
    }

    #[test]
    fn place_queries() {
        assert_eq!(Intent::Coffee.place_query(), "coffee shop");
        assert_eq!(Intent::Hotel.place_query(), "hotel");
        assert_eq!(Intent::Hotel.place_type(), "lodging");
        assert_eq!(Intent::Beach.place_type(), "natural_feature");
    }
}
