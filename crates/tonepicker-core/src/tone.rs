use serde::{Deserialize, Serialize};

use crate::error::ToneError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Casual,
    Friendly,
    Professional,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Casual => "casual",
            Tone::Friendly => "friendly",
            Tone::Professional => "professional",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "formal" => Some(Tone::Formal),
            "casual" => Some(Tone::Casual),
            "friendly" => Some(Tone::Friendly),
            "professional" => Some(Tone::Professional),
            _ => None,
        }
    }

    pub fn all() -> Vec<Tone> {
        vec![Tone::Formal, Tone::Casual, Tone::Friendly, Tone::Professional]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tone::Formal => "Formal",
            Tone::Casual => "Casual",
            Tone::Friendly => "Friendly",
            Tone::Professional => "Professional",
        }
    }
}

/// A `(from, to)` tone pair. `from` and `to` always differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToneDirection {
    pub from: Tone,
    pub to: Tone,
}

/// The closed set of tone identifiers accepted on the wire, in display order.
static DIRECTIONS: [(&str, ToneDirection); 9] = [
    ("formal-casual", ToneDirection { from: Tone::Formal, to: Tone::Casual }),
    ("formal-friendly", ToneDirection { from: Tone::Formal, to: Tone::Friendly }),
    ("formal-professional", ToneDirection { from: Tone::Formal, to: Tone::Professional }),
    ("casual-formal", ToneDirection { from: Tone::Casual, to: Tone::Formal }),
    ("casual-friendly", ToneDirection { from: Tone::Casual, to: Tone::Friendly }),
    ("casual-professional", ToneDirection { from: Tone::Casual, to: Tone::Professional }),
    ("friendly-formal", ToneDirection { from: Tone::Friendly, to: Tone::Formal }),
    ("friendly-casual", ToneDirection { from: Tone::Friendly, to: Tone::Casual }),
    ("friendly-professional", ToneDirection { from: Tone::Friendly, to: Tone::Professional }),
];

/// Static lookup from tone identifier to [`ToneDirection`].
///
/// Lookups are exact and case-sensitive. There is no fallback direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToneDirectionTable;

impl ToneDirectionTable {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, identifier: &str) -> Result<ToneDirection, ToneError> {
        DIRECTIONS
            .iter()
            .find(|(id, _)| *id == identifier)
            .map(|(_, direction)| *direction)
            .ok_or(ToneError::InvalidTone)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.resolve(identifier).is_ok()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &'static str> {
        DIRECTIONS.iter().map(|(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_identifiers_resolve_to_distinct_tones() {
        let table = ToneDirectionTable::new();
        let ids: Vec<_> = table.identifiers().collect();
        assert_eq!(ids.len(), 9);
        for id in ids {
            let direction = table.resolve(id).unwrap();
            assert_ne!(direction.from, direction.to, "{id}");
            assert_eq!(id, format!("{}-{}", direction.from.as_str(), direction.to.as_str()));
        }
    }

    #[test]
    fn test_unknown_identifiers_are_invalid() {
        let table = ToneDirectionTable::new();
        for id in [
            "",
            "formal-formal",
            "Formal-Casual",
            " formal-casual",
            "professional-casual",
            "casual",
            "formal_casual",
        ] {
            assert!(matches!(table.resolve(id), Err(ToneError::InvalidTone)), "{id:?}");
        }
    }

    #[test]
    fn test_tone_round_trips_through_str() {
        for tone in Tone::all() {
            assert_eq!(Tone::from_str(tone.as_str()), Some(tone));
        }
        assert_eq!(Tone::from_str("FORMAL"), None);
    }
}
