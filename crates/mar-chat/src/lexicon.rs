//! Deterministic keyword lexicon for image suggestions.
//!
//! Tables are scanned in declaration order and the first hit wins; where a
//! keyword sits inside the utterance does not matter.

use std::fmt;

/// Lexicon category, in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Food,
    Places,
    Culture,
}

impl Category {
    /// Turn a raw keyword into an image search phrase.
    pub fn decorate(&self, keyword: &str) -> String {
        match self {
            Category::Food => format!("filipino {} dish", keyword),
            Category::Places => format!("{} philippines", keyword),
            Category::Culture => format!("philippine {}", keyword),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Food => "food",
            Category::Places => "places",
            Category::Culture => "culture",
        };
        write!(f, "{}", s)
    }
}

/// One category and its ordered keywords.
pub struct LexiconCategory {
    pub category: Category,
    pub keywords: &'static [&'static str],
}

pub static VISUAL_LEXICON: &[LexiconCategory] = &[
    LexiconCategory {
        category: Category::Food,
        keywords: &[
            "adobo",
            "sinigang",
            "lechon",
            "sisig",
            "halo-halo",
            "balut",
            "kare-kare",
            "pancit",
            "lumpia",
            "bulalo",
            "tinola",
            "bicol express",
            "laing",
        ],
    },
    LexiconCategory {
        category: Category::Places,
        keywords: &[
            "chocolate hills",
            "bohol",
            "panglao",
            "tarsier",
            "boracay",
            "palawan",
            "vigan",
            "baguio",
            "tagaytay",
            "loboc river",
            "baclayon church",
            "blood compact",
        ],
    },
    LexiconCategory {
        category: Category::Culture,
        keywords: &[
            "jeepney",
            "tricycle",
            "barong",
            "bahay kubo",
            "festival",
            "fiesta",
            "sinulog",
            "ati-atihan",
            "masskara",
            "pahiyas",
            "moriones",
            "kadayawan",
            "tinikling",
            "carabao",
            "aspin",
        ],
    },
];

/// Place keyword to full location caption, checked in order.
pub static PLACE_LOCATIONS: &[(&str, &str)] = &[
    ("chocolate hills", "Chocolate Hills, Carmen, Bohol, Philippines"),
    ("bohol", "Bohol Province, Central Visayas, Philippines"),
    ("panglao", "Panglao Island, Bohol, Philippines"),
    ("tarsier", "Philippine Tarsier Sanctuary, Corella, Bohol"),
    ("boracay", "Boracay Island, Aklan, Philippines"),
    ("palawan", "Palawan Province, MIMAROPA, Philippines"),
    ("vigan", "Vigan City, Ilocos Sur, Philippines"),
    ("baguio", "Baguio City, Benguet, Philippines"),
    ("tagaytay", "Tagaytay City, Cavite, Philippines"),
    ("loboc river", "Loboc River, Bohol, Philippines"),
    ("baclayon church", "Baclayon Church, Bohol, Philippines"),
    (
        "blood compact",
        "Blood Compact Shrine, Tagbilaran City, Bohol, Philippines",
    ),
];

/// First lexicon hit for an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub category: Category,
    pub keyword: &'static str,
    /// Decorated search phrase.
    pub query: String,
}

/// Scan `text` against the lexicon, returning the first match.
pub fn scan(text: &str) -> Option<KeywordMatch> {
    let lower = text.to_lowercase();
    VISUAL_LEXICON.iter().find_map(|entry| {
        entry
            .keywords
            .iter()
            .copied()
            .find(|kw| lower.contains(kw))
            .map(|kw| KeywordMatch {
                category: entry.category,
                keyword: kw,
                query: entry.category.decorate(kw),
            })
    })
}

/// Location caption for a decorated query, if it names a known place.
pub fn location_for(query: &str) -> Option<&'static str> {
    PLACE_LOCATIONS
        .iter()
        .find(|(place, _)| query.contains(place))
        .map(|(_, location)| *location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_decoration() {
        let m = scan("I'd love some Sinigang tonight").unwrap();
        assert_eq!(m.category, Category::Food);
        assert_eq!(m.keyword, "sinigang");
        assert_eq!(m.query, "filipino sinigang dish");
    }

    #[test]
    fn test_food_beats_place_regardless_of_position() {
        let m = scan("In Bohol I ate adobo").unwrap();
        assert_eq!(m.category, Category::Food);
        assert_eq!(m.query, "filipino adobo dish");
    }

    #[test]
    fn test_table_order_within_category() {
        // "bohol" precedes "tarsier" in the places table.
        let m = scan("tarsier sanctuary in bohol").unwrap();
        assert_eq!(m.keyword, "bohol");
        assert_eq!(m.query, "bohol philippines");
    }

    #[test]
    fn test_culture_decoration() {
        let m = scan("Tell me about the jeepney").unwrap();
        assert_eq!(m.category, Category::Culture);
        assert_eq!(m.query, "philippine jeepney");
    }

    #[test]
    fn test_no_match() {
        assert!(scan("What is the capital of France?").is_none());
        assert!(scan("").is_none());
    }

    #[test]
    fn test_location_lookup() {
        assert_eq!(
            location_for("chocolate hills philippines"),
            Some("Chocolate Hills, Carmen, Bohol, Philippines")
        );
        assert_eq!(
            location_for("blood compact philippines"),
            Some("Blood Compact Shrine, Tagbilaran City, Bohol, Philippines")
        );
        assert_eq!(location_for("filipino adobo dish"), None);
        assert_eq!(location_for("philippine festival"), None);
    }

    #[test]
    fn test_every_place_has_a_location() {
        let places = VISUAL_LEXICON
            .iter()
            .find(|c| c.category == Category::Places)
            .unwrap();
        for kw in places.keywords {
            assert!(
                location_for(&Category::Places.decorate(kw)).is_some(),
                "no location for {}",
                kw
            );
        }
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Food.to_string(), "food");
        assert_eq!(Category::Culture.to_string(), "culture");
    }
}
