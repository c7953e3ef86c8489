//! Fixed character catalog and subscription plans.

use crate::models::{Character, CharacterId, Plan};

/// Read-only list of the personas offered in the gallery
#[derive(Debug, Clone)]
pub struct Catalog {
    characters: Vec<Character>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(builtin_characters())
    }
}

impl Catalog {
    /// Build a catalog from an explicit list; ids are expected to be unique
    #[must_use]
    pub const fn new(characters: Vec<Character>) -> Self {
        Self { characters }
    }

    /// All characters in gallery order
    #[must_use]
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Look up a character by id
    #[must_use]
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Character at a gallery position
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Character> {
        self.characters.get(index)
    }

    /// Number of characters
    #[must_use]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// True when the catalog has no characters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

fn character(
    id: CharacterId,
    name: &str,
    age: u32,
    image: &str,
    description: &str,
    personality: &str,
) -> Character {
    Character {
        id,
        name: name.to_string(),
        age,
        image: image.to_string(),
        description: description.to_string(),
        personality: personality.to_string(),
    }
}

/// The four personas available at startup
#[must_use]
pub fn builtin_characters() -> Vec<Character> {
    vec![
        character(
            1,
            "Sofia",
            23,
            "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=400",
            "Passionate and outgoing. Loves candid conversations and playful flirting.",
            "Bold, playful, adores compliments and daring ideas",
        ),
        character(
            2,
            "Alice",
            25,
            "https://images.unsplash.com/photo-1534528741775-53994a69daeb?w=400",
            "Gentle, but with character. Will go out of her way to make you smile.",
            "Romantic, sensitive, enjoys slow and thoughtful conversations",
        ),
        character(
            3,
            "Victoria",
            22,
            "https://images.unsplash.com/photo-1517841905240-472988babdf9?w=400",
            "Confident and commanding. Likes to take the lead and set the rules.",
            "Assertive, self-assured, loves role-play games",
        ),
        character(
            4,
            "Kristina",
            24,
            "https://images.unsplash.com/photo-1524504388940-b1c1722653e1?w=400",
            "Sweet and kind. Happiest when she can brighten your day.",
            "Tender, caring, loves to please",
        ),
    ]
}

/// Plans offered on the paywall
pub const PLANS: &[Plan] = &[
    Plan {
        id: "flirt",
        name: "Flirt",
        price_rub: 990,
        features: &[
            "Access to one character",
            "Unlimited messages",
            "24 hour access",
            "Conversation history",
        ],
        popular: false,
    },
    Plan {
        id: "intimate",
        name: "Intimate",
        price_rub: 1490,
        features: &[
            "Access to every character",
            "Unlimited messages",
            "24 hour access",
            "Full conversation history",
            "Priority support",
        ],
        popular: true,
    },
];

/// Look up a plan by id
#[must_use]
pub fn plan(id: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|p| p.id == id)
}
