//! Challenge instances, answers and the provider seam.
//!
//! A challenge cell on the board is bound to one [`TemplateId`] for the
//! whole session. Landing on it asks a [`ChallengeProvider`] for a fresh,
//! difficulty-scaled [`Challenge`] derived from that template.

mod catalog;

pub use catalog::Catalog;

use crate::config::Difficulty;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The three kinds of mini-game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    /// Sort items into category buckets
    Classification,
    /// Pick what comes next in a pattern
    Sequence,
    /// Drag items back into order
    Puzzle,
}

/// The predefined challenge templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemplateId {
    NumbersAscending,
    NumbersDescending,
    EvenNumbers,
    Vowels,
    Alphabet,
    OrderNumbersAscending,
    OrderNumbersDescending,
    OrderVowels,
    OrderLetters,
    OrderFruits,
    OrderAnimals,
    FruitsAndAnimals,
    TransportAndShapes,
    AnimalsAndTransport,
    Alternating,
    Growth,
    OrderPlants,
    OddNumbers,
    TripleClassification,
    IncreasingSum,
}

impl TemplateId {
    /// Every template in the pool
    pub const ALL: [TemplateId; 20] = [
        TemplateId::NumbersAscending,
        TemplateId::NumbersDescending,
        TemplateId::EvenNumbers,
        TemplateId::Vowels,
        TemplateId::Alphabet,
        TemplateId::OrderNumbersAscending,
        TemplateId::OrderNumbersDescending,
        TemplateId::OrderVowels,
        TemplateId::OrderLetters,
        TemplateId::OrderFruits,
        TemplateId::OrderAnimals,
        TemplateId::FruitsAndAnimals,
        TemplateId::TransportAndShapes,
        TemplateId::AnimalsAndTransport,
        TemplateId::Alternating,
        TemplateId::Growth,
        TemplateId::OrderPlants,
        TemplateId::OddNumbers,
        TemplateId::TripleClassification,
        TemplateId::IncreasingSum,
    ];

    /// Stable short identifier
    pub fn slug(&self) -> &'static str {
        match self {
            TemplateId::NumbersAscending => "seq-num-asc",
            TemplateId::NumbersDescending => "seq-num-desc",
            TemplateId::EvenNumbers => "seq-num-even",
            TemplateId::Vowels => "seq-vowels",
            TemplateId::Alphabet => "seq-alphabet",
            TemplateId::OrderNumbersAscending => "puzzle-num-asc",
            TemplateId::OrderNumbersDescending => "puzzle-num-desc",
            TemplateId::OrderVowels => "puzzle-vowels",
            TemplateId::OrderLetters => "puzzle-alphabet",
            TemplateId::OrderFruits => "puzzle-fruits",
            TemplateId::OrderAnimals => "puzzle-animals",
            TemplateId::FruitsAndAnimals => "class-fruits-animals",
            TemplateId::TransportAndShapes => "class-transport-shapes",
            TemplateId::AnimalsAndTransport => "class-animals-transport",
            TemplateId::Alternating => "seq-alternating",
            TemplateId::Growth => "seq-growth",
            TemplateId::OrderPlants => "puzzle-plants",
            TemplateId::OddNumbers => "seq-num-odd",
            TemplateId::TripleClassification => "class-triple",
            TemplateId::IncreasingSum => "seq-sum",
        }
    }

    /// Kind of mini-game the template produces at medium and hard.
    ///
    /// Some templates fall back to a simpler template on easy, which may
    /// be of a different kind.
    pub fn kind(&self) -> ChallengeKind {
        match self {
            TemplateId::NumbersAscending
            | TemplateId::NumbersDescending
            | TemplateId::EvenNumbers
            | TemplateId::Vowels
            | TemplateId::Alphabet
            | TemplateId::Alternating
            | TemplateId::Growth
            | TemplateId::OddNumbers
            | TemplateId::IncreasingSum => ChallengeKind::Sequence,
            TemplateId::OrderNumbersAscending
            | TemplateId::OrderNumbersDescending
            | TemplateId::OrderVowels
            | TemplateId::OrderLetters
            | TemplateId::OrderFruits
            | TemplateId::OrderAnimals
            | TemplateId::OrderPlants => ChallengeKind::Puzzle,
            TemplateId::FruitsAndAnimals
            | TemplateId::TransportAndShapes
            | TemplateId::AnimalsAndTransport
            | TemplateId::TripleClassification => ChallengeKind::Classification,
        }
    }
}

/// One bucket of a classification challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Items that belong in this bucket
    pub items: Vec<String>,
}

/// Kind-specific payload of a challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChallengeBody {
    Classification {
        categories: Vec<Category>,
    },
    Sequence {
        /// Pattern shown to the player, ending with a `?` placeholder
        pattern: Vec<String>,
        options: Vec<String>,
        solution: String,
    },
    Puzzle {
        /// Scrambled arrangement presented to the player
        current: Vec<String>,
        solution: Vec<String>,
    },
}

/// A concrete challenge, live from landing until it is resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Template it was derived from, `None` for the random fallback
    pub template: Option<TemplateId>,
    pub title: String,
    pub content: String,
    pub body: ChallengeBody,
}

/// A player's submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Answer {
    /// Items placed in each bucket, keyed by category name
    Classification(BTreeMap<String, Vec<String>>),
    /// The chosen option
    Sequence(String),
    /// The final arrangement
    Puzzle(Vec<String>),
}

impl Challenge {
    /// Kind of this instance
    pub fn kind(&self) -> ChallengeKind {
        match self.body {
            ChallengeBody::Classification { .. } => ChallengeKind::Classification,
            ChallengeBody::Sequence { .. } => ChallengeKind::Sequence,
            ChallengeBody::Puzzle { .. } => ChallengeKind::Puzzle,
        }
    }

    /// Check a submission. An answer of the wrong kind is simply wrong.
    pub fn check(&self, answer: &Answer) -> bool {
        match (&self.body, answer) {
            (ChallengeBody::Classification { categories }, Answer::Classification(buckets)) => {
                categories.iter().all(|category| {
                    let placed = buckets.get(&category.name).map(Vec::as_slice).unwrap_or(&[]);
                    placed.len() == category.items.len()
                        && category.items.iter().all(|item| placed.contains(item))
                })
            }
            (ChallengeBody::Sequence { solution, .. }, Answer::Sequence(choice)) => {
                choice == solution
            }
            (ChallengeBody::Puzzle { solution, .. }, Answer::Puzzle(arrangement)) => {
                arrangement == solution
            }
            _ => false,
        }
    }

    /// The answer that solves this challenge
    pub fn solution(&self) -> Answer {
        match &self.body {
            ChallengeBody::Classification { categories } => Answer::Classification(
                categories
                    .iter()
                    .map(|c| (c.name.clone(), c.items.clone()))
                    .collect(),
            ),
            ChallengeBody::Sequence { solution, .. } => Answer::Sequence(solution.clone()),
            ChallengeBody::Puzzle { solution, .. } => Answer::Puzzle(solution.clone()),
        }
    }

    /// The answer a player would give by not changing anything.
    ///
    /// Used to produce plausible wrong answers.
    pub fn untouched(&self) -> Answer {
        match &self.body {
            ChallengeBody::Classification { categories } => {
                // everything dumped into the first bucket
                let mut buckets = BTreeMap::new();
                if let Some(first) = categories.first() {
                    let all = categories.iter().flat_map(|c| c.items.clone()).collect();
                    buckets.insert(first.name.clone(), all);
                }
                Answer::Classification(buckets)
            }
            ChallengeBody::Sequence {
                options, solution, ..
            } => Answer::Sequence(
                options
                    .iter()
                    .find(|o| *o != solution)
                    .cloned()
                    .unwrap_or_default(),
            ),
            ChallengeBody::Puzzle { current, .. } => Answer::Puzzle(current.clone()),
        }
    }
}

/// Source of challenge instances.
///
/// Implementations must be total: any template at any difficulty yields a
/// valid, winnable instance without blocking.
pub trait ChallengeProvider {
    /// Draw `count` distinct templates, in draw order
    fn select_templates(&self, count: usize, rng: &mut dyn RngCore) -> Vec<TemplateId>;

    /// Derive a fresh variant of a template
    fn generate(
        &self,
        template: TemplateId,
        difficulty: Difficulty,
        rng: &mut dyn RngCore,
    ) -> Challenge;

    /// A challenge not tied to any template
    fn random_fallback(&self, difficulty: Difficulty, rng: &mut dyn RngCore) -> Challenge;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence() -> Challenge {
        Challenge {
            template: Some(TemplateId::Vowels),
            title: "Vowels".into(),
            content: "Which vowel comes next?".into(),
            body: ChallengeBody::Sequence {
                pattern: vec!["A".into(), "E".into(), "?".into()],
                options: vec!["O".into(), "I".into(), "U".into()],
                solution: "I".into(),
            },
        }
    }

    fn classification() -> Challenge {
        Challenge {
            template: Some(TemplateId::FruitsAndAnimals),
            title: "Sort them".into(),
            content: String::new(),
            body: ChallengeBody::Classification {
                categories: vec![
                    Category {
                        name: "Fruits".into(),
                        items: vec!["🍎".into(), "🍌".into()],
                    },
                    Category {
                        name: "Animals".into(),
                        items: vec!["🐶".into(), "🐱".into()],
                    },
                ],
            },
        }
    }

    #[test]
    fn test_sequence_check() {
        let challenge = sequence();
        assert!(challenge.check(&Answer::Sequence("I".into())));
        assert!(!challenge.check(&Answer::Sequence("O".into())));
        assert!(!challenge.check(&Answer::Puzzle(vec!["I".into()])));
    }

    #[test]
    fn test_classification_ignores_order_within_bucket() {
        let challenge = classification();
        let mut buckets = BTreeMap::new();
        buckets.insert("Fruits".to_string(), vec!["🍌".to_string(), "🍎".to_string()]);
        buckets.insert("Animals".to_string(), vec!["🐱".to_string(), "🐶".to_string()]);
        assert!(challenge.check(&Answer::Classification(buckets.clone())));

        buckets.insert("Animals".to_string(), vec!["🐱".to_string()]);
        assert!(!challenge.check(&Answer::Classification(buckets)));
    }

    #[test]
    fn test_puzzle_check_is_order_sensitive() {
        let challenge = Challenge {
            template: None,
            title: "Order".into(),
            content: String::new(),
            body: ChallengeBody::Puzzle {
                current: vec!["B".into(), "A".into()],
                solution: vec!["A".into(), "B".into()],
            },
        };
        assert!(challenge.check(&challenge.solution()));
        assert!(!challenge.check(&challenge.untouched()));
    }

    #[test]
    fn test_solution_and_untouched_answers() {
        for challenge in [sequence(), classification()] {
            assert!(challenge.check(&challenge.solution()));
            assert!(!challenge.check(&challenge.untouched()));
        }
    }

    #[test]
    fn test_answer_json_shape() {
        let json = serde_json::to_value(Answer::Sequence("I".into())).unwrap();
        assert_eq!(json["type"], "sequence");
        assert_eq!(json["value"], "I");

        let body = serde_json::to_value(&sequence().body).unwrap();
        assert_eq!(body["type"], "sequence");
        assert_eq!(body["solution"], "I");
    }

    #[test]
    fn test_template_slugs_are_unique() {
        let mut slugs: Vec<_> = TemplateId::ALL.iter().map(|t| t.slug()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), TemplateId::ALL.len());
    }
}
