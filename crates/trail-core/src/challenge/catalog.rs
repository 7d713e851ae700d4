//! The built-in pool of twenty challenge templates.
//!
//! Each template scales with difficulty. Sizes follow the age groups:
//! easy (4-5) shows two or three items, medium (5-6) three or four,
//! hard (6+) four or five. A few templates are too abstract for the
//! youngest players and defer to a simpler template on easy.

use super::{Category, Challenge, ChallengeBody, ChallengeProvider, TemplateId};
use crate::config::Difficulty;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

const VOWELS: [&str; 5] = ["A", "E", "I", "O", "U"];
const FRUITS: [&str; 8] = ["🍎", "🍌", "🍇", "🍓", "🍊", "🍑", "🥝", "🍉"];
const ANIMALS: [&str; 8] = ["🐶", "🐱", "🐷", "🐮", "🐰", "🐻", "🐼", "🐨"];
const TRANSPORT: [&str; 6] = ["🚗", "🚲", "✈️", "🚢", "🚂", "🚁"];
const SHAPES: [&str; 6] = ["🔴", "🟦", "🟩", "🟨", "🟧", "🟪"];
const PLANTS: [&str; 5] = ["🌱", "🌿", "🌳", "🌲", "🍃"];

const ALTERNATING_PAIRS: [[&str; 2]; 5] = [
    ["🔴", "🔵"],
    ["🟡", "🟢"],
    ["🍎", "🍌"],
    ["🐶", "🐱"],
    ["1️⃣", "2️⃣"],
];

/// Distractor that never belongs to an alternating pair
const ALTERNATING_DISTRACTOR: &str = "🟠";

const GROWTH_STAGES: [[&str; 4]; 3] = [
    ["🌱", "🌿", "🪴", "🌳"],
    ["🥚", "🐣", "🐥", "🐔"],
    ["⭐", "⭐⭐", "⭐⭐⭐", "⭐⭐⭐⭐"],
];

/// The standard template pool
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl ChallengeProvider for Catalog {
    fn select_templates(&self, count: usize, rng: &mut dyn RngCore) -> Vec<TemplateId> {
        let mut pool = TemplateId::ALL.to_vec();
        pool.shuffle(rng);
        pool.truncate(count);
        pool
    }

    fn generate(
        &self,
        template: TemplateId,
        difficulty: Difficulty,
        rng: &mut dyn RngCore,
    ) -> Challenge {
        let mut challenge = build(template, difficulty, rng);
        challenge.template = Some(template);
        challenge
    }

    fn random_fallback(&self, difficulty: Difficulty, rng: &mut dyn RngCore) -> Challenge {
        let mut challenge = match rng.gen_range(0..3) {
            0 => fallback_classification(difficulty, rng),
            1 => fallback_sequence(difficulty, rng),
            _ => fallback_puzzle(difficulty, rng),
        };
        challenge.template = None;
        challenge
    }
}

fn build(template: TemplateId, difficulty: Difficulty, rng: &mut dyn RngCore) -> Challenge {
    use Difficulty::*;

    match template {
        TemplateId::NumbersAscending => {
            let (start, length) = match difficulty {
                Easy => (rng.gen_range(1..=3), 2),
                Medium => (rng.gen_range(1..=4), 3),
                Hard => (rng.gen_range(1..=5), 4),
            };
            let pattern = (0..length).map(|i| number(start + i)).collect();
            let next = start + length;
            sequence(
                "🎯 Number Sequence",
                "Which number comes next?",
                pattern,
                number(next),
                vec![number(next + 1), number(next - 1)],
                rng,
            )
        }

        TemplateId::NumbersDescending => {
            let (start, length) = match difficulty {
                Easy => (rng.gen_range(4..=5), 2),
                Medium => (rng.gen_range(5..=6), 3),
                Hard => (rng.gen_range(7..=9), 4),
            };
            let pattern = (0..length).map(|i| number(start - i)).collect();
            let next = start - length;
            sequence(
                "🎯 Number Sequence",
                "Which number comes next?",
                pattern,
                number(next),
                vec![number(next - 1), number(next + 1)],
                rng,
            )
        }

        TemplateId::EvenNumbers | TemplateId::OddNumbers => {
            if difficulty == Easy {
                return build(TemplateId::NumbersAscending, difficulty, rng);
            }
            let even = template == TemplateId::EvenNumbers;
            let starts: &[i32] = if even { &[2, 4] } else { &[1, 3] };
            let (start, mut length) = match difficulty {
                Hard => (*starts.choose(rng).unwrap_or(&starts[0]), 3),
                _ => (starts[0], 2),
            };
            if start + length * 2 > 10 {
                length = (10 - start) / 2;
            }
            let pattern = (0..length).map(|i| number(start + i * 2)).collect();
            let next = start + length * 2;
            let title = if even {
                "🎯 Even Numbers"
            } else {
                "🎯 Odd Numbers"
            };
            sequence(
                title,
                "Which number comes next?",
                pattern,
                number(next),
                vec![number(next + 1), number(next - 2)],
                rng,
            )
        }

        TemplateId::Vowels => {
            let length = by_difficulty(difficulty, 2, 3, 4);
            let pattern = VOWELS[..length].iter().map(|v| v.to_string()).collect();
            let next = VOWELS[length];
            let wrong = VOWELS
                .iter()
                .filter(|v| **v != next)
                .take(2)
                .map(|v| v.to_string())
                .collect();
            sequence(
                "🎯 Vowel Sequence",
                "Which vowel comes next?",
                pattern,
                next.to_string(),
                wrong,
                rng,
            )
        }

        TemplateId::Alphabet => {
            let (start, length) = match difficulty {
                Easy => (0, 2),
                Medium => (rng.gen_range(0..=5), 3),
                Hard => (rng.gen_range(0..=10), 4),
            };
            let pattern = (0..length).map(|i| letter(start + i)).collect();
            let next = start + length;
            sequence(
                "🎯 Alphabet Sequence",
                "Which letter comes next?",
                pattern,
                letter(next),
                vec![letter(next + 1), letter(next - 1)],
                rng,
            )
        }

        TemplateId::OrderNumbersAscending => {
            let (count, start) = match difficulty {
                Easy => (3, 1),
                Medium => (4, rng.gen_range(1..=3)),
                Hard => (5, rng.gen_range(1..=5)),
            };
            let items = (0..count).map(|i| number(start + i)).collect();
            puzzle(
                "🎯 Order the Numbers",
                "Drag the numbers from smallest to biggest",
                items,
                rng,
            )
        }

        TemplateId::OrderNumbersDescending => {
            let (count, start) = match difficulty {
                Easy => (3, 5),
                Medium => (4, rng.gen_range(5..=6)),
                Hard => (5, rng.gen_range(7..=9)),
            };
            let items = (0..count).map(|i| number(start - i)).collect();
            puzzle(
                "🎯 Order the Numbers",
                "Drag the numbers from biggest to smallest",
                items,
                rng,
            )
        }

        TemplateId::OrderVowels => {
            let count = by_difficulty(difficulty, 3, 4, 5);
            puzzle(
                "🎯 Order the Vowels",
                "Drag the vowels into order (A, E, I, O, U)",
                first(&VOWELS, count),
                rng,
            )
        }

        TemplateId::OrderLetters => {
            let (count, start) = match difficulty {
                Easy => (3, 0),
                Medium => (4, rng.gen_range(0..=5)),
                Hard => (5, rng.gen_range(0..=15)),
            };
            let items = (0..count).map(|i| letter(start + i)).collect();
            puzzle(
                "🎯 Order the Letters",
                "Drag the letters into alphabetical order",
                items,
                rng,
            )
        }

        TemplateId::OrderFruits => {
            let count = by_difficulty(difficulty, 3, 4, 5);
            puzzle(
                "🎯 Order the Fruits",
                "Drag the fruits back into line",
                first(&FRUITS, count),
                rng,
            )
        }

        TemplateId::OrderAnimals => {
            let count = by_difficulty(difficulty, 3, 4, 5);
            puzzle(
                "🎯 Order the Animals",
                "Drag the animals back into line",
                first(&ANIMALS, count),
                rng,
            )
        }

        TemplateId::OrderPlants => {
            let count = by_difficulty(difficulty, 3, 4, 5);
            puzzle(
                "🎯 Order the Plants",
                "Drag the plants from the smallest to the biggest",
                first(&PLANTS, count),
                rng,
            )
        }

        TemplateId::FruitsAndAnimals => {
            let per = by_difficulty(difficulty, 2, 3, 4);
            classification(&[("Fruits", &FRUITS[..6]), ("Animals", &ANIMALS[..6])], per)
        }

        TemplateId::TransportAndShapes => {
            let per = by_difficulty(difficulty, 2, 3, 4);
            classification(&[("Transport", &TRANSPORT[..]), ("Shapes", &SHAPES[..])], per)
        }

        TemplateId::AnimalsAndTransport => {
            let per = by_difficulty(difficulty, 2, 3, 4);
            classification(&[("Animals", &ANIMALS[..6]), ("Transport", &TRANSPORT[..])], per)
        }

        TemplateId::TripleClassification => {
            if difficulty == Easy {
                return build(TemplateId::FruitsAndAnimals, difficulty, rng);
            }
            let per = by_difficulty(difficulty, 2, 2, 3);
            classification(
                &[
                    ("Fruits", &FRUITS[..4]),
                    ("Animals", &ANIMALS[..4]),
                    ("Transport", &TRANSPORT[..4]),
                ],
                per,
            )
        }

        TemplateId::Alternating => {
            if difficulty == Easy {
                return build(TemplateId::NumbersAscending, difficulty, rng);
            }
            let pair = ALTERNATING_PAIRS[rng.gen_range(0..ALTERNATING_PAIRS.len())];
            let length = by_difficulty(difficulty, 3, 3, 4);
            let pattern = (0..length).map(|i| pair[i % 2].to_string()).collect();
            let next = pair[length % 2];
            let other = pair[(length + 1) % 2];
            sequence(
                "🎯 Alternating Pattern",
                "What comes next in the pattern?",
                pattern,
                next.to_string(),
                vec![other.to_string(), ALTERNATING_DISTRACTOR.to_string()],
                rng,
            )
        }

        TemplateId::Growth => {
            let stages = GROWTH_STAGES[rng.gen_range(0..GROWTH_STAGES.len())];
            let shown = by_difficulty(difficulty, 2, 3, 3);
            let pattern = first(&stages, shown);
            let answer = stages[shown].to_string();
            let wrong = vec![stages[0].to_string(), stages[1].to_string()];
            sequence(
                "🎯 Growing Up",
                "What comes next in the pattern?",
                pattern,
                answer,
                wrong,
                rng,
            )
        }

        TemplateId::IncreasingSum => match difficulty {
            Easy => build(TemplateId::NumbersAscending, difficulty, rng),
            Medium => {
                let start = rng.gen_range(1..=4);
                let pattern = vec![number(start), number(start + 1), number(start + 2)];
                let next = (start + 3).min(10);
                sequence(
                    "🎯 Number Sequence",
                    "Which number comes next?",
                    pattern,
                    number(next),
                    vec![number((next + 1).min(10)), number((next - 1).max(1))],
                    rng,
                )
            }
            Hard => {
                // gaps of +1, +2, +3
                let start = rng.gen_range(1..=3);
                let pattern = vec![number(start), number(start + 1), number(start + 3)];
                let next = (start + 6).min(10);
                sequence(
                    "🎯 Growing Gaps",
                    "Which number comes next?",
                    pattern,
                    number(next),
                    vec![number((next + 1).min(10)), number((next - 1).max(1))],
                    rng,
                )
            }
        },
    }
}

fn fallback_classification(difficulty: Difficulty, rng: &mut dyn RngCore) -> Challenge {
    let pool: [(&str, &[&str]); 5] = [
        ("Fruits", &FRUITS[..6]),
        ("Animals", &ANIMALS[..6]),
        ("Transport", &TRANSPORT[..]),
        ("Shapes", &SHAPES[..]),
        ("Plants", &PLANTS[..]),
    ];
    let (count, per) = match difficulty {
        Difficulty::Easy => (2, 2),
        Difficulty::Medium => (2, 3),
        Difficulty::Hard => (3, 4),
    };
    let chosen: Vec<_> = pool.choose_multiple(rng, count).copied().collect();
    let mut challenge = classification(&chosen, per);
    challenge.title = "🎯 Sorting Challenge".to_string();
    challenge
}

/// Pattern, answer and distractors for the untemplated sequence fallback
type FixedSequence = (&'static [&'static str], &'static str, [&'static str; 2]);

const EASY_SEQUENCES: [FixedSequence; 3] = [
    (&["1️⃣", "2️⃣"], "3️⃣", ["4️⃣", "5️⃣"]),
    (&["🟥", "🟦"], "🟥", ["🟩", "🟨"]),
    (&["⭐", "⭐⭐"], "⭐⭐⭐", ["⭐", "⭐⭐⭐⭐"]),
];

const MEDIUM_SEQUENCES: [FixedSequence; 3] = [
    (&["1️⃣", "2️⃣", "3️⃣"], "4️⃣", ["5️⃣", "6️⃣"]),
    (&["🟥", "🟦", "🟥"], "🟦", ["🟩", "🟨"]),
    (&["⭐", "⭐⭐", "⭐⭐⭐"], "⭐⭐⭐⭐", ["⭐", "⭐⭐"]),
];

const HARD_SEQUENCES: [FixedSequence; 3] = [
    (&["1️⃣", "3️⃣", "5️⃣"], "7️⃣", ["6️⃣", "8️⃣"]),
    (&["🟥", "🟦", "🟥", "🟦"], "🟥", ["🟦", "🟩"]),
    (&["🔴", "🟡", "🔵", "🟡"], "🔴", ["🟡", "🔵"]),
];

fn fallback_sequence(difficulty: Difficulty, rng: &mut dyn RngCore) -> Challenge {
    let table = match difficulty {
        Difficulty::Easy => &EASY_SEQUENCES,
        Difficulty::Medium => &MEDIUM_SEQUENCES,
        Difficulty::Hard => &HARD_SEQUENCES,
    };
    let (pattern, answer, wrong) = table[rng.gen_range(0..table.len())];
    sequence(
        "🎯 Sequence Challenge",
        "What comes next?",
        pattern.iter().map(|s| s.to_string()).collect(),
        answer.to_string(),
        wrong.iter().map(|s| s.to_string()).collect(),
        rng,
    )
}

fn fallback_puzzle(difficulty: Difficulty, rng: &mut dyn RngCore) -> Challenge {
    let count = by_difficulty(difficulty, 3, 4, 5);
    let sources: [&[&str]; 4] = [&VOWELS, &FRUITS, &ANIMALS, &PLANTS];
    let source = sources[rng.gen_range(0..sources.len())];
    puzzle(
        "🎯 Ordering Challenge",
        "Drag the pieces into the right order",
        first(source, count),
        rng,
    )
}

fn by_difficulty(difficulty: Difficulty, easy: usize, medium: usize, hard: usize) -> usize {
    match difficulty {
        Difficulty::Easy => easy,
        Difficulty::Medium => medium,
        Difficulty::Hard => hard,
    }
}

/// Keycap emoji for 1..=10, clamped
fn number(n: i32) -> String {
    const KEYCAPS: [&str; 10] = [
        "1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟",
    ];
    KEYCAPS[(n.clamp(1, 10) - 1) as usize].to_string()
}

/// Uppercase letter at `offset` from 'A', clamped to the alphabet
fn letter(offset: i32) -> String {
    let offset = offset.clamp(0, 25) as u8;
    char::from(b'A' + offset).to_string()
}

fn first(items: &[&str], count: usize) -> Vec<String> {
    items.iter().take(count).map(|s| s.to_string()).collect()
}

fn sequence(
    title: &str,
    content: &str,
    mut pattern: Vec<String>,
    solution: String,
    wrong: Vec<String>,
    rng: &mut dyn RngCore,
) -> Challenge {
    let mut options = vec![solution.clone()];
    for option in wrong {
        if !options.contains(&option) {
            options.push(option);
        }
    }
    options.shuffle(rng);
    pattern.push("?".to_string());

    Challenge {
        template: None,
        title: title.to_string(),
        content: content.to_string(),
        body: ChallengeBody::Sequence {
            pattern,
            options,
            solution,
        },
    }
}

fn puzzle(title: &str, content: &str, solution: Vec<String>, rng: &mut dyn RngCore) -> Challenge {
    let mut current = solution.clone();
    current.shuffle(rng);
    if current == solution && current.len() > 1 {
        // never hand out an already solved puzzle
        current.rotate_left(1);
    }

    Challenge {
        template: None,
        title: title.to_string(),
        content: content.to_string(),
        body: ChallengeBody::Puzzle { current, solution },
    }
}

fn classification(sources: &[(&str, &[&str])], per_category: usize) -> Challenge {
    let categories = sources
        .iter()
        .map(|(name, items)| Category {
            name: name.to_string(),
            items: first(items, per_category),
        })
        .collect();

    Challenge {
        template: None,
        title: "🎯 Sorting".to_string(),
        content: "Put each item in its group".to_string(),
        body: ChallengeBody::Classification { categories },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengeKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_every_template_is_winnable() {
        let mut rng = StdRng::seed_from_u64(7);
        for template in TemplateId::ALL {
            for difficulty in Difficulty::ALL {
                for _ in 0..20 {
                    let challenge = Catalog.generate(template, difficulty, &mut rng);
                    assert_eq!(challenge.template, Some(template));
                    assert!(
                        challenge.check(&challenge.solution()),
                        "{:?} at {:?} is not solvable",
                        template,
                        difficulty
                    );
                    assert!(!challenge.check(&challenge.untouched()));
                }
            }
        }
    }

    #[test]
    fn test_sequence_options_contain_solution_once() {
        let mut rng = StdRng::seed_from_u64(11);
        for template in TemplateId::ALL {
            for difficulty in Difficulty::ALL {
                let challenge = Catalog.generate(template, difficulty, &mut rng);
                if let ChallengeBody::Sequence {
                    options,
                    solution,
                    pattern,
                } = &challenge.body
                {
                    assert_eq!(options.iter().filter(|o| *o == solution).count(), 1);
                    assert!(options.len() >= 2);
                    assert_eq!(pattern.last().map(String::as_str), Some("?"));
                }
            }
        }
    }

    #[test]
    fn test_difficulty_scales_size() {
        let mut rng = StdRng::seed_from_u64(3);
        let size = |difficulty, rng: &mut StdRng| match Catalog
            .generate(TemplateId::OrderVowels, difficulty, rng)
            .body
        {
            ChallengeBody::Puzzle { solution, .. } => solution.len(),
            _ => 0,
        };
        assert_eq!(size(Difficulty::Easy, &mut rng), 3);
        assert_eq!(size(Difficulty::Medium, &mut rng), 4);
        assert_eq!(size(Difficulty::Hard, &mut rng), 5);
    }

    #[test]
    fn test_easy_defers_abstract_templates() {
        let mut rng = StdRng::seed_from_u64(5);
        let triple = Catalog.generate(TemplateId::TripleClassification, Difficulty::Easy, &mut rng);
        match triple.body {
            ChallengeBody::Classification { categories } => assert_eq!(categories.len(), 2),
            other => panic!("expected classification, got {:?}", other),
        }

        let hard = Catalog.generate(TemplateId::TripleClassification, Difficulty::Hard, &mut rng);
        match hard.body {
            ChallengeBody::Classification { categories } => {
                assert_eq!(categories.len(), 3);
                assert!(categories.iter().all(|c| c.items.len() == 3));
            }
            other => panic!("expected classification, got {:?}", other),
        }
    }

    #[test]
    fn test_select_templates_distinct() {
        let mut rng = StdRng::seed_from_u64(99);
        let picked = Catalog.select_templates(5, &mut rng);
        assert_eq!(picked.len(), 5);
        assert_eq!(picked.iter().collect::<HashSet<_>>().len(), 5);

        let all = Catalog.select_templates(50, &mut rng);
        assert_eq!(all.len(), TemplateId::ALL.len());
    }

    #[test]
    fn test_fallback_has_no_template() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut kinds = HashSet::new();
        for _ in 0..60 {
            let challenge = Catalog.random_fallback(Difficulty::Medium, &mut rng);
            assert_eq!(challenge.template, None);
            assert!(challenge.check(&challenge.solution()));
            kinds.insert(challenge.kind());
        }
        assert!(kinds.contains(&ChallengeKind::Puzzle));
        assert!(kinds.contains(&ChallengeKind::Sequence));
        assert!(kinds.contains(&ChallengeKind::Classification));
    }

    #[test]
    fn test_number_keycaps_clamp() {
        assert_eq!(number(0), "1️⃣");
        assert_eq!(number(10), "🔟");
        assert_eq!(number(12), "🔟");
        assert_eq!(letter(2), "C");
    }
}
