use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

/// A source of human-readable document bodies.
///
/// The pipeline never inspects the text beyond signing it, so any generator
/// will do. Closures returning a `String` implement this trait too.
pub trait TextGenerator: Send + 'static {
    fn next_sentence(&mut self) -> String;
}

impl<F> TextGenerator for F
where
    F: FnMut() -> String + Send + 'static,
{
    fn next_sentence(&mut self) -> String {
        self()
    }
}

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in",
    "reprehenderit", "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur",
    "excepteur", "sint", "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui",
    "officia", "deserunt", "mollit", "anim", "id", "est", "laborum",
];

/// Generates capitalized, period-terminated lorem-ipsum sentences with a
/// fixed word count.
pub struct LoremGenerator {
    rng: StdRng,
    words_per_sentence: usize,
}

impl LoremGenerator {
    /// Creates a generator seeded from the thread-local RNG.
    pub fn new(words_per_sentence: usize) -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
            words_per_sentence: words_per_sentence.max(1),
        }
    }

    /// Creates a generator with a reproducible sequence of sentences.
    pub fn seeded(seed: u64, words_per_sentence: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            words_per_sentence: words_per_sentence.max(1),
        }
    }
}

impl TextGenerator for LoremGenerator {
    fn next_sentence(&mut self) -> String {
        let mut sentence = String::with_capacity(self.words_per_sentence * 8);
        for i in 0..self.words_per_sentence {
            let word = WORDS.choose(&mut self.rng).copied().unwrap_or("lorem");
            if i == 0 {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    sentence.extend(first.to_uppercase());
                    sentence.push_str(chars.as_str());
                }
            } else {
                sentence.push(' ');
                sentence.push_str(word);
            }
        }
        // Occasional comma, as in prose.
        let comma = self.words_per_sentence > 4 && self.rng.random_bool(0.25);
        if let Some(pos) = sentence.find(' ').filter(|_| comma) {
            sentence.insert(pos, ',');
        }
        sentence.push('.');
        sentence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentences_have_the_requested_shape() {
        let mut generator = LoremGenerator::seeded(42, 9);
        for _ in 0..100 {
            let sentence = generator.next_sentence();
            assert_eq!(sentence.split(' ').count(), 9, "{sentence}");
            assert!(sentence.ends_with('.'));
            assert!(sentence.chars().next().unwrap().is_uppercase());
        }
    }

    #[test]
    fn seeded_generators_repeat() {
        let mut a = LoremGenerator::seeded(3, 5);
        let mut b = LoremGenerator::seeded(3, 5);
        for _ in 0..10 {
            assert_eq!(a.next_sentence(), b.next_sentence());
        }
    }

    #[test]
    fn closures_are_generators() {
        let mut n = 0;
        let mut generator = move || {
            n += 1;
            format!("memo {n}")
        };
        assert_eq!(TextGenerator::next_sentence(&mut generator), "memo 1");
        assert_eq!(TextGenerator::next_sentence(&mut generator), "memo 2");
    }
}
