use std::{collections::HashMap, ops::Deref};

use crate::error::{Error, Result};

/// Split a text into lowercase word tokens
///
/// Punctuation and digits become tokens of their own, so `"kitchen."` yields `["kitchen", "."]`.
pub fn extract_words(text: &str) -> Vec<String> {
    let mut spaced = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if ch.is_ascii_punctuation() || ch.is_ascii_digit() {
            spaced.push(' ');
            spaced.push(ch);
            spaced.push(' ');
        } else {
            spaced.extend(ch.to_lowercase());
        }
    }
    spaced.split_whitespace().map(String::from).collect()
}

/// A fixed bag-of-words dictionary
///
/// Words are indexed in order of first occurrence in the corpus. Once built the mapping never
/// changes, and its size is the dimension of every [`FeatureVector`] it produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from every token in `corpus`
    ///
    /// **Errors** with [`Error::EmptyVocabulary`] if the corpus contains no tokens
    pub fn build<I, S>(corpus: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self::default();
        for text in corpus {
            for word in extract_words(text.as_ref()) {
                if !vocab.index.contains_key(&word) {
                    vocab.index.insert(word.clone(), vocab.words.len());
                    vocab.words.push(word);
                }
            }
        }

        if vocab.words.is_empty() {
            return Err(Error::EmptyVocabulary);
        }
        log::debug!("built vocabulary of {} words", vocab.words.len());
        Ok(vocab)
    }

    /// Number of words, the state dimension
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Encode a text as a binary bag-of-words vector
    ///
    /// Words missing from the vocabulary are ignored.
    pub fn encode(&self, text: &str) -> FeatureVector {
        let mut features = vec![0.0; self.len()];
        for word in extract_words(text) {
            if let Some(&i) = self.index.get(&word) {
                features[i] = 1.0;
            }
        }
        FeatureVector(features)
    }
}

/// A state representation produced by [`Vocabulary::encode`]
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Dot product with a weight row of the same length
    ///
    /// **Panics** on a length mismatch
    pub fn dot(&self, weights: &[f32]) -> f32 {
        assert_eq!(
            self.0.len(),
            weights.len(),
            "Feature vector and weight row dimensions differ."
        );
        self.0.iter().zip(weights).map(|(x, w)| x * w).sum()
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

impl Deref for FeatureVector {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;

    use super::*;

    static VOCAB: Lazy<Vocabulary> = Lazy::new(|| {
        Vocabulary::build([
            "You are in the kitchen.",
            "You are hungry. Go north!",
        ])
        .unwrap()
    });

    #[test]
    fn extract_words_splits_punctuation() {
        assert_eq!(
            extract_words("The TV is on.You are bored, 2 times"),
            ["the", "tv", "is", "on", ".", "you", "are", "bored", ",", "2", "times"]
        );
        assert!(extract_words("   ").is_empty());
    }

    #[test]
    fn vocabulary_first_occurrence_order() {
        assert_eq!(
            VOCAB.words(),
            ["you", "are", "in", "the", "kitchen", ".", "hungry", "go", "north", "!"]
        );
        assert_eq!(VOCAB.index_of("kitchen"), Some(4));
        assert_eq!(VOCAB.index_of("garden"), None);
    }

    #[test]
    fn encode_is_binary_and_deterministic() {
        let a = VOCAB.encode("go go north north");
        let b = VOCAB.encode("go go north north");
        assert_eq!(a, b);
        assert_eq!(a.len(), VOCAB.len());
        assert_eq!(
            a.as_slice(),
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0]
        );
    }

    #[test]
    fn unknown_words_ignored() {
        let with_unknown = VOCAB.encode("go to the garden");
        let without = VOCAB.encode("go the");
        assert_eq!(with_unknown, without);
        assert!(VOCAB.encode("bicycle").iter().all(|&x| x == 0.0));
    }

    #[test]
    fn empty_corpus_rejected() {
        assert!(matches!(
            Vocabulary::build(Vec::<String>::new()),
            Err(Error::EmptyVocabulary)
        ));
        assert!(matches!(
            Vocabulary::build([" ", ""]),
            Err(Error::EmptyVocabulary)
        ));
    }

    #[test]
    fn dot_product() {
        let x = FeatureVector::from(vec![1.0, 0.0, 1.0]);
        assert_eq!(x.dot(&[0.5, 2.0, 0.25]), 0.75);
    }

    #[test]
    #[should_panic(expected = "dimensions differ")]
    fn dot_dimension_mismatch_panics() {
        FeatureVector::from(vec![1.0, 0.0]).dot(&[1.0]);
    }
}
