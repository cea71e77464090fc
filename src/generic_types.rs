use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Class of a document. `Real` is the positive class for the confusion matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Real,
    Spam,
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Real => "real",
            Self::Spam => "spam",
        };
        write!(f, "{}", name)
    }
}

/// Tokenizer: splits on Unicode whitespace. Case and punctuation are kept verbatim.
pub struct Tokenizer;

impl Tokenizer {
    pub fn tokenize(s: &str) -> impl Iterator<Item = &str> {
        s.split_whitespace()
    }
}
