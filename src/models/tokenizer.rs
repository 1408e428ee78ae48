// Text to token id conversion
use std::collections::HashMap;
use std::path::Path;

use log::warn;
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::error::{LoadError, PredictError};

const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Tokenizer loaded from `tokenizer.json`. Either a word-index export written
/// at training time or a Hugging Face tokenizer file.
pub enum TextTokenizer {
    WordIndex(WordIndexTokenizer),
    HuggingFace(Tokenizer),
}

impl TextTokenizer {
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if value.get("class_name").and_then(|c| c.as_str()) == Some("Tokenizer") {
            let export: WordIndexExport = serde_json::from_value(value)?;
            return Ok(Self::WordIndex(WordIndexTokenizer::try_from(export.config)?));
        }
        let tokenizer =
            Tokenizer::from_bytes(bytes).map_err(|e| LoadError::Tokenizer(e.to_string()))?;
        Ok(Self::HuggingFace(tokenizer))
    }

    /// Number of distinct ids this tokenizer can emit, padding id included.
    pub fn vocab_size(&self) -> usize {
        match self {
            Self::WordIndex(tokenizer) => tokenizer.vocab_size(),
            Self::HuggingFace(tokenizer) => tokenizer
                .get_vocab(true)
                .values()
                .max()
                .map_or(0, |&id| id as usize + 1),
        }
    }

    pub fn texts_to_sequences<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>, PredictError> {
        match self {
            Self::WordIndex(tokenizer) => Ok(texts
                .iter()
                .map(|text| tokenizer.text_to_sequence(text.as_ref()))
                .collect()),
            Self::HuggingFace(tokenizer) => {
                let inputs: Vec<&str> = texts.iter().map(|text| text.as_ref()).collect();
                let encodings = tokenizer
                    .encode_batch(inputs, false)
                    .map_err(|e| PredictError::Tokenizer(e.to_string()))?;
                Ok(encodings
                    .iter()
                    .map(|encoding| encoding.get_ids().to_vec())
                    .collect())
            }
        }
    }
}

#[derive(Deserialize)]
struct WordIndexExport {
    config: WordIndexConfig,
}

#[derive(Deserialize)]
struct WordIndexConfig {
    #[serde(default)]
    num_words: Option<usize>,
    #[serde(default)]
    filters: Option<String>,
    #[serde(default = "default_lower")]
    lower: bool,
    #[serde(default)]
    split: Option<String>,
    #[serde(default)]
    char_level: bool,
    #[serde(default)]
    oov_token: Option<String>,
    word_index: WordIndexField,
}

fn default_lower() -> bool {
    true
}

// Training-time exports store the index as a JSON document inside a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum WordIndexField {
    Map(HashMap<String, u32>),
    Encoded(String),
}

/// Word (or character) level tokenizer backed by a frozen `word -> id` table.
#[derive(Debug)]
pub struct WordIndexTokenizer {
    word_index: HashMap<String, u32>,
    num_words: Option<usize>,
    filters: String,
    lower: bool,
    split: String,
    char_level: bool,
    oov_id: Option<u32>,
}

impl TryFrom<WordIndexConfig> for WordIndexTokenizer {
    type Error = LoadError;

    fn try_from(config: WordIndexConfig) -> Result<Self, LoadError> {
        let word_index = match config.word_index {
            WordIndexField::Map(map) => map,
            WordIndexField::Encoded(encoded) => serde_json::from_str(&encoded)?,
        };
        let split = config.split.unwrap_or_else(|| " ".to_string());
        if split.is_empty() && !config.char_level {
            return Err(LoadError::Tokenizer("split separator is empty".to_string()));
        }
        // An oov token absent from the index behaves as if none was configured.
        let oov_id = config.oov_token.as_ref().and_then(|token| {
            let id = word_index.get(token).copied();
            if id.is_none() {
                warn!("oov token {token:?} missing from word index, unknown words will be dropped");
            }
            id
        });
        Ok(Self {
            word_index,
            num_words: config.num_words.filter(|&n| n > 0),
            filters: config.filters.unwrap_or_else(|| DEFAULT_FILTERS.to_string()),
            lower: config.lower,
            split,
            char_level: config.char_level,
            oov_id,
        })
    }
}

impl WordIndexTokenizer {
    pub fn vocab_size(&self) -> usize {
        let largest = self.word_index.values().copied().max().unwrap_or(0) as usize + 1;
        match self.num_words {
            Some(n) => n.min(largest),
            None => largest,
        }
    }

    pub fn text_to_sequence(&self, text: &str) -> Vec<u32> {
        self.tokens(text)
            .iter()
            .filter_map(|token| match self.word_index.get(token.as_str()) {
                Some(&id) if self.num_words.is_some_and(|n| id as usize >= n) => self.oov_id,
                Some(&id) => Some(id),
                None => self.oov_id,
            })
            .collect()
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let text = if self.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        if self.char_level {
            return text.chars().map(String::from).collect();
        }
        let mut cleaned = String::with_capacity(text.len());
        for c in text.chars() {
            if self.filters.contains(c) {
                cleaned.push_str(&self.split);
            } else {
                cleaned.push(c);
            }
        }
        cleaned
            .split(self.split.as_str())
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn word_index_tokenizer(config: serde_json::Value) -> WordIndexTokenizer {
        let bytes = serde_json::to_vec(&json!({ "class_name": "Tokenizer", "config": config })).unwrap();
        match TextTokenizer::from_bytes(&bytes).unwrap() {
            TextTokenizer::WordIndex(tokenizer) => tokenizer,
            TextTokenizer::HuggingFace(_) => panic!("expected a word index tokenizer"),
        }
    }

    #[test]
    fn lowercases_strips_punctuation_and_drops_unknown_words() {
        let tokenizer = word_index_tokenizer(json!({
            "word_index": { "hello": 1, "world": 2 }
        }));
        assert_eq!(tokenizer.text_to_sequence("Hello, WORLD! again"), vec![1, 2]);
    }

    #[test]
    fn encoded_word_index_is_accepted() {
        let tokenizer = word_index_tokenizer(json!({
            "num_words": null,
            "oov_token": "<OOV>",
            "word_index": "{\"<OOV>\": 1, \"good\": 2, \"movie\": 3}"
        }));
        assert_eq!(tokenizer.text_to_sequence("good unknown movie"), vec![2, 1, 3]);
        assert_eq!(tokenizer.vocab_size(), 4);
    }

    #[test]
    fn ids_beyond_num_words_map_to_oov_or_vanish() {
        let with_oov = word_index_tokenizer(json!({
            "num_words": 3,
            "oov_token": "<OOV>",
            "word_index": { "<OOV>": 1, "a": 2, "b": 3, "c": 4 }
        }));
        assert_eq!(with_oov.text_to_sequence("a b c"), vec![2, 1, 1]);
        assert_eq!(with_oov.vocab_size(), 3);

        let without_oov = word_index_tokenizer(json!({
            "num_words": 3,
            "word_index": { "a": 1, "b": 2, "c": 3 }
        }));
        assert_eq!(without_oov.text_to_sequence("a b c"), vec![1, 2]);
    }

    #[test]
    fn char_level_splits_every_character() {
        let tokenizer = word_index_tokenizer(json!({
            "char_level": true,
            "word_index": { "a": 1, "b": 2 }
        }));
        assert_eq!(tokenizer.text_to_sequence("AbA!"), vec![1, 2, 1]);
    }

    #[test]
    fn custom_split_and_case_preserved() {
        let tokenizer = word_index_tokenizer(json!({
            "lower": false,
            "split": "|",
            "filters": "",
            "word_index": { "Rust": 1, "rust": 2 }
        }));
        assert_eq!(tokenizer.text_to_sequence("Rust||rust|RUST"), vec![1, 2]);
    }

    #[test]
    fn empty_text_is_an_empty_sequence() {
        let tokenizer = word_index_tokenizer(json!({ "word_index": { "a": 1 } }));
        assert!(tokenizer.text_to_sequence("").is_empty());
        assert!(tokenizer.text_to_sequence("?!").is_empty());
    }

    #[test]
    fn missing_oov_token_drops_unknown_words() {
        let tokenizer = word_index_tokenizer(json!({
            "oov_token": "<OOV>",
            "word_index": { "a": 1, "b": 2 }
        }));
        assert_eq!(tokenizer.text_to_sequence("a zzz b"), vec![1, 2]);
    }

    #[test]
    fn hugging_face_word_level_file() {
        let file = json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": { "[UNK]": 1, "hello": 2, "world": 3 },
                "unk_token": "[UNK]"
            }
        });
        let tokenizer = TextTokenizer::from_bytes(&serde_json::to_vec(&file).unwrap()).unwrap();
        assert!(matches!(tokenizer, TextTokenizer::HuggingFace(_)));

        let sequences = tokenizer.texts_to_sequences(&["hello world nope", ""]).unwrap();
        assert_eq!(sequences, vec![vec![2, 3, 1], vec![]]);
        assert_eq!(tokenizer.vocab_size(), 4);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(TextTokenizer::from_bytes(b"\x80not json").is_err());
        assert!(TextTokenizer::from_bytes(b"{\"something\": \"else\"}").is_err());
    }
}
