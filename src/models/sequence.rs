// Fixed-length batching of token id sequences
use serde::Deserialize;

/// Which end of a sequence is padded or truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Pre,
    Post,
}

/// Pads or truncates every sequence to exactly `maxlen` ids and returns the
/// batch flattened row-major, ready to be shaped as `(sequences.len(), maxlen)`.
///
/// Padding uses id 0. With `Side::Pre` truncation keeps the last `maxlen` ids,
/// with `Side::Post` it keeps the first ones.
pub fn pad_sequences(sequences: &[Vec<u32>], maxlen: usize, padding: Side, truncating: Side) -> Vec<u32> {
    let mut batch = Vec::with_capacity(sequences.len() * maxlen);
    for sequence in sequences {
        let kept = if sequence.len() > maxlen {
            match truncating {
                Side::Pre => &sequence[sequence.len() - maxlen..],
                Side::Post => &sequence[..maxlen],
            }
        } else {
            &sequence[..]
        };
        let fill = maxlen - kept.len();
        match padding {
            Side::Pre => {
                batch.extend(std::iter::repeat(0).take(fill));
                batch.extend_from_slice(kept);
            }
            Side::Post => {
                batch.extend_from_slice(kept);
                batch.extend(std::iter::repeat(0).take(fill));
            }
        }
    }
    batch
}
