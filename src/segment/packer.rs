//! Greedy packing of sentences into size-bounded translation batches

use serde::Serialize;

/// Separator placed between sentences of a batch payload.
pub const SEPARATOR: char = '\n';

/// An ordered run of sentences sent to the endpoint as one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    /// Position of this batch in submission order
    pub index: usize,
    pub sentences: Vec<String>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Packed length: every sentence plus one separator char.
    pub fn packed_len(&self) -> usize {
        self.sentences.iter().map(|s| packed_len(s)).sum()
    }

    /// Request payload: sentences joined by the separator.
    pub fn payload(&self) -> String {
        let mut payload = String::with_capacity(self.packed_len());
        for (i, sentence) in self.sentences.iter().enumerate() {
            if i > 0 {
                payload.push(SEPARATOR);
            }
            payload.push_str(sentence);
        }
        payload
    }
}

fn packed_len(sentence: &str) -> usize {
    sentence.chars().count() + 1
}

/// Pack sentences into batches of at most `max_chars` packed characters.
///
/// A sentence that alone exceeds the budget still gets a batch of its own.
pub fn pack(sentences: Vec<String>, max_chars: usize) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;

    for sentence in sentences {
        let len = packed_len(&sentence);
        if !current.is_empty() && current_len + len > max_chars {
            batches.push(Batch {
                index: batches.len(),
                sentences: std::mem::take(&mut current),
            });
            current_len = 0;
        }
        current.push(sentence);
        current_len += len;
    }

    if !current.is_empty() {
        batches.push(Batch {
            index: batches.len(),
            sentences: current,
        });
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(lengths: &[usize]) -> Vec<String> {
        lengths
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let c = char::from(b'a' + (i % 26) as u8);
                std::iter::repeat_n(c, n).collect()
            })
            .collect()
    }

    #[test]
    fn test_pack_empty() {
        assert!(pack(Vec::new(), 600).is_empty());
    }

    #[test]
    fn test_pack_counts_separators() {
        // 4 + 1 and 4 + 1 fill a budget of 10 exactly
        let batches = pack(sentences(&[4, 4, 4]), 10);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[0].packed_len(), 10);
        assert_eq!(batches[1].len(), 1);
    }

    #[test]
    fn test_pack_oversized_sentence_gets_own_batch() {
        let batches = pack(sentences(&[3, 50, 3]), 10);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[1].len(), 1);
        assert_eq!(batches[1].sentences[0].len(), 50);
    }

    #[test]
    fn test_pack_indices_follow_order() {
        let batches = pack(sentences(&[5, 5, 5, 5, 5]), 12);
        let indices: Vec<usize> = batches.iter().map(|b| b.index).collect();
        assert_eq!(indices, (0..batches.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_pack_partitions_input_within_budget() {
        let input = sentences(&[12, 1, 40, 7, 7, 7, 90, 2, 33, 18, 5, 61, 4, 4]);
        for max_chars in [1, 5, 10, 20, 41, 64, 100, 600] {
            let batches = pack(input.clone(), max_chars);
            let rebuilt: Vec<String> = batches
                .iter()
                .flat_map(|b| b.sentences.iter().cloned())
                .collect();
            assert_eq!(rebuilt, input, "budget {}", max_chars);

            for batch in &batches {
                assert!(!batch.is_empty());
                assert!(
                    batch.packed_len() <= max_chars || batch.len() == 1,
                    "batch {} over budget {}",
                    batch.index,
                    max_chars
                );
            }
        }
    }

    #[test]
    fn test_payload_joins_with_newlines() {
        let batch = Batch {
            index: 0,
            sentences: vec!["One.".to_string(), "Two.".to_string()],
        };
        assert_eq!(batch.payload(), "One.\nTwo.");
    }
}
