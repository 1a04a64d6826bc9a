//! Repairs over-splitting by folding short fragments into their predecessor

/// Merge fragments whose trimmed length is below `min_length` characters into
/// the sentence before them.
///
/// A short first fragment has no predecessor, so it seeds the accumulator and
/// later short fragments are folded into it.
pub fn merge(sentences: &[String], min_length: usize) -> Vec<String> {
    let mut merged = Vec::with_capacity(sentences.len());
    let mut pending = String::new();

    for sentence in sentences {
        if sentence.trim().chars().count() < min_length && !pending.is_empty() {
            pending.truncate(pending.trim_end().len());
            pending.push(' ');
            pending.push_str(sentence);
        } else {
            if !pending.is_empty() {
                merged.push(std::mem::take(&mut pending));
            }
            pending = sentence.clone();
        }
    }

    if !pending.is_empty() {
        merged.push(pending);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge(&[], 7).is_empty());
    }

    #[test]
    fn test_merge_short_into_previous() {
        let input = owned(&["A. B. Hello world.", "Hi."]);
        assert_eq!(merge(&input, 7), vec!["A. B. Hello world. Hi."]);
    }

    #[test]
    fn test_merge_short_first_seeds_accumulator() {
        let input = owned(&["A.", "B.", "Hello world.", "Hi."]);
        assert_eq!(merge(&input, 7), vec!["A. B.", "Hello world. Hi."]);
    }

    #[test]
    fn test_merge_trims_accumulator_before_joining() {
        let input = owned(&["The long sentence.   ", "Ok."]);
        assert_eq!(merge(&input, 7), vec!["The long sentence. Ok."]);
    }

    #[test]
    fn test_merge_leaves_long_sentences_alone() {
        let input = owned(&["First long one.", "Second long one.", "Third long one."]);
        assert_eq!(merge(&input, 7), input);
    }

    #[test]
    fn test_merge_never_grows_and_absorbs_every_short_follower() {
        let input = owned(&["Yes.", "No.", "A real sentence here.", "Eh.", "Another real one.", "Hm."]);
        for min_length in 0..12 {
            let output = merge(&input, min_length);
            assert!(output.len() <= input.len());
            for sentence in &output[1..] {
                assert!(sentence.trim().chars().count() >= min_length);
            }
        }
    }
}
