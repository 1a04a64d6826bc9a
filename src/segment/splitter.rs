//! Sentence splitting on terminal punctuation

use regex::Regex;
use std::sync::LazyLock;

const TERMINALS: [char; 6] = ['.', '?', '!', '。', '？', '！'];

/// Longest tail the abbreviation rules ever need to see ("J.r.", "e.g.", "etc.").
const ABBREVIATION_WINDOW: usize = 4;

/// Tails after which a period does not close a sentence: initials ("J.r."),
/// capitalized two-letter abbreviations ("Dr.", "Mr."), single initials ("A."),
/// and a handful of Latin abbreviations.
static ABBREVIATION_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\p{Lu}\.\p{Ll}\.|[A-Z][a-z]\.|\p{Lu}\.|etc\.|e\.g\.|i\.e\.)$")
        .expect("abbreviation pattern is valid")
});

/// Split raw text into candidate sentences.
///
/// Newlines are folded into spaces first, so hard-wrapped paragraphs do not
/// produce spurious breaks. A break happens after a terminal mark followed by
/// whitespace, when what follows looks like the start of a new sentence: an
/// uppercase letter, a digit, or another run of whitespace. Segments that are
/// blank after trimming are dropped; surrounding whitespace is otherwise kept.
pub fn split(text: &str) -> Vec<String> {
    let text = text.replace('\n', " ");
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if !TERMINALS.contains(&c) {
            i += 1;
            continue;
        }

        let ws_start = i + 1;
        let mut ws_end = ws_start;
        while ws_end < chars.len() && chars[ws_end].1.is_whitespace() {
            ws_end += 1;
        }

        let run = ws_end - ws_start;
        let next = chars.get(ws_end).map(|&(_, c)| c);
        let resume = if run > 0 && next.is_some_and(starts_sentence) {
            Some(ws_end)
        } else if run > 1 {
            // Keep one whitespace char so the lookahead sees whitespace.
            Some(ws_end - 1)
        } else {
            None
        };

        let tail_from = chars[i.saturating_sub(ABBREVIATION_WINDOW - 1)].0;
        let tail = &text[tail_from..pos + c.len_utf8()];

        match resume {
            Some(resume) if !ABBREVIATION_TAIL.is_match(tail) => {
                sentences.push(text[start..chars[ws_start].0].to_string());
                start = chars.get(resume).map_or(text.len(), |&(p, _)| p);
                i = resume;
            }
            _ => i += 1,
        }
    }

    sentences.push(text[start..].to_string());
    sentences.retain(|s| !s.trim().is_empty());
    sentences
}

fn starts_sentence(c: char) -> bool {
    c.is_uppercase() || c.is_numeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_title_abbreviations() {
        let sentences = split("Hello world. This is Dr. Smith. Done.");
        assert_eq!(sentences, vec!["Hello world.", "This is Dr. Smith.", "Done."]);
    }

    #[test]
    fn test_split_suppresses_single_initials() {
        let sentences = split("A. B. Hello world. Hi.");
        assert_eq!(sentences, vec!["A. B. Hello world.", "Hi."]);
    }

    #[test]
    fn test_split_keeps_dotted_initials() {
        let sentences = split("J.r. Tolkien wrote. Then more.");
        assert_eq!(sentences, vec!["J.r. Tolkien wrote.", "Then more."]);
    }

    #[test]
    fn test_split_latin_abbreviations() {
        let sentences = split("Bring tools, e.g. Hammers and saws. Also rope, etc. Then leave.");
        assert_eq!(
            sentences,
            vec!["Bring tools, e.g. Hammers and saws.", "Also rope, etc. Then leave."]
        );
    }

    #[test]
    fn test_split_folds_newlines() {
        let sentences = split("The first line\nwraps here. Next one\nstarts.");
        assert_eq!(sentences, vec!["The first line wraps here.", "Next one starts."]);
    }

    #[test]
    fn test_split_requires_sentence_start() {
        assert_eq!(split("See the sign. then go."), vec!["See the sign. then go."]);
        assert_eq!(split("Chapter ends. 2 more remain."), vec!["Chapter ends.", "2 more remain."]);
    }

    #[test]
    fn test_split_on_double_whitespace() {
        let sentences = split("End.  next part");
        assert_eq!(sentences, vec!["End.", " next part"]);
    }

    #[test]
    fn test_split_question_and_full_width_marks() {
        assert_eq!(split("Why? Because! Fine."), vec!["Why?", "Because!", "Fine."]);
        assert_eq!(split("Wow！ Great？ Yes。"), vec!["Wow！", "Great？", "Yes。"]);
    }

    #[test]
    fn test_split_drops_blank_segments() {
        assert!(split("").is_empty());
        assert!(split("   \n  ").is_empty());
        assert_eq!(split("Only one.   "), vec!["Only one."]);
    }
}
