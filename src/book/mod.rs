//! Bilingual book assembled from delivered batches

pub mod epub;

use crate::languages;
use crate::pipeline::TranslatedBatch;
use crate::utils::escape_xml;

const BOOK_STYLE: &str = "\
body { font-family: serif; padding: 20px; }
.paragraph { display: flex; justify-content: space-between; gap: 10px; margin-bottom: 10px; }
.paragraph > div { flex: 1; }
.rtl { direction: rtl; text-align: right; }";

/// One source sentence with a cell per target language.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRow {
    pub source: String,
    pub translations: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub source_language: String,
    pub target_languages: Vec<String>,
    placeholder: String,
    rows: Vec<BookRow>,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        target_languages: Vec<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            source_language: String::new(),
            target_languages,
            placeholder: placeholder.into(),
            rows: Vec::new(),
        }
    }

    pub fn set_source_language(&mut self, code: &str) {
        self.source_language = code.to_string();
    }

    /// Append one row per sentence of `batch`.
    pub fn push_batch(&mut self, batch: &TranslatedBatch) {
        for (i, sentence) in batch.sentences.iter().enumerate() {
            let translations = self
                .target_languages
                .iter()
                .map(|lang| batch.cell(lang, i, &self.placeholder).to_string())
                .collect();
            self.rows.push(BookRow {
                source: sentence.trim().to_string(),
                translations,
            });
        }
    }

    pub fn rows(&self) -> &[BookRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// XHTML fragment with one `.paragraph` row per sentence.
    pub fn render_body(&self) -> String {
        let mut out = String::new();
        for row in self.rows() {
            out.push_str("<div class=\"paragraph\">\n");
            out.push_str(&cell("source", &self.source_language, &row.source));
            for (lang, text) in self.target_languages.iter().zip(&row.translations) {
                out.push_str(&cell("lang-column", lang, text));
            }
            out.push_str("</div>\n");
        }
        out
    }

    /// Standalone HTML book view.
    pub fn render_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"UTF-8\"/>\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"/>\n\
             <title>{title}</title>\n<style>\n{style}\n</style>\n</head>\n<body>\n\
             <h1>{title}</h1>\n<hr/>\n{body}</body>\n</html>\n",
            lang = escape_xml(&self.source_language),
            title = escape_xml(&self.title),
            style = BOOK_STYLE,
            body = self.render_body(),
        )
    }

    /// Source sentence followed by one indented line per target language.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for row in self.rows() {
            out.push_str(&row.source);
            out.push('\n');
            for (lang, text) in self.target_languages.iter().zip(&row.translations) {
                out.push_str(&format!("    [{}] {}\n", lang, text.trim()));
            }
            out.push('\n');
        }
        out
    }
}

fn cell(class: &str, lang: &str, text: &str) -> String {
    if languages::is_rtl(lang) {
        format!(
            "  <div class=\"{} rtl\" lang=\"{}\" dir=\"rtl\">{}</div>\n",
            class,
            escape_xml(lang),
            escape_xml(text.trim())
        )
    } else {
        format!(
            "  <div class=\"{}\" lang=\"{}\">{}</div>\n",
            class,
            escape_xml(lang),
            escape_xml(text.trim())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::LanguageColumn;

    fn translated(sentences: &[&str], columns: Vec<(&str, Vec<&str>)>) -> TranslatedBatch {
        TranslatedBatch {
            index: 0,
            sentences: sentences.iter().map(|s| s.to_string()).collect(),
            columns: columns
                .into_iter()
                .map(|(lang, lines)| LanguageColumn {
                    language: lang.to_string(),
                    lines: lines.iter().map(|s| s.to_string()).collect(),
                    failed: false,
                    retried: false,
                })
                .collect(),
        }
    }

    fn book(targets: &[&str]) -> Book {
        let mut book = Book::new(
            "Bilingual Book",
            "Tester",
            targets.iter().map(|t| t.to_string()).collect(),
            "Translation Error",
        );
        book.set_source_language("en");
        book
    }

    #[test]
    fn test_push_batch_aligns_by_index() {
        let mut book = book(&["fr", "ar"]);
        book.push_batch(&translated(
            &["Hello there.", " Good night."],
            vec![("fr", vec!["Bonjour.", "Bonne nuit."]), ("ar", vec!["مرحبا."])],
        ));

        assert_eq!(book.rows().len(), 2);
        assert_eq!(book.rows()[1].source, "Good night.");
        assert_eq!(book.rows()[1].translations, vec!["Bonne nuit.", "Translation Error"]);
    }

    #[test]
    fn test_render_body_marks_rtl_and_escapes() {
        let mut book = book(&["fr", "he"]);
        book.push_batch(&translated(
            &["Tom & Jerry <3"],
            vec![("fr", vec!["Tom et Jerry"]), ("he", vec!["טום וג'רי"])],
        ));

        let body = book.render_body();
        assert!(body.contains("<div class=\"source\" lang=\"en\">Tom &amp; Jerry &lt;3</div>"));
        assert!(body.contains("class=\"lang-column rtl\" lang=\"he\" dir=\"rtl\""));
        assert!(!body.contains("class=\"lang-column rtl\" lang=\"fr\""));
    }

    #[test]
    fn test_render_text() {
        let mut book = book(&["de"]);
        book.push_batch(&translated(&["Good morning."], vec![("de", vec!["Guten Morgen."])]));
        assert_eq!(book.render_text(), "Good morning.\n    [de] Guten Morgen.\n\n");
    }

    #[test]
    fn test_render_html_is_complete_document() {
        let book = book(&["de"]);
        let html = book.render_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Bilingual Book</title>"));
        assert!(book.is_empty());
    }
}
