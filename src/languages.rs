//! Language codes understood by the translation endpoint

use anyhow::Result;
use colored::Colorize;

/// Source-language value asking the endpoint to detect the language.
pub const AUTO_DETECT: &str = "auto";

/// Shown first in language listings
pub const PRIORITIZED: &[&str] = &["en", "ru", "zh", "hi", "es", "fr", "ar", "pt", "de"];

/// Written right to left
pub const RTL: &[&str] = &["ar", "he", "fa", "ur", "ks", "ps", "ug", "ckb", "pa", "sd"];

pub const LANGUAGES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("am", "Amharic"),
    ("ar", "Arabic"),
    ("az", "Azerbaijani"),
    ("be", "Belarusian"),
    ("bg", "Bulgarian"),
    ("bn", "Bengali"),
    ("bs", "Bosnian"),
    ("ca", "Catalan"),
    ("ckb", "Kurdish (Sorani)"),
    ("cs", "Czech"),
    ("cy", "Welsh"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("eo", "Esperanto"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("eu", "Basque"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("ga", "Irish"),
    ("gl", "Galician"),
    ("gu", "Gujarati"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("hy", "Armenian"),
    ("id", "Indonesian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ka", "Georgian"),
    ("kk", "Kazakh"),
    ("km", "Khmer"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("ks", "Kashmiri"),
    ("la", "Latin"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("mk", "Macedonian"),
    ("ml", "Malayalam"),
    ("mn", "Mongolian"),
    ("mr", "Marathi"),
    ("ms", "Malay"),
    ("my", "Myanmar (Burmese)"),
    ("ne", "Nepali"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pa", "Punjabi"),
    ("pl", "Polish"),
    ("ps", "Pashto"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sd", "Sindhi"),
    ("si", "Sinhala"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sq", "Albanian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("th", "Thai"),
    ("tl", "Filipino"),
    ("tr", "Turkish"),
    ("ug", "Uyghur"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("uz", "Uzbek"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
    ("zh-CN", "Chinese (Simplified)"),
    ("zh-TW", "Chinese (Traditional)"),
];

/// Map common spellings ("chinese", "zh_tw", "JP") onto endpoint codes.
pub fn normalize(lang: &str) -> String {
    let lang = lang.trim();
    match lang.to_lowercase().replace('_', "-").as_str() {
        "auto" | "detect" => AUTO_DETECT.to_string(),
        "chinese" | "zh-cn" | "chs" | "zh-hans" => "zh-CN".to_string(),
        "zh-tw" | "cht" | "zh-hant" => "zh-TW".to_string(),
        "japanese" | "ja" | "jp" => "ja".to_string(),
        "korean" | "ko" | "kr" => "ko".to_string(),
        "english" | "en" => "en".to_string(),
        "french" | "fr" => "fr".to_string(),
        "german" | "de" => "de".to_string(),
        "spanish" | "es" => "es".to_string(),
        "russian" | "ru" => "ru".to_string(),
        "arabic" | "ar" => "ar".to_string(),
        "hebrew" | "iw" | "he" => "he".to_string(),
        "portuguese" | "pt" => "pt".to_string(),
        other => LANGUAGES
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(other))
            .map(|(code, _)| code.to_string())
            .unwrap_or_else(|| lang.to_string()),
    }
}

pub fn is_known(code: &str) -> bool {
    LANGUAGES.iter().any(|(c, _)| *c == code)
}

pub fn is_rtl(code: &str) -> bool {
    RTL.contains(&code)
}

pub fn name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Prioritized languages first, the rest ordered by name.
pub fn display_order() -> Vec<(&'static str, &'static str)> {
    let mut ordered: Vec<(&str, &str)> = PRIORITIZED
        .iter()
        .filter_map(|code| LANGUAGES.iter().find(|(c, _)| c == code).copied())
        .collect();

    let mut rest: Vec<(&str, &str)> = LANGUAGES
        .iter()
        .filter(|(code, _)| !PRIORITIZED.contains(code))
        .copied()
        .collect();
    rest.sort_by(|a, b| a.1.cmp(b.1));

    ordered.extend(rest);
    ordered
}

/// Language code from a POSIX locale value such as `pt_BR.UTF-8`.
///
/// Tries the full tag first, then the primary subtag.
pub fn from_locale(value: &str) -> Option<String> {
    let tag = value.split(['.', '@']).next()?.replace('_', "-");
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        return None;
    }

    let full = normalize(&tag);
    if is_known(&full) {
        return Some(full);
    }

    let primary = normalize(tag.split('-').next()?);
    is_known(&primary).then_some(primary)
}

/// `languages` command: prioritized codes first, right-to-left ones marked.
pub fn run() -> Result<()> {
    println!("{}", "[Languages]".green());
    for (i, (code, name)) in display_order().into_iter().enumerate() {
        if i == PRIORITIZED.len() {
            println!();
        }
        let marker = if is_rtl(code) { " (rtl)" } else { "" };
        println!("  {:<6} {}{}", code, name, marker.cyan());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize("Chinese"), "zh-CN");
        assert_eq!(normalize("zh_tw"), "zh-TW");
        assert_eq!(normalize("JP"), "ja");
        assert_eq!(normalize("AUTO"), AUTO_DETECT);
        assert_eq!(normalize("NL"), "nl");
        assert_eq!(normalize("xx-unknown"), "xx-unknown");
    }

    #[test]
    fn test_rtl_codes() {
        assert!(is_rtl("ar"));
        assert!(is_rtl("ckb"));
        assert!(!is_rtl("fr"));
    }

    #[test]
    fn test_display_order_starts_with_prioritized() {
        let order = display_order();
        let codes: Vec<&str> = order.iter().map(|(c, _)| *c).collect();
        assert_eq!(&codes[..PRIORITIZED.len()], PRIORITIZED);
        assert_eq!(order.len(), LANGUAGES.len());
    }

    #[test]
    fn test_from_locale() {
        assert_eq!(from_locale("fr_FR.UTF-8").as_deref(), Some("fr"));
        assert_eq!(from_locale("zh_TW.UTF-8").as_deref(), Some("zh-TW"));
        assert_eq!(from_locale("de_AT@euro").as_deref(), Some("de"));
        assert_eq!(from_locale("C.UTF-8"), None);
        assert_eq!(from_locale(""), None);
        assert_eq!(from_locale("qq_ZZ"), None);
    }
}
