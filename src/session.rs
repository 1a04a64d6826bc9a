//! Per-run session: UI language and localized interface strings

use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::Config;
use crate::languages;
use crate::translate::endpoint::{TranslationEndpoint, extract_translation};

const BASE_LANGUAGE: &str = "en";

/// Environment variables consulted for the system locale, in priority order.
const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_MESSAGES", "LANG"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiString {
    PageTitle,
    SourceLabel,
    TargetLabel,
    EnterSourceText,
    Translated,
    Eta,
    Calculating,
    UiLanguage,
    TranslationError,
    BilingualBook,
    TranslationFinished,
    AutodetectLanguage,
}

impl UiString {
    pub const ALL: &'static [UiString] = &[
        UiString::PageTitle,
        UiString::SourceLabel,
        UiString::TargetLabel,
        UiString::EnterSourceText,
        UiString::Translated,
        UiString::Eta,
        UiString::Calculating,
        UiString::UiLanguage,
        UiString::TranslationError,
        UiString::BilingualBook,
        UiString::TranslationFinished,
        UiString::AutodetectLanguage,
    ];

    pub fn english(self) -> &'static str {
        match self {
            UiString::PageTitle => "Bilingual Book Generator",
            UiString::SourceLabel => "Source Language",
            UiString::TargetLabel => "Target Language",
            UiString::EnterSourceText => "Enter Source Text",
            UiString::Translated => "Translated",
            UiString::Eta => "ETA",
            UiString::Calculating => "Calculating...",
            UiString::UiLanguage => "UI Language",
            UiString::TranslationError => "Translation Error",
            UiString::BilingualBook => "Bilingual Book",
            UiString::TranslationFinished => "Translation process over.",
            UiString::AutodetectLanguage => "Autodetect Language",
        }
    }
}

pub struct Session {
    ui_language: String,
    strings: HashMap<UiString, String>,
}

impl Session {
    pub fn new(ui_language: &str) -> Self {
        Self {
            ui_language: languages::normalize(ui_language),
            strings: HashMap::new(),
        }
    }

    pub fn ui_language(&self) -> &str {
        &self.ui_language
    }

    /// Localized text for `key`, English until `localize` has filled it.
    pub fn text(&self, key: UiString) -> &str {
        self.strings
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.english())
    }

    /// Translate every UI string into the session language.
    ///
    /// Each string is fetched once per session. Failures keep the English text.
    pub async fn localize(&mut self, endpoint: &dyn TranslationEndpoint) {
        if self.ui_language == BASE_LANGUAGE {
            return;
        }

        let missing: Vec<UiString> = UiString::ALL
            .iter()
            .copied()
            .filter(|key| !self.strings.contains_key(key))
            .collect();
        if missing.is_empty() {
            return;
        }

        let target = self.ui_language.clone();
        let calls = missing.iter().map(|key| {
            let target = &target;
            async move {
                let text = key.english();
                match endpoint.query(text, BASE_LANGUAGE, target).await {
                    Ok(response) => extract_translation(&response).map_err(|e| (text, e)),
                    Err(e) => Err((text, e)),
                }
            }
        });
        let results = join_all(calls).await;

        let mut failures = 0;
        for (key, result) in missing.into_iter().zip(results) {
            let text = match result {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => {
                    failures += 1;
                    key.english().to_string()
                }
                Err((english, e)) => {
                    debug!("Could not localize {:?}: {}", english, e);
                    failures += 1;
                    key.english().to_string()
                }
            };
            self.strings.insert(key, text);
        }

        if failures > 0 {
            warn!(
                "{} interface string(s) left in English for {}",
                failures, self.ui_language
            );
        }
    }
}

/// Pick the interface language: explicit choice, stored preference, system
/// locale, then English.
pub fn resolve_ui_language(
    explicit: Option<&str>,
    stored: Option<&str>,
    locale: Option<&str>,
) -> String {
    let chosen = |code: &&str| !code.trim().is_empty();
    explicit
        .filter(chosen)
        .or(stored.filter(chosen))
        .map(languages::normalize)
        .or_else(|| locale.and_then(languages::from_locale))
        .unwrap_or_else(|| BASE_LANGUAGE.to_string())
}

/// First non-empty locale variable from the environment.
pub fn system_locale() -> Option<String> {
    LOCALE_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
}

/// Store `ui_language` as the preferred interface language. Failing to save
/// only costs the preference, so it is logged and ignored.
pub fn remember_ui_language(config: &mut Config, ui_language: &str) {
    if config.general.ui_language.as_deref() == Some(ui_language) {
        return;
    }
    config.general.ui_language = Some(ui_language.to_string());
    if let Err(e) = config.save() {
        warn!("Could not save UI language preference: {:#}", e);
    }
}
