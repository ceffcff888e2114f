// SPDX-License-Identifier: MPL-2.0

//! Language identification with whatlang
//!
//! whatlang speaks ISO 639-3 while the translation pair is configured with
//! ISO 639-1 codes. Detected languages are reported in the pair's two-letter
//! form when one exists, otherwise as the three-letter code.

use super::{LanguageIdentifier, LanguagePair};
use crate::constants::translation::UNDETERMINED_LANGUAGE;
use crate::errors::TranslationError;
use futures::future::BoxFuture;
use tracing::debug;
use whatlang::{Detector, Lang};

/// ISO 639-1 to ISO 639-3 (whatlang) codes
const ISO_639_1: &[(&str, &str)] = &[
    ("af", "afr"),
    ("ar", "ara"),
    ("be", "bel"),
    ("bg", "bul"),
    ("bn", "ben"),
    ("ca", "cat"),
    ("cs", "ces"),
    ("da", "dan"),
    ("de", "deu"),
    ("el", "ell"),
    ("en", "eng"),
    ("eo", "epo"),
    ("es", "spa"),
    ("et", "est"),
    ("fa", "pes"),
    ("fi", "fin"),
    ("fr", "fra"),
    ("he", "heb"),
    ("hi", "hin"),
    ("hr", "hrv"),
    ("hu", "hun"),
    ("hy", "hye"),
    ("id", "ind"),
    ("it", "ita"),
    ("ja", "jpn"),
    ("ka", "kat"),
    ("ko", "kor"),
    ("lt", "lit"),
    ("lv", "lav"),
    ("mk", "mkd"),
    ("nb", "nob"),
    ("nl", "nld"),
    ("pl", "pol"),
    ("pt", "por"),
    ("ro", "ron"),
    ("ru", "rus"),
    ("sk", "slk"),
    ("sl", "slv"),
    ("sr", "srp"),
    ("sv", "swe"),
    ("th", "tha"),
    ("tr", "tur"),
    ("uk", "ukr"),
    ("ur", "urd"),
    ("vi", "vie"),
    ("zh", "cmn"),
];

/// whatlang language for a configured code (two- or three-letter)
fn lang_for_code(code: &str) -> Option<Lang> {
    let code = code.trim().to_ascii_lowercase();
    let iso_639_3 = ISO_639_1
        .iter()
        .find(|(short, _)| *short == code)
        .map_or(code.as_str(), |(_, long)| *long);
    Lang::from_code(iso_639_3)
}

/// Report code for a detected language
fn report_code(lang: Lang) -> String {
    ISO_639_1
        .iter()
        .find(|(_, long)| *long == lang.code())
        .map_or(lang.code(), |(short, _)| *short)
        .to_string()
}

/// Statistical identifier
///
/// With an allowlist only those languages are considered, which lets very
/// short texts such as single words resolve.
#[derive(Debug, Clone, Default)]
pub struct WhatlangIdentifier {
    allowlist: Vec<Lang>,
}

impl WhatlangIdentifier {
    /// Consider every language whatlang knows
    pub fn new() -> Self {
        Self::default()
    }

    /// Consider only the two languages of `pair`
    ///
    /// Codes whatlang does not know are skipped; with none left every
    /// language is considered.
    pub fn for_pair(pair: &LanguagePair) -> Self {
        let allowlist: Vec<Lang> = [&pair.source, &pair.target]
            .into_iter()
            .filter_map(|code| lang_for_code(code))
            .collect();
        debug!(%pair, ?allowlist, "Language identification allowlist");
        Self { allowlist }
    }

    pub fn allowlist(&self) -> &[Lang] {
        &self.allowlist
    }

    /// Code of the language of `text`, "und" when nothing was detected
    pub fn detect_code(&self, text: &str) -> String {
        let detector = if self.allowlist.is_empty() {
            Detector::new()
        } else {
            Detector::with_allowlist(self.allowlist.clone())
        };

        match detector.detect(text) {
            Some(info) => {
                debug!(
                    lang = info.lang().code(),
                    confidence = info.confidence(),
                    reliable = info.is_reliable(),
                    "Language detected"
                );
                report_code(info.lang())
            }
            None => UNDETERMINED_LANGUAGE.to_string(),
        }
    }
}

impl LanguageIdentifier for WhatlangIdentifier {
    fn identify(&self, text: &str) -> BoxFuture<'static, Result<String, TranslationError>> {
        let identifier = self.clone();
        let text = text.to_string();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || identifier.detect_code(&text))
                .await
                .map_err(|e| TranslationError::Identification(e.to_string()))
        })
    }
}
