// SPDX-License-Identifier: MPL-2.0

//! Translation experiment
//!
//! Not reachable from the screen. When enabled it runs once at startup:
//! download a translation model (only on an unmetered connection), translate
//! a fixed string, and log the languages detected in the result and in a
//! source sample. Failures are logged and end the experiment.

pub mod language_id;
pub mod translate_locally;

pub use language_id::WhatlangIdentifier;
pub use translate_locally::TranslateLocallyTranslator;

use crate::config::Config;
use crate::constants::translation::UNDETERMINED_LANGUAGE;
use crate::errors::TranslationError;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Source and target language codes (ISO 639-1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Conditions a model download must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConditions {
    pub require_unmetered: bool,
}

impl Default for DownloadConditions {
    fn default() -> Self {
        Self {
            require_unmetered: true,
        }
    }
}

/// A translator configured for one language pair
pub trait Translator: Send + Sync {
    fn pair(&self) -> &LanguagePair;

    /// Make the model available, downloading it if `conditions` allow
    fn download_model(
        &self,
        conditions: DownloadConditions,
    ) -> BoxFuture<'static, Result<(), TranslationError>>;

    fn translate(&self, text: &str) -> BoxFuture<'static, Result<String, TranslationError>>;
}

/// Detects the language of a text
pub trait LanguageIdentifier: Send + Sync {
    /// Language code of `text`, or "und" when it cannot be determined
    fn identify(&self, text: &str) -> BoxFuture<'static, Result<String, TranslationError>>;
}

/// What one experiment run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentReport {
    pub translation: String,
    pub translation_language: String,
    pub source_sample_language: String,
}

pub struct TranslationExperiment {
    translator: Arc<dyn Translator>,
    identifier: Arc<dyn LanguageIdentifier>,
    conditions: DownloadConditions,
}

impl TranslationExperiment {
    pub fn new(
        translator: Arc<dyn Translator>,
        identifier: Arc<dyn LanguageIdentifier>,
        conditions: DownloadConditions,
    ) -> Self {
        Self {
            translator,
            identifier,
            conditions,
        }
    }

    /// translateLocally and whatlang, configured from the user settings
    pub fn from_config(config: &Config) -> Self {
        let pair = LanguagePair::new(
            config.translation_source_language.clone(),
            config.translation_target_language.clone(),
        );
        let identifier = WhatlangIdentifier::for_pair(&pair);
        let translator = TranslateLocallyTranslator::new(pair, config.translation_model.clone());
        Self::new(
            Arc::new(translator),
            Arc::new(identifier),
            DownloadConditions {
                require_unmetered: config.download_on_unmetered_only,
            },
        )
    }

    /// Download the model, translate `text`, then identify the language of
    /// the translation and of `source_sample`
    pub async fn prepare_and_translate(
        &self,
        text: &str,
        source_sample: &str,
    ) -> Result<ExperimentReport, TranslationError> {
        let pair = self.translator.pair().clone();
        info!(%pair, conditions = ?self.conditions, "Preparing translation model");

        if let Err(e) = self.translator.download_model(self.conditions).await {
            warn!(%pair, error = %e, "Translation model not available");
            return Err(e);
        }
        info!(%pair, "Translation model ready");

        let translation = match self.translator.translate(text).await {
            Ok(translation) => translation,
            Err(e) => {
                warn!(%pair, error = %e, "Translation failed");
                return Err(e);
            }
        };
        info!(%pair, input = text, output = %translation, "Translated sample text");

        let translation_language = self.identify_or_undetermined(&translation).await;
        let source_sample_language = self.identify_or_undetermined(source_sample).await;
        // Same code system as the pair: ISO 639-1 where one exists
        info!(
            %pair,
            translation_language = %translation_language,
            source_sample_language = %source_sample_language,
            source_sample,
            "Identified languages"
        );

        Ok(ExperimentReport {
            translation,
            translation_language,
            source_sample_language,
        })
    }

    async fn identify_or_undetermined(&self, text: &str) -> String {
        match self.identifier.identify(text).await {
            Ok(code) => code,
            Err(e) => {
                warn!(text, error = %e, "Language identification failed");
                UNDETERMINED_LANGUAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeTranslator {
        pair: LanguagePair,
        download: Result<(), TranslationError>,
        seen_conditions: Mutex<Vec<DownloadConditions>>,
        translated: Mutex<Vec<String>>,
    }

    impl FakeTranslator {
        fn new(download: Result<(), TranslationError>) -> Arc<Self> {
            Arc::new(Self {
                pair: LanguagePair::new("en", "ru"),
                download,
                seen_conditions: Mutex::new(Vec::new()),
                translated: Mutex::new(Vec::new()),
            })
        }
    }

    impl Translator for FakeTranslator {
        fn pair(&self) -> &LanguagePair {
            &self.pair
        }

        fn download_model(
            &self,
            conditions: DownloadConditions,
        ) -> BoxFuture<'static, Result<(), TranslationError>> {
            self.seen_conditions.lock().unwrap().push(conditions);
            let result = self.download.clone();
            Box::pin(async move { result })
        }

        fn translate(&self, text: &str) -> BoxFuture<'static, Result<String, TranslationError>> {
            self.translated.lock().unwrap().push(text.to_string());
            Box::pin(async { Ok("Привет мир".to_string()) })
        }
    }

    struct FakeIdentifier;

    impl LanguageIdentifier for FakeIdentifier {
        fn identify(&self, text: &str) -> BoxFuture<'static, Result<String, TranslationError>> {
            let result = match text {
                "Привет мир" => Ok("rus".to_string()),
                "Hello" => Ok("eng".to_string()),
                _ => Err(TranslationError::Identification("no idea".into())),
            };
            Box::pin(async move { result })
        }
    }

    #[tokio::test]
    async fn test_experiment_reports_real_detections() {
        let translator = FakeTranslator::new(Ok(()));
        let experiment = TranslationExperiment::new(
            translator.clone(),
            Arc::new(FakeIdentifier),
            DownloadConditions::default(),
        );

        let report = experiment
            .prepare_and_translate("Hello World", "Hello")
            .await
            .unwrap();

        assert_eq!(report.translation, "Привет мир");
        assert_eq!(report.translation_language, "rus");
        assert_eq!(report.source_sample_language, "eng");
        assert_eq!(
            *translator.seen_conditions.lock().unwrap(),
            vec![DownloadConditions {
                require_unmetered: true
            }]
        );
    }

    #[tokio::test]
    async fn test_failed_download_stops_before_translating() {
        let translator = FakeTranslator::new(Err(TranslationError::DownloadConditionsNotMet(
            "metered".into(),
        )));
        let experiment = TranslationExperiment::new(
            translator.clone(),
            Arc::new(FakeIdentifier),
            DownloadConditions::default(),
        );

        let result = experiment.prepare_and_translate("Hello World", "Hello").await;

        assert!(matches!(
            result,
            Err(TranslationError::DownloadConditionsNotMet(_))
        ));
        assert!(translator.translated.lock().unwrap().is_empty());
    }

    #[test]
    fn test_from_config_uses_configured_pair() {
        let config = Config {
            translation_source_language: "de".into(),
            translation_target_language: "en".into(),
            ..Default::default()
        };
        let experiment = TranslationExperiment::from_config(&config);
        assert_eq!(*experiment.translator.pair(), LanguagePair::new("de", "en"));
        assert!(experiment.conditions.require_unmetered);
    }

    #[tokio::test]
    async fn test_from_config_identifies_short_samples() {
        let experiment = TranslationExperiment::from_config(&Config::default());
        let source = experiment.identifier.identify("Hello").await.unwrap();
        let translation = experiment.identifier.identify("Привет мир").await.unwrap();
        assert_eq!(source, "en");
        assert_eq!(translation, "ru");
    }

    #[tokio::test]
    async fn test_identification_failure_is_undetermined() {
        let experiment = TranslationExperiment::new(
            FakeTranslator::new(Ok(())),
            Arc::new(FakeIdentifier),
            DownloadConditions::default(),
        );

        let report = experiment
            .prepare_and_translate("Hello World", "???")
            .await
            .unwrap();

        assert_eq!(report.source_sample_language, UNDETERMINED_LANGUAGE);
    }
}
