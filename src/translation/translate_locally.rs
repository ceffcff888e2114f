// SPDX-License-Identifier: MPL-2.0

//! Offline translation through the `translateLocally` command-line tool
//!
//! `-l` lists installed models, `-d <model>` downloads one and `-m <model>`
//! translates stdin to stdout.

use super::{DownloadConditions, LanguagePair, Translator};
use crate::errors::TranslationError;
use crate::network_manager;
use futures::future::BoxFuture;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

const DEFAULT_BINARY: &str = "translateLocally";

#[derive(Debug, Clone)]
pub struct TranslateLocallyTranslator {
    binary: String,
    pair: LanguagePair,
    model: String,
}

/// Model name for a pair: `<source>-<target>-tiny`
pub fn default_model_name(pair: &LanguagePair) -> String {
    format!("{}-{}-tiny", pair.source, pair.target)
}

/// Model names from `translateLocally -l` output
///
/// Each line ends with "To invoke do -m <model>".
pub fn parse_model_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let (_, rest) = line.split_once("-m ")?;
            rest.split_whitespace().next().map(str::to_string)
        })
        .collect()
}

impl TranslateLocallyTranslator {
    pub fn new(pair: LanguagePair, model: Option<String>) -> Self {
        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_model_name(&pair));
        Self {
            binary: DEFAULT_BINARY.to_string(),
            pair,
            model,
        }
    }

    /// Use a different executable
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, TranslationError> {
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))
    }

    fn spawn_error(&self, e: std::io::Error) -> TranslationError {
        if e.kind() == std::io::ErrorKind::NotFound {
            TranslationError::BackendNotAvailable(format!("{} not found", self.binary))
        } else {
            TranslationError::BackendNotAvailable(format!("Failed to run {}: {}", self.binary, e))
        }
    }

    async fn installed_models(&self) -> Result<Vec<String>, TranslationError> {
        let output = self.run(&["-l"]).await?;
        if !output.status.success() {
            return Err(TranslationError::BackendNotAvailable(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let models = parse_model_list(&String::from_utf8_lossy(&output.stdout));
        debug!(?models, "Installed translation models");
        Ok(models)
    }

    async fn ensure_model(&self, conditions: DownloadConditions) -> Result<(), TranslationError> {
        if self.installed_models().await?.contains(&self.model) {
            debug!(model = %self.model, "Translation model already installed");
            return Ok(());
        }

        if conditions.require_unmetered && !network_manager::is_unmetered().await {
            return Err(TranslationError::DownloadConditionsNotMet(
                "connection is metered".into(),
            ));
        }

        info!(model = %self.model, "Downloading translation model");
        let output = self.run(&["-d", self.model.as_str()]).await?;
        if !output.status.success() {
            return Err(TranslationError::ModelDownload(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        info!(model = %self.model, "Translation model downloaded");
        Ok(())
    }

    async fn translate_text(&self, text: String) -> Result<String, TranslationError> {
        let mut child = Command::new(&self.binary)
            .args(["-m", self.model.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| TranslationError::Translate(e.to_string()))?;
            // Closing stdin ends the input
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| TranslationError::Translate(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(model = %self.model, stderr = %stderr, "translateLocally failed");
            return Err(TranslationError::Translate(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

impl Translator for TranslateLocallyTranslator {
    fn pair(&self) -> &LanguagePair {
        &self.pair
    }

    fn download_model(
        &self,
        conditions: DownloadConditions,
    ) -> BoxFuture<'static, Result<(), TranslationError>> {
        let this = self.clone();
        Box::pin(async move { this.ensure_model(conditions).await })
    }

    fn translate(&self, text: &str) -> BoxFuture<'static, Result<String, TranslationError>> {
        let this = self.clone();
        let text = text.to_string();
        Box::pin(async move { this.translate_text(text).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_list() {
        let output = "\
English-Russian type: tiny version: 1; To invoke do -m en-ru-tiny
Czech-English type: base version: 2; To invoke do -m cs-en-base
garbage line
";
        assert_eq!(parse_model_list(output), vec!["en-ru-tiny", "cs-en-base"]);
    }

    #[test]
    fn test_model_name_from_pair_or_override() {
        let pair = LanguagePair::new("en", "ru");
        assert_eq!(
            TranslateLocallyTranslator::new(pair.clone(), None).model(),
            "en-ru-tiny"
        );
        assert_eq!(
            TranslateLocallyTranslator::new(pair.clone(), Some(" ".into())).model(),
            "en-ru-tiny"
        );
        assert_eq!(
            TranslateLocallyTranslator::new(pair, Some("en-ru-base".into())).model(),
            "en-ru-base"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_backend_not_available() {
        let translator = TranslateLocallyTranslator::new(LanguagePair::new("en", "ru"), None)
            .with_binary("/nonexistent/translateLocally");

        let result = translator
            .download_model(DownloadConditions::default())
            .await;

        assert!(matches!(
            result,
            Err(TranslationError::BackendNotAvailable(_))
        ));
    }
}
