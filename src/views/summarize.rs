//! Summarize page: text, URL or document in, summary and metrics out

use std::path::Path;

use crate::api::types::{SummaryResult, TextSummarizeRequest, UrlSummarizeRequest};
use crate::api::ApiClient;
use crate::attachment::{Attachment, MAX_ATTACHMENT_BYTES};
use crate::config::{Config, SUMMARY_LENGTHS};
use crate::error::{Result, SynopsisError};
use crate::validation;
use crate::views::inline_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummarizeMode {
    #[default]
    Text,
    Url,
    File,
}

#[derive(Debug, Clone)]
pub struct SummarizeView {
    pub mode: SummarizeMode,
    pub text: String,
    pub url: String,
    length: String,
    pub max_length: u32,
    pub min_length: u32,
    attachment: Option<Attachment>,
    max_attachment_bytes: u64,
    download_file_name: String,
    result: Option<SummaryResult>,
    error: Option<String>,
    loading: bool,
}

impl SummarizeView {
    pub fn new(config: &Config) -> Self {
        Self {
            mode: SummarizeMode::Text,
            text: String::new(),
            url: String::new(),
            length: config.summarize.default_length.clone(),
            max_length: config.summarize.max_length,
            min_length: config.summarize.min_length,
            attachment: None,
            max_attachment_bytes: config.chat.max_attachment_bytes.min(MAX_ATTACHMENT_BYTES),
            download_file_name: config.summarize.download_file_name.clone(),
            result: None,
            error: None,
            loading: false,
        }
    }

    /// Switching tabs clears the inline error but keeps the last result
    pub fn set_mode(&mut self, mode: SummarizeMode) {
        self.mode = mode;
        self.error = None;
    }

    pub fn length(&self) -> &str {
        &self.length
    }

    pub fn set_length(&mut self, length: &str) -> Result<()> {
        if !SUMMARY_LENGTHS.contains(&length) {
            return Err(SynopsisError::Validation(format!(
                "Length must be one of: {}",
                SUMMARY_LENGTHS.join(", ")
            ))
            .into());
        }
        self.length = length.to_string();
        Ok(())
    }

    /// Validate and stage a document for File mode
    pub fn attach_file(&mut self, path: &Path) -> Result<()> {
        match Attachment::from_path(path, self.max_attachment_bytes) {
            Ok(attachment) => {
                self.attachment = Some(attachment);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.attachment = None;
                self.error = inline_error(&e, "Could not read the selected file");
                Err(e)
            }
        }
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn result(&self) -> Option<&SummaryResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Copy and download are available once a summary exists
    pub fn can_export(&self) -> bool {
        self.result.is_some()
    }

    /// Submit the active mode's input
    ///
    /// Input is validated first; a validation failure issues no request. On
    /// failure the previous result stays visible next to the new error.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<()> {
        self.error = None;

        if let Err(e) = self.check_input() {
            self.error = inline_error(&e, "Invalid input");
            return Err(e);
        }

        self.loading = true;
        let outcome = match self.mode {
            SummarizeMode::Text => {
                let request = TextSummarizeRequest {
                    text: self.text.clone(),
                    length: self.length.clone(),
                    max_length: self.max_length,
                    min_length: self.min_length,
                };
                api.summarize_text(&request).await
            }
            SummarizeMode::Url => {
                let request = UrlSummarizeRequest {
                    url: self.url.trim().to_string(),
                    length: self.length.clone(),
                    max_length: self.max_length,
                    min_length: self.min_length,
                };
                api.summarize_url(&request).await
            }
            SummarizeMode::File => match &self.attachment {
                Some(file) => api.summarize_file(file, &self.length).await,
                None => Err(SynopsisError::Validation("Please choose a file".into()).into()),
            },
        };
        self.loading = false;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    original = result.original_length,
                    summary = result.summary_length,
                    "Summary received"
                );
                self.result = Some(result);
                Ok(())
            }
            Err(e) => {
                let fallback = match self.mode {
                    SummarizeMode::Text => "An error occurred while summarizing the text",
                    SummarizeMode::Url => "An error occurred while summarizing the URL",
                    SummarizeMode::File => "An error occurred while summarizing the file",
                };
                self.error = inline_error(&e, fallback);
                Err(e)
            }
        }
    }

    fn check_input(&self) -> Result<()> {
        match self.mode {
            SummarizeMode::Text => validation::validate_summary_text(&self.text),
            SummarizeMode::Url => validation::validate_summary_url(&self.url).map(|_| ()),
            SummarizeMode::File => {
                if self.attachment.is_none() {
                    return Err(SynopsisError::Validation("Please choose a file".into()).into());
                }
                Ok(())
            }
        }
    }

    /// Label/value pairs shown under the summary
    pub fn metadata(&self) -> Vec<(&'static str, String)> {
        let Some(result) = &self.result else {
            return Vec::new();
        };
        vec![
            (
                "Original length",
                format!("{} characters", result.original_length),
            ),
            (
                "Summary length",
                format!("{} characters", result.summary_length),
            ),
            ("Compression ratio", format!("{}%", result.compression_ratio)),
        ]
    }

    /// Summary text for the clipboard
    pub fn copy_text(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.summary.as_str())
    }

    /// Write the summary to `path`, or to the configured file name
    pub fn download(&self, path: Option<&Path>) -> Result<std::path::PathBuf> {
        let summary = self
            .copy_text()
            .ok_or_else(|| SynopsisError::Validation("Nothing to download yet".into()))?;
        let target = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| std::path::PathBuf::from(&self.download_file_name));
        std::fs::write(&target, summary)?;
        tracing::debug!(path = %target.display(), "Summary written");
        Ok(target)
    }
}
