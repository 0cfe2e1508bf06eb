//! Gemini video analysis on Vertex AI.
//!
//! Sends the video inline (base64) together with the analysis prompt to the
//! `generateContent` endpoint. Authentication uses a short-lived access token
//! from the gcloud CLI, matching how the rest of Blikk shells out to external
//! tools.

use super::VideoAnalyzer;
use crate::config::AnalyzerSettings;
use crate::error::{BlikkError, Result};
use async_trait::async_trait;
use base64::Engine;
use serde_json::json;
use tracing::{debug, info};

/// Video analyzer backed by Gemini on Vertex AI.
pub struct VertexAnalyzer {
    client: reqwest::Client,
    settings: AnalyzerSettings,
}

impl VertexAnalyzer {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    /// Resolve the project identifier from settings or the environment.
    ///
    /// Checked here, not at startup, so file tools keep working on machines
    /// without a configured analyzer.
    fn project(&self) -> Result<String> {
        self.settings
            .project
            .clone()
            .filter(|p| !p.is_empty())
            .or_else(|| std::env::var("GOOGLE_CLOUD_PROJECT").ok().filter(|p| !p.is_empty()))
            .ok_or_else(|| {
                BlikkError::ConfigMissing(
                    "No analyzer project configured. Set [analyzer] project in the config file \
                     or the GOOGLE_CLOUD_PROJECT environment variable."
                        .into(),
                )
            })
    }

    fn location(&self) -> String {
        std::env::var("GOOGLE_CLOUD_LOCATION")
            .ok()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.settings.location.clone())
    }

    /// Obtain a bearer token via the gcloud CLI.
    async fn access_token(&self) -> Result<String> {
        let output = tokio::process::Command::new("gcloud")
            .args(["auth", "print-access-token"])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    BlikkError::Analysis(
                        "gcloud not found. Install the Google Cloud CLI and ensure it's in your PATH."
                            .to_string(),
                    )
                } else {
                    BlikkError::Analysis(format!("Failed to run gcloud: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BlikkError::Analysis(format!(
                "Could not obtain an access token: {}",
                stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn endpoint(&self, project: &str, location: &str) -> String {
        format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{proj}/locations/{loc}/publishers/google/models/{model}:generateContent",
            loc = location,
            proj = project,
            model = self.settings.model,
        )
    }
}

#[async_trait]
impl VideoAnalyzer for VertexAnalyzer {
    async fn analyze(&self, video: &[u8], prompt: &str) -> Result<String> {
        let project = self.project()?;
        let location = self.location();
        let token = self.access_token().await?;

        info!(
            "Analyzing video with {} ({} bytes)",
            self.settings.model,
            video.len()
        );

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": "video/mp4",
                            "data": base64::engine::general_purpose::STANDARD.encode(video),
                        }
                    },
                    { "text": prompt },
                ]
            }]
        });

        let response = self
            .client
            .post(self.endpoint(&project, &location))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let payload: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or("unknown model error");
            return Err(BlikkError::Analysis(format!(
                "Model request failed ({}): {}",
                status, message
            )));
        }

        debug!("Model response received");

        let parts = payload["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| {
                BlikkError::Analysis("Model response contained no candidates".into())
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(BlikkError::Analysis(
                "Model response contained no text".into(),
            ));
        }

        Ok(text)
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}
