//! Report generation orchestration.
//!
//! Calls the configured [`TextGenerator`] under a timeout, retries once with
//! a doubled budget when the first attempt times out, and falls back to the
//! local composer for every other failure.

use std::sync::Arc;
use std::time::Duration;

use shared_types::{ReportRequest, ReportResponse};
use tokio::time::timeout;

use super::fallback::compose_local_report;
use super::generator::{GeneratedText, GenerationError, TextGenerator};
use super::normalize_report;

/// Default character budget for a finished report.
pub const DEFAULT_MAX_CHARS: usize = 1245;

/// Default budget for the first provider call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub max_chars: usize,
    /// Budget for the first attempt; the retry gets twice this
    pub timeout: Duration,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

/// Service for report generation
#[derive(Clone)]
pub struct ReportService {
    generator: Option<Arc<dyn TextGenerator>>,
    settings: ReportSettings,
}

impl ReportService {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, settings: ReportSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    /// A service that never calls out and always composes reports locally.
    pub fn local_only(settings: ReportSettings) -> Self {
        Self::new(None, settings)
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Produce a report for the given activities.
    ///
    /// Only fails when there is nothing to report on; provider failures
    /// degrade to the local composer.
    pub async fn create_report(
        &self,
        request: &ReportRequest,
    ) -> Result<ReportResponse, GenerationError> {
        let activities = request.cleaned_activities();
        if activities.is_empty() {
            return Err(GenerationError::EmptyReport);
        }

        let Some(generator) = &self.generator else {
            tracing::debug!("No text generator configured, composing report locally");
            return self.local_report(&activities);
        };

        let prompt = build_prompt(&activities, self.settings.max_chars);

        match self.generate_with_retry(generator.as_ref(), &prompt).await {
            Ok(generated) => {
                let report = normalize_report(&generated, self.settings.max_chars);
                if !report.is_empty() {
                    return Ok(ReportResponse { report });
                }
                tracing::warn!("Generated report was empty after normalization, using local fallback");
            }
            Err(e) => {
                tracing::warn!("Remote report generation failed, using local fallback: {}", e);
            }
        }

        self.local_report(&activities)
    }

    async fn generate_with_retry(
        &self,
        generator: &dyn TextGenerator,
        prompt: &str,
    ) -> Result<GeneratedText, GenerationError> {
        let budget = self.settings.timeout;

        match timeout(budget, generator.generate(prompt)).await {
            Ok(Err(e)) if e.is_timeout() => {}
            Ok(result) => return result,
            Err(_) => {}
        }

        let retry_budget = budget * 2;
        tracing::warn!(
            "Text generation timed out after {:?}, retrying once with {:?}",
            budget,
            retry_budget
        );

        match timeout(retry_budget, generator.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(retry_budget)),
        }
    }

    fn local_report(&self, activities: &[&str]) -> Result<ReportResponse, GenerationError> {
        let report = compose_local_report(activities, self.settings.max_chars)?;
        Ok(ReportResponse { report })
    }
}

/// Prompt asking for a formal first-person report of the activities.
pub fn build_prompt(activities: &[&str], max_chars: usize) -> String {
    let lines = activities
        .iter()
        .map(|a| format!("- {}", a))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Genera un reporte formal y conciso basado en las siguientes actividades:\n\
         {lines}\n\n\
         El reporte debe tener exactamente {max_chars} caracteres. \
         Devuélvelo como texto plano en un campo llamado 'report', \
         en primera persona y en pasado, sin numeración ni metadatos adicionales. \
         IMPORTANTE: Asegúrate de que el texto esté completo y no se corte abruptamente."
    )
}
