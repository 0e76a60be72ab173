/*!
 * Batch driver.
 *
 * Runs a pipeline over several documents, one after the other. A failing
 * document is recorded with its error and the batch moves on; cancellation
 * stops the batch.
 */

use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::errors::PipelineError;
use crate::pipeline::context::{BatchItemContext, CancellationToken};
use crate::pipeline::core::{Pipeline, PipelineRun};

/// Called after each document with (done, total, document name)
pub type ProgressCallback = Box<dyn FnMut(usize, usize, &str) + Send>;

/// How one document ended
#[derive(Debug)]
pub enum DocumentStatus {
    Succeeded(PipelineRun),
    Failed(PipelineError),
}

/// Outcome of one document of a batch
#[derive(Debug)]
pub struct DocumentOutcome {
    /// Document name
    pub document: String,
    pub status: DocumentStatus,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, DocumentStatus::Succeeded(_))
    }

    /// Error of a failed document
    pub fn error(&self) -> Option<&PipelineError> {
        match &self.status {
            DocumentStatus::Failed(e) => Some(e),
            DocumentStatus::Succeeded(_) => None,
        }
    }
}

/// Outcomes of a batch, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
    /// Whether the batch stopped because it was canceled
    pub canceled: bool,
    pub duration: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Failed documents with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&str, &PipelineError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (o.document.as_str(), e)))
    }

    /// Whether every document succeeded and the batch ran to the end
    pub fn is_success(&self) -> bool {
        !self.canceled && self.failed() == 0
    }

    /// Get a summary of the batch
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "{} documents: {} succeeded, {} failed",
            self.outcomes.len(),
            self.succeeded(),
            self.failed()
        )];
        if self.canceled {
            parts.push("canceled".to_string());
        }
        parts.push(format!("{:.2}s", self.duration.as_secs_f32()));
        parts.join(", ")
    }
}

/// Runs a pipeline over a batch of documents
pub struct PipelineDriver {
    pipeline: Pipeline,
    items: Vec<BatchItemContext>,
    progress: Option<ProgressCallback>,
}

impl PipelineDriver {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            items: Vec::new(),
            progress: None,
        }
    }

    /// Queue a document
    pub fn add_item(&mut self, item: BatchItemContext) {
        self.items.push(item);
    }

    /// Report progress after each document
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Number of queued documents
    pub fn pending(&self) -> usize {
        self.items.len()
    }

    /// Token that stops the batch
    pub fn cancellation_token(&self) -> CancellationToken {
        self.pipeline.cancellation_token()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Process every queued document
    pub fn process_batch(&mut self) -> BatchReport {
        let start = Instant::now();
        let token = self.pipeline.cancellation_token();
        let items: Vec<BatchItemContext> = self.items.drain(..).collect();
        let total = items.len();
        let mut report = BatchReport::default();

        info!("Processing batch of {} documents", total);
        for (index, item) in items.into_iter().enumerate() {
            if token.is_canceled() {
                warn!("Batch canceled, {} documents not processed", total - index);
                report.canceled = true;
                break;
            }

            let document = item.display_name();
            let status = match self.pipeline.process(item) {
                Ok(run) => {
                    info!("{}", run.summary());
                    DocumentStatus::Succeeded(run)
                }
                Err(e) if e.is_canceled() => {
                    warn!("'{}' canceled", document);
                    report.canceled = true;
                    report.outcomes.push(DocumentOutcome {
                        document,
                        status: DocumentStatus::Failed(e),
                    });
                    break;
                }
                Err(e) => {
                    error!("'{}' failed: {}", document, e);
                    DocumentStatus::Failed(e)
                }
            };

            if let Some(progress) = self.progress.as_mut() {
                progress(index + 1, total, &document);
            }
            report.outcomes.push(DocumentOutcome { document, status });
        }

        report.duration = start.elapsed();
        info!("Batch finished: {}", report.summary());
        report
    }
}
