//! Shared JSON contract for the docmind adapters.
//!
//! Request types mirror the structured input format consumed by the
//! JSON-driven processing mode; report types are the standardized output
//! shapes for both the structured analysis and the cohesive summary. The
//! ranking core knows nothing about these shapes — the CLI converts between
//! core results and this contract.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Summary text emitted when no usable content was found. The core's own
/// sentinel is the empty string; this message is the adapter-level rendering.
pub const EMPTY_SUMMARY_TEXT: &str = "No relevant content found in the provided documents.";

/// Request validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("documents must be a non-empty list")]
    NoDocuments,

    #[error("document at position {0} has an empty filename")]
    BlankFilename(usize),

    #[error("persona role must not be blank")]
    BlankPersona,

    #[error("job task must not be blank")]
    BlankTask,
}

/// Structured processing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingRequest {
    pub challenge_info: ChallengeInfo,
    pub documents: Vec<DocumentRef>,
    pub persona: PersonaSpec,
    pub job_to_be_done: JobSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeInfo {
    pub challenge_id: String,
    pub test_case_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaSpec {
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    pub task: String,
}

impl ProcessingRequest {
    /// Check the parts serde cannot: non-empty lists and non-blank strings.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.documents.is_empty() {
            return Err(RequestError::NoDocuments);
        }
        for (idx, doc) in self.documents.iter().enumerate() {
            if doc.filename.trim().is_empty() {
                return Err(RequestError::BlankFilename(idx));
            }
        }
        if self.persona.role.trim().is_empty() {
            return Err(RequestError::BlankPersona);
        }
        if self.job_to_be_done.task.trim().is_empty() {
            return Err(RequestError::BlankTask);
        }
        Ok(())
    }

    /// Requested document filenames, in request order
    #[must_use]
    pub fn filenames(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.filename.as_str()).collect()
    }
}

/// Metadata block shared by both report kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub processing_timestamp: String,
    pub processing_time_seconds: f64,
    pub total_fragments: usize,
}

impl RunMetadata {
    /// Build metadata stamped with the current UTC time
    #[must_use]
    pub fn new(
        input_documents: Vec<String>,
        persona: impl Into<String>,
        job: impl Into<String>,
        processing_time_seconds: f64,
        total_fragments: usize,
    ) -> Self {
        Self {
            input_documents,
            persona: persona.into(),
            job_to_be_done: job.into(),
            processing_timestamp: timestamp(),
            processing_time_seconds,
            total_fragments,
        }
    }
}

/// One ranked section in the analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionEntry {
    pub document: String,
    pub section_title: String,
    pub importance_rank: usize,
    pub page_number: usize,
}

/// One refined subsection in the analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsectionEntry {
    pub document: String,
    pub refined_text: String,
    pub page_number: usize,
}

/// Standardized structured-analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: RunMetadata,
    pub extracted_sections: Vec<SectionEntry>,
    pub subsection_analysis: Vec<SubsectionEntry>,
}

impl AnalysisReport {
    /// Report for a run that found no usable content
    #[must_use]
    pub fn empty(persona: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            metadata: RunMetadata::new(Vec::new(), persona, job, 0.0, 0),
            extracted_sections: Vec::new(),
            subsection_analysis: Vec::new(),
        }
    }
}

/// Standardized cohesive-summary report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub metadata: RunMetadata,
    pub summary_word_count: usize,
    pub cohesive_summary: String,
}

impl SummaryReport {
    /// Report for a run that found no usable content
    #[must_use]
    pub fn empty(persona: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            metadata: RunMetadata::new(Vec::new(), persona, job, 0.0, 0),
            summary_word_count: 0,
            cohesive_summary: EMPTY_SUMMARY_TEXT.to_string(),
        }
    }
}

/// Current UTC time in the report timestamp format
#[must_use]
pub fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request_json() -> &'static str {
        r#"{
            "challenge_info": {
                "challenge_id": "round_007",
                "test_case_name": "travel_planning"
            },
            "documents": [
                {"filename": "guide.pdf", "title": "City Guide"},
                {"filename": "notes.txt"}
            ],
            "persona": {"role": "Travel Planner"},
            "job_to_be_done": {"task": "Plan a 4-day trip for a group of 10"}
        }"#
    }

    #[test]
    fn request_round_trips_through_json() {
        let request: ProcessingRequest = serde_json::from_str(request_json()).unwrap();
        assert_eq!(request.filenames(), vec!["guide.pdf", "notes.txt"]);
        assert_eq!(request.persona.role, "Travel Planner");
        assert!(request.validate().is_ok());

        let encoded = serde_json::to_string(&request).unwrap();
        let decoded: ProcessingRequest = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.filenames(), request.filenames());
    }

    #[test]
    fn missing_required_fields_fail_to_parse() {
        let raw = r#"{"documents": [], "persona": {"role": "x"}}"#;
        assert!(serde_json::from_str::<ProcessingRequest>(raw).is_err());
    }

    #[test]
    fn validation_rejects_empty_documents() {
        let mut request: ProcessingRequest = serde_json::from_str(request_json()).unwrap();
        request.documents.clear();
        assert_eq!(request.validate(), Err(RequestError::NoDocuments));
    }

    #[test]
    fn validation_rejects_blank_fields() {
        let mut request: ProcessingRequest = serde_json::from_str(request_json()).unwrap();
        request.persona.role = "  ".to_string();
        assert_eq!(request.validate(), Err(RequestError::BlankPersona));

        let mut request: ProcessingRequest = serde_json::from_str(request_json()).unwrap();
        request.job_to_be_done.task = String::new();
        assert_eq!(request.validate(), Err(RequestError::BlankTask));

        let mut request: ProcessingRequest = serde_json::from_str(request_json()).unwrap();
        request.documents[1].filename = String::new();
        assert_eq!(request.validate(), Err(RequestError::BlankFilename(1)));
    }

    #[test]
    fn empty_reports_carry_the_sentinel() {
        let report = SummaryReport::empty("Analyst", "review filings");
        assert_eq!(report.cohesive_summary, EMPTY_SUMMARY_TEXT);
        assert_eq!(report.summary_word_count, 0);
        assert!(report.metadata.input_documents.is_empty());

        let analysis = AnalysisReport::empty("Analyst", "review filings");
        assert!(analysis.extracted_sections.is_empty());
        assert!(analysis.subsection_analysis.is_empty());
    }

    #[test]
    fn timestamps_use_the_compact_utc_format() {
        let stamp = timestamp();
        assert_eq!(stamp.len(), 20);
        assert!(stamp.ends_with('Z'));
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], "T");
    }
}
