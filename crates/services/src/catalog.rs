use std::path::Path;

use exam_core::model::{ContentRef, ExamCatalog};

use crate::error::CatalogLoadError;

/// Prefix the ingestion backend gives to question images it wrote locally.
pub const LOCAL_CONTENT_PREFIX: &str = "/output_images/";

/// Reads the ingestion backend's catalog payload.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoader {
    content_base: Option<String>,
}

impl CatalogLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite locally written image references to `<base>/images/<file>`.
    #[must_use]
    pub fn with_content_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.content_base = Some(base.trim_end_matches('/').to_owned());
        self
    }

    /// Parse and validate a catalog from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `CatalogLoadError::Json` for malformed payloads and
    /// `CatalogLoadError::Invalid` when the catalog breaks an invariant.
    pub fn parse_json(&self, raw: &str) -> Result<ExamCatalog, CatalogLoadError> {
        let mut catalog: ExamCatalog = serde_json::from_str(raw)?;
        catalog.validate()?;

        if let Some(base) = &self.content_base {
            for question in &mut catalog.questions {
                question.content = rebase(&question.content, base);
            }
        }

        tracing::debug!(
            title = %catalog.title,
            questions = catalog.len(),
            duration_minutes = catalog.duration_minutes,
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Read a catalog file from disk.
    ///
    /// # Errors
    ///
    /// Returns `CatalogLoadError::Io` if the file cannot be read, otherwise
    /// the errors of `parse_json`.
    pub async fn load_path(&self, path: impl AsRef<Path>) -> Result<ExamCatalog, CatalogLoadError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogLoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        self.parse_json(&raw)
    }
}

fn rebase(content: &ContentRef, base: &str) -> ContentRef {
    match content.as_str().strip_prefix(LOCAL_CONTENT_PREFIX) {
        Some(file) => ContentRef::new(format!("{base}/images/{file}")),
        None => content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{CatalogError, QuestionId, QuestionType};

    const PAYLOAD: &str = r#"{
        "examTitle": "GATE Mock Test",
        "duration": 180,
        "questions": [
            {"id": 1, "imagePath": "/output_images/q_1.png", "type": "MCQ", "marks": 1.0, "negativeMarks": 0.33, "correctAnswer": "B"},
            {"id": 2, "imagePath": "https://cdn.example/q_2.png", "type": "MSQ", "marks": 2.0, "negativeMarks": 0.0, "correctAnswer": "A;C"},
            {"id": 3, "imagePath": "/output_images/q_3.png", "type": "NAT", "marks": 2.0, "negativeMarks": 0.0, "correctAnswer": "3.14"}
        ]
    }"#;

    #[test]
    fn parses_ingestion_payload() {
        let catalog = CatalogLoader::new().parse_json(PAYLOAD).unwrap();
        assert_eq!(catalog.title, "GATE Mock Test");
        assert_eq!(catalog.duration_minutes, 180);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.questions[1].kind, QuestionType::Msq);
        assert_eq!(catalog.questions[0].negative_marks, 0.33);
        assert_eq!(catalog.questions[0].content.as_str(), "/output_images/q_1.png");
    }

    #[test]
    fn content_base_rewrites_only_local_references() {
        let catalog = CatalogLoader::new()
            .with_content_base("http://localhost:8000/")
            .parse_json(PAYLOAD)
            .unwrap();
        assert_eq!(
            catalog.questions[0].content.as_str(),
            "http://localhost:8000/images/q_1.png"
        );
        assert_eq!(catalog.questions[1].content.as_str(), "https://cdn.example/q_2.png");
    }

    #[test]
    fn empty_question_list_is_invalid() {
        let err = CatalogLoader::new()
            .parse_json(r#"{"examTitle": "x", "duration": 10, "questions": []}"#)
            .unwrap_err();
        assert!(matches!(err, CatalogLoadError::Invalid(CatalogError::Empty)));
    }

    #[test]
    fn duplicate_ids_are_invalid() {
        let raw = r#"{"duration": 10, "questions": [{"id": 5, "type": "MCQ"}, {"id": 5, "type": "NAT"}]}"#;
        let err = CatalogLoader::new().parse_json(raw).unwrap_err();
        assert!(matches!(
            err,
            CatalogLoadError::Invalid(CatalogError::DuplicateId(id)) if id == QuestionId::new(5)
        ));
    }

    #[test]
    fn unknown_type_is_a_json_error() {
        let raw = r#"{"duration": 10, "questions": [{"id": 1, "type": "ESSAY"}]}"#;
        let err = CatalogLoader::new().parse_json(raw).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Json(_)));
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = CatalogLoader::new()
            .load_path("/definitely/not/here.json")
            .await
            .unwrap_err();
        match err {
            CatalogLoadError::Io { path, .. } => {
                assert_eq!(path, Path::new("/definitely/not/here.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
