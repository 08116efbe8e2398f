//! Case-study form validation
//!
//! All checks run and every failure is collected, so a submission with
//! three problems reports three messages instead of failing one at a
//! time. The API joins the collected errors into a single 400 message.

use casedesk_db::SectionItem;

/// Maximum allowed image size (5 MiB)
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image content types
pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/webp", "image/png"];

/// Metadata of an uploaded image, as far as validation cares.
#[derive(Debug, Clone)]
pub struct ImageMeta {
    pub content_type: String,
    pub size: usize,
}

/// Raw submission extracted from the multipart form.
#[derive(Debug, Clone, Default)]
pub struct CaseStudyInput {
    pub thumbnail: Option<ImageMeta>,
    pub thumbnail_title: String,
    pub service_type: String,
    pub case_study_title: String,
    pub case_study_subtitle: String,
    pub challenges_json: Option<String>,
    pub challenge_image: Option<ImageMeta>,
    pub approach_json: Option<String>,
    pub impact_json: Option<String>,
    pub result_image: Option<ImageMeta>,
}

/// Whether the submission creates a document or edits an existing one.
/// On edit, the thumbnail may be omitted when the document already has
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Edit { has_existing_thumbnail: bool },
}

/// Collected validation outcome.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Join all errors into the client-facing message.
    pub fn into_message(self) -> String {
        self.errors.join(". ")
    }

    fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    fn extend(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }
}

/// Validate that a string field is non-empty after trimming.
fn validate_required_string(value: &str, field: &str) -> ValidationReport {
    let mut report = ValidationReport::default();
    if value.trim().is_empty() {
        report.push(format!("{} is required and cannot be empty", field));
    }
    report
}

/// Validate a required image (size and content type).
fn validate_image(image: Option<&ImageMeta>, field: &str) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(image) = image else {
        report.push(format!("{} is required", field));
        return report;
    };

    if image.size > MAX_IMAGE_BYTES {
        report.push(format!(
            "{} must be less than {}MB",
            field,
            MAX_IMAGE_BYTES / (1024 * 1024)
        ));
    }

    if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        let allowed: Vec<&str> = ALLOWED_IMAGE_TYPES
            .iter()
            .filter_map(|t| t.split('/').nth(1))
            .collect();
        report.push(format!("{} must be in {} format", field, allowed.join(", ")));
    }

    report
}

/// Validate an optional image; absence is fine.
fn validate_optional_image(image: Option<&ImageMeta>, field: &str) -> ValidationReport {
    match image {
        None => ValidationReport::default(),
        Some(_) => validate_image(image, field),
    }
}

/// Parse a JSON-encoded section list.
pub fn parse_section_items(json: &str) -> Result<Vec<SectionItem>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Validate a section list: every item needs a non-empty title and
/// description.
fn validate_section_items(items: &[SectionItem], section: &str) -> ValidationReport {
    let mut report = ValidationReport::default();

    for item in items {
        if item.title.trim().is_empty() || item.description.trim().is_empty() {
            report.push(format!(
                "Each {} item must have both title and description",
                section.to_lowercase()
            ));
            break;
        }
    }

    report
}

/// Validate an optional JSON-encoded section payload.
fn validate_section_json(json: Option<&str>, section: &str) -> ValidationReport {
    let Some(json) = json else {
        return ValidationReport::default();
    };

    match parse_section_items(json) {
        Ok(items) => validate_section_items(&items, section),
        Err(_) => {
            let mut report = ValidationReport::default();
            report.push(format!("Invalid {} list format", section.to_lowercase()));
            report
        }
    }
}

/// Validate a full case-study submission, collecting all errors.
pub fn validate_case_study(input: &CaseStudyInput, mode: ValidationMode) -> ValidationReport {
    let mut report = ValidationReport::default();

    let thumbnail_optional = matches!(
        mode,
        ValidationMode::Edit {
            has_existing_thumbnail: true
        }
    );
    if thumbnail_optional {
        report.extend(validate_optional_image(
            input.thumbnail.as_ref(),
            "Thumbnail image",
        ));
    } else {
        report.extend(validate_image(input.thumbnail.as_ref(), "Thumbnail image"));
    }

    report.extend(validate_required_string(
        &input.thumbnail_title,
        "Thumbnail title",
    ));
    report.extend(validate_required_string(&input.service_type, "Service type"));
    report.extend(validate_required_string(
        &input.case_study_title,
        "Case study title",
    ));
    report.extend(validate_required_string(
        &input.case_study_subtitle,
        "Case study subtitle",
    ));

    report.extend(validate_section_json(
        input.challenges_json.as_deref(),
        "Challenge",
    ));
    report.extend(validate_optional_image(
        input.challenge_image.as_ref(),
        "Challenge image",
    ));
    report.extend(validate_section_json(
        input.approach_json.as_deref(),
        "Approach",
    ));
    report.extend(validate_section_json(input.impact_json.as_deref(), "Impact"));
    report.extend(validate_optional_image(
        input.result_image.as_ref(),
        "Result image",
    ));

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(size: usize) -> ImageMeta {
        ImageMeta {
            content_type: "image/png".to_string(),
            size,
        }
    }

    fn complete_input() -> CaseStudyInput {
        CaseStudyInput {
            thumbnail: Some(png(1024)),
            thumbnail_title: "Acme".to_string(),
            service_type: "Migration".to_string(),
            case_study_title: "Scaling Acme".to_string(),
            case_study_subtitle: "One rack to three regions".to_string(),
            challenges_json: Some(
                r#"[{"title": "Legacy stack", "description": "Monolith"}]"#.to_string(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_input_valid() {
        let report = validate_case_study(&complete_input(), ValidationMode::Create);
        assert!(report.is_valid(), "errors: {:?}", report.errors());
    }

    #[test]
    fn test_missing_fields_all_collected() {
        let input = CaseStudyInput::default();
        let report = validate_case_study(&input, ValidationMode::Create);

        // Thumbnail plus the four required strings.
        assert_eq!(report.errors().len(), 5);
        assert!(report.errors()[0].contains("Thumbnail image is required"));
    }

    #[test]
    fn test_oversized_image_rejected() {
        let mut input = complete_input();
        input.thumbnail = Some(png(MAX_IMAGE_BYTES + 1));

        let report = validate_case_study(&input, ValidationMode::Create);
        assert_eq!(report.errors().len(), 1);
        assert!(report.errors()[0].contains("less than 5MB"));
    }

    #[test]
    fn test_wrong_content_type_rejected() {
        let mut input = complete_input();
        input.thumbnail = Some(ImageMeta {
            content_type: "image/gif".to_string(),
            size: 1024,
        });

        let report = validate_case_study(&input, ValidationMode::Create);
        assert_eq!(report.errors().len(), 1);
        assert!(report.errors()[0].contains("format"));
    }

    #[test]
    fn test_edit_mode_thumbnail_optional_with_existing() {
        let mut input = complete_input();
        input.thumbnail = None;

        let report = validate_case_study(
            &input,
            ValidationMode::Edit {
                has_existing_thumbnail: true,
            },
        );
        assert!(report.is_valid());

        let report = validate_case_study(
            &input,
            ValidationMode::Edit {
                has_existing_thumbnail: false,
            },
        );
        assert!(!report.is_valid());
    }

    #[test]
    fn test_section_item_needs_both_halves() {
        let mut input = complete_input();
        input.challenges_json =
            Some(r#"[{"title": "Legacy stack", "description": "  "}]"#.to_string());

        let report = validate_case_study(&input, ValidationMode::Create);
        assert_eq!(report.errors().len(), 1);
        assert!(report.errors()[0].contains("title and description"));
    }

    #[test]
    fn test_malformed_section_json() {
        let mut input = complete_input();
        input.impact_json = Some("not json".to_string());

        let report = validate_case_study(&input, ValidationMode::Create);
        assert_eq!(report.errors().len(), 1);
        assert!(report.errors()[0].contains("Invalid impact list format"));
    }

    #[test]
    fn test_into_message_joins_errors() {
        let input = CaseStudyInput::default();
        let message = validate_case_study(&input, ValidationMode::Create).into_message();
        assert!(message.contains(". "));
    }
}
