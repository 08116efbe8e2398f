//! Case-study CRUD routes
//!
//! Reads are open (the public site consumes them); every mutation goes
//! through the [`RequireAuth`] fine gate, re-validates the submitted
//! form, and invalidates the listing cache on success. Image handling
//! is conditional: an edit only touches the object store when a
//! replacement file is actually submitted, and stale objects are
//! removed best-effort so a storage hiccup never fails the request.

use axum::{
    Json, Router,
    extract::{
        Multipart, Path, State,
        multipart::{Field, MultipartError},
    },
    routing::{delete, get, post, put},
};
use bytes::Bytes;
use casedesk_core::{
    CaseStudyInput, ImageMeta, ValidationMode, parse_section_items, validate_case_study,
};
use casedesk_db::{Approach, CaseStudy, CaseStudyCard, Challenges, Impact, NewCaseStudy, Outcome, Testimonial};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::routes::auth::RequireAuth;
use crate::state::AppState;

// ==================== Types ====================

/// Create response
#[derive(Serialize)]
pub struct CreateResponse {
    pub success: bool,
    pub id: i64,
    pub message: String,
}

/// Mutation acknowledgement
#[derive(Serialize)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
}

/// An image file pulled out of the multipart form
struct UploadedImage {
    data: Bytes,
    filename: String,
    content_type: String,
}

/// The raw multipart submission, one field per form name
#[derive(Default)]
struct CaseStudyForm {
    thumbnail: Option<UploadedImage>,
    thumbnail_title: String,
    service_type: String,
    case_study_title: String,
    case_study_subtitle: String,
    client_background: Option<String>,
    challenges_json: Option<String>,
    challenge_image: Option<UploadedImage>,
    approach_json: Option<String>,
    approach_title: Option<String>,
    impact_json: Option<String>,
    impact_title: Option<String>,
    result_text: Option<String>,
    result_image: Option<UploadedImage>,
    testimonial_title: Option<String>,
    testimonial_text: Option<String>,
}

// ==================== Form Parsing ====================

fn bad_multipart(e: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid form data: {}", e))
}

/// Read an image field. A file input submitted with no file arrives as
/// an empty part, which counts as "no image".
async fn read_image(field: Field<'_>) -> Result<Option<UploadedImage>, ApiError> {
    let filename = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field.bytes().await.map_err(bad_multipart)?;

    if data.is_empty() {
        return Ok(None);
    }

    Ok(Some(UploadedImage {
        data,
        filename,
        content_type,
    }))
}

/// Read an optional text field; an empty string means absent.
async fn read_optional_text(field: Field<'_>) -> Result<Option<String>, ApiError> {
    let text = field.text().await.map_err(bad_multipart)?;
    Ok(if text.is_empty() { None } else { Some(text) })
}

/// Drain the multipart stream into a [`CaseStudyForm`].
async fn read_form(mut multipart: Multipart) -> Result<CaseStudyForm, ApiError> {
    let mut form = CaseStudyForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "thumbnailImage" => form.thumbnail = read_image(field).await?,
            "challengeImage" => form.challenge_image = read_image(field).await?,
            "resultImage" => form.result_image = read_image(field).await?,
            "thumbnailTitle" => form.thumbnail_title = field.text().await.map_err(bad_multipart)?,
            "serviceType" => form.service_type = field.text().await.map_err(bad_multipart)?,
            "caseStudyTitle" => {
                form.case_study_title = field.text().await.map_err(bad_multipart)?
            }
            "caseStudySubtitle" => {
                form.case_study_subtitle = field.text().await.map_err(bad_multipart)?
            }
            "clientBackground" => form.client_background = read_optional_text(field).await?,
            "challengesList" => form.challenges_json = read_optional_text(field).await?,
            "approachList" => form.approach_json = read_optional_text(field).await?,
            "approachTitle" => form.approach_title = read_optional_text(field).await?,
            "impactList" => form.impact_json = read_optional_text(field).await?,
            "impactTitle" => form.impact_title = read_optional_text(field).await?,
            "resultText" => form.result_text = read_optional_text(field).await?,
            "testimonialTitle" => form.testimonial_title = read_optional_text(field).await?,
            "testimonialText" => form.testimonial_text = read_optional_text(field).await?,
            _ => debug!("Ignoring unknown form field: {}", name),
        }
    }

    Ok(form)
}

/// The validation-facing view of a form (metadata only, no bytes).
fn input_meta(form: &CaseStudyForm) -> CaseStudyInput {
    let meta = |image: &Option<UploadedImage>| {
        image.as_ref().map(|i| ImageMeta {
            content_type: i.content_type.clone(),
            size: i.data.len(),
        })
    };

    CaseStudyInput {
        thumbnail: meta(&form.thumbnail),
        thumbnail_title: form.thumbnail_title.clone(),
        service_type: form.service_type.clone(),
        case_study_title: form.case_study_title.clone(),
        case_study_subtitle: form.case_study_subtitle.clone(),
        challenges_json: form.challenges_json.clone(),
        challenge_image: meta(&form.challenge_image),
        approach_json: form.approach_json.clone(),
        impact_json: form.impact_json.clone(),
        result_image: meta(&form.result_image),
    }
}

// ==================== Image Helpers ====================

async fn upload_image(state: &AppState, image: UploadedImage) -> Result<String, ApiError> {
    let url = state
        .images
        .upload(image.data, &image.filename, &image.content_type)
        .await?;
    debug!("Uploaded image: {}", url);
    Ok(url)
}

/// Delete a stored image, logging failures instead of propagating them.
async fn delete_image_best_effort(state: &AppState, url: &str) {
    match state.images.delete(url).await {
        Ok(true) => debug!("Deleted stored image: {}", url),
        Ok(false) => warn!("Stored image already gone: {}", url),
        Err(e) => warn!("Failed to delete stored image {}: {}", url, e),
    }
}

/// Resolve an image slot: keep the existing URL unless a replacement
/// was uploaded, in which case the old object is removed first.
async fn resolve_image(
    state: &AppState,
    replacement: Option<UploadedImage>,
    existing: Option<String>,
) -> Result<Option<String>, ApiError> {
    match replacement {
        None => Ok(existing),
        Some(image) => {
            if let Some(old) = existing {
                delete_image_best_effort(state, &old).await;
            }
            Ok(Some(upload_image(state, image).await?))
        }
    }
}

// ==================== Document Assembly ====================

fn parse_items(json: &str, section: &str) -> Result<Vec<casedesk_db::SectionItem>, ApiError> {
    parse_section_items(json)
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} list format", section)))
}

/// Build the replacement document from the validated form. `existing`
/// supplies the image URLs an edit keeps when no new file is uploaded.
async fn assemble_document(
    state: &AppState,
    mut form: CaseStudyForm,
    thumbnail_url: String,
    existing: Option<&CaseStudy>,
) -> Result<NewCaseStudy, ApiError> {
    let old_challenge_url = existing
        .and_then(|c| c.challenges.as_ref())
        .and_then(|c| c.challenge_image_url.clone());
    let old_result_url = existing
        .and_then(|c| c.result.as_ref())
        .and_then(|r| r.result_image_url.clone());

    let challenges = match form.challenges_json.as_deref() {
        None => None,
        Some(json) => {
            let items = parse_items(json, "challenge")?;
            let image_url =
                resolve_image(state, form.challenge_image.take(), old_challenge_url).await?;
            Some(Challenges {
                challenges_list: items,
                challenge_image_url: image_url,
            })
        }
    };

    let approach = match form.approach_json.as_deref() {
        None => None,
        Some(json) => Some(Approach {
            approach_title: form.approach_title.take(),
            approach_list: parse_items(json, "approach")?,
        }),
    };

    let impact = match form.impact_json.as_deref() {
        None => None,
        Some(json) => Some(Impact {
            impact_title: form.impact_title.take(),
            impact_list: parse_items(json, "impact")?,
        }),
    };

    let result = if form.result_text.is_some() || form.result_image.is_some() {
        let image_url = resolve_image(state, form.result_image.take(), old_result_url).await?;
        Some(Outcome {
            result_text: form.result_text.take(),
            result_image_url: image_url,
        })
    } else {
        None
    };

    let testimonial = if form.testimonial_title.is_some() || form.testimonial_text.is_some() {
        Some(Testimonial {
            testimonial_title: form.testimonial_title.take(),
            testimonial_text: form.testimonial_text.take(),
        })
    } else {
        None
    };

    Ok(NewCaseStudy {
        thumbnail_image_url: thumbnail_url,
        thumbnail_title: form.thumbnail_title,
        service_type: form.service_type,
        case_study_title: form.case_study_title,
        case_study_subtitle: form.case_study_subtitle,
        client_background: form.client_background,
        challenges,
        approach,
        impact,
        result,
        testimonial,
    })
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest("Invalid case study ID format".to_string()))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Case study not found".to_string())
}

// ==================== Handlers ====================

/// GET /api/case-study
async fn list_case_studies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CaseStudyCard>>, ApiError> {
    if let Some(cards) = state.listing.get() {
        debug!("Serving case-study listing from cache");
        return Ok(Json(cards));
    }

    let cards = state.db.list_case_study_cards().await?;
    state.listing.store(cards.clone());

    Ok(Json(cards))
}

/// GET /api/case-study/{id}
async fn get_case_study(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CaseStudy>, ApiError> {
    let id = parse_id(&id)?;

    let case_study = state.db.get_case_study(id).await?.ok_or_else(not_found)?;

    Ok(Json(case_study))
}

/// POST /api/case-study
async fn create_case_study(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    multipart: Multipart,
) -> Result<Json<CreateResponse>, ApiError> {
    let mut form = read_form(multipart).await?;

    let report = validate_case_study(&input_meta(&form), ValidationMode::Create);
    if !report.is_valid() {
        return Err(ApiError::BadRequest(report.into_message()));
    }

    let thumbnail = form
        .thumbnail
        .take()
        .ok_or_else(|| ApiError::BadRequest("Thumbnail image is required".to_string()))?;
    let thumbnail_url = upload_image(&state, thumbnail).await?;

    let document = assemble_document(&state, form, thumbnail_url, None).await?;
    let case_study = state.db.insert_case_study(document).await?;

    state.listing.invalidate();
    info!("Created case study {}", case_study.id);

    Ok(Json(CreateResponse {
        success: true,
        id: case_study.id,
        message: "Case study created successfully".to_string(),
    }))
}

/// PUT /api/case-study/{id}
async fn update_case_study(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RequireAuth(_claims): RequireAuth,
    multipart: Multipart,
) -> Result<Json<MutationResponse>, ApiError> {
    let id = parse_id(&id)?;

    let existing = state.db.get_case_study(id).await?.ok_or_else(not_found)?;

    let mut form = read_form(multipart).await?;

    let has_existing_thumbnail = !existing.thumbnail_image_url.is_empty();
    let report = validate_case_study(
        &input_meta(&form),
        ValidationMode::Edit {
            has_existing_thumbnail,
        },
    );
    if !report.is_valid() {
        return Err(ApiError::BadRequest(report.into_message()));
    }

    let existing_thumbnail = has_existing_thumbnail.then(|| existing.thumbnail_image_url.clone());
    let thumbnail_url = resolve_image(&state, form.thumbnail.take(), existing_thumbnail)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Thumbnail image is required".to_string()))?;

    let document = assemble_document(&state, form, thumbnail_url, Some(&existing)).await?;

    if !state.db.update_case_study(id, document).await? {
        return Err(not_found());
    }

    state.listing.invalidate();
    info!("Updated case study {}", id);

    Ok(Json(MutationResponse {
        success: true,
        message: "Case study updated successfully".to_string(),
    }))
}

/// DELETE /api/case-study/{id}
async fn delete_case_study(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RequireAuth(_claims): RequireAuth,
) -> Result<Json<MutationResponse>, ApiError> {
    let id = parse_id(&id)?;

    let existing = state.db.get_case_study(id).await?.ok_or_else(not_found)?;

    if !state.db.delete_case_study(id).await? {
        return Err(not_found());
    }

    // The row is gone; orphaned objects are worse than a failed cleanup
    // log line, but not worth failing the request over.
    for url in existing.image_urls() {
        delete_image_best_effort(&state, url).await;
    }

    state.listing.invalidate();
    info!("Deleted case study {}", id);

    Ok(Json(MutationResponse {
        success: true,
        message: "Case study deleted successfully".to_string(),
    }))
}

// ==================== Routes ====================

/// Create case-study routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/case-study", get(list_case_studies))
        .route("/api/case-study", post(create_case_study))
        .route("/api/case-study/{id}", get(get_case_study))
        .route("/api/case-study/{id}", put(update_case_study))
        .route("/api/case-study/{id}", delete(delete_case_study))
}
