//! Database models
//!
//! A case study is one document: a handful of required headline fields
//! plus optional narrative sections. The sections round-trip through
//! JSON TEXT columns; field names serialize in camelCase to stay
//! wire-compatible with existing clients.

use crate::error::DbError;
use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// A titled paragraph inside a section list (challenges, approach, impact).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionItem {
    pub title: String,
    pub description: String,
}

/// Challenges section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Challenges {
    pub challenges_list: Vec<SectionItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_image_url: Option<String>,
}

/// Approach section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Approach {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approach_title: Option<String>,
    pub approach_list: Vec<SectionItem>,
}

/// Impact section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Impact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_title: Option<String>,
    pub impact_list: Vec<SectionItem>,
}

/// Result section (closing text and optional image)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_image_url: Option<String>,
}

/// Testimonial section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testimonial_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testimonial_text: Option<String>,
}

/// Full case study document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudy {
    pub id: i64,
    pub thumbnail_image_url: String,
    pub thumbnail_title: String,
    pub service_type: String,
    pub case_study_title: String,
    pub case_study_subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenges: Option<Challenges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approach: Option<Approach>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<Impact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testimonial: Option<Testimonial>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CaseStudy {
    /// Every image URL referenced by this document. Used for storage
    /// cleanup when the document is deleted.
    pub fn image_urls(&self) -> Vec<&str> {
        let mut urls = vec![self.thumbnail_image_url.as_str()];
        if let Some(url) = self
            .challenges
            .as_ref()
            .and_then(|c| c.challenge_image_url.as_deref())
        {
            urls.push(url);
        }
        if let Some(url) = self
            .result
            .as_ref()
            .and_then(|r| r.result_image_url.as_deref())
        {
            urls.push(url);
        }
        urls
    }
}

/// Listing subset of a case study (the public cards page)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyCard {
    pub id: i64,
    pub thumbnail_image_url: String,
    pub thumbnail_title: String,
    pub service_type: String,
    pub case_study_title: String,
    pub case_study_subtitle: String,
    pub created_at: DateTime<Utc>,
}

/// New or replacement case study content (for insertion and full-document
/// updates; the original store applied updates as a whole-document set)
#[derive(Debug, Clone, Default)]
pub struct NewCaseStudy {
    pub thumbnail_image_url: String,
    pub thumbnail_title: String,
    pub service_type: String,
    pub case_study_title: String,
    pub case_study_subtitle: String,
    pub client_background: Option<String>,
    pub challenges: Option<Challenges>,
    pub approach: Option<Approach>,
    pub impact: Option<Impact>,
    pub result: Option<Outcome>,
    pub testimonial: Option<Testimonial>,
}

/// Serialize an optional section into its JSON column value.
pub(crate) fn section_to_json<T: Serialize>(section: &Option<T>) -> Result<Option<String>, DbError> {
    section
        .as_ref()
        .map(|s| serde_json::to_string(s).map_err(DbError::from))
        .transpose()
}

/// Parse an optional JSON column back into a section.
fn section_from_json<T: for<'de> Deserialize<'de>>(
    value: Option<String>,
) -> Result<Option<T>, DbError> {
    value
        .map(|s| serde_json::from_str(&s).map_err(DbError::from))
        .transpose()
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for CaseStudy {
    type Error = DbError;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(CaseStudy {
            id: row.try_get("id").map_err(DbError::Connection)?,
            thumbnail_image_url: row
                .try_get("thumbnail_image_url")
                .map_err(DbError::Connection)?,
            thumbnail_title: row.try_get("thumbnail_title").map_err(DbError::Connection)?,
            service_type: row.try_get("service_type").map_err(DbError::Connection)?,
            case_study_title: row
                .try_get("case_study_title")
                .map_err(DbError::Connection)?,
            case_study_subtitle: row
                .try_get("case_study_subtitle")
                .map_err(DbError::Connection)?,
            client_background: row
                .try_get("client_background")
                .map_err(DbError::Connection)?,
            challenges: section_from_json(
                row.try_get("challenges").map_err(DbError::Connection)?,
            )?,
            approach: section_from_json(row.try_get("approach").map_err(DbError::Connection)?)?,
            impact: section_from_json(row.try_get("impact").map_err(DbError::Connection)?)?,
            result: section_from_json(row.try_get("result").map_err(DbError::Connection)?)?,
            testimonial: section_from_json(
                row.try_get("testimonial").map_err(DbError::Connection)?,
            )?,
            created_at: parse_datetime_or_now(
                &row.try_get::<String, _>("created_at")
                    .map_err(DbError::Connection)?,
            ),
            updated_at: parse_datetime_or_now(
                &row.try_get::<String, _>("updated_at")
                    .map_err(DbError::Connection)?,
            ),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for CaseStudyCard {
    type Error = DbError;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(CaseStudyCard {
            id: row.try_get("id").map_err(DbError::Connection)?,
            thumbnail_image_url: row
                .try_get("thumbnail_image_url")
                .map_err(DbError::Connection)?,
            thumbnail_title: row.try_get("thumbnail_title").map_err(DbError::Connection)?,
            service_type: row.try_get("service_type").map_err(DbError::Connection)?,
            case_study_title: row
                .try_get("case_study_title")
                .map_err(DbError::Connection)?,
            case_study_subtitle: row
                .try_get("case_study_subtitle")
                .map_err(DbError::Connection)?,
            created_at: parse_datetime_or_now(
                &row.try_get::<String, _>("created_at")
                    .map_err(DbError::Connection)?,
            ),
        })
    }
}
