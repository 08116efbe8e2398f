//! Database repository implementation

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::DbError;
use crate::models::{CaseStudy, CaseStudyCard, NewCaseStudy, section_to_json};

/// Database connection and operations
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(database_url: &str) -> Result<Self, DbError> {
        info!("Connecting to database: {}", database_url);

        let pool = SqlitePool::connect(database_url).await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Get the underlying pool for advanced usage
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), DbError> {
        info!("Running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS case_studies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                thumbnail_image_url TEXT NOT NULL,
                thumbnail_title TEXT NOT NULL,
                service_type TEXT NOT NULL,
                case_study_title TEXT NOT NULL,
                case_study_subtitle TEXT NOT NULL,
                client_background TEXT,
                challenges TEXT,
                approach TEXT,
                impact TEXT,
                result TEXT,
                testimonial TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_case_studies_created ON case_studies(created_at)
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Insert a new case study
    pub async fn insert_case_study(&self, new: NewCaseStudy) -> Result<CaseStudy, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO case_studies (
                thumbnail_image_url, thumbnail_title, service_type,
                case_study_title, case_study_subtitle, client_background,
                challenges, approach, impact, result, testimonial,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&new.thumbnail_image_url)
        .bind(&new.thumbnail_title)
        .bind(&new.service_type)
        .bind(&new.case_study_title)
        .bind(&new.case_study_subtitle)
        .bind(&new.client_background)
        .bind(section_to_json(&new.challenges)?)
        .bind(section_to_json(&new.approach)?)
        .bind(section_to_json(&new.impact)?)
        .bind(section_to_json(&new.result)?)
        .bind(section_to_json(&new.testimonial)?)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(CaseStudy {
            id,
            thumbnail_image_url: new.thumbnail_image_url,
            thumbnail_title: new.thumbnail_title,
            service_type: new.service_type,
            case_study_title: new.case_study_title,
            case_study_subtitle: new.case_study_subtitle,
            client_background: new.client_background,
            challenges: new.challenges,
            approach: new.approach,
            impact: new.impact,
            result: new.result,
            testimonial: new.testimonial,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a case study by id
    pub async fn get_case_study(&self, id: i64) -> Result<Option<CaseStudy>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, thumbnail_image_url, thumbnail_title, service_type,
                   case_study_title, case_study_subtitle, client_background,
                   challenges, approach, impact, result, testimonial,
                   created_at, updated_at
            FROM case_studies
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| CaseStudy::try_from(&row)).transpose()
    }

    /// List case study cards, newest first
    pub async fn list_case_study_cards(&self) -> Result<Vec<CaseStudyCard>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, thumbnail_image_url, thumbnail_title, service_type,
                   case_study_title, case_study_subtitle, created_at
            FROM case_studies
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(CaseStudyCard::try_from).collect()
    }

    /// Replace a case study's content (whole-document update, preserving
    /// created_at). Returns false when no row matched.
    pub async fn update_case_study(&self, id: i64, new: NewCaseStudy) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE case_studies
            SET thumbnail_image_url = ?, thumbnail_title = ?, service_type = ?,
                case_study_title = ?, case_study_subtitle = ?, client_background = ?,
                challenges = ?, approach = ?, impact = ?, result = ?, testimonial = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&new.thumbnail_image_url)
        .bind(&new.thumbnail_title)
        .bind(&new.service_type)
        .bind(&new.case_study_title)
        .bind(&new.case_study_subtitle)
        .bind(&new.client_background)
        .bind(section_to_json(&new.challenges)?)
        .bind(section_to_json(&new.approach)?)
        .bind(section_to_json(&new.impact)?)
        .bind(section_to_json(&new.result)?)
        .bind(section_to_json(&new.testimonial)?)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a case study
    pub async fn delete_case_study(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM case_studies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all case studies (dashboard stats)
    pub async fn count_case_studies(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM case_studies")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Challenges, Outcome, SectionItem, Testimonial};

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    fn sample() -> NewCaseStudy {
        NewCaseStudy {
            thumbnail_image_url: "https://cdn.example.com/case-studies/1-thumb.png".to_string(),
            thumbnail_title: "Acme rollout".to_string(),
            service_type: "Cloud migration".to_string(),
            case_study_title: "Scaling Acme".to_string(),
            case_study_subtitle: "From one rack to three regions".to_string(),
            client_background: Some("Mid-size retailer".to_string()),
            challenges: Some(Challenges {
                challenges_list: vec![SectionItem {
                    title: "Legacy stack".to_string(),
                    description: "Monolith on aging hardware".to_string(),
                }],
                challenge_image_url: Some(
                    "https://cdn.example.com/case-studies/1-challenge.png".to_string(),
                ),
            }),
            approach: None,
            impact: None,
            result: Some(Outcome {
                result_text: Some("Cut page load by 60%".to_string()),
                result_image_url: None,
            }),
            testimonial: Some(Testimonial {
                testimonial_title: Some("CTO, Acme".to_string()),
                testimonial_text: Some("Night and day difference.".to_string()),
            }),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let db = test_db().await;

        let created = db.insert_case_study(sample()).await.unwrap();
        let fetched = db.get_case_study(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.case_study_title, "Scaling Acme");
        assert_eq!(fetched.challenges, created.challenges);
        assert_eq!(fetched.result, created.result);
        assert_eq!(fetched.testimonial, created.testimonial);
        assert!(fetched.approach.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = test_db().await;
        assert!(db.get_case_study(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_content() {
        let db = test_db().await;
        let created = db.insert_case_study(sample()).await.unwrap();

        let mut replacement = sample();
        replacement.case_study_title = "Scaling Acme, year two".to_string();
        replacement.testimonial = None;

        assert!(db.update_case_study(created.id, replacement).await.unwrap());

        let fetched = db.get_case_study(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.case_study_title, "Scaling Acme, year two");
        assert!(fetched.testimonial.is_none());
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_returns_false() {
        let db = test_db().await;
        assert!(!db.update_case_study(42, sample()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let db = test_db().await;
        let a = db.insert_case_study(sample()).await.unwrap();
        let _b = db.insert_case_study(sample()).await.unwrap();

        assert_eq!(db.count_case_studies().await.unwrap(), 2);
        assert!(db.delete_case_study(a.id).await.unwrap());
        assert!(!db.delete_case_study(a.id).await.unwrap());
        assert_eq!(db.count_case_studies().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_cards_newest_first() {
        let db = test_db().await;
        let first = db.insert_case_study(sample()).await.unwrap();
        let second = db.insert_case_study(sample()).await.unwrap();

        let cards = db.list_case_study_cards().await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, second.id);
        assert_eq!(cards[1].id, first.id);
    }

    #[tokio::test]
    async fn test_image_urls_collects_all() {
        let db = test_db().await;
        let created = db.insert_case_study(sample()).await.unwrap();

        let urls = created.image_urls();
        assert_eq!(urls.len(), 2);
        assert!(urls.contains(&"https://cdn.example.com/case-studies/1-thumb.png"));
        assert!(urls.contains(&"https://cdn.example.com/case-studies/1-challenge.png"));
    }
}
