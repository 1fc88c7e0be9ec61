//! Job application operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Application, ApplicationStatus, NewApplication};
use crate::repository::Database;

impl Database {
    // ==================== Application Operations ====================

    /// Insert a new application
    ///
    /// A seeker may apply to a given job at most once.
    pub async fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, DbError> {
        let now = Utc::now();

        let existing = sqlx::query(
            "SELECT id FROM applications WHERE job_id = ? AND seeker_id = ?",
        )
        .bind(application.job_id)
        .bind(application.seeker_id)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(DbError::Duplicate(format!(
                "Application for job {} already exists",
                application.job_id
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO applications (job_id, seeker_id, cover_letter, status, created_at)
            VALUES (?, ?, ?, 'pending', ?)
            RETURNING id
            "#,
        )
        .bind(application.job_id)
        .bind(application.seeker_id)
        .bind(&application.cover_letter)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Application {
            id,
            job_id: application.job_id,
            seeker_id: application.seeker_id,
            cover_letter: application.cover_letter,
            status: ApplicationStatus::Pending,
            created_at: now,
        })
    }

    /// List applications for a job
    pub async fn list_applications_for_job(&self, job_id: i64) -> Result<Vec<Application>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, job_id, seeker_id, cover_letter, status, created_at
            FROM applications
            WHERE job_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Application::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// List applications submitted by a seeker
    pub async fn list_applications_for_seeker(
        &self,
        seeker_id: i64,
    ) -> Result<Vec<Application>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, job_id, seeker_id, cover_letter, status, created_at
            FROM applications
            WHERE seeker_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(seeker_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Application::try_from(row).map_err(DbError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewJob, NewUser, Role};

    async fn seed() -> (Database, i64, i64) {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let employer = db
            .insert_user(NewUser {
                email: "employer@example.com".to_string(),
                password_hash: "hash".to_string(),
                name: "Employer".to_string(),
                role: Role::Employer,
            })
            .await
            .unwrap();
        let seeker = db
            .insert_user(NewUser {
                email: "seeker@example.com".to_string(),
                password_hash: "hash".to_string(),
                name: "Seeker".to_string(),
                role: Role::JobSeeker,
            })
            .await
            .unwrap();
        let job = db
            .insert_job(NewJob {
                employer_id: employer.id,
                title: "Backend Engineer".to_string(),
                description: "A job".to_string(),
                location: None,
                salary_range: None,
            })
            .await
            .unwrap();
        (db, job.id, seeker.id)
    }

    #[tokio::test]
    async fn test_apply_and_list() {
        let (db, job_id, seeker_id) = seed().await;

        let application = db
            .insert_application(NewApplication {
                job_id,
                seeker_id,
                cover_letter: Some("Hello".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(application.status, ApplicationStatus::Pending);

        let for_job = db.list_applications_for_job(job_id).await.unwrap();
        assert_eq!(for_job.len(), 1);

        let mine = db.list_applications_for_seeker(seeker_id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, application.id);
    }

    #[tokio::test]
    async fn test_duplicate_application_rejected() {
        let (db, job_id, seeker_id) = seed().await;

        db.insert_application(NewApplication {
            job_id,
            seeker_id,
            cover_letter: None,
        })
        .await
        .unwrap();

        let err = db
            .insert_application(NewApplication {
                job_id,
                seeker_id,
                cover_letter: None,
            })
            .await;
        assert!(matches!(err, Err(DbError::Duplicate(_))));
    }
}
