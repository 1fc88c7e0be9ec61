//! Job posting operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Job, NewJob, UpdateJob};
use crate::repository::Database;

impl Database {
    // ==================== Job Operations ====================

    /// Insert a new job posting
    pub async fn insert_job(&self, job: NewJob) -> Result<Job, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO jobs (employer_id, title, description, location, salary_range, is_open, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING id
            "#,
        )
        .bind(job.employer_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(&job.salary_range)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Job {
            id,
            employer_id: job.employer_id,
            title: job.title,
            description: job.description,
            location: job.location,
            salary_range: job.salary_range,
            is_open: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a job by ID
    pub async fn get_job_by_id(&self, id: i64) -> Result<Option<Job>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, employer_id, title, description, location, salary_range,
                   is_open, created_at, updated_at
            FROM jobs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Job::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List open job postings, newest first
    pub async fn list_open_jobs(&self) -> Result<Vec<Job>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, employer_id, title, description, location, salary_range,
                   is_open, created_at, updated_at
            FROM jobs
            WHERE is_open = 1
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Job::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// List all job postings of one employer
    pub async fn list_jobs_by_employer(&self, employer_id: i64) -> Result<Vec<Job>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, employer_id, title, description, location, salary_range,
                   is_open, created_at, updated_at
            FROM jobs
            WHERE employer_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Job::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Update a job posting (partial update)
    pub async fn update_job(&self, id: i64, update: UpdateJob) -> Result<bool, DbError> {
        let now = Utc::now();
        let mut changed = false;

        if let Some(title) = &update.title {
            sqlx::query("UPDATE jobs SET title = ?, updated_at = ? WHERE id = ?")
                .bind(title)
                .bind(now.to_rfc3339())
                .bind(id)
                .execute(&self.pool)
                .await?;
            changed = true;
        }
        if let Some(description) = &update.description {
            sqlx::query("UPDATE jobs SET description = ?, updated_at = ? WHERE id = ?")
                .bind(description)
                .bind(now.to_rfc3339())
                .bind(id)
                .execute(&self.pool)
                .await?;
            changed = true;
        }
        if let Some(location) = &update.location {
            sqlx::query("UPDATE jobs SET location = ?, updated_at = ? WHERE id = ?")
                .bind(location)
                .bind(now.to_rfc3339())
                .bind(id)
                .execute(&self.pool)
                .await?;
            changed = true;
        }
        if let Some(salary_range) = &update.salary_range {
            sqlx::query("UPDATE jobs SET salary_range = ?, updated_at = ? WHERE id = ?")
                .bind(salary_range)
                .bind(now.to_rfc3339())
                .bind(id)
                .execute(&self.pool)
                .await?;
            changed = true;
        }
        if let Some(is_open) = update.is_open {
            sqlx::query("UPDATE jobs SET is_open = ?, updated_at = ? WHERE id = ?")
                .bind(is_open)
                .bind(now.to_rfc3339())
                .bind(id)
                .execute(&self.pool)
                .await?;
            changed = true;
        }

        Ok(changed)
    }

    /// Delete a job posting
    pub async fn delete_job(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role};

    async fn test_db_with_employer() -> (Database, i64) {
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
        (db, employer.id)
    }

    fn new_job(employer_id: i64, title: &str) -> NewJob {
        NewJob {
            employer_id,
            title: title.to_string(),
            description: "A job".to_string(),
            location: Some("Remote".to_string()),
            salary_range: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_jobs() {
        let (db, employer_id) = test_db_with_employer().await;
        let job = db.insert_job(new_job(employer_id, "Backend Engineer")).await.unwrap();
        assert!(job.is_open);

        let open = db.list_open_jobs().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].title, "Backend Engineer");

        let mine = db.list_jobs_by_employer(employer_id).await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_closed_jobs_not_listed() {
        let (db, employer_id) = test_db_with_employer().await;
        let job = db.insert_job(new_job(employer_id, "Backend Engineer")).await.unwrap();

        let update = UpdateJob {
            is_open: Some(false),
            ..Default::default()
        };
        assert!(db.update_job(job.id, update).await.unwrap());

        assert!(db.list_open_jobs().await.unwrap().is_empty());
        // Still reachable directly
        let fetched = db.get_job_by_id(job.id).await.unwrap().unwrap();
        assert!(!fetched.is_open);
    }

    #[tokio::test]
    async fn test_delete_job() {
        let (db, employer_id) = test_db_with_employer().await;
        let job = db.insert_job(new_job(employer_id, "Backend Engineer")).await.unwrap();

        assert!(db.delete_job(job.id).await.unwrap());
        assert!(db.get_job_by_id(job.id).await.unwrap().is_none());
        assert!(!db.delete_job(job.id).await.unwrap());
    }
}
