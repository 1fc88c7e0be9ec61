//! User operations

use chrono::Utc;
use sqlx::Row;
use std::str::FromStr;

use crate::error::DbError;
use crate::models::{NewUser, Role, UpdateUserProfile, User};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        // Check if user already exists
        let existing = self.get_user_by_email(&user.email).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!(
                "User '{}' already exists",
                user.email
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, name, role, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, 1, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            is_active: true,
            phone: None,
            company_name: None,
            resume: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, email, password_hash, name, role, is_active,
                   phone, company_name, resume, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, email, password_hash, name, role, is_active,
                   phone, company_name, resume, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Look up only the role of a user by ID
    ///
    /// Projects the role column alone; the authorization layer calls this on
    /// every request that misses its per-request cache, so no other user
    /// fields are fetched.
    pub async fn find_role_by_id(&self, id: i64) -> Result<Option<Role>, DbError> {
        let result = sqlx::query("SELECT role FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result.map(|row| {
            let role_str: String = row.get("role");
            Role::from_str(&role_str).unwrap_or(Role::JobSeeker)
        }))
    }

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, password_hash, name, role, is_active,
                   phone, company_name, resume, created_at, updated_at
            FROM users
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Update user role
    pub async fn update_user_role(&self, id: i64, role: Role) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(role.as_str())
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update user password
    pub async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(password_hash)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update user profile fields (partial update)
    pub async fn update_user_profile(
        &self,
        id: i64,
        update: UpdateUserProfile,
    ) -> Result<bool, DbError> {
        let now = Utc::now();
        let mut changed = false;

        if let Some(name) = &update.name {
            sqlx::query("UPDATE users SET name = ?, updated_at = ? WHERE id = ?")
                .bind(name)
                .bind(now.to_rfc3339())
                .bind(id)
                .execute(&self.pool)
                .await?;
            changed = true;
        }
        if let Some(phone) = &update.phone {
            sqlx::query("UPDATE users SET phone = ?, updated_at = ? WHERE id = ?")
                .bind(phone)
                .bind(now.to_rfc3339())
                .bind(id)
                .execute(&self.pool)
                .await?;
            changed = true;
        }
        if let Some(company_name) = &update.company_name {
            sqlx::query("UPDATE users SET company_name = ?, updated_at = ? WHERE id = ?")
                .bind(company_name)
                .bind(now.to_rfc3339())
                .bind(id)
                .execute(&self.pool)
                .await?;
            changed = true;
        }
        if let Some(resume) = &update.resume {
            sqlx::query("UPDATE users SET resume = ?, updated_at = ? WHERE id = ?")
                .bind(resume)
                .bind(now.to_rfc3339())
                .bind(id)
                .execute(&self.pool)
                .await?;
            changed = true;
        }

        Ok(changed)
    }

    /// Update user active flag
    pub async fn update_user_active(&self, id: i64, is_active: bool) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(is_active)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user
    pub async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check if any users exist
    pub async fn has_users(&self) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }
}
