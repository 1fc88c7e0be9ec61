//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidRole(String),
    InvalidApplicationStatus(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidRole(s) => write!(f, "Invalid role: {}", s),
            ParseError::InvalidApplicationStatus(s) => {
                write!(f, "Invalid application status: {}", s)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// User role
///
/// The closed set of caller categories. Privilege is expressed solely
/// through [`Role::level`]; nothing else may encode relative privilege.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Employer,
    JobSeeker,
}

impl Role {
    /// All defined roles, in descending privilege order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Employer, Role::JobSeeker];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Employer => "EMPLOYER",
            Role::JobSeeker => "JOB_SEEKER",
        }
    }

    /// Hierarchy level, strictly increasing with privilege.
    ///
    /// This table is the single source of truth for the role hierarchy.
    /// Unknown role strings (which cannot become a `Role`) are treated as
    /// level 0 by the string-domain predicates in the auth crate.
    pub fn level(&self) -> u8 {
        match self {
            Role::JobSeeker => 1,
            Role::Employer => 2,
            Role::Admin => 3,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "EMPLOYER" => Ok(Role::Employer),
            "JOB_SEEKER" => Ok(Role::JobSeeker),
            _ => Err(ParseError::InvalidRole(s.to_string())),
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub phone: Option<String>,
    /// Employer profile field
    pub company_name: Option<String>,
    /// Job seeker profile field
    pub resume: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
}

/// Profile fields a user may update (partial update)
#[derive(Debug, Clone, Default)]
pub struct UpdateUserProfile {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub company_name: Option<Option<String>>,
    pub resume: Option<Option<String>>,
}

/// Job posting model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub employer_id: i64,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New job posting (for insertion)
#[derive(Debug, Clone)]
pub struct NewJob {
    pub employer_id: i64,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
}

/// Update job posting (for partial updates)
#[derive(Debug, Clone, Default)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<Option<String>>,
    pub salary_range: Option<Option<String>>,
    pub is_open: Option<bool>,
}

/// Job application status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(ParseError::InvalidApplicationStatus(s.to_string())),
        }
    }
}

/// Job application model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub seeker_id: i64,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// New job application (for insertion)
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: i64,
    pub seeker_id: i64,
    pub cover_letter: Option<String>,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let role_str: String = row.try_get("role")?;
        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            name: row.try_get("name")?,
            // A corrupted role column degrades to the least-privileged role
            role: Role::from_str(&role_str).unwrap_or(Role::JobSeeker),
            is_active: row.try_get("is_active")?,
            phone: row.try_get("phone")?,
            company_name: row.try_get("company_name")?,
            resume: row.try_get("resume")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Job {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.try_get("id")?,
            employer_id: row.try_get("employer_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            location: row.try_get("location")?,
            salary_range: row.try_get("salary_range")?,
            is_open: row.try_get("is_open")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Application {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let status_str: String = row.try_get("status")?;
        Ok(Application {
            id: row.try_get("id")?,
            job_id: row.try_get("job_id")?,
            seeker_id: row.try_get("seeker_id")?,
            cover_letter: row.try_get("cover_letter")?,
            status: ApplicationStatus::from_str(&status_str).unwrap_or(ApplicationStatus::Pending),
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
        assert!(Role::from_str("bogus").is_err());
        assert!(Role::from_str("admin").is_err());
    }

    #[test]
    fn test_role_levels_unique_and_ordered() {
        // JOB_SEEKER=1 < EMPLOYER=2 < ADMIN=3
        assert_eq!(Role::JobSeeker.level(), 1);
        assert_eq!(Role::Employer.level(), 2);
        assert_eq!(Role::Admin.level(), 3);

        let mut levels: Vec<u8> = Role::ALL.iter().map(Role::level).collect();
        levels.sort_unstable();
        levels.dedup();
        assert_eq!(levels.len(), Role::ALL.len());
    }

    #[test]
    fn test_role_serde_wire_format() {
        assert_eq!(serde_json::to_string(&Role::JobSeeker).unwrap(), "\"JOB_SEEKER\"");
        let parsed: Role = serde_json::from_str("\"EMPLOYER\"").unwrap();
        assert_eq!(parsed, Role::Employer);
    }
}
