//! Job posting and application routes

use axum::{
    Extension, Json, Router, middleware,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use jobboard_auth::{AuthError, AuthUser, allow_roles, require_minimum_role, role_gate};
use jobboard_db::{
    Application, Job, NewApplication, NewJob, Role, UpdateJob,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

// ==================== Types ====================

/// Create job request
#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
}

/// Update job request
#[derive(Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<Option<String>>,
    pub salary_range: Option<Option<String>>,
    pub is_open: Option<bool>,
}

/// Apply request
#[derive(Deserialize)]
pub struct ApplyRequest {
    pub cover_letter: Option<String>,
}

/// Job response
#[derive(Serialize)]
pub struct JobResponse {
    pub id: i64,
    pub employer_id: i64,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    pub is_open: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            employer_id: job.employer_id,
            title: job.title,
            description: job.description,
            location: job.location,
            salary_range: job.salary_range,
            is_open: job.is_open,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

/// Application response
#[derive(Serialize)]
pub struct ApplicationResponse {
    pub id: i64,
    pub job_id: i64,
    pub seeker_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub status: String,
    pub created_at: String,
}

impl From<Application> for ApplicationResponse {
    fn from(application: Application) -> Self {
        Self {
            id: application.id,
            job_id: application.job_id,
            seeker_id: application.seeker_id,
            cover_letter: application.cover_letter,
            status: application.status.as_str().to_string(),
            created_at: application.created_at.to_rfc3339(),
        }
    }
}

// ==================== Helpers ====================

fn actor_id(actor: &AuthUser) -> Result<i64, ApiError> {
    Ok(actor.id.ok_or(AuthError::AuthenticationRequired)?)
}

/// Non-admin employers may only touch their own postings
fn ensure_job_owner(actor: &AuthUser, job: &Job) -> Result<(), ApiError> {
    let id = actor_id(actor)?;
    let is_admin = actor.role.as_ref().is_some_and(Role::is_admin);

    if is_admin || job.employer_id == id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You do not own this job posting".to_string(),
        ))
    }
}

async fn fetch_job(state: &AppState, id: i64) -> Result<Job, ApiError> {
    state
        .db
        .get_job_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Job: {}", id)))
}

// ==================== Public Handlers ====================

/// GET /api/jobs
async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let jobs = state.db.list_open_jobs().await?;

    Ok(Json(jobs.into_iter().map(JobResponse::from).collect()))
}

/// GET /api/jobs/{id}
async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = fetch_job(&state, id).await?;

    Ok(Json(job.into()))
}

// ==================== Employer Handlers ====================

/// POST /api/jobs
async fn create_job(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    let employer_id = actor_id(&actor)?;

    debug!("Creating job posting: {}", request.title);

    let job = state
        .db
        .insert_job(NewJob {
            employer_id,
            title: request.title,
            description: request.description,
            location: request.location,
            salary_range: request.salary_range,
        })
        .await?;

    info!("Created job posting {} ({})", job.id, job.title);

    Ok((StatusCode::CREATED, Json(job.into())))
}

/// PUT /api/jobs/{id}
async fn update_job(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = fetch_job(&state, id).await?;
    ensure_job_owner(&actor, &job)?;

    state
        .db
        .update_job(
            id,
            UpdateJob {
                title: request.title,
                description: request.description,
                location: request.location,
                salary_range: request.salary_range,
                is_open: request.is_open,
            },
        )
        .await?;

    let job = fetch_job(&state, id).await?;

    info!("Updated job posting {}", id);

    Ok(Json(job.into()))
}

/// DELETE /api/jobs/{id}
async fn delete_job(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let job = fetch_job(&state, id).await?;
    ensure_job_owner(&actor, &job)?;

    state.db.delete_job(id).await?;

    info!("Deleted job posting {}", id);

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/jobs/{id}/applications
async fn list_job_applications(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ApplicationResponse>>, ApiError> {
    let job = fetch_job(&state, id).await?;
    ensure_job_owner(&actor, &job)?;

    let applications = state.db.list_applications_for_job(id).await?;

    Ok(Json(
        applications
            .into_iter()
            .map(ApplicationResponse::from)
            .collect(),
    ))
}

// ==================== Seeker Handlers ====================

/// POST /api/jobs/{id}/apply
async fn apply_to_job(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<ApplicationResponse>), ApiError> {
    let seeker_id = actor_id(&actor)?;

    let job = fetch_job(&state, id).await?;
    if !job.is_open {
        return Err(ApiError::BadRequest(
            "This job posting is closed".to_string(),
        ));
    }

    let application = state
        .db
        .insert_application(NewApplication {
            job_id: id,
            seeker_id,
            cover_letter: request.cover_letter,
        })
        .await?;

    info!("User {} applied to job {}", seeker_id, id);

    Ok((StatusCode::CREATED, Json(application.into())))
}

/// GET /api/applications/mine
async fn my_applications(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> Result<Json<Vec<ApplicationResponse>>, ApiError> {
    let seeker_id = actor_id(&actor)?;

    let applications = state.db.list_applications_for_seeker(seeker_id).await?;

    Ok(Json(
        applications
            .into_iter()
            .map(ApplicationResponse::from)
            .collect(),
    ))
}

// ==================== Routes ====================

/// Create job and application routes
///
/// Browsing is public. Posting management takes EMPLOYER or better via the
/// minimum-level gate (admins can moderate anything). Applying is an exact
/// allow-list for JOB_SEEKER: an EMPLOYER or ADMIN outranks it in the
/// hierarchy but must not be able to apply.
pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/jobs", get(list_jobs))
        .route("/api/jobs/{id}", get(get_job));

    let employer = Router::new()
        .route("/api/jobs", post(create_job))
        .route("/api/jobs/{id}", put(update_job))
        .route("/api/jobs/{id}", delete(delete_job))
        .route("/api/jobs/{id}/applications", get(list_job_applications))
        .route_layer(middleware::from_fn_with_state(
            (state.db.clone(), require_minimum_role(Role::Employer)),
            role_gate,
        ));

    let seeker = Router::new()
        .route("/api/jobs/{id}/apply", post(apply_to_job))
        .route("/api/applications/mine", get(my_applications))
        .route_layer(middleware::from_fn_with_state(
            (state.db.clone(), allow_roles([Role::JobSeeker])),
            role_gate,
        ));

    public.merge(employer).merge(seeker)
}
