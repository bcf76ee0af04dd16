//! Vulnerability API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rb_core::vulnerability::{Severity, Vulnerability, VulnerabilityStatus};

use crate::routes::{bad_request, internal_error, not_found, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVulnerabilityRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub severity: Severity,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVulnerabilityRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub status: Option<VulnerabilityStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityResponse {
    pub id: Uuid,
    pub subdomain_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub status: VulnerabilityStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Vulnerability> for VulnerabilityResponse {
    fn from(vuln: Vulnerability) -> Self {
        Self {
            id: vuln.id,
            subdomain_id: vuln.subdomain_id,
            project_id: vuln.project_id,
            title: vuln.title,
            description: vuln.description,
            severity: vuln.severity,
            status: vuln.status,
            created_at: vuln.created_at.to_rfc3339(),
            updated_at: vuln.updated_at.to_rfc3339(),
        }
    }
}

/// GET /api/subdomains/:id/vulnerabilities - List findings for a subdomain
async fn list_vulnerabilities(
    State(state): State<AppState>,
    Path(subdomain_id): Path<Uuid>,
) -> Result<Json<Vec<VulnerabilityResponse>>, ApiError> {
    if state.subdomains().get(subdomain_id).await.is_none() {
        return Err(not_found(format!("Subdomain {} not found", subdomain_id)));
    }

    let vulns = state.vulnerabilities().list_by_subdomain(subdomain_id).await;
    Ok(Json(
        vulns.into_iter().map(VulnerabilityResponse::from).collect(),
    ))
}

/// POST /api/subdomains/:id/vulnerabilities - Record a finding
async fn create_vulnerability(
    State(state): State<AppState>,
    Path(subdomain_id): Path<Uuid>,
    Json(req): Json<CreateVulnerabilityRequest>,
) -> Result<(StatusCode, Json<VulnerabilityResponse>), ApiError> {
    if req.title.trim().is_empty() {
        return Err(bad_request("Title cannot be empty"));
    }

    let subdomain = state
        .subdomains()
        .get(subdomain_id)
        .await
        .ok_or_else(|| not_found(format!("Subdomain {} not found", subdomain_id)))?;

    let mut vuln = Vulnerability::new(subdomain.id, subdomain.project_id, req.title, req.severity);
    if let Some(description) = req.description {
        vuln = vuln.with_description(description);
    }

    let created = state
        .vulnerabilities()
        .create(vuln)
        .await
        .map_err(internal_error)?;

    sync_project_counter(&state, subdomain.project_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(VulnerabilityResponse::from(created)),
    ))
}

/// Re-derive the project's finding counter from the store so creates
/// and deletes cannot drift it
async fn sync_project_counter(state: &AppState, project_id: Uuid) -> Result<(), ApiError> {
    if let Some(mut project) = state.projects().get(project_id).await {
        project.vulnerabilities_found = state.vulnerabilities().list_by_project(project_id).await.len();
        state
            .projects()
            .update(project)
            .await
            .map_err(internal_error)?;
    }
    Ok(())
}

/// GET /api/vulnerabilities/:id - Get a single finding
async fn get_vulnerability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VulnerabilityResponse>, ApiError> {
    match state.vulnerabilities().get(id).await {
        Some(vuln) => Ok(Json(VulnerabilityResponse::from(vuln))),
        None => Err(not_found(format!("Vulnerability {} not found", id))),
    }
}

/// PATCH /api/vulnerabilities/:id - Update a finding
async fn update_vulnerability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateVulnerabilityRequest>,
) -> Result<Json<VulnerabilityResponse>, ApiError> {
    let mut vuln = state
        .vulnerabilities()
        .get(id)
        .await
        .ok_or_else(|| not_found(format!("Vulnerability {} not found", id)))?;

    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(bad_request("Title cannot be empty"));
        }
        vuln.title = title;
    }
    if let Some(description) = req.description {
        vuln.description = Some(description);
    }
    if let Some(severity) = req.severity {
        vuln.severity = severity;
    }
    if let Some(status) = req.status {
        vuln.status = status;
    }

    let updated = state
        .vulnerabilities()
        .update(vuln)
        .await
        .map_err(internal_error)?;

    Ok(Json(VulnerabilityResponse::from(updated)))
}

/// DELETE /api/vulnerabilities/:id - Delete a finding
async fn delete_vulnerability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let vuln = state
        .vulnerabilities()
        .get(id)
        .await
        .ok_or_else(|| not_found(format!("Vulnerability {} not found", id)))?;

    state
        .vulnerabilities()
        .delete(id)
        .await
        .map_err(internal_error)?;
    sync_project_counter(&state, vuln.project_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/subdomains/{id}/vulnerabilities",
            get(list_vulnerabilities).post(create_vulnerability),
        )
        .route(
            "/api/vulnerabilities/{id}",
            get(get_vulnerability)
                .patch(update_vulnerability)
                .delete(delete_vulnerability),
        )
}
