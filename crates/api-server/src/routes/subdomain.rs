//! Subdomain API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rb_core::subdomain::{DiscoveryMethod, Subdomain, SubdomainStatus};

use crate::routes::{bad_request, internal_error, not_found, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubdomainRequest {
    pub hostname: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubdomainResponse {
    pub id: Uuid,
    pub hostname: String,
    pub project_id: Uuid,
    pub discovery_method: DiscoveryMethod,
    pub status: SubdomainStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Subdomain> for SubdomainResponse {
    fn from(subdomain: Subdomain) -> Self {
        Self {
            id: subdomain.id,
            hostname: subdomain.hostname,
            project_id: subdomain.project_id,
            discovery_method: subdomain.discovery_method,
            status: subdomain.status,
            created_at: subdomain.created_at.to_rfc3339(),
            updated_at: subdomain.updated_at.to_rfc3339(),
        }
    }
}

/// GET /api/projects/:id/subdomains - List a project's subdomains
async fn list_subdomains(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<SubdomainResponse>>, ApiError> {
    if state.projects().get(project_id).await.is_none() {
        return Err(not_found(format!("Project {} not found", project_id)));
    }

    let subdomains = state.subdomains().list_by_project(project_id).await;
    Ok(Json(
        subdomains.into_iter().map(SubdomainResponse::from).collect(),
    ))
}

/// POST /api/projects/:id/subdomains - Manually add a subdomain
async fn create_subdomain(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateSubdomainRequest>,
) -> Result<(StatusCode, Json<SubdomainResponse>), ApiError> {
    if req.hostname.trim().is_empty() {
        return Err(bad_request("Hostname cannot be empty"));
    }
    if state.projects().get(project_id).await.is_none() {
        return Err(not_found(format!("Project {} not found", project_id)));
    }

    let subdomain = state
        .subdomains()
        .upsert(project_id, req.hostname.trim(), DiscoveryMethod::Manual)
        .await
        .map_err(internal_error)?;
    sync_project_counter(&state, project_id).await?;

    Ok((StatusCode::CREATED, Json(SubdomainResponse::from(subdomain))))
}

/// Re-derive the project's subdomain counter from the store so manual
/// adds and deletes cannot drift it
async fn sync_project_counter(state: &AppState, project_id: Uuid) -> Result<(), ApiError> {
    if let Some(mut project) = state.projects().get(project_id).await {
        project.subdomains_count = state.subdomains().count_by_project(project_id).await;
        state
            .projects()
            .update(project)
            .await
            .map_err(internal_error)?;
    }
    Ok(())
}

/// GET /api/subdomains/:id - Get a single subdomain
async fn get_subdomain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubdomainResponse>, ApiError> {
    match state.subdomains().get(id).await {
        Some(subdomain) => Ok(Json(SubdomainResponse::from(subdomain))),
        None => Err(not_found(format!("Subdomain {} not found", id))),
    }
}

/// DELETE /api/subdomains/:id - Delete a subdomain
async fn delete_subdomain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let subdomain = state
        .subdomains()
        .get(id)
        .await
        .ok_or_else(|| not_found(format!("Subdomain {} not found", id)))?;

    state.subdomains().delete(id).await.map_err(internal_error)?;
    sync_project_counter(&state, subdomain.project_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/projects/{id}/subdomains",
            get(list_subdomains).post(create_subdomain),
        )
        .route(
            "/api/subdomains/{id}",
            get(get_subdomain).delete(delete_subdomain),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use rb_core::project::Project;

    async fn build_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::with_trigger_token(temp_dir.path().to_path_buf(), None)
            .await
            .unwrap();
        (state, temp_dir)
    }

    #[tokio::test]
    async fn manual_add_and_delete_keep_project_counter_in_sync() {
        let (state, _temp_dir) = build_state().await;
        let project = state
            .projects()
            .create(Project::new("acme", "acme.com"))
            .await
            .unwrap();

        let app = router().with_state(state.clone());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/projects/{}/subdomains", project.id))
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({ "hostname": "dev.acme.com" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["discoveryMethod"], "manual");
        let subdomain_id: Uuid = payload["id"].as_str().unwrap().parse().unwrap();

        let stored = state.projects().get(project.id).await.unwrap();
        assert_eq!(stored.subdomains_count, 1);

        let app = router().with_state(state.clone());
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/subdomains/{}", subdomain_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let stored = state.projects().get(project.id).await.unwrap();
        assert_eq!(stored.subdomains_count, 0);
    }

    #[tokio::test]
    async fn add_subdomain_to_unknown_project_returns_404() {
        let (state, _temp_dir) = build_state().await;

        let app = router().with_state(state);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/projects/{}/subdomains", Uuid::new_v4()))
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({ "hostname": "dev.acme.com" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
