//! Project API endpoints
//!
//! Project CRUD. Creating a project also creates its subdomain
//! enumeration task; deleting one never deletes inline and instead
//! hands the work to a background deletion task.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rb_core::project::{Project, ProjectStatus};
use rb_core::task::{Task, TaskData, TaskRepository};

use crate::routes::{bad_request, internal_error, not_found, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub target_domain: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub target_domain: String,
    pub status: ProjectStatus,
    pub enumeration_task_id: Option<Uuid>,
    pub deletion_task_id: Option<Uuid>,
    pub subdomains_count: usize,
    pub vulnerabilities_found: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            target_domain: project.target_domain,
            status: project.status,
            enumeration_task_id: project.enumeration_task_id,
            deletion_task_id: project.deletion_task_id,
            subdomains_count: project.subdomains_count,
            vulnerabilities_found: project.vulnerabilities_found,
            created_at: project.created_at.to_rfc3339(),
            updated_at: project.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProjectResponse {
    pub deletion_task_id: Uuid,
}

/// GET /api/projects - List all projects
async fn list_projects(State(state): State<AppState>) -> Json<Vec<ProjectResponse>> {
    let projects = state.projects().list().await;
    Json(projects.into_iter().map(ProjectResponse::from).collect())
}

/// POST /api/projects - Create a project and queue its enumeration
async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(bad_request("Name cannot be empty"));
    }
    if req.target_domain.trim().is_empty() {
        return Err(bad_request("Target domain cannot be empty"));
    }

    let project = state
        .projects()
        .create(Project::new(req.name, req.target_domain.trim()))
        .await
        .map_err(internal_error)?;

    // Queue enumeration; the trigger advances it slice by slice
    let task = state
        .tasks()
        .create(Task::new(TaskData::SubdomainEnumeration {
            project_id: project.id,
            target_domain: project.target_domain.clone(),
        }))
        .await
        .map_err(internal_error)?;

    let mut project = project;
    project.enumeration_task_id = Some(task.id);
    let project = state
        .projects()
        .update(project)
        .await
        .map_err(internal_error)?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

/// GET /api/projects/:id - Get a single project
async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectResponse>, ApiError> {
    match state.projects().get(id).await {
        Some(project) => Ok(Json(ProjectResponse::from(project))),
        None => Err(not_found(format!("Project {} not found", id))),
    }
}

/// PATCH /api/projects/:id - Update a project
async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let mut project = state
        .projects()
        .get(id)
        .await
        .ok_or_else(|| not_found(format!("Project {} not found", id)))?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(bad_request("Name cannot be empty"));
        }
        project.name = name;
    }

    if let Some(status) = req.status {
        project.status = status;
    }

    let updated = state
        .projects()
        .update(project)
        .await
        .map_err(internal_error)?;

    Ok(Json(ProjectResponse::from(updated)))
}

/// DELETE /api/projects/:id - Queue background deletion of a project
async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<DeleteProjectResponse>), ApiError> {
    let mut project = state
        .projects()
        .get(id)
        .await
        .ok_or_else(|| not_found(format!("Project {} not found", id)))?;

    let task = state
        .tasks()
        .create(Task::new(TaskData::ProjectDeletion { project_id: id }))
        .await
        .map_err(internal_error)?;

    project.status = ProjectStatus::Deleting;
    project.deletion_task_id = Some(task.id);
    state
        .projects()
        .update(project)
        .await
        .map_err(internal_error)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DeleteProjectResponse {
            deletion_task_id: task.id,
        }),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
}
