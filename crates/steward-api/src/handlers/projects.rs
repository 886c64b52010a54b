// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Project handlers.
//!
//! The project store holds member ids; responses embed public summaries
//! joined against the credential store, so password hashes and refresh
//! tokens never ride along.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use steward_core::{
    AssignDeveloperRequest, CreateProjectRequest, MessageResponse, Project, ProjectStatus, Role,
    UpdateProjectRequest, UserSummary,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, ValidatedJson, ValidatedPath};
use crate::state::AppState;
use crate::store::{ProjectChanges, ProjectRecord};

// =============================================================================
// Create
// =============================================================================

/// POST /api/projects (ADMIN)
///
/// Creates a project led by the user behind `leadEmail`.
pub async fn create_project(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.name.is_empty() {
        return Err(ApiError::validation("Project name is required"));
    }

    let lead = state
        .users()
        .get_by_email(&request.lead_email)
        .await?
        .ok_or_else(|| ApiError::bad_request("Lead not found"))?;

    let record = ProjectRecord::new(request.name, request.description, request.deadline, lead.id);
    state.projects().insert(record.clone()).await?;

    tracing::info!(project_id = %record.id, lead_id = %lead.id, "Project created");

    let project = hydrate(&state, record).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

// =============================================================================
// List
// =============================================================================

/// GET /api/projects (authenticated)
///
/// Listing is filtered by caller role: ADMIN sees all projects, LEAD the
/// projects they lead, DEVELOPER the projects they are assigned to.
pub async fn list_projects(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<impl IntoResponse> {
    let records = state.projects().list().await?;

    let visible: Vec<ProjectRecord> = match ctx.role {
        Role::Admin => records,
        Role::Lead => records
            .into_iter()
            .filter(|record| record.is_led_by(ctx.user_id))
            .collect(),
        Role::Developer => records
            .into_iter()
            .filter(|record| record.has_developer(ctx.user_id))
            .collect(),
    };

    let mut projects = Vec::with_capacity(visible.len());
    for record in visible {
        projects.push(hydrate(&state, record).await?);
    }

    Ok(Json(projects))
}

// =============================================================================
// Update
// =============================================================================

/// PATCH /api/projects/{id}/update (ADMIN)
///
/// Merges the supplied fields; absent fields keep their values. Only the
/// project's own lead may update it, and completed projects are read-only.
pub async fn update_project(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .projects()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project"))?;

    if !record.is_led_by(ctx.user_id) {
        return Err(ApiError::forbidden("Not project lead"));
    }
    if record.is_completed() {
        return Err(ApiError::bad_request("Cannot update completed projects"));
    }

    let changes = ProjectChanges {
        name: request.name,
        description: request.description,
        deadline: request.deadline,
    };
    let updated = state
        .projects()
        .update_details(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Project"))?;

    tracing::info!(project_id = %id, "Project updated");

    let project = hydrate(&state, updated).await?;
    Ok(Json(project))
}

// =============================================================================
// Complete
// =============================================================================

/// PATCH /api/projects/{id}/complete (ADMIN)
///
/// Idempotent: completing an already-completed or missing project still
/// acknowledges.
pub async fn complete_project(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let existed = state
        .projects()
        .set_status(id, ProjectStatus::Completed)
        .await?;
    if existed {
        tracing::info!(project_id = %id, "Project marked completed");
    }

    Ok(Json(MessageResponse::new("Project marked completed")))
}

// =============================================================================
// Delete
// =============================================================================

/// DELETE /api/projects/{id}/delete (ADMIN)
///
/// Idempotent: deleting a missing project still acknowledges.
pub async fn delete_project(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let removed = state.projects().remove(id).await?;
    if removed {
        tracing::info!(project_id = %id, "Project deleted");
    }

    Ok(Json(MessageResponse::new("Project deleted")))
}

// =============================================================================
// Assign
// =============================================================================

/// PATCH /api/projects/{id}/assign (LEAD)
///
/// Assigns a developer by email. Only the project's own lead may assign,
/// and completed projects reject assignment.
pub async fn assign_developer(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(request): ValidatedJson<AssignDeveloperRequest>,
) -> ApiResult<impl IntoResponse> {
    let developer = state
        .users()
        .get_by_email(&request.developer_email)
        .await?
        .ok_or_else(|| ApiError::not_found("Developer"))?;

    let record = state
        .projects()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project"))?;

    if !record.is_led_by(ctx.user_id) {
        return Err(ApiError::forbidden("Not project lead"));
    }
    if record.is_completed() {
        return Err(ApiError::bad_request(
            "Cannot assign developers to completed projects",
        ));
    }

    state.projects().add_developer(id, developer.id).await?;

    tracing::info!(project_id = %id, developer_id = %developer.id, "Developer assigned");

    Ok(Json(MessageResponse::new("Developer assigned")))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Joins a stored project against the credential store into the wire shape.
async fn hydrate(state: &AppState, record: ProjectRecord) -> ApiResult<Project> {
    let lead = member_summary(state, record.lead_id).await?;

    let mut developers = Vec::with_capacity(record.developer_ids.len());
    for developer_id in &record.developer_ids {
        developers.push(member_summary(state, *developer_id).await?);
    }

    Ok(Project {
        id: record.id,
        name: record.name,
        description: record.description,
        deadline: record.deadline,
        status: record.status,
        lead,
        developers,
    })
}

/// Resolves a member id to its public summary.
///
/// Users are never hard-deleted, so a dangling reference is a server fault,
/// not a client error.
async fn member_summary(state: &AppState, id: Uuid) -> ApiResult<UserSummary> {
    state
        .users()
        .get(id)
        .await?
        .map(|record| record.summary())
        .ok_or_else(|| ApiError::internal(format!("Project references unknown user {}", id)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessClaims, AuthContext, TokenConfig};
    use crate::config::ApiConfig;
    use crate::password;
    use crate::store::UserRecord;
    use axum::http::StatusCode;

    fn test_state() -> AppState {
        let config = ApiConfig::default().with_tokens(TokenConfig::new(
            "access-secret-that-is-long-enough-for-tests",
            "refresh-secret-that-is-long-enough-for-tests",
        ));
        AppState::builder().config(config).build().unwrap()
    }

    async fn seed_user(state: &AppState, email: &str, role: Role) -> Uuid {
        let hash = password::hash_password("pw").unwrap();
        let record = UserRecord::new("Seeded", email, hash, role);
        state.users().insert(record).await.unwrap().id
    }

    fn ctx_for(id: Uuid, email: &str, role: Role) -> AuthContext {
        AuthContext::from_claims(&AccessClaims::new(id, email, role, 900))
    }

    async fn seed_project(state: &AppState, lead_id: Uuid) -> Uuid {
        let record = ProjectRecord::new("Apollo", "Launch tooling", None, lead_id);
        let id = record.id;
        state.projects().insert(record).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_create_project_embeds_lead_summary() {
        let state = test_state();
        seed_user(&state, "lena@example.com", Role::Lead).await;

        let response = create_project(
            State(state.clone()),
            ValidatedJson(CreateProjectRequest {
                name: "Apollo".to_string(),
                description: "Launch tooling".to_string(),
                deadline: None,
                lead_email: "lena@example.com".to_string(),
            }),
        )
        .await
        .expect("create succeeds")
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ACTIVE");
        assert_eq!(body["lead"]["email"], "lena@example.com");
        assert!(body["lead"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn test_create_project_unknown_lead_is_400() {
        let state = test_state();
        let err = create_project(
            State(state),
            ValidatedJson(CreateProjectRequest {
                name: "Apollo".to_string(),
                description: String::new(),
                deadline: None,
                lead_email: "ghost@example.com".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "Lead not found");
    }

    #[tokio::test]
    async fn test_listing_filtered_by_role() {
        let state = test_state();
        let lead_a = seed_user(&state, "a@example.com", Role::Lead).await;
        let lead_b = seed_user(&state, "b@example.com", Role::Lead).await;
        let dev = seed_user(&state, "dev@example.com", Role::Developer).await;
        let admin = seed_user(&state, "admin@example.com", Role::Admin).await;

        let project_a = seed_project(&state, lead_a).await;
        let _project_b = seed_project(&state, lead_b).await;
        state.projects().add_developer(project_a, dev).await.unwrap();

        async fn listed_count(state: &AppState, ctx: AuthContext) -> usize {
            let response = list_projects(State(state.clone()), Auth(ctx))
                .await
                .unwrap()
                .into_response();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            body.as_array().unwrap().len()
        }

        // ADMIN sees all
        assert_eq!(
            listed_count(&state, ctx_for(admin, "admin@example.com", Role::Admin)).await,
            2
        );
        // LEAD sees only their own
        assert_eq!(
            listed_count(&state, ctx_for(lead_a, "a@example.com", Role::Lead)).await,
            1
        );
        // DEVELOPER sees only assignments
        assert_eq!(
            listed_count(&state, ctx_for(dev, "dev@example.com", Role::Developer)).await,
            1
        );

        // An unrelated developer sees nothing
        let other = seed_user(&state, "other@example.com", Role::Developer).await;
        assert_eq!(
            listed_count(&state, ctx_for(other, "other@example.com", Role::Developer)).await,
            0
        );
    }

    #[tokio::test]
    async fn test_update_guards() {
        let state = test_state();
        let lead = seed_user(&state, "lead@example.com", Role::Lead).await;
        let other = seed_user(&state, "other@example.com", Role::Lead).await;
        let project = seed_project(&state, lead).await;

        // Not the project's lead
        let err = update_project(
            State(state.clone()),
            Auth(ctx_for(other, "other@example.com", Role::Lead)),
            ValidatedPath(project),
            ValidatedJson(UpdateProjectRequest::default()),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.user_message(), "Not project lead");

        // Unknown project
        let err = update_project(
            State(state.clone()),
            Auth(ctx_for(lead, "lead@example.com", Role::Lead)),
            ValidatedPath(Uuid::now_v7()),
            ValidatedJson(UpdateProjectRequest::default()),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        // Completed project rejects updates
        state
            .projects()
            .set_status(project, ProjectStatus::Completed)
            .await
            .unwrap();
        let err = update_project(
            State(state),
            Auth(ctx_for(lead, "lead@example.com", Role::Lead)),
            ValidatedPath(project),
            ValidatedJson(UpdateProjectRequest::default()),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "Cannot update completed projects");
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let state = test_state();
        let lead = seed_user(&state, "lead@example.com", Role::Lead).await;
        let project = seed_project(&state, lead).await;

        let response = update_project(
            State(state.clone()),
            Auth(ctx_for(lead, "lead@example.com", Role::Lead)),
            ValidatedPath(project),
            ValidatedJson(UpdateProjectRequest {
                description: Some("Revised".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap()
        .into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["name"], "Apollo");
        assert_eq!(body["description"], "Revised");
    }

    #[tokio::test]
    async fn test_complete_and_delete_idempotent() {
        let state = test_state();
        let lead = seed_user(&state, "lead@example.com", Role::Lead).await;
        let project = seed_project(&state, lead).await;

        complete_project(State(state.clone()), ValidatedPath(project))
            .await
            .expect("complete succeeds");
        // Second completion and completion of a missing id still acknowledge
        complete_project(State(state.clone()), ValidatedPath(project))
            .await
            .expect("repeat complete succeeds");
        complete_project(State(state.clone()), ValidatedPath(Uuid::now_v7()))
            .await
            .expect("missing complete succeeds");

        assert!(state.projects().get(project).await.unwrap().unwrap().is_completed());

        delete_project(State(state.clone()), ValidatedPath(project))
            .await
            .expect("delete succeeds");
        delete_project(State(state.clone()), ValidatedPath(project))
            .await
            .expect("repeat delete succeeds");
        assert!(state.projects().get(project).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_assign_guards_and_success() {
        let state = test_state();
        let lead = seed_user(&state, "lead@example.com", Role::Lead).await;
        let other = seed_user(&state, "other@example.com", Role::Lead).await;
        let dev = seed_user(&state, "dev@example.com", Role::Developer).await;
        let project = seed_project(&state, lead).await;

        // Unknown developer
        let err = assign_developer(
            State(state.clone()),
            Auth(ctx_for(lead, "lead@example.com", Role::Lead)),
            ValidatedPath(project),
            ValidatedJson(AssignDeveloperRequest {
                developer_email: "ghost@example.com".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "Developer not found");

        // Wrong lead
        let err = assign_developer(
            State(state.clone()),
            Auth(ctx_for(other, "other@example.com", Role::Lead)),
            ValidatedPath(project),
            ValidatedJson(AssignDeveloperRequest {
                developer_email: "dev@example.com".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        // Success
        assign_developer(
            State(state.clone()),
            Auth(ctx_for(lead, "lead@example.com", Role::Lead)),
            ValidatedPath(project),
            ValidatedJson(AssignDeveloperRequest {
                developer_email: "dev@example.com".to_string(),
            }),
        )
        .await
        .expect("assignment succeeds");
        assert!(state
            .projects()
            .get(project)
            .await
            .unwrap()
            .unwrap()
            .has_developer(dev));

        // Completed project rejects assignment
        state
            .projects()
            .set_status(project, ProjectStatus::Completed)
            .await
            .unwrap();
        let err = assign_developer(
            State(state),
            Auth(ctx_for(lead, "lead@example.com", Role::Lead)),
            ValidatedPath(project),
            ValidatedJson(AssignDeveloperRequest {
                developer_email: "dev@example.com".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
