//! Professor endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::repos::ProfessorRepo;
use crate::http::error::ApiError;
use crate::http::routes::Deleted;
use crate::http::server::AppState;
use crate::models::{NovoProfessor, Page, Professor, ProfessorComRelacionados, ProfessorUpdate};

/// Query parameters for GET /professores
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProfessoresParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    /// Partial name match
    pub nome: Option<String>,
    /// Exact department match
    pub id_departamento: Option<i64>,
}

/// POST /professores
async fn create_professor(
    State(state): State<Arc<AppState>>,
    Json(novo): Json<NovoProfessor>,
) -> Result<(StatusCode, Json<Professor>), ApiError> {
    let professor = ProfessorRepo::new(&state.pool).create(novo).await?;
    Ok((StatusCode::CREATED, Json(professor)))
}

/// GET /professores - list with department and courses embedded
async fn list_professores(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListProfessoresParams>,
) -> Result<Json<Vec<ProfessorComRelacionados>>, ApiError> {
    let page = Page::new(params.offset.unwrap_or(0), params.limit.unwrap_or(10));
    let professores = ProfessorRepo::new(&state.pool)
        .list(page, params.nome.as_deref(), params.id_departamento)
        .await?;
    Ok(Json(professores))
}

/// GET /professores/{id}
async fn get_professor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ProfessorComRelacionados>, ApiError> {
    let professor = ProfessorRepo::new(&state.pool).get(id).await?;
    Ok(Json(professor))
}

/// PUT /professores/{id} - partial update
async fn update_professor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<ProfessorUpdate>,
) -> Result<Json<Professor>, ApiError> {
    let professor = ProfessorRepo::new(&state.pool).update(id, update).await?;
    Ok(Json(professor))
}

/// DELETE /professores/{id}
async fn delete_professor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    ProfessorRepo::new(&state.pool).delete(id).await?;
    Ok(Json(Deleted::new()))
}

/// Professor routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/professores", get(list_professores).post(create_professor))
        .route(
            "/professores/{id}",
            get(get_professor)
                .put(update_professor)
                .delete(delete_professor),
        )
}
