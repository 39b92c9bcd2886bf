//! Department endpoints, including the professors-per-department stats

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::repos::{DepartamentoRepo, ProfessoresPorDepartamento};
use crate::http::error::ApiError;
use crate::http::routes::Deleted;
use crate::http::server::AppState;
use crate::models::{
    Departamento, DepartamentoComRelacionados, DepartamentoUpdate, NovoDepartamento, Page,
};

/// Query parameters for GET /departamentos
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDepartamentosParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    /// Partial name match
    pub nome: Option<String>,
}

/// POST /departamentos
async fn create_departamento(
    State(state): State<Arc<AppState>>,
    Json(novo): Json<NovoDepartamento>,
) -> Result<(StatusCode, Json<Departamento>), ApiError> {
    novo.validate()?;
    let departamento = DepartamentoRepo::new(&state.pool).create(novo).await?;
    Ok((StatusCode::CREATED, Json(departamento)))
}

/// GET /departamentos - list with professors and courses embedded
async fn list_departamentos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListDepartamentosParams>,
) -> Result<Json<Vec<DepartamentoComRelacionados>>, ApiError> {
    let page = Page::new(params.offset.unwrap_or(0), params.limit.unwrap_or(10));
    let departamentos = DepartamentoRepo::new(&state.pool)
        .list(page, params.nome.as_deref())
        .await?;
    Ok(Json(departamentos))
}

/// GET /departamentos/stats/professores - professor head-count per department
async fn stats_professores(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProfessoresPorDepartamento>>, ApiError> {
    let stats = DepartamentoRepo::new(&state.pool).stats_professores().await?;
    Ok(Json(stats))
}

/// GET /departamentos/{id}
async fn get_departamento(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DepartamentoComRelacionados>, ApiError> {
    let departamento = DepartamentoRepo::new(&state.pool).get(id).await?;
    Ok(Json(departamento))
}

/// PATCH /departamentos/{id} - partial update (name and/or code)
async fn update_departamento(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<DepartamentoUpdate>,
) -> Result<Json<Departamento>, ApiError> {
    update.validate()?;
    let departamento = DepartamentoRepo::new(&state.pool).update(id, update).await?;
    Ok(Json(departamento))
}

/// DELETE /departamentos/{id}
async fn delete_departamento(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    DepartamentoRepo::new(&state.pool).delete(id).await?;
    Ok(Json(Deleted::new()))
}

/// Department routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/departamentos",
            get(list_departamentos).post(create_departamento),
        )
        .route("/departamentos/stats/professores", get(stats_professores))
        .route(
            "/departamentos/{id}",
            get(get_departamento)
                .patch(update_departamento)
                .delete(delete_departamento),
        )
}
