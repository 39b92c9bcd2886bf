//! Student endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::repos::AlunoRepo;
use crate::http::error::ApiError;
use crate::http::routes::Deleted;
use crate::http::server::AppState;
use crate::models::{Aluno, AlunoComRelacionados, AlunoUpdate, NovoAluno, Page};

/// Query parameters for GET /alunos
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAlunosParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    /// Partial name match
    pub nome: Option<String>,
    /// Exact birth-year match
    pub ano_nascimento: Option<i32>,
}

/// POST /alunos - register a student
async fn create_aluno(
    State(state): State<Arc<AppState>>,
    Json(novo): Json<NovoAluno>,
) -> Result<(StatusCode, Json<Aluno>), ApiError> {
    novo.validate()?;
    let aluno = AlunoRepo::new(&state.pool).create(novo).await?;
    Ok((StatusCode::CREATED, Json(aluno)))
}

/// GET /alunos - list students with card and courses embedded
async fn list_alunos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListAlunosParams>,
) -> Result<Json<Vec<AlunoComRelacionados>>, ApiError> {
    let page = Page::new(params.offset.unwrap_or(0), params.limit.unwrap_or(10));
    let alunos = AlunoRepo::new(&state.pool)
        .list(page, params.nome.as_deref(), params.ano_nascimento)
        .await?;
    Ok(Json(alunos))
}

/// GET /alunos/{id}
async fn get_aluno(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<AlunoComRelacionados>, ApiError> {
    let aluno = AlunoRepo::new(&state.pool).get(id).await?;
    Ok(Json(aluno))
}

/// PUT /alunos/{id} - partial update
async fn update_aluno(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<AlunoUpdate>,
) -> Result<Json<Aluno>, ApiError> {
    update.validate()?;
    let aluno = AlunoRepo::new(&state.pool).update(id, update).await?;
    Ok(Json(aluno))
}

/// DELETE /alunos/{id} - cascades to card and enrollments
async fn delete_aluno(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    AlunoRepo::new(&state.pool).delete(id).await?;
    Ok(Json(Deleted::new()))
}

/// Student routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/alunos", get(list_alunos).post(create_aluno))
        .route(
            "/alunos/{id}",
            get(get_aluno).put(update_aluno).delete(delete_aluno),
        )
}
