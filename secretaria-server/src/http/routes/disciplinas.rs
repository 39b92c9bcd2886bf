//! Course endpoints, including the students-per-course stats

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::repos::{AlunosPorDisciplina, DisciplinaRepo};
use crate::http::error::ApiError;
use crate::http::routes::Deleted;
use crate::http::server::AppState;
use crate::models::{
    Disciplina, DisciplinaComRelacionados, DisciplinaUpdate, NovaDisciplina, Page,
};

/// Query parameters for GET /disciplinas
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDisciplinasParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    /// Partial name match
    pub nome: Option<String>,
    /// Exact professor match
    pub id_professor: Option<i64>,
    /// Exact department-code match
    pub cod_departamento: Option<String>,
}

/// POST /disciplinas
async fn create_disciplina(
    State(state): State<Arc<AppState>>,
    Json(nova): Json<NovaDisciplina>,
) -> Result<(StatusCode, Json<Disciplina>), ApiError> {
    nova.validate()?;
    let disciplina = DisciplinaRepo::new(&state.pool).create(nova).await?;
    Ok((StatusCode::CREATED, Json(disciplina)))
}

/// GET /disciplinas - list with professor, department, and students embedded
async fn list_disciplinas(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListDisciplinasParams>,
) -> Result<Json<Vec<DisciplinaComRelacionados>>, ApiError> {
    let page = Page::new(params.offset.unwrap_or(0), params.limit.unwrap_or(10));
    let disciplinas = DisciplinaRepo::new(&state.pool)
        .list(
            page,
            params.nome.as_deref(),
            params.id_professor,
            params.cod_departamento.as_deref(),
        )
        .await?;
    Ok(Json(disciplinas))
}

/// GET /disciplinas/stats/alunos-por-disciplina - enrollment count per course
async fn stats_alunos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AlunosPorDisciplina>>, ApiError> {
    let stats = DisciplinaRepo::new(&state.pool).stats_alunos().await?;
    Ok(Json(stats))
}

/// GET /disciplinas/{id}
async fn get_disciplina(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DisciplinaComRelacionados>, ApiError> {
    let disciplina = DisciplinaRepo::new(&state.pool).get(id).await?;
    Ok(Json(disciplina))
}

/// PUT /disciplinas/{id} - partial update
async fn update_disciplina(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<DisciplinaUpdate>,
) -> Result<Json<Disciplina>, ApiError> {
    update.validate()?;
    let disciplina = DisciplinaRepo::new(&state.pool).update(id, update).await?;
    Ok(Json(disciplina))
}

/// DELETE /disciplinas/{id} - cascades to enrollments
async fn delete_disciplina(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    DisciplinaRepo::new(&state.pool).delete(id).await?;
    Ok(Json(Deleted::new()))
}

/// Course routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/disciplinas", get(list_disciplinas).post(create_disciplina))
        .route(
            "/disciplinas/stats/alunos-por-disciplina",
            get(stats_alunos),
        )
        .route(
            "/disciplinas/{id}",
            get(get_disciplina)
                .put(update_disciplina)
                .delete(delete_disciplina),
        )
}
