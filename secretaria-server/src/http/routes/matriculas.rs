//! Enrollment endpoints, including the grade-average stats
//!
//! Enrollments address by two path segments: student id, then course id.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::repos::{MatriculaFilter, MatriculaRepo, MediaNotasPorDisciplina};
use crate::http::error::ApiError;
use crate::http::routes::Deleted;
use crate::http::server::AppState;
use crate::models::{Matricula, MatriculaComRelacionados, MatriculaUpdate, NovaMatricula, Page};

/// Query parameters for GET /matriculas
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMatriculasParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    /// Exact term match ("25.1")
    pub semestre: Option<String>,
    /// Final grade greater than or equal
    pub nota_minima: Option<f64>,
    /// One student's history
    pub id_aluno: Option<i64>,
    /// One course's roster
    pub disciplina_id: Option<i64>,
}

/// POST /matriculas - enroll a student in a course
async fn create_matricula(
    State(state): State<Arc<AppState>>,
    Json(nova): Json<NovaMatricula>,
) -> Result<(StatusCode, Json<Matricula>), ApiError> {
    nova.validate()?;
    let matricula = MatriculaRepo::new(&state.pool).create(nova).await?;
    Ok((StatusCode::CREATED, Json(matricula)))
}

/// GET /matriculas - list with student and course embedded
async fn list_matriculas(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListMatriculasParams>,
) -> Result<Json<Vec<MatriculaComRelacionados>>, ApiError> {
    let page = Page::new(params.offset.unwrap_or(0), params.limit.unwrap_or(10));
    let filter = MatriculaFilter {
        semestre: params.semestre,
        nota_minima: params.nota_minima,
        id_aluno: params.id_aluno,
        disciplina_id: params.disciplina_id,
    };
    let matriculas = MatriculaRepo::new(&state.pool).list(page, filter).await?;
    Ok(Json(matriculas))
}

/// GET /matriculas/stats/media-notas - grade average per course
async fn stats_media_notas(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MediaNotasPorDisciplina>>, ApiError> {
    let stats = MatriculaRepo::new(&state.pool).stats_media_notas().await?;
    Ok(Json(stats))
}

/// GET /matriculas/{id_aluno}/{disciplina_id}
async fn get_matricula(
    State(state): State<Arc<AppState>>,
    Path((id_aluno, disciplina_id)): Path<(i64, i64)>,
) -> Result<Json<MatriculaComRelacionados>, ApiError> {
    let matricula = MatriculaRepo::new(&state.pool)
        .get(id_aluno, disciplina_id)
        .await?;
    Ok(Json(matricula))
}

/// PATCH /matriculas/{id_aluno}/{disciplina_id} - update grade/absences
async fn update_matricula(
    State(state): State<Arc<AppState>>,
    Path((id_aluno, disciplina_id)): Path<(i64, i64)>,
    Json(update): Json<MatriculaUpdate>,
) -> Result<Json<Matricula>, ApiError> {
    update.validate()?;
    let matricula = MatriculaRepo::new(&state.pool)
        .update(id_aluno, disciplina_id, update)
        .await?;
    Ok(Json(matricula))
}

/// DELETE /matriculas/{id_aluno}/{disciplina_id}
async fn delete_matricula(
    State(state): State<Arc<AppState>>,
    Path((id_aluno, disciplina_id)): Path<(i64, i64)>,
) -> Result<Json<Deleted>, ApiError> {
    MatriculaRepo::new(&state.pool)
        .delete(id_aluno, disciplina_id)
        .await?;
    Ok(Json(Deleted::new()))
}

/// Enrollment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/matriculas", get(list_matriculas).post(create_matricula))
        .route("/matriculas/stats/media-notas", get(stats_media_notas))
        .route(
            "/matriculas/{id_aluno}/{disciplina_id}",
            get(get_matricula)
                .patch(update_matricula)
                .delete(delete_matricula),
        )
}
