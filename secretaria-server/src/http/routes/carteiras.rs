//! Student card endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::repos::CarteiraRepo;
use crate::http::error::ApiError;
use crate::http::routes::Deleted;
use crate::http::server::AppState;
use crate::models::{Carteira, CarteiraComAluno, CarteiraUpdate, NovaCarteira, Page};

/// Query parameters for GET /carteiras
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCarteirasParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    /// Filter by active/inactive status
    pub status_ativa: Option<bool>,
    /// Keep only cards still inside their validity window
    #[serde(default)]
    pub somente_validas: bool,
}

/// Query parameters for GET /carteiras/busca/por-aluno
#[derive(Debug, Clone, Deserialize)]
pub struct BuscaPorAlunoParams {
    /// Partial student name
    pub nome_aluno: String,
}

/// POST /carteiras - issue a card for a student
async fn create_carteira(
    State(state): State<Arc<AppState>>,
    Json(nova): Json<NovaCarteira>,
) -> Result<(StatusCode, Json<Carteira>), ApiError> {
    nova.validate()?;
    let carteira = CarteiraRepo::new(&state.pool).create(nova).await?;
    Ok((StatusCode::CREATED, Json(carteira)))
}

/// GET /carteiras - list cards with students, newest first
async fn list_carteiras(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListCarteirasParams>,
) -> Result<Json<Vec<CarteiraComAluno>>, ApiError> {
    let page = Page::new(params.offset.unwrap_or(0), params.limit.unwrap_or(10));
    let carteiras = CarteiraRepo::new(&state.pool)
        .list(page, params.status_ativa, params.somente_validas)
        .await?;
    Ok(Json(carteiras))
}

/// GET /carteiras/busca/por-aluno - find cards by partial student name
async fn busca_por_aluno(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BuscaPorAlunoParams>,
) -> Result<Json<Vec<CarteiraComAluno>>, ApiError> {
    let carteiras = CarteiraRepo::new(&state.pool)
        .busca_por_aluno(&params.nome_aluno)
        .await?;
    Ok(Json(carteiras))
}

/// GET /carteiras/{id}
async fn get_carteira(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CarteiraComAluno>, ApiError> {
    let carteira = CarteiraRepo::new(&state.pool).get(id).await?;
    Ok(Json(carteira))
}

/// PATCH /carteiras/{id} - update validity and/or status
async fn update_carteira(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<CarteiraUpdate>,
) -> Result<Json<Carteira>, ApiError> {
    let carteira = CarteiraRepo::new(&state.pool).update(id, update).await?;
    Ok(Json(carteira))
}

/// DELETE /carteiras/{id}
async fn delete_carteira(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    CarteiraRepo::new(&state.pool).delete(id).await?;
    Ok(Json(Deleted::new()))
}

/// Card routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/carteiras", get(list_carteiras).post(create_carteira))
        .route("/carteiras/busca/por-aluno", get(busca_por_aluno))
        .route(
            "/carteiras/{id}",
            get(get_carteira)
                .patch(update_carteira)
                .delete(delete_carteira),
        )
}
