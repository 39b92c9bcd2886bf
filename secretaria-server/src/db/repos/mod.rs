//! Repository implementations for database access
//!
//! Each repository borrows the shared pool and follows the same patterns:
//! - uniqueness and cross-entity existence invariants are checked with
//!   explicit pre-queries before the insert
//! - list operations load declared relations in batch (no N+1)
//! - partial updates use COALESCE so absent fields keep their value

pub mod alunos;
pub mod carteiras;
pub mod departamentos;
pub mod disciplinas;
pub mod matriculas;
pub mod professores;

pub use alunos::AlunoRepo;
pub use carteiras::CarteiraRepo;
pub use departamentos::{DepartamentoRepo, ProfessoresPorDepartamento};
pub use disciplinas::{AlunosPorDisciplina, DisciplinaRepo};
pub use matriculas::{MatriculaFilter, MatriculaRepo, MediaNotasPorDisciplina};
pub use professores::ProfessorRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {message}")]
    Conflict { message: &'static str },
}
