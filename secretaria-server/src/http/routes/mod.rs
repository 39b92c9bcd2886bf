//! Route handlers organized by resource

pub mod alunos;
pub mod carteiras;
pub mod departamentos;
pub mod disciplinas;
pub mod health;
pub mod matriculas;
pub mod professores;

use serde::Serialize;

/// Body returned by every delete endpoint
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Deleted {
    pub ok: bool,
}

impl Deleted {
    pub const fn new() -> Self {
        Self { ok: true }
    }
}
