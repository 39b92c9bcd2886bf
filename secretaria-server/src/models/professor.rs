//! Professor models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::departamento::Departamento;
use super::disciplina::Disciplina;

/// Professor row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Professor {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub id_departamento: i64,
}

/// Create payload
#[derive(Debug, Clone, Deserialize)]
pub struct NovoProfessor {
    pub nome: String,
    pub email: String,
    pub id_departamento: i64,
}

/// Partial update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfessorUpdate {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub id_departamento: Option<i64>,
}

/// Professor with department and taught courses
#[derive(Debug, Clone, Serialize)]
pub struct ProfessorComRelacionados {
    #[serde(flatten)]
    pub professor: Professor,
    pub departamento: Departamento,
    pub disciplinas: Vec<Disciplina>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_deserializes() {
        let update: ProfessorUpdate =
            serde_json::from_str(r#"{"email":"novo@uni.br"}"#).unwrap();
        assert_eq!(update.email.as_deref(), Some("novo@uni.br"));
        assert!(update.nome.is_none());
        assert!(update.id_departamento.is_none());
    }
}
