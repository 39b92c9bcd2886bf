//! Course (disciplina) models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::aluno::Aluno;
use super::departamento::{CodigoDepartamento, Departamento};
use super::professor::Professor;
use super::ValidationError;

/// Course row; professor and department are optional links
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Disciplina {
    pub id: i64,
    pub nome: String,
    pub carga_horaria: i32,
    pub id_professor: Option<i64>,
    pub departamento_codigo: Option<String>,
}

/// Create payload
#[derive(Debug, Clone, Deserialize)]
pub struct NovaDisciplina {
    pub nome: String,
    pub carga_horaria: i32,
    pub id_professor: Option<i64>,
    pub departamento_codigo: Option<String>,
}

impl NovaDisciplina {
    /// Check field constraints before the insert.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_carga_horaria(self.carga_horaria)?;
        if let Some(codigo) = &self.departamento_codigo {
            CodigoDepartamento::new(codigo)?;
        }
        Ok(())
    }
}

/// Partial update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisciplinaUpdate {
    pub nome: Option<String>,
    pub carga_horaria: Option<i32>,
    pub id_professor: Option<i64>,
    pub departamento_codigo: Option<String>,
}

impl DisciplinaUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(carga_horaria) = self.carga_horaria {
            validate_carga_horaria(carga_horaria)?;
        }
        if let Some(codigo) = &self.departamento_codigo {
            CodigoDepartamento::new(codigo)?;
        }
        Ok(())
    }
}

/// Check a credit-hour load is positive.
fn validate_carga_horaria(carga_horaria: i32) -> Result<(), ValidationError> {
    if carga_horaria <= 0 {
        return Err(ValidationError::OutOfRange {
            field: "carga_horaria",
            reason: "must be positive",
        });
    }
    Ok(())
}

/// Course with professor, department, and enrolled students
#[derive(Debug, Clone, Serialize)]
pub struct DisciplinaComRelacionados {
    #[serde(flatten)]
    pub disciplina: Disciplina,
    pub professor: Option<Professor>,
    pub departamento: Option<Departamento>,
    pub alunos: Vec<Aluno>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_with_optional_links_absent() {
        let nova: NovaDisciplina =
            serde_json::from_str(r#"{"nome":"Calculo I","carga_horaria":60}"#).unwrap();
        assert_eq!(nova.nome, "Calculo I");
        assert!(nova.id_professor.is_none());
        assert!(nova.departamento_codigo.is_none());
    }
}
