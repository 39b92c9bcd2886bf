//! Department (departamento) models and code validation

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::disciplina::Disciplina;
use super::professor::Professor;
use super::ValidationError;

/// Maximum length of a department short code
const MAX_CODIGO_LEN: usize = 5;

/// Code pattern: 1-5 alphanumeric characters ("COMP", "MAT")
static CODIGO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{1,5}$").expect("invalid codigo regex"));

/// Validated department short code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodigoDepartamento(String);

impl CodigoDepartamento {
    /// Create a department code, validating length and format.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "codigo" });
        }

        if s.len() > MAX_CODIGO_LEN {
            return Err(ValidationError::TooLong {
                field: "codigo",
                max: MAX_CODIGO_LEN,
            });
        }

        if !CODIGO_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "codigo",
                reason: "must be 1-5 alphanumeric characters",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CodigoDepartamento {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Department row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Departamento {
    pub id: i64,
    pub nome: String,
    pub codigo: String,
}

/// Create payload
#[derive(Debug, Clone, Deserialize)]
pub struct NovoDepartamento {
    pub nome: String,
    pub codigo: String,
}

impl NovoDepartamento {
    /// Check field constraints before the insert.
    pub fn validate(&self) -> Result<(), ValidationError> {
        CodigoDepartamento::new(&self.codigo)?;
        Ok(())
    }
}

/// Partial update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartamentoUpdate {
    pub nome: Option<String>,
    pub codigo: Option<String>,
}

impl DepartamentoUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(codigo) = &self.codigo {
            CodigoDepartamento::new(codigo)?;
        }
        Ok(())
    }
}

/// Department with its professors and courses
#[derive(Debug, Clone, Serialize)]
pub struct DepartamentoComRelacionados {
    #[serde(flatten)]
    pub departamento: Departamento,
    pub professores: Vec<Professor>,
    pub disciplinas: Vec<Disciplina>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_codes() {
        assert!(CodigoDepartamento::new("COMP").is_ok());
        assert!(CodigoDepartamento::new("MAT").is_ok());
        assert!(CodigoDepartamento::new("F1").is_ok());
    }

    #[test]
    fn rejects_empty() {
        let err = CodigoDepartamento::new("").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn rejects_over_five_chars() {
        let err = CodigoDepartamento::new("LETRAS").unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 5, .. }));
    }

    #[test]
    fn rejects_punctuation() {
        let err = CodigoDepartamento::new("CS-1").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn partial_update_deserializes_single_field() {
        let update: DepartamentoUpdate =
            serde_json::from_str(r#"{"nome":"Engenharia"}"#).unwrap();
        assert_eq!(update.nome.as_deref(), Some("Engenharia"));
        assert!(update.codigo.is_none());
    }
}
