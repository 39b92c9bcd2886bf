//! Student (aluno) models and CPF validation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::carteira::Carteira;
use super::disciplina::Disciplina;
use super::ValidationError;

/// Maximum length of a CPF, punctuation included ("123.456.789-00")
const MAX_CPF_LEN: usize = 14;

/// Validated CPF (national ID)
///
/// Length checks only; the registry format varies across source systems,
/// so the canonical punctuation is not enforced here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpf(String);

impl Cpf {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "cpf" });
        }

        if s.len() > MAX_CPF_LEN {
            return Err(ValidationError::TooLong {
                field: "cpf",
                max: MAX_CPF_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Cpf {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Student row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Aluno {
    pub id: i64,
    pub nome: String,
    pub cpf: String,
    pub data_nascimento: NaiveDate,
    pub numero_matricula: i64,
    pub email: String,
}

/// Create payload (id is generated by the database)
#[derive(Debug, Clone, Deserialize)]
pub struct NovoAluno {
    pub nome: String,
    pub cpf: String,
    pub data_nascimento: NaiveDate,
    pub numero_matricula: i64,
    pub email: String,
}

impl NovoAluno {
    /// Check field constraints before the insert.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Cpf::new(&self.cpf)?;
        Ok(())
    }
}

/// Partial update payload; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlunoUpdate {
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub numero_matricula: Option<i64>,
    pub email: Option<String>,
}

impl AlunoUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(cpf) = &self.cpf {
            Cpf::new(cpf)?;
        }
        Ok(())
    }
}

/// Student with its card and enrolled courses
#[derive(Debug, Clone, Serialize)]
pub struct AlunoComRelacionados {
    #[serde(flatten)]
    pub aluno: Aluno,
    pub carteira: Option<Carteira>,
    pub disciplinas: Vec<Disciplina>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_formatted_cpf() {
        assert!(Cpf::new("123.456.789-00").is_ok());
    }

    #[test]
    fn accepts_bare_digits() {
        assert!(Cpf::new("12345678900").is_ok());
    }

    #[test]
    fn rejects_empty() {
        let err = Cpf::new("").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn rejects_too_long() {
        let err = Cpf::new("123.456.789-001").unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 14, .. }));
    }

    #[test]
    fn update_payload_keeps_absent_fields_none() {
        let update: AlunoUpdate = serde_json::from_str(r#"{"nome":"Ana"}"#).unwrap();
        assert_eq!(update.nome.as_deref(), Some("Ana"));
        assert!(update.cpf.is_none());
        assert!(update.email.is_none());
    }

    #[test]
    fn create_payload_wire_format() {
        let novo: NovoAluno = serde_json::from_str(
            r#"{"nome":"Ana","cpf":"123.456.789-00","data_nascimento":"2000-01-01",
                "numero_matricula":1001,"email":"a@x.com"}"#,
        )
        .unwrap();
        assert_eq!(novo.nome, "Ana");
        assert_eq!(novo.data_nascimento, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert_eq!(novo.numero_matricula, 1001);
    }
}
