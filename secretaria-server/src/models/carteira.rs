//! Student ID card (carteira estudantil) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::aluno::Aluno;
use super::ValidationError;

/// Maximum length of a card registry number
const MAX_REGISTRO_LEN: usize = 10;

/// Validated card registry number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumeroRegistro(String);

impl NumeroRegistro {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty {
                field: "numero_registro",
            });
        }

        if s.len() > MAX_REGISTRO_LEN {
            return Err(ValidationError::TooLong {
                field: "numero_registro",
                max: MAX_REGISTRO_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NumeroRegistro {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Card row; `data_criacao` is set by the database on insert
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Carteira {
    pub id: i64,
    pub id_aluno: i64,
    pub validade: DateTime<Utc>,
    pub data_criacao: DateTime<Utc>,
    pub status_carteira: bool,
    pub numero_registro: String,
}

/// Create payload; `status_carteira` defaults to active
#[derive(Debug, Clone, Deserialize)]
pub struct NovaCarteira {
    pub id_aluno: i64,
    pub validade: DateTime<Utc>,
    pub numero_registro: String,
    pub status_carteira: Option<bool>,
}

impl NovaCarteira {
    /// Check field constraints before the insert.
    pub fn validate(&self) -> Result<(), ValidationError> {
        NumeroRegistro::new(&self.numero_registro)?;
        Ok(())
    }
}

/// Partial update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarteiraUpdate {
    pub validade: Option<DateTime<Utc>>,
    pub status_carteira: Option<bool>,
}

/// Card with its owning student
#[derive(Debug, Clone, Serialize)]
pub struct CarteiraComAluno {
    #[serde(flatten)]
    pub carteira: Carteira,
    pub aluno: Aluno,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_short_registro() {
        assert!(NumeroRegistro::new("REG-00042").is_ok());
    }

    #[test]
    fn rejects_empty() {
        let err = NumeroRegistro::new("").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn rejects_over_ten_chars() {
        let err = NumeroRegistro::new("12345678901").unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 10, .. }));
    }

    #[test]
    fn create_payload_defaults_status_to_none() {
        let nova: NovaCarteira = serde_json::from_str(
            r#"{"id_aluno":1,"validade":"2027-01-01T00:00:00Z","numero_registro":"R1"}"#,
        )
        .unwrap();
        assert!(nova.status_carteira.is_none());
    }
}
