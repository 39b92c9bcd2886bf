//! Enrollment (matricula) models and grade/absence validation
//!
//! An enrollment links one student to one course for a term, keyed by the
//! (student, course) pair.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::aluno::Aluno;
use super::disciplina::Disciplina;
use super::ValidationError;

/// Maximum length of a term code ("25.1")
const MAX_SEMESTRE_LEN: usize = 4;

/// Grades run on the 0-10 scale
const NOTA_MAX: f64 = 10.0;

/// Validated term code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Semestre(String);

impl Semestre {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "semestre" });
        }

        if s.len() > MAX_SEMESTRE_LEN {
            return Err(ValidationError::TooLong {
                field: "semestre",
                max: MAX_SEMESTRE_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Semestre {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Check a final grade is on the 0-10 scale.
pub fn validate_nota(nota: f64) -> Result<(), ValidationError> {
    if !(0.0..=NOTA_MAX).contains(&nota) {
        return Err(ValidationError::OutOfRange {
            field: "nota_final",
            reason: "must be between 0 and 10",
        });
    }
    Ok(())
}

/// Check an absence count is non-negative.
pub fn validate_faltas(faltas: i32) -> Result<(), ValidationError> {
    if faltas < 0 {
        return Err(ValidationError::OutOfRange {
            field: "numero_faltas",
            reason: "must not be negative",
        });
    }
    Ok(())
}

/// Enrollment row, keyed by (id_aluno, disciplina_id)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Matricula {
    pub id_aluno: i64,
    pub disciplina_id: i64,
    pub nota_final: Option<f64>,
    pub numero_faltas: i32,
    pub semestre: String,
}

/// Create payload; absence count defaults to 0
#[derive(Debug, Clone, Deserialize)]
pub struct NovaMatricula {
    pub id_aluno: i64,
    pub disciplina_id: i64,
    pub nota_final: Option<f64>,
    pub numero_faltas: Option<i32>,
    pub semestre: String,
}

impl NovaMatricula {
    /// Check field constraints before the insert.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Semestre::new(&self.semestre)?;
        if let Some(nota) = self.nota_final {
            validate_nota(nota)?;
        }
        if let Some(faltas) = self.numero_faltas {
            validate_faltas(faltas)?;
        }
        Ok(())
    }
}

/// Partial update payload (grade and absences only)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatriculaUpdate {
    pub nota_final: Option<f64>,
    pub numero_faltas: Option<i32>,
}

impl MatriculaUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(nota) = self.nota_final {
            validate_nota(nota)?;
        }
        if let Some(faltas) = self.numero_faltas {
            validate_faltas(faltas)?;
        }
        Ok(())
    }
}

/// Enrollment with its student and course
#[derive(Debug, Clone, Serialize)]
pub struct MatriculaComRelacionados {
    #[serde(flatten)]
    pub matricula: Matricula,
    pub aluno: Aluno,
    pub disciplina: Disciplina,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semestre_accepts_term_code() {
        assert!(Semestre::new("25.1").is_ok());
    }

    #[test]
    fn semestre_rejects_long_code() {
        let err = Semestre::new("2025.1").unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 4, .. }));
    }

    #[test]
    fn nota_bounds() {
        assert!(validate_nota(0.0).is_ok());
        assert!(validate_nota(7.5).is_ok());
        assert!(validate_nota(10.0).is_ok());
        assert!(validate_nota(-0.1).is_err());
        assert!(validate_nota(10.5).is_err());
        assert!(validate_nota(f64::NAN).is_err());
    }

    #[test]
    fn faltas_bounds() {
        assert!(validate_faltas(0).is_ok());
        assert!(validate_faltas(12).is_ok());
        assert!(validate_faltas(-1).is_err());
    }

    #[test]
    fn update_payload_grade_only() {
        let update: MatriculaUpdate = serde_json::from_str(r#"{"nota_final":8.5}"#).unwrap();
        assert_eq!(update.nota_final, Some(8.5));
        assert!(update.numero_faltas.is_none());
    }
}
