//! Enrollment repository, including the grade-average stats query
//!
//! Enrollments are keyed by the (student, course) pair.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{
    Aluno, Disciplina, Matricula, MatriculaComRelacionados, MatriculaUpdate, NovaMatricula, Page,
};

const MATRICULA_COLUMNS: &str = "id_aluno, disciplina_id, nota_final, numero_faltas, semestre";

/// One row of the grade-average aggregate; only graded enrollments count
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaNotasPorDisciplina {
    pub disciplina: String,
    pub media_notas: f64,
    pub qtd_alunos_avaliados: i64,
}

/// Optional list filters
#[derive(Debug, Clone, Default)]
pub struct MatriculaFilter {
    pub semestre: Option<String>,
    pub nota_minima: Option<f64>,
    pub id_aluno: Option<i64>,
    pub disciplina_id: Option<i64>,
}

/// Enrollment repository
pub struct MatriculaRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MatriculaRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Enroll a student in a course. Both must exist, and the pair must
    /// not be enrolled yet.
    pub async fn create(&self, nova: NovaMatricula) -> Result<Matricula, DbError> {
        let aluno_existe: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM alunos WHERE id = $1)")
                .bind(nova.id_aluno)
                .fetch_one(self.pool)
                .await?;

        if !aluno_existe {
            return Err(DbError::NotFound {
                resource: "aluno",
                id: nova.id_aluno.to_string(),
            });
        }

        let disciplina_existe: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM disciplinas WHERE id = $1)")
                .bind(nova.disciplina_id)
                .fetch_one(self.pool)
                .await?;

        if !disciplina_existe {
            return Err(DbError::NotFound {
                resource: "disciplina",
                id: nova.disciplina_id.to_string(),
            });
        }

        let ja_matriculado: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM matriculas WHERE id_aluno = $1 AND disciplina_id = $2)",
        )
        .bind(nova.id_aluno)
        .bind(nova.disciplina_id)
        .fetch_one(self.pool)
        .await?;

        if ja_matriculado {
            return Err(DbError::Conflict {
                message: "student already enrolled in this course",
            });
        }

        let matricula = sqlx::query_as::<_, Matricula>(&format!(
            "INSERT INTO matriculas (id_aluno, disciplina_id, nota_final, numero_faltas, semestre) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {MATRICULA_COLUMNS}",
        ))
        .bind(nova.id_aluno)
        .bind(nova.disciplina_id)
        .bind(nova.nota_final)
        .bind(nova.numero_faltas.unwrap_or(0))
        .bind(&nova.semestre)
        .fetch_one(self.pool)
        .await?;

        Ok(matricula)
    }

    /// List enrollments, most recent term first.
    pub async fn list(
        &self,
        page: Page,
        filter: MatriculaFilter,
    ) -> Result<Vec<MatriculaComRelacionados>, DbError> {
        let matriculas = sqlx::query_as::<_, Matricula>(&format!(
            r#"
            SELECT {MATRICULA_COLUMNS}
            FROM matriculas
            WHERE ($1::text IS NULL OR semestre = $1)
              AND ($2::double precision IS NULL OR nota_final >= $2)
              AND ($3::bigint IS NULL OR id_aluno = $3)
              AND ($4::bigint IS NULL OR disciplina_id = $4)
            ORDER BY semestre DESC
            LIMIT $5 OFFSET $6
            "#,
        ))
        .bind(filter.semestre)
        .bind(filter.nota_minima)
        .bind(filter.id_aluno)
        .bind(filter.disciplina_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        self.attach_related(matriculas).await
    }

    /// Get one enrollment with its student and course.
    pub async fn get(
        &self,
        id_aluno: i64,
        disciplina_id: i64,
    ) -> Result<MatriculaComRelacionados, DbError> {
        let matricula = sqlx::query_as::<_, Matricula>(&format!(
            "SELECT {MATRICULA_COLUMNS} FROM matriculas WHERE id_aluno = $1 AND disciplina_id = $2",
        ))
        .bind(id_aluno)
        .bind(disciplina_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id_aluno, disciplina_id))?;

        let mut com_relacionados = self.attach_related(vec![matricula]).await?;
        Ok(com_relacionados.remove(0))
    }

    /// Apply a partial update (grade and/or absences).
    pub async fn update(
        &self,
        id_aluno: i64,
        disciplina_id: i64,
        update: MatriculaUpdate,
    ) -> Result<Matricula, DbError> {
        sqlx::query_as::<_, Matricula>(&format!(
            r#"
            UPDATE matriculas SET
                nota_final = COALESCE($3, nota_final),
                numero_faltas = COALESCE($4, numero_faltas)
            WHERE id_aluno = $1 AND disciplina_id = $2
            RETURNING {MATRICULA_COLUMNS}
            "#,
        ))
        .bind(id_aluno)
        .bind(disciplina_id)
        .bind(update.nota_final)
        .bind(update.numero_faltas)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id_aluno, disciplina_id))
    }

    /// Delete an enrollment.
    pub async fn delete(&self, id_aluno: i64, disciplina_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM matriculas WHERE id_aluno = $1 AND disciplina_id = $2")
            .bind(id_aluno)
            .bind(disciplina_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id_aluno, disciplina_id));
        }

        Ok(())
    }

    /// Grade average and graded-student count per course, over enrollments
    /// that carry a final grade. Averages are rounded to 2 decimal places.
    pub async fn stats_media_notas(&self) -> Result<Vec<MediaNotasPorDisciplina>, DbError> {
        let rows = sqlx::query_as::<_, MediaNotasPorDisciplina>(
            r#"
            SELECT
                d.nome AS disciplina,
                ROUND(AVG(m.nota_final)::numeric, 2)::double precision AS media_notas,
                COUNT(m.id_aluno) AS qtd_alunos_avaliados
            FROM disciplinas d
            JOIN matriculas m ON m.disciplina_id = d.id
            WHERE m.nota_final IS NOT NULL
            GROUP BY d.id, d.nome
            ORDER BY d.nome
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Batch-load students and courses for a set of enrollments.
    async fn attach_related(
        &self,
        matriculas: Vec<Matricula>,
    ) -> Result<Vec<MatriculaComRelacionados>, DbError> {
        if matriculas.is_empty() {
            return Ok(Vec::new());
        }

        let aluno_ids: Vec<i64> = matriculas.iter().map(|m| m.id_aluno).collect();
        let disciplina_ids: Vec<i64> = matriculas.iter().map(|m| m.disciplina_id).collect();

        let alunos = sqlx::query_as::<_, Aluno>(
            "SELECT id, nome, cpf, data_nascimento, numero_matricula, email \
             FROM alunos WHERE id = ANY($1)",
        )
        .bind(&aluno_ids)
        .fetch_all(self.pool)
        .await?;

        let disciplinas = sqlx::query_as::<_, Disciplina>(
            "SELECT id, nome, carga_horaria, id_professor, departamento_codigo \
             FROM disciplinas WHERE id = ANY($1)",
        )
        .bind(&disciplina_ids)
        .fetch_all(self.pool)
        .await?;

        let aluno_por_id: HashMap<i64, Aluno> = alunos.into_iter().map(|a| (a.id, a)).collect();
        let disciplina_por_id: HashMap<i64, Disciplina> =
            disciplinas.into_iter().map(|d| (d.id, d)).collect();

        matriculas
            .into_iter()
            .map(|matricula| {
                let aluno = aluno_por_id
                    .get(&matricula.id_aluno)
                    .cloned()
                    .ok_or_else(|| DbError::NotFound {
                        resource: "aluno",
                        id: matricula.id_aluno.to_string(),
                    })?;
                let disciplina = disciplina_por_id
                    .get(&matricula.disciplina_id)
                    .cloned()
                    .ok_or_else(|| DbError::NotFound {
                        resource: "disciplina",
                        id: matricula.disciplina_id.to_string(),
                    })?;

                Ok(MatriculaComRelacionados {
                    aluno,
                    disciplina,
                    matricula,
                })
            })
            .collect()
    }
}

fn not_found(id_aluno: i64, disciplina_id: i64) -> DbError {
    DbError::NotFound {
        resource: "matricula",
        id: format!("{}/{}", id_aluno, disciplina_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NovaDisciplina, NovoAluno};

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool");
        crate::db::migrations::run(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn missing_references_are_not_found() {
        let pool = test_pool().await;
        let repo = MatriculaRepo::new(&pool);

        let err = repo
            .create(NovaMatricula {
                id_aluno: -1,
                disciplina_id: -1,
                nota_final: None,
                numero_faltas: None,
                semestre: "25.1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "aluno", .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_pair_conflicts() {
        let pool = test_pool().await;

        let aluno = crate::db::repos::AlunoRepo::new(&pool)
            .create(NovoAluno {
                nome: "Davi Rocha".into(),
                cpf: format!("m-{}", std::process::id()),
                data_nascimento: chrono::NaiveDate::from_ymd_opt(2001, 3, 9).unwrap(),
                numero_matricula: 3003,
                email: "davi@uni.br".into(),
            })
            .await
            .expect("aluno");

        let disciplina = crate::db::repos::DisciplinaRepo::new(&pool)
            .create(NovaDisciplina {
                nome: "Algoritmos".into(),
                carga_horaria: 60,
                id_professor: None,
                departamento_codigo: None,
            })
            .await
            .expect("disciplina");

        let repo = MatriculaRepo::new(&pool);
        let nova = || NovaMatricula {
            id_aluno: aluno.id,
            disciplina_id: disciplina.id,
            nota_final: None,
            numero_faltas: None,
            semestre: "25.1".into(),
        };

        repo.create(nova()).await.expect("first enrollment");
        let err = repo.create(nova()).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        // Cascade removes the enrollment with the student
        crate::db::repos::AlunoRepo::new(&pool)
            .delete(aluno.id)
            .await
            .expect("cleanup aluno");
        crate::db::repos::DisciplinaRepo::new(&pool)
            .delete(disciplina.id)
            .await
            .expect("cleanup disciplina");
    }
}
