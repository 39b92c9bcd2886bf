//! Course repository, including the students-per-course stats query

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{
    Aluno, Departamento, Disciplina, DisciplinaComRelacionados, DisciplinaUpdate, NovaDisciplina,
    Page, Professor,
};

const DISCIPLINA_COLUMNS: &str = "id, nome, carga_horaria, id_professor, departamento_codigo";

/// One row of the students-per-course aggregate
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlunosPorDisciplina {
    pub disciplina: String,
    pub total_alunos: i64,
}

/// Student row tagged with the course it is enrolled in
#[derive(FromRow)]
struct AlunoDeDisciplina {
    disciplina_id: i64,
    #[sqlx(flatten)]
    aluno: Aluno,
}

/// Course repository
pub struct DisciplinaRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> DisciplinaRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a course. Referenced professor and department (when given)
    /// must exist.
    pub async fn create(&self, nova: NovaDisciplina) -> Result<Disciplina, DbError> {
        if let Some(id_professor) = nova.id_professor {
            let existe: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM professores WHERE id = $1)")
                    .bind(id_professor)
                    .fetch_one(self.pool)
                    .await?;

            if !existe {
                return Err(DbError::NotFound {
                    resource: "professor",
                    id: id_professor.to_string(),
                });
            }
        }

        if let Some(codigo) = &nova.departamento_codigo {
            let existe: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM departamentos WHERE codigo = $1)")
                    .bind(codigo)
                    .fetch_one(self.pool)
                    .await?;

            if !existe {
                return Err(DbError::NotFound {
                    resource: "departamento",
                    id: codigo.clone(),
                });
            }
        }

        let disciplina = sqlx::query_as::<_, Disciplina>(&format!(
            "INSERT INTO disciplinas (nome, carga_horaria, id_professor, departamento_codigo) \
             VALUES ($1, $2, $3, $4) RETURNING {DISCIPLINA_COLUMNS}",
        ))
        .bind(&nova.nome)
        .bind(nova.carga_horaria)
        .bind(nova.id_professor)
        .bind(&nova.departamento_codigo)
        .fetch_one(self.pool)
        .await?;

        Ok(disciplina)
    }

    /// List courses ordered by name, with optional filters.
    pub async fn list(
        &self,
        page: Page,
        nome: Option<&str>,
        id_professor: Option<i64>,
        cod_departamento: Option<&str>,
    ) -> Result<Vec<DisciplinaComRelacionados>, DbError> {
        let disciplinas = sqlx::query_as::<_, Disciplina>(&format!(
            r#"
            SELECT {DISCIPLINA_COLUMNS}
            FROM disciplinas
            WHERE ($1::text IS NULL OR nome ILIKE '%' || $1 || '%')
              AND ($2::bigint IS NULL OR id_professor = $2)
              AND ($3::text IS NULL OR departamento_codigo = $3)
            ORDER BY nome
            LIMIT $4 OFFSET $5
            "#,
        ))
        .bind(nome)
        .bind(id_professor)
        .bind(cod_departamento)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        self.attach_related(disciplinas).await
    }

    /// Get one course with professor, department, and enrolled students.
    pub async fn get(&self, id: i64) -> Result<DisciplinaComRelacionados, DbError> {
        let disciplina = sqlx::query_as::<_, Disciplina>(&format!(
            "SELECT {DISCIPLINA_COLUMNS} FROM disciplinas WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "disciplina",
            id: id.to_string(),
        })?;

        let mut com_relacionados = self.attach_related(vec![disciplina]).await?;
        Ok(com_relacionados.remove(0))
    }

    /// Apply a partial update.
    pub async fn update(&self, id: i64, update: DisciplinaUpdate) -> Result<Disciplina, DbError> {
        sqlx::query_as::<_, Disciplina>(&format!(
            r#"
            UPDATE disciplinas SET
                nome = COALESCE($2, nome),
                carga_horaria = COALESCE($3, carga_horaria),
                id_professor = COALESCE($4, id_professor),
                departamento_codigo = COALESCE($5, departamento_codigo)
            WHERE id = $1
            RETURNING {DISCIPLINA_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(update.nome)
        .bind(update.carga_horaria)
        .bind(update.id_professor)
        .bind(update.departamento_codigo)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "disciplina",
            id: id.to_string(),
        })
    }

    /// Delete a course. Its enrollments go with it (cascade).
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM disciplinas WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "disciplina",
                id: id.to_string(),
            });
        }

        Ok(())
    }

    /// Enrolled-student count per course. Courses without enrollments
    /// appear with a count of 0.
    pub async fn stats_alunos(&self) -> Result<Vec<AlunosPorDisciplina>, DbError> {
        let rows = sqlx::query_as::<_, AlunosPorDisciplina>(
            r#"
            SELECT d.nome AS disciplina, COUNT(m.id_aluno) AS total_alunos
            FROM disciplinas d
            LEFT JOIN matriculas m ON m.disciplina_id = d.id
            GROUP BY d.id, d.nome
            ORDER BY d.nome
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Batch-load professor, department, and students for a set of courses.
    async fn attach_related(
        &self,
        disciplinas: Vec<Disciplina>,
    ) -> Result<Vec<DisciplinaComRelacionados>, DbError> {
        if disciplinas.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = disciplinas.iter().map(|d| d.id).collect();
        let professor_ids: Vec<i64> = disciplinas.iter().filter_map(|d| d.id_professor).collect();
        let codigos: Vec<String> = disciplinas
            .iter()
            .filter_map(|d| d.departamento_codigo.clone())
            .collect();

        let professores = sqlx::query_as::<_, Professor>(
            "SELECT id, nome, email, id_departamento FROM professores WHERE id = ANY($1)",
        )
        .bind(&professor_ids)
        .fetch_all(self.pool)
        .await?;

        let departamentos = sqlx::query_as::<_, Departamento>(
            "SELECT id, nome, codigo FROM departamentos WHERE codigo = ANY($1)",
        )
        .bind(&codigos)
        .fetch_all(self.pool)
        .await?;

        let alunos = sqlx::query_as::<_, AlunoDeDisciplina>(
            r#"
            SELECT m.disciplina_id, a.id, a.nome, a.cpf, a.data_nascimento,
                   a.numero_matricula, a.email
            FROM alunos a
            JOIN matriculas m ON m.id_aluno = a.id
            WHERE m.disciplina_id = ANY($1)
            ORDER BY a.nome
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let professor_por_id: HashMap<i64, Professor> =
            professores.into_iter().map(|p| (p.id, p)).collect();
        let departamento_por_codigo: HashMap<String, Departamento> =
            departamentos.into_iter().map(|d| (d.codigo.clone(), d)).collect();

        let mut alunos_por_disciplina: HashMap<i64, Vec<Aluno>> = HashMap::new();
        for row in alunos {
            alunos_por_disciplina
                .entry(row.disciplina_id)
                .or_default()
                .push(row.aluno);
        }

        Ok(disciplinas
            .into_iter()
            .map(|disciplina| DisciplinaComRelacionados {
                professor: disciplina
                    .id_professor
                    .and_then(|id| professor_por_id.get(&id).cloned()),
                departamento: disciplina
                    .departamento_codigo
                    .as_ref()
                    .and_then(|codigo| departamento_por_codigo.get(codigo).cloned()),
                alunos: alunos_por_disciplina.remove(&disciplina.id).unwrap_or_default(),
                disciplina,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool");
        crate::db::migrations::run(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn missing_professor_is_not_found() {
        let pool = test_pool().await;
        let repo = DisciplinaRepo::new(&pool);

        let err = repo
            .create(NovaDisciplina {
                nome: "Estruturas de Dados".into(),
                carga_horaria: 60,
                id_professor: Some(-1),
                departamento_codigo: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "professor", .. }));
    }
}
