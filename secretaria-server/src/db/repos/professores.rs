//! Professor repository

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{
    Departamento, Disciplina, NovoProfessor, Page, Professor, ProfessorComRelacionados,
    ProfessorUpdate,
};

const PROFESSOR_COLUMNS: &str = "id, nome, email, id_departamento";

/// Course row tagged with the professor teaching it
#[derive(FromRow)]
struct DisciplinaDeProfessor {
    id_professor: i64,
    #[sqlx(flatten)]
    disciplina: Disciplina,
}

/// Professor repository
pub struct ProfessorRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfessorRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a professor. The department must exist and the email be free.
    pub async fn create(&self, novo: NovoProfessor) -> Result<Professor, DbError> {
        let departamento_existe: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM departamentos WHERE id = $1)")
                .bind(novo.id_departamento)
                .fetch_one(self.pool)
                .await?;

        if !departamento_existe {
            return Err(DbError::NotFound {
                resource: "departamento",
                id: novo.id_departamento.to_string(),
            });
        }

        let email_usado: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM professores WHERE email = $1)")
                .bind(&novo.email)
                .fetch_one(self.pool)
                .await?;

        if email_usado {
            return Err(DbError::Conflict {
                message: "email already registered",
            });
        }

        let professor = sqlx::query_as::<_, Professor>(&format!(
            "INSERT INTO professores (nome, email, id_departamento) VALUES ($1, $2, $3) \
             RETURNING {PROFESSOR_COLUMNS}",
        ))
        .bind(&novo.nome)
        .bind(&novo.email)
        .bind(novo.id_departamento)
        .fetch_one(self.pool)
        .await?;

        Ok(professor)
    }

    /// List professors ordered by name, with optional filters.
    pub async fn list(
        &self,
        page: Page,
        nome: Option<&str>,
        id_departamento: Option<i64>,
    ) -> Result<Vec<ProfessorComRelacionados>, DbError> {
        let professores = sqlx::query_as::<_, Professor>(&format!(
            r#"
            SELECT {PROFESSOR_COLUMNS}
            FROM professores
            WHERE ($1::text IS NULL OR nome ILIKE '%' || $1 || '%')
              AND ($2::bigint IS NULL OR id_departamento = $2)
            ORDER BY nome
            LIMIT $3 OFFSET $4
            "#,
        ))
        .bind(nome)
        .bind(id_departamento)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        self.attach_related(professores).await
    }

    /// Get one professor with department and taught courses.
    pub async fn get(&self, id: i64) -> Result<ProfessorComRelacionados, DbError> {
        let professor = sqlx::query_as::<_, Professor>(&format!(
            "SELECT {PROFESSOR_COLUMNS} FROM professores WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "professor",
            id: id.to_string(),
        })?;

        let mut com_relacionados = self.attach_related(vec![professor]).await?;
        Ok(com_relacionados.remove(0))
    }

    /// Apply a partial update.
    pub async fn update(&self, id: i64, update: ProfessorUpdate) -> Result<Professor, DbError> {
        sqlx::query_as::<_, Professor>(&format!(
            r#"
            UPDATE professores SET
                nome = COALESCE($2, nome),
                email = COALESCE($3, email),
                id_departamento = COALESCE($4, id_departamento)
            WHERE id = $1
            RETURNING {PROFESSOR_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(update.nome)
        .bind(update.email)
        .bind(update.id_departamento)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "professor",
            id: id.to_string(),
        })
    }

    /// Delete a professor. Their courses stay, unassigned.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM professores WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "professor",
                id: id.to_string(),
            });
        }

        Ok(())
    }

    /// Batch-load departments and taught courses for a set of professors.
    async fn attach_related(
        &self,
        professores: Vec<Professor>,
    ) -> Result<Vec<ProfessorComRelacionados>, DbError> {
        if professores.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = professores.iter().map(|p| p.id).collect();
        let departamento_ids: Vec<i64> = professores.iter().map(|p| p.id_departamento).collect();

        let departamentos = sqlx::query_as::<_, Departamento>(
            "SELECT id, nome, codigo FROM departamentos WHERE id = ANY($1)",
        )
        .bind(&departamento_ids)
        .fetch_all(self.pool)
        .await?;

        let disciplinas = sqlx::query_as::<_, DisciplinaDeProfessor>(
            r#"
            SELECT id_professor, id, nome, carga_horaria, departamento_codigo
            FROM disciplinas
            WHERE id_professor = ANY($1)
            ORDER BY nome
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let departamento_por_id: HashMap<i64, Departamento> =
            departamentos.into_iter().map(|d| (d.id, d)).collect();

        let mut disciplinas_por_professor: HashMap<i64, Vec<Disciplina>> = HashMap::new();
        for row in disciplinas {
            disciplinas_por_professor
                .entry(row.id_professor)
                .or_default()
                .push(row.disciplina);
        }

        professores
            .into_iter()
            .map(|professor| {
                let departamento = departamento_por_id
                    .get(&professor.id_departamento)
                    .cloned()
                    .ok_or_else(|| DbError::NotFound {
                        resource: "departamento",
                        id: professor.id_departamento.to_string(),
                    })?;

                Ok(ProfessorComRelacionados {
                    departamento,
                    disciplinas: disciplinas_por_professor
                        .remove(&professor.id)
                        .unwrap_or_default(),
                    professor,
                })
            })
            .collect()
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
    async fn missing_department_is_not_found() {
        let pool = test_pool().await;
        let repo = ProfessorRepo::new(&pool);

        let err = repo
            .create(NovoProfessor {
                nome: "Carla Dias".into(),
                email: "carla@uni.br".into(),
                id_departamento: -1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "departamento", .. }));
    }
}
