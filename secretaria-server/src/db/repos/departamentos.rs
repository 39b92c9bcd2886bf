//! Department repository, including the professors-per-department stats query

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{
    Departamento, DepartamentoComRelacionados, DepartamentoUpdate, Disciplina, NovoDepartamento,
    Page, Professor,
};

/// One row of the professors-per-department aggregate
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfessoresPorDepartamento {
    pub departamento: String,
    pub total_professores: i64,
}

/// Department repository
pub struct DepartamentoRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> DepartamentoRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a department. Both the code and the name must be free.
    pub async fn create(&self, novo: NovoDepartamento) -> Result<Departamento, DbError> {
        let codigo_usado: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM departamentos WHERE codigo = $1)")
                .bind(&novo.codigo)
                .fetch_one(self.pool)
                .await?;

        if codigo_usado {
            return Err(DbError::Conflict {
                message: "department code already in use",
            });
        }

        let nome_usado: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM departamentos WHERE nome = $1)")
                .bind(&novo.nome)
                .fetch_one(self.pool)
                .await?;

        if nome_usado {
            return Err(DbError::Conflict {
                message: "department name already in use",
            });
        }

        let departamento = sqlx::query_as::<_, Departamento>(
            "INSERT INTO departamentos (nome, codigo) VALUES ($1, $2) RETURNING id, nome, codigo",
        )
        .bind(&novo.nome)
        .bind(&novo.codigo)
        .fetch_one(self.pool)
        .await?;

        Ok(departamento)
    }

    /// List departments with optional partial-name filter.
    pub async fn list(
        &self,
        page: Page,
        nome: Option<&str>,
    ) -> Result<Vec<DepartamentoComRelacionados>, DbError> {
        let departamentos = sqlx::query_as::<_, Departamento>(
            r#"
            SELECT id, nome, codigo
            FROM departamentos
            WHERE ($1::text IS NULL OR nome ILIKE '%' || $1 || '%')
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(nome)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        self.attach_related(departamentos).await
    }

    /// Get one department with professors and courses.
    pub async fn get(&self, id: i64) -> Result<DepartamentoComRelacionados, DbError> {
        let departamento = sqlx::query_as::<_, Departamento>(
            "SELECT id, nome, codigo FROM departamentos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "departamento",
            id: id.to_string(),
        })?;

        let mut com_relacionados = self.attach_related(vec![departamento]).await?;
        Ok(com_relacionados.remove(0))
    }

    /// Apply a partial update (name and/or code).
    pub async fn update(
        &self,
        id: i64,
        update: DepartamentoUpdate,
    ) -> Result<Departamento, DbError> {
        sqlx::query_as::<_, Departamento>(
            r#"
            UPDATE departamentos SET
                nome = COALESCE($2, nome),
                codigo = COALESCE($3, codigo)
            WHERE id = $1
            RETURNING id, nome, codigo
            "#,
        )
        .bind(id)
        .bind(update.nome)
        .bind(update.codigo)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "departamento",
            id: id.to_string(),
        })
    }

    /// Delete a department.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM departamentos WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "departamento",
                id: id.to_string(),
            });
        }

        Ok(())
    }

    /// Professor head-count per department. Departments without professors
    /// appear with a count of 0.
    pub async fn stats_professores(&self) -> Result<Vec<ProfessoresPorDepartamento>, DbError> {
        let rows = sqlx::query_as::<_, ProfessoresPorDepartamento>(
            r#"
            SELECT d.nome AS departamento, COUNT(p.id) AS total_professores
            FROM departamentos d
            LEFT JOIN professores p ON p.id_departamento = d.id
            GROUP BY d.id, d.nome
            ORDER BY d.nome
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Batch-load professors and courses for a set of departments.
    async fn attach_related(
        &self,
        departamentos: Vec<Departamento>,
    ) -> Result<Vec<DepartamentoComRelacionados>, DbError> {
        if departamentos.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = departamentos.iter().map(|d| d.id).collect();
        let codigos: Vec<String> = departamentos.iter().map(|d| d.codigo.clone()).collect();

        let professores = sqlx::query_as::<_, Professor>(
            r#"
            SELECT id, nome, email, id_departamento
            FROM professores
            WHERE id_departamento = ANY($1)
            ORDER BY nome
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let disciplinas = sqlx::query_as::<_, Disciplina>(
            r#"
            SELECT id, nome, carga_horaria, id_professor, departamento_codigo
            FROM disciplinas
            WHERE departamento_codigo = ANY($1)
            ORDER BY nome
            "#,
        )
        .bind(&codigos)
        .fetch_all(self.pool)
        .await?;

        let mut professores_por_departamento: HashMap<i64, Vec<Professor>> = HashMap::new();
        for professor in professores {
            professores_por_departamento
                .entry(professor.id_departamento)
                .or_default()
                .push(professor);
        }

        let mut disciplinas_por_codigo: HashMap<String, Vec<Disciplina>> = HashMap::new();
        for disciplina in disciplinas {
            if let Some(codigo) = disciplina.departamento_codigo.clone() {
                disciplinas_por_codigo.entry(codigo).or_default().push(disciplina);
            }
        }

        Ok(departamentos
            .into_iter()
            .map(|departamento| DepartamentoComRelacionados {
                professores: professores_por_departamento
                    .remove(&departamento.id)
                    .unwrap_or_default(),
                disciplinas: disciplinas_por_codigo
                    .remove(&departamento.codigo)
                    .unwrap_or_default(),
                departamento,
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
    async fn partial_update_keeps_other_fields() {
        let pool = test_pool().await;
        let repo = DepartamentoRepo::new(&pool);

        let suffix = std::process::id() % 10000;
        let criado = repo
            .create(NovoDepartamento {
                nome: format!("Dep {}", suffix),
                codigo: format!("D{}", suffix),
            })
            .await
            .expect("create");

        let atualizado = repo
            .update(
                criado.id,
                DepartamentoUpdate {
                    nome: Some(format!("Dep {} Renomeado", suffix)),
                    codigo: None,
                },
            )
            .await
            .expect("update");

        assert_eq!(atualizado.codigo, criado.codigo);
        assert_ne!(atualizado.nome, criado.nome);

        repo.delete(criado.id).await.expect("cleanup");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_code_conflicts() {
        let pool = test_pool().await;
        let repo = DepartamentoRepo::new(&pool);

        let suffix = std::process::id() % 10000;
        let criado = repo
            .create(NovoDepartamento {
                nome: format!("Dup {}", suffix),
                codigo: format!("X{}", suffix),
            })
            .await
            .expect("create");

        let err = repo
            .create(NovoDepartamento {
                nome: format!("Outro {}", suffix),
                codigo: criado.codigo.clone(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        repo.delete(criado.id).await.expect("cleanup");
    }
}
