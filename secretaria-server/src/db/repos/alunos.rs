//! Student repository
//!
//! List and get embed the student's card (1:1) and enrolled courses
//! (via matriculas), loaded in batch.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{Aluno, AlunoComRelacionados, AlunoUpdate, Carteira, Disciplina, NovoAluno, Page};

/// Course row tagged with the student it came from
#[derive(FromRow)]
struct DisciplinaDeAluno {
    id_aluno: i64,
    #[sqlx(flatten)]
    disciplina: Disciplina,
}

/// Student repository
pub struct AlunoRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AlunoRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a student after checking the CPF is not taken.
    pub async fn create(&self, novo: NovoAluno) -> Result<Aluno, DbError> {
        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM alunos WHERE cpf = $1)")
            .bind(&novo.cpf)
            .fetch_one(self.pool)
            .await?;

        if taken {
            return Err(DbError::Conflict {
                message: "cpf already registered",
            });
        }

        let aluno = sqlx::query_as::<_, Aluno>(
            r#"
            INSERT INTO alunos (nome, cpf, data_nascimento, numero_matricula, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, nome, cpf, data_nascimento, numero_matricula, email
            "#,
        )
        .bind(&novo.nome)
        .bind(&novo.cpf)
        .bind(novo.data_nascimento)
        .bind(novo.numero_matricula)
        .bind(&novo.email)
        .fetch_one(self.pool)
        .await?;

        Ok(aluno)
    }

    /// List students with optional partial-name and birth-year filters.
    pub async fn list(
        &self,
        page: Page,
        nome: Option<&str>,
        ano_nascimento: Option<i32>,
    ) -> Result<Vec<AlunoComRelacionados>, DbError> {
        let alunos = sqlx::query_as::<_, Aluno>(
            r#"
            SELECT id, nome, cpf, data_nascimento, numero_matricula, email
            FROM alunos
            WHERE ($1::text IS NULL OR nome ILIKE '%' || $1 || '%')
              AND ($2::int IS NULL OR EXTRACT(YEAR FROM data_nascimento)::int = $2)
            ORDER BY id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(nome)
        .bind(ano_nascimento)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        self.attach_related(alunos).await
    }

    /// Get one student with card and courses.
    pub async fn get(&self, id: i64) -> Result<AlunoComRelacionados, DbError> {
        let aluno = sqlx::query_as::<_, Aluno>(
            "SELECT id, nome, cpf, data_nascimento, numero_matricula, email FROM alunos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "aluno",
            id: id.to_string(),
        })?;

        let mut com_relacionados = self.attach_related(vec![aluno]).await?;
        Ok(com_relacionados.remove(0))
    }

    /// Apply a partial update; absent fields keep their current value.
    pub async fn update(&self, id: i64, update: AlunoUpdate) -> Result<Aluno, DbError> {
        sqlx::query_as::<_, Aluno>(
            r#"
            UPDATE alunos SET
                nome = COALESCE($2, nome),
                cpf = COALESCE($3, cpf),
                data_nascimento = COALESCE($4, data_nascimento),
                numero_matricula = COALESCE($5, numero_matricula),
                email = COALESCE($6, email)
            WHERE id = $1
            RETURNING id, nome, cpf, data_nascimento, numero_matricula, email
            "#,
        )
        .bind(id)
        .bind(update.nome)
        .bind(update.cpf)
        .bind(update.data_nascimento)
        .bind(update.numero_matricula)
        .bind(update.email)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "aluno",
            id: id.to_string(),
        })
    }

    /// Delete a student. The card and enrollments go with it (cascade).
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM alunos WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "aluno",
                id: id.to_string(),
            });
        }

        Ok(())
    }

    /// Batch-load cards and courses for a set of students.
    async fn attach_related(
        &self,
        alunos: Vec<Aluno>,
    ) -> Result<Vec<AlunoComRelacionados>, DbError> {
        if alunos.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = alunos.iter().map(|a| a.id).collect();

        let carteiras = sqlx::query_as::<_, Carteira>(
            r#"
            SELECT id, id_aluno, validade, data_criacao, status_carteira, numero_registro
            FROM carteiras
            WHERE id_aluno = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let disciplinas = sqlx::query_as::<_, DisciplinaDeAluno>(
            r#"
            SELECT m.id_aluno, d.id, d.nome, d.carga_horaria, d.id_professor, d.departamento_codigo
            FROM disciplinas d
            JOIN matriculas m ON m.disciplina_id = d.id
            WHERE m.id_aluno = ANY($1)
            ORDER BY d.nome
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut carteira_por_aluno: HashMap<i64, Carteira> =
            carteiras.into_iter().map(|c| (c.id_aluno, c)).collect();

        let mut disciplinas_por_aluno: HashMap<i64, Vec<Disciplina>> = HashMap::new();
        for row in disciplinas {
            disciplinas_por_aluno
                .entry(row.id_aluno)
                .or_default()
                .push(row.disciplina);
        }

        Ok(alunos
            .into_iter()
            .map(|aluno| AlunoComRelacionados {
                carteira: carteira_por_aluno.remove(&aluno.id),
                disciplinas: disciplinas_por_aluno.remove(&aluno.id).unwrap_or_default(),
                aluno,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListParams;

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool");
        crate::db::migrations::run(&pool).await.expect("migrations");
        pool
    }

    fn novo(cpf: &str) -> NovoAluno {
        NovoAluno {
            nome: "Ana Souza".into(),
            cpf: cpf.into(),
            data_nascimento: chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            numero_matricula: 1001,
            email: "ana@uni.br".into(),
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_cpf_conflicts() {
        let pool = test_pool().await;
        let repo = AlunoRepo::new(&pool);

        let cpf = format!("t-{}", std::process::id());
        let created = repo.create(novo(&cpf)).await.expect("first create");
        assert!(created.id > 0);

        let err = repo.create(novo(&cpf)).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        repo.delete(created.id).await.expect("cleanup");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn delete_cascades_to_card_and_enrollments() {
        let pool = test_pool().await;
        let repo = AlunoRepo::new(&pool);

        let cpf = format!("c-{}", std::process::id());
        let aluno = repo.create(novo(&cpf)).await.expect("create");

        sqlx::query(
            "INSERT INTO carteiras (id_aluno, validade, numero_registro) VALUES ($1, NOW() + INTERVAL '1 year', $2)",
        )
        .bind(aluno.id)
        .bind(format!("r{}", aluno.id))
        .execute(&pool)
        .await
        .expect("card insert");

        repo.delete(aluno.id).await.expect("delete");

        let remaining: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM carteiras WHERE id_aluno = $1)")
                .bind(aluno.id)
                .fetch_one(&pool)
                .await
                .expect("check");
        assert!(!remaining);
    }

    #[test]
    fn list_limit_is_capped() {
        let page = Page::from(ListParams {
            offset: None,
            limit: Some(200),
        });
        assert_eq!(page.limit, 100);
    }
}
