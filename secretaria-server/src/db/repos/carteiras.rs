//! Student card repository
//!
//! Cards are 1:1 with students, so reads join alunos in a single query.

use sqlx::{PgPool, Row};

use super::DbError;
use crate::models::{
    Aluno, Carteira, CarteiraComAluno, CarteiraUpdate, NovaCarteira, Page,
};

/// Card repository
pub struct CarteiraRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CarteiraRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Issue a card. The student must exist, must not already hold a card,
    /// and the registry number must be free.
    pub async fn create(&self, nova: NovaCarteira) -> Result<Carteira, DbError> {
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

        let ja_possui: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM carteiras WHERE id_aluno = $1)")
                .bind(nova.id_aluno)
                .fetch_one(self.pool)
                .await?;

        if ja_possui {
            return Err(DbError::Conflict {
                message: "student already has a card",
            });
        }

        let registro_usado: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM carteiras WHERE numero_registro = $1)")
                .bind(&nova.numero_registro)
                .fetch_one(self.pool)
                .await?;

        if registro_usado {
            return Err(DbError::Conflict {
                message: "registry number already in use",
            });
        }

        let carteira = sqlx::query_as::<_, Carteira>(
            r#"
            INSERT INTO carteiras (id_aluno, validade, status_carteira, numero_registro)
            VALUES ($1, $2, $3, $4)
            RETURNING id, id_aluno, validade, data_criacao, status_carteira, numero_registro
            "#,
        )
        .bind(nova.id_aluno)
        .bind(nova.validade)
        .bind(nova.status_carteira.unwrap_or(true))
        .bind(&nova.numero_registro)
        .fetch_one(self.pool)
        .await?;

        Ok(carteira)
    }

    /// List cards with their students, newest first.
    ///
    /// `somente_validas` keeps only cards whose validity window is still open.
    pub async fn list(
        &self,
        page: Page,
        status_ativa: Option<bool>,
        somente_validas: bool,
    ) -> Result<Vec<CarteiraComAluno>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                c.id, c.id_aluno, c.validade, c.data_criacao, c.status_carteira, c.numero_registro,
                a.nome AS aluno_nome, a.cpf AS aluno_cpf,
                a.data_nascimento AS aluno_data_nascimento,
                a.numero_matricula AS aluno_numero_matricula, a.email AS aluno_email
            FROM carteiras c
            JOIN alunos a ON a.id = c.id_aluno
            WHERE ($1::boolean IS NULL OR c.status_carteira = $1)
              AND (NOT $2 OR c.validade > NOW())
            ORDER BY c.data_criacao DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(status_ativa)
        .bind(somente_validas)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_carteira_com_aluno).collect())
    }

    /// Get one card with its student.
    pub async fn get(&self, id: i64) -> Result<CarteiraComAluno, DbError> {
        let row = sqlx::query(
            r#"
            SELECT
                c.id, c.id_aluno, c.validade, c.data_criacao, c.status_carteira, c.numero_registro,
                a.nome AS aluno_nome, a.cpf AS aluno_cpf,
                a.data_nascimento AS aluno_data_nascimento,
                a.numero_matricula AS aluno_numero_matricula, a.email AS aluno_email
            FROM carteiras c
            JOIN alunos a ON a.id = c.id_aluno
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "carteira",
            id: id.to_string(),
        })?;

        Ok(row_to_carteira_com_aluno(row))
    }

    /// Find cards by partial student name.
    pub async fn busca_por_aluno(&self, nome_aluno: &str) -> Result<Vec<CarteiraComAluno>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                c.id, c.id_aluno, c.validade, c.data_criacao, c.status_carteira, c.numero_registro,
                a.nome AS aluno_nome, a.cpf AS aluno_cpf,
                a.data_nascimento AS aluno_data_nascimento,
                a.numero_matricula AS aluno_numero_matricula, a.email AS aluno_email
            FROM carteiras c
            JOIN alunos a ON a.id = c.id_aluno
            WHERE a.nome ILIKE '%' || $1 || '%'
            ORDER BY c.data_criacao DESC
            "#,
        )
        .bind(nome_aluno)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_carteira_com_aluno).collect())
    }

    /// Apply a partial update (validity and/or status).
    pub async fn update(&self, id: i64, update: CarteiraUpdate) -> Result<Carteira, DbError> {
        sqlx::query_as::<_, Carteira>(
            r#"
            UPDATE carteiras SET
                validade = COALESCE($2, validade),
                status_carteira = COALESCE($3, status_carteira)
            WHERE id = $1
            RETURNING id, id_aluno, validade, data_criacao, status_carteira, numero_registro
            "#,
        )
        .bind(id)
        .bind(update.validade)
        .bind(update.status_carteira)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "carteira",
            id: id.to_string(),
        })
    }

    /// Delete a card.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM carteiras WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "carteira",
                id: id.to_string(),
            });
        }

        Ok(())
    }
}

fn row_to_carteira_com_aluno(row: sqlx::postgres::PgRow) -> CarteiraComAluno {
    CarteiraComAluno {
        carteira: Carteira {
            id: row.get("id"),
            id_aluno: row.get("id_aluno"),
            validade: row.get("validade"),
            data_criacao: row.get("data_criacao"),
            status_carteira: row.get("status_carteira"),
            numero_registro: row.get("numero_registro"),
        },
        aluno: Aluno {
            id: row.get("id_aluno"),
            nome: row.get("aluno_nome"),
            cpf: row.get("aluno_cpf"),
            data_nascimento: row.get("aluno_data_nascimento"),
            numero_matricula: row.get("aluno_numero_matricula"),
            email: row.get("aluno_email"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NovoAluno;

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool");
        crate::db::migrations::run(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn second_card_for_same_student_conflicts() {
        let pool = test_pool().await;

        let aluno = crate::db::repos::AlunoRepo::new(&pool)
            .create(NovoAluno {
                nome: "Bruno Lima".into(),
                cpf: format!("cc-{}", std::process::id()),
                data_nascimento: chrono::NaiveDate::from_ymd_opt(1999, 6, 15).unwrap(),
                numero_matricula: 2002,
                email: "bruno@uni.br".into(),
            })
            .await
            .expect("aluno");

        let repo = CarteiraRepo::new(&pool);
        let nova = |registro: String| NovaCarteira {
            id_aluno: aluno.id,
            validade: chrono::Utc::now() + chrono::Duration::days(365),
            numero_registro: registro,
            status_carteira: None,
        };

        let carteira = repo
            .create(nova(format!("a{}", aluno.id)))
            .await
            .expect("first card");
        assert!(carteira.status_carteira);

        let err = repo.create(nova(format!("b{}", aluno.id))).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        crate::db::repos::AlunoRepo::new(&pool)
            .delete(aluno.id)
            .await
            .expect("cleanup");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn card_for_missing_student_is_not_found() {
        let pool = test_pool().await;
        let repo = CarteiraRepo::new(&pool);

        let err = repo
            .create(NovaCarteira {
                id_aluno: -1,
                validade: chrono::Utc::now(),
                numero_registro: "x".into(),
                status_carteira: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "aluno", .. }));
    }
}
