//! Database migrations for the academic-records schema
//!
//! Tables are created in dependency order: departamentos and alunos first,
//! then professores, disciplinas, and the two dependent tables (carteiras,
//! matriculas). All statements are idempotent.

use sqlx::PgPool;

/// Run all migrations.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS departamentos (
            id BIGSERIAL PRIMARY KEY,
            nome TEXT NOT NULL UNIQUE,
            codigo VARCHAR(5) NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alunos (
            id BIGSERIAL PRIMARY KEY,
            nome TEXT NOT NULL,
            cpf VARCHAR(14) NOT NULL UNIQUE,
            data_nascimento DATE NOT NULL,
            numero_matricula BIGINT NOT NULL,
            email TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One card per student: id_aluno is UNIQUE, and the card goes away
    // with the student.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS carteiras (
            id BIGSERIAL PRIMARY KEY,
            id_aluno BIGINT NOT NULL UNIQUE REFERENCES alunos(id) ON DELETE CASCADE,
            validade TIMESTAMPTZ NOT NULL,
            data_criacao TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            status_carteira BOOLEAN NOT NULL DEFAULT TRUE,
            numero_registro VARCHAR(10) NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS professores (
            id BIGSERIAL PRIMARY KEY,
            nome TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            id_departamento BIGINT NOT NULL REFERENCES departamentos(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Courses reference departments by short code rather than id.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS disciplinas (
            id BIGSERIAL PRIMARY KEY,
            nome TEXT NOT NULL,
            carga_horaria INTEGER NOT NULL,
            id_professor BIGINT REFERENCES professores(id) ON DELETE SET NULL,
            departamento_codigo VARCHAR(5) REFERENCES departamentos(codigo)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matriculas (
            id_aluno BIGINT NOT NULL REFERENCES alunos(id) ON DELETE CASCADE,
            disciplina_id BIGINT NOT NULL REFERENCES disciplinas(id) ON DELETE CASCADE,
            nota_final DOUBLE PRECISION,
            numero_faltas INTEGER NOT NULL DEFAULT 0,
            semestre VARCHAR(4) NOT NULL,
            PRIMARY KEY (id_aluno, disciplina_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_are_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool");

        run(&pool).await.expect("first run");
        run(&pool).await.expect("second run");
    }
}
