use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{Result, schema};

const SCHEMA_LOCK_ID: i64 = 7_120_115;

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &autovid_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		self.execute_script(&schema::render_schema()).await
	}

	/// Creates the catalog tables the pipeline reads from. Intended for test databases.
	pub async fn ensure_catalog_fixture(&self) -> Result<()> {
		self.execute_script(&schema::render_catalog_fixture()).await
	}

	async fn execute_script(&self, sql: &str) -> Result<()> {
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(SCHEMA_LOCK_ID).execute(&mut *tx).await?;

		let mut applied = 0_usize;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;

			applied += 1;
		}

		tx.commit().await?;

		tracing::debug!(statements = applied, "Schema script applied.");

		Ok(())
	}
}
