//! Database-backed tests. They need a Postgres reachable through
//! `DATABASE_URL` and are skipped when it is absent or `SKIP_DB_TESTS` is set.

use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;
use migration::MigratorTrait;

use crate::db::connect;

/// Night CRUD against the real schema
pub mod crud_tests;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connection with migrations applied, or `None` when no database is configured.
pub(crate) async fn setup_test_db() -> anyhow::Result<Option<DatabaseConnection>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    MIGRATED
        .get_or_try_init(|| async {
            let db = connect().await?;
            migration::Migrator::up(&db, None).await?;
            Ok::<(), anyhow::Error>(())
        })
        .await?;
    Ok(Some(connect().await?))
}
