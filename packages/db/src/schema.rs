//! Database schema definitions using SurrealQL.

use crate::{Database, DbError};

/// Initialize the database schema.
///
/// Idempotent; safe to run on every startup.
pub async fn init_schema(db: &Database) -> Result<(), DbError> {
    tracing::info!("Initializing database schema...");

    db.query(JOB_SCHEMA).await?.check()?;
    db.query(JOB_SEQUENCE_SCHEMA).await?.check()?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Job table schema.
const JOB_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS job SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS job_id ON job TYPE int READONLY;
DEFINE FIELD IF NOT EXISTS task_name ON job TYPE string READONLY
    ASSERT string::len(string::trim($value)) > 0;
DEFINE FIELD IF NOT EXISTS payload ON job TYPE string DEFAULT "{}" READONLY;
DEFINE FIELD IF NOT EXISTS priority ON job TYPE string READONLY
    ASSERT $value INSIDE ["Low", "Medium", "High"];
DEFINE FIELD IF NOT EXISTS status ON job TYPE string DEFAULT "pending"
    ASSERT $value INSIDE ["pending", "running", "completed"];
DEFINE FIELD IF NOT EXISTS created_at ON job TYPE datetime DEFAULT time::now() READONLY;
DEFINE FIELD IF NOT EXISTS updated_at ON job TYPE datetime DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS completed_at ON job TYPE option<datetime>;

DEFINE INDEX IF NOT EXISTS job_id_unique ON job FIELDS job_id UNIQUE;
DEFINE INDEX IF NOT EXISTS job_status ON job FIELDS status;
DEFINE INDEX IF NOT EXISTS job_priority ON job FIELDS priority;
DEFINE INDEX IF NOT EXISTS job_created ON job FIELDS created_at;
"#;

/// Monotonic id source; one record, `job_seq:jobs`, whose `n` is the last id handed out.
const JOB_SEQUENCE_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS job_seq SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS n ON job_seq TYPE int DEFAULT 0;
"#;
