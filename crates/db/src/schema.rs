//! Database schema initialization for Taskboard
//!
//! Defines the SurrealDB schema for tasks and task groups, including the
//! uniqueness constraints on (name, owner) and (name, owner, group).

use crate::error::DbError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// SQL statements for schema initialization
mod sql {
    /// Define the task_group table
    pub const DEFINE_TASK_GROUP_TABLE: &str = r#"
        DEFINE TABLE IF NOT EXISTS task_group SCHEMAFULL;

        DEFINE FIELD name ON task_group TYPE string;

        DEFINE FIELD owner ON task_group TYPE int;

        DEFINE INDEX IF NOT EXISTS task_group_name_owner
            ON task_group FIELDS name, owner UNIQUE;

        DEFINE INDEX IF NOT EXISTS task_group_owner
            ON task_group FIELDS owner;
    "#;

    /// Define the task table with all fields
    pub const DEFINE_TASK_TABLE: &str = r#"
        DEFINE TABLE IF NOT EXISTS task SCHEMAFULL;

        DEFINE FIELD name ON task TYPE string;

        DEFINE FIELD description ON task TYPE option<string>;

        DEFINE FIELD due_date ON task TYPE option<string>;

        DEFINE FIELD created_at ON task TYPE datetime DEFAULT time::now();

        DEFINE FIELD finished_at ON task TYPE option<datetime>;

        DEFINE FIELD `group` ON task TYPE option<record<task_group>>;

        DEFINE FIELD owner ON task TYPE int;

        DEFINE INDEX IF NOT EXISTS task_name_owner_group
            ON task FIELDS name, owner, `group` UNIQUE;

        DEFINE INDEX IF NOT EXISTS task_owner
            ON task FIELDS owner;
    "#;
}

/// Initialize the database schema.
///
/// Creates the task_group and task tables with their fields and unique
/// indexes. The group table is defined first so the task table's record
/// reference has a target.
///
/// This function is idempotent - it can be called multiple times safely
/// as it uses `IF NOT EXISTS` clauses.
///
/// # Errors
///
/// Returns `DbError::Schema` if any schema definition fails.
pub async fn init_schema(client: &Surreal<Db>) -> Result<(), DbError> {
    client
        .query(sql::DEFINE_TASK_GROUP_TABLE)
        .await
        .map_err(|e| DbError::Schema(Box::new(e)))?;

    client
        .query(sql::DEFINE_TASK_TABLE)
        .await
        .map_err(|e| DbError::Schema(Box::new(e)))?;

    Ok(())
}
