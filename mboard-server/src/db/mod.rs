//! Entity queries
//!
//! Single-statement queries take any [`sqlx::SqliteExecutor`] so they run
//! against the pool or inside a transaction alike. Sibling lists come back in
//! persisted order; display order is the ordering engine's job.

pub mod genres;
pub mod missions;
pub mod sessions;
pub mod tasks;
pub mod users;

use mboard_common::Result;
use sqlx::SqliteConnection;

/// A table whose rows are ordered among siblings sharing a parent column
#[derive(Debug, Clone, Copy)]
pub struct SiblingTable {
    pub table: &'static str,
    pub parent_column: &'static str,
}

pub const GENRES: SiblingTable = SiblingTable {
    table: "genres",
    parent_column: "user_id",
};

pub const MISSIONS: SiblingTable = SiblingTable {
    table: "missions",
    parent_column: "genre_id",
};

pub const TASKS: SiblingTable = SiblingTable {
    table: "tasks",
    parent_column: "mission_id",
};

impl SiblingTable {
    /// Take the database write lock on behalf of a sibling group
    ///
    /// Must be the first statement of a transaction: it upgrades the
    /// transaction to a writer before any sibling is read, so a concurrent
    /// reorder of the same group waits for this one to commit.
    pub async fn lock_group(&self, conn: &mut SqliteConnection, parent_id: &str) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET sort_order = sort_order WHERE {} = ?",
            self.table, self.parent_column
        );
        sqlx::query(&sql).bind(parent_id).execute(conn).await?;
        Ok(())
    }

    /// Persist a new order value for one row
    pub async fn set_order(&self, conn: &mut SqliteConnection, id: &str, order: i64) -> Result<()> {
        let sql = format!("UPDATE {} SET sort_order = ? WHERE id = ?", self.table);
        sqlx::query(&sql).bind(order).bind(id).execute(conn).await?;
        Ok(())
    }
}
