//! Genre and mission edits
//!
//! A PATCH names only the fields it changes. The row is re-read and written
//! back inside one transaction that holds the sibling group lock, so two
//! partial edits of the same row apply one after the other.

use crate::db;
use crate::error::{ApiError, ApiResult};
use chrono::NaiveDate;
use mboard_common::db::{Genre, Mission};
use sqlx::SqlitePool;
use tracing::info;

/// Field changes for a genre; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the summary
    pub summary: Option<Option<String>>,
}

impl GenreChanges {
    fn apply(self, genre: &mut Genre) {
        if let Some(name) = self.name {
            genre.name = name;
        }
        if let Some(summary) = self.summary {
            genre.summary = summary;
        }
    }
}

/// Field changes for a mission; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissionChanges {
    pub name: Option<String>,
    pub summary: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl MissionChanges {
    fn apply(self, mission: &mut Mission) {
        if let Some(name) = self.name {
            mission.name = name;
        }
        if let Some(summary) = self.summary {
            mission.summary = summary;
        }
        if let Some(due_date) = self.due_date {
            mission.due_date = due_date;
        }
    }
}

pub async fn update_genre(
    db: &SqlitePool,
    genre: &Genre,
    changes: GenreChanges,
) -> ApiResult<Genre> {
    let mut tx = db.begin().await?;
    db::GENRES.lock_group(&mut tx, &genre.user_id).await?;

    let mut current = db::genres::get_genre(&mut *tx, &genre.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Genre not found: {}", genre.id)))?;
    changes.apply(&mut current);
    db::genres::update_genre(&mut *tx, &current).await?;

    tx.commit().await?;

    info!("Updated genre {}", current.id);
    Ok(current)
}

pub async fn update_mission(
    db: &SqlitePool,
    mission: &Mission,
    changes: MissionChanges,
) -> ApiResult<Mission> {
    let mut tx = db.begin().await?;
    db::MISSIONS.lock_group(&mut tx, &mission.genre_id).await?;

    let mut current = db::missions::get_mission(&mut *tx, &mission.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Mission not found: {}", mission.id)))?;
    changes.apply(&mut current);
    db::missions::update_mission(&mut *tx, &current).await?;

    tx.commit().await?;

    info!("Updated mission {}", current.id);
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::genres::create_genre;
    use crate::db::missions::{create_mission, get_mission};
    use crate::db::users::create_user;
    use mboard_common::db::init_memory_database;

    #[tokio::test]
    async fn test_stale_copy_does_not_revert_other_fields() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "a@b.cd", None, "hash").await.unwrap();
        let genre = create_genre(&pool, &user.id, "Work", None).await.unwrap();
        let stale = create_mission(&pool, &genre.id, "Ship", None, None).await.unwrap();

        let rename = MissionChanges {
            name: Some("Launch".to_string()),
            ..Default::default()
        };
        update_mission(&pool, &stale, rename).await.unwrap();

        // Second edit still holds the pre-rename row
        let describe = MissionChanges {
            summary: Some(Some("v1".to_string())),
            due_date: Some(NaiveDate::from_ymd_opt(2025, 6, 1)),
            ..Default::default()
        };
        let updated = update_mission(&pool, &stale, describe).await.unwrap();

        assert_eq!(updated.name, "Launch");
        assert_eq!(updated.summary.as_deref(), Some("v1"));
        let stored = get_mission(&pool, &stale.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Launch");
        assert_eq!(stored.due_date, NaiveDate::from_ymd_opt(2025, 6, 1));
    }

    #[tokio::test]
    async fn test_genre_summary_clear_keeps_name() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "a@b.cd", None, "hash").await.unwrap();
        let stale = create_genre(&pool, &user.id, "Work", Some("notes")).await.unwrap();

        let rename = GenreChanges {
            name: Some("Job".to_string()),
            ..Default::default()
        };
        update_genre(&pool, &stale, rename).await.unwrap();

        let clear = GenreChanges {
            summary: Some(None),
            ..Default::default()
        };
        let updated = update_genre(&pool, &stale, clear).await.unwrap();

        assert_eq!(updated.name, "Job");
        assert!(updated.summary.is_none());
    }

    #[tokio::test]
    async fn test_vanished_row_is_not_found() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "a@b.cd", None, "hash").await.unwrap();
        let genre = create_genre(&pool, &user.id, "Work", None).await.unwrap();
        db::genres::delete_genre(&pool, &genre.id).await.unwrap();

        let result = update_genre(&pool, &genre, GenreChanges::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
