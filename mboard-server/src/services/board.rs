//! Nested read model: genres → missions → tasks, each level in display order

use crate::db;
use crate::ordering::{self, display_sorted, GroupKey, Reorderable};
use mboard_common::db::{Genre, Mission, Task};
use mboard_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct GenreView {
    #[serde(flatten)]
    pub genre: Genre,
    pub incomplete_missions: usize,
    pub missions: Vec<MissionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissionView {
    #[serde(flatten)]
    pub mission: Mission,
    /// Done tasks / total tasks, 0 without tasks
    pub progress: f64,
    pub tasks: Vec<Task>,
}

impl MissionView {
    fn new(mission: Mission, tasks: Vec<Task>) -> Self {
        let (total, done) = task_counts(&tasks);
        Self {
            mission,
            progress: ordering::progress(total, done),
            tasks: display_sorted(tasks),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.group_key().complete
    }
}

impl Reorderable for MissionView {
    type Key = GroupKey;

    fn id(&self) -> &str {
        &self.mission.id
    }

    fn order(&self) -> i64 {
        self.mission.order
    }

    fn group_key(&self) -> GroupKey {
        let (total, done) = task_counts(&self.tasks);
        ordering::mission_group_key(self.mission.due_date, total, done)
    }
}

fn task_counts(tasks: &[Task]) -> (i64, i64) {
    let done = tasks.iter().filter(|t| t.done).count();
    (tasks.len() as i64, done as i64)
}

/// Load everything a user owns as a display-ordered tree
pub async fn load_board(db: &SqlitePool, user_id: &str) -> Result<Vec<GenreView>> {
    let genres = db::genres::list_genres(db, user_id).await?;
    let missions = db::missions::list_missions_for_user(db, user_id).await?;
    let tasks = db::tasks::list_tasks_for_user(db, user_id).await?;

    Ok(assemble(genres, missions, tasks))
}

fn assemble(genres: Vec<Genre>, missions: Vec<Mission>, tasks: Vec<Task>) -> Vec<GenreView> {
    let mut tasks_by_mission: HashMap<String, Vec<Task>> = HashMap::new();
    for task in tasks {
        tasks_by_mission
            .entry(task.mission_id.clone())
            .or_default()
            .push(task);
    }

    let mut missions_by_genre: HashMap<String, Vec<MissionView>> = HashMap::new();
    for mission in missions {
        let tasks = tasks_by_mission.remove(&mission.id).unwrap_or_default();
        missions_by_genre
            .entry(mission.genre_id.clone())
            .or_default()
            .push(MissionView::new(mission, tasks));
    }

    display_sorted(genres)
        .into_iter()
        .map(|genre| {
            let missions = display_sorted(missions_by_genre.remove(&genre.id).unwrap_or_default());
            let incomplete_missions = missions.iter().filter(|m| !m.is_complete()).count();
            GenreView {
                genre,
                incomplete_missions,
                missions,
            }
        })
        .collect()
}
