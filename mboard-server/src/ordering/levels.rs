//! [`Reorderable`] for each level of the hierarchy

use super::{GroupKey, Reorderable};
use crate::db::missions::MissionProgress;
use chrono::NaiveDate;
use mboard_common::db::{Genre, Task};

/// Fraction of done tasks, 0.0 for a mission with no tasks
pub fn progress(task_count: i64, done_count: i64) -> f64 {
    if task_count <= 0 {
        0.0
    } else {
        done_count as f64 / task_count as f64
    }
}

/// Group key of a mission: complete once it has tasks and all of them are done
pub fn mission_group_key(due_date: Option<NaiveDate>, task_count: i64, done_count: i64) -> GroupKey {
    GroupKey {
        complete: task_count > 0 && done_count >= task_count,
        due_date,
    }
}

impl Reorderable for Genre {
    type Key = ();

    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn group_key(&self) -> Self::Key {}
}

impl Reorderable for MissionProgress {
    type Key = GroupKey;

    fn id(&self) -> &str {
        &self.mission.id
    }

    fn order(&self) -> i64 {
        self.mission.order
    }

    fn group_key(&self) -> GroupKey {
        mission_group_key(self.mission.due_date, self.task_count, self.done_count)
    }
}

impl Reorderable for Task {
    type Key = GroupKey;

    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn group_key(&self) -> GroupKey {
        GroupKey {
            complete: self.done,
            due_date: self.due_date,
        }
    }
}
