use serde::Serialize;
use sqlx::SqlitePool;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Stats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    /// Percentage of completed tasks, two decimals; 0 when there are no tasks.
    pub completion_rate: f64,
    pub total_projects: i64,
    pub total_categories: i64,
}

impl Stats {
    pub fn from_counts(
        total_tasks: i64,
        completed_tasks: i64,
        total_projects: i64,
        total_categories: i64,
    ) -> Self {
        let completion_rate = if total_tasks > 0 {
            let rate = completed_tasks as f64 / total_tasks as f64 * 100.0;
            (rate * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            total_tasks,
            completed_tasks,
            pending_tasks: total_tasks - completed_tasks,
            completion_rate,
            total_projects,
            total_categories,
        }
    }
}

pub struct StatsService;

impl StatsService {
    pub async fn compute(pool: &SqlitePool) -> anyhow::Result<Stats> {
        let (total, completed, projects, categories): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM tasks),
                    (SELECT COUNT(*) FROM tasks WHERE completed),
                    (SELECT COUNT(*) FROM projects),
                    (SELECT COUNT(*) FROM categories)",
        )
        .fetch_one(pool)
        .await?;

        Ok(Stats::from_counts(total, completed, projects, categories))
    }
}
