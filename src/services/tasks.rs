use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{
    task::{CreateTaskRequest, Task, UpdateTaskRequest},
    ListQuery,
};

/// The owning side of a task's foreign keys.
#[derive(Debug, Clone, Copy)]
pub enum TaskParent {
    Project,
    Category,
}

impl TaskParent {
    fn column(self) -> &'static str {
        match self {
            TaskParent::Project => "project_id",
            TaskParent::Category => "category_id",
        }
    }

    fn key(self, task: &Task) -> Option<&String> {
        match self {
            TaskParent::Project => task.project_id.as_ref(),
            TaskParent::Category => task.category_id.as_ref(),
        }
    }
}

pub struct TaskService;

impl TaskService {
    pub async fn list(pool: &SqlitePool, page: ListQuery) -> anyhow::Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks ORDER BY rowid LIMIT ?1 OFFSET ?2",
        )
        .bind(i64::from(page.limit))
        .bind(i64::from(page.skip))
        .fetch_all(pool)
        .await?;
        Ok(tasks)
    }

    pub async fn get(pool: &SqlitePool, id: &str) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(task)
    }

    /// Fails with a foreign-key error when `project_id` or `category_id`
    /// does not reference an existing row.
    pub async fn create(pool: &SqlitePool, req: &CreateTaskRequest) -> anyhow::Result<Task> {
        let now = Utc::now();
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (id, title, description, completed, project_id, category_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, FALSE, ?4, ?5, ?6, ?6)
             RETURNING *",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.project_id)
        .bind(&req.category_id)
        .bind(now)
        .fetch_one(pool)
        .await?;
        Ok(task)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        req: &UpdateTaskRequest,
    ) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET title       = COALESCE(?1, title),
                 description = CASE WHEN ?2 THEN ?3 ELSE description END,
                 completed   = COALESCE(?4, completed),
                 updated_at  = ?5
             WHERE id = ?6
             RETURNING *",
        )
        .bind(&req.title)
        .bind(req.description.is_some())
        .bind(req.description.as_ref().and_then(|d| d.as_deref()))
        .bind(req.completed)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(task)
    }

    pub async fn toggle(pool: &SqlitePool, id: &str) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET completed = NOT completed,
                 updated_at = ?1
             WHERE id = ?2
             RETURNING *",
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(task)
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load the tasks of every listed parent in one query, keyed by parent id.
    /// Parents without tasks are absent from the map.
    pub async fn list_for_parents(
        pool: &SqlitePool,
        parent: TaskParent,
        parent_ids: &[String],
    ) -> anyhow::Result<HashMap<String, Vec<Task>>> {
        let mut grouped: HashMap<String, Vec<Task>> = HashMap::new();
        if parent_ids.is_empty() {
            return Ok(grouped);
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM tasks WHERE ");
        qb.push(parent.column()).push(" IN (");
        let mut ids = qb.separated(", ");
        for id in parent_ids {
            ids.push_bind(id.clone());
        }
        ids.push_unseparated(") ORDER BY rowid");

        let tasks = qb.build_query_as::<Task>().fetch_all(pool).await?;
        for task in tasks {
            if let Some(key) = parent.key(&task).cloned() {
                grouped.entry(key).or_default().push(task);
            }
        }
        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    fn new_task(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_defaults() {
        let pool = create_memory_pool().await.unwrap();
        let task = TaskService::create(&pool, &new_task("Buy milk")).await.unwrap();

        assert!(!task.id.is_empty());
        assert!(!task.completed);
        assert_eq!(task.project_id, None);
        assert_eq!(task.category_id, None);
        assert_eq!(task.created_at, task.updated_at);

        let other = TaskService::create(&pool, &new_task("Buy bread")).await.unwrap();
        assert_ne!(task.id, other.id);
    }

    #[tokio::test]
    async fn toggle_then_update_keeps_completed() {
        let pool = create_memory_pool().await.unwrap();
        let task = TaskService::create(&pool, &new_task("Buy milk")).await.unwrap();

        let toggled = TaskService::toggle(&pool, &task.id).await.unwrap().unwrap();
        assert!(toggled.completed);
        assert!(toggled.updated_at >= task.updated_at);
        assert_eq!(toggled.created_at, task.created_at);

        let req = UpdateTaskRequest {
            title: Some("Buy oat milk".to_string()),
            ..Default::default()
        };
        let updated = TaskService::update(&pool, &task.id, &req).await.unwrap().unwrap();
        assert_eq!(updated.title, "Buy oat milk");
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn toggle_twice_restores_state() {
        let pool = create_memory_pool().await.unwrap();
        let task = TaskService::create(&pool, &new_task("t")).await.unwrap();

        let first = TaskService::toggle(&pool, &task.id).await.unwrap().unwrap();
        let second = TaskService::toggle(&pool, &task.id).await.unwrap().unwrap();
        assert!(first.completed);
        assert!(!second.completed);
    }

    #[tokio::test]
    async fn partial_update_leaves_absent_fields() {
        let pool = create_memory_pool().await.unwrap();
        let req = CreateTaskRequest {
            title: "Write report".to_string(),
            description: Some("quarterly".to_string()),
            ..Default::default()
        };
        let task = TaskService::create(&pool, &req).await.unwrap();

        let patch = UpdateTaskRequest {
            completed: Some(true),
            ..Default::default()
        };
        let updated = TaskService::update(&pool, &task.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "Write report");
        assert_eq!(updated.description.as_deref(), Some("quarterly"));
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn explicit_null_clears_description() {
        let pool = create_memory_pool().await.unwrap();
        let req = CreateTaskRequest {
            title: "Write report".to_string(),
            description: Some("quarterly".to_string()),
            ..Default::default()
        };
        let task = TaskService::create(&pool, &req).await.unwrap();

        let patch = UpdateTaskRequest {
            description: Some(None),
            ..Default::default()
        };
        let updated = TaskService::update(&pool, &task.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.title, "Write report");
    }

    #[tokio::test]
    async fn missing_id_is_not_found_without_writes() {
        let pool = create_memory_pool().await.unwrap();
        let task = TaskService::create(&pool, &new_task("keep")).await.unwrap();

        assert!(TaskService::get(&pool, "nope").await.unwrap().is_none());
        assert!(TaskService::toggle(&pool, "nope").await.unwrap().is_none());
        let patch = UpdateTaskRequest {
            title: Some("changed".to_string()),
            ..Default::default()
        };
        assert!(TaskService::update(&pool, "nope", &patch).await.unwrap().is_none());
        assert!(!TaskService::delete(&pool, "nope").await.unwrap());

        let unchanged = TaskService::get(&pool, &task.id).await.unwrap().unwrap();
        assert_eq!(unchanged, task);
    }

    #[tokio::test]
    async fn delete_removes_task() {
        let pool = create_memory_pool().await.unwrap();
        let task = TaskService::create(&pool, &new_task("gone")).await.unwrap();

        assert!(TaskService::delete(&pool, &task.id).await.unwrap());
        assert!(TaskService::get(&pool, &task.id).await.unwrap().is_none());
        assert!(!TaskService::delete(&pool, &task.id).await.unwrap());
    }

    #[tokio::test]
    async fn list_respects_order_skip_and_limit() {
        let pool = create_memory_pool().await.unwrap();
        for title in ["a", "b", "c", "d"] {
            TaskService::create(&pool, &new_task(title)).await.unwrap();
        }

        let all = TaskService::list(&pool, ListQuery::default()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c", "d"]);

        let page = TaskService::list(&pool, ListQuery { skip: 1, limit: 2 }).await.unwrap();
        let titles: Vec<_> = page.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["b", "c"]);

        let past_end = TaskService::list(&pool, ListQuery { skip: 10, limit: 5 }).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn unknown_project_reference_is_rejected() {
        let pool = create_memory_pool().await.unwrap();
        let req = CreateTaskRequest {
            title: "orphan".to_string(),
            project_id: Some("missing-project".to_string()),
            ..Default::default()
        };

        assert!(TaskService::create(&pool, &req).await.is_err());
        assert!(TaskService::list(&pool, ListQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_refreshes_updated_at() {
        let pool = create_memory_pool().await.unwrap();
        let task = TaskService::create(&pool, &new_task("t")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let toggled = TaskService::toggle(&pool, &task.id).await.unwrap().unwrap();
        assert!(toggled.updated_at > task.updated_at);
        assert_eq!(toggled.created_at, task.created_at);
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_even_when_empty() {
        let pool = create_memory_pool().await.unwrap();
        let task = TaskService::create(&pool, &new_task("t")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = TaskService::update(&pool, &task.id, &UpdateTaskRequest::default())
            .await
            .unwrap()
            .unwrap();
        assert!(updated.updated_at > task.updated_at);
        assert_eq!(updated.created_at, task.created_at);
        assert_eq!(updated.title, task.title);
    }
}
