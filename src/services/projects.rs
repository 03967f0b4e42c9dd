use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    models::{
        project::{CreateProjectRequest, Project, ProjectWithTasks, UpdateProjectRequest},
        ListQuery,
    },
    services::tasks::{TaskParent, TaskService},
};

pub struct ProjectService;

impl ProjectService {
    /// Row count, used by the seed initializer and stats.
    pub async fn count(pool: &SqlitePool) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn list(pool: &SqlitePool, page: ListQuery) -> anyhow::Result<Vec<ProjectWithTasks>> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects ORDER BY rowid LIMIT ?1 OFFSET ?2",
        )
        .bind(i64::from(page.limit))
        .bind(i64::from(page.skip))
        .fetch_all(pool)
        .await?;

        let ids: Vec<String> = projects.iter().map(|p| p.id.clone()).collect();
        let mut tasks = TaskService::list_for_parents(pool, TaskParent::Project, &ids).await?;

        Ok(projects
            .into_iter()
            .map(|project| {
                let tasks = tasks.remove(&project.id).unwrap_or_default();
                ProjectWithTasks { project, tasks }
            })
            .collect())
    }

    pub async fn get(pool: &SqlitePool, id: &str) -> anyhow::Result<Option<ProjectWithTasks>> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match project {
            Some(project) => Ok(Some(Self::with_tasks(pool, project).await?)),
            None => Ok(None),
        }
    }

    pub async fn create(
        pool: &SqlitePool,
        req: &CreateProjectRequest,
    ) -> anyhow::Result<ProjectWithTasks> {
        let now = Utc::now();
        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, name, description, type, color, icon, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             RETURNING *",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.project_type.as_str())
        .bind(&req.color)
        .bind(&req.icon)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(ProjectWithTasks { project, tasks: Vec::new() })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        req: &UpdateProjectRequest,
    ) -> anyhow::Result<Option<ProjectWithTasks>> {
        let project = sqlx::query_as::<_, Project>(
            "UPDATE projects
             SET name        = COALESCE(?1, name),
                 description = CASE WHEN ?2 THEN ?3 ELSE description END,
                 color       = COALESCE(?4, color),
                 icon        = COALESCE(?5, icon),
                 updated_at  = ?6
             WHERE id = ?7
             RETURNING *",
        )
        .bind(&req.name)
        .bind(req.description.is_some())
        .bind(req.description.as_ref().and_then(|d| d.as_deref()))
        .bind(&req.color)
        .bind(&req.icon)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match project {
            Some(project) => Ok(Some(Self::with_tasks(pool, project).await?)),
            None => Ok(None),
        }
    }

    /// Deleting a project deletes its tasks through the FK cascade.
    pub async fn delete(pool: &SqlitePool, id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn with_tasks(pool: &SqlitePool, project: Project) -> anyhow::Result<ProjectWithTasks> {
        let mut tasks =
            TaskService::list_for_parents(pool, TaskParent::Project, std::slice::from_ref(&project.id))
                .await?;
        let tasks = tasks.remove(&project.id).unwrap_or_default();
        Ok(ProjectWithTasks { project, tasks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::models::{task::CreateTaskRequest, workspace::WorkspaceType};

    fn new_project(name: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            name: name.to_string(),
            description: None,
            project_type: WorkspaceType::Team,
            color: "bg-green-500".to_string(),
            icon: "Users".to_string(),
        }
    }

    async fn add_task(pool: &SqlitePool, title: &str, project_id: &str) -> String {
        let req = CreateTaskRequest {
            title: title.to_string(),
            project_id: Some(project_id.to_string()),
            ..Default::default()
        };
        TaskService::create(pool, &req).await.unwrap().id
    }

    #[tokio::test]
    async fn create_returns_empty_task_list() {
        let pool = create_memory_pool().await.unwrap();
        let created = ProjectService::create(&pool, &new_project("Launch")).await.unwrap();

        assert!(!created.project.id.is_empty());
        assert_eq!(created.project.project_type, "team");
        assert_eq!(created.project.created_at, created.project.updated_at);
        assert!(created.tasks.is_empty());
    }

    #[tokio::test]
    async fn get_includes_owned_tasks() {
        let pool = create_memory_pool().await.unwrap();
        let project = ProjectService::create(&pool, &new_project("Launch")).await.unwrap().project;
        add_task(&pool, "one", &project.id).await;
        add_task(&pool, "two", &project.id).await;
        TaskService::create(&pool, &CreateTaskRequest { title: "loose".into(), ..Default::default() })
            .await
            .unwrap();

        let fetched = ProjectService::get(&pool, &project.id).await.unwrap().unwrap();
        let titles: Vec<_> = fetched.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["one", "two"]);
    }

    #[tokio::test]
    async fn list_groups_tasks_per_project() {
        let pool = create_memory_pool().await.unwrap();
        let a = ProjectService::create(&pool, &new_project("A")).await.unwrap().project;
        let b = ProjectService::create(&pool, &new_project("B")).await.unwrap().project;
        add_task(&pool, "a1", &a.id).await;
        add_task(&pool, "b1", &b.id).await;
        add_task(&pool, "a2", &a.id).await;

        let listed = ProjectService::list(&pool, ListQuery::default()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].project.name, "A");
        assert_eq!(listed[0].tasks.len(), 2);
        assert_eq!(listed[1].tasks.len(), 1);
        assert_eq!(listed[1].tasks[0].title, "b1");
    }

    #[tokio::test]
    async fn update_changes_only_present_fields() {
        let pool = create_memory_pool().await.unwrap();
        let mut req = new_project("Launch");
        req.description = Some("Q3".to_string());
        let project = ProjectService::create(&pool, &req).await.unwrap().project;

        let patch = UpdateProjectRequest {
            color: Some("bg-red-500".to_string()),
            ..Default::default()
        };
        let updated = ProjectService::update(&pool, &project.id, &patch)
            .await
            .unwrap()
            .unwrap()
            .project;

        assert_eq!(updated.color, "bg-red-500");
        assert_eq!(updated.name, "Launch");
        assert_eq!(updated.description.as_deref(), Some("Q3"));
        assert_eq!(updated.icon, "Users");
        assert_eq!(updated.project_type, "team");
        assert_eq!(updated.created_at, project.created_at);
        assert!(updated.updated_at >= project.updated_at);
    }

    #[tokio::test]
    async fn update_missing_project_is_none() {
        let pool = create_memory_pool().await.unwrap();
        let patch = UpdateProjectRequest {
            name: Some("x".to_string()),
            ..Default::default()
        };
        assert!(ProjectService::update(&pool, "missing", &patch).await.unwrap().is_none());
        assert_eq!(ProjectService::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_cascades_to_tasks() {
        let pool = create_memory_pool().await.unwrap();
        let doomed = ProjectService::create(&pool, &new_project("Doomed")).await.unwrap().project;
        let kept = ProjectService::create(&pool, &new_project("Kept")).await.unwrap().project;
        let t1 = add_task(&pool, "t1", &doomed.id).await;
        let t2 = add_task(&pool, "t2", &doomed.id).await;
        let survivor = add_task(&pool, "t3", &kept.id).await;

        assert!(ProjectService::delete(&pool, &doomed.id).await.unwrap());

        assert!(ProjectService::get(&pool, &doomed.id).await.unwrap().is_none());
        assert!(TaskService::get(&pool, &t1).await.unwrap().is_none());
        assert!(TaskService::get(&pool, &t2).await.unwrap().is_none());
        assert!(TaskService::get(&pool, &survivor).await.unwrap().is_some());
        assert!(!ProjectService::delete(&pool, &doomed.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_refreshes_updated_at() {
        let pool = create_memory_pool().await.unwrap();
        let project = ProjectService::create(&pool, &new_project("Launch")).await.unwrap().project;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let patch = UpdateProjectRequest {
            name: Some("Relaunch".to_string()),
            ..Default::default()
        };
        let updated = ProjectService::update(&pool, &project.id, &patch)
            .await
            .unwrap()
            .unwrap()
            .project;
        assert!(updated.updated_at > project.updated_at);
        assert_eq!(updated.created_at, project.created_at);
    }
}
