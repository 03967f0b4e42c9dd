use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    models::{
        category::{Category, CategoryWithTasks, CreateCategoryRequest, UpdateCategoryRequest},
        ListQuery,
    },
    services::tasks::{TaskParent, TaskService},
};

pub struct CategoryService;

impl CategoryService {
    pub async fn count(pool: &SqlitePool) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn list(pool: &SqlitePool, page: ListQuery) -> anyhow::Result<Vec<CategoryWithTasks>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories ORDER BY rowid LIMIT ?1 OFFSET ?2",
        )
        .bind(i64::from(page.limit))
        .bind(i64::from(page.skip))
        .fetch_all(pool)
        .await?;

        let ids: Vec<String> = categories.iter().map(|c| c.id.clone()).collect();
        let mut tasks = TaskService::list_for_parents(pool, TaskParent::Category, &ids).await?;

        Ok(categories
            .into_iter()
            .map(|category| {
                let tasks = tasks.remove(&category.id).unwrap_or_default();
                CategoryWithTasks { category, tasks }
            })
            .collect())
    }

    pub async fn get(pool: &SqlitePool, id: &str) -> anyhow::Result<Option<CategoryWithTasks>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match category {
            Some(category) => Ok(Some(Self::with_tasks(pool, category).await?)),
            None => Ok(None),
        }
    }

    pub async fn create(
        pool: &SqlitePool,
        req: &CreateCategoryRequest,
    ) -> anyhow::Result<CategoryWithTasks> {
        let now = Utc::now();
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, description, color, icon, workspace_type, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             RETURNING *",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.color)
        .bind(&req.icon)
        .bind(req.workspace_type.as_str())
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(CategoryWithTasks { category, tasks: Vec::new() })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        req: &UpdateCategoryRequest,
    ) -> anyhow::Result<Option<CategoryWithTasks>> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories
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

        match category {
            Some(category) => Ok(Some(Self::with_tasks(pool, category).await?)),
            None => Ok(None),
        }
    }

    /// Tasks filed under the category go with it (FK cascade).
    pub async fn delete(pool: &SqlitePool, id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn with_tasks(pool: &SqlitePool, category: Category) -> anyhow::Result<CategoryWithTasks> {
        let mut tasks = TaskService::list_for_parents(
            pool,
            TaskParent::Category,
            std::slice::from_ref(&category.id),
        )
        .await?;
        let tasks = tasks.remove(&category.id).unwrap_or_default();
        Ok(CategoryWithTasks { category, tasks })
    }
}
