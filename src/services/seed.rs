use sqlx::SqlitePool;
use tracing::{error, info};

use crate::{
    models::{
        category::CreateCategoryRequest, project::CreateProjectRequest, workspace::WorkspaceType,
    },
    services::{categories::CategoryService, projects::ProjectService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { projects: usize, categories: usize },
    Skipped,
}

fn default_project() -> CreateProjectRequest {
    CreateProjectRequest {
        name: "チームプロジェクト".into(),
        description: Some("チームで共有するプロジェクト".into()),
        project_type: WorkspaceType::Team,
        color: "bg-green-500".into(),
        icon: "Users".into(),
    }
}

fn default_categories() -> Vec<CreateCategoryRequest> {
    [
        ("仕事", "仕事関連のタスク", "bg-blue-500", "Building2"),
        ("家庭", "家庭・プライベートのタスク", "bg-pink-500", "Heart"),
        ("その他", "その他のタスク", "bg-gray-500", "Star"),
    ]
    .into_iter()
    .map(|(name, description, color, icon)| CreateCategoryRequest {
        name: name.into(),
        description: Some(description.into()),
        color: color.into(),
        icon: icon.into(),
        workspace_type: WorkspaceType::Personal,
    })
    .collect()
}

/// Insert the default project and categories when both tables are empty.
pub async fn seed_defaults(pool: &SqlitePool) -> anyhow::Result<SeedOutcome> {
    let projects = ProjectService::count(pool).await?;
    let categories = CategoryService::count(pool).await?;
    if projects > 0 || categories > 0 {
        return Ok(SeedOutcome::Skipped);
    }

    ProjectService::create(pool, &default_project()).await?;
    let defaults = default_categories();
    for category in &defaults {
        CategoryService::create(pool, category).await?;
    }

    Ok(SeedOutcome::Seeded { projects: 1, categories: defaults.len() })
}

/// Startup hook: never fails, a seeding error is logged and startup continues.
pub async fn init_database(pool: &SqlitePool) {
    match seed_defaults(pool).await {
        Ok(SeedOutcome::Seeded { projects, categories }) => {
            info!("Seeded {} default project(s) and {} categories", projects, categories)
        }
        Ok(SeedOutcome::Skipped) => info!("Existing data found, skipping seed"),
        Err(e) => error!("Seeding default data failed: {e:#}"),
    }
}
