use crate::domain::{models::experience::Experience, ports::ExperienceRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteExperienceRepo {
    pool: SqlitePool,
}

impl SqliteExperienceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExperienceRepository for SqliteExperienceRepo {
    async fn create(&self, experience: &Experience) -> Result<Experience, AppError> {
        sqlx::query_as::<_, Experience>(
            r#"INSERT INTO experiences (
                id, name, slug, description, price, location, duration_min,
                images_json, frequency_json, is_visible, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *"#
        )
            .bind(&experience.id)
            .bind(&experience.name)
            .bind(&experience.slug)
            .bind(&experience.description)
            .bind(experience.price)
            .bind(&experience.location)
            .bind(experience.duration_min)
            .bind(&experience.images_json)
            .bind(&experience.frequency_json)
            .bind(experience.is_visible)
            .bind(experience.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Experience>, AppError> {
        sqlx::query_as::<_, Experience>("SELECT * FROM experiences WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Experience>, AppError> {
        sqlx::query_as::<_, Experience>("SELECT * FROM experiences WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, include_hidden: bool) -> Result<Vec<Experience>, AppError> {
        let sql = if include_hidden {
            "SELECT * FROM experiences ORDER BY name ASC"
        } else {
            "SELECT * FROM experiences WHERE is_visible = 1 ORDER BY name ASC"
        };
        sqlx::query_as::<_, Experience>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, experience: &Experience) -> Result<Experience, AppError> {
        sqlx::query_as::<_, Experience>(
            r#"UPDATE experiences SET
                name=?, slug=?, description=?, price=?, location=?, duration_min=?,
                images_json=?, frequency_json=?, is_visible=?
               WHERE id=? RETURNING *"#
        )
            .bind(&experience.name)
            .bind(&experience.slug)
            .bind(&experience.description)
            .bind(experience.price)
            .bind(&experience.location)
            .bind(experience.duration_min)
            .bind(&experience.images_json)
            .bind(&experience.frequency_json)
            .bind(experience.is_visible)
            .bind(&experience.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Experience not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM experiences WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Experience not found".into()));
        }
        Ok(())
    }
}
