use crate::domain::{models::experience::Experience, ports::ExperienceRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresExperienceRepo {
    pool: PgPool,
}

impl PostgresExperienceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExperienceRepository for PostgresExperienceRepo {
    async fn create(&self, experience: &Experience) -> Result<Experience, AppError> {
        sqlx::query_as::<_, Experience>(
            r#"INSERT INTO experiences (
                id, name, slug, description, price, location, duration_min,
                images_json, frequency_json, is_visible, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
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
        sqlx::query_as::<_, Experience>("SELECT * FROM experiences WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Experience>, AppError> {
        sqlx::query_as::<_, Experience>("SELECT * FROM experiences WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, include_hidden: bool) -> Result<Vec<Experience>, AppError> {
        sqlx::query_as::<_, Experience>(
            "SELECT * FROM experiences WHERE is_visible OR $1 ORDER BY name ASC"
        )
            .bind(include_hidden)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, experience: &Experience) -> Result<Experience, AppError> {
        sqlx::query_as::<_, Experience>(
            r#"UPDATE experiences SET
                name=$1, slug=$2, description=$3, price=$4, location=$5, duration_min=$6,
                images_json=$7, frequency_json=$8, is_visible=$9
               WHERE id=$10 RETURNING *"#
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
        let result = sqlx::query("DELETE FROM experiences WHERE id = $1")
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
