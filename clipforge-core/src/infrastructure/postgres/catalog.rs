use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use clipforge_model::{AssetRef, MediaKind, PrincipalId, Video, VideoId};

use crate::error::{CoreError, Result};
use crate::ports::ContentCatalog;

const VIDEO_COLUMNS: &str = "id, owner_id, title, description, video_url, \
     thumbnail_url, duration_secs, views, is_published, created_at, \
     updated_at";

/// PostgreSQL-backed implementation of the `ContentCatalog` port.
#[derive(Clone, Debug)]
pub struct PostgresContentCatalog {
    pool: PgPool,
}

impl PostgresContentCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct VideoRow {
    id: VideoId,
    owner_id: PrincipalId,
    title: String,
    description: String,
    video_url: String,
    thumbnail_url: String,
    duration_secs: f64,
    views: i64,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VideoRow> for Video {
    type Error = CoreError;

    fn try_from(row: VideoRow) -> Result<Self> {
        let video_file = AssetRef::new(
            row.video_url,
            MediaKind::Video,
            Some(row.duration_secs),
        )
        .map_err(|e| {
            CoreError::internal(format!(
                "Corrupt video reference for {}: {}",
                row.id, e
            ))
        })?;
        let thumbnail =
            AssetRef::new(row.thumbnail_url, MediaKind::Image, None).map_err(
                |e| {
                    CoreError::internal(format!(
                        "Corrupt thumbnail reference for {}: {}",
                        row.id, e
                    ))
                },
            )?;

        Ok(Video {
            id: row.id,
            owner: row.owner_id,
            title: row.title,
            description: row.description,
            video_file,
            thumbnail,
            duration_secs: row.duration_secs,
            views: row.views,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ContentCatalog for PostgresContentCatalog {
    async fn find_video(&self, id: VideoId) -> Result<Option<Video>> {
        let query =
            format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1");
        let row = sqlx::query_as::<_, VideoRow>(&query)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                CoreError::internal(format!("Failed to look up video: {e}"))
            })?;

        row.map(Video::try_from).transpose()
    }

    async fn create_video(&self, video: &Video) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO videos (
                id, owner_id, title, description, video_url, thumbnail_url,
                duration_secs, views, is_published, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(video.id)
        .bind(video.owner)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.video_file.url())
        .bind(video.thumbnail.url())
        .bind(video.duration_secs)
        .bind(video.views)
        .bind(video.is_published)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.constraint() == Some("videos_owner_id_fkey") {
                    return CoreError::not_found("User doesn't exist");
                }
            }
            CoreError::internal(format!("Failed to create video: {e}"))
        })?;

        info!("Created video: {} ({})", video.title, video.id);
        Ok(())
    }

    async fn update_video(&self, video: &Video) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET title = $2, description = $3, video_url = $4,
                thumbnail_url = $5, duration_secs = $6, views = $7,
                is_published = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.video_file.url())
        .bind(video.thumbnail.url())
        .bind(video.duration_secs)
        .bind(video.views)
        .bind(video.is_published)
        .bind(video.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            CoreError::internal(format!("Failed to update video: {e}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Video not found"));
        }
        Ok(())
    }

    async fn delete_video(&self, id: VideoId) -> Result<()> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| {
                CoreError::internal(format!("Failed to delete video: {e}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Video not found"));
        }

        info!("Deleted video: {}", id);
        Ok(())
    }
}
