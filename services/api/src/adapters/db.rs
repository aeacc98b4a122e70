//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `NotebookStore` port from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notebook_core::domain::{
    GenerationStatus, Notebook, NotebookDetails, ProcessingStatus, Source, SourceType,
    SourceUpdate,
};
use notebook_core::ports::{NotebookStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `NotebookStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn store_error(context: &str, e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(context.to_string()),
        other => PortError::Store(format!("{context}: {other}")),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct NotebookRecord {
    id: Uuid,
    title: String,
    description: Option<String>,
    icon: String,
    color: String,
    example_questions: Vec<String>,
    generation_status: String,
    audio_overview_url: Option<String>,
    audio_url_expires_at: Option<DateTime<Utc>>,
    audio_overview_generation_status: String,
}

impl NotebookRecord {
    fn to_domain(self) -> PortResult<Notebook> {
        Ok(Notebook {
            id: self.id,
            title: self.title,
            description: self.description,
            icon: self.icon,
            color: self.color,
            example_questions: self.example_questions,
            generation_status: parse_generation_status(&self.generation_status)?,
            audio_overview_url: self.audio_overview_url,
            audio_url_expires_at: self.audio_url_expires_at,
            audio_overview_generation_status: parse_generation_status(
                &self.audio_overview_generation_status,
            )?,
        })
    }
}

#[derive(FromRow)]
struct SourceRecord {
    id: Uuid,
    notebook_id: Uuid,
    source_type: String,
    title: Option<String>,
    content: Option<String>,
    summary: Option<String>,
    processing_status: String,
    updated_at: DateTime<Utc>,
}

impl SourceRecord {
    fn to_domain(self) -> PortResult<Source> {
        let source_type = SourceType::parse(&self.source_type).ok_or_else(|| {
            PortError::Store(format!("unknown source_type '{}' in row", self.source_type))
        })?;
        let processing_status =
            ProcessingStatus::parse(&self.processing_status).ok_or_else(|| {
                PortError::Store(format!(
                    "unknown processing_status '{}' in row",
                    self.processing_status
                ))
            })?;
        Ok(Source {
            id: self.id,
            notebook_id: self.notebook_id,
            source_type,
            title: self.title,
            content: self.content,
            summary: self.summary,
            processing_status,
            updated_at: self.updated_at,
        })
    }
}

fn parse_generation_status(s: &str) -> PortResult<GenerationStatus> {
    GenerationStatus::parse(s)
        .ok_or_else(|| PortError::Store(format!("unknown generation status '{s}' in row")))
}

//=========================================================================================
// `NotebookStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl NotebookStore for DbAdapter {
    async fn get_notebook(&self, notebook_id: Uuid) -> PortResult<Notebook> {
        let record = sqlx::query_as::<_, NotebookRecord>(
            r#"
            SELECT id, title, description, icon, color, example_questions,
                   generation_status, audio_overview_url, audio_url_expires_at,
                   audio_overview_generation_status
            FROM notebooks
            WHERE id = $1
            "#,
        )
        .bind(notebook_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("fetch notebook", e))?;

        record.to_domain()
    }

    async fn set_generation_status(
        &self,
        notebook_id: Uuid,
        status: GenerationStatus,
    ) -> PortResult<()> {
        sqlx::query("UPDATE notebooks SET generation_status = $2 WHERE id = $1")
            .bind(notebook_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("update generation_status", e))?;
        Ok(())
    }

    async fn apply_generated_details(
        &self,
        notebook_id: Uuid,
        details: &NotebookDetails,
    ) -> PortResult<()> {
        sqlx::query(
            r#"
            UPDATE notebooks
            SET title = $2,
                description = $3,
                icon = $4,
                color = $5,
                example_questions = $6,
                generation_status = 'completed'
            WHERE id = $1
            "#,
        )
        .bind(notebook_id)
        .bind(&details.title)
        .bind(&details.summary)
        .bind(&details.notebook_icon)
        .bind(&details.background_color)
        .bind(&details.example_questions)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("apply generated details", e))?;
        Ok(())
    }

    async fn set_audio_status(
        &self,
        notebook_id: Uuid,
        status: GenerationStatus,
    ) -> PortResult<()> {
        sqlx::query("UPDATE notebooks SET audio_overview_generation_status = $2 WHERE id = $1")
            .bind(notebook_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("update audio_overview_generation_status", e))?;
        Ok(())
    }

    async fn complete_audio_overview(
        &self,
        notebook_id: Uuid,
        audio_url: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query(
            r#"
            UPDATE notebooks
            SET audio_overview_url = $2,
                audio_url_expires_at = $3,
                audio_overview_generation_status = 'completed'
            WHERE id = $1
            "#,
        )
        .bind(notebook_id)
        .bind(audio_url)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("complete audio overview", e))?;
        Ok(())
    }

    async fn update_audio_url(
        &self,
        notebook_id: Uuid,
        audio_url: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query(
            r#"
            UPDATE notebooks
            SET audio_overview_url = $2,
                audio_url_expires_at = $3
            WHERE id = $1
            "#,
        )
        .bind(notebook_id)
        .bind(audio_url)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("refresh audio URL", e))?;
        Ok(())
    }

    async fn first_source_content(&self, notebook_id: Uuid) -> PortResult<Option<String>> {
        let content: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT content FROM sources
            WHERE notebook_id = $1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(notebook_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("fetch first source content", e))?;

        Ok(content.flatten())
    }

    async fn update_source(&self, source_id: Uuid, update: SourceUpdate) -> PortResult<Source> {
        let record = sqlx::query_as::<_, SourceRecord>(
            r#"
            UPDATE sources
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                summary = COALESCE($4, summary),
                processing_status = COALESCE($5, processing_status),
                updated_at = now()
            WHERE id = $1
            RETURNING id, notebook_id, source_type, title, content, summary,
                      processing_status, updated_at
            "#,
        )
        .bind(source_id)
        .bind(update.title)
        .bind(update.content)
        .bind(update.summary)
        .bind(update.processing_status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("update source", e))?;

        record.to_domain()
    }
}
