//! Note service
//!
//! Personal notes with unique slugs. A submitted slug is validated as-is; a
//! blank one is derived from the title. Either way the final slug must not
//! belong to another note, and a clash is reported on the `slug` field.

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::NoteRepository;
use crate::models::{FieldErrors, Note, NoteInput, NOTE_SLUG_MAX_LENGTH, NOTE_TITLE_MAX_LENGTH};
use crate::services::slug::{derive_slug, is_valid_slug, INVALID_SLUG};

/// Appended to a clashing slug in the field error
pub const WARNING: &str = " - такой slug уже существует, придумайте уникальное значение!";

/// Error types for note operations
#[derive(Debug, thiserror::Error)]
pub enum NoteServiceError {
    #[error("Not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Note service
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self { repo }
    }

    /// The author's notes in creation order
    pub async fn list_for_author(&self, author_id: i64) -> Result<Vec<Note>, NoteServiceError> {
        let notes = self
            .repo
            .list_by_author(author_id)
            .await
            .context("Failed to list notes")?;

        Ok(notes)
    }

    /// The author's note with `slug`
    pub async fn get_for_author(&self, slug: &str, author_id: i64) -> Result<Note, NoteServiceError> {
        self.repo
            .get_for_author(slug, author_id)
            .await
            .context("Failed to get note")?
            .ok_or(NoteServiceError::NotFound)
    }

    /// Create a note for `author_id`
    pub async fn create(&self, author_id: i64, input: NoteInput) -> Result<Note, NoteServiceError> {
        let note = self.validate(input, author_id, None).await?;

        let created = match self.repo.create(&note).await {
            Ok(created) => created,
            Err(e) => return Err(self.explain_write_failure(&note, None, e).await),
        };

        tracing::debug!(note_id = created.id, slug = %created.slug, "Note created");

        Ok(created)
    }

    /// Update the author's note addressed by `slug`
    pub async fn update(
        &self,
        slug: &str,
        author_id: i64,
        input: NoteInput,
    ) -> Result<Note, NoteServiceError> {
        let existing = self.get_for_author(slug, author_id).await?;

        let note = self.validate(input, author_id, Some(existing.id)).await?;

        match self.repo.update(&note).await {
            Ok(true) => Ok(note),
            Ok(false) => Err(NoteServiceError::NotFound),
            Err(e) => Err(self.explain_write_failure(&note, Some(existing.id), e).await),
        }
    }

    /// Delete the author's note addressed by `slug`
    pub async fn delete(&self, slug: &str, author_id: i64) -> Result<(), NoteServiceError> {
        let deleted = self
            .repo
            .delete(slug, author_id)
            .await
            .context("Failed to delete note")?;

        if deleted {
            Ok(())
        } else {
            Err(NoteServiceError::NotFound)
        }
    }

    /// Check the submitted fields and resolve the final slug.
    ///
    /// `note_id` is the note being edited, which may keep its own slug.
    async fn validate(
        &self,
        input: NoteInput,
        author_id: i64,
        note_id: Option<i64>,
    ) -> Result<Note, NoteServiceError> {
        let mut errors = FieldErrors::new();

        let title = input.title.trim().to_string();
        let title_missing = errors.require("title", &title);
        if !title_missing {
            errors.max_length("title", &title, NOTE_TITLE_MAX_LENGTH);
        }
        errors.require("text", &input.text);

        let slug = match input.supplied_slug() {
            Some(slug) => {
                if !errors.max_length("slug", slug, NOTE_SLUG_MAX_LENGTH) && !is_valid_slug(slug) {
                    errors.add("slug", INVALID_SLUG);
                }
                Some(slug.to_string())
            }
            None if title_missing => None,
            None => {
                let derived = derive_slug(&title);
                if derived.is_empty() {
                    errors.add("slug", INVALID_SLUG);
                    None
                } else {
                    Some(derived)
                }
            }
        };

        if let Some(slug) = slug.as_deref() {
            if !errors.has("slug") && self.slug_taken(slug, note_id).await? {
                errors.add("slug", format!("{}{}", slug, WARNING));
            }
        }

        errors.into_result().map_err(NoteServiceError::Validation)?;

        Ok(Note {
            id: note_id.unwrap_or(0),
            title,
            text: input.text,
            slug: slug.unwrap_or_default(),
            author_id,
        })
    }

    async fn slug_taken(&self, slug: &str, note_id: Option<i64>) -> Result<bool, NoteServiceError> {
        let taken = self
            .repo
            .slug_exists(slug, note_id)
            .await
            .context("Failed to check slug uniqueness")?;

        Ok(taken)
    }

    /// A concurrent writer may claim the slug between the check and the
    /// write; report that as the usual field error.
    async fn explain_write_failure(
        &self,
        note: &Note,
        note_id: Option<i64>,
        error: anyhow::Error,
    ) -> NoteServiceError {
        match self.repo.slug_exists(&note.slug, note_id).await {
            Ok(true) => NoteServiceError::Validation(FieldErrors::single(
                "slug",
                format!("{}{}", note.slug, WARNING),
            )),
            _ => NoteServiceError::InternalError(error.context("Failed to save note")),
        }
    }
}
