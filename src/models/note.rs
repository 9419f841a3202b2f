//! Note model

use serde::{Deserialize, Serialize};

/// Longest accepted note title
pub const NOTE_TITLE_MAX_LENGTH: usize = 100;

/// Longest accepted slug; derived slugs are cut to this length
pub const NOTE_SLUG_MAX_LENGTH: usize = 100;

/// Personal note, visible to its author only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Unique across all notes
    pub slug: String,
    pub author_id: i64,
}

/// Submitted note fields, shared by the add and edit forms.
///
/// A blank `slug` means "derive it from the title".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            slug: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// The supplied slug, if it is not blank
    pub fn supplied_slug(&self) -> Option<&str> {
        self.slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl From<&Note> for NoteInput {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            text: note.text.clone(),
            slug: Some(note.slug.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplied_slug_blank_is_none() {
        assert_eq!(NoteInput::new("t", "x").supplied_slug(), None);
        assert_eq!(NoteInput::new("t", "x").with_slug("").supplied_slug(), None);
        assert_eq!(NoteInput::new("t", "x").with_slug("   ").supplied_slug(), None);
    }

    #[test]
    fn test_supplied_slug_trimmed() {
        let input = NoteInput::new("t", "x").with_slug(" slug1 ");
        assert_eq!(input.supplied_slug(), Some("slug1"));
    }

    #[test]
    fn test_input_from_note() {
        let note = Note {
            id: 3,
            title: "Заголовок".to_string(),
            text: "Текст".to_string(),
            slug: "slug".to_string(),
            author_id: 1,
        };
        let input = NoteInput::from(&note);
        assert_eq!(input.title, note.title);
        assert_eq!(input.supplied_slug(), Some("slug"));
    }
}
