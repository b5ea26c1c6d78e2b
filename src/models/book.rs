//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::author::Author;
use super::genre::Genre;
use super::instance::BookInstance;

/// Full book model (DB + API). Author, genres and copies are relations
/// loaded separately for the detail view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    #[serde(default)]
    pub author: Option<Author>,
    #[sqlx(skip)]
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[sqlx(skip)]
    #[serde(default)]
    pub instances: Vec<BookInstance>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub author_name: Option<String>,
    pub nb_instances: Option<i64>,
    pub nb_available: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Summary is limited to 1000 characters"))]
    #[serde(default)]
    pub summary: String,
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters"))]
    pub isbn: String,
    pub author_id: Option<i32>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

/// Update book request (partial)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Summary is limited to 1000 characters"))]
    pub summary: Option<String>,
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters"))]
    pub isbn: Option<String>,
    // Double Option: absent = keep, null = detach the author
    #[serde(default, with = "serde_with::rust::double_option")]
    pub author_id: Option<Option<i32>>,
    /// When present, replaces the full genre set
    pub genre_ids: Option<Vec<i32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_absent_from_null_author() {
        let update: UpdateBook = serde_json::from_str(r#"{"title": "New title"}"#).unwrap();
        assert_eq!(update.author_id, None);

        let update: UpdateBook = serde_json::from_str(r#"{"author_id": null}"#).unwrap();
        assert_eq!(update.author_id, Some(None));

        let update: UpdateBook = serde_json::from_str(r#"{"author_id": 5}"#).unwrap();
        assert_eq!(update.author_id, Some(Some(5)));
    }
}
