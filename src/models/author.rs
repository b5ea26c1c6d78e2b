//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookShort;

/// Full author model from database.
/// Books are a relation loaded separately for the detail view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    #[sqlx(skip)]
    #[serde(default)]
    pub books: Vec<BookShort>,
}

impl Author {
    /// Display name in catalog order ("Lastname, Firstname")
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must not be empty"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Update author request (partial)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must not be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must not be empty"))]
    pub last_name: Option<String>,
    // Double Option: absent = keep, null = clear the date
    #[serde(default, with = "serde_with::rust::double_option")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub date_of_death: Option<Option<NaiveDate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_absent_from_null_dates() {
        let update: UpdateAuthor = serde_json::from_str(r#"{"first_name": "Kim"}"#).unwrap();
        assert_eq!(update.date_of_death, None);

        let update: UpdateAuthor = serde_json::from_str(r#"{"date_of_death": null}"#).unwrap();
        assert_eq!(update.date_of_death, Some(None));

        let update: UpdateAuthor =
            serde_json::from_str(r#"{"date_of_death": "2018-01-22"}"#).unwrap();
        assert_eq!(
            update.date_of_death,
            Some(NaiveDate::from_ymd_opt(2018, 1, 22))
        );
    }

    #[test]
    fn display_name_is_last_first() {
        let author = Author {
            id: 1,
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            date_of_birth: None,
            date_of_death: None,
            books: Vec::new(),
        };
        assert_eq!(author.display_name(), "Le Guin, Ursula");
    }
}
