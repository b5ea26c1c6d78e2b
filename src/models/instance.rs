//! Book instance (physical copy) model and related types.
//!
//! A `BookInstance` is one loanable copy of a catalog book. Persistence
//! uses the single-char status code and the ISO 639-1 language code.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::BorrowerShort;

/// Loan status of a copy. DB stores the single-char code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[serde(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

impl LoanStatus {
    pub fn as_code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Maintenance
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (stored as a 1-char string)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_code().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Copy language. DB stores the ISO 639-1 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "fr")]
    French,
}

impl Language {
    pub fn as_code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Russian => "ru",
            Language::German => "de",
            Language::French => "fr",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::English),
            "ru" => Ok(Language::Russian),
            "de" => Ok(Language::German),
            "fr" => Ok(Language::French),
            _ => Err(format!("Invalid language code: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for Language {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for Language {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Language {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_code().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Full book instance model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub status: LoanStatus,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BookInstance {
    /// Whether this copy is overdue: a due date is set and has passed.
    pub fn is_overdue(&self) -> bool {
        self.overdue_at(Local::now().date_naive())
    }

    pub(crate) fn overdue_at(&self, today: NaiveDate) -> bool {
        is_overdue_on(self.due_back, today)
    }
}

/// Overdue rule shared by every view of a copy: a due date is set and
/// strictly before today. On the due date itself the copy is not overdue.
pub(crate) fn is_overdue_on(due_back: Option<NaiveDate>, today: NaiveDate) -> bool {
    due_back.map_or(false, |due| due < today)
}

/// Instance with book and borrower details for loan lists
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub title: Option<String>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub language: Language,
    pub borrower: Option<BorrowerShort>,
    pub is_overdue: bool,
}

/// Create book instance request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookInstance {
    pub book_id: i32,
    #[serde(default)]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    #[serde(default)]
    pub status: LoanStatus,
    #[serde(default)]
    pub language: Language,
}

/// Update book instance request (partial)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookInstance {
    pub book_id: Option<i32>,
    pub imprint: Option<String>,
    // Double Option: absent = keep, null = clear
    #[serde(default, with = "serde_with::rust::double_option")]
    pub due_back: Option<Option<NaiveDate>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub borrower_id: Option<Option<i32>>,
    pub status: Option<LoanStatus>,
    pub language: Option<Language>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(due_back: Option<NaiveDate>, status: LoanStatus) -> BookInstance {
        BookInstance {
            id: Uuid::new_v4(),
            book_id: Some(1),
            imprint: "First edition".to_string(),
            due_back,
            borrower_id: None,
            status,
            language: Language::English,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn not_overdue_without_due_date() {
        let copy = instance(None, LoanStatus::Available);
        assert!(!copy.overdue_at(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
    }

    #[test]
    fn overdue_when_due_date_has_passed() {
        let due = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let copy = instance(Some(due), LoanStatus::OnLoan);
        assert!(copy.overdue_at(NaiveDate::from_ymd_opt(2024, 5, 21).unwrap()));
    }

    #[test]
    fn not_overdue_on_the_due_date_itself() {
        let due = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let copy = instance(Some(due), LoanStatus::OnLoan);
        assert!(!copy.overdue_at(due));
        assert!(!copy.overdue_at(NaiveDate::from_ymd_opt(2024, 5, 19).unwrap()));
    }

    #[test]
    fn status_codes_parse_back() {
        assert_eq!("o".parse::<LoanStatus>().unwrap(), LoanStatus::OnLoan);
        assert!("x".parse::<LoanStatus>().is_err());
        assert_eq!(LoanStatus::Reserved.as_code(), "r");
    }

    #[test]
    fn language_codes_parse_back() {
        assert_eq!("de".parse::<Language>().unwrap(), Language::German);
        assert!("xx".parse::<Language>().is_err());
    }
}
