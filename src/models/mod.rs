//! Data models for the Shelfmark catalog

pub mod author;
pub mod book;
pub mod genre;
pub mod instance;
pub mod user;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookShort};
pub use genre::Genre;
pub use instance::{BookInstance, Language, LoanDetails, LoanStatus};
pub use user::{User, UserClaims};

/// Pagination parameters shared by all list endpoints
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    /// Resolve page/per_page against the configured default page size.
    pub fn resolve(&self, default_per_page: i64) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(default_per_page).clamp(1, 100);
        (page, per_page)
    }
}
