//! Catalog statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, repository::Repository};

/// Headline counts for the catalog
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogStats {
    pub books: i64,
    pub instances: i64,
    pub instances_available: i64,
    pub authors: i64,
    pub genres: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Collect headline counts
    pub async fn summary(&self) -> AppResult<CatalogStats> {
        Ok(CatalogStats {
            books: self.repository.books.count().await?,
            instances: self.repository.instances.count().await?,
            instances_available: self.repository.instances.count_available().await?,
            authors: self.repository.authors.count().await?,
            genres: self.repository.genres.count().await?,
        })
    }
}
