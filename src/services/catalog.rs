//! Catalog management service: books, authors, genres and copies

use uuid::Uuid;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult, ErrorCode},
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{Book, BookShort, CreateBook, UpdateBook},
        genre::{CreateGenre, Genre, UpdateGenre},
        instance::{
            BookInstance, CreateBookInstance, LoanDetails, LoanStatus, UpdateBookInstance,
        },
        PageQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// List books with pagination
    pub async fn list_books(&self, query: &PageQuery) -> AppResult<(Vec<BookShort>, i64)> {
        let (page, per_page) = query.resolve(self.config.page_size);
        self.repository.books.list(page, per_page).await
    }

    /// Get book by ID with full details
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book. ISBN must be unique across the catalog.
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::Conflict(
                "A book with this ISBN already exists".to_string(),
            ));
        }
        if let Some(author_id) = book.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }
        for genre_id in &book.genre_ids {
            self.repository.genres.get_by_id(*genre_id).await?;
        }

        let created = self.repository.books.create(&book).await?;
        tracing::info!("Created book id={} isbn={}", created.id, created.isbn);
        Ok(created)
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict(
                    "A book with this ISBN already exists".to_string(),
                ));
            }
        }
        if let Some(Some(author_id)) = book.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }
        self.repository.books.update(id, &book).await
    }

    /// Delete a book. Rejected while copies are still on record.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    // =========================================================================
    // Authors
    // =========================================================================

    /// List authors with pagination
    pub async fn list_authors(&self, query: &PageQuery) -> AppResult<(Vec<Author>, i64)> {
        let (page, per_page) = query.resolve(self.config.page_size);
        self.repository.authors.list(page, per_page).await
    }

    /// Get author by ID with their books
    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    /// Create a new author
    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        self.repository.authors.create(&author).await
    }

    /// Update an author
    pub async fn update_author(&self, id: i32, author: UpdateAuthor) -> AppResult<Author> {
        self.repository.authors.update(id, &author).await
    }

    /// Delete an author. Their books keep existing with a null author.
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    // =========================================================================
    // Genres
    // =========================================================================

    /// List all genres
    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    /// Create a new genre. Names are unique.
    pub async fn create_genre(&self, genre: CreateGenre) -> AppResult<Genre> {
        if self.repository.genres.name_exists(&genre.name, None).await? {
            return Err(AppError::Conflict(
                "A genre with this name already exists".to_string(),
            ));
        }
        self.repository.genres.create(&genre).await
    }

    /// Update a genre
    pub async fn update_genre(&self, id: i32, genre: UpdateGenre) -> AppResult<Genre> {
        if self
            .repository
            .genres
            .name_exists(&genre.name, Some(id))
            .await?
        {
            return Err(AppError::Conflict(
                "A genre with this name already exists".to_string(),
            ));
        }
        self.repository.genres.update(id, &genre).await
    }

    /// Delete a genre
    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }

    // =========================================================================
    // Copies
    // =========================================================================

    /// List copies with pagination
    pub async fn list_instances(&self, query: &PageQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        let (page, per_page) = query.resolve(self.config.page_size);
        self.repository.instances.list(page, per_page).await
    }

    /// Get copy by ID with book and borrower details
    pub async fn get_instance(&self, id: Uuid) -> AppResult<LoanDetails> {
        self.repository.instances.get_details(id).await
    }

    /// Create a new copy of a book
    pub async fn create_instance(&self, instance: CreateBookInstance) -> AppResult<BookInstance> {
        // The referenced book must exist
        self.repository.books.get_by_id(instance.book_id).await?;
        check_due_back(instance.due_back.is_some(), instance.status)?;
        if let Some(borrower_id) = instance.borrower_id {
            self.repository.users.get_by_id(borrower_id).await?;
        }
        self.repository.instances.create(&instance).await
    }

    /// Update a copy
    pub async fn update_instance(
        &self,
        id: Uuid,
        update: UpdateBookInstance,
    ) -> AppResult<BookInstance> {
        let existing = self.repository.instances.get_by_id(id).await?;

        let due_back = match update.due_back {
            Some(value) => value,
            None => existing.due_back,
        };
        let status = update.status.unwrap_or(existing.status);
        check_due_back(due_back.is_some(), status)?;

        if let Some(book_id) = update.book_id {
            self.repository.books.get_by_id(book_id).await?;
        }
        if let Some(Some(borrower_id)) = update.borrower_id {
            self.repository.users.get_by_id(borrower_id).await?;
        }

        self.repository.instances.update(id, &update).await
    }

    /// Delete a copy. Deleting an on-loan copy requires `force`.
    pub async fn delete_instance(&self, id: Uuid, force: bool) -> AppResult<()> {
        let existing = self.repository.instances.get_by_id(id).await?;
        if existing.status == LoanStatus::OnLoan && !force {
            return Err(AppError::BusinessRule(
                ErrorCode::CopyOnLoan,
                "Copy is currently on loan".to_string(),
            ));
        }
        self.repository.instances.delete(id).await
    }
}

/// A due date only makes sense on a copy that is out on loan.
fn check_due_back(has_due_back: bool, status: LoanStatus) -> AppResult<()> {
    if has_due_back && status != LoanStatus::OnLoan {
        return Err(AppError::Validation(
            "A due date can only be set on a copy that is on loan".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_requires_on_loan_status() {
        assert!(check_due_back(true, LoanStatus::OnLoan).is_ok());
        assert!(check_due_back(false, LoanStatus::Available).is_ok());
        assert!(check_due_back(true, LoanStatus::Available).is_err());
        assert!(check_due_back(true, LoanStatus::Maintenance).is_err());
    }
}
