//! Book instances repository for database operations

use chrono::{Local, NaiveDate};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        instance::{
            is_overdue_on, BookInstance, CreateBookInstance, LoanDetails, LoanStatus,
            UpdateBookInstance,
        },
        user::BorrowerShort,
    },
};

#[derive(Clone)]
pub struct InstancesRepository {
    pool: Pool<Postgres>,
}

impl InstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all copies grouped by status then due date, paginated
    pub async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<LoanDetails>, i64)> {
        let offset = (page - 1) * per_page;

        let rows = sqlx::query(
            r#"
            SELECT bi.id, bi.book_id, bi.imprint, bi.due_back, bi.status, bi.language,
                   b.title,
                   u.id AS borrower_id, u.first_name, u.last_name
            FROM book_instances bi
            LEFT JOIN books b ON bi.book_id = b.id
            LEFT JOIN users u ON bi.borrower_id = u.id
            ORDER BY bi.status, bi.due_back NULLS LAST, bi.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.iter().map(map_loan_row).collect(), total))
    }

    /// Get copy by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            r#"
            SELECT id, book_id, imprint, due_back, borrower_id, status, language,
                   created_at, updated_at
            FROM book_instances WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    /// Get copy by ID with book title and borrower
    pub async fn get_details(&self, id: Uuid) -> AppResult<LoanDetails> {
        let row = sqlx::query(
            r#"
            SELECT bi.id, bi.book_id, bi.imprint, bi.due_back, bi.status, bi.language,
                   b.title,
                   u.id AS borrower_id, u.first_name, u.last_name
            FROM book_instances bi
            LEFT JOIN books b ON bi.book_id = b.id
            LEFT JOIN users u ON bi.borrower_id = u.id
            WHERE bi.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))?;

        Ok(map_loan_row(&row))
    }

    /// List copies currently on loan, ordered by due date ascending.
    /// When `borrower_id` is set, restricted to that borrower's loans.
    pub async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        let offset = (page - 1) * per_page;

        let base = r#"
            SELECT bi.id, bi.book_id, bi.imprint, bi.due_back, bi.status, bi.language,
                   b.title,
                   u.id AS borrower_id, u.first_name, u.last_name
            FROM book_instances bi
            LEFT JOIN books b ON bi.book_id = b.id
            LEFT JOIN users u ON bi.borrower_id = u.id
            WHERE bi.status = 'o'
        "#;

        let (rows, total) = if let Some(user_id) = borrower_id {
            let rows = sqlx::query(&format!(
                "{} AND bi.borrower_id = $1 ORDER BY bi.due_back LIMIT $2 OFFSET $3",
                base
            ))
            .bind(user_id)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM book_instances WHERE status = 'o' AND borrower_id = $1",
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
            (rows, total)
        } else {
            let rows = sqlx::query(&format!(
                "{} ORDER BY bi.due_back LIMIT $1 OFFSET $2",
                base
            ))
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            let total: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = 'o'")
                    .fetch_one(&self.pool)
                    .await?;
            (rows, total)
        };

        Ok((rows.iter().map(map_loan_row).collect(), total))
    }

    /// Create a new copy with a fresh UUID
    pub async fn create(&self, instance: &CreateBookInstance) -> AppResult<BookInstance> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, borrower_id, status, language)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.due_back)
        .bind(instance.borrower_id)
        .bind(instance.status)
        .bind(instance.language)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update a copy (partial; absent fields are kept, explicit nulls clear)
    pub async fn update(&self, id: Uuid, update: &UpdateBookInstance) -> AppResult<BookInstance> {
        let existing = self.get_by_id(id).await?;

        let due_back = match update.due_back {
            Some(value) => value,
            None => existing.due_back,
        };
        let borrower_id = match update.borrower_id {
            Some(value) => value,
            None => existing.borrower_id,
        };

        sqlx::query(
            r#"
            UPDATE book_instances
            SET book_id = $1, imprint = $2, due_back = $3, borrower_id = $4,
                status = $5, language = $6, updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(update.book_id.or(existing.book_id))
        .bind(update.imprint.as_ref().unwrap_or(&existing.imprint))
        .bind(due_back)
        .bind(borrower_id)
        .bind(update.status.unwrap_or(existing.status))
        .bind(update.language.unwrap_or(existing.language))
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Delete a copy
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book copy {} not found", id)));
        }
        Ok(())
    }

    /// Persist a renewed due date
    pub async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        let result = sqlx::query(
            "UPDATE book_instances SET due_back = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(due_back)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book copy {} not found", id)));
        }
        self.get_by_id(id).await
    }

    /// Count all copies
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count copies currently available
    pub async fn count_available(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = 'a'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

/// Map a joined instance row into loan details
fn map_loan_row(row: &sqlx::postgres::PgRow) -> LoanDetails {
    let today = Local::now().date_naive();
    let due_back: Option<NaiveDate> = row.get("due_back");
    let status: LoanStatus = row.get("status");

    let borrower = row
        .get::<Option<i32>, _>("borrower_id")
        .map(|id| BorrowerShort {
            id,
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
        });

    LoanDetails {
        id: row.get("id"),
        book_id: row.get("book_id"),
        title: row.get("title"),
        imprint: row.get("imprint"),
        due_back,
        status,
        language: row.get("language"),
        borrower,
        is_overdue: is_overdue_on(due_back, today),
    }
}
