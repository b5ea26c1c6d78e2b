//! Loan views and the librarian renewal action

use chrono::{Duration, Local, NaiveDate};
use uuid::Uuid;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult, ErrorCode},
    models::{
        instance::{LoanDetails, LoanStatus},
        PageQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: CatalogConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// Copies on loan to one borrower, due date ascending
    pub async fn user_loans(
        &self,
        user_id: i32,
        query: &PageQuery,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        let (page, per_page) = query.resolve(self.config.page_size);
        self.repository
            .instances
            .list_on_loan(Some(user_id), page, per_page)
            .await
    }

    /// All copies on loan to anyone, due date ascending
    pub async fn all_borrowed(&self, query: &PageQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        let (page, per_page) = query.resolve(self.config.page_size);
        self.repository.instances.list_on_loan(None, page, per_page).await
    }

    /// Default due date proposed for a renewal
    pub fn proposed_renewal_date(&self) -> NaiveDate {
        Local::now().date_naive() + Duration::weeks(self.config.renewal_weeks)
    }

    /// Renew a loan: set a new due date on an on-loan copy.
    /// A missing date defaults to the proposed renewal date.
    pub async fn renew(
        &self,
        instance_id: Uuid,
        due_back: Option<NaiveDate>,
    ) -> AppResult<LoanDetails> {
        let instance = self.repository.instances.get_by_id(instance_id).await?;

        if instance.status != LoanStatus::OnLoan {
            return Err(AppError::BusinessRule(
                ErrorCode::CopyNotOnLoan,
                "Copy is not on loan".to_string(),
            ));
        }

        let today = Local::now().date_naive();
        let due_back = due_back.unwrap_or_else(|| self.proposed_renewal_date());
        validate_renewal_date(due_back, today, self.config.max_renewal_weeks)?;

        self.repository.instances.set_due_back(instance_id, due_back).await?;
        tracing::info!("Renewed copy {} until {}", instance_id, due_back);

        self.repository.instances.get_details(instance_id).await
    }
}

/// A renewal date must not be in the past and not further ahead than
/// the configured maximum window.
fn validate_renewal_date(date: NaiveDate, today: NaiveDate, max_weeks: i64) -> AppResult<()> {
    if date < today {
        return Err(AppError::Validation(
            "Invalid renewal date: date in the past".to_string(),
        ));
    }
    if date > today + Duration::weeks(max_weeks) {
        return Err(AppError::Validation(format!(
            "Invalid renewal date: more than {} weeks ahead",
            max_weeks
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_date_in_the_past() {
        let today = day(2024, 6, 15);
        assert!(validate_renewal_date(day(2024, 6, 14), today, 4).is_err());
    }

    #[test]
    fn accepts_today_and_the_default_window() {
        let today = day(2024, 6, 15);
        assert!(validate_renewal_date(today, today, 4).is_ok());
        // three weeks out, the proposed default
        assert!(validate_renewal_date(day(2024, 7, 6), today, 4).is_ok());
    }

    #[test]
    fn four_week_boundary_is_inclusive() {
        let today = day(2024, 6, 15);
        assert!(validate_renewal_date(day(2024, 7, 13), today, 4).is_ok());
        assert!(validate_renewal_date(day(2024, 7, 14), today, 4).is_err());
    }
}
