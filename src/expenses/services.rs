use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::expenses::dto::ExpenseRequest;
use crate::expenses::repo_types::{Expense, ExpenseFields};
use crate::storage::{ExpenseRepository, StorageError, UserRepository};

#[derive(Clone)]
pub struct ExpenseService {
    expenses: Arc<dyn ExpenseRepository>,
    users: Arc<dyn UserRepository>,
}

impl ExpenseService {
    pub fn new(expenses: Arc<dyn ExpenseRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { expenses, users }
    }

    pub async fn list_all(&self) -> Result<Vec<Expense>, AppError> {
        Ok(self.expenses.get_all().await?)
    }

    /// No check that `user_id` exists; an unknown user simply owns nothing.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Expense>, AppError> {
        Ok(self.expenses.get_by_user(user_id).await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Expense>, AppError> {
        Ok(self.expenses.get_by_id(id).await?)
    }

    #[instrument(skip(self, req))]
    pub async fn create(&self, req: ExpenseRequest) -> Result<Expense, AppError> {
        let fields = self.validate(req).await?;
        let expense = self.expenses.create(fields).await.map_err(owner_error)?;
        info!(expense_id = expense.id, user_id = ?expense.user_id(), "expense created");
        Ok(expense)
    }

    /// Full replacement of every mutable field.
    #[instrument(skip(self, req))]
    pub async fn update(&self, id: i64, req: ExpenseRequest) -> Result<Expense, AppError> {
        let Some(mut expense) = self.expenses.get_by_id(id).await? else {
            return Err(AppError::NotFound);
        };
        let fields = self.validate(req).await?;
        expense.replace_fields(fields);

        let updated = self
            .expenses
            .update(&expense)
            .await
            .map_err(owner_error)?
            .ok_or(AppError::NotFound)?;
        info!(expense_id = id, "expense updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.expenses.exists_by_id(id).await? {
            return Err(AppError::NotFound);
        }
        if !self.expenses.delete_by_id(id).await? {
            return Err(AppError::NotFound);
        }
        info!(expense_id = id, "expense deleted");
        Ok(())
    }

    async fn validate(&self, req: ExpenseRequest) -> Result<ExpenseFields, AppError> {
        if req.category.trim().is_empty() {
            return Err(AppError::BadRequest("Category is required".into()));
        }
        if !req.amount.is_finite() || req.amount < 0.0 {
            return Err(AppError::BadRequest("Amount must be a non-negative number".into()));
        }
        let fields = ExpenseFields::from(req);
        if let Some(user_id) = fields.user_id {
            if self.users.get_by_id(user_id).await?.is_none() {
                warn!(user_id, "expense references unknown user");
                return Err(AppError::BadRequest("Unknown user".into()));
            }
        }
        Ok(fields)
    }
}

fn owner_error(e: StorageError) -> AppError {
    match e {
        // Owner deleted between validation and write.
        StorageError::MissingReference => AppError::BadRequest("Unknown user".into()),
        other => other.into(),
    }
}
