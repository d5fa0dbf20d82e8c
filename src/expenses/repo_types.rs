use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// Reference to the owning user, serialized as `{"id": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub category: String,
    pub amount: f64,
    pub description: Option<String>,
    #[serde(with = "iso_date::option")]
    pub expense_date: Option<Date>,
    pub user: Option<UserRef>,
}

/// Every mutable column of an expense. Used for inserts and full
/// replacement updates alike.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFields {
    pub category: String,
    pub amount: f64,
    pub description: Option<String>,
    pub expense_date: Option<Date>,
    pub user_id: Option<i64>,
}

#[derive(Debug, FromRow)]
pub struct ExpenseRow {
    pub id: i64,
    pub category: String,
    pub amount: f64,
    pub description: Option<String>,
    pub expense_date: Option<Date>,
    pub user_id: Option<i64>,
}

impl Expense {
    pub fn from_fields(id: i64, f: ExpenseFields) -> Self {
        Self {
            id,
            category: f.category,
            amount: f.amount,
            description: f.description,
            expense_date: f.expense_date,
            user: f.user_id.map(|id| UserRef { id }),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.map(|u| u.id)
    }

    /// Overwrite every mutable field, keeping the id.
    pub fn replace_fields(&mut self, f: ExpenseFields) {
        *self = Self::from_fields(self.id, f);
    }
}

impl From<ExpenseRow> for Expense {
    fn from(r: ExpenseRow) -> Self {
        Self {
            id: r.id,
            category: r.category,
            amount: r.amount,
            description: r.description,
            expense_date: r.expense_date,
            user: r.user_id.map(|id| UserRef { id }),
        }
    }
}
