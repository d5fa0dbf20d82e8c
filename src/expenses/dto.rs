use serde::Deserialize;
use time::Date;

use crate::expenses::repo_types::{iso_date, ExpenseFields, UserRef};

/// Body for both create and full-replacement update. An `id` sent by the
/// client is ignored; ids come from the path or from storage.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub expense_date: Option<Date>,
    #[serde(default)]
    pub user: Option<UserRef>,
}

impl From<ExpenseRequest> for ExpenseFields {
    fn from(r: ExpenseRequest) -> Self {
        Self {
            category: r.category,
            amount: r.amount,
            description: r.description,
            expense_date: r.expense_date,
            user_id: r.user.map(|u| u.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_full_payload() {
        let req: ExpenseRequest = serde_json::from_str(
            r#"{"id":5,"category":"food","amount":12.5,"description":"lunch",
                "expenseDate":"2024-01-31","user":{"id":1,"email":"a@x.com"}}"#,
        )
        .unwrap();
        let f = ExpenseFields::from(req);
        assert_eq!(f.category, "food");
        assert_eq!(f.amount, 12.5);
        assert_eq!(f.expense_date, Some(date!(2024 - 01 - 31)));
        assert_eq!(f.user_id, Some(1));
    }

    #[test]
    fn optional_fields_may_be_missing_or_null() {
        let req: ExpenseRequest =
            serde_json::from_str(r#"{"category":"food","amount":3,"expenseDate":null}"#).unwrap();
        assert_eq!(req.description, None);
        assert_eq!(req.expense_date, None);
        assert_eq!(req.user, None);
    }

    #[test]
    fn rejects_malformed_date() {
        let res: Result<ExpenseRequest, _> =
            serde_json::from_str(r#"{"category":"food","amount":3,"expenseDate":"31/01/2024"}"#);
        assert!(res.is_err());
    }
}
