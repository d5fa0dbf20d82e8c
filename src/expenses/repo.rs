use async_trait::async_trait;

use crate::db::PgStorage;
use crate::expenses::repo_types::{Expense, ExpenseFields, ExpenseRow};
use crate::storage::{ExpenseRepository, StorageResult};

#[async_trait]
impl ExpenseRepository for PgStorage {
    async fn create(&self, f: ExpenseFields) -> StorageResult<Expense> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            INSERT INTO expenses (category, amount, description, expense_date, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, category, amount, description, expense_date, user_id
            "#,
        )
        .bind(f.category)
        .bind(f.amount)
        .bind(f.description)
        .bind(f.expense_date)
        .bind(f.user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    async fn get_by_id(&self, id: i64) -> StorageResult<Option<Expense>> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT id, category, amount, description, expense_date, user_id
            FROM expenses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Expense::from))
    }

    async fn get_all(&self) -> StorageResult<Vec<Expense>> {
        let rows = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT id, category, amount, description, expense_date, user_id
            FROM expenses
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Expense::from).collect())
    }

    async fn get_by_user(&self, user_id: i64) -> StorageResult<Vec<Expense>> {
        let rows = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT id, category, amount, description, expense_date, user_id
            FROM expenses
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Expense::from).collect())
    }

    async fn exists_by_id(&self, id: i64) -> StorageResult<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM expenses WHERE id = $1)"#)
                .bind(id)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }

    async fn update(&self, e: &Expense) -> StorageResult<Option<Expense>> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            UPDATE expenses
               SET category = $2, amount = $3, description = $4,
                   expense_date = $5, user_id = $6
             WHERE id = $1
            RETURNING id, category, amount, description, expense_date, user_id
            "#,
        )
        .bind(e.id)
        .bind(&e.category)
        .bind(e.amount)
        .bind(&e.description)
        .bind(e.expense_date)
        .bind(e.user_id())
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Expense::from))
    }

    async fn delete_by_id(&self, id: i64) -> StorageResult<bool> {
        let res = sqlx::query(r#"DELETE FROM expenses WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
