use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ExpenseRepository, StorageError, StorageResult, UserRepository};
use crate::expenses::repo_types::{Expense, ExpenseFields};
use crate::users::repo_types::{NewUser, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    expenses: BTreeMap<i64, Expense>,
    last_user_id: i64,
    last_expense_id: i64,
}

impl Tables {
    fn check_owner(&self, user_id: Option<i64>) -> StorageResult<()> {
        match user_id {
            Some(id) if !self.users.contains_key(&id) => Err(StorageError::MissingReference),
            _ => Ok(()),
        }
    }
}

/// Process-local backend with the same constraints as the SQL schema:
/// unique emails, expense owners must exist, ids start at 1.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> StorageResult<User> {
        let mut t = self.inner.write().await;
        if t.users.values().any(|u| u.email == user.email) {
            return Err(StorageError::Duplicate);
        }
        t.last_user_id += 1;
        let stored = User {
            id: t.last_user_id,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
        };
        t.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> StorageResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn get_all(&self) -> StorageResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn exists_by_email(&self, email: &str) -> StorageResult<bool> {
        Ok(self.inner.read().await.users.values().any(|u| u.email == email))
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let t = self.inner.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl ExpenseRepository for MemoryStore {
    async fn create(&self, fields: ExpenseFields) -> StorageResult<Expense> {
        let mut t = self.inner.write().await;
        t.check_owner(fields.user_id)?;
        t.last_expense_id += 1;
        let stored = Expense::from_fields(t.last_expense_id, fields);
        t.expenses.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> StorageResult<Option<Expense>> {
        Ok(self.inner.read().await.expenses.get(&id).cloned())
    }

    async fn get_all(&self) -> StorageResult<Vec<Expense>> {
        Ok(self.inner.read().await.expenses.values().cloned().collect())
    }

    async fn get_by_user(&self, user_id: i64) -> StorageResult<Vec<Expense>> {
        let t = self.inner.read().await;
        Ok(t.expenses
            .values()
            .filter(|e| e.user_id() == Some(user_id))
            .cloned()
            .collect())
    }

    async fn exists_by_id(&self, id: i64) -> StorageResult<bool> {
        Ok(self.inner.read().await.expenses.contains_key(&id))
    }

    async fn update(&self, expense: &Expense) -> StorageResult<Option<Expense>> {
        let mut t = self.inner.write().await;
        t.check_owner(expense.user_id())?;
        match t.expenses.get_mut(&expense.id) {
            Some(slot) => {
                *slot = expense.clone();
                Ok(Some(expense.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: i64) -> StorageResult<bool> {
        Ok(self.inner.write().await.expenses.remove(&id).is_some())
    }
}
