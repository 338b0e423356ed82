//! In-memory store implementations backing the coordinator tests. The
//! conditional writes run under one lock, giving the same atomicity the
//! SQL statements provide.

use crate::error::AppResult;
use crate::models::{NewsletterSubscriber, PromotionCode};
use crate::stores::{PromotionStore, SubscriberStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryPromotionStore {
    rows: Mutex<HashMap<i64, PromotionCode>>,
}

impl MemoryPromotionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, code: PromotionCode) {
        self.rows.lock().await.insert(code.id, code);
    }

    pub async fn get(&self, id: i64) -> Option<PromotionCode> {
        self.rows.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl PromotionStore for MemoryPromotionStore {
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<PromotionCode>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .values()
            .find(|row| row.code == code && row.is_active)
            .cloned())
    }

    async fn increment_usage(&self, id: i64) -> AppResult<bool> {
        let mut rows = self.rows.lock().await;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(false);
        };

        if matches!(row.usage_limit, Some(limit) if row.used_count >= limit) {
            return Ok(false);
        }

        row.used_count += 1;
        row.updated_at = Utc::now();
        Ok(true)
    }
}

struct SubscriberRows {
    rows: HashMap<i64, NewsletterSubscriber>,
    next_id: i64,
}

pub struct MemorySubscriberStore {
    inner: Mutex<SubscriberRows>,
}

impl Default for MemorySubscriberStore {
    fn default() -> Self {
        Self {
            inner: Mutex::new(SubscriberRows {
                rows: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl MemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: i64) -> Option<NewsletterSubscriber> {
        self.inner.lock().await.rows.get(&id).cloned()
    }
}

#[async_trait]
impl SubscriberStore for MemorySubscriberStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<NewsletterSubscriber>> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.values().find(|s| s.email == email).cloned())
    }

    async fn find_by_personal_code(&self, code: &str) -> AppResult<Option<NewsletterSubscriber>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rows
            .values()
            .find(|s| s.personal_code.as_deref() == Some(code) && s.is_active)
            .cloned())
    }

    async fn personal_code_exists(&self, code: &str) -> AppResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rows
            .values()
            .any(|s| s.personal_code.as_deref() == Some(code)))
    }

    async fn insert(
        &self,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        personal_code: &str,
    ) -> AppResult<NewsletterSubscriber> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let now = Utc::now();
        let subscriber = NewsletterSubscriber {
            id,
            email: email.to_string(),
            first_name: first_name.map(str::to_string),
            last_name: last_name.map(str::to_string),
            is_active: true,
            subscribed_at: now,
            welcome_email_sent: false,
            welcome_email_sent_at: None,
            personal_code: Some(personal_code.to_string()),
            discount_used: false,
            discount_used_at: None,
            discount_order_id: None,
            created_at: now,
            updated_at: now,
        };

        inner.rows.insert(id, subscriber.clone());
        Ok(subscriber)
    }

    async fn reactivate(&self, id: i64) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(row) = inner.rows.get_mut(&id) {
            row.is_active = true;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn deactivate(&self, id: i64) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(row) = inner.rows.get_mut(&id) {
            row.is_active = false;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_welcome_sent(&self, id: i64) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(row) = inner.rows.get_mut(&id) {
            row.welcome_email_sent = true;
            row.welcome_email_sent_at = Some(Utc::now());
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn commit_redemption(&self, id: i64, order_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(false);
        };

        if row.discount_used {
            return Ok(false);
        }

        row.discount_used = true;
        row.discount_used_at = Some(Utc::now());
        row.discount_order_id = Some(order_id);
        row.updated_at = Utc::now();
        Ok(true)
    }
}
