use crate::error::AppResult;
use crate::models::NewsletterSubscriber;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Storage for newsletter subscribers and their one-shot personal discount
/// codes. `discount_used` is only ever written through `commit_redemption`.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Lookup by canonicalized (lower-cased) email, regardless of
    /// subscription state. Callers decide how inactive rows are treated.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<NewsletterSubscriber>>;

    /// Lookup by canonicalized (upper-cased) personal code. Only active
    /// subscribers resolve; an unsubscribed customer's code is dead.
    async fn find_by_personal_code(&self, code: &str) -> AppResult<Option<NewsletterSubscriber>>;

    /// Uniqueness probe used while generating personal codes; sees every
    /// row, active or not.
    async fn personal_code_exists(&self, code: &str) -> AppResult<bool>;

    async fn insert(
        &self,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        personal_code: &str,
    ) -> AppResult<NewsletterSubscriber>;

    async fn reactivate(&self, id: i64) -> AppResult<()>;

    async fn deactivate(&self, id: i64) -> AppResult<()>;

    async fn mark_welcome_sent(&self, id: i64) -> AppResult<()>;

    /// Flip the one-shot usage flag and stamp the owning order. Returns
    /// `false` when the code was already consumed; the check and the write
    /// are a single atomic operation.
    async fn commit_redemption(&self, id: i64, order_id: Uuid) -> AppResult<bool>;
}

const SUBSCRIBER_COLUMNS: &str = r#"
    id, email, first_name, last_name, is_active, subscribed_at,
    welcome_email_sent, welcome_email_sent_at, personal_code,
    discount_used, discount_used_at, discount_order_id,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct PgSubscriberStore {
    pool: PgPool,
}

impl PgSubscriberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberStore for PgSubscriberStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<NewsletterSubscriber>> {
        let subscriber = sqlx::query_as::<_, NewsletterSubscriber>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM newsletter_subscribers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscriber)
    }

    async fn find_by_personal_code(&self, code: &str) -> AppResult<Option<NewsletterSubscriber>> {
        let subscriber = sqlx::query_as::<_, NewsletterSubscriber>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM newsletter_subscribers \
             WHERE personal_code = $1 AND is_active = TRUE"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscriber)
    }

    async fn personal_code_exists(&self, code: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM newsletter_subscribers WHERE personal_code = $1",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn insert(
        &self,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        personal_code: &str,
    ) -> AppResult<NewsletterSubscriber> {
        let subscriber = sqlx::query_as::<_, NewsletterSubscriber>(&format!(
            r#"
            INSERT INTO newsletter_subscribers (email, first_name, last_name, personal_code)
            VALUES ($1, $2, $3, $4)
            RETURNING {SUBSCRIBER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(personal_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(subscriber)
    }

    async fn reactivate(&self, id: i64) -> AppResult<()> {
        sqlx::query(
            "UPDATE newsletter_subscribers SET is_active = TRUE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn deactivate(&self, id: i64) -> AppResult<()> {
        sqlx::query(
            "UPDATE newsletter_subscribers SET is_active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_welcome_sent(&self, id: i64) -> AppResult<()> {
        sqlx::query(
            "UPDATE newsletter_subscribers \
             SET welcome_email_sent = TRUE, welcome_email_sent_at = now(), updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn commit_redemption(&self, id: i64, order_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE newsletter_subscribers
            SET discount_used = TRUE, discount_used_at = now(),
                discount_order_id = $2, updated_at = now()
            WHERE id = $1 AND discount_used = FALSE
            "#,
        )
        .bind(id)
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
