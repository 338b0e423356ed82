use crate::error::AppResult;
use crate::models::PromotionCode;
use async_trait::async_trait;
use sqlx::PgPool;

/// Lookup and usage accounting for shared promotion codes. `used_count`
/// is only ever written through `increment_usage`.
#[async_trait]
pub trait PromotionStore: Send + Sync {
    /// Case-insensitive lookup; callers pass an already canonicalized
    /// (trimmed, upper-cased) code. Inactive codes are not returned.
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<PromotionCode>>;

    /// Conditionally consume one use of the code. Returns `false` when the
    /// usage cap was reached by a concurrent redemption; the check and the
    /// increment are a single atomic write.
    async fn increment_usage(&self, id: i64) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct PgPromotionStore {
    pool: PgPool,
}

impl PgPromotionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromotionStore for PgPromotionStore {
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<PromotionCode>> {
        let promotion = sqlx::query_as::<_, PromotionCode>(
            r#"
            SELECT
                id, code, description, discount_kind, discount_value,
                minimum_order_amount, maximum_discount, usage_limit, used_count,
                valid_from, valid_until, is_active,
                first_time_only, new_customers_only, one_time_per_customer,
                created_at, updated_at
            FROM promotion_codes
            WHERE code = $1 AND is_active = TRUE
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promotion)
    }

    async fn increment_usage(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE promotion_codes
            SET used_count = used_count + 1, updated_at = now()
            WHERE id = $1
              AND (usage_limit IS NULL OR used_count < usage_limit)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
