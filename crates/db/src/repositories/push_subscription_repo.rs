//! Repository for the `push_subscriptions` table.

use sqlx::PgPool;
use turno_core::types::DbId;

use crate::models::push_subscription::PushSubscription;

/// Column list for `push_subscriptions` queries.
const COLUMNS: &str =
    "id, user_id, endpoint, p256dh, auth, failed_count, is_active, created_at, updated_at";

/// Deactivate a subscription once it accumulates this many consecutive
/// delivery failures.
const MAX_CONSECUTIVE_FAILURES: i32 = 5;

/// Provides lookup and delivery-health bookkeeping for push subscriptions.
pub struct PushSubscriptionRepo;

impl PushSubscriptionRepo {
    /// List a user's active subscriptions, oldest first.
    pub async fn list_active_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PushSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM push_subscriptions \
             WHERE user_id = $1 AND is_active = true \
             ORDER BY created_at"
        );
        sqlx::query_as::<_, PushSubscription>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Reset the consecutive-failure counter after a successful delivery.
    pub async fn record_success(pool: &PgPool, subscription_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE push_subscriptions \
             SET failed_count = 0, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(subscription_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failed delivery attempt.
    ///
    /// Increments the consecutive-failure counter from `prior_failed_count`
    /// and deactivates the subscription once it reaches
    /// `MAX_CONSECUTIVE_FAILURES`. Returns whether the subscription is still
    /// active afterward.
    pub async fn record_failure(
        pool: &PgPool,
        subscription_id: DbId,
        prior_failed_count: i32,
    ) -> Result<bool, sqlx::Error> {
        let new_count = prior_failed_count + 1;
        let still_active = new_count < MAX_CONSECUTIVE_FAILURES;
        sqlx::query(
            "UPDATE push_subscriptions \
             SET failed_count = $2, is_active = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(subscription_id)
        .bind(new_count)
        .bind(still_active)
        .execute(pool)
        .await?;
        Ok(still_active)
    }

    /// Deactivate a subscription whose endpoint is gone for good.
    pub async fn deactivate(pool: &PgPool, subscription_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE push_subscriptions \
             SET is_active = false, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(subscription_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
