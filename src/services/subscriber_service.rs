use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::external::NotificationDispatcher;
use crate::models::{NewsletterSubscriber, SubscribeRequest, SubscribeResult};
use crate::stores::SubscriberStore;
use crate::utils::{canonicalize_email, generate_unique_personal_code, is_valid_email};

#[derive(Clone)]
pub struct SubscriberService {
    subscribers: Arc<dyn SubscriberStore>,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl SubscriberService {
    pub fn new(
        subscribers: Arc<dyn SubscriberStore>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            subscribers,
            notifier,
        }
    }

    /// Subscribe an email address. A first subscription issues the
    /// subscriber's personal discount code and dispatches the welcome
    /// notification; a previously unsubscribed address is reactivated with
    /// its original code and usage state intact.
    pub async fn subscribe(&self, request: SubscribeRequest) -> AppResult<SubscribeResult> {
        let email = canonicalize_email(&request.email);
        if !is_valid_email(&email) {
            return Err(AppError::ValidationError(
                "Please provide a valid email address".to_string(),
            ));
        }

        if let Some(existing) = self.subscribers.find_by_email(&email).await? {
            if existing.is_active {
                return Ok(SubscribeResult::AlreadySubscribed(existing));
            }

            self.subscribers.reactivate(existing.id).await?;
            log::info!("Reactivated newsletter subscription for {email}");
            return Ok(SubscribeResult::Reactivated(NewsletterSubscriber {
                is_active: true,
                ..existing
            }));
        }

        let personal_code =
            generate_unique_personal_code(self.subscribers.as_ref(), &email).await?;

        let subscriber = self
            .subscribers
            .insert(
                &email,
                request.first_name.as_deref(),
                request.last_name.as_deref(),
                &personal_code,
            )
            .await?;

        // The discount only becomes usable once the welcome notification
        // carrying the code actually went out.
        match self
            .notifier
            .send_welcome(&email, subscriber.first_name.as_deref(), &personal_code)
            .await
        {
            Ok(()) => {
                self.subscribers.mark_welcome_sent(subscriber.id).await?;
                log::info!("New newsletter subscription for {email}");
                Ok(SubscribeResult::Created(NewsletterSubscriber {
                    welcome_email_sent: true,
                    ..subscriber
                }))
            }
            Err(e) => {
                log::error!("Failed to dispatch welcome notification for {email}: {e}");
                Ok(SubscribeResult::Created(subscriber))
            }
        }
    }

    /// Soft-deactivate a subscription. The personal code and its usage
    /// state are retained so the subscriber cannot reset a consumed code
    /// by cycling their subscription.
    pub async fn unsubscribe(&self, raw_email: &str) -> AppResult<NewsletterSubscriber> {
        let email = canonicalize_email(raw_email);

        let subscriber = self
            .subscribers
            .find_by_email(&email)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| {
                AppError::NotFound("Email not found in our newsletter list".to_string())
            })?;

        self.subscribers.deactivate(subscriber.id).await?;
        log::info!("Unsubscribed {email} from newsletter");

        Ok(NewsletterSubscriber {
            is_active: false,
            ..subscriber
        })
    }

    pub async fn status(&self, raw_email: &str) -> AppResult<NewsletterSubscriber> {
        let email = canonicalize_email(raw_email);

        self.subscribers
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("Email not found in our newsletter list".to_string()))
    }
}
