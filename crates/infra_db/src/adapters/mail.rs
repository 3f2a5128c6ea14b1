//! PostgreSQL Mail Adapter
//!
//! Queues messages in `mail_message`; delivery is a separate process.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use core_kernel::{DomainPort, MailMessageId, OperationMetadata, PortError};
use domain_invoice::{MailPort, NewMailMessage};

use crate::repositories::MailRepository;

/// PostgreSQL-backed implementation of the MailPort trait
#[derive(Debug, Clone)]
pub struct PostgresMailAdapter {
    repository: MailRepository,
}

impl PostgresMailAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: MailRepository::new(pool),
        }
    }

    pub fn repository(&self) -> &MailRepository {
        &self.repository
    }
}

impl DomainPort for PostgresMailAdapter {}

#[async_trait]
impl MailPort for PostgresMailAdapter {
    #[instrument(skip(self, message, _metadata), fields(user_id = %message.user_id))]
    async fn queue_mail_message(
        &self,
        message: NewMailMessage,
        _metadata: Option<OperationMetadata>,
    ) -> Result<MailMessageId, PortError> {
        if message.recipients.is_empty() {
            return Err(PortError::validation_field("A message needs a recipient", "recipients"));
        }
        let id = self
            .repository
            .insert(
                message.user_id.value(),
                &message.recipients,
                &message.subject,
                &message.body,
            )
            .await?;
        info!(mail_id = id, subject = %message.subject, "Mail queued");
        Ok(MailMessageId::new(id))
    }
}
