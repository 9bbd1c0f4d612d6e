//! Notification handlers reacting to `TodoCreated`.

use std::sync::Arc;

use mediator_rs::{async_trait, CancellationToken, NotificationHandler, Registrar, Services};

use crate::support::{TodoCreated, Trace};

pub fn register(r: &mut Registrar<'_>) {
    r.notification::<TodoCreated, _, _>(AuditLog::from_services)
        .notification::<TodoCreated, _, _>(Mailer::from_services);
}

pub struct AuditLog {
    trace: Arc<Trace>,
}

impl AuditLog {
    fn from_services(services: &Services) -> Result<Self, mediator_rs::DispatchError> {
        Ok(Self {
            trace: services.get()?,
        })
    }
}

#[async_trait]
impl NotificationHandler<TodoCreated> for AuditLog {
    async fn handle(&self, event: &TodoCreated, _: &CancellationToken) -> anyhow::Result<()> {
        self.trace.record(format!("audit:{}", event.id));
        Ok(())
    }
}

pub struct Mailer {
    trace: Arc<Trace>,
}

impl Mailer {
    fn from_services(services: &Services) -> Result<Self, mediator_rs::DispatchError> {
        Ok(Self {
            trace: services.get()?,
        })
    }
}

#[async_trait]
impl NotificationHandler<TodoCreated> for Mailer {
    async fn handle(&self, event: &TodoCreated, _: &CancellationToken) -> anyhow::Result<()> {
        self.trace.record(format!("mail:{}", event.id));
        Ok(())
    }
}
