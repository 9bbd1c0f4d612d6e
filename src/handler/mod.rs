//! Handler contracts.
//!
//! Each contract is generic over the request type, so one implementation
//! type may handle several requests by implementing the contract more than
//! once. Handlers receive the caller's cancellation token and must pass it
//! on to anything they await.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::request::{Command, Notification, Query};

/// Handles one command type.
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync + 'static {
    async fn handle(&self, command: C, cancel: &CancellationToken) -> anyhow::Result<C::Output>;
}

/// Handles one query type. Expected to be free of side effects.
#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync + 'static {
    async fn handle(&self, query: Q, cancel: &CancellationToken) -> anyhow::Result<Q::Output>;
}

/// One of possibly many handlers reacting to a notification.
#[async_trait]
pub trait NotificationHandler<N: Notification>: Send + Sync + 'static {
    async fn handle(&self, notification: &N, cancel: &CancellationToken) -> anyhow::Result<()>;
}
