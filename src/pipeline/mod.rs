//! Pipeline: ordered interceptors wrapped around a handler call.
//!
//! ## Composition
//!
//! ```text
//!   send(cmd)
//!      │
//!      ▼
//! ┌──────────────┐  next  ┌──────────────┐  next  ┌────────────────┐  next  ┌─────────┐
//! │ interceptor 1│ ─────▶ │ interceptor 2│ ─────▶ │ validation gate│ ─────▶ │ handler │
//! └──────────────┘ ◀───── └──────────────┘ ◀───── └────────────────┘ ◀───── └─────────┘
//!                 result                  result                    result
//! ```
//!
//! Interceptors apply to all requests, to commands only or to queries only.
//! The one registered first is outermost: it runs first on the way in and
//! last on the way out. An interceptor that returns without calling `next`
//! short-circuits everything inside it.
//!
//! ## Writing an interceptor
//!
//! ```ignore
//! struct Timing;
//!
//! #[async_trait]
//! impl Interceptor for Timing {
//!     async fn intercept(
//!         &self,
//!         request: Envelope,
//!         cancel: CancellationToken,
//!         next: Next,
//!     ) -> DispatchResult {
//!         let started = Instant::now();
//!         let result = next.run(request, cancel).await;
//!         println!("took {:?}", started.elapsed());
//!         result
//!     }
//! }
//! ```

mod cache;
mod plan;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::DispatchResult;
use crate::request::{Envelope, RequestKind};

pub(crate) use cache::PlanCache;
pub(crate) use plan::{PipelinePlan, PlannedStage};

/// One composed step of the chain: the handler call, or an interceptor
/// wrapped around everything inside it.
pub(crate) type Stage = Arc<dyn Fn(Envelope, CancellationToken) -> StageFuture + Send + Sync>;

pub(crate) type StageFuture = BoxFuture<'static, DispatchResult>;

/// Which request kinds an interceptor wraps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    #[default]
    All,
    CommandOnly,
    QueryOnly,
}

impl Applicability {
    pub fn applies_to(self, kind: RequestKind) -> bool {
        match self {
            Applicability::All => true,
            Applicability::CommandOnly => kind == RequestKind::Command,
            Applicability::QueryOnly => kind == RequestKind::Query,
        }
    }
}

/// Cross-cutting logic wrapped around command and query handlers.
///
/// An interceptor may run code before and after `next`, inspect or replace
/// the result, catch a failure and substitute a result, or skip `next`
/// entirely and return its own result.
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    async fn intercept(
        &self,
        request: Envelope,
        cancel: CancellationToken,
        next: Next,
    ) -> DispatchResult;
}

/// The rest of the chain, as seen from inside an interceptor.
pub struct Next {
    stage: Stage,
}

impl Next {
    /// Run every inner stage, ending with the handler.
    pub async fn run(self, request: Envelope, cancel: CancellationToken) -> DispatchResult {
        (self.stage)(request, cancel).await
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// Fold interceptors around `terminal`, last to first, so the first
/// interceptor ends up outermost.
pub(crate) fn compose(interceptors: Vec<Arc<dyn Interceptor>>, terminal: Stage) -> Stage {
    interceptors
        .into_iter()
        .rev()
        .fold(terminal, |inner, interceptor| -> Stage {
            Arc::new(move |request: Envelope, cancel: CancellationToken| -> StageFuture {
                let interceptor = interceptor.clone();
                let next = Next {
                    stage: inner.clone(),
                };
                Box::pin(async move { interceptor.intercept(request, cancel, next).await })
            })
        })
}
