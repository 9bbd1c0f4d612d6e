use std::any::TypeId;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::builder::MediatorBuilder;
use super::options::MediatorOptions;
use super::publish::fan_out;
use crate::error::DispatchError;
use crate::pipeline::{compose, Interceptor, PipelinePlan, PlanCache, PlannedStage};
use crate::registry::{InstanceCache, Registry, Resolver, Services};
use crate::request::{Command, Envelope, Notification, Query, RequestKind};
use crate::validation::ValidationGate;

/// State shared by a `Mediator` and every `Dispatcher` it hands out.
struct Shared {
    registry: Registry,
    options: MediatorOptions,
    services: Arc<Services>,
    singletons: InstanceCache,
    plans: PlanCache,
}

impl Shared {
    fn plan(&self, request_type: TypeId, kind: RequestKind) -> Arc<PipelinePlan> {
        let build = || {
            PipelinePlan::build(self.registry.interceptors(), kind, self.options.validation)
        };
        if self.options.cache_pipelines {
            self.plans.get_or_build(request_type, build)
        } else {
            Arc::new(build())
        }
    }
}

/// The configured dispatch engine.
///
/// Cheap to clone; clones share the registry, the singleton instances and
/// the plan cache. Dispatch goes through a [`Dispatcher`], one per unit of
/// work, obtained from [`Mediator::scope`]. The `send`, `query` and
/// `publish` shortcuts here open a fresh scope for every call.
#[derive(Clone)]
pub struct Mediator {
    shared: Arc<Shared>,
}

impl Mediator {
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::new()
    }

    pub(crate) fn new(registry: Registry, options: MediatorOptions, services: Services) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry,
                options,
                services: Arc::new(services),
                singletons: InstanceCache::default(),
                plans: PlanCache::default(),
            }),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.shared.registry
    }

    pub fn options(&self) -> &MediatorOptions {
        &self.shared.options
    }

    /// Open a unit of work with no extra collaborators.
    pub fn scope(&self) -> Dispatcher {
        self.scope_with(Services::new())
    }

    /// Open a unit of work whose collaborators shadow the application-wide ones.
    pub fn scope_with(&self, services: Services) -> Dispatcher {
        Dispatcher {
            shared: self.shared.clone(),
            services: services.over(self.shared.services.clone()),
            scoped: InstanceCache::default(),
        }
    }

    pub async fn send<C: Command>(
        &self,
        command: C,
        cancel: &CancellationToken,
    ) -> Result<C::Output, DispatchError> {
        self.scope().send(command, cancel).await
    }

    pub async fn query<Q: Query>(
        &self,
        query: Q,
        cancel: &CancellationToken,
    ) -> Result<Q::Output, DispatchError> {
        self.scope().query(query, cancel).await
    }

    pub async fn publish<N: Notification>(
        &self,
        notification: N,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.scope().publish(notification, cancel).await
    }

    /// See [`Dispatcher::pipeline_for`].
    pub fn pipeline_for<R: 'static>(&self) -> Option<Vec<&'static str>> {
        pipeline_names::<R>(&self.shared)
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("registry", &self.shared.registry)
            .field("options", &self.shared.options)
            .finish_non_exhaustive()
    }
}

/// Dispatches requests for one unit of work.
///
/// Scoped handlers, validators and interceptors are built at most once per
/// `Dispatcher` and dropped with it. Concurrent dispatches should each use
/// their own `Dispatcher` unless the scoped instances are safe to share.
pub struct Dispatcher {
    shared: Arc<Shared>,
    services: Services,
    scoped: InstanceCache,
}

impl Dispatcher {
    /// Run `command` through its pipeline and return the handler's result.
    ///
    /// Fails with `Unregistered` if no handler handles `C`, with
    /// `Validation` if validation is enabled and a validator rejects it,
    /// or with whatever the handler or an interceptor raised.
    pub async fn send<C: Command>(
        &self,
        command: C,
        cancel: &CancellationToken,
    ) -> Result<C::Output, DispatchError> {
        self.dispatch::<C, C::Output>(RequestKind::Command, command, cancel)
            .await
    }

    /// Run `query` through its pipeline and return the handler's result.
    pub async fn query<Q: Query>(
        &self,
        query: Q,
        cancel: &CancellationToken,
    ) -> Result<Q::Output, DispatchError> {
        self.dispatch::<Q, Q::Output>(RequestKind::Query, query, cancel)
            .await
    }

    /// Deliver `notification` to every handler registered for its type.
    ///
    /// No interceptors or validators are involved. Having no handler is not
    /// an error. Failures are reported according to the configured
    /// `PublishStrategy`.
    pub async fn publish<N: Notification>(
        &self,
        notification: N,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let descriptors = self.shared.registry.notification_handlers_for::<N>();
        let resolver = self.resolver();
        fan_out(
            descriptors,
            &resolver,
            &notification,
            cancel,
            self.shared.options.publish_strategy,
        )
        .await
    }

    /// Names of the stages wrapping the handler of `R`, outermost first.
    ///
    /// Interceptors appear under their type names and the validation gate
    /// as `mediator_rs::validation::ValidationGate`. `None` when `R` has no
    /// command or query handler.
    pub fn pipeline_for<R: 'static>(&self) -> Option<Vec<&'static str>> {
        pipeline_names::<R>(&self.shared)
    }

    /// Collaborators visible to this unit of work.
    pub fn services(&self) -> &Services {
        &self.services
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver {
            services: &self.services,
            scoped: &self.scoped,
            singletons: &self.shared.singletons,
        }
    }

    async fn dispatch<R, O>(
        &self,
        kind: RequestKind,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<O, DispatchError>
    where
        R: Send + Sync + 'static,
        O: 'static,
    {
        let request_type = std::any::type_name::<R>();
        let registry = &self.shared.registry;

        // Resolve the handler before anything runs.
        let handler = registry
            .handler_for::<R>()
            .filter(|descriptor| descriptor.kind() == kind)
            .ok_or(DispatchError::Unregistered { kind, request_type })?;

        let resolver = self.resolver();
        let terminal = handler.bind(&resolver)?;

        let plan = self.shared.plan(TypeId::of::<R>(), kind);
        let mut interceptors: Vec<Arc<dyn Interceptor>> = Vec::with_capacity(plan.len());
        for stage in plan.stages() {
            match stage {
                PlannedStage::Interceptor(index) => {
                    if let Some(descriptor) = registry.interceptors().get(*index) {
                        interceptors.push(descriptor.bind(&resolver)?);
                    }
                }
                PlannedStage::ValidationGate => {
                    let validators = registry
                        .validators_for::<R>()
                        .iter()
                        .map(|descriptor| descriptor.bind(&resolver))
                        .collect::<Result<Vec<_>, DispatchError>>()?;
                    interceptors.push(Arc::new(ValidationGate::new(validators)));
                }
            }
        }

        tracing::debug!(
            kind = %kind,
            request = request_type,
            handler = handler.implementation(),
            stages = plan.len(),
            "dispatching request"
        );

        let pipeline = compose(interceptors, terminal);
        let response = pipeline(Envelope::new(kind, request), cancel.clone()).await?;
        response
            .into_inner::<O>()
            .map_err(|response| DispatchError::TypeMismatch {
                expected: std::any::type_name::<O>(),
                found: response.type_name(),
            })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

fn pipeline_names<R: 'static>(shared: &Shared) -> Option<Vec<&'static str>> {
    let handler = shared.registry.handler_for::<R>()?;
    let plan = shared.plan(TypeId::of::<R>(), handler.kind());
    Some(plan.stage_names(shared.registry.interceptors()))
}
