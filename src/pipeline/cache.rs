use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;

use super::plan::PipelinePlan;

/// Plans keyed by request type.
///
/// Purely an optimisation: a plan depends only on the read-only registry,
/// so building it again yields the same plan.
#[derive(Default)]
pub(crate) struct PlanCache {
    plans: DashMap<TypeId, Arc<PipelinePlan>>,
}

impl PlanCache {
    pub(crate) fn get_or_build<F>(&self, request_type: TypeId, build: F) -> Arc<PipelinePlan>
    where
        F: FnOnce() -> PipelinePlan,
    {
        if let Some(plan) = self.plans.get(&request_type) {
            return plan.clone();
        }
        self.plans
            .entry(request_type)
            .or_insert_with(|| Arc::new(build()))
            .clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.plans.len()
    }
}
