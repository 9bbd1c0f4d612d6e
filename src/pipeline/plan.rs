use crate::registry::InterceptorDescriptor;
use crate::request::RequestKind;

/// A stage position in a composed pipeline, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlannedStage {
    /// Registry index of an interceptor.
    Interceptor(usize),
    ValidationGate,
}

/// Which stages wrap a handler for one request type, and in what order.
///
/// A plan holds no instances, so it can be shared across dispatches and
/// threads; instances are resolved per dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PipelinePlan {
    stages: Vec<PlannedStage>,
}

pub(crate) const VALIDATION_GATE: &str = "mediator_rs::validation::ValidationGate";

impl PipelinePlan {
    /// Keep interceptors applicable to `kind` in registration order, then
    /// the validation gate innermost when enabled.
    pub(crate) fn build(
        interceptors: &[InterceptorDescriptor],
        kind: RequestKind,
        validation: bool,
    ) -> Self {
        let mut applicable: Vec<&InterceptorDescriptor> = interceptors
            .iter()
            .filter(|descriptor| descriptor.applicability().applies_to(kind))
            .collect();
        applicable.sort_by_key(|descriptor| descriptor.index());

        let mut stages: Vec<PlannedStage> = applicable
            .into_iter()
            .map(|descriptor| PlannedStage::Interceptor(descriptor.index()))
            .collect();
        if validation {
            stages.push(PlannedStage::ValidationGate);
        }

        Self { stages }
    }

    pub(crate) fn stages(&self) -> &[PlannedStage] {
        &self.stages
    }

    pub(crate) fn len(&self) -> usize {
        self.stages.len()
    }

    /// Implementation names, outermost first.
    pub(crate) fn stage_names(&self, interceptors: &[InterceptorDescriptor]) -> Vec<&'static str> {
        self.stages
            .iter()
            .filter_map(|stage| match stage {
                PlannedStage::Interceptor(index) => interceptors
                    .get(*index)
                    .map(InterceptorDescriptor::implementation),
                PlannedStage::ValidationGate => Some(VALIDATION_GATE),
            })
            .collect()
    }
}
