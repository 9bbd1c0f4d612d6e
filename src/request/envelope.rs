//! Type-erased request and response values carried through the pipeline.

use std::any::{Any, TypeId};
use std::fmt;

use super::RequestKind;

/// A request on its way through the interceptor pipeline.
///
/// Interceptors are shared across all request types, so they see the request
/// behind this envelope. They can read its kind and type name, and downcast
/// to a concrete type when they need the payload.
pub struct Envelope {
    kind: RequestKind,
    type_id: TypeId,
    type_name: &'static str,
    payload: Box<dyn Any + Send + Sync>,
}

impl Envelope {
    pub(crate) fn new<R: Send + Sync + 'static>(kind: RequestKind, request: R) -> Self {
        Self {
            kind,
            type_id: TypeId::of::<R>(),
            type_name: std::any::type_name::<R>(),
            payload: Box::new(request),
        }
    }

    /// Command or query.
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// `TypeId` of the concrete request.
    pub fn request_type(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified name of the concrete request type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the request is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrow the request as a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }

    /// Mutably borrow the request as a `T`, e.g. to normalise it before the handler.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.payload.downcast_mut()
    }

    /// Take the request out as a `T`, or get the envelope back on mismatch.
    pub fn into_inner<T: 'static>(self) -> Result<T, Self> {
        let Self {
            kind,
            type_id,
            type_name,
            payload,
        } = self;
        match payload.downcast::<T>() {
            Ok(request) => Ok(*request),
            Err(payload) => Err(Self {
                kind,
                type_id,
                type_name,
                payload,
            }),
        }
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A handler result on its way back out of the pipeline.
///
/// An interceptor may inspect it, or return its own `Response` instead of
/// calling the next stage. The dispatcher downcasts it to the request's
/// output type at the end of the chain.
pub struct Response {
    type_name: &'static str,
    value: Box<dyn Any + Send>,
}

impl Response {
    pub fn new<T: Send + 'static>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Name of the type held.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut()
    }

    /// Take the value out as a `T`, or get the response back on mismatch.
    pub fn into_inner<T: 'static>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|value| Self { type_name, value })
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
