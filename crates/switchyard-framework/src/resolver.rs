//! Parameter resolution for handler slots.
//!
//! Every parameter of a handler is a [`Slot`]. For each request, each slot is
//! resolved on its own, in this fixed order:
//!
//! 1. `Arc<Request>` binds the exact request passed to dispatch.
//! 2. [`Captures`] binds the match produced by the accepting pattern.
//! 3. Any other type is delegated to the configured [`ParameterResolver`].
//! 4. With no resolver configured, resolution fails with
//!    [`DispatchError::UnresolvableParameter`].
//!
//! Nothing is cached between requests.

use std::any::{Any, TypeId};
use std::sync::Arc;

use switchyard_core::{HandlerError, Request};

use crate::error::DispatchError;
use crate::handler::HandlerMeta;
use crate::pattern::Captures;

/// A value produced by a [`ParameterResolver`].
pub type Resolved = Box<dyn Any + Send>;

/// One declared parameter of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    index: usize,
    type_id: TypeId,
    type_name: &'static str,
}

impl Slot {
    /// Describes slot `index` of type `T`.
    pub fn of<T: Any>(index: usize) -> Self {
        Self {
            index,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Zero-based position in the handler's parameter list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The declared type's id.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The declared type's name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the slot is declared exactly as `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

/// Supplies values for slots that have no built-in binding.
///
/// A resolver is configured once per dispatcher and called synchronously on
/// the dispatching thread. It must return a value of exactly the slot's type,
/// boxed as [`Resolved`].
///
/// If the value cannot be supplied, return an error. A
/// [`HandlerError::Reply`] is sent to the client as-is, which is the way to
/// answer, say, a malformed path segment with a `400`.
///
/// Closures with the matching signature implement this trait.
///
/// # Example
///
/// ```rust
/// use switchyard_core::HandlerError;
/// use switchyard_framework::{Captures, HandlerMeta, Resolved, Slot};
/// use switchyard_core::Request;
///
/// let resolver = |_: &HandlerMeta, slot: &Slot, caps: &Captures, _: &Request|
///     -> Result<Resolved, HandlerError> {
///     if slot.is::<u64>() {
///         let id: u64 = caps
///             .name("id")
///             .and_then(|v| v.parse().ok())
///             .ok_or_else(|| HandlerError::msg("missing id"))?;
///         return Ok(Box::new(id) as Resolved);
///     }
///     Err(HandlerError::msg(format!("unhandled {}", slot.type_name())))
/// };
/// # let _ = resolver;
/// ```
pub trait ParameterResolver: Send + Sync + 'static {
    /// Produces a value for `slot` of `handler`.
    fn resolve(
        &self,
        handler: &HandlerMeta,
        slot: &Slot,
        captures: &Captures,
        request: &Request,
    ) -> Result<Resolved, HandlerError>;
}

impl<F> ParameterResolver for F
where
    F: Fn(&HandlerMeta, &Slot, &Captures, &Request) -> Result<Resolved, HandlerError>
        + Send
        + Sync
        + 'static,
{
    fn resolve(
        &self,
        handler: &HandlerMeta,
        slot: &Slot,
        captures: &Captures,
        request: &Request,
    ) -> Result<Resolved, HandlerError> {
        (self)(handler, slot, captures, request)
    }
}

/// Everything needed to resolve the slots of one handler call.
///
/// An `Invocation` is built fresh for every accepted request and dropped when
/// the call returns.
pub struct Invocation<'a> {
    handler: &'a HandlerMeta,
    request: &'a Arc<Request>,
    captures: &'a Captures,
    resolver: Option<&'a dyn ParameterResolver>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        handler: &'a HandlerMeta,
        request: &'a Arc<Request>,
        captures: &'a Captures,
        resolver: Option<&'a dyn ParameterResolver>,
    ) -> Self {
        Self {
            handler,
            request,
            captures,
            resolver,
        }
    }

    /// Metadata of the handler being invoked.
    pub fn handler(&self) -> &HandlerMeta {
        self.handler
    }

    /// The request being handled.
    pub fn request(&self) -> &Arc<Request> {
        self.request
    }

    /// The captures of the accepting pattern.
    pub fn captures(&self) -> &Captures {
        self.captures
    }

    /// Resolves slot `index` as type `T`.
    pub fn resolve<T: Any + Send>(&self, index: usize) -> Result<T, DispatchError> {
        let slot = Slot::of::<T>(index);

        if slot.is::<Arc<Request>>() {
            if let Some(value) = cast::<T, _>(Arc::clone(self.request)) {
                return Ok(value);
            }
        } else if slot.is::<Captures>() {
            if let Some(value) = cast::<T, _>(self.captures.clone()) {
                return Ok(value);
            }
        }

        let Some(resolver) = self.resolver else {
            return Err(DispatchError::UnresolvableParameter {
                handler: self.handler.name().to_string(),
                index,
                type_name: slot.type_name(),
            });
        };

        let value = resolver
            .resolve(self.handler, &slot, self.captures, self.request)
            .map_err(|source| DispatchError::Resolver {
                handler: self.handler.name().to_string(),
                index,
                type_name: slot.type_name(),
                source,
            })?;

        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| DispatchError::ParameterTypeMismatch {
                handler: self.handler.name().to_string(),
                index,
                type_name: slot.type_name(),
            })
    }
}

/// Moves `value` into a `T` if both are the same type.
fn cast<T: Any, U: Any>(value: U) -> Option<T> {
    let mut value = Some(value);
    (&mut value as &mut dyn Any)
        .downcast_mut::<Option<T>>()
        .and_then(Option::take)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    fn fixture() -> (HandlerMeta, Arc<Request>, Captures) {
        let meta = HandlerMeta::new("fixture", Vec::new(), "()");
        let request = Arc::new(Request::new("GET", "/items/12"));
        let captures = Pattern::new("GET", r"/items/(?<id>\d+)")
            .unwrap()
            .captures("GET", "/items/12")
            .unwrap();
        (meta, request, captures)
    }

    #[test]
    fn test_request_slot_is_same_instance() {
        let (meta, request, captures) = fixture();
        let invocation = Invocation::new(&meta, &request, &captures, None);

        let resolved: Arc<Request> = invocation.resolve(0).unwrap();
        assert!(Arc::ptr_eq(&resolved, &request));
    }

    #[test]
    fn test_captures_slot() {
        let (meta, request, captures) = fixture();
        let invocation = Invocation::new(&meta, &request, &captures, None);

        let resolved: Captures = invocation.resolve(0).unwrap();
        assert_eq!(resolved.name("id"), Some("12"));
    }

    #[test]
    fn test_unknown_slot_without_resolver() {
        let (meta, request, captures) = fixture();
        let invocation = Invocation::new(&meta, &request, &captures, None);

        let err = invocation.resolve::<u64>(1).unwrap_err();
        match err {
            DispatchError::UnresolvableParameter {
                handler,
                index,
                type_name,
            } => {
                assert_eq!(handler, "fixture");
                assert_eq!(index, 1);
                assert_eq!(type_name, "u64");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolver_supplies_value() {
        let (meta, request, captures) = fixture();
        let resolver = |_: &HandlerMeta,
                        slot: &Slot,
                        caps: &Captures,
                        _: &Request|
         -> Result<Resolved, HandlerError> {
            assert!(slot.is::<u64>());
            let id: u64 = caps.name("id").unwrap().parse().unwrap();
            Ok(Box::new(id) as Resolved)
        };
        let invocation = Invocation::new(&meta, &request, &captures, Some(&resolver));

        assert_eq!(invocation.resolve::<u64>(0).unwrap(), 12);
    }

    #[test]
    fn test_resolver_not_consulted_for_builtins() {
        let (meta, request, captures) = fixture();
        let resolver = |_: &HandlerMeta,
                        _: &Slot,
                        _: &Captures,
                        _: &Request|
         -> Result<Resolved, HandlerError> {
            panic!("built-in slots must not reach the resolver")
        };
        let invocation = Invocation::new(&meta, &request, &captures, Some(&resolver));

        let resolved: Arc<Request> = invocation.resolve(0).unwrap();
        assert!(Arc::ptr_eq(&resolved, &request));
        let _: Captures = invocation.resolve(1).unwrap();
    }

    #[test]
    fn test_resolver_wrong_type() {
        let (meta, request, captures) = fixture();
        let resolver = |_: &HandlerMeta,
                        _: &Slot,
                        _: &Captures,
                        _: &Request|
         -> Result<Resolved, HandlerError> { Ok(Box::new("text")) };
        let invocation = Invocation::new(&meta, &request, &captures, Some(&resolver));

        let err = invocation.resolve::<u64>(0).unwrap_err();
        assert!(matches!(err, DispatchError::ParameterTypeMismatch { index: 0, .. }));
    }

    #[test]
    fn test_resolver_failure_keeps_source() {
        let (meta, request, captures) = fixture();
        let resolver = |_: &HandlerMeta,
                        _: &Slot,
                        _: &Captures,
                        _: &Request|
         -> Result<Resolved, HandlerError> { Err(HandlerError::msg("no session")) };
        let invocation = Invocation::new(&meta, &request, &captures, Some(&resolver));

        let err = invocation.resolve::<String>(3).unwrap_err();
        let source = err.handler_error().unwrap();
        assert_eq!(source.to_string(), "no session");
        assert!(matches!(err, DispatchError::Resolver { index: 3, .. }));
    }

    #[test]
    fn test_slot_describes_type() {
        let slot = Slot::of::<Arc<Request>>(2);
        assert_eq!(slot.index(), 2);
        assert!(slot.is::<Arc<Request>>());
        assert!(!slot.is::<Request>());
        assert!(slot.type_name().contains("Request"));
    }
}
