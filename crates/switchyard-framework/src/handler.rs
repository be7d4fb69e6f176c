//! Handler system.
//!
//! Any plain function or closure taking up to 16 parameters can serve as a
//! route handler, similar to Axum's handlers. Each parameter is a
//! [`Slot`](crate::resolver::Slot) that is resolved per request, and the return
//! value goes through the [coercion chain](crate::coercer).
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use switchyard_core::{Request, Response};
//! use switchyard_framework::Captures;
//!
//! // No parameters
//! fn root() -> Response {
//!     Response::text("root")
//! }
//!
//! // Built-in slots: the request and the pattern match
//! fn echo(request: Arc<Request>, captures: Captures) -> Response {
//!     Response::text(format!("{} {}", request.method(), captures.as_str()))
//! }
//!
//! // A slot supplied by a parameter resolver, a value for the coercer
//! fn square(n: u64) -> u64 {
//!     n * n
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::coercer::{IntoOutput, Output};
use crate::error::{DispatchError, DispatchResult};
use crate::resolver::{Invocation, Slot};

/// Static metadata about a handler.
///
/// Passed to parameter resolvers and response coercers so they can inspect
/// the handler's slots and declared return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerMeta {
    name: String,
    slots: Vec<Slot>,
    output_type: &'static str,
}

impl HandlerMeta {
    /// Creates handler metadata.
    pub fn new(name: impl Into<String>, slots: Vec<Slot>, output_type: &'static str) -> Self {
        Self {
            name: name.into(),
            slots,
            output_type,
        }
    }

    /// The handler's name, used in errors and logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The handler's parameter slots, in declaration order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// The declared return type.
    pub fn output_type(&self) -> &'static str {
        self.output_type
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// A route handler with parameter list `T`.
///
/// # Blanket Implementation
///
/// This trait is implemented for every `Fn` that:
/// - takes 0-16 parameters, each `Any + Send`
/// - returns a type implementing [`IntoOutput`]
pub trait Handler<T>: Send + Sync + 'static {
    /// Describes the handler's parameters.
    fn slots() -> Vec<Slot>;

    /// Names the handler's return type.
    fn output_type() -> &'static str;

    /// Resolves every slot and calls the handler.
    fn call(&self, invocation: &Invocation<'_>) -> DispatchResult<Output>;
}

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
        impl<F, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn($($ty,)*) -> Res + Send + Sync + 'static,
            Res: IntoOutput,
            $( $ty: Any + Send, )*
        {
            fn slots() -> Vec<Slot> {
                let mut index = 0;
                let mut slots = Vec::new();
                $(
                    slots.push(Slot::of::<$ty>(index));
                    index += 1;
                )*
                slots
            }

            fn output_type() -> &'static str {
                std::any::type_name::<Res>()
            }

            fn call(&self, invocation: &Invocation<'_>) -> DispatchResult<Output> {
                let mut index = 0;
                $(
                    let $ty = invocation.resolve::<$ty>(index)?;
                    index += 1;
                )*

                (self)($($ty,)*)
                    .into_output()
                    .map_err(|source| DispatchError::Handler {
                        handler: invocation.handler().name().to_string(),
                        source,
                    })
            }
        }
    };
}

// Generate implementations for 0-16 parameters
impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14);
impl_handler!(
    T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15
);
impl_handler!(
    T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15, T16
);

// ============================================================================
// BoxedHandler - Type-erased handler stored in route tables
// ============================================================================

/// Type-erased handler trait for dynamic dispatch.
trait ErasedHandler: Send + Sync {
    fn call(&self, invocation: &Invocation<'_>) -> DispatchResult<Output>;
}

struct HandlerFn<F, T> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> ErasedHandler for HandlerFn<F, T>
where
    F: Handler<T>,
    T: 'static,
{
    fn call(&self, invocation: &Invocation<'_>) -> DispatchResult<Output> {
        self.f.call(invocation)
    }
}

/// A handler together with its metadata, ready to be stored in a route table.
///
/// Cloning is cheap and shares the underlying handler, which is how one
/// handler serves several `(method, pattern)` declarations.
#[derive(Clone)]
pub struct BoxedHandler {
    meta: Arc<HandlerMeta>,
    inner: Arc<dyn ErasedHandler>,
}

impl BoxedHandler {
    /// Boxes a handler, naming it after its Rust type.
    pub fn new<F, T>(f: F) -> Self
    where
        F: Handler<T>,
        T: 'static,
    {
        let meta = HandlerMeta::new(std::any::type_name::<F>(), F::slots(), F::output_type());
        Self {
            meta: Arc::new(meta),
            inner: Arc::new(HandlerFn {
                f,
                _marker: PhantomData,
            }),
        }
    }

    /// Overrides the name used in errors and logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.meta).name = name.into();
        self
    }

    /// The handler's metadata.
    pub fn meta(&self) -> &HandlerMeta {
        &self.meta
    }

    /// Returns `true` if both values box the same handler instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Resolves the handler's slots and calls it.
    pub fn call(&self, invocation: &Invocation<'_>) -> DispatchResult<Output> {
        self.inner.call(invocation)
    }
}

impl fmt::Debug for BoxedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedHandler")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Converts a handler function into a [`BoxedHandler`].
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    BoxedHandler::new(f)
}
