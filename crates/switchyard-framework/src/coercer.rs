//! Response coercion for handler return values.
//!
//! A handler's return type implements [`IntoOutput`], which sorts the value
//! into one of the [`Output`] cases. [`coerce`] then walks a fixed chain:
//!
//! 1. [`Output::Reply`]: already canonical, used as-is.
//! 2. [`Output::Response`]: the transport response, wrapped unchanged.
//! 3. [`Output::Absent`]: the handler declined; the dispatcher keeps scanning.
//! 4. [`Output::Raw`]: handed to the configured [`ResponseCoercer`].
//! 5. [`Output::Raw`] with no coercer: [`DispatchError::UncoercibleResult`].

use std::any::Any;
use std::fmt;

use tracing::trace;

use switchyard_core::{HandlerError, Reply, Response};

use crate::error::DispatchError;
use crate::handler::HandlerMeta;

/// A type-erased value returned by a handler that has no built-in coercion.
pub struct RawValue {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl RawValue {
    /// Erases `value`, remembering its type name.
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The runtime type name of the value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrows the value as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Takes the value as a `T`, or gives it back unchanged.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|value| Self { value, type_name })
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// The shape of a handler's return value.
#[derive(Debug)]
pub enum Output {
    /// A canonical reply.
    Reply(Reply),
    /// A transport-level response.
    Response(Response),
    /// No value: this route declines the request.
    Absent,
    /// Any other value, subject to the configured coercer.
    Raw(RawValue),
}

/// Conversion of handler return values into an [`Output`].
///
/// Implemented for replies, responses, `()`, `Option<T>`, `Result<T, E>`,
/// common std value types and the [`Raw`] wrapper. Returning `Err` from a
/// handler surfaces as an application failure.
pub trait IntoOutput {
    /// Classifies `self`.
    fn into_output(self) -> Result<Output, HandlerError>;
}

impl IntoOutput for Output {
    fn into_output(self) -> Result<Output, HandlerError> {
        Ok(self)
    }
}

impl IntoOutput for Reply {
    fn into_output(self) -> Result<Output, HandlerError> {
        Ok(Output::Reply(self))
    }
}

impl IntoOutput for Response {
    fn into_output(self) -> Result<Output, HandlerError> {
        Ok(Output::Response(self))
    }
}

/// Returning nothing declines the request.
impl IntoOutput for () {
    fn into_output(self) -> Result<Output, HandlerError> {
        Ok(Output::Absent)
    }
}

impl<T: IntoOutput> IntoOutput for Option<T> {
    fn into_output(self) -> Result<Output, HandlerError> {
        match self {
            Some(value) => value.into_output(),
            None => Ok(Output::Absent),
        }
    }
}

impl<T, E> IntoOutput for Result<T, E>
where
    T: IntoOutput,
    E: Into<HandlerError>,
{
    fn into_output(self) -> Result<Output, HandlerError> {
        match self {
            Ok(value) => value.into_output(),
            Err(err) => Err(err.into()),
        }
    }
}

/// Marks an arbitrary value for the configured [`ResponseCoercer`].
///
/// Use this to return your own types from a handler:
///
/// ```rust
/// use switchyard_framework::Raw;
///
/// struct Invoice { total: u64 }
///
/// fn handler() -> Raw<Invoice> {
///     Raw(Invoice { total: 10 })
/// }
/// # let _ = handler;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Raw<T>(pub T);

impl<T: Any + Send> IntoOutput for Raw<T> {
    fn into_output(self) -> Result<Output, HandlerError> {
        Ok(Output::Raw(RawValue::new(self.0)))
    }
}

macro_rules! impl_raw_output {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoOutput for $ty {
                fn into_output(self) -> Result<Output, HandlerError> {
                    Ok(Output::Raw(RawValue::new(self)))
                }
            }
        )*
    };
}

impl_raw_output!(
    String,
    &'static str,
    Vec<u8>,
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
);

/// Turns raw handler values into replies.
///
/// A coercer is configured once per dispatcher. It receives the handler's
/// metadata (including its declared return type) and the value. Values it
/// does not know should be rejected with an error; a
/// [`HandlerError::Reply`] is sent to the client as-is.
///
/// Closures with the matching signature implement this trait.
pub trait ResponseCoercer: Send + Sync + 'static {
    /// Coerces `value` returned by `handler`.
    fn coerce(&self, handler: &HandlerMeta, value: RawValue) -> Result<Reply, HandlerError>;
}

impl<F> ResponseCoercer for F
where
    F: Fn(&HandlerMeta, RawValue) -> Result<Reply, HandlerError> + Send + Sync + 'static,
{
    fn coerce(&self, handler: &HandlerMeta, value: RawValue) -> Result<Reply, HandlerError> {
        (self)(handler, value)
    }
}

/// Runs the coercion chain for one handler result.
///
/// `Ok(None)` means the handler declined.
pub fn coerce(
    output: Output,
    handler: &HandlerMeta,
    coercer: Option<&dyn ResponseCoercer>,
) -> Result<Option<Reply>, DispatchError> {
    match output {
        Output::Reply(reply) => Ok(Some(reply)),
        Output::Response(response) => Ok(Some(Reply::from(response))),
        Output::Absent => Ok(None),
        Output::Raw(value) => {
            let type_name = value.type_name();
            let Some(coercer) = coercer else {
                return Err(DispatchError::UncoercibleResult {
                    handler: handler.name().to_string(),
                    type_name,
                });
            };

            trace!(
                handler = handler.name(),
                type_name, "Delegating raw value to response coercer"
            );
            coercer
                .coerce(handler, value)
                .map(Some)
                .map_err(|source| DispatchError::Coercer {
                    handler: handler.name().to_string(),
                    type_name,
                    source,
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> HandlerMeta {
        HandlerMeta::new("coerce_test", Vec::new(), "alloc::string::String")
    }

    fn text_coercer(_: &HandlerMeta, value: RawValue) -> Result<Reply, HandlerError> {
        match value.downcast::<String>() {
            Ok(s) => Ok(Response::text(s).into()),
            Err(value) => Err(HandlerError::msg(format!("unhandled {}", value.type_name()))),
        }
    }

    #[test]
    fn test_reply_used_directly() {
        let output = Reply::from(Response::new(201, "Created")).into_output().unwrap();
        let reply = coerce(output, &meta(), None).unwrap().unwrap();
        assert_eq!(reply.into_response().status(), 201);
    }

    #[test]
    fn test_response_wrapped() {
        let response = Response::new(200, "OK").with_body(vec![1, 2, 3]);
        let output = response.clone().into_output().unwrap();
        let reply = coerce(output, &meta(), None).unwrap().unwrap();
        assert_eq!(reply.into_response(), response);
    }

    #[test]
    fn test_absent_declines() {
        assert!(matches!(().into_output(), Ok(Output::Absent)));
        assert!(matches!(None::<Response>.into_output(), Ok(Output::Absent)));
        assert!(coerce(Output::Absent, &meta(), None).unwrap().is_none());
    }

    #[test]
    fn test_result_err_is_failure() {
        let result: Result<Response, HandlerError> = Err(HandlerError::msg("boom"));
        let err = result.into_output().unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_result_ok_nested_option() {
        let result: Result<Option<Response>, HandlerError> = Ok(None);
        assert!(matches!(result.into_output(), Ok(Output::Absent)));
    }

    #[test]
    fn test_raw_without_coercer_fails() {
        let output = String::from("Hello, world").into_output().unwrap();
        let err = coerce(output, &meta(), None).unwrap_err();
        match err {
            DispatchError::UncoercibleResult { handler, type_name } => {
                assert_eq!(handler, "coerce_test");
                assert_eq!(type_name, "alloc::string::String");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_raw_with_coercer() {
        let output = String::from("Hello, world").into_output().unwrap();
        let reply = coerce(output, &meta(), Some(&text_coercer))
            .unwrap()
            .unwrap();
        assert_eq!(reply.into_response().body_text(), Some("Hello, world"));
    }

    #[test]
    fn test_coercer_failure_wrapped() {
        let output = 7u32.into_output().unwrap();
        let err = coerce(output, &meta(), Some(&text_coercer)).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Coercer {
                type_name: "u32",
                ..
            }
        ));
    }

    #[test]
    fn test_raw_wrapper_and_downcast() {
        #[derive(Debug, PartialEq)]
        struct Invoice(u64);

        let Ok(Output::Raw(value)) = Raw(Invoice(10)).into_output() else {
            panic!("expected raw output");
        };
        assert!(value.is::<Invoice>());
        assert_eq!(value.downcast_ref::<Invoice>(), Some(&Invoice(10)));

        let value = value.downcast::<String>().unwrap_err();
        assert_eq!(value.downcast::<Invoice>().unwrap(), Invoice(10));
    }
}
