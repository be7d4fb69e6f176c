//! Ready-made response coercers.

use switchyard_core::{HandlerError, Reply, Response};
use switchyard_framework::{HandlerMeta, RawValue, ResponseCoercer};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";
const APPLICATION_JSON: &str = "application/json";

/// Coerces common std and JSON values into `200 OK` responses.
///
/// | Value                                  | Content type               |
/// |----------------------------------------|----------------------------|
/// | `String`, `&'static str`, `char`       | `text/plain; charset=utf-8`|
/// | integers, floats, `bool`               | `text/plain; charset=utf-8`|
/// | `Vec<u8>`                              | `application/octet-stream` |
/// | `serde_json::Value`                    | `application/json`         |
///
/// Any other value is rejected with an error naming its type.
///
/// ```rust
/// use switchyard_core::Request;
/// use switchyard_framework::{Dispatcher, Raw};
/// use switchyard_runtime::StandardCoercer;
///
/// let dispatcher = Dispatcher::builder()
///     .coercer(StandardCoercer)
///     .route("GET", "/count", || 3u32)
///     .route("GET", "/info", || Raw(serde_json::json!({ "name": "switchyard" })))
///     .build()
///     .unwrap();
///
/// let reply = dispatcher.dispatch(Request::new("GET", "/count")).unwrap().unwrap();
/// assert_eq!(reply.into_response().body_text(), Some("3"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCoercer;

macro_rules! try_display {
    ($value:ident, $($ty:ty),* $(,)?) => {
        $(
            let $value = match $value.downcast::<$ty>() {
                Ok(v) => return Ok(text(v.to_string())),
                Err(other) => other,
            };
        )*
    };
}

fn text(body: String) -> Reply {
    typed(TEXT_PLAIN, body.into_bytes())
}

fn typed(content_type: &str, body: Vec<u8>) -> Reply {
    Response::ok()
        .with_header("content-type", content_type)
        .with_body(body)
        .into()
}

impl ResponseCoercer for StandardCoercer {
    fn coerce(&self, handler: &HandlerMeta, value: RawValue) -> Result<Reply, HandlerError> {
        let value = match value.downcast::<String>() {
            Ok(s) => return Ok(text(s)),
            Err(other) => other,
        };

        try_display!(
            value,
            &'static str,
            char,
            bool,
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

        let value = match value.downcast::<Vec<u8>>() {
            Ok(bytes) => return Ok(typed(OCTET_STREAM, bytes)),
            Err(other) => other,
        };

        match value.downcast::<serde_json::Value>() {
            Ok(json) => {
                let body = serde_json::to_vec(&json).map_err(HandlerError::other)?;
                Ok(typed(APPLICATION_JSON, body))
            }
            Err(other) => Err(HandlerError::msg(format!(
                "unhandled return type `{}` from handler `{}`",
                other.type_name(),
                handler.name()
            ))),
        }
    }
}
