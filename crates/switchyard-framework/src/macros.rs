//! Declarative route tables.

/// Declares an ordered list of routes as a `Vec<RouteDecl>`.
///
/// Each entry is `METHOD "pattern" => handler`. Several methods can be joined
/// with `|`; they become separate entries sharing one handler. Entries keep
/// their written order.
///
/// ```rust
/// use switchyard_core::Response;
/// use switchyard_framework::{Dispatcher, routes};
///
/// fn root() -> Response {
///     Response::text("root")
/// }
///
/// fn greet() -> Response {
///     Response::text("hello")
/// }
///
/// let table = routes! {
///     GET "/" => root,
///     GET | POST "/greet" => greet,
/// };
/// assert_eq!(table.len(), 3);
///
/// let dispatcher = Dispatcher::builder().enumerate(&table).build().unwrap();
/// assert_eq!(dispatcher.route_count(), 3);
/// ```
#[macro_export]
macro_rules! routes {
    ($($($method:ident)|+ $pattern:literal => $handler:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut decls = ::std::vec::Vec::<$crate::RouteDecl>::new();
        $(
            let handler = $crate::into_handler($handler);
            $(
                decls.push($crate::RouteDecl::new(
                    ::std::stringify!($method),
                    $pattern,
                    ::std::clone::Clone::clone(&handler),
                ));
            )+
        )*
        decls
    }};
}
