//! Action trait and type erasure.
//!
//! # How actions are stored
//!
//! The route table holds actions of *different* types in one `Vec`, so each
//! action is hidden behind a trait object (`dyn ErasedHandler`):
//!
//! ```text
//! fn show(req: &mut Request) -> Response { … }   ← user writes this
//!        ↓ Route::get("/users/@id", show)
//! show.into_boxed_handler()                      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(show))                      ← stored as BoxedHandler
//!        ↓
//! handler.call(&mut req)  at dispatch time       ← one vtable call
//! ```
//!
//! Actions are synchronous. Matching and invoking an action has no suspension
//! point; the server's async I/O stays outside dispatch.

use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of the public
/// `Handler` trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: &mut Request) -> Response;
}

/// A type-erased action shared by every request that matches its route.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route action: any function or closure
/// `Fn(&mut Request) -> impl IntoResponse`.
///
/// The trait is sealed; only the blanket impl below satisfies it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, R> private::Sealed for F
where
    F: Fn(&mut Request) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
}

impl<F, R> Handler for F
where
    F: Fn(&mut Request) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, R> ErasedHandler for FnHandler<F>
where
    F: Fn(&mut Request) -> R + Send + Sync,
    R: IntoResponse,
{
    fn call(&self, req: &mut Request) -> Response {
        (self.0)(req).into_response()
    }
}
