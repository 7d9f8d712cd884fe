//! Request extraction: the per-request context and the session resolver hook.

pub mod context;
pub mod session;

pub use context::{parse_cookies, RequestContext, RequestSource};
pub use session::SessionResolver;
