pub mod component;
pub mod path;
pub mod types;

pub use component::*;
pub use path::{placeholders, router_path, segment_placeholder};
pub use types::{Builtin, TypeRef};
