pub mod compose;
pub mod context;
pub mod engine;

pub use compose::{compose, resolve_layout, CONTENT_PARTIAL};
pub use context::build_context;
pub use engine::{render_body, CompiledBody, PartialMap};
