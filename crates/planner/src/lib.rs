//! Composes SQL over virtual relations whose `FROM` entry is substituted at
//! build time by a sub-query or a function-call expression.

pub mod compiler;
pub mod error;
pub mod projection;
pub mod query;
pub mod relation;
pub mod source;

pub use compiler::{CompiledQuery, compile};
pub use error::{QueryError, QueryResult};
pub use projection::{ProjectionCatalog, resolve_forward_fields};
pub use relation::{DynamicQuery, VirtualRelation};
pub use source::{SourceDescriptor, SourceKind};
