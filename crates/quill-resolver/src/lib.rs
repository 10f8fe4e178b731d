//! Name and type resolution for the Quill analyzer.
//!
//! The resolver is phase two of semantic analysis: it drives each file's
//! collected tree node by node, producing a resolved tree in which every
//! expression carries its evaluated type and constancy flag, every name
//! is bound to its target symbol, access chains are classified as static
//! or instance, operator invocations are bound to a specific overload,
//! and statement-level mutability/constancy/context rules are enforced.

mod calls;
mod expr;
pub mod error;
pub mod resolved;
pub mod resolver;

pub use error::{ResolveError, ResolveResult};
pub use resolved::{ResolvedExpr, ResolvedExprKind, ResolvedFile, ResolvedStmt};
pub use resolver::Resolver;
