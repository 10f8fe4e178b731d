//! Declaration collection for the Quill analyzer.
//!
//! The collector is phase one of semantic analysis and walks each file's
//! AST twice:
//!
//! - **Pass A** ([`Collector::collect_file`]) builds scopes, inserts
//!   placeholder symbols for every declaration, computes struct layout
//!   indices, and records raw imports. It runs once per file, in any
//!   order.
//! - **Pass B** ([`Collector::complete_file`]) runs after Pass A has run
//!   for *all* files: it resolves imports into per-file import tables,
//!   evaluates syntactic types, attaches parameter and return types to
//!   function-like symbols, and registers overloads with signature
//!   uniqueness checks.

pub mod collected;
pub mod collector;
pub mod error;
mod imports;
pub mod signatures;
pub mod type_eval;

pub use collected::{CollectedFile, CollectedStmt, FunctionLikeKind};
pub use collector::Collector;
pub use error::{CollectError, CollectResult};
pub use signatures::{overloads_of, params_of, signature_matches};
pub use type_eval::{lookup_with_imports, resolve_type};
