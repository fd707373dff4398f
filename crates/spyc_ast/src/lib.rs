//! spyc_ast: Syntax tree definitions for the typed Python dialect.
//!
//! The tree is produced by an external parser (or by [`builder::AstBuilder`])
//! and is immutable afterwards. Nodes are allocated in a `bumpalo` arena and
//! reference their children through arena borrows. Every node carries a
//! [`NodeId`] so later passes can attach information in side tables.

pub mod builder;
pub mod node;
pub mod types;
pub mod visitor;

// Re-export key types
pub use builder::AstBuilder;
pub use node::*;
pub use types::NodeId;
pub use visitor::AstVisitor;
