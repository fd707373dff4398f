//! spyc_binder: The declaration-binding pass.
//!
//! Walks a module's syntax tree once and records every class, function,
//! variable, and import declaration in a module symbol table. Classes are
//! resolved against their base classes and decorators as they are declared,
//! degrading to the dynamic type whenever the class cannot be compiled
//! statically. Imports are bound lazily so modules can be bound in any order.

mod binder;
mod conditional;
mod decorators;
mod error;
mod hierarchy;
mod imports;
mod resolve;
mod scope;
mod symbol;

pub use binder::{BindContext, DeclarationVisitor};
pub use conditional::{evaluate_condition, StaticCondition};
pub use error::BindError;
pub use hierarchy::Degradation;
pub use imports::DeferredImport;
pub use resolve::{resolve_child, resolve_module_attribute, TypeResolver};
pub use scope::{ClassScope, FunctionScope, OpaqueScope, Scope, ScopeKind, ScopeStack};
pub use symbol::{Declaration, FunctionRecord, ImportRecord, ModuleRegistry, ModuleTable, VariableRecord};
