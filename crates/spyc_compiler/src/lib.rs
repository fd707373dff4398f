//! spyc_compiler: Compiler orchestration.
//!
//! Owns the state shared across modules (interner, type table, module
//! registry, diagnostics, options) and drives the declaration pass over
//! each module in turn.

mod builtins;

use spyc_ast::{Expr, Module};
use spyc_binder::{resolve_child, BindContext, BindError, DeclarationVisitor, ModuleRegistry, ModuleTable, TypeResolver};
use spyc_core::StringInterner;
use spyc_diagnostics::{DiagnosticCollection, ErrorSink};
use spyc_options::BindOptions;
use spyc_types::{TypeId, TypeTable};
use tracing::debug;

/// The compilation context for a set of modules.
pub struct Compiler {
    pub options: BindOptions,
    interner: StringInterner,
    types: TypeTable,
    modules: ModuleRegistry,
    sink: ErrorSink,
}

impl Compiler {
    /// Create a compiler with the builtin modules registered.
    pub fn new(options: BindOptions) -> Result<Self, BindError> {
        let interner = StringInterner::new();
        let mut types = TypeTable::new();
        let mut modules = ModuleRegistry::new(interner.clone());
        builtins::install(&interner, &mut types, &mut modules)?;
        Ok(Self {
            options,
            interner,
            types,
            modules,
            sink: ErrorSink::new(),
        })
    }

    /// The interner syntax trees handed to this compiler must use.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Run the declaration pass over `node` and register the resulting
    /// table, replacing any earlier table for `name`. Diagnostics are
    /// collected on the compiler; the error is returned only when binding
    /// had to stop.
    pub fn bind_module(&mut self, name: &str, filename: &str, node: &Module<'_>) -> Result<(), BindError> {
        let ctx = BindContext {
            interner: &self.interner,
            types: &mut self.types,
            modules: &self.modules,
            sink: &mut self.sink,
            options: &self.options,
        };
        let table = DeclarationVisitor::new(name, filename, ctx).bind(node)?;
        if self.modules.insert(table).is_some() {
            debug!(module = name, "replaced existing module table");
        }
        Ok(())
    }

    pub fn module(&self, name: &str) -> Option<&ModuleTable> {
        self.modules.lookup_module(name)
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// Resolve a type expression as if it appeared at the top level of
    /// `module`.
    pub fn resolve_type(&mut self, module: &str, expr: &Expr<'_>) -> Option<TypeId> {
        let table = self.modules.lookup_module(module)?;
        TypeResolver::new(table, &self.modules).resolve_type(&mut self.types, expr)
    }

    /// The type a top-level name of `module` is bound to, following
    /// deferred imports.
    pub fn resolve_name(&mut self, module: &str, name: &str) -> Option<TypeId> {
        let table = self.modules.lookup_module(module)?;
        let name = self.interner.get(name)?;
        resolve_child(&self.modules, &mut self.types, table, name, 0)
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        self.sink.diagnostics()
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        let mut diagnostics = self.sink.take_diagnostics();
        diagnostics.sort();
        diagnostics
    }
}
