//! The declaration visitor.
//!
//! Walks one module's syntax tree and records every class, function,
//! variable, and import in the scope that owns it:
//! - Module, class, and function scopes record guaranteed bindings
//! - Loop, `with`, and `try` bodies and undecidable `if` branches record
//!   possible bindings only
//! - Classes are resolved against their bases as they are declared
//! - Imports are bound to deferred references
//! - Statically decidable `if` tests prune the dead branch

use crate::conditional::{evaluate_condition, StaticCondition};
use crate::resolve::TypeResolver;
use crate::scope::{FunctionScope, Scope, ScopeKind, ScopeStack};
use crate::symbol::{Declaration, FunctionRecord, ModuleRegistry, ModuleTable, VariableRecord};
use crate::BindError;
use spyc_ast::visitor::{walk_for, walk_try, walk_while, walk_with, AstVisitor};
use spyc_ast::*;
use spyc_core::{InternedString, StringInterner, TextRange};
use spyc_diagnostics::ErrorSink;
use spyc_options::BindOptions;
use spyc_types::{ClassFlags, FunctionType, TypeId, TypeKind, TypeName, TypeTable};
use tracing::{debug_span, trace};

/// Compiler state shared by every module bind.
pub struct BindContext<'c> {
    pub interner: &'c StringInterner,
    pub types: &'c mut TypeTable,
    /// Modules bound before this one.
    pub modules: &'c ModuleRegistry,
    pub sink: &'c mut ErrorSink,
    pub options: &'c BindOptions,
}

pub struct DeclarationVisitor<'c> {
    pub(crate) module: ModuleTable,
    pub(crate) scopes: ScopeStack,
    pub(crate) ctx: BindContext<'c>,
}

impl<'c> DeclarationVisitor<'c> {
    pub fn new(name: impl Into<String>, filename: impl Into<String>, ctx: BindContext<'c>) -> Self {
        Self {
            module: ModuleTable::new(name, filename),
            scopes: ScopeStack::new(),
            ctx,
        }
    }

    /// The table being populated.
    pub fn module(&self) -> &ModuleTable {
        &self.module
    }

    /// Bind every top-level declaration of `node` and return the finished
    /// module table.
    pub fn bind(mut self, node: &Module<'_>) -> Result<ModuleTable, BindError> {
        let span = debug_span!("bind_module", module = %self.module.name);
        let _enter = span.enter();

        self.visit_module(node)?;
        Ok(self.finish_bind())
    }

    /// Close the module table to further declarations.
    pub fn finish_bind(mut self) -> ModuleTable {
        self.module.finish_bind();
        self.module
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Run `f` with diagnostics attributed to `range` in this module. The
    /// context is released however `f` exits, unwinding included.
    pub(crate) fn with_error_context<R>(&mut self, range: TextRange, f: impl FnOnce(&mut Self) -> R) -> R {
        self.ctx.sink.push_context(&self.module.filename, range);
        let mut active = ActiveErrorContext { visitor: self };
        f(&mut *active.visitor)
    }

    pub(crate) fn resolve_type(&mut self, expr: &Expr<'_>) -> Option<TypeId> {
        TypeResolver::new(&self.module, self.ctx.modules).resolve_type(self.ctx.types, expr)
    }

    pub(crate) fn resolve_decorator(&mut self, expr: &Expr<'_>) -> Option<TypeId> {
        TypeResolver::new(&self.module, self.ctx.modules).resolve_decorator(self.ctx.types, expr)
    }

    /// Bind `name` in the current scope.
    pub(crate) fn declare(&mut self, name: InternedString, decl: Declaration) -> Result<(), BindError> {
        match self.scopes.current_mut() {
            Scope::Module => match decl {
                Declaration::Class(class) => self.module.declare_class(name, class)?,
                Declaration::Function(record) => self.module.declare_function(name, record)?,
                Declaration::Variable(record) => self.module.declare_variable(name, record)?,
                Declaration::Import(record) => {
                    self.module.declare_import(name, record.node, record.source, record.deferred)?
                }
                Declaration::Value(value) => self.module.declare_value(name, value)?,
            },
            Scope::Class(class) => {
                self.ctx.types.declare_member(class.class, name, decl.as_member());
            }
            Scope::Function(func) => {
                func.locals.insert(name, decl);
            }
            Scope::Opaque(opaque) => {
                opaque.possible.insert(name, decl);
            }
        }
        Ok(())
    }

    /// Visit `f` inside a fresh opaque scope, then hand its names to the
    /// enclosing scope as possible bindings.
    pub(crate) fn in_opaque_scope(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<(), BindError>,
    ) -> Result<(), BindError> {
        self.scopes.enter(Scope::opaque());
        f(self)?;
        let possible = match self.scopes.exit(ScopeKind::Opaque)? {
            Scope::Opaque(opaque) => opaque.possible,
            _ => return Ok(()),
        };

        for (name, decl) in possible.into_entries() {
            match self.scopes.current_mut() {
                Scope::Module => self.module.record_possible(name),
                Scope::Function(func) => {
                    func.possible.insert(name, decl);
                }
                Scope::Opaque(outer) => {
                    outer.possible.insert(name, decl);
                }
                // Conditional class attributes are not members.
                Scope::Class(_) => {}
            }
        }
        Ok(())
    }

    // ========================================================================
    // Functions and variables
    // ========================================================================

    fn bind_function(&mut self, node: &FunctionDef<'_>, is_async: bool) -> Result<(), BindError> {
        let name = node.name.text_name;
        let qualname = self.scopes.qualname(name);
        let dynamic = self.ctx.types.dynamic;

        let returns = match node.returns {
            Some(annotation) => self.resolve_type(annotation).unwrap_or(dynamic),
            None => dynamic,
        };
        let return_type = if is_async {
            self.ctx.types.awaitable(returns)
        } else {
            returns
        };
        let function = self.ctx.types.add_type(TypeKind::Function(FunctionType {
            name: TypeName::new(self.module.name.clone(), qualname.clone()),
            return_type,
            is_async,
        }));

        if name == "__init_subclass__" {
            if let Scope::Class(class) = self.scopes.current() {
                self.ctx.types.add_flags(class.class, ClassFlags::HAS_INIT_SUBCLASS);
            }
        }

        self.scopes.enter(Scope::Function(FunctionScope::new(qualname)));
        self.visit_body(node.body)?;
        let (locals, possible) = match self.scopes.exit(ScopeKind::Function)? {
            Scope::Function(func) => {
                let locals: Vec<_> = func.locals.keys().copied().collect();
                let possible = func
                    .possible
                    .keys()
                    .filter(|name| !func.locals.contains_key(name))
                    .copied()
                    .collect();
                (locals, possible)
            }
            _ => (Vec::new(), Vec::new()),
        };

        let node_type = if node.decorator_list.is_empty() {
            function
        } else {
            self.ctx.types.add_type(TypeKind::UnknownDecorated { function })
        };
        self.module.set_node_type(node.data.id, node_type);

        self.declare(
            node.name.text,
            Declaration::Function(FunctionRecord {
                node: node.data.id,
                function,
                node_type,
                locals,
                possible,
            }),
        )
    }

    fn bind_assign(&mut self, node: &Assign<'_>) -> Result<(), BindError> {
        let mut names = Vec::new();
        for target in node.targets {
            collect_target_names(target, &mut names);
        }
        if matches!(self.scopes.current(), Scope::Module) {
            return self.module.declare_variables(names, node.data.id);
        }
        for name in names {
            self.declare(
                name,
                Declaration::Variable(VariableRecord {
                    node: node.data.id,
                    annotation: None,
                }),
            )?;
        }
        Ok(())
    }

    fn bind_ann_assign(&mut self, node: &AnnAssign<'_>) -> Result<(), BindError> {
        // `self.x: int` and friends bind nothing in this scope.
        let target = match node.target.as_name() {
            Some(target) => target.text,
            None => return Ok(()),
        };
        let annotation = self.resolve_type(node.annotation).unwrap_or(self.ctx.types.dynamic);
        self.declare(
            target,
            Declaration::Variable(VariableRecord {
                node: node.data.id,
                annotation: Some(annotation),
            }),
        )
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn bind_if(&mut self, node: &IfStmt<'_>) -> Result<(), BindError> {
        match evaluate_condition(node.test, self.ctx.options) {
            StaticCondition::TypeCheckingGuard => {
                trace!("type-checking guard");
                self.visit_body(node.body)
            }
            StaticCondition::Known(value) => {
                trace!(value, "static condition");
                self.module.mark_known_boolean_test(node.test.id(), value);
                self.visit_body(if value { node.body } else { node.orelse })
            }
            StaticCondition::Unknown => {
                self.in_opaque_scope(|this| this.visit_body(node.body))?;
                if !node.orelse.is_empty() {
                    self.in_opaque_scope(|this| this.visit_body(node.orelse))?;
                }
                Ok(())
            }
        }
    }
}

/// Pops the error context pushed by `with_error_context` when dropped.
struct ActiveErrorContext<'v, 'c> {
    visitor: &'v mut DeclarationVisitor<'c>,
}

impl Drop for ActiveErrorContext<'_, '_> {
    fn drop(&mut self) {
        self.visitor.ctx.sink.pop_context();
    }
}

/// Names bound by an assignment target. Only plain names and tuples of them
/// bind anything in the enclosing scope.
fn collect_target_names(target: &Expr<'_>, names: &mut Vec<InternedString>) {
    match target {
        Expr::Name(ident) => names.push(ident.text),
        Expr::Tuple(tuple) => {
            for elt in tuple.elts {
                collect_target_names(elt, names);
            }
        }
        _ => {}
    }
}

impl<'a, 'c> AstVisitor<'a> for DeclarationVisitor<'c> {
    type Error = BindError;

    fn visit_class_def(&mut self, node: &ClassDef<'a>) -> Result<(), BindError> {
        self.bind_class(node)
    }

    fn visit_function_def(&mut self, node: &FunctionDef<'a>) -> Result<(), BindError> {
        self.bind_function(node, false)
    }

    fn visit_async_function_def(&mut self, node: &FunctionDef<'a>) -> Result<(), BindError> {
        self.bind_function(node, true)
    }

    fn visit_assign(&mut self, node: &Assign<'a>) -> Result<(), BindError> {
        self.bind_assign(node)
    }

    fn visit_ann_assign(&mut self, node: &AnnAssign<'a>) -> Result<(), BindError> {
        self.bind_ann_assign(node)
    }

    fn visit_import(&mut self, node: &Import<'a>) -> Result<(), BindError> {
        self.bind_import(node)
    }

    fn visit_import_from(&mut self, node: &ImportFrom<'a>) -> Result<(), BindError> {
        self.bind_import_from(node)
    }

    fn visit_if(&mut self, node: &IfStmt<'a>) -> Result<(), BindError> {
        self.bind_if(node)
    }

    fn visit_for(&mut self, node: &ForStmt<'a>) -> Result<(), BindError> {
        self.in_opaque_scope(|this| walk_for(this, node))
    }

    fn visit_async_for(&mut self, node: &ForStmt<'a>) -> Result<(), BindError> {
        self.in_opaque_scope(|this| walk_for(this, node))
    }

    fn visit_while(&mut self, node: &WhileStmt<'a>) -> Result<(), BindError> {
        self.in_opaque_scope(|this| walk_while(this, node))
    }

    fn visit_with(&mut self, node: &WithStmt<'a>) -> Result<(), BindError> {
        self.in_opaque_scope(|this| walk_with(this, node))
    }

    fn visit_async_with(&mut self, node: &WithStmt<'a>) -> Result<(), BindError> {
        self.in_opaque_scope(|this| walk_with(this, node))
    }

    fn visit_try(&mut self, node: &TryStmt<'a>) -> Result<(), BindError> {
        self.in_opaque_scope(|this| walk_try(this, node))
    }
}
