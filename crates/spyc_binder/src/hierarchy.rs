//! Class declaration and base-class resolution.

use crate::binder::DeclarationVisitor;
use crate::scope::{ClassScope, Scope};
use crate::symbol::Declaration;
use crate::BindError;
use spyc_ast::{AstVisitor, ClassDef};
use spyc_diagnostics::messages;
use spyc_types::{ClassKind, MarkerKind, TypeId, TypeName};
use tracing::{debug, debug_span};

/// Why a class declaration was bound as dynamic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// A base could not be resolved statically.
    DynamicBase,
    /// The bases disagree on what kind of class a subclass is.
    IncompatibleSubtypes,
    /// A base is a marker the compiler cannot bind.
    Marker(MarkerKind),
    /// Declared inside a function body.
    NestedInFunction,
    /// Declared where its binding is only possible: a loop, `with`, or `try`
    /// body, an undecidable branch, or the body of a dynamic class.
    Conditional,
    /// A decorator other than the ones the compiler understands.
    Decorator,
}

impl<'c> DeclarationVisitor<'c> {
    pub(crate) fn bind_class(&mut self, node: &ClassDef<'_>) -> Result<(), BindError> {
        let qualname = self.scopes.qualname(node.name.text_name);
        let span = debug_span!("bind_class", class = %qualname);
        let _enter = span.enter();

        let class = self.with_error_context(node.data.range, |this| this.resolve_class(node, &qualname));

        let body_scope = if self.ctx.types.is_dynamic(class) {
            Scope::degraded_class(qualname)
        } else {
            Scope::Class(ClassScope { class, qualname })
        };
        let kind = body_scope.kind();
        self.scopes.enter(body_scope);
        for stmt in node.body {
            self.with_error_context(stmt.data().range, |this| this.visit_stmt(stmt))?;
        }
        // Names bound in a degraded class body are attributes of an unknown
        // object, so they are dropped rather than forwarded.
        self.scopes.exit(kind)?;

        let class = self.apply_class_decorators(class, node.decorator_list);
        let exact = self.ctx.types.exact_type(class);
        self.module.set_node_type(node.data.id, exact);
        self.declare(node.name.text, Declaration::Class(class))
    }

    /// Resolve the bases of `node` and create its class type, or return the
    /// dynamic type when the class cannot be bound statically. Must run with
    /// an error context for the class active.
    fn resolve_class(&mut self, node: &ClassDef<'_>, qualname: &str) -> TypeId {
        let dynamic = self.ctx.types.dynamic;
        let mut bases = Vec::with_capacity(node.bases.len().max(1));
        for base in node.bases {
            let resolved = self.resolve_type(base).unwrap_or(dynamic);
            bases.push(resolved);
        }
        if bases.is_empty() {
            bases.push(self.ctx.types.object);
        }

        let name = TypeName::new(self.module.name.clone(), qualname);
        let kind = match self.check_bases(&name, &bases) {
            Ok(kind) => kind,
            Err(reason) => {
                debug!(?reason, "class degraded to dynamic");
                return dynamic;
            }
        };
        let nesting = if self.scopes.in_function() {
            Some(Degradation::NestedInFunction)
        } else if self.scopes.in_opaque() {
            Some(Degradation::Conditional)
        } else {
            None
        };
        if let Some(reason) = nesting {
            debug!(?reason, "class degraded to dynamic");
            return dynamic;
        }
        self.ctx.types.add_class(name, bases, kind)
    }

    fn check_bases(&mut self, name: &TypeName, bases: &[TypeId]) -> Result<ClassKind, Degradation> {
        let types = &*self.ctx.types;
        if bases.iter().any(|&base| types.is_dynamic(base)) {
            return Err(Degradation::DynamicBase);
        }

        let kinds: Vec<Option<ClassKind>> = bases.iter().map(|&base| types.make_subclass(base, bases)).collect();
        if kinds.iter().any(|kind| *kind != kinds[0]) {
            self.ctx.sink.report_in_context(&messages::INCOMPATIBLE_SUBTYPES, &[]);
            return Err(Degradation::IncompatibleSubtypes);
        }
        let kind = kinds[0].ok_or(Degradation::DynamicBase)?;

        for &base in bases {
            if let Some(ClassKind::Marker(marker)) = types.class(base).map(|class| class.kind) {
                return Err(Degradation::Marker(marker));
            }
            if types.is_final(base) {
                let class_name = name.to_string();
                let base_name = types.display(types.strip_exact(base));
                self.ctx.sink.report_in_context(
                    &messages::CANNOT_SUBCLASS_A_FINAL_CLASS_0_1,
                    &[&class_name, &base_name],
                );
            }
        }
        Ok(kind)
    }
}

