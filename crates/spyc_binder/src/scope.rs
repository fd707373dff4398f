//! Scope management for the declaration pass.
//!
//! Every scope kind is a variant of [`Scope`]. A scope either records
//! declarations as guaranteed bindings (module, class, function) or only
//! remembers the names as possible bindings (opaque). The stack always
//! holds the module scope at the bottom.

use crate::symbol::Declaration;
use crate::BindError;
use spyc_core::{InternedString, OrderedMap};
use spyc_types::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Class,
    Function,
    Opaque,
}

/// The body of a class that resolved to a concrete type.
#[derive(Debug)]
pub struct ClassScope {
    pub class: TypeId,
    pub qualname: String,
}

#[derive(Debug)]
pub struct FunctionScope {
    pub qualname: String,
    /// Names bound inside the function body, in binding order.
    pub locals: OrderedMap<InternedString, Declaration>,
    /// Names bound only inside loop, `with`, or `try` bodies or undecidable
    /// branches of the function.
    pub possible: OrderedMap<InternedString, Declaration>,
}

impl FunctionScope {
    pub fn new(qualname: String) -> Self {
        Self {
            qualname,
            locals: OrderedMap::new(),
            possible: OrderedMap::new(),
        }
    }
}

/// A region whose declarations are not guaranteed to execute: loop, `with`,
/// and `try` bodies, undecidable `if` branches, and the bodies of classes
/// that degraded to dynamic.
#[derive(Debug, Default)]
pub struct OpaqueScope {
    pub possible: OrderedMap<InternedString, Declaration>,
    /// Set for the body of a degraded class so nested names still get a
    /// qualified name.
    pub qualname: Option<String>,
}

#[derive(Debug)]
pub enum Scope {
    Module,
    Class(ClassScope),
    Function(FunctionScope),
    Opaque(OpaqueScope),
}

impl Scope {
    pub fn opaque() -> Self {
        Scope::Opaque(OpaqueScope::default())
    }

    pub fn degraded_class(qualname: String) -> Self {
        Scope::Opaque(OpaqueScope {
            possible: OrderedMap::new(),
            qualname: Some(qualname),
        })
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            Scope::Module => ScopeKind::Module,
            Scope::Class(_) => ScopeKind::Class,
            Scope::Function(_) => ScopeKind::Function,
            Scope::Opaque(_) => ScopeKind::Opaque,
        }
    }

    /// Whether declarations made here become guaranteed bindings.
    pub fn records_declarations(&self) -> bool {
        !matches!(self, Scope::Opaque(_))
    }
}

/// The stack of scopes active while walking a module.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::Module],
        }
    }

    pub fn enter(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    /// Pop the innermost scope, checking that it is the kind the caller
    /// entered.
    pub fn exit(&mut self, expected: ScopeKind) -> Result<Scope, BindError> {
        if self.scopes.len() == 1 {
            return Err(BindError::PopModuleScope);
        }
        let found = self.current().kind();
        if found != expected {
            return Err(BindError::ScopeMismatch { expected, found });
        }
        self.scopes.pop().ok_or(BindError::PopModuleScope)
    }

    pub fn current(&self) -> &Scope {
        // Index 0 holds the module scope, which is never popped.
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Whether any enclosing scope is a function body.
    pub fn in_function(&self) -> bool {
        self.scopes.iter().any(|s| matches!(s, Scope::Function(_)))
    }

    /// Whether declarations made now only become possible bindings.
    pub fn in_opaque(&self) -> bool {
        !self.current().records_declarations()
    }

    /// The dotted qualified name for `name` declared in the current scope.
    /// Opaque scopes are transparent; function bodies add `<locals>`.
    pub fn qualname(&self, name: &str) -> String {
        for scope in self.scopes.iter().rev() {
            match scope {
                Scope::Class(class) => return format!("{}.{}", class.qualname, name),
                Scope::Function(func) => return format!("{}.<locals>.{}", func.qualname, name),
                Scope::Opaque(OpaqueScope { qualname: Some(q), .. }) => return format!("{}.{}", q, name),
                Scope::Module => break,
                Scope::Opaque(_) => {}
            }
        }
        name.to_string()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_scope_is_never_popped() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.exit(ScopeKind::Module).unwrap_err(), BindError::PopModuleScope);
        assert_eq!(stack.current().kind(), ScopeKind::Module);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_exit_checks_kind() {
        let mut stack = ScopeStack::new();
        stack.enter(Scope::opaque());
        assert_eq!(
            stack.exit(ScopeKind::Function).unwrap_err(),
            BindError::ScopeMismatch {
                expected: ScopeKind::Function,
                found: ScopeKind::Opaque,
            }
        );
        assert!(stack.exit(ScopeKind::Opaque).is_ok());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_qualname_nesting() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.qualname("A"), "A");

        stack.enter(Scope::Class(ClassScope {
            class: TypeId(10),
            qualname: "Outer".to_string(),
        }));
        stack.enter(Scope::opaque());
        assert_eq!(stack.qualname("Inner"), "Outer.Inner");
        stack.exit(ScopeKind::Opaque).unwrap();

        stack.enter(Scope::degraded_class("Outer.D".to_string()));
        assert_eq!(stack.qualname("E"), "Outer.D.E");
        stack.exit(ScopeKind::Opaque).unwrap();

        stack.enter(Scope::Function(FunctionScope::new("Outer.f".to_string())));
        assert_eq!(stack.qualname("g"), "Outer.f.<locals>.g");
        assert!(stack.in_function());
    }

    #[test]
    fn test_opaque_scope_does_not_record() {
        assert!(!Scope::opaque().records_declarations());
        assert!(Scope::Module.records_declarations());
        assert!(Scope::Function(FunctionScope::new("f".into())).records_declarations());
    }

    #[test]
    fn test_in_opaque_follows_innermost_scope() {
        let mut stack = ScopeStack::new();
        assert!(!stack.in_opaque());

        stack.enter(Scope::opaque());
        assert!(stack.in_opaque());
        stack.enter(Scope::Class(ClassScope {
            class: TypeId(3),
            qualname: "A".to_string(),
        }));
        assert!(!stack.in_opaque());
        stack.exit(ScopeKind::Class).unwrap();

        stack.enter(Scope::degraded_class("B".to_string()));
        assert!(stack.in_opaque());
    }
}
