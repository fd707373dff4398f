//! Import binding.
//!
//! Imports are never resolved while a module is being bound. Each imported
//! name is bound to a [`DeferredImport`] that later passes resolve once the
//! source module has been bound.

use crate::binder::DeclarationVisitor;
use crate::resolve::resolve_module_attribute;
use crate::symbol::ModuleRegistry;
use crate::BindError;
use spyc_ast::{Import, ImportFrom, NodeId};
use spyc_types::{TypeId, TypeTable};
use tracing::trace;

/// A lazily resolved reference to an imported module or module attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredImport {
    /// The dotted module being imported from.
    pub module: String,
    /// The attribute for `from module import name`; `None` for `import module`.
    pub name: Option<String>,
    /// Optimization level in effect at the import site.
    pub optimize: u8,
    /// For `import a.b.c` without an alias the local name is bound to the
    /// top-level package `a`, recorded here.
    pub mod_to_return: Option<String>,
}

impl DeferredImport {
    pub fn module(module: impl Into<String>, mod_to_return: Option<String>, optimize: u8) -> Self {
        Self {
            module: module.into(),
            name: None,
            optimize,
            mod_to_return,
        }
    }

    pub fn attribute(module: impl Into<String>, name: impl Into<String>, optimize: u8) -> Self {
        Self {
            module: module.into(),
            name: Some(name.into()),
            optimize,
            mod_to_return: None,
        }
    }

    /// Resolve against the modules bound so far. `None` if the target is
    /// unknown or not statically typed.
    pub fn resolve(&self, registry: &ModuleRegistry, types: &mut TypeTable) -> Option<TypeId> {
        self.resolve_at_depth(registry, types, 0)
    }

    pub(crate) fn resolve_at_depth(
        &self,
        registry: &ModuleRegistry,
        types: &mut TypeTable,
        depth: u32,
    ) -> Option<TypeId> {
        match &self.name {
            None => {
                let target = self.mod_to_return.as_deref().unwrap_or(&self.module);
                Some(types.module_instance(target))
            }
            Some(name) => resolve_module_attribute(registry, types, &self.module, name, depth),
        }
    }
}

impl<'c> DeclarationVisitor<'c> {
    pub(crate) fn bind_import(&mut self, node: &Import<'_>) -> Result<(), BindError> {
        let optimize = self.ctx.options.optimize;
        for alias in node.names {
            let (local, deferred) = match alias.asname {
                Some(asname) => (asname, DeferredImport::module(alias.name, None, optimize)),
                None => {
                    let top = alias.name.split('.').next().unwrap_or(alias.name);
                    (top, DeferredImport::module(alias.name, Some(top.to_string()), optimize))
                }
            };
            trace!(module = alias.name, local, "bind import");
            self.declare_import(local, alias.data.id, None, deferred)?;
        }
        Ok(())
    }

    pub(crate) fn bind_import_from(&mut self, node: &ImportFrom<'_>) -> Result<(), BindError> {
        let module = match node.module {
            Some(module) if node.level == 0 => module,
            _ => {
                return Err(BindError::UnsupportedImport {
                    module: node.module.map(str::to_string),
                    level: node.level,
                })
            }
        };
        let optimize = self.ctx.options.optimize;
        for alias in node.names {
            let local = alias.asname.unwrap_or(alias.name);
            trace!(module, name = alias.name, local, "bind import from");
            self.declare_import(
                local,
                alias.data.id,
                Some((module.to_string(), alias.name.to_string())),
                DeferredImport::attribute(module, alias.name, optimize),
            )?;
        }
        Ok(())
    }

    /// Imports bind in the module table whatever scope they appear in.
    fn declare_import(
        &mut self,
        local: &str,
        node: NodeId,
        source: Option<(String, String)>,
        deferred: DeferredImport,
    ) -> Result<(), BindError> {
        let name = self.ctx.interner.intern(local);
        self.module.declare_import(name, node, source, deferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::ModuleTable;
    use spyc_core::StringInterner;

    #[test]
    fn test_module_import_resolves_to_module_instance() {
        let registry = ModuleRegistry::new(StringInterner::new());
        let mut types = TypeTable::new();

        let plain = DeferredImport::module("a.b.c", Some("a".to_string()), 0);
        let aliased = DeferredImport::module("a.b.c", None, 0);

        let top = plain.resolve(&registry, &mut types).unwrap();
        assert_eq!(top, types.module_instance("a"));
        let full = aliased.resolve(&registry, &mut types).unwrap();
        assert_eq!(full, types.module_instance("a.b.c"));
    }

    #[test]
    fn test_attribute_import_resolves_through_registry() {
        let interner = StringInterner::new();
        let mut registry = ModuleRegistry::new(interner.clone());
        let mut types = TypeTable::new();
        let mut table = ModuleTable::new("pkg", "pkg/__init__.py");
        table.declare_class(interner.intern("C"), types.object).unwrap();
        registry.insert(table);
        registry.insert(ModuleTable::new("pkg.sub", "pkg/sub.py"));

        let class = DeferredImport::attribute("pkg", "C", 0);
        assert_eq!(class.resolve(&registry, &mut types), Some(types.object));

        let submodule = DeferredImport::attribute("pkg", "sub", 0);
        let expected = types.module_instance("pkg.sub");
        assert_eq!(submodule.resolve(&registry, &mut types), Some(expected));

        let missing = DeferredImport::attribute("pkg", "missing", 0);
        assert_eq!(missing.resolve(&registry, &mut types), None);
    }

    #[test]
    fn test_import_cycle_is_unresolved() {
        let interner = StringInterner::new();
        let mut registry = ModuleRegistry::new(interner.clone());
        let mut types = TypeTable::new();

        for (this, other) in [("a", "b"), ("b", "a")] {
            let mut table = ModuleTable::new(this, format!("{}.py", this));
            table
                .declare_import(
                    interner.intern("X"),
                    NodeId(0),
                    Some((other.to_string(), "X".to_string())),
                    DeferredImport::attribute(other, "X", 0),
                )
                .unwrap();
            registry.insert(table);
        }

        let deferred = DeferredImport::attribute("a", "X", 0);
        assert_eq!(deferred.resolve(&registry, &mut types), None);
    }
}
