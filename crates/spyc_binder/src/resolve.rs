//! Resolution of type expressions against module symbol tables.

use crate::symbol::{Declaration, ModuleRegistry, ModuleTable};
use spyc_ast::{Constant, Expr};
use spyc_core::InternedString;
use spyc_types::{DecoratorKind, Member, TypeId, TypeKind, TypeTable};

/// Chains of re-exported imports deeper than this are treated as
/// unresolvable, which also stops import cycles.
const MAX_IMPORT_DEPTH: u32 = 32;

/// Resolves expressions appearing in declarations (bases, annotations,
/// decorators, return types) within one module.
pub struct TypeResolver<'r> {
    module: &'r ModuleTable,
    registry: &'r ModuleRegistry,
}

impl<'r> TypeResolver<'r> {
    pub fn new(module: &'r ModuleTable, registry: &'r ModuleRegistry) -> Self {
        Self { module, registry }
    }

    /// `None` when the expression cannot be resolved statically.
    pub fn resolve_type(&self, types: &mut TypeTable, expr: &Expr<'_>) -> Option<TypeId> {
        match expr {
            Expr::Name(ident) => self.resolve_name(types, ident.text),
            Expr::Attribute(attr) => {
                let base = self.resolve_type(types, attr.value)?;
                resolve_attribute(self.registry, types, base, attr.attr.text, attr.attr.text_name, 0)
            }
            Expr::Constant(constant) if constant.value == Constant::None => Some(types.none_type),
            _ => None,
        }
    }

    /// Like [`TypeResolver::resolve_type`], but also understands decorator
    /// factory calls such as `dataclass(frozen=True)`.
    pub fn resolve_decorator(&self, types: &mut TypeTable, expr: &Expr<'_>) -> Option<TypeId> {
        let call = match expr {
            Expr::Call(call) => call,
            _ => return self.resolve_type(types, expr),
        };
        let func = self.resolve_type(types, call.func)?;
        if func != types.dataclass_decorator || !call.args.is_empty() {
            return None;
        }
        let mut frozen = false;
        for keyword in call.keywords {
            match (&keyword.arg, keyword.value) {
                (Some(arg), Expr::Constant(constant)) if arg.text_name == "frozen" => match constant.value {
                    Constant::Bool(value) => frozen = value,
                    _ => return None,
                },
                _ => return None,
            }
        }
        Some(types.add_type(TypeKind::Decorator(DecoratorKind::Dataclass { frozen })))
    }

    fn resolve_name(&self, types: &mut TypeTable, name: InternedString) -> Option<TypeId> {
        if let Some(ty) = resolve_child(self.registry, types, self.module, name, 0) {
            return Some(ty);
        }
        let builtins = self.registry.lookup_module("builtins")?;
        resolve_child(self.registry, types, builtins, name, 0)
    }
}

/// The type bound to `name` at the top level of `module`.
pub fn resolve_child(
    registry: &ModuleRegistry,
    types: &mut TypeTable,
    module: &ModuleTable,
    name: InternedString,
    depth: u32,
) -> Option<TypeId> {
    match module.get_child(name)? {
        Declaration::Class(ty) | Declaration::Value(ty) => Some(*ty),
        Declaration::Function(record) => Some(record.node_type),
        Declaration::Variable(_) => None,
        Declaration::Import(record) => record.deferred.resolve_at_depth(registry, types, depth + 1),
    }
}

/// `module.attr`: a top-level binding of the module, or else a registered
/// submodule.
pub fn resolve_module_attribute(
    registry: &ModuleRegistry,
    types: &mut TypeTable,
    module: &str,
    attr: &str,
    depth: u32,
) -> Option<TypeId> {
    if depth > MAX_IMPORT_DEPTH {
        return None;
    }
    if let Some(table) = registry.lookup_module(module) {
        if let Some(name) = registry.interner().get(attr) {
            if let Some(ty) = resolve_child(registry, types, table, name, depth) {
                return Some(ty);
            }
        }
    }
    let submodule = format!("{}.{}", module, attr);
    if registry.contains(&submodule) {
        Some(types.module_instance(&submodule))
    } else {
        None
    }
}

fn resolve_attribute(
    registry: &ModuleRegistry,
    types: &mut TypeTable,
    base: TypeId,
    attr: InternedString,
    attr_text: &str,
    depth: u32,
) -> Option<TypeId> {
    if let TypeKind::Module { name } = &types.get(base).kind {
        let name = name.clone();
        return resolve_module_attribute(registry, types, &name, attr_text, depth);
    }
    match types.class(base)?.members.get(&attr)? {
        Member::Class(class) => Some(*class),
        Member::Method(_) | Member::Slot { .. } => None,
    }
}
