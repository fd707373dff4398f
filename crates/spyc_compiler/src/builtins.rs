//! Symbol tables for the modules the compiler knows without source.

use spyc_ast::NodeId;
use spyc_binder::{BindError, Declaration, ModuleRegistry, ModuleTable, VariableRecord};
use spyc_core::StringInterner;
use spyc_types::{ClassFlags, ClassKind, TypeName, TypeTable};

const BUILTIN_FILENAME: &str = "<builtin>";

/// Register `builtins`, `typing`, `typing_extensions`, `enum`, and
/// `dataclasses`.
pub fn install(interner: &StringInterner, types: &mut TypeTable, modules: &mut ModuleRegistry) -> Result<(), BindError> {
    modules.insert(builtins_module(interner, types)?);
    modules.insert(typing_module("typing", interner, types)?);
    modules.insert(typing_module("typing_extensions", interner, types)?);

    let mut enum_module = ModuleTable::new("enum", BUILTIN_FILENAME);
    enum_module.declare_class(interner.intern("Enum"), types.enum_type)?;
    enum_module.finish_bind();
    modules.insert(enum_module);

    let mut dataclasses = ModuleTable::new("dataclasses", BUILTIN_FILENAME);
    dataclasses.declare_value(interner.intern("dataclass"), types.dataclass_decorator)?;
    dataclasses.finish_bind();
    modules.insert(dataclasses);
    Ok(())
}

fn builtins_module(interner: &StringInterner, types: &mut TypeTable) -> Result<ModuleTable, BindError> {
    let mut module = ModuleTable::new("builtins", BUILTIN_FILENAME);
    module.declare_class(interner.intern("object"), types.object)?;
    module.declare_class(interner.intern("NoneType"), types.none_type)?;

    let object = types.object;
    for name in ["int", "float", "str", "bytes"] {
        let class = types.add_class(TypeName::new("builtins", name), vec![object], ClassKind::Regular);
        module.declare_class(interner.intern(name), class)?;
    }
    if let Some(int) = module.get_class(interner.intern("int")) {
        let bool_type = types.add_class(TypeName::new("builtins", "bool"), vec![int], ClassKind::Regular);
        types.add_flags(bool_type, ClassFlags::FINAL);
        module.declare_class(interner.intern("bool"), bool_type)?;
    }

    module.finish_bind();
    Ok(module)
}

fn typing_module(name: &str, interner: &StringInterner, types: &mut TypeTable) -> Result<ModuleTable, BindError> {
    let mut module = ModuleTable::new(name, BUILTIN_FILENAME);
    module.declare_class(interner.intern("NamedTuple"), types.named_tuple)?;
    module.declare_class(interner.intern("Protocol"), types.protocol)?;
    module.declare_class(interner.intern("TypedDict"), types.typed_dict)?;
    module.declare_value(interner.intern("final"), types.final_decorator)?;
    module.declare(
        interner.intern("TYPE_CHECKING"),
        Declaration::Variable(VariableRecord {
            node: NodeId::INVALID,
            annotation: None,
        }),
    )?;
    module.finish_bind();
    Ok(module)
}
