//! Type system representation.
//!
//! Types are stored in a TypeTable (type arena) and referenced by TypeId.
//! This avoids lifetime issues with recursive type structures.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use spyc_core::intern::InternedString;
use std::fmt;

/// Type ID for referencing types in the [`TypeTable`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TypeId(pub u32);

impl TypeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The identity of a class: the module that declares it and its dotted
/// qualified name within that module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub module: String,
    pub qualname: String,
}

impl TypeName {
    pub fn new(module: impl Into<String>, qualname: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.qualname)
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassFlags: u32 {
        const NONE              = 0;
        /// Subclassing is a compile error.
        const FINAL             = 1 << 0;
        /// The body defines `__init_subclass__`.
        const HAS_INIT_SUBCLASS = 1 << 1;
        const DATACLASS         = 1 << 2;
        const FROZEN            = 1 << 3;
    }
}

/// Base-class markers that the compiler cannot bind statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Fields are tuple slots, not members.
    NamedTuple,
    /// Not guaranteed to be in the runtime MRO.
    Protocol,
    TypedDict,
}

/// The concrete shape a class takes. Subclasses synthesized from different
/// bases must agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Regular,
    Enum,
    Marker(MarkerKind),
}

/// A member declared in a class body. The last declaration of a name wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    Class(TypeId),
    Method(TypeId),
    /// An attribute, with its declared annotation when there is one.
    Slot { annotation: Option<TypeId> },
}

#[derive(Debug, Clone)]
pub struct ClassType {
    pub name: TypeName,
    pub bases: Vec<TypeId>,
    pub kind: ClassKind,
    pub flags: ClassFlags,
    pub members: IndexMap<InternedString, Member>,
    /// Cached exact-type view of this class.
    exact: Option<TypeId>,
}

impl ClassType {
    pub fn new(name: TypeName, bases: Vec<TypeId>, kind: ClassKind) -> Self {
        Self {
            name,
            bases,
            kind,
            flags: ClassFlags::NONE,
            members: IndexMap::new(),
            exact: None,
        }
    }

    pub fn is_final(&self) -> bool {
        self.flags.contains(ClassFlags::FINAL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub name: TypeName,
    pub return_type: TypeId,
    pub is_async: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoratorKind {
    Final,
    Dataclass { frozen: bool },
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Statically unknown; resolved at runtime. Absorbing.
    Dynamic,
    Class(ClassType),
    /// Precisely `class`, not any compatible subtype.
    Exact { class: TypeId },
    /// Eventually produces `inner`.
    Awaitable { inner: TypeId },
    Function(FunctionType),
    /// A function whose decorators have not been resolved yet.
    UnknownDecorated { function: TypeId },
    Decorator(DecoratorKind),
    /// An imported module object.
    Module { name: String },
}

#[derive(Debug, Clone)]
pub struct Type {
    pub id: TypeId,
    pub kind: TypeKind,
}

/// The type table stores all types and provides access by TypeId.
#[derive(Debug)]
pub struct TypeTable {
    types: Vec<Type>,
    modules: FxHashMap<String, TypeId>,
    // Well-known types
    pub dynamic: TypeId,
    pub object: TypeId,
    pub named_tuple: TypeId,
    pub protocol: TypeId,
    pub typed_dict: TypeId,
    pub enum_type: TypeId,
    pub none_type: TypeId,
    pub final_decorator: TypeId,
    pub dataclass_decorator: TypeId,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self {
            types: Vec::with_capacity(256),
            modules: FxHashMap::default(),
            dynamic: TypeId(0),
            object: TypeId(1),
            named_tuple: TypeId(2),
            protocol: TypeId(3),
            typed_dict: TypeId(4),
            enum_type: TypeId(5),
            none_type: TypeId(6),
            final_decorator: TypeId(7),
            dataclass_decorator: TypeId(8),
        };

        table.add_type(TypeKind::Dynamic);
        table.add_class(TypeName::new("builtins", "object"), vec![], ClassKind::Regular);
        let object = table.object;
        table.add_class(
            TypeName::new("typing", "NamedTuple"),
            vec![object],
            ClassKind::Marker(MarkerKind::NamedTuple),
        );
        table.add_class(
            TypeName::new("typing", "Protocol"),
            vec![object],
            ClassKind::Marker(MarkerKind::Protocol),
        );
        table.add_class(
            TypeName::new("typing", "TypedDict"),
            vec![object],
            ClassKind::Marker(MarkerKind::TypedDict),
        );
        table.add_class(TypeName::new("enum", "Enum"), vec![object], ClassKind::Enum);
        let none_type = table.add_class(TypeName::new("builtins", "NoneType"), vec![object], ClassKind::Regular);
        table.add_flags(none_type, ClassFlags::FINAL);
        table.add_type(TypeKind::Decorator(DecoratorKind::Final));
        table.add_type(TypeKind::Decorator(DecoratorKind::Dataclass { frozen: false }));

        table
    }

    /// Add a new type to the table and return its ID.
    pub fn add_type(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(Type { id, kind });
        id
    }

    pub fn add_class(&mut self, name: TypeName, bases: Vec<TypeId>, kind: ClassKind) -> TypeId {
        self.add_type(TypeKind::Class(ClassType::new(name, bases, kind)))
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.index()]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn is_dynamic(&self, id: TypeId) -> bool {
        matches!(self.get(id).kind, TypeKind::Dynamic)
    }

    /// The class behind `id`, looking through an exact-type view.
    pub fn class(&self, id: TypeId) -> Option<&ClassType> {
        match &self.get(id).kind {
            TypeKind::Class(class) => Some(class),
            TypeKind::Exact { class } => self.class(*class),
            _ => None,
        }
    }

    pub fn class_mut(&mut self, id: TypeId) -> Option<&mut ClassType> {
        let id = self.strip_exact(id);
        match &mut self.get_mut(id).kind {
            TypeKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn strip_exact(&self, id: TypeId) -> TypeId {
        match self.get(id).kind {
            TypeKind::Exact { class } => class,
            _ => id,
        }
    }

    pub fn function(&self, id: TypeId) -> Option<&FunctionType> {
        match &self.get(id).kind {
            TypeKind::Function(func) => Some(func),
            TypeKind::UnknownDecorated { function } => self.function(*function),
            _ => None,
        }
    }

    pub fn is_final(&self, id: TypeId) -> bool {
        self.class(id).is_some_and(ClassType::is_final)
    }

    pub fn add_flags(&mut self, class: TypeId, flags: ClassFlags) {
        if let Some(class) = self.class_mut(class) {
            class.flags |= flags;
        }
    }

    /// Record a member on a class, replacing any earlier member of that name.
    /// Members declared against non-class types are dropped.
    pub fn declare_member(&mut self, class: TypeId, name: InternedString, member: Member) {
        if let Some(class) = self.class_mut(class) {
            class.members.insert(name, member);
        }
    }

    /// Ask `base` what kind of class subclassing it (with the full base
    /// list `bases`) produces. `None` means the subclass is dynamic.
    pub fn make_subclass(&self, base: TypeId, bases: &[TypeId]) -> Option<ClassKind> {
        match &self.get(base).kind {
            TypeKind::Class(class) => match class.kind {
                // Enums support a single base only.
                ClassKind::Enum if bases.len() > 1 => None,
                ClassKind::Enum => Some(ClassKind::Enum),
                ClassKind::Regular | ClassKind::Marker(_) => Some(ClassKind::Regular),
            },
            TypeKind::Exact { class } => self.make_subclass(*class, bases),
            _ => None,
        }
    }

    /// The exact-type view of a class. Non-class types are returned as is.
    pub fn exact_type(&mut self, id: TypeId) -> TypeId {
        let id = self.strip_exact(id);
        let cached = match &self.get(id).kind {
            TypeKind::Class(class) => class.exact,
            _ => return id,
        };
        if let Some(exact) = cached {
            return exact;
        }
        let exact = self.add_type(TypeKind::Exact { class: id });
        if let TypeKind::Class(class) = &mut self.get_mut(id).kind {
            class.exact = Some(exact);
        }
        exact
    }

    pub fn awaitable(&mut self, inner: TypeId) -> TypeId {
        self.add_type(TypeKind::Awaitable { inner })
    }

    /// The module-object type for `name`, shared by every import of it.
    pub fn module_instance(&mut self, name: &str) -> TypeId {
        if let Some(&id) = self.modules.get(name) {
            return id;
        }
        let id = self.add_type(TypeKind::Module { name: name.to_string() });
        self.modules.insert(name.to_string(), id);
        id
    }

    /// Apply a resolved decorator to a class. Decorators the compiler does
    /// not understand make the class dynamic.
    pub fn resolve_decorate_class(&mut self, class: TypeId, decorator: TypeId) -> TypeId {
        if self.class(class).is_none() {
            return self.dynamic;
        }
        match self.get(decorator).kind {
            TypeKind::Decorator(DecoratorKind::Final) => {
                self.add_flags(class, ClassFlags::FINAL);
                class
            }
            TypeKind::Decorator(DecoratorKind::Dataclass { frozen }) => {
                let mut flags = ClassFlags::DATACLASS;
                if frozen {
                    flags |= ClassFlags::FROZEN;
                }
                self.add_flags(class, flags);
                class
            }
            _ => self.dynamic,
        }
    }

    /// A human-readable name for diagnostics.
    pub fn display(&self, id: TypeId) -> String {
        match &self.get(id).kind {
            TypeKind::Dynamic => "dynamic".to_string(),
            TypeKind::Class(class) => class.name.to_string(),
            TypeKind::Exact { class } => format!("Exact[{}]", self.display(*class)),
            TypeKind::Awaitable { inner } => format!("Awaitable[{}]", self.display(*inner)),
            TypeKind::Function(func) => format!("function {}", func.name),
            TypeKind::UnknownDecorated { function } => format!("decorated {}", self.display(*function)),
            TypeKind::Decorator(DecoratorKind::Final) => "typing.final".to_string(),
            TypeKind::Decorator(DecoratorKind::Dataclass { .. }) => "dataclasses.dataclass".to_string(),
            TypeKind::Module { name } => format!("module {}", name),
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spyc_core::StringInterner;

    #[test]
    fn test_well_known_types() {
        let table = TypeTable::new();
        assert!(table.is_dynamic(table.dynamic));
        assert_eq!(table.class(table.object).unwrap().name.to_string(), "builtins.object");
        assert_eq!(
            table.class(table.protocol).unwrap().kind,
            ClassKind::Marker(MarkerKind::Protocol)
        );
        assert_eq!(table.class(table.named_tuple).unwrap().bases, vec![table.object]);
        assert!(table.is_final(table.none_type));
        assert!(matches!(
            table.get(table.final_decorator).kind,
            TypeKind::Decorator(DecoratorKind::Final)
        ));
    }

    #[test]
    fn test_make_subclass_kinds() {
        let mut table = TypeTable::new();
        let plain = table.add_class(TypeName::new("m", "A"), vec![table.object], ClassKind::Regular);
        let color = table.add_class(TypeName::new("m", "Color"), vec![table.enum_type], ClassKind::Enum);

        assert_eq!(table.make_subclass(plain, &[plain]), Some(ClassKind::Regular));
        assert_eq!(table.make_subclass(table.enum_type, &[table.enum_type]), Some(ClassKind::Enum));
        assert_eq!(table.make_subclass(color, &[color]), Some(ClassKind::Enum));
        assert_eq!(table.make_subclass(table.protocol, &[table.protocol]), Some(ClassKind::Regular));
        assert_eq!(table.make_subclass(table.dynamic, &[table.dynamic]), None);
    }

    #[test]
    fn test_enum_subclass_with_several_bases_is_dynamic() {
        let mut table = TypeTable::new();
        let plain = table.add_class(TypeName::new("m", "A"), vec![table.object], ClassKind::Regular);
        let color = table.add_class(TypeName::new("m", "Color"), vec![table.enum_type], ClassKind::Enum);
        let bases = [plain, color];

        assert_eq!(table.make_subclass(color, &bases), None);
        assert_eq!(table.make_subclass(plain, &bases), Some(ClassKind::Regular));
        let exact = table.exact_type(color);
        assert_eq!(table.make_subclass(exact, &[exact, table.enum_type]), None);
    }

    #[test]
    fn test_exact_type_is_cached() {
        let mut table = TypeTable::new();
        let class = table.add_class(TypeName::new("m", "A"), vec![table.object], ClassKind::Regular);
        let exact = table.exact_type(class);
        assert_ne!(exact, class);
        assert_eq!(table.exact_type(class), exact);
        assert_eq!(table.exact_type(exact), exact);
        assert_eq!(table.strip_exact(exact), class);
        assert_eq!(table.exact_type(table.dynamic), table.dynamic);
    }

    #[test]
    fn test_resolve_decorate_class() {
        let mut table = TypeTable::new();
        let class = table.add_class(TypeName::new("m", "A"), vec![table.object], ClassKind::Regular);

        let final_dec = table.final_decorator;
        assert_eq!(table.resolve_decorate_class(class, final_dec), class);
        assert!(table.is_final(class));

        let frozen = table.add_type(TypeKind::Decorator(DecoratorKind::Dataclass { frozen: true }));
        assert_eq!(table.resolve_decorate_class(class, frozen), class);
        let flags = table.class(class).unwrap().flags;
        assert!(flags.contains(ClassFlags::DATACLASS | ClassFlags::FROZEN));

        let other = table.add_class(TypeName::new("m", "NotADecorator"), vec![], ClassKind::Regular);
        assert_eq!(table.resolve_decorate_class(class, other), table.dynamic);
        let dynamic = table.dynamic;
        assert_eq!(table.resolve_decorate_class(dynamic, final_dec), table.dynamic);
    }

    #[test]
    fn test_declare_member_last_wins() {
        let interner = StringInterner::new();
        let mut table = TypeTable::new();
        let class = table.add_class(TypeName::new("m", "A"), vec![table.object], ClassKind::Regular);
        let x = interner.intern("x");
        table.declare_member(class, x, Member::Slot { annotation: None });
        table.declare_member(class, x, Member::Slot { annotation: Some(table.object) });

        let members = &table.class(class).unwrap().members;
        assert_eq!(members.len(), 1);
        assert_eq!(members[&x], Member::Slot { annotation: Some(table.object) });
    }

    #[test]
    fn test_module_instances_are_shared() {
        let mut table = TypeTable::new();
        let a = table.module_instance("a");
        assert_eq!(table.module_instance("a"), a);
        assert_ne!(table.module_instance("a.b"), a);
        assert_eq!(table.display(a), "module a");
    }
}
