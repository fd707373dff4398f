//! Module symbol tables.
//!
//! A [`ModuleTable`] holds the guaranteed top-level bindings of one module,
//! the names that may or may not be bound, and the per-node annotations the
//! declaration pass produces for later passes.

use crate::imports::DeferredImport;
use crate::BindError;
use rustc_hash::{FxHashMap, FxHashSet};
use spyc_ast::NodeId;
use spyc_core::{InternedString, OrderedMap, StringInterner};
use spyc_types::{Member, TypeId};

/// What a name is bound to.
#[derive(Debug, Clone)]
pub enum Declaration {
    Class(TypeId),
    Function(FunctionRecord),
    Variable(VariableRecord),
    Import(ImportRecord),
    /// A statically known value with no definition site, such as the
    /// builtin decorators.
    Value(TypeId),
}

impl Declaration {
    /// The class member this declaration produces inside a class body.
    pub fn as_member(&self) -> Member {
        match self {
            Declaration::Class(class) => Member::Class(*class),
            Declaration::Function(func) => Member::Method(func.node_type),
            Declaration::Variable(var) => Member::Slot {
                annotation: var.annotation,
            },
            Declaration::Import(_) | Declaration::Value(_) => Member::Slot { annotation: None },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionRecord {
    pub node: NodeId,
    pub function: TypeId,
    /// The function type, or its unknown-decorated wrapper.
    pub node_type: TypeId,
    /// Names bound in the function body.
    pub locals: Vec<InternedString>,
    /// Names the body binds only on some paths, excluding `locals`.
    pub possible: Vec<InternedString>,
}

#[derive(Debug, Clone)]
pub struct VariableRecord {
    pub node: NodeId,
    /// `None` for unannotated assignments.
    pub annotation: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub node: NodeId,
    /// `(module, attribute)` for `from module import attribute`.
    pub source: Option<(String, String)>,
    pub deferred: DeferredImport,
}

#[derive(Debug)]
pub struct ModuleTable {
    pub name: String,
    pub filename: String,
    children: OrderedMap<InternedString, Declaration>,
    possible_names: FxHashSet<InternedString>,
    types: FxHashMap<NodeId, TypeId>,
    known_boolean_tests: FxHashMap<NodeId, bool>,
    finished: bool,
}

impl ModuleTable {
    pub fn new(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            children: OrderedMap::new(),
            possible_names: FxHashSet::default(),
            types: FxHashMap::default(),
            known_boolean_tests: FxHashMap::default(),
            finished: false,
        }
    }

    /// Bind `name`, replacing any earlier binding. Fails once the module
    /// has been finished.
    pub fn declare(&mut self, name: InternedString, decl: Declaration) -> Result<(), BindError> {
        if self.finished {
            return Err(BindError::ModuleFinalized {
                module: self.name.clone(),
            });
        }
        self.children.insert(name, decl);
        Ok(())
    }

    pub fn declare_class(&mut self, name: InternedString, class: TypeId) -> Result<(), BindError> {
        self.declare(name, Declaration::Class(class))
    }

    pub fn declare_function(&mut self, name: InternedString, record: FunctionRecord) -> Result<(), BindError> {
        self.declare(name, Declaration::Function(record))
    }

    pub fn declare_variable(&mut self, name: InternedString, record: VariableRecord) -> Result<(), BindError> {
        self.declare(name, Declaration::Variable(record))
    }

    pub fn declare_variables(
        &mut self,
        names: impl IntoIterator<Item = InternedString>,
        node: NodeId,
    ) -> Result<(), BindError> {
        for name in names {
            self.declare_variable(name, VariableRecord { node, annotation: None })?;
        }
        Ok(())
    }

    pub fn declare_import(
        &mut self,
        name: InternedString,
        node: NodeId,
        source: Option<(String, String)>,
        deferred: DeferredImport,
    ) -> Result<(), BindError> {
        self.declare(name, Declaration::Import(ImportRecord { node, source, deferred }))
    }

    pub fn declare_value(&mut self, name: InternedString, value: TypeId) -> Result<(), BindError> {
        self.declare(name, Declaration::Value(value))
    }

    /// Record a name bound only on some execution paths.
    pub fn record_possible(&mut self, name: InternedString) {
        self.possible_names.insert(name);
    }

    pub fn is_possible_name(&self, name: InternedString) -> bool {
        self.possible_names.contains(&name)
    }

    pub fn possible_names(&self) -> impl Iterator<Item = InternedString> + '_ {
        self.possible_names.iter().copied()
    }

    pub fn set_node_type(&mut self, node: NodeId, ty: TypeId) {
        self.types.insert(node, ty);
    }

    pub fn node_type(&self, node: NodeId) -> Option<TypeId> {
        self.types.get(&node).copied()
    }

    pub fn mark_known_boolean_test(&mut self, node: NodeId, value: bool) {
        self.known_boolean_tests.insert(node, value);
    }

    pub fn known_boolean_test(&self, node: NodeId) -> Option<bool> {
        self.known_boolean_tests.get(&node).copied()
    }

    /// Signal that the declaration pass is done with this module.
    pub fn finish_bind(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn get_child(&self, name: InternedString) -> Option<&Declaration> {
        self.children.get(&name)
    }

    pub fn children(&self) -> impl Iterator<Item = (InternedString, &Declaration)> {
        self.children.iter().map(|(name, decl)| (*name, decl))
    }

    pub fn get_class(&self, name: InternedString) -> Option<TypeId> {
        match self.get_child(name)? {
            Declaration::Class(class) => Some(*class),
            _ => None,
        }
    }

    pub fn get_function(&self, name: InternedString) -> Option<&FunctionRecord> {
        match self.get_child(name)? {
            Declaration::Function(record) => Some(record),
            _ => None,
        }
    }

    pub fn get_variable(&self, name: InternedString) -> Option<&VariableRecord> {
        match self.get_child(name)? {
            Declaration::Variable(record) => Some(record),
            _ => None,
        }
    }

    pub fn get_import(&self, name: InternedString) -> Option<&ImportRecord> {
        match self.get_child(name)? {
            Declaration::Import(record) => Some(record),
            _ => None,
        }
    }
}

/// All module tables known to the compiler, keyed by dotted module name.
#[derive(Debug)]
pub struct ModuleRegistry {
    interner: StringInterner,
    modules: FxHashMap<String, ModuleTable>,
}

impl ModuleRegistry {
    pub fn new(interner: StringInterner) -> Self {
        Self {
            interner,
            modules: FxHashMap::default(),
        }
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Register a module table, returning the table it replaces.
    pub fn insert(&mut self, table: ModuleTable) -> Option<ModuleTable> {
        self.modules.insert(table.name.clone(), table)
    }

    pub fn lookup_module(&self, name: &str) -> Option<&ModuleTable> {
        self.modules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}
