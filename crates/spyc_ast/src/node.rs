//! Syntax tree node definitions.
//!
//! The node set covers what the declaration pass needs to see: definitions,
//! assignments, imports, and every compound statement that can contain them.
//! Expressions the pass never inspects are collapsed into [`Expr::Other`].

use crate::types::NodeId;
use spyc_core::intern::InternedString;
use spyc_core::text::TextRange;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeData {
    pub id: NodeId,
    pub range: TextRange,
}

impl NodeData {
    pub fn new(id: NodeId, range: TextRange) -> Self {
        Self { id, range }
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

/// An optional arena-allocated node.
pub type OptionalNode<'a, T> = Option<&'a T>;

/// An identifier with both its interned handle and its text.
#[derive(Debug, Clone, Copy)]
pub struct Identifier<'a> {
    pub data: NodeData,
    pub text: InternedString,
    pub text_name: &'a str,
}

// ============================================================================
// Module
// ============================================================================

#[derive(Debug)]
pub struct Module<'a> {
    pub data: NodeData,
    pub body: NodeList<'a, Stmt<'a>>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Stmt<'a> {
    ClassDef(ClassDef<'a>),
    FunctionDef(FunctionDef<'a>),
    AsyncFunctionDef(FunctionDef<'a>),
    Assign(Assign<'a>),
    AnnAssign(AnnAssign<'a>),
    Import(Import<'a>),
    ImportFrom(ImportFrom<'a>),
    If(IfStmt<'a>),
    For(ForStmt<'a>),
    AsyncFor(ForStmt<'a>),
    While(WhileStmt<'a>),
    With(WithStmt<'a>),
    AsyncWith(WithStmt<'a>),
    Try(TryStmt<'a>),
    Expr(ExprStmt<'a>),
    Return(ReturnStmt<'a>),
    Pass(NodeData),
}

impl<'a> Stmt<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Stmt::ClassDef(n) => &n.data,
            Stmt::FunctionDef(n) | Stmt::AsyncFunctionDef(n) => &n.data,
            Stmt::Assign(n) => &n.data,
            Stmt::AnnAssign(n) => &n.data,
            Stmt::Import(n) => &n.data,
            Stmt::ImportFrom(n) => &n.data,
            Stmt::If(n) => &n.data,
            Stmt::For(n) | Stmt::AsyncFor(n) => &n.data,
            Stmt::While(n) => &n.data,
            Stmt::With(n) | Stmt::AsyncWith(n) => &n.data,
            Stmt::Try(n) => &n.data,
            Stmt::Expr(n) => &n.data,
            Stmt::Return(n) => &n.data,
            Stmt::Pass(data) => data,
        }
    }

    pub fn id(&self) -> NodeId {
        self.data().id
    }
}

#[derive(Debug)]
pub struct ClassDef<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub bases: NodeList<'a, Expr<'a>>,
    pub keywords: NodeList<'a, Keyword<'a>>,
    /// Decorators in source order, topmost first.
    pub decorator_list: NodeList<'a, Expr<'a>>,
    pub body: NodeList<'a, Stmt<'a>>,
}

/// Shared by `def` and `async def`; the statement variant says which.
#[derive(Debug)]
pub struct FunctionDef<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub decorator_list: NodeList<'a, Expr<'a>>,
    pub returns: OptionalNode<'a, Expr<'a>>,
    pub body: NodeList<'a, Stmt<'a>>,
}

#[derive(Debug)]
pub struct Assign<'a> {
    pub data: NodeData,
    pub targets: NodeList<'a, Expr<'a>>,
    pub value: &'a Expr<'a>,
}

#[derive(Debug)]
pub struct AnnAssign<'a> {
    pub data: NodeData,
    pub target: &'a Expr<'a>,
    pub annotation: &'a Expr<'a>,
    pub value: OptionalNode<'a, Expr<'a>>,
}

/// `name [as asname]` inside an import statement. `name` may be dotted.
#[derive(Debug)]
pub struct Alias<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub asname: Option<&'a str>,
}

#[derive(Debug)]
pub struct Import<'a> {
    pub data: NodeData,
    pub names: NodeList<'a, Alias<'a>>,
}

#[derive(Debug)]
pub struct ImportFrom<'a> {
    pub data: NodeData,
    /// `None` for `from . import x`.
    pub module: Option<&'a str>,
    pub names: NodeList<'a, Alias<'a>>,
    /// Number of leading dots; zero for absolute imports.
    pub level: u32,
}

#[derive(Debug)]
pub struct IfStmt<'a> {
    pub data: NodeData,
    pub test: &'a Expr<'a>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub orelse: NodeList<'a, Stmt<'a>>,
}

#[derive(Debug)]
pub struct ForStmt<'a> {
    pub data: NodeData,
    pub target: &'a Expr<'a>,
    pub iter: &'a Expr<'a>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub orelse: NodeList<'a, Stmt<'a>>,
}

#[derive(Debug)]
pub struct WhileStmt<'a> {
    pub data: NodeData,
    pub test: &'a Expr<'a>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub orelse: NodeList<'a, Stmt<'a>>,
}

#[derive(Debug)]
pub struct WithItem<'a> {
    pub context_expr: &'a Expr<'a>,
    pub optional_vars: OptionalNode<'a, Expr<'a>>,
}

#[derive(Debug)]
pub struct WithStmt<'a> {
    pub data: NodeData,
    pub items: NodeList<'a, WithItem<'a>>,
    pub body: NodeList<'a, Stmt<'a>>,
}

#[derive(Debug)]
pub struct ExceptHandler<'a> {
    pub data: NodeData,
    pub type_: OptionalNode<'a, Expr<'a>>,
    pub name: Option<Identifier<'a>>,
    pub body: NodeList<'a, Stmt<'a>>,
}

#[derive(Debug)]
pub struct TryStmt<'a> {
    pub data: NodeData,
    pub body: NodeList<'a, Stmt<'a>>,
    pub handlers: NodeList<'a, ExceptHandler<'a>>,
    pub orelse: NodeList<'a, Stmt<'a>>,
    pub finalbody: NodeList<'a, Stmt<'a>>,
}

#[derive(Debug)]
pub struct ExprStmt<'a> {
    pub data: NodeData,
    pub value: &'a Expr<'a>,
}

#[derive(Debug)]
pub struct ReturnStmt<'a> {
    pub data: NodeData,
    pub value: OptionalNode<'a, Expr<'a>>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum Expr<'a> {
    Name(Identifier<'a>),
    Attribute(Attribute<'a>),
    Call(Call<'a>),
    Subscript(Subscript<'a>),
    Constant(ConstantExpr<'a>),
    Compare(Compare<'a>),
    Tuple(Tuple<'a>),
    /// Any expression the declaration pass does not look into.
    Other(NodeData),
}

impl<'a> Expr<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Expr::Name(n) => &n.data,
            Expr::Attribute(n) => &n.data,
            Expr::Call(n) => &n.data,
            Expr::Subscript(n) => &n.data,
            Expr::Constant(n) => &n.data,
            Expr::Compare(n) => &n.data,
            Expr::Tuple(n) => &n.data,
            Expr::Other(data) => data,
        }
    }

    pub fn id(&self) -> NodeId {
        self.data().id
    }

    /// The identifier if this is a bare name.
    pub fn as_name(&self) -> Option<&Identifier<'a>> {
        match self {
            Expr::Name(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Attribute<'a> {
    pub data: NodeData,
    pub value: &'a Expr<'a>,
    pub attr: Identifier<'a>,
}

#[derive(Debug)]
pub struct Keyword<'a> {
    pub data: NodeData,
    /// `None` for `**kwargs`.
    pub arg: Option<Identifier<'a>>,
    pub value: &'a Expr<'a>,
}

#[derive(Debug)]
pub struct Call<'a> {
    pub data: NodeData,
    pub func: &'a Expr<'a>,
    pub args: NodeList<'a, Expr<'a>>,
    pub keywords: NodeList<'a, Keyword<'a>>,
}

#[derive(Debug)]
pub struct Subscript<'a> {
    pub data: NodeData,
    pub value: &'a Expr<'a>,
    pub slice: &'a Expr<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant<'a> {
    None,
    Bool(bool),
    Int(i64),
    Str(&'a str),
    Ellipsis,
}

#[derive(Debug)]
pub struct ConstantExpr<'a> {
    pub data: NodeData,
    pub value: Constant<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

/// `left op0 c0 op1 c1 ...`
#[derive(Debug)]
pub struct Compare<'a> {
    pub data: NodeData,
    pub left: &'a Expr<'a>,
    pub ops: &'a [CmpOp],
    pub comparators: NodeList<'a, Expr<'a>>,
}

#[derive(Debug)]
pub struct Tuple<'a> {
    pub data: NodeData,
    pub elts: NodeList<'a, Expr<'a>>,
}
