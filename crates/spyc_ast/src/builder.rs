//! Programmatic syntax tree construction.
//!
//! Builds arena-allocated trees with fresh node ids, for drivers that obtain
//! their syntax from somewhere other than source text and for tests. Each
//! node gets a distinct one-byte range derived from its id, so diagnostics
//! can be matched back to the node that produced them.

use crate::node::*;
use crate::types::NodeId;
use bumpalo::Bump;
use spyc_core::intern::StringInterner;
use spyc_core::text::TextRange;
use std::cell::Cell;

pub struct AstBuilder<'a> {
    arena: &'a Bump,
    interner: StringInterner,
    next_id: Cell<u32>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(arena: &'a Bump, interner: StringInterner) -> Self {
        Self {
            arena,
            interner,
            next_id: Cell::new(0),
        }
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    fn data(&self) -> NodeData {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeData::new(NodeId(id), TextRange::new(id, id + 1))
    }

    fn list<T>(&self, items: Vec<T>) -> &'a [T] {
        self.arena.alloc_slice_fill_iter(items)
    }

    fn boxed(&self, expr: Expr<'a>) -> &'a Expr<'a> {
        self.arena.alloc(expr)
    }

    fn ident(&self, name: &str) -> Identifier<'a> {
        Identifier {
            data: self.data(),
            text: self.interner.intern(name),
            text_name: self.arena.alloc_str(name),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn name(&self, name: &str) -> Expr<'a> {
        Expr::Name(self.ident(name))
    }

    pub fn attr(&self, value: Expr<'a>, attr: &str) -> Expr<'a> {
        Expr::Attribute(Attribute {
            data: self.data(),
            value: self.boxed(value),
            attr: self.ident(attr),
        })
    }

    /// `a.b.C` as nested attribute accesses on the name `a`.
    pub fn dotted(&self, path: &str) -> Expr<'a> {
        let mut parts = path.split('.');
        let first = parts.next().unwrap_or(path);
        parts.fold(self.name(first), |value, part| self.attr(value, part))
    }

    pub fn call(&self, func: Expr<'a>, args: Vec<Expr<'a>>, keywords: Vec<(&str, Expr<'a>)>) -> Expr<'a> {
        let keywords = keywords
            .into_iter()
            .map(|(arg, value)| Keyword {
                data: self.data(),
                arg: Some(self.ident(arg)),
                value: self.boxed(value),
            })
            .collect();
        Expr::Call(Call {
            data: self.data(),
            func: self.boxed(func),
            args: self.list(args),
            keywords: self.list(keywords),
        })
    }

    pub fn subscript(&self, value: Expr<'a>, slice: Expr<'a>) -> Expr<'a> {
        Expr::Subscript(Subscript {
            data: self.data(),
            value: self.boxed(value),
            slice: self.boxed(slice),
        })
    }

    pub fn constant(&self, value: Constant<'_>) -> Expr<'a> {
        let value = match value {
            Constant::Str(s) => Constant::Str(self.arena.alloc_str(s)),
            Constant::None => Constant::None,
            Constant::Bool(b) => Constant::Bool(b),
            Constant::Int(i) => Constant::Int(i),
            Constant::Ellipsis => Constant::Ellipsis,
        };
        Expr::Constant(ConstantExpr { data: self.data(), value })
    }

    pub fn none(&self) -> Expr<'a> {
        self.constant(Constant::None)
    }

    pub fn int(&self, value: i64) -> Expr<'a> {
        self.constant(Constant::Int(value))
    }

    pub fn bool_(&self, value: bool) -> Expr<'a> {
        self.constant(Constant::Bool(value))
    }

    pub fn str_(&self, value: &str) -> Expr<'a> {
        self.constant(Constant::Str(value))
    }

    pub fn tuple(&self, elts: Vec<Expr<'a>>) -> Expr<'a> {
        Expr::Tuple(Tuple {
            data: self.data(),
            elts: self.list(elts),
        })
    }

    /// A single comparison `left op right`.
    pub fn compare(&self, left: Expr<'a>, op: CmpOp, right: Expr<'a>) -> Expr<'a> {
        Expr::Compare(Compare {
            data: self.data(),
            left: self.boxed(left),
            ops: self.arena.alloc_slice_copy(&[op]),
            comparators: self.list(vec![right]),
        })
    }

    pub fn other(&self) -> Expr<'a> {
        Expr::Other(self.data())
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn module(&self, body: Vec<Stmt<'a>>) -> Module<'a> {
        Module {
            data: self.data(),
            body: self.list(body),
        }
    }

    pub fn class_def(
        &self,
        name: &str,
        bases: Vec<Expr<'a>>,
        decorators: Vec<Expr<'a>>,
        body: Vec<Stmt<'a>>,
    ) -> Stmt<'a> {
        Stmt::ClassDef(ClassDef {
            data: self.data(),
            name: self.ident(name),
            bases: self.list(bases),
            keywords: &[],
            decorator_list: self.list(decorators),
            body: self.list(body),
        })
    }

    fn function(
        &self,
        name: &str,
        returns: Option<Expr<'a>>,
        decorators: Vec<Expr<'a>>,
        body: Vec<Stmt<'a>>,
    ) -> FunctionDef<'a> {
        FunctionDef {
            data: self.data(),
            name: self.ident(name),
            decorator_list: self.list(decorators),
            returns: returns.map(|r| self.boxed(r)),
            body: self.list(body),
        }
    }

    pub fn function_def(
        &self,
        name: &str,
        returns: Option<Expr<'a>>,
        decorators: Vec<Expr<'a>>,
        body: Vec<Stmt<'a>>,
    ) -> Stmt<'a> {
        Stmt::FunctionDef(self.function(name, returns, decorators, body))
    }

    pub fn async_function_def(
        &self,
        name: &str,
        returns: Option<Expr<'a>>,
        decorators: Vec<Expr<'a>>,
        body: Vec<Stmt<'a>>,
    ) -> Stmt<'a> {
        Stmt::AsyncFunctionDef(self.function(name, returns, decorators, body))
    }

    pub fn assign(&self, targets: Vec<Expr<'a>>, value: Expr<'a>) -> Stmt<'a> {
        Stmt::Assign(Assign {
            data: self.data(),
            targets: self.list(targets),
            value: self.boxed(value),
        })
    }

    pub fn ann_assign(&self, target: Expr<'a>, annotation: Expr<'a>, value: Option<Expr<'a>>) -> Stmt<'a> {
        Stmt::AnnAssign(AnnAssign {
            data: self.data(),
            target: self.boxed(target),
            annotation: self.boxed(annotation),
            value: value.map(|v| self.boxed(v)),
        })
    }

    fn aliases(&self, names: &[(&str, Option<&str>)]) -> &'a [Alias<'a>] {
        let aliases = names
            .iter()
            .map(|(name, asname)| Alias {
                data: self.data(),
                name: self.arena.alloc_str(name),
                asname: asname.map(|a| &*self.arena.alloc_str(a)),
            })
            .collect();
        self.list(aliases)
    }

    /// `import name [as asname], ...`
    pub fn import(&self, names: &[(&str, Option<&str>)]) -> Stmt<'a> {
        Stmt::Import(Import {
            data: self.data(),
            names: self.aliases(names),
        })
    }

    /// `from [.]*module import name [as asname], ...`
    pub fn import_from(&self, module: Option<&str>, names: &[(&str, Option<&str>)], level: u32) -> Stmt<'a> {
        Stmt::ImportFrom(ImportFrom {
            data: self.data(),
            module: module.map(|m| &*self.arena.alloc_str(m)),
            names: self.aliases(names),
            level,
        })
    }

    pub fn if_(&self, test: Expr<'a>, body: Vec<Stmt<'a>>, orelse: Vec<Stmt<'a>>) -> Stmt<'a> {
        Stmt::If(IfStmt {
            data: self.data(),
            test: self.boxed(test),
            body: self.list(body),
            orelse: self.list(orelse),
        })
    }

    fn for_stmt(&self, target: Expr<'a>, iter: Expr<'a>, body: Vec<Stmt<'a>>, orelse: Vec<Stmt<'a>>) -> ForStmt<'a> {
        ForStmt {
            data: self.data(),
            target: self.boxed(target),
            iter: self.boxed(iter),
            body: self.list(body),
            orelse: self.list(orelse),
        }
    }

    pub fn for_(&self, target: Expr<'a>, iter: Expr<'a>, body: Vec<Stmt<'a>>, orelse: Vec<Stmt<'a>>) -> Stmt<'a> {
        Stmt::For(self.for_stmt(target, iter, body, orelse))
    }

    pub fn async_for(&self, target: Expr<'a>, iter: Expr<'a>, body: Vec<Stmt<'a>>, orelse: Vec<Stmt<'a>>) -> Stmt<'a> {
        Stmt::AsyncFor(self.for_stmt(target, iter, body, orelse))
    }

    pub fn while_(&self, test: Expr<'a>, body: Vec<Stmt<'a>>, orelse: Vec<Stmt<'a>>) -> Stmt<'a> {
        Stmt::While(WhileStmt {
            data: self.data(),
            test: self.boxed(test),
            body: self.list(body),
            orelse: self.list(orelse),
        })
    }

    fn with_stmt(&self, items: Vec<(Expr<'a>, Option<Expr<'a>>)>, body: Vec<Stmt<'a>>) -> WithStmt<'a> {
        let items = items
            .into_iter()
            .map(|(context_expr, vars)| WithItem {
                context_expr: self.boxed(context_expr),
                optional_vars: vars.map(|v| self.boxed(v)),
            })
            .collect();
        WithStmt {
            data: self.data(),
            items: self.list(items),
            body: self.list(body),
        }
    }

    pub fn with_(&self, items: Vec<(Expr<'a>, Option<Expr<'a>>)>, body: Vec<Stmt<'a>>) -> Stmt<'a> {
        Stmt::With(self.with_stmt(items, body))
    }

    pub fn async_with(&self, items: Vec<(Expr<'a>, Option<Expr<'a>>)>, body: Vec<Stmt<'a>>) -> Stmt<'a> {
        Stmt::AsyncWith(self.with_stmt(items, body))
    }

    pub fn except_handler(
        &self,
        type_: Option<Expr<'a>>,
        name: Option<&str>,
        body: Vec<Stmt<'a>>,
    ) -> ExceptHandler<'a> {
        ExceptHandler {
            data: self.data(),
            type_: type_.map(|t| self.boxed(t)),
            name: name.map(|n| self.ident(n)),
            body: self.list(body),
        }
    }

    pub fn try_(
        &self,
        body: Vec<Stmt<'a>>,
        handlers: Vec<ExceptHandler<'a>>,
        orelse: Vec<Stmt<'a>>,
        finalbody: Vec<Stmt<'a>>,
    ) -> Stmt<'a> {
        Stmt::Try(TryStmt {
            data: self.data(),
            body: self.list(body),
            handlers: self.list(handlers),
            orelse: self.list(orelse),
            finalbody: self.list(finalbody),
        })
    }

    pub fn expr_stmt(&self, value: Expr<'a>) -> Stmt<'a> {
        Stmt::Expr(ExprStmt {
            data: self.data(),
            value: self.boxed(value),
        })
    }

    pub fn return_(&self, value: Option<Expr<'a>>) -> Stmt<'a> {
        Stmt::Return(ReturnStmt {
            data: self.data(),
            value: value.map(|v| self.boxed(v)),
        })
    }

    pub fn pass(&self) -> Stmt<'a> {
        Stmt::Pass(self.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_are_unique() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena, StringInterner::new());
        let first = b.name("a");
        let second = b.name("a");
        assert_ne!(first.id(), second.id());
        assert_ne!(first.data().range, second.data().range);
    }

    #[test]
    fn test_dotted_builds_nested_attributes() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena, StringInterner::new());
        let expr = b.dotted("a.b.C");
        let Expr::Attribute(outer) = &expr else {
            panic!("expected attribute, got {:?}", expr);
        };
        assert_eq!(outer.attr.text_name, "C");
        let Expr::Attribute(inner) = outer.value else {
            panic!("expected nested attribute");
        };
        assert_eq!(inner.attr.text_name, "b");
        assert_eq!(inner.value.as_name().map(|n| n.text_name), Some("a"));
    }

    #[test]
    fn test_identifiers_are_interned() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena, StringInterner::new());
        let stmt = b.class_def("C", vec![b.name("Base")], vec![], vec![b.pass()]);
        let Stmt::ClassDef(class) = &stmt else {
            panic!("expected class def");
        };
        assert_eq!(b.interner().get("C"), Some(class.name.text));
        assert_eq!(class.bases.len(), 1);
        assert_eq!(class.body.len(), 1);
    }

    #[test]
    fn test_import_aliases() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena, StringInterner::new());
        let stmt = b.import_from(Some("pkg"), &[("name", Some("alias"))], 0);
        let Stmt::ImportFrom(node) = &stmt else {
            panic!("expected import from");
        };
        assert_eq!(node.module, Some("pkg"));
        assert_eq!(node.names[0].name, "name");
        assert_eq!(node.names[0].asname, Some("alias"));
    }
}
