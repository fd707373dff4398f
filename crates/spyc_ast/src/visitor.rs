//! Statement visitor for traversing the syntax tree.
//!
//! Implement [`AstVisitor`] and override the statement kinds you care about;
//! default implementations walk into nested statement bodies through the
//! `walk_*` functions, which overriding methods can call to keep descending.
//! Visits return `Result` so a visitor can abort the traversal.

use crate::node::*;

pub trait AstVisitor<'a> {
    type Error;

    fn visit_module(&mut self, node: &Module<'a>) -> Result<(), Self::Error> {
        self.visit_body(node.body)
    }

    fn visit_body(&mut self, body: &[Stmt<'a>]) -> Result<(), Self::Error> {
        for stmt in body {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt<'a>) -> Result<(), Self::Error> {
        match stmt {
            Stmt::ClassDef(n) => self.visit_class_def(n),
            Stmt::FunctionDef(n) => self.visit_function_def(n),
            Stmt::AsyncFunctionDef(n) => self.visit_async_function_def(n),
            Stmt::Assign(n) => self.visit_assign(n),
            Stmt::AnnAssign(n) => self.visit_ann_assign(n),
            Stmt::Import(n) => self.visit_import(n),
            Stmt::ImportFrom(n) => self.visit_import_from(n),
            Stmt::If(n) => self.visit_if(n),
            Stmt::For(n) => self.visit_for(n),
            Stmt::AsyncFor(n) => self.visit_async_for(n),
            Stmt::While(n) => self.visit_while(n),
            Stmt::With(n) => self.visit_with(n),
            Stmt::AsyncWith(n) => self.visit_async_with(n),
            Stmt::Try(n) => self.visit_try(n),
            Stmt::Expr(_) | Stmt::Return(_) | Stmt::Pass(_) => Ok(()),
        }
    }

    fn visit_class_def(&mut self, node: &ClassDef<'a>) -> Result<(), Self::Error> {
        self.visit_body(node.body)
    }

    fn visit_function_def(&mut self, node: &FunctionDef<'a>) -> Result<(), Self::Error> {
        self.visit_body(node.body)
    }

    fn visit_async_function_def(&mut self, node: &FunctionDef<'a>) -> Result<(), Self::Error> {
        self.visit_body(node.body)
    }

    fn visit_assign(&mut self, _node: &Assign<'a>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_ann_assign(&mut self, _node: &AnnAssign<'a>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_import(&mut self, _node: &Import<'a>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_import_from(&mut self, _node: &ImportFrom<'a>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_if(&mut self, node: &IfStmt<'a>) -> Result<(), Self::Error> {
        walk_if(self, node)
    }

    fn visit_for(&mut self, node: &ForStmt<'a>) -> Result<(), Self::Error> {
        walk_for(self, node)
    }

    fn visit_async_for(&mut self, node: &ForStmt<'a>) -> Result<(), Self::Error> {
        walk_for(self, node)
    }

    fn visit_while(&mut self, node: &WhileStmt<'a>) -> Result<(), Self::Error> {
        walk_while(self, node)
    }

    fn visit_with(&mut self, node: &WithStmt<'a>) -> Result<(), Self::Error> {
        walk_with(self, node)
    }

    fn visit_async_with(&mut self, node: &WithStmt<'a>) -> Result<(), Self::Error> {
        walk_with(self, node)
    }

    fn visit_try(&mut self, node: &TryStmt<'a>) -> Result<(), Self::Error> {
        walk_try(self, node)
    }

    fn visit_except_handler(&mut self, node: &ExceptHandler<'a>) -> Result<(), Self::Error> {
        self.visit_body(node.body)
    }
}

pub fn walk_if<'a, V: AstVisitor<'a> + ?Sized>(visitor: &mut V, node: &IfStmt<'a>) -> Result<(), V::Error> {
    visitor.visit_body(node.body)?;
    visitor.visit_body(node.orelse)
}

pub fn walk_for<'a, V: AstVisitor<'a> + ?Sized>(visitor: &mut V, node: &ForStmt<'a>) -> Result<(), V::Error> {
    visitor.visit_body(node.body)?;
    visitor.visit_body(node.orelse)
}

pub fn walk_while<'a, V: AstVisitor<'a> + ?Sized>(visitor: &mut V, node: &WhileStmt<'a>) -> Result<(), V::Error> {
    visitor.visit_body(node.body)?;
    visitor.visit_body(node.orelse)
}

pub fn walk_with<'a, V: AstVisitor<'a> + ?Sized>(visitor: &mut V, node: &WithStmt<'a>) -> Result<(), V::Error> {
    visitor.visit_body(node.body)
}

pub fn walk_try<'a, V: AstVisitor<'a> + ?Sized>(visitor: &mut V, node: &TryStmt<'a>) -> Result<(), V::Error> {
    visitor.visit_body(node.body)?;
    for handler in node.handlers {
        visitor.visit_except_handler(handler)?;
    }
    visitor.visit_body(node.orelse)?;
    visitor.visit_body(node.finalbody)
}
