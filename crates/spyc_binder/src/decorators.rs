//! Class decorator application.

use crate::binder::DeclarationVisitor;
use crate::hierarchy::Degradation;
use spyc_ast::Expr;
use spyc_types::TypeId;
use tracing::debug;

impl<'c> DeclarationVisitor<'c> {
    /// Apply `decorators` to `class`, innermost (bottom) first. The first
    /// decorator that is not understood turns the class dynamic, and the
    /// remaining ones are skipped.
    pub(crate) fn apply_class_decorators(&mut self, class: TypeId, decorators: &[Expr<'_>]) -> TypeId {
        let mut class = class;
        for decorator in decorators.iter().rev() {
            if self.ctx.types.is_dynamic(class) {
                break;
            }
            class = self.with_error_context(decorator.data().range, |this| match this.resolve_decorator(decorator) {
                Some(resolved) => this.ctx.types.resolve_decorate_class(class, resolved),
                None => this.ctx.types.dynamic,
            });
            if self.ctx.types.is_dynamic(class) {
                debug!(reason = ?Degradation::Decorator, "class degraded to dynamic");
            }
        }
        class
    }
}
