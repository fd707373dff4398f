//! Hard failures of the declaration pass.
//!
//! Recoverable problems are reported through the error sink and binding
//! continues. The errors here abort binding of the current module.

use crate::scope::ScopeKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("relative imports aren't supported (module: {module:?}, level: {level})")]
    UnsupportedImport { module: Option<String>, level: u32 },

    #[error("internal error: expected to exit a {expected:?} scope, found {found:?}")]
    ScopeMismatch { expected: ScopeKind, found: ScopeKind },

    #[error("internal error: attempted to exit the module scope")]
    PopModuleScope,

    #[error("internal error: module `{module}` received a declaration after finish_bind")]
    ModuleFinalized { module: String },
}

impl BindError {
    /// Internal errors indicate a bug in the pass, never a problem in the
    /// module being compiled.
    pub fn is_internal(&self) -> bool {
        !matches!(self, BindError::UnsupportedImport { .. })
    }
}
