//! spyc_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Diagnostics are realized from static [`DiagnosticMessage`] templates and
//! accumulated in a [`DiagnosticCollection`]. The [`ErrorSink`] adds a stack
//! of error contexts so that problems detected deep inside a traversal are
//! attributed to the declaration being processed.

use spyc_core::text::TextRange;
use std::fmt;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    /// The message template. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The file path where this diagnostic occurred, if any.
    pub file: Option<String>,
    /// The source range where this diagnostic occurred, if any.
    pub range: Option<TextRange>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            range: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn with_location(
        file: String,
        range: TextRange,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file),
            range: Some(range),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(range) = self.range {
                write!(f, "({})", range.pos)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} SP{}: {}", self.category, self.code, self.message_text)
    }
}

/// Replace `{0}`, `{1}`, etc. in a template with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during compilation.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort diagnostics by file and position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            let file_cmp = a.file.cmp(&b.file);
            if file_cmp != std::cmp::Ordering::Equal {
                return file_cmp;
            }
            let a_pos = a.range.map(|r| r.pos).unwrap_or(0);
            let b_pos = b.range.map(|r| r.pos).unwrap_or(0);
            a_pos.cmp(&b_pos)
        });
    }
}

// ============================================================================
// Error sink
// ============================================================================

/// The location a diagnostic is attributed to when reported without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub file: String,
    pub range: TextRange,
}

/// Accumulates diagnostics and tracks the stack of active error contexts.
///
/// Contexts must be strictly nested. Callers pair `push_context` and
/// `pop_context` through [`ErrorSink::enter_context`], or through a guard of
/// their own that pops on drop.
#[derive(Debug, Default)]
pub struct ErrorSink {
    diagnostics: DiagnosticCollection,
    contexts: Vec<ErrorContext>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a diagnostic at an explicit location.
    pub fn report(&mut self, file: &str, range: TextRange, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics
            .add(Diagnostic::with_location(file.to_string(), range, message, args));
    }

    /// Report a diagnostic at the innermost active error context. Without an
    /// active context the diagnostic carries no location.
    pub fn report_in_context(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        match self.contexts.last() {
            Some(ctx) => {
                let (file, range) = (ctx.file.clone(), ctx.range);
                self.report(&file, range, message, args);
            }
            None => self.diagnostics.add(Diagnostic::new(message, args)),
        }
    }

    pub fn push_context(&mut self, file: &str, range: TextRange) {
        self.contexts.push(ErrorContext {
            file: file.to_string(),
            range,
        });
    }

    pub fn pop_context(&mut self) -> Option<ErrorContext> {
        self.contexts.pop()
    }

    pub fn current_context(&self) -> Option<&ErrorContext> {
        self.contexts.last()
    }

    pub fn context_depth(&self) -> usize {
        self.contexts.len()
    }

    /// Push an error context that stays active until the returned guard is
    /// dropped.
    pub fn enter_context(&mut self, file: &str, range: TextRange) -> ContextGuard<'_> {
        self.push_context(file, range);
        ContextGuard { sink: self }
    }

    /// Run `f` with an error context for `(file, range)` active. The context
    /// is popped however `f` returns, including through `?` or a panic.
    pub fn with_error_context<R>(
        &mut self,
        file: &str,
        range: TextRange,
        f: impl FnOnce(&mut ErrorSink) -> R,
    ) -> R {
        let mut guard = self.enter_context(file, range);
        f(&mut *guard)
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }
}

/// An active error context. Dropping the guard pops it.
#[derive(Debug)]
pub struct ContextGuard<'s> {
    sink: &'s mut ErrorSink,
}

impl Deref for ContextGuard<'_> {
    type Target = ErrorSink;

    fn deref(&self) -> &ErrorSink {
        self.sink
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut ErrorSink {
        self.sink
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.sink.pop_context();
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Declaration binding (1000-1099)
    // ========================================================================
    pub const INCOMPATIBLE_SUBTYPES: DiagnosticMessage = diag!(1001, Error, "Incompatible subtypes");
    pub const CANNOT_SUBCLASS_A_FINAL_CLASS_0_1: DiagnosticMessage =
        diag!(1002, Error, "Class `{0}` cannot subclass a Final class: `{1}`");
}
