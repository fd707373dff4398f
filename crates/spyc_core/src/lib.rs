//! spyc_core: Core utilities for the spyc static Python compiler.
//!
//! Provides string interning, source ranges, and collections used
//! throughout the compiler front end.

pub mod collections;
pub mod intern;
pub mod text;

// Re-export commonly used types
pub use collections::OrderedMap;
pub use intern::{InternedString, StringInterner};
pub use text::{TextPos, TextRange};
