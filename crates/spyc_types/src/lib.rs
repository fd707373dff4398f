//! spyc_types: The static type representation.
//!
//! Types live in a [`TypeTable`] and are referenced by [`TypeId`], so class
//! hierarchies and wrappers can point at each other without lifetimes. The
//! table owns the dynamic sentinel, the builtin class and marker types, and
//! the polymorphic hooks the declaration pass relies on: subclass synthesis,
//! exact-type views, and class decoration.

mod types;

pub use types::{
    ClassFlags, ClassKind, ClassType, DecoratorKind, FunctionType, MarkerKind, Member, Type, TypeId,
    TypeKind, TypeName, TypeTable,
};
