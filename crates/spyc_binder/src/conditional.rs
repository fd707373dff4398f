//! Static evaluation of `if` tests.
//!
//! Only two shapes are understood: a type-checking guard, and a single
//! comparison of `sys.hexversion` or `sys.version_info` against a literal.
//! Everything else is undecidable at compile time.

use spyc_ast::{CmpOp, Constant, Expr};
use spyc_options::BindOptions;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticCondition {
    /// `if TYPE_CHECKING:` and friends. The body is bound, the else branch
    /// is not.
    TypeCheckingGuard,
    /// The test has this value for the target interpreter.
    Known(bool),
    Unknown,
}

pub fn evaluate_condition(test: &Expr<'_>, options: &BindOptions) -> StaticCondition {
    if is_type_checking_guard(test, options) {
        return StaticCondition::TypeCheckingGuard;
    }
    match evaluate_version_check(test, options) {
        Some(value) => StaticCondition::Known(value),
        None => StaticCondition::Unknown,
    }
}

fn is_type_checking_guard(test: &Expr<'_>, options: &BindOptions) -> bool {
    match test {
        Expr::Name(ident) => options.is_type_checking_guard(ident.text_name),
        Expr::Attribute(attr) => {
            attr.attr.text_name == "TYPE_CHECKING"
                && matches!(
                    attr.value.as_name().map(|m| m.text_name),
                    Some("typing") | Some("typing_extensions")
                )
        }
        _ => false,
    }
}

fn is_sys_attribute(expr: &Expr<'_>, name: &str) -> bool {
    match expr {
        Expr::Attribute(attr) => {
            attr.attr.text_name == name && attr.value.as_name().map(|m| m.text_name) == Some("sys")
        }
        _ => false,
    }
}

fn int_constant(expr: &Expr<'_>) -> Option<i64> {
    match expr {
        Expr::Constant(constant) => match constant.value {
            Constant::Int(value) => Some(value),
            _ => None,
        },
        _ => None,
    }
}

fn apply(op: CmpOp, ordering: Ordering) -> Option<bool> {
    Some(match op {
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::NotEq => ordering != Ordering::Equal,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::LtE => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::GtE => ordering != Ordering::Less,
        CmpOp::Is | CmpOp::IsNot | CmpOp::In | CmpOp::NotIn => return None,
    })
}

/// `sys.hexversion <op> INT` or `sys.version_info <op> (INT, ...)`.
fn evaluate_version_check(test: &Expr<'_>, options: &BindOptions) -> Option<bool> {
    let compare = match test {
        Expr::Compare(compare) if compare.ops.len() == 1 && compare.comparators.len() == 1 => compare,
        _ => return None,
    };
    let op = compare.ops[0];
    let right = &compare.comparators[0];

    if is_sys_attribute(compare.left, "hexversion") {
        let value = int_constant(right)?;
        return apply(op, i64::from(options.target_hexversion).cmp(&value));
    }

    if is_sys_attribute(compare.left, "version_info") {
        let elts = match right {
            Expr::Tuple(tuple) if !tuple.elts.is_empty() && tuple.elts.len() <= 3 => tuple.elts,
            _ => return None,
        };
        let literal = elts.iter().map(int_constant).collect::<Option<Vec<_>>>()?;
        return apply(op, version_info(options).as_slice().cmp(literal.as_slice()));
    }

    None
}

/// The full five-field `sys.version_info`, with the release level and
/// serial taken from the low byte of the hexversion.
fn version_info(options: &BindOptions) -> [i64; 5] {
    let (major, minor, micro) = options.version_info();
    let hex = options.target_hexversion;
    [
        i64::from(major),
        i64::from(minor),
        i64::from(micro),
        i64::from((hex >> 4) & 0xf),
        i64::from(hex & 0xf),
    ]
}
