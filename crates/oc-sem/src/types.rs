//! Built-in types, assignability, and the built-in method catalog.

use crate::table::ClassTable;
use oc_par::ast::TypeRef;

/// An inferred expression type.
///
/// `Unknown` arises from field access on built-in receivers and is
/// assignable in both directions; everything else carries the type
/// reference it names. `void` is the named type `void`.
#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    Unknown,
    Named(TypeRef),
}

impl Ty {
    pub fn integer() -> Self {
        Ty::Named(TypeRef::simple("Integer"))
    }

    pub fn real() -> Self {
        Ty::Named(TypeRef::simple("Real"))
    }

    pub fn bool() -> Self {
        Ty::Named(TypeRef::simple("Bool"))
    }

    pub fn void() -> Self {
        Ty::Named(TypeRef::simple("void"))
    }

    /// The type of a method's return value: `void` when undeclared.
    pub fn from_ret(ret: &Option<TypeRef>) -> Self {
        match ret {
            Some(ty) => Ty::Named(ty.clone()),
            None => Ty::void(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Named(t) if t.is_simple_named("void"))
    }

    /// The underlying type reference, if known.
    pub fn as_ref(&self) -> Option<&TypeRef> {
        match self {
            Ty::Unknown => None,
            Ty::Named(t) => Some(t),
        }
    }
}

impl std::fmt::Display for Ty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::Unknown => write!(f, "<unknown>"),
            Ty::Named(t) => write!(f, "{}", t),
        }
    }
}

/// True for the built-in type names, including the `Array` constructor.
pub fn is_builtin_name(name: &str) -> bool {
    matches!(name, "Integer" | "Real" | "Bool" | "void" | "Array")
}

/// Assignability over inferred types: `Unknown` is compatible with
/// everything.
pub fn assignable(table: &ClassTable, from: &Ty, to: &Ty) -> bool {
    match (from, to) {
        (Ty::Unknown, _) | (_, Ty::Unknown) => true,
        (Ty::Named(f), Ty::Named(t)) => assignable_ref(table, f, t),
    }
}

/// Assignability over type references: identity, transitive subclassing,
/// or the same generic base with component-wise assignable arguments.
/// There are no implicit numeric conversions.
pub fn assignable_ref(table: &ClassTable, from: &TypeRef, to: &TypeRef) -> bool {
    if from == to {
        return true;
    }
    match (from, to) {
        (TypeRef::Simple(f), TypeRef::Simple(t)) => table.is_subclass(f, t),
        (TypeRef::Generic(fb, fa), TypeRef::Generic(tb, ta)) => {
            fb == tb
                && fa.len() == ta.len()
                && fa
                    .iter()
                    .zip(ta)
                    .all(|(f, t)| assignable_ref(table, f, t))
        },
        _ => false,
    }
}

const COMPARISONS: [&str; 6] = [
    "Equal",
    "NotEqual",
    "Less",
    "Greater",
    "LessEqual",
    "GreaterEqual",
];

const ARITHMETIC: [&str; 5] = ["Plus", "Minus", "Mult", "Div", "Rem"];

/// Return type of a method invoked on a built-in receiver, or `None`
/// when the receiver has no such method.
pub fn builtin_method_type(receiver: &TypeRef, method: &str, args: &[Ty]) -> Option<Ty> {
    match receiver {
        TypeRef::Simple(name) if name == "Integer" => match method {
            "toReal" => Some(Ty::real()),
            "toBoolean" => Some(Ty::bool()),
            "UnaryMinus" => Some(Ty::integer()),
            m if ARITHMETIC.contains(&m) => {
                // Real if the argument is Real, else Integer.
                let arg_is_real = args
                    .first()
                    .and_then(|a| a.as_ref())
                    .is_some_and(|t| t.is_simple_named("Real"));
                Some(if arg_is_real { Ty::real() } else { Ty::integer() })
            },
            m if COMPARISONS.contains(&m) => Some(Ty::bool()),
            _ => None,
        },
        TypeRef::Simple(name) if name == "Real" => match method {
            "toInteger" => Some(Ty::integer()),
            "UnaryMinus" => Some(Ty::real()),
            m if ARITHMETIC.contains(&m) => Some(Ty::real()),
            m if COMPARISONS.contains(&m) => Some(Ty::bool()),
            _ => None,
        },
        TypeRef::Simple(name) if name == "Bool" => match method {
            "toInteger" => Some(Ty::integer()),
            "Equal" | "NotEqual" | "And" | "Or" | "Xor" | "Not" => Some(Ty::bool()),
            _ => None,
        },
        TypeRef::Generic(name, args_tys) if name == "Array" => match method {
            "Length" => Some(Ty::integer()),
            "get" => args_tys.first().cloned().map(Ty::Named),
            "set" => Some(Ty::void()),
            _ => None,
        },
        _ => None,
    }
}
