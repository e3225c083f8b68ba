//! AST node definitions for the O language.

use std::fmt;

/// A type reference as written in the source.
///
/// Equality is structural, which is what assignability and overload
/// resolution compare against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A plain name such as `Integer` or a user class.
    Simple(String),
    /// A generic application such as `Array[Integer]`.
    Generic(String, Vec<TypeRef>),
}

impl TypeRef {
    /// Builds a `Simple` reference from any string-like name.
    pub fn simple(name: impl Into<String>) -> Self {
        TypeRef::Simple(name.into())
    }

    /// The base name of the reference (`Array` for `Array[Integer]`).
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Simple(name) => name,
            TypeRef::Generic(name, _) => name,
        }
    }

    /// True for a `Simple` reference with exactly the given name.
    pub fn is_simple_named(&self, name: &str) -> bool {
        matches!(self, TypeRef::Simple(n) if n == name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Simple(name) => write!(f, "{}", name),
            TypeRef::Generic(name, args) => {
                write!(f, "{}[", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, "]")
            },
        }
    }
}

/// AST root: the ordered list of class declarations in one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    /// Declared parent type, if any. Parsed as a full type; semantic
    /// analysis rejects anything but a simple class name.
    pub parent: Option<TypeRef>,
    pub members: Vec<Member>,
}

/// A class member.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Var(VarDecl),
    Method(MethodDecl),
    Constructor(CtorDecl),
}

/// Access modifier on a field. Parsed and carried, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Default,
    Private,
    Public,
}

/// A variable declaration: a field when it appears in a class body, a
/// local when it appears in a method body.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: TypeRef,
    /// The initializer. `var x: T` produces the sentinel
    /// `Expr::ClassRef(T)`; `var x: T(args)` produces a receiver-less
    /// `Expr::Call` naming the type.
    pub init: Expr,
    pub visibility: Visibility,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

/// A method declaration. The body is absent for a forward declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Option<TypeRef>,
    pub body: Option<Body>,
}

/// A constructor declaration, introduced by the `this` keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct CtorDecl {
    pub params: Vec<Param>,
    pub body: Option<Body>,
}

/// A block body: local variable declarations plus ordered statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub vars: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
}

/// The target of an assignment: a plain local/field name, or the
/// `this.`-qualified form which resolves against fields only.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignTarget {
    pub name: String,
    pub this_qualified: bool,
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { target: AssignTarget, value: Expr },
    While { cond: Expr, body: Body },
    If { cond: Expr, then_body: Body, else_body: Option<Body> },
    Return(Option<Expr>),
    Expr(Expr),
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// 64-bit signed integer literal.
    Int(i64),
    /// Double-precision real literal.
    Real(f64),
    /// Boolean literal.
    Bool(bool),
    /// The receiver object.
    This,
    /// A plain name: local, parameter, or field of the enclosing class.
    Ident(String),
    /// Field access through a receiver. A missing receiver means `this`.
    Field {
        receiver: Option<Box<Expr>>,
        name: String,
    },
    /// A method call. A missing receiver is either a built-in (`print`)
    /// or a method of the enclosing class.
    Call {
        receiver: Option<Box<Expr>>,
        method: String,
        args: Vec<Expr>,
    },
    /// The sentinel initializer naming a type, produced for `var x: T`.
    ClassRef(TypeRef),
}

impl Expr {
    /// True for the literal variants the constant folder operates on.
    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Int(_) | Expr::Real(_) | Expr::Bool(_))
    }
}
