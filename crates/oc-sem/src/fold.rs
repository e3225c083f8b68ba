//! Optimization (phase 6).
//!
//! Produces a new program in which every method body has been rewritten:
//! statements after the first `return` in a block are discarded, calls
//! over literal receivers and arguments are folded per the built-in
//! arithmetic/comparison/logical semantics, and locals that are never
//! mentioned in any statement are dropped. Constructor bodies are left
//! as parsed.

use oc_par::ast::{Body, ClassDecl, Expr, Member, MethodDecl, Program, Stmt};
use rustc_hash::FxHashSet;

/// Rewrites the program with all method-body optimizations applied.
pub fn optimize(program: Program) -> Program {
    Program {
        classes: program.classes.into_iter().map(optimize_class).collect(),
    }
}

fn optimize_class(class: ClassDecl) -> ClassDecl {
    ClassDecl {
        members: class
            .members
            .into_iter()
            .map(|member| match member {
                Member::Method(method) => Member::Method(optimize_method(method)),
                other => other,
            })
            .collect(),
        ..class
    }
}

fn optimize_method(method: MethodDecl) -> MethodDecl {
    MethodDecl {
        body: method.body.map(optimize_body),
        ..method
    }
}

fn optimize_body(body: Body) -> Body {
    let mut body = fold_body(strip_dead_code(body));

    // All blocks of a method share one flat namespace, so usage is
    // collected over the whole statement tree before dropping decls.
    let mut used = FxHashSet::default();
    collect_used_names(&body.stmts, &mut used);
    drop_unused_locals(&mut body, &used);

    body
}

/// Discards every statement after the first `return` in a block,
/// recursing into nested bodies.
fn strip_dead_code(body: Body) -> Body {
    let mut stmts = Vec::with_capacity(body.stmts.len());
    for stmt in body.stmts {
        let is_return = matches!(stmt, Stmt::Return(_));
        stmts.push(match stmt {
            Stmt::While { cond, body } => Stmt::While {
                cond,
                body: strip_dead_code(body),
            },
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => Stmt::If {
                cond,
                then_body: strip_dead_code(then_body),
                else_body: else_body.map(strip_dead_code),
            },
            other => other,
        });
        if is_return {
            break;
        }
    }
    Body {
        vars: body.vars,
        stmts,
    }
}

fn fold_body(body: Body) -> Body {
    Body {
        vars: body.vars,
        stmts: body.stmts.into_iter().map(fold_stmt).collect(),
    }
}

fn fold_stmt(stmt: Stmt) -> Stmt {
    match stmt {
        Stmt::Assign { target, value } => Stmt::Assign {
            target,
            value: fold_expr(value),
        },
        Stmt::While { cond, body } => Stmt::While {
            cond: fold_expr(cond),
            body: fold_body(body),
        },
        Stmt::If {
            cond,
            then_body,
            else_body,
        } => Stmt::If {
            cond: fold_expr(cond),
            then_body: fold_body(then_body),
            else_body: else_body.map(fold_body),
        },
        Stmt::Return(value) => Stmt::Return(value.map(fold_expr)),
        Stmt::Expr(expr) => Stmt::Expr(fold_expr(expr)),
    }
}

/// Folds an expression bottom-up. A call is replaced by its value when
/// the receiver and every argument are literals and the operation is an
/// arithmetic, comparison, or logical built-in. Division or remainder by
/// zero leaves the call unchanged.
fn fold_expr(expr: Expr) -> Expr {
    match expr {
        Expr::Call {
            receiver: Some(receiver),
            method,
            args,
        } => {
            let receiver = Box::new(fold_expr(*receiver));
            let args: Vec<Expr> = args.into_iter().map(fold_expr).collect();

            if receiver.is_literal() && args.iter().all(Expr::is_literal) {
                if let Some(folded) = eval_builtin(&receiver, &method, &args) {
                    return folded;
                }
            }
            Expr::Call {
                receiver: Some(receiver),
                method,
                args,
            }
        },
        Expr::Call {
            receiver: None,
            method,
            args,
        } => Expr::Call {
            receiver: None,
            method,
            args: args.into_iter().map(fold_expr).collect(),
        },
        Expr::Field { receiver, name } => Expr::Field {
            receiver: receiver.map(|r| Box::new(fold_expr(*r))),
            name,
        },
        other => other,
    }
}

/// Evaluates a built-in operation over literals, mirroring the runtime
/// semantics of the underlying numeric or boolean operation.
fn eval_builtin(receiver: &Expr, method: &str, args: &[Expr]) -> Option<Expr> {
    match (receiver, args) {
        (Expr::Int(a), [Expr::Int(b)]) => eval_int_int(*a, method, *b),
        (Expr::Int(a), [Expr::Real(b)]) => eval_real_arith(*a as f64, method, *b),
        (Expr::Real(a), [Expr::Real(b)]) => eval_real(*a, method, *b),
        (Expr::Real(a), [Expr::Int(b)]) => eval_real_arith(*a, method, *b as f64),
        (Expr::Int(a), []) if method == "UnaryMinus" => a.checked_neg().map(Expr::Int),
        (Expr::Real(a), []) if method == "UnaryMinus" => Some(Expr::Real(-a)),
        (Expr::Bool(a), [Expr::Bool(b)]) => eval_bool(*a, method, *b),
        (Expr::Bool(a), []) if method == "Not" => Some(Expr::Bool(!a)),
        _ => None,
    }
}

fn eval_int_int(a: i64, method: &str, b: i64) -> Option<Expr> {
    match method {
        "Plus" => a.checked_add(b).map(Expr::Int),
        "Minus" => a.checked_sub(b).map(Expr::Int),
        "Mult" => a.checked_mul(b).map(Expr::Int),
        "Div" => a.checked_div(b).map(Expr::Int),
        "Rem" => a.checked_rem(b).map(Expr::Int),
        "Equal" => Some(Expr::Bool(a == b)),
        "NotEqual" => Some(Expr::Bool(a != b)),
        "Less" => Some(Expr::Bool(a < b)),
        "Greater" => Some(Expr::Bool(a > b)),
        "LessEqual" => Some(Expr::Bool(a <= b)),
        "GreaterEqual" => Some(Expr::Bool(a >= b)),
        _ => None,
    }
}

fn eval_real(a: f64, method: &str, b: f64) -> Option<Expr> {
    match method {
        "Equal" => Some(Expr::Bool(a == b)),
        "NotEqual" => Some(Expr::Bool(a != b)),
        "Less" => Some(Expr::Bool(a < b)),
        "Greater" => Some(Expr::Bool(a > b)),
        "LessEqual" => Some(Expr::Bool(a <= b)),
        "GreaterEqual" => Some(Expr::Bool(a >= b)),
        _ => eval_real_arith(a, method, b),
    }
}

fn eval_real_arith(a: f64, method: &str, b: f64) -> Option<Expr> {
    match method {
        "Plus" => Some(Expr::Real(a + b)),
        "Minus" => Some(Expr::Real(a - b)),
        "Mult" => Some(Expr::Real(a * b)),
        "Div" if b != 0.0 => Some(Expr::Real(a / b)),
        "Rem" if b != 0.0 => Some(Expr::Real(a % b)),
        _ => None,
    }
}

fn eval_bool(a: bool, method: &str, b: bool) -> Option<Expr> {
    match method {
        "Equal" => Some(Expr::Bool(a == b)),
        "NotEqual" | "Xor" => Some(Expr::Bool(a != b)),
        "And" => Some(Expr::Bool(a && b)),
        "Or" => Some(Expr::Bool(a || b)),
        _ => None,
    }
}

fn collect_used_names(stmts: &[Stmt], used: &mut FxHashSet<String>) {
    for stmt in stmts {
        match stmt {
            Stmt::Assign { target, value } => {
                // An assignment target counts as a use.
                used.insert(target.name.clone());
                collect_expr_names(value, used);
            },
            Stmt::While { cond, body } => {
                collect_expr_names(cond, used);
                collect_used_names(&body.stmts, used);
            },
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                collect_expr_names(cond, used);
                collect_used_names(&then_body.stmts, used);
                if let Some(else_body) = else_body {
                    collect_used_names(&else_body.stmts, used);
                }
            },
            Stmt::Return(value) => {
                if let Some(expr) = value {
                    collect_expr_names(expr, used);
                }
            },
            Stmt::Expr(expr) => collect_expr_names(expr, used),
        }
    }
}

fn collect_expr_names(expr: &Expr, used: &mut FxHashSet<String>) {
    match expr {
        Expr::Ident(name) => {
            used.insert(name.clone());
        },
        Expr::Field { receiver, name } => {
            used.insert(name.clone());
            if let Some(receiver) = receiver {
                collect_expr_names(receiver, used);
            }
        },
        Expr::Call {
            receiver, args, ..
        } => {
            if let Some(receiver) = receiver {
                collect_expr_names(receiver, used);
            }
            for arg in args {
                collect_expr_names(arg, used);
            }
        },
        Expr::Int(_) | Expr::Real(_) | Expr::Bool(_) | Expr::This | Expr::ClassRef(_) => {},
    }
}

fn drop_unused_locals(body: &mut Body, used: &FxHashSet<String>) {
    body.vars.retain(|v| used.contains(&v.name));
    for stmt in &mut body.stmts {
        match stmt {
            Stmt::While { body, .. } => drop_unused_locals(body, used),
            Stmt::If {
                then_body,
                else_body,
                ..
            } => {
                drop_unused_locals(then_body, used);
                if let Some(else_body) = else_body {
                    drop_unused_locals(else_body, used);
                }
            },
            _ => {},
        }
    }
}
