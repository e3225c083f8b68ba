//! Overload resolution.
//!
//! Overload sets are read from a single owner class: the first class
//! along the receiver's parent chain that declares the method name.
//! Sets are never merged across the chain.

use crate::table::{ClassTable, MethodSymbol};
use crate::types::{assignable, Ty};
use oc_util::{CompileError, Result};

/// Resolves a call to `method` on class `class` with argument types
/// `args`.
///
/// Candidates are filtered by arity, then an exact structural match is
/// preferred; otherwise exactly one assignability-compatible candidate
/// must remain.
pub fn resolve_overload<'a>(
    table: &'a ClassTable,
    class: &str,
    method: &str,
    args: &[Ty],
) -> Result<&'a MethodSymbol> {
    let owner = table.find_method_class(class, method).ok_or_else(|| {
        CompileError::semantic(format!(
            "Unknown method '{}' in class '{}'",
            method, class
        ))
    })?;
    let overloads = owner.overloads(method);

    let candidates: Vec<&MethodSymbol> = overloads
        .iter()
        .filter(|m| m.params.len() == args.len())
        .collect();

    if candidates.is_empty() {
        let mut arities: Vec<usize> = overloads.iter().map(|m| m.params.len()).collect();
        arities.sort_unstable();
        arities.dedup();
        let arities: Vec<String> = arities.iter().map(|a| a.to_string()).collect();
        return Err(CompileError::semantic(format!(
            "No overload of method '{}' in class '{}' takes {} arguments (available: {})",
            method,
            owner.name,
            args.len(),
            arities.join(", ")
        )));
    }

    if let Some(exact) = candidates.iter().find(|m| {
        m.params
            .iter()
            .zip(args)
            .all(|(p, a)| matches!(a, Ty::Named(t) if *t == p.ty))
    }) {
        return Ok(exact);
    }

    let compatible: Vec<&MethodSymbol> = candidates
        .into_iter()
        .filter(|m| {
            m.params
                .iter()
                .zip(args)
                .all(|(p, a)| assignable(table, a, &Ty::Named(p.ty.clone())))
        })
        .collect();

    match compatible.len() {
        0 => Err(CompileError::semantic(format!(
            "No suitable overload for method '{}' in class '{}'",
            method, owner.name
        ))),
        1 => Ok(compatible[0]),
        _ => Err(CompileError::semantic(format!(
            "Ambiguous call to method '{}' in class '{}'",
            method, owner.name
        ))),
    }
}
