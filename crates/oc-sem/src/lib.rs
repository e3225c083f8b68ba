//! oc-sem - Semantic analysis for the O language.
//!
//! Analysis runs as six strictly ordered phases over the parsed program:
//!
//! 1. class registration (and the `Program` entry-point check)
//! 2. inheritance resolution and cycle detection
//! 3. member declaration (fields, overloads, method tables)
//! 4. name resolution
//! 5. type checking
//! 6. optimization (dead code, constant folding, dead locals)
//!
//! The ordering is load-bearing: each phase reads structure the previous
//! one established. The analyzer exposes the populated [`ClassTable`] and
//! the optimized program to the code generator.

mod check;
mod declare;
mod fold;
mod overload;
mod resolve;
mod table;
mod types;

pub use check::ExprTyper;
pub use overload::resolve_overload;
pub use table::{ClassSymbol, ClassTable, Local, MethodSymbol, MethodTable, ParamSymbol, VarSymbol};
pub use types::{assignable, assignable_ref, builtin_method_type, is_builtin_name, Ty};

use oc_par::ast::Program;
use oc_util::Result;

/// The analyzer's output: the class table and the optimized program.
#[derive(Debug)]
pub struct Analysis {
    pub table: ClassTable,
    pub program: Program,
}

/// Runs all six analysis phases over a parsed program.
pub fn analyze(program: Program) -> Result<Analysis> {
    let mut table = ClassTable::new();

    declare::register_classes(&mut table, &program)?;
    declare::resolve_inheritance(&mut table, &program)?;
    declare::declare_members(&mut table, &program)?;
    resolve::resolve_names(&table, &program)?;
    check::check_types(&table, &program)?;

    let program = fold::optimize(program);

    Ok(Analysis { table, program })
}
