//! JVM type descriptors and slot arithmetic.

use oc_par::ast::TypeRef;
use oc_sem::MethodTable;

/// Renders a type reference as a JVM field descriptor.
///
/// Scalars map to primitives, `Array` over a scalar maps to the matching
/// primitive array, every other array erases to `[Ljava/lang/Object;`,
/// and anything else is a class reference `L<name>;`.
pub fn field_descriptor(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Simple(name) => match name.as_str() {
            "Integer" | "Int" => "I".to_string(),
            "Real" | "Double" => "D".to_string(),
            "Bool" | "Boolean" => "Z".to_string(),
            "void" | "Void" => "V".to_string(),
            other => format!("L{};", other),
        },
        TypeRef::Generic(base, args) if base == "Array" => match args.as_slice() {
            [element] => match element {
                TypeRef::Simple(name) => match name.as_str() {
                    "Integer" | "Int" => "[I".to_string(),
                    "Real" | "Double" => "[D".to_string(),
                    "Bool" | "Boolean" => "[Z".to_string(),
                    _ => "[Ljava/lang/Object;".to_string(),
                },
                TypeRef::Generic(_, _) => "[Ljava/lang/Object;".to_string(),
            },
            _ => "[Ljava/lang/Object;".to_string(),
        },
        TypeRef::Generic(base, _) => format!("L{};", base),
    }
}

/// Renders a method's return descriptor (`V` when undeclared).
pub fn return_descriptor(ret: Option<&TypeRef>) -> String {
    match ret {
        Some(ty) => field_descriptor(ty),
        None => "V".to_string(),
    }
}

/// Renders a full method descriptor from parameter types and return.
pub fn method_descriptor<'a>(
    params: impl IntoIterator<Item = &'a TypeRef>,
    ret: Option<&TypeRef>,
) -> String {
    let mut out = String::from("(");
    for ty in params {
        out.push_str(&field_descriptor(ty));
    }
    out.push(')');
    out.push_str(&return_descriptor(ret));
    out
}

/// The number of JVM local-variable slots a type consumes.
pub fn slot_size(ty: &TypeRef) -> usize {
    match ty {
        TypeRef::Simple(name) if name == "Real" || name == "Double" => 2,
        _ => 1,
    }
}

/// Translates a method-table name to its JVM slot index.
///
/// Slot 0 is `this`; each earlier entry consumes its own slot size in
/// logical-index order.
pub fn jvm_slot(table: &MethodTable, name: &str) -> Option<usize> {
    let target = table.get(name)?;
    let mut slot = 1;
    for (_, local) in table.iter() {
        if local.index == target.index {
            return Some(slot);
        }
        slot += slot_size(&local.ty);
    }
    None
}

/// The broad JVM kind a descriptor selects instructions by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JvmKind {
    Int,
    Double,
    Reference,
    Void,
}

/// Classifies a field descriptor for load/store/return selection.
pub fn kind_of(descriptor: &str) -> JvmKind {
    match descriptor.as_bytes().first() {
        Some(b'I') | Some(b'Z') => JvmKind::Int,
        Some(b'D') => JvmKind::Double,
        Some(b'V') => JvmKind::Void,
        _ => JvmKind::Reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array_of(name: &str) -> TypeRef {
        TypeRef::Generic("Array".to_string(), vec![TypeRef::simple(name)])
    }

    #[test]
    fn test_scalar_descriptors() {
        assert_eq!(field_descriptor(&TypeRef::simple("Integer")), "I");
        assert_eq!(field_descriptor(&TypeRef::simple("Real")), "D");
        assert_eq!(field_descriptor(&TypeRef::simple("Bool")), "Z");
        assert_eq!(field_descriptor(&TypeRef::simple("void")), "V");
    }

    #[test]
    fn test_alias_descriptors() {
        assert_eq!(field_descriptor(&TypeRef::simple("Int")), "I");
        assert_eq!(field_descriptor(&TypeRef::simple("Double")), "D");
        assert_eq!(field_descriptor(&TypeRef::simple("Boolean")), "Z");
        assert_eq!(field_descriptor(&TypeRef::simple("Void")), "V");
    }

    #[test]
    fn test_class_descriptor() {
        assert_eq!(field_descriptor(&TypeRef::simple("Point")), "LPoint;");
    }

    #[test]
    fn test_array_descriptors() {
        assert_eq!(field_descriptor(&array_of("Integer")), "[I");
        assert_eq!(field_descriptor(&array_of("Real")), "[D");
        assert_eq!(field_descriptor(&array_of("Bool")), "[Z");
        assert_eq!(field_descriptor(&array_of("Point")), "[Ljava/lang/Object;");
    }

    #[test]
    fn test_nested_array_erases() {
        let nested = TypeRef::Generic("Array".to_string(), vec![array_of("Integer")]);
        assert_eq!(field_descriptor(&nested), "[Ljava/lang/Object;");
    }

    #[test]
    fn test_method_descriptor() {
        let params = [TypeRef::simple("Integer"), TypeRef::simple("Real")];
        let ret = TypeRef::simple("Bool");
        assert_eq!(method_descriptor(params.iter(), Some(&ret)), "(ID)Z");
        assert_eq!(method_descriptor(std::iter::empty(), None), "()V");
    }

    #[test]
    fn test_slot_sizes() {
        assert_eq!(slot_size(&TypeRef::simple("Integer")), 1);
        assert_eq!(slot_size(&TypeRef::simple("Bool")), 1);
        assert_eq!(slot_size(&TypeRef::simple("Real")), 2);
        assert_eq!(slot_size(&array_of("Real")), 1);
    }

    #[test]
    fn test_jvm_slots_skip_doubles() {
        let mut table = MethodTable::default();
        table.declare("a", TypeRef::simple("Integer"));
        table.declare("d", TypeRef::simple("Real"));
        table.declare("b", TypeRef::simple("Integer"));
        assert_eq!(jvm_slot(&table, "a"), Some(1));
        assert_eq!(jvm_slot(&table, "d"), Some(2));
        assert_eq!(jvm_slot(&table, "b"), Some(4));
        assert_eq!(jvm_slot(&table, "missing"), None);
    }

    #[test]
    fn test_slot_mapping_is_monotonic() {
        let mut table = MethodTable::default();
        for (name, ty) in [
            ("p", "Real"),
            ("q", "Integer"),
            ("r", "Real"),
            ("s", "Bool"),
        ] {
            table.declare(name, TypeRef::simple(ty));
        }
        let slots: Vec<_> = ["p", "q", "r", "s"]
            .iter()
            .map(|n| jvm_slot(&table, n).unwrap())
            .collect();
        assert!(slots.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(kind_of("I"), JvmKind::Int);
        assert_eq!(kind_of("Z"), JvmKind::Int);
        assert_eq!(kind_of("D"), JvmKind::Double);
        assert_eq!(kind_of("V"), JvmKind::Void);
        assert_eq!(kind_of("LPoint;"), JvmKind::Reference);
        assert_eq!(kind_of("[I"), JvmKind::Reference);
    }
}
