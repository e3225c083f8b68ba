//! Class table and symbol definitions.
//!
//! The class table is the compiler's global registry of class symbols.
//! It owns every symbol; parent and owner links are stored as class-name
//! keys back into the table, so chain walks are repeated lookups and no
//! cyclic ownership can arise (cycles themselves are rejected during
//! inheritance resolution).

use indexmap::IndexMap;
use oc_par::ast::TypeRef;
use oc_util::{CompileError, Result};

/// A field or local variable symbol.
#[derive(Debug, Clone)]
pub struct VarSymbol {
    pub name: String,
    pub ty: TypeRef,
}

/// A method parameter symbol.
#[derive(Debug, Clone)]
pub struct ParamSymbol {
    pub name: String,
    pub ty: TypeRef,
}

/// One entry in a method table: the variable's type and its logical
/// declaration index.
#[derive(Debug, Clone)]
pub struct Local {
    pub ty: TypeRef,
    pub index: usize,
}

/// Per-method mapping of parameter and local names to logical indices.
///
/// Insertion order is preserved (parameters first, locals after), and
/// logical indices are assigned sequentially from zero with no gaps.
/// The code generator derives JVM slot numbers from this order.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    entries: IndexMap<String, Local>,
}

impl MethodTable {
    /// Registers a name, assigning the next logical index.
    ///
    /// Returns the assigned index, or `None` if the name is already
    /// present (all locals of a method share this one flat table).
    pub fn declare(&mut self, name: impl Into<String>, ty: TypeRef) -> Option<usize> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return None;
        }
        let index = self.entries.len();
        self.entries.insert(name, Local { ty, index });
        Some(index)
    }

    /// Looks up a name.
    pub fn get(&self, name: &str) -> Option<&Local> {
        self.entries.get(name)
    }

    /// Returns true if the name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates entries in insertion (logical-index) order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Local)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A method symbol: signature, owner, and the method's variable table.
#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub name: String,
    pub params: Vec<ParamSymbol>,
    pub ret: Option<TypeRef>,
    /// Name of the class that declares this method.
    pub owner: String,
    pub table: MethodTable,
}

impl MethodSymbol {
    /// The parameter types in declaration order.
    pub fn param_types(&self) -> Vec<&TypeRef> {
        self.params.iter().map(|p| &p.ty).collect()
    }

    /// True if this symbol's parameter types equal `types` pairwise.
    pub fn params_match(&self, types: &[TypeRef]) -> bool {
        self.params.len() == types.len()
            && self.params.iter().zip(types).all(|(p, t)| p.ty == *t)
    }
}

/// A class symbol: fields, overloaded methods, and the parent link.
#[derive(Debug, Clone)]
pub struct ClassSymbol {
    pub name: String,
    /// Fields in declaration order.
    pub fields: IndexMap<String, VarSymbol>,
    /// Overload sets keyed by method name, each in declaration order.
    pub methods: IndexMap<String, Vec<MethodSymbol>>,
    /// Name of the declared parent class, if any.
    pub parent: Option<String>,
}

impl ClassSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            methods: IndexMap::new(),
            parent: None,
        }
    }

    /// The overload set declared for `name` in this class alone.
    pub fn overloads(&self, name: &str) -> &[MethodSymbol] {
        self.methods.get(name).map_or(&[], |v| v.as_slice())
    }

    /// The locally declared overload whose parameter types equal `types`.
    pub fn overload(&self, name: &str, types: &[TypeRef]) -> Option<&MethodSymbol> {
        self.overloads(name).iter().find(|m| m.params_match(types))
    }
}

/// The global, insertion-ordered registry of class symbols.
#[derive(Debug, Default)]
pub struct ClassTable {
    classes: IndexMap<String, ClassSymbol>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a class symbol; a duplicate name fails.
    pub fn insert(&mut self, symbol: ClassSymbol) -> Result<()> {
        if self.classes.contains_key(&symbol.name) {
            return Err(CompileError::semantic(format!(
                "Duplicate class '{}'",
                symbol.name
            )));
        }
        self.classes.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ClassSymbol> {
        self.classes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClassSymbol> {
        self.classes.get_mut(name)
    }

    /// Looks up the class a type reference names.
    ///
    /// Generic references resolve to absent: `Array` is a type
    /// constructor, not a class.
    pub fn lookup(&self, ty: &TypeRef) -> Option<&ClassSymbol> {
        match ty {
            TypeRef::Simple(name) => self.get(name),
            TypeRef::Generic(_, _) => None,
        }
    }

    /// Like [`get`](Self::get) but failing with a semantic error.
    pub fn require(&self, name: &str) -> Result<&ClassSymbol> {
        self.get(name)
            .ok_or_else(|| CompileError::semantic(format!("Unknown class '{}'", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Iterates classes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassSymbol> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Finds a field on `class` or any of its ancestors, returning the
    /// declaring class name alongside the symbol.
    pub fn find_field(&self, class: &str, name: &str) -> Option<(&str, &VarSymbol)> {
        let mut current = self.get(class);
        while let Some(symbol) = current {
            if let Some(field) = symbol.fields.get(name) {
                return Some((symbol.name.as_str(), field));
            }
            current = symbol.parent.as_deref().and_then(|p| self.get(p));
        }
        None
    }

    /// Finds the first class along `class`'s parent chain that declares
    /// any overload of `name`.
    pub fn find_method_class(&self, class: &str, name: &str) -> Option<&ClassSymbol> {
        let mut current = self.get(class);
        while let Some(symbol) = current {
            if symbol.methods.contains_key(name) {
                return Some(symbol);
            }
            current = symbol.parent.as_deref().and_then(|p| self.get(p));
        }
        None
    }

    /// True if `sub` is a strict transitive subclass of `sup`.
    pub fn is_subclass(&self, sub: &str, sup: &str) -> bool {
        let mut current = self.get(sub).and_then(|s| s.parent.as_deref());
        while let Some(name) = current {
            if name == sup {
                return true;
            }
            current = self.get(name).and_then(|s| s.parent.as_deref());
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_chain() -> ClassTable {
        // C extends B extends A
        let mut table = ClassTable::new();
        let mut a = ClassSymbol::new("A");
        a.fields.insert(
            "x".to_string(),
            VarSymbol {
                name: "x".to_string(),
                ty: TypeRef::simple("Integer"),
            },
        );
        table.insert(a).unwrap();
        let mut b = ClassSymbol::new("B");
        b.parent = Some("A".to_string());
        table.insert(b).unwrap();
        let mut c = ClassSymbol::new("C");
        c.parent = Some("B".to_string());
        table.insert(c).unwrap();
        table
    }

    #[test]
    fn test_duplicate_insert_fails() {
        let mut table = ClassTable::new();
        table.insert(ClassSymbol::new("A")).unwrap();
        let err = table.insert(ClassSymbol::new("A")).unwrap_err();
        assert!(err.to_string().contains("Duplicate class 'A'"));
    }

    #[test]
    fn test_lookup_simple_and_generic() {
        let table = table_with_chain();
        assert!(table.lookup(&TypeRef::simple("A")).is_some());
        assert!(table
            .lookup(&TypeRef::Generic(
                "Array".to_string(),
                vec![TypeRef::simple("A")]
            ))
            .is_none());
    }

    #[test]
    fn test_find_field_walks_chain() {
        let table = table_with_chain();
        let (owner, field) = table.find_field("C", "x").unwrap();
        assert_eq!(owner, "A");
        assert_eq!(field.ty, TypeRef::simple("Integer"));
        assert!(table.find_field("C", "missing").is_none());
    }

    #[test]
    fn test_is_subclass() {
        let table = table_with_chain();
        assert!(table.is_subclass("C", "A"));
        assert!(table.is_subclass("B", "A"));
        assert!(!table.is_subclass("A", "C"));
        assert!(!table.is_subclass("A", "A"));
    }

    #[test]
    fn test_method_table_indices_are_sequential() {
        let mut table = MethodTable::default();
        assert_eq!(table.declare("a", TypeRef::simple("Integer")), Some(0));
        assert_eq!(table.declare("b", TypeRef::simple("Real")), Some(1));
        assert_eq!(table.declare("c", TypeRef::simple("Bool")), Some(2));
        assert_eq!(table.declare("b", TypeRef::simple("Bool")), None);
        assert_eq!(table.get("c").unwrap().index, 2);
    }

    #[test]
    fn test_method_table_preserves_insertion_order() {
        let mut table = MethodTable::default();
        table.declare("p", TypeRef::simple("Integer"));
        table.declare("q", TypeRef::simple("Real"));
        let names: Vec<_> = table.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["p", "q"]);
    }

    #[test]
    fn test_class_table_preserves_insertion_order() {
        let table = table_with_chain();
        let names: Vec<_> = table.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }
}
