use crate::position::Position;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A frame of execution: what the traceback names, and the scope its
/// statements read and write.
pub struct Context {
    pub display_name: String,
    pub parent: Option<Rc<Context>>,
    /// Where `parent` was when it entered this frame.
    pub parent_entry_pos: Option<Position>,
    pub symbol_table: SymbolTable,
}

impl Context {
    pub fn new(
        display_name: &str,
        parent: Option<Rc<Context>>,
        parent_entry_pos: Option<Position>,
        symbol_table: SymbolTable,
    ) -> Self {
        Self {
            display_name: display_name.to_string(),
            parent,
            parent_entry_pos,
            symbol_table,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("display_name", &self.display_name)
            .field("parent", &self.parent.as_ref().map(|p| p.display_name.clone()))
            .finish()
    }
}

/// Name bindings for one scope. Cloning yields another handle to the same
/// scope; the parent chain is independent of the Context chain.
#[derive(Clone, Default)]
pub struct SymbolTable {
    inner: Rc<RefCell<Scope>>,
}

#[derive(Default)]
struct Scope {
    symbols: HashMap<String, Value>,
    parent: Option<SymbolTable>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new empty scope whose misses fall through to `self`.
    pub fn child(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Scope {
                symbols: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Look `name` up here, then in each parent in turn.
    pub fn get(&self, name: &str) -> Option<Value> {
        let scope = self.inner.borrow();
        match scope.symbols.get(name) {
            Some(value) => Some(value.clone()),
            None => scope.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    /// Bind in this scope, shadowing any parent binding.
    pub fn set(&self, name: &str, value: Value) {
        self.inner
            .borrow_mut()
            .symbols
            .insert(name.to_string(), value);
    }

    /// Drop the local binding only; parents are untouched.
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.inner.borrow_mut().symbols.remove(name)
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.inner.borrow().symbols.contains_key(name)
    }

    pub fn parent(&self) -> Option<SymbolTable> {
        self.inner.borrow().parent.clone()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.borrow().symbols.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn ptr_eq(&self, other: &SymbolTable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

// Values can hold the table they were defined in, so only names are shown.
impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("names", &self.names())
            .field("has_parent", &self.parent().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(n: i64) -> Value {
        Value::number(n)
    }

    fn int_of(value: Option<Value>) -> Option<i64> {
        value.and_then(|v| v.as_number()).and_then(|n| n.as_int())
    }

    #[test]
    fn set_and_get() {
        let table = SymbolTable::new();
        table.set("x", number(10));
        table.set("y", number(20));
        assert_eq!(int_of(table.get("x")), Some(10));
        assert_eq!(int_of(table.get("y")), Some(20));
        assert!(table.get("z").is_none());
    }

    #[test]
    fn child_shadows_parent() {
        let parent = SymbolTable::new();
        parent.set("x", number(10));

        let child = parent.child();
        assert_eq!(int_of(child.get("x")), Some(10));

        child.set("x", number(20));
        assert_eq!(int_of(child.get("x")), Some(20));
        assert_eq!(int_of(parent.get("x")), Some(10));
    }

    #[test]
    fn remove_is_local() {
        let parent = SymbolTable::new();
        parent.set("x", number(10));
        let child = parent.child();
        child.set("x", number(1));

        assert!(child.remove("x").is_some());
        assert_eq!(int_of(child.get("x")), Some(10));
        assert!(child.remove("x").is_none());
        assert_eq!(int_of(parent.get("x")), Some(10));
    }

    #[test]
    fn zero_is_still_present() {
        let parent = SymbolTable::new();
        parent.set("flag", number(0));
        let child = parent.child();
        assert_eq!(int_of(child.get("flag")), Some(0));
    }

    #[test]
    fn clones_share_the_scope() {
        let table = SymbolTable::new();
        let alias = table.clone();
        alias.set("shared", number(1));
        assert!(table.contains_local("shared"));
        assert!(table.ptr_eq(&alias));
    }
}
