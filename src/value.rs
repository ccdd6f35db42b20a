use crate::ast::{Node, TypeTag};
use crate::builtins::Builtin;
use crate::context::{Context, SymbolTable};
use crate::error::XbError;
use crate::position::Span;
use crate::stack::ensure_sufficient_stack;
use std::cell::{Ref, RefCell, RefMut};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Longest string, in bytes, that repetition may build.
pub const MAX_STRING_LEN: usize = 1 << 28;

/// A numeric value. Integer arithmetic stays integral until it overflows.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    /// The integer this number holds exactly, if any. `2.0` counts, `2.5`
    /// does not.
    pub fn as_int(self) -> Option<i64> {
        match self {
            Number::Int(n) => Some(n),
            Number::Float(n) if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 => {
                Some(n as i64)
            }
            Number::Float(_) => None,
        }
    }

    pub fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    fn combine(
        self,
        other: Number,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => match int_op(a, b) {
                Some(n) => Number::Int(n),
                None => Number::Float(float_op(a as f64, b as f64)),
            },
            (a, b) => Number::Float(float_op(a.as_f64(), b.as_f64())),
        }
    }

    pub fn add(self, other: Number) -> Number {
        self.combine(other, i64::checked_add, |a, b| a + b)
    }

    pub fn sub(self, other: Number) -> Number {
        self.combine(other, i64::checked_sub, |a, b| a - b)
    }

    pub fn mul(self, other: Number) -> Number {
        self.combine(other, i64::checked_mul, |a, b| a * b)
    }

    /// Always a float. The caller rejects a zero divisor.
    pub fn div(self, other: Number) -> Number {
        Number::Float(self.as_f64() / other.as_f64())
    }

    pub fn pow(self, other: Number) -> Number {
        self.combine(
            other,
            |base, exp| u32::try_from(exp).ok().and_then(|exp| base.checked_pow(exp)),
            f64::powf,
        )
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Int(n)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::Int(n.into())
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}

impl From<bool> for Number {
    fn from(b: bool) -> Self {
        Number::Int(b as i64)
    }
}

// Numeric comparison: `1 == 1.0`.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.partial_cmp(b),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(n) => {
                // Always show at least one decimal place for whole floats
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
        }
    }
}

/// A list's element sequence. Clones are handles to the same sequence, so
/// `append` through one binding is seen through every other.
#[derive(Clone, Default)]
pub struct List {
    elements: Rc<RefCell<Vec<Value>>>,
}

impl List {
    pub fn new(elements: Vec<Value>) -> Self {
        Self {
            elements: Rc::new(RefCell::new(elements)),
        }
    }

    pub fn borrow(&self) -> Ref<'_, Vec<Value>> {
        self.elements.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Vec<Value>> {
        self.elements.borrow_mut()
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// A detached copy of the current elements.
    pub fn snapshot(&self) -> Vec<Value> {
        self.elements.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        Rc::ptr_eq(&self.elements, &other.elements)
    }
}

// A list may contain itself, so only the length is shown.
impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("List").field("len", &self.len()).finish()
    }
}

/// Map a possibly negative index onto `0..len`.
pub fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { index + len } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// A function defined in the language.
#[derive(Debug)]
pub struct UserFunction {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Node>,
    /// `FN f() -> expr` returns its body's value without `RETURN`.
    pub auto_return: bool,
    /// The scope the definition was evaluated in.
    pub closure: SymbolTable,
}

#[derive(Debug, Clone)]
pub enum ValueKind {
    Number(Number),
    String(String),
    List(List),
    Function(Rc<UserFunction>),
    Builtin(Builtin),
}

/// A runtime value, tagged with where it came from. The span and context
/// only feed error messages.
#[derive(Debug, Clone)]
pub struct Value {
    pub kind: ValueKind,
    pub span: Span,
    pub context: Option<Rc<Context>>,
}

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            span: Span::default(),
            context: None,
        }
    }

    pub fn number(n: impl Into<Number>) -> Self {
        Self::new(ValueKind::Number(n.into()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::new(ValueKind::String(s.into()))
    }

    pub fn list(elements: Vec<Value>) -> Self {
        Self::new(ValueKind::List(List::new(elements)))
    }

    pub fn function(function: UserFunction) -> Self {
        Self::new(ValueKind::Function(Rc::new(function)))
    }

    pub fn builtin(builtin: Builtin) -> Self {
        Self::new(ValueKind::Builtin(builtin))
    }

    /// The value of statements that produce nothing.
    pub fn null() -> Self {
        Self::number(0)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_context(mut self, context: Option<Rc<Context>>) -> Self {
        self.context = context;
        self
    }

    pub fn as_number(&self) -> Option<Number> {
        match self.kind {
            ValueKind::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match &self.kind {
            ValueKind::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ValueKind::Function(_) | ValueKind::Builtin(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ValueKind::Number(_) => "num",
            ValueKind::String(_) => "text",
            ValueKind::List(_) => "list",
            ValueKind::Function(_) => "function",
            ValueKind::Builtin(_) => "built-in function",
        }
    }

    /// Whether a declaration tagged `tag` may hold this value.
    pub fn conforms_to(&self, tag: TypeTag) -> bool {
        matches!(
            (&self.kind, tag),
            (ValueKind::Number(_), TypeTag::Num)
                | (ValueKind::String(_), TypeTag::Text)
                | (ValueKind::List(_), TypeTag::List)
        )
    }

    pub fn is_true(&self) -> bool {
        match &self.kind {
            ValueKind::Number(n) => !n.is_zero(),
            ValueKind::String(s) => !s.is_empty(),
            ValueKind::List(list) => !list.is_empty(),
            ValueKind::Function(_) | ValueKind::Builtin(_) => true,
        }
    }

    /// A result computed from `self` and `other`.
    fn derive(&self, kind: ValueKind, other: &Value) -> Value {
        Value {
            kind,
            span: self.span.to(&other.span),
            context: self.context.clone(),
        }
    }

    fn derive_number(&self, n: impl Into<Number>, other: &Value) -> Value {
        self.derive(ValueKind::Number(n.into()), other)
    }

    pub fn illegal_operation(&self, other: &Value) -> XbError {
        XbError::runtime(
            self.span.to(&other.span),
            "Illegal operation".to_string(),
            self.context.clone(),
        )
    }

    fn list_index(&self, list: &List, index: Number, other: &Value, verb: &str) -> Result<usize, XbError> {
        let index = index.as_int().ok_or_else(|| self.illegal_operation(other))?;
        resolve_index(list.len(), index).ok_or_else(|| {
            XbError::runtime(
                other.span.clone(),
                format!(
                    "Element at this index could not be {} from list because index is out of bounds",
                    verb
                ),
                self.context.clone(),
            )
        })
    }

    pub fn added_to(&self, other: &Value) -> Result<Value, XbError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(self.derive_number(a.add(*b), other)),
            (ValueKind::String(a), ValueKind::String(b)) => {
                Ok(self.derive(ValueKind::String(format!("{}{}", a, b)), other))
            }
            (ValueKind::List(list), _) => {
                let mut elements = list.snapshot();
                elements.push(other.clone());
                Ok(self.derive(ValueKind::List(List::new(elements)), other))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn subbed_by(&self, other: &Value) -> Result<Value, XbError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(self.derive_number(a.sub(*b), other)),
            (ValueKind::List(list), ValueKind::Number(index)) => {
                let index = self.list_index(list, *index, other, "removed")?;
                let mut elements = list.snapshot();
                elements.remove(index);
                Ok(self.derive(ValueKind::List(List::new(elements)), other))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn multed_by(&self, other: &Value) -> Result<Value, XbError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(self.derive_number(a.mul(*b), other)),
            (ValueKind::String(s), ValueKind::Number(count)) => {
                let count = count.as_int().ok_or_else(|| self.illegal_operation(other))?;
                let count = usize::try_from(count).unwrap_or(0);
                if s.len().checked_mul(count).map_or(true, |len| len > MAX_STRING_LEN) {
                    return Err(XbError::runtime(
                        self.span.to(&other.span),
                        "String is too long".to_string(),
                        self.context.clone(),
                    ));
                }
                Ok(self.derive(ValueKind::String(s.repeat(count)), other))
            }
            (ValueKind::List(a), ValueKind::List(b)) => {
                let mut elements = a.snapshot();
                elements.extend(b.snapshot());
                Ok(self.derive(ValueKind::List(List::new(elements)), other))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn dived_by(&self, other: &Value) -> Result<Value, XbError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                if b.is_zero() {
                    return Err(XbError::runtime(
                        other.span.clone(),
                        "Division by zero".to_string(),
                        self.context.clone(),
                    ));
                }
                Ok(self.derive_number(a.div(*b), other))
            }
            (ValueKind::List(list), ValueKind::Number(index)) => {
                let index = self.list_index(list, *index, other, "retrieved")?;
                Ok(list.borrow()[index].clone())
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn powed_by(&self, other: &Value) -> Result<Value, XbError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(self.derive_number(a.pow(*b), other)),
            _ => Err(self.illegal_operation(other)),
        }
    }

    fn compared_by(&self, other: &Value, test: fn(&Number, &Number) -> bool) -> Result<Value, XbError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(self.derive_number(test(a, b), other)),
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn comparison_eq(&self, other: &Value) -> Result<Value, XbError> {
        self.compared_by(other, Number::eq)
    }

    pub fn comparison_ne(&self, other: &Value) -> Result<Value, XbError> {
        self.compared_by(other, Number::ne)
    }

    pub fn comparison_lt(&self, other: &Value) -> Result<Value, XbError> {
        self.compared_by(other, Number::lt)
    }

    pub fn comparison_gt(&self, other: &Value) -> Result<Value, XbError> {
        self.compared_by(other, Number::gt)
    }

    pub fn comparison_lte(&self, other: &Value) -> Result<Value, XbError> {
        self.compared_by(other, Number::le)
    }

    pub fn comparison_gte(&self, other: &Value) -> Result<Value, XbError> {
        self.compared_by(other, Number::ge)
    }

    pub fn anded_by(&self, other: &Value) -> Result<Value, XbError> {
        self.compared_by(other, |a, b| !a.is_zero() && !b.is_zero())
    }

    pub fn ored_by(&self, other: &Value) -> Result<Value, XbError> {
        self.compared_by(other, |a, b| !a.is_zero() || !b.is_zero())
    }

    pub fn notted(&self) -> Result<Value, XbError> {
        match self.kind {
            ValueKind::Number(n) => Ok(self.derive_number(n.is_zero(), self)),
            _ => Err(self.illegal_operation(self)),
        }
    }

    /// The quoted form used inside list literals.
    pub fn repr(&self) -> String {
        self.render(true, &mut Vec::new())
    }

    /// `enclosing` holds the lists being rendered further up; meeting one
    /// of them again prints `[...]` instead of recursing forever.
    fn render(&self, quoted: bool, enclosing: &mut Vec<List>) -> String {
        match &self.kind {
            ValueKind::Number(n) => n.to_string(),
            ValueKind::String(s) if quoted => format!("\"{}\"", s),
            ValueKind::String(s) => s.clone(),
            ValueKind::List(list) => {
                if enclosing.iter().any(|outer| outer.ptr_eq(list)) {
                    return "[...]".to_string();
                }

                enclosing.push(list.clone());
                let mut items = Vec::with_capacity(list.len());
                for item in list.borrow().iter() {
                    items.push(ensure_sufficient_stack(|| item.render(quoted, enclosing)));
                }
                enclosing.pop();

                if quoted {
                    format!("[{}]", items.join(", "))
                } else {
                    items.join(", ")
                }
            }
            ValueKind::Function(function) => format!("<function {}>", function.name),
            ValueKind::Builtin(builtin) => format!("<built-in function {}>", builtin.name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.render(false, &mut Vec::new()))
    }
}
