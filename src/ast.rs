use crate::position::Span;
use crate::value::Number;
use std::fmt;
use std::rc::Rc;

/// One node of the syntax tree. Every node carries the span of the source
/// text it was parsed from.
#[derive(Debug, Clone)]
pub enum Node {
    Number {
        value: Number,
        span: Span,
    },
    String {
        value: String,
        span: Span,
    },
    /// A `[...]` literal, and also a statement list.
    List {
        elements: Vec<Node>,
        span: Span,
    },
    VarAccess {
        name: String,
        span: Span,
    },
    VarAssign {
        name: String,
        value: Box<Node>,
        dtype: TypeTag,
        span: Span,
    },
    BinaryOp {
        left: Box<Node>,
        operator: BinaryOp,
        right: Box<Node>,
        span: Span,
    },
    UnaryOp {
        operator: UnaryOp,
        operand: Box<Node>,
        span: Span,
    },
    If {
        cases: Vec<IfCase>,
        else_case: Option<ElseCase>,
        span: Span,
    },
    For {
        var_name: String,
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
        body: Box<Node>,
        suppress_value: bool,
        span: Span,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
        suppress_value: bool,
        span: Span,
    },
    FuncDef {
        name: Option<String>,
        params: Vec<String>,
        /// Shared with every function value built from this definition.
        body: Rc<Node>,
        auto_return: bool,
        span: Span,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
        span: Span,
    },
    Return {
        value: Option<Box<Node>>,
        span: Span,
    },
    Continue {
        span: Span,
    },
    Break {
        span: Span,
    },
}

impl Node {
    pub fn span(&self) -> &Span {
        match self {
            Node::Number { span, .. } => span,
            Node::String { span, .. } => span,
            Node::List { span, .. } => span,
            Node::VarAccess { span, .. } => span,
            Node::VarAssign { span, .. } => span,
            Node::BinaryOp { span, .. } => span,
            Node::UnaryOp { span, .. } => span,
            Node::If { span, .. } => span,
            Node::For { span, .. } => span,
            Node::While { span, .. } => span,
            Node::FuncDef { span, .. } => span,
            Node::Call { span, .. } => span,
            Node::Return { span, .. } => span,
            Node::Continue { span } => span,
            Node::Break { span } => span,
        }
    }
}

/// An `IF` or `ELIF` arm.
#[derive(Debug, Clone)]
pub struct IfCase {
    pub condition: Node,
    pub body: Node,
    /// Block arms evaluate to null rather than their statement list.
    pub suppress_value: bool,
}

#[derive(Debug, Clone)]
pub struct ElseCase {
    pub body: Box<Node>,
    pub suppress_value: bool,
}

/// The declared type at an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Num,
    Text,
    List,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeTag::Num => write!(f, "num"),
            TypeTag::Text => write!(f, "text"),
            TypeTag::List => write!(f, "list"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}
