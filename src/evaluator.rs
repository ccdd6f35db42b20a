use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::builtins::Builtin;
use crate::context::{Context, SymbolTable};
use crate::error::XbError;
use crate::host::Host;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::position::Span;
use crate::stack::ensure_sufficient_stack;
use crate::value::{Number, UserFunction, Value, ValueKind};
use std::rc::Rc;
use tracing::{debug, trace};

/// Why evaluation stopped before producing a value.
#[derive(Debug)]
pub enum Interrupt {
    Return(Value),
    Continue(Span),
    Break(Span),
    Error(XbError),
}

impl From<XbError> for Interrupt {
    fn from(error: XbError) -> Self {
        Interrupt::Error(error)
    }
}

/// The outcome of evaluating one node.
pub type Flow = Result<Value, Interrupt>;

/// Calls (user functions and builtins, `RUN` included) that may be active
/// at once.
pub const MAX_CALL_DEPTH: usize = 1000;

/// A tree-walking evaluator bound to a host and a global scope.
pub struct Interpreter<'h> {
    host: &'h mut dyn Host,
    globals: SymbolTable,
    depth: usize,
}

impl<'h> Interpreter<'h> {
    pub fn new(host: &'h mut dyn Host, globals: SymbolTable) -> Self {
        Self {
            host,
            globals,
            depth: 0,
        }
    }

    pub fn host(&mut self) -> &mut (dyn Host + 'h) {
        &mut *self.host
    }

    /// Lex, parse and evaluate `text` as a program whose scope is the
    /// global table.
    pub fn run_source(&mut self, name: &str, text: &str) -> Result<Value, XbError> {
        debug!(script = name, "run started");

        let tokens = Lexer::new(name, text).make_tokens()?;
        trace!(count = tokens.len(), "lexed");
        let program = Parser::new(tokens).parse()?;

        let context = Rc::new(Context::new("<program>", None, None, self.globals.clone()));
        let result = match self.visit(&program, &context) {
            Ok(value) | Err(Interrupt::Return(value)) => Ok(value),
            Err(Interrupt::Error(error)) => Err(error),
            Err(Interrupt::Continue(span)) => Err(outside_loop("CONTINUE", span, &context)),
            Err(Interrupt::Break(span)) => Err(outside_loop("BREAK", span, &context)),
        };

        debug!(script = name, ok = result.is_ok(), "run finished");
        result
    }

    pub fn visit(&mut self, node: &Node, context: &Rc<Context>) -> Flow {
        ensure_sufficient_stack(|| self.visit_node(node, context))
    }

    fn visit_node(&mut self, node: &Node, context: &Rc<Context>) -> Flow {
        let here = Some(context.clone());

        match node {
            Node::Number { value, span } => Ok(Value::number(*value)
                .with_span(span.clone())
                .with_context(here)),

            Node::String { value, span } => Ok(Value::string(value.as_str())
                .with_span(span.clone())
                .with_context(here)),

            Node::List { elements, span } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.visit(element, context)?);
                }
                Ok(Value::list(values).with_span(span.clone()).with_context(here))
            }

            Node::VarAccess { name, span } => {
                let value = context.symbol_table.get(name).ok_or_else(|| {
                    XbError::runtime(span.clone(), format!("'{}' is not defined", name), here.clone())
                })?;
                Ok(value.with_span(span.clone()).with_context(here))
            }

            Node::VarAssign {
                name,
                value,
                dtype,
                span,
            } => {
                let value = self.visit(value, context)?;
                if !value.conforms_to(*dtype) {
                    return Err(XbError::runtime(
                        span.clone(),
                        format!(
                            "no viable conversion from '{}' to '{}'",
                            value.type_name(),
                            dtype
                        ),
                        here,
                    )
                    .into());
                }
                context.symbol_table.set(name, value.clone());
                Ok(value)
            }

            Node::BinaryOp {
                left,
                operator,
                right,
                span,
            } => {
                let left = self.visit(left, context)?;
                let right = self.visit(right, context)?;
                let result = match operator {
                    BinaryOp::Add => left.added_to(&right),
                    BinaryOp::Subtract => left.subbed_by(&right),
                    BinaryOp::Multiply => left.multed_by(&right),
                    BinaryOp::Divide => left.dived_by(&right),
                    BinaryOp::Power => left.powed_by(&right),
                    BinaryOp::Equal => left.comparison_eq(&right),
                    BinaryOp::NotEqual => left.comparison_ne(&right),
                    BinaryOp::Less => left.comparison_lt(&right),
                    BinaryOp::Greater => left.comparison_gt(&right),
                    BinaryOp::LessEqual => left.comparison_lte(&right),
                    BinaryOp::GreaterEqual => left.comparison_gte(&right),
                    BinaryOp::And => left.anded_by(&right),
                    BinaryOp::Or => left.ored_by(&right),
                }?;
                Ok(result.with_span(span.clone()))
            }

            Node::UnaryOp {
                operator,
                operand,
                span,
            } => {
                let operand = self.visit(operand, context)?;
                let result = match operator {
                    UnaryOp::Negate => operand.multed_by(&Value::number(-1).with_span(span.clone())),
                    UnaryOp::Not => operand.notted(),
                }?;
                Ok(result.with_span(span.clone()))
            }

            Node::If {
                cases, else_case, ..
            } => {
                for case in cases {
                    let condition = self.visit(&case.condition, context)?;
                    if condition.is_true() {
                        let value = self.visit(&case.body, context)?;
                        return Ok(if case.suppress_value { Value::null() } else { value });
                    }
                }

                match else_case {
                    Some(else_case) => {
                        let value = self.visit(&else_case.body, context)?;
                        Ok(if else_case.suppress_value { Value::null() } else { value })
                    }
                    None => Ok(Value::null()),
                }
            }

            Node::For {
                var_name,
                start,
                end,
                step,
                body,
                suppress_value,
                span,
            } => {
                let start = self.loop_bound(start, context)?;
                let end = self.loop_bound(end, context)?;
                let step = match step {
                    Some(step) => self.loop_bound(step, context)?,
                    None => Number::Int(1),
                };
                let ascending = step.as_f64() >= 0.0;

                let mut elements = Vec::new();
                let mut i = start;
                while (ascending && i < end) || (!ascending && i > end) {
                    context.symbol_table.set(var_name, Value::number(i).with_span(span.clone()));
                    i = i.add(step);

                    match self.visit(body, context) {
                        Ok(value) => elements.push(value),
                        Err(Interrupt::Continue(_)) => continue,
                        Err(Interrupt::Break(_)) => break,
                        Err(interrupt) => return Err(interrupt),
                    }
                }

                Ok(collected(elements, *suppress_value, span, context))
            }

            Node::While {
                condition,
                body,
                suppress_value,
                span,
            } => {
                let mut elements = Vec::new();
                loop {
                    if !self.visit(condition, context)?.is_true() {
                        break;
                    }

                    match self.visit(body, context) {
                        Ok(value) => elements.push(value),
                        Err(Interrupt::Continue(_)) => continue,
                        Err(Interrupt::Break(_)) => break,
                        Err(interrupt) => return Err(interrupt),
                    }
                }

                Ok(collected(elements, *suppress_value, span, context))
            }

            Node::FuncDef {
                name,
                params,
                body,
                auto_return,
                span,
            } => {
                let function = UserFunction {
                    name: name.clone().unwrap_or_else(|| "<anonymous>".to_string()),
                    params: params.clone(),
                    body: body.clone(),
                    auto_return: *auto_return,
                    closure: context.symbol_table.clone(),
                };
                let value = Value::function(function)
                    .with_span(span.clone())
                    .with_context(here);

                if let Some(name) = name {
                    context.symbol_table.set(name, value.clone());
                }
                Ok(value)
            }

            Node::Call { callee, args, span } => {
                let callee = self.visit(callee, context)?.with_span(span.clone());

                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.visit(arg, context)?);
                }

                let result = self.call(&callee, values)?;
                Ok(result.with_span(span.clone()).with_context(here))
            }

            Node::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.visit(value, context)?,
                    None => Value::null(),
                };
                Err(Interrupt::Return(value))
            }

            Node::Continue { span } => Err(Interrupt::Continue(span.clone())),

            Node::Break { span } => Err(Interrupt::Break(span.clone())),
        }
    }

    fn loop_bound(&mut self, node: &Node, context: &Rc<Context>) -> Result<Number, Interrupt> {
        let value = self.visit(node, context)?;
        value.as_number().ok_or_else(|| {
            XbError::runtime(
                node.span().clone(),
                format!("Loop bound must be a number, not '{}'", value.type_name()),
                Some(context.clone()),
            )
            .into()
        })
    }

    /// Invoke a callable with evaluated arguments. `callee` carries the
    /// call-site span and the caller's context.
    pub fn call(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, XbError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(XbError::runtime(
                callee.span.clone(),
                "Maximum recursion depth exceeded".to_string(),
                callee.context.clone(),
            ));
        }

        self.depth += 1;
        let result = match &callee.kind {
            ValueKind::Function(function) => self.call_function(callee, function.clone(), args),
            ValueKind::Builtin(builtin) => self.call_builtin(callee, *builtin, args),
            _ => Err(callee.illegal_operation(callee)),
        };
        self.depth -= 1;
        result
    }

    fn call_function(
        &mut self,
        callee: &Value,
        function: Rc<UserFunction>,
        args: Vec<Value>,
    ) -> Result<Value, XbError> {
        check_arity(callee, function.params.len(), args.len())?;
        debug!(function = %function.name, args = args.len(), "entering function");

        let frame = Rc::new(Context::new(
            &function.name,
            callee.context.clone(),
            Some(callee.span.start.clone()),
            function.closure.child(),
        ));
        for (param, arg) in function.params.iter().zip(args) {
            frame.symbol_table.set(param, arg);
        }

        match self.visit(&function.body, &frame) {
            Ok(value) if function.auto_return => Ok(value),
            Ok(_) => Ok(Value::null()),
            Err(Interrupt::Return(value)) => Ok(value),
            Err(Interrupt::Error(error)) => Err(error),
            Err(Interrupt::Continue(span)) => Err(outside_loop("CONTINUE", span, &frame)),
            Err(Interrupt::Break(span)) => Err(outside_loop("BREAK", span, &frame)),
        }
    }

    fn call_builtin(
        &mut self,
        callee: &Value,
        builtin: Builtin,
        args: Vec<Value>,
    ) -> Result<Value, XbError> {
        check_arity(callee, builtin.params().len(), args.len())?;
        trace!(builtin = builtin.name(), args = args.len(), "calling builtin");

        let frame = Rc::new(Context::new(
            builtin.name(),
            callee.context.clone(),
            Some(callee.span.start.clone()),
            self.globals.child(),
        ));
        builtin.execute(self, &callee.span, &args, &frame)
    }
}

fn check_arity(callee: &Value, expected: usize, got: usize) -> Result<(), XbError> {
    let details = if got > expected {
        format!("{} too many args passed into {}", got - expected, callee)
    } else if got < expected {
        format!("{} too few args passed into {}", expected - got, callee)
    } else {
        return Ok(());
    };
    Err(XbError::runtime(callee.span.clone(), details, callee.context.clone()))
}

/// A loop's value: everything its body produced, or null for block loops.
fn collected(elements: Vec<Value>, suppress_value: bool, span: &Span, context: &Rc<Context>) -> Value {
    if suppress_value {
        Value::null()
    } else {
        Value::list(elements)
            .with_span(span.clone())
            .with_context(Some(context.clone()))
    }
}

/// A loop signal that reached a function or program boundary.
fn outside_loop(keyword: &str, span: Span, context: &Rc<Context>) -> XbError {
    XbError::runtime(
        span,
        format!("'{}' used outside of a loop", keyword),
        Some(context.clone()),
    )
}
