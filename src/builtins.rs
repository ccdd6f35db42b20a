use crate::context::Context;
use crate::error::XbError;
use crate::evaluator::Interpreter;
use crate::position::Span;
use crate::value::{resolve_index, Value, ValueKind};
use std::io;
use std::rc::Rc;
use tracing::debug;

/// Functions provided by the runtime rather than written in the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    PrintRet,
    Input,
    InputNum,
    Clear,
    IsNum,
    IsStr,
    IsList,
    IsFun,
    Append,
    Pop,
    Extend,
    Len,
    Run,
}

impl Builtin {
    pub const ALL: [Builtin; 14] = [
        Builtin::Print,
        Builtin::PrintRet,
        Builtin::Input,
        Builtin::InputNum,
        Builtin::Clear,
        Builtin::IsNum,
        Builtin::IsStr,
        Builtin::IsList,
        Builtin::IsFun,
        Builtin::Append,
        Builtin::Pop,
        Builtin::Extend,
        Builtin::Len,
        Builtin::Run,
    ];

    /// The global name the builtin is bound to.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::PrintRet => "print_ret",
            Builtin::Input => "input",
            Builtin::InputNum => "input_num",
            Builtin::Clear => "clear",
            Builtin::IsNum => "is_num",
            Builtin::IsStr => "is_str",
            Builtin::IsList => "is_list",
            Builtin::IsFun => "is_fun",
            Builtin::Append => "append",
            Builtin::Pop => "pop",
            Builtin::Extend => "extend",
            Builtin::Len => "len",
            Builtin::Run => "RUN",
        }
    }

    /// Parameter names. Only their count is enforced.
    pub fn params(self) -> &'static [&'static str] {
        match self {
            Builtin::Print
            | Builtin::PrintRet
            | Builtin::IsNum
            | Builtin::IsStr
            | Builtin::IsList
            | Builtin::IsFun => &["value"],
            Builtin::Input | Builtin::InputNum | Builtin::Clear => &[],
            Builtin::Append => &["list", "value"],
            Builtin::Pop => &["list", "index"],
            Builtin::Extend => &["list_a", "list_b"],
            Builtin::Len => &["list"],
            Builtin::Run => &["fn"],
        }
    }

    /// Run the builtin with already-checked arguments. `span` is the call
    /// site and `context` the frame created for this call.
    pub fn execute(
        self,
        interpreter: &mut Interpreter<'_>,
        span: &Span,
        args: &[Value],
        context: &Rc<Context>,
    ) -> Result<Value, XbError> {
        let fail = |details: String| XbError::runtime(span.clone(), details, Some(context.clone()));
        let io_fail = |error: io::Error| XbError::internal(span.clone(), error, Some(context.clone()));

        match (self, args) {
            (Builtin::Print, [value]) => {
                interpreter.host().write_line(&value.to_string()).map_err(io_fail)?;
                Ok(Value::null())
            }
            (Builtin::PrintRet, [value]) => Ok(Value::string(value.to_string())),
            (Builtin::Input, []) => {
                let text = interpreter.host().read_line().map_err(io_fail)?;
                Ok(Value::string(text))
            }
            (Builtin::InputNum, []) => {
                let number = interpreter.host().read_number_line().map_err(io_fail)?;
                Ok(Value::number(number))
            }
            (Builtin::Clear, []) => {
                interpreter.host().clear_screen().map_err(io_fail)?;
                Ok(Value::null())
            }
            (Builtin::IsNum, [value]) => {
                Ok(Value::number(matches!(value.kind, ValueKind::Number(_))))
            }
            (Builtin::IsStr, [value]) => {
                Ok(Value::number(matches!(value.kind, ValueKind::String(_))))
            }
            (Builtin::IsList, [value]) => Ok(Value::number(value.as_list().is_some())),
            (Builtin::IsFun, [value]) => Ok(Value::number(value.is_callable())),
            (Builtin::Append, [list, value]) => {
                let list = list
                    .as_list()
                    .ok_or_else(|| fail("First argument must be list".to_string()))?;
                list.borrow_mut().push(value.clone());
                Ok(Value::null())
            }
            (Builtin::Pop, [list, index]) => {
                let list = list
                    .as_list()
                    .ok_or_else(|| fail("First argument must be list".to_string()))?;
                let index = index
                    .as_number()
                    .ok_or_else(|| fail("Second argument must be number".to_string()))?;
                let position = index
                    .as_int()
                    .and_then(|index| resolve_index(list.len(), index))
                    .ok_or_else(|| {
                        fail(
                            "Element at this index could not be removed from list because index is out of bounds"
                                .to_string(),
                        )
                    })?;
                let element = list.borrow_mut().remove(position);
                Ok(element)
            }
            (Builtin::Extend, [list_a, list_b]) => {
                let list_a = list_a
                    .as_list()
                    .ok_or_else(|| fail("First argument must be list".to_string()))?;
                let list_b = list_b
                    .as_list()
                    .ok_or_else(|| fail("Second argument must be list".to_string()))?;
                // Snapshot first: both arguments may be the same list.
                let items = list_b.snapshot();
                list_a.borrow_mut().extend(items);
                Ok(Value::null())
            }
            (Builtin::Len, [list]) => {
                let list = list
                    .as_list()
                    .ok_or_else(|| fail("Argument must be list".to_string()))?;
                Ok(Value::number(list.len() as i64))
            }
            (Builtin::Run, [path]) => {
                let path = path
                    .as_str()
                    .ok_or_else(|| fail("Argument must be string".to_string()))?;
                let text = interpreter.host().load_file(path).map_err(|error| {
                    fail(format!("Failed to load script \"{}\". Error: {}", path, error))
                })?;

                debug!(script = path, "including script");
                interpreter.run_source(path, &text).map_err(|error| {
                    fail(format!(
                        "Failed to finish executing script \"{}\". Error: {}",
                        path,
                        error.as_string()
                    ))
                })?;
                Ok(Value::null())
            }
            _ => Err(fail(format!(
                "{} expects {} argument(s), got {}",
                self.name(),
                self.params().len(),
                args.len()
            ))),
        }
    }
}
