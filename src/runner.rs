use crate::builtins::Builtin;
use crate::context::SymbolTable;
use crate::error::{ErrorKind, XbError};
use crate::evaluator::Interpreter;
use crate::host::{Host, StdHost};
use crate::position::{Position, SourceFile, Span};
use crate::value::Value;
use std::f64::consts::PI;

/// The state shared by every program run in one session: the host and the
/// global scope. Bindings made by one run stay visible to the next.
pub struct Runtime<H: Host = StdHost> {
    globals: SymbolTable,
    host: H,
}

impl<H: Host> Runtime<H> {
    pub fn new(host: H) -> Self {
        let globals = SymbolTable::new();
        globals.set("null", Value::null());
        globals.set("FALSE", Value::number(0));
        globals.set("false", Value::number(0));
        globals.set("TRUE", Value::number(1));
        globals.set("true", Value::number(1));
        globals.set("MATH_PI", Value::number(PI));
        for builtin in Builtin::ALL {
            globals.set(builtin.name(), Value::builtin(builtin));
        }

        Self { globals, host }
    }

    /// Run `text` as a program named `name`. The value is the list of the
    /// top-level statement values, or what a top-level `RETURN` gave.
    pub fn run(&mut self, name: &str, text: &str) -> Result<Value, XbError> {
        Interpreter::new(&mut self.host, self.globals.clone()).run_source(name, text)
    }

    /// Load `path` through the host and run it.
    pub fn run_file(&mut self, path: &str) -> Result<Value, XbError> {
        let text = self.host.load_file(path).map_err(|error| {
            let source = SourceFile::new(path, "");
            XbError::new(
                ErrorKind::Internal,
                Span::single(&Position::start_of(source)),
                format!("Error reading file '{}': {}", path, error),
            )
        })?;
        self.run(path, &text)
    }

    pub fn globals(&self) -> &SymbolTable {
        &self.globals
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl Default for Runtime<StdHost> {
    fn default() -> Self {
        Self::new(StdHost)
    }
}

/// Run one program against a fresh runtime on the process console.
pub fn run(name: &str, text: &str) -> Result<Value, XbError> {
    Runtime::<StdHost>::default().run(name, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use pretty_assertions::assert_eq;

    #[test]
    fn constants_are_preloaded() {
        let runtime = Runtime::new(MemoryHost::new());
        let globals = runtime.globals();
        for name in ["null", "TRUE", "FALSE", "true", "false", "MATH_PI", "print", "RUN"] {
            assert!(globals.contains_local(name), "missing {}", name);
        }
        let pi = globals.get("MATH_PI").and_then(|v| v.as_number()).map(|n| n.as_f64());
        assert_eq!(pi, Some(PI));
    }

    #[test]
    fn runs_share_globals() {
        let mut runtime = Runtime::new(MemoryHost::new());
        assert!(runtime.run("<a>", "num counter = 41").is_ok());
        let value = runtime.run("<b>", "counter + 1").map(|v| v.to_string());
        assert_eq!(value.ok().as_deref(), Some("42"));
    }

    #[test]
    fn run_file_reads_through_the_host() {
        let host = MemoryHost::new().with_file("hello.bsx", "print(\"hi\")");
        let mut runtime = Runtime::new(host);
        assert!(runtime.run_file("hello.bsx").is_ok());
        assert_eq!(runtime.host().output(), ["hi"]);

        let error = runtime.run_file("missing.bsx").err();
        assert_eq!(error.map(|e| e.kind), Some(ErrorKind::Internal));
    }
}
