// XBasic Interpreter Library
//
// A small BASIC-flavoured scripting language: a lexer and recursive-descent
// parser feeding a tree-walking evaluator, with tracebacks for runtime
// errors.

// Public modules
pub mod ast;
pub mod builtins;
pub mod cli;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod host;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod repl;
pub mod runner;
pub mod stack;
pub mod value;

// Re-export commonly used items
pub use ast::Node;
pub use context::{Context, SymbolTable};
pub use error::{ErrorKind, XbError};
pub use evaluator::Interpreter;
pub use host::{Host, MemoryHost, StdHost};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;
pub use position::{Position, Span};
pub use value::{Number, Value};

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::{run, Runtime};
