use crate::error::XbError;
use crate::host::{Host, StdHost};
use crate::runner::Runtime;
use std::io::{self, Write};

/// What the shell does with one line of input.
#[derive(Debug)]
pub enum Outcome {
    Skip,
    Exit,
    Value(String),
    Error(XbError),
}

/// Evaluate one shell line against a persistent runtime.
pub fn evaluate_line<H: Host>(runtime: &mut Runtime<H>, line: &str) -> Outcome {
    let line = line.trim();
    if line.is_empty() {
        return Outcome::Skip;
    }
    if line == "exit" || line == "quit" {
        return Outcome::Exit;
    }

    match runtime.run("<stdin>", line) {
        Ok(value) => Outcome::Value(value.to_string()),
        Err(error) => Outcome::Error(error),
    }
}

/// How the shell reports a successful line.
pub fn result_line(value: &str) -> String {
    format!("The process returned: {}", value)
}

/// Run the shell on the console. The runtime persists for the whole
/// session, so definitions carry over between lines.
pub fn start(mut runtime: Runtime<StdHost>, pretty: bool) {
    println!("XBasic Interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    loop {
        print!(">> ");
        if let Err(error) = io::stdout().flush() {
            eprintln!("Error writing prompt: {}", error);
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => match evaluate_line(&mut runtime, &line) {
                Outcome::Skip => continue,
                Outcome::Exit => {
                    println!("Goodbye!");
                    break;
                }
                Outcome::Value(text) => println!("{}", result_line(&text)),
                Outcome::Error(error) => show_error(&error, pretty),
            },
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

/// Print a diagnostic as plain text, or through ariadne when `pretty`.
pub fn show_error(error: &XbError, pretty: bool) {
    if pretty {
        if let Err(io_error) = error.report() {
            eprintln!("{}", error.as_string());
            eprintln!("(could not render report: {})", io_error);
        }
    } else {
        println!("{}", error.as_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use pretty_assertions::assert_eq;

    fn value(outcome: Outcome) -> String {
        match outcome {
            Outcome::Value(text) => text,
            other => panic!("expected a value, got {:?}", other),
        }
    }

    #[test]
    fn blank_and_exit_lines() {
        let mut runtime = Runtime::new(MemoryHost::new());
        assert!(matches!(evaluate_line(&mut runtime, "   \n"), Outcome::Skip));
        assert!(matches!(evaluate_line(&mut runtime, "quit\n"), Outcome::Exit));
        assert!(matches!(evaluate_line(&mut runtime, "exit"), Outcome::Exit));
    }

    #[test]
    fn definitions_persist_between_lines() {
        let mut runtime = Runtime::new(MemoryHost::new());
        assert_eq!(value(evaluate_line(&mut runtime, "FN double(x) -> x * 2")), "<function double>");
        assert_eq!(value(evaluate_line(&mut runtime, "double(21)")), "42");
    }

    #[test]
    fn results_are_announced() {
        let mut runtime = Runtime::new(MemoryHost::new());
        let text = value(evaluate_line(&mut runtime, "[1, 2] + 3"));
        assert_eq!(result_line(&text), "The process returned: 1, 2, 3");
    }

    #[test]
    fn errors_come_back_rendered() {
        let mut runtime = Runtime::new(MemoryHost::new());
        match evaluate_line(&mut runtime, "1 +") {
            Outcome::Error(error) => assert_eq!(
                error.as_string().lines().next(),
                Some("Invalid Syntax: Expected int, float, string, identifier, '-', '(', '[', 'IF', 'FOR', 'WHILE' or 'FN'")
            ),
            other => panic!("expected an error, got {:?}", other),
        }
    }
}
