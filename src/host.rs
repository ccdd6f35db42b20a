use crate::value::Number;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::{self, BufRead, Write};

/// Everything the interpreter needs from the outside world.
pub trait Host {
    fn write_line(&mut self, text: &str) -> io::Result<()>;

    /// One line of input without its terminator. End of input is an
    /// `UnexpectedEof` error.
    fn read_line(&mut self) -> io::Result<String>;

    /// Read lines until one parses as a number, complaining about each one
    /// that does not.
    fn read_number_line(&mut self) -> io::Result<Number> {
        loop {
            let text = self.read_line()?;
            match parse_number(&text) {
                Some(number) => return Ok(number),
                None => self.write_line(&format!("'{}' must be a number. Try again!", text))?,
            }
        }
    }

    fn clear_screen(&mut self) -> io::Result<()>;

    fn load_file(&mut self, path: &str) -> io::Result<String>;
}

/// Integers first, then floats.
pub fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    text.parse::<i64>()
        .map(Number::Int)
        .ok()
        .or_else(|| text.parse::<f64>().ok().map(Number::Float))
}

fn end_of_input() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "end of input")
}

/// The process console and filesystem.
#[derive(Debug, Default)]
pub struct StdHost;

impl Host for StdHost {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", text)?;
        stdout.flush()
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(end_of_input());
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "\x1B[2J\x1B[1;1H")?;
        stdout.flush()
    }

    fn load_file(&mut self, path: &str) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// A scripted host: input comes from a queue, output is collected, and
/// files live in a map.
#[derive(Debug, Default)]
pub struct MemoryHost {
    pub input: VecDeque<String>,
    pub output: Vec<String>,
    pub files: HashMap<String, String>,
    pub clears: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, path: &str, text: &str) -> Self {
        self.files.insert(path.to_string(), text.to_string());
        self
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }
}

impl Host for MemoryHost {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.output.push(text.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.input.pop_front().ok_or_else(end_of_input)
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn load_file(&mut self, path: &str) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("No such file or directory: '{}'", path),
            )
        })
    }
}
