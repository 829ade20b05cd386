use std::fs;
use std::io::{self, Write};

use crate::ast::{Program, Statement};
use crate::environment::Environment;
use crate::error::CmmError;
use crate::evaluator;
use crate::object::{Object, NULL};
use crate::parser;

/// Settings shared by the file runner and the REPL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Print the rendered AST instead of evaluating.
    pub print_ast: bool,
    /// Colourise diagnostics.
    pub color: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            print_ast: false,
            color: true,
        }
    }
}

/// Whether the result of `program` is worth echoing: a trailing `let`
/// only binds a name, so nothing is printed for it.
pub fn displays_result(program: &Program) -> bool {
    !matches!(program.statements.last(), Some(Statement::Let { .. }) | None)
}

pub fn run_file(path: &str, options: Options) -> Result<Object, CmmError> {
    let source = fs::read_to_string(path).map_err(|source| CmmError::Io {
        path: path.to_string(),
        source,
    })?;

    run(&source, Some(path), options)
}

pub fn run(source: &str, filename: Option<&str>, options: Options) -> Result<Object, CmmError> {
    run_with_output(source, filename, options, io::stdout().lock())
}

/// Parses and evaluates a complete script in a fresh environment, writing
/// the result to `out`. Diagnostics are reported to stderr.
pub fn run_with_output<W: Write>(
    source: &str,
    filename: Option<&str>,
    options: Options,
    mut out: W,
) -> Result<Object, CmmError> {
    let (program, errors) = parser::parse(source);
    if !errors.is_empty() {
        for error in &errors {
            error.report(source, filename, options.color);
        }
        return Err(CmmError::Parse {
            count: errors.len(),
        });
    }

    if options.print_ast {
        writeln!(out, "{}", program)?;
        return Ok(NULL);
    }

    let env = Environment::new().into_shared();
    let result = evaluator::eval(&program, &env);

    if let Object::Error(message) = &result {
        return Err(CmmError::Runtime {
            message: message.clone(),
        });
    }

    if displays_result(&program) && !matches!(result, Object::Null) {
        writeln!(out, "{}", result.inspect())?;
    }

    Ok(result)
}
