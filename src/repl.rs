use std::io::{self, BufRead, Write};

use crate::evaluator::Evaluator;
use crate::parser;
use crate::runner::{displays_result, Options};

pub const PROMPT: &str = ">> ";

pub fn banner(user: &str) -> String {
    format!(
        "Hello {}! This is the cmm programming language!\nFeel free to type in commands",
        user
    )
}

/// Runs the read-eval-print loop until end of input or an exit command.
/// Bindings persist across lines through one shared environment.
pub fn start<R: BufRead, W: Write>(input: R, mut output: W, options: Options) -> io::Result<()> {
    let mut evaluator = Evaluator::new();
    let mut lines = input.lines();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let Some(line) = lines.next() else {
            // EOF reached (Ctrl+D or piped input ended)
            writeln!(output)?;
            break;
        };

        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "exit()" | "quit") {
            writeln!(output, "Goodbye!")?;
            break;
        }

        run_repl_command(line, &mut evaluator, options, &mut output)?;
    }

    Ok(())
}

fn run_repl_command<W: Write>(
    source: &str,
    evaluator: &mut Evaluator,
    options: Options,
    output: &mut W,
) -> io::Result<()> {
    let (program, errors) = parser::parse(source);
    if !errors.is_empty() {
        for error in &errors {
            error.write_report(source, None, options.color, &mut *output)?;
        }
        return Ok(());
    }

    if options.print_ast {
        return writeln!(output, "{}", program);
    }

    let result = evaluator.evaluate_program(&program);
    if displays_result(&program) {
        writeln!(output, "{}", result.inspect())?;
    }

    Ok(())
}
