// cmm Language Interpreter Library
//
// Front end and tree-walking evaluator for a small dynamically-typed
// scripting language: integers, booleans, `let`, `return`, `if/else`,
// first-class functions with closures.

// Public modules
pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod logging;
pub mod object;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod token;

// Re-export commonly used items
pub use ast::{Expression, Node, Program, Statement};
pub use environment::{Env, Environment};
pub use error::{CmmError, ParseError};
pub use evaluator::{eval, Evaluator};
pub use lexer::Lexer;
pub use object::{Object, FALSE, NULL, TRUE};
pub use parser::Parser;
pub use token::{Span, Token, TokenKind};

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::{run, Options};
