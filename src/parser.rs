use std::collections::HashMap;

use crate::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};

pub use crate::error::ParseError;

pub type PrefixParseFn = fn(&mut Parser) -> Option<Expression>;
pub type InfixParseFn = fn(&mut Parser, Expression) -> Option<Expression>;

/// Binding power of operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

impl Precedence {
    fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LeftParen => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

/// Recursive-descent statement parser with Pratt expression parsing.
///
/// Expression grammar lives in two registries keyed by token kind: prefix
/// rules start an expression, infix rules extend an already parsed left
/// operand. Errors are collected rather than returned so a single pass
/// reports as many problems as possible.
pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParseError>,
    prefix_parse_fns: HashMap<TokenKind, PrefixParseFn>,
    infix_parse_fns: HashMap<TokenKind, InfixParseFn>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Self {
            lexer,
            cur_token: Token::eof(0),
            peek_token: Token::eof(0),
            errors: Vec::new(),
            prefix_parse_fns: HashMap::new(),
            infix_parse_fns: HashMap::new(),
        };

        parser.register_prefix(TokenKind::Ident, Parser::parse_identifier);
        parser.register_prefix(TokenKind::Int, Parser::parse_integer_literal);
        parser.register_prefix(TokenKind::True, Parser::parse_boolean);
        parser.register_prefix(TokenKind::False, Parser::parse_boolean);
        parser.register_prefix(TokenKind::Bang, |p| {
            p.parse_prefix_expression(PrefixOperator::Not)
        });
        parser.register_prefix(TokenKind::Minus, |p| {
            p.parse_prefix_expression(PrefixOperator::Negate)
        });
        parser.register_prefix(TokenKind::LeftParen, Parser::parse_grouped_expression);
        parser.register_prefix(TokenKind::If, Parser::parse_if_expression);
        parser.register_prefix(TokenKind::Function, Parser::parse_function_literal);

        parser.register_infix(TokenKind::Plus, |p, left| {
            p.parse_infix_expression(left, InfixOperator::Add)
        });
        parser.register_infix(TokenKind::Minus, |p, left| {
            p.parse_infix_expression(left, InfixOperator::Subtract)
        });
        parser.register_infix(TokenKind::Asterisk, |p, left| {
            p.parse_infix_expression(left, InfixOperator::Multiply)
        });
        parser.register_infix(TokenKind::Slash, |p, left| {
            p.parse_infix_expression(left, InfixOperator::Divide)
        });
        parser.register_infix(TokenKind::Lt, |p, left| {
            p.parse_infix_expression(left, InfixOperator::Less)
        });
        parser.register_infix(TokenKind::Gt, |p, left| {
            p.parse_infix_expression(left, InfixOperator::Greater)
        });
        parser.register_infix(TokenKind::Eq, |p, left| {
            p.parse_infix_expression(left, InfixOperator::Equal)
        });
        parser.register_infix(TokenKind::NotEq, |p, left| {
            p.parse_infix_expression(left, InfixOperator::NotEqual)
        });
        parser.register_infix(TokenKind::LeftParen, Parser::parse_call_expression);

        // Fill cur_token and peek_token.
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn register_prefix(&mut self, kind: TokenKind, rule: PrefixParseFn) {
        self.prefix_parse_fns.insert(kind, rule);
    }

    pub fn register_infix(&mut self, kind: TokenKind, rule: InfixParseFn) {
        self.infix_parse_fns.insert(kind, rule);
    }

    /// Consumes the whole token stream. The returned program only holds
    /// statements that parsed completely; when the error list is non-empty
    /// the program should not be evaluated.
    pub fn parse_program(&mut self) -> (Program, Vec<ParseError>) {
        let mut program = Program::default();

        while !self.cur_token_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(statement) => program.statements.push(statement),
                None => self.synchronize(),
            }
            self.next_token();
        }

        tracing::debug!(
            statements = program.statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        (program, std::mem::take(&mut self.errors))
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.cur_token = std::mem::replace(&mut self.peek_token, next);
    }

    fn cur_token_is(&self, kind: TokenKind) -> bool {
        self.cur_token.kind == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek_token.kind)
    }

    fn cur_precedence(&self) -> Precedence {
        Precedence::of(self.cur_token.kind)
    }

    /// Advances onto the peek token if it has the expected kind, otherwise
    /// records a diagnostic and leaves the position untouched.
    fn expect_peek(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek_token_is(kind) {
            self.next_token();
            Some(())
        } else {
            self.peek_error(kind);
            None
        }
    }

    fn peek_error(&mut self, expected: TokenKind) {
        let message = format!(
            "expected next token to be {}, got {} instead",
            expected, self.peek_token.kind
        );
        self.error_at(self.peek_token.span, message);
    }

    fn no_prefix_parse_fn_error(&mut self) {
        let message = format!("no prefix parse function for {} found", self.cur_token.kind);
        self.error_at(self.cur_token.span, message);
    }

    fn error_at(&mut self, span: Span, message: String) {
        tracing::debug!(start = span.start, end = span.end, %message, "syntax error");
        self.errors.push(ParseError::new(span, message));
    }

    /// Skips the rest of a statement that failed to parse. Stops on a `;` or
    /// `}` at the statement's own nesting level, just before an enclosing
    /// `}`, or at end of input.
    fn synchronize(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.cur_token.kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon | TokenKind::RightBrace if depth == 0 => return,
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => depth -= 1,
                _ => {}
            }
            if self.peek_token_is(TokenKind::Eof)
                || (depth == 0 && self.peek_token_is(TokenKind::RightBrace))
            {
                return;
            }
            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier::new(self.cur_token.literal.as_str());

        self.expect_peek(TokenKind::Assign)?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;

        // Make semicolon optional
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Statement::Expression { expr })
    }

    /// Parses an expression whose operators all bind tighter than
    /// `precedence`. The strict comparison keeps equal-precedence operators
    /// left-associative.
    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let Some(prefix) = self.prefix_parse_fns.get(&self.cur_token.kind).copied() else {
            self.no_prefix_parse_fn_error();
            return None;
        };
        let mut left = prefix(self)?;

        while !self.peek_token_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let Some(infix) = self.infix_parse_fns.get(&self.peek_token.kind).copied() else {
                return Some(left);
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Identifier::new(
            self.cur_token.literal.as_str(),
        )))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.cur_token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral(value)),
            Err(_) => {
                let message = format!("could not parse {:?} as integer", self.cur_token.literal);
                self.error_at(self.cur_token.span, message);
                None
            }
        }
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::BooleanLiteral(self.cur_token_is(TokenKind::True)))
    }

    fn parse_prefix_expression(&mut self, operator: PrefixOperator) -> Option<Expression> {
        self.next_token();
        let operand = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix {
            operator,
            operand: Box::new(operand),
        })
    }

    fn parse_infix_expression(
        &mut self,
        left: Expression,
        operator: InfixOperator,
    ) -> Option<Expression> {
        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParen)?;
        Some(expr)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LeftParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParen)?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_token_is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LeftBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// Parses statements up to the matching `}`; expects the current token
    /// to be the opening `{` and leaves the closing `}` current.
    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        let mut block = BlockStatement::default();
        self.next_token();

        while !self.cur_token_is(TokenKind::RightBrace) && !self.cur_token_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(statement) => block.statements.push(statement),
                None => {
                    self.synchronize();
                    if self.cur_token_is(TokenKind::RightBrace) {
                        break;
                    }
                }
            }
            self.next_token();
        }

        if self.cur_token_is(TokenKind::Eof) {
            let message = format!(
                "expected next token to be {}, got {} instead",
                TokenKind::RightBrace,
                TokenKind::Eof
            );
            self.error_at(self.cur_token.span, message);
            return None;
        }

        Some(block)
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LeftParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let body = self.parse_block_statement()?;

        Some(Expression::FunctionLiteral { parameters, body })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();

        if self.peek_token_is(TokenKind::RightParen) {
            self.next_token();
            return Some(parameters);
        }

        self.expect_peek(TokenKind::Ident)?;
        parameters.push(Identifier::new(self.cur_token.literal.as_str()));

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.expect_peek(TokenKind::Ident)?;
            parameters.push(Identifier::new(self.cur_token.literal.as_str()));
        }

        self.expect_peek(TokenKind::RightParen)?;
        Some(parameters)
    }

    fn parse_call_expression(&mut self, callee: Expression) -> Option<Expression> {
        let arguments = self.parse_call_arguments()?;

        Some(Expression::Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    fn parse_call_arguments(&mut self) -> Option<Vec<Expression>> {
        let mut arguments = Vec::new();

        if self.peek_token_is(TokenKind::RightParen) {
            self.next_token();
            return Some(arguments);
        }

        self.next_token();
        arguments.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            arguments.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(TokenKind::RightParen)?;
        Some(arguments)
    }
}

/// Convenience: lex and parse `source` in one step.
pub fn parse(source: &str) -> (Program, Vec<ParseError>) {
    Parser::new(Lexer::new(source)).parse_program()
}
