use std::rc::Rc;

use crate::ast::{BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement};
use crate::environment::{Env, Environment};
use crate::object::{Function, Object, NULL};

macro_rules! new_error {
    ($($arg:tt)*) => {
        Object::Error(format!($($arg)*))
    };
}

/// Evaluates a whole program against `env`.
///
/// A top-level `return` ends the program with its payload and the first
/// runtime error ends it with that error; otherwise the value of the last
/// statement is the result.
pub fn eval(program: &Program, env: &Env) -> Object {
    let mut result = NULL;

    for statement in &program.statements {
        result = eval_statement(statement, env);

        match result {
            Object::ReturnValue(value) => return *value,
            Object::Error(_) => return result,
            _ => {}
        }
    }

    result
}

// Unlike `eval`, an in-flight return is passed up still wrapped so that it
// keeps unwinding through nested blocks until a call boundary.
fn eval_block_statement(block: &BlockStatement, env: &Env) -> Object {
    let mut result = NULL;

    for statement in &block.statements {
        result = eval_statement(statement, env);

        if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
            return result;
        }
    }

    result
}

fn eval_statement(statement: &Statement, env: &Env) -> Object {
    tracing::trace!(%statement, "eval statement");

    match statement {
        Statement::Let { name, value } => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return value;
            }
            env.borrow_mut().set(name.name.as_str(), value);
            NULL
        }
        Statement::Return { value } => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return value;
            }
            Object::ReturnValue(Box::new(value))
        }
        Statement::Expression { expr } => eval_expression(expr, env),
        Statement::Block(block) => eval_block_statement(block, env),
    }
}

fn eval_expression(expression: &Expression, env: &Env) -> Object {
    match expression {
        Expression::Identifier(ident) => eval_identifier(&ident.name, env),
        Expression::IntegerLiteral(value) => Object::Integer(*value),
        Expression::BooleanLiteral(value) => Object::from(*value),
        Expression::Prefix { operator, operand } => {
            let operand = eval_expression(operand, env);
            if operand.is_error() {
                return operand;
            }
            eval_prefix_expression(*operator, operand)
        }
        Expression::Infix {
            operator,
            left,
            right,
        } => {
            let left = eval_expression(left, env);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_infix_expression(*operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, env);
            if condition.is_error() {
                return condition;
            }

            if condition.is_truthy() {
                eval_block_statement(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block_statement(alternative, env)
            } else {
                NULL
            }
        }
        Expression::FunctionLiteral { parameters, body } => Object::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        })),
        Expression::Call { callee, arguments } => {
            let function = eval_expression(callee, env);
            if function.is_error() {
                return function;
            }

            match eval_expressions(arguments, env) {
                Ok(arguments) => apply_function(function, arguments),
                Err(error) => error,
            }
        }
    }
}

fn eval_identifier(name: &str, env: &Env) -> Object {
    env.borrow()
        .get(name)
        .unwrap_or_else(|| new_error!("NOT FOUND: undefined identifier - {}", name))
}

/// Evaluates left to right, stopping at the first error.
fn eval_expressions(expressions: &[Expression], env: &Env) -> Result<Vec<Object>, Object> {
    let mut values = Vec::with_capacity(expressions.len());

    for expression in expressions {
        let value = eval_expression(expression, env);
        if value.is_error() {
            return Err(value);
        }
        values.push(value);
    }

    Ok(values)
}

fn eval_prefix_expression(operator: PrefixOperator, operand: Object) -> Object {
    match operator {
        PrefixOperator::Not => Object::from(!operand.is_truthy()),
        PrefixOperator::Negate => match operand {
            Object::Integer(value) => Object::Integer(value.wrapping_neg()),
            _ => new_error!("unknown operator: -{}", operand.type_name()),
        },
    }
}

// A return signal carrying an integer still counts as an integer operand.
fn integer_operand(object: &Object) -> Option<i64> {
    match object {
        Object::Integer(value) => Some(*value),
        Object::ReturnValue(inner) => match **inner {
            Object::Integer(value) => Some(value),
            _ => None,
        },
        _ => None,
    }
}

fn eval_infix_expression(operator: InfixOperator, left: Object, right: Object) -> Object {
    if let (Some(l), Some(r)) = (integer_operand(&left), integer_operand(&right)) {
        return eval_integer_infix_expression(operator, l, r);
    }

    match operator {
        InfixOperator::Equal => Object::from(left.is_same(&right)),
        InfixOperator::NotEqual => Object::from(!left.is_same(&right)),
        _ if left.type_name() != right.type_name() => new_error!(
            "type mismatch: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        ),
        _ => new_error!(
            "unknown operator: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        ),
    }
}

fn eval_integer_infix_expression(operator: InfixOperator, left: i64, right: i64) -> Object {
    match operator {
        InfixOperator::Add => Object::Integer(left.wrapping_add(right)),
        InfixOperator::Subtract => Object::Integer(left.wrapping_sub(right)),
        InfixOperator::Multiply => Object::Integer(left.wrapping_mul(right)),
        InfixOperator::Divide => {
            if right == 0 {
                new_error!("division by zero: {} / 0", left)
            } else {
                Object::Integer(left.wrapping_div(right))
            }
        }
        InfixOperator::Less => Object::from(left < right),
        InfixOperator::Greater => Object::from(left > right),
        InfixOperator::Equal => Object::from(left == right),
        InfixOperator::NotEqual => Object::from(left != right),
    }
}

fn apply_function(callee: Object, arguments: Vec<Object>) -> Object {
    let function = match callee {
        Object::Function(function) => function,
        other => return new_error!("not a function: {}", other.type_name()),
    };

    if arguments.len() != function.parameters.len() {
        return new_error!(
            "wrong number of arguments: want={}, got={}",
            function.parameters.len(),
            arguments.len()
        );
    }

    tracing::debug!(arity = arguments.len(), "calling function");

    let mut scope = Environment::new_enclosed(Rc::clone(&function.env));
    for (parameter, argument) in function.parameters.iter().zip(arguments) {
        scope.set(parameter.name.as_str(), argument);
    }

    match eval_block_statement(&function.body, &scope.into_shared()) {
        Object::ReturnValue(value) => *value,
        result => result,
    }
}

/// Evaluation session holding one top-level environment across programs,
/// as the REPL needs.
pub struct Evaluator {
    env: Env,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_environment(Environment::new().into_shared())
    }

    pub fn with_environment(env: Env) -> Self {
        Self { env }
    }

    pub fn environment(&self) -> &Env {
        &self.env
    }

    pub fn evaluate_program(&mut self, program: &Program) -> Object {
        eval(program, &self.env)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
