//! Tree-walking evaluator.
//!
//! Dispatch is by rule tag. Operator layers that matched a single child
//! never reach this module (the AST builder hoisted them), so every
//! multi-child arm can rely on its grammar shape: `additive` and
//! `multiplicative` alternate operand/operator/operand, `condition` has
//! exactly three children, `if_expr` alternates condition/block with an
//! optional trailing else block. Token leaves evaluate to their text as
//! a string value; that is what carries operator tokens into the
//! arithmetic and comparison arms.

use super::env::{EnvRef, Environment};
use super::error::{EvalResult, RuntimeError};
use super::object::{ArrayValue, FunctionValue, ObjectValue, Parameter};
use super::value::{self, Value};
use crate::ast::{Ast, AstRef};
use crate::parser::Rule;
use std::rc::Rc;

/// Evaluate one node in the given environment.
pub fn eval(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    match ast.rule {
        Rule::statements => eval_statements(ast, env),
        Rule::while_expr => eval_while(ast, env),
        Rule::if_expr => eval_if(ast, env),
        Rule::function => eval_function(ast, env),
        Rule::call => eval_call(ast, env),
        Rule::block => eval_statements(ast, env),
        Rule::assignment => eval_assignment(ast, env),
        Rule::logical_or => eval_logical_or(ast, env),
        Rule::logical_and => eval_logical_and(ast, env),
        Rule::condition => eval_condition(ast, env),
        Rule::unary_plus => eval_unary_plus(ast, env),
        Rule::unary_minus => eval_unary_minus(ast, env),
        Rule::unary_not => eval_unary_not(ast, env),
        Rule::additive | Rule::multiplicative => eval_binary(ast, env),
        Rule::identifier => eval_identifier(ast, env),
        Rule::object => eval_object(ast, env),
        Rule::array => eval_array(ast, env),
        Rule::undefined_literal => Ok(Value::Undefined),
        Rule::boolean => eval_boolean(ast),
        Rule::number => eval_number(ast),
        Rule::interpolated_string => eval_interpolated_string(ast, env),
        // Remaining tags are token carriers: operator texts and string
        // literal contents.
        _ => match &ast.token {
            Some(token) => Ok(Value::Str(token.clone())),
            None => Err(RuntimeError::Internal),
        },
    }
}

fn eval_statements(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let mut result = Value::Undefined;
    for node in &ast.children {
        result = eval(node, env)?;
    }
    Ok(result)
}

fn eval_while(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    while eval(&ast.children[0], env)?.to_bool()? {
        eval(&ast.children[1], env)?;
    }
    Ok(Value::Undefined)
}

fn eval_if(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let nodes = &ast.children;
    let mut i = 0;
    while i < nodes.len() {
        if i + 1 == nodes.len() {
            // Trailing else block.
            return eval(&nodes[i], env);
        }
        if eval(&nodes[i], env)?.to_bool()? {
            return eval(&nodes[i + 1], env);
        }
        i += 2;
    }
    Ok(Value::Undefined)
}

fn eval_function(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let mut params = Vec::new();
    for node in &ast.children[0].children {
        let mutable = node.children[0].token.as_deref() == Some("mut");
        let name = node.children[1]
            .token
            .clone()
            .ok_or(RuntimeError::Internal)?;
        params.push(Parameter { name, mutable });
    }

    let body: AstRef = Rc::clone(&ast.children[1]);
    let defining = Rc::clone(env);
    Ok(Value::Function(Rc::new(FunctionValue::new(
        params,
        move |call_env: EnvRef| {
            call_env.borrow_mut().append_outer(Rc::clone(&defining));
            eval(&body, &call_env)
        },
    ))))
}

fn eval_call(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let mut value = eval(&ast.children[0], env)?;

    for suffix in &ast.children[1..] {
        match suffix.original_rule {
            Rule::arguments => {
                value = apply(ast, suffix, &value, env)?;
            }
            Rule::index => {
                let array = Rc::clone(value.as_array()?);
                let index = eval(suffix, env)?.to_long()?;
                let elements = array.borrow();
                value = usize::try_from(index)
                    .ok()
                    .and_then(|i| elements.values.get(i).cloned())
                    .unwrap_or(Value::Undefined);
            }
            Rule::dot => {
                let name = suffix.token.as_deref().ok_or(RuntimeError::Internal)?;
                let property = value.get_property(name)?;
                value = match property {
                    Value::Function(function) => {
                        // Calling through the property binds `this` to
                        // the receiver.
                        let receiver = value.clone();
                        let params = Rc::clone(&function.params);
                        Value::Function(Rc::new(FunctionValue::with_params(
                            params,
                            move |call_env: EnvRef| {
                                call_env.borrow_mut().initialize(
                                    "this",
                                    receiver.clone(),
                                    false,
                                );
                                function.call(call_env)
                            },
                        )))
                    }
                    other => other,
                };
            }
            _ => return Err(RuntimeError::Internal),
        }
    }

    Ok(value)
}

/// Invoke `callee` with the argument list node of a call suffix.
///
/// All argument expressions evaluate in the caller's environment before
/// arity is checked; extra arguments are discarded. The fresh call frame
/// is seeded with `self` and the call-site position.
fn apply(call: &Ast, arguments: &Ast, callee: &Value, env: &EnvRef) -> EvalResult<Value> {
    let function = Rc::clone(callee.as_function()?);

    let mut args = Vec::with_capacity(arguments.children.len());
    for node in &arguments.children {
        args.push(eval(node, env)?);
    }
    if args.len() < function.params.len() {
        return Err(RuntimeError::Arguments);
    }

    let call_env = Environment::new().into_ref();
    {
        let mut frame = call_env.borrow_mut();
        frame.initialize("self", callee.clone(), false);
        for (param, arg) in function.params.iter().zip(args) {
            frame.initialize(&param.name, arg, param.mutable);
        }
        frame.initialize("__LINE__", Value::Long(call.line as i64), false);
        frame.initialize("__COLUMN__", Value::Long(call.column as i64), false);
    }
    function.call(call_env)
}

fn eval_assignment(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let name = ast.children[1]
        .token
        .as_deref()
        .ok_or(RuntimeError::Internal)?;
    let value = eval(&ast.children[2], env)?;

    let defined = env.borrow().has(name);
    if defined {
        env.borrow_mut().assign(name, value.clone())?;
    } else {
        let mutable = ast.children[0].token.as_deref() == Some("mut");
        env.borrow_mut().initialize(name, value.clone(), mutable);
    }
    Ok(value)
}

fn eval_logical_or(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let mut value = Value::Undefined;
    for node in &ast.children {
        value = eval(node, env)?;
        if value.to_bool()? {
            return Ok(value);
        }
    }
    Ok(value)
}

fn eval_logical_and(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let mut value = Value::Undefined;
    for node in &ast.children {
        value = eval(node, env)?;
        if !value.to_bool()? {
            return Ok(value);
        }
    }
    Ok(value)
}

fn eval_condition(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    // The grammar admits comparison chains, the language does not.
    if ast.children.len() != 3 {
        return Err(RuntimeError::Internal);
    }
    let lhs = eval(&ast.children[0], env)?;
    let operator = eval(&ast.children[1], env)?;
    let rhs = eval(&ast.children[2], env)?;
    Ok(Value::Bool(value::compare(operator.as_str()?, &lhs, &rhs)?))
}

fn eval_unary_plus(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    eval(&ast.children[1], env)
}

fn eval_unary_minus(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let operand = eval(&ast.children[1], env)?.to_long()?;
    Ok(Value::Long(operand.wrapping_neg()))
}

fn eval_unary_not(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let operand = eval(&ast.children[1], env)?.to_bool()?;
    Ok(Value::Bool(!operand))
}

fn eval_binary(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let mut acc = eval(&ast.children[0], env)?.to_long()?;
    let mut i = 1;
    while i < ast.children.len() {
        let operator = eval(&ast.children[i], env)?;
        let rhs = eval(&ast.children[i + 1], env)?.to_long()?;
        acc = match operator.as_str()? {
            "+" => acc.wrapping_add(rhs),
            "-" => acc.wrapping_sub(rhs),
            "*" => acc.wrapping_mul(rhs),
            "/" => {
                if rhs == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                acc.wrapping_div(rhs)
            }
            "%" => {
                if rhs == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                acc.wrapping_rem(rhs)
            }
            _ => return Err(RuntimeError::Internal),
        };
        i += 2;
    }
    Ok(Value::Long(acc))
}

fn eval_identifier(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let name = ast.token.as_deref().ok_or(RuntimeError::Internal)?;
    env.borrow().get(name)
}

fn eval_object(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let mut object = ObjectValue::default();
    for property in &ast.children {
        let name = property.children[0]
            .token
            .clone()
            .ok_or(RuntimeError::Internal)?;
        let value = eval(&property.children[1], env)?;
        // A duplicated property name keeps the later value.
        object.properties.insert(name, value);
    }
    Ok(Value::Object(object.into_ref()))
}

fn eval_array(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let mut array = ArrayValue::default();
    for node in &ast.children {
        array.values.push(eval(node, env)?);
    }
    Ok(Value::Array(array.into_ref()))
}

fn eval_boolean(ast: &Ast) -> EvalResult<Value> {
    Ok(Value::Bool(ast.token.as_deref() == Some("true")))
}

fn eval_number(ast: &Ast) -> EvalResult<Value> {
    let token = ast.token.as_deref().ok_or(RuntimeError::Internal)?;
    let number = token.parse::<i64>().map_err(|_| RuntimeError::Type)?;
    Ok(Value::Long(number))
}

fn eval_interpolated_string(ast: &Ast, env: &EnvRef) -> EvalResult<Value> {
    let mut out = String::new();
    for node in &ast.children {
        let value = eval(node, env)?;
        out.push_str(&value.to_string());
    }
    Ok(Value::Str(out))
}

#[cfg(test)]
mod tests {
    use super::super::builtins;
    use super::*;

    fn eval_source(source: &str) -> EvalResult<Value> {
        let env = Environment::new().into_ref();
        builtins::install(&env);
        let ast = crate::parser::parse("test.co", source).expect("parse should succeed");
        eval(&ast, &env)
    }

    fn ok(source: &str) -> Value {
        eval_source(source).expect("evaluation should succeed")
    }

    #[test]
    fn test_literals() {
        assert_eq!(ok("42"), Value::Long(42));
        assert_eq!(ok("true"), Value::Bool(true));
        assert_eq!(ok("false"), Value::Bool(false));
        assert_eq!(ok("undefined"), Value::Undefined);
        assert_eq!(ok("'hello'"), Value::Str("hello".to_string()));
        assert_eq!(ok(""), Value::Undefined);
    }

    #[test]
    fn test_statement_sequence_yields_last_value() {
        assert_eq!(ok("1; 2; 3"), Value::Long(3));
        assert_eq!(ok("1 2 3"), Value::Long(3));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(ok("1 + 2 * 3"), Value::Long(7));
        assert_eq!(ok("(1 + 2) * 3"), Value::Long(9));
        assert_eq!(ok("10 - 2 - 3"), Value::Long(5));
        assert_eq!(ok("7 / 2"), Value::Long(3));
        assert_eq!(ok("7 % 3"), Value::Long(1));
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!(ok("0 - 7 / 2"), Value::Long(-3));
        assert_eq!(ok("(0 - 7) / 2"), Value::Long(-3));
        assert_eq!(ok("(0 - 7) % 2"), Value::Long(-1));
        assert_eq!(ok("7 % (0 - 2)"), Value::Long(1));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval_source("1 / 0"), Err(RuntimeError::DivisionByZero));
        assert_eq!(eval_source("1 % 0"), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn test_bool_coerces_in_arithmetic() {
        assert_eq!(ok("true + true"), Value::Long(2));
        assert_eq!(eval_source("1 + 'x'"), Err(RuntimeError::Type));
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(ok("-5"), Value::Long(-5));
        assert_eq!(ok("+5"), Value::Long(5));
        assert_eq!(ok("-true"), Value::Long(-1));
        assert_eq!(ok("!true"), Value::Bool(false));
        assert_eq!(ok("!0"), Value::Bool(true));
        assert_eq!(eval_source("!'x'"), Err(RuntimeError::Type));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(ok("1 < 2"), Value::Bool(true));
        assert_eq!(ok("2 <= 1"), Value::Bool(false));
        assert_eq!(ok("'abc' < 'abd'"), Value::Bool(true));
        assert_eq!(ok("1 == 1"), Value::Bool(true));
        assert_eq!(ok("undefined == undefined"), Value::Bool(true));
        assert_eq!(ok("undefined < undefined"), Value::Bool(false));
        assert_eq!(eval_source("1 == 'one'"), Err(RuntimeError::Type));
        assert_eq!(eval_source("[] == []"), Err(RuntimeError::Type));
    }

    #[test]
    fn test_comparison_chain_is_rejected() {
        assert_eq!(eval_source("1 < 2 < 3"), Err(RuntimeError::Internal));
    }

    #[test]
    fn test_logical_operators_return_operands() {
        assert_eq!(ok("false || 7"), Value::Long(7));
        assert_eq!(ok("3 || 7"), Value::Long(3));
        assert_eq!(ok("3 && 7"), Value::Long(7));
        assert_eq!(ok("0 && 7"), Value::Long(0));
    }

    #[test]
    fn test_short_circuit_skips_right_operand() {
        assert_eq!(ok("true || 1 / 0"), Value::Bool(true));
        assert_eq!(ok("false && 1 / 0"), Value::Bool(false));
    }

    #[test]
    fn test_assignment_and_mutation() {
        assert_eq!(ok("mut x = 1; x = 2; x"), Value::Long(2));
        assert_eq!(ok("x = 1; x + 1"), Value::Long(2));
        // The assignment expression yields the assigned value.
        assert_eq!(ok("mut x = 0; x = 5"), Value::Long(5));
    }

    #[test]
    fn test_immutable_assignment_fails() {
        assert_eq!(
            eval_source("x = 1; x = 2"),
            Err(RuntimeError::immutable_variable("x"))
        );
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            eval_source("nope"),
            Err(RuntimeError::undefined_variable("nope"))
        );
    }

    #[test]
    fn test_assignment_updates_outer_binding() {
        assert_eq!(
            ok("mut n = 0; bump = fn() { n = n + 1 }; bump(); bump(); n"),
            Value::Long(2)
        );
    }

    #[test]
    fn test_while_loop() {
        assert_eq!(ok("mut i = 0; while i < 3 { i = i + 1 }; i"), Value::Long(3));
        assert_eq!(ok("while false { 1 }"), Value::Undefined);
    }

    #[test]
    fn test_if_chains() {
        assert_eq!(ok("if true { 1 } else { 2 }"), Value::Long(1));
        assert_eq!(ok("if false { 1 } else { 2 }"), Value::Long(2));
        assert_eq!(
            ok("x = 2; if x == 1 { 'a' } else if x == 2 { 'b' } else { 'c' }"),
            Value::Str("b".to_string())
        );
        assert_eq!(ok("if false { 1 }"), Value::Undefined);
    }

    #[test]
    fn test_block_yields_last_statement() {
        assert_eq!(ok("if true { 1; 2; 3 }"), Value::Long(3));
        assert_eq!(ok("if true { }"), Value::Undefined);
    }

    #[test]
    fn test_function_call() {
        assert_eq!(ok("add = fn(a, b) { a + b }; add(1, 2)"), Value::Long(3));
        assert_eq!(ok("fn() { 7 }()"), Value::Long(7));
    }

    #[test]
    fn test_call_with_too_few_arguments() {
        assert_eq!(
            eval_source("f = fn(a, b) { a }; f(1)"),
            Err(RuntimeError::Arguments)
        );
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        assert_eq!(ok("f = fn(a) { a }; f(1, 2, 3)"), Value::Long(1));
    }

    #[test]
    fn test_mut_parameter_is_assignable() {
        assert_eq!(ok("f = fn(mut a) { a = a + 1; a }; f(1)"), Value::Long(2));
        assert_eq!(
            eval_source("f = fn(a) { a = 2 }; f(1)"),
            Err(RuntimeError::immutable_variable("a"))
        );
    }

    #[test]
    fn test_closure_captures_definition_environment() {
        assert_eq!(ok("mk = fn(n) { fn() { n } }; f = mk(7); f()"), Value::Long(7));
    }

    #[test]
    fn test_closures_share_captured_frame() {
        let source = "
            mk = fn() {
                mut n = 0
                fn() { n = n + 1; n }
            }
            counter = mk()
            counter(); counter(); counter()
        ";
        assert_eq!(ok(source), Value::Long(3));
    }

    #[test]
    fn test_recursion_by_name() {
        let source = "
            fib = fn(n) { if n < 2 { n } else { fib(n - 1) + fib(n - 2) } }
            fib(10)
        ";
        assert_eq!(ok(source), Value::Long(55));
    }

    #[test]
    fn test_recursion_through_self() {
        let source = "fn(n) { if n < 2 { n } else { self(n - 1) + self(n - 2) } }(10)";
        assert_eq!(ok(source), Value::Long(55));
    }

    #[test]
    fn test_object_literal_and_dot() {
        assert_eq!(ok("p = {x: 1, y: 2}; p.x + p.y"), Value::Long(3));
        assert_eq!(ok("{x: 1, x: 2}.x"), Value::Long(2));
        assert_eq!(ok("{}.size()"), Value::Long(0));
        assert_eq!(ok("{a: 1}.size()"), Value::Long(1));
    }

    #[test]
    fn test_missing_property() {
        assert_eq!(
            eval_source("{x: 1}.y"),
            Err(RuntimeError::undefined_property("y"))
        );
    }

    #[test]
    fn test_array_literal_index_and_builtins() {
        assert_eq!(ok("a = [10, 20, 30]; a[1]"), Value::Long(20));
        assert_eq!(ok("a = [10, 20, 30]; a.size() + a[1]"), Value::Long(23));
        assert_eq!(ok("a = [1]; a.push(2); a.size()"), Value::Long(2));
        assert_eq!(ok("a = [1]; a.push(2); a[1]"), Value::Long(2));
        assert_eq!(ok("[[1], [2, 3]][1][0]"), Value::Long(2));
    }

    #[test]
    fn test_index_out_of_range_is_undefined() {
        assert_eq!(ok("[1, 2][5]"), Value::Undefined);
        assert_eq!(ok("[1, 2][0 - 1]"), Value::Undefined);
    }

    #[test]
    fn test_index_on_non_array_is_type_error() {
        assert_eq!(eval_source("1[0]"), Err(RuntimeError::Type));
    }

    #[test]
    fn test_arrays_alias_on_assignment() {
        assert_eq!(ok("a = [1]; b = a; b.push(2); a.size()"), Value::Long(2));
    }

    #[test]
    fn test_this_binding_through_dot_call() {
        // `push` mutates the receiver it was accessed on.
        assert_eq!(ok("a = []; p = a.push; p(9); a[0]"), Value::Long(9));
    }

    #[test]
    fn test_interpolated_strings() {
        assert_eq!(ok("\"sum={1 + 2}\""), Value::Str("sum=3".to_string()));
        assert_eq!(
            ok("x = 7; \"x is {x}!\""),
            Value::Str("x is 7!".to_string())
        );
        assert_eq!(ok("\"\""), Value::Str(String::new()));
        assert_eq!(
            ok("\"{[1, 2]} and {{a: 1}}\""),
            Value::Str("[1, 2] and {\"a\": 1}".to_string())
        );
    }

    #[test]
    fn test_lone_interpolation_collapses_to_its_value() {
        // Hoisting is uniform, so a quoted string holding nothing but
        // one interpolation is that expression, not a string.
        assert_eq!(ok("\"{1 + 2}\""), Value::Long(3));
    }

    #[test]
    fn test_puts_returns_undefined() {
        assert_eq!(ok("puts('hello')"), Value::Undefined);
    }

    #[test]
    fn test_assert_reports_call_site() {
        assert_eq!(ok("assert(1 == 1)"), Value::Undefined);
        assert_eq!(
            eval_source("assert(1 == 2)"),
            Err(RuntimeError::AssertionFailed { line: 1, column: 1 })
        );
        assert_eq!(
            eval_source("x = 1;\n  assert(x == 2)"),
            Err(RuntimeError::AssertionFailed { line: 2, column: 3 })
        );
    }

    #[test]
    fn test_prelude_bindings_are_immutable() {
        assert_eq!(
            eval_source("puts = 1"),
            Err(RuntimeError::immutable_variable("puts"))
        );
    }

    #[test]
    fn test_number_literal_overflow_is_type_error() {
        assert_eq!(
            eval_source("99999999999999999999999999"),
            Err(RuntimeError::Type)
        );
    }

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(
            ok("9223372036854775807 + 1"),
            Value::Long(i64::MIN)
        );
    }
}
