/// a module turns a String expression into a symbolic expression
///# Example
/// ```
/// use RustedODE::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("sin(t) - 0.1*y").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let parsed_function = parsed_expression.lambdify(&["t", "y"]).unwrap();
/// println!("Rust function: {}  \n", parsed_function(&[0.0, 1.0]));
/// ```
//
//   precedence, lowest first:
//     sum      :=  product (('+' | '-') product)*
//     product  :=  unary (('*' | '/') unary)*
//     unary    :=  ('-' | '+') unary | power
//     power    :=  atom (('^' | '**') unary)?          right associative
//     atom     :=  number | name '(' sum ')' | name | '(' sum ')'
use crate::numerical::ode_errors::OdeError;
use crate::symbolic::symbolic_engine::Expr;
use log::debug;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{map_res, not, opt, recognize},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
};

fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = Error<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// numbers like 2, 0.5, .5, 1e-3, 2.5E+2 (the sign belongs to the unary rule)
fn parse_number(input: &str) -> IResult<&str, Expr> {
    let mantissa = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ));
    let exponent = opt(recognize(pair(
        one_of("eE"),
        pair(opt(one_of("+-")), digit1),
    )));
    map_res(recognize(pair(mantissa, exponent)), |s: &str| {
        s.parse::<f64>().map(Expr::Const)
    })
    .parse(input)
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn parse_call_or_symbol(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = parse_identifier(input)?;
    let (after_ws, _) = multispace0(rest)?;
    if after_ws.starts_with('(') {
        let (rest, arg) = delimited(char('('), parse_sum, char(')')).parse(after_ws)?;
        match Expr::function_from_name(name, arg) {
            Some(expr) => Ok((rest, expr)),
            // unknown function name: no other rule can succeed here
            None => Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify))),
        }
    } else {
        Ok((rest, Expr::Var(name.to_string())))
    }
}

fn parse_atom(input: &str) -> IResult<&str, Expr> {
    alt((
        parse_number,
        parse_call_or_symbol,
        delimited(char('('), parse_sum, char(')')),
    ))
    .parse(input)
}

fn parse_power(input: &str) -> IResult<&str, Expr> {
    let (rest, base) = ws(parse_atom).parse(input)?;
    let (rest, exponent) = opt(preceded(alt((tag("**"), tag("^"))), parse_unary)).parse(rest)?;
    match exponent {
        Some(exponent) => Ok((rest, base.pow(exponent))),
        None => Ok((rest, base)),
    }
}

fn parse_unary(input: &str) -> IResult<&str, Expr> {
    let (rest, _) = multispace0(input)?;
    if let Some(stripped) = rest.strip_prefix('-') {
        let (rest, operand) = parse_unary(stripped)?;
        let negated = match operand {
            Expr::Const(value) => Expr::Const(-value),
            other => -other,
        };
        return Ok((rest, negated));
    }
    if let Some(stripped) = rest.strip_prefix('+') {
        return parse_unary(stripped);
    }
    parse_power(rest)
}

fn parse_product(input: &str) -> IResult<&str, Expr> {
    let (mut rest, mut acc) = parse_unary(input)?;
    loop {
        let operator = alt((terminated(char('*'), not(char('*'))), char('/')));
        match ws(operator).parse(rest) {
            Ok((next, op)) => {
                let (next, rhs) = parse_unary(next)?;
                acc = if op == '*' { acc * rhs } else { acc / rhs };
                rest = next;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((rest, acc))
}

fn parse_sum(input: &str) -> IResult<&str, Expr> {
    let (mut rest, mut acc) = parse_product(input)?;
    loop {
        match ws(one_of("+-")).parse(rest) {
            Ok((next, op)) => {
                let (next, rhs) = parse_product(next)?;
                acc = if op == '+' { acc + rhs } else { acc - rhs };
                rest = next;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((rest, acc))
}

/// parses the whole input; anything left over is an error
pub fn parse_expression_func(input: &str) -> Result<Expr, String> {
    if input.trim().is_empty() {
        return Err("empty expression".to_string());
    }
    match parse_sum(input) {
        Ok((rest, expr)) => {
            if rest.trim().is_empty() {
                Ok(expr)
            } else {
                Err(format!("unexpected input '{}'", rest.trim()))
            }
        }
        Err(nom::Err::Failure(e)) if e.code == ErrorKind::Verify => {
            Err(format!("unknown function in '{}'", e.input.trim()))
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(format!("syntax error near '{}'", e.input.trim()))
        }
        Err(nom::Err::Incomplete(_)) => Err("incomplete expression".to_string()),
    }
}

impl Expr {
    /// Parses a string into a symbolic expression.
    ///
    /// # Supported Syntax
    /// - Variables: t, y, any_name
    /// - Constants: 3.14, 2, 1e-6 (and pi, e when lambdified)
    /// - Operators: +, -, *, /, ^ or **
    /// - Functions: sin, cos, tan/tg, exp, ln/log, sqrt, abs, asin, acos, atan
    /// - Parentheses for grouping
    pub fn parse_expression(input: &str) -> Result<Expr, OdeError> {
        let expr = parse_expression_func(input).map_err(|reason| OdeError::FunctionParse {
            expression: input.to_string(),
            reason,
        })?;
        debug!("parsed '{}' into {}", input, expr);
        Ok(expr)
    }
}
