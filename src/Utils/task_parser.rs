/// parse task document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" which has titles
/// and pairs key-vector of values. Values containing spaces or commas (math expressions) go in double quotes:
/// ```text
/// problem
///   function: "sin(t) - 0.1*y"
///   t0: 0.0 y0: 1.0
/// ```
/// Lines starting with //, #, % or ; are comments.
use crate::numerical::ode_errors::OdeError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{alpha1, alphanumeric1, char, multispace0, space0},
    combinator::{map, map_res, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;

pub type SectionMap = HashMap<String, Option<Vec<Value>>>;
pub type DocumentMap = HashMap<String, SectionMap>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn as_string(&self) -> Option<&String> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// integers are accepted where a float is expected ("t0: 0")
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn to_string_value(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(f) => f.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Boolean(b) => b.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        String::from,
    )
    .parse(input)
}

/// Parses a title (word characters without spaces), trailing whitespace dropped
pub fn parse_title(input: &str) -> IResult<&str, String> {
    let (input, result) = identifier(input)?;
    Ok((input.trim(), result))
}

pub fn parse_key(input: &str) -> IResult<&str, String> {
    identifier(input)
}

/// "..." kept verbatim as a string
fn parse_quoted(input: &str) -> IResult<&str, Value> {
    map(
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        |s: &str| Value::String(s.to_string()),
    )
    .parse(input)
}

/// unquoted value up to a comma, whitespace or semicolon; typed as integer, float,
/// boolean or string, in that order
fn parse_bare(input: &str) -> IResult<&str, Value> {
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\n' | '\r' | ';'));
    map_res(value_parser, |s: &str| -> Result<Value, String> {
        let s = s.trim();
        if let Ok(val) = s.parse::<i64>() {
            Ok(Value::Integer(val))
        } else if let Ok(val) = s.parse::<f64>() {
            Ok(Value::Float(val))
        } else if let Ok(val) = s.parse::<bool>() {
            Ok(Value::Boolean(val))
        } else {
            Ok(Value::String(s.to_string()))
        }
    })
    .parse(input)
}

pub fn parse_value(input: &str) -> IResult<&str, Value> {
    alt((parse_quoted, parse_bare)).parse(input)
}

pub fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let (input, _) = multispace0(input)?;
    let separator_coma = delimited(space0, tag(","), space0);
    separated_list0(separator_coma, parse_value).parse(input)
}

/// Parses a key-value pair where value is a list
pub fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let (input, result) =
        separated_pair(parse_key, colon_separator, parse_value_list).parse(input)?;
    Ok((input.trim(), result))
}

/// Parses a section with a title and multiple key-value pairs
pub fn parse_section(input: &str) -> IResult<&str, (String, HashMap<String, Vec<Value>>)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_title(input)?;
    let (input, _) = multispace0(input)?;
    let (input, pairs) = many1(terminated(parse_key_value_pair, space0)).parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
pub fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the entire document (comments must already be removed)
pub fn parse_document(input: &str) -> IResult<&str, DocumentMap> {
    let (input, sections) =
        many1(delimited(space0, parse_section, multispace0)).parse(input)?;
    let result = sections
        .into_iter()
        .map(|(title, section)| {
            let section: SectionMap = section
                .into_iter()
                .map(|(key, values)| (key, Some(values)))
                .collect();
            (title, section)
        })
        .collect();
    Ok((input, result))
}

/// Full document: comments stripped, everything consumed. With a template, every section
/// and key of the template is present in the result (missing keys map to None).
pub fn parse_task_document(
    input: &str,
    template: Option<&DocumentMap>,
) -> Result<DocumentMap, OdeError> {
    let filtered = filter_comments(input);
    let mut parsed = match parse_document(&filtered) {
        Ok((remaining, parsed)) => {
            if !remaining.trim().is_empty() {
                return Err(OdeError::InvalidParameter(format!(
                    "failed to parse entire task document, remaining: '{}'",
                    remaining.trim()
                )));
            }
            parsed
        }
        Err(e) => {
            return Err(OdeError::InvalidParameter(format!(
                "task document parsing error: {:?}",
                e
            )));
        }
    };
    if let Some(template) = template {
        for (title, keys_map) in template {
            let section_map = parsed.entry(title.clone()).or_default();
            for key in keys_map.keys() {
                section_map.entry(key.clone()).or_insert(None);
            }
        }
    }
    Ok(parsed)
}

/// same as `parse_task_document` with every value turned into its string form
pub fn parse_document_as_strings(
    input: &str,
) -> Result<HashMap<String, HashMap<String, Option<Vec<String>>>>, OdeError> {
    let parsed = parse_task_document(input, None)?;
    Ok(parsed
        .into_iter()
        .map(|(title, section)| {
            let section = section
                .into_iter()
                .map(|(key, values)| {
                    let values =
                        values.map(|v| v.iter().map(Value::to_string_value).collect::<Vec<_>>());
                    (key, values)
                })
                .collect();
            (title, section)
        })
        .collect())
}

/// template with the given sections and keys, all values None
pub fn template_from(sections: &[(&str, &[&str])]) -> DocumentMap {
    sections
        .iter()
        .map(|(title, keys)| {
            let section: SectionMap = keys.iter().map(|k| (k.to_string(), None)).collect();
            (title.to_string(), section)
        })
        .collect()
}

#[cfg(test)]
mod tests1 {
    use super::*;

    #[test]
    fn test_parse_title_and_key() {
        let (remaining, title) = parse_title("title1\n key1: value1").unwrap();
        assert_eq!(title, "title1");
        assert_eq!(remaining, "key1: value1");

        let (remaining, key) = parse_key("key_with_underscore: value1").unwrap();
        assert_eq!(key, "key_with_underscore");
        assert_eq!(remaining, ": value1");
    }

    #[test]
    fn test_parse_value() {
        let (remaining, value) = parse_value("value1, value2").unwrap();
        assert_eq!(value, Value::String("value1".to_string()));
        assert_eq!(remaining, ", value2");

        let (_, value) = parse_value("123, next").unwrap();
        assert_eq!(value, Value::Integer(123));
        let (_, value) = parse_value("1e-3").unwrap();
        assert_eq!(value, Value::Float(1e-3));
        let (_, value) = parse_value("false").unwrap();
        assert_eq!(value, Value::Boolean(false));
    }

    #[test]
    fn test_parse_quoted_value() {
        let (remaining, value) = parse_value("\"sin(t) - 0.1*y\", rk4").unwrap();
        assert_eq!(value, Value::String("sin(t) - 0.1*y".to_string()));
        assert_eq!(remaining, ", rk4");

        let (remaining, values) = parse_value_list("\"max(a, b)\", 2").unwrap();
        assert_eq!(
            values,
            vec![Value::String("max(a, b)".to_string()), Value::Integer(2)]
        );
        assert_eq!(remaining, "");
    }

    #[test]
    fn test_parse_key_value_pair() {
        let (remaining, (key, values)) =
            parse_key_value_pair("step_sizes : 0.1 , 0.05, 0.01").unwrap();
        assert_eq!(key, "step_sizes");
        assert_eq!(
            values,
            vec![Value::Float(0.1), Value::Float(0.05), Value::Float(0.01)]
        );
        assert_eq!(remaining, "");

        let (remaining, (key, values)) = parse_key_value_pair("key1:").unwrap();
        assert_eq!(key, "key1");
        assert!(values.is_empty());
        assert_eq!(remaining, "");
    }

    #[test]
    fn test_parse_section() {
        let input = "solver method: heun step: 0.1 n_steps: 20 problem";
        let (remaining, (title, map)) = parse_section(input).unwrap();
        assert_eq!(title, "solver");
        assert_eq!(map.len(), 3);
        assert_eq!(map["n_steps"], vec![Value::Integer(20)]);
        assert_eq!(remaining, "problem");
    }

    #[test]
    fn test_filter_comments() {
        let input = "// header\nsection\n# note\n  key: 1\n% x\n; y\n\n";
        assert_eq!(filter_comments(input), "section\n  key: 1");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Integer(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(0.5).as_float(), Some(0.5));
        assert_eq!(Value::Boolean(true).as_float(), None);
        assert_eq!(Value::Integer(3).as_integer(), Some(3));
        assert_eq!(Value::Float(3.0).as_integer(), None);
        assert_eq!(Value::String("rk4".into()).as_string().unwrap(), "rk4");
        assert_eq!(Value::Boolean(false).to_string_value(), "false");
    }
}
