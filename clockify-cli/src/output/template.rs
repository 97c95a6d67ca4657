//! A small text template language for `--format`.
//!
//! Text is copied as is; `{{ ... }}` actions are evaluated against the JSON
//! form of the value being printed. An action is a pipeline of commands
//! separated by `|`, the result of each command passed as the last argument
//! of the next. Operands are field paths (`.`, `.ID`, `.TimeInterval.Start`,
//! matched case-insensitively), string literals and parenthesised pipelines.
//! The only functions are:
//!
//! - `fdt` formats a time as local `YYYY-MM-DD HH:MM:SS`;
//! - `ft` formats a time as local `HH:MM:SS`;
//! - `now` returns its argument, or the current time when it is empty.
//!
//! `{{-` and `-}}` trim the whitespace around an action.

use chrono::{DateTime, Local, Utc};
use clockify::domain::datetime;
use serde::Serialize;
use serde_json::Value;

use crate::domain::CliError;

const FULL_DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";
const TIME: &str = "%H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Action(Pipeline),
}

#[derive(Debug, Clone, PartialEq)]
struct Pipeline(Vec<Command>);

#[derive(Debug, Clone, PartialEq)]
struct Command(Vec<Operand>);

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Field(Vec<String>),
    Str(String),
    Function(String),
    Group(Pipeline),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Field(Vec<String>),
    Str(String),
    Ident(String),
    Open,
    Close,
    Pipe,
}

fn template_error(msg: impl std::fmt::Display) -> CliError {
    CliError::invalid_argument(format!("invalid format template: {}", msg))
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, CliError> {
        let mut nodes = vec![];
        let mut rest = source;
        let mut trim_next = false;

        while let Some(open) = rest.find("{{") {
            let mut text = &rest[..open];
            if trim_next {
                text = text.trim_start();
            }
            let after = &rest[open + 2..];
            let close = after
                .find("}}")
                .ok_or_else(|| template_error("unclosed action"))?;
            let mut action = &after[..close];

            if let Some(trimmed) = action.strip_prefix('-') {
                text = text.trim_end();
                action = trimmed;
            }
            trim_next = false;
            if let Some(trimmed) = action.strip_suffix('-') {
                trim_next = true;
                action = trimmed;
            }

            if !text.is_empty() {
                nodes.push(Node::Text(text.to_string()));
            }
            nodes.push(Node::Action(parse_action(action)?));
            rest = &after[close + 2..];
        }

        let text = if trim_next { rest.trim_start() } else { rest };
        if !text.is_empty() {
            nodes.push(Node::Text(text.to_string()));
        }
        Ok(Self { nodes })
    }

    pub fn render<T: Serialize>(&self, value: &T) -> Result<String, CliError> {
        let data = serde_json::to_value(value).map_err(template_error)?;
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Action(pipeline) => out.push_str(&display(&pipeline.eval(&data)?)),
            }
        }
        Ok(out)
    }
}

fn tokenize(action: &str) -> Result<Vec<Token>, CliError> {
    let mut tokens = vec![];
    let mut chars = action.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '|' => {
                chars.next();
                tokens.push(Token::Pipe);
            }
            '"' => {
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => literal.push('\n'),
                            Some('t') => literal.push('\t'),
                            Some(other) => literal.push(other),
                            None => return Err(template_error("unterminated string")),
                        },
                        Some(other) => literal.push(other),
                        None => return Err(template_error("unterminated string")),
                    }
                }
                tokens.push(Token::Str(literal));
            }
            '.' => {
                let mut path = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' {
                        path.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let segments: Vec<String> = path
                    .split('.')
                    .skip(1)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                tokens.push(Token::Field(segments));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(template_error(format!("unexpected character '{}'", other))),
        }
    }
    Ok(tokens)
}

fn parse_action(action: &str) -> Result<Pipeline, CliError> {
    let tokens = tokenize(action)?;
    let mut pos = 0;
    let pipeline = parse_pipeline(&tokens, &mut pos)?;
    if pos < tokens.len() {
        return Err(template_error("unexpected \")\""));
    }
    Ok(pipeline)
}

fn parse_pipeline(tokens: &[Token], pos: &mut usize) -> Result<Pipeline, CliError> {
    let mut commands = vec![];
    loop {
        let mut operands = vec![];
        while let Some(token) = tokens.get(*pos) {
            let operand = match token {
                Token::Pipe | Token::Close => break,
                Token::Field(path) => Operand::Field(path.clone()),
                Token::Str(s) => Operand::Str(s.clone()),
                Token::Ident(name) => Operand::Function(name.clone()),
                Token::Open => {
                    *pos += 1;
                    let inner = parse_pipeline(tokens, pos)?;
                    if tokens.get(*pos) != Some(&Token::Close) {
                        return Err(template_error("missing \")\""));
                    }
                    Operand::Group(inner)
                }
            };
            operands.push(operand);
            *pos += 1;
        }
        if operands.is_empty() {
            return Err(template_error("empty command"));
        }
        commands.push(Command(operands));

        if tokens.get(*pos) == Some(&Token::Pipe) {
            *pos += 1;
        } else {
            return Ok(Pipeline(commands));
        }
    }
}

impl Pipeline {
    fn eval(&self, data: &Value) -> Result<Value, CliError> {
        let mut piped = None;
        for command in &self.0 {
            piped = Some(command.eval(data, piped)?);
        }
        Ok(piped.unwrap_or(Value::Null))
    }
}

impl Command {
    fn eval(&self, data: &Value, piped: Option<Value>) -> Result<Value, CliError> {
        match self.0.as_slice() {
            [Operand::Function(name), args @ ..] => {
                let mut values = args
                    .iter()
                    .map(|arg| arg.eval(data))
                    .collect::<Result<Vec<_>, _>>()?;
                values.extend(piped);
                call(name, values)
            }
            [operand] if piped.is_none() => operand.eval(data),
            [_] => Err(template_error("only functions can take piped values")),
            _ => Err(template_error("only functions can take arguments")),
        }
    }
}

impl Operand {
    fn eval(&self, data: &Value) -> Result<Value, CliError> {
        match self {
            Operand::Field(path) => field(data, path),
            Operand::Str(s) => Ok(Value::String(s.clone())),
            Operand::Group(pipeline) => pipeline.eval(data),
            Operand::Function(name) => call(name, vec![]),
        }
    }
}

fn field(data: &Value, path: &[String]) -> Result<Value, CliError> {
    let mut current = data;
    for segment in path {
        current = match current {
            Value::Object(map) => map
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(segment))
                .map(|(_, value)| value)
                .ok_or_else(|| template_error(format!("unknown field \"{}\"", segment)))?,
            Value::Null => return Ok(Value::Null),
            _ => {
                return Err(template_error(format!(
                    "can't read field \"{}\" of a non-object",
                    segment
                )))
            }
        };
    }
    Ok(current.clone())
}

fn call(name: &str, args: Vec<Value>) -> Result<Value, CliError> {
    match (name, args.as_slice()) {
        ("fdt", [value]) => format_time(value, FULL_DATE_TIME),
        ("ft", [value]) => format_time(value, TIME),
        ("now", []) => Ok(Value::String(wire_now())),
        ("now", [value]) => Ok(match as_time(value)? {
            Some(_) => value.clone(),
            None => Value::String(wire_now()),
        }),
        ("fdt" | "ft" | "now", _) => Err(template_error(format!(
            "wrong number of arguments for \"{}\"",
            name
        ))),
        _ => Err(template_error(format!("unknown function \"{}\"", name))),
    }
}

fn wire_now() -> String {
    datetime::format(&Utc::now())
}

fn as_time(value: &Value) -> Result<Option<DateTime<Utc>>, CliError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => datetime::parse(s)
            .map(Some)
            .map_err(|_| template_error(format!("\"{}\" is not a time", s))),
        other => Err(template_error(format!("{} is not a time", other))),
    }
}

fn format_time(value: &Value, format: &str) -> Result<Value, CliError> {
    Ok(Value::String(match as_time(value)? {
        Some(time) => time.with_timezone(&Local).format(format).to_string(),
        None => String::new(),
    }))
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
