//! Environment-marker expressions.
//!
//! A marker restricts a dependency declaration to certain runtime
//! environments, e.g. `python_version >= '3.7'` or
//! `sys_platform == 'darwin' and python_version < '3.9'`. Markers are parsed
//! into a small expression tree and can be evaluated against a
//! `MarkerEnvironment`.
//!
//! Grammar (loosest-binding first):
//!
//! ```text
//! marker     = and_expr ("or" and_expr)*
//! and_expr   = primary ("and" primary)*
//! primary    = "(" marker ")" | operand op operand
//! operand    = variable | quoted string
//! op         = "==" | "!=" | "<=" | ">=" | "<" | ">" | "~=" | "in" | "not in"
//! ```

use super::version::Version;
use crate::error::ReqlintError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed environment marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub expr: MarkerExpr,
    /// The marker as written, for display and diagnostics
    source: String,
}

/// Marker expression tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerExpr {
    Comparison {
        lhs: MarkerOperand,
        op: MarkerOp,
        rhs: MarkerOperand,
    },
    And(Box<MarkerExpr>, Box<MarkerExpr>),
    Or(Box<MarkerExpr>, Box<MarkerExpr>),
}

/// One side of a marker comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerOperand {
    Variable(MarkerVar),
    Literal(String),
}

/// Recognized marker variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerVar {
    PythonVersion,
    PythonFullVersion,
    SysPlatform,
    PlatformSystem,
    PlatformMachine,
    PlatformRelease,
    PlatformVersion,
    PlatformPythonImplementation,
    ImplementationName,
    ImplementationVersion,
    OsName,
    Extra,
}

/// Comparison operator inside a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerOp {
    Equal,
    NotEqual,
    LessEq,
    GreaterEq,
    Less,
    Greater,
    Compatible,
    In,
    NotIn,
}

/// Values a marker is evaluated against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerEnvironment {
    pub python_version: String,
    pub python_full_version: String,
    pub sys_platform: String,
    pub platform_system: String,
    pub platform_machine: String,
    pub platform_release: String,
    pub platform_version: String,
    pub platform_python_implementation: String,
    pub implementation_name: String,
    pub implementation_version: String,
    pub os_name: String,
    pub extra: Option<String>,
}

impl MarkerVar {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "python_version" => Some(MarkerVar::PythonVersion),
            "python_full_version" => Some(MarkerVar::PythonFullVersion),
            "sys_platform" => Some(MarkerVar::SysPlatform),
            "platform_system" => Some(MarkerVar::PlatformSystem),
            "platform_machine" => Some(MarkerVar::PlatformMachine),
            "platform_release" => Some(MarkerVar::PlatformRelease),
            "platform_version" => Some(MarkerVar::PlatformVersion),
            "platform_python_implementation" => Some(MarkerVar::PlatformPythonImplementation),
            "implementation_name" => Some(MarkerVar::ImplementationName),
            "implementation_version" => Some(MarkerVar::ImplementationVersion),
            "os_name" => Some(MarkerVar::OsName),
            "extra" => Some(MarkerVar::Extra),
            _ => None,
        }
    }

    /// The variable name as written in a manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerVar::PythonVersion => "python_version",
            MarkerVar::PythonFullVersion => "python_full_version",
            MarkerVar::SysPlatform => "sys_platform",
            MarkerVar::PlatformSystem => "platform_system",
            MarkerVar::PlatformMachine => "platform_machine",
            MarkerVar::PlatformRelease => "platform_release",
            MarkerVar::PlatformVersion => "platform_version",
            MarkerVar::PlatformPythonImplementation => "platform_python_implementation",
            MarkerVar::ImplementationName => "implementation_name",
            MarkerVar::ImplementationVersion => "implementation_version",
            MarkerVar::OsName => "os_name",
            MarkerVar::Extra => "extra",
        }
    }

    /// Variables whose values compare as versions rather than strings
    fn is_version_valued(&self) -> bool {
        matches!(
            self,
            MarkerVar::PythonVersion
                | MarkerVar::PythonFullVersion
                | MarkerVar::ImplementationVersion
        )
    }
}

impl MarkerOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerOp::Equal => "==",
            MarkerOp::NotEqual => "!=",
            MarkerOp::LessEq => "<=",
            MarkerOp::GreaterEq => ">=",
            MarkerOp::Less => "<",
            MarkerOp::Greater => ">",
            MarkerOp::Compatible => "~=",
            MarkerOp::In => "in",
            MarkerOp::NotIn => "not in",
        }
    }
}

// ---------------------------------------------------------------------------
// Tokenizer

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Literal(String),
    Op(MarkerOp),
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ReqlintError> {
    let invalid = |reason: String| ReqlintError::InvalidMarker {
        input: input.to_string(),
        reason,
    };

    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            },
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            },
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            },
            '\'' | '"' => {
                chars.next();
                let mut literal = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == ch {
                        closed = true;
                        break;
                    }
                    literal.push(c);
                }
                if !closed {
                    return Err(invalid(format!("unterminated string starting at byte {}", pos)));
                }
                tokens.push(Token::Literal(literal));
            },
            '=' | '!' | '<' | '>' | '~' => {
                let rest = &input[pos..];
                let (op, len) = if rest.starts_with("==") {
                    (MarkerOp::Equal, 2)
                } else if rest.starts_with("!=") {
                    (MarkerOp::NotEqual, 2)
                } else if rest.starts_with("<=") {
                    (MarkerOp::LessEq, 2)
                } else if rest.starts_with(">=") {
                    (MarkerOp::GreaterEq, 2)
                } else if rest.starts_with("~=") {
                    (MarkerOp::Compatible, 2)
                } else if rest.starts_with('<') {
                    (MarkerOp::Less, 1)
                } else if rest.starts_with('>') {
                    (MarkerOp::Greater, 1)
                } else {
                    return Err(invalid(format!("unrecognized operator at byte {}", pos)));
                };
                for _ in 0..len {
                    chars.next();
                }
                tokens.push(Token::Op(op));
            },
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            },
            c => return Err(invalid(format!("unexpected character `{}`", c))),
        }
    }

    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    input: &'a str,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ReqlintError> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            input,
        })
    }

    fn error(&self, reason: String) -> ReqlintError {
        ReqlintError::InvalidMarker {
            input: self.input.to_string(),
            reason,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// `or` binds loosest
    fn parse_or(&mut self) -> Result<MarkerExpr, ReqlintError> {
        let mut expr = self.parse_and()?;
        while self.peek() == Some(&Token::Ident("or".to_string())) {
            self.next();
            let rhs = self.parse_and()?;
            expr = MarkerExpr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<MarkerExpr, ReqlintError> {
        let mut expr = self.parse_primary()?;
        while self.peek() == Some(&Token::Ident("and".to_string())) {
            self.next();
            let rhs = self.parse_primary()?;
            expr = MarkerExpr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<MarkerExpr, ReqlintError> {
        if self.peek() == Some(&Token::LParen) {
            self.next();
            let expr = self.parse_or()?;
            if self.next() != Some(Token::RParen) {
                return Err(self.error("missing closing parenthesis".to_string()));
            }
            return Ok(expr);
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<MarkerExpr, ReqlintError> {
        let lhs = self.parse_operand()?;
        let op = self.parse_op()?;
        let rhs = self.parse_operand()?;
        Ok(MarkerExpr::Comparison { lhs, op, rhs })
    }

    fn parse_operand(&mut self) -> Result<MarkerOperand, ReqlintError> {
        match self.next() {
            Some(Token::Ident(name)) => MarkerVar::parse(&name)
                .map(MarkerOperand::Variable)
                .ok_or_else(|| self.error(format!("unknown marker variable `{}`", name))),
            Some(Token::Literal(value)) => Ok(MarkerOperand::Literal(value)),
            other => Err(self.error(format!("expected operand, found {:?}", other))),
        }
    }

    fn parse_op(&mut self) -> Result<MarkerOp, ReqlintError> {
        match self.next() {
            Some(Token::Op(op)) => Ok(op),
            Some(Token::Ident(word)) if word == "in" => Ok(MarkerOp::In),
            Some(Token::Ident(word)) if word == "not" => match self.next() {
                Some(Token::Ident(word)) if word == "in" => Ok(MarkerOp::NotIn),
                _ => Err(self.error("expected `in` after `not`".to_string())),
            },
            other => Err(self.error(format!("expected comparison operator, found {:?}", other))),
        }
    }
}

impl Marker {
    /// Parse and validate a marker expression
    pub fn parse(input: &str) -> Result<Self, ReqlintError> {
        let source = input.trim().to_string();
        if source.is_empty() {
            return Err(ReqlintError::InvalidMarker {
                input: source,
                reason: "empty marker".to_string(),
            });
        }

        let mut parser = Parser::new(&source)?;
        let expr = parser.parse_or()?;
        if parser.peek().is_some() {
            return Err(ReqlintError::InvalidMarker {
                input: source.clone(),
                reason: "trailing tokens after marker expression".to_string(),
            });
        }

        let marker = Marker { expr, source };
        marker.validate()?;
        Ok(marker)
    }

    /// Check version tokens compared against version-valued variables
    fn validate(&self) -> Result<(), ReqlintError> {
        self.expr.validate(&self.source)
    }

    /// Evaluate this marker against an environment
    pub fn evaluate(&self, env: &MarkerEnvironment) -> bool {
        self.expr.evaluate(env)
    }
}

impl MarkerExpr {
    fn validate(&self, source: &str) -> Result<(), ReqlintError> {
        match self {
            MarkerExpr::And(lhs, rhs) | MarkerExpr::Or(lhs, rhs) => {
                lhs.validate(source)?;
                rhs.validate(source)
            },
            MarkerExpr::Comparison { lhs, op, rhs } => {
                if matches!(op, MarkerOp::In | MarkerOp::NotIn) {
                    return Ok(());
                }
                let version_valued = [lhs, rhs].into_iter().any(|operand| {
                    matches!(operand, MarkerOperand::Variable(var) if var.is_version_valued())
                });
                if !version_valued {
                    return Ok(());
                }
                for operand in [lhs, rhs] {
                    if let MarkerOperand::Literal(value) = operand {
                        value.parse::<Version>().map_err(|e| {
                            ReqlintError::InvalidMarker {
                                input: source.to_string(),
                                reason: format!("invalid version token `{}`: {}", value, e),
                            }
                        })?;
                    }
                }
                Ok(())
            },
        }
    }

    fn evaluate(&self, env: &MarkerEnvironment) -> bool {
        match self {
            MarkerExpr::And(lhs, rhs) => lhs.evaluate(env) && rhs.evaluate(env),
            MarkerExpr::Or(lhs, rhs) => lhs.evaluate(env) || rhs.evaluate(env),
            MarkerExpr::Comparison { lhs, op, rhs } => {
                let left = lhs.value(env);
                let right = rhs.value(env);
                compare(left, *op, right, version_comparison(lhs, rhs))
            },
        }
    }
}

/// Whether a comparison should use version semantics
fn version_comparison(lhs: &MarkerOperand, rhs: &MarkerOperand) -> bool {
    [lhs, rhs].into_iter().any(|operand| {
        matches!(operand, MarkerOperand::Variable(var) if var.is_version_valued())
    })
}

fn compare(left: &str, op: MarkerOp, right: &str, as_versions: bool) -> bool {
    match op {
        MarkerOp::In => right.contains(left),
        MarkerOp::NotIn => !right.contains(left),
        _ => {
            if as_versions {
                if let (Ok(l), Ok(r)) = (left.parse::<Version>(), right.parse::<Version>()) {
                    return compare_versions(&l, op, &r);
                }
            }
            match op {
                MarkerOp::Equal => left == right,
                MarkerOp::NotEqual => left != right,
                MarkerOp::Less => left < right,
                MarkerOp::LessEq => left <= right,
                MarkerOp::Greater => left > right,
                MarkerOp::GreaterEq => left >= right,
                // `~=` over plain strings degenerates to equality
                MarkerOp::Compatible => left == right,
                MarkerOp::In | MarkerOp::NotIn => unreachable!(),
            }
        },
    }
}

fn compare_versions(left: &Version, op: MarkerOp, right: &Version) -> bool {
    match op {
        MarkerOp::Equal => left.cmp(right).is_eq(),
        MarkerOp::NotEqual => !left.cmp(right).is_eq(),
        MarkerOp::Less => left < right,
        MarkerOp::LessEq => left <= right,
        MarkerOp::Greater => left > right,
        MarkerOp::GreaterEq => left >= right,
        MarkerOp::Compatible => {
            let prefix = &right.release[..right.release.len().saturating_sub(1)];
            left >= right && left.release_starts_with(prefix)
        },
        MarkerOp::In | MarkerOp::NotIn => unreachable!(),
    }
}

impl MarkerOperand {
    fn value<'e>(&'e self, env: &'e MarkerEnvironment) -> &'e str {
        match self {
            MarkerOperand::Literal(value) => value.as_str(),
            MarkerOperand::Variable(var) => env.get(*var),
        }
    }
}

impl MarkerEnvironment {
    /// Environment describing the host this tool runs on, with the Python
    /// version supplied by the caller
    pub fn host(python_version: &str) -> Self {
        let sys_platform = match std::env::consts::OS {
            "macos" => "darwin",
            "windows" => "win32",
            other => other,
        };
        let os_name = if cfg!(windows) { "nt" } else { "posix" };
        let platform_system = match std::env::consts::OS {
            "macos" => "Darwin",
            "windows" => "Windows",
            "linux" => "Linux",
            other => other,
        };

        Self {
            python_version: python_version.to_string(),
            python_full_version: format!("{}.0", python_version),
            sys_platform: sys_platform.to_string(),
            platform_system: platform_system.to_string(),
            platform_machine: std::env::consts::ARCH.to_string(),
            platform_release: String::new(),
            platform_version: String::new(),
            platform_python_implementation: "CPython".to_string(),
            implementation_name: "cpython".to_string(),
            implementation_version: format!("{}.0", python_version),
            os_name: os_name.to_string(),
            extra: None,
        }
    }

    /// Value of a marker variable in this environment
    pub fn get(&self, var: MarkerVar) -> &str {
        match var {
            MarkerVar::PythonVersion => &self.python_version,
            MarkerVar::PythonFullVersion => &self.python_full_version,
            MarkerVar::SysPlatform => &self.sys_platform,
            MarkerVar::PlatformSystem => &self.platform_system,
            MarkerVar::PlatformMachine => &self.platform_machine,
            MarkerVar::PlatformRelease => &self.platform_release,
            MarkerVar::PlatformVersion => &self.platform_version,
            MarkerVar::PlatformPythonImplementation => &self.platform_python_implementation,
            MarkerVar::ImplementationName => &self.implementation_name,
            MarkerVar::ImplementationVersion => &self.implementation_version,
            MarkerVar::OsName => &self.os_name,
            MarkerVar::Extra => self.extra.as_deref().unwrap_or(""),
        }
    }
}

impl FromStr for Marker {
    type Err = ReqlintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Marker::parse(s)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(python: &str) -> MarkerEnvironment {
        MarkerEnvironment {
            python_version: python.to_string(),
            python_full_version: format!("{}.0", python),
            sys_platform: "linux".to_string(),
            platform_system: "Linux".to_string(),
            platform_machine: "x86_64".to_string(),
            platform_release: String::new(),
            platform_version: String::new(),
            platform_python_implementation: "CPython".to_string(),
            implementation_name: "cpython".to_string(),
            implementation_version: format!("{}.0", python),
            os_name: "posix".to_string(),
            extra: None,
        }
    }

    #[test]
    fn test_simple_comparison() {
        let marker = Marker::parse("python_version >= '3.7'").unwrap();
        assert!(marker.evaluate(&env("3.8")));
        assert!(marker.evaluate(&env("3.7")));
        assert!(!marker.evaluate(&env("3.6")));
    }

    #[test]
    fn test_version_not_string_comparison() {
        // '3.10' >= '3.7' as strings would be false; as versions it is true
        let marker = Marker::parse("python_version >= '3.7'").unwrap();
        assert!(marker.evaluate(&env("3.10")));
    }

    #[test]
    fn test_and_or_precedence() {
        // parsed as (a and b) or c
        let marker = Marker::parse(
            "python_version < '3.0' and sys_platform == 'win32' or os_name == 'posix'",
        )
        .unwrap();
        assert!(marker.evaluate(&env("3.8")));
    }

    #[test]
    fn test_parenthesized() {
        let marker = Marker::parse(
            "python_version < '3.0' and (sys_platform == 'win32' or os_name == 'posix')",
        )
        .unwrap();
        assert!(!marker.evaluate(&env("3.8")));
    }

    #[test]
    fn test_in_operator() {
        let marker = Marker::parse("sys_platform in 'linux darwin'").unwrap();
        assert!(marker.evaluate(&env("3.8")));

        let marker = Marker::parse("sys_platform not in 'win32 cygwin'").unwrap();
        assert!(marker.evaluate(&env("3.8")));
    }

    #[test]
    fn test_literal_on_left() {
        let marker = Marker::parse("'linux' == sys_platform").unwrap();
        assert!(marker.evaluate(&env("3.8")));
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let err = Marker::parse("spam_version >= '3.7'");
        assert!(err.is_err());
    }

    #[test]
    fn test_invalid_version_token_rejected() {
        assert!(Marker::parse("python_version >= 'banana'").is_err());
        assert!(Marker::parse("python_version >= '3.7'").is_ok());
        // string-valued variables may compare against arbitrary strings
        assert!(Marker::parse("sys_platform == 'banana'").is_ok());
    }

    #[test]
    fn test_unterminated_string() {
        assert!(Marker::parse("python_version >= '3.7").is_err());
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(Marker::parse("python_version >= '3.7' extra").is_err());
    }

    #[test]
    fn test_double_quotes() {
        let marker = Marker::parse("os_name == \"posix\"").unwrap();
        assert!(marker.evaluate(&env("3.8")));
    }

    #[test]
    fn test_display_preserves_source() {
        let marker = Marker::parse("python_version >= '3.7'").unwrap();
        assert_eq!(marker.to_string(), "python_version >= '3.7'");
    }
}
