//! Register path parsing
//!
//! A register path is a string addressing one of the two registers and
//! optionally descending into it: `$0`, `$0.rec.foo`, `$0.items[2].id`,
//! `$0['dotted.key']`, `$1.parse_date`. The leading sigil selects the
//! register; the accessor chain is walked left to right during resolution.

use crate::error::{Error, Result};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// One of the two fixed register slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Register 0: the context value
    Context,
    /// Register 1: the plugin registry
    Plugins,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Context => write!(f, "$0"),
            Register::Plugins => write!(f, "$1"),
        }
    }
}

/// A single accessor step in a register path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Named-field access into a mapping
    Key(String),
    /// Index access into a sequence
    Index(usize),
}

/// A parsed register path: a register plus its accessor chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterPath {
    pub register: Register,
    pub segments: Vec<Segment>,
}

impl RegisterPath {
    /// Whether a string is a register reference rather than a plain literal.
    ///
    /// Only strings whose sigil is `$` followed by a digit are references;
    /// anything else (including `$name`) is an ordinary string value.
    pub fn is_reference(input: &str) -> bool {
        let mut chars = input.chars();
        chars.next() == Some('$') && chars.next().is_some_and(|c| c.is_ascii_digit())
    }

    /// Parse a register path string.
    ///
    /// Fails with `InvalidRegister` when the sigil names a register other
    /// than 0 or 1, and with `Schema` for malformed accessor syntax.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = PathParser::new(input);
        parser.parse()
    }
}

impl fmt::Display for RegisterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.register)?;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Character-walking parser for register path strings
struct PathParser<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
        }
    }

    fn parse(&mut self) -> Result<RegisterPath> {
        let register = self.parse_register()?;
        let mut segments = Vec::new();

        while let Some(&ch) = self.chars.peek() {
            match ch {
                '.' => {
                    self.chars.next();
                    segments.push(Segment::Key(self.parse_identifier()?));
                }
                '[' => {
                    self.chars.next();
                    segments.push(self.parse_bracket()?);
                }
                other => {
                    return Err(Error::schema(format!(
                        "malformed path `{}`: unexpected `{}`, expected `.` or `[`",
                        self.input, other
                    )))
                }
            }
        }

        Ok(RegisterPath {
            register,
            segments,
        })
    }

    fn parse_register(&mut self) -> Result<Register> {
        if self.chars.next() != Some('$') {
            return Err(Error::InvalidRegister {
                reference: self.input.to_string(),
            });
        }
        let mut digits = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.chars.next();
            } else {
                break;
            }
        }
        match digits.as_str() {
            "0" => Ok(Register::Context),
            "1" => Ok(Register::Plugins),
            _ => Err(Error::InvalidRegister {
                reference: self.input.to_string(),
            }),
        }
    }

    /// A dotted key runs until the next `.`, `[`, or end of input
    fn parse_identifier(&mut self) -> Result<String> {
        let mut key = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch == '.' || ch == '[' {
                break;
            }
            key.push(ch);
            self.chars.next();
        }
        if key.is_empty() {
            return Err(Error::schema(format!(
                "malformed path `{}`: empty accessor after `.`",
                self.input
            )));
        }
        Ok(key)
    }

    /// Bracket accessors hold a numeric index or a quoted key
    fn parse_bracket(&mut self) -> Result<Segment> {
        match self.chars.peek() {
            Some(&quote) if quote == '\'' || quote == '"' => {
                self.chars.next();
                let mut key = String::new();
                loop {
                    match self.chars.next() {
                        Some(ch) if ch == quote => break,
                        Some(ch) => key.push(ch),
                        None => {
                            return Err(Error::schema(format!(
                                "malformed path `{}`: unterminated quoted key",
                                self.input
                            )))
                        }
                    }
                }
                self.expect(']')?;
                Ok(Segment::Key(key))
            }
            _ => {
                let mut digits = String::new();
                while let Some(&ch) = self.chars.peek() {
                    if ch == ']' {
                        break;
                    }
                    digits.push(ch);
                    self.chars.next();
                }
                self.expect(']')?;
                let index = digits.parse::<usize>().map_err(|_| {
                    Error::schema(format!(
                        "malformed path `{}`: `[{}]` is not a non-negative index",
                        self.input, digits
                    ))
                })?;
                Ok(Segment::Index(index))
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.chars.next() {
            Some(ch) if ch == expected => Ok(()),
            _ => Err(Error::schema(format!(
                "malformed path `{}`: expected `{}`",
                self.input, expected
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_register() {
        let path = RegisterPath::parse("$0").unwrap();
        assert_eq!(path.register, Register::Context);
        assert!(path.segments.is_empty());

        let path = RegisterPath::parse("$1").unwrap();
        assert_eq!(path.register, Register::Plugins);
    }

    #[test]
    fn test_dotted_path() {
        let path = RegisterPath::parse("$0.rec.foo").unwrap();
        assert_eq!(
            path.segments,
            vec![
                Segment::Key("rec".to_string()),
                Segment::Key("foo".to_string())
            ]
        );
    }

    #[test]
    fn test_indexed_path() {
        let path = RegisterPath::parse("$0.items[2].id").unwrap();
        assert_eq!(
            path.segments,
            vec![
                Segment::Key("items".to_string()),
                Segment::Index(2),
                Segment::Key("id".to_string())
            ]
        );
    }

    #[test]
    fn test_quoted_key() {
        let path = RegisterPath::parse("$0['dotted.key'][\"other\"]").unwrap();
        assert_eq!(
            path.segments,
            vec![
                Segment::Key("dotted.key".to_string()),
                Segment::Key("other".to_string())
            ]
        );
    }

    #[test]
    fn test_invalid_register() {
        let err = RegisterPath::parse("$2.x").unwrap_err();
        assert!(matches!(err, Error::InvalidRegister { .. }));
        assert!(err.to_string().contains("$2.x"));

        let err = RegisterPath::parse("$42").unwrap_err();
        assert!(matches!(err, Error::InvalidRegister { .. }));
    }

    #[test]
    fn test_malformed_paths() {
        assert!(matches!(
            RegisterPath::parse("$0.").unwrap_err(),
            Error::Schema { .. }
        ));
        assert!(matches!(
            RegisterPath::parse("$0[abc]").unwrap_err(),
            Error::Schema { .. }
        ));
        assert!(matches!(
            RegisterPath::parse("$0['unterminated").unwrap_err(),
            Error::Schema { .. }
        ));
        assert!(matches!(
            RegisterPath::parse("$0[-1]").unwrap_err(),
            Error::Schema { .. }
        ));
    }

    #[test]
    fn test_is_reference() {
        assert!(RegisterPath::is_reference("$0.rec"));
        assert!(RegisterPath::is_reference("$1.parse"));
        assert!(RegisterPath::is_reference("$2.x"));
        assert!(!RegisterPath::is_reference("$name"));
        assert!(!RegisterPath::is_reference("plain"));
        assert!(!RegisterPath::is_reference("$"));
    }

    #[test]
    fn test_display_round_trip() {
        for input in ["$0", "$1.parse", "$0.items[2].id"] {
            let path = RegisterPath::parse(input).unwrap();
            assert_eq!(path.to_string(), input);
        }
    }
}
