//! Argument specs and the standard parsers
//!
//! An [`ArgumentSpec`] is used twice: its parser is handed to the dispatch
//! backend for binding, and its name/type label feed the help placeholder.

use std::{fmt, sync::Arc};

use crate::text::{Component, NamedColor};

/// A parsed argument value
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
}

impl ArgValue {
    /// Name of the variant, for type errors
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Double(_) => "double",
            Self::Boolean(_) => "boolean",
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// Conversion from a bound [`ArgValue`] into a concrete type
pub trait FromArgValue: Sized {
    /// Human-readable name used in type errors
    const EXPECTED: &'static str;

    fn from_arg(value: &ArgValue) -> Option<Self>;
}

impl FromArgValue for String {
    const EXPECTED: &'static str = "string";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::String(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl FromArgValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl FromArgValue for u32 {
    const EXPECTED: &'static str = "integer";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Integer(value) => Self::try_from(*value).ok(),
            _ => None,
        }
    }
}

impl FromArgValue for f64 {
    const EXPECTED: &'static str = "double";

    #[allow(clippy::cast_precision_loss)]
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Double(value) => Some(*value),
            ArgValue::Integer(value) => Some(*value as Self),
            _ => None,
        }
    }
}

impl FromArgValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

/// Backend parser for one argument token
pub trait ArgumentParser: fmt::Debug + Send + Sync {
    /// Parse a single token, returning a reason on rejection
    fn parse(&self, token: &str) -> std::result::Result<ArgValue, String>;

    /// Default type label shown in help
    fn type_name(&self) -> String;
}

/// Shared handle to a parser
pub type ParserRef = Arc<dyn ArgumentParser>;

#[derive(Debug, Clone, Copy, Default)]
struct StringParser;

impl ArgumentParser for StringParser {
    fn parse(&self, token: &str) -> std::result::Result<ArgValue, String> {
        Ok(ArgValue::String(token.to_string()))
    }

    fn type_name(&self) -> String {
        "string".to_string()
    }
}

#[derive(Debug, Clone, Copy)]
struct IntegerParser {
    min: i64,
    max: i64,
}

impl ArgumentParser for IntegerParser {
    fn parse(&self, token: &str) -> std::result::Result<ArgValue, String> {
        let value: i64 = token
            .parse()
            .map_err(|_| format!("'{token}' is not an integer"))?;
        if value < self.min || value > self.max {
            return Err(format!(
                "{value} is not in range [{}, {}]",
                self.min, self.max
            ));
        }
        Ok(ArgValue::Integer(value))
    }

    fn type_name(&self) -> String {
        "integer".to_string()
    }
}

#[derive(Debug, Clone, Copy)]
struct DoubleParser {
    min: f64,
    max: f64,
}

impl ArgumentParser for DoubleParser {
    fn parse(&self, token: &str) -> std::result::Result<ArgValue, String> {
        let value: f64 = token
            .parse()
            .map_err(|_| format!("'{token}' is not a number"))?;
        if !value.is_finite() || value < self.min || value > self.max {
            return Err(format!(
                "{value} is not in range [{}, {}]",
                self.min, self.max
            ));
        }
        Ok(ArgValue::Double(value))
    }

    fn type_name(&self) -> String {
        "double".to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BooleanParser;

impl ArgumentParser for BooleanParser {
    fn parse(&self, token: &str) -> std::result::Result<ArgValue, String> {
        match token.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => Ok(ArgValue::Boolean(true)),
            "false" | "no" | "off" => Ok(ArgValue::Boolean(false)),
            _ => Err(format!("'{token}' is not a boolean")),
        }
    }

    fn type_name(&self) -> String {
        "boolean".to_string()
    }
}

/// Single-word string
#[must_use]
pub fn string_parser() -> ParserRef {
    Arc::new(StringParser)
}

/// Integer within the inclusive range `[min, max]`
#[must_use]
pub fn integer_parser(min: i64, max: i64) -> ParserRef {
    Arc::new(IntegerParser { min, max })
}

/// Finite double of at least `min`
#[must_use]
pub fn double_parser(min: f64) -> ParserRef {
    Arc::new(DoubleParser { min, max: f64::MAX })
}

/// `true/false`, `yes/no` or `on/off`
#[must_use]
pub fn boolean_parser() -> ParserRef {
    Arc::new(BooleanParser)
}

/// Metadata for one positional argument of a subcommand
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    pub name: String,
    pub parser: ParserRef,
    pub required: bool,
    pub type_name: String,
}

impl ArgumentSpec {
    /// `<name>` when required, `[name]` otherwise
    pub fn placeholder(&self) -> String {
        let name = display_name(&self.name);
        if self.required {
            format!("<{name}>")
        } else {
            format!("[{name}]")
        }
    }

    /// Placeholder styled for help output, with the type label on hover
    pub fn to_component(&self) -> Component {
        let color = if self.required {
            NamedColor::Red
        } else {
            NamedColor::DarkAqua
        };
        Component::colored(self.placeholder(), color)
            .hover(Component::text(display_name(&self.type_name)))
    }
}

/// `LOOP_TYPE` -> `loop type`
pub(crate) fn display_name(raw: &str) -> String {
    raw.to_lowercase().replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_parser_enforces_range() {
        let parser = integer_parser(1, 3);
        assert_eq!(parser.parse("2"), Ok(ArgValue::Integer(2)));
        assert!(parser.parse("0").is_err());
        assert!(parser.parse("4").is_err());
        assert!(parser.parse("two").is_err());
    }

    #[test]
    fn test_double_parser_rejects_below_min_and_nan() {
        let parser = double_parser(0.0);
        assert_eq!(parser.parse("1.5"), Ok(ArgValue::Double(1.5)));
        assert!(parser.parse("-0.1").is_err());
        assert!(parser.parse("NaN").is_err());
    }

    #[test]
    fn test_boolean_parser_accepts_common_spellings() {
        let parser = boolean_parser();
        assert_eq!(parser.parse("Yes"), Ok(ArgValue::Boolean(true)));
        assert_eq!(parser.parse("off"), Ok(ArgValue::Boolean(false)));
        assert!(parser.parse("maybe").is_err());
    }

    #[test]
    fn test_placeholder_styles_by_requiredness() {
        let required = ArgumentSpec {
            name: "model".to_string(),
            parser: string_parser(),
            required: true,
            type_name: "string".to_string(),
        };
        let optional = ArgumentSpec {
            name: "LOOP_TYPE".to_string(),
            parser: string_parser(),
            required: false,
            type_name: "ANIMATION_TYPE".to_string(),
        };

        assert_eq!(required.placeholder(), "<model>");
        assert_eq!(optional.placeholder(), "[loop type]");
        assert_eq!(
            required.to_component().style().color,
            Some(NamedColor::Red)
        );
        let hover = optional.to_component();
        assert_eq!(
            hover.hover_text().map(Component::plain_text),
            Some("animation type".to_string())
        );
    }

    #[test]
    fn test_from_arg_value_widens_integer_to_double() {
        assert_eq!(f64::from_arg(&ArgValue::Integer(2)), Some(2.0));
        assert_eq!(u32::from_arg(&ArgValue::Integer(-1)), None);
        assert_eq!(String::from_arg(&ArgValue::Boolean(true)), None);
    }
}
