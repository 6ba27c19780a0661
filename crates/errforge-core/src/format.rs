//! Printf-style message formatting.
//!
//! Raw constructor arguments are turned into a message by a
//! [`MessageFormatter`]. The default is [`PrintfFormatter`], which follows the
//! conventional printf rules:
//!
//! | Directive   | Rendering                                   |
//! |-------------|---------------------------------------------|
//! | `%s`        | plain string                                |
//! | `%d` / `%i` | number / integer (`NaN` when not numeric)   |
//! | `%f`        | floating point                              |
//! | `%j`        | JSON                                        |
//! | `%o` / `%O` | structured value (JSON)                     |
//! | `%c`        | consumes an argument, renders nothing       |
//! | `%%`        | literal `%`                                 |
//!
//! A directive with no argument left is kept literally, and arguments left
//! over after the template is exhausted are appended separated by spaces.

use std::fmt;

use serde_json::Value;

// ─── FormatArg ────────────────────────────────────────────────────────────────

/// One raw argument handed to a message formatter.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatArg {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Any structured value; rendered as JSON by `%j`, `%o` and `%O`.
    Json(Value),
}

impl FormatArg {
    /// Returns the string payload if this argument is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric coercion used by `%d`.
    fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
            Self::Str(s) => parse_number(s),
            Self::Json(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Self::Json(Value::Bool(b)) => f64::from(u8::from(*b)),
            Self::Json(Value::Null) => 0.0,
            Self::Bytes(_) | Self::Json(_) => f64::NAN,
        }
    }

    /// Float parsing used by `%f`: numbers, or the numeric prefix of a string.
    fn to_float(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
            Self::Str(s) => parse_float_prefix(s),
            Self::Json(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }

    /// Integer parsing used by `%i`: truncated numbers, or the integer prefix
    /// of a string.
    fn to_integer(&self) -> f64 {
        let n = match self {
            Self::Str(s) => parse_int_prefix(s),
            other => other.to_number(),
        };
        if n.is_finite() {
            n.trunc()
        } else {
            f64::NAN
        }
    }

    /// JSON serialization used by `%j`, `%o` and `%O`.
    pub fn to_json(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => serde_json::Number::from_f64(*v)
                .map(|n| n.to_string())
                .unwrap_or_else(|| "null".to_string()),
            Self::Str(s) => Value::String(s.clone()).to_string(),
            Self::Bytes(b) => Value::from(b.clone()).to_string(),
            Self::Json(v) => v.to_string(),
        }
    }
}

impl fmt::Display for FormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{}", format_number(*v)),
            Self::Str(s) => write!(f, "{s}"),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::Json(Value::String(s)) => write!(f, "{s}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else {
        format!("{n}")
    }
}

// ─── String → number ──────────────────────────────────────────────────────────

/// Whole-string numeric conversion: blank is zero, `Infinity` is the only
/// spelled-out value, `0x` prefixes are hex, anything else non-numeric is NaN.
fn parse_number(s: &str) -> f64 {
    let t = s.trim();
    match t {
        "" => return 0.0,
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return parse_hex_digits(hex).unwrap_or(f64::NAN);
    }
    let numeric = t
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if numeric {
        t.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Longest leading decimal literal, ignoring whatever follows it.
fn parse_float_prefix(s: &str) -> f64 {
    let t = s.trim_start();
    let bytes = t.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    if t[end..].starts_with("Infinity") {
        return if t.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    end = skip_digits(bytes, end);
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        end = skip_digits(bytes, frac_start);
        digits += end - frac_start;
    }
    if digits == 0 {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = skip_digits(bytes, exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    t[..end].parse().unwrap_or(f64::NAN)
}

/// Leading integer (decimal, or hex after `0x`), ignoring whatever follows it.
fn parse_int_prefix(s: &str) -> f64 {
    let t = s.trim_start();
    let (negative, unsigned) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let magnitude = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => {
            let end = hex
                .bytes()
                .position(|b| !b.is_ascii_hexdigit())
                .unwrap_or(hex.len());
            parse_hex_digits(&hex[..end])
        }
        None => {
            let end = skip_digits(unsigned.as_bytes(), 0);
            if end == 0 {
                None
            } else {
                unsigned[..end].parse().ok()
            }
        }
    };
    match magnitude {
        Some(m) if negative => -m,
        Some(m) => m,
        None => f64::NAN,
    }
}

fn parse_hex_digits(digits: &str) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(16).map(|d| acc * 16.0 + f64::from(d))
    })
}

fn skip_digits(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    i
}

// ─── Conversions ──────────────────────────────────────────────────────────────

impl From<&str> for FormatArg {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for FormatArg {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&String> for FormatArg {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl From<bool> for FormatArg {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! from_lossless_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FormatArg {
            fn from(v: $ty) -> Self {
                Self::Int(i64::from(v))
            }
        })*
    };
}

from_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for FormatArg {
    fn from(v: u64) -> Self {
        i64::try_from(v).map(Self::Int).unwrap_or(Self::Float(v as f64))
    }
}

impl From<usize> for FormatArg {
    fn from(v: usize) -> Self {
        i64::try_from(v).map(Self::Int).unwrap_or(Self::Float(v as f64))
    }
}

impl From<f32> for FormatArg {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for FormatArg {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&[u8]> for FormatArg {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl<T: Into<FormatArg>> From<Option<T>> for FormatArg {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Scalars map onto their native variant; arrays and objects stay structured.
impl From<Value> for FormatArg {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::String(s) => Self::Str(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            other => Self::Json(other),
        }
    }
}

/// Build a `Vec<FormatArg>` from heterogeneous values.
///
/// ```
/// use errforge_core::{args, FormatArg};
///
/// let a = args!["num=%d", 42];
/// assert_eq!(a, vec![FormatArg::Str("num=%d".into()), FormatArg::Int(42)]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::FormatArg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::FormatArg::from($arg)),+]
    };
}

// ─── Formatters ───────────────────────────────────────────────────────────────

/// Turns raw constructor arguments into a stored message.
///
/// Stored per error type and inherited by every type created from it unless
/// the child supplies its own. Any `Fn(&[FormatArg]) -> String` closure that
/// is `Send + Sync` qualifies.
pub trait MessageFormatter: Send + Sync {
    fn format(&self, args: &[FormatArg]) -> String;
}

impl<F> MessageFormatter for F
where
    F: Fn(&[FormatArg]) -> String + Send + Sync,
{
    fn format(&self, args: &[FormatArg]) -> String {
        self(args)
    }
}

/// The default printf-style formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintfFormatter;

impl MessageFormatter for PrintfFormatter {
    fn format(&self, args: &[FormatArg]) -> String {
        let Some((first, rest)) = args.split_first() else {
            return String::new();
        };
        let FormatArg::Str(template) = first else {
            return args
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
        };
        // A lone template is never interpreted.
        if rest.is_empty() {
            return template.clone();
        }

        let mut out = String::with_capacity(template.len());
        let mut pending = rest.iter();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            let Some(&directive) = chars.peek() else {
                out.push('%');
                break;
            };
            match directive {
                '%' => {
                    chars.next();
                    out.push('%');
                }
                's' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O' | 'c' => {
                    chars.next();
                    match pending.next() {
                        Some(arg) => render_directive(&mut out, directive, arg),
                        None => {
                            out.push('%');
                            out.push(directive);
                        }
                    }
                }
                _ => out.push('%'),
            }
        }

        for arg in pending {
            out.push(' ');
            out.push_str(&arg.to_string());
        }
        out
    }
}

fn render_directive(out: &mut String, directive: char, arg: &FormatArg) {
    match directive {
        's' => out.push_str(&arg.to_string()),
        'd' => match arg {
            FormatArg::Int(v) => out.push_str(&v.to_string()),
            other => out.push_str(&format_number(other.to_number())),
        },
        'i' => match arg {
            FormatArg::Int(v) => out.push_str(&v.to_string()),
            other => out.push_str(&format_number(other.to_integer())),
        },
        'f' => out.push_str(&format_number(arg.to_float())),
        'j' | 'o' | 'O' => out.push_str(&arg.to_json()),
        // %c is a styling directive with nothing to render outside a console
        _ => {}
    }
}

/// Format `args` with the default [`PrintfFormatter`].
pub fn format_message(args: &[FormatArg]) -> String {
    PrintfFormatter.format(args)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_args_yield_empty_message() {
        assert_eq!(format_message(&[]), "");
    }

    #[test]
    fn lone_template_is_verbatim() {
        assert_eq!(format_message(&args!["100%% of %s"]), "100%% of %s");
    }

    #[test]
    fn mixed_directives() {
        let out = format_message(&args![
            "string=%s, num=%d, obj=%j",
            "string",
            123,
            json!({"a": 1})
        ]);
        assert_eq!(out, r#"string=string, num=123, obj={"a":1}"#);
    }

    #[test]
    fn json_keeps_insertion_order() {
        let out = format_message(&args![
            "num=%d, json=%j",
            999,
            json!({"foo": "bar", "enabled": true})
        ]);
        assert_eq!(out, r#"num=999, json={"foo":"bar","enabled":true}"#);
    }

    #[test]
    fn missing_arguments_leave_placeholders() {
        assert_eq!(format_message(&args!["%s and %d", "one"]), "one and %d");
    }

    #[test]
    fn extra_arguments_are_appended() {
        assert_eq!(format_message(&args!["a", "b", 3, true]), "a b 3 true");
    }

    #[test]
    fn non_string_first_argument_joins_everything() {
        assert_eq!(format_message(&args![1, "%s", 2.5]), "1 %s 2.5");
    }

    #[test]
    fn number_coercion() {
        assert_eq!(format_message(&args!["%d", "42"]), "42");
        assert_eq!(format_message(&args!["%d", "nope"]), "NaN");
        assert_eq!(format_message(&args!["%i", 3.9]), "3");
        assert_eq!(format_message(&args!["%f", "1.5"]), "1.5");
        assert_eq!(format_message(&args!["%d", true]), "1");
    }

    #[test]
    fn integer_and_float_take_numeric_prefix() {
        assert_eq!(format_message(&args!["%i", "42abc"]), "42");
        assert_eq!(format_message(&args!["%i", "  -7.9px"]), "-7");
        assert_eq!(format_message(&args!["%i", "0x1A"]), "26");
        assert_eq!(format_message(&args!["%i", "abc"]), "NaN");
        assert_eq!(format_message(&args!["%f", "2.5kg"]), "2.5");
        assert_eq!(format_message(&args!["%f", "1e3x"]), "1000");
        assert_eq!(format_message(&args!["%f", ".5"]), "0.5");
        assert_eq!(format_message(&args!["%f", "-Infinity!"]), "-Infinity");
        assert_eq!(format_message(&args!["%f", "kg"]), "NaN");
    }

    #[test]
    fn number_rejects_non_literal_spellings() {
        assert_eq!(format_message(&args!["%d", "inf"]), "NaN");
        assert_eq!(format_message(&args!["%d", "nan"]), "NaN");
        assert_eq!(format_message(&args!["%d", "infinity"]), "NaN");
        assert_eq!(format_message(&args!["%d", "Infinity"]), "Infinity");
        assert_eq!(format_message(&args!["%d", "42abc"]), "NaN");
        assert_eq!(format_message(&args!["%d", " 0x10 "]), "16");
        assert_eq!(format_message(&args!["%d", "   "]), "0");
    }

    #[test]
    fn percent_escape_and_unknown_directive() {
        assert_eq!(format_message(&args!["%% %x %s", "y"]), "% %x y");
        assert_eq!(format_message(&args!["trailing %", 1]), "trailing % 1");
    }

    #[test]
    fn style_directive_consumes_argument() {
        assert_eq!(format_message(&args!["%cred", "color: red"]), "red");
    }

    #[test]
    fn bytes_render_as_hex() {
        let bytes: &[u8] = &[0xde, 0xad];
        assert_eq!(format_message(&args!["%s", bytes]), "0xdead");
        assert_eq!(format_message(&args!["%j", bytes]), "[222,173]");
    }

    #[test]
    fn closures_are_formatters() {
        let join = |args: &[FormatArg]| {
            args.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        assert_eq!(join.format(&args!["a", "b"]), "a, b");
    }
}
