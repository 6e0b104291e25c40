//! Keyword tables and text scanners shared by the heuristic matcher and by
//! tools recovering under-specified parameters from the original request.
//!
//! Keywords cover Spanish and English phrasing. All matching is done on the
//! lower-cased message.

use std::sync::LazyLock;

use regex::Regex;

use crate::tools::builtin::{ArithmeticOp, Operation, TextOp};

static SIGNED_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+\.?\d*").expect("valid signed decimal regex"));

static UNSIGNED_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid integer regex"));

static INFIX_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*([+\-*/×÷])\s*(\d+(?:\.\d+)?)").expect("valid expression regex")
});

/// An operator symbol between two operands; the second may carry a sign.
static INFIX_OPERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d\s*([+\-*/×÷])\s*-?\d").expect("valid infix operator regex")
});

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word regex"));

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("valid quoted text regex"));

/// Arithmetic words per operation, in selection priority order. Operator
/// symbols are recognized separately, and only between two operands.
pub const ARITHMETIC_KEYWORDS: &[(ArithmeticOp, &[&str])] = &[
    (ArithmeticOp::Add, &["suma", "sumar", "más", "plus"]),
    (ArithmeticOp::Subtract, &["resta", "restar", "menos", "minus"]),
    (
        ArithmeticOp::Multiply,
        &["multiplica", "multiplicar", "por", "times"],
    ),
    (
        ArithmeticOp::Divide,
        &["divide", "dividir", "entre", "divided"],
    ),
];

/// Phrases whose words must not count as keywords.
const IGNORED_PHRASES: &[&str] = &["por favor"];

pub const BATCH_KEYWORDS: &[&str] = &[
    "suma",
    "sumar",
    "resta",
    "restar",
    "calcula",
    "calcular",
    "operaciones",
    "calculate",
    "operations",
];

pub const WEATHER_KEYWORDS: &[&str] = &[
    "clima",
    "tiempo",
    "temperatura",
    "weather",
    "llueve",
    "sol",
];

pub const COMPARISON_KEYWORDS: &[&str] = &[
    "compara",
    "comparar",
    "versus",
    "vs",
    "mejor",
    "peor",
    "compare",
];

pub const TEXT_KEYWORDS: &[&str] = &[
    "mayúscula",
    "mayúsculas",
    "minúscula",
    "minúsculas",
    "reversa",
    "voltear",
    "contar",
    "palabras",
    "uppercase",
    "lowercase",
    "reverse",
];

/// Cities recognized in free text: (lower-case needle, display name).
pub const KNOWN_CITIES: &[(&str, &str)] = &[
    ("madrid", "Madrid"),
    ("barcelona", "Barcelona"),
    ("sevilla", "Sevilla"),
    ("valencia", "Valencia"),
    ("mexico", "Mexico"),
    ("new york", "New York"),
    ("tokyo", "Tokyo"),
    ("paris", "Paris"),
    ("london", "London"),
    ("berlin", "Berlin"),
    ("rome", "Rome"),
];

pub const DEFAULT_CITY: &str = "Madrid";

/// Whether any keyword appears as a whole word of `lower`.
pub fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    WORD
        .find_iter(lower)
        .any(|word| keywords.contains(&word.as_str()))
}

/// Signed decimal tokens, left to right.
pub fn signed_numbers(text: &str) -> Vec<f64> {
    SIGNED_DECIMAL
        .find_iter(text)
        .filter_map(|m| m.as_str().trim_end_matches('.').parse().ok())
        .collect()
}

/// Unsigned integer tokens, left to right.
pub fn integers(text: &str) -> Vec<f64> {
    UNSIGNED_INTEGER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// The first two signed decimal tokens, if there are at least two.
pub fn operand_pair(text: &str) -> Option<(f64, f64)> {
    let numbers = signed_numbers(text);
    match numbers.as_slice() {
        [a, b, ..] => Some((*a, *b)),
        _ => None,
    }
}

/// Whether the message mentions arithmetic at all.
pub fn mentions_arithmetic(text: &str) -> bool {
    arithmetic_operation(text).is_some()
}

/// The operation named by the message, by keyword priority.
///
/// A leading minus on an operand is a sign, not a subtraction.
pub fn arithmetic_operation(text: &str) -> Option<ArithmeticOp> {
    let mut lower = text.to_lowercase();
    for phrase in IGNORED_PHRASES {
        lower = lower.replace(phrase, " ");
    }
    let symbols: Vec<ArithmeticOp> = INFIX_OPERATOR
        .captures_iter(&lower)
        .filter_map(|caps| ArithmeticOp::from_symbol(caps.get(1)?.as_str().chars().next()?))
        .collect();

    ARITHMETIC_KEYWORDS
        .iter()
        .find(|(op, keywords)| symbols.contains(op) || contains_any(&lower, keywords))
        .map(|(op, _)| *op)
}

/// Calculations written in the message, capped at `limit`.
///
/// Infix expressions (`5+3, 10-2`) win; otherwise consecutive integer pairs
/// are added together.
pub fn operations(text: &str, limit: usize) -> Vec<Operation> {
    let infix: Vec<Operation> = INFIX_EXPRESSION
        .captures_iter(text)
        .filter_map(|caps| {
            let a = caps.get(1)?.as_str().parse().ok()?;
            let op = ArithmeticOp::from_symbol(caps.get(2)?.as_str().chars().next()?)?;
            let b = caps.get(3)?.as_str().parse().ok()?;
            Some(Operation::new(a, op, b))
        })
        .take(limit)
        .collect();
    if !infix.is_empty() {
        return infix;
    }

    integers(text)
        .chunks_exact(2)
        .map(|pair| Operation::new(pair[0], ArithmeticOp::Add, pair[1]))
        .take(limit)
        .collect()
}

/// Known cities mentioned in the message, in order of first appearance.
pub fn cities(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found: Vec<(usize, &str)> = KNOWN_CITIES
        .iter()
        .filter_map(|(needle, display)| lower.find(needle).map(|pos| (pos, *display)))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, name)| name.to_string()).collect()
}

/// The first known city mentioned, or the default city.
pub fn city(text: &str) -> String {
    cities(text)
        .into_iter()
        .next()
        .unwrap_or_else(|| DEFAULT_CITY.to_string())
}

/// The first double-quoted substring, if any.
pub fn quoted_text(text: &str) -> Option<String> {
    QUOTED
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The text operand: the quoted substring if present, else the whole message.
pub fn text_operand(text: &str) -> String {
    quoted_text(text).unwrap_or_else(|| text.to_string())
}

/// The text transformation named by the message.
pub fn text_operation(text: &str) -> TextOp {
    let lower = text.to_lowercase();
    if contains_any(&lower, &["mayúscula", "uppercase"]) {
        TextOp::Uppercase
    } else if contains_any(&lower, &["minúscula", "lowercase"]) {
        TextOp::Lowercase
    } else if contains_any(&lower, &["reversa", "voltear", "reverse"]) {
        TextOp::Reverse
    } else if contains_any(&lower, &["contar", "count"])
        && contains_any(&lower, &["palabra", "palabras", "word", "words"])
    {
        TextOp::CountWords
    } else {
        TextOp::CountChars
    }
}
