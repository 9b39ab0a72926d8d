//! The compiler test runner's `--- Timings:` report, turned into benches.
//!
//! The runner prints one `Label: value` line per raw counter, grouped in four
//! sections (tokenizer, parser, typecheck, codegen), followed by a few derived
//! per-token and per-node figures. Only the raw counters are read back; the
//! derived figures are recomputed with three decimals, because the printed
//! ones are truncated to whole nanoseconds.

use serde::Serialize;
use tracing::debug;

use crate::{models::Bench, models::BenchValue, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenizerTimings {
    pub time_ns: u64,
    pub bytes: u64,
    pub tokens: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParserTimings {
    pub time_ns: u64,
    pub tokens: u64,
    pub nodes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypecheckTimings {
    pub time_ns: u64,
    pub nodes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodegenTimings {
    pub ir_time_ns: u64,
    pub codegen_time_ns: u64,
    pub nodes: u64,
}

/// Sections are only present when every raw line of the section was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CompilerTimings {
    pub tokenizer: Option<TokenizerTimings>,
    pub parser: Option<ParserTimings>,
    pub typecheck: Option<TypecheckTimings>,
    pub codegen: Option<CodegenTimings>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Field {
    TokenizeTime,
    TokenizeBytes,
    TokenizeTokens,
    ParseTime,
    ParseTokens,
    ParseNodes,
    TypecheckTime,
    TypecheckNodes,
    IrTime,
    CodegenTime,
    CodegenNodes,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Format {
    Timespan,
    Bytes,
    Amount,
}

const FIELDS: &[(&str, Field, Format)] = &[
    ("Time spent tokenizing", Field::TokenizeTime, Format::Timespan),
    ("Total bytes tokenized", Field::TokenizeBytes, Format::Bytes),
    ("Total tokens produced", Field::TokenizeTokens, Format::Amount),
    ("Time spent parsing", Field::ParseTime, Format::Timespan),
    ("Total tokens parsed", Field::ParseTokens, Format::Amount),
    ("Total parse nodes produced", Field::ParseNodes, Format::Amount),
    ("Time spent typechecking", Field::TypecheckTime, Format::Timespan),
    ("Total parse nodes typechecked", Field::TypecheckNodes, Format::Amount),
    ("Time spent building LLVM IR", Field::IrTime, Format::Timespan),
    ("Time spent performing codegen", Field::CodegenTime, Format::Timespan),
    ("Total parse nodes turned into IR", Field::CodegenNodes, Format::Amount),
    ("Total parse nodes turned into LLVM IR", Field::CodegenNodes, Format::Amount),
];

const FIELD_COUNT: usize = 11;

impl Field {
    fn index(self) -> usize {
        self as usize
    }
}

impl Format {
    fn parse(self, value: &str) -> Option<u64> {
        match self {
            Format::Timespan => parse_timespan(value),
            Format::Bytes => parse_bytes(value),
            Format::Amount => parse_amount(value),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Format::Timespan => "a time span",
            Format::Bytes => "a byte amount",
            Format::Amount => "an amount",
        }
    }
}

pub fn parse_report(text: &str) -> Result<CompilerTimings> {
    let mut raw = [None::<u64>; FIELD_COUNT];

    for (number, line) in text.lines().enumerate() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let (label, value) = (label.trim(), value.trim());
        let Some((_, field, format)) = FIELDS.iter().find(|(name, ..)| *name == label) else {
            debug!(line = number + 1, label, "skipping report line");
            continue;
        };
        let parsed = format.parse(value).ok_or_else(|| Error::BadValue {
            line: number + 1,
            value: value.to_string(),
            expected: format.expected(),
        })?;
        raw[field.index()] = Some(parsed);
    }

    let get = |field: Field| raw[field.index()];
    let timings = CompilerTimings {
        tokenizer: match (
            get(Field::TokenizeTime),
            get(Field::TokenizeBytes),
            get(Field::TokenizeTokens),
        ) {
            (Some(time_ns), Some(bytes), Some(tokens)) => Some(TokenizerTimings {
                time_ns,
                bytes,
                tokens,
            }),
            _ => None,
        },
        parser: match (
            get(Field::ParseTime),
            get(Field::ParseTokens),
            get(Field::ParseNodes),
        ) {
            (Some(time_ns), Some(tokens), Some(nodes)) => Some(ParserTimings {
                time_ns,
                tokens,
                nodes,
            }),
            _ => None,
        },
        typecheck: match (get(Field::TypecheckTime), get(Field::TypecheckNodes)) {
            (Some(time_ns), Some(nodes)) => Some(TypecheckTimings { time_ns, nodes }),
            _ => None,
        },
        codegen: match (
            get(Field::IrTime),
            get(Field::CodegenTime),
            get(Field::CodegenNodes),
        ) {
            (Some(ir_time_ns), Some(codegen_time_ns), Some(nodes)) => Some(CodegenTimings {
                ir_time_ns,
                codegen_time_ns,
                nodes,
            }),
            _ => None,
        },
    };
    debug!(?timings, "parsed timings report");
    Ok(timings)
}

impl CompilerTimings {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The benches recorded for the compiler, in dashboard order. Each
    /// section's derived figures follow its raw counters.
    pub fn to_benches(&self) -> Vec<Bench> {
        let mut benches = Vec::new();

        if let Some(t) = self.tokenizer {
            benches.extend([
                Bench::new("Time spent tokenizing", t.time_ns, "ns"),
                Bench::new("Total bytes tokenized", t.bytes, "bytes"),
                Bench::new("Total tokens produced", t.tokens, "amount"),
            ]);
            push_ratio(&mut benches, "Tokenization time per token produced", t.time_ns, t.tokens, "ns");
            push_ratio(&mut benches, "Tokenization time per byte", t.time_ns, t.bytes, "ns");
        }
        if let Some(p) = self.parser {
            benches.extend([
                Bench::new("Time spent parsing", p.time_ns, "ns"),
                Bench::new("Total tokens parsed", p.tokens, "amount"),
                Bench::new("Total parse nodes produced", p.nodes, "amount"),
            ]);
            push_ratio(&mut benches, "Parse nodes produced per token", p.nodes, p.tokens, "amount");
            push_ratio(&mut benches, "Parse time per token token", p.time_ns, p.tokens, "ns");
            push_ratio(&mut benches, "Parse time per parse node produced", p.time_ns, p.nodes, "ns");
        }
        if let Some(t) = self.typecheck {
            benches.extend([
                Bench::new("Time spent typechecking", t.time_ns, "ns"),
                Bench::new("Total parse nodes typechecked", t.nodes, "amount"),
            ]);
            push_ratio(&mut benches, "Typecheck time per parse node", t.time_ns, t.nodes, "ns");
        }
        if let Some(c) = self.codegen {
            benches.extend([
                Bench::new("Time spent building LLVM IR", c.ir_time_ns, "ns"),
                Bench::new("Time spent performing codegen", c.codegen_time_ns, "ns"),
                Bench::new("Total parse nodes turned into LLVM IR", c.nodes, "amount"),
            ]);
            push_ratio(&mut benches, "Time building LLVM IR per parse node", c.ir_time_ns, c.nodes, "ns");
            push_ratio(&mut benches, "Codegen time per parse node", c.codegen_time_ns, c.nodes, "ns");
        }

        benches
    }
}

fn push_ratio(benches: &mut Vec<Bench>, name: &str, num: u64, den: u64, unit: &str) {
    if let Some(value) = ratio(num, den) {
        benches.push(Bench::new(name, BenchValue::from_f64(value), unit));
    }
}

/// `num / den` rounded to three decimals; `None` for a zero denominator.
fn ratio(num: u64, den: u64) -> Option<f64> {
    (den != 0).then(|| (num as f64 / den as f64 * 1000.0).round() / 1000.0)
}

/// Accepts `123ns`, `5.659µs` (or `us`), `5.659ms` and `2.609s`.
pub fn parse_timespan(value: &str) -> Option<u64> {
    let value = value.trim();
    let (number, scale) = if let Some(n) = value.strip_suffix("ns") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("µs").or_else(|| value.strip_suffix("us")) {
        (n, 1e3)
    } else if let Some(n) = value.strip_suffix("ms") {
        (n, 1e6)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1e9)
    } else {
        return None;
    };
    scaled(number, scale)
}

/// Accepts `1.52 MB`-style amounts in binary multiples, or a bare byte count.
pub fn parse_bytes(value: &str) -> Option<u64> {
    const SUFFIXES: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let value = value.trim();
    let split = value
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let (number, suffix) = value.split_at(split);
    if suffix.is_empty() {
        return parse_amount(number);
    }
    let power = SUFFIXES
        .iter()
        .position(|s| s.eq_ignore_ascii_case(suffix))?;
    scaled(number, 1024f64.powi(power as i32))
}

/// Accepts digit groups separated by `_` or `,`.
pub fn parse_amount(value: &str) -> Option<u64> {
    let digits: String = value
        .trim()
        .chars()
        .filter(|c| *c != '_' && *c != ',')
        .collect();
    digits.parse().ok()
}

fn scaled(number: &str, scale: f64) -> Option<u64> {
    let number: f64 = number.trim().parse().ok()?;
    (number.is_finite() && number >= 0.0).then(|| (number * scale).round() as u64)
}

/// The runner's own rendering: whole nanoseconds below 1µs, then three
/// decimals of the largest unit that keeps the integer part under 1000.
pub fn format_timespan(ns: u64) -> String {
    if ns < 1000 {
        return format!("{ns}ns");
    }
    let mut before = ns / 1000;
    let mut after = ns % 1000;
    for suffix in ["µ", "m"] {
        if before < 1000 {
            return format!("{before}.{after:03}{suffix}s");
        }
        after = before % 1000;
        before /= 1000;
    }
    format!("{before}.{after:03}s")
}

/// `1590706` becomes `1_590_706`.
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('_');
        }
        out.push(c);
    }
    out
}
