use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::table::value::parse_iso_datetime;
use crate::table::{CellValue, CompareOp, FilterValue};

/// One parsed `column <op> value` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub value: FilterValue,
}

/// Parse a column filter expression into per-column filters.
///
/// Supported syntax:
/// - `column > value`, `column < value`, `column >= value`, `column <= value`
/// - `column = value`, `column != value`, `column ~ 'substring'`
/// - `column = 'string value'`
/// - `column IS NULL`, `column IS NOT NULL`
/// - `column IN ('a', 'b', 'c')`
/// - `column BETWEEN low AND high`
/// - Clauses joined with `AND`
///
/// Unquoted values become numbers, booleans or dates when they parse as
/// such; quoted values are always text. `OR` is rejected: each column holds a
/// single filter and columns combine with AND.
pub fn parse_filter(input: &str) -> Result<Vec<ColumnFilter>> {
    let input = input.trim();
    if input.is_empty() {
        bail!("empty filter expression");
    }
    if find_keyword_pos(&input.to_ascii_uppercase(), " OR ").is_some() {
        bail!("OR is not supported; column filters combine with AND");
    }
    split_clauses(input)
        .iter()
        .map(|clause| parse_clause(clause))
        .collect()
}

/// Split on `AND` outside quotes, re-joining the `AND` that belongs to a
/// `BETWEEN` clause.
fn split_clauses(input: &str) -> Vec<String> {
    let mut clauses: Vec<String> = Vec::new();
    let mut pending_between = false;
    let mut rest = input;

    loop {
        let (part, next) = match split_combinator(rest, " AND ") {
            Some((left, right)) => (left, Some(right)),
            None => (rest.trim(), None),
        };

        if pending_between {
            if let Some(last) = clauses.last_mut() {
                last.push_str(" AND ");
                last.push_str(part);
            }
            pending_between = false;
        } else {
            pending_between = find_keyword_pos(&part.to_ascii_uppercase(), " BETWEEN ").is_some();
            clauses.push(part.to_string());
        }

        match next {
            Some(right) => rest = right,
            None => break,
        }
    }
    clauses
}

/// Split on first occurrence of combinator, respecting quoted strings.
fn split_combinator<'a>(input: &'a str, combinator: &str) -> Option<(&'a str, &'a str)> {
    let pos = find_keyword_pos(&input.to_ascii_uppercase(), combinator)?;
    Some((input[..pos].trim(), input[pos + combinator.len()..].trim()))
}

fn find_keyword_pos(upper: &str, keyword: &str) -> Option<usize> {
    let mut in_quote = false;
    for (i, c) in upper.char_indices() {
        if c == '\'' {
            in_quote = !in_quote;
        }
        if !in_quote && upper[i..].starts_with(keyword) {
            return Some(i);
        }
    }
    None
}

fn parse_clause(input: &str) -> Result<ColumnFilter> {
    let input = input.trim();
    let upper = input.to_ascii_uppercase();

    if upper.ends_with(" IS NOT NULL") {
        let col = column_name(&input[..input.len() - 12], input)?;
        return Ok(ColumnFilter {
            column: col,
            value: FilterValue::NotNull,
        });
    }

    if upper.ends_with(" IS NULL") {
        let col = column_name(&input[..input.len() - 8], input)?;
        return Ok(ColumnFilter {
            column: col,
            value: FilterValue::IsNull,
        });
    }

    if let Some(pos) = find_keyword_pos(&upper, " BETWEEN ") {
        let col = column_name(&input[..pos], input)?;
        let bounds = &input[pos + 9..];
        let Some((low, high)) = split_combinator(bounds, " AND ") else {
            bail!("BETWEEN needs two bounds: {}", input);
        };
        return Ok(ColumnFilter {
            column: col,
            value: FilterValue::range(Some(parse_literal(low)), Some(parse_literal(high))),
        });
    }

    if let Some(pos) = find_keyword_pos(&upper, " IN ") {
        let col = column_name(&input[..pos], input)?;
        let list_part = input[pos + 4..].trim();
        if list_part.starts_with('(') && list_part.ends_with(')') {
            let inner = &list_part[1..list_part.len() - 1];
            let values = parse_list_values(inner).into_iter().map(|v| parse_literal(&v));
            return Ok(ColumnFilter {
                column: col,
                value: FilterValue::one_of(values),
            });
        }
        bail!("invalid IN expression: {}", input);
    }

    let Some((pos, op)) = find_operator(input) else {
        bail!("cannot parse filter expression: {}", input);
    };
    let col = column_name(&input[..pos], input)?;
    let raw = input[pos + op.len()..].trim();
    if raw.is_empty() {
        bail!("missing value in filter expression: {}", input);
    }
    let literal = parse_literal(raw);

    let value = match op {
        ">=" => FilterValue::compare(CompareOp::Ge, literal),
        "<=" => FilterValue::compare(CompareOp::Le, literal),
        "!=" => FilterValue::compare(CompareOp::Ne, literal),
        ">" => FilterValue::compare(CompareOp::Gt, literal),
        "<" => FilterValue::compare(CompareOp::Lt, literal),
        "=" => FilterValue::equals(literal),
        "~" => FilterValue::contains(unquote(raw)),
        _ => unreachable!(),
    };
    Ok(ColumnFilter { column: col, value })
}

const OPERATORS: [&str; 7] = [">=", "<=", "!=", ">", "<", "=", "~"];

/// Leftmost comparison operator outside quotes.
fn find_operator(input: &str) -> Option<(usize, &'static str)> {
    let mut in_quote = false;
    for (i, c) in input.char_indices() {
        if c == '\'' {
            in_quote = !in_quote;
            continue;
        }
        if in_quote {
            continue;
        }
        if let Some(op) = OPERATORS.iter().find(|op| input[i..].starts_with(**op)) {
            return Some((i, op));
        }
    }
    None
}

fn column_name(raw: &str, clause: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        bail!("invalid column name in filter expression: {}", clause);
    }
    Ok(name.to_string())
}

fn parse_list_values(input: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut quoted = false;

    for c in input.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                quoted = true;
                current.push(c);
            }
            ',' if !in_quote => {
                push_list_value(&mut values, &current, quoted);
                current.clear();
                quoted = false;
            }
            _ => {
                if in_quote || !c.is_whitespace() {
                    current.push(c);
                }
            }
        }
    }
    push_list_value(&mut values, &current, quoted);
    values
}

fn push_list_value(values: &mut Vec<String>, raw: &str, quoted: bool) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() || quoted {
        values.push(trimmed.to_string());
    }
}

fn unquote(val: &str) -> &str {
    let val = val.trim();
    if val.len() >= 2 && val.starts_with('\'') && val.ends_with('\'') {
        &val[1..val.len() - 1]
    } else {
        val
    }
}

/// Convert a literal to a cell value.
/// Quoted strings stay text; unquoted values become the narrowest type they
/// parse as.
pub fn parse_literal(val: &str) -> CellValue {
    let val = val.trim();

    if val.len() >= 2 && val.starts_with('\'') && val.ends_with('\'') {
        return CellValue::Text(val[1..val.len() - 1].to_string());
    }

    if let Ok(i) = val.parse::<i64>() {
        return CellValue::Int(i);
    }

    if let Ok(f) = val.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Float(f);
        }
    }

    match val.to_ascii_lowercase().as_str() {
        "true" => return CellValue::Bool(true),
        "false" => return CellValue::Bool(false),
        "null" => return CellValue::Null,
        _ => {}
    }

    if let Ok(d) = NaiveDate::parse_from_str(val, "%Y-%m-%d") {
        return CellValue::Date(d);
    }
    if let Some(dt) = parse_iso_datetime(val) {
        return CellValue::DateTime(dt);
    }

    CellValue::Text(val.to_string())
}
