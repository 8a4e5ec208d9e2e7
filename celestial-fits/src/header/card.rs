//! Fixed-width header card codec.
//!
//! A card is exactly 80 ASCII bytes. Columns 1-8 hold the keyword, columns
//! 9-10 hold the value indicator `"= "`, and the remainder holds the value
//! with an optional `/ comment`. Cards without the value indicator
//! (`COMMENT`, `HISTORY`, blank padding) carry no keyword/value pair and
//! decode to an empty [`HeaderCard`].

use crate::header::{Keyword, KeywordValue};
use crate::{FitsError, Result};

pub const CARD_SIZE: usize = 80;
pub const KEYWORD_SIZE: usize = 8;

const VALUE_INDICATOR: &str = "= ";
const VALUE_FIELD_WIDTH: usize = 20;
const MAX_VALUE_LENGTH: usize = 70;
const COMMENT_WIDTH: usize = 47;
const MIN_STRING_WIDTH: usize = 8;

/// A decoded card. All fields are `None` for commentary and blank cards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderCard {
    pub keyword: Option<String>,
    pub value: Option<KeywordValue>,
    pub comment: Option<String>,
}

impl HeaderCard {
    /// True for cards the header model ignores.
    pub fn is_commentary(&self) -> bool {
        self.keyword.is_none()
    }

    pub fn to_keyword(&self) -> Option<Keyword> {
        let name = self.keyword.as_ref()?;
        Some(Keyword {
            name: name.clone(),
            value: self.value.clone(),
            comment: self.comment.clone(),
        })
    }

    /// Renders the card back to its 80-column form. Commentary cards render
    /// as a blank card.
    pub fn to_card_string(&self) -> Result<String> {
        match (&self.keyword, &self.value) {
            (Some(keyword), Some(value)) => format_card(keyword, value, self.comment.as_deref()),
            (Some(keyword), None) => format_undefined_card(keyword, self.comment.as_deref()),
            (None, _) => Ok(" ".repeat(CARD_SIZE)),
        }
    }
}

pub fn parse_card(data: &[u8]) -> Result<HeaderCard> {
    if data.len() != CARD_SIZE {
        return Err(FitsError::HeaderParse(format!(
            "Card must be {} bytes, got {}",
            CARD_SIZE,
            data.len()
        )));
    }
    if !data.is_ascii() {
        return Err(FitsError::HeaderParse(
            "Non-ASCII bytes in header card".to_string(),
        ));
    }
    // ASCII checked above, so this cannot fail.
    let card = std::str::from_utf8(data)
        .map_err(|_| FitsError::HeaderParse("Invalid UTF-8 in header card".to_string()))?;

    if &card[KEYWORD_SIZE..KEYWORD_SIZE + 2] != VALUE_INDICATOR {
        return Ok(HeaderCard::default());
    }

    let keyword = card[..KEYWORD_SIZE].trim_end().to_string();
    if keyword.is_empty() {
        return Err(FitsError::HeaderParse(format!(
            "Value card without keyword: '{}'",
            card.trim_end()
        )));
    }

    let field = &card[KEYWORD_SIZE + 2..];
    let (value, comment) = match field.trim_start().strip_prefix('\'') {
        Some(body) => parse_string_field(&keyword, body)?,
        None => parse_plain_field(&keyword, field)?,
    };

    Ok(HeaderCard {
        keyword: Some(keyword),
        value,
        comment,
    })
}

type ValueAndComment = (Option<KeywordValue>, Option<String>);

// Strings are handled separately because they may contain the '/' separator.
// A doubled quote inside the value stands for one literal quote.
fn parse_string_field(keyword: &str, body: &str) -> Result<ValueAndComment> {
    let mut raw = String::new();
    let mut close = None;
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '\'' {
            raw.push(c);
        } else if chars.peek().is_some_and(|&(_, next)| next == '\'') {
            raw.push('\'');
            chars.next();
        } else {
            close = Some(i);
            break;
        }
    }
    let close = close.ok_or_else(|| {
        FitsError::HeaderParse(format!("Unterminated string value for keyword {keyword}"))
    })?;

    let value = if !raw.is_empty() && raw.bytes().all(|b| b == b' ') {
        " ".to_string()
    } else {
        raw.trim_end().to_string()
    };

    let comment = body[close + 1..]
        .split_once('/')
        .map(|(_, c)| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Ok((Some(KeywordValue::String(value)), comment))
}

fn parse_plain_field(keyword: &str, field: &str) -> Result<ValueAndComment> {
    let (value_part, comment_part) = match field.split_once('/') {
        Some((v, c)) => (v, Some(c)),
        None => (field, None),
    };

    let value_part = value_part.trim();
    let value = if value_part.is_empty() {
        None
    } else {
        Some(convert_value(keyword, value_part)?)
    };
    let comment = comment_part
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Ok((value, comment))
}

fn convert_value(keyword: &str, text: &str) -> Result<KeywordValue> {
    let invalid = || FitsError::InvalidKeywordValue {
        keyword: keyword.to_string(),
        value: text.to_string(),
    };

    match text {
        "T" => Ok(KeywordValue::Logical(true)),
        "F" => Ok(KeywordValue::Logical(false)),
        _ if text.contains('.') => text
            .replace(['D', 'd'], "E")
            .parse::<f64>()
            .map(KeywordValue::Real)
            .map_err(|_| invalid()),
        _ => match text.parse::<i64>() {
            Ok(value) => Ok(KeywordValue::Integer(value)),
            // Integers past the i64 range, e.g. the unsigned 64-bit TZERO offset.
            Err(_) if is_integer_literal(text) => text
                .parse::<f64>()
                .map(KeywordValue::Real)
                .map_err(|_| invalid()),
            Err(_) => Err(invalid()),
        },
    }
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Formats a value for the fixed 20-column value field.
///
/// Strings are quoted and left-justified with an interior width of at least
/// 8. Integers and reals are right-justified. Reals use normalized
/// scientific notation with one fewer fractional digit when negative so the
/// sign does not widen the field.
pub fn format_value(value: &KeywordValue) -> Result<String> {
    match value {
        KeywordValue::String(s) => {
            let quoted = format!("'{:<width$}'", s.replace('\'', "''"), width = MIN_STRING_WIDTH);
            Ok(format!("{:<width$}", quoted, width = VALUE_FIELD_WIDTH))
        }
        KeywordValue::Logical(b) => Ok(if *b { "T" } else { "F" }.to_string()),
        KeywordValue::Integer(i) => Ok(format!("{:>width$}", i, width = VALUE_FIELD_WIDTH)),
        KeywordValue::Real(r) => {
            let formatted = format_real(*r)?;
            Ok(format!("{:>width$}", formatted, width = VALUE_FIELD_WIDTH))
        }
    }
}

fn format_real(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(FitsError::HeaderParse(format!(
            "Cannot encode non-finite value {value} in a header card"
        )));
    }
    let digits = if value >= 0.0 { 14 } else { 13 };
    let rendered = format!("{:.*E}", digits, value);
    let (mantissa, exponent) = rendered
        .split_once('E')
        .ok_or_else(|| FitsError::HeaderParse(format!("Unexpected float rendering {rendered}")))?;
    let exponent: i32 = exponent
        .parse()
        .map_err(|_| FitsError::HeaderParse(format!("Unexpected float rendering {rendered}")))?;
    let sign = if exponent < 0 { '-' } else { '+' };
    Ok(format!("{mantissa}E{sign}{:02}", exponent.abs()))
}

/// Lays out a full 80-column card.
///
/// When the rendered value overflows the 20-column field (long strings) the
/// comment is dropped and the rest of the card is blank.
pub fn format_card(keyword: &str, value: &KeywordValue, comment: Option<&str>) -> Result<String> {
    if keyword.len() > KEYWORD_SIZE || !keyword.is_ascii() {
        return Err(FitsError::HeaderParse(format!(
            "Keyword '{keyword}' must be at most {KEYWORD_SIZE} ASCII characters"
        )));
    }

    if let KeywordValue::String(text) = value {
        if !text.is_ascii() {
            return Err(FitsError::HeaderParse(format!(
                "String value for keyword {keyword} must be ASCII"
            )));
        }
    }
    check_comment(keyword, comment)?;

    let val = format_value(value)?;
    if val.len() > VALUE_FIELD_WIDTH {
        if val.len() > MAX_VALUE_LENGTH {
            return Err(FitsError::HeaderParse(format!(
                "Value for keyword {keyword} exceeds {MAX_VALUE_LENGTH} characters"
            )));
        }
        return Ok(format!(
            "{:<8}{}{}{}",
            keyword,
            VALUE_INDICATOR,
            val,
            " ".repeat(MAX_VALUE_LENGTH - val.len())
        ));
    }

    let card = match comment.filter(|c| !c.is_empty()) {
        Some(comment) => {
            let comment: String = comment.chars().take(COMMENT_WIDTH).collect();
            format!("{:<8}{}{:>20} / {:<47}", keyword, VALUE_INDICATOR, val, comment)
        }
        None => format!("{:<8}{}{:>20} {:<49}", keyword, VALUE_INDICATOR, val, " "),
    };
    Ok(card)
}

/// A card whose value field is empty, keeping its comment if any.
pub fn format_undefined_card(keyword: &str, comment: Option<&str>) -> Result<String> {
    if keyword.len() > KEYWORD_SIZE || !keyword.is_ascii() {
        return Err(FitsError::HeaderParse(format!(
            "Keyword '{keyword}' must be at most {KEYWORD_SIZE} ASCII characters"
        )));
    }
    check_comment(keyword, comment)?;

    Ok(match comment.filter(|c| !c.is_empty()) {
        Some(comment) => {
            let comment: String = comment.chars().take(COMMENT_WIDTH).collect();
            format!("{:<8}{}{:>20} / {:<47}", keyword, VALUE_INDICATOR, "", comment)
        }
        None => format!("{:<8}{}{:<70}", keyword, VALUE_INDICATOR, ""),
    })
}

fn check_comment(keyword: &str, comment: Option<&str>) -> Result<()> {
    match comment {
        Some(comment) if !comment.is_ascii() => Err(FitsError::HeaderParse(format!(
            "Comment for keyword {keyword} must be ASCII"
        ))),
        _ => Ok(()),
    }
}
