use crate::header::card::{format_card, format_undefined_card, parse_card, CARD_SIZE};
use crate::header::{Keyword, KeywordValue};
use crate::io::{pad_length, read_fully};
use crate::{FitsError, Result};
use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};

const END_CARD: &[u8; 8] = b"END     ";

/// An ordered keyword/value/comment model of one header block.
///
/// Insertion order is kept in `keywords`; `keyword_index` maps a name to
/// its position so lookups do not depend on iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    keywords: Vec<Keyword>,
    keyword_index: HashMap<String, usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderOptions {
    /// Drop repeated keywords silently instead of failing.
    pub allow_duplicate_keywords: bool,
}

impl HeaderOptions {
    pub fn permissive() -> Self {
        Self {
            allow_duplicate_keywords: true,
        }
    }
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a keyword, rejecting names already present.
    pub fn add_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.keyword_index.contains_key(&keyword.name) {
            return Err(FitsError::DuplicateKeyword(keyword.name));
        }
        self.keyword_index
            .insert(keyword.name.clone(), self.keywords.len());
        self.keywords.push(keyword);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keyword_index.contains_key(name)
    }

    pub fn get_keyword(&self, name: &str) -> Option<&Keyword> {
        self.keyword_index
            .get(name)
            .and_then(|&index| self.keywords.get(index))
    }

    pub fn get_keyword_value(&self, name: &str) -> Option<&KeywordValue> {
        self.get_keyword(name)?.value.as_ref()
    }

    pub fn get_comment(&self, name: &str) -> Option<&str> {
        self.get_keyword(name)?.comment.as_deref()
    }

    pub fn required_integer(&self, name: &str) -> Result<i64> {
        self.get_keyword_value(name)
            .and_then(|v| v.as_integer())
            .ok_or_else(|| FitsError::KeywordNotFound {
                keyword: name.to_string(),
            })
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn is_primary(&self) -> bool {
        self.keywords.first().is_some_and(|k| k.name == "SIMPLE")
    }

    /// Extension type with trailing padding removed, e.g. `BINTABLE`.
    pub fn extension_type(&self) -> Option<&str> {
        self.get_keyword_value("XTENSION")
            .and_then(|v| v.as_string())
            .map(str::trim)
    }

    /// Serializes the header back to cards in insertion order, terminated
    /// by an `END` card. With `pad` the output is blank-filled to a whole
    /// number of blocks.
    pub fn to_card_string(&self, pad: bool) -> Result<String> {
        let mut out = String::with_capacity((self.keywords.len() + 1) * CARD_SIZE);
        for keyword in &self.keywords {
            match &keyword.value {
                Some(value) => out.push_str(&format_card(
                    &keyword.name,
                    value,
                    keyword.comment.as_deref(),
                )?),
                None => out.push_str(&format_undefined_card(
                    &keyword.name,
                    keyword.comment.as_deref(),
                )?),
            }
        }
        out.push_str(&format!("{:<80}", "END"));

        if pad {
            let padding = pad_length(out.len() as u64) as usize;
            out.push_str(&" ".repeat(padding));
        }
        Ok(out)
    }
}

/// Reads the header starting at `offset`.
///
/// The first card must be `SIMPLE` for the primary header (offset 0) and
/// `XTENSION` otherwise. Cards are consumed until the `END` card; commentary
/// cards are skipped.
pub fn read_header<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    options: HeaderOptions,
) -> Result<Header> {
    reader.seek(SeekFrom::Start(offset))?;

    let mut raw = [0u8; CARD_SIZE];
    if read_fully(reader, &mut raw)? < CARD_SIZE {
        return Err(FitsError::UnexpectedEof(format!(
            "cannot read header card at byte {offset}"
        )));
    }

    let first = parse_card(&raw)?;
    let expected = if offset == 0 { "SIMPLE" } else { "XTENSION" };
    let keyword = match first.to_keyword() {
        Some(keyword) if keyword.name == expected => keyword,
        other => {
            return Err(FitsError::InvalidFormat(format!(
                "first keyword at byte {offset} is {:?}, expected {expected}",
                other.map(|k| k.name).unwrap_or_default()
            )))
        }
    };

    let mut header = Header::new();
    header.add_keyword(keyword)?;

    loop {
        if read_fully(reader, &mut raw)? < CARD_SIZE {
            return Err(FitsError::UnexpectedEof(format!(
                "header at byte {offset} has no END card"
            )));
        }
        if &raw[..8] == END_CARD {
            break;
        }

        let Some(keyword) = parse_card(&raw)?.to_keyword() else {
            continue;
        };
        if header.contains(&keyword.name) {
            if options.allow_duplicate_keywords {
                log::debug!("dropping repeated keyword {}", keyword.name);
                continue;
            }
            return Err(FitsError::DuplicateKeyword(keyword.name));
        }
        header.add_keyword(keyword)?;
    }

    log::trace!(
        "read {} keywords from header at byte {offset}",
        header.len()
    );
    Ok(header)
}

/// Number of bytes a header occupies on disk once padded to whole blocks.
pub fn header_size_bytes(header: &Header) -> u64 {
    let cards = (header.len() + 1) as u64 * CARD_SIZE as u64;
    cards + pad_length(cards)
}
