pub mod card;
pub mod keywords;
pub mod parser;

pub use card::{
    format_card, format_undefined_card, format_value, parse_card, HeaderCard, CARD_SIZE,
};
pub use keywords::{Keyword, KeywordValue};
pub use parser::{header_size_bytes, read_header, Header, HeaderOptions};
