//! Minimal FITS reader: 80-byte header cards, HDU boundary discovery and
//! binary table decoding.

pub mod errors;
pub mod header;
pub mod io;
pub mod table;

pub use errors::{ErrorKind, FitsError, Result};
pub use header::{Header, HeaderCard, HeaderOptions, Keyword, KeywordValue};
pub use io::{find_hdus, verify, FitsFile, HduLocation, BLOCK_SIZE};
pub use table::{BinaryTable, ColumnFormat, FieldValue, Table, TableSource};
