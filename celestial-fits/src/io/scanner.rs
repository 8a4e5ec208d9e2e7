//! Structural verification and header/data boundary discovery.
//!
//! FITS carries no length-prefixed framing, so boundaries are found by
//! walking the stream in 2880-byte blocks. A header block ends when its last
//! non-blank card is `END`; what follows is either another header
//! (`XTENSION`), a data unit, or end of file. Data units are skipped block
//! by block until a null pad byte is followed by `XTENSION` or EOF.

use crate::header::CARD_SIZE;
use crate::io::{read_fully, BLOCK_SIZE};
use crate::{FitsError, Result};
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

const KEYWORD_SIZE: usize = 8;
const SIMPLE: &[u8] = b"SIMPLE";
const XTENSION: &[u8] = b"XTENSION";

/// Byte offsets of one header/data unit. Both are multiples of the block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HduLocation {
    pub header_offset: u64,
    pub data_offset: Option<u64>,
}

impl HduLocation {
    pub fn new(header_offset: u64, data_offset: Option<u64>) -> Self {
        Self {
            header_offset,
            data_offset,
        }
    }
}

/// Cheap structural check: `SIMPLE` magic and block-aligned size.
pub fn verify<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FitsError::NotFound(path.to_path_buf()));
    }

    let size = fs::metadata(path)?.len();
    if !size.is_multiple_of(BLOCK_SIZE) {
        return Err(FitsError::InvalidFormat(format!(
            "file size {size} is not aligned to {BLOCK_SIZE}-byte blocks"
        )));
    }

    let mut magic = [0u8; 6];
    let read = read_fully(&mut File::open(path)?, &mut magic)?;
    if read < magic.len() || magic != SIMPLE {
        return Err(FitsError::InvalidFormat(format!(
            "{} does not start with SIMPLE",
            path.display()
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    Header,
    Data,
}

/// Locates every HDU in the stream, in file order.
pub fn find_hdus<R: Read + Seek>(reader: &mut R) -> Result<Vec<HduLocation>> {
    let mut hdus = Vec::new();
    let mut header_offset = 0u64;
    let mut location = 0u64;
    let mut mode = ScanMode::Header;

    loop {
        location += BLOCK_SIZE;

        match mode {
            ScanMode::Header => {
                let last_card = last_nonblank_card(reader, location)?;
                if last_card != b"END" {
                    continue;
                }

                let key = peek_keyword(reader, location)?;
                if key.is_empty() {
                    hdus.push(HduLocation::new(header_offset, None));
                    break;
                } else if key == XTENSION {
                    hdus.push(HduLocation::new(header_offset, None));
                    header_offset = location;
                } else {
                    hdus.push(HduLocation::new(header_offset, Some(location)));
                    mode = ScanMode::Data;
                }
            }
            ScanMode::Data => {
                reader.seek(SeekFrom::Start(location - 1))?;
                let mut byte = [0u8; 1];
                if read_fully(reader, &mut byte)? == 0 {
                    return Err(FitsError::UnexpectedEof(format!(
                        "data unit ends before byte {location}"
                    )));
                }

                let key = peek_keyword(reader, location)?;
                if key.is_empty() {
                    break;
                }
                if byte[0] == 0 && key == XTENSION {
                    header_offset = location;
                    mode = ScanMode::Header;
                }
            }
        }
    }

    log::debug!("found {} HDUs", hdus.len());
    Ok(hdus)
}

/// Reads the block ending at `block_end` backwards, card by card, and
/// returns the last card with trailing blanks removed.
fn last_nonblank_card<R: Read + Seek>(reader: &mut R, block_end: u64) -> Result<Vec<u8>> {
    let block_start = block_end - BLOCK_SIZE;
    let mut card_location = block_end - CARD_SIZE as u64;
    let mut card = [0u8; CARD_SIZE];

    loop {
        reader.seek(SeekFrom::Start(card_location))?;
        if read_fully(reader, &mut card)? == 0 {
            return Err(FitsError::UnexpectedEof(format!(
                "header starting before byte {block_end} has no END card"
            )));
        }

        let trimmed = trim_trailing_blanks(&card);
        if !trimmed.is_empty() {
            return Ok(trimmed.to_vec());
        }

        if card_location == block_start {
            return Err(FitsError::BlankHeaderBlock(block_start));
        }
        card_location -= CARD_SIZE as u64;
    }
}

fn peek_keyword<R: Read + Seek>(reader: &mut R, location: u64) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(location))?;
    let mut key = [0u8; KEYWORD_SIZE];
    let read = read_fully(reader, &mut key)?;
    Ok(key[..read].to_vec())
}

fn trim_trailing_blanks(card: &[u8]) -> &[u8] {
    let end = card
        .iter()
        .rposition(|&b| b != b' ')
        .map_or(0, |i| i + 1);
    &card[..end]
}
