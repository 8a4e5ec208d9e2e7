use crate::header::{read_header, Header, HeaderOptions};
use crate::io::scanner::{find_hdus, verify, HduLocation};
use crate::table::{BinaryTable, Table};
use crate::{FitsError, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// A FITS stream with its HDU boundaries already located.
#[derive(Debug)]
pub struct FitsFile<R> {
    reader: R,
    hdus: Vec<HduLocation>,
}

impl FitsFile<BufReader<File>> {
    /// Verifies the file structure, then scans it for HDUs.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        verify(path)?;
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> FitsFile<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let hdus = find_hdus(&mut reader)?;
        Ok(Self { reader, hdus })
    }

    pub fn num_hdus(&self) -> usize {
        self.hdus.len()
    }

    pub fn hdus(&self) -> &[HduLocation] {
        &self.hdus
    }

    pub fn hdu(&self, index: usize) -> Result<HduLocation> {
        self.hdus
            .get(index)
            .copied()
            .ok_or(FitsError::HduNotFound(index))
    }

    pub fn read_header(&mut self, index: usize, options: HeaderOptions) -> Result<Header> {
        let hdu = self.hdu(index)?;
        read_header(&mut self.reader, hdu.header_offset, options)
    }

    pub fn primary_header(&mut self) -> Result<Header> {
        self.read_header(0, HeaderOptions::default())
    }

    /// Decodes the binary table stored in HDU `index`.
    pub fn read_table(&mut self, index: usize, options: HeaderOptions) -> Result<Table> {
        let hdu = self.hdu(index)?;
        BinaryTable::read(&mut self.reader, &hdu, options)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
