use super::{FieldValue, Table};
use crate::header::{read_header, Header, HeaderOptions};
use crate::io::HduLocation;
use crate::{FitsError, Result};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Read, Seek, SeekFrom};

/// A parsed `TFORMn` value: repeat count and type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnFormat {
    pub repeat: usize,
    pub code: char,
}

impl ColumnFormat {
    pub fn parse(column: usize, format: &str) -> Result<Self> {
        let format = format.trim();
        let unsupported = || FitsError::UnsupportedColumnFormat {
            column,
            format: format.to_string(),
        };

        let digits = format.chars().take_while(|c| c.is_ascii_digit()).count();
        let repeat = if digits == 0 {
            1
        } else {
            format[..digits].parse().map_err(|_| unsupported())?
        };
        let code = format[digits..].chars().next().ok_or_else(unsupported)?;

        let parsed = Self { repeat, code };
        let size = parsed.element_size().ok_or_else(unsupported)?;
        repeat.checked_mul(size).ok_or_else(unsupported)?;
        Ok(parsed)
    }

    fn element_size(&self) -> Option<usize> {
        match self.code {
            'L' | 'B' | 'A' => Some(1),
            'I' => Some(2),
            'J' | 'E' => Some(4),
            'K' | 'D' => Some(8),
            _ => None,
        }
    }

    /// Bytes this column occupies in every row. Saturates for repeat
    /// counts that [`ColumnFormat::parse`] would have rejected.
    pub fn width(&self) -> usize {
        self.repeat.saturating_mul(self.element_size().unwrap_or(0))
    }
}

#[derive(Debug, Clone)]
struct ColumnSpec {
    name: String,
    format: ColumnFormat,
    offset: usize,
    scale: f64,
    zero: f64,
}

impl ColumnSpec {
    fn is_scaled(&self) -> bool {
        self.scale != 1.0 || self.zero != 0.0
    }
}

/// Decoder for `XTENSION = 'BINTABLE'` HDUs.
pub struct BinaryTable;

impl BinaryTable {
    /// Reads the header at `hdu` and decodes every row of its data unit.
    pub fn read<R: Read + Seek>(
        reader: &mut R,
        hdu: &HduLocation,
        options: HeaderOptions,
    ) -> Result<Table> {
        let header = read_header(reader, hdu.header_offset, options)?;
        match header.extension_type() {
            Some("BINTABLE") => {}
            other => {
                return Err(FitsError::InvalidFormat(format!(
                    "HDU at byte {} is not a binary table (XTENSION = {:?})",
                    hdu.header_offset,
                    other.unwrap_or("none")
                )))
            }
        }

        let row_size = non_negative(&header, "NAXIS1")?;
        let num_rows = non_negative(&header, "NAXIS2")?;
        let columns = Self::column_specs(&header)?;

        let described = columns
            .iter()
            .try_fold(0usize, |total, c| total.checked_add(c.format.width()))
            .ok_or_else(|| FitsError::InvalidFormat("column widths overflow".to_string()))?;
        if described != row_size {
            return Err(FitsError::InvalidFormat(format!(
                "columns describe {described} bytes per row, NAXIS1 is {row_size}"
            )));
        }

        let mut table = Table::new(columns.iter().map(|c| c.name.clone()).collect());
        if num_rows == 0 || row_size == 0 {
            return Ok(table);
        }

        let data_offset = hdu.data_offset.ok_or_else(|| {
            FitsError::InvalidFormat(format!(
                "binary table at byte {} has {num_rows} rows but no data unit",
                hdu.header_offset
            ))
        })?;

        let data_size = row_size.checked_mul(num_rows).ok_or_else(|| {
            FitsError::InvalidFormat(format!(
                "binary table of {num_rows} rows of {row_size} bytes is too large"
            ))
        })?;
        let available = reader
            .seek(SeekFrom::End(0))?
            .saturating_sub(data_offset);
        if data_size as u64 > available {
            return Err(FitsError::UnexpectedEof(format!(
                "binary table data at byte {data_offset} needs {data_size} bytes, {available} remain"
            )));
        }

        reader.seek(SeekFrom::Start(data_offset))?;
        let mut data = vec![0u8; data_size];
        reader.read_exact(&mut data).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => FitsError::UnexpectedEof(format!(
                "binary table data at byte {data_offset} is shorter than {} bytes",
                data.len()
            )),
            _ => FitsError::Io(e),
        })?;

        for row in data.chunks_exact(row_size) {
            let fields = columns
                .iter()
                .map(|spec| decode_field(&row[spec.offset..spec.offset + spec.format.width()], spec))
                .collect::<Result<Vec<_>>>()?;
            table.push_row(fields)?;
        }

        log::debug!(
            "decoded binary table: {} columns, {num_rows} rows",
            columns.len()
        );
        Ok(table)
    }

    fn column_specs(header: &Header) -> Result<Vec<ColumnSpec>> {
        let tfields = non_negative(header, "TFIELDS")?;
        let mut offset = 0;
        let mut specs = Vec::with_capacity(tfields);

        for index in 1..=tfields {
            let format_key = format!("TFORM{index}");
            let tform = header
                .get_keyword_value(&format_key)
                .and_then(|v| v.as_string())
                .ok_or(FitsError::KeywordNotFound {
                    keyword: format_key,
                })?;
            let format = ColumnFormat::parse(index, tform)?;

            let name = header
                .get_keyword_value(&format!("TTYPE{index}"))
                .and_then(|v| v.as_string())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("COL{index}"));
            let scale = header
                .get_keyword_value(&format!("TSCAL{index}"))
                .and_then(|v| v.as_real())
                .unwrap_or(1.0);
            let zero = header
                .get_keyword_value(&format!("TZERO{index}"))
                .and_then(|v| v.as_real())
                .unwrap_or(0.0);

            specs.push(ColumnSpec {
                name,
                format,
                offset,
                scale,
                zero,
            });
            offset = offset.checked_add(format.width()).ok_or_else(|| {
                FitsError::InvalidFormat(format!("column {index} starts past the addressable row"))
            })?;
        }
        Ok(specs)
    }
}

fn non_negative(header: &Header, keyword: &str) -> Result<usize> {
    let value = header.required_integer(keyword)?;
    usize::try_from(value).map_err(|_| FitsError::InvalidKeywordValue {
        keyword: keyword.to_string(),
        value: value.to_string(),
    })
}

fn decode_field(bytes: &[u8], spec: &ColumnSpec) -> Result<FieldValue> {
    if spec.format.code == 'A' {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let text = String::from_utf8_lossy(&bytes[..end]);
        return Ok(FieldValue::String(text.trim_end().to_string()));
    }

    let mut cursor = bytes;
    let mut elements = Vec::with_capacity(spec.format.repeat);
    for _ in 0..spec.format.repeat {
        elements.push(decode_element(&mut cursor, spec)?);
    }

    match elements.len() {
        1 => Ok(elements.remove(0)),
        _ => Ok(FieldValue::String(
            elements
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        )),
    }
}

fn decode_element(cursor: &mut &[u8], spec: &ColumnSpec) -> Result<FieldValue> {
    let value = match spec.format.code {
        'L' => return Ok(FieldValue::Bool(cursor.read_u8()? == b'T')),
        'B' => FieldValue::Int(cursor.read_u8()? as i64),
        'I' => FieldValue::Int(cursor.read_i16::<BigEndian>()? as i64),
        'J' => FieldValue::Int(cursor.read_i32::<BigEndian>()? as i64),
        'K' => FieldValue::Int(cursor.read_i64::<BigEndian>()?),
        'E' => FieldValue::Float(cursor.read_f32::<BigEndian>()? as f64),
        'D' => FieldValue::Float(cursor.read_f64::<BigEndian>()?),
        code => {
            return Err(FitsError::UnsupportedColumnFormat {
                column: 0,
                format: code.to_string(),
            })
        }
    };
    Ok(apply_scaling(value, spec))
}

fn apply_scaling(value: FieldValue, spec: &ColumnSpec) -> FieldValue {
    if !spec.is_scaled() {
        return value;
    }
    match value {
        // Integral offsets stay integers while the sum fits in i64. The
        // unsigned 64-bit convention (TZERO = 2^63) lands outside and
        // becomes a float.
        FieldValue::Int(v) if spec.scale == 1.0 && spec.zero.fract() == 0.0 => {
            i64::try_from(v as i128 + spec.zero as i128)
                .map(FieldValue::Int)
                .unwrap_or(FieldValue::Float(v as f64 + spec.zero))
        }
        FieldValue::Int(v) => FieldValue::Float(v as f64 * spec.scale + spec.zero),
        FieldValue::Float(v) => FieldValue::Float(v * spec.scale + spec.zero),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableSource;
    use crate::test_utils::MockFitsBuilder;
    use std::io::Cursor;

    fn catalog_bytes() -> Vec<u8> {
        let mut rows = Vec::new();
        let entries: [(&str, f64, f32, i16, bool); 2] = [
            ("star-a", 10.5, 12.25, -3, true),
            ("star-b", 350.0, -45.5, 700, false),
        ];
        for (name, ra, dec, flag, good) in entries {
            let mut label = [b' '; 8];
            label[..name.len()].copy_from_slice(name.as_bytes());
            rows.extend_from_slice(&label);
            rows.extend_from_slice(&ra.to_be_bytes());
            rows.extend_from_slice(&dec.to_be_bytes());
            rows.extend_from_slice(&flag.to_be_bytes());
            rows.push(if good { b'T' } else { b'F' });
        }

        let mut data = MockFitsBuilder::new().simple_primary().build_memory();
        data.extend(
            MockFitsBuilder::new()
                .card("XTENSION", "'BINTABLE'", "binary table")
                .card("BITPIX", "8", "")
                .card("NAXIS", "2", "")
                .card("NAXIS1", "23", "")
                .card("NAXIS2", "2", "")
                .card("PCOUNT", "0", "")
                .card("GCOUNT", "1", "")
                .card("TFIELDS", "5", "")
                .card("TTYPE1", "'NAME'", "")
                .card("TFORM1", "'8A'", "")
                .card("TTYPE2", "'RA'", "")
                .card("TFORM2", "'D'", "")
                .card("TTYPE3", "'DEC'", "")
                .card("TFORM3", "'E'", "")
                .card("TTYPE4", "'FLAGS'", "")
                .card("TFORM4", "'1I'", "")
                .card("TZERO4", "100", "")
                .card("TFORM5", "'L'", "")
                .with_data(&rows)
                .build_memory(),
        );
        data
    }

    #[test]
    fn parse_column_formats() {
        assert_eq!(
            ColumnFormat::parse(1, "20A").unwrap(),
            ColumnFormat { repeat: 20, code: 'A' }
        );
        assert_eq!(ColumnFormat::parse(1, "D").unwrap().width(), 8);
        assert_eq!(ColumnFormat::parse(1, "3J").unwrap().width(), 12);
        assert!(matches!(
            ColumnFormat::parse(2, "1PE(10)"),
            Err(FitsError::UnsupportedColumnFormat { column: 2, .. })
        ));
        assert!(ColumnFormat::parse(1, "").is_err());
    }

    #[test]
    fn decode_catalog_rows() {
        let mut cursor = Cursor::new(catalog_bytes());
        let hdu = HduLocation::new(2880, Some(5760));
        let table = BinaryTable::read(&mut cursor, &hdu, HeaderOptions::default()).unwrap();

        assert_eq!(table.column_names(), ["NAME", "RA", "DEC", "FLAGS", "COL5"]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.field(0, 0).unwrap().as_str(), Some("star-a"));
        assert_eq!(table.field(0, 1).unwrap().as_f64(), Some(10.5));
        assert_eq!(table.field(1, 2).unwrap().as_f64(), Some(-45.5));
        assert_eq!(table.field(0, 3), Some(&FieldValue::Int(97)));
        assert_eq!(table.field(1, 3), Some(&FieldValue::Int(800)));
        assert_eq!(table.field(0, 4), Some(&FieldValue::Bool(true)));
        assert_eq!(table.field(1, 4).unwrap().as_bool(), Some(false));
    }

    #[test]
    fn reject_non_table_extension() {
        let mut data = MockFitsBuilder::new().simple_primary().build_memory();
        data.extend(
            MockFitsBuilder::new()
                .card("XTENSION", "'IMAGE'", "")
                .card("BITPIX", "8", "")
                .card("NAXIS", "0", "")
                .build_memory(),
        );
        let result = BinaryTable::read(
            &mut Cursor::new(data),
            &HduLocation::new(2880, None),
            HeaderOptions::default(),
        );
        assert!(matches!(result, Err(FitsError::InvalidFormat(_))));
    }

    #[test]
    fn reject_row_size_mismatch() {
        let mut data = MockFitsBuilder::new().simple_primary().build_memory();
        data.extend(
            MockFitsBuilder::new()
                .card("XTENSION", "'BINTABLE'", "")
                .card("NAXIS1", "10", "")
                .card("NAXIS2", "0", "")
                .card("TFIELDS", "1", "")
                .card("TFORM1", "'D'", "")
                .build_memory(),
        );
        let result = BinaryTable::read(
            &mut Cursor::new(data),
            &HduLocation::new(2880, None),
            HeaderOptions::default(),
        );
        assert!(matches!(result, Err(FitsError::InvalidFormat(_))));
    }

    #[test]
    fn truncated_data_is_io_error() {
        let mut data = catalog_bytes();
        data.truncate(5770);
        let result = BinaryTable::read(
            &mut Cursor::new(data),
            &HduLocation::new(2880, Some(5760)),
            HeaderOptions::default(),
        );
        assert!(matches!(result, Err(FitsError::UnexpectedEof(_))));
    }

    #[test]
    fn vector_columns_render_as_text() {
        let spec = ColumnSpec {
            name: "FLUX".into(),
            format: ColumnFormat { repeat: 3, code: 'J' },
            offset: 0,
            scale: 1.0,
            zero: 0.0,
        };
        let mut bytes = Vec::new();
        for v in [1i32, -2, 3] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        assert_eq!(
            decode_field(&bytes, &spec).unwrap(),
            FieldValue::String("1 -2 3".to_string())
        );
    }

    #[test]
    fn fractional_scaling_yields_float() {
        let spec = ColumnSpec {
            name: "MAG".into(),
            format: ColumnFormat { repeat: 1, code: 'I' },
            offset: 0,
            scale: 0.01,
            zero: 10.0,
        };
        let value = decode_field(&250i16.to_be_bytes(), &spec).unwrap();
        let mag = value.as_f64().unwrap();
        assert!((mag - 12.5).abs() < 1e-12);
    }

    fn table_header(naxis1: &str, naxis2: &str, tform: &str) -> Vec<u8> {
        let mut data = MockFitsBuilder::new().simple_primary().build_memory();
        data.extend(
            MockFitsBuilder::new()
                .card("XTENSION", "'BINTABLE'", "")
                .card("BITPIX", "8", "")
                .card("NAXIS", "2", "")
                .card("NAXIS1", naxis1, "")
                .card("NAXIS2", naxis2, "")
                .card("TFIELDS", "1", "")
                .card("TFORM1", tform, "")
                .build_memory(),
        );
        data
    }

    #[test]
    fn oversized_table_is_format_error() {
        let data = table_header("4611686018427387904", "8", "'4611686018427387904A'");
        let result = BinaryTable::read(
            &mut Cursor::new(data),
            &HduLocation::new(2880, Some(5760)),
            HeaderOptions::default(),
        );
        assert!(matches!(result, Err(FitsError::InvalidFormat(_))));
    }

    #[test]
    fn overflowing_repeat_count_is_rejected() {
        assert!(matches!(
            ColumnFormat::parse(1, "4611686018427387904D"),
            Err(FitsError::UnsupportedColumnFormat { column: 1, .. })
        ));
    }

    #[test]
    fn table_larger_than_stream_fails_before_reading() {
        let data = table_header("1099511627776", "1", "'1099511627776A'");
        let result = BinaryTable::read(
            &mut Cursor::new(data),
            &HduLocation::new(2880, Some(5760)),
            HeaderOptions::default(),
        );
        assert!(matches!(result, Err(FitsError::UnexpectedEof(_))));
    }

    #[test]
    fn unsigned_offset_beyond_i64_yields_float() {
        let spec = ColumnSpec {
            name: "ID".into(),
            format: ColumnFormat { repeat: 1, code: 'K' },
            offset: 0,
            scale: 1.0,
            zero: 9.223372036854775808e18,
        };
        let value = decode_field(&5i64.to_be_bytes(), &spec).unwrap();
        assert_eq!(value, FieldValue::Float(2f64.powi(63) + 5.0));

        let value = decode_field(&i64::MIN.to_be_bytes(), &spec).unwrap();
        assert_eq!(value, FieldValue::Int(0));
    }
}
