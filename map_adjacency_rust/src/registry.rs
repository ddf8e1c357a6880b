use anyhow::{Context, Result};
use csv::ByteRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Identifier of a habitable region.
pub type RegionId = u32;

/// Number of fields a table row must carry to be registered.
pub const RECORD_FIELDS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self { Self(r, g, b) }
}

impl From<[u8; 3]> for Color {
    fn from(p: [u8; 3]) -> Self { Self(p[0], p[1], p[2]) }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self { Self(r, g, b) }
}

/// Color -> region lookup built from a definition table.
///
/// Table rows look like `id,red,green,blue,name,flag`, with csv quoting so a
/// name may contain the delimiter. Rows for uninhabitable regions lack the
/// trailing fields, so any record without exactly [`RECORD_FIELDS`] fields is
/// left out. Records that do have six fields but carry a non-numeric id or
/// channel are an error. Channels outside `0..=255` are rejected the same way,
/// not skipped.
#[derive(Debug, Clone, Default)]
pub struct ColorRegistry {
    map: HashMap<Color, RegionId>,
}

impl ColorRegistry {
    /// Build from raw text rows. The first row is a header and is dropped
    /// without looking at it.
    pub fn from_records<I, S>(records: I, delimiter: u8) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for record in records {
            text.push_str(record.as_ref());
            text.push('\n');
        }
        Self::from_reader(text.as_bytes(), delimiter)
    }

    /// Read the whole table from `reader`. Fields are handled as bytes and
    /// only the numeric columns are decoded, since name columns are often
    /// not UTF-8. When two complete rows share a color the later one wins.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut record = ByteRecord::new();
        let mut map = HashMap::new();
        let mut idx = 0u64;
        while rdr.read_byte_record(&mut record).context("reading table record")? {
            idx += 1;
            if idx == 1 || record.len() != RECORD_FIELDS {
                continue;
            }
            let line_no = record.position().map_or(idx, |p| p.line());
            let id: RegionId = parse_field(&record, 0, "id", line_no)?;
            let r: u8 = parse_field(&record, 1, "red", line_no)?;
            let g: u8 = parse_field(&record, 2, "green", line_no)?;
            let b: u8 = parse_field(&record, 3, "blue", line_no)?;
            map.insert(Color(r, g, b), id);
        }
        Ok(Self { map })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("reading color table {}", path.display()))?;
        Self::from_reader(BufReader::new(f), delimiter)
            .with_context(|| format!("parsing color table {}", path.display()))
    }

    #[inline]
    pub fn get(&self, color: &Color) -> Option<RegionId> {
        self.map.get(color).copied()
    }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (Color, RegionId)> + '_ {
        self.map.iter().map(|(c, id)| (*c, *id))
    }
}

impl FromIterator<(Color, RegionId)> for ColorRegistry {
    fn from_iter<T: IntoIterator<Item = (Color, RegionId)>>(iter: T) -> Self {
        Self { map: iter.into_iter().collect() }
    }
}

fn parse_field<T>(record: &ByteRecord, col: usize, name: &str, line_no: u64) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = String::from_utf8_lossy(&record[col]);
    let raw = raw.trim();
    raw.parse::<T>()
        .with_context(|| format!("line {line_no}: invalid {name} value {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "province;red;green;blue;x;x
1;128;34;64;Stockholm;x
2;0;36;128;Ostergotland;x
5;10;20;30
1000;5;5;5;Sea Zone
";

    #[test]
    fn header_and_short_rows_are_skipped() {
        let reg = ColorRegistry::from_reader(TABLE.as_bytes(), b';').unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(&Color(128, 34, 64)), Some(1));
        assert_eq!(reg.get(&Color(0, 36, 128)), Some(2));
        assert_eq!(reg.get(&Color(10, 20, 30)), None);
        assert_eq!(reg.get(&Color(5, 5, 5)), None);
    }

    #[test]
    fn header_is_dropped_even_when_complete() {
        let rows = ["7,1,2,3,a,x", "8,4,5,6,b,x"];
        let reg = ColorRegistry::from_records(rows, b',').unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(&Color(1, 2, 3)), None);
        assert_eq!(reg.get(&Color(4, 5, 6)), Some(8));
    }

    #[test]
    fn empty_trailing_flag_still_counts() {
        let rows = ["h", "3, 10, 20, 30 ,Name,"];
        let reg = ColorRegistry::from_records(rows, b',').unwrap();
        assert_eq!(reg.get(&Color(10, 20, 30)), Some(3));
    }

    #[test]
    fn bad_number_in_complete_row_is_fatal() {
        let rows = ["h", "1,2,3,4,a,x", "2,red,3,4,b,x"];
        let err = ColorRegistry::from_records(rows, b',').unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
        assert!(err.to_string().contains("red"), "{err}");
    }

    #[test]
    fn channel_out_of_range_is_fatal() {
        let rows = ["h", "1,256,0,0,a,x"];
        assert!(ColorRegistry::from_records(rows, b',').is_err());
    }

    #[test]
    fn bad_number_in_short_row_is_ignored() {
        let rows = ["h", "oops,1,2"];
        let reg = ColorRegistry::from_records(rows, b',').unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn non_utf8_names_do_not_abort() {
        let mut bytes = b"h;h;h;h;h;h\n4;1;2;3;".to_vec();
        bytes.extend_from_slice(&[0xC4, 0x6C, 0x76]);
        bytes.extend_from_slice(b";x\n");
        let reg = ColorRegistry::from_reader(bytes.as_slice(), b';').unwrap();
        assert_eq!(reg.get(&Color(1, 2, 3)), Some(4));
    }

    #[test]
    fn quoted_delimiter_in_name_keeps_field_count() {
        let rows = [
            "province,red,green,blue,x,x",
            "1,10,10,10,\"Aland, Islands\",x",
            "4,0,0,255,\"North, Sea\"",
        ];
        let reg = ColorRegistry::from_records(rows, b',').unwrap();
        assert_eq!(reg.get(&Color(10, 10, 10)), Some(1));
        assert_eq!(reg.get(&Color(0, 0, 255)), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn non_ascii_delimiter_splits_on_the_byte() {
        let mut bytes = Vec::new();
        for row in [&b"h\xA7h\xA7h\xA7h\xA7h\xA7h\n"[..], &b"9\xA71\xA72\xA73\xA7Name\xA7x\n"[..]] {
            bytes.extend_from_slice(row);
        }
        let reg = ColorRegistry::from_reader(bytes.as_slice(), 0xA7).unwrap();
        assert_eq!(reg.get(&Color(1, 2, 3)), Some(9));
    }

    #[test]
    fn later_row_wins_for_shared_color() {
        let rows = ["h", "1,7,7,7,First,x", "2,7,7,7,Second,x"];
        let reg = ColorRegistry::from_records(rows, b',').unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(&Color(7, 7, 7)), Some(2));
    }

    #[test]
    fn missing_table_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("definition.csv");
        let err = ColorRegistry::from_file(&path, b',').unwrap_err();
        assert!(format!("{err:#}").contains("definition.csv"), "{err:#}");
    }
}
