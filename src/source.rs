use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{MapError, Result};
use crate::model::Record;

const DELIMITER: char = ';';
const QUOTE: char = '"';

/// Semicolon-delimited postal-code data stored in a `.csv` file or inside a `.zip` archive.
#[derive(Debug, Clone)]
pub struct RecordSource {
    path: PathBuf,
}

impl RecordSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_zip(&self) -> bool {
        self.path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    }

    /// Reads all data rows. The header row and empty lines are skipped.
    pub fn read_records(&self) -> Result<Vec<Record>> {
        let records = if self.is_zip() {
            self.read_zip()?
        } else {
            debug!("Reading CSV file: {:?}", self.path);
            let file = File::open(&self.path)?;
            read_records(BufReader::new(file))?
        };

        info!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn read_zip(&self) -> Result<Vec<Record>> {
        let file = File::open(&self.path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        // 最初に見つかったCSVエントリを読む
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            if entry.is_dir() || !entry.name().to_lowercase().ends_with(".csv") {
                continue;
            }

            debug!("Reading CSV entry {} from {:?}", entry.name(), self.path);
            return read_records(BufReader::new(entry));
        }

        Err(MapError::MissingCsvEntry(self.path.clone()))
    }
}

/// Reads semicolon-delimited records from `reader`, skipping the header row.
///
/// Invalid UTF-8 is replaced with U+FFFD instead of failing the whole file.
/// A quoted field may span several lines.
pub fn read_records<R: Read>(mut reader: BufReader<R>) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut pending = String::new();
    let mut header_seen = false;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);

        if !pending.is_empty() {
            pending.push('\n');
        }
        pending.push_str(line);

        let (fields, open_quote) = scan_fields(&pending);
        if open_quote {
            // 引用符が閉じるまで次の行を連結する
            continue;
        }
        if !header_seen {
            header_seen = true;
        } else if !pending.trim().is_empty() {
            records.push(fields);
        }
        pending.clear();
    }

    if !pending.is_empty() && header_seen {
        debug!("Unterminated quoted field at end of input");
        records.push(split_fields(&pending));
    }

    Ok(records)
}

/// Splits one line on `;`. Double-quoted fields may contain `;` and `""` escapes.
pub fn split_fields(line: &str) -> Record {
    scan_fields(line).0
}

/// Splits `text` into fields and reports whether a quoted field is still open at the end.
fn scan_fields(text: &str) -> (Record, bool) {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            QUOTE if in_quotes => {
                if chars.peek() == Some(&QUOTE) {
                    field.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            QUOTE if field.is_empty() => in_quotes = true,
            DELIMITER if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    (fields, in_quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const SAMPLE_CSV: &str = "\
country code;postal code;place name;admin name1;admin code1;admin name2;admin code2;admin name3;admin code3;latitude;longitude;accuracy
US;19019;Philadelphia;Pennsylvania;PA;Philadelphia;101;;;40.0;-75.0;4
US;10001;New York;New York;NY;New York;061;;;41.0;-74.0;4

CA;H0H;\"Reserved; Santa\";Quebec;QC;;;;;45.0;-75.0;6
";

    #[test]
    fn test_split_plain_fields() {
        assert_eq!(split_fields("a;b;;c"), vec!["a", "b", "", "c"]);
        assert_eq!(split_fields(""), vec![""]);
        assert_eq!(split_fields("x;"), vec!["x", ""]);
    }

    #[test]
    fn test_split_quoted_fields() {
        assert_eq!(
            split_fields("\"a;b\";\"say \"\"hi\"\"\";c"),
            vec!["a;b", "say \"hi\"", "c"]
        );
        // 途中に現れる引用符はそのまま残す
        assert_eq!(split_fields("5\"10;x"), vec!["5\"10", "x"]);
    }

    #[test]
    fn test_read_records_skips_header_and_blank_lines() {
        let records = read_records(BufReader::new(Cursor::new(SAMPLE_CSV))).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0][0], "US");
        assert_eq!(records[0][9], "40.0");
        assert_eq!(records[0][10], "-75.0");
        assert_eq!(records[2][2], "Reserved; Santa");
        assert_eq!(records[2].len(), 12);
    }

    #[test]
    fn test_read_records_handles_crlf() {
        let csv = "header\r\nUS;a\r\nCA;b\r\n";
        let records = read_records(BufReader::new(Cursor::new(csv))).unwrap();
        assert_eq!(records, vec![vec!["US", "a"], vec!["CA", "b"]]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_fatal() {
        let mut csv = b"header\nUS;a;;;;;;;;40.0;-75.0\nUS;S".to_vec();
        csv.push(0xe3);
        csv.extend_from_slice(b"o;;;;;;;;41.0;-74.0\n");

        let records = read_records(BufReader::new(Cursor::new(csv))).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1][1], "S\u{FFFD}o");
        assert_eq!(records[1][9], "41.0");
        assert_eq!(records[1][10], "-74.0");
    }

    #[test]
    fn test_quoted_field_spanning_lines() {
        let csv = "header\nUS;\"Line one\nline two\";x\r\nCA;b\n";
        let records = read_records(BufReader::new(Cursor::new(csv))).unwrap();

        assert_eq!(
            records,
            vec![vec!["US", "Line one\nline two", "x"], vec!["CA", "b"]]
        );
    }

    #[test]
    fn test_quoted_newline_in_header_is_skipped_whole() {
        let csv = "\"multi\nline header\";x\nUS;a\n";
        let records = read_records(BufReader::new(Cursor::new(csv))).unwrap();
        assert_eq!(records, vec![vec!["US", "a"]]);
    }

    #[test]
    fn test_read_csv_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("postal.csv");
        std::fs::write(&path, SAMPLE_CSV).unwrap();

        let records = RecordSource::open(&path).read_records().unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_read_zip_archive() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("postal.zip");

        let file = File::create(&path).unwrap();
        let mut writer = ZipWriter::new(file);
        writer
            .start_file("README.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"not csv").unwrap();
        writer
            .start_file("geonames-postal-code.CSV", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(SAMPLE_CSV.as_bytes()).unwrap();
        writer.finish().unwrap();

        let records = RecordSource::open(&path).read_records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1][2], "New York");
    }

    #[test]
    fn test_zip_without_csv_entry() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.zip");

        let file = File::create(&path).unwrap();
        let mut writer = ZipWriter::new(file);
        writer
            .start_file("notes.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"nothing here").unwrap();
        writer.finish().unwrap();

        let result = RecordSource::open(&path).read_records();
        assert!(matches!(result, Err(MapError::MissingCsvEntry(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = RecordSource::open(temp_dir.path().join("missing.csv")).read_records();
        assert!(matches!(result, Err(MapError::Io(_))));
    }
}
