// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # CSV Loading
//!
//! Reads student and center records from delimited text.
//!
//! Students come with a header row:
//!
//! ```raw
//! StudentID,PreferredCenter
//! 1,A
//! 2,C
//! ```
//!
//! Centers have no header by default; each row is a code followed by one
//! capacity per day:
//!
//! ```raw
//! A,3,1
//! B,3,2
//! C,3,4
//! ```
//!
//! Rows of differing length are accepted here and rejected later by
//! `ProblemBuilder`, which knows how to name the offending center.

use crate::input::{CenterRecord, StudentRecord};
use std::fmt::Display;
use std::io::Read;
use std::path::Path;

/// Errors that can occur while loading input records.
#[derive(Debug)]
pub enum LoadError {
    /// An I/O error occurred while opening or reading the input.
    Io(std::io::Error),
    /// The CSV reader rejected the input.
    Csv(csv::Error),
    /// A field could not be parsed.
    Parse(ParseFieldError),
    /// A center row has no code.
    MissingCenterCode { line: u64 },
}

/// Details about a field that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFieldError {
    /// One-based line of the record.
    pub line: u64,
    /// Zero-based column of the field.
    pub column: usize,
    /// The raw text that failed to parse.
    pub token: String,
    /// The name of the type we tried to parse into.
    pub type_name: &'static str,
}

impl Display for ParseFieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}, column {}: could not parse '{}' as {}",
            self.line, self.column, self.token, self.type_name
        )
    }
}

impl std::error::Error for ParseFieldError {}

impl Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Csv(e) => write!(f, "CSV error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::MissingCenterCode { line } => write!(f, "line {line}: center row has no code"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::MissingCenterCode { .. } => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<ParseFieldError> for LoadError {
    fn from(e: ParseFieldError) -> Self {
        Self::Parse(e)
    }
}

/// A configurable loader for student and center CSV files.
///
/// # Configuration
/// * `delimiter`: field separator, `,` by default.
/// * `center_headers`: whether the center file starts with a header row
///   (default `false`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLoader {
    delimiter: u8,
    center_headers: bool,
}

impl Default for RecordLoader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            center_headers: false,
        }
    }
}

impl RecordLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[inline]
    pub fn center_headers(mut self, center_headers: bool) -> Self {
        self.center_headers = center_headers;
        self
    }

    fn builder(&self, has_headers: bool) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(has_headers)
            .flexible(true)
            .trim(csv::Trim::All);
        builder
    }

    /// Reads student records from any reader.
    pub fn students_from_reader<R: Read>(&self, reader: R) -> Result<Vec<StudentRecord>, LoadError> {
        let mut rdr = self.builder(true).from_reader(reader);
        let mut students = Vec::new();
        for record in rdr.deserialize::<StudentRecord>() {
            students.push(record?);
        }
        Ok(students)
    }

    /// Reads student records from a file.
    pub fn students_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<StudentRecord>, LoadError> {
        let file = std::fs::File::open(path)?;
        self.students_from_reader(std::io::BufReader::new(file))
    }

    /// Reads center records from any reader.
    pub fn centers_from_reader<R: Read>(&self, reader: R) -> Result<Vec<CenterRecord>, LoadError> {
        let mut rdr = self.builder(self.center_headers).from_reader(reader);
        let mut centers = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let mut fields = record.iter();
            let code = match fields.next() {
                Some(code) if !code.is_empty() => code.to_string(),
                _ => return Err(LoadError::MissingCenterCode { line }),
            };
            let capacity_by_day = fields
                .enumerate()
                .filter(|(_, token)| !token.is_empty())
                .map(|(i, token)| {
                    token.parse::<i64>().map_err(|_| ParseFieldError {
                        line,
                        column: i + 1,
                        token: token.to_string(),
                        type_name: "i64",
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            centers.push(CenterRecord::new(code, capacity_by_day));
        }
        Ok(centers)
    }

    /// Reads center records from a file.
    pub fn centers_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<CenterRecord>, LoadError> {
        let file = std::fs::File::open(path)?;
        self.centers_from_reader(std::io::BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_students_with_header() {
        let data = "StudentID,PreferredCenter\n1,A\n2, C \n";
        let students = RecordLoader::new()
            .students_from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(
            students,
            vec![StudentRecord::new(1, "A"), StudentRecord::new(2, "C")]
        );
    }

    #[test]
    fn test_students_bad_id_is_csv_error() {
        let data = "StudentID,PreferredCenter\nx,A\n";
        let err = RecordLoader::new()
            .students_from_reader(data.as_bytes())
            .unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn test_centers_without_header() {
        let data = "A,3,1\nB,3,2\nC,3,4\n";
        let centers = RecordLoader::new()
            .centers_from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(centers.len(), 3);
        assert_eq!(centers[0], CenterRecord::new("A", vec![3, 1]));
        assert_eq!(centers[2], CenterRecord::new("C", vec![3, 4]));
    }

    #[test]
    fn test_centers_with_header_and_semicolons() {
        let data = "Center;Day0;Day1\nA;1;2\n";
        let centers = RecordLoader::new()
            .delimiter(b';')
            .center_headers(true)
            .centers_from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(centers, vec![CenterRecord::new("A", vec![1, 2])]);
    }

    #[test]
    fn test_ragged_center_rows_are_kept_for_validation() {
        let data = "A,3,1\nB,3\n";
        let centers = RecordLoader::new()
            .centers_from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(centers[1].num_days(), 1);
    }

    #[test]
    fn test_negative_capacity_parses() {
        let data = "A,-1\n";
        let centers = RecordLoader::new()
            .centers_from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(centers[0].capacity_by_day, vec![-1]);
    }

    #[test]
    fn test_center_parse_error_reports_position() {
        let data = "A,3,1\nB,3,two\n";
        let err = RecordLoader::new()
            .centers_from_reader(data.as_bytes())
            .unwrap_err();
        match err {
            LoadError::Parse(e) => {
                assert_eq!(e.line, 2);
                assert_eq!(e.column, 2);
                assert_eq!(e.token, "two");
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_center_code() {
        let err = RecordLoader::new()
            .centers_from_reader(",3,1\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingCenterCode { line: 1 }));
    }

    #[test]
    fn test_load_from_paths() {
        let dir = tempfile::tempdir().unwrap();
        let students_path = dir.path().join("students.csv");
        let centers_path = dir.path().join("centers.csv");
        std::fs::File::create(&students_path)
            .unwrap()
            .write_all(b"StudentID,PreferredCenter\n10,B\n")
            .unwrap();
        std::fs::File::create(&centers_path)
            .unwrap()
            .write_all(b"A,1\nB,1\n")
            .unwrap();

        let loader = RecordLoader::new();
        assert_eq!(
            loader.students_from_path(&students_path).unwrap(),
            vec![StudentRecord::new(10, "B")]
        );
        assert_eq!(loader.centers_from_path(&centers_path).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RecordLoader::new()
            .centers_from_path("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
