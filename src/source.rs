//! Where a CSV comes from and how its bytes are decoded.

use encoding_rs::{UTF_8, mem};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::error::{PipelineError, Result};
use crate::fetch::{HttpClient, fetch_bytes};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum DataSource {
    Local(PathBuf),
    Remote(String),
}

impl DataSource {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            DataSource::Remote(s.to_string())
        } else {
            DataSource::Local(PathBuf::from(s))
        }
    }

    /// Stable identifier used in cache keys and error messages.
    pub fn identifier(&self) -> String {
        match self {
            DataSource::Local(path) => path.display().to_string(),
            DataSource::Remote(url) => url.clone(),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

impl TextEncoding {
    /// Decodes `bytes`. UTF-8 input loses a leading BOM and has malformed
    /// sequences replaced; Latin-1 is strict ISO-8859-1, one byte per char.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => UTF_8.decode_with_bom_removal(bytes).0.into_owned(),
            TextEncoding::Latin1 => mem::decode_latin1(bytes).into_owned(),
        }
    }
}

/// Reads a local file or fetches a remote one.
#[tracing::instrument(skip_all, fields(source = %source))]
pub async fn read_source<C: HttpClient>(client: &C, source: &DataSource) -> Result<Vec<u8>> {
    match source {
        DataSource::Remote(url) => fetch_bytes(client, url).await,
        DataSource::Local(path) => std::fs::read(path).map_err(|e| PipelineError::Io {
            path: path.clone(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_and_local() {
        assert_eq!(
            DataSource::parse("https://example.org/a.csv"),
            DataSource::Remote("https://example.org/a.csv".into())
        );
        assert_eq!(
            DataSource::parse("data/final_sorted.csv"),
            DataSource::Local("data/final_sorted.csv".into())
        );
        // a local file that merely starts with "http"
        assert!(matches!(DataSource::parse("httpdump.csv"), DataSource::Local(_)));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Plaça" in Latin-1
        let bytes = [0x50, 0x6c, 0x61, 0xe7, 0x61];
        assert_eq!(TextEncoding::Latin1.decode(&bytes), "Plaça");
    }

    #[test]
    fn test_latin1_high_bytes_map_to_same_code_point() {
        // 0x80..=0x9F are C1 controls in ISO-8859-1, not windows-1252 glyphs
        let text = TextEncoding::Latin1.decode(&[0x80, 0x92, 0xff]);
        assert_eq!(text, "\u{80}\u{92}\u{ff}");
    }

    #[test]
    fn test_utf8_decoding_removes_bom() {
        let text = TextEncoding::Utf8.decode("\u{feff}year,month".as_bytes());
        assert_eq!(text, "year,month");
    }

    #[test]
    fn test_utf8_decoding_replaces_malformed_bytes() {
        let text = TextEncoding::Utf8.decode(&[b'a', 0xff, b'b']);
        assert_eq!(text, "a\u{fffd}b");
    }
}
