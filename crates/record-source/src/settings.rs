//! CSV parse settings.

/// Configuration for parsing a CSV file into a [`crate::RecordTable`].
#[derive(Debug, Clone)]
pub struct CsvSettings {
    /// Field delimiter (default: `,`)
    pub delimiter: u8,

    /// Whether the first row is a header row (default: true)
    pub has_headers: bool,

    /// Quote character (default: `"`)
    pub quote: u8,

    /// Optional comment character; lines starting with it are skipped
    pub comment: Option<u8>,

    /// Optional escape character; when unset, doubled quotes escape quotes
    pub escape: Option<u8>,

    /// Optional column names used when `has_headers` is false.
    /// When absent, columns are named `column_0`, `column_1`, ...
    pub column_names: Option<Vec<String>>,
}

impl Default for CsvSettings {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            quote: b'"',
            comment: None,
            escape: None,
            column_names: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = CsvSettings::default();
        assert_eq!(settings.delimiter, b',');
        assert!(settings.has_headers);
        assert_eq!(settings.quote, b'"');
        assert_eq!(settings.comment, None);
        assert_eq!(settings.escape, None);
        assert_eq!(settings.column_names, None);
    }
}
