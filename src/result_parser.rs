use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{BatchError, Result};

pub const DELIMITER: char = ';';

/// One solved instance as written by a solver: `<instance>;<value>;...`.
/// Columns after the value are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub instance: String,
    pub value: String,
}

impl ResultRow {
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split(DELIMITER);
        let instance = fields.next()?.trim();
        let value = fields.next()?.trim();
        Some(Self {
            instance: instance.to_string(),
            value: value.to_string(),
        })
    }
}

/// Rows of one solver's result log, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLog {
    pub path: PathBuf,
    pub rows: Vec<ResultRow>,
}

impl ResultLog {
    pub fn read(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| BatchError::io(path, e))?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let rows = content
            .lines()
            .enumerate()
            .map(|(i, line)| {
                ResultRow::parse(line).ok_or_else(|| BatchError::MalformedRow {
                    file: path.to_path_buf(),
                    line: i + 1,
                    content: line.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            path: path.to_path_buf(),
            rows,
        })
    }

    /// Header label: the file name without its extension.
    pub fn column_name(&self) -> String {
        self.path
            .file_stem()
            .unwrap_or(self.path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    pub fn instances(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.instance.clone()).collect()
    }

    pub fn values(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.value.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Comma as decimal separator: `12.5` becomes `12,5`.
pub fn localize_decimal(value: &str) -> String {
    value.replace('.', ",")
}
