//! Ingestion 错误类型

use std::path::PathBuf;

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 文件读取失败
    #[error("failed to read {path}: {source}")]
    Io {
        /// 文件路径
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 表格为空 (没有表头)
    #[error("table {source_name} has no header row")]
    Empty {
        /// 数据来源
        source_name: String,
    },

    /// 缺少必需列
    #[error("table {source_name} is missing column '{column}'")]
    MissingColumn {
        /// 数据来源
        source_name: String,
        /// 列名
        column: String,
    },

    /// 单元格解析失败
    #[error("line {line}, column '{column}': cannot parse '{value}'")]
    Parse {
        /// 行号 (从 1 开始，含表头)
        line: usize,
        /// 列名
        column: String,
        /// 原始值
        value: String,
    },

    /// 行宽与表头不一致
    #[error("line {line}: expected {expected} fields, found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl IngestionError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(line: usize, column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
