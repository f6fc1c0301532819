//! Column labels and status constants of the check-in export.
//!
//! Defaults match the Chinese-locale export of the check-in platform. A
//! different locale only needs a JSON file overriding the labels; fields left
//! out keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};

pub const DEFAULT_NAME_COLUMN: &str = "姓名";
pub const DEFAULT_IDENTITY_COLUMN: &str = "学号/工号";
pub const DEFAULT_INSTITUTION_COLUMN: &str = "学校";
pub const DEFAULT_DEPARTMENT_COLUMN: &str = "院系";
pub const DEFAULT_MAJOR_COLUMN: &str = "专业";
pub const DEFAULT_CLASS_COLUMN: &str = "行政班级";
pub const DEFAULT_STATUS_COLUMN: &str = "签到状态";
pub const DEFAULT_PRESENT_VALUE: &str = "已签";
pub const DEFAULT_ABSENT_VALUE: &str = "未参与";
pub const DEFAULT_SIGNAL_COLUMN: &str = "签到统计";
pub const DEFAULT_TOTAL_COLUMN: &str = "总签到次数";
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_统计结果";
pub const DEFAULT_SUMMARY_FILE_NAME: &str = "学习通签到汇总表.xlsx";

/// Labels, status values and output naming for one export layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub name_column: String,
    pub identity_column: String,
    pub institution_column: String,
    pub department_column: String,
    pub major_column: String,
    pub class_column: String,
    /// Status column label; also the marker used to find the header row.
    pub status_column: String,
    pub present_value: String,
    pub absent_value: String,
    /// Column appended to each normalized per-file table.
    pub signal_column: String,
    /// Column holding the per-person total in the summary table.
    pub total_column: String,
    /// Appended to the input file stem to name the per-file artifact.
    pub output_suffix: String,
    pub summary_file_name: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            name_column: DEFAULT_NAME_COLUMN.to_string(),
            identity_column: DEFAULT_IDENTITY_COLUMN.to_string(),
            institution_column: DEFAULT_INSTITUTION_COLUMN.to_string(),
            department_column: DEFAULT_DEPARTMENT_COLUMN.to_string(),
            major_column: DEFAULT_MAJOR_COLUMN.to_string(),
            class_column: DEFAULT_CLASS_COLUMN.to_string(),
            status_column: DEFAULT_STATUS_COLUMN.to_string(),
            present_value: DEFAULT_PRESENT_VALUE.to_string(),
            absent_value: DEFAULT_ABSENT_VALUE.to_string(),
            signal_column: DEFAULT_SIGNAL_COLUMN.to_string(),
            total_column: DEFAULT_TOTAL_COLUMN.to_string(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            summary_file_name: DEFAULT_SUMMARY_FILE_NAME.to_string(),
        }
    }
}

impl SchemaConfig {
    /// The marker that identifies the true header row.
    pub fn header_marker(&self) -> &str {
        &self.status_column
    }

    /// Required columns in canonical order. Validation reports the first one
    /// missing in this order.
    pub fn required_columns(&self) -> [&str; 7] {
        [
            self.name_column.as_str(),
            self.identity_column.as_str(),
            self.institution_column.as_str(),
            self.department_column.as_str(),
            self.major_column.as_str(),
            self.class_column.as_str(),
            self.status_column.as_str(),
        ]
    }

    /// The six identity columns used as the summary table's leading columns.
    pub fn identity_columns(&self) -> [&str; 6] {
        [
            self.name_column.as_str(),
            self.identity_column.as_str(),
            self.institution_column.as_str(),
            self.department_column.as_str(),
            self.major_column.as_str(),
            self.class_column.as_str(),
        ]
    }

    /// Load a schema from a JSON file; absent fields keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| TallyError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let schema: SchemaConfig = serde_json::from_str(&content)?;
        schema.validate()?;
        Ok(schema)
    }

    fn validate(&self) -> Result<()> {
        if self.status_column.trim().is_empty() {
            return Err(TallyError::Config(
                "status_column must not be empty".to_string(),
            ));
        }
        if self.present_value.trim() == self.absent_value.trim() {
            return Err(TallyError::Config(
                "present_value and absent_value must differ".to_string(),
            ));
        }
        Ok(())
    }
}
