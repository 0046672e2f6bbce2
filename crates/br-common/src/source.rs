//! Sheet-export input boundary.
//!
//! The spreadsheet/auth glue lives outside this engine; it dumps the
//! 배달로그 worksheet as a JSON export (`{title, headers, rows}`, all cells
//! as strings). Header names are resolved into a typed column map exactly
//! once, so everything downstream addresses cells by index and only ever
//! sees the closed [`RawLogRow`] record.

use serde::Deserialize;
use thiserror::Error;

/// 배달로그 시트 헤더 (원본 시트 표기 그대로).
pub const COL_RIDER_ID: &str = "라이더_ID";
pub const COL_DATE: &str = "날짜";
pub const COL_DELIVERY_COUNT: &str = "배달건수";
pub const COL_IS_RAINY: &str = "우천여부";
pub const COL_HAS_SURGE: &str = "할증여부";
pub const COL_DISTRICT: &str = "배달구역";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read sheet export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse sheet export: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("sheet export is missing required column {0:?}")]
    MissingColumn(&'static str),
}

/// One worksheet dumped by the external sheet fetcher.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetExport {
    #[serde(default)]
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetExport {
    pub fn from_path(path: &std::path::Path) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Resolve the column map against this export's header row.
    pub fn column_map(&self) -> Result<ColumnMap, SourceError> {
        ColumnMap::resolve(&self.headers)
    }

    /// Iterate data rows as closed records. Row numbers are sheet-style:
    /// the header row is row 1, data starts at row 2.
    pub fn raw_rows(&self, map: ColumnMap) -> impl Iterator<Item = RawLogRow<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(index, row)| map.raw_row(row, index + 2))
    }
}

/// Header-name → column-index mapping, validated once per export.
///
/// 라이더_ID / 날짜 / 배달건수 are required; the remaining columns fall back
/// to absent cells (booleans default false, district defaults empty).
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    rider_id: usize,
    date: usize,
    delivery_count: usize,
    is_rainy: Option<usize>,
    has_surge: Option<usize>,
    district: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Result<Self, SourceError> {
        let find = |name: &'static str| headers.iter().position(|h| h.trim() == name);
        let require =
            |name: &'static str| find(name).ok_or(SourceError::MissingColumn(name));

        Ok(Self {
            rider_id: require(COL_RIDER_ID)?,
            date: require(COL_DATE)?,
            delivery_count: require(COL_DELIVERY_COUNT)?,
            is_rainy: find(COL_IS_RAINY),
            has_surge: find(COL_HAS_SURGE),
            district: find(COL_DISTRICT),
        })
    }

    fn raw_row<'a>(&self, row: &'a [String], row_number: usize) -> RawLogRow<'a> {
        let cell = |index: usize| {
            row.get(index)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        RawLogRow {
            row_number,
            rider_id: cell(self.rider_id),
            date: cell(self.date),
            delivery_count: cell(self.delivery_count),
            is_rainy: self.is_rainy.and_then(cell),
            has_surge: self.has_surge.and_then(cell),
            district: self.district.and_then(cell),
        }
    }
}

/// One sheet row addressed through the column map. Cells stay raw strings;
/// validation happens in [`crate::ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogRow<'a> {
    /// 1-based sheet row number (header row is 1), for log context.
    pub row_number: usize,
    pub rider_id: Option<&'a str>,
    pub date: Option<&'a str>,
    pub delivery_count: Option<&'a str>,
    pub is_rainy: Option<&'a str>,
    pub has_surge: Option<&'a str>,
    pub district: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export(headers: &[&str], rows: &[&[&str]]) -> SheetExport {
        SheetExport {
            title: "배달로그".into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn resolves_columns_in_any_order() {
        let export = export(
            &["배달구역", "날짜", "라이더_ID", "배달건수", "할증여부", "우천여부"],
            &[&["강남구", "2025-06-02", "BC000001", "5", "no", "yes"]],
        );
        let map = export.column_map().unwrap();
        let rows: Vec<_> = export.raw_rows(map).collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].rider_id, Some("BC000001"));
        assert_eq!(rows[0].date, Some("2025-06-02"));
        assert_eq!(rows[0].delivery_count, Some("5"));
        assert_eq!(rows[0].is_rainy, Some("yes"));
        assert_eq!(rows[0].has_surge, Some("no"));
        assert_eq!(rows[0].district, Some("강남구"));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let export = export(&["라이더_ID", "날짜"], &[]);
        match export.column_map() {
            Err(SourceError::MissingColumn(name)) => assert_eq!(name, COL_DELIVERY_COUNT),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn short_and_padded_cells_become_absent() {
        let export = export(
            &["라이더_ID", "날짜", "배달건수"],
            &[&["BC000001", "  "], &[]],
        );
        let map = export.column_map().unwrap();
        let rows: Vec<_> = export.raw_rows(map).collect();

        assert_eq!(rows[0].rider_id, Some("BC000001"));
        assert_eq!(rows[0].date, None);
        assert_eq!(rows[0].delivery_count, None);
        assert_eq!(rows[1].rider_id, None);
    }

    #[test]
    fn parses_export_json() {
        let raw = r#"{
            "title": "배달로그",
            "headers": ["라이더_ID", "날짜", "배달건수"],
            "rows": [["BC000001", "2025-06-02", "5"]]
        }"#;
        let export: SheetExport = serde_json::from_str(raw).unwrap();
        assert_eq!(export.rows.len(), 1);
        assert!(export.column_map().is_ok());
    }
}
