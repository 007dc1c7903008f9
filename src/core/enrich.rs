use crate::domain::model::{Sheet, TaskReport};
use crate::domain::ports::RowEnricher;

/// Where the keys come from and where the looked-up values go.
/// All indexes are 0-based; `starting_row` is the 1-based spreadsheet row.
#[derive(Debug, Clone)]
pub struct EnrichmentPlan {
    pub key_column: usize,
    pub output_columns: Vec<usize>,
    pub starting_row: usize,
    pub max_rows: usize,
}

/// The recurring row pipeline: scan rows from the starting row, skip rows
/// without a key (no lookup, no mutation), look each key up once, write
/// the resulting cells into the output columns. Rows where the enricher
/// produced nothing stay untouched and are counted as failed.
pub async fn enrich_sheet(
    sheet: &mut Sheet,
    plan: &EnrichmentPlan,
    enricher: &dyn RowEnricher,
) -> TaskReport {
    let mut report = TaskReport::default();
    let first = plan.starting_row.saturating_sub(1);

    for row in first..sheet.row_count() {
        if report.rows_processed >= plan.max_rows {
            tracing::info!("Row cap of {} reached, stopping", plan.max_rows);
            break;
        }

        let Some(key) = sheet.cell(row, plan.key_column).as_key() else {
            continue;
        };

        tracing::info!("Processing key {} in row {}", key, row + 1);
        report.rows_processed += 1;

        match enricher.enrich(&key).await {
            Some(values) => {
                for (col, value) in plan.output_columns.iter().zip(values) {
                    sheet.set_cell(row, *col, value);
                }
            }
            None => {
                report.rows_failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CellValue;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingEnricher {
        keys: Mutex<Vec<String>>,
        produce: Option<Vec<CellValue>>,
    }

    impl RecordingEnricher {
        fn producing(values: Vec<CellValue>) -> Self {
            Self {
                keys: Mutex::new(Vec::new()),
                produce: Some(values),
            }
        }

        fn empty_handed() -> Self {
            Self {
                keys: Mutex::new(Vec::new()),
                produce: None,
            }
        }
    }

    #[async_trait]
    impl RowEnricher for RecordingEnricher {
        async fn enrich(&self, key: &str) -> Option<Vec<CellValue>> {
            self.keys.lock().unwrap().push(key.to_string());
            self.produce.clone()
        }
    }

    fn sheet_with_keys(keys: &[&str]) -> Sheet {
        let mut rows = vec![vec![CellValue::text("key")]];
        for key in keys {
            rows.push(vec![CellValue::from(*key)]);
        }
        Sheet::new(rows)
    }

    fn plan() -> EnrichmentPlan {
        EnrichmentPlan {
            key_column: 0,
            output_columns: vec![1, 2],
            starting_row: 2,
            max_rows: usize::MAX,
        }
    }

    #[tokio::test]
    async fn rows_without_a_key_are_skipped_without_a_lookup() {
        let mut sheet = sheet_with_keys(&["A1", "", "A3"]);
        let before = sheet.clone();
        let enricher = RecordingEnricher::empty_handed();

        let report = enrich_sheet(&mut sheet, &plan(), &enricher).await;

        assert_eq!(
            *enricher.keys.lock().unwrap(),
            vec!["A1".to_string(), "A3".to_string()]
        );
        assert_eq!(report.rows_processed, 2);
        assert_eq!(report.rows_failed, 2);
        // Nothing produced, nothing written.
        assert_eq!(sheet, before);
    }

    #[tokio::test]
    async fn produced_values_land_in_the_output_columns() {
        let mut sheet = sheet_with_keys(&["A1"]);
        let enricher = RecordingEnricher::producing(vec![
            CellValue::text("10,00"),
            CellValue::text("12,30"),
        ]);

        let report = enrich_sheet(&mut sheet, &plan(), &enricher).await;

        assert_eq!(report.rows_processed, 1);
        assert_eq!(report.rows_failed, 0);
        assert_eq!(sheet.cell(1, 1).as_str(), Some("10,00"));
        assert_eq!(sheet.cell(1, 2).as_str(), Some("12,30"));
    }

    #[tokio::test]
    async fn row_cap_limits_lookups_not_scanned_rows() {
        let mut sheet = sheet_with_keys(&["", "A2", "A3", "A4"]);
        let enricher = RecordingEnricher::producing(vec![CellValue::text("x")]);

        let mut capped = plan();
        capped.max_rows = 2;
        let report = enrich_sheet(&mut sheet, &capped, &enricher).await;

        assert_eq!(report.rows_processed, 2);
        assert_eq!(
            *enricher.keys.lock().unwrap(),
            vec!["A2".to_string(), "A3".to_string()]
        );
    }

    #[tokio::test]
    async fn starting_row_offsets_the_scan() {
        let mut sheet = sheet_with_keys(&["A1", "A2", "A3"]);
        let enricher = RecordingEnricher::producing(vec![CellValue::text("x")]);

        let mut offset = plan();
        offset.starting_row = 4;
        enrich_sheet(&mut sheet, &offset, &enricher).await;

        assert_eq!(*enricher.keys.lock().unwrap(), vec!["A3".to_string()]);
    }
}
