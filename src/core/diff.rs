use std::collections::HashSet;

use crate::domain::model::Sheet;

/// Collects non-empty key values from one column, starting at the given
/// 1-based spreadsheet row.
pub fn collect_keys(sheet: &Sheet, key_column: usize, starting_row: usize) -> HashSet<String> {
    let first = starting_row.saturating_sub(1);
    (first..sheet.row_count())
        .filter_map(|row| sheet.cell(row, key_column).as_key())
        .collect()
}

/// Row indexes (ascending) whose key appears in `keys`. The whole sheet
/// is scanned, header included, matching the source scripts.
pub fn matching_rows(sheet: &Sheet, key_column: usize, keys: &HashSet<String>) -> Vec<usize> {
    (0..sheet.row_count())
        .filter(|row| {
            sheet
                .cell(*row, key_column)
                .as_key()
                .is_some_and(|key| keys.contains(&key))
        })
        .collect()
}

/// Removes the given rows. Deletion must run from the highest index to
/// the lowest: removing a low index first shifts every later index and
/// deletes the wrong rows.
pub fn prune_rows(sheet: &mut Sheet, mut rows: Vec<usize>) -> usize {
    rows.sort_unstable();
    rows.dedup();
    for row in rows.iter().rev() {
        sheet.remove_row(*row);
        tracing::debug!("Deleted row {}", row + 1);
    }
    rows.len()
}
