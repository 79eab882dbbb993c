use crate::block::Table;

/// Scan a pipe table starting at `start`.
///
/// Every contiguous line containing `delimiter` belongs to the block. The first
/// line is the header, the second is the separator and is skipped without being
/// checked, the rest are data rows.
///
/// Returns the table (if any) and the index of the first line after the block.
/// When fewer than two lines qualify the index is `start` unchanged, which tells
/// the caller this was not a table at all. A block that has no header cells or
/// no data rows is consumed but yields no table.
pub fn extract_table<S: AsRef<str>>(
    lines: &[S],
    start: usize,
    delimiter: char,
) -> (Option<Table>, usize) {
    let end = lines
        .iter()
        .skip(start)
        .position(|line| !line.as_ref().contains(delimiter))
        .map_or(lines.len(), |offset| start + offset);

    let block = &lines[start.min(end)..end];
    if block.len() < 2 {
        return (None, start);
    }

    let headers = split_row(block[0].as_ref(), delimiter);

    let rows: Vec<Vec<String>> = block[2..]
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut cells = split_row(line, delimiter);
            cells.truncate(headers.len());
            cells
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    if headers.is_empty() || rows.is_empty() {
        log::debug!("discarding table block at lines {start}..{end}: no header or data rows");
        return (None, end);
    }

    (Some(Table { headers, rows }), end)
}

/// Split a row on the delimiter, dropping the segments outside the outer pipes.
fn split_row(line: &str, delimiter: char) -> Vec<String> {
    let segments: Vec<&str> = line.split(delimiter).collect();
    if segments.len() < 2 {
        return Vec::new();
    }
    segments[1..segments.len() - 1]
        .iter()
        .map(|cell| cell.trim().to_string())
        .collect()
}
