// Primitives for reading Excel files.

use calamine::{DataType, Range};

use crate::tally::*;

/// Reads a worksheet of an Excel file.
///
/// Rows keep their position in the sheet: the first row of the table is row 1 of the
/// worksheet, even if the used part of the sheet starts further down.
pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> TallyResult<RawTable> {
    let wrange = get_range(path, worksheet_name)?;
    let table = range_to_table(&wrange);
    debug!(
        "read_excel_table: path: {:?} rows: {}",
        path,
        table.rows.len()
    );
    Ok(table)
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> TallyResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: using worksheet {:?}", worksheet_name);
                Ok(wrange.clone())
            }
            _ => TooManyWorksheetsSnafu {
                path,
                names: all_worksheets
                    .iter()
                    .map(|(name, _)| name.clone())
                    .collect::<Vec<String>>(),
            }
            .fail(),
        }
    }
}

fn range_to_table(wrange: &Range<DataType>) -> RawTable {
    let (row_offset, col_offset) = wrange
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let mut rows: Vec<Vec<Cell>> = vec![vec![]; row_offset];
    for row in wrange.rows() {
        let mut cells: Vec<Cell> = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(read_cell_calamine));
        rows.push(cells);
    }
    RawTable::new(rows)
}

fn read_cell_calamine(cell: &DataType) -> Cell {
    match cell {
        DataType::String(s) if s.is_empty() => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Bool(b) => Cell::Bool(*b),
        // Dates are kept as their serial number.
        DataType::DateTime(f) => Cell::Number(*f),
        // Empty cells and error values (#N/A, #REF!, ...) carry no data.
        _ => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(
            read_cell_calamine(&DataType::String("A-1".to_string())),
            Cell::Text("A-1".to_string())
        );
        assert_eq!(
            read_cell_calamine(&DataType::String("".to_string())),
            Cell::Empty
        );
        assert_eq!(read_cell_calamine(&DataType::Int(4)), Cell::Number(4.0));
        assert_eq!(read_cell_calamine(&DataType::Float(2.5)), Cell::Number(2.5));
        assert_eq!(read_cell_calamine(&DataType::Empty), Cell::Empty);
    }

    #[test]
    fn range_offsets_are_kept() {
        // Used range starting at C3.
        let mut wrange: Range<DataType> = Range::new((2, 2), (3, 3));
        wrange.set_value((2, 2), DataType::String("model".to_string()));
        wrange.set_value((2, 3), DataType::String("stan".to_string()));
        wrange.set_value((3, 2), DataType::String("A".to_string()));
        wrange.set_value((3, 3), DataType::Float(3.0));

        let table = range_to_table(&wrange);
        assert_eq!(table.rows.len(), 4);
        assert!(table.rows[0].is_empty());
        assert_eq!(table.rows[2][2], Cell::Text("model".to_string()));
        assert_eq!(table.rows[3][3], Cell::Number(3.0));

        let reference = ReferenceTable::load(&table, Some(3)).unwrap();
        assert_eq!(reference.get("A"), Some(3));
    }
}
