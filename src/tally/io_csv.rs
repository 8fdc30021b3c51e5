// Primitives for reading CSV files.

use crate::tally::*;

/// Reads all the lines of a CSV file, without interpreting any of them as a header.
pub fn read_csv_table(path: &str) -> TallyResult<RawTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_records(rdr, path)
}

pub fn read_records<R: std::io::Read>(rdr: csv::Reader<R>, path: &str) -> TallyResult<RawTable> {
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        // The index starts at 1 to respect most conventions in the excel world
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, line);
        rows.push(line.iter().map(Cell::from).collect());
    }
    Ok(RawTable::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(content: &str) -> RawTable {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());
        read_records(rdr, "inline.csv").unwrap()
    }

    #[test]
    fn rows_keep_their_position() {
        let table = read_str("Stock report,,\n,,\nlp,model,stan\n1,A-1,4\n2,B-2\n");
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.rows[0][0], Cell::Text("Stock report".to_string()));
        assert_eq!(table.rows[1], vec![Cell::Empty, Cell::Empty, Cell::Empty]);
        assert_eq!(table.rows[4].len(), 2);

        let reference = ReferenceTable::load(&table, Some(3)).unwrap();
        assert_eq!(reference.get("A-1"), Some(4));
        assert_eq!(reference.get("B-2"), Some(0));
    }

    #[test]
    fn quoted_fields() {
        let table = read_str("model,stan\n\"A, large\",\" 2 \"\n");
        let reference = ReferenceTable::load(&table, None).unwrap();
        assert_eq!(reference.get("A, large"), Some(2));
    }
}
