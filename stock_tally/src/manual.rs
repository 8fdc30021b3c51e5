/*!

This is the long-form manual for `stock_tally` and `stocktally`.

## Stock file

The expected inventory is read from a spreadsheet (`.xlsx`) or a CSV file. Two columns are
required, in any position and with any capitalization:

* `model` the code of the item, as printed on its label
* `stan` the number of items that should be in stock

Many inventory exports start with a title block. The row that holds the column names can be
set with `--header-row` (counted from 1, as in spreadsheet programs). Everything below
it is read as data:

|    | A            | B     | C    |
|----|--------------|-------|------|
| 1  | Warehouse 3  |       |      |
| 2  |              |       |      |
| 3  | lp           | Model | Stan |
| 4  | 1            | A-100 | 5    |
| 5  | 2            | B-200 | 2    |

In this example, the header row is `3`.

Counts that cannot be read as a number count as `0`. When an item code appears on several
rows, the last row wins.

## Scans

Scans come from three places:
* scan logs (`--scans`), text files with one code per line, as written by handheld
  scanners or QR decoding tools. Each file counts as one capture: a file given twice in a
  row is only counted once.
* manual entries (`--code`), one observation per flag
* the standard input (`--stdin`), one code per line

Blank lines are ignored. Codes are compared after trimming the surrounding spaces, and
the case matters (`a-100` and `A-100` are different items).

## Report

The report has one row per item code found in the stock file or in the scans:

```text
identifier,expected,observed,delta
A-100,5,3,-2
B-200,2,2,0
C-300,0,1,1
```

`delta` is `observed - expected`: negative values are missing items, positive values are
surplus items. The rows are sorted by delta (largest shortages first), then by code.

Rows whose code is empty, `0` or `nan` are never reported. Those codes come from empty or
broken rows of spreadsheets.

The report is written in CSV, Excel, JSON or as a plain text table depending on the
extension of `--out` (or `--out-type`).

## Configuration

All the options can also be given in a JSON file with `--config`. File paths are relative
to the location of the configuration file. Options given on the command line take
precedence.

```json
{
  "referenceSource": {
    "provider": "xlsx",
    "filePath": "stock.xlsx",
    "headerRowIndex": 3,
    "excelWorksheetName": "Sheet1"
  },
  "scanSources": [
    { "filePath": "scans/aisle1.txt" },
    { "filePath": "scans/aisle2.txt" }
  ],
  "manualCodes": ["A-100"],
  "outputSettings": {
    "outputPath": "report.xlsx",
    "outputFormat": "xlsx"
  }
}
```

 */
