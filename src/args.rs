use clap::Parser;

/// This is a stocktaking program: it counts scanned item codes and compares them to an inventory file.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the session (stock file, scan files, output).
    /// The command line options below take precedence over its content.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The stock file with the expected counts, in Excel (.xlsx) or CSV format. It must contain
    /// the columns 'model' and 'stan'.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (xlsx or csv, optional) The type of the stock file. By default, it is guessed from the file extension.
    #[clap(long, value_parser)]
    pub reference_type: Option<String>,

    /// (default 1) The row of the stock file containing the column names, starting at 1.
    #[clap(long, value_parser)]
    pub header_row: Option<usize>,

    /// (default: the only worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, may be repeated) A scan log: a text file with one scanned code per line.
    #[clap(short, long, value_parser)]
    pub scans: Vec<String>,

    /// (may be repeated) A code entered by hand. Each occurrence counts as one item.
    #[clap(long, value_parser)]
    pub code: Vec<String>,

    /// If passed as an argument, codes are also read from the standard input, one per line.
    #[clap(long, takes_value = false)]
    pub stdin: bool,

    /// (file path, 'stdout' or empty) Where to write the report. When not specified, the report is printed
    /// as a table on the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (csv, xlsx, json or text, optional) The format of the report. By default, it is guessed from the
    /// extension of the output file.
    #[clap(long, value_parser)]
    pub out_type: Option<String>,

    /// (file path, optional) A report in CSV format. If provided, the program will check that the computed
    /// report matches it and fail otherwise.
    #[clap(long, value_parser)]
    pub check: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
