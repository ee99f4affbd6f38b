use clap::Parser;

/// Converts an XLSForm survey instrument into a LaTeX questionnaire.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. The options passed on the command line
    /// take precedence over the content of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The XLSForm workbook, with a 'survey' and a 'choices' sheet.
    #[clap(short, long, value_parser)]
    pub instrument: Option<String>,

    /// (directory) The directory in which manuscript.tex is written. It is created if it does
    /// not exist.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// The name of the survey, used in the title of the document.
    #[clap(long, value_parser)]
    pub survey_name: Option<String>,

    /// (list of names, optional) The identifying variables of the survey.
    #[clap(long, value_parser)]
    pub identifiers: Option<Vec<String>>,

    /// (file path, optional) Reserved for the reshaped dataset. An existing file at this location
    /// stops the conversion unless --overwrite is passed.
    #[clap(long, value_parser)]
    pub reshape_output: Option<String>,

    /// (file path, optional) A reference LaTeX document. If provided, xls2tex checks that the
    /// generated document matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, dates are written month first (MM/DD/YYYY).
    #[clap(long, takes_value = false)]
    pub american_date_format: bool,

    /// If passed as an argument, existing output files are replaced.
    #[clap(long, takes_value = false)]
    pub overwrite: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
