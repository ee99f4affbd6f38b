use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::path::PathBuf;

use questionnaire::builder::Builder;
use questionnaire::{render_document, ClassifierRules, DocumentInfo, InstrumentError};

use crate::args::Args;
use crate::xls::config_reader::*;

pub mod config_reader;
pub mod io_choices;
pub mod io_common;
pub mod io_output;
pub mod io_survey;

#[derive(Debug, Snafu)]
pub enum XlsError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Sheet {sheet:?} not found in {path}"))]
    MissingSheet { sheet: String, path: String },
    #[snafu(display("Sheet {sheet:?} has no header row"))]
    EmptySheet { sheet: String },
    #[snafu(display("Column {column:?} is required in sheet {sheet:?}"))]
    MissingColumn { sheet: String, column: String },
    #[snafu(display("Output file {path} already exists, pass the overwrite option to replace it"))]
    OutputExists { path: String },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Missing configuration option {field}"))]
    MissingConfig { field: String },
    #[snafu(display("Malformed instrument: {source}"))]
    Structural { source: InstrumentError },
    #[snafu(display("Invalid classifier rules: {source}"))]
    InvalidRules { source: InstrumentError },
    #[snafu(display("The generated document differs from the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type XlsResult<T> = Result<T, XlsError>;

/// Runs the whole conversion and returns the path of the generated document.
///
/// Nothing is read if one of the output files already exists and overwriting is not
/// requested. Nothing is written if the instrument cannot be reconstructed.
pub fn run_conversion(args: &Args) -> XlsResult<PathBuf> {
    let settings = resolve_settings(args)?;
    info!("settings: {:?}", settings);

    io_output::check_targets(&settings)?;

    let rules = ClassifierRules::from_patterns(
        settings.string_force_pattern.as_deref(),
        settings.numeric_force_pattern.as_deref(),
    )
    .context(InvalidRulesSnafu {})?;

    if !settings.identifiers.is_empty() {
        info!("identifying variables: {:?}", settings.identifiers);
    }

    let mut workbook = io_common::open_instrument(&settings.instrument_path)?;
    let survey_range = io_common::get_range(&mut workbook, "survey", &settings.instrument_path)?;
    let survey_records = io_survey::read_survey(&survey_range)?;
    let choices_range = io_common::get_range(&mut workbook, "choices", &settings.instrument_path)?;
    let choice_records = io_choices::read_choices(&choices_range)?;
    info!(
        "read {} survey rows and {} choice rows from {}",
        survey_records.len(),
        choice_records.len(),
        io_common::simplify_file_name(&settings.instrument_path)
    );

    let mut builder = Builder::new(&rules);
    for rec in survey_records {
        builder.add_question(rec).context(StructuralSnafu {})?;
    }
    for rec in choice_records {
        builder.add_choice_record(rec);
    }
    let questionnaire = builder.build().context(StructuralSnafu {})?;
    debug!("questionnaire: {} rows", questionnaire.rows.len());

    let date_format = settings.date_format();
    let info = DocumentInfo {
        survey_name: settings.survey_name.clone(),
        date: chrono::Local::now()
            .format(date_format.strftime())
            .to_string(),
        date_format,
    };
    let document = render_document(&questionnaire, &info);
    info!(
        "rendered {} questions ({} bytes)",
        questionnaire.question_count(),
        document.len()
    );

    let output_path = settings.output_path();
    io_output::write_document(&output_path, &document)?;
    info!("wrote {}", output_path.display());

    if let Some(reference_path) = args.reference.clone() {
        if let Err(e) = io_output::check_reference(&reference_path, &document) {
            warn!("reference check failed: {}", e);
            return Err(e);
        }
    }

    Ok(output_path)
}
