use crate::xls::*;

use std::fs;
use std::path::{Path, PathBuf};

use questionnaire::DateFormat;
use serde::{Deserialize, Serialize};

/// The content of a JSON configuration file.
///
/// All the fields are optional in the file itself because they may be provided
/// on the command line instead.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionConfig {
    #[serde(rename = "instrumentPath")]
    pub instrument_path: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "surveyName")]
    pub survey_name: Option<String>,
    pub identifiers: Option<Vec<String>>,
    #[serde(rename = "americanDateFormat")]
    pub american_date_format: Option<bool>,
    pub overwrite: Option<bool>,
    #[serde(rename = "reshapeOutputPath")]
    pub reshape_output_path: Option<String>,
    #[serde(rename = "stringForcePattern")]
    pub string_force_pattern: Option<String>,
    #[serde(rename = "numericForcePattern")]
    pub numeric_force_pattern: Option<String>,
}

/// The validated options of a conversion.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ConversionSettings {
    pub instrument_path: PathBuf,
    pub output_directory: PathBuf,
    pub survey_name: String,
    pub identifiers: Vec<String>,
    pub american_date_format: bool,
    pub overwrite: bool,
    pub reshape_output_path: Option<PathBuf>,
    pub string_force_pattern: Option<String>,
    pub numeric_force_pattern: Option<String>,
}

pub const MANUSCRIPT_NAME: &str = "manuscript.tex";

impl ConversionSettings {
    pub fn output_path(&self) -> PathBuf {
        self.output_directory.join(MANUSCRIPT_NAME)
    }

    pub fn date_format(&self) -> DateFormat {
        DateFormat::from_american(self.american_date_format)
    }

    /// All the files that the conversion may create.
    pub fn targets(&self) -> Vec<PathBuf> {
        let mut res = vec![self.output_path()];
        if let Some(p) = self.reshape_output_path.clone() {
            res.push(p);
        }
        res
    }
}

pub fn read_config(path: &str) -> XlsResult<ConversionConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ConversionConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

/// Combines the configuration file (if any) with the command line.
///
/// The paths of the configuration file are relative to the directory of the file.
pub fn resolve_settings(args: &Args) -> XlsResult<ConversionSettings> {
    let (config, root) = match args.config.clone() {
        Some(config_path) => {
            let config = read_config(&config_path)?;
            debug!("resolve_settings: config: {:?}", config);
            let root = Path::new(&config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, Some(root))
        }
        None => (ConversionConfig::default(), None),
    };
    merge_settings(args, &config, root.as_deref())
}

pub fn merge_settings(
    args: &Args,
    config: &ConversionConfig,
    config_root: Option<&Path>,
) -> XlsResult<ConversionSettings> {
    let from_config = |p: &String| -> PathBuf {
        match config_root {
            Some(root) => root.join(p),
            None => PathBuf::from(p),
        }
    };

    let instrument_path = match (&args.instrument, &config.instrument_path) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => from_config(p),
        (None, None) => {
            return MissingConfigSnafu {
                field: "instrumentPath",
            }
            .fail()
        }
    };
    let output_directory = match (&args.out, &config.output_directory) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => from_config(p),
        (None, None) => {
            return MissingConfigSnafu {
                field: "outputDirectory",
            }
            .fail()
        }
    };
    let survey_name = args
        .survey_name
        .clone()
        .or_else(|| config.survey_name.clone())
        .context(MissingConfigSnafu {
            field: "surveyName",
        })?;
    let reshape_output_path = match (&args.reshape_output, &config.reshape_output_path) {
        (Some(p), _) => Some(PathBuf::from(p)),
        (None, Some(p)) => Some(from_config(p)),
        (None, None) => None,
    };

    Ok(ConversionSettings {
        instrument_path,
        output_directory,
        survey_name,
        identifiers: args
            .identifiers
            .clone()
            .or_else(|| config.identifiers.clone())
            .unwrap_or_default(),
        american_date_format: args.american_date_format
            || config.american_date_format.unwrap_or(false),
        overwrite: args.overwrite || config.overwrite.unwrap_or(false),
        reshape_output_path,
        string_force_pattern: config.string_force_pattern.clone(),
        numeric_force_pattern: config.numeric_force_pattern.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> ConversionConfig {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn parses_camel_case() {
        let config = parse(
            r#"{
                "instrumentPath": "baseline.xlsx",
                "outputDirectory": "out",
                "surveyName": "Baseline",
                "identifiers": ["hhid", "name"],
                "americanDateFormat": true,
                "overwrite": false,
                "reshapeOutputPath": "reshaped.dta",
                "numericForcePattern": "^n_"
            }"#,
        );
        assert_eq!(config.instrument_path, Some("baseline.xlsx".to_string()));
        assert_eq!(config.identifiers, Some(vec!["hhid".to_string(), "name".to_string()]));
        assert_eq!(config.american_date_format, Some(true));
        assert_eq!(config.numeric_force_pattern, Some("^n_".to_string()));
        assert_eq!(config.string_force_pattern, None);
    }

    #[test]
    fn config_paths_are_relative_to_the_file() {
        let config = parse(
            r#"{"instrumentPath": "baseline.xlsx", "outputDirectory": "out", "surveyName": "B",
                "reshapeOutputPath": "r.dta", "americanDateFormat": true}"#,
        );
        let settings =
            merge_settings(&Args::default(), &config, Some(Path::new("/data/project"))).unwrap();
        assert_eq!(settings.instrument_path, PathBuf::from("/data/project/baseline.xlsx"));
        assert_eq!(settings.output_path(), PathBuf::from("/data/project/out/manuscript.tex"));
        assert_eq!(
            settings.targets(),
            vec![
                PathBuf::from("/data/project/out/manuscript.tex"),
                PathBuf::from("/data/project/r.dta")
            ]
        );
        assert_eq!(settings.date_format(), DateFormat::MonthDayYear);
        assert!(!settings.overwrite);
        assert!(settings.identifiers.is_empty());
    }

    #[test]
    fn command_line_wins() {
        let config = parse(
            r#"{"instrumentPath": "baseline.xlsx", "outputDirectory": "out", "surveyName": "B"}"#,
        );
        let args = Args {
            instrument: Some("other.xlsx".to_string()),
            survey_name: Some("Endline".to_string()),
            overwrite: true,
            identifiers: Some(vec!["id".to_string()]),
            ..Default::default()
        };
        let settings = merge_settings(&args, &config, Some(Path::new("/data"))).unwrap();
        assert_eq!(settings.instrument_path, PathBuf::from("other.xlsx"));
        assert_eq!(settings.output_directory, PathBuf::from("/data/out"));
        assert_eq!(settings.survey_name, "Endline");
        assert!(settings.overwrite);
        assert_eq!(settings.identifiers, vec!["id".to_string()]);
        assert_eq!(settings.date_format(), DateFormat::DayMonthYear);
    }

    #[test]
    fn missing_required_options() {
        let args = Args {
            instrument: Some("baseline.xlsx".to_string()),
            out: Some("out".to_string()),
            ..Default::default()
        };
        let res = merge_settings(&args, &ConversionConfig::default(), None);
        match res {
            Err(XlsError::MissingConfig { field }) => assert_eq!(field, "surveyName"),
            x => panic!("unexpected result {:?}", x),
        }
    }
}
