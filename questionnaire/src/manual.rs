/*!

This is the long-form manual for `questionnaire` and `xls2tex`.

## Input format

The input is an XLSForm workbook, as used by SurveyCTO and ODK. Two sheets are read:

* `survey`: one row per question, with at least the columns `type`, `name` and
  `calculation`. The columns `relevant`, `repeat_count`, `hint` and a label column are
  used when present. The label is read from `labelStata`, `label` or `label::English`;
  the first other `label::<language>` column provides the localized label used for the
  headings of the groups. Every non-blank row must have a type. The type keyword is
  case-insensitive (`Select_One`, `Begin Group`), the list name that follows it is not:
  `select_one YesNo` uses the list `YesNo` of the choices sheet.
* `choices`: the answer options, with the columns `list_name` (or `listname`), `name`
  and `label`. Only numeric values (digits and minus signs) are supported. Rows with
  other values are skipped.

## Question types

Each row gets one of the following types:

| code | type              | rows                                                        |
|------|-------------------|-------------------------------------------------------------|
| 1    | string            | `text`, `deviceid`, `image`, `pulldata` and text calculations |
| 2    | select one        | `select_one <list>`                                         |
| 3    | select multiple   | `select_multiple <list>`                                    |
| 4    | numeric           | everything else, numeric calculations                       |
| 5    | date              | `date`, `today`                                             |
| 6    | date and time     | `start`, `end`, `submissiondate`                            |
| 7    | GPS               | `geopoint`, `geotrace`                                      |
| -111 | group boundary    | `begin_group`, `end_group`, `begin_repeat`, `end_repeat`    |
| -222 | note              | `note`                                                      |
| -333 | text audit        | `text audit`                                                |
| -555 | other             | rows that match nothing                                     |

A calculation is numeric when it starts with one of `index`, `area`, `number`, `round`,
`count`, `count-if`, `sum`, `sum-if`, `min`, `min-if`, `max`, `max-if`,
`distance-between`, `int`, `abs` or `duration`, followed by a parenthesis.

Two name patterns (regular expressions) can force a type: `stringForcePattern` and
`numericForcePattern`. When both match, the numeric pattern wins. The structural types
(dates, GPS, groups, notes) are never overridden.

Notes, text audits and unclassified rows are removed. Calculations, automatic fields
(`start`, `end`, `today`, `deviceid`) and preloaded values are kept for the
reconstruction of the groups but do not appear in the document.

## Groups and repeat groups

Groups and repeat groups may be nested at any depth. Each one must be closed: an
`end_group` without a matching `begin_group`, or a group still open at the end of the
sheet, stops the conversion.

In the document, a repeat group starts a new section and a group starts a new
subsection. When a group or repeat group closes, the enclosing one is announced again
before the next question.

## Configuration

The configuration file is a JSON object:

```json
{
  "instrumentPath": "baseline.xlsx",
  "outputDirectory": "out",
  "surveyName": "Baseline 2024",
  "identifiers": ["hhid"],
  "americanDateFormat": false,
  "overwrite": false
}
```

All the options may also be passed on the command line, which takes precedence:

```bash
xls2tex -i baseline.xlsx -o out --survey-name "Baseline 2024" --overwrite
```

The document is written to `<outputDirectory>/manuscript.tex`. An existing document is
never replaced unless `overwrite` is set.
*/
