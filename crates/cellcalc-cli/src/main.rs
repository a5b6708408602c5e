//! cellcalc CLI - formula evaluation and sheet recalculation tool

use anyhow::{Context, Result};
use cellcalc::prelude::*;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cellcalc")]
#[command(author, version, about = "Spreadsheet formula evaluation tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single formula and print its value
    Eval {
        /// Formula text, e.g. "=(A1+4)*3"
        formula: String,

        /// Sheet snapshot (JSON) the formula's references resolve against
        #[arg(short, long)]
        sheet: Option<PathBuf>,
    },

    /// Recalculate a sheet snapshot and print every cell's result
    Recalc {
        /// Input sheet snapshot (JSON)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
}

/// On-disk sheet snapshot: `{ "cells": { "A1": "=2", "B1": ["A1", "*", "3"] } }`
#[derive(Debug, Deserialize)]
struct SheetFile {
    cells: BTreeMap<String, FormulaSource>,
}

/// A formula as text to lex, or as already split tokens stored verbatim
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FormulaSource {
    Text(String),
    Tokens(Vec<String>),
}

#[derive(Serialize)]
struct SheetResults<'a> {
    cells: BTreeMap<String, &'a Cell>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Eval { formula, sheet } => eval_formula(&formula, sheet.as_deref()),
        Commands::Recalc {
            input,
            output,
            json,
        } => recalc(&input, output.as_deref(), json),
    }
}

fn eval_formula(text: &str, sheet_path: Option<&Path>) -> Result<()> {
    let sheet = match sheet_path {
        Some(path) => {
            let mut sheet = load_sheet(path)?;
            sheet.calculate();
            sheet
        }
        None => Sheet::new(),
    };

    let formula = Formula::parse(text).with_context(|| format!("Failed to parse '{}'", text))?;
    let outcome = evaluate(formula.tokens(), &sheet);

    match outcome.error() {
        Some(error) => println!("{}\t{}", format_value(outcome.value()), error),
        None => println!("{}", format_value(outcome.value())),
    }

    Ok(())
}

fn recalc(input: &Path, output: Option<&Path>, json: bool) -> Result<()> {
    let mut sheet = load_sheet(input)?;

    let stats = sheet.calculate();
    eprintln!(
        "Calculated {} of {} formulas ({} errors, {} circular)",
        stats.cells_calculated, stats.formula_count, stats.errors, stats.circular_references
    );

    let rendered = if json {
        sheet_to_json(&sheet)?
    } else {
        sheet_to_csv(&sheet)?
    };

    if let Some(output_path) = output {
        std::fs::write(output_path, &rendered)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!("Wrote {} cells to '{}'", sheet.len(), output_path.display());
    } else {
        io::stdout()
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

/// Load a sheet snapshot, lexing text formulas
fn load_sheet(path: &Path) -> Result<Sheet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open '{}'", path.display()))?;
    let file: SheetFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to read sheet '{}'", path.display()))?;

    let mut sheet = Sheet::new();
    for (label, source) in file.cells {
        let tokens = match source {
            FormulaSource::Text(text) => {
                tokenize(&text).with_context(|| format!("Invalid formula in {}", label))?
            }
            FormulaSource::Tokens(tokens) => tokens,
        };
        sheet
            .set_formula(&label, tokens)
            .with_context(|| format!("Invalid cell '{}'", label))?;
    }

    Ok(sheet)
}

/// One `label,value,error` row per cell, row-major
fn sheet_to_csv(sheet: &Sheet) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["label", "value", "error"])?;

    for (addr, cell) in sheet.cells() {
        let error = cell.error().map(ToString::to_string).unwrap_or_default();
        writer.write_record([addr.to_string(), format_value(cell.value()), error])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

fn sheet_to_json(sheet: &Sheet) -> Result<String> {
    let results = SheetResults {
        cells: sheet
            .cells()
            .map(|(addr, cell)| (addr.to_string(), cell))
            .collect(),
    };
    let mut json = serde_json::to_string_pretty(&results).context("Failed to encode results")?;
    json.push('\n');
    Ok(json)
}

/// Whole numbers print without a fraction
fn format_value(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_snapshot(dir: &tempfile::TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("sheet.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(18.0), "18");
        assert_eq!(format_value(-2.0), "-2");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(f64::INFINITY), "inf");
    }

    #[test]
    fn test_load_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_snapshot(
            &dir,
            r#"{"cells": {"A1": "=2", "B1": "=(A1+4)*3", "C1": ["A1", "?"]}}"#,
        );

        let sheet = load_sheet(&path).unwrap();

        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.cell("B1").unwrap().formula(), ["(", "A1", "+", "4", ")", "*", "3"]);
        assert_eq!(sheet.cell("C1").unwrap().formula(), ["A1", "?"]);
    }

    #[test]
    fn test_load_sheet_errors() {
        let dir = tempfile::tempdir().unwrap();

        let path = write_snapshot(&dir, r#"{"cells": {"A1": "=2 # 3"}}"#);
        let err = load_sheet(&path).unwrap_err();
        assert_eq!(err.to_string(), "Invalid formula in A1");

        let path = write_snapshot(&dir, r#"{"cells": {"$A$1": "=2"}}"#);
        let err = load_sheet(&path).unwrap_err();
        assert_eq!(err.to_string(), "Invalid cell '$A$1'");

        assert!(load_sheet(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_sheet_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_snapshot(
            &dir,
            r#"{"cells": {"B1": "=A1/0", "A1": "=2", "A2": "=A1*2.5"}}"#,
        );
        let mut sheet = load_sheet(&path).unwrap();
        sheet.calculate();

        assert_eq!(
            sheet_to_csv(&sheet).unwrap(),
            "label,value,error\nA1,2,\nB1,inf,#DIV/0!\nA2,5,\n"
        );
    }

    #[test]
    fn test_sheet_to_json() {
        let mut sheet = Sheet::new();
        sheet.set_formula("A1", ["1", "+", "1"]).unwrap();
        sheet.set_formula("B1", ["A1", "/", "0"]).unwrap();
        sheet.calculate();

        let rendered = sheet_to_json(&sheet).unwrap();
        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cells": {
                    "A1": { "formula": ["1", "+", "1"], "value": 2.0 },
                    "B1": { "formula": ["A1", "/", "0"], "value": "inf", "error": "#DIV/0!" }
                }
            })
        );

        // the written cells read back unchanged
        let cells: BTreeMap<String, Cell> =
            serde_json::from_value(json["cells"].clone()).unwrap();
        assert_eq!(cells["B1"].value(), f64::INFINITY);
        assert_eq!(&cells["B1"], sheet.cell("B1").unwrap());
    }
}
