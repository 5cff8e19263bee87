use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use openshowvar_frame::Operation;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One variable value as returned by the controller.
#[derive(Debug, Serialize)]
pub struct VariableOutput<'a> {
    pub operation: &'a str,
    pub name: &'a str,
    pub value: &'a str,
    pub controller: &'a str,
    pub timestamp: String,
}

impl<'a> VariableOutput<'a> {
    pub fn new(operation: Operation, name: &'a str, value: &'a str, controller: &'a str) -> Self {
        Self {
            operation: operation.as_str(),
            name,
            value,
            controller,
            timestamp: now_unix_seconds(),
        }
    }
}

pub fn print_variable(out: &VariableOutput<'_>, format: OutputFormat) {
    println!("{}", render_variable(out, format));
}

fn render_variable(out: &VariableOutput<'_>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string()),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["OPERATION", "NAME", "VALUE", "CONTROLLER"])
                .add_row(vec![out.operation, out.name, out.value, out.controller]);
            table.to_string()
        }
        OutputFormat::Pretty => format!(
            "{} {} = {} ({})",
            out.operation, out.name, out.value, out.controller
        ),
        OutputFormat::Raw => out.value.to_string(),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
