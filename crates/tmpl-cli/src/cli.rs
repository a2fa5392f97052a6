//! Argument definitions for `tmpl`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tmpl_core::model::DocumentType;

#[derive(Parser)]
#[command(name = "tmpl", version, about = "Inspect, lint and scaffold document templates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More log output (-v debug, -vv trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarize a template file: objects, tokens and anything skipped on load.
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Check a template against the field catalog and the page bounds.
    Lint {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Document type whose catalog the fields are checked against.
        #[arg(long = "type", value_name = "TYPE", value_parser = parse_document_type)]
        document_type: DocumentType,
    },

    /// Rasterize the page to a PNG thumbnail.
    Thumbnail {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output PNG path. Without it the data URL is printed.
        #[arg(short, long, value_name = "PNG")]
        out: Option<PathBuf>,

        /// Page scale (1.0 = 595x842 px).
        #[arg(long, default_value_t = 0.3)]
        scale: f64,
    },

    /// Emit the starter template for a document type as JSON.
    Starter {
        #[arg(value_name = "TYPE", value_parser = parse_document_type)]
        document_type: DocumentType,

        /// Write to a file instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// List the bindable data fields for a document type.
    Fields {
        #[arg(value_name = "TYPE", value_parser = parse_document_type)]
        document_type: DocumentType,
    },
}

fn parse_document_type(s: &str) -> Result<DocumentType, String> {
    s.parse::<DocumentType>().map_err(|e| {
        let known: Vec<&str> = DocumentType::ALL.iter().map(|t| t.as_str()).collect();
        format!("{e} (expected one of: {})", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_lint_with_type() {
        let cli = Cli::try_parse_from(["tmpl", "-v", "lint", "quote.json", "--type", "purchase_order"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Lint { document_type, .. } => assert_eq!(document_type, DocumentType::PurchaseOrder),
            _ => panic!("expected lint"),
        }
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(Cli::try_parse_from(["tmpl", "fields", "receipt"]).is_err());
    }
}
