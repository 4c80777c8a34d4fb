//! # cart-quote
//!
//! Command-line shell around the storefront pricing engine.
//!
//! ## Usage
//! ```bash
//! # Price a cart document
//! cart-quote cart.json
//!
//! # Read the document from stdin
//! cat cart.json | cart-quote -
//!
//! # With promotions and a different VAT rate
//! STOREFRONT_PROMO_FILE=promos.json STOREFRONT_VAT_RATE=0.055 cart-quote cart.json
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr, so stdout stays JSON)
//! 2. Load configuration from the environment
//! 3. Load the promo rule table
//! 4. Read and price the cart document
//! 5. Print the summary, or an error document, on stdout

pub mod config;
pub mod error;
pub mod quote;

use std::io::{self, Read, Write};
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::QuoteConfig;
use crate::error::ApiError;

/// Exit status when the summary was printed.
pub const EXIT_OK: u8 = 0;

/// Exit status when an error document was printed.
pub const EXIT_FAILURE: u8 = 1;

/// Runs the tool with the process arguments and returns its exit code.
pub fn run() -> ExitCode {
    init_tracing();

    let input_path = std::env::args().nth(1).unwrap_or_else(|| "-".to_string());
    let status = run_with(
        &input_path,
        |key| std::env::var(key).ok(),
        io::stdin().lock(),
        &mut io::stdout().lock(),
    );
    ExitCode::from(status)
}

/// Prices the document at `input_path` (`-` reads `stdin`) and writes the
/// summary or the error document to `out`.
///
/// `lookup` stands in for the process environment.
pub fn run_with<F, R, W>(input_path: &str, lookup: F, stdin: R, out: &mut W) -> u8
where
    F: Fn(&str) -> Option<String>,
    R: Read,
    W: Write,
{
    let outcome = execute(input_path, lookup, stdin).and_then(|summary| {
        serde_json::to_string_pretty(&summary)
            .map_err(|e| ApiError::internal(format!("Cannot serialize summary: {}", e)))
    });

    let (document, status) = match outcome {
        Ok(json) => (json, EXIT_OK),
        Err(err) => {
            tracing::error!(error = %err, "Quote failed");
            let json = serde_json::to_string_pretty(&err).unwrap_or_else(|_| {
                serde_json::json!({ "code": "INTERNAL", "message": err.message }).to_string()
            });
            (json, EXIT_FAILURE)
        }
    };

    if let Err(e) = writeln!(out, "{}", document) {
        tracing::error!(error = %e, "Cannot write output");
        return EXIT_FAILURE;
    }
    status
}

fn execute<F, R>(
    input_path: &str,
    lookup: F,
    stdin: R,
) -> Result<storefront_core::CartSummary, ApiError>
where
    F: Fn(&str) -> Option<String>,
    R: Read,
{
    let config = QuoteConfig::from_lookup(lookup)?;
    info!(
        vat_rate = %config.pricing.vat_rate,
        currency = %config.pricing.currency,
        "Configuration loaded"
    );

    let promotions = quote::load_promotions(config.promo_file.as_deref())?;
    let input = read_input(input_path, stdin)?;

    quote::quote(&input, &config.pricing, &promotions)
}

fn read_input<R: Read>(path: &str, mut stdin: R) -> Result<String, ApiError> {
    if path == "-" {
        let mut input = String::new();
        stdin
            .read_to_string(&mut input)
            .map_err(|e| ApiError::invalid_request(format!("Cannot read stdin: {}", e)))?;
        return Ok(input);
    }

    std::fs::read_to_string(path)
        .map_err(|e| ApiError::invalid_request(format!("Cannot read {}: {}", path, e)))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_core=trace` - Trace the engine only
/// - Default: INFO, DEBUG for the storefront crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront_core=debug,cart_quote=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const CART: &str = r#"{"items": [
        {"productId": "sofa", "quantity": 1, "unitPriceMinorUnits": 12500000, "currency": "EUR"}
    ]}"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn run_stdin<F>(input: &str, lookup: F) -> (u8, Value)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out = Vec::new();
        let status = run_with("-", lookup, input.as_bytes(), &mut out);
        let document = serde_json::from_slice(&out).unwrap();
        (status, document)
    }

    #[test]
    fn test_run_prints_summary() {
        let (status, document) = run_stdin(CART, no_env);

        assert_eq!(status, EXIT_OK);
        assert_eq!(document["subtotal"], 12_500_000);
        assert_eq!(document["vat"], 2_500_000);
        assert_eq!(document["discount"], 0);
        assert_eq!(document["total"], 15_000_000);
        assert_eq!(document["currency"], "EUR");
    }

    #[test]
    fn test_run_uses_configured_rate() {
        let (status, document) = run_stdin(CART, |key| {
            (key == "STOREFRONT_VAT_RATE").then(|| "0.055".to_string())
        });

        assert_eq!(status, EXIT_OK);
        assert_eq!(document["vat"], 687_500);
        assert_eq!(document["total"], 13_187_500);
    }

    #[test]
    fn test_run_prints_error_document() {
        let (status, document) = run_stdin("not json", no_env);
        assert_eq!(status, EXIT_FAILURE);
        assert_eq!(document["code"], "INVALID_REQUEST");
        assert!(document["message"].as_str().unwrap().contains("Invalid cart document"));

        let zero_qty = r#"{"items": [{"productId": "a", "quantity": 0, "unitPriceMinorUnits": 1, "currency": "EUR"}]}"#;
        let (status, document) = run_stdin(zero_qty, no_env);
        assert_eq!(status, EXIT_FAILURE);
        assert_eq!(document["code"], "INVALID_LINE_ITEM");

        let (status, document) = run_stdin(CART, |key| {
            (key == "STOREFRONT_VAT_RATE").then(|| "twenty".to_string())
        });
        assert_eq!(status, EXIT_FAILURE);
        assert_eq!(document["code"], "CONFIG_ERROR");
    }

    #[test]
    fn test_run_reads_file_argument() {
        let path = std::env::temp_dir().join(format!("cart-quote-run-{}.json", std::process::id()));
        std::fs::write(&path, CART).unwrap();

        let mut out = Vec::new();
        let status = run_with(path.to_str().unwrap(), no_env, io::empty(), &mut out);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(status, EXIT_OK);
        let document: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(document["total"], 15_000_000);

        let mut out = Vec::new();
        let status = run_with("/nonexistent/cart.json", no_env, io::empty(), &mut out);
        assert_eq!(status, EXIT_FAILURE);
        let document: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(document["code"], "INVALID_REQUEST");
    }
}
