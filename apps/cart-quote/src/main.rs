//! # cart-quote entry point
//!
//! The actual setup is in lib.rs for better testability.

use std::process::ExitCode;

fn main() -> ExitCode {
    cart_quote::run()
}
