//! Human Input Provider
//!
//! Collects missing mandatory trip fields from the user through interactive
//! console prompts. The provider never panics past its boundary: read
//! failures and empty answers simply leave the corresponding field as it
//! was, and the pipeline proceeds best-effort.

use crate::models::{MandatoryField, TripDetails};
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

/// Blocking human-input capability. Implemented by the console prompt in
/// production and by scripted providers in tests.
pub trait HumanInput: Send {
    /// Prompt for each requested field that is still absent or empty in
    /// `current`, returning the updated record. Fields already present are
    /// never re-prompted; empty responses are ignored.
    fn collect(&mut self, missing: &[MandatoryField], current: &TripDetails) -> TripDetails;
}

/// Console implementation reading from stdin.
pub struct ConsoleInput;

impl ConsoleInput {
    fn prompt_one(field: MandatoryField) -> Option<String> {
        print!("{}: ", field.prompt_label());
        if io::stdout().flush().is_err() {
            return None;
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => {
                let answer = line.trim();
                if answer.is_empty() {
                    None
                } else {
                    Some(answer.to_string())
                }
            }
            Err(e) => {
                warn!(field = %field, error = %e, "Failed to read user input");
                None
            }
        }
    }
}

impl HumanInput for ConsoleInput {
    fn collect(&mut self, missing: &[MandatoryField], current: &TripDetails) -> TripDetails {
        let mut updated = current.clone();

        println!("\n{}", "=".repeat(60));
        println!("🚨 MISSING TRIP INFORMATION");
        println!("{}", "=".repeat(60));
        println!("Some mandatory information is missing for your trip planning.");
        println!("Please provide the following details:\n");

        for field in missing {
            if updated.has_field(*field) {
                continue;
            }
            if let Some(answer) = Self::prompt_one(*field) {
                updated.set_field(*field, answer);
            }
        }

        info!(
            collected = missing
                .iter()
                .filter(|f| updated.has_field(**f))
                .count(),
            requested = missing.len(),
            "Human input collection finished"
        );

        println!("\n✅ Thank you! Continuing with trip planning...");
        println!("{}\n", "=".repeat(60));

        updated
    }
}
