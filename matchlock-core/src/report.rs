//! Output formatting - plaintext and JSON.

use crate::diagnostics::{Diagnostic, Severity};
use serde_json::json;

/// Prints findings in plain text format, one line per finding.
pub fn print_plain(diags: &[Diagnostic]) {
    if diags.is_empty() {
        println!("No exhaustiveness findings.");
    } else {
        println!("FINDINGS ({}):", diags.len());
        for d in diags {
            println!("{}", d);
        }
    }
}

fn to_json(d: &Diagnostic) -> serde_json::Value {
    json!({
        "code": d.code.code(),
        "message": d.message(),
        "file": d.location.file,
        "line": d.location.line,
        "column": d.location.column,
        "severity": match d.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        },
    })
}

/// Prints findings in JSON format.
///
/// Falls back to the plain format if serialization fails (should never
/// happen with these value types, but a reporting path must not panic).
pub fn print_json(diags: &[Diagnostic]) {
    let doc = json!({
        "findings": diags.iter().map(to_json).collect::<Vec<_>>(),
        "count": diags.len(),
    });
    match serde_json::to_string_pretty(&doc) {
        Ok(out) => println!("{}", out),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            print_plain(diags);
        }
    }
}
