//! Plain-text rendering of decode results.
//!
//! Composite values are flattened into dotted paths so every leaf gets its own
//! table row, e.g. `base_mint_param.decimals`.

use tabled::{builder::Builder, settings::Style};

use crate::core::{DecodeOutcome, DecodedInstruction, DecodedValue};
#[cfg(feature = "transaction")]
use crate::transaction::TransactionLog;

/// Render a decoded instruction as an argument table followed by an account table.
pub fn format_decoded(decoded: &DecodedInstruction) -> String {
    let mut args = Builder::default();
    args.push_record([String::from("Argument"), String::from("Value")]);
    for field in &decoded.args {
        let mut rows = Vec::new();
        flatten_value(&field.name, &field.value, &mut rows);
        for (path, value) in rows {
            args.push_record([path, value]);
        }
    }

    let mut accounts = Builder::default();
    accounts.push_record([
        String::from("#"),
        String::from("Account"),
        String::from("Pubkey"),
    ]);
    for (index, account) in decoded.accounts.iter().enumerate() {
        accounts.push_record([index.to_string(), account.name.clone(), account.key.to_string()]);
    }

    let mut out = format!("Instruction: {} ({} bytes)\n", decoded.name, decoded.consumed);
    if !decoded.args.is_empty() {
        let mut table = args.build();
        table.with(Style::rounded());
        out.push_str(&table.to_string());
        out.push('\n');
    }
    if !decoded.accounts.is_empty() {
        let mut table = accounts.build();
        table.with(Style::rounded());
        out.push_str(&table.to_string());
        out.push('\n');
    }
    out
}

/// Render any outcome: a table for decoded instructions, one line otherwise.
pub fn format_outcome(outcome: &DecodeOutcome) -> String {
    match outcome {
        DecodeOutcome::Decoded(decoded) => format_decoded(decoded),
        other => format!("{other}\n"),
    }
}

/// Render every instruction of a decoded transaction.
#[cfg(feature = "transaction")]
pub fn format_transaction(log: &TransactionLog, tx_number: usize) -> String {
    let mut out = format!("Transaction #{tx_number}: {}\n", log.signature);
    for ix in &log.instructions {
        out.push_str(&format!(
            "[{}] {} ({})\n",
            ix.index, ix.program_name, ix.program_id
        ));
        match &ix.outcome {
            Some(outcome) => out.push_str(&format_outcome(outcome)),
            None => out.push_str("no decoder registered\n"),
        }
    }
    out
}

fn flatten_value(path: &str, value: &DecodedValue, rows: &mut Vec<(String, String)>) {
    match value {
        DecodedValue::Struct(fields) => {
            for field in fields {
                flatten_value(&format!("{path}.{}", field.name), &field.value, rows);
            }
        }
        DecodedValue::Enum { variant, fields } => {
            rows.push((path.to_string(), variant.clone()));
            for field in fields {
                flatten_value(&format!("{path}.{}", field.name), &field.value, rows);
            }
        }
        leaf => rows.push((path.to_string(), leaf.to_string())),
    }
}
