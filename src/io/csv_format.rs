//! CSV format handling for operation scripts and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to ledger operations
//! - Account output serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input Format
//!
//! Columns: `type,caller,account,to,amount,name`
//!
//! | type     | required columns              |
//! |----------|-------------------------------|
//! | open     | name, amount (initial balance)|
//! | deposit  | caller, account, amount       |
//! | withdraw | caller, account, amount       |
//! | transfer | caller, account, to, amount   |
//!
//! `caller` is the identity already authenticated upstream; it is taken as given.

use crate::types::{Account, AccountId, CallerId, LedgerError, Operation, OperationType};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Every column except `type` is optional at this level; which ones are
/// required depends on the operation type and is checked during conversion.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub op_type: String,
    pub caller: Option<AccountId>,
    pub account: Option<AccountId>,
    pub to: Option<AccountId>,
    pub amount: Option<String>,
    pub name: Option<String>,
}

/// Convert a CsvRecord to an Operation
///
/// This function:
/// - Parses the operation type (case-insensitive)
/// - Checks that the columns the type needs are present
/// - Parses the amount into a Decimal
///
/// Sign and range of the amount are left to the engine, so a replay reports
/// the same error a direct call would.
///
/// # Errors
///
/// * `InvalidOperationType` for an unknown type
/// * `MissingField` when a required column is empty
/// * `InvalidAmount` when the amount is not a number
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Operation, LedgerError> {
    let op_type = match csv_record.op_type.to_lowercase().as_str() {
        "open" => OperationType::Open,
        "deposit" => OperationType::Deposit,
        "withdraw" => OperationType::Withdraw,
        "transfer" => OperationType::Transfer,
        _ => return Err(LedgerError::invalid_operation_type(&csv_record.op_type)),
    };
    let type_name = op_type.as_str();

    let amount = parse_amount(type_name, csv_record.amount.as_deref())?;

    let operation = match op_type {
        OperationType::Open => {
            let name = csv_record
                .name
                .filter(|name| !name.trim().is_empty())
                .ok_or_else(|| LedgerError::missing_field(type_name, "name"))?;
            Operation::Open {
                name,
                initial_balance: amount,
            }
        }
        OperationType::Deposit => Operation::Deposit {
            account: required(type_name, "account", csv_record.account)?,
            amount,
            caller: required_caller(type_name, csv_record.caller)?,
        },
        OperationType::Withdraw => Operation::Withdraw {
            account: required(type_name, "account", csv_record.account)?,
            amount,
            caller: required_caller(type_name, csv_record.caller)?,
        },
        OperationType::Transfer => Operation::Transfer {
            from: required(type_name, "account", csv_record.account)?,
            to: required(type_name, "to", csv_record.to)?,
            amount,
            caller: required_caller(type_name, csv_record.caller)?,
        },
    };

    Ok(operation)
}

fn parse_amount(type_name: &str, raw: Option<&str>) -> Result<Decimal, LedgerError> {
    match raw.map(str::trim) {
        Some(amount_str) if !amount_str.is_empty() => {
            Decimal::from_str(amount_str).map_err(|_| LedgerError::invalid_amount(amount_str))
        }
        _ => Err(LedgerError::missing_field(type_name, "amount")),
    }
}

fn required(type_name: &str, field: &str, value: Option<AccountId>) -> Result<AccountId, LedgerError> {
    value.ok_or_else(|| LedgerError::missing_field(type_name, field))
}

fn required_caller(type_name: &str, value: Option<AccountId>) -> Result<CallerId, LedgerError> {
    required(type_name, "caller", value).map(CallerId::new)
}

/// Write account states to CSV format
///
/// Writes accounts with columns: id, name, balance, currency.
/// Accounts are sorted by id for deterministic output; balances are written
/// with four decimal places.
///
/// # Errors
///
/// * `IoError` if the output cannot be written or flushed
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["id", "name", "balance", "currency"])?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer.write_record(&[
            account.id.to_string(),
            account.name,
            format!("{:.4}", account.balance),
            account.currency,
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(op_type: &str) -> CsvRecord {
        CsvRecord {
            op_type: op_type.to_string(),
            ..CsvRecord::default()
        }
    }

    #[test]
    fn test_convert_open() {
        let csv_record = CsvRecord {
            amount: Some("100".to_string()),
            name: Some("Alice".to_string()),
            ..record("open")
        };

        let operation = convert_csv_record(csv_record).unwrap();

        assert_eq!(
            operation,
            Operation::Open {
                name: "Alice".to_string(),
                initial_balance: Decimal::new(100, 0),
            }
        );
    }

    #[test]
    fn test_convert_transfer() {
        let csv_record = CsvRecord {
            caller: Some(1),
            account: Some(1),
            to: Some(2),
            amount: Some("12.5".to_string()),
            ..record("transfer")
        };

        let operation = convert_csv_record(csv_record).unwrap();

        assert_eq!(
            operation,
            Operation::Transfer {
                from: 1,
                to: 2,
                amount: Decimal::new(125, 1),
                caller: CallerId::new(1),
            }
        );
    }

    #[rstest]
    #[case("deposit", OperationType::Deposit)]
    #[case("WITHDRAW", OperationType::Withdraw)]
    #[case("Deposit", OperationType::Deposit)]
    fn test_convert_single_account_operations(
        #[case] op_type: &str,
        #[case] expected_type: OperationType,
    ) {
        let csv_record = CsvRecord {
            caller: Some(3),
            account: Some(4),
            amount: Some("1.0".to_string()),
            ..record(op_type)
        };

        let operation = convert_csv_record(csv_record).unwrap();

        assert_eq!(operation.operation_type(), expected_type);
        assert_eq!(operation.primary_account(), Some(4));
    }

    #[rstest]
    #[case::invalid_type(
        CsvRecord { amount: Some("1".into()), ..record("withdrawal") },
        LedgerError::invalid_operation_type("withdrawal")
    )]
    #[case::open_missing_name(
        CsvRecord { amount: Some("1".into()), ..record("open") },
        LedgerError::missing_field("open", "name")
    )]
    #[case::open_blank_name(
        CsvRecord { amount: Some("1".into()), name: Some("   ".into()), ..record("open") },
        LedgerError::missing_field("open", "name")
    )]
    #[case::open_missing_amount(
        CsvRecord { name: Some("Alice".into()), ..record("open") },
        LedgerError::missing_field("open", "amount")
    )]
    #[case::deposit_missing_caller(
        CsvRecord { account: Some(1), amount: Some("1".into()), ..record("deposit") },
        LedgerError::missing_field("deposit", "caller")
    )]
    #[case::withdraw_missing_account(
        CsvRecord { caller: Some(1), amount: Some("1".into()), ..record("withdraw") },
        LedgerError::missing_field("withdraw", "account")
    )]
    #[case::transfer_missing_to(
        CsvRecord { caller: Some(1), account: Some(1), amount: Some("1".into()), ..record("transfer") },
        LedgerError::missing_field("transfer", "to")
    )]
    #[case::non_numeric_amount(
        CsvRecord { caller: Some(1), account: Some(1), amount: Some("lots".into()), ..record("deposit") },
        LedgerError::invalid_amount("lots")
    )]
    #[case::whitespace_amount(
        CsvRecord { caller: Some(1), account: Some(1), amount: Some("  ".into()), ..record("deposit") },
        LedgerError::missing_field("deposit", "amount")
    )]
    fn test_convert_csv_record_errors(#[case] csv_record: CsvRecord, #[case] expected: LedgerError) {
        assert_eq!(convert_csv_record(csv_record), Err(expected));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_accounts_csv_reports_io_error() {
        let accounts = vec![Account::new(1, "Alice", Decimal::ONE, "USD")];

        let result = write_accounts_csv(&accounts, &mut FailingWriter);

        assert!(matches!(result, Err(LedgerError::IoError { .. })));
    }

    #[test]
    fn test_convert_keeps_negative_amount_for_engine() {
        let csv_record = CsvRecord {
            caller: Some(1),
            account: Some(1),
            amount: Some("-100".to_string()),
            ..record("deposit")
        };

        let operation = convert_csv_record(csv_record).unwrap();

        assert!(matches!(
            operation,
            Operation::Deposit { amount, .. } if amount == Decimal::new(-100, 0)
        ));
    }

    #[rstest]
    #[case::single_account(
        vec![Account::new(1, "Alice", Decimal::new(100, 0), "USD")],
        "id,name,balance,currency\n1,Alice,100.0000,USD\n"
    )]
    #[case::sorted_by_id(
        vec![
            Account::new(3, "Carol", Decimal::ZERO, "USD"),
            Account::new(1, "Alice", Decimal::ZERO, "USD"),
            Account::new(2, "Bob", Decimal::ZERO, "USD"),
        ],
        "id,name,balance,currency\n1,Alice,0.0000,USD\n2,Bob,0.0000,USD\n3,Carol,0.0000,USD\n"
    )]
    #[case::four_decimal_precision(
        vec![Account::new(1, "Alice", Decimal::new(1001234, 4), "EUR")],
        "id,name,balance,currency\n1,Alice,100.1234,EUR\n"
    )]
    #[case::name_with_comma(
        vec![Account::new(1, "Doe, John", Decimal::ONE, "USD")],
        "id,name,balance,currency\n1,\"Doe, John\",1.0000,USD\n"
    )]
    #[case::empty_accounts(vec![], "id,name,balance,currency\n")]
    fn test_write_accounts_csv(#[case] accounts: Vec<Account>, #[case] expected_output: &str) {
        let mut output = Vec::new();
        let result = write_accounts_csv(&accounts, &mut output);
        assert!(result.is_ok());

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(output_str, expected_output);
    }
}
