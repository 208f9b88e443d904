//! Cash-drawer ledger: append-only transactions, running balance as a pure
//! fold, and the income hook run on referral creation.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::enums::{PaymentMethod, TransactionKind};
use crate::models::{Referral, SafeTransaction};

#[derive(Error, Debug, PartialEq)]
pub enum LedgerError {
    #[error("transaction amount must be positive, got {0}")]
    NonPositiveAmount(f64),

    #[error("transaction description must not be empty")]
    EmptyDescription,
}

/// Running balance: INCOME adds, EXPENSE subtracts. Order-independent.
pub fn balance(transactions: &[SafeTransaction]) -> f64 {
    transactions.iter().fold(0.0, |acc, t| match t.kind {
        TransactionKind::Income => acc + t.amount,
        TransactionKind::Expense => acc - t.amount,
    })
}

/// Sum of all INCOME amounts.
pub fn income_total(transactions: &[SafeTransaction]) -> f64 {
    transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Income)
        .map(|t| t.amount)
        .sum()
}

/// Sum of all EXPENSE amounts.
pub fn expense_total(transactions: &[SafeTransaction]) -> f64 {
    transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Expense)
        .map(|t| t.amount)
        .sum()
}

/// Build a manual ledger entry. Amounts must be strictly positive and the
/// description non-empty; the entry is never mutated once created.
pub fn manual_entry(
    kind: TransactionKind,
    amount: f64,
    description: &str,
    now: DateTime<Utc>,
) -> Result<SafeTransaction, LedgerError> {
    if amount <= 0.0 {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    if description.trim().is_empty() {
        return Err(LedgerError::EmptyDescription);
    }
    Ok(SafeTransaction {
        id: Uuid::new_v4(),
        kind,
        amount,
        description: description.to_string(),
        date: now,
    })
}

/// Income hook for referral creation: CASH and POS referrals with a positive
/// total put money in the drawer; INVOICE referrals are accounts-receivable
/// and never touch the ledger.
pub fn record_referral_income(referral: &Referral, now: DateTime<Utc>) -> Option<SafeTransaction> {
    let channel = match referral.payment_method {
        PaymentMethod::Cash => "Cash",
        PaymentMethod::Pos => "POS",
        PaymentMethod::Invoice => return None,
    };
    if referral.total_price <= 0.0 {
        return None;
    }
    Some(SafeTransaction {
        id: Uuid::new_v4(),
        kind: TransactionKind::Income,
        amount: referral.total_price,
        description: format!(
            "Referral income ({channel}): {} ({})",
            referral.employee.full_name, referral.employee.company
        ),
        date: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::ReferralStatus;
    use crate::models::Employee;
    use chrono::TimeZone;

    fn tx(kind: TransactionKind, amount: f64) -> SafeTransaction {
        SafeTransaction {
            id: Uuid::new_v4(),
            kind,
            amount,
            description: "test".to_string(),
            date: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        }
    }

    fn referral(method: PaymentMethod, total_price: f64) -> Referral {
        Referral {
            id: Uuid::new_v4(),
            employee: Employee {
                id: Uuid::new_v4(),
                full_name: "Ali Veli".to_string(),
                tc_no: "12345678901".to_string(),
                birth_date: None,
                company: "Kuzey Lojistik ve Depolama".to_string(),
            },
            exams: vec![],
            status: ReferralStatus::Pending,
            referral_date: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
            notes: None,
            result_summary: None,
            doctor_name: "Dr. Ahmet Demir".to_string(),
            specialist_name: "Uzm. Fatma Şahin".to_string(),
            total_price,
            total_cost: 0.0,
            payment_method: method,
            target_institution_id: None,
        }
    }

    #[test]
    fn balance_folds_income_minus_expense() {
        let txs = vec![
            tx(TransactionKind::Income, 200.0),
            tx(TransactionKind::Expense, 50.0),
        ];
        assert_eq!(balance(&txs), 150.0);
        assert_eq!(income_total(&txs), 200.0);
        assert_eq!(expense_total(&txs), 50.0);
    }

    #[test]
    fn balance_is_order_independent() {
        let mut txs = vec![
            tx(TransactionKind::Income, 100.0),
            tx(TransactionKind::Expense, 30.0),
            tx(TransactionKind::Income, 75.0),
        ];
        let forward = balance(&txs);
        txs.reverse();
        assert_eq!(balance(&txs), forward);
    }

    #[test]
    fn empty_ledger_balances_to_zero() {
        assert_eq!(balance(&[]), 0.0);
    }

    #[test]
    fn manual_entry_rejects_non_positive_amounts() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(
            manual_entry(TransactionKind::Expense, 0.0, "rent", now).unwrap_err(),
            LedgerError::NonPositiveAmount(0.0)
        );
        assert!(manual_entry(TransactionKind::Income, -5.0, "x", now).is_err());
    }

    #[test]
    fn manual_entry_rejects_blank_description() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(
            manual_entry(TransactionKind::Income, 10.0, "   ", now).unwrap_err(),
            LedgerError::EmptyDescription
        );
    }

    #[test]
    fn cash_referral_produces_income_transaction() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let entry = record_referral_income(&referral(PaymentMethod::Cash, 150.0), now).unwrap();
        assert_eq!(entry.kind, TransactionKind::Income);
        assert_eq!(entry.amount, 150.0);
        assert!(entry.description.contains("Cash"));
        assert!(entry.description.contains("Ali Veli"));
        assert!(entry.description.contains("Kuzey Lojistik ve Depolama"));
    }

    #[test]
    fn pos_referral_produces_income_transaction() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let entry = record_referral_income(&referral(PaymentMethod::Pos, 90.0), now).unwrap();
        assert_eq!(entry.amount, 90.0);
        assert!(entry.description.contains("POS"));
    }

    #[test]
    fn invoice_referral_never_touches_the_ledger() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert!(record_referral_income(&referral(PaymentMethod::Invoice, 500.0), now).is_none());
    }

    #[test]
    fn zero_price_referral_produces_no_transaction() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert!(record_referral_income(&referral(PaymentMethod::Cash, 0.0), now).is_none());
    }
}
