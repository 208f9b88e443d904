use crate::db::StoreError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Wire representation matches the stored SCREAMING_SNAKE_CASE strings.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StoreError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(ReferralStatus {
    Pending => "PENDING",
    AtHospital => "AT_HOSPITAL",
    AwaitingResult => "AWAITING_RESULT",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

str_enum!(PaymentMethod {
    Cash => "CASH",
    Pos => "POS",
    Invoice => "INVOICE",
});

str_enum!(HazardClass {
    Less => "LESS",
    Dangerous => "DANGEROUS",
    VeryDangerous => "VERY_DANGEROUS",
});

str_enum!(TransactionKind {
    Income => "INCOME",
    Expense => "EXPENSE",
});

impl ReferralStatus {
    /// Human-readable label for report rendering.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::AtHospital => "At hospital",
            Self::AwaitingResult => "Awaiting result",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Pos => "POS",
            Self::Invoice => "Invoice",
        }
    }
}

/// Legacy company rows may lack a payment method; they bill on account.
impl Default for PaymentMethod {
    fn default() -> Self {
        Self::Invoice
    }
}

impl HazardClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Less => "Less dangerous",
            Self::Dangerous => "Dangerous",
            Self::VeryDangerous => "Very dangerous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn referral_status_round_trip() {
        for (variant, s) in [
            (ReferralStatus::Pending, "PENDING"),
            (ReferralStatus::AtHospital, "AT_HOSPITAL"),
            (ReferralStatus::AwaitingResult, "AWAITING_RESULT"),
            (ReferralStatus::Completed, "COMPLETED"),
            (ReferralStatus::Cancelled, "CANCELLED"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ReferralStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn payment_method_round_trip() {
        for (variant, s) in [
            (PaymentMethod::Cash, "CASH"),
            (PaymentMethod::Pos, "POS"),
            (PaymentMethod::Invoice, "INVOICE"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(PaymentMethod::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn hazard_class_round_trip() {
        for (variant, s) in [
            (HazardClass::Less, "LESS"),
            (HazardClass::Dangerous, "DANGEROUS"),
            (HazardClass::VeryDangerous, "VERY_DANGEROUS"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(HazardClass::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn transaction_kind_round_trip() {
        for (variant, s) in [
            (TransactionKind::Income, "INCOME"),
            (TransactionKind::Expense, "EXPENSE"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(TransactionKind::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn unknown_value_is_rejected() {
        assert!(ReferralStatus::from_str("ARCHIVED").is_err());
        assert!(PaymentMethod::from_str("cash").is_err());
    }

    #[test]
    fn serde_uses_stored_wire_strings() {
        let json = serde_json::to_string(&ReferralStatus::AtHospital).unwrap();
        assert_eq!(json, r#""AT_HOSPITAL""#);
        let back: PaymentMethod = serde_json::from_str(r#""POS""#).unwrap();
        assert_eq!(back, PaymentMethod::Pos);
    }

    #[test]
    fn missing_payment_method_defaults_to_invoice() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Invoice);
    }
}
