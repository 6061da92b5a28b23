use crate::error::LedgerError;

/// Convert a credit amount to milli-credits, rejecting anything that isn't
/// representable as a whole mCC (§8 property 2).
pub fn to_mcc(credits: f64) -> Result<u128, LedgerError> {
    if !credits.is_finite() || credits < 0.0 {
        return Err(LedgerError::InvalidAmount(format!(
            "{credits} is not a non-negative finite credit amount"
        )));
    }
    let scaled = credits * 1000.0;
    let rounded = scaled.round();
    if (scaled - rounded).abs() > 1e-6 {
        return Err(LedgerError::InvalidAmount(format!(
            "{credits} credits is not representable in whole mCC"
        )));
    }
    Ok(rounded as u128)
}

/// Convert milli-credits back to a credit amount.
pub fn from_mcc(mcc: u128) -> f64 {
    mcc as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_credits_round_trip() {
        for n in 0u128..1000 {
            let credits = n as f64;
            let mcc = to_mcc(credits).unwrap();
            assert_eq!(from_mcc(mcc), credits);
        }
    }

    #[test]
    fn sub_milli_fraction_rejected() {
        assert!(to_mcc(0.0001).is_err());
    }

    #[test]
    fn negative_rejected() {
        assert!(to_mcc(-1.0).is_err());
    }

    proptest::proptest! {
        #[test]
        fn whole_mcc_round_trips_exactly(mcc in 0u128..1_000_000_000_000u128) {
            let credits = from_mcc(mcc);
            let back = to_mcc(credits).unwrap();
            prop_assert_eq!(back, mcc);
        }
    }
}
