//! Unit tests for the Money and VatRate types
//!
//! Covers creation, stored-precision rounding, arithmetic, currency handling
//! and the VAT percentage labels printed on invoices.

use core_kernel::{Money, Currency, MoneyError, VatRate};
use core_kernel::money::format_fixed;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(100.50), Currency::GBP);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::GBP);
    }

    #[test]
    fn test_new_rounds_to_two_decimal_places() {
        let m = Money::new(dec!(480.552), Currency::GBP);
        assert_eq!(m.amount(), dec!(480.55));
    }

    #[test]
    fn test_from_minor_converts_pence_correctly() {
        let m = Money::from_minor(10050, Currency::GBP);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert!(!m.is_negative());
        assert_eq!(m.currency(), Currency::EUR);
    }

    #[test]
    fn test_negative_amount_creation() {
        let m = Money::new(dec!(-1.01), Currency::GBP);
        assert!(m.is_negative());
        assert_eq!(m.amount(), dec!(-1.01));
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_same_currency() {
        let a = Money::new(dec!(10.01), Currency::GBP);
        let b = Money::new(dec!(0.99), Currency::GBP);
        assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(11.00));
    }

    #[test]
    fn test_checked_sub_currency_mismatch() {
        let a = Money::new(dec!(100.00), Currency::GBP);
        let b = Money::new(dec!(50.00), Currency::USD);
        assert!(matches!(a.checked_sub(&b), Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_multiply_by_quantity() {
        let price = Money::new(dec!(200.23), Currency::GBP);
        assert_eq!((price * dec!(2.4)).amount(), dec!(480.55));
    }

    #[test]
    fn test_negation() {
        let m = Money::new(dec!(100.00), Currency::GBP);
        assert_eq!((-m).amount(), dec!(-100.00));
    }

    #[test]
    fn test_try_sum() {
        let amounts = vec![
            Money::new(dec!(390.00), Currency::GBP),
            Money::new(dec!(480.55), Currency::GBP),
        ];
        let total = Money::try_sum(Currency::GBP, &amounts).unwrap();
        assert_eq!(total.amount(), dec!(870.55));
    }

    #[test]
    fn test_try_sum_of_nothing_is_zero() {
        let total = Money::try_sum(Currency::GBP, std::iter::empty()).unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn test_try_sum_rejects_mixed_currencies() {
        let amounts = vec![
            Money::new(dec!(1.00), Currency::GBP),
            Money::new(dec!(1.00), Currency::EUR),
        ];
        assert!(Money::try_sum(Currency::GBP, &amounts).is_err());
    }
}

mod formatting {
    use super::*;

    #[test]
    fn test_display_includes_symbol() {
        assert_eq!(Money::new(dec!(1044.66), Currency::GBP).to_string(), "£1044.66");
        assert_eq!(Money::new(dec!(5), Currency::USD).to_string(), "$5.00");
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(dec!(1.5), 2), "1.50");
        assert_eq!(format_fixed(dec!(0.125), 2), "0.12");
        assert_eq!(format_fixed(dec!(-0.001), 2), "0.00");
    }

    #[test]
    fn test_currency_names() {
        assert_eq!(Currency::GBP.unit_name(), "pounds");
        assert_eq!(Currency::GBP.long_name(), "pounds sterling");
        assert_eq!(Currency::default(), Currency::GBP);
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("gbp".parse::<Currency>().unwrap(), Currency::GBP);
        assert!("XYZ".parse::<Currency>().is_err());
    }
}

mod vat_rate {
    use super::*;

    #[test]
    fn test_rate_is_stored_to_three_places() {
        let rate = VatRate::new(dec!(0.1754)).unwrap();
        assert_eq!(rate.as_decimal(), dec!(0.175));
    }

    #[test]
    fn test_percentage_without_trailing_zeros() {
        assert_eq!(VatRate::new(dec!(0.200)).unwrap().percentage_label(), "20");
        assert_eq!(VatRate::new(dec!(0.175)).unwrap().percentage_label(), "17.5");
        assert_eq!(VatRate::new(dec!(0.05)).unwrap().to_string(), "5%");
    }

    #[test]
    fn test_from_percentage() {
        let rate = VatRate::from_percentage(dec!(17.5)).unwrap();
        assert_eq!(rate.as_decimal(), dec!(0.175));
    }

    #[test]
    fn test_out_of_range_rate_is_rejected() {
        assert_eq!(
            VatRate::new(dec!(2)),
            Err(MoneyError::InvalidVatRate(dec!(2)))
        );
    }

    #[test]
    fn test_rate_converts_back_to_decimal() {
        let rate = VatRate::try_from(dec!(0.2)).unwrap();
        assert_eq!(rust_decimal::Decimal::from(rate), dec!(0.2));
    }
}
