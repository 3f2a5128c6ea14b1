//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::temporal::TemporalError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::CurrencyMismatch("GBP".to_string(), "EUR".to_string());
    let core_error: CoreError = money_error.into();

    assert!(matches!(core_error, CoreError::Money(_)));
    assert!(core_error.to_string().contains("GBP"));
}

#[test]
fn test_core_error_from_temporal_error() {
    let core_error: CoreError = TemporalError::OpenInterval.into();
    assert!(matches!(core_error, CoreError::Temporal(TemporalError::OpenInterval)));
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("VAT rate missing");
    assert_eq!(error.to_string(), "Configuration error: VAT rate missing");
}
