use approx::assert_relative_eq;
use weekly_forecast::metrics::evaluate_forecast;
use weekly_forecast::models::ConfidenceBound;
use weekly_forecast::ForecastError;

fn band(lower: f64, upper: f64) -> ConfidenceBound {
    ConfidenceBound { lower, upper }
}

#[test]
fn test_regression_metrics() {
    let actual = vec![10.0, 20.0, 30.0, 40.0, 50.0];
    let predicted = vec![12.0, 18.0, 33.0, 37.0, 52.0];
    let bands = vec![
        band(9.0, 15.0),
        band(15.0, 21.0),
        band(31.0, 35.0),
        band(35.0, 39.0),
        band(45.0, 60.0),
    ];

    let accuracy = evaluate_forecast(&predicted, &actual, &bands).unwrap();

    assert_relative_eq!(accuracy.mae, 2.4);
    assert_relative_eq!(accuracy.mse, 6.0);
    assert_relative_eq!(accuracy.rmse, 6.0f64.sqrt());
    assert!(accuracy.mape > 0.0 && accuracy.mape < 15.0);
    assert!(accuracy.smape > 0.0 && accuracy.smape < 15.0);
    assert_relative_eq!(accuracy.coverage, 60.0);
}

#[test]
fn test_perfect_forecast() {
    let values = vec![1.0, 2.0, 3.0];
    let bands = vec![band(1.0, 1.0), band(2.0, 2.0), band(3.0, 3.0)];
    let accuracy = evaluate_forecast(&values, &values, &bands).unwrap();

    assert_eq!(accuracy.mae, 0.0);
    assert_eq!(accuracy.rmse, 0.0);
    assert_eq!(accuracy.mape, 0.0);
    assert_eq!(accuracy.smape, 0.0);
    assert_eq!(accuracy.coverage, 100.0);
}

#[test]
fn test_zero_actuals_are_skipped_in_mape() {
    let actual = vec![0.0, 10.0];
    let predicted = vec![5.0, 11.0];
    let bands = vec![band(0.0, 10.0), band(0.0, 9.0)];
    let accuracy = evaluate_forecast(&predicted, &actual, &bands).unwrap();

    assert_relative_eq!(accuracy.mape, 10.0);
    assert_relative_eq!(accuracy.coverage, 50.0);
}

#[test]
fn test_mismatched_lengths() {
    let result = evaluate_forecast(&[1.0, 2.0], &[1.0], &[band(0.0, 2.0)]);
    assert!(matches!(result, Err(ForecastError::ValidationError(_))));
    assert!(evaluate_forecast(&[], &[], &[]).is_err());
}

#[test]
fn test_display() {
    let accuracy = evaluate_forecast(&[1.0], &[2.0], &[band(0.0, 3.0)]).unwrap();
    let text = accuracy.to_string();
    assert!(text.contains("MAE"));
    assert!(text.contains("Coverage: 100.00%"));
}
