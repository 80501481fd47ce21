use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rstest::rstest;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};
use weekly_forecast::models::{ArimaOrder, ModelConfig};
use weekly_forecast::{
    load_series, run_backtest, run_backtest_from_csv, ForecastError, GapPolicy, PipelineConfig,
    Series,
};

/// Daily rows for two entities; Chile is missing the days of one week
fn write_daily_csv(weeks: i64) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Entity,Code,Day,Weekly cases per million people").unwrap();

    // Monday
    let start = NaiveDate::from_ymd_opt(2020, 3, 2).unwrap();
    for day in 0..weeks * 7 {
        let date = start + Duration::days(day);
        let index = day / 7;
        let week = index as f64;
        let noise = ((index * 7919) % 23) as f64;
        let us = 200.0 + 3.0 * week + 20.0 * (week / 4.0).sin() + noise + (day % 7) as f64;
        writeln!(file, "United States,USA,{},{:.3}", date, us).unwrap();

        if index != 10 {
            let chile = 80.0 + week + ((day * 37) % 11) as f64;
            writeln!(file, "Chile,CHL,{},{:.3}", date, chile).unwrap();
        }
    }
    file
}

fn small_config(horizon: usize) -> PipelineConfig {
    PipelineConfig {
        horizon,
        model: ModelConfig {
            order: ArimaOrder::new(1, 1, 1),
            ..ModelConfig::default()
        },
        ..PipelineConfig::default()
    }
}

#[test]
fn test_backtest_from_csv() {
    let file = write_daily_csv(80);
    let report = run_backtest_from_csv(file.path(), &small_config(12)).unwrap();

    assert_eq!(report.model_name, "ARIMA(1,1,1)");
    assert_eq!(report.view.entity(), "United States");
    assert_eq!(report.view.history().len(), 80);
    assert_eq!(report.view.rows().len(), 12);

    // Weeks end on Sunday
    let boundary = report.view.boundary();
    assert_eq!(boundary.date, NaiveDate::from_ymd_opt(2021, 6, 20).unwrap());
    assert_eq!(report.view.history()[67], boundary);

    for row in report.view.rows() {
        assert!(row.band.lower <= row.forecast && row.forecast <= row.band.upper);
    }
    assert!(report.sigma2 > 0.0);
    assert!(report.accuracy.rmse >= report.accuracy.mae);

    let dir = tempdir().unwrap();
    let output = dir.path().join("view.csv");
    report.view.write_csv(&output).unwrap();
    assert!(output.exists());
}

#[test]
fn test_loaded_series_is_weekly_mean() {
    let file = write_daily_csv(3);
    let series = load_series(file.path(), &small_config(1)).unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(
        series.first_date(),
        Some(NaiveDate::from_ymd_opt(2020, 3, 8).unwrap())
    );
    // 200 + mean of the day-of-week offsets 0..=6
    assert!((series.values()[0] - 203.0).abs() < 1e-9);
}

#[test]
fn test_unknown_entity_fails_in_load_stage() {
    let file = write_daily_csv(10);
    let mut config = small_config(4);
    config.loader.entity = "Atlantis".to_string();

    let error = run_backtest_from_csv(file.path(), &config).unwrap_err();
    assert_eq!(error.stage(), Some("load"));
    assert!(matches!(error.root(), ForecastError::DataNotFound { .. }));
    assert!(error.to_string().contains("Atlantis"));
}

#[test]
fn test_gap_fails_in_resample_stage_unless_interpolating() {
    let file = write_daily_csv(40);
    let mut config = small_config(8);
    config.loader.entity = "Chile".to_string();

    let error = run_backtest_from_csv(file.path(), &config).unwrap_err();
    assert_eq!(error.stage(), Some("resample"));
    match error.root() {
        ForecastError::ResamplingGap { entity, week } => {
            assert_eq!(entity, "Chile");
            assert_eq!(*week, NaiveDate::from_ymd_opt(2020, 5, 17).unwrap());
        }
        other => panic!("expected ResamplingGap, got {:?}", other),
    }

    config.gap_policy = GapPolicy::Interpolate;
    let report = run_backtest_from_csv(file.path(), &config).unwrap();
    assert_eq!(report.view.history().len(), 40);
}

#[test]
fn test_horizon_longer_than_series_fails_in_split_stage() {
    let start = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
    let series = Series::weekly("United States", start, vec![1.0; 30]).unwrap();

    let error = run_backtest(&series, &small_config(52)).unwrap_err();
    assert_eq!(error.stage(), Some("split"));
    assert!(matches!(
        error.root(),
        ForecastError::InsufficientData {
            needed: 52,
            available: 30
        }
    ));
}

#[test]
fn test_oversized_model_fails_in_fit_stage() {
    let start = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
    let values = (0..20).map(|i| i as f64).collect();
    let series = Series::weekly("United States", start, values).unwrap();

    let error = run_backtest(&series, &PipelineConfig { horizon: 10, ..PipelineConfig::arima() })
        .unwrap_err();
    assert_eq!(error.stage(), Some("fit"));
    assert!(matches!(error.root(), ForecastError::ModelFitError(_)));
}

#[test]
fn test_runs_are_deterministic() {
    let file = write_daily_csv(60);
    let config = small_config(10);

    let first = run_backtest_from_csv(file.path(), &config).unwrap();
    let second = run_backtest_from_csv(file.path(), &config).unwrap();
    assert_eq!(first.view, second.view);
    assert_eq!(first.accuracy, second.accuracy);
}

/// Roughly 200 weeks of wave-shaped case counts with seeded noise
fn covid_like_series(weeks: usize) -> Series {
    let mut rng = StdRng::seed_from_u64(2020);
    let noise = Normal::new(0.0, 30.0).unwrap();

    let values = (0..weeks)
        .map(|t| {
            let t = t as f64;
            let wave = 600.0 * (2.0 * std::f64::consts::PI * t / 26.0).sin().max(-0.8);
            let trend = 1500.0 - 4.0 * t;
            (trend + wave + noise.sample(&mut rng)).max(0.0)
        })
        .collect();
    let start = NaiveDate::from_ymd_opt(2020, 3, 8).unwrap();
    Series::weekly("United States", start, values).unwrap()
}

#[rstest]
#[case(PipelineConfig::arima(), "ARIMA(5,1,5)")]
#[case(PipelineConfig::sarima(), "SARIMA(5,1,5)(1,0,1,26)")]
fn test_presets_fit_a_realistic_series(#[case] config: PipelineConfig, #[case] name: &str) {
    let series = covid_like_series(200);
    let report = run_backtest(&series, &config).unwrap();

    assert_eq!(report.model_name, name);
    assert_eq!(report.view.rows().len(), 52);
    assert_eq!(report.view.boundary(), series.get(147).unwrap());
    assert!(report.iterations > 0);
    assert!(report.sigma2.is_finite() && report.sigma2 > 0.0);
    for row in report.view.rows() {
        assert!(row.forecast.is_finite());
        assert!(row.band.lower <= row.forecast && row.forecast <= row.band.upper);
    }
}
