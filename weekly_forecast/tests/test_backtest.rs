use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::tempdir;
use weekly_forecast::backtest::BacktestView;
use weekly_forecast::data::Series;
use weekly_forecast::models::arima::SarimaModel;
use weekly_forecast::models::{ForecastModel, TrainedForecastModel};
use weekly_forecast::split::split_holdout;
use weekly_forecast::ForecastError;

fn series() -> Series {
    let start = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
    let values = (0..30).map(|i| 50.0 + (i % 5) as f64).collect();
    Series::weekly("United States", start, values).unwrap()
}

#[test]
fn test_view_aligns_forecast_with_holdout() {
    let series = series();
    let split = split_holdout(&series, 8).unwrap();
    let trained = SarimaModel::arima(1, 0, 0)
        .unwrap()
        .train(split.train())
        .unwrap();
    let forecast = trained.forecast(8).unwrap();

    let view = BacktestView::build(&series, &split, &forecast).unwrap();

    assert_eq!(view.entity(), "United States");
    assert_eq!(view.history().len(), 30);
    assert_eq!(view.rows().len(), 8);
    assert_eq!(view.boundary(), series.get(21).unwrap());
    assert_eq!(view.significance_level(), 0.05);

    for (row, actual) in view.rows().iter().zip(split.holdout().observations()) {
        assert_eq!(row.date, actual.date);
        assert_eq!(row.actual, actual.value);
        assert!(row.band.lower <= row.forecast && row.forecast <= row.band.upper);
    }

    let accuracy = view.accuracy().unwrap();
    assert!(accuracy.mae >= 0.0);
    assert!(accuracy.coverage >= 0.0 && accuracy.coverage <= 100.0);
}

#[test]
fn test_view_rejects_misaligned_forecast() {
    let series = series();
    let split = split_holdout(&series, 8).unwrap();
    let trained = SarimaModel::arima(1, 0, 0)
        .unwrap()
        .train(split.train())
        .unwrap();

    let short = trained.forecast(5).unwrap();
    let result = BacktestView::build(&series, &split, &short);
    assert!(matches!(result, Err(ForecastError::ValidationError(_))));

    // Split taken from a different series
    let other = Series::weekly(
        "United States",
        NaiveDate::from_ymd_opt(2022, 1, 2).unwrap(),
        series.values().to_vec(),
    )
    .unwrap();
    let forecast = trained.forecast(8).unwrap();
    let result = BacktestView::build(&other, &split, &forecast);
    assert!(matches!(result, Err(ForecastError::ValidationError(_))));
}

#[test]
fn test_write_csv() {
    let series = series();
    let split = split_holdout(&series, 4).unwrap();
    let forecast = SarimaModel::arima(1, 0, 0)
        .unwrap()
        .train(split.train())
        .unwrap()
        .forecast(4)
        .unwrap();
    let view = BacktestView::build(&series, &split, &forecast).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("backtest.csv");
    view.write_csv(&path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["date", "segment", "actual", "forecast", "lower", "upper", "forecast_start"]
    );

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 30);

    assert_eq!(&records[0][0], "2021-01-03");
    assert_eq!(&records[0][1], "train");
    assert_eq!(&records[0][3], "");

    let boundary = &records[25];
    assert_eq!(&boundary[1], "train");
    assert_eq!(&boundary[6], "true");

    let first_forecast = &records[26];
    assert_eq!(&first_forecast[1], "holdout");
    assert_eq!(&first_forecast[6], "false");
    let point: f64 = first_forecast[3].parse().unwrap();
    assert_eq!(point, forecast.values()[0]);

    // Only the final file remains
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_write_csv_into_missing_directory() {
    let series = series();
    let split = split_holdout(&series, 4).unwrap();
    let forecast = SarimaModel::arima(1, 0, 0)
        .unwrap()
        .train(split.train())
        .unwrap()
        .forecast(4)
        .unwrap();
    let view = BacktestView::build(&series, &split, &forecast).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("backtest.csv");
    assert!(view.write_csv(&path).is_err());
    assert!(!path.exists());
}
