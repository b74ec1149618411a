use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;
use trend_forecast::engine::{ForecastResult, HorizonPoint};
use trend_forecast::error::ForecastError;
use trend_forecast::export::{
    read_forecast, write_forecast, write_insights, write_reconciled, write_report, write_series,
};
use trend_forecast::models::arima::ArimaOrder;
use trend_forecast::reconcile::{ForecastSource, ReconciledRow, TrendDirection};
use trend_forecast::report::ReportRow;
use trend_forecast::data::NormalizedSeries;

fn forecast() -> ForecastResult {
    let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    ForecastResult {
        keyword: "Quantum Computing".to_string(),
        order: ArimaOrder::new(1, 1, 0, true),
        horizon_points: (0..5)
            .map(|i| {
                let estimate = 41.25 + 0.1 * i as f64;
                HorizonPoint {
                    date: start + Duration::days(i),
                    point_estimate: estimate,
                    lower_bound: estimate - 3.3333333333,
                    upper_bound: estimate + 3.3333333333,
                }
            })
            .collect(),
        holdout_rmse: Some(1.5),
    }
}

fn row(keyword: &str, growth_percent: f64, rank: usize) -> ReconciledRow {
    ReconciledRow {
        keyword: keyword.to_string(),
        current_value: 0.0,
        forecast_value: 5.0,
        growth_percent,
        trend_direction: TrendDirection::Up,
        volatility: 1.25,
        rank,
        source: ForecastSource::Fallback,
    }
}

#[test]
fn test_forecast_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Quantum_Computing_arima_forecast.csv");
    let forecast = forecast();

    write_forecast(&path, &forecast).unwrap();
    let points = read_forecast(&path).unwrap();

    assert_eq!(points, forecast.horizon_points);
    let header = fs::read_to_string(&path).unwrap();
    assert!(header.starts_with("ds,y_pred,y_lower,y_upper\n2024-06-01,"));
}

#[test]
fn test_forecast_file_missing_column() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.csv");
    fs::write(&path, "ds,y_pred,y_lower\n2024-01-01,1.0,0.5\n").unwrap();

    let err = read_forecast(&path).unwrap_err();

    match err {
        ForecastError::MissingRequiredColumn { column, path: reported } => {
            assert_eq!(column, "y_upper");
            assert_eq!(reported, path);
        }
        other => panic!("Expected MissingRequiredColumn, got {other:?}"),
    }
}

#[test]
fn test_reconciled_table_columns_and_undefined_growth() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("final_forecast_table.csv");

    write_reconciled(&path, &[row("Edge Computing", 12.5, 1), row("5G", f64::NAN, 2)]).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(
        lines[0],
        "Technology,Current_Value,Forecast_Value,Growth_Percent,Trend_Direction,Volatility,Rank"
    );
    assert!(lines[1].starts_with("Edge Computing,"));
    assert!(lines[1].ends_with(",12.5,Up,1.25,1"));
    assert!(lines[2].starts_with("5G,"));
    assert!(lines[2].ends_with(",,Up,1.25,2"));
}

#[test]
fn test_report_has_signal_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dashboard_master.csv");
    let rows = vec![
        ReportRow {
            reconciled: row("Generative AI", 20.0, 1),
            sentiment_label: Some("Positive".to_string()),
            trend_strength_score: Some(31.5),
            yearly_avg_interest: Some(44.0),
        },
        ReportRow {
            reconciled: row("Blockchain", 2.0, 2),
            sentiment_label: None,
            trend_strength_score: None,
            yearly_avg_interest: None,
        },
    ];

    write_report(&path, &rows).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(
        lines[0],
        "Technology,Current_Value,Forecast_Value,Growth_Percent,Trend_Direction,Volatility,Rank,News_Sentiment,Trend_Strength,Yearly_Avg_Interest"
    );
    assert!(lines[1].ends_with(",1,Positive,31.5,44.0"));
    assert!(lines[2].ends_with(",2,,,"));
}

#[test]
fn test_series_and_insights_files() {
    let dir = tempdir().unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
    let series = NormalizedSeries::new("5G", start, vec![1.0, 2.5, 3.0]).unwrap();

    let series_path = dir.path().join("forecast_input.csv");
    write_series(&series_path, &series).unwrap();
    assert_eq!(
        fs::read_to_string(&series_path).unwrap(),
        "ds,y\n2024-02-28,1.0\n2024-02-29,2.5\n2024-03-01,3.0\n"
    );

    let insights_path = dir.path().join("auto_insights.txt");
    let lines = vec!["First line".to_string(), "Second line".to_string()];
    write_insights(&insights_path, &lines).unwrap();
    assert_eq!(
        fs::read_to_string(&insights_path).unwrap(),
        "First line\nSecond line\n"
    );
}
