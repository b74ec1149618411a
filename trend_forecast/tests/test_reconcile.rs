use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use trend_forecast::data::NormalizedSeries;
use trend_forecast::engine::{ForecastResult, HorizonPoint};
use trend_forecast::error::ForecastError;
use trend_forecast::fallback::{FallbackEstimator, FallbackResult};
use trend_forecast::models::arima::ArimaOrder;
use trend_forecast::reconcile::{ForecastReconciler, ForecastSource, TrendDirection};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn keywords(names: &[&str]) -> Vec<String> {
    names.iter().map(|k| k.to_string()).collect()
}

fn series_map(entries: &[(&str, Vec<f64>)]) -> HashMap<String, NormalizedSeries> {
    entries
        .iter()
        .map(|(keyword, values)| {
            (
                keyword.to_string(),
                NormalizedSeries::new(*keyword, start(), values.clone()).unwrap(),
            )
        })
        .collect()
}

fn model_forecast(keyword: &str, after: NaiveDate, estimate: f64) -> ForecastResult {
    ForecastResult {
        keyword: keyword.to_string(),
        order: ArimaOrder::new(0, 1, 0, false),
        horizon_points: vec![HorizonPoint {
            date: after + Duration::days(1),
            point_estimate: estimate,
            lower_bound: estimate - 1.0,
            upper_bound: estimate + 1.0,
        }],
        holdout_rmse: None,
    }
}

fn fallback(keyword: &str, estimate: f64) -> (String, FallbackResult) {
    (
        keyword.to_string(),
        FallbackResult {
            keyword: keyword.to_string(),
            estimate,
        },
    )
}

#[test]
fn test_ties_share_rank() {
    let names = keywords(&["A", "B", "C"]);
    let series = series_map(&[
        ("A", vec![100.0]),
        ("B", vec![100.0]),
        ("C", vec![100.0]),
    ]);
    let fallbacks: HashMap<_, _> =
        [fallback("A", 110.0), fallback("B", 105.0), fallback("C", 110.0)]
            .into_iter()
            .collect();

    let table = ForecastReconciler::default()
        .reconcile(&names, &series, &HashMap::new(), &fallbacks)
        .unwrap();

    assert_eq!(table.get("A").unwrap().rank, 1);
    assert_eq!(table.get("C").unwrap().rank, 1);
    assert_eq!(table.get("B").unwrap().rank, 3);
    let order: Vec<&str> = table.rows().iter().map(|r| r.keyword.as_str()).collect();
    assert_eq!(order, vec!["A", "C", "B"]);
}

#[test]
fn test_model_forecast_takes_precedence() {
    let names = keywords(&["5G"]);
    let series = series_map(&[("5G", vec![10.0, 20.0])]);
    let end = start() + Duration::days(1);
    let forecasts: HashMap<_, _> = [("5G".to_string(), model_forecast("5G", end, 30.0))]
        .into_iter()
        .collect();
    let fallbacks: HashMap<_, _> = [fallback("5G", 5.0)].into_iter().collect();

    let table = ForecastReconciler::default()
        .reconcile(&names, &series, &forecasts, &fallbacks)
        .unwrap();
    let row = table.get("5G").unwrap();

    assert_eq!(row.source, ForecastSource::Model);
    assert_eq!(row.current_value, 20.0);
    assert_eq!(row.forecast_value, 30.0);
    assert_eq!(row.growth_percent, 50.0);
    assert_eq!(row.trend_direction, TrendDirection::Up);
}

#[test]
fn test_zero_current_value_gives_undefined_growth() {
    let names = keywords(&["Zero", "Flat", "Falling"]);
    let series = series_map(&[
        ("Zero", vec![3.0, 0.0]),
        ("Flat", vec![4.0, 4.0]),
        ("Falling", vec![8.0, 8.0]),
    ]);
    let fallbacks: HashMap<_, _> =
        [fallback("Zero", 5.0), fallback("Flat", 4.0), fallback("Falling", 6.0)]
            .into_iter()
            .collect();

    let table = ForecastReconciler::default()
        .reconcile(&names, &series, &HashMap::new(), &fallbacks)
        .unwrap();

    let zero = table.get("Zero").unwrap();
    assert!(zero.growth_percent.is_nan());
    assert_eq!(zero.trend_direction, TrendDirection::Up);
    assert_eq!(zero.rank, 3);

    let flat = table.get("Flat").unwrap();
    assert_eq!(flat.trend_direction, TrendDirection::Stable);
    assert_eq!(flat.rank, 1);

    let falling = table.get("Falling").unwrap();
    assert_eq!(falling.trend_direction, TrendDirection::Down);
    assert_eq!(falling.growth_percent, -25.0);
    assert_eq!(falling.rank, 2);
}

#[test]
fn test_volatility_uses_trailing_window() {
    let names = keywords(&["Long", "Short"]);
    let series = series_map(&[
        ("Long", (1..=10).map(f64::from).collect()),
        ("Short", (1..=5).map(f64::from).collect()),
    ]);
    let fallbacks: HashMap<_, _> = [fallback("Long", 11.0), fallback("Short", 6.0)]
        .into_iter()
        .collect();

    let table = ForecastReconciler::default()
        .reconcile(&names, &series, &HashMap::new(), &fallbacks)
        .unwrap();

    // Sample std of 4..=10 and of 1..=5, rounded to 3 places
    assert_eq!(table.get("Long").unwrap().volatility, 2.16);
    assert_eq!(table.get("Short").unwrap().volatility, 1.581);
}

#[test]
fn test_every_keyword_gets_exactly_one_row() {
    let names = keywords(&["Generative AI", "Blockchain", "Quantum Computing", "Edge Computing", "5G"]);
    let series = series_map(&[
        ("Generative AI", vec![1.0, 2.0, 3.0]),
        ("Blockchain", vec![3.0, 2.0, 1.0]),
        ("Quantum Computing", vec![5.0, 5.0, 6.0]),
        ("Edge Computing", vec![2.0, 2.0, 2.0]),
        ("5G", vec![9.0, 8.0, 9.0]),
    ]);
    let end = start() + Duration::days(2);
    let forecasts: HashMap<_, _> = [
        ("Blockchain".to_string(), model_forecast("Blockchain", end, 0.5)),
        ("5G".to_string(), model_forecast("5G", end, 9.5)),
    ]
    .into_iter()
    .collect();

    let table = ForecastReconciler::default()
        .reconcile_with_fallback(&names, &series, &forecasts, &FallbackEstimator::default())
        .unwrap();

    assert_eq!(table.len(), names.len());
    for keyword in &names {
        assert!(table.get(keyword).is_some());
    }
    let generative = table.get("Generative AI").unwrap();
    assert_eq!(generative.source, ForecastSource::Fallback);
    assert_eq!(generative.forecast_value, 4.0);
    assert_eq!(table.get("5G").unwrap().source, ForecastSource::Model);

    let ranks: Vec<usize> = table.rows().iter().map(|r| r.rank).collect();
    let mut sorted = ranks.clone();
    sorted.sort();
    assert_eq!(ranks, sorted);
}

#[test]
fn test_keyword_without_any_forecast_fails() {
    let names = keywords(&["5G", "Blockchain"]);
    let series = series_map(&[("5G", vec![1.0]), ("Blockchain", vec![2.0])]);
    let fallbacks: HashMap<_, _> = [fallback("5G", 2.0)].into_iter().collect();

    let err = ForecastReconciler::default()
        .reconcile(&names, &series, &HashMap::new(), &fallbacks)
        .unwrap_err();

    match err {
        ForecastError::NoForecastAvailable { keyword } => assert_eq!(keyword, "Blockchain"),
        other => panic!("Expected NoForecastAvailable, got {other:?}"),
    }
}

#[test]
fn test_keyword_without_series_fails() {
    let names = keywords(&["5G"]);
    let fallbacks: HashMap<_, _> = [fallback("5G", 2.0)].into_iter().collect();

    let err = ForecastReconciler::default()
        .reconcile(&names, &HashMap::new(), &HashMap::new(), &fallbacks)
        .unwrap_err();

    assert!(matches!(err, ForecastError::EmptySeries { .. }));
}

#[test]
fn test_values_are_rounded_to_three_places() {
    let names = keywords(&["5G"]);
    let series = series_map(&[("5G", vec![3.0])]);
    let fallbacks: HashMap<_, _> = [fallback("5G", 3.123456)].into_iter().collect();

    let table = ForecastReconciler::default()
        .reconcile(&names, &series, &HashMap::new(), &fallbacks)
        .unwrap();
    let row = table.get("5G").unwrap();

    assert_eq!(row.forecast_value, 3.123);
    assert_eq!(row.growth_percent, 4.115);
    assert!(row.volatility.is_nan());
}

#[test]
fn test_zero_volatility_window_is_rejected() {
    assert!(ForecastReconciler::new(0).is_err());
}
