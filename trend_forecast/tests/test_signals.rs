use approx::assert_relative_eq;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use trend_forecast::config::PipelineConfig;
use trend_forecast::data::NormalizedSeries;
use trend_forecast::signals::{
    trend_strength_score, trend_strengths, yearly_average_interest, yearly_ranking,
    AuxiliarySignals, YearlyAverage,
};
use trend_forecast::synthetic::{month_ends, placeholder_series, PLACEHOLDER_MONTHS};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn series(keyword: &str, start: NaiveDate, values: &[f64]) -> NormalizedSeries {
    NormalizedSeries::new(keyword, start, values.to_vec()).unwrap()
}

#[test]
fn test_trend_strength_of_flat_series() {
    assert_relative_eq!(trend_strength_score(&[4.0; 30]), 50.0);
}

#[test]
fn test_trend_strength_of_short_series_ignores_slope() {
    // std of [1, 2, 3] is 1, so stability is 0.5
    assert_relative_eq!(trend_strength_score(&[1.0, 2.0, 3.0]), 25.0);
}

#[test]
fn test_trend_strength_of_rising_line() {
    let values: Vec<f64> = (0..20).map(|i| i as f64).collect();
    // slope 1, every 14-day window has std sqrt(17.5)
    assert_relative_eq!(trend_strength_score(&values), 19.65, epsilon = 1e-9);
}

#[test]
fn test_trend_strengths_keep_input_order() {
    let all = [
        series("Beta", date(2024, 1, 1), &[1.0, 2.0, 3.0]),
        series("Alpha", date(2024, 1, 1), &[4.0; 10]),
    ];
    let scores = trend_strengths(&all);

    assert_eq!(scores[0].keyword, "Beta");
    assert_eq!(scores[1].keyword, "Alpha");
}

#[test]
fn test_yearly_ranking_and_average() {
    let all = [
        series("A", date(2023, 12, 30), &[1.0, 3.0, 10.0, 20.0]),
        series("B", date(2023, 12, 31), &[5.0, 5.0]),
    ];
    let ranking = yearly_ranking(&all);

    let expected = vec![
        YearlyAverage { year: 2023, keyword: "B".to_string(), average: 5.0 },
        YearlyAverage { year: 2023, keyword: "A".to_string(), average: 2.0 },
        YearlyAverage { year: 2024, keyword: "A".to_string(), average: 15.0 },
        YearlyAverage { year: 2024, keyword: "B".to_string(), average: 5.0 },
    ];
    assert_eq!(ranking, expected);

    let averages = yearly_average_interest(&ranking);
    assert_relative_eq!(averages["A"], 8.5);
    assert_relative_eq!(averages["B"], 5.0);
}

#[test]
fn test_auxiliary_signals_only_label_configured_keywords() {
    let config = PipelineConfig {
        keywords: vec!["5G".to_string(), "Mystery".to_string()],
        ..PipelineConfig::default()
    };
    let all = [
        series("5G", date(2024, 1, 1), &[1.0, 2.0]),
        series("Mystery", date(2024, 1, 1), &[3.0, 3.0]),
    ];
    let signals = AuxiliarySignals::compute(&all, &config);

    assert_eq!(signals.sentiment.get("5G").map(String::as_str), Some("Positive"));
    assert!(!signals.sentiment.contains_key("Mystery"));
    assert_eq!(signals.trend_strength.len(), 2);

    let rows = signals.sentiment_rows(&config.keywords);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "Positive");
}

#[test]
fn test_month_ends() {
    assert_eq!(
        month_ends(date(2024, 1, 29), 3),
        vec![date(2023, 10, 31), date(2023, 11, 30), date(2023, 12, 31)]
    );
    assert_eq!(
        month_ends(date(2024, 2, 29), 2),
        vec![date(2024, 1, 31), date(2024, 2, 29)]
    );
}

#[test]
fn test_placeholder_series_is_seeded() {
    let first = placeholder_series("Gamma", date(2024, 6, 15), 7).unwrap();
    let second = placeholder_series("Gamma", date(2024, 6, 15), 7).unwrap();
    let other = placeholder_series("Gamma", date(2024, 6, 15), 8).unwrap();

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(first.len(), PLACEHOLDER_MONTHS);
    assert_eq!(first.latest_date(), Some(date(2024, 5, 31)));
}
