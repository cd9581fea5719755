use super::Rate;
use std::time::Duration;

#[test]
fn test_rate_per_second() {
    let rate = Rate::per_second(10);
    assert_eq!(rate.period(), Duration::from_millis(100));

    let rate = Rate::per_second(1);
    assert_eq!(rate.period(), Duration::from_secs(1));
}

#[test]
fn test_rate_per_minute() {
    let rate = Rate::per_minute(60);
    assert_eq!(rate.period(), Duration::from_secs(1));

    let rate = Rate::per_minute(1);
    assert_eq!(rate.period(), Duration::from_secs(60));
}

#[test]
fn test_rate_per_hour() {
    let rate = Rate::per_hour(3600);
    assert_eq!(rate.period(), Duration::from_secs(1));
}

#[test]
fn test_rate_from_count_and_period() {
    let rate = Rate::from_count_and_period(100, Duration::from_secs(60)).unwrap();
    assert_eq!(rate.period(), Duration::from_millis(600));

    let rate = Rate::from_count_and_period(4, Duration::from_secs(1)).unwrap();
    assert_eq!(rate.period(), Duration::from_millis(250));
}

#[test]
fn test_rate_rejects_zero_parameters() {
    assert_eq!(Rate::from_count_and_period(0, Duration::from_secs(60)), None);
    assert_eq!(Rate::from_count_and_period(10, Duration::ZERO), None);
}

#[test]
fn test_custom_rate() {
    let rate = Rate::new(Duration::from_millis(2500));
    assert_eq!(rate.period(), Duration::from_millis(2500));
}
