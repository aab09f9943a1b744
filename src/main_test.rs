use super::*;

#[test]
fn countdown_rejects_zero_period() {
    let err = Cli::try_parse_from(["nftstake", "countdown", "0", "0", "5", "--period-secs", "0"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn countdown_accepts_positive_period() {
    let cli = Cli::try_parse_from(["nftstake", "countdown", "0", "0", "5", "--period-secs", "2", "--ticks", "0"]).unwrap();
    let Command::Countdown(args) = cli.command else {
        panic!("expected countdown command");
    };
    assert_eq!(args.period_secs, Some(2));
    assert_eq!(args.ticks, Some(0));
}

#[tokio::test(start_paused = true)]
async fn follow_countdown_zero_ticks_returns_without_waiting() {
    let timer = CountdownTimer::start(Countdown::new(0, 0, 5), Duration::from_secs(60));
    let started = tokio::time::Instant::now();
    follow_countdown(timer, Some(0)).await;
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn follow_countdown_stops_after_tick_limit() {
    let timer = CountdownTimer::start(Countdown::new(0, 0, 5), Duration::from_secs(60));
    let started = tokio::time::Instant::now();
    follow_countdown(timer, Some(2)).await;
    assert_eq!(started.elapsed(), Duration::from_secs(120));
}
