//! `sqlexec backoff` – print the retry schedule of the effective policy.

use anyhow::{bail, Result};
use sqlexec_core::config::ClientConfig;
use sqlexec_core::retry::{ErrorKind, NoRetryReason, RetryDecision, RetryPolicy};
use std::time::Duration;

/// One planned failure and what the policy does about it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRow {
    pub attempt: u32,
    pub elapsed: Duration,
    pub outcome: Result<Duration, NoRetryReason>,
}

/// Plan `attempts` consecutive retryable failures, each failing instantly.
pub fn schedule(
    policy: &RetryPolicy,
    attempts: u32,
    retry_after: Option<Duration>,
) -> Vec<ScheduleRow> {
    let mut rows = Vec::new();
    let mut elapsed = Duration::ZERO;
    for attempt in 1..=attempts {
        match policy.decide(ErrorKind::Throttled, attempt, elapsed, retry_after) {
            RetryDecision::RetryAfter(delay) => {
                rows.push(ScheduleRow {
                    attempt,
                    elapsed,
                    outcome: Ok(delay),
                });
                elapsed += delay;
            }
            RetryDecision::NoRetry(reason) => {
                rows.push(ScheduleRow {
                    attempt,
                    elapsed,
                    outcome: Err(reason),
                });
                break;
            }
        }
    }
    rows
}

fn print_schedule(rows: &[ScheduleRow]) {
    println!("  {:>7}  {:>10}  {:>9}  {}", "Attempt", "Elapsed(s)", "Delay(s)", "Decision");
    println!("  {}  {}  {}  {}", "-------", "----------", "---------", "--------");
    for r in rows {
        match r.outcome {
            Ok(delay) => println!(
                "  {:>7}  {:>10.3}  {:>9.3}  retry",
                r.attempt,
                r.elapsed.as_secs_f64(),
                delay.as_secs_f64()
            ),
            Err(reason) => println!(
                "  {:>7}  {:>10.3}  {:>9}  stop ({})",
                r.attempt,
                r.elapsed.as_secs_f64(),
                "-",
                reason
            ),
        }
    }
}

/// `--retry-after` seconds as a duration; rejects negative, NaN and overflowing values.
fn retry_after_arg(secs: Option<f64>) -> Result<Option<Duration>> {
    match secs.map(Duration::try_from_secs_f64) {
        None => Ok(None),
        Some(Ok(d)) => Ok(Some(d)),
        Some(Err(_)) => bail!("--retry-after must be a non-negative number of seconds in range"),
    }
}

pub fn run_backoff(
    cfg: &ClientConfig,
    attempts: Option<u32>,
    retry_after: Option<f64>,
    no_jitter: bool,
) -> Result<()> {
    let mut policy = cfg.retry_policy();
    if no_jitter {
        policy.jitter = false;
    }
    let retry_after = retry_after_arg(retry_after)?;
    let rows = schedule(&policy, attempts.unwrap_or(policy.max_attempts), retry_after);
    print_schedule(&rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            max_duration: Duration::from_secs(900),
            delay_min: Duration::from_secs(1),
            delay_max: Duration::from_secs(60),
            delay_default: Duration::from_secs(5),
            jitter: false,
        }
    }

    #[test]
    fn schedule_doubles_then_runs_out_of_attempts() {
        let rows = schedule(&policy(), 10, None);
        let outcomes: Vec<_> = rows.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                Ok(Duration::from_secs(5)),
                Ok(Duration::from_secs(10)),
                Ok(Duration::from_secs(20)),
                Err(NoRetryReason::OutOfAttempts),
            ]
        );
        assert_eq!(rows[3].elapsed, Duration::from_secs(35));
    }

    #[test]
    fn schedule_stops_on_time_budget() {
        let mut p = policy();
        p.max_attempts = 30;
        p.max_duration = Duration::from_secs(12);
        let rows = schedule(&p, 30, Some(Duration::from_secs(5)));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].outcome, Err(NoRetryReason::OutOfTime));
    }

    #[test]
    fn schedule_shorter_than_budget() {
        let rows = schedule(&policy(), 2, None);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.outcome.is_ok()));
    }

    #[test]
    fn retry_after_arg_rejects_unrepresentable_values() {
        assert_eq!(retry_after_arg(None).unwrap(), None);
        assert_eq!(
            retry_after_arg(Some(2.5)).unwrap(),
            Some(Duration::from_millis(2500))
        );
        assert!(retry_after_arg(Some(-1.0)).is_err());
        assert!(retry_after_arg(Some(f64::NAN)).is_err());
        assert!(retry_after_arg(Some(1e20)).is_err());
        assert!(run_backoff(&ClientConfig::default(), Some(2), Some(1e20), true).is_err());
    }
}
