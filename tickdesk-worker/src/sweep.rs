/// Deadline-expiry sweep for tickets
///
/// This module implements the periodic background sweep that transitions
/// overdue tickets. Each cycle queries for tickets that are still `pending`
/// with a deadline in the past and marks them `missed`, one row at a time.
/// A persistence failure on one ticket is logged and does not abort the
/// cycle; remaining tickets are still processed.
///
/// The sweep runs on its own timer, entirely outside the request-handling
/// path, and holds no state across cycles beyond the fixed period.
/// [`sweep_once`] takes the cycle's `now` as an argument, so sweep behavior
/// is testable without real wall-clock delays.
///
/// # Example
///
/// ```no_run
/// use tickdesk_worker::sweep::{ExpirySweeper, SweeperConfig};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> anyhow::Result<()> {
/// let sweeper = ExpirySweeper::new(pool, SweeperConfig::default());
/// let shutdown = sweeper.shutdown_token();
///
/// // Runs until the token is cancelled
/// sweeper.run().await;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use tickdesk_shared::models::ticket::Ticket;

/// Default sweep period (60 seconds)
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Minimum allowed sweep period (1 second)
pub const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Maximum allowed sweep period (1 hour)
pub const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(3600);

/// Sweeper configuration
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Fixed period between sweep cycles
    pub period: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_SWEEP_PERIOD,
        }
    }
}

impl SweeperConfig {
    /// Creates a config from a period in seconds, clamped to the valid range
    ///
    /// None means the default 60-second period.
    pub fn from_period_secs(period_secs: Option<u64>) -> Self {
        let period = match period_secs {
            Some(secs) => {
                let duration = Duration::from_secs(secs);
                duration.clamp(MIN_SWEEP_PERIOD, MAX_SWEEP_PERIOD)
            }
            None => DEFAULT_SWEEP_PERIOD,
        };

        Self { period }
    }
}

/// Outcome of a single sweep cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Overdue pending tickets found by the cycle's query
    pub examined: usize,

    /// Tickets actually transitioned to `missed`
    pub missed: usize,

    /// Tickets whose update failed (logged and skipped)
    pub failed: usize,
}

/// Periodic deadline-expiry sweeper
///
/// Owns a pool handle and a fixed period; everything else is per-cycle.
pub struct ExpirySweeper {
    pool: PgPool,
    config: SweeperConfig,
    shutdown_token: CancellationToken,
}

impl ExpirySweeper {
    /// Creates a new sweeper
    pub fn new(pool: PgPool, config: SweeperConfig) -> Self {
        Self {
            pool,
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Gets the shutdown token
    ///
    /// Used to signal graceful shutdown from external handlers.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Gets the configured period
    pub fn period(&self) -> Duration {
        self.config.period
    }

    /// Runs sweep cycles until shutdown is requested
    ///
    /// A failing cycle (for example, the database briefly unreachable) is
    /// logged and the loop keeps going; the sweeper runs for the lifetime
    /// of the process.
    pub async fn run(&self) {
        tracing::info!(
            period_secs = self.config.period.as_secs(),
            "Expiry sweeper starting"
        );

        loop {
            if self.shutdown_token.is_cancelled() {
                tracing::info!("Shutdown requested, expiry sweeper stopping");
                break;
            }

            match sweep_once(&self.pool, Utc::now()).await {
                Ok(outcome) if outcome.examined > 0 => {
                    tracing::info!(
                        examined = outcome.examined,
                        missed = outcome.missed,
                        failed = outcome.failed,
                        "Sweep cycle completed"
                    );
                }
                Ok(_) => {
                    tracing::debug!("Sweep cycle completed, nothing overdue");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Sweep cycle failed");
                }
            }

            tokio::select! {
                _ = sleep(self.config.period) => {}
                _ = self.shutdown_token.cancelled() => {}
            }
        }
    }
}

/// Performs one sweep cycle at the given instant
///
/// Queries for pending tickets with `deadline < now` and marks each one
/// `missed` individually — not as a single transaction — so one bad row
/// cannot hold up the rest. The update re-checks status and deadline, so a
/// ticket edited between query and write is simply skipped.
///
/// # Errors
///
/// Returns an error only if the initial query fails; per-ticket update
/// failures are counted in the outcome instead.
pub async fn sweep_once(pool: &PgPool, now: DateTime<Utc>) -> Result<SweepOutcome, sqlx::Error> {
    let overdue = Ticket::find_overdue_pending(pool, now).await?;

    let mut outcome = SweepOutcome {
        examined: overdue.len(),
        ..Default::default()
    };

    for ticket in &overdue {
        match Ticket::mark_missed(pool, ticket.id, now).await {
            Ok(true) => {
                tracing::info!(ticket_id = %ticket.id, deadline = %ticket.deadline, "Ticket missed its deadline");
                outcome.missed += 1;
            }
            Ok(false) => {
                // Edited out from under us between query and write
                tracing::debug!(ticket_id = %ticket.id, "Ticket no longer eligible, skipping");
            }
            Err(e) => {
                tracing::error!(ticket_id = %ticket.id, error = %e, "Failed to mark ticket missed");
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_period() {
        let config = SweeperConfig::default();
        assert_eq!(config.period, DEFAULT_SWEEP_PERIOD);
    }

    #[test]
    fn test_from_period_secs_default() {
        let config = SweeperConfig::from_period_secs(None);
        assert_eq!(config.period, Duration::from_secs(60));
    }

    #[test]
    fn test_from_period_secs_valid() {
        let config = SweeperConfig::from_period_secs(Some(120));
        assert_eq!(config.period, Duration::from_secs(120));
    }

    #[test]
    fn test_from_period_secs_clamped() {
        assert_eq!(
            SweeperConfig::from_period_secs(Some(0)).period,
            MIN_SWEEP_PERIOD
        );
        assert_eq!(
            SweeperConfig::from_period_secs(Some(100_000)).period,
            MAX_SWEEP_PERIOD
        );
    }

    #[test]
    fn test_sweep_outcome_default() {
        let outcome = SweepOutcome::default();
        assert_eq!(outcome.examined, 0);
        assert_eq!(outcome.missed, 0);
        assert_eq!(outcome.failed, 0);
    }

    // sweep_once is exercised against a real database in the integration
    // tests in tickdesk-api/tests.
}
