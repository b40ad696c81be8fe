//! Publisher: register a service value and keep its lease alive

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::common::{DiscoveryConfig, Error, Result};
use crate::discovery::etcd::EtcdLeaseStore;
use crate::discovery::lease::{LeaseId, LeaseStore};

/// Registration lifecycle.
///
/// `Registered → Deregistered` on a voluntary stop, `Registered → Lost`
/// when renewal retries exhaust the TTL window. Both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Registered,
    Deregistered,
    Lost,
}

/// Publishes one `(key, value)` entry under a lease.
pub struct Publisher {
    store: Arc<dyn LeaseStore>,
    lease_ttl: Duration,
    renew_interval: Duration,
}

impl Publisher {
    /// Connect to etcd using the given discovery config.
    pub async fn connect(cfg: &DiscoveryConfig) -> Result<Self> {
        cfg.validate()?;
        let store = EtcdLeaseStore::connect(&cfg.endpoints).await?;
        Ok(Self::with_store(
            Arc::new(store),
            cfg.lease_ttl(),
            cfg.renew_interval(),
        ))
    }

    /// Build a publisher on any lease store. The renewal period must be
    /// strictly shorter than the TTL; `connect` enforces that via config
    /// validation, direct callers are trusted.
    pub fn with_store(
        store: Arc<dyn LeaseStore>,
        lease_ttl: Duration,
        renew_interval: Duration,
    ) -> Self {
        Self {
            store,
            lease_ttl,
            renew_interval,
        }
    }

    /// Grant a lease, publish `value` under `key`, and spawn the renewal
    /// task. Errors before the task starts surface here synchronously.
    pub async fn register(&self, key: &str, value: &str) -> Result<Registration> {
        let lease = self.store.grant(self.lease_ttl).await?;
        // One entry per instance: suffix the namespace key with the lease id.
        let entry_key = format!("{}/{}", key, lease);
        self.store
            .put_under_lease(&entry_key, value, lease)
            .await?;

        tracing::info!(
            key = %entry_key,
            value = %value,
            lease,
            ttl_secs = self.lease_ttl.as_secs(),
            "service registered"
        );

        let (state_tx, state_rx) = watch::channel(RegistrationState::Registered);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(renewal_loop(
            self.store.clone(),
            entry_key.clone(),
            lease,
            self.lease_ttl,
            self.renew_interval,
            state_tx,
            shutdown_rx,
        ));

        Ok(Registration {
            store: self.store.clone(),
            key: entry_key,
            lease,
            state: state_rx,
            shutdown: shutdown_tx,
            task: Mutex::new(Some(task)),
        })
    }
}

/// A live registration: the lease handle plus its renewal task.
///
/// Owned by exactly one publisher call; dropping it without `stop` leaves
/// the entry to expire with the TTL.
pub struct Registration {
    store: Arc<dyn LeaseStore>,
    key: String,
    lease: LeaseId,
    state: watch::Receiver<RegistrationState>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Registration {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn lease_id(&self) -> LeaseId {
        self.lease
    }

    pub fn state(&self) -> RegistrationState {
        *self.state.borrow()
    }

    /// Wait until the registration reaches a terminal state.
    ///
    /// Returns `Ok(())` after a voluntary stop and `Err(LeaseLost)` when
    /// the lease expired before a renewal landed; the caller is expected
    /// to re-register in that case.
    pub async fn wait(&self) -> Result<()> {
        let mut state = self.state.clone();
        loop {
            match *state.borrow_and_update() {
                RegistrationState::Lost => {
                    return Err(Error::LeaseLost {
                        key: self.key.clone(),
                        reason: "renewal retries exhausted the TTL window".to_string(),
                    })
                }
                RegistrationState::Deregistered => return Ok(()),
                RegistrationState::Registered => {}
            }
            if state.changed().await.is_err() {
                // Renewal task gone without a terminal state; treat as stopped.
                return Ok(());
            }
        }
    }

    /// Voluntary deregistration: cancel the renewal task and revoke the
    /// lease best-effort so the entry disappears immediately. Safe to call
    /// more than once.
    pub async fn stop(&self) -> Result<()> {
        let handle = {
            let mut slot = self.task.lock().unwrap_or_else(PoisonError::into_inner);
            slot.take()
        };
        let Some(handle) = handle else {
            return Ok(()); // already stopped
        };

        let _ = self.shutdown.send(true);
        let _ = handle.await;

        if self.state() == RegistrationState::Lost {
            // Nothing left to revoke.
            return Ok(());
        }

        if let Err(e) = self.store.revoke(self.lease).await {
            tracing::warn!(
                key = %self.key,
                lease = self.lease,
                error = %e,
                "lease revoke failed; entry will expire with the TTL"
            );
        } else {
            tracing::info!(key = %self.key, lease = self.lease, "service deregistered");
        }
        Ok(())
    }
}

/// Renew the lease once per period until stopped or the TTL window closes.
///
/// Transient renewal failures are retried on the next tick; the lease is
/// only declared lost once no renewal has landed for a full TTL.
async fn renewal_loop(
    store: Arc<dyn LeaseStore>,
    key: String,
    lease: LeaseId,
    lease_ttl: Duration,
    renew_interval: Duration,
    state: watch::Sender<RegistrationState>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval_at(Instant::now() + renew_interval, renew_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_renewed = Instant::now();

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                let _ = state.send(RegistrationState::Deregistered);
                return;
            }
            _ = ticker.tick() => {
                // A half-open connection must not stall the loop past the
                // TTL window; a renewal that cannot land within one period
                // counts as a failed attempt.
                let renewal = match time::timeout(renew_interval, store.keep_alive(lease)).await {
                    Ok(res) => res,
                    Err(_) => Err(Error::Timeout("lease renewal".to_string())),
                };
                match renewal {
                    Ok(()) => {
                        last_renewed = Instant::now();
                        tracing::debug!(key = %key, lease, "lease renewed");
                    }
                    Err(Error::LeaseLost { reason, .. }) => {
                        tracing::error!(key = %key, lease, %reason, "registration lost");
                        let _ = state.send(RegistrationState::Lost);
                        return;
                    }
                    Err(e) => {
                        let stale_for = last_renewed.elapsed();
                        if stale_for >= lease_ttl {
                            tracing::error!(
                                key = %key,
                                lease,
                                stale_secs = stale_for.as_secs(),
                                error = %e,
                                "registration lost: no renewal landed within the TTL"
                            );
                            let _ = state.send(RegistrationState::Lost);
                            return;
                        }
                        tracing::warn!(
                            key = %key,
                            lease,
                            stale_secs = stale_for.as_secs(),
                            error = %e,
                            "lease renewal failed; retrying next tick"
                        );
                    }
                }
            }
        }
    }
}
