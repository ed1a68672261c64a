//! License verification state machine.
//!
//! Readers get the cached record synchronously. [`LicenseManager::ensure_fresh`]
//! is the only writer: it skips the network while a `valid` status is inside
//! the TTL, otherwise verifies through the [`LicenseAuthority`] and falls back
//! to time-based degradation when the authority cannot be reached.

use crate::authority::LicenseAuthority;
use crate::clock::Clock;
use crate::error::LicenseResult;
use crate::policy::LicensePolicy;
use crate::record::{LicenseRecord, LICENSE_RECORD_KEY};
use crate::status::LicenseStatus;
use layernexus_auth::CredentialStore;
use layernexus_storage::{KeyValueStore, KeyValueStoreExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// What a call to [`LicenseManager::ensure_fresh`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckKind {
    /// No credential stored, nothing to verify.
    NoCredential,
    /// Cached `valid` status is inside the TTL.
    Fresh,
    /// The authority answered.
    Verified,
    /// The authority could not be reached or answered with an error.
    Degraded { cause: String },
}

/// Result of a check together with the record it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub kind: CheckKind,
    pub record: LicenseRecord,
    /// True if this caller joined a check that was already in flight.
    pub coalesced: bool,
}

/// Owns the cached [`LicenseRecord`] and keeps it fresh.
pub struct LicenseManager {
    store: Arc<dyn KeyValueStore>,
    credentials: CredentialStore,
    authority: Arc<dyn LicenseAuthority>,
    clock: Arc<dyn Clock>,
    policy: LicensePolicy,
    record: RwLock<LicenseRecord>,
    /// Single-flight guard holding the last completed outcome.
    flight: Mutex<Option<CheckOutcome>>,
    completed: AtomicU64,
}

impl LicenseManager {
    /// Creates a manager and loads the persisted record from `store`.
    ///
    /// The credential is looked up in the same store.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        authority: Arc<dyn LicenseAuthority>,
        clock: Arc<dyn Clock>,
        policy: LicensePolicy,
    ) -> LicenseResult<Self> {
        policy.validate()?;
        let record = load_record(store.as_ref());
        debug!(status = %record.status, "Loaded license record");

        Ok(Self {
            credentials: CredentialStore::new(Arc::clone(&store)),
            store,
            authority,
            clock,
            policy,
            record: RwLock::new(record),
            flight: Mutex::new(None),
            completed: AtomicU64::new(0),
        })
    }

    pub fn policy(&self) -> &LicensePolicy {
        &self.policy
    }

    /// Snapshot of the cached record. Never touches the network.
    pub fn record(&self) -> LicenseRecord {
        self.read().clone()
    }

    /// Cached status. Never touches the network.
    pub fn status(&self) -> LicenseStatus {
        self.read().status
    }

    /// True only while the cached status is `valid`.
    pub fn is_entitled(&self) -> bool {
        self.status().is_entitled()
    }

    /// Makes sure the cached status is fresh, verifying remotely if needed.
    ///
    /// Concurrent callers share one verification. Pipeline failures are
    /// absorbed into `unknown`/`expired-offline`; only storage failures are
    /// returned as errors.
    pub async fn ensure_fresh(&self) -> LicenseResult<CheckOutcome> {
        let observed = self.completed.load(Ordering::Acquire);
        let mut flight = self.flight.lock().await;

        if self.completed.load(Ordering::Acquire) != observed {
            if let Some(outcome) = flight.as_ref() {
                debug!("Joining license check completed while waiting");
                return Ok(CheckOutcome {
                    coalesced: true,
                    ..outcome.clone()
                });
            }
        }

        let outcome = self.run_check().await?;
        *flight = Some(outcome.clone());
        self.completed.fetch_add(1, Ordering::AcqRel);
        Ok(outcome)
    }

    async fn run_check(&self) -> LicenseResult<CheckOutcome> {
        if !self.credentials.is_present()? {
            debug!("No credential stored, skipping license check");
            return Ok(self.outcome(CheckKind::NoCredential));
        }

        let now = self.clock.now();
        if self.read().is_fresh(now, &self.policy) {
            debug!("License verified within TTL, skipping check");
            return Ok(self.outcome(CheckKind::Fresh));
        }

        let result = self.authority.verify().await;

        let now = self.clock.now();
        let mut record = self.write();
        let previous = record.status;
        let mut next = record.clone();

        let kind = match result {
            Ok(verification) => {
                next.apply_verification(&verification, now);
                CheckKind::Verified
            }
            Err(e) => {
                warn!("License check failed: {e}");
                next.apply_failure(now, &self.policy);
                CheckKind::Degraded {
                    cause: e.to_string(),
                }
            }
        };

        self.store.set_json(LICENSE_RECORD_KEY, &next)?;
        *record = next.clone();
        drop(record);

        if previous != next.status {
            info!(from = %previous, to = %next.status, "License status changed");
        }

        Ok(CheckOutcome {
            kind,
            record: next,
            coalesced: false,
        })
    }

    /// Runs [`ensure_fresh`](Self::ensure_fresh) in the background.
    pub fn spawn_check(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = manager.ensure_fresh().await {
                error!("License check could not be recorded: {e}");
            }
        })
    }

    /// Runs [`ensure_fresh`](Self::ensure_fresh) now and then every `every`.
    pub fn spawn_periodic(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                if let Err(e) = manager.ensure_fresh().await {
                    error!("License check could not be recorded: {e}");
                }
            }
        })
    }

    fn outcome(&self, kind: CheckKind) -> CheckOutcome {
        CheckOutcome {
            kind,
            record: self.record(),
            coalesced: false,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, LicenseRecord> {
        self.record.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, LicenseRecord> {
        self.record.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn load_record(store: &dyn KeyValueStore) -> LicenseRecord {
    match store.get_json::<LicenseRecord>(LICENSE_RECORD_KEY) {
        Ok(Some(record)) => record,
        Ok(None) => LicenseRecord::default(),
        Err(e) => {
            warn!("Discarding unreadable license record: {e}");
            LicenseRecord::default()
        }
    }
}
