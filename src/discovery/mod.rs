//! Service registration with lease keepalive
//!
//! A [`Publisher`] announces "this service is alive at this address" by
//! putting a `(key, value)` pair into etcd under a time-bounded lease and
//! renewing the lease from a background task. A crash removes the entry
//! within one TTL; a graceful [`Registration::stop`] removes it immediately.

pub mod etcd;
pub mod lease;
pub mod publisher;

pub use etcd::EtcdLeaseStore;
pub use lease::{LeaseId, LeaseStore};
pub use publisher::{Publisher, Registration, RegistrationState};
