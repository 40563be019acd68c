//! Abortable soil lookups keyed by the requested symbol set.
//!
//! A lookup is issued at most once per distinct `(area, symbols)` key. Asking
//! for a different key aborts the task in flight and bumps the generation;
//! outcomes carry the generation they were started under, so a caller can
//! drop anything that [`LookupScheduler::is_current`] rejects.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::SoilError;
use crate::query::normalize_symbols;
use crate::{HsgSource, SoilRecord};

/// What [`LookupScheduler::request`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// A new task was spawned under this generation.
    Started { generation: u64 },
    /// The same symbol set was already requested; nothing was spawned.
    AlreadyRequested,
    /// No area symbol or no symbols; nothing to look up.
    Nothing,
}

/// A finished lookup and the generation it belongs to.
#[derive(Debug)]
pub struct LookupOutcome {
    pub generation: u64,
    pub result: Result<Vec<SoilRecord>, SoilError>,
}

struct InFlight {
    generation: u64,
    handle: JoinHandle<Result<Vec<SoilRecord>, SoilError>>,
}

pub struct LookupScheduler<S> {
    source: Arc<S>,
    generation: u64,
    last_key: Option<String>,
    in_flight: Option<InFlight>,
}

fn request_key(area_symbol: &str, symbols: &[String]) -> String {
    let mut sorted = symbols.to_vec();
    sorted.sort_unstable();
    format!("{}|{}", area_symbol.trim().to_uppercase(), sorted.join(","))
}

impl<S: HsgSource> LookupScheduler<S> {
    pub fn new(source: S) -> Self {
        Self::from_arc(Arc::new(source))
    }

    pub const fn from_arc(source: Arc<S>) -> Self {
        Self {
            source,
            generation: 0,
            last_key: None,
            in_flight: None,
        }
    }

    /// Generation of the most recently started lookup (0 before any).
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a lookup unless this symbol set was already requested.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request(&mut self, area_symbol: &str, symbols: &[String]) -> RequestStatus {
        let symbols = normalize_symbols(symbols);
        if area_symbol.trim().is_empty() || symbols.is_empty() {
            return RequestStatus::Nothing;
        }
        let key = request_key(area_symbol, &symbols);
        if self.last_key.as_deref() == Some(key.as_str()) {
            tracing::debug!(key, "soil lookup already requested");
            return RequestStatus::AlreadyRequested;
        }

        if let Some(stale) = self.in_flight.take() {
            tracing::debug!(generation = stale.generation, "aborting superseded soil lookup");
            stale.handle.abort();
        }

        self.generation += 1;
        self.last_key = Some(key);
        let source = Arc::clone(&self.source);
        let area_symbol = area_symbol.trim().to_string();
        let handle = tokio::spawn(async move { source.lookup(&area_symbol, &symbols).await });
        self.in_flight = Some(InFlight {
            generation: self.generation,
            handle,
        });
        RequestStatus::Started {
            generation: self.generation,
        }
    }

    /// Wait for the lookup in flight, if any.
    ///
    /// An aborted or panicked task comes back as [`SoilError::Task`].
    pub async fn finish(&mut self) -> Option<LookupOutcome> {
        let InFlight { generation, handle } = self.in_flight.take()?;
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(SoilError::Task(e.to_string())),
        };
        Some(LookupOutcome { generation, result })
    }

    /// Forget the last key so the same symbol set can be requested again,
    /// e.g. after a failed lookup.
    pub fn forget(&mut self) {
        self.last_key = None;
    }
}

impl<S> Drop for LookupScheduler<S> {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl HsgSource for Counting {
        async fn lookup(
            &self,
            _area_symbol: &str,
            symbols: &[String],
        ) -> Result<Vec<SoilRecord>, SoilError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(symbols
                .iter()
                .map(|s| SoilRecord {
                    musym: s.clone(),
                    muname: String::new(),
                    hsg: "B".to_string(),
                })
                .collect())
        }
    }

    /// Parks single-symbol lookups forever and counts how many were dropped.
    #[derive(Default)]
    struct Gated {
        dropped: Arc<AtomicUsize>,
    }

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl HsgSource for Gated {
        async fn lookup(
            &self,
            _area_symbol: &str,
            symbols: &[String],
        ) -> Result<Vec<SoilRecord>, SoilError> {
            if symbols.len() == 1 {
                let _counter = DropCounter(Arc::clone(&self.dropped));
                std::future::pending::<()>().await;
            }
            Ok(Vec::new())
        }
    }

    fn syms(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn same_symbol_set_is_looked_up_once() {
        let source = Arc::new(Counting::default());
        let mut scheduler = LookupScheduler::from_arc(Arc::clone(&source));

        assert_eq!(
            scheduler.request("NY103", &syms(&["WsB", "PaA"])),
            RequestStatus::Started { generation: 1 }
        );
        let outcome = scheduler.finish().await.expect("outcome");
        assert!(scheduler.is_current(outcome.generation));
        assert_eq!(outcome.result.expect("records").len(), 2);

        // Order and case do not make a new key.
        assert_eq!(
            scheduler.request("ny103", &syms(&["PAA", "wsb"])),
            RequestStatus::AlreadyRequested
        );
        assert!(scheduler.finish().await.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        scheduler.forget();
        assert_eq!(
            scheduler.request("NY103", &syms(&["WsB", "PaA"])),
            RequestStatus::Started { generation: 2 }
        );
    }

    #[tokio::test]
    async fn superseded_lookup_is_aborted() {
        let source = Gated::default();
        let dropped = Arc::clone(&source.dropped);
        let mut scheduler = LookupScheduler::new(source);

        assert_eq!(
            scheduler.request("NY103", &syms(&["WsB"])),
            RequestStatus::Started { generation: 1 }
        );
        // Let the first lookup start and park.
        tokio::task::yield_now().await;
        assert_eq!(
            scheduler.request("NY103", &syms(&["WsB", "HnB"])),
            RequestStatus::Started { generation: 2 }
        );
        assert!(!scheduler.is_current(1));

        let outcome = scheduler.finish().await.expect("outcome");
        assert_eq!(outcome.generation, 2);
        assert!(outcome.result.is_ok());
        for _ in 0..10 {
            if dropped.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_requests_do_nothing() {
        let mut scheduler = LookupScheduler::new(Counting::default());
        assert_eq!(scheduler.request("NY103", &[]), RequestStatus::Nothing);
        assert_eq!(scheduler.request(" ", &syms(&["WsB"])), RequestStatus::Nothing);
        assert_eq!(scheduler.generation(), 0);
        assert!(!scheduler.is_pending());
    }
}
