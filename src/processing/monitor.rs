use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Counters for a running document processor. Shared freely between threads.
#[derive(Debug, Default)]
pub struct ProcessingMonitor {
    running: AtomicBool,
    documents: AtomicU64,
    corrections: AtomicU64,
    failures: AtomicU64,
    busy_micros: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonitorSnapshot {
    pub running: bool,
    pub documents: u64,
    pub corrections: u64,
    pub failures: u64,
    pub average_processing_ms: f64,
}

impl ProcessingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if monitoring was already on.
    pub fn start(&self) -> bool {
        let was_running = self.running.swap(true, Ordering::SeqCst);
        if !was_running {
            log::info!("processing monitor started");
        }
        !was_running
    }

    /// Returns false if monitoring was already off.
    pub fn stop(&self) -> bool {
        let was_running = self.running.swap(false, Ordering::SeqCst);
        if was_running {
            log::info!("processing monitor stopped after {} document(s)", self.documents.load(Ordering::Relaxed));
        }
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn record_document(&self, corrections: usize, elapsed: Duration) {
        if !self.is_running() {
            return;
        }
        self.documents.fetch_add(1, Ordering::Relaxed);
        self.corrections.fetch_add(corrections as u64, Ordering::Relaxed);
        self.busy_micros
            .fetch_add(elapsed.as_micros().min(u64::MAX as u128) as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        if self.is_running() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        let documents = self.documents.load(Ordering::Relaxed);
        let busy_micros = self.busy_micros.load(Ordering::Relaxed);
        MonitorSnapshot {
            running: self.is_running(),
            documents,
            corrections: self.corrections.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            average_processing_ms: if documents == 0 {
                0.0
            } else {
                busy_micros as f64 / documents as f64 / 1000.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_start_stop_lifecycle() {
        let monitor = ProcessingMonitor::new();
        assert!(!monitor.is_running());
        assert!(monitor.start());
        assert!(!monitor.start());
        assert!(monitor.is_running());
        assert!(monitor.stop());
        assert!(!monitor.stop());
    }

    #[test]
    fn test_counts_only_while_running() {
        let monitor = ProcessingMonitor::new();
        monitor.record_document(3, Duration::from_millis(2));
        monitor.record_failure();
        assert_eq!(monitor.snapshot().documents, 0);

        monitor.start();
        monitor.record_document(3, Duration::from_millis(2));
        monitor.record_document(1, Duration::from_millis(4));
        monitor.record_failure();
        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.documents, 2);
        assert_eq!(snapshot.corrections, 4);
        assert_eq!(snapshot.failures, 1);
        assert!((snapshot.average_processing_ms - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_shared_between_threads() {
        let monitor = Arc::new(ProcessingMonitor::new());
        monitor.start();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let monitor = Arc::clone(&monitor);
                thread::spawn(move || {
                    for _ in 0..25 {
                        monitor.record_document(1, Duration::ZERO);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(monitor.snapshot().documents, 100);
    }
}
