//! Scriptable in-memory transport for printer tests.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{NOT_CONNECTED, Transport};
use crate::error::ProxyError;

/// What the mock has seen and what it should fail next.
#[derive(Debug, Default)]
pub struct MockState {
    pub open: bool,
    pub open_calls: usize,
    pub close_calls: usize,
    pub write_calls: usize,
    /// Buffers of successful writes, in order
    pub written: Vec<Vec<u8>>,
    /// Fail this many upcoming writes
    pub failing_writes: usize,
    /// Fail exactly these write call indices (0-based)
    pub fail_write_at: Vec<usize>,
    /// Fail this many upcoming opens
    pub failing_opens: usize,
    pub fail_close: bool,
}

/// Cloning shares state, so a test keeps one handle while the printer owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// A mock that starts out open.
    pub fn new() -> Self {
        let mock = Self::default();
        mock.state().open = true;
        mock
    }

    pub fn failing_writes(self, n: usize) -> Self {
        self.state().failing_writes = n;
        self
    }

    pub fn fail_write_at(self, index: usize) -> Self {
        self.state().fail_write_at.push(index);
        self
    }

    pub fn failing_opens(self, n: usize) -> Self {
        self.state().failing_opens = n;
        self
    }

    pub fn failing_close(self) -> Self {
        self.state().fail_close = true;
        self
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn opens(&self) -> usize {
        self.state().open_calls
    }

    pub fn closes(&self) -> usize {
        self.state().close_calls
    }

    pub fn write_calls(&self) -> usize {
        self.state().write_calls
    }

    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state().written.clone()
    }

    pub fn boxed(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }
}

impl Transport for MockTransport {
    fn open(&mut self) -> Result<(), ProxyError> {
        let mut state = self.state();
        state.open_calls += 1;
        if state.failing_opens > 0 {
            state.failing_opens -= 1;
            return Err(ProxyError::Connection("mock open failed".to_string()));
        }
        state.open = true;
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), ProxyError> {
        let mut state = self.state();
        let index = state.write_calls;
        state.write_calls += 1;

        if !state.open {
            return Err(ProxyError::Connection(NOT_CONNECTED.to_string()));
        }
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(ProxyError::Connection("mock write failed".to_string()));
        }
        if state.fail_write_at.contains(&index) {
            return Err(ProxyError::Connection("mock write failed".to_string()));
        }

        state.written.push(data.to_vec());
        Ok(())
    }

    fn close(&mut self) -> Result<(), ProxyError> {
        let mut state = self.state();
        state.close_calls += 1;
        state.open = false;
        if state.fail_close {
            return Err(ProxyError::Connection("mock close failed".to_string()));
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state().open
    }

    fn target(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_after_close_fails() {
        let mut mock = MockTransport::new();
        mock.write_raw(&[1]).unwrap();
        mock.close().unwrap();

        let err = mock.write_raw(&[2]).unwrap_err();
        assert!(err.to_string().contains("No active connection"));

        mock.open().unwrap();
        mock.write_raw(&[3]).unwrap();
        assert_eq!(mock.written(), vec![vec![1], vec![3]]);
        assert_eq!(mock.write_calls(), 3);
    }

    #[test]
    fn test_default_starts_closed() {
        let mut mock = MockTransport::default();
        assert!(!mock.is_open());
        assert!(mock.write_raw(&[0]).is_err());
    }
}
