// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::common::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct LoadLogInner {
    lines: Vec<String>,
    warn: bool,
}

/// Thread-safe record of where each configuration value came from.
///
/// Clones share the same lines. With `debug` set, every line is also
/// printed to stdout as it is added.
#[derive(Clone, Default)]
pub struct LoadLog {
    debug: bool,
    inner: Arc<Mutex<LoadLogInner>>,
}

impl LoadLog {
    /// Create a new load log.
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            inner: Arc::new(Mutex::new(Default::default())),
        }
    }

    /// Trace `result`, warning on failure, and pass it through.
    pub fn call<T>(&self, line: String, result: Result<T, Error>) -> Result<T, Error> {
        match &result {
            Ok(_) => self.trace(format!("{line} succeeded")),
            Err(e) => self.warn(format!("{line} failed: {e}")),
        }
        result
    }

    /// Whether the log contains any warnings.
    pub fn contains_warnings(&self) -> bool {
        self.inner
            .lock()
            .ok()
            .map(|inner| inner.warn)
            .unwrap_or(false)
    }

    /// Add all lines from `other`, indented, to this log.
    pub fn extend(&self, other: &LoadLog) {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return;
        }
        let (lines, warn) = match other.inner.lock() {
            Ok(from_inner) => (from_inner.lines.clone(), from_inner.warn),
            Err(_) => return,
        };
        for line in lines {
            self.push(format!("  {line}"), warn);
        }
    }

    /// Returns a copy of every line.
    pub fn lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|inner| inner.lines.clone())
            .unwrap_or_default()
    }

    /// Add a trace line to this log.
    pub fn trace(&self, line: String) {
        self.push(line, false);
    }

    /// Add a warning line to this log.
    pub fn warn(&self, line: String) {
        self.push(format!("warning: {line}"), true);
    }

    fn push(&self, line: String, warn: bool) {
        if line.is_empty() {
            return;
        }
        if self.debug {
            println!("{line}");
        }
        if let Ok(mut inner) = self.inner.lock() {
            inner.lines.push(line);
            inner.warn |= warn;
        }
    }
}

impl Display for LoadLog {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}
