//! Common fixtures for connector integration tests

#![allow(dead_code)]

use std::{
    io::{self, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use tempfile::TempDir;
use thermoguard_core::Timestamp;

pub const LAB_INI: &str = "\
; test station
[general]
name = lab

[format]
datetime = %H:%M:%S
decimals = 1

[profile]
jal00 = 20
noise = 0

[humidity]
jal00 = 0.50 @ 00:00
jal01 = 0.50 @ 12:00
noise = 0
";

/// Writer whose bytes stay inspectable after being boxed
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn noon() -> Timestamp {
    NaiveDate::from_ymd_opt(2024, 7, 14)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

/// Write `contents` to `name` inside a fresh temporary directory
pub fn write_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}
