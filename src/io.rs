//! The output sink.
//!
//! All observable output of a program flows through one `PrintSink`.
//! In stream mode each emission goes straight to stdout,
//! fire-and-forget. In capture mode (used by `test_mode` and the test
//! suites) emissions are collected instead, so harnesses can assert
//! on exactly what a program printed.

use std::io::{self, Write};

/// Destination for `print` and `cowsay` output.
#[derive(Debug, Default)]
pub struct PrintSink {
    capture: bool,
    captured: Vec<String>,
}

impl PrintSink {
    /// A sink that writes each emission to stdout.
    pub fn stdout() -> Self {
        Self {
            capture: false,
            captured: Vec::new(),
        }
    }

    /// A sink that collects emissions instead of writing them.
    pub fn capture() -> Self {
        Self {
            capture: true,
            captured: Vec::new(),
        }
    }

    /// Emit one unit of output, followed by a newline.
    pub fn emit(&mut self, text: &str) {
        if self.capture {
            self.captured.push(text.to_string());
        } else {
            let stdout = io::stdout();
            let _ = writeln!(stdout.lock(), "{}", text);
        }
    }

    /// Captured emissions so far (empty in stream mode).
    pub fn lines(&self) -> &[String] {
        &self.captured
    }

    /// Drain the captured emissions.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.captured)
    }
}

/// Render the secret statement's output: a cow saying `text`.
pub fn cowsay(text: &str) -> String {
    let width = text.chars().count();
    let mut out = String::new();

    out.push(' ');
    for _ in 0..width + 2 {
        out.push('_');
    }
    out.push('\n');
    out.push_str(&format!("< {} >\n", text));
    out.push(' ');
    for _ in 0..width + 2 {
        out.push('-');
    }
    out.push('\n');
    out.push_str(
        "        \\   ^__^\n         \\  (oo)\\_______\n            (__)\\       )\\/\\\n                ||----w |\n                ||     ||",
    );
    out
}
