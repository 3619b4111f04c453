//! Output surfaces that receive the text produced by checks.
//!
//! A check hands the surface an optional label and an already formatted body.
//! The surface decides where it goes; it never sees the table value.

use crate::error::Result;
use std::cell::RefCell;
use std::io::Write as _;

pub trait Surface {
    /// Emits one block of check output.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sink cannot be written.
    fn emit(&self, label: Option<&str>, body: &str) -> Result<()>;
}

/// Joins a label and a body the way console output shows them.
///
/// Single-line bodies share the label's line; multi-line bodies start below it.
pub fn compose(label: Option<&str>, body: &str) -> String {
    match label {
        Some(label) if body.is_empty() => label.to_owned(),
        Some(label) if body.contains('\n') => format!("{label}\n{body}"),
        Some(label) => format!("{label}: {body}"),
        None => body.to_owned(),
    }
}

/// Writes to the process's standard output, one flush per emission.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Surface for Stdout {
    fn emit(&self, label: Option<&str>, body: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out)?;
        writeln!(out, "{}", compose(label, body))?;
        out.flush()?;
        Ok(())
    }
}

/// Collects emissions in memory.
#[derive(Debug, Default)]
pub struct Buffer {
    blocks: RefCell<Vec<String>>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emissions received so far.
    pub fn len(&self) -> usize {
        self.blocks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.borrow().is_empty()
    }

    /// Every emission, in order, with labels composed in.
    pub fn blocks(&self) -> Vec<String> {
        self.blocks.borrow().clone()
    }

    /// All emissions joined by newlines.
    pub fn contents(&self) -> String {
        self.blocks.borrow().join("\n")
    }

    pub fn clear(&self) {
        self.blocks.borrow_mut().clear();
    }
}

impl Surface for Buffer {
    fn emit(&self, label: Option<&str>, body: &str) -> Result<()> {
        self.blocks.borrow_mut().push(compose(label, body));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_single_line() {
        assert_eq!(compose(Some("Rows"), "3"), "Rows: 3");
        assert_eq!(compose(None, "3"), "3");
        assert_eq!(compose(Some("Rows"), ""), "Rows");
    }

    #[test]
    fn test_compose_multi_line() {
        assert_eq!(compose(Some("Head"), "a\nb"), "Head\na\nb");
    }

    #[test]
    fn test_buffer_counts_emissions() -> Result<()> {
        let buffer = Buffer::new();
        assert!(buffer.is_empty());
        buffer.emit(Some("Shape"), "(3, 2)")?;
        buffer.emit(None, "done")?;
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.contents(), "Shape: (3, 2)\ndone");
        Ok(())
    }
}
