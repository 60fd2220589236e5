//! Terminal command source

use std::io;

use cmdmod_core::{
    permission_matches, AnsiWriter, CommandSource, Component, OutputWriter, PlainWriter,
};
use tracing::warn;

/// The local console user, writing to stdout
#[derive(Debug, Clone)]
pub struct ConsoleSource {
    name: String,
    permissions: Vec<String>,
    color: bool,
}

impl ConsoleSource {
    pub fn new(name: impl Into<String>, permissions: Vec<String>, color: bool) -> Self {
        Self {
            name: name.into(),
            permissions,
            color,
        }
    }
}

impl CommandSource for ConsoleSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|granted| permission_matches(granted, permission))
    }

    fn send(&self, lines: &[Component]) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let written = if self.color {
            AnsiWriter::new(&mut out).write_lines(lines)
        } else {
            PlainWriter::new(&mut out).write_lines(lines)
        };
        if let Err(e) = written {
            warn!(error = %e, "failed to write command output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissions_follow_granted_patterns() {
        let source = ConsoleSource::new(
            "console",
            vec!["bettermodel".to_string(), "bettermodel.debug.*".to_string()],
            false,
        );

        assert!(source.has_permission("bettermodel"));
        assert!(source.has_permission("bettermodel.debug.models"));
        assert!(!source.has_permission("bettermodel.reload"));
        assert_eq!(source.name(), "console");
    }
}
