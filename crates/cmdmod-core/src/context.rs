//! Invocation context handed to executors

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{
    argument::{ArgValue, FromArgValue},
    error::{Error, Result},
    text::{Component, NamedColor},
};

/// Stored executor callback
pub type Executor = Arc<dyn Fn(&CommandContext) -> anyhow::Result<()> + Send + Sync>;

/// The caller of a command and its output sink
pub trait CommandSource: Send + Sync {
    /// Caller identity
    fn name(&self) -> &str;

    fn has_permission(&self, permission: &str) -> bool;

    /// Send one component per output line
    fn send(&self, lines: &[Component]);

    fn info(&self, message: &str) {
        self.send(&[Component::text(message)]);
    }

    fn warn(&self, message: &str) {
        self.send(&[Component::colored(message, NamedColor::Red)]);
    }
}

/// Bound arguments plus the caller for one invocation
#[derive(Clone)]
pub struct CommandContext {
    source: Arc<dyn CommandSource>,
    input: String,
    arguments: HashMap<String, ArgValue>,
}

impl CommandContext {
    #[must_use]
    pub fn new(
        source: Arc<dyn CommandSource>,
        input: impl Into<String>,
        arguments: HashMap<String, ArgValue>,
    ) -> Self {
        Self {
            source,
            input: input.into(),
            arguments,
        }
    }

    pub const fn source(&self) -> &Arc<dyn CommandSource> {
        &self.source
    }

    /// The raw input that matched
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether `name` was supplied
    pub fn contains(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    pub fn raw(&self, name: &str) -> Option<&ArgValue> {
        self.arguments.get(name)
    }

    /// Typed lookup of a supplied argument
    pub fn get<T: FromArgValue>(&self, name: &str) -> Result<T> {
        let value = self
            .arguments
            .get(name)
            .ok_or_else(|| Error::MissingArgument(name.to_string()))?;
        T::from_arg(value).ok_or_else(|| Error::ArgumentType {
            name: name.to_string(),
            expected: T::EXPECTED,
        })
    }

    /// Typed lookup, `None` when absent or of another type
    pub fn optional<T: FromArgValue>(&self, name: &str) -> Option<T> {
        self.arguments.get(name).and_then(T::from_arg)
    }

    pub fn get_or_default<T: FromArgValue>(&self, name: &str, fallback: T) -> T {
        self.optional(name).unwrap_or(fallback)
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("source", &self.source.name())
            .field("input", &self.input)
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// In-memory source that records everything sent to it
///
/// Permissions are exact strings, `*`, or a `prefix.*` wildcard.
#[derive(Debug, Default)]
pub struct BufferedSource {
    name: String,
    permissions: Vec<String>,
    lines: Mutex<Vec<Component>>,
}

impl BufferedSource {
    /// A source holding every permission
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_permissions(name, ["*"])
    }

    #[must_use]
    pub fn with_permissions(
        name: impl Into<String>,
        permissions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Everything sent so far
    pub fn lines(&self) -> Vec<Component> {
        self.lines.lock().clone()
    }

    /// Everything sent so far, flattened to text
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines.lock().iter().map(Component::plain_text).collect()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl CommandSource for BufferedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|granted| permission_matches(granted, permission))
    }

    fn send(&self, lines: &[Component]) {
        self.lines.lock().extend_from_slice(lines);
    }
}

/// Whether a granted permission pattern covers `permission`
#[must_use]
pub fn permission_matches(granted: &str, permission: &str) -> bool {
    if granted == "*" || granted == permission {
        return true;
    }
    granted.strip_suffix(".*").is_some_and(|prefix| {
        permission == prefix
            || permission
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.'))
    })
}
