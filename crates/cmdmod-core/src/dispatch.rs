//! The seam between command modules and a dispatch backend
//!
//! Modules never parse input themselves. `CommandModule::build` describes
//! each command path as a [`Registration`] and hands it to a [`Dispatcher`],
//! which owns tokenizing, argument parsing and permission checks.

use std::{fmt, sync::Arc};

use crate::{
    argument::ParserRef,
    context::{CommandContext, Executor},
};

/// Handler invoked by the backend for a matched registration
pub type Handler = Executor;

/// A literal path segment with its aliases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub name: String,
    pub aliases: Vec<String>,
}

impl Literal {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-insensitive match against the name or any alias
    pub fn matches(&self, token: &str) -> bool {
        self.name.eq_ignore_ascii_case(token)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(token))
    }
}

/// One argument bound in declared order
#[derive(Debug, Clone)]
pub struct ArgumentBinding {
    pub name: String,
    pub parser: ParserRef,
    pub required: bool,
}

/// A complete command path ready for the backend
#[derive(Clone)]
pub struct Registration {
    /// Root literal followed by any nested literals
    pub path: Vec<Literal>,
    pub permission: Option<String>,
    pub arguments: Vec<ArgumentBinding>,
    pub handler: Handler,
}

impl Registration {
    /// Start a registration rooted at `name`
    #[must_use]
    pub fn builder(
        name: impl Into<String>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> RegistrationBuilder {
        RegistrationBuilder {
            path: vec![Literal::new(name, aliases)],
            permission: None,
            arguments: Vec::new(),
        }
    }

    /// Start a registration at an existing literal path
    #[must_use]
    pub fn at(path: Vec<Literal>) -> RegistrationBuilder {
        RegistrationBuilder {
            path,
            permission: None,
            arguments: Vec::new(),
        }
    }

    /// Usage line such as `bm spawn <model> [type]`
    pub fn usage(&self) -> String {
        let literals = self.path.iter().map(|literal| literal.name.clone());
        let arguments = self.arguments.iter().map(|binding| {
            if binding.required {
                format!("<{}>", binding.name)
            } else {
                format!("[{}]", binding.name)
            }
        });
        itertools::join(literals.chain(arguments), " ")
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("path", &self.path)
            .field("permission", &self.permission)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// Accumulates path, permission and arguments for a [`Registration`]
#[derive(Debug, Clone)]
pub struct RegistrationBuilder {
    path: Vec<Literal>,
    permission: Option<String>,
    arguments: Vec<ArgumentBinding>,
}

impl RegistrationBuilder {
    /// Set the permission; a later call replaces an earlier one
    #[must_use]
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    #[must_use]
    pub fn literal(
        mut self,
        name: impl Into<String>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.path.push(Literal::new(name, aliases));
        self
    }

    #[must_use]
    pub fn required(mut self, name: impl Into<String>, parser: ParserRef) -> Self {
        self.arguments.push(ArgumentBinding {
            name: name.into(),
            parser,
            required: true,
        });
        self
    }

    #[must_use]
    pub fn optional(mut self, name: impl Into<String>, parser: ParserRef) -> Self {
        self.arguments.push(ArgumentBinding {
            name: name.into(),
            parser,
            required: false,
        });
        self
    }

    /// Finish with the handler
    pub fn handler<F>(self, handler: F) -> Registration
    where
        F: Fn(&CommandContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handler_arc(Arc::new(handler))
    }

    /// Finish with an already shared handler
    pub fn handler_arc(self, handler: Handler) -> Registration {
        Registration {
            path: self.path,
            permission: self.permission,
            arguments: self.arguments,
            handler,
        }
    }
}

/// A backend that accepts command registrations
pub trait Dispatcher {
    fn register(&mut self, registration: Registration);
}

impl Dispatcher for Vec<Registration> {
    fn register(&mut self, registration: Registration) {
        self.push(registration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::{integer_parser, string_parser};

    #[test]
    fn test_later_permission_replaces_earlier() {
        let registration = Registration::builder("bettermodel", ["bm"])
            .permission("bettermodel")
            .literal("spawn", ["s"])
            .permission("bettermodel.spawn")
            .required("model", string_parser())
            .optional("page", integer_parser(1, 2))
            .handler(|_| Ok(()));

        assert_eq!(registration.permission.as_deref(), Some("bettermodel.spawn"));
        assert_eq!(registration.usage(), "bettermodel spawn <model> [page]");
    }

    #[test]
    fn test_literal_matches_aliases_case_insensitively() {
        let literal = Literal::new("reload", ["re", "rl"]);
        assert!(literal.matches("RELOAD"));
        assert!(literal.matches("rl"));
        assert!(!literal.matches("r"));
    }

    #[test]
    fn test_vec_collects_registrations() {
        let mut registrations: Vec<Registration> = Vec::new();
        registrations
            .register(Registration::builder("a", Vec::<String>::new()).handler(|_| Ok(())));
        assert_eq!(registrations.len(), 1);
    }
}
