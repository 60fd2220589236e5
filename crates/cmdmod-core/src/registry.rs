//! In-memory dispatch backend
//!
//! Matching rules:
//! - input is split with shell quoting rules, a leading `/` is ignored
//! - every literal of a registration must match, by name or alias
//! - arguments bind in declared order; a missing optional argument is
//!   simply absent, a missing required one rejects the registration
//! - tokens left over after binding reject the registration
//! - among matches the one with the longest literal path wins, then the
//!   earliest registered
//! - when nothing matches, the rejection with the longest literal path is
//!   reported, or `UnknownCommand` if no registration got past its literals

use std::{collections::HashMap, sync::Arc};

use tracing::trace;

use crate::{
    argument::ArgValue,
    context::{CommandContext, CommandSource},
    dispatch::{Dispatcher, Registration},
    error::{Error, Result},
};

/// Registrations in the order they were received
#[derive(Debug, Default)]
pub struct CommandRegistry {
    registrations: Vec<Registration>,
}

enum Binding {
    Matched(HashMap<String, ArgValue>),
    Rejected(Error),
    Missed,
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Usage line of every registration
    pub fn usages(&self) -> Vec<String> {
        self.registrations.iter().map(Registration::usage).collect()
    }

    /// Match `input`, check the permission and run the handler
    pub fn execute(&self, source: Arc<dyn CommandSource>, input: &str) -> Result<()> {
        let trimmed = input.trim();
        let line = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let tokens = shell_words::split(line).map_err(|e| Error::Tokenize(e.to_string()))?;
        if tokens.is_empty() {
            return Err(Error::UnknownCommand(String::new()));
        }

        let mut best: Option<(&Registration, HashMap<String, ArgValue>)> = None;
        let mut failure: Option<(usize, Error)> = None;
        for registration in &self.registrations {
            let depth = registration.path.len();
            match bind(registration, &tokens) {
                Binding::Matched(arguments) => {
                    if best
                        .as_ref()
                        .map_or(true, |(current, _)| depth > current.path.len())
                    {
                        best = Some((registration, arguments));
                    }
                }
                Binding::Rejected(error) => {
                    if failure
                        .as_ref()
                        .map_or(true, |(current, _)| depth > *current)
                    {
                        failure = Some((depth, error));
                    }
                }
                Binding::Missed => {}
            }
        }

        let Some((registration, arguments)) = best else {
            return Err(failure.map_or_else(
                || Error::UnknownCommand(line.to_string()),
                |(_, error)| error,
            ));
        };

        if let Some(permission) = &registration.permission {
            if !source.has_permission(permission) {
                return Err(Error::PermissionDenied(permission.clone()));
            }
        }

        trace!(
            source = source.name(),
            usage = %registration.usage(),
            "dispatching command"
        );
        let ctx = CommandContext::new(source, line, arguments);
        (registration.handler)(&ctx).map_err(Error::Executor)
    }
}

fn bind(registration: &Registration, tokens: &[String]) -> Binding {
    let depth = registration.path.len();
    if tokens.len() < depth
        || !registration
            .path
            .iter()
            .zip(tokens)
            .all(|(literal, token)| literal.matches(token))
    {
        return Binding::Missed;
    }

    let mut rest = tokens[depth..].iter();
    let mut arguments = HashMap::new();
    for binding in &registration.arguments {
        match rest.next() {
            Some(token) => match binding.parser.parse(token) {
                Ok(value) => {
                    arguments.insert(binding.name.clone(), value);
                }
                Err(reason) => {
                    return Binding::Rejected(Error::InvalidArgument {
                        name: binding.name.clone(),
                        input: token.clone(),
                        reason,
                    });
                }
            },
            None if binding.required => {
                return Binding::Rejected(Error::MissingArgument(binding.name.clone()));
            }
            None => {}
        }
    }

    let surplus: Vec<&str> = rest.map(String::as_str).collect();
    if surplus.is_empty() {
        Binding::Matched(arguments)
    } else {
        Binding::Rejected(Error::TooManyArguments(surplus.join(" ")))
    }
}

impl Dispatcher for CommandRegistry {
    fn register(&mut self, registration: Registration) {
        self.registrations.push(registration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        argument::{integer_parser, string_parser},
        context::BufferedSource,
    };

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register(
            Registration::builder("bettermodel", ["bm"])
                .permission("bettermodel.spawn")
                .literal("spawn", ["s"])
                .required("model", string_parser())
                .optional("count", integer_parser(1, 10))
                .handler(|ctx| {
                    let model = ctx.get::<String>("model")?;
                    let count = ctx.get_or_default("count", 1_i64);
                    ctx.source().info(&format!("{model} x{count}"));
                    Ok(())
                }),
        );
        registry
    }

    #[test]
    fn test_optional_argument_may_be_omitted() -> Result<()> {
        let registry = registry();
        let source = Arc::new(BufferedSource::new("tester"));

        registry.execute(source.clone(), "/bm spawn steve")?;
        registry.execute(source.clone(), "bettermodel s 'two words' 3")?;

        assert_eq!(source.plain_lines(), ["steve x1", "two words x3"]);
        Ok(())
    }

    #[test]
    fn test_binding_failures_are_reported() {
        let registry = registry();
        let source = Arc::new(BufferedSource::new("tester"));

        assert!(matches!(
            registry.execute(source.clone(), "bm spawn"),
            Err(Error::MissingArgument(name)) if name == "model"
        ));
        assert!(matches!(
            registry.execute(source.clone(), "bm spawn steve eleven"),
            Err(Error::InvalidArgument { name, .. }) if name == "count"
        ));
        assert!(matches!(
            registry.execute(source.clone(), "bm spawn steve 2 extra"),
            Err(Error::TooManyArguments(rest)) if rest == "extra"
        ));
        assert!(matches!(
            registry.execute(source.clone(), "other"),
            Err(Error::UnknownCommand(_))
        ));
        assert!(matches!(
            registry.execute(source, "bm 'unterminated"),
            Err(Error::Tokenize(_))
        ));
    }

    #[test]
    fn test_permission_is_checked_before_handler() {
        let registry = registry();
        let source = Arc::new(BufferedSource::with_permissions("guest", ["bettermodel.reload"]));

        let result = registry.execute(source.clone(), "bm spawn steve");

        assert!(matches!(result, Err(Error::PermissionDenied(p)) if p == "bettermodel.spawn"));
        assert!(source.plain_lines().is_empty());
    }

    #[test]
    fn test_handler_errors_propagate() {
        let mut registry = CommandRegistry::new();
        registry.register(
            Registration::builder("fail", Vec::<String>::new())
                .handler(|_| Err(anyhow::anyhow!("boom"))),
        );
        let source = Arc::new(BufferedSource::new("tester"));

        let result = registry.execute(source, "fail");

        assert!(matches!(&result, Err(Error::Executor(_))));
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("Command failed: boom".to_string())
        );
    }
}
