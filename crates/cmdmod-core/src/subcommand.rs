//! Leaf commands and their builder

use std::{fmt, sync::Arc};

use crate::{
    argument::{ArgumentSpec, ParserRef},
    context::{CommandContext, Executor},
    text::{ClickEvent, Component, NamedColor},
};

pub(crate) const DEFAULT_DESCRIPTION: &str = "No description";

/// A frozen leaf command
#[derive(Clone)]
pub struct SubCommandSpec {
    pub name: String,
    pub aliases: Vec<String>,
    pub permission: String,
    pub short_description: String,
    pub arguments: Vec<ArgumentSpec>,
    pub executor: Executor,
    /// Styled `/<root name>` prefix used in help entries
    pub root_display: Component,
    pub root_name: String,
}

impl SubCommandSpec {
    /// Text inserted into the caller's input when the help entry is clicked
    pub fn suggestion(&self) -> String {
        format!("/{} {}", self.root_name, self.name)
    }

    /// One help entry line
    pub fn to_component(&self) -> Component {
        let mut line = Component::empty()
            .append(self.root_display.clone())
            .append(Component::space())
            .append(Component::text(self.name.as_str()));
        for argument in &self.arguments {
            line = line
                .append(Component::space())
                .append(argument.to_component());
        }

        let aliases = if self.aliases.is_empty() {
            Component::empty()
        } else {
            Component::of([
                Component::colored("Aliases:", NamedColor::DarkAqua),
                Component::newline(),
                Component::lines(self.aliases.iter().map(|alias| Component::text(alias.as_str()))),
            ])
        };

        line.append(Component::colored(" - ", NamedColor::DarkGray))
            .append(Component::colored(
                self.short_description.as_str(),
                NamedColor::Gray,
            ))
            .hover(Component::of([
                aliases,
                Component::newline(),
                Component::newline(),
                Component::text("Click to suggest command."),
            ]))
            .click(ClickEvent::SuggestCommand(self.suggestion()))
    }
}

impl fmt::Debug for SubCommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubCommandSpec")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("permission", &self.permission)
            .field("short_description", &self.short_description)
            .field("arguments", &self.arguments)
            .field("root_name", &self.root_name)
            .finish_non_exhaustive()
    }
}

/// Mutable accumulator for a [`SubCommandSpec`]
pub struct SubCommandBuilder {
    name: String,
    permission: String,
    aliases: Vec<String>,
    short_description: String,
    arguments: Vec<ArgumentSpec>,
    executor: Option<Executor>,
}

impl SubCommandBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permission: permission.into(),
            aliases: Vec::new(),
            short_description: DEFAULT_DESCRIPTION.to_string(),
            arguments: Vec::new(),
            executor: None,
        }
    }

    pub fn with_aliases(&mut self, names: impl IntoIterator<Item = impl Into<String>>) {
        self.aliases.extend(names.into_iter().map(Into::into));
    }

    pub fn with_short_description(&mut self, description: impl Into<String>) {
        self.short_description = description.into();
    }

    /// Append a required argument labelled with the parser's type name
    pub fn with_required_argument(&mut self, name: impl Into<String>, parser: ParserRef) {
        let type_name = parser.type_name();
        self.push_argument(name.into(), parser, true, type_name);
    }

    pub fn with_required_argument_labeled(
        &mut self,
        name: impl Into<String>,
        parser: ParserRef,
        type_name: impl Into<String>,
    ) {
        self.push_argument(name.into(), parser, true, type_name.into());
    }

    /// Append an optional argument labelled with the parser's type name
    pub fn with_optional_argument(&mut self, name: impl Into<String>, parser: ParserRef) {
        let type_name = parser.type_name();
        self.push_argument(name.into(), parser, false, type_name);
    }

    pub fn with_optional_argument_labeled(
        &mut self,
        name: impl Into<String>,
        parser: ParserRef,
        type_name: impl Into<String>,
    ) {
        self.push_argument(name.into(), parser, false, type_name.into());
    }

    pub fn executes<F>(&mut self, executor: F)
    where
        F: Fn(&CommandContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.executor = Some(Arc::new(executor));
    }

    fn push_argument(
        &mut self,
        name: String,
        parser: ParserRef,
        required: bool,
        type_name: String,
    ) {
        self.arguments.push(ArgumentSpec {
            name,
            parser,
            required,
            type_name,
        });
    }

    /// Snapshot the accumulated state; a missing executor becomes a no-op
    pub fn build(&self, root_display: &Component, root_name: &str) -> SubCommandSpec {
        SubCommandSpec {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            permission: self.permission.clone(),
            short_description: self.short_description.clone(),
            arguments: self.arguments.clone(),
            executor: self.executor.clone().unwrap_or_else(noop_executor),
            root_display: root_display.clone(),
            root_name: root_name.to_string(),
        }
    }
}

fn noop_executor() -> Executor {
    fn noop(_: &CommandContext) -> anyhow::Result<()> {
        Ok(())
    }
    Arc::new(noop)
}
