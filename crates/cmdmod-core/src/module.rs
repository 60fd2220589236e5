//! Command modules
//!
//! A [`CommandModule`] is one node of the command tree. Its root name and
//! permission are derived from the parent once, at construction:
//!
//! - root name: `parent root name + " " + name`
//! - root permission: `parent root permission + "." + name`
//!
//! Child modules are independent values. Building a parent does not build
//! its children; each module is handed to the dispatcher on its own.

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    argument::integer_parser,
    context::{CommandContext, Executor},
    dispatch::{Dispatcher, Literal, Registration, RegistrationBuilder},
    help::{max_page, HelpFraming, HelpPages},
    subcommand::{SubCommandBuilder, SubCommandSpec, DEFAULT_DESCRIPTION},
    text::{Component, NamedColor},
};

/// Reserved literal that routes to help
pub const HELP_LITERAL: &str = "help";
/// Short alias of [`HELP_LITERAL`]
pub const HELP_ALIAS: &str = "h";
/// Name of the optional page argument
pub const PAGE_ARGUMENT: &str = "page";

/// Declare a root module
pub fn command_module(
    name: impl Into<String>,
    block: impl FnOnce(&mut CommandModule),
) -> CommandModule {
    let mut module = CommandModule::new(None, name);
    block(&mut module);
    module
}

/// A named node of the command tree
pub struct CommandModule {
    command_name: String,
    root_name: String,
    root_permission: String,
    root_display: Component,
    /// Literals of every ancestor, captured at construction
    parent_path: Vec<Literal>,
    aliases: Vec<String>,
    short_description: String,
    subcommands: IndexMap<String, SubCommandSpec>,
    main_executor: Option<Executor>,
    framing: HelpFraming,
    help_pages: OnceLock<HelpPages>,
}

impl CommandModule {
    /// Create a module, deriving names, permission and framing from `parent`
    #[must_use]
    pub fn new(parent: Option<&Self>, name: impl Into<String>) -> Self {
        let command_name = name.into();
        let (root_name, root_permission, parent_path, framing) = match parent {
            Some(parent) => {
                let mut path = parent.parent_path.clone();
                path.push(parent.literal());
                (
                    format!("{} {command_name}", parent.root_name),
                    format!("{}.{command_name}", parent.root_permission),
                    path,
                    parent.framing.clone(),
                )
            }
            None => (
                command_name.clone(),
                command_name.clone(),
                Vec::new(),
                HelpFraming::default(),
            ),
        };

        Self {
            root_display: Component::colored(format!("/{root_name}"), NamedColor::Yellow),
            command_name,
            root_name,
            root_permission,
            parent_path,
            aliases: Vec::new(),
            short_description: DEFAULT_DESCRIPTION.to_string(),
            subcommands: IndexMap::new(),
            main_executor: None,
            framing,
            help_pages: OnceLock::new(),
        }
    }

    /// Declare a nested module
    pub fn command_module(&self, name: impl Into<String>, block: impl FnOnce(&mut Self)) -> Self {
        let mut module = Self::new(Some(self), name);
        block(&mut module);
        module
    }

    /// Declare a subcommand; a second declaration under the same name replaces the first
    pub fn command(&mut self, name: impl Into<String>, block: impl FnOnce(&mut SubCommandBuilder)) {
        let name = name.into();
        let mut builder =
            SubCommandBuilder::new(name.clone(), format!("{}.{name}", self.root_permission));
        block(&mut builder);
        let spec = builder.build(&self.root_display, &self.root_name);
        if self.subcommands.insert(name.clone(), spec).is_some() {
            debug!(module = %self.root_name, subcommand = %name, "replaced subcommand");
        }
    }

    pub fn with_aliases(&mut self, names: impl IntoIterator<Item = impl Into<String>>) {
        self.aliases.extend(names.into_iter().map(Into::into));
    }

    pub fn with_short_description(&mut self, description: impl Into<String>) {
        self.short_description = description.into();
    }

    /// Replace the help framing; only modules created afterwards inherit it
    pub fn with_framing(&mut self, framing: HelpFraming) {
        self.framing = framing;
    }

    /// Executor run when the module is invoked without a subcommand or page
    pub fn executes<F>(&mut self, executor: F)
    where
        F: Fn(&CommandContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.main_executor = Some(Arc::new(executor));
    }

    pub fn name(&self) -> &str {
        &self.command_name
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn root_permission(&self) -> &str {
        &self.root_permission
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    pub const fn subcommands(&self) -> &IndexMap<String, SubCommandSpec> {
        &self.subcommands
    }

    pub fn subcommand(&self, name: &str) -> Option<&SubCommandSpec> {
        self.subcommands.get(name)
    }

    pub const fn has_executor(&self) -> bool {
        self.main_executor.is_some()
    }

    /// Page count for the current subcommand set
    pub fn max_page(&self) -> usize {
        max_page(self.subcommands.len())
    }

    /// Help pages, rendered on first access and reused afterwards
    ///
    /// Subcommands declared after the first call are not reflected.
    pub fn help_pages(&self) -> &HelpPages {
        self.help_pages.get_or_init(|| {
            debug!(
                module = %self.root_name,
                count = self.subcommands.len(),
                "rendering help pages"
            );
            HelpPages::render(&self.root_name, self.subcommands.values(), &self.framing)
        })
    }

    /// Lines of `page`, clamped into the rendered page range
    pub fn help_page(&self, page: i64) -> &[Component] {
        self.help_pages().page_clamped(page)
    }

    fn literal(&self) -> Literal {
        Literal::new(self.command_name.as_str(), &self.aliases)
    }

    fn registration(&self) -> RegistrationBuilder {
        let mut path = self.parent_path.clone();
        path.push(self.literal());
        Registration::at(path).permission(self.root_permission.as_str())
    }

    /// Register help, every subcommand and the module's own entry point
    ///
    /// The module is frozen from here on and shared by the registered handlers.
    pub fn build<D: Dispatcher + ?Sized>(self, dispatcher: &mut D) -> Arc<Self> {
        let page_parser = integer_parser(1, i64::try_from(self.max_page()).unwrap_or(i64::MAX));
        let module = Arc::new(self);

        let help = Arc::clone(&module);
        register(
            dispatcher,
            module
                .registration()
                .literal(HELP_LITERAL, [HELP_ALIAS])
                .optional(PAGE_ARGUMENT, Arc::clone(&page_parser))
                .handler(move |ctx| {
                    let page = ctx.get_or_default(PAGE_ARGUMENT, 1_i64);
                    ctx.source().send(help.help_page(page));
                    Ok(())
                }),
        );

        for subcommand in module.subcommands.values() {
            let mut builder = module
                .registration()
                .literal(subcommand.name.as_str(), &subcommand.aliases)
                .permission(subcommand.permission.as_str());
            for argument in &subcommand.arguments {
                builder = if argument.required {
                    builder.required(argument.name.as_str(), Arc::clone(&argument.parser))
                } else {
                    builder.optional(argument.name.as_str(), Arc::clone(&argument.parser))
                };
            }
            register(dispatcher, builder.handler_arc(Arc::clone(&subcommand.executor)));
        }

        let entry = module
            .registration()
            .optional(PAGE_ARGUMENT, page_parser);
        let help = Arc::clone(&module);
        let registration = match module.main_executor.clone() {
            Some(executor) => entry.handler(move |ctx| {
                if ctx.contains(PAGE_ARGUMENT) {
                    let page = ctx.get::<i64>(PAGE_ARGUMENT)?;
                    ctx.source().send(help.help_page(page));
                    Ok(())
                } else {
                    executor(ctx)
                }
            }),
            None => entry.handler(move |ctx| {
                let page = ctx.get_or_default(PAGE_ARGUMENT, 1_i64);
                ctx.source().send(help.help_page(page));
                Ok(())
            }),
        };
        register(dispatcher, registration);

        module
    }
}

fn register<D: Dispatcher + ?Sized>(dispatcher: &mut D, registration: Registration) {
    debug!(
        usage = %registration.usage(),
        permission = registration.permission.as_deref().unwrap_or(""),
        "registering command"
    );
    dispatcher.register(registration);
}

impl std::fmt::Debug for CommandModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandModule")
            .field("root_name", &self.root_name)
            .field("root_permission", &self.root_permission)
            .field("aliases", &self.aliases)
            .field("subcommands", &self.subcommands.keys().collect::<Vec<_>>())
            .field("has_executor", &self.main_executor.is_some())
            .finish_non_exhaustive()
    }
}
