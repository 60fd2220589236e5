//! cmdmod-core - Hierarchical command modules
//!
//! This crate provides:
//! - Declarative command modules with nested sub-modules
//! - Typed argument specs bound to backend parsers
//! - Paginated help pages rendered from the same declarations
//! - A dispatcher seam plus an in-memory reference backend

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod argument;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod help;
pub mod module;
pub mod registry;
pub mod render;
pub mod subcommand;
pub mod text;

pub use argument::{
    boolean_parser, double_parser, integer_parser, string_parser, ArgValue, ArgumentParser,
    ArgumentSpec, FromArgValue, ParserRef,
};
pub use context::{permission_matches, BufferedSource, CommandContext, CommandSource, Executor};
pub use dispatch::{
    ArgumentBinding, Dispatcher, Handler, Literal, Registration, RegistrationBuilder,
};
pub use error::{Error, Result};
pub use help::{max_page, page_range, HelpFraming, HelpLink, HelpPages, PAGE_SIZE};
pub use module::{command_module, CommandModule, HELP_ALIAS, HELP_LITERAL, PAGE_ARGUMENT};
pub use registry::CommandRegistry;
pub use render::{AnsiWriter, OutputWriter, PlainWriter};
pub use subcommand::{SubCommandBuilder, SubCommandSpec};
pub use text::{ClickEvent, Component, NamedColor, Style};
