//! Paginated help pages
//!
//! Pages are fixed at [`PAGE_SIZE`] entries. The page count is
//! `count / PAGE_SIZE + 1`, so a module whose subcommand count is an exact
//! multiple of the page size ends with a page that holds framing only.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{
    subcommand::SubCommandSpec,
    text::{ClickEvent, Component, NamedColor},
};

/// Entries per help page
pub const PAGE_SIZE: usize = 6;

/// Number of help pages for `count` subcommands
#[must_use]
pub const fn max_page(count: usize) -> usize {
    count / PAGE_SIZE + 1
}

/// Zero-based entry indices shown on 1-indexed `page`
///
/// Pages outside `[1, max_page(count)]` yield an empty range.
#[must_use]
pub fn page_range(page: usize, count: usize) -> Range<usize> {
    let Some(previous) = page.checked_sub(1) else {
        return 0..0;
    };
    let start = PAGE_SIZE.saturating_mul(previous);
    let end = PAGE_SIZE.saturating_mul(page).min(count);
    start.min(end)..end
}

/// A clickable link shown under the page-one banner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpLink {
    pub label: String,
    pub url: String,
    #[serde(default = "default_link_color")]
    pub color: NamedColor,
}

const fn default_link_color() -> NamedColor {
    NamedColor::Aqua
}

/// Static text framing every help page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpFraming {
    /// Banner title, rendered as `------ title ------`
    pub title: String,
    /// Links shown on page one
    pub links: Vec<HelpLink>,
}

impl Default for HelpFraming {
    fn default() -> Self {
        Self {
            title: "Commands".to_string(),
            links: Vec::new(),
        }
    }
}

impl HelpFraming {
    fn banner(&self) -> Vec<Component> {
        vec![
            Component::empty(),
            Component::colored(format!("------ {} ------", self.title), NamedColor::Gray),
            Component::empty(),
        ]
    }

    /// Banner, links and the `<arg>`/`[arg]` legend
    fn full_banner(&self) -> Vec<Component> {
        let mut lines = self.banner();
        if !self.links.is_empty() {
            let mut links = Component::empty().bold();
            for link in &self.links {
                links = links
                    .append(Component::space())
                    .append(link_component(link));
            }
            lines.push(links);
            lines.push(Component::empty());
        }
        lines.push(Component::of([
            Component::colored("    <arg>", NamedColor::Red),
            Component::space(),
            Component::text(" - required"),
        ]));
        lines.push(Component::of([
            Component::colored("    [arg]", NamedColor::DarkAqua),
            Component::space(),
            Component::text(" - optional"),
        ]));
        lines.push(Component::empty());
        lines
    }
}

fn link_component(link: &HelpLink) -> Component {
    Component::colored(format!("[{}]", link.label), link.color)
        .hover(Component::of([
            Component::colored(link.url.as_str(), NamedColor::DarkAqua),
            Component::newline(),
            Component::newline(),
            Component::text("Click to open link."),
        ]))
        .click(ClickEvent::OpenUrl(link.url.clone()))
}

/// Pre-rendered help pages for one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpPages {
    pages: Vec<Vec<Component>>,
}

impl HelpPages {
    /// Render every page for `subcommands` in the given order
    pub fn render<'a>(
        root_name: &str,
        subcommands: impl IntoIterator<Item = &'a SubCommandSpec>,
        framing: &HelpFraming,
    ) -> Self {
        let entries: Vec<&SubCommandSpec> = subcommands.into_iter().collect();
        let max = max_page(entries.len());
        let pages = (1..=max)
            .map(|index| {
                let mut lines = if index == 1 {
                    framing.full_banner()
                } else {
                    framing.banner()
                };
                lines.extend(
                    entries[page_range(index, entries.len())]
                        .iter()
                        .map(|entry| entry.to_component()),
                );
                lines.push(Component::colored(
                    format!("/{root_name} [help] [page] - help command."),
                    NamedColor::LightPurple,
                ));
                lines.push(Component::empty());
                lines.push(Component::colored(
                    format!("---------< Page {index} / {max} >---------"),
                    NamedColor::Gray,
                ));
                lines
            })
            .collect();
        Self { pages }
    }

    /// Number of pages, always at least one
    pub fn max_page(&self) -> usize {
        self.pages.len()
    }

    /// Lines of 1-indexed `page`, `None` when out of range
    pub fn page(&self, page: usize) -> Option<&[Component]> {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .map(Vec::as_slice)
    }

    /// Lines of `page` after clamping it into `[1, max_page]`
    pub fn page_clamped(&self, page: i64) -> &[Component] {
        let last = self.pages.len().saturating_sub(1);
        let index = usize::try_from(page.saturating_sub(1))
            .unwrap_or(0)
            .min(last);
        self.pages.get(index).map(Vec::as_slice).unwrap_or_default()
    }
}
