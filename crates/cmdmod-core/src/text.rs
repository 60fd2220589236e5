//! Rich text fragments
//!
//! A [`Component`] is a styled span with optional hover text, click action
//! and children. Children inherit the parent's style unless they set their
//! own. Help pages and executor replies are sequences of components, one per
//! output line.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The sixteen named text colors
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NamedColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

/// Span style. `None` color means "inherit".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub color: Option<NamedColor>,
    pub bold: bool,
}

impl Style {
    /// Resolve this style on top of an inherited one
    #[must_use]
    pub fn inherit(self, parent: Self) -> Self {
        Self {
            color: self.color.or(parent.color),
            bold: self.bold || parent.bold,
        }
    }
}

/// Action performed when a component is clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickEvent {
    /// Populate the caller's input line
    SuggestCommand(String),
    /// Open a link
    OpenUrl(String),
}

/// A styled text fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Component {
    content: String,
    style: Style,
    hover: Option<Box<Component>>,
    click: Option<ClickEvent>,
    children: Vec<Component>,
}

impl Component {
    /// An empty component, rendered as a blank line
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn colored(content: impl Into<String>, color: NamedColor) -> Self {
        Self::text(content).color(color)
    }

    #[must_use]
    pub fn space() -> Self {
        Self::text(" ")
    }

    #[must_use]
    pub fn newline() -> Self {
        Self::text("\n")
    }

    /// A content-less component wrapping `children`
    #[must_use]
    pub fn of(children: impl IntoIterator<Item = Self>) -> Self {
        Self {
            children: children.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Children separated by newlines
    #[must_use]
    pub fn lines(children: impl IntoIterator<Item = Self>) -> Self {
        let mut joined = Vec::new();
        for (index, child) in children.into_iter().enumerate() {
            if index > 0 {
                joined.push(Self::newline());
            }
            joined.push(child);
        }
        Self::of(joined)
    }

    #[must_use]
    pub fn color(mut self, color: NamedColor) -> Self {
        self.style.color = Some(color);
        self
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.style.bold = true;
        self
    }

    #[must_use]
    pub fn hover(mut self, hover: Self) -> Self {
        self.hover = Some(Box::new(hover));
        self
    }

    #[must_use]
    pub fn click(mut self, click: ClickEvent) -> Self {
        self.click = Some(click);
        self
    }

    #[must_use]
    pub fn append(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn style(&self) -> Style {
        self.style
    }

    pub fn hover_text(&self) -> Option<&Self> {
        self.hover.as_deref()
    }

    pub const fn click_event(&self) -> Option<&ClickEvent> {
        self.click.as_ref()
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Flatten to unstyled text
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.visit(Style::default(), &mut |text, _| out.push_str(text));
        out
    }

    /// Walk every non-empty span in display order with its resolved style
    pub fn visit(&self, parent: Style, f: &mut impl FnMut(&str, Style)) {
        let style = self.style.inherit(parent);
        if !self.content.is_empty() {
            f(&self.content, style);
        }
        for child in &self.children {
            child.visit(style, f);
        }
    }
}

impl From<&str> for Component {
    fn from(content: &str) -> Self {
        Self::text(content)
    }
}

impl From<String> for Component {
    fn from(content: String) -> Self {
        Self::text(content)
    }
}
