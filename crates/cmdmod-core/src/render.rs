//! Terminal writers for component lines

use std::io::{self, Write};

use console::{Color, Style as AnsiStyle};

use crate::text::{Component, NamedColor, Style};

pub trait OutputWriter {
    fn write_line(&mut self, line: &Component) -> io::Result<()>;

    fn write_lines(&mut self, lines: &[Component]) -> io::Result<()> {
        for line in lines {
            self.write_line(line)?;
        }
        Ok(())
    }
}

/// Writes styled spans with ANSI escapes
pub struct AnsiWriter<'a> {
    out: &'a mut dyn Write,
}

impl<'a> AnsiWriter<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out }
    }
}

impl OutputWriter for AnsiWriter<'_> {
    fn write_line(&mut self, line: &Component) -> io::Result<()> {
        let mut result = Ok(());
        line.visit(Style::default(), &mut |text, style| {
            if result.is_ok() {
                result = write!(self.out, "{}", ansi_style(style).apply_to(text));
            }
        });
        result?;
        writeln!(self.out)
    }
}

/// Writes unstyled text
pub struct PlainWriter<'a> {
    out: &'a mut dyn Write,
}

impl<'a> PlainWriter<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out }
    }
}

impl OutputWriter for PlainWriter<'_> {
    fn write_line(&mut self, line: &Component) -> io::Result<()> {
        writeln!(self.out, "{}", line.plain_text())
    }
}

fn ansi_style(style: Style) -> AnsiStyle {
    let mut ansi = AnsiStyle::new().force_styling(true);
    if let Some(color) = style.color {
        ansi = ansi.fg(ansi_color(color));
    }
    if style.bold {
        ansi = ansi.bold();
    }
    ansi
}

/// Nearest 256-color palette entry for each named color
const fn ansi_color(color: NamedColor) -> Color {
    match color {
        NamedColor::Black => Color::Black,
        NamedColor::DarkBlue => Color::Blue,
        NamedColor::DarkGreen => Color::Green,
        NamedColor::DarkAqua => Color::Cyan,
        NamedColor::DarkRed => Color::Red,
        NamedColor::DarkPurple => Color::Magenta,
        NamedColor::Gold => Color::Color256(214),
        NamedColor::Gray => Color::Color256(250),
        NamedColor::DarkGray => Color::Color256(242),
        NamedColor::Blue => Color::Color256(63),
        NamedColor::Green => Color::Color256(83),
        NamedColor::Aqua => Color::Color256(87),
        NamedColor::Red => Color::Color256(203),
        NamedColor::LightPurple => Color::Color256(207),
        NamedColor::Yellow => Color::Color256(227),
        NamedColor::White => Color::White,
    }
}
