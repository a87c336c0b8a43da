use std::io::IsTerminal;

use clap::{
  ValueEnum,
  builder::styling::{Ansi256Color, AnsiColor, Color as ClapColor, RgbColor, Style, Styles},
};
use comfy_table::Color as ComfyColor;
use crossterm::style::Color;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
  Always,
  Auto,
  Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeMode {
  Dark,
  Light,
  Auto,
}

#[derive(Debug, Clone, Copy)]
pub enum Theme {
  Dark,
  Light,
}

/// Output palette. Every role resolves to [`Color::Reset`] when colors are off.
#[derive(Debug, Clone, Copy)]
pub struct Colors {
  enabled: bool,
  theme: Theme,
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
  Color::Rgb { r, g, b }
}

impl Colors {
  pub const fn new(enabled: bool, theme: Theme) -> Self {
    Self { enabled, theme }
  }

  const fn pick(&self, dark: Color, light: Color) -> Color {
    if !self.enabled {
      return Color::Reset;
    }
    match self.theme {
      Theme::Dark => dark,
      Theme::Light => light,
    }
  }

  pub const fn timestamp(&self) -> Color {
    self.pick(rgb(118, 166, 166), rgb(92, 62, 38))
  }

  pub const fn primary(&self) -> Color {
    self.pick(rgb(191, 126, 4), rgb(70, 42, 25))
  }

  pub const fn accent(&self) -> Color {
    self.pick(rgb(166, 84, 55), rgb(211, 99, 70))
  }

  pub const fn info(&self) -> Color {
    self.pick(rgb(118, 166, 166), rgb(40, 111, 170))
  }

  pub const fn success(&self) -> Color {
    self.pick(rgb(118, 166, 166), rgb(34, 142, 90))
  }

  pub const fn label(&self) -> Color {
    self.pick(rgb(217, 164, 4), rgb(176, 103, 66))
  }

  pub const fn value(&self) -> Color {
    self.pick(rgb(242, 211, 56), rgb(199, 146, 76))
  }

  const fn to_clap(color: Color) -> Option<ClapColor> {
    match color {
      Color::Black => Some(ClapColor::Ansi(AnsiColor::Black)),
      Color::Blue | Color::DarkBlue => Some(ClapColor::Ansi(AnsiColor::Blue)),
      Color::Cyan | Color::DarkCyan => Some(ClapColor::Ansi(AnsiColor::Cyan)),
      Color::DarkGreen | Color::Green => Some(ClapColor::Ansi(AnsiColor::Green)),
      Color::DarkGrey | Color::Grey => Some(ClapColor::Ansi(AnsiColor::BrightBlack)),
      Color::DarkMagenta | Color::Magenta => Some(ClapColor::Ansi(AnsiColor::Magenta)),
      Color::DarkRed | Color::Red => Some(ClapColor::Ansi(AnsiColor::Red)),
      Color::DarkYellow | Color::Yellow => Some(ClapColor::Ansi(AnsiColor::Yellow)),
      Color::White => Some(ClapColor::Ansi(AnsiColor::White)),
      Color::AnsiValue(val) => Some(ClapColor::Ansi256(Ansi256Color(val))),
      Color::Rgb { r, g, b } => Some(ClapColor::Rgb(RgbColor(r, g, b))),
      Color::Reset => None,
    }
  }

  pub const fn clap_styles() -> Styles {
    let colors = Self::new(true, Theme::Dark);

    Styles::styled()
      .header(Style::new().bold().underline().fg_color(Self::to_clap(colors.label())))
      .usage(Style::new().bold().fg_color(Self::to_clap(colors.label())))
      .literal(Style::new().fg_color(Self::to_clap(colors.success())))
      .placeholder(Style::new().fg_color(Self::to_clap(colors.info())))
      .error(Style::new().bold().fg_color(Self::to_clap(colors.accent())))
      .valid(Style::new().fg_color(Self::to_clap(colors.success())))
      .invalid(Style::new().bold().fg_color(Self::to_clap(colors.accent())))
  }
}

/// Converts a terminal color into the table crate's color type.
pub fn table_color(color: Color) -> ComfyColor {
  match color {
    Color::Reset => ComfyColor::Reset,
    Color::Black => ComfyColor::Black,
    Color::DarkGrey => ComfyColor::DarkGrey,
    Color::Red => ComfyColor::Red,
    Color::DarkRed => ComfyColor::DarkRed,
    Color::Green => ComfyColor::Green,
    Color::DarkGreen => ComfyColor::DarkGreen,
    Color::Yellow => ComfyColor::Yellow,
    Color::DarkYellow => ComfyColor::DarkYellow,
    Color::Blue => ComfyColor::Blue,
    Color::DarkBlue => ComfyColor::DarkBlue,
    Color::Magenta => ComfyColor::Magenta,
    Color::DarkMagenta => ComfyColor::DarkMagenta,
    Color::Cyan => ComfyColor::Cyan,
    Color::DarkCyan => ComfyColor::DarkCyan,
    Color::White => ComfyColor::White,
    Color::Grey => ComfyColor::Grey,
    Color::Rgb { r, g, b } => ComfyColor::Rgb { r, g, b },
    Color::AnsiValue(val) => ComfyColor::AnsiValue(val),
  }
}

pub fn colors_enabled(mode: ColorMode) -> bool {
  match mode {
    ColorMode::Always => true,
    ColorMode::Never => false,
    ColorMode::Auto => std::io::stdout().is_terminal(),
  }
}

pub fn detect_theme(mode: ThemeMode) -> Theme {
  match mode {
    ThemeMode::Dark => Theme::Dark,
    ThemeMode::Light => Theme::Light,
    ThemeMode::Auto => detect_terminal_theme(),
  }
}

/// `COLORFGBG` carries the background palette index last; 8 and up are light.
fn detect_terminal_theme() -> Theme {
  if let Ok(colorfgbg) = std::env::var("COLORFGBG")
    && let Some(bg) = colorfgbg.split(';').next_back()
    && let Ok(bg_num) = bg.parse::<u8>()
  {
    return if bg_num >= 8 { Theme::Light } else { Theme::Dark };
  }

  Theme::Dark
}
