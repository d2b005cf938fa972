//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

/// Dashboard color palette.
pub struct Theme;

impl Theme {
    // Background colors
    pub const BG: Color = Color::Reset;
    pub const HEADER_BG: Color = Color::Blue;
    pub const SELECTED_BG: Color = Color::DarkGray;
    pub const STATUS_BG: Color = Color::Cyan;

    // Foreground colors
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;
    pub const HEADER_FG: Color = Color::White;
    pub const STATUS_FG: Color = Color::Black;

    // Highlight colors
    pub const HIGHLIGHT_WARNING: Color = Color::Yellow;
    pub const HIGHLIGHT_CRITICAL: Color = Color::Red;

    // Tab colors
    pub const TAB_ACTIVE: Color = Color::Cyan;
    pub const TAB_INACTIVE: Color = Color::DarkGray;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Theme::FG).bg(Theme::BG)
    }

    /// Selected row style.
    pub fn selected() -> Style {
        Style::default()
            .bg(Theme::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Table header style.
    pub fn table_header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Header cell of the active sort column.
    pub fn sorted_header() -> Style {
        Self::table_header().add_modifier(Modifier::UNDERLINED)
    }

    /// Status line background.
    pub fn status() -> Style {
        Style::default().fg(Theme::STATUS_FG).bg(Theme::STATUS_BG)
    }

    pub fn status_key() -> Style {
        Self::status().add_modifier(Modifier::BOLD)
    }

    /// Paused marker and warnings (yellow).
    pub fn warning() -> Style {
        Style::default()
            .fg(Theme::HIGHLIGHT_WARNING)
            .add_modifier(Modifier::BOLD)
    }

    /// Fetch errors and failing pods (red).
    pub fn critical() -> Style {
        Style::default()
            .fg(Theme::HIGHLIGHT_CRITICAL)
            .add_modifier(Modifier::BOLD)
    }

    /// Active tab style.
    pub fn tab_active() -> Style {
        Style::default()
            .fg(Theme::TAB_ACTIVE)
            .add_modifier(Modifier::BOLD)
    }

    /// Inactive tab style.
    pub fn tab_inactive() -> Style {
        Style::default().fg(Theme::TAB_INACTIVE)
    }

    /// Dimmed text style.
    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    /// Overlay border.
    pub fn overlay_border() -> Style {
        Style::default().fg(Color::Cyan)
    }
}
