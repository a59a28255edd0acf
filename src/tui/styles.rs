//! Banking-themed color palette and styles.
//!
//! Deep navy primary with the classic traffic-light semantics for risk:
//! green = likely to repay, red = likely to default, amber = rule reasons.

use ratatui::style::{Color, Modifier, Style};

/// Credit theme color palette.
pub struct CreditTheme;

impl CreditTheme {
    // === Primary Colors ===

    /// Deep navy - Primary color (banking, trust)
    pub const PRIMARY: Color = Color::Rgb(30, 58, 95); // #1E3A5F

    /// Steel blue for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 90, 135); // #2D5A87

    // === Secondary Colors ===

    /// Slate blue - Secondary (professionalism)
    pub const SECONDARY: Color = Color::Rgb(71, 85, 105); // #475569

    /// Light slate for borders
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Semantic Colors ===

    /// Green - low risk / likely to repay
    pub const SUCCESS: Color = Color::Rgb(40, 167, 69); // #28A745

    /// Amber - triggered rule reasons
    pub const WARNING: Color = Color::Rgb(255, 193, 7); // #FFC107

    /// Red - high risk / likely to default
    pub const DANGER: Color = Color::Rgb(220, 53, 69); // #DC3545

    /// Blue - Info
    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    // === Text Colors ===

    /// Primary text (white)
    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC

    /// Secondary text (gray)
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8

    /// Muted text
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Preset Styles ===

    /// Style for titles
    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for subtitles
    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::SECONDARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for normal text
    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    /// Style for secondary text
    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Style for muted text
    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    /// Style for success messages
    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    /// Style for warning messages
    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    /// Style for danger/error messages
    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    /// Style for info messages
    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Style for focused elements
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for borders
    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    /// Style for focused borders
    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    /// Style for key hints
    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for key descriptions
    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Get risk label style
    #[must_use]
    pub fn risk_label(label: crate::domain::RiskLabel) -> Style {
        match label {
            crate::domain::RiskLabel::Low => Self::success(),
            crate::domain::RiskLabel::High => Self::danger(),
        }
    }

    /// Get gauge style based on a healthy-fraction percentage
    #[must_use]
    pub fn gauge(percentage: f64) -> Style {
        if percentage >= 0.7 {
            Self::success()
        } else if percentage >= 0.3 {
            Self::warning()
        } else {
            Self::danger()
        }
    }
}
