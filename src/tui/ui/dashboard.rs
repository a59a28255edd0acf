//! Dashboard view: Main overview screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{RiskLabel, RuleThresholds};
use crate::tui::styles::CreditTheme;

#[derive(Debug, Clone, Copy, Default)]
pub struct RecentSummary {
    pub total: usize,
    pub low: u32,
    pub high: u32,
}

/// Dashboard state for rendering.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub storage_ready: bool,
    pub assessment_count: usize,
    pub thresholds: RuleThresholds,
}

/// Render the main dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, state: &DashboardState, recent: RecentSummary) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_main_content(f, chunks[1], state, recent);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CreditTheme::text()),
        Span::styled("Lendguard", CreditTheme::title()),
        Span::styled(" │ ", CreditTheme::text_muted()),
        Span::styled(
            "Loan Repayment Risk Assessment",
            CreditTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(CreditTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_main_content(f: &mut Frame, area: Rect, state: &DashboardState, recent: RecentSummary) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45), // Status + policy panels
            Constraint::Percentage(55), // Recent assessments
        ])
        .split(area);

    render_status_panels(f, chunks[0], state);
    render_recent_summary(f, chunks[1], recent);
}

fn render_status_panels(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // System status
            Constraint::Length(7), // Rule policy
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    // System Status
    let status_items = vec![
        format_status_item("Assessment History", state.storage_ready),
        Line::from(vec![
            Span::styled("  Assessments: ", CreditTheme::text_secondary()),
            Span::styled(state.assessment_count.to_string(), CreditTheme::text()),
        ]),
    ];

    let status_block = Block::default()
        .title(Span::styled(" System Status ", CreditTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CreditTheme::border());

    f.render_widget(Paragraph::new(status_items).block(status_block), chunks[0]);

    // Rule policy in effect
    let t = &state.thresholds;
    let policy_items = vec![
        Line::from(vec![
            Span::styled("  Credit score floor: ", CreditTheme::text_secondary()),
            Span::styled(t.credit_score_floor.to_string(), CreditTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Interest rate ceiling: ", CreditTheme::text_secondary()),
            Span::styled(format!("{}%", t.interest_rate_ceiling), CreditTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Existing loans ceiling: ", CreditTheme::text_secondary()),
            Span::styled(t.existing_loans_ceiling.to_string(), CreditTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Debt-to-income ceiling: ", CreditTheme::text_secondary()),
            Span::styled(format!("{:.0}%", t.debt_to_income_ceiling * 100.0), CreditTheme::text()),
        ]),
    ];

    let policy_block = Block::default()
        .title(Span::styled(" Rule Policy ", CreditTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CreditTheme::border());

    f.render_widget(Paragraph::new(policy_items).block(policy_block), chunks[1]);

    // Quick Actions
    let actions = vec![
        Line::from(vec![
            Span::styled("[N] ", CreditTheme::key_hint()),
            Span::styled("New Application", CreditTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[A] ", CreditTheme::key_hint()),
            Span::styled("Analytics", CreditTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[Q] ", CreditTheme::key_hint()),
            Span::styled("Quit", CreditTheme::key_desc()),
        ]),
    ];

    let actions_block = Block::default()
        .title(Span::styled(" Quick Actions ", CreditTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CreditTheme::border());

    f.render_widget(Paragraph::new(actions).block(actions_block), chunks[2]);
}

fn format_status_item(label: &str, ok: bool) -> Line<'static> {
    let (icon, style) = if ok {
        ("OK", CreditTheme::success())
    } else {
        ("FAIL", CreditTheme::danger())
    };

    Line::from(vec![
        Span::styled(format!("  {icon} "), style),
        Span::styled(label.to_string(), CreditTheme::text()),
    ])
}

fn render_recent_summary(f: &mut Frame, area: Rect, recent: RecentSummary) {
    let block = Block::default()
        .title(Span::styled(" Recent Assessments ", CreditTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CreditTheme::border());

    if recent.total == 0 {
        let empty_msg = Paragraph::new(Line::from(vec![Span::styled(
            "No assessments yet. Press [N] to start.",
            CreditTheme::text_muted(),
        )]))
        .block(block);
        f.render_widget(empty_msg, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(vec![
            Span::styled("Last ", CreditTheme::text_secondary()),
            Span::styled(recent.total.to_string(), CreditTheme::text()),
            Span::styled(" assessments", CreditTheme::text_secondary()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Low risk: ", CreditTheme::text_secondary()),
            Span::styled(
                recent.low.to_string(),
                CreditTheme::risk_label(RiskLabel::Low),
            ),
            Span::styled("   ", CreditTheme::text()),
            Span::styled("High risk: ", CreditTheme::text_secondary()),
            Span::styled(
                recent.high.to_string(),
                CreditTheme::risk_label(RiskLabel::High),
            ),
        ]),
    ];

    f.render_widget(Paragraph::new(lines).block(Block::default()), inner);
}
