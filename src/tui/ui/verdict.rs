//! Verdict view: the assessment result for one application.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::{Assessment, LoanApplication};
use crate::tui::styles::CreditTheme;

/// Verdict screen state
#[derive(Debug, Clone, Default)]
pub enum VerdictState {
    /// Nothing assessed yet
    #[default]
    Idle,
    /// Completed assessment, with the submitted application for the summary
    Complete {
        assessment: Box<Assessment>,
        application: Box<LoanApplication>,
    },
    /// Assessment failed
    Error { message: String },
}

/// Render the verdict screen
pub fn render_verdict(f: &mut Frame, area: Rect, state: &VerdictState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0]);
    match state {
        VerdictState::Idle => render_idle(f, chunks[1]),
        VerdictState::Complete {
            assessment,
            application,
        } => render_result(f, chunks[1], assessment, application),
        VerdictState::Error { message } => render_error(f, chunks[1], message),
    }
    render_footer(f, chunks[2], state);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CreditTheme::text()),
        Span::styled("Risk Verdict", CreditTheme::title()),
        Span::styled(" │ Deterministic Rule Engine", CreditTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(CreditTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No application assessed yet",
            CreditTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter application details to begin",
            CreditTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(CreditTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_result(
    f: &mut Frame,
    area: Rect,
    assessment: &Assessment,
    application: &LoanApplication,
) {
    let block = Block::default()
        .title(Span::styled(" Assessment Result ", CreditTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CreditTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                          // Label
            Constraint::Length(3),                                          // Gauges
            Constraint::Length(reasons_height(assessment)),                 // Reasons
            Constraint::Length(4),                                          // Summary
            Constraint::Min(0),                                             // Padding
        ])
        .margin(1)
        .split(inner);

    // Risk label (big display)
    let label_style = CreditTheme::risk_label(assessment.verdict.label);
    let label_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{} RISK", assessment.verdict.label),
            label_style.add_modifier(ratatui::style::Modifier::BOLD),
        )),
        Line::from(Span::styled(
            assessment.verdict.label.description(),
            CreditTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(label_display, chunks[0]);

    // Probability gauges
    let gauges = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let repay = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Repayment Probability ",
                    CreditTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(CreditTheme::border()),
        )
        .gauge_style(CreditTheme::success())
        .percent(u16::from(assessment.verdict.repayment_probability))
        .label(format!("{}%", assessment.verdict.repayment_probability));
    f.render_widget(repay, gauges[0]);

    let default = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Default Probability ",
                    CreditTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(CreditTheme::border()),
        )
        .gauge_style(CreditTheme::danger())
        .percent(u16::from(assessment.verdict.default_probability))
        .label(format!("{}%", assessment.verdict.default_probability));
    f.render_widget(default, gauges[1]);

    // Triggered reasons
    if !assessment.verdict.reasons.is_empty() {
        let mut lines = vec![Line::from(Span::styled(
            "High risk due to:",
            CreditTheme::warning(),
        ))];
        for reason in &assessment.verdict.reasons {
            lines.push(Line::from(vec![
                Span::styled("  - ", CreditTheme::warning()),
                Span::styled(reason.label(), CreditTheme::text()),
            ]));
        }
        f.render_widget(Paragraph::new(lines), chunks[2]);
    }

    // Application summary with the derived affordability figures
    let affordability = &assessment.affordability;
    let summary = vec![
        Line::from(vec![
            Span::styled("Loan Amount: ", CreditTheme::text_secondary()),
            Span::styled(
                format!("\u{20b9}{:.0}", application.loan_amount),
                CreditTheme::text(),
            ),
            Span::styled("   Monthly EMI: ", CreditTheme::text_secondary()),
            Span::styled(
                format!("\u{20b9}{:.0}", affordability.monthly_installment),
                CreditTheme::text(),
            ),
        ]),
        Line::from(vec![
            Span::styled("Monthly Income: ", CreditTheme::text_secondary()),
            Span::styled(
                format!("\u{20b9}{:.0}", affordability.monthly_income),
                CreditTheme::text(),
            ),
            Span::styled("   Debt-to-Income: ", CreditTheme::text_secondary()),
            Span::styled(
                format!("{:.2}", affordability.debt_to_income),
                CreditTheme::text(),
            ),
            Span::styled("   Credit Score: ", CreditTheme::text_secondary()),
            Span::styled(application.credit_score.to_string(), CreditTheme::text()),
        ]),
    ];
    f.render_widget(Paragraph::new(summary), chunks[3]);
}

fn reasons_height(assessment: &Assessment) -> u16 {
    if assessment.verdict.reasons.is_empty() {
        0
    } else {
        assessment.verdict.reasons.len() as u16 + 1
    }
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", CreditTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, CreditTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(CreditTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_footer(f: &mut Frame, area: Rect, state: &VerdictState) {
    let content = match state {
        VerdictState::Complete { .. } => Line::from(vec![
            Span::styled("[Enter] ", CreditTheme::key_hint()),
            Span::styled("Back to Dashboard ", CreditTheme::key_desc()),
            Span::styled("[N] ", CreditTheme::key_hint()),
            Span::styled("New Application", CreditTheme::key_desc()),
        ]),
        VerdictState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", CreditTheme::key_hint()),
            Span::styled("Edit Application ", CreditTheme::key_desc()),
            Span::styled("[Esc] ", CreditTheme::key_hint()),
            Span::styled("Cancel", CreditTheme::key_desc()),
        ]),
        VerdictState::Idle => Line::from(vec![Span::styled(
            "Waiting for input...",
            CreditTheme::text_muted(),
        )]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(CreditTheme::border()),
    );

    f.render_widget(footer, area);
}
