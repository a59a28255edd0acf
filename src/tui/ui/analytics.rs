//! Analytics view: aggregate statistics over the assessment history.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::application::RiskStatistics;
use crate::tui::styles::CreditTheme;

/// Analytics state
#[derive(Default)]
pub struct AnalyticsState {
    pub statistics: Option<RiskStatistics>,
    pub error: Option<String>,
}

/// Render the analytics view
pub fn render_analytics(f: &mut Frame, area: Rect, state: &AnalyticsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_content(f, chunks[1], state);
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CreditTheme::text()),
        Span::styled("Analytics", CreditTheme::title()),
        Span::styled(" │ Assessment History", CreditTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(CreditTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_content(f: &mut Frame, area: Rect, state: &AnalyticsState) {
    if let Some(err) = &state.error {
        render_error(f, area, err);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .margin(1)
        .split(area);

    render_statistics(f, chunks[0], state);
    render_reason_counts(f, chunks[1], state);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "! Cannot Load Statistics",
            CreditTheme::danger(),
        )),
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

fn render_statistics(f: &mut Frame, area: Rect, state: &AnalyticsState) {
    let block = Block::default()
        .title(Span::styled(
            " Aggregate Statistics ",
            CreditTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(CreditTheme::border());

    let inner = block.inner(area);
    f.render_widget(block, area);

    match &state.statistics {
        Some(stats) if stats.total > 0 => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Total count
                    Constraint::Length(3), // High risk rate
                    Constraint::Length(3), // Avg DTI
                    Constraint::Length(2), // Avg installment
                    Constraint::Min(0),    // Padding
                ])
                .margin(1)
                .split(inner);

            let count_text = Paragraph::new(Line::from(vec![
                Span::styled("Total Assessments: ", CreditTheme::text_secondary()),
                Span::styled(stats.total.to_string(), CreditTheme::text()),
            ]));
            f.render_widget(count_text, chunks[0]);

            let rate_gauge = Gauge::default()
                .block(
                    Block::default()
                        .title(Span::styled(
                            " High-Risk Rate ",
                            CreditTheme::text_secondary(),
                        ))
                        .borders(Borders::ALL)
                        .border_style(CreditTheme::border()),
                )
                .gauge_style(CreditTheme::gauge(1.0 - stats.high_risk_rate))
                .percent((stats.high_risk_rate * 100.0).clamp(0.0, 100.0) as u16)
                .label(format!("{:.1}%", stats.high_risk_rate * 100.0));
            f.render_widget(rate_gauge, chunks[1]);

            let dti_gauge = Gauge::default()
                .block(
                    Block::default()
                        .title(Span::styled(
                            " Average Debt-to-Income ",
                            CreditTheme::text_secondary(),
                        ))
                        .borders(Borders::ALL)
                        .border_style(CreditTheme::border()),
                )
                .gauge_style(CreditTheme::gauge(1.0 - stats.avg_debt_to_income.min(1.0)))
                .percent((stats.avg_debt_to_income * 100.0).clamp(0.0, 100.0) as u16)
                .label(format!("{:.2}", stats.avg_debt_to_income));
            f.render_widget(dti_gauge, chunks[2]);

            let installment_text = Paragraph::new(Line::from(vec![
                Span::styled("Average EMI: ", CreditTheme::text_secondary()),
                Span::styled(
                    format!("\u{20b9}{:.0}", stats.avg_installment),
                    CreditTheme::text(),
                ),
            ]));
            f.render_widget(installment_text, chunks[3]);
        }
        _ => {
            let no_data = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No assessments recorded yet",
                    CreditTheme::text_muted(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press [R] to refresh",
                    CreditTheme::text_secondary(),
                )),
            ])
            .alignment(Alignment::Center);
            f.render_widget(no_data, inner);
        }
    }
}

fn render_reason_counts(f: &mut Frame, area: Rect, state: &AnalyticsState) {
    let block = Block::default()
        .title(Span::styled(" Triggered Rules ", CreditTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CreditTheme::border());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(stats) = &state.statistics else {
        return;
    };

    if stats.reason_counts.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No rules have triggered",
            CreditTheme::text_muted(),
        )))
        .alignment(Alignment::Center);
        f.render_widget(empty, inner);
        return;
    }

    let mut lines = Vec::new();
    for (reason, count) in &stats.reason_counts {
        lines.push(Line::from(vec![
            Span::styled(format!("{count:>4}  "), CreditTheme::warning()),
            Span::styled(reason.clone(), CreditTheme::text()),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[R] ", CreditTheme::key_hint()),
        Span::styled("Refresh ", CreditTheme::key_desc()),
        Span::styled("[Esc] ", CreditTheme::key_hint()),
        Span::styled("Back", CreditTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(CreditTheme::border()),
    );

    f.render_widget(footer, area);
}
