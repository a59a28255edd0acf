//! Loan application input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::LoanApplication;
use crate::tui::styles::CreditTheme;
use zeroize::Zeroize;

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub value: String,
    pub min: f64,
    pub max: f64,
}

/// Application form state
pub struct ApplicationFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for ApplicationFormState {
    fn default() -> Self {
        Self {
            fields: vec![
                FormField {
                    label: "Age",
                    hint: "years (21-65)",
                    value: String::new(),
                    min: 21.0,
                    max: 65.0,
                },
                FormField {
                    label: "Employment Years",
                    hint: "years (0-40)",
                    value: String::new(),
                    min: 0.0,
                    max: 40.0,
                },
                FormField {
                    label: "Annual Income",
                    hint: "\u{20b9}/year (> 0)",
                    value: String::new(),
                    min: 1.0,
                    max: f64::MAX,
                },
                FormField {
                    label: "Credit Score",
                    hint: "300-850",
                    value: String::new(),
                    min: 300.0,
                    max: 850.0,
                },
                FormField {
                    label: "Existing Loans",
                    hint: "0-4",
                    value: String::new(),
                    min: 0.0,
                    max: 4.0,
                },
                FormField {
                    label: "Loan Amount",
                    hint: "\u{20b9} (> 0)",
                    value: String::new(),
                    min: 1.0,
                    max: f64::MAX,
                },
                FormField {
                    label: "Loan Term",
                    hint: "months: 12/24/36/48/60",
                    value: String::new(),
                    min: 12.0,
                    max: 60.0,
                },
                FormField {
                    label: "Interest Rate",
                    hint: "% (5.0-30.0)",
                    value: String::new(),
                    min: 5.0,
                    max: 30.0,
                },
            ],
            selected_field: 0,
            error_message: None,
        }
    }
}

impl ApplicationFormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Add a character to the current field
    pub fn input_char(&mut self, c: char) {
        if c.is_ascii_digit() || c == '.' {
            self.fields[self.selected_field].value.push(c);
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].value.pop();
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        self.fields[self.selected_field].value.clear();
    }

    /// Wipe all field buffers and reset the form.
    ///
    /// Called after submission so applicant financials do not persist in UI
    /// state.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.zeroize();
            field.value.clear();
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Validate and convert to a LoanApplication
    pub fn to_application(&self) -> Result<LoanApplication, String> {
        let mut values = Vec::with_capacity(self.fields.len());

        for field in self.fields.iter() {
            let value: f64 = field
                .value
                .parse()
                .map_err(|_| format!("{}: Invalid number", field.label))?;

            if value < field.min || value > field.max {
                return Err(format!(
                    "{}: Value must be between {} and {}",
                    field.label, field.min, field.max
                ));
            }

            values.push(value);
        }

        Ok(LoanApplication {
            age: values[0] as u32,
            employment_years: values[1] as u32,
            annual_income: values[2],
            credit_score: values[3] as u32,
            existing_loans: values[4] as u32,
            loan_amount: values[5],
            loan_term_months: values[6] as u32,
            interest_rate: values[7],
        })
    }

    /// Load the low-risk sample profile.
    pub fn load_low_risk_sample(&mut self) {
        self.load_sample(&["30", "5", "1200000", "780", "0", "300000", "36", "10.0"]);
    }

    /// Load the high-risk sample profile.
    pub fn load_high_risk_sample(&mut self) {
        self.load_sample(&["30", "2", "400000", "520", "3", "500000", "12", "22.0"]);
    }

    fn load_sample(&mut self, sample: &[&str]) {
        for (i, val) in sample.iter().enumerate() {
            self.fields[i].value = (*val).to_string();
        }
        self.error_message = None;
    }
}

/// Render the application input form
pub fn render_form(f: &mut Frame, area: Rect, state: &ApplicationFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CreditTheme::text()),
        Span::styled("Loan Application", CreditTheme::title()),
        Span::styled(" │ Applicant & Loan Details", CreditTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(CreditTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &ApplicationFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let border_style = if is_selected {
            CreditTheme::border_focused()
        } else {
            CreditTheme::border()
        };

        let title_style = if is_selected {
            CreditTheme::focused()
        } else {
            CreditTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value_display = if field.value.is_empty() {
            Span::styled(field.hint, CreditTheme::text_muted())
        } else {
            Span::styled(&field.value, CreditTheme::text())
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected {
                Span::styled("▌", CreditTheme::focused())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &ApplicationFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", CreditTheme::danger()),
            Span::styled(err.clone(), CreditTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", CreditTheme::key_hint()),
            Span::styled("Navigate ", CreditTheme::key_desc()),
            Span::styled("[Enter] ", CreditTheme::key_hint()),
            Span::styled("Assess ", CreditTheme::key_desc()),
            Span::styled("[S] ", CreditTheme::key_hint()),
            Span::styled("Low-Risk Sample ", CreditTheme::key_desc()),
            Span::styled("[H] ", CreditTheme::key_hint()),
            Span::styled("High-Risk Sample ", CreditTheme::key_desc()),
            Span::styled("[Esc] ", CreditTheme::key_hint()),
            Span::styled("Cancel", CreditTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(CreditTheme::border()),
    );

    f.render_widget(footer, area);
}
