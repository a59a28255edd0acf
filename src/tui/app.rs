//! Main TUI application state machine.
//!
//! Handles screen navigation, input events, and service integration. The
//! rule engine is instantaneous, so assessments run synchronously in the
//! key handler; no background worker is needed.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::sqlite::SqliteStorage;
use crate::application::{AnalyticsService, AssessmentService};
use crate::domain::RuleThresholds;

use super::ui::{
    analytics::{render_analytics, AnalyticsState},
    dashboard::{render_dashboard, DashboardState, RecentSummary},
    form::{render_form, ApplicationFormState},
    render_disclaimer,
    verdict::{render_verdict, VerdictState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    ApplicationForm,
    Verdict,
    Analytics,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Assessment service (interactive path)
    assessment_service: AssessmentService<SqliteStorage>,

    /// Analytics service
    analytics_service: AnalyticsService<SqliteStorage>,

    /// Dashboard state
    dashboard_state: DashboardState,

    /// Application form state
    form_state: ApplicationFormState,

    /// Verdict state
    verdict_state: VerdictState,

    /// Analytics state
    analytics_state: AnalyticsState,
}

impl App {
    /// Create a new application instance using default adapters.
    ///
    /// # Errors
    /// Returns error if the storage backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let db_path =
            std::env::var("LENDGUARD_DB_PATH").unwrap_or_else(|_| "lendguard.db".to_string());
        let storage = Arc::new(SqliteStorage::new(&db_path)?);

        let assessment_service = AssessmentService::new(storage.clone());
        let analytics_service = AnalyticsService::new(storage);

        Ok(Self::with_services(assessment_service, analytics_service))
    }

    /// Create an application with injected services (Composition Root
    /// pattern), so tests and `main.rs` can construct adapters externally.
    #[must_use]
    pub fn with_services(
        assessment_service: AssessmentService<SqliteStorage>,
        analytics_service: AnalyticsService<SqliteStorage>,
    ) -> Self {
        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            assessment_service,
            analytics_service,
            dashboard_state: DashboardState {
                storage_ready: true,
                assessment_count: 0,
                thresholds: RuleThresholds::default(),
            },
            form_state: ApplicationFormState::default(),
            verdict_state: VerdictState::Idle,
            analytics_state: AnalyticsState::default(),
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.update_dashboard_state();

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let area = f.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(area);

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match self.screen {
                    Screen::Dashboard => {
                        let recent = self.recent_summary();
                        render_dashboard(f, content_area, &self.dashboard_state, recent);
                    }
                    Screen::ApplicationForm => render_form(f, content_area, &self.form_state),
                    Screen::Verdict => render_verdict(f, content_area, &self.verdict_state),
                    Screen::Analytics => render_analytics(f, content_area, &self.analytics_state),
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Summarize recent assessments for the dashboard; fetched per render
    /// and dropped immediately after.
    fn recent_summary(&self) -> RecentSummary {
        match self.assessment_service.recent_assessments(10) {
            Ok(assessments) => {
                let mut summary = RecentSummary {
                    total: assessments.len(),
                    ..RecentSummary::default()
                };
                for a in &assessments {
                    match a.verdict.label {
                        crate::domain::RiskLabel::Low => summary.low += 1,
                        crate::domain::RiskLabel::High => summary.high += 1,
                    }
                }
                summary
            }
            Err(_) => RecentSummary::default(),
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::ApplicationForm => self.handle_form_key(key),
            Screen::Verdict => self.handle_verdict_key(key),
            Screen::Analytics => self.handle_analytics_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.form_state = ApplicationFormState::default();
                self.screen = Screen::ApplicationForm;
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.load_analytics();
                self.screen = Screen::Analytics;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Up => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_low_risk_sample();
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.form_state.load_high_risk_sample();
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_application();
            }
            _ => {}
        }
    }

    fn handle_verdict_key(&mut self, key: KeyCode) {
        match &self.verdict_state {
            VerdictState::Complete { .. } => match key {
                KeyCode::Enter | KeyCode::Esc => {
                    self.update_dashboard_state();
                    self.screen = Screen::Dashboard;
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.form_state = ApplicationFormState::default();
                    self.screen = Screen::ApplicationForm;
                }
                _ => {}
            },
            VerdictState::Error { .. } => match key {
                KeyCode::Enter => {
                    self.screen = Screen::ApplicationForm;
                }
                KeyCode::Esc => {
                    self.screen = Screen::Dashboard;
                }
                _ => {}
            },
            VerdictState::Idle => {
                if key == KeyCode::Esc {
                    self.screen = Screen::Dashboard;
                }
            }
        }
    }

    fn handle_analytics_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.load_analytics();
            }
            _ => {}
        }
    }

    fn submit_application(&mut self) {
        match self.form_state.to_application() {
            Ok(application) => {
                self.verdict_state = match self.assessment_service.assess(&application) {
                    Ok(assessment) => VerdictState::Complete {
                        assessment: Box::new(assessment),
                        application: Box::new(application),
                    },
                    Err(e) => VerdictState::Error {
                        message: e.to_string(),
                    },
                };
                self.screen = Screen::Verdict;

                // Clear applicant financials from the form immediately.
                self.form_state.clear_sensitive();
            }
            Err(e) => {
                self.form_state.error_message = Some(e);
            }
        }
    }

    fn update_dashboard_state(&mut self) {
        self.dashboard_state.thresholds = *self.assessment_service.thresholds();
        if let Ok(count) = self.assessment_service.count_assessments() {
            self.dashboard_state.assessment_count = count;
        }
    }

    fn load_analytics(&mut self) {
        match self.analytics_service.statistics() {
            Ok(stats) => {
                self.analytics_state.statistics = Some(stats);
                self.analytics_state.error = None;
            }
            Err(e) => {
                self.analytics_state.error = Some(e.to_string());
            }
        }
    }
}
