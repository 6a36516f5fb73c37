//! Application state — single-owner, main-thread only.
//!
//! The session is the explicit context object passed into the engine;
//! every mutation goes through a handler here followed by `recompute`, so
//! the engine stays free of UI concerns.

use std::path::PathBuf;

use levdesk_core::data::{
    fetch_history, fetch_spot_prices, sample_history, GeckoProvider, HistorySeries,
    PaprikaProvider, PriceProvider, DEFAULT_HISTORY_DAYS,
};
use levdesk_core::domain::{CoinMap, Direction, Position, Session};
use levdesk_core::engine::{
    evaluate, evaluate_scenario, EvaluationReport, RiskPolicy, ScenarioReport,
};
use levdesk_core::export::{export_positions_json, export_report_csv, import_positions_json};

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Positions,
    Scenario,
    Chart,
    Help,
}

impl Panel {
    pub fn index(self) -> usize {
        match self {
            Panel::Positions => 0,
            Panel::Scenario => 1,
            Panel::Chart => 2,
            Panel::Help => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Positions),
            1 => Some(Panel::Scenario),
            2 => Some(Panel::Chart),
            3 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Positions => "Positions",
            Panel::Scenario => "Scenario",
            Panel::Chart => "Chart",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % 4).unwrap()
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + 3) % 4).unwrap()
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Field cursor in the edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Coin,
    Margin,
    Leverage,
    StopLoss,
    TakeProfit,
    Direction,
}

impl EditField {
    pub const ALL: [EditField; 6] = [
        EditField::Coin,
        EditField::Margin,
        EditField::Leverage,
        EditField::StopLoss,
        EditField::TakeProfit,
        EditField::Direction,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EditField::Coin => "Coin",
            EditField::Margin => "Margin ($)",
            EditField::Leverage => "Leverage (x)",
            EditField::StopLoss => "Stop-Loss %",
            EditField::TakeProfit => "Take-Profit %",
            EditField::Direction => "Direction",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap()
    }

    pub fn next(self) -> EditField {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> EditField {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// In-progress edit of one position. Commits back into the session on
/// save; Esc discards the draft.
#[derive(Debug, Clone)]
pub struct EditForm {
    /// Session index of the position being edited.
    pub index: usize,
    pub draft: Position,
    pub field: EditField,
    /// Text buffer for the selected field.
    pub buffer: String,
}

impl EditForm {
    pub fn new(index: usize, position: &Position) -> Self {
        let mut form = Self {
            index,
            draft: position.clone(),
            field: EditField::Coin,
            buffer: String::new(),
        };
        form.load_buffer();
        form
    }

    fn fmt_opt(value: Option<f64>) -> String {
        value.map(|v| format!("{v}")).unwrap_or_default()
    }

    /// Fill the buffer from the selected field's current draft value.
    pub fn load_buffer(&mut self) {
        self.buffer = match self.field {
            EditField::Coin => self.draft.coin.clone(),
            EditField::Margin => format!("{}", self.draft.margin),
            EditField::Leverage => format!("{}", self.draft.leverage),
            EditField::StopLoss => Self::fmt_opt(self.draft.stop_loss_pct),
            EditField::TakeProfit => Self::fmt_opt(self.draft.take_profit_pct),
            EditField::Direction => self.draft.direction.label().to_string(),
        };
    }

    /// Parse the buffer into the draft. An empty threshold buffer clears it.
    pub fn commit_buffer(&mut self) -> Result<(), String> {
        let text = self.buffer.trim();
        match self.field {
            EditField::Coin => {
                if text.is_empty() {
                    return Err("coin symbol cannot be empty".into());
                }
                self.draft.coin = text.to_uppercase();
            }
            EditField::Margin => {
                self.draft.margin = text
                    .parse()
                    .map_err(|_| format!("not a number: {text:?}"))?;
            }
            EditField::Leverage => {
                self.draft.leverage = text
                    .parse()
                    .map_err(|_| format!("not a number: {text:?}"))?;
            }
            EditField::StopLoss => {
                self.draft.stop_loss_pct = if text.is_empty() {
                    None
                } else {
                    Some(text.parse().map_err(|_| format!("not a number: {text:?}"))?)
                };
            }
            EditField::TakeProfit => {
                self.draft.take_profit_pct = if text.is_empty() {
                    None
                } else {
                    Some(text.parse().map_err(|_| format!("not a number: {text:?}"))?)
                };
            }
            EditField::Direction => {} // toggled in place, buffer is display-only
        }
        Ok(())
    }

    /// Flip the direction (Direction field only).
    pub fn toggle_direction(&mut self) {
        self.draft.direction = match self.draft.direction {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        };
        if self.field == EditField::Direction {
            self.load_buffer();
        }
    }
}

/// Modal overlays, drawn on top of the active panel.
#[derive(Debug, Clone)]
pub enum Overlay {
    None,
    Edit(EditForm),
    ConfirmClear,
}

/// All TUI state.
pub struct AppState {
    pub running: bool,
    pub active_panel: Panel,
    pub overlay: Overlay,

    pub session: Session,
    pub coins: CoinMap,
    pub policy: RiskPolicy,
    /// Name of the provider that last answered a spot fetch.
    pub price_source: Option<String>,

    /// Cached engine output, refreshed by `recompute`.
    pub report: EvaluationReport,
    pub scenario: ScenarioReport,

    /// Cursor into `session.positions` (all entries, invalid included).
    pub cursor: usize,
    /// Cursor into the scenario coin list.
    pub scenario_cursor: usize,
    /// Cursor into the chart coin list.
    pub chart_cursor: usize,

    pub history: Option<HistorySeries>,
    history_symbol: Option<String>,

    pub status_message: Option<(String, StatusLevel)>,
    pub session_path: PathBuf,

    providers: Vec<Box<dyn PriceProvider>>,
}

impl AppState {
    pub fn new(session: Session, session_path: PathBuf) -> Self {
        let mut app = Self {
            running: true,
            active_panel: Panel::Positions,
            overlay: Overlay::None,
            session,
            coins: CoinMap::default(),
            policy: RiskPolicy::default(),
            price_source: None,
            report: EvaluationReport::default(),
            scenario: ScenarioReport::default(),
            cursor: 0,
            scenario_cursor: 0,
            chart_cursor: 0,
            history: None,
            history_symbol: None,
            status_message: None,
            session_path,
            providers: vec![
                Box::new(PaprikaProvider::new()),
                Box::new(GeckoProvider::new()),
            ],
        };
        app.recompute();
        app
    }

    /// Test constructor with injected providers.
    #[cfg(test)]
    pub fn with_providers(
        session: Session,
        session_path: PathBuf,
        providers: Vec<Box<dyn PriceProvider>>,
    ) -> Self {
        let mut app = Self::new(session, session_path);
        app.providers = providers;
        app
    }

    pub fn set_status(&mut self, msg: impl Into<String>, level: StatusLevel) {
        self.status_message = Some((msg.into(), level));
    }

    /// Re-run the engine after any session mutation and keep cursors in
    /// bounds.
    pub fn recompute(&mut self) {
        self.report = evaluate(&self.session, &self.coins, &self.policy);
        self.scenario = evaluate_scenario(&self.session);

        let n = self.session.positions.len();
        if n == 0 {
            self.cursor = 0;
        } else if self.cursor >= n {
            self.cursor = n - 1;
        }
        let coins = self.session.coins().len();
        if coins == 0 {
            self.scenario_cursor = 0;
            self.chart_cursor = 0;
        } else {
            self.scenario_cursor = self.scenario_cursor.min(coins - 1);
            self.chart_cursor = self.chart_cursor.min(coins - 1);
        }
    }

    /// Blocking spot-price refresh through the fallback chain. Failure is
    /// a status-bar message; last-known prices stay usable.
    pub fn refresh_prices(&mut self) {
        let refs: Vec<&dyn PriceProvider> = self.providers.iter().map(|p| p.as_ref()).collect();
        let fetch = fetch_spot_prices(&refs, 50);

        if fetch.failed() {
            let detail = fetch
                .errors
                .iter()
                .map(|(name, e)| format!("{name}: {e}"))
                .collect::<Vec<_>>()
                .join("; ");
            self.set_status(format!("price fetch failed — {detail}"), StatusLevel::Error);
        } else {
            self.coins.merge_prices(fetch.coins);
            self.price_source = fetch.source.clone();
            self.set_status(
                format!("prices updated from {}", fetch.source.unwrap_or_default()),
                StatusLevel::Info,
            );
        }
        self.recompute();
    }

    /// Coin symbol under the chart cursor.
    pub fn chart_symbol(&self) -> Option<String> {
        self.session
            .coins()
            .get(self.chart_cursor)
            .map(|s| s.to_string())
    }

    /// Fetch the history series for the chart coin if it changed.
    pub fn ensure_history(&mut self) {
        let Some(symbol) = self.chart_symbol() else {
            self.history = None;
            self.history_symbol = None;
            return;
        };
        if self.history_symbol.as_deref() == Some(symbol.as_str()) {
            return;
        }

        let series = match self.coins.get(&symbol) {
            Some(info) => {
                fetch_history(self.providers[0].as_ref(), &info.id, DEFAULT_HISTORY_DAYS)
            }
            None => {
                let mut s = sample_history(&symbol, DEFAULT_HISTORY_DAYS);
                s.error = Some(format!("unknown coin symbol: {symbol}"));
                s
            }
        };
        if let Some(err) = &series.error {
            self.set_status(format!("history unavailable — {err}"), StatusLevel::Warning);
        }
        self.history = Some(series);
        self.history_symbol = Some(symbol);
    }

    /// Force a refetch of the current chart coin.
    pub fn reload_history(&mut self) {
        self.history_symbol = None;
        self.ensure_history();
    }

    // ── Position store operations ────────────────────────────────────

    pub fn add_position(&mut self) {
        let coin = self
            .coins
            .symbols()
            .next()
            .unwrap_or("BTC")
            .to_string();
        self.session.add(Position::blank(coin));
        self.cursor = 0;
        self.recompute();
        // Drop straight into the edit form for the new entry.
        self.overlay = Overlay::Edit(EditForm::new(0, &self.session.positions[0]));
    }

    pub fn remove_selected(&mut self) {
        if self.session.positions.is_empty() {
            return;
        }
        self.session.remove(self.cursor);
        self.recompute();
        self.set_status("position removed", StatusLevel::Info);
    }

    pub fn clear_positions(&mut self) {
        self.session.clear();
        self.recompute();
        self.set_status("all positions cleared", StatusLevel::Info);
    }

    /// Apply a finished edit form back into the session.
    pub fn apply_edit(&mut self, form: &EditForm) {
        if let Some(slot) = self.session.positions.get_mut(form.index) {
            *slot = form.draft.clone();
            if let Err(reason) = form.draft.validate() {
                self.set_status(
                    format!("position saved but excluded: {reason}"),
                    StatusLevel::Warning,
                );
            } else {
                self.set_status("position saved", StatusLevel::Info);
            }
        }
        self.recompute();
    }

    // ── Export / import ──────────────────────────────────────────────

    pub fn export_csv(&mut self, path: &std::path::Path) {
        match export_report_csv(&self.report.rows)
            .and_then(|csv| std::fs::write(path, csv).map_err(Into::into))
        {
            Ok(()) => self.set_status(
                format!("exported {} rows to {}", self.report.rows.len(), path.display()),
                StatusLevel::Info,
            ),
            Err(e) => self.set_status(format!("CSV export failed: {e}"), StatusLevel::Error),
        }
    }

    pub fn save_positions(&mut self, path: &std::path::Path) {
        match export_positions_json(&self.session.positions)
            .and_then(|json| std::fs::write(path, json).map_err(Into::into))
        {
            Ok(()) => self.set_status(
                format!("positions saved to {}", path.display()),
                StatusLevel::Info,
            ),
            Err(e) => self.set_status(format!("save failed: {e}"), StatusLevel::Error),
        }
    }

    pub fn load_positions(&mut self, path: &std::path::Path) {
        let result = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|json| import_positions_json(&json));
        match result {
            Ok(positions) => {
                let count = positions.len();
                self.session.positions = positions;
                self.cursor = 0;
                self.recompute();
                self.set_status(format!("loaded {count} positions"), StatusLevel::Info);
            }
            Err(e) => self.set_status(format!("load failed: {e}"), StatusLevel::Error),
        }
    }

    // ── Scenario operations ──────────────────────────────────────────

    /// Coin symbol under the scenario cursor.
    pub fn scenario_symbol(&self) -> Option<String> {
        self.session
            .coins()
            .get(self.scenario_cursor)
            .map(|s| s.to_string())
    }

    pub fn nudge_move(&mut self, delta: f64) {
        if let Some(symbol) = self.scenario_symbol() {
            let current = self.session.move_for(&symbol);
            self.session.set_move(&symbol, current + delta);
            self.recompute();
        }
    }

    pub fn reset_moves(&mut self) {
        self.session.reset_moves();
        self.recompute();
        self.set_status("scenario moves reset to zero", StatusLevel::Info);
    }

    /// Adjust the maintenance margin within the original app's 0.1-5.0%
    /// bounds.
    pub fn nudge_maintenance_margin(&mut self, delta: f64) {
        let mm = (self.session.maintenance_margin_pct + delta).clamp(0.1, 5.0);
        self.session.maintenance_margin_pct = mm;
        self.recompute();
        self.set_status(
            format!("maintenance margin: {mm:.1}%"),
            StatusLevel::Info,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levdesk_core::data::{PriceError, PricePoint};
    use std::path::PathBuf;

    struct StubProvider;

    impl PriceProvider for StubProvider {
        fn name(&self) -> &str {
            "Stub"
        }
        fn top_coins(&self, _limit: usize) -> Result<CoinMap, PriceError> {
            Ok(CoinMap::new(vec![levdesk_core::domain::CoinInfo {
                symbol: "BTC".into(),
                id: "btc-bitcoin".into(),
                price_usd: 10_000.0,
            }]))
        }
        fn history(&self, _coin_id: &str, _days: u32) -> Result<Vec<PricePoint>, PriceError> {
            Err(PriceError::Network("stub".into()))
        }
    }

    fn app() -> AppState {
        AppState::with_providers(
            Session::default(),
            PathBuf::from("/tmp/levdesk-test.json"),
            vec![Box::new(StubProvider)],
        )
    }

    #[test]
    fn keeps_the_session_path_for_the_exit_save() {
        let a = app();
        assert_eq!(a.session_path, PathBuf::from("/tmp/levdesk-test.json"));
    }

    #[test]
    fn panel_cycle_wraps() {
        assert_eq!(Panel::Help.next(), Panel::Positions);
        assert_eq!(Panel::Positions.prev(), Panel::Help);
    }

    #[test]
    fn add_opens_edit_overlay_on_new_entry() {
        let mut a = app();
        a.add_position();
        assert_eq!(a.session.positions.len(), 1);
        match &a.overlay {
            Overlay::Edit(form) => assert_eq!(form.index, 0),
            other => panic!("expected edit overlay, got {other:?}"),
        }
    }

    #[test]
    fn edit_form_parses_and_applies() {
        let mut a = app();
        a.add_position();

        let mut form = match std::mem::replace(&mut a.overlay, Overlay::None) {
            Overlay::Edit(form) => form,
            _ => unreachable!(),
        };
        form.field = EditField::Margin;
        form.buffer = "100".into();
        form.commit_buffer().unwrap();
        form.field = EditField::Leverage;
        form.buffer = "10".into();
        form.commit_buffer().unwrap();

        a.apply_edit(&form);
        assert_eq!(a.report.rows.len(), 1);
        assert_eq!(a.report.rows[0].notional_usd, 1000.0);
    }

    #[test]
    fn edit_form_rejects_garbage_numbers() {
        let p = Position::blank("BTC");
        let mut form = EditForm::new(0, &p);
        form.field = EditField::Margin;
        form.buffer = "ten dollars".into();
        assert!(form.commit_buffer().is_err());
    }

    #[test]
    fn empty_threshold_buffer_clears_it() {
        let mut p = Position::blank("BTC");
        p.stop_loss_pct = Some(5.0);
        let mut form = EditForm::new(0, &p);
        form.field = EditField::StopLoss;
        form.buffer = "".into();
        form.commit_buffer().unwrap();
        assert_eq!(form.draft.stop_loss_pct, None);
    }

    #[test]
    fn cursor_stays_in_bounds_after_removal() {
        let mut a = app();
        a.session.positions = vec![Position::blank("BTC"), Position::blank("ETH")];
        a.recompute();
        a.cursor = 1;
        a.remove_selected();
        assert_eq!(a.cursor, 0);
        a.remove_selected();
        assert_eq!(a.cursor, 0);
        a.remove_selected(); // empty, no-op
        assert!(a.session.is_empty());
    }

    #[test]
    fn refresh_merges_prices_and_recomputes() {
        let mut a = app();
        a.session.positions = vec![{
            let mut p = Position::blank("BTC");
            p.margin = 100.0;
            p.leverage = 2.0;
            p
        }];
        a.refresh_prices();
        assert_eq!(a.price_source.as_deref(), Some("Stub"));
        assert_eq!(a.report.rows[0].price_usd, Some(10_000.0));
    }

    #[test]
    fn history_failure_degrades_to_sample() {
        let mut a = app();
        a.session.positions = vec![{
            let mut p = Position::blank("BTC");
            p.margin = 1.0;
            p.leverage = 1.0;
            p
        }];
        a.refresh_prices();
        a.ensure_history();
        let series = a.history.as_ref().unwrap();
        assert_eq!(
            series.source,
            levdesk_core::data::HistorySource::Sample
        );
        assert!(series.error.is_some());
    }

    #[test]
    fn maintenance_margin_clamped() {
        let mut a = app();
        a.nudge_maintenance_margin(100.0);
        assert_eq!(a.session.maintenance_margin_pct, 5.0);
        a.nudge_maintenance_margin(-100.0);
        assert_eq!(a.session.maintenance_margin_pct, 0.1);
    }
}
