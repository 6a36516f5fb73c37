//! Calculation engine — pure functions over validated positions.

pub mod metrics;
pub mod risk;
pub mod scenario;

pub use metrics::{evaluate, EvaluationReport, PortfolioSummary, PositionReport};
pub use risk::{PolicyError, RiskPolicy, RiskTier};
pub use scenario::{evaluate_scenario, CloseReason, CoinScenario, ScenarioReport};
