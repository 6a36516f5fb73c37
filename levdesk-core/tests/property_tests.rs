//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Notional size is exactly margin x leverage
//! 2. Risk classification is monotonic non-decreasing in leverage
//! 3. Scenario PnL is linear in the move until a threshold, then clamped
//! 4. CSV exports N valid positions as N data rows plus one header

use proptest::prelude::*;

use levdesk_core::domain::{Direction, Position};
use levdesk_core::engine::scenario::position_outcome;
use levdesk_core::engine::{CloseReason, RiskPolicy};
use levdesk_core::export::export_report_csv;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_margin() -> impl Strategy<Value = f64> {
    (0.01..100_000.0_f64).prop_map(|m| (m * 100.0).round() / 100.0)
}

fn arb_leverage() -> impl Strategy<Value = f64> {
    (0.1..125.0_f64).prop_map(|l| (l * 10.0).round() / 10.0)
}

fn arb_threshold() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        Just(None),
        (1.0..100.0_f64).prop_map(|t| Some(t.round())),
    ]
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Long), Just(Direction::Short)]
}

fn arb_position() -> impl Strategy<Value = Position> {
    (
        arb_margin(),
        arb_leverage(),
        arb_threshold(),
        arb_threshold(),
        arb_direction(),
    )
        .prop_map(|(margin, leverage, sl, tp, direction)| Position {
            coin: "BTC".into(),
            margin,
            leverage,
            stop_loss_pct: sl,
            take_profit_pct: tp,
            direction,
        })
}

// ── 1. Notional exactness ────────────────────────────────────────────

proptest! {
    #[test]
    fn notional_is_margin_times_leverage(m in arb_margin(), l in arb_leverage()) {
        let p = Position {
            coin: "BTC".into(),
            margin: m,
            leverage: l,
            stop_loss_pct: None,
            take_profit_pct: None,
            direction: Direction::Long,
        };
        prop_assert!(p.is_valid());
        prop_assert_eq!(p.notional(), m * l);
    }
}

// ── 2. Risk monotonicity ─────────────────────────────────────────────

proptest! {
    /// For fixed stop-loss presence, higher leverage never classifies lower.
    #[test]
    fn risk_monotone_in_leverage(
        a in arb_leverage(),
        b in arb_leverage(),
        has_sl in any::<bool>(),
    ) {
        let policy = RiskPolicy::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(policy.classify(lo, has_sl) <= policy.classify(hi, has_sl));
    }

    /// A stop-loss never makes the classification worse.
    #[test]
    fn stop_loss_never_raises_risk(l in arb_leverage()) {
        let policy = RiskPolicy::default();
        prop_assert!(policy.classify(l, true) <= policy.classify(l, false));
    }
}

// ── 3. Scenario linearity and clamping ───────────────────────────────

proptest! {
    /// Without thresholds, PnL is exactly notional * move% * direction.
    #[test]
    fn pnl_linear_without_thresholds(
        m in arb_margin(),
        l in arb_leverage(),
        mv in -50.0..50.0_f64,
        dir in arb_direction(),
    ) {
        let p = Position {
            coin: "BTC".into(),
            margin: m,
            leverage: l,
            stop_loss_pct: None,
            take_profit_pct: None,
            direction: dir,
        };
        let outcome = position_outcome(&p, mv).unwrap();
        let expected = p.notional() * mv * dir.sign() / 100.0;
        prop_assert!((outcome.pnl - expected).abs() <= expected.abs() * 1e-12 + 1e-12);
        prop_assert_eq!(outcome.closed_by, None);
    }

    /// With thresholds, PnL is bounded by them and the close reason is
    /// consistent with which bound was hit.
    #[test]
    fn pnl_clamped_at_thresholds(p in arb_position(), mv in -50.0..50.0_f64) {
        let outcome = match position_outcome(&p, mv) {
            Some(o) => o,
            None => return Ok(()), // invalid positions are out of scope here
        };

        let notional = p.notional();
        if let Some(sl) = p.stop_loss_pct {
            prop_assert!(outcome.pnl >= -notional * sl / 100.0 - 1e-9);
        }
        if let Some(tp) = p.take_profit_pct {
            prop_assert!(outcome.pnl <= notional * tp / 100.0 + 1e-9);
        }

        let gain_pct = mv * p.direction.sign();
        match outcome.closed_by {
            Some(CloseReason::StopLoss) => {
                prop_assert!(gain_pct <= -p.stop_loss_pct.unwrap());
            }
            Some(CloseReason::TakeProfit) => {
                prop_assert!(gain_pct >= p.take_profit_pct.unwrap());
            }
            None => {
                if let Some(sl) = p.stop_loss_pct {
                    prop_assert!(gain_pct > -sl);
                }
                if let Some(tp) = p.take_profit_pct {
                    prop_assert!(gain_pct < tp);
                }
            }
        }
    }
}

// ── 4. CSV shape ─────────────────────────────────────────────────────

proptest! {
    /// N valid positions -> N data rows + 1 header, stable column order.
    #[test]
    fn csv_row_count_matches_valid_positions(positions in prop::collection::vec(arb_position(), 0..20)) {
        use levdesk_core::domain::{CoinMap, Session};
        use levdesk_core::engine::evaluate;

        let mut session = Session::default();
        session.positions = positions.clone();

        let report = evaluate(&session, &CoinMap::default(), &RiskPolicy::default());
        let valid = positions.iter().filter(|p| p.is_valid()).count();
        prop_assert_eq!(report.rows.len(), valid);

        let csv = export_report_csv(&report.rows).unwrap();
        prop_assert_eq!(csv.lines().count(), valid + 1);
    }
}
