//! End-to-end backtest scenarios over constructed tick streams.

use algo_catalyst::backtest::{read_trades_csv, write_trades_csv, BacktestConfig, Backtester};
use algo_catalyst::regime::{Regime, RegimeClassifier, RegimeConfig};
use algo_catalyst::strategy::NewsMomentumStrategy;
use algo_catalyst::Tick;
use std::cell::RefCell;
use std::rc::Rc;

const SECOND_US: i64 = 1_000_000;
const LATENCY_US: i64 = 200_000;

fn tick(second: i64, price: f64, volume: i64, bid: f64, ask: f64) -> Tick {
    Tick {
        timestamp_us: second * SECOND_US,
        price,
        volume,
        bid_size: bid,
        ask_size: ask,
    }
}

/// Alternating +6% / -2% uptrend: high volatility and directed movement,
/// but no volume spike, no 10% gap, and a flat order book
fn warm_ramp(len: usize) -> (Vec<Tick>, f64) {
    let mut ticks = Vec::with_capacity(len);
    let mut price = 100.0;
    for i in 0..len {
        price *= if i % 2 == 0 { 1.06 } else { 0.98 };
        ticks.push(tick(i as i64, price, 100, 100.0, 100.0));
    }
    (ticks, price)
}

/// Ramp, then a catalyst tick at second 120 that satisfies every entry
/// gate: 12% gap, 50x volume, 2:1 book, TRENDING regime
fn catalyst_stream(hold_ticks: usize, with_crash: bool) -> Vec<Tick> {
    let (mut ticks, mut price) = warm_ramp(120);

    price *= 1.12;
    ticks.push(tick(120, price, 5_000, 200.0, 100.0));

    for j in 0..hold_ticks {
        price *= 1.01;
        ticks.push(tick(121 + j as i64, price, 100, 100.0, 100.0));
    }

    if with_crash {
        let next = 121 + hold_ticks as i64;
        // Far below VWAP: triggers the exit disjunction
        ticks.push(tick(next, 200.0, 100, 100.0, 100.0));
        ticks.push(tick(next + 1, 205.0, 100, 100.0, 100.0));
    }

    ticks
}

fn run_news_momentum(ticks: Vec<Tick>, latency_ms: f64) -> Backtester {
    let mut backtester = Backtester::new(BacktestConfig {
        latency_ms,
        ..BacktestConfig::default()
    });
    backtester.load_ticks("TICKER", ticks);
    let symbol = backtester.intern_symbol("TICKER");
    let classifier = Rc::new(RefCell::new(RegimeClassifier::new(RegimeConfig::default())));
    backtester.register_strategy("TICKER", Box::new(NewsMomentumStrategy::new(symbol, classifier)));
    backtester.run();
    backtester
}

// An empty tick stream is a valid run.
#[test]
fn empty_tick_stream_produces_no_trades() {
    let backtester = run_news_momentum(Vec::new(), 200.0);
    assert_eq!(backtester.num_trades(), 0);
    assert_eq!(backtester.total_pnl(), 0.0);
}

// The regime stays CHOPPY below 20 ticks, so even extreme catalyst
// ticks cannot open a position during classifier warm-up.
#[test]
fn warmup_ticks_never_trade() {
    let mut ticks = Vec::new();
    let mut price = 100.0;
    let mut volume = 100;
    for i in 0..19 {
        price *= 1.12;
        volume *= 3;
        ticks.push(tick(i, price, volume, 200.0, 100.0));
    }

    let backtester = run_news_momentum(ticks, 200.0);
    assert_eq!(backtester.num_trades(), 0);
    assert_eq!(backtester.total_pnl(), 0.0);
}

// One full round trip through the signal/order/fill pipeline.
#[test]
fn single_round_trip_with_latency() {
    let ticks = catalyst_stream(5, true);
    let entry_fill_price = ticks[121].price;
    let exit_fill_price = ticks[127].price;

    let backtester = run_news_momentum(ticks, 200.0);

    assert_eq!(backtester.num_trades(), 1);
    let trade = &backtester.trade_log()[0];

    // Entry: signal at second 120, filled 200ms later at tick 121's price
    assert_eq!(trade.entry_timestamp_us, 120 * SECOND_US + LATENCY_US);
    assert_eq!(trade.entry_price, entry_fill_price);

    // Exit: VWAP break at second 126, filled 200ms later at tick 127's price
    assert_eq!(trade.exit_timestamp_us, 126 * SECOND_US + LATENCY_US);
    assert_eq!(trade.exit_price, exit_fill_price);

    // 100 base size scaled by the 1.5 TRENDING multiplier
    assert_eq!(trade.quantity, 150.0);
    assert_eq!(trade.regime, Regime::Trending);

    let expected_pnl = (exit_fill_price - entry_fill_price) * 150.0;
    assert!((trade.pnl - expected_pnl).abs() < 1e-9);
    assert!((backtester.total_pnl() - expected_pnl).abs() < 1e-9);

    // Signal-driven round trip spans at least twice the latency
    assert!(trade.exit_timestamp_us - trade.entry_timestamp_us >= 2 * LATENCY_US);
}

// No exit trigger before end of stream: the position is force-closed
// at the last tick.
#[test]
fn open_position_is_force_closed_at_end_of_stream() {
    let ticks = catalyst_stream(5, false);
    let entry_fill_price = ticks[121].price;
    let last = *ticks.last().unwrap();

    let backtester = run_news_momentum(ticks, 200.0);

    assert_eq!(backtester.num_trades(), 1);
    let trade = &backtester.trade_log()[0];
    assert_eq!(trade.entry_timestamp_us, 120 * SECOND_US + LATENCY_US);
    assert_eq!(trade.exit_timestamp_us, last.timestamp_us);
    assert_eq!(trade.exit_price, last.price);

    let expected_pnl = (last.price - entry_fill_price) * 150.0;
    assert!((trade.pnl - expected_pnl).abs() < 1e-9);
}

// With zero latency, fills share timestamps with their signals and FIFO
// ordering drains Signal -> Order -> Fill within the same microsecond.
#[test]
fn zero_latency_fills_at_signal_tick() {
    let ticks = catalyst_stream(5, true);
    let catalyst_price = ticks[120].price;
    let crash_price = ticks[126].price;

    let backtester = run_news_momentum(ticks, 0.0);

    assert_eq!(backtester.num_trades(), 1);
    let trade = &backtester.trade_log()[0];

    assert_eq!(trade.entry_timestamp_us, 120 * SECOND_US);
    assert_eq!(trade.entry_price, catalyst_price);
    assert_eq!(trade.exit_timestamp_us, 126 * SECOND_US);
    assert_eq!(trade.exit_price, crash_price);

    let expected_pnl = (crash_price - catalyst_price) * 150.0;
    assert!((trade.pnl - expected_pnl).abs() < 1e-9);
}

// Regime flip mid-position. After entry, a steady 3% creep keeps the
// VWAP and MACD exit legs quiet (price above VWAP, histogram positive)
// while the rolling window drains of volatility; a periodic burst of high
// volume keeps the k-means clusters separated so the CHOPPY flip is not
// sensitive to float noise. The exit must fire on exactly the flip tick.
#[test]
fn regime_flip_to_choppy_forces_exit() {
    let (mut ticks, mut price) = warm_ramp(120);
    price *= 1.12;
    ticks.push(tick(120, price, 5_000, 200.0, 100.0));
    for j in 0..200 {
        price *= 1.03;
        let volume = if j % 10 == 9 { 1_000 } else { 100 };
        ticks.push(tick(121 + j, price, volume, 100.0, 100.0));
    }

    // Mirror the strategy's classifier over the same stream to locate the
    // first post-entry CHOPPY tick
    let mut mirror = RegimeClassifier::new(RegimeConfig::default());
    let mut flip_index = None;
    for (i, t) in ticks.iter().enumerate() {
        let regime = mirror.update_and_classify(t);
        if i >= 121 && regime == Regime::Choppy {
            flip_index = Some(i);
            break;
        }
    }
    let flip_index = flip_index.expect("flood must eventually flip the regime to CHOPPY");
    assert!(flip_index + 1 < ticks.len(), "need a tick after the flip for the fill");

    let flip_ts = ticks[flip_index].timestamp_us;
    let exit_fill_price = ticks[flip_index + 1].price;
    let entry_fill_price = ticks[121].price;

    let backtester = run_news_momentum(ticks, 200.0);

    assert_eq!(backtester.num_trades(), 1);
    let trade = &backtester.trade_log()[0];
    assert_eq!(trade.regime, Regime::Trending);
    assert_eq!(trade.entry_timestamp_us, 120 * SECOND_US + LATENCY_US);
    assert_eq!(trade.exit_timestamp_us, flip_ts + LATENCY_US);
    assert_eq!(trade.exit_price, exit_fill_price);

    let expected_pnl = (exit_fill_price - entry_fill_price) * 150.0;
    assert!((trade.pnl - expected_pnl).abs() < 1e-9);
}

// Entry predicate never satisfied: the ramp alone yields zero trades
#[test]
fn stream_without_catalyst_never_trades() {
    let (ticks, _) = warm_ramp(200);
    let backtester = run_news_momentum(ticks, 200.0);
    assert_eq!(backtester.num_trades(), 0);
}

// Entry at the very last tick: the fill falls back to the order price and
// the force-close books one flat trade at that same tick
#[test]
fn entry_at_last_tick_force_closes_flat() {
    let (mut ticks, mut price) = warm_ramp(120);
    price *= 1.12;
    ticks.push(tick(120, price, 5_000, 200.0, 100.0));

    let backtester = run_news_momentum(ticks, 200.0);

    assert_eq!(backtester.num_trades(), 1);
    let trade = &backtester.trade_log()[0];
    assert_eq!(trade.entry_price, price);
    assert_eq!(trade.exit_price, price);
    assert_eq!(trade.exit_timestamp_us, 120 * SECOND_US);
    assert_eq!(trade.pnl, 0.0);
}

// Determinism: identical inputs produce byte-identical trade logs
#[test]
fn reprocessing_is_bit_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first_path = dir.path().join("run1.csv");
    let second_path = dir.path().join("run2.csv");

    let first = run_news_momentum(catalyst_stream(5, true), 200.0);
    let second = run_news_momentum(catalyst_stream(5, true), 200.0);

    write_trades_csv(&first_path, first.trade_log()).unwrap();
    write_trades_csv(&second_path, second.trade_log()).unwrap();

    let a = std::fs::read(&first_path).unwrap();
    let b = std::fs::read(&second_path).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

// Serialised trade logs reload and re-serialise byte-identically
#[test]
fn trade_log_round_trips_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    let first_path = dir.path().join("trades.csv");
    let second_path = dir.path().join("reloaded.csv");

    let backtester = run_news_momentum(catalyst_stream(5, true), 200.0);
    write_trades_csv(&first_path, backtester.trade_log()).unwrap();

    let reloaded = read_trades_csv(&first_path).unwrap();
    write_trades_csv(&second_path, &reloaded).unwrap();

    assert_eq!(
        std::fs::read(&first_path).unwrap(),
        std::fs::read(&second_path).unwrap()
    );
}

// Net-of-commission accounting subtracts round-trip commission from PnL
#[test]
fn net_of_commission_reduces_pnl() {
    let run = |net: bool| {
        let mut backtester = Backtester::new(BacktestConfig {
            net_of_commission: net,
            ..BacktestConfig::default()
        });
        backtester.load_ticks("TICKER", catalyst_stream(5, true));
        let symbol = backtester.intern_symbol("TICKER");
        let classifier = Rc::new(RefCell::new(RegimeClassifier::new(RegimeConfig::default())));
        backtester
            .register_strategy("TICKER", Box::new(NewsMomentumStrategy::new(symbol, classifier)));
        backtester.run();
        backtester
    };

    let gross = run(false);
    let net = run(true);
    assert_eq!(gross.num_trades(), 1);
    assert_eq!(net.num_trades(), 1);

    let commission = gross.trade_log()[0].commission;
    assert!(commission > 0.0);
    assert!((gross.total_pnl() - net.total_pnl() - commission).abs() < 1e-9);
}
