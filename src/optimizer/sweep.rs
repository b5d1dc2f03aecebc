//! Sequential and parallel parameter sweeps.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::backtest::{BacktestConfig, PerformanceMetrics, backtest, compute_metrics};
use crate::frame::{Column, Table};
use crate::strategy::Strategy;

use super::grid::{ParamGrid, ParamValue};
use super::{OptimizerError, Result};

// ── Strategy construction from grid parameters ───────────────────────────────

/// Which strategy family a sweep drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// SMA crossover; parameters `fast`, `slow`
    SmaCross,
    /// EMA crossover; parameters `fast`, `slow`
    EmaCross,
    /// MACD crossover; parameters `fast`, `slow`, `signal` (defaults 12/26/9)
    MacdCross,
    /// RSI threshold; parameters `period`, `oversold`, `overbought`
    /// (defaults 14/30/70)
    RsiThreshold,
}

impl StrategyKind {
    fn tag(self) -> &'static str {
        match self {
            StrategyKind::SmaCross => "sma_crossover",
            StrategyKind::EmaCross => "ema_crossover",
            StrategyKind::MacdCross => "macd_crossover",
            StrategyKind::RsiThreshold => "rsi_threshold",
        }
    }

    fn known_keys(self) -> &'static [&'static str] {
        match self {
            StrategyKind::SmaCross | StrategyKind::EmaCross => &["fast", "slow"],
            StrategyKind::MacdCross => &["fast", "slow", "signal"],
            StrategyKind::RsiThreshold => &["period", "oversold", "overbought"],
        }
    }

    fn required_keys(self) -> &'static [&'static str] {
        match self {
            StrategyKind::SmaCross | StrategyKind::EmaCross => &["fast", "slow"],
            // MACD and RSI parameters have conventional defaults.
            StrategyKind::MacdCross | StrategyKind::RsiThreshold => &[],
        }
    }
}

/// Reject parameter names the strategy kind does not recognize, and require
/// the ones it cannot default. Structural — identical for every combination,
/// so it runs once before the sweep starts.
fn validate_keys(kind: StrategyKind, names: &[String]) -> Result<()> {
    for name in names {
        if !kind.known_keys().contains(&name.as_str()) {
            return Err(OptimizerError::UnknownOption { key: name.clone() });
        }
    }
    for required in kind.required_keys() {
        if !names.iter().any(|n| n == required) {
            return Err(OptimizerError::MissingParam {
                key: (*required).to_string(),
                kind: kind.tag().to_string(),
            });
        }
    }
    Ok(())
}

fn lookup(names: &[String], combo: &[ParamValue], key: &str) -> Option<ParamValue> {
    names.iter().position(|n| n == key).map(|i| combo[i])
}

fn period_param(
    names: &[String],
    combo: &[ParamValue],
    key: &str,
    default: usize,
) -> std::result::Result<usize, String> {
    match lookup(names, combo, key) {
        None => Ok(default),
        Some(value) => {
            let v = value.as_int();
            if v < 1 {
                Err(format!("parameter '{key}' must be at least 1, got {v}"))
            } else {
                Ok(v as usize)
            }
        }
    }
}

/// Build the concrete strategy for one grid point.
///
/// Key names were validated up front; what can still fail here is
/// value-dependent (a non-positive period from a hostile range), and such
/// failures are per-combination — the sweep drops them.
fn build_strategy(
    kind: StrategyKind,
    names: &[String],
    combo: &[ParamValue],
    price_col: &str,
) -> std::result::Result<Strategy, String> {
    let strategy = match kind {
        StrategyKind::SmaCross => Strategy::sma_crossover(
            period_param(names, combo, "fast", 0)?,
            period_param(names, combo, "slow", 0)?,
        ),
        StrategyKind::EmaCross => Strategy::ema_crossover(
            period_param(names, combo, "fast", 0)?,
            period_param(names, combo, "slow", 0)?,
        ),
        StrategyKind::MacdCross => Strategy::macd_crossover(
            period_param(names, combo, "fast", 12)?,
            period_param(names, combo, "slow", 26)?,
            period_param(names, combo, "signal", 9)?,
        ),
        StrategyKind::RsiThreshold => Strategy::rsi_threshold(
            period_param(names, combo, "period", 14)?,
            lookup(names, combo, "oversold").map_or(30.0, |v| v.as_float()),
            lookup(names, combo, "overbought").map_or(70.0, |v| v.as_float()),
        ),
    };
    Ok(strategy.with_price_col(price_col))
}

// ── Sweep options ────────────────────────────────────────────────────────────

type ProgressFn = Box<dyn Fn(usize)>;

/// Controls for [`run_combinations`] and [`run_combinations_parallel`].
pub struct SweepOptions {
    /// Worker-pool width for the parallel sweep (default: hardware threads)
    pub concurrency: usize,
    /// Per-combination wall-clock budget in the parallel sweep (default 30 s)
    pub timeout: Duration,
    /// Keep each surviving combination's full backtest table in the report
    pub store_backtest_data: bool,
    /// Backtest configuration applied to every combination; its `price_col`
    /// also selects the column the strategies read
    pub backtest: BacktestConfig,
    progress: Option<ProgressFn>,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism().map_or(1, usize::from),
            timeout: Duration::from_secs(30),
            store_backtest_data: false,
            backtest: BacktestConfig::default(),
            progress: None,
        }
    }
}

impl std::fmt::Debug for SweepOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepOptions")
            .field("concurrency", &self.concurrency)
            .field("timeout", &self.timeout)
            .field("store_backtest_data", &self.store_backtest_data)
            .field("backtest", &self.backtest)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl SweepOptions {
    /// Set the worker-pool width (must be at least 1).
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers;
        self
    }

    /// Set the per-combination timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the per-combination timeout in milliseconds.
    pub fn timeout_ms(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    /// Keep per-combination backtest tables in the report.
    pub fn store_backtest_data(mut self, store: bool) -> Self {
        self.store_backtest_data = store;
        self
    }

    /// Backtest configuration applied to every combination.
    pub fn backtest(mut self, config: BacktestConfig) -> Self {
        self.backtest = config;
        self
    }

    /// Install a progress callback.
    ///
    /// Receives `⌊100 · completed / total⌋` after each combination settles.
    /// Always invoked from the dispatching thread, never from a worker; a
    /// panicking callback is disarmed and logged, not propagated.
    pub fn on_progress(mut self, callback: impl Fn(usize) + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(OptimizerError::invalid_param(
                "concurrency",
                "must be at least 1",
            ));
        }
        if self.timeout.is_zero() {
            return Err(OptimizerError::invalid_param(
                "timeout_ms",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Outcome of a sweep.
#[derive(Debug)]
pub struct SweepReport {
    /// One row per surviving combination, in dispatch order: the parameter
    /// columns (grid order) followed by the metric columns
    pub results: Table,
    /// Combinations dropped due to execution errors or timeouts
    pub dropped: usize,
    /// Full backtest tables aligned with the result rows, when
    /// `store_backtest_data` was set
    pub backtests: Option<Vec<Table>>,
}

// ── Evaluation shared by both sweeps ─────────────────────────────────────────

/// Everything a worker needs to evaluate one combination. Tables share their
/// columns, so cloning this into the pool is cheap.
struct EvalContext {
    table: Table,
    kind: StrategyKind,
    names: Vec<String>,
    config: BacktestConfig,
    store: bool,
}

struct RowData {
    params: Vec<ParamValue>,
    metrics: PerformanceMetrics,
    backtest: Option<Table>,
}

fn evaluate(ctx: &EvalContext, combo: &[ParamValue]) -> std::result::Result<RowData, String> {
    let strategy = build_strategy(ctx.kind, &ctx.names, combo, &ctx.config.price_col)?;
    let backtested = backtest(&ctx.table, &strategy, &ctx.config).map_err(|e| e.to_string())?;
    let metrics = compute_metrics(&backtested).map_err(|e| e.to_string())?;
    Ok(RowData {
        params: combo.to_vec(),
        metrics,
        backtest: ctx.store.then_some(backtested),
    })
}

/// Assemble the result table: parameter columns in grid order, then the
/// fixed metric schema.
fn build_result_table(grid: &ParamGrid, rows: &[RowData]) -> Result<Table> {
    let names = grid.names();
    let mut table = Table::new();

    for (index, name) in names.iter().enumerate() {
        let column = if grid.is_int_param(index) {
            Column::from(
                rows.iter()
                    .map(|r| r.params[index].as_int())
                    .collect::<Vec<i64>>(),
            )
        } else {
            Column::from(
                rows.iter()
                    .map(|r| r.params[index].as_float())
                    .collect::<Vec<f64>>(),
            )
        };
        table.insert(name.clone(), column)?;
    }

    let float_metric = |pick: fn(&PerformanceMetrics) -> f64| -> Column {
        Column::from(rows.iter().map(|r| pick(&r.metrics)).collect::<Vec<f64>>())
    };
    table.insert("total_return".into(), float_metric(|m| m.total_return))?;
    table.insert(
        "annualized_return".into(),
        float_metric(|m| m.annualized_return),
    )?;
    table.insert("sharpe_ratio".into(), float_metric(|m| m.sharpe_ratio))?;
    table.insert("sortino_ratio".into(), float_metric(|m| m.sortino_ratio))?;
    table.insert("calmar_ratio".into(), float_metric(|m| m.calmar_ratio))?;
    table.insert("max_drawdown".into(), float_metric(|m| m.max_drawdown))?;
    table.insert("win_rate".into(), float_metric(|m| m.win_rate))?;
    table.insert(
        "trade_count".into(),
        Column::from(
            rows.iter()
                .map(|r| r.metrics.trade_count)
                .collect::<Vec<i64>>(),
        ),
    )?;
    table.insert("volatility".into(), float_metric(|m| m.volatility))?;
    Ok(table)
}

fn report_progress(progress: &Option<ProgressFn>, broken: &mut bool, completed: usize, total: usize) {
    let Some(callback) = progress else { return };
    if *broken {
        return;
    }
    let pct = 100 * completed / total;
    if catch_unwind(AssertUnwindSafe(|| callback(pct))).is_err() {
        tracing::warn!("progress callback panicked; disabling further reports");
        *broken = true;
    }
}

// ── Sequential sweep ─────────────────────────────────────────────────────────

/// Evaluate every grid combination sequentially on the calling thread.
///
/// Each combination runs signal generation, a backtest, and metric
/// extraction; failures are logged via `tracing` and dropped from the
/// results without aborting the sweep.
///
/// # Errors
///
/// [`OptimizerError::UnknownOption`] / [`OptimizerError::MissingParam`] for
/// a malformed grid, `InvalidParameter` for an empty one, and
/// [`OptimizerError::NoValidResults`] when every combination failed.
pub fn run_combinations(
    table: &Table,
    kind: StrategyKind,
    grid: &ParamGrid,
    opts: &SweepOptions,
) -> Result<SweepReport> {
    opts.validate()?;
    let names = grid.names();
    validate_keys(kind, &names)?;

    let total = grid.len();
    if total == 0 {
        return Err(OptimizerError::invalid_param(
            "params",
            "the grid expands to no combinations",
        ));
    }

    let ctx = EvalContext {
        table: table.clone(),
        kind,
        names,
        config: opts.backtest.clone(),
        store: opts.store_backtest_data,
    };

    let mut rows: Vec<RowData> = Vec::with_capacity(total);
    let mut dropped = 0_usize;
    let mut progress_broken = false;

    for (index, combo) in grid.combinations().enumerate() {
        match evaluate(&ctx, &combo) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                tracing::warn!(combination = index, %reason, "sweep: dropping combination");
                dropped += 1;
            }
        }
        report_progress(&opts.progress, &mut progress_broken, index + 1, total);
    }

    finish_report(grid, rows, dropped, opts.store_backtest_data)
}

// ── Parallel sweep ───────────────────────────────────────────────────────────

enum WorkerMsg {
    Started(usize),
    Finished(usize, Box<RowData>),
    Failed(usize, String),
}

enum Slot {
    Pending,
    Running(Instant),
    Done(Box<RowData>),
    Dropped,
}

/// Evaluate every grid combination on a dedicated worker pool.
///
/// Semantics match [`run_combinations`] with three additions:
///
/// - combinations run concurrently on `opts.concurrency` workers, each
///   owning its working tables (the input is shared read-only),
/// - a combination that exceeds `opts.timeout` is dropped; the worker
///   cannot be force-killed, so it is abandoned and its late result is
///   discarded when it eventually arrives,
/// - the progress callback fires on the calling (dispatching) thread as
///   combinations settle.
///
/// Result rows keep dispatch order, so a fixed grid yields a stably ordered
/// table across runs.
pub fn run_combinations_parallel(
    table: &Table,
    kind: StrategyKind,
    grid: &ParamGrid,
    opts: &SweepOptions,
) -> Result<SweepReport> {
    opts.validate()?;
    let names = grid.names();
    validate_keys(kind, &names)?;

    // Materialized so combinations can be handed to workers by index.
    let combos: Vec<Vec<ParamValue>> = grid.combinations().collect();
    let total = combos.len();
    if total == 0 {
        return Err(OptimizerError::invalid_param(
            "params",
            "the grid expands to no combinations",
        ));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.concurrency)
        .panic_handler(|_| tracing::error!("sweep worker panicked"))
        .build()
        .map_err(|e| OptimizerError::invalid_param("concurrency", e.to_string()))?;

    let ctx = Arc::new(EvalContext {
        table: table.clone(),
        kind,
        names,
        config: opts.backtest.clone(),
        store: opts.store_backtest_data,
    });

    let (tx, rx) = mpsc::channel::<WorkerMsg>();
    for (index, combo) in combos.into_iter().enumerate() {
        let tx = tx.clone();
        let ctx = Arc::clone(&ctx);
        pool.spawn(move || {
            let _ = tx.send(WorkerMsg::Started(index));
            let outcome = catch_unwind(AssertUnwindSafe(|| evaluate(&ctx, &combo)));
            let msg = match outcome {
                Ok(Ok(row)) => WorkerMsg::Finished(index, Box::new(row)),
                Ok(Err(reason)) => WorkerMsg::Failed(index, reason),
                Err(_) => WorkerMsg::Failed(index, "worker panicked".to_string()),
            };
            let _ = tx.send(msg);
        });
    }
    drop(tx);

    let mut slots: Vec<Slot> = (0..total).map(|_| Slot::Pending).collect();
    let mut completed = 0_usize;
    let mut dropped = 0_usize;
    let mut progress_broken = false;

    while completed < total {
        let wait = next_wait(&slots, opts.timeout);
        match rx.recv_timeout(wait) {
            Ok(WorkerMsg::Started(index)) => {
                if matches!(slots[index], Slot::Pending) {
                    slots[index] = Slot::Running(Instant::now());
                }
            }
            Ok(WorkerMsg::Finished(index, row)) => {
                if matches!(slots[index], Slot::Dropped) {
                    tracing::debug!(
                        combination = index,
                        "discarding result of timed-out combination"
                    );
                } else {
                    slots[index] = Slot::Done(row);
                    completed += 1;
                    report_progress(&opts.progress, &mut progress_broken, completed, total);
                }
            }
            Ok(WorkerMsg::Failed(index, reason)) => {
                if !matches!(slots[index], Slot::Dropped) {
                    tracing::warn!(combination = index, %reason, "sweep: dropping combination");
                    slots[index] = Slot::Dropped;
                    completed += 1;
                    dropped += 1;
                    report_progress(&opts.progress, &mut progress_broken, completed, total);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        // Expire overdue combinations regardless of which arm woke us.
        for (index, slot) in slots.iter_mut().enumerate() {
            if let Slot::Running(started) = slot
                && started.elapsed() >= opts.timeout
            {
                tracing::warn!(combination = index, "sweep: combination timed out; dropping");
                *slot = Slot::Dropped;
                completed += 1;
                dropped += 1;
                report_progress(&opts.progress, &mut progress_broken, completed, total);
            }
        }
    }

    // A disconnect with unsettled slots means workers died without
    // reporting; account for them as dropped.
    for slot in &mut slots {
        if matches!(slot, Slot::Pending | Slot::Running(_)) {
            *slot = Slot::Dropped;
            dropped += 1;
        }
    }

    let rows: Vec<RowData> = slots
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Done(row) => Some(*row),
            _ => None,
        })
        .collect();

    finish_report(grid, rows, dropped, opts.store_backtest_data)
}

/// How long the dispatcher may sleep: until the earliest in-flight deadline,
/// or a full timeout when nothing is running yet.
fn next_wait(slots: &[Slot], timeout: Duration) -> Duration {
    slots
        .iter()
        .filter_map(|slot| match slot {
            Slot::Running(started) => {
                Some(timeout.saturating_sub(started.elapsed()))
            }
            _ => None,
        })
        .min()
        .map_or(timeout, |d| d.max(Duration::from_millis(1)))
}

fn finish_report(
    grid: &ParamGrid,
    rows: Vec<RowData>,
    dropped: usize,
    store: bool,
) -> Result<SweepReport> {
    if rows.is_empty() {
        return Err(OptimizerError::NoValidResults);
    }
    let results = build_result_table(grid, &rows)?;
    let backtests = store.then(|| rows.into_iter().filter_map(|r| r.backtest).collect());
    Ok(SweepReport {
        results,
        dropped,
        backtests,
    })
}

// Used by report assembly and tests.
pub(crate) fn metric_by_name(results: &Table, metric: &str) -> Result<Vec<f64>> {
    let column = results
        .column(metric)
        .ok_or_else(|| crate::frame::FrameError::ColumnMissing {
            name: metric.to_string(),
        })?;
    match column {
        Column::Float(values) => Ok(values.to_vec()),
        Column::Int(values) => Ok(values.iter().map(|&v| v as f64).collect()),
        Column::Str(_) => Err(crate::frame::FrameError::TypeMismatch {
            name: metric.to_string(),
            expected: "float",
            got: "str",
        }
        .into()),
    }
}
