//! Rolling and recursive numerical kernels.
//!
//! These are the window reductions every indicator is built from. They
//! operate on plain `&[f64]` slices, always return a vector of the same
//! length as the input, and mark "not yet computable" cells with NaN.
//!
//! The recursive kernels ([`ema`], [`wilder_smooth`]) are explicit
//! left-to-right scans carrying a single `f64` of state — no recursion, no
//! allocation beyond the output buffer.

use super::{IndicatorError, Result, check_period};

/// Rolling arithmetic mean over a trailing window.
///
/// Cell `i` is NaN for `i < window - 1`, otherwise the mean of
/// `x[i - window + 1 ..= i]`. When the window exceeds the input length (or is
/// zero) the whole output is NaN; period validation is the caller's job.
///
/// A NaN anywhere inside a window makes that window's mean NaN.
///
/// # Example
///
/// ```
/// use tickframe::indicators::rolling::rolling_mean;
///
/// let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
/// assert!(out[1].is_nan());
/// assert_eq!(&out[2..], &[2.0, 3.0, 4.0]);
/// ```
pub fn rolling_mean(x: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; x.len()];
    if window == 0 || window > x.len() {
        return out;
    }

    for (i, w) in x.windows(window).enumerate() {
        out[i + window - 1] = w.iter().sum::<f64>() / window as f64;
    }
    out
}

/// Rolling weighted mean over a trailing window.
///
/// `weights` must have exactly `window` positive entries; `None` selects the
/// linear ramp `1..=window`, which favors recency. Cell `i` is NaN for
/// `i < window - 1`, otherwise `Σ x[i-window+1+k] · weights[k] / Σ weights`.
///
/// # Errors
///
/// [`IndicatorError::InvalidWeights`] when a custom weights vector has the
/// wrong length or a non-positive entry.
pub fn weighted_mean(x: &[f64], window: usize, weights: Option<&[f64]>) -> Result<Vec<f64>> {
    let ramp: Vec<f64>;
    let weights = match weights {
        Some(w) => {
            if w.len() != window {
                return Err(IndicatorError::InvalidWeights(format!(
                    "expected {} weights, got {}",
                    window,
                    w.len()
                )));
            }
            if w.iter().any(|&v| !(v > 0.0)) {
                return Err(IndicatorError::InvalidWeights(
                    "weights must be positive".to_string(),
                ));
            }
            w
        }
        None => {
            ramp = (1..=window).map(|k| k as f64).collect();
            &ramp
        }
    };

    let mut out = vec![f64::NAN; x.len()];
    if window == 0 || window > x.len() {
        return Ok(out);
    }

    let weight_sum: f64 = weights.iter().sum();
    for (i, w) in x.windows(window).enumerate() {
        let num: f64 = w.iter().zip(weights).map(|(&v, &wt)| v * wt).sum();
        out[i + window - 1] = num / weight_sum;
    }
    Ok(out)
}

/// Length-preserving exponential moving average seeded by an SMA.
///
/// Let `s` be the first numeric index of `x` (leading NaNs are skipped, which
/// is what lets the MACD signal line reuse this kernel on a NaN-prefixed
/// column). The first output is at `s + period - 1` and equals the mean of
/// the `period` cells starting at `s`; from there the standard recursion
/// `out[i] = α·x[i] + (1-α)·out[i-1]` runs to the end. Everything before the
/// seed is NaN, and a NaN input after the seed poisons all later cells.
///
/// `alpha` defaults to `2 / (period + 1)`.
///
/// # Errors
///
/// [`IndicatorError::InvalidPeriod`] for a zero period,
/// [`IndicatorError::InvalidAlpha`] when `alpha` is outside `(0.0, 1.0]`.
///
/// # Example
///
/// ```
/// use tickframe::indicators::rolling::ema;
///
/// let out = ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, Some(0.5)).unwrap();
/// assert!(out[1].is_nan());
/// assert_eq!(&out[2..], &[2.0, 3.0, 4.0]);
/// ```
pub fn ema(x: &[f64], period: usize, alpha: Option<f64>) -> Result<Vec<f64>> {
    check_period(period)?;
    let alpha = alpha.unwrap_or(2.0 / (period as f64 + 1.0));
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(IndicatorError::InvalidAlpha { alpha });
    }

    let mut out = vec![f64::NAN; x.len()];
    let Some(start) = x.iter().position(|v| !v.is_nan()) else {
        return Ok(out);
    };
    let seed_idx = start + period - 1;
    if seed_idx >= x.len() {
        return Ok(out);
    }

    out[seed_idx] = x[start..=seed_idx].iter().sum::<f64>() / period as f64;
    for i in seed_idx + 1..x.len() {
        out[i] = alpha * x[i] + (1.0 - alpha) * out[i - 1];
    }
    Ok(out)
}

/// Wilder's recursive smoother with `α = 1/period`.
///
/// Unlike [`ema`], the state seeds from the first numeric value itself (no
/// SMA warmup) and NaN inputs do not poison the recursion: a NaN cell emits
/// the held state unchanged, matching pandas
/// `ewm(alpha=1/period, adjust=False).mean()`. Cells before the first
/// numeric input stay NaN. Used exclusively by RSI.
///
/// # Errors
///
/// [`IndicatorError::InvalidPeriod`] for a zero period.
pub fn wilder_smooth(x: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period(period)?;
    let alpha = 1.0 / period as f64;

    let mut out = vec![f64::NAN; x.len()];
    let mut state: Option<f64> = None;
    for (i, &v) in x.iter().enumerate() {
        match (state, v.is_nan()) {
            (None, true) => {}
            (None, false) => {
                state = Some(v);
                out[i] = v;
            }
            (Some(s), true) => out[i] = s,
            (Some(s), false) => {
                let next = alpha * v + (1.0 - alpha) * s;
                state = Some(next);
                out[i] = next;
            }
        }
    }
    Ok(out)
}
