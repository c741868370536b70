//! Seasonal forecasting via harmonic regression.
//!
//! Linear trend plus daily and yearly Fourier terms, fit by ordinary least
//! squares on the normal equations. The spirit of a classical decomposition:
//! cheap, deterministic, and good enough to exercise the whole pipeline.

use chrono::NaiveDateTime;
use std::f64::consts::TAU;

use crate::error::{PipelineError, Result};
use crate::model::{Forecast, ForecastPoint, TimeSeries};

use super::{FittedModel, SeasonalModel, ensure_trainable};

const HOURS_PER_DAY: f64 = 24.0;
const HOURS_PER_YEAR: f64 = 8766.0; // 365.25 days

/// Harmonic regression model configuration.
#[derive(Debug, Clone)]
pub struct HarmonicRegression {
    daily_harmonics: usize,
    yearly_harmonics: usize,
    /// Interval coverage level, e.g. 0.95.
    level: f64,
}

impl HarmonicRegression {
    pub fn new(daily_harmonics: usize, yearly_harmonics: usize, level: f64) -> Self {
        Self {
            daily_harmonics,
            yearly_harmonics,
            level,
        }
    }
}

impl Default for HarmonicRegression {
    fn default() -> Self {
        Self::new(4, 3, 0.95)
    }
}

impl SeasonalModel for HarmonicRegression {
    fn fit(&self, train: &TimeSeries) -> Result<Box<dyn FittedModel>> {
        ensure_trainable(train)?;

        let observations = train.observations();
        let n = observations.len();
        let origin = observations[0].timestamp;
        let span_hours = hours_since(origin, observations[n - 1].timestamp);

        // The yearly cycle cannot be estimated from less than a year of
        // history; short series degrade to trend plus daily terms, and very
        // short series to a plain trend line, rather than failing.
        let mut yearly = if span_hours < HOURS_PER_YEAR {
            0
        } else {
            self.yearly_harmonics
        };
        let mut daily = self.daily_harmonics;
        while 2 + 2 * (daily + yearly) > n {
            if yearly > 0 {
                yearly -= 1;
            } else if daily > 0 {
                daily -= 1;
            } else {
                break;
            }
        }

        let center = span_hours / (2.0 * HOURS_PER_DAY);
        let basis = Basis { origin, center_days: center, daily, yearly };

        let num_params = basis.len();
        let mut xtx = vec![vec![0.0; num_params]; num_params];
        let mut xty = vec![0.0; num_params];

        for o in observations {
            let row = basis.features(o.timestamp);
            for i in 0..num_params {
                xty[i] += row[i] * o.value;
                for j in 0..num_params {
                    xtx[i][j] += row[i] * row[j];
                }
            }
        }

        // Small ridge term keeps the normal equations positive definite.
        for (i, row) in xtx.iter_mut().enumerate() {
            row[i] += 1e-8;
        }

        let coefficients = solve_symmetric(&xtx, &xty).ok_or(
            // Rank deficiency: the series cannot support even the reduced basis.
            PipelineError::InsufficientData { needed: num_params, got: n },
        )?;

        let mut sq_sum = 0.0;
        for o in observations {
            let fitted = basis.predict_one(&coefficients, o.timestamp);
            sq_sum += (o.value - fitted).powi(2);
        }
        let sigma = (sq_sum / n as f64).sqrt();
        let z = quantile_normal((1.0 + self.level) / 2.0);

        tracing::debug!(
            n,
            daily_harmonics = daily,
            yearly_harmonics = yearly,
            sigma,
            "fitted harmonic regression"
        );

        Ok(Box::new(FittedHarmonic { basis, coefficients, sigma, z }))
    }
}

#[derive(Debug)]
pub struct FittedHarmonic {
    basis: Basis,
    coefficients: Vec<f64>,
    sigma: f64,
    z: f64,
}

impl FittedModel for FittedHarmonic {
    fn predict(&self, horizon: &[NaiveDateTime]) -> Result<Forecast> {
        let half_width = self.z * self.sigma;
        let points = horizon
            .iter()
            .map(|&timestamp| {
                let predicted = self.basis.predict_one(&self.coefficients, timestamp);
                ForecastPoint {
                    timestamp,
                    predicted,
                    lower: predicted - half_width,
                    upper: predicted + half_width,
                }
            })
            .collect();
        Ok(Forecast::from_points(points))
    }
}

/// Regression basis: intercept, centered trend, and Fourier pairs for the
/// daily and yearly periods, all anchored at the training origin.
#[derive(Debug, Clone)]
struct Basis {
    origin: NaiveDateTime,
    center_days: f64,
    daily: usize,
    yearly: usize,
}

impl Basis {
    fn len(&self) -> usize {
        2 + 2 * (self.daily + self.yearly)
    }

    fn features(&self, timestamp: NaiveDateTime) -> Vec<f64> {
        let hours = hours_since(self.origin, timestamp);
        let mut row = Vec::with_capacity(self.len());
        row.push(1.0);
        row.push(hours / HOURS_PER_DAY - self.center_days);
        for k in 1..=self.daily {
            let angle = TAU * k as f64 * hours / HOURS_PER_DAY;
            row.push(angle.sin());
            row.push(angle.cos());
        }
        for k in 1..=self.yearly {
            let angle = TAU * k as f64 * hours / HOURS_PER_YEAR;
            row.push(angle.sin());
            row.push(angle.cos());
        }
        row
    }

    fn predict_one(&self, coefficients: &[f64], timestamp: NaiveDateTime) -> f64 {
        self.features(timestamp)
            .iter()
            .zip(coefficients)
            .map(|(x, c)| x * c)
            .sum()
    }
}

fn hours_since(origin: NaiveDateTime, timestamp: NaiveDateTime) -> f64 {
    (timestamp - origin).num_seconds() as f64 / 3600.0
}

/// Solve `A x = b` for symmetric positive definite `A` via Cholesky.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L L'
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i][k] * y[k];
        }
        y[i] = sum / l[i][i];
    }

    // Back substitution: L' x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in (i + 1)..n {
            sum -= l[k][i] * x[k];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

/// Approximate standard normal quantile (Abramowitz & Stegun 26.2.23).
fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let t = if p < 0.5 {
        (-2.0 * p.ln()).sqrt()
    } else {
        (-2.0 * (1.0 - p).ln()).sqrt()
    };

    let c0 = 2.515517;
    let c1 = 0.802853;
    let c2 = 0.010328;
    let d1 = 1.432788;
    let d2 = 0.189269;
    let d3 = 0.001308;

    let result = t - (c0 + c1 * t + c2 * t * t) / (1.0 + d1 * t + d2 * t * t + d3 * t * t * t);

    if p < 0.5 { -result } else { result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::hourly_range;
    use crate::model::Observation;
    use chrono::{Duration, NaiveDate};

    fn hour(h: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(h)
    }

    fn daily_wave(hours: i64) -> TimeSeries {
        TimeSeries::from_unsorted(
            (0..hours)
                .map(|h| Observation {
                    timestamp: hour(h),
                    value: 20.0 + 5.0 * (TAU * h as f64 / 24.0).sin(),
                })
                .collect(),
        )
    }

    #[test]
    fn fit_rejects_single_observation() {
        let series = TimeSeries::from_unsorted(vec![Observation {
            timestamp: hour(0),
            value: 10.0,
        }]);

        let err = HarmonicRegression::default().fit(&series).unwrap_err();
        assert_eq!(err, PipelineError::InsufficientData { needed: 2, got: 1 });
    }

    #[test]
    fn two_points_degrade_to_trend_line() {
        let series = TimeSeries::from_unsorted(vec![
            Observation { timestamp: hour(0), value: 10.0 },
            Observation { timestamp: hour(1), value: 12.0 },
        ]);

        let fitted = HarmonicRegression::default().fit(&series).unwrap();
        let forecast = fitted.predict(&[hour(2)]).unwrap();

        // Line through (0, 10) and (1, 12) extrapolates to 14.
        let p = forecast.points()[0];
        assert!((p.predicted - 14.0).abs() < 0.1, "got {}", p.predicted);
    }

    #[test]
    fn recovers_a_daily_cycle() {
        let series = daily_wave(10 * 24);
        let fitted = HarmonicRegression::new(2, 0, 0.95).fit(&series).unwrap();

        let horizon = hourly_range(hour(10 * 24), 24);
        let forecast = fitted.predict(&horizon).unwrap();

        assert_eq!(forecast.len(), 24);
        for p in forecast.points() {
            let h = hours_since(hour(0), p.timestamp);
            let expected = 20.0 + 5.0 * (TAU * h / 24.0).sin();
            assert!((p.predicted - expected).abs() < 0.2, "at {h}: {}", p.predicted);
        }
    }

    #[test]
    fn bounds_bracket_the_point_estimate() {
        let series = daily_wave(5 * 24);
        let fitted = HarmonicRegression::default().fit(&series).unwrap();

        let forecast = fitted.predict(&hourly_range(hour(5 * 24), 48)).unwrap();
        for p in forecast.points() {
            assert!(p.lower <= p.predicted && p.predicted <= p.upper);
        }
    }

    #[test]
    fn predict_preserves_horizon_order_and_length() {
        let series = daily_wave(3 * 24);
        let fitted = HarmonicRegression::default().fit(&series).unwrap();

        let horizon = hourly_range(hour(100), 7);
        let forecast = fitted.predict(&horizon).unwrap();

        assert_eq!(forecast.len(), horizon.len());
        let timestamps: Vec<_> = forecast.points().iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, horizon);
    }

    #[test]
    fn long_horizon_does_not_fail() {
        let series = daily_wave(2 * 24);
        let fitted = HarmonicRegression::default().fit(&series).unwrap();

        let forecast = fitted.predict(&hourly_range(hour(48), 24 * 365)).unwrap();
        assert_eq!(forecast.len(), 24 * 365);
    }

    #[test]
    fn quantile_normal_matches_known_values() {
        assert!((quantile_normal(0.975) - 1.96).abs() < 0.01);
        assert!((quantile_normal(0.5)).abs() < 0.01);
        assert!((quantile_normal(0.025) + 1.96).abs() < 0.01);
    }
}
