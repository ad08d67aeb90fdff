use chrono::NaiveDateTime;
use load_model::{
    FitStatus, GenerationCoefficients, HourlyRecord, MonthValidation, MonthlyTarget,
};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::SynthResult;
use crate::general::calendar::{group_by_month, month_coefficients, year_hours};
use crate::synth::reconciler::reconcile_month;
use crate::synth::shape_optimizer::{apply_fallback, optimize_shape};
use crate::synth::synth_utils::{SynthesisInput, SynthesisOutput};

/// Generated hours and statistics of one month.
#[derive(Debug, Clone)]
pub struct MonthSeries {
    pub records: Vec<HourlyRecord>,
    pub validation: MonthValidation,
}

/// Generate the hourly series of one month.
///
/// The month's coefficients are fitted (reshaping if needed, clamping as a
/// last resort), turned into raw demand and then reconciled onto the targets.
pub fn synthesize_month(
    hours: &[NaiveDateTime],
    target: &MonthlyTarget,
    input: &SynthesisInput,
    coefficients: &GenerationCoefficients,
) -> MonthSeries {
    let coefs = month_coefficients(hours, &input.calendar, coefficients);
    let fit = optimize_shape(target.peak_kw, target.total_kwh, &coefs, &input.search);
    let (params, status) = apply_fallback(target.total_kwh, &fit);

    match status {
        FitStatus::ClampedFlat | FitStatus::ClampedZeroBase => warn!(
            month = target.month,
            peak_kw = target.peak_kw,
            total_kwh = target.total_kwh,
            load_factor = target.load_factor(hours.len()),
            iterations = fit.iterations,
            "No feasible shape found, peak target only enforced by reconciliation"
        ),
        FitStatus::FlatPattern => warn!(
            month = target.month,
            "Flat pattern, peak target ignored by the fit"
        ),
        _ => {}
    }

    let mut demand: Vec<f64> = fit.coefs.iter().map(|&c| params.demand(c)).collect();
    let reconciliation = reconcile_month(&mut demand, target.peak_kw, target.total_kwh);
    if !reconciliation.total_within_bounds {
        warn!(
            month = target.month,
            hour = ?reconciliation.total_index,
            "Total correction pushed an hour outside [0, peak]"
        );
    }

    let realized_peak_kw = demand.iter().copied().fold(0.0_f64, f64::max);
    let realized_total_kwh: f64 = demand.iter().sum();
    let min_demand_kw = demand.iter().copied().fold(f64::INFINITY, f64::min);

    info!(
        month = target.month,
        target_peak_kw = target.peak_kw,
        realized_peak_kw,
        target_total_kwh = target.total_kwh,
        realized_total_kwh,
        status = %status.label(),
        "Generated month"
    );

    let records = hours
        .iter()
        .zip(demand)
        .map(|(ts, kw)| HourlyRecord::new(*ts, input.calendar.day_kind(ts.date()), kw))
        .collect();

    MonthSeries {
        records,
        validation: MonthValidation {
            month: target.month,
            target_peak_kw: target.peak_kw,
            target_total_kwh: target.total_kwh,
            realized_peak_kw,
            realized_total_kwh,
            min_demand_kw,
            status,
        },
    }
}

/// Generate the whole year.
///
/// Months are independent; with `input.parallel` they run on the rayon pool.
/// Either way the output stays in chronological order. A month without a
/// target is skipped and listed in `skipped_months`.
pub fn synthesize(input: &SynthesisInput) -> SynthResult<SynthesisOutput> {
    input.validate()?;

    let coefficients = input.pattern.generation_coefficients();
    let months = group_by_month(&year_hours(input.year));

    let mut skipped_months = Vec::new();
    let jobs: Vec<(&[NaiveDateTime], &MonthlyTarget)> = months
        .iter()
        .filter_map(|(month, hours)| match input.target(*month) {
            Some(target) => Some((hours.as_slice(), target)),
            None => {
                warn!(month = *month, "No target for month, skipping");
                skipped_months.push(*month);
                None
            }
        })
        .collect();

    let series: Vec<MonthSeries> = if input.parallel {
        jobs.par_iter()
            .map(|(hours, target)| synthesize_month(hours, target, input, &coefficients))
            .collect()
    } else {
        jobs.iter()
            .map(|(hours, target)| synthesize_month(hours, target, input, &coefficients))
            .collect()
    };

    let mut output = SynthesisOutput {
        records: Vec::with_capacity(series.iter().map(|s| s.records.len()).sum()),
        validation: Vec::with_capacity(series.len()),
        skipped_months,
    };
    for month in series {
        output.records.extend(month.records);
        output.validation.push(month.validation);
    }

    Ok(output)
}
