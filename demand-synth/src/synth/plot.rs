use load_model::{HOURS_PER_DAY, HourlyRecord, MonthValidation};
use plotters::prelude::*;
use tracing::info;

/// Mean demand per hour of day, split into working and non-working days.
///
/// Hours with no matching day stay at zero.
pub fn average_daily_profile(records: &[HourlyRecord]) -> ([f64; 24], [f64; 24]) {
    let mut sums = [[0.0_f64; HOURS_PER_DAY]; 2];
    let mut counts = [[0usize; HOURS_PER_DAY]; 2];
    for record in records {
        let kind = usize::from(record.is_nonworking());
        let hour = record.hour() as usize;
        sums[kind][hour] += record.demand_kw;
        counts[kind][hour] += 1;
    }

    let mut means = [[0.0_f64; HOURS_PER_DAY]; 2];
    for kind in 0..2 {
        for hour in 0..HOURS_PER_DAY {
            if counts[kind][hour] > 0 {
                means[kind][hour] = sums[kind][hour] / counts[kind][hour] as f64;
            }
        }
    }
    (means[0], means[1])
}

/// Two panels: target vs realized monthly peak, and the average daily profile.
pub fn plot_overview(
    records: &[HourlyRecord],
    validation: &[MonthValidation],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(filename, (900, 1000)).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((2, 1));
    let upper = &areas[0];
    let lower = &areas[1];

    let peak_max = validation
        .iter()
        .flat_map(|v| [v.target_peak_kw, v.realized_peak_kw])
        .fold(0f64, f64::max)
        * 1.1;

    let mut chart1 = ChartBuilder::on(upper)
        .caption("Monthly peak", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..13f64, 0f64..peak_max.max(1.0))?;

    chart1
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Peak [kW]")
        .draw()?;

    chart1
        .draw_series(validation.iter().map(|v| {
            let x = v.month as f64;
            Rectangle::new([(x - 0.35, 0.0), (x, v.target_peak_kw)], BLUE.filled())
        }))?
        .label("target")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLUE));

    chart1
        .draw_series(validation.iter().map(|v| {
            let x = v.month as f64;
            Rectangle::new([(x, 0.0), (x + 0.35, v.realized_peak_kw)], RED.filled())
        }))?
        .label("realized")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &RED));

    chart1.configure_series_labels().draw()?;

    let (working, nonworking) = average_daily_profile(records);
    let profile_max = working
        .iter()
        .chain(nonworking.iter())
        .fold(0f64, |a, &b| a.max(b))
        * 1.1;

    let mut chart2 = ChartBuilder::on(lower)
        .caption("Average daily profile", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..23f64, 0f64..profile_max.max(1.0))?;

    chart2
        .configure_mesh()
        .x_desc("Hour")
        .y_desc("Demand [kW]")
        .draw()?;

    chart2
        .draw_series(LineSeries::new(
            working.iter().enumerate().map(|(h, &y)| (h as f64, y)),
            &BLUE,
        ))?
        .label("working")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLUE));

    chart2
        .draw_series(LineSeries::new(
            nonworking.iter().enumerate().map(|(h, &y)| (h as f64, y)),
            &GREEN,
        ))?
        .label("non-working")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &GREEN));

    chart2.configure_series_labels().draw()?;

    root.present()?;
    info!(file = filename, "Plot saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use load_model::DayKind;

    #[test]
    fn test_average_daily_profile_splits_day_kinds() {
        let at = |day: u32, hour: u32| {
            NaiveDate::from_ymd_opt(2023, 1, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap()
        };
        let records = vec![
            HourlyRecord::new(at(2, 9), DayKind::Working, 10.0),
            HourlyRecord::new(at(3, 9), DayKind::Working, 20.0),
            HourlyRecord::new(at(7, 9), DayKind::NonWorking, 4.0),
        ];
        let (working, nonworking) = average_daily_profile(&records);
        assert_eq!(working[9], 15.0);
        assert_eq!(nonworking[9], 4.0);
        assert_eq!(working[0], 0.0);
    }
}
