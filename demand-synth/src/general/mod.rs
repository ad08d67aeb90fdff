pub mod calendar;
pub mod electricity_demand;
pub mod export;

pub use calendar::{HOURS_PER_YEAR, group_by_month, month_coefficients, year_hours};
pub use electricity_demand::load_targets;
pub use export::{pivot_by_date, write_pivot_csv, write_series_csv};
