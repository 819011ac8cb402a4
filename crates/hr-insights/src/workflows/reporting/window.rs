use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::ReportError;

/// Upper bound on trend points per report.
pub const MAX_TREND_POINTS: usize = 366;

/// Date range sampled every `step_days` for the trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWindow {
    start: NaiveDate,
    end: NaiveDate,
    step_days: u32,
}

impl ReportWindow {
    pub fn new(start: NaiveDate, end: NaiveDate, step_days: u32) -> Result<Self, ReportError> {
        if end < start {
            return Err(ReportError::InvalidWindow(format!(
                "end {end} is before start {start}"
            )));
        }
        if step_days == 0 {
            return Err(ReportError::InvalidWindow(
                "step must be at least one day".to_string(),
            ));
        }

        let span = (end - start).num_days() as usize;
        let points = span / step_days as usize + 1;
        if points > MAX_TREND_POINTS {
            return Err(ReportError::InvalidWindow(format!(
                "{points} trend points exceed the limit of {MAX_TREND_POINTS}"
            )));
        }

        Ok(Self {
            start,
            end,
            step_days,
        })
    }

    /// Single-day window.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
            step_days: 1,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn step_days(&self) -> u32 {
        self.step_days
    }

    /// `start`, `start + step`, ... up to and including `end` when it falls
    /// on a step.
    pub fn points(&self) -> Vec<NaiveDate> {
        let step = Days::new(u64::from(self.step_days));
        let mut points = Vec::new();
        let mut current = Some(self.start);
        while let Some(date) = current.filter(|date| *date <= self.end) {
            points.push(date);
            current = date.checked_add_days(step);
        }
        points
    }
}
