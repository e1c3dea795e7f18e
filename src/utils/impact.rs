use crate::models::Projection;

const SIGNIFICANT_DIGITS: u32 = 3;
// A swing of this many percentage points or more is fully red.
const MAX_SWING: f64 = 5.0;
const GREEN_HUE: f64 = 120.0;

pub fn round_sig(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() || digits == 0 {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let shift = digits as i32 - 1 - magnitude;
    if shift >= 0 {
        let factor = 10f64.powi(shift);
        (value * factor).round() / factor
    } else {
        let factor = 10f64.powi(-shift);
        (value / factor).round() * factor
    }
}

// Maps the swing between two percentages onto a red (0) to green (120) hue.
// Coarse on purpose: anything moving the grade by 5 points or more is as red as it gets.
pub fn hue(current_percent: f64, projected_percent: f64) -> f64 {
    let swing = projected_percent - current_percent;
    (MAX_SWING - swing).clamp(0.0, MAX_SWING) / MAX_SWING * GREEN_HUE
}

// Projects the category percentage if the assignment were scored at full credit.
//
// With nothing graded in the category yet the current percentage is not applicable.
// The assignment then alone decides the category (100%, fully red), unless it is
// worth nothing either, in which case nothing moves.
pub fn project_impact(current_points: f64, current_total: f64, assignment_points: f64) -> Projection {
    let assignment_points = assignment_points.max(0.0);

    if current_total <= 0.0 {
        return if assignment_points > 0.0 {
            Projection { current_percent: None, projected_percent: Some(100.0), hue: 0.0 }
        } else {
            Projection { current_percent: None, projected_percent: None, hue: GREEN_HUE }
        };
    }

    let current_percent = round_sig(current_points / current_total * 100.0, SIGNIFICANT_DIGITS);
    let projected_percent = round_sig(
        (current_points + assignment_points) / (current_total + assignment_points) * 100.0,
        SIGNIFICANT_DIGITS,
    );

    Projection {
        current_percent: Some(current_percent),
        projected_percent: Some(projected_percent),
        hue: hue(current_percent, projected_percent),
    }
}
