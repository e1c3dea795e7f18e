use log::debug;
use crate::error::{ImpactError, WidgetResult};
use crate::models::{CategoryAggregate, GradeReport, GradingPeriod, SectionGrades};
use crate::utils::api::{fetch_as, GradesApi};

pub async fn fetch_grade_report<A: GradesApi>(api: &A, section_id: &str) -> WidgetResult<GradeReport> {
    let path = format!("users/{}/grades/?section_id={}", api.current_user_id(), section_id);
    Ok(fetch_as(api, &path).await?)
}

// Ids must match exactly. Comparing only a prefix of the id confuses sections that share one.
fn section_grades<'a>(report: &'a GradeReport, section_id: &str) -> WidgetResult<&'a SectionGrades> {
    report
        .section
        .iter()
        .find(|s| s.section_id == section_id)
        .ok_or_else(|| ImpactError::not_found(format!("Section {}", section_id)))
}

fn title_in(section: &SectionGrades, category_id: u64) -> WidgetResult<String> {
    section
        .grading_category
        .iter()
        .find(|c| c.id == category_id)
        .map(|c| c.title.clone())
        .ok_or_else(|| ImpactError::not_found(format!("Title of grading category {}", category_id)))
}

pub fn category_title(report: &GradeReport, section_id: &str, category_id: u64) -> WidgetResult<String> {
    title_in(section_grades(report, section_id)?, category_id)
}

// Sums the graded points of one category within the grading period that holds `assignment_id`.
// Only entries with a grade and positive max points count; other periods never do.
pub fn aggregate_category(
    report: &GradeReport,
    section_id: &str,
    assignment_id: u64,
    category_id: u64,
) -> WidgetResult<CategoryAggregate> {
    let section = section_grades(report, section_id)?;

    let period: &GradingPeriod = section
        .period
        .iter()
        .find(|p| p.contains_assignment(assignment_id))
        .ok_or_else(|| ImpactError::not_found(format!("Grading period of assignment {}", assignment_id)))?;

    let final_grade = section
        .final_grade
        .iter()
        .find(|f| f.period_id == period.period_id)
        .ok_or_else(|| ImpactError::not_found(format!("Final grade of period {}", period.period_id)))?;

    let category_grade = final_grade
        .grading_category
        .iter()
        .find(|c| c.category_id == category_id)
        .ok_or_else(|| ImpactError::not_found(format!(
            "Grading category {} in period {}",
            category_id, period.period_id
        )))?;
    debug!(
        "Period {} category {} currently stands at {:?}",
        period.period_id, category_id, category_grade.grade
    );

    let category_title = title_in(section, category_id)?;

    let (current_points, current_total) = period
        .assignment
        .iter()
        .filter(|a| a.category_id == Some(category_id))
        .filter_map(|a| match (a.grade, a.max_points) {
            (Some(grade), Some(max_points)) if max_points > 0.0 => Some((grade, max_points)),
            _ => None,
        })
        .fold((0.0, 0.0), |(points, total), (grade, max_points)| (points + grade, total + max_points));

    Ok(CategoryAggregate {
        current_points,
        current_total,
        category_title,
    })
}
