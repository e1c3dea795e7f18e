use serde::{Deserialize, Serialize};
use crate::utils::coerce;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Section {
    #[serde(deserialize_with = "coerce::id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::optional_id_string")]
    pub course_id: Option<String>,
    #[serde(default)]
    pub course_title: Option<String>,
}

// Body of `users/{id}/sections`.
#[derive(Debug, Deserialize, Default)]
pub struct SectionList {
    #[serde(default, deserialize_with = "coerce::lenient_vec")]
    pub section: Vec<Section>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Assignment {
    #[serde(deserialize_with = "coerce::id_number")]
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "coerce::truncated_points")]
    pub max_points: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_id_number")]
    pub grading_category: Option<u64>,
    #[serde(default, deserialize_with = "coerce::truncated_points")]
    pub grade: Option<f64>,
}

// Body of `sections/{id}/assignments`. The list is omitted for sections without assignments,
// and entries that do not decode (a `null` id for instance) are left out.
#[derive(Debug, Deserialize, Default)]
pub struct AssignmentList {
    #[serde(default, deserialize_with = "coerce::lenient_list")]
    pub assignment: Option<Vec<Assignment>>,
}

// Body of `users/{id}/grades`. Entries that do not decode are skipped like in the listings above.
#[derive(Debug, Deserialize, Default)]
pub struct GradeReport {
    #[serde(default, deserialize_with = "coerce::lenient_vec")]
    pub section: Vec<SectionGrades>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SectionGrades {
    #[serde(deserialize_with = "coerce::id_string")]
    pub section_id: String,
    #[serde(default, deserialize_with = "coerce::lenient_vec")]
    pub period: Vec<GradingPeriod>,
    #[serde(default, deserialize_with = "coerce::lenient_vec")]
    pub final_grade: Vec<FinalGrade>,
    #[serde(default, deserialize_with = "coerce::lenient_vec")]
    pub grading_category: Vec<GradingCategory>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GradingPeriod {
    #[serde(deserialize_with = "coerce::id_string")]
    pub period_id: String,
    #[serde(default, deserialize_with = "coerce::lenient_vec")]
    pub assignment: Vec<PeriodAssignment>,
}

impl GradingPeriod {
    pub fn contains_assignment(&self, assignment_id: u64) -> bool {
        self.assignment.iter().any(|a| a.assignment_id == assignment_id)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PeriodAssignment {
    #[serde(deserialize_with = "coerce::id_number")]
    pub assignment_id: u64,
    #[serde(default, deserialize_with = "coerce::truncated_points")]
    pub grade: Option<f64>,
    #[serde(default, deserialize_with = "coerce::truncated_points")]
    pub max_points: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_id_number")]
    pub category_id: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FinalGrade {
    #[serde(deserialize_with = "coerce::id_string")]
    pub period_id: String,
    #[serde(default, deserialize_with = "coerce::lenient_vec")]
    pub grading_category: Vec<CategoryGrade>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CategoryGrade {
    #[serde(deserialize_with = "coerce::id_number")]
    pub category_id: u64,
    #[serde(default, deserialize_with = "coerce::truncated_points")]
    pub grade: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GradingCategory {
    #[serde(deserialize_with = "coerce::id_number")]
    pub id: u64,
    pub title: String,
}

// The located section and the assignment as the section reports it.
#[derive(Debug, Clone)]
pub struct AssignmentContext {
    pub assignment_id: u64,
    pub section: Section,
    pub assignment: Assignment,
}

// Everything both widgets are built from, fetched once per page.
#[derive(Debug)]
pub struct PageData {
    pub context: AssignmentContext,
    pub report: GradeReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAggregate {
    pub current_points: f64,
    pub current_total: f64,
    pub category_title: String,
}

// `None` percentages mean "not applicable": there was nothing graded to divide by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub current_percent: Option<f64>,
    pub projected_percent: Option<f64>,
    pub hue: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsPayload {
    pub points: i64,
    pub grading_category: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignificancePayload {
    pub category_title: String,
    pub current_percent: Option<f64>,
    pub projected_percent: Option<f64>,
    pub hue: f64,
}
