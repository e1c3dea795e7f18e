use std::sync::OnceLock;
use log::{debug, info};
use regex::Regex;
use url::Url;
use crate::error::{ImpactError, WidgetResult};
use crate::models::{Assignment, AssignmentContext, AssignmentList, Section, SectionList};
use crate::utils::api::{fetch_as, GradesApi};

fn digits() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").expect("digit pattern is valid"))
}

// Takes the first run of digits of an assignment page URL (or a bare id).
// For a URL the path is searched first, then the query, then the whole input,
// so digits in the host only count when nothing else carries one.
pub fn extract_assignment_id(input: &str) -> WidgetResult<u64> {
    let input = input.trim();
    let haystacks = match Url::parse(input) {
        Ok(url) if url.has_host() => vec![
            url.path().to_string(),
            url.query().unwrap_or_default().to_string(),
            input.to_string(),
        ],
        _ => vec![input.to_string()],
    };

    haystacks
        .iter()
        .find_map(|haystack| digits().find(haystack))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| ImpactError::InvalidAssignmentUrl(input.to_string()))
}

pub async fn fetch_sections<A: GradesApi>(api: &A) -> WidgetResult<Vec<Section>> {
    let path = format!("users/{}/sections", api.current_user_id());
    let list: SectionList = fetch_as(api, &path).await?;
    Ok(list.section)
}

// Scans the sections in the given order, one request at a time, and returns the first
// one whose assignment list holds `assignment_id`.
pub async fn locate_section<A: GradesApi>(api: &A, assignment_id: u64, sections: &[Section]) -> WidgetResult<Section> {
    for section in sections {
        let path = format!("sections/{}/assignments/?start=0&limit=999", section.id);
        let list: AssignmentList = fetch_as(api, &path).await?;

        let Some(assignments) = list.assignment else {
            debug!("Section {} has no assignment list, skipping", section.id);
            continue;
        };

        if assignments.iter().any(|a| a.id == assignment_id) {
            debug!("Assignment {} found in section {}", assignment_id, section.id);
            return Ok(section.clone());
        }
    }

    Err(ImpactError::AssignmentNotFound(assignment_id))
}

pub async fn fetch_assignment<A: GradesApi>(api: &A, section_id: &str, assignment_id: u64) -> WidgetResult<Assignment> {
    let path = format!("sections/{}/assignments/{}", section_id, assignment_id);
    Ok(fetch_as(api, &path).await?)
}

// Everything the widgets need to know about the assignment on the page.
pub async fn resolve_context<A: GradesApi>(api: &A, page: &str) -> WidgetResult<AssignmentContext> {
    let assignment_id = extract_assignment_id(page)?;
    let sections = fetch_sections(api).await?;
    let section = locate_section(api, assignment_id, &sections).await?;
    let assignment = fetch_assignment(api, &section.id, assignment_id).await?;

    info!(
        "Assignment {} belongs to section {} of course {} ({})",
        assignment_id,
        section.id,
        section.course_id.as_deref().unwrap_or("unknown"),
        section.course_title.as_deref().unwrap_or("untitled course")
    );

    Ok(AssignmentContext { assignment_id, section, assignment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::error::TransportError;
    use crate::utils::api::fake::FakeApi;

    fn school() -> FakeApi {
        FakeApi::new("42")
            .with("users/42/sections", json!({
                "section": [
                    { "id": "100", "course_id": "9", "course_title": "Biology" },
                    { "id": "200", "course_id": "8", "course_title": "Art" },
                    { "id": "300", "course_id": "7", "course_title": "History" },
                ]
            }))
            .with("sections/100/assignments/?start=0&limit=999", json!({
                "assignment": [{ "id": 11, "max_points": "10" }, { "id": 12, "max_points": "5" }]
            }))
            .with("sections/200/assignments/?start=0&limit=999", json!({ "total": 0 }))
            .with("sections/300/assignments/?start=0&limit=999", json!({
                "assignment": [{ "id": 31, "max_points": 20, "grading_category": "5" }]
            }))
            .with("sections/300/assignments/31", json!({
                "id": 31,
                "title": "Essay",
                "max_points": "20.00",
                "grading_category": "5"
            }))
    }

    #[test]
    fn test_extract_from_page_url() {
        assert_eq!(extract_assignment_id("https://app.schoology.com/assignment/7351/info").unwrap(), 7351);
        assert_eq!(extract_assignment_id("https://lms2.school.org/assignment/88").unwrap(), 88);
        assert_eq!(extract_assignment_id(" 4410 ").unwrap(), 4410);
    }

    #[test]
    fn test_extract_falls_back_to_the_query() {
        assert_eq!(extract_assignment_id("https://app.schoology.com/assignment?id=55").unwrap(), 55);
        assert_eq!(extract_assignment_id("https://lms2.school.org/view?assignment=55").unwrap(), 55);
        assert_eq!(extract_assignment_id("https://app.schoology.com/view#item-61").unwrap(), 61);
    }

    #[test]
    fn test_extract_without_digits_fails() {
        let err = extract_assignment_id("https://app.schoology.com/home").unwrap_err();
        assert!(matches!(err, ImpactError::InvalidAssignmentUrl(_)));
    }

    #[tokio::test]
    async fn test_locate_skips_sections_without_assignments() {
        let api = school();
        let sections = fetch_sections(&api).await.unwrap();
        let section = locate_section(&api, 31, &sections).await.unwrap();

        assert_eq!(section.id, "300");
        assert_eq!(
            api.requests(),
            vec![
                "users/42/sections",
                "sections/100/assignments/?start=0&limit=999",
                "sections/200/assignments/?start=0&limit=999",
                "sections/300/assignments/?start=0&limit=999",
            ]
        );
    }

    #[tokio::test]
    async fn test_locate_stops_at_first_match() {
        let api = school();
        let sections = fetch_sections(&api).await.unwrap();
        let section = locate_section(&api, 12, &sections).await.unwrap();

        assert_eq!(section.id, "100");
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_locate_miss_is_not_found() {
        let api = school();
        let sections = fetch_sections(&api).await.unwrap();
        let err = locate_section(&api, 999, &sections).await.unwrap_err();

        assert!(matches!(err, ImpactError::AssignmentNotFound(999)));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_locate_skips_entries_without_an_id() {
        let api = FakeApi::new("42")
            .with("users/42/sections", json!({
                "section": [
                    { "id": "100", "course_id": null },
                    { "id": "200", "course_id": 8 },
                ]
            }))
            .with("sections/100/assignments/?start=0&limit=999", json!({
                "assignment": [{ "id": null }, { "id": 5 }]
            }))
            .with("sections/200/assignments/?start=0&limit=999", json!({
                "assignment": [{ "id": 31 }]
            }));

        let sections = fetch_sections(&api).await.unwrap();
        assert_eq!(sections[0].course_id, None);
        assert_eq!(sections[1].course_id.as_deref(), Some("8"));

        let section = locate_section(&api, 31, &sections).await.unwrap();
        assert_eq!(section.id, "200");
    }

    #[tokio::test]
    async fn test_locate_with_no_sections() {
        let api = FakeApi::new("42");
        let err = locate_section(&api, 1, &[]).await.unwrap_err();
        assert!(matches!(err, ImpactError::AssignmentNotFound(1)));
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_the_scan() {
        let api = FakeApi::new("42").with("users/42/sections", json!({
            "section": [{ "id": "100" }, { "id": "200" }]
        }));
        let sections = fetch_sections(&api).await.unwrap();
        let err = locate_section(&api, 1, &sections).await.unwrap_err();

        assert!(matches!(err, ImpactError::Transport(TransportError::Status { .. })));
        assert!(!err.is_not_found());
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_context() {
        let api = school();
        let context = resolve_context(&api, "https://app.schoology.com/assignment/31/info").await.unwrap();

        assert_eq!(context.assignment_id, 31);
        assert_eq!(context.section.id, "300");
        assert_eq!(context.assignment.max_points, Some(20.0));
        assert_eq!(context.assignment.grading_category, Some(5));
        assert_eq!(context.assignment.title.as_deref(), Some("Essay"));
    }
}
