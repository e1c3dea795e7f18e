use log::{debug, error, info};
use tokio::task::JoinError;
use crate::error::{ImpactError, WidgetResult};
use crate::models::{AssignmentContext, PageData, SignificancePayload, StatisticsPayload};
use crate::utils::aggregator::{aggregate_category, category_title, fetch_grade_report};
use crate::utils::api::GradesApi;
use crate::utils::impact::project_impact;
use crate::utils::locator::resolve_context;
use crate::utils::ready::{ready_signal, ReadySignal};

// Payloads of one page; a widget that could not be built is `None`.
#[derive(Debug, Default)]
pub struct RenderedWidgets {
    pub statistics: Option<StatisticsPayload>,
    pub significance: Option<SignificancePayload>,
}

fn grading_category_of(context: &AssignmentContext) -> WidgetResult<u64> {
    context
        .assignment
        .grading_category
        .ok_or_else(|| ImpactError::not_found(format!("Grading category of assignment {}", context.assignment_id)))
}

// An assignment without a point value counts as worth nothing.
fn points_of(context: &AssignmentContext) -> f64 {
    context.assignment.max_points.unwrap_or(0.0)
}

// Points and category name of the assignment.
pub fn statistics(page: &PageData) -> WidgetResult<StatisticsPayload> {
    let context = &page.context;
    let category_id = grading_category_of(context)?;
    let grading_category = category_title(&page.report, &context.section.id, category_id)?;

    Ok(StatisticsPayload {
        points: points_of(context) as i64,
        grading_category,
    })
}

// How far the category grade would move if the assignment were fully earned.
pub fn significance(page: &PageData) -> WidgetResult<SignificancePayload> {
    let context = &page.context;
    let category_id = grading_category_of(context)?;
    let aggregate = aggregate_category(&page.report, &context.section.id, context.assignment_id, category_id)?;

    let assignment_points = points_of(context);
    debug!(
        "Category {} holds {}/{} points, assignment is worth {}",
        aggregate.category_title, aggregate.current_points, aggregate.current_total, assignment_points
    );
    let projection = project_impact(aggregate.current_points, aggregate.current_total, assignment_points);

    Ok(SignificancePayload {
        category_title: aggregate.category_title,
        current_percent: projection.current_percent,
        projected_percent: projection.projected_percent,
        hue: projection.hue,
    })
}

// Resolves the assignment and fetches its section's grade report, once for both widgets.
pub async fn load_page<A: GradesApi>(api: &A, page: &str) -> WidgetResult<PageData> {
    let context = resolve_context(api, page).await?;
    let report = fetch_grade_report(api, &context.section.id).await?;

    info!(
        "Assignment {} ({}) loaded, current grade: {}",
        context.assignment_id,
        context.assignment.title.as_deref().unwrap_or("untitled"),
        context.assignment.grade.map_or("ungraded".to_string(), |g| g.to_string())
    );

    Ok(PageData { context, report })
}

// Missing data only skips the widget, anything else is worth an error.
fn report_failure(what: &str, e: &ImpactError) {
    if e.is_not_found() {
        info!("{} skipped: {}", what, e);
    } else {
        error!("{} failed: {}", what, e);
    }
}

async fn widget_task<P, F>(name: &'static str, ready: ReadySignal<PageData>, build: F) -> Option<P>
where
    F: FnOnce(&PageData) -> WidgetResult<P>,
{
    let Some(page) = ready.wait().await else {
        debug!("{} not rendered, no assignment", name);
        return None;
    };

    match build(&page) {
        Ok(payload) => Some(payload),
        Err(e) => {
            report_failure(name, &e);
            None
        },
    }
}

fn joined<P>(result: Result<Option<P>, JoinError>) -> Option<P> {
    result.unwrap_or_else(|e| {
        error!("Widget task failed: {}", e);
        None
    })
}

// Each widget runs as its own task waiting for the page data, so one failing
// widget leaves the other untouched. A failed lookup releases both empty-handed.
pub async fn render_widgets<A: GradesApi>(api: &A, page: &str) -> RenderedWidgets {
    let (notifier, ready) = ready_signal::<PageData>();
    let statistics_task = tokio::spawn(widget_task("Statistics widget", ready.clone(), statistics));
    let significance_task = tokio::spawn(widget_task("Significance widget", ready, significance));

    match load_page(api, page).await {
        Ok(data) => notifier.notify(data),
        Err(e) => {
            report_failure("Assignment lookup", &e);
            drop(notifier);
        },
    }

    RenderedWidgets {
        statistics: joined(statistics_task.await),
        significance: joined(significance_task.await),
    }
}
