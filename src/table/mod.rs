// src/table/mod.rs
//! View-model for the job table.
//!
//! A [`JobTable`] is loaded from successive [`JobSnapshot`]s. Each load
//! rebuilds every row (style class, action cell, progress bar) while the
//! viewer's sort order and page position survive the reload.

pub mod actions;

use crate::models::{JobRecord, JobSnapshot, Progress, RowClass};
use crate::render::{escape_html, progress_bar};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

pub use actions::{Control, Modal, UiCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    JobId,
    TaskName,
    Created,
    LastActivity,
    Progress,
    State,
    Action,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Column {
    pub key: ColumnKey,
    pub title: &'static str,
    /// Hidden columns carry no data of their own; they only hold rendered controls.
    pub visible: bool,
}

pub const COLUMNS: [Column; 7] = [
    Column { key: ColumnKey::JobId, title: "Job ID", visible: true },
    Column { key: ColumnKey::TaskName, title: "Task", visible: true },
    Column { key: ColumnKey::Created, title: "Created", visible: true },
    Column { key: ColumnKey::LastActivity, title: "Last Activity", visible: true },
    Column { key: ColumnKey::Progress, title: "Progress", visible: true },
    Column { key: ColumnKey::State, title: "State", visible: true },
    Column { key: ColumnKey::Action, title: "", visible: false },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortOrder {
    pub column: ColumnKey,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            column: ColumnKey::JobId,
            direction: SortDirection::Desc,
        }
    }
}

/// The control placed in a row's action cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Results,
    ViewException,
    Pending,
}

impl RowAction {
    pub fn for_class(class: RowClass) -> Self {
        match class {
            RowClass::Success => RowAction::Results,
            RowClass::Danger => RowAction::ViewException,
            RowClass::Info => RowAction::Pending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Results => "Results",
            RowAction::ViewException => "View Exception",
            RowAction::Pending => "Pending",
        }
    }

    pub fn enabled(&self) -> bool {
        self.control().is_some()
    }

    pub fn control(&self) -> Option<Control> {
        match self {
            RowAction::Results => Some(Control::ResultView),
            RowAction::ViewException => Some(Control::ExceptionView),
            RowAction::Pending => None,
        }
    }

    fn button_html(&self, job_id: u64) -> String {
        match self {
            RowAction::Results => format!(
                r#"<button class="btn btn-success btn-block btn-xs" name="result_view_btn" data-control="result_view" data-job-id="{}">Results</button>"#,
                job_id
            ),
            RowAction::ViewException => format!(
                r#"<button class="btn btn-danger btn-block btn-xs" name="exception_view_button" data-control="exception_view" data-job-id="{}">View Exception</button>"#,
                job_id
            ),
            RowAction::Pending => {
                r#"<button class="btn btn-info btn-block btn-xs" disabled>Pending</button>"#.to_string()
            }
        }
    }
}

/// One rendered row. Raw service text is kept unescaped here; escaping happens in `render_html`.
#[derive(Debug, Clone, Serialize)]
pub struct JobRow {
    pub job_id: u64,
    pub task_name: String,
    pub created: String,
    pub last_activity: String,
    pub progress: Progress,
    pub state: String,
    pub class: RowClass,
    pub action: RowAction,
    pub result_path: Option<String>,
    pub exception: Option<String>,
    pub progress_html: String,
    pub action_html: String,
}

impl JobRow {
    fn from_record(record: JobRecord, clamp_progress: bool) -> Self {
        let state = record.pipeline_state;
        let class = state.state.row_class();
        let action = RowAction::for_class(class);
        let progress = if clamp_progress {
            state.progress.clamped()
        } else {
            state.progress
        };

        Self {
            job_id: record.job_id,
            task_name: record.task_name,
            created: record.created,
            last_activity: state.last_activity_time.unwrap_or_default(),
            progress,
            state: state.state.to_string(),
            class,
            action,
            result_path: record.result_path,
            exception: state.exception,
            progress_html: progress_bar(progress),
            action_html: action.button_html(record.job_id),
        }
    }

    fn compare(&self, other: &Self, column: ColumnKey) -> Ordering {
        match column {
            ColumnKey::JobId | ColumnKey::Action => self.job_id.cmp(&other.job_id),
            ColumnKey::TaskName => self.task_name.cmp(&other.task_name),
            ColumnKey::Created => self.created.cmp(&other.created),
            ColumnKey::LastActivity => self.last_activity.cmp(&other.last_activity),
            ColumnKey::Progress => self
                .progress
                .partial_cmp(&other.progress)
                .unwrap_or(Ordering::Equal),
            ColumnKey::State => self.state.cmp(&other.state),
        }
    }

    fn cell_html(&self, column: ColumnKey) -> String {
        match column {
            ColumnKey::JobId => self.job_id.to_string(),
            ColumnKey::TaskName => escape_html(&self.task_name),
            ColumnKey::Created => escape_html(&self.created),
            ColumnKey::LastActivity => escape_html(&self.last_activity),
            ColumnKey::Progress => self.progress_html.clone(),
            ColumnKey::State => escape_html(&self.state),
            ColumnKey::Action => self.action_html.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableOptions {
    pub page_size: usize,
    pub clamp_progress: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            clamp_progress: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobTable {
    options: TableOptions,
    rows: Vec<JobRow>,
    sort: SortOrder,
    page: usize,
    sequence: Option<u64>,
    fetched_at: Option<DateTime<Utc>>,
}

impl JobTable {
    pub fn new(options: TableOptions) -> Self {
        Self {
            options,
            rows: Vec::new(),
            sort: SortOrder::default(),
            page: 0,
            sequence: None,
            fetched_at: None,
        }
    }

    pub fn columns() -> &'static [Column] {
        &COLUMNS
    }

    /// Replaces the rows with `snapshot`, keeping sort and page position.
    ///
    /// Returns `false` and leaves the table untouched when a newer snapshot
    /// has already been applied.
    pub fn load(&mut self, snapshot: JobSnapshot) -> bool {
        if let Some(current) = self.sequence {
            if snapshot.sequence <= current {
                return false;
            }
        }

        let clamp = self.options.clamp_progress;
        self.rows = snapshot
            .jobs
            .into_iter()
            .map(|record| JobRow::from_record(record, clamp))
            .collect();
        self.sequence = Some(snapshot.sequence);
        self.fetched_at = Some(snapshot.fetched_at);
        self.apply_sort();
        self.page = self.page.min(self.page_count().saturating_sub(1));
        true
    }

    pub fn sort_by(&mut self, column: ColumnKey, direction: SortDirection) {
        self.sort = SortOrder { column, direction };
        self.apply_sort();
    }

    fn apply_sort(&mut self) {
        let SortOrder { column, direction } = self.sort;
        self.rows.sort_by(|a, b| {
            let ord = a.compare(b, column).then_with(|| a.job_id.cmp(&b.job_id));
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
    }

    pub fn rows(&self) -> &[JobRow] {
        &self.rows
    }

    pub fn row(&self, job_id: u64) -> Option<&JobRow> {
        self.rows.iter().find(|row| row.job_id == job_id)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        let size = self.options.page_size.max(1);
        self.rows.len().div_ceil(size).max(1)
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.min(self.page_count() - 1);
    }

    pub fn page_rows(&self) -> &[JobRow] {
        let size = self.options.page_size.max(1);
        let start = (self.page * size).min(self.rows.len());
        let end = (start + size).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Renders the current page as a `<table id="job_table">` fragment.
    pub fn render_html(&self) -> String {
        let mut html = String::from(r#"<table id="job_table" class="table table-condensed">"#);
        html.push_str("<thead><tr>");
        for column in COLUMNS.iter() {
            html.push_str(&format!("<th>{}</th>", column.title));
        }
        html.push_str("</tr></thead><tbody>");

        for row in self.page_rows() {
            html.push_str(&format!(
                r#"<tr class="{}" data-job-id="{}">"#,
                row.class.css(),
                row.job_id
            ));
            for column in COLUMNS.iter() {
                html.push_str(&format!("<td>{}</td>", row.cell_html(column.key)));
            }
            html.push_str("</tr>");
        }

        html.push_str("</tbody></table>");
        html
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new(TableOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobState, PipelineState};

    fn record(job_id: u64, state: &str, progress: f64) -> JobRecord {
        JobRecord {
            job_id,
            task_name: format!("task-{}", job_id),
            created: format!("2016-03-0{}T10:00:00Z", job_id % 9 + 1),
            pipeline_state: PipelineState {
                last_activity_time: None,
                progress: Progress::new(progress),
                state: JobState::from(state.to_string()),
                exception: None,
            },
            result_path: None,
        }
    }

    #[test]
    fn test_rows_sorted_newest_first() {
        let mut table = JobTable::default();
        table.load(JobSnapshot::new(
            vec![record(2, "SUCCESS", 100.0), record(9, "PENDING", 0.0), record(5, "FAILURE", 30.0)],
            1,
        ));

        let ids: Vec<u64> = table.rows().iter().map(|r| r.job_id).collect();
        assert_eq!(ids, vec![9, 5, 2]);
    }

    #[test]
    fn test_sort_survives_reload() {
        let mut table = JobTable::default();
        table.sort_by(ColumnKey::Progress, SortDirection::Asc);
        table.load(JobSnapshot::new(vec![record(1, "RUNNING", 80.0), record(2, "RUNNING", 10.0)], 1));
        table.load(JobSnapshot::new(vec![record(1, "RUNNING", 5.0), record(2, "RUNNING", 60.0)], 2));

        let ids: Vec<u64> = table.rows().iter().map(|r| r.job_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(table.sort_order().column, ColumnKey::Progress);
    }

    #[test]
    fn test_stale_snapshot_is_ignored() {
        let mut table = JobTable::default();
        assert!(table.load(JobSnapshot::new(vec![record(1, "SUCCESS", 100.0)], 5)));
        assert!(!table.load(JobSnapshot::new(vec![record(1, "RUNNING", 10.0)], 4)));

        assert_eq!(table.rows()[0].class, RowClass::Success);
        assert_eq!(table.sequence(), Some(5));
    }

    #[test]
    fn test_page_position_kept_and_clamped() {
        let mut table = JobTable::new(TableOptions { page_size: 2, clamp_progress: false });
        table.load(JobSnapshot::new((1..=5).map(|id| record(id, "RUNNING", 1.0)).collect(), 1));
        table.set_page(2);
        assert_eq!(table.page_rows().len(), 1);

        table.load(JobSnapshot::new((1..=6).map(|id| record(id, "RUNNING", 1.0)).collect(), 2));
        assert_eq!(table.page(), 2);

        table.load(JobSnapshot::new(vec![record(1, "RUNNING", 1.0)], 3));
        assert_eq!(table.page(), 0);
        assert_eq!(table.page_rows().len(), 1);
    }

    #[test]
    fn test_clamp_option() {
        let mut table = JobTable::new(TableOptions { page_size: 10, clamp_progress: true });
        table.load(JobSnapshot::new(vec![record(1, "RUNNING", 120.0)], 1));
        assert!(table.rows()[0].progress_html.contains("width: 100%;"));
    }

    #[test]
    fn test_render_escapes_task_name() {
        let mut bad = record(3, "RUNNING", 10.0);
        bad.task_name = "<img src=x>".to_string();
        let mut table = JobTable::default();
        table.load(JobSnapshot::new(vec![bad], 1));

        let html = table.render_html();
        assert!(html.contains("&lt;img src=x&gt;"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_columns_have_one_hidden_action_cell() {
        let hidden: Vec<ColumnKey> = JobTable::columns()
            .iter()
            .filter(|c| !c.visible)
            .map(|c| c.key)
            .collect();
        assert_eq!(hidden, vec![ColumnKey::Action]);
        assert_eq!(JobTable::columns().len(), 7);
    }
}
