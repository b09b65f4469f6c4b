// src/table/actions.rs
//! Row actions resolved through a single dispatcher keyed by job id.

use super::{JobTable, RowAction};
use crate::errors::{DashboardError, Result};
use crate::render::exception_body;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    ResultView,
    ExceptionView,
}

impl FromStr for Control {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "result_view" => Ok(Control::ResultView),
            "exception_view" => Ok(Control::ExceptionView),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modal {
    pub title: String,
    pub body_html: String,
}

/// What the page should do in response to a row action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum UiCommand {
    Navigate { url: String },
    ShowModal { modal: Modal },
}

/// Detail page for a finished job.
pub fn result_url(job_id: u64) -> String {
    format!("result/{}", job_id)
}

impl JobTable {
    /// Resolves a click on `control` in the row for `job_id`.
    pub fn dispatch(&self, job_id: u64, control: &str) -> Result<UiCommand> {
        let row = self.row(job_id).ok_or(DashboardError::UnknownJob(job_id))?;
        let unavailable = || DashboardError::ActionUnavailable {
            job_id,
            control: control.to_string(),
        };

        let requested = control.parse::<Control>().map_err(|_| unavailable())?;
        if row.action.control() != Some(requested) {
            return Err(unavailable());
        }

        match row.action {
            RowAction::Results => Ok(UiCommand::Navigate {
                url: result_url(job_id),
            }),
            RowAction::ViewException => Ok(UiCommand::ShowModal {
                modal: Modal {
                    title: "Exception".to_string(),
                    body_html: exception_body(row.exception.as_deref().unwrap_or_default()),
                },
            }),
            RowAction::Pending => Err(unavailable()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobRecord, JobSnapshot, JobState, PipelineState, Progress};

    fn table_with(state: &str, exception: Option<&str>) -> JobTable {
        let mut table = JobTable::default();
        table.load(JobSnapshot::new(
            vec![JobRecord {
                job_id: 11,
                task_name: "ProcessData".to_string(),
                created: "2016-03-01T10:00:00Z".to_string(),
                pipeline_state: PipelineState {
                    last_activity_time: Some("2016-03-01T10:01:00Z".to_string()),
                    progress: Progress::new(100.0),
                    state: JobState::from(state.to_string()),
                    exception: exception.map(str::to_string),
                },
                result_path: Some("job_list/11/data/".to_string()),
            }],
            1,
        ));
        table
    }

    #[test]
    fn test_results_navigates_to_result_page() {
        let table = table_with("SUCCESS", None);
        assert_eq!(
            table.dispatch(11, "result_view").unwrap(),
            UiCommand::Navigate { url: "result/11".to_string() }
        );
    }

    #[test]
    fn test_exception_opens_escaped_modal() {
        let table = table_with("FAILURE", Some("KeyError: '<b>'"));
        let UiCommand::ShowModal { modal } = table.dispatch(11, "exception_view").unwrap() else {
            panic!("expected a modal");
        };
        assert_eq!(modal.title, "Exception");
        assert_eq!(modal.body_html, "<pre>KeyError: &#x27;&lt;b&gt;&#x27;</pre>");
    }

    #[test]
    fn test_pending_row_has_no_action() {
        let table = table_with("RUNNING", None);
        assert!(matches!(
            table.dispatch(11, "result_view"),
            Err(DashboardError::ActionUnavailable { job_id: 11, .. })
        ));
    }

    #[test]
    fn test_mismatched_control_and_unknown_job() {
        let table = table_with("SUCCESS", None);
        assert!(matches!(
            table.dispatch(11, "exception_view"),
            Err(DashboardError::ActionUnavailable { .. })
        ));
        assert!(matches!(table.dispatch(12, "result_view"), Err(DashboardError::UnknownJob(12))));
        assert!(matches!(
            table.dispatch(11, "delete"),
            Err(DashboardError::ActionUnavailable { .. })
        ));
    }
}
