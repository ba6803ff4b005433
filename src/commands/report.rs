use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use chrono::Local;
use serde::Deserialize;
use tracing::warn;

use crate::commands::{AppState, CommandError};
use crate::models::assessment::AssessmentReport;
use crate::models::behavior::{BehavioralData, ProductivityData};
use crate::models::recommendation::RiskLevel;

const DEFAULT_WORK_HOURS: f64 = 9.5;
const DEFAULT_BREAKS: u32 = 3;
const DEFAULT_COMPLETION_RATE: f64 = 0.75;

#[derive(Debug, Clone, Deserialize)]
pub struct ReportForm {
    pub avg_work_hours: f64,
    pub avg_breaks: u32,
    pub task_completion_rate: f64,
    #[serde(default)]
    pub text: String,
}

impl Default for ReportForm {
    fn default() -> Self {
        Self {
            avg_work_hours: DEFAULT_WORK_HOURS,
            avg_breaks: DEFAULT_BREAKS,
            task_completion_rate: DEFAULT_COMPLETION_RATE,
            text: String::new(),
        }
    }
}

pub async fn index_page() -> Html<String> {
    Html(render_page(&render_form(&ReportForm::default(), None)))
}

/// Form submissions carry a break count; the model expects minutes and a
/// meeting load the form never asks for.
pub async fn submit_report(State(state): State<AppState>, Form(form): Form<ReportForm>) -> Response {
    if form.text.trim().is_empty() {
        warn!(target: "app::command", "report requested without a message");
        let body = render_form(
            &form,
            Some("Please enter some text in the message box to perform an analysis."),
        );
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(render_page(&body))).into_response();
    }

    let config = state.config();
    let behavioral = BehavioralData {
        avg_work_hours_per_day: form.avg_work_hours,
        avg_break_time_minutes: f64::from(form.avg_breaks) * config.assessment.break_minutes_per_break,
        meeting_hours_per_week: config.assessment.default_meeting_hours_per_week,
    };
    let productivity = ProductivityData {
        task_completion_rate: form.task_completion_rate,
    };

    match state
        .assessments()
        .assess_text(behavioral, productivity, form.text.clone())
        .await
    {
        Ok(report) => Html(render_page(&render_report(&report))).into_response(),
        Err(err) => {
            let error = CommandError::from(err);
            let status = error.status();
            let body = render_form(&form, Some(&error.message));
            (status, Html(render_page(&body))).into_response()
        }
    }
}

fn render_page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Burnout Detection</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px auto; max-width: 760px; color: #222; }}
        label {{ display: block; margin-top: 18px; font-weight: bold; }}
        input[type=range] {{ width: 100%; }}
        textarea {{ width: 100%; height: 120px; }}
        button {{ margin-top: 24px; width: 100%; padding: 12px; font-size: 1em; }}
        .error {{ background: #fdecea; padding: 12px; border-radius: 4px; }}
        .report {{ border: 1px solid #ddd; border-radius: 6px; padding: 24px; }}
        .metrics {{ display: flex; gap: 40px; }}
        .level-low {{ background: #e7f6ec; padding: 12px; }}
        .level-warn {{ background: #fff4e0; padding: 12px; }}
        .level-critical {{ background: #fdecea; padding: 12px; }}
        .suggestion {{ background: #e8f1fb; padding: 12px; margin-top: 12px; }}
    </style>
</head>
<body>
    <h1>Burnout Detection</h1>
{body}
</body>
</html>"#
    )
}

fn render_form(form: &ReportForm, error: Option<&str>) -> String {
    let error_block = error
        .map(|message| format!(r#"    <p class="error">{}</p>"#, escape_html(message)))
        .unwrap_or_default();

    format!(
        r#"{error_block}
    <form method="post" action="/report">
        <h2>Behavioral Data</h2>
        <label for="avg_work_hours">Average Daily Work Hours</label>
        <input type="range" id="avg_work_hours" name="avg_work_hours" min="4" max="16" step="0.5" value="{hours}">
        <label for="avg_breaks">Average Number of Breaks Per Day</label>
        <input type="range" id="avg_breaks" name="avg_breaks" min="0" max="15" step="1" value="{breaks}">
        <label for="task_completion_rate">Task Completion Rate</label>
        <input type="range" id="task_completion_rate" name="task_completion_rate" min="0" max="1" step="0.05" value="{rate}">
        <h2>Emotion Analysis</h2>
        <label for="text">Enter a message that reflects your current feelings about work:</label>
        <textarea id="text" name="text" placeholder="e.g. The workload has been overwhelming lately.">{text}</textarea>
        <button type="submit">Analyze My Burnout Risk</button>
    </form>"#,
        hours = form.avg_work_hours,
        breaks = form.avg_breaks,
        rate = form.task_completion_rate,
        text = escape_html(&form.text),
    )
}

fn render_report(report: &AssessmentReport) -> String {
    let level_class = match report.risk_level {
        RiskLevel::Low => "level-low",
        RiskLevel::Medium | RiskLevel::High => "level-warn",
        RiskLevel::Critical => "level-critical",
    };

    format!(
        r#"    <div class="report">
        <h2>Wellness Report</h2>
        <p>Generated on: {generated}</p>
        <div class="metrics">
            <div>
                <h3>Emotion Analysis</h3>
                <p class="metric">Sentiment Score: <strong>{sentiment:.2}</strong></p>
                <small>From -1.0 (Negative) to 1.0 (Positive).</small>
            </div>
            <div>
                <h3>Burnout Risk</h3>
                <p class="metric">Calculated Risk Score: <strong>{score:.2}</strong></p>
                <small>From 0.0 (Low Risk) to 1.0 (High Risk).</small>
            </div>
        </div>
        <h3>Personalized Recommendation</h3>
        <p class="{level_class}"><strong>{level} Risk:</strong> {message}</p>
        <p class="suggestion"><strong>Actionable Suggestion:</strong> {suggestion}</p>
        <p><a href="/">Run another analysis</a></p>
    </div>"#,
        generated = Local::now().format("%Y-%m-%d %H:%M:%S"),
        sentiment = report.sentiment_score,
        score = report.risk_score,
        level = report.risk_level,
        message = escape_html(&report.message),
        suggestion = escape_html(&report.suggestion),
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
