use std::fmt::Write;

use chrono::NaiveDate;

use crate::config::ReportConfig;
use crate::models::{AggregationResult, PredictionResult, PredictionStatus};

pub fn build_sgpa_report(
    config: &ReportConfig,
    generated_on: NaiveDate,
    result: &AggregationResult,
) -> String {
    let decimals = config.decimals;
    let mut output = String::new();

    let _ = writeln!(output, "# {}", config.title);
    let _ = writeln!(output, "Generated on {}", generated_on);
    let _ = writeln!(output);
    let _ = writeln!(output, "SGPA: **{:.*}**", decimals, result.sgpa);
    let _ = writeln!(output, "Total credits: {}", result.total_credits);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Subjects");

    if result.subject_results.is_empty() {
        let _ = writeln!(output, "No subjects were graded.");
    } else {
        let _ = writeln!(output, "| Subject | Credits | Percentage | Grade point |");
        let _ = writeln!(output, "| --- | ---: | ---: | ---: |");
        for subject in result.subject_results.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {:.*}% | {:.*} |",
                subject.name,
                subject.credit,
                decimals,
                subject.final_percentage,
                decimals,
                subject.grade_point
            );
        }
    }

    output
}

pub fn build_prediction_report(
    config: &ReportConfig,
    generated_on: NaiveDate,
    target: f64,
    result: &PredictionResult,
) -> String {
    let decimals = config.decimals;
    let mut output = String::new();

    let _ = writeln!(output, "# {}", config.title);
    let _ = writeln!(
        output,
        "Generated on {} for a target SGPA of {:.*}",
        generated_on, decimals, target
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "Status: **{}**", result.status);
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", result.message);

    if let Some(percentage) = result.required_percentage {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Required score on every pending component: **{:.*}%**",
            decimals, percentage
        );
    }

    if result.status == PredictionStatus::Success {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Required Scores");
        let _ = writeln!(output, "| Subject | Component | Marks needed |");
        let _ = writeln!(output, "| --- | --- | ---: |");
        for required in result.required_marks.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {:.*} / {} |",
                required.subject_name,
                required.component_name,
                decimals,
                required.marks_needed,
                required.total_marks
            );
        }
    }

    output
}
