use anyhow::Result;
use colored::*;
use quality_core::{AuditResult, MetricSpec, ToleranceRule, ToleranceSpec};
use serde_json::json;

pub fn print_check_report(
    spec: &ToleranceSpec,
    basic: &[MetricSpec],
    quality: &[MetricSpec],
    format: &str,
) -> Result<()> {
    match format {
        "json" => print_json_check(spec, basic, quality),
        _ => {
            print_text_check(spec, basic, quality);
            Ok(())
        }
    }
}

fn print_text_check(spec: &ToleranceSpec, basic: &[MetricSpec], quality: &[MetricSpec]) {
    print_info(&format!(
        "Tolerance spec loaded: {} ({} tolerances)",
        spec.urn,
        spec.tolerances.len()
    ));
    print_success("Tolerance spec is valid");

    println!("\nTolerances:");
    for tolerance in &spec.tolerances {
        let target = if tolerance.field_id.is_empty() {
            "<table>"
        } else {
            tolerance.field_id.as_str()
        };
        println!(
            "  {:<20} {:<24} {}",
            target,
            tolerance.metric_name.to_string(),
            format_rules(&tolerance.tolerance_rules)
        );
        if !tolerance.condition.is_empty() {
            println!("  {:<20} where {}", "", tolerance.condition.dimmed());
        }
    }

    println!("\nBasic Metric Specs: {}", basic.len());
    for spec in basic {
        println!("  - {}", spec);
    }

    println!("\nQuality Metric Specs: {}", quality.len());
    for spec in quality {
        let optional = if spec.optional { " (optional)" } else { "" };
        println!("  - {}{}", spec, optional.dimmed());
    }
}

fn print_json_check(spec: &ToleranceSpec, basic: &[MetricSpec], quality: &[MetricSpec]) -> Result<()> {
    let output = json!({
        "urn": spec.urn,
        "tolerances": spec.tolerances,
        "basic_metric_specs": basic,
        "quality_metric_specs": quality,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_audit_result(result: &AuditResult, format: &str) -> Result<()> {
    match format {
        "json" => print_json_audit(result),
        _ => {
            print_text_audit(result);
            Ok(())
        }
    }
}

fn print_text_audit(result: &AuditResult) {
    println!("\n{}", "═".repeat(60));
    println!("{}", "  AUDIT REPORT".bold());
    println!("{}", "═".repeat(60));

    println!("\n  Table:    {}", result.audit.urn);
    println!("  Records:  {}", result.audit.total_records);
    println!("  Audit ID: {}", result.audit.id);

    if !result.reports.is_empty() {
        println!("\n{}", "Metrics:".bold());
        for report in &result.reports {
            let mark = if report.pass_flag {
                "✓".green().bold()
            } else {
                "✗".red().bold()
            };
            let mut target = report.metric_name.to_string();
            if !report.field_id.is_empty() {
                target.push_str(&format!(" of {}", report.field_id));
            }
            if !report.group_value.is_empty() {
                target.push_str(&format!(" [{}]", report.group_value));
            }
            println!(
                "  {} {:<40} {:>10.2}   {}",
                mark,
                target,
                report.metric_value,
                format_rules(&report.tolerance_rules).dimmed()
            );
        }
    }

    if result.summary.is_pass {
        println!("\n{} {}", "✓".green().bold(), "Audit PASSED".green().bold());
        println!("  {}", result.summary.message);
    } else {
        println!("\n{} {}", "✗".red().bold(), "Audit FAILED".red().bold());
        println!("\n{}", "Issues:".red().bold());
        for line in result.summary.message.lines() {
            println!("  {}", line.red());
        }
    }

    let failed = result.reports.iter().filter(|r| !r.pass_flag).count();
    println!("\n{}", "Summary:".bold());
    println!("  Total metrics:  {}", result.reports.len());
    println!("  Failed metrics: {}", failed);
    println!("{}", "═".repeat(60));
}

fn print_json_audit(result: &AuditResult) -> Result<()> {
    let output = json!({
        "passed": result.summary.is_pass,
        "message": result.summary.message,
        "audit": {
            "id": result.audit.id,
            "urn": result.audit.urn,
            "status": result.audit.status,
            "total_records": result.audit.total_records,
            "event_timestamp": result.audit.event_timestamp,
        },
        "reports": result.reports,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn format_rules(rules: &[ToleranceRule]) -> String {
    rules
        .iter()
        .map(|rule| format!("{} {}", rule.comparator, rule.value))
        .collect::<Vec<_>>()
        .join(" and ")
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
