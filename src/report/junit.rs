use super::types::ProbeResults;
use crate::runner::state::{ProbeStateReport, ProbeStatus};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const JUNIT_FILE: &str = "junit.xml";

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Generate JUnit XML report string from ProbeResults
pub fn generate_junit_xml(results: &ProbeResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let tests = results.steps.len().to_string();
    let failures = results.summary.failed.to_string();
    let skipped = results.summary.skipped.to_string();
    let time = seconds(results.summary.total_duration_ms.unwrap_or(0));

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "gateway-probe-run"));
    suites_start.push_attribute(("tests", tests.as_str()));
    suites_start.push_attribute(("failures", failures.as_str()));
    suites_start.push_attribute(("skipped", skipped.as_str()));
    suites_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    // One suite per gateway
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", results.base_url.as_str()));
    suite_start.push_attribute(("tests", tests.as_str()));
    suite_start.push_attribute(("failures", failures.as_str()));
    suite_start.push_attribute(("skipped", skipped.as_str()));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute(("time", time.as_str()));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for step in &results.steps {
        write_test_case(&mut writer, step)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    step: &ProbeStateReport,
) -> Result<()> {
    let name = format!("{}. {}", step.number, step.step.description());
    let time = seconds(step.duration_ms.unwrap_or(0));

    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", name.as_str()));
    case_start.push_attribute(("classname", format!("gateway.{}", step.step).as_str()));
    case_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(case_start))?;

    match &step.status {
        ProbeStatus::Failed { error } => {
            let mut fail_start = BytesStart::new("failure");
            fail_start.push_attribute(("message", error.as_str()));
            fail_start.push_attribute(("type", "ProbeFailure"));
            writer.write_event(Event::Start(fail_start))?;
            if let Some(body) = &step.body {
                writer.write_event(Event::Text(BytesText::new(body)))?;
            }
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
        }
        ProbeStatus::Skipped { reason } => {
            let mut skip = BytesStart::new("skipped");
            skip.push_attribute(("message", reason.as_str()));
            writer.write_event(Event::Empty(skip))?;
        }
        _ => {}
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write junit.xml into the output directory
pub fn write_report(results: &ProbeResults, output_dir: &Path) -> Result<PathBuf> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join(JUNIT_FILE);
    std::fs::write(&path, xml)?;
    Ok(path)
}
