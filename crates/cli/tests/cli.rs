use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn write_doc(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("write test document");
}

fn seed_documents(dir: &Path) {
    write_doc(
        dir,
        "alpha.txt",
        "Revenue grew by twelve percent over the quarter. Operating costs were stable \
         across every region. Research spending doubled compared to the prior year.\n\n\
         Hiring slowed in the second half of the year. Attrition remained low across \
         all teams. Office consolidation saved roughly four million in rent.",
    );
    write_doc(
        dir,
        "beta.txt",
        "The main competitor launched a rival product in March. Overall market share \
         dipped slightly in the following weeks. Pricing held firm despite sustained \
         pressure from resellers.",
    );
}

fn docmind() -> Command {
    let mut cmd = Command::cargo_bin("docmind").expect("binary builds");
    cmd.env("DOCMIND_EMBEDDING_MODE", "stub");
    cmd
}

#[test]
fn analyze_writes_a_ranked_report() {
    let dir = TempDir::new().unwrap();
    seed_documents(dir.path());
    let report_path = dir.path().join("out/report.json");

    docmind()
        .args([
            "analyze",
            "--input-dir",
            dir.path().to_str().unwrap(),
            "--persona",
            "Investment Analyst",
            "--job",
            "analyze revenue trends",
            "--top-k",
            "2",
            "--output",
            report_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let raw = std::fs::read_to_string(&report_path).unwrap();
    let report: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let sections = report["extracted_sections"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["importance_rank"], 1);
    assert_eq!(sections[1]["importance_rank"], 2);

    // Two documents and k=2: coverage guarantees one section from each.
    let docs: std::collections::HashSet<&str> = sections
        .iter()
        .map(|s| s["document"].as_str().unwrap())
        .collect();
    assert_eq!(docs.len(), 2);

    assert_eq!(report["metadata"]["persona"], "Investment Analyst");
    assert_eq!(
        report["subsection_analysis"].as_array().unwrap().len(),
        sections.len()
    );
}

#[test]
fn summarize_respects_the_word_budget() {
    let dir = TempDir::new().unwrap();
    seed_documents(dir.path());

    let output = docmind()
        .args([
            "summarize",
            "--input-dir",
            dir.path().to_str().unwrap(),
            "--persona",
            "Investment Analyst",
            "--job",
            "analyze revenue trends",
            "--max-words",
            "30",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let summary = report["cohesive_summary"].as_str().unwrap();
    assert!(summary.split_whitespace().count() <= 30);
    assert_eq!(
        report["summary_word_count"],
        summary.split_whitespace().count()
    );
}

#[test]
fn process_runs_a_json_request() {
    let dir = TempDir::new().unwrap();
    let docs_dir = dir.path().join("input");
    std::fs::create_dir(&docs_dir).unwrap();
    seed_documents(&docs_dir);

    let request = serde_json::json!({
        "challenge_info": {
            "challenge_id": "round_003",
            "test_case_name": "quarterly_review"
        },
        "documents": [
            {"filename": "alpha.txt", "title": "Alpha Quarterly"},
            {"filename": "beta.txt"}
        ],
        "persona": {"role": "Investment Analyst"},
        "job_to_be_done": {"task": "analyze revenue trends"}
    });
    let request_path = dir.path().join("request.json");
    std::fs::write(&request_path, request.to_string()).unwrap();
    let report_path = dir.path().join("report.json");

    docmind()
        .args([
            "process",
            "--input",
            request_path.to_str().unwrap(),
            "--output",
            report_path.to_str().unwrap(),
            "--base-dir",
            docs_dir.to_str().unwrap(),
        ])
        .assert()
        .success();

    let raw = std::fs::read_to_string(&report_path).unwrap();
    let report: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(report["metadata"]["persona"], "Investment Analyst");
    assert_eq!(report["metadata"]["job_to_be_done"], "analyze revenue trends");
    assert!(!report["extracted_sections"].as_array().unwrap().is_empty());
}

#[test]
fn process_rejects_an_invalid_request() {
    let dir = TempDir::new().unwrap();
    let docs_dir = dir.path().join("input");
    std::fs::create_dir(&docs_dir).unwrap();
    seed_documents(&docs_dir);

    let request = serde_json::json!({
        "challenge_info": {"challenge_id": "r", "test_case_name": "t"},
        "documents": [],
        "persona": {"role": "Analyst"},
        "job_to_be_done": {"task": "review"}
    });
    let request_path = dir.path().join("request.json");
    std::fs::write(&request_path, request.to_string()).unwrap();

    docmind()
        .args([
            "process",
            "--input",
            request_path.to_str().unwrap(),
            "--output",
            dir.path().join("report.json").to_str().unwrap(),
            "--base-dir",
            docs_dir.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-empty"));
}

#[test]
fn analyze_on_an_empty_directory_reports_empty_results() {
    let dir = TempDir::new().unwrap();

    let output = docmind()
        .args([
            "analyze",
            "--input-dir",
            dir.path().to_str().unwrap(),
            "--persona",
            "Analyst",
            "--job",
            "review",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(report["extracted_sections"].as_array().unwrap().is_empty());
    assert_eq!(report["metadata"]["total_fragments"], 0);
}
