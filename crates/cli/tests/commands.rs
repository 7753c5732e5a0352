use std::fs;
use tag_genie_core::config::AppConfig;
use tag_genie_core::error::PipelineError;
use tempfile::tempdir;

fn noop_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.classifier.provider = "noop".to_string();
    cfg.classifier.concurrency = 2;
    cfg
}

#[tokio::test]
async fn process_with_unavailable_classifier_keeps_every_row() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("raw.csv");
    let output = temp.path().join("processed.csv");
    fs::write(
        &input,
        "Name,Category,Description\nAcme,Legal & Immigration,Visa help\nEmpty,Real Estate,\n",
    )
    .unwrap();

    let out = cli::commands::process(
        &noop_config(),
        &input,
        &output,
        "Description",
        vec!["Legal Services and Immigration Consultants".to_string()],
        false,
    )
    .await
    .unwrap();
    assert!(out.starts_with("Success! Processed file saved to"));
    assert!(out.contains("1 of 2 rows could not be classified"));

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "Name,Category,Description,Predicted_Tag,Confidence_Score");
    assert_eq!(lines[1], "Acme,Legal & Immigration,Visa help,ERROR,0.0");
    assert_eq!(lines[2], "Empty,Real Estate,,None of the above,1.0");
}

#[tokio::test]
async fn process_missing_column_is_user_facing() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("raw.csv");
    fs::write(&input, "Name\nAcme\n").unwrap();

    let err = cli::commands::process(
        &noop_config(),
        &input,
        &temp.path().join("out.csv"),
        "Description",
        vec![],
        false,
    )
    .await
    .unwrap_err();
    let pipeline_err = err.downcast_ref::<PipelineError>().unwrap();
    assert!(pipeline_err.is_user_facing());
    assert_eq!(
        pipeline_err.to_string(),
        format!(
            "Column 'Description' not found in the CSV header of '{}'.",
            input.display()
        )
    );
}

#[test]
fn audit_then_clean_end_to_end() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("processed.csv");
    let output = temp.path().join("clean.csv");
    fs::write(
        &input,
        "Name,Category,Predicted_Tag,Confidence_Score\n\
         Smith & Co,Real Estate,Legal Services and Immigration Consultants,0.9\n\
         Jones,Finance & Tax,Chartered Accountants and Tax Consultants,0.4\n",
    )
    .unwrap();
    let cfg = noop_config();

    let audit = cli::commands::audit(&cfg, &input, false).unwrap();
    assert!(audit.contains("Risk Analysis Summary"));
    assert!(audit.contains("DANGER ZONE EXAMPLES"));
    assert!(audit.contains("Smith & Co"));

    let audit_json = cli::commands::audit(&cfg, &input, true).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&audit_json).unwrap();
    assert_eq!(parsed["total"], 2);
    assert_eq!(parsed["high_confidence_disagreements"], 1);

    let clean_json = cli::commands::clean(&cfg, &input, &output, true).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&clean_json).unwrap();
    assert_eq!(parsed["auto_fixed"], 1);
    assert_eq!(parsed["needs_review"], 1);

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("AUTO_FIXED,Legal"));
    assert!(written.contains("NEEDS_REVIEW,Finance & Tax"));
}

#[test]
fn custom_taxonomy_from_config_drives_clean() {
    let temp = tempdir().unwrap();
    let taxonomy = temp.path().join("taxonomy.toml");
    fs::write(
        &taxonomy,
        "[[labels]]\nlabel = \"Plumbing and Heating Contractors\"\ncategory = \"Trades\"\nfinal = \"Plumbing\"\n",
    )
    .unwrap();
    let input = temp.path().join("processed.csv");
    let output = temp.path().join("clean.csv");
    fs::write(
        &input,
        "Name,Category,Predicted_Tag,Confidence_Score\nPipes Inc,Retail,Plumbing and Heating Contractors,0.97\n",
    )
    .unwrap();

    let mut cfg = noop_config();
    cfg.taxonomy.path = Some(taxonomy.to_string_lossy().into_owned());
    let out = cli::commands::clean(&cfg, &input, &output, false).unwrap();
    assert!(out.contains("WARNING: 1 row(s)"));
    assert!(fs::read_to_string(&output)
        .unwrap()
        .contains("AUTO_FIXED,Plumbing"));
}

#[test]
fn audit_missing_input_is_user_facing() {
    let temp = tempdir().unwrap();
    let err = cli::commands::audit(&noop_config(), &temp.path().join("nope.csv"), false)
        .unwrap_err();
    assert!(err
        .downcast_ref::<PipelineError>()
        .map(|e| e.is_user_facing())
        .unwrap_or(false));
}
