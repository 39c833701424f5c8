mod common;

use std::fs;
use std::path::Path;

use mapconv::{ConvertOptions, MappingFormat, MetadataAggregator, SourceConfig, convert};
use yamllint_rs::{FileProcessor, ProcessingOptions, Severity};

use common::TestContext;

fn convert_customer_to(ctx: &TestContext, to: &str) -> std::path::PathBuf {
    let xml = ctx.source_dir("xml");
    common::write_file(&xml, "crm.Customer.entity.xml", common::CUSTOMER_XML);
    let dest = ctx.work_dir().join("out");

    let report = convert(ConvertOptions {
        sources: vec![SourceConfig { dir: xml, format: "xml".to_string() }],
        to: Some(to.to_string()),
        dest: Some(dest.clone()),
        config: None,
    })
    .unwrap();
    assert_eq!(report.entities, vec!["crm::Customer"]);
    dest
}

#[test]
fn aggregator_collects_across_sources_and_drops_superclasses() {
    let ctx = TestContext::new();
    let xml = ctx.source_dir("xml");
    let entities = ctx.source_dir("entities");
    common::write_file(&xml, "Foo.entity.xml", common::FOO_XML);
    common::write_file(&xml, "Base.entity.xml", common::BASE_XML);
    common::write_file(&entities, "bar.rs", common::BAR_RS);

    let mut aggregator = MetadataAggregator::new();
    aggregator.add_source(&xml, MappingFormat::Xml);
    aggregator.add_source(&entities, MappingFormat::Annotation);

    let records = aggregator.collect().unwrap();
    let names: Vec<_> = records.iter().map(|r| r.name().as_str()).collect();
    assert_eq!(names, vec!["Foo", "Bar"]);
    assert_eq!(records[1].table(), Some("bars"));
    assert_eq!(records[1].fields().len(), 2);
}

#[test]
fn later_sources_override_earlier_records_in_place() {
    let ctx = TestContext::new();
    let xml = ctx.source_dir("xml");
    let yaml = ctx.source_dir("yaml");
    common::write_file(&xml, "Foo.entity.xml", common::FOO_XML);
    common::write_file(
        &xml,
        "Zed.entity.xml",
        "<entity-mapping><entity name=\"Zed\" table=\"zeds\"/></entity-mapping>",
    );
    common::write_file(&yaml, "Zed.entity.yaml", "Zed:\n  table: zeds_override\n");

    let mut aggregator = MetadataAggregator::new();
    aggregator.add_source(&xml, MappingFormat::Xml);
    aggregator.add_source(&yaml, MappingFormat::Yaml);

    let records = aggregator.collect().unwrap();
    let names: Vec<_> = records.iter().map(|r| r.name().as_str()).collect();
    assert_eq!(names, vec!["Foo", "Zed"]);
    assert_eq!(records[1].table(), Some("zeds_override"));
}

#[test]
fn yaml_export_parses_back_to_the_same_records() {
    let ctx = TestContext::new();
    let xml = ctx.source_dir("xml");
    common::write_file(&xml, "crm.Customer.entity.xml", common::CUSTOMER_XML);

    let mut original = MetadataAggregator::new();
    original.add_source(&xml, MappingFormat::Xml);
    let before = original.collect().unwrap();

    let dest = convert_customer_to(&ctx, "yaml");

    let mut reread = MetadataAggregator::new();
    reread.add_source(&dest, MappingFormat::Yaml);
    let after = reread.collect().unwrap();

    assert_eq!(before, after);
}

#[test]
fn annotation_export_parses_back_to_the_same_records() {
    let ctx = TestContext::new();
    let xml = ctx.source_dir("xml");
    common::write_file(&xml, "crm.Customer.entity.xml", common::CUSTOMER_XML);

    let mut original = MetadataAggregator::new();
    original.add_source(&xml, MappingFormat::Xml);
    let before = original.collect().unwrap();

    let dest = convert_customer_to(&ctx, "annotation");
    assert!(dest.join("crm/customer.rs").is_file());

    let mut reread = MetadataAggregator::new();
    reread.add_source(&dest, MappingFormat::Annotation);
    let after = reread.collect().unwrap();

    assert_eq!(before, after);
}

#[test]
fn native_export_writes_constructor_modules() {
    let ctx = TestContext::new();
    let dest = convert_customer_to(&ctx, "native");

    let module = dest.join("crm/customer.rs");
    assert!(module.is_file());
    let source = fs::read_to_string(module).unwrap();
    assert!(source.contains("pub fn metadata() -> Result<EntityMetadata, AppError> {"));
    assert!(source.contains("EntityName::new(\"crm::Customer\")?"));
    assert!(source.contains("metadata.set_table(\"customers\");"));
}

#[test]
fn exported_yaml_passes_lint() {
    let ctx = TestContext::new();
    let dest = convert_customer_to(&ctx, "yaml");

    let files = yaml_files(&dest);
    assert!(!files.is_empty(), "conversion produced no YAML files");

    let mut config = yamllint_rs::config::Config::new();
    config.set_rule_enabled("line-length", false);
    config.set_rule_enabled("document-start", false);

    let processor = FileProcessor::with_config(ProcessingOptions::default(), config);

    let mut errors = Vec::new();
    for file in files {
        match processor.process_file(&file) {
            Ok(result) => {
                let issues: Vec<_> = result
                    .issues
                    .iter()
                    .filter(|(issue, _)| issue.severity == Severity::Error)
                    .collect();
                if !issues.is_empty() {
                    let mut msg = format!("\n  {}:", file.display());
                    for (issue, line) in &issues {
                        msg.push_str(&format!("\n    L{}: {} - {}", issue.line, issue.message, line));
                    }
                    errors.push(msg);
                }
            }
            Err(e) => errors.push(format!("\n  {}: failed to lint - {}", file.display(), e)),
        }
    }

    assert!(errors.is_empty(), "YAML lint errors:{}", errors.join(""));
}

fn yaml_files(root: &Path) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = fs::read_dir(root)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext == "yaml")
        })
        .collect();
    files.sort();
    files
}
