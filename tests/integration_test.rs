/// End-to-end tests for the evidence pipeline.
///
/// Tests the complete flow:
///   Filing on disk → parse → chunk → persist → score → summarize → report
use evidence_collector::collect::Collector;
use evidence_collector::config::Config;
use evidence_collector::db::Db;
use evidence_collector::parser::DocumentParser;
use evidence_collector::parser::chunker::SemanticChunker;
use evidence_collector::report;
use evidence_collector::signals::{
    DigitalPresenceScorer, JobPosting, PageText, Patent, SignalCategory,
};
use evidence_collector::sources::Observations;
use evidence_collector::sources::mock::FixtureSource;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use tokio::sync::Mutex as TokioMutex;

const ABOUT: &str = "Our CEO, our president and the board of our firm meet every spring \
                     to review the cloud strategy and digital roadmap for our customers.";

fn words(prefix: &str, n: usize) -> String {
    (0..n).map(|i| format!("{prefix}{i}")).collect::<Vec<_>>().join(" ")
}

fn write_filing(root: &Path) -> std::path::PathBuf {
    let dir = root.join("WMT").join("10-K").join("0000104169-24-000012");
    fs::create_dir_all(&dir).unwrap();
    let html = format!(
        "<html><body>\
         <p>ITEM 1. BUSINESS</p><p>{}</p>\
         <p>ITEM 1A. RISK FACTORS</p><p>{}</p>\
         <p>ITEM 7. MANAGEMENT'S DISCUSSION AND ANALYSIS</p><p>{}</p>\
         </body></html>",
        words("biz", 150),
        words("risk", 150),
        words("mda", 150),
    );
    let path = dir.join("primary-document.html");
    fs::write(&path, html).unwrap();
    path
}

fn observations() -> Observations {
    Observations {
        postings: vec![
            JobPosting {
                title: "Machine Learning Engineer".to_string(),
                description: "Build models with python and tensorflow".to_string(),
                ..Default::default()
            },
            JobPosting {
                title: "Software Engineer".to_string(),
                description: "Maintain checkout services".to_string(),
                ..Default::default()
            },
        ],
        patents: vec![Patent {
            patent_number: "US1234567".to_string(),
            title: "Neural network for demand forecasting".to_string(),
            abstract_text: "A machine learning model predicts store demand.".to_string(),
            filing_date: chrono::Utc::now(),
            grant_date: None,
            inventors: vec!["A. Inventor".to_string()],
            assignee: "Walmart Apollo, LLC".to_string(),
        }],
        technologies: vec![
            DigitalPresenceScorer::default().detect("TensorFlow", 0.8),
            DigitalPresenceScorer::default().detect("jQuery", 0.7),
        ],
        website: Some(PageText::new(ABOUT, Some("https://walmart.com/about".to_string()))),
        linkedin: None,
    }
}

#[test]
fn test_parse_and_chunk_filing() {
    let temp = tempdir().unwrap();
    let path = write_filing(temp.path());

    let doc = DocumentParser::default().parse_filing(&path, "WMT").unwrap();
    assert_eq!(doc.filing_type, "10-K");
    assert_eq!(doc.filing_date.format("%Y").to_string(), "2024");
    assert!(doc.section("item_1").is_some());
    assert!(doc.section("item_1a").is_some());
    assert!(doc.section("item_7").is_some());

    let chunks = SemanticChunker::new(120, 10, 20).chunk_document(&doc);
    assert!(chunks.len() >= 3);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, i);
        assert_eq!(chunk.document_id, doc.content_hash);
        assert!(chunk.word_count < 120 + 20);
    }
}

#[tokio::test]
async fn test_full_pipeline() {
    let temp = tempdir().unwrap();
    let download_dir = temp.path().join("sec");
    write_filing(&download_dir);

    let mut config = Config::default();
    config.download_dir = download_dir.to_string_lossy().into_owned();
    config.report_dir = temp.path().join("reports").to_string_lossy().into_owned();
    config.chunk_size = 120;
    config.chunk_overlap = 10;
    config.min_chunk_size = 20;

    let wmt = config.company("WMT").unwrap().clone();
    let tgt = config.company("TGT").unwrap().clone();

    let source = FixtureSource::new().with("WMT", observations());
    let db = Arc::new(TokioMutex::new(Db::open_in_memory().unwrap()));
    let collector = Collector::new(&config, db.clone(), Arc::new(source));

    let stats = collector.collect(&[wmt, tgt], false).await;
    assert_eq!(stats.companies, 2);
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.processed_documents, 1);
    assert!(stats.chunks >= 3);
    assert_eq!(stats.signals, 4, "hiring, digital, innovation and one leadership page");
    assert_eq!(stats.errors, 0);

    let db = db.lock().await;
    let record = db.company_by_ticker("WMT").unwrap().unwrap();
    let signals = db.signals_for_company(record.id).unwrap();
    let categories: Vec<SignalCategory> = signals.iter().map(|s| s.category).collect();
    for category in SignalCategory::ALL {
        assert!(categories.contains(&category), "missing {category}");
    }
    for signal in &signals {
        assert!((0.0..=100.0).contains(&signal.normalized_score));
        assert!((0.0..=1.0).contains(&signal.confidence));
    }

    let summary = db.get_summary(record.id).unwrap().unwrap();
    assert_eq!(summary.signal_count, 4);
    assert!((summary.scores.leadership_signals - 40.0).abs() < 1e-9);

    // TGT has no observations: no signals, no summary row
    let target = db.company_by_ticker("TGT").unwrap().unwrap();
    assert!(db.get_summary(target.id).unwrap().is_none());

    let rows = report::build_rows(&db.list_summary_rows().unwrap());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].company_name, "Walmart Inc.");

    let (md_path, csv_path) = report::write_reports(Path::new(&config.report_dir), &rows).unwrap();
    let md = fs::read_to_string(md_path).unwrap();
    assert!(md.contains("| WMT | Walmart Inc. |"));

    let csv = fs::read_to_string(csv_path).unwrap();
    let line = csv.lines().nth(1).unwrap();
    assert_eq!(
        line,
        format!(
            "WMT,Walmart Inc.,{:.1},{:.1},{:.1},{:.1},4",
            summary.scores.technology_hiring,
            summary.scores.innovation_activity,
            summary.scores.digital_presence,
            summary.composite_without_leadership(),
        )
    );
}
