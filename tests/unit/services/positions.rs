//! Unit tests for the positions table reader

use marketwatch::services::positions::parse_positions_table;
use marketwatch::services::{MarkdownPositionStore, PositionStore};

const TABLE: &str = "\
# Open positions

| Ticker | Entry | Stop Loss | Target | Status |
|--------|-------|-----------|--------|--------|
| aapl   | 180   | $172.50   | 205    | active |
| MSFT   | 400   | 380       |        | open   |
| NVDA   | 800   | 760       | 1,000  | closed |
| TSLA   | 200   | soon      | 260    | active |
|        | 1     | 1         | 1      | active |
";

#[test]
fn parses_rows_by_header_name() {
    let positions = parse_positions_table(TABLE);
    assert_eq!(positions.len(), 3);

    assert_eq!(positions[0].symbol, "AAPL");
    assert_eq!(positions[0].stop_loss, Some(172.5));
    assert_eq!(positions[0].target, Some(205.0));
    assert!(positions[0].active);

    assert_eq!(positions[1].symbol, "MSFT");
    assert_eq!(positions[1].target, None);
    assert!(positions[1].active);

    assert_eq!(positions[2].symbol, "NVDA");
    assert_eq!(positions[2].target, Some(1000.0));
    assert!(!positions[2].active);
}

#[test]
fn tables_without_symbol_column_are_ignored() {
    let contents = "| Name | Value |\n|---|---|\n| foo | 1 |\n";
    assert!(parse_positions_table(contents).is_empty());
}

#[test]
fn missing_status_column_means_active() {
    let contents = "| Symbol | SL | TP |\n|---|---|---|\n| AMD | 150 | 190 |\n";
    let positions = parse_positions_table(contents);
    assert_eq!(positions.len(), 1);
    assert!(positions[0].active);
    assert_eq!(positions[0].stop_loss, Some(150.0));
}

#[tokio::test]
async fn missing_file_yields_no_positions() {
    let store = MarkdownPositionStore::new("/nonexistent/marketwatch/positions.md");
    assert!(store.list_positions().await.unwrap().is_empty());
}

#[tokio::test]
async fn reads_positions_from_disk() {
    let path = std::env::temp_dir().join(format!("marketwatch-positions-{}.md", std::process::id()));
    tokio::fs::write(&path, TABLE).await.unwrap();

    let store = MarkdownPositionStore::new(&path);
    let positions = store.list_positions().await.unwrap();
    assert_eq!(positions.len(), 3);

    let _ = tokio::fs::remove_file(&path).await;
}
