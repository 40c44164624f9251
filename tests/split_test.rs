use dumpsplit::prelude::*;
use pretty_assertions::assert_eq;

const MYSQLDUMP: &str = r#"-- MySQL dump 10.13  Distrib 8.0.36
/*!40101 SET NAMES utf8mb4 */;
DROP TABLE IF EXISTS `node_field_data`;
CREATE TABLE `node_field_data` (
  `nid` int unsigned NOT NULL,
  `title` varchar(255) NOT NULL,
  PRIMARY KEY (`nid`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;
LOCK TABLES `node_field_data` WRITE;
INSERT INTO `node_field_data` VALUES (1,'Hello; world'),(2,'It\'s \"quoted\"'),(3,'C:\\temp\\');
REPLACE INTO `node_field_data` VALUES (4,"semi;colon");
UNLOCK TABLES;
"#;

#[test]
fn test_mysqldump_statements() {
    let stmts = split(MYSQLDUMP);
    assert_eq!(stmts.len(), 7);

    // The leading comment is part of the first statement
    assert!(stmts[0].starts_with("-- MySQL dump"));
    assert!(stmts[0].ends_with("/*!40101 SET NAMES utf8mb4 */"));
    assert_eq!(stmts[1], "DROP TABLE IF EXISTS `node_field_data`");
    assert!(stmts[2].ends_with("ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"));
    assert_eq!(stmts[3], "LOCK TABLES `node_field_data` WRITE");
    assert_eq!(
        stmts[4],
        r#"INSERT INTO `node_field_data` VALUES (1,'Hello; world'),(2,'It\'s \"quoted\"'),(3,'C:\\temp\\')"#
    );
    assert_eq!(stmts[5], r#"REPLACE INTO `node_field_data` VALUES (4,"semi;colon")"#);
    assert_eq!(stmts[6], "UNLOCK TABLES");
}

#[test]
fn test_round_trip_of_balanced_fragments() {
    let fragments = [
        "INSERT INTO t VALUES ('a;b;c')",
        "UPDATE t SET name = \"x;y\" WHERE id = 2",
        "SELECT `weird;col` FROM `t;1`",
        "DELETE FROM t WHERE note = 'O\\'Brien; again'",
        "INSERT INTO t VALUES ('\\\\', '\\\\;')",
        "SELECT 1",
    ];

    for sep in [";", ";\n", " ;\n\n", ";;\n"] {
        let script: String = fragments.iter().map(|f| format!("{}{}", f, sep)).collect();
        assert_eq!(split(&script), fragments.to_vec(), "separator {:?}", sep);
    }
}

#[test]
fn test_rejoined_statements_split_the_same() {
    let first = split(MYSQLDUMP);
    let replay: String = first.iter().map(|s| format!("{};\n", s)).collect();
    assert_eq!(split(&replay), first);
}

#[test]
fn test_no_statement_contains_a_top_level_semicolon() {
    let report = Report::build("dump.sql", &split(MYSQLDUMP), None, 100);
    let flagged: Vec<usize> = report
        .statements
        .iter()
        .filter(|r| r.has_semicolon)
        .map(|r| r.index)
        .collect();
    // Only the statements with quoted semicolons
    assert_eq!(flagged, vec![5, 6]);
    assert_eq!(report.summary.upsert, 2);
}

#[test]
fn test_stream_matches_split_for_every_chunk_size() {
    let expected = split(MYSQLDUMP);

    for size in 1..=MYSQLDUMP.len() {
        let mut splitter = StreamSplitter::new();
        let mut got = Vec::new();
        let mut rest = MYSQLDUMP;
        while !rest.is_empty() {
            let mut cut = size.min(rest.len());
            while !rest.is_char_boundary(cut) {
                cut += 1;
            }
            let (chunk, tail) = rest.split_at(cut);
            got.extend(splitter.feed(chunk));
            rest = tail;
        }
        got.extend(splitter.finish());

        assert_eq!(got, expected, "chunk size {}", size);
        assert_eq!(splitter.open_quote(), None);
    }
}

#[test]
fn test_unicode_content_is_preserved() {
    let stmts = split("INSERT INTO t VALUES ('日本語;テキスト');INSERT INTO t VALUES ('ünïcødé')");
    assert_eq!(
        stmts,
        vec![
            "INSERT INTO t VALUES ('日本語;テキスト')",
            "INSERT INTO t VALUES ('ünïcødé')",
        ]
    );
}

#[test]
fn test_truncated_dump_keeps_tail() {
    let truncated = &MYSQLDUMP[..MYSQLDUMP.find("'Hello").unwrap() + 4];
    let mut iter = statements(truncated);
    let stmts: Vec<&str> = iter.by_ref().collect();

    assert_eq!(stmts.len(), 5);
    assert_eq!(stmts[4], "INSERT INTO `node_field_data` VALUES (1,'Hel");
    assert_eq!(iter.open_quote(), Some(Quote::Single));
}
