//! Rendering of AMI `SearchQuery` commands.
//!
//! The rendered text doubles as the query cache key, so every function here is
//! deterministic: identifiers are back-tick quoted, clauses for bound slots are
//! emitted in ascending slot order and literals are escaped the same way every
//! time.

use crate::address::{dimension_name, TagAddress};

pub const HASHTAGS: &str = "HASHTAGS";
pub const DATASET: &str = "DATASET";

/// Catalog addressed for a scope's event generation short name.
pub fn catalog_name(evgen_short: &str) -> String {
    format!("{evgen_short}_001:production")
}

// SQL string literal, embedded single quotes doubled.
fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// The statement travels inside a double-quoted command argument.
fn escape_argument(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn search_query(catalog: &str, entity: &str, language: &str, statement: &str) -> String {
    format!(
        "SearchQuery -catalog=\"{catalog}\" -entity=\"{entity}\" -{language}=\"{}\"",
        escape_argument(statement)
    )
}

// One `IN` clause per bound slot, each an existence constraint on the same dataset.
fn membership_clauses(address: &TagAddress) -> Vec<String> {
    address
        .bound_slots()
        .map(|(index, value)| {
            format!(
                "`DATASET`.`IDENTIFIER` IN (SELECT `DATASETFK` FROM `HASHTAGS` `h{}` WHERE `SCOPE`={} AND `NAME`={})",
                index + 1,
                literal(&dimension_name(index)),
                literal(value)
            )
        })
        .collect()
}

/// Hashtags whose name contains `text`, case-insensitively.
pub fn hashtag_search(catalog: &str, text: &str) -> String {
    let statement = format!(
        "SELECT DISTINCT `NAME`,`SCOPE` WHERE LOWER(`NAME`) LIKE {}",
        literal(&format!("%{}%", text.to_lowercase()))
    );
    search_query(catalog, HASHTAGS, "mql", &statement)
}

/// Hashtags named exactly `name`.
pub fn hashtag_exact(catalog: &str, name: &str) -> String {
    let statement = format!("SELECT DISTINCT `NAME`,`SCOPE` WHERE `NAME`={}", literal(name));
    search_query(catalog, HASHTAGS, "mql", &statement)
}

/// Values of dimension `slot` carried by datasets that also carry every
/// hashtag already bound in `partial`.
pub fn slot_candidates(catalog: &str, partial: &TagAddress, slot: usize) -> String {
    let mut conditions = vec![format!(
        "`HASHTAGS`.`SCOPE`={}",
        literal(&dimension_name(slot))
    )];
    conditions.extend(membership_clauses(partial));
    let statement = format!(
        "SELECT DISTINCT `HASHTAGS`.`SCOPE`,`HASHTAGS`.`NAME` FROM `DATASET` JOIN `HASHTAGS` ON `DATASET`.`IDENTIFIER`=`HASHTAGS`.`DATASETFK` WHERE {}",
        conditions.join(" AND ")
    );
    search_query(catalog, DATASET, "sql", &statement)
}

/// Logical dataset names carrying every hashtag bound in `address`.
pub fn datasets_with_tags(catalog: &str, address: &TagAddress) -> String {
    let statement = format!(
        "SELECT DISTINCT `DATASET`.`LOGICALDATASETNAME` FROM `DATASET` WHERE {}",
        membership_clauses(address).join(" AND ")
    );
    search_query(catalog, DATASET, "sql", &statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashtag_search_matches_ami_syntax() {
        assert_eq!(
            hashtag_search("short_001:production", "Fork"),
            "SearchQuery -catalog=\"short_001:production\" -entity=\"HASHTAGS\" \
             -mql=\"SELECT DISTINCT `NAME`,`SCOPE` WHERE LOWER(`NAME`) LIKE '%fork%'\""
        );
    }

    #[test]
    fn slot_candidates_constrains_every_bound_slot() {
        let partial = TagAddress::new(
            "mc16_13TeV",
            [Some("Top".into()), None, Some("Wt".into()), None],
        );
        let command = slot_candidates("mc15_001:production", &partial, 1);
        assert_eq!(
            command,
            "SearchQuery -catalog=\"mc15_001:production\" -entity=\"DATASET\" \
             -sql=\"SELECT DISTINCT `HASHTAGS`.`SCOPE`,`HASHTAGS`.`NAME` FROM `DATASET` \
             JOIN `HASHTAGS` ON `DATASET`.`IDENTIFIER`=`HASHTAGS`.`DATASETFK` \
             WHERE `HASHTAGS`.`SCOPE`='PMGL2' \
             AND `DATASET`.`IDENTIFIER` IN (SELECT `DATASETFK` FROM `HASHTAGS` `h1` WHERE `SCOPE`='PMGL1' AND `NAME`='Top') \
             AND `DATASET`.`IDENTIFIER` IN (SELECT `DATASETFK` FROM `HASHTAGS` `h3` WHERE `SCOPE`='PMGL3' AND `NAME`='Wt')\""
        );
    }

    #[test]
    fn datasets_query_constrains_all_four_slots_without_a_join() {
        let address = TagAddress::complete("mc16_13TeV", ["Top", "TTbar", "Baseline", "PowhegPythia"]);
        let command = datasets_with_tags("mc15_001:production", &address);
        assert!(command.starts_with(
            "SearchQuery -catalog=\"mc15_001:production\" -entity=\"DATASET\" \
             -sql=\"SELECT DISTINCT `DATASET`.`LOGICALDATASETNAME` FROM `DATASET` \
             WHERE `DATASET`.`IDENTIFIER` IN (SELECT `DATASETFK` FROM `HASHTAGS` `h1` WHERE `SCOPE`='PMGL1' AND `NAME`='Top') AND "
        ));
        assert!(!command.contains("JOIN"));
        assert_eq!(command.matches(" IN (SELECT `DATASETFK`").count(), 4);
        assert!(command.ends_with(
            "`DATASET`.`IDENTIFIER` IN (SELECT `DATASETFK` FROM `HASHTAGS` `h4` WHERE `SCOPE`='PMGL4' AND `NAME`='PowhegPythia')\""
        ));
    }

    #[test]
    fn literals_are_escaped() {
        let command = hashtag_exact("c", "it's \"quoted\"");
        assert!(command.ends_with("`NAME`='it''s \\\"quoted\\\"'\""));
    }
}
