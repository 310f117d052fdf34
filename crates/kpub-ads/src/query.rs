//! Search query construction

/// Fields requested from ADS: everything except the full text body.
pub const FIELDS: &[&str] = &[
    "date",
    "pub",
    "id",
    "volume",
    "links_data",
    "citation",
    "doi",
    "eid",
    "keyword_schema",
    "citation_count",
    "data",
    "data_facet",
    "year",
    "identifier",
    "keyword_norm",
    "reference",
    "abstract",
    "recid",
    "alternate_bibcode",
    "arxiv_class",
    "bibcode",
    "first_author_norm",
    "pubdate",
    "reader",
    "doctype",
    "doctype_facet_hier",
    "title",
    "pub_raw",
    "property",
    "author",
    "email",
    "orcid",
    "keyword",
    "author_norm",
    "cite_read_boost",
    "database",
    "classic_factor",
    "ack",
    "page",
    "first_author",
    "read_count",
    "indexstamp",
    "issue",
    "keyword_facet",
    "aff",
    "facility",
    "simbid",
];

/// Comma-joined field list for the `fl` parameter.
pub fn field_list() -> String {
    FIELDS.join(",")
}

/// Query for all papers of a month matching the given terms.
///
/// `month` is `YYYY-MM`.
pub fn monthly_query(terms: &[String], month: &str) -> String {
    let terms = terms.join(" ");
    if terms.is_empty() {
        format!("pubdate:\"{month}\"")
    } else {
        format!("{terms} pubdate:\"{month}\"")
    }
}

/// Query resolving a single bibcode (or any other identifier).
pub fn identifier_query(bibcode: &str) -> String {
    format!("identifier:{bibcode}")
}

/// Validate a `YYYY-MM` month argument.
pub fn is_valid_month(month: &str) -> bool {
    let bytes = month.as_bytes();
    bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
        && matches!(month[5..].parse::<u8>(), Ok(1..=12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_query_joins_terms() {
        let terms = vec!["ack:\"Keck\"".to_string(), "OR".to_string(), "ack:\"WMKO\"".to_string()];
        assert_eq!(
            monthly_query(&terms, "2020-06"),
            "ack:\"Keck\" OR ack:\"WMKO\" pubdate:\"2020-06\""
        );
    }

    #[test]
    fn monthly_query_without_terms() {
        assert_eq!(monthly_query(&[], "2020-06"), "pubdate:\"2020-06\"");
    }

    #[test]
    fn fields_exclude_body() {
        assert!(!FIELDS.contains(&"body"));
        assert!(FIELDS.contains(&"aff"));
        assert!(field_list().starts_with("date,pub,id"));
    }

    #[test]
    fn month_validation() {
        assert!(is_valid_month("2015-06"));
        assert!(!is_valid_month("2015-13"));
        assert!(!is_valid_month("2015-6"));
        assert!(!is_valid_month("15-06-01"));
    }
}
