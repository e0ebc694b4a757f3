use crate::domain::InteractionType;
use crate::filter::ast::FilterTerm;
use crate::filter::FilterParseError;
use crate::finder::FinderCriteria;
use crate::time::parse_date;

/// Parses a finder filter expression such as
/// `title:review type:meeting lead:"Jane Doe" from:2024-01-01 budget`.
/// Bare words are joined into the free-text search.
pub fn parse_filter(input: &str) -> Result<FinderCriteria, FilterParseError> {
    let terms = parse_terms(input)?;
    let mut criteria = FinderCriteria::default();
    let mut text: Vec<String> = Vec::new();

    for term in terms {
        match term {
            FilterTerm::Text(word) => text.push(word),
            FilterTerm::Title(value) => set_once(&mut criteria.title, value, "title")?,
            FilterTerm::Type(kind) => set_once(&mut criteria.kind, kind, "type")?,
            FilterTerm::Lead(value) => set_once(&mut criteria.lead, value, "lead")?,
            FilterTerm::From(date) => set_once(&mut criteria.start_date, date, "from")?,
            FilterTerm::To(date) => set_once(&mut criteria.end_date, date, "to")?,
            FilterTerm::Location(value) => set_once(&mut criteria.location, value, "at")?,
        }
    }

    if !text.is_empty() {
        criteria.search = Some(text.join(" "));
    }
    Ok(criteria.normalized())
}

pub fn parse_terms(input: &str) -> Result<Vec<FilterTerm>, FilterParseError> {
    let mut terms = Vec::new();
    for token in tokenize(input)? {
        let term = match token.text.split_once(':') {
            Some((key, value)) if !token.quoted => parse_keyed(key, value)?,
            _ => FilterTerm::Text(token.text),
        };
        terms.push(term);
    }
    Ok(terms)
}

/// Renders criteria back into the expression syntax accepted by
/// [`parse_filter`].
pub fn format_filter(criteria: &FinderCriteria) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(value) = &criteria.title {
        parts.push(format!("title:{}", quote(value)));
    }
    if let Some(kind) = criteria.kind {
        parts.push(format!("type:{}", kind.label().to_ascii_lowercase()));
    }
    if let Some(value) = &criteria.lead {
        parts.push(format!("lead:{}", quote(value)));
    }
    if let Some(date) = criteria.start_date {
        parts.push(format!("from:{}", date.format("%Y-%m-%d")));
    }
    if let Some(date) = criteria.end_date {
        parts.push(format!("to:{}", date.format("%Y-%m-%d")));
    }
    if let Some(value) = &criteria.location {
        parts.push(format!("at:{}", quote(value)));
    }
    if let Some(value) = &criteria.search {
        if value.contains(':') {
            parts.push(format!("\"{}\"", value));
        } else {
            parts.push(value.clone());
        }
    }
    parts.join(" ")
}

fn parse_keyed(key: &str, value: &str) -> Result<FilterTerm, FilterParseError> {
    let key = key.to_ascii_lowercase();
    if value.trim().is_empty() {
        return Err(FilterParseError::EmptyValue(key));
    }
    match key.as_str() {
        "title" => Ok(FilterTerm::Title(value.to_string())),
        "type" => InteractionType::parse(value)
            .map(FilterTerm::Type)
            .map_err(|_| FilterParseError::InvalidType(value.to_string())),
        "lead" => Ok(FilterTerm::Lead(value.to_string())),
        "from" | "to" => {
            let date = parse_date(value).map_err(|_| FilterParseError::InvalidDate {
                key: key.clone(),
                value: value.to_string(),
            })?;
            if key == "from" {
                Ok(FilterTerm::From(date))
            } else {
                Ok(FilterTerm::To(date))
            }
        }
        "at" | "location" => Ok(FilterTerm::Location(value.to_string())),
        _ => Err(FilterParseError::UnknownKey(key)),
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, key: &str) -> Result<(), FilterParseError> {
    if slot.is_some() {
        return Err(FilterParseError::DuplicateKey(key.to_string()));
    }
    *slot = Some(value);
    Ok(())
}

struct Token {
    text: String,
    /// The token opened with a quote, so it is never a `key:value` term.
    quoted: bool,
}

// Whitespace-separated tokens; double quotes group words and are stripped.
fn tokenize(input: &str) -> Result<Vec<Token>, FilterParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                if current.is_empty() && !in_quotes {
                    quoted = true;
                }
                in_quotes = !in_quotes;
            }
            ch if ch.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        quoted,
                    });
                }
                quoted = false;
            }
            ch => current.push(ch),
        }
    }
    if in_quotes {
        return Err(FilterParseError::UnterminatedQuote);
    }
    if !current.is_empty() {
        tokens.push(Token {
            text: current,
            quoted,
        });
    }
    Ok(tokens)
}

fn quote(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{format_filter, parse_filter};
    use crate::domain::InteractionType;
    use crate::filter::FilterParseError;
    use chrono::NaiveDate;

    #[test]
    fn parse_keyed_terms_and_text() {
        let criteria =
            parse_filter(r#"type:meeting lead:"Jane Doe" from:2024-01-01 quarterly budget"#)
                .unwrap();
        assert_eq!(criteria.kind, Some(InteractionType::Meeting));
        assert_eq!(criteria.lead.as_deref(), Some("Jane Doe"));
        assert_eq!(criteria.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(criteria.search.as_deref(), Some("quarterly budget"));
        assert_eq!(criteria.title, None);
    }

    #[test]
    fn empty_input_is_no_criteria() {
        assert!(parse_filter("   ").unwrap().is_empty());
    }

    #[test]
    fn unknown_key_is_error() {
        assert_eq!(
            parse_filter("owner:bob").unwrap_err(),
            FilterParseError::UnknownKey("owner".to_string())
        );
    }

    #[test]
    fn duplicate_key_is_error() {
        assert_eq!(
            parse_filter("title:a title:b").unwrap_err(),
            FilterParseError::DuplicateKey("title".to_string())
        );
    }

    #[test]
    fn bad_date_and_type_are_errors() {
        assert!(matches!(
            parse_filter("to:tomorrow").unwrap_err(),
            FilterParseError::InvalidDate { .. }
        ));
        assert_eq!(
            parse_filter("type:lunch").unwrap_err(),
            FilterParseError::InvalidType("lunch".to_string())
        );
    }

    #[test]
    fn unterminated_quote_is_error() {
        assert_eq!(
            parse_filter(r#"lead:"Jane"#).unwrap_err(),
            FilterParseError::UnterminatedQuote
        );
    }

    #[test]
    fn quoted_text_with_colon_is_search() {
        let criteria = parse_filter(r#""lunch at 12:30" lead:Ana"#).unwrap();
        assert_eq!(criteria.search.as_deref(), Some("lunch at 12:30"));
        assert_eq!(criteria.lead.as_deref(), Some("Ana"));

        let rendered = format_filter(&criteria);
        assert_eq!(parse_filter(&rendered).unwrap(), criteria);
    }

    #[test]
    fn format_round_trips_through_parse() {
        let criteria =
            parse_filter(r#"at:"Room 4" title:sync type:call to:2024-03-31 follow up"#).unwrap();
        let rendered = format_filter(&criteria);
        assert_eq!(parse_filter(&rendered).unwrap(), criteria);
    }
}
