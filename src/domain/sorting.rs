use std::cmp::Ordering;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Accepts `asc`/`desc` as well as the table widget's `ascend`/`descend`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascend" => Some(SortOrder::Asc),
            "desc" | "descend" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

/// A comparable projection of one record field.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Bool(bool),
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

impl SortValue {
    pub fn text(value: impl Into<String>) -> Self {
        SortValue::Text(value.into())
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Bool(_) => 0,
            SortValue::Number(_) => 1,
            SortValue::Date(_) => 2,
            SortValue::Text(_) => 3,
        }
    }
}

/// Case-insensitive comparison on Unicode lowercase.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Raw text order, used only once every other key is tied.
fn compare_raw(a: Option<&SortValue>, b: Option<&SortValue>) -> Ordering {
    match (a, b) {
        (Some(SortValue::Text(x)), Some(SortValue::Text(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

pub fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Text(x), SortValue::Text(y)) => compare_text(x, y),
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(y),
        (SortValue::Bool(x), SortValue::Bool(y)) => u8::from(*x).cmp(&u8::from(*y)),
        (SortValue::Date(x), SortValue::Date(y)) => {
            x.timestamp_millis().cmp(&y.timestamp_millis())
        }
        _ => a.rank().cmp(&b.rank()),
    }
}

/// Orders two optional keys in `order`; a missing key sorts last either way.
fn compare_keys(a: Option<&SortValue>, b: Option<&SortValue>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => order.apply(compare_values(x, y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort of `records` by `spec`, breaking ties on `tie_breakers`
/// (always ascending).
pub fn sort_records<T, F>(records: &mut [T], spec: &SortSpec, tie_breakers: &[&str], key: F)
where
    F: Fn(&T, &str) -> Option<SortValue>,
{
    records.sort_by(|a, b| {
        let primary = compare_keys(
            key(a, &spec.field).as_ref(),
            key(b, &spec.field).as_ref(),
            spec.order,
        );
        tie_breakers
            .iter()
            .fold(primary, |acc, field| {
                acc.then_with(|| {
                    compare_keys(key(a, field).as_ref(), key(b, field).as_ref(), SortOrder::Asc)
                })
            })
            .then_with(|| {
                compare_raw(key(a, &spec.field).as_ref(), key(b, &spec.field).as_ref())
            })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone)]
    struct Person {
        first: &'static str,
        last: &'static str,
        age: Option<f64>,
        active: bool,
    }

    fn key(p: &Person, field: &str) -> Option<SortValue> {
        match field {
            "first_name" => Some(SortValue::text(p.first)),
            "last_name" => Some(SortValue::text(p.last)),
            "age" => p.age.map(SortValue::Number),
            "active" => Some(SortValue::Bool(p.active)),
            _ => None,
        }
    }

    fn people() -> Vec<Person> {
        vec![
            Person { first: "zoe", last: "Brown", age: Some(30.0), active: true },
            Person { first: "Adam", last: "brown", age: None, active: false },
            Person { first: "Émile", last: "Abbott", age: Some(25.0), active: true },
            Person { first: "bea", last: "Brown", age: Some(41.0), active: false },
        ]
    }

    fn firsts(items: &[Person]) -> Vec<&'static str> {
        items.iter().map(|p| p.first).collect()
    }

    #[test]
    fn text_compare_ignores_case() {
        assert_eq!(compare_text("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_text("Zed", "alpha"), Ordering::Greater);
        assert_eq!(compare_text("Brown", "brown"), Ordering::Equal);
    }

    #[test]
    fn last_name_ties_break_on_first_name() {
        let mut items = people();
        sort_records(&mut items, &SortSpec::asc("last_name"), &["first_name"], key);
        assert_eq!(firsts(&items), vec!["Émile", "Adam", "bea", "zoe"]);
    }

    #[test]
    fn case_only_differences_defer_to_the_tie_breaker() {
        let mut items = vec![
            Person { first: "zoe", last: "Brown", age: None, active: true },
            Person { first: "Adam", last: "brown", age: None, active: true },
        ];
        sort_records(&mut items, &SortSpec::asc("last_name"), &["first_name"], key);
        assert_eq!(firsts(&items), vec!["Adam", "zoe"]);
    }

    #[test]
    fn raw_text_settles_full_ties() {
        let mut items = vec![
            Person { first: "ann", last: "brown", age: None, active: true },
            Person { first: "ann", last: "Brown", age: None, active: true },
        ];
        sort_records(&mut items, &SortSpec::asc("last_name"), &["first_name"], key);
        assert_eq!(items[0].last, "Brown");
    }

    #[test]
    fn tie_breakers_stay_ascending_when_descending() {
        let mut items = people();
        items.retain(|p| p.last.eq_ignore_ascii_case("brown") && p.last != "brown");
        sort_records(&mut items, &SortSpec::desc("last_name"), &["first_name"], key);
        assert_eq!(firsts(&items), vec!["bea", "zoe"]);
    }

    #[test]
    fn missing_numbers_sort_last_in_both_directions() {
        let mut asc = people();
        sort_records(&mut asc, &SortSpec::asc("age"), &[], key);
        assert_eq!(firsts(&asc), vec!["Émile", "zoe", "bea", "Adam"]);

        let mut desc = people();
        sort_records(&mut desc, &SortSpec::desc("age"), &[], key);
        assert_eq!(firsts(&desc), vec!["bea", "zoe", "Émile", "Adam"]);
    }

    #[test]
    fn booleans_compare_as_zero_and_one() {
        let mut items = people();
        sort_records(&mut items, &SortSpec::asc("active"), &[], key);
        assert_eq!(firsts(&items), vec!["Adam", "bea", "zoe", "Émile"]);
    }

    #[test]
    fn dates_compare_by_epoch() {
        let early = SortValue::Date(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        let late = SortValue::Date(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(compare_values(&early, &late), Ordering::Less);
    }

    #[test]
    fn parses_widget_orders() {
        assert_eq!(SortOrder::parse("ascend"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("DESC"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("sideways"), None);
    }
}
