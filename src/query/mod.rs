use thiserror::Error;

/// The paginated listings the monitor API exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    Events,
    Rules,
    RequestsLog,
}

const EVENT_FIELDS: &[&str] = &[
    "sid",
    "source_ip",
    "dest_ip",
    "source_port",
    "dest_port",
    "protocol",
];
const RULE_FIELDS: &[&str] = &["gid", "sid", "action"];
const REQUEST_LOG_FIELDS: &[&str] = &["period_start", "period_end"];

impl ListKind {
    pub fn path(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Rules => "rules",
            Self::RequestsLog => "requests-log",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Rules => "rules",
            Self::RequestsLog => "requests log",
        }
    }

    /// Filter keys accepted by this listing, in the order they are sent.
    pub fn filter_fields(self) -> &'static [&'static str] {
        match self {
            Self::Events => EVENT_FIELDS,
            Self::Rules => RULE_FIELDS,
            Self::RequestsLog => REQUEST_LOG_FIELDS,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown filter '{field}' for {view} (expected one of: {expected})")]
    UnknownField {
        field: String,
        view: &'static str,
        expected: String,
    },

    #[error("invalid filter '{raw}', expected KEY=VALUE")]
    MalformedPair { raw: String },

    #[error("filters for {got} cannot be submitted to the {expected} view")]
    WrongView {
        got: &'static str,
        expected: &'static str,
    },
}

/// Sparse search constraints for one listing.
///
/// Values are stored trimmed; a blank value is the same as no value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSet {
    kind: ListKind,
    values: Vec<Option<String>>,
}

impl FilterSet {
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            values: vec![None; kind.filter_fields().len()],
        }
    }

    /// Build a filter set from `KEY=VALUE` strings.
    pub fn from_pairs<I, S>(kind: ListKind, pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filters = Self::new(kind);
        for raw in pairs {
            let raw = raw.as_ref();
            let (key, value) = raw.split_once('=').ok_or_else(|| QueryError::MalformedPair {
                raw: raw.to_string(),
            })?;
            filters.set(key.trim(), value)?;
        }
        Ok(filters)
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn set(&mut self, field: &str, value: &str) -> Result<(), QueryError> {
        let idx = self.index_of(field)?;
        let trimmed = value.trim();
        self.values[idx] = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        Ok(())
    }

    pub fn with(mut self, field: &str, value: &str) -> Result<Self, QueryError> {
        self.set(field, value)?;
        Ok(self)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        let idx = self.index_of(field).ok()?;
        self.values[idx].as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Non-blank constraints in schema order.
    pub fn constraints(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.kind
            .filter_fields()
            .iter()
            .zip(self.values.iter())
            .filter_map(|(field, value)| value.as_deref().map(|v| (*field, v)))
    }

    fn index_of(&self, field: &str) -> Result<usize, QueryError> {
        let fields = self.kind.filter_fields();
        fields
            .iter()
            .position(|f| *f == field)
            .ok_or_else(|| QueryError::UnknownField {
                field: field.to_string(),
                view: self.kind.label(),
                expected: fields.join(", "),
            })
    }
}

/// One-based page number owned by a single list view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageCursor(u32);

impl Default for PageCursor {
    fn default() -> Self {
        Self::first()
    }
}

impl PageCursor {
    pub fn first() -> Self {
        Self(1)
    }

    /// Clamps to page one.
    pub fn at(page: u32) -> Self {
        Self(page.max(1))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    /// Returns false and leaves the cursor alone when already on page one.
    pub fn retreat(&mut self) -> bool {
        if self.0 > 1 {
            self.0 -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.0 = 1;
    }
}

/// Ordered request parameters for a list call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.pairs.push((key.to_string(), value.into()));
    }

    /// Replace the URL's query string with these parameters.
    pub fn apply_to(&self, url: &mut reqwest::Url) {
        url.set_query(None);
        if self.pairs.is_empty() {
            return;
        }
        url.query_pairs_mut().extend_pairs(self.pairs.iter());
    }

    /// Form-urlencoded representation, e.g. `page=1&gid=1`.
    pub fn to_query_string(&self) -> String {
        let mut url = match reqwest::Url::parse("http://localhost/") {
            Ok(url) => url,
            Err(_) => return String::new(),
        };
        self.apply_to(&mut url);
        url.query().unwrap_or_default().to_string()
    }
}

/// `page` first, then every non-blank filter in schema order.
pub fn build_query(filters: &FilterSet, cursor: PageCursor) -> Query {
    let mut query = Query::default();
    query.push("page", cursor.get().to_string());
    for (field, value) in filters.constraints() {
        query.push(field, value);
    }
    query
}
