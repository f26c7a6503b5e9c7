//! Search state and its synchronization with query parameters.
//!
//! The same parameters appear in the browser address bar (so searches can be
//! bookmarked and shared) and in requests to the `/search` endpoint.
//! `to_query_params` and `from_query_params` are inverses for every state
//! reachable through the setters below.

use crate::error::Error;
use crate::params;
use crate::query_params::QueryParams;
use crate::result::Result;

/// User-editable search fields.
///
/// Fields are private so every state is built through the setters or
/// [`SearchState::from_query_params`], which keep `current_page >= 1`,
/// `page_size >= 1` and the hit offset within `u64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    query_string: Option<String>,
    sort_by: Option<String>,
    selected_filters: Vec<String>,
    from_date: Option<String>,
    to_date: Option<String>,
    current_page: u64,
    page_size: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query_string: None,
            sort_by: None,
            selected_filters: Vec::new(),
            from_date: None,
            to_date: None,
            current_page: 1,
            page_size: params::DEFAULT_SIZE,
        }
    }
}

/// Offset of the first hit on `page`, or `None` when it does not fit a `u64`.
const fn page_offset(page: u64, size: u64) -> Option<u64> {
    page.saturating_sub(1).checked_mul(size)
}

fn non_empty(value: Option<impl Into<String>>) -> Option<String> {
    value.map(Into::into).filter(|v| !v.trim().is_empty())
}

impl SearchState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    #[must_use]
    pub fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    #[must_use]
    pub fn selected_filters(&self) -> &[String] {
        &self.selected_filters
    }

    #[must_use]
    pub fn from_date(&self) -> Option<&str> {
        self.from_date.as_deref()
    }

    #[must_use]
    pub fn to_date(&self) -> Option<&str> {
        self.to_date.as_deref()
    }

    #[must_use]
    pub const fn current_page(&self) -> u64 {
        self.current_page
    }

    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Offset of the first hit on the current page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.current_page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Set the free-text query. A new query starts again from page 1.
    pub fn set_query_string(&mut self, query: Option<impl Into<String>>) {
        self.query_string = non_empty(query);
        self.current_page = 1;
    }

    #[must_use]
    pub fn with_query_string(mut self, query: impl Into<String>) -> Self {
        self.set_query_string(Some(query));
        self
    }

    pub fn set_sort_by(&mut self, sort: Option<impl Into<String>>) {
        self.sort_by = non_empty(sort);
    }

    #[must_use]
    pub fn with_sort_by(mut self, sort: impl Into<String>) -> Self {
        self.set_sort_by(Some(sort));
        self
    }

    pub fn set_date_range(
        &mut self,
        from_date: Option<impl Into<String>>,
        to_date: Option<impl Into<String>>,
    ) {
        self.from_date = non_empty(from_date);
        self.to_date = non_empty(to_date);
        self.current_page = 1;
    }

    #[must_use]
    pub fn with_date_range(mut self, from_date: Option<&str>, to_date: Option<&str>) -> Self {
        self.set_date_range(from_date, to_date);
        self
    }

    /// Select `field#value` unless it is already selected. Empty fields or
    /// values are ignored.
    pub fn select_filter(&mut self, field: &str, value: &str) {
        let (field, value) = (field.trim(), value.trim());
        if field.is_empty() || value.is_empty() {
            return;
        }
        let entry = format!("{field}#{value}");
        if !self.selected_filters.contains(&entry) {
            self.selected_filters.push(entry);
            self.current_page = 1;
        }
    }

    #[must_use]
    pub fn with_filter(mut self, field: &str, value: &str) -> Self {
        self.select_filter(field, value);
        self
    }

    /// Flip the selection of `field#value`, as a facet checkbox does.
    /// Returns whether the filter is selected afterwards.
    pub fn toggle_filter(&mut self, field: &str, value: &str) -> bool {
        let entry = format!("{}#{}", field.trim(), value.trim());
        let before = self.selected_filters.len();
        self.selected_filters.retain(|f| f != &entry);
        if self.selected_filters.len() == before {
            self.select_filter(field, value);
            self.selected_filters.contains(&entry)
        } else {
            self.current_page = 1;
            false
        }
    }

    pub fn clear_filters(&mut self) {
        self.selected_filters.clear();
        self.current_page = 1;
    }

    /// Move to `page` (1-based).
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when `page` is 0 or its first hit lies
    /// beyond the largest representable offset.
    pub fn set_page(&mut self, page: u64) -> Result<()> {
        if page == 0 {
            return Err(Error::invalid_parameter("page", "0", "pages start at 1"));
        }
        if page_offset(page, self.page_size).is_none() {
            return Err(Error::invalid_parameter(
                "page",
                page.to_string(),
                "offset out of range for the page size",
            ));
        }
        self.current_page = page;
        Ok(())
    }

    /// Change the page size, keeping the first visible hit on screen.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when `size` is 0.
    pub fn set_page_size(&mut self, size: u64) -> Result<()> {
        if size == 0 {
            return Err(Error::invalid_parameter(
                params::SIZE,
                "0",
                "page size must be positive",
            ));
        }
        let offset = self.offset();
        self.page_size = size;
        self.current_page = offset.checked_div(size).unwrap_or(0).saturating_add(1);
        Ok(())
    }

    /// Set page and size together. A 0 keeps the current value; a pair whose
    /// offset would not fit a `u64` leaves the state unchanged.
    #[must_use]
    pub fn with_page(mut self, page: u64, size: u64) -> Self {
        let size = if size > 0 { size } else { self.page_size };
        let page = if page > 0 { page } else { self.current_page };
        if page_offset(page, size).is_some() {
            self.page_size = size;
            self.current_page = page;
        }
        self
    }

    /// Advance one page. Stays put on the last page with a representable
    /// offset.
    pub fn next_page(&mut self) {
        let next = self.current_page.saturating_add(1);
        if page_offset(next, self.page_size).is_some() {
            self.current_page = next;
        }
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    /// Serialize to query parameters, omitting keys that hold default values.
    #[must_use]
    pub fn to_query_params(&self) -> QueryParams {
        let mut out = QueryParams::new();
        if let Some(q) = &self.query_string {
            out.push(params::QUERY_STRING, q.as_str());
        }
        if let Some(sort) = &self.sort_by {
            out.push(params::SORT, sort.as_str());
        }
        for filter in &self.selected_filters {
            out.push(params::SELECTED_FILTERS, filter.as_str());
        }
        if let Some(from_date) = &self.from_date {
            out.push(params::FROM_DATE, from_date.as_str());
        }
        if let Some(to_date) = &self.to_date {
            out.push(params::TO_DATE, to_date.as_str());
        }
        let offset = self.offset();
        if offset != params::DEFAULT_FROM {
            out.push(params::FROM, offset.to_string());
        }
        if self.page_size != params::DEFAULT_SIZE {
            out.push(params::SIZE, self.page_size.to_string());
        }
        out
    }

    /// Rebuild a state from query parameters. Missing keys fall back to
    /// defaults; `filter[]` is accepted as an alias of `filter`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when `from` or `size` is not a
    /// non-negative integer, or when `size` is 0.
    pub fn from_query_params(query: &QueryParams) -> Result<Self> {
        let page_size = parse_count(query, params::SIZE)?.unwrap_or(params::DEFAULT_SIZE);
        if page_size == 0 {
            return Err(Error::invalid_parameter(
                params::SIZE,
                "0",
                "page size must be positive",
            ));
        }
        let offset = parse_count(query, params::FROM)?.unwrap_or(params::DEFAULT_FROM);

        let selected_filters = query
            .iter()
            .filter(|(k, _)| *k == params::SELECTED_FILTERS || *k == params::SELECTED_FILTERS_ALIAS)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            query_string: non_empty(query.get(params::QUERY_STRING)),
            sort_by: non_empty(query.get(params::SORT)),
            selected_filters,
            from_date: non_empty(query.get(params::FROM_DATE)),
            to_date: non_empty(query.get(params::TO_DATE)),
            current_page: offset.checked_div(page_size).unwrap_or(0).saturating_add(1),
            page_size,
        })
    }
}

fn parse_count(query: &QueryParams, name: &str) -> Result<Option<u64>> {
    query
        .get_non_empty(name)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| Error::invalid_parameter(name, raw, e.to_string()))
        })
        .transpose()
}

/// Ticket identifying one search issued from a [`SearchSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// A search state together with the bookkeeping needed to discard responses
/// that arrive after a newer search has been issued.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    state: SearchState,
    latest: u64,
}

impl SearchSession {
    #[must_use]
    pub fn new(state: SearchState) -> Self {
        Self { state, latest: 0 }
    }

    #[must_use]
    pub const fn state(&self) -> &SearchState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }

    /// Issue a ticket for a new search. Earlier tickets become stale.
    pub fn begin_search(&mut self) -> SearchTicket {
        self.latest = self.latest.saturating_add(1);
        SearchTicket(self.latest)
    }

    /// Whether a response for `ticket` may still be applied.
    #[must_use]
    pub const fn accept(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.latest
    }
}
