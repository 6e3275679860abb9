//! List options: the fully resolved intent of one list request.

use keyset_core::{Error, Result, Value};

use super::token::INVALID_TOKEN_MESSAGE;
use super::{Listable, Page, PageSizePolicy, PageToken};
use crate::{TRACING_TARGET_OPTIONS, TRACING_TARGET_TOKEN};
use crate::filter::{Filter, FilterSpec};
use crate::query::{Expr, SelectQuery, SortOrder};

/// Options for one list query.
///
/// Built once per request, either from caller criteria (first page) or from
/// a page token (every later page), then used to extend exactly one query
/// and to derive the token of the page after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    page_size: u32,
    token: PageToken,
}

impl ListOptions {
    /// Builds options for a continuation request from its page token.
    ///
    /// The ordering and filter embedded in the token are used verbatim, so a
    /// listing keeps the order it started with whatever sort or filter the
    /// follow-up request carries. An empty token is rejected.
    pub fn from_token(page_token: &str, page_size: i64) -> Result<Self> {
        Self::build_from_token(&PageSizePolicy::default(), page_token, page_size)
    }

    /// Builds options for a continuation request over `L`.
    ///
    /// Same as [`from_token`], but the token is also rejected as invalid
    /// input unless its key field is the primary key of `L` and its sort
    /// and filter fields are among the fields `L` exposes. Tokens are
    /// client-supplied, so this keeps a hand-made token from ordering or
    /// filtering on columns the API does not expose.
    ///
    /// [`from_token`]: ListOptions::from_token
    pub fn from_token_for<L: Listable>(page_token: &str, page_size: i64) -> Result<Self> {
        Self::build_from_token_for::<L>(&PageSizePolicy::default(), page_token, page_size)
    }

    /// Builds options for a first-page request.
    ///
    /// `sort_by` is `""`, `"<field>"`, `"<field> asc"` or `"<field> desc"`,
    /// matched case-insensitively against the API names in
    /// [`Listable::field_map`]. An empty `sort_by` sorts ascending by
    /// [`Listable::default_sort_field`]. The primary key always breaks ties.
    pub fn from_criteria<L: Listable>(
        page_size: i64,
        sort_by: &str,
        filter: Option<&FilterSpec>,
    ) -> Result<Self> {
        Self::build_from_criteria::<L>(&PageSizePolicy::default(), page_size, sort_by, filter)
    }

    /// Builds options for any list request.
    ///
    /// A non-empty `page_token` selects [`from_token_for`] and the sort and
    /// filter arguments are ignored; otherwise [`from_criteria`] is used.
    ///
    /// [`from_token_for`]: ListOptions::from_token_for
    /// [`from_criteria`]: ListOptions::from_criteria
    pub fn resolve<L: Listable>(
        page_token: Option<&str>,
        page_size: i64,
        sort_by: &str,
        filter: Option<&FilterSpec>,
    ) -> Result<Self> {
        match page_token {
            Some(token) if !token.is_empty() => Self::from_token_for::<L>(token, page_size),
            _ => Self::from_criteria::<L>(page_size, sort_by, filter),
        }
    }

    pub(crate) fn build_from_token(
        policy: &PageSizePolicy,
        page_token: &str,
        page_size: i64,
    ) -> Result<Self> {
        if page_token.is_empty() {
            return Err(Error::invalid_input()
                .with_message("cannot create list options from an empty page token"));
        }

        let page_size = policy.normalize(page_size)?;
        let token = PageToken::decode(page_token)?;

        tracing::debug!(
            target: TRACING_TARGET_OPTIONS,
            page_size,
            sort_field = token.sort_field(),
            order = token.order().as_ref(),
            "Resumed list options from page token"
        );

        Ok(Self { page_size, token })
    }

    pub(crate) fn build_from_token_for<L: Listable>(
        policy: &PageSizePolicy,
        page_token: &str,
        page_size: i64,
    ) -> Result<Self> {
        let options = Self::build_from_token(policy, page_token, page_size)?;
        check_token_fields::<L>(&options.token)?;
        Ok(options)
    }

    pub(crate) fn build_from_criteria<L: Listable>(
        policy: &PageSizePolicy,
        page_size: i64,
        sort_by: &str,
        filter: Option<&FilterSpec>,
    ) -> Result<Self> {
        let page_size = policy.normalize(page_size)?;
        let (sort_field, order) = parse_sort_by::<L>(sort_by)?;

        let filter = filter
            .map(|spec| Filter::compile(spec, L::field_map()))
            .transpose()?;

        tracing::debug!(
            target: TRACING_TARGET_OPTIONS,
            page_size,
            sort_field,
            order = order.as_ref(),
            filtered = filter.is_some(),
            listable = L::type_name(),
            "Created list options"
        );

        let token = PageToken::new(sort_field, L::primary_key_field(), order).with_filter(filter);
        Ok(Self { page_size, token })
    }

    /// Number of rows presented per page.
    #[inline]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows the query fetches: one past the page size, so that the
    /// presence of a further page is known without a count query.
    #[inline]
    pub fn fetch_limit(&self) -> u64 {
        u64::from(self.page_size) + 1
    }

    #[inline]
    pub fn token(&self) -> &PageToken {
        &self.token
    }

    #[inline]
    pub fn sort_field(&self) -> &str {
        self.token.sort_field()
    }

    #[inline]
    pub fn sort_value(&self) -> Option<&Value> {
        self.token.sort_value()
    }

    #[inline]
    pub fn key_field(&self) -> &str {
        self.token.key_field()
    }

    #[inline]
    pub fn key_value(&self) -> Option<&Value> {
        self.token.key_value()
    }

    #[inline]
    pub fn is_desc(&self) -> bool {
        self.token.is_desc()
    }

    #[inline]
    pub fn order(&self) -> SortOrder {
        self.token.order()
    }

    #[inline]
    pub fn filter(&self) -> Option<&Filter> {
        self.token.filter()
    }

    /// Extends the query with the keyset boundary, ordering, limit and
    /// filter of these options.
    ///
    /// For a continuation the boundary selects rows at or after the token's
    /// position: `sort > v OR (sort = v AND key >= k)` ascending, mirrored
    /// for descending. The position is the first row of the page being
    /// fetched, so the inclusive key comparison neither skips nor repeats a
    /// row.
    pub fn apply_to<Q: SelectQuery>(&self, query: Q) -> Q {
        let sort = self.sort_field();
        let key = self.key_field();
        let order = self.order();

        let mut query = query;
        if let Some(position) = self.token.position() {
            let sort_value = position.sort_value.clone();
            let key_value = position.key_value.clone();

            let boundary = if order.is_desc() {
                Expr::lt(sort, sort_value.clone())
                    .or(Expr::eq(sort, sort_value).and(Expr::lt_or_eq(key, key_value)))
            } else {
                Expr::gt(sort, sort_value.clone())
                    .or(Expr::eq(sort, sort_value).and(Expr::gt_or_eq(key, key_value)))
            };

            query = query.filter(boundary);
        }

        query = query
            .order_by(sort, order)
            .order_by(key, order)
            .limit(self.fetch_limit());

        if let Some(filter) = self.filter() {
            query = filter.apply_to(query);
        }

        tracing::debug!(
            target: TRACING_TARGET_OPTIONS,
            sort_field = sort,
            key_field = key,
            order = order.as_ref(),
            continuation = self.token.position().is_some(),
            filtered = self.filter().is_some(),
            fetch_limit = self.fetch_limit(),
            "Applied list options to query"
        );

        query
    }

    /// Returns the token of the page that starts at `record`.
    ///
    /// Pass the first row past the current page (the lookahead row). Fails
    /// with an internal error if the record does not expose the sort field
    /// or its primary key.
    pub fn next_page_token<L: Listable>(&self, record: &L) -> Result<String> {
        self.next_token(record)?.encode()
    }

    pub(crate) fn next_token<L: Listable>(&self, record: &L) -> Result<PageToken> {
        let sort_field = self.sort_field();
        let sort_value = record.field_value(sort_field).ok_or_else(|| {
            missing_field(format!(
                "cannot sort by field {sort_field:?} on type {:?}",
                L::type_name()
            ))
        })?;

        let key_field = L::primary_key_field();
        let key_value = record.field_value(key_field).ok_or_else(|| {
            missing_field(format!(
                "type {:?} does not have key field {key_field:?}",
                L::type_name()
            ))
        })?;

        Ok(PageToken::new(sort_field, key_field, self.order())
            .with_position(sort_value, key_value)
            .with_filter(self.filter().cloned()))
    }

    /// Assembles the page for rows fetched with [`apply_to`].
    ///
    /// [`apply_to`]: ListOptions::apply_to
    pub fn paginate<L: Listable>(&self, rows: Vec<L>) -> Result<Page<L>> {
        Page::new(rows, self)
    }
}

fn missing_field(message: String) -> Error {
    tracing::error!(
        target: TRACING_TARGET_OPTIONS,
        reason = %message,
        "Failed to derive next page token"
    );
    Error::internal_error().with_message(message)
}

/// Rejects tokens naming fields that `L` does not expose.
fn check_token_fields<L: Listable>(token: &PageToken) -> Result<()> {
    let fields = L::field_map();
    let key_field = L::primary_key_field();
    let sortable = |name: &str| {
        name == key_field || name == L::default_sort_field() || fields.contains_internal(name)
    };

    let rejected = if token.key_field() != key_field {
        Some(token.key_field())
    } else if !sortable(token.sort_field()) {
        Some(token.sort_field())
    } else {
        token
            .filter()
            .and_then(|filter| filter.fields().find(|field| !fields.contains_internal(field)))
    };

    match rejected {
        None => Ok(()),
        Some(field) => {
            tracing::warn!(
                target: TRACING_TARGET_TOKEN,
                field,
                listable = L::type_name(),
                "Rejected page token naming an unexposed field"
            );
            Err(Error::invalid_input().with_message(INVALID_TOKEN_MESSAGE))
        }
    }
}

/// Parses `"<field> [asc|desc]"` into an internal field name and direction.
fn parse_sort_by<L: Listable>(sort_by: &str) -> Result<(&'static str, SortOrder)> {
    let invalid_format = || {
        Error::invalid_input().with_message(format!(
            "received invalid sort by format {sort_by:?}; supported formats: \
             \"field_name\", \"field_name desc\", or \"field_name asc\""
        ))
    };

    let lowered = sort_by.to_lowercase();
    let parts: Vec<&str> = lowered.split_whitespace().collect();

    let (name, order) = match parts.as_slice() {
        [] => return Ok((L::default_sort_field(), SortOrder::Asc)),
        [name] => (*name, SortOrder::Asc),
        [name, order] => (*name, order.parse::<SortOrder>().map_err(|_| invalid_format())?),
        _ => return Err(invalid_format()),
    };

    let field = L::field_map().get(name).ok_or_else(|| {
        Error::invalid_input().with_message(format!("invalid sorting field: {name:?}"))
    })?;

    Ok((field, order))
}
