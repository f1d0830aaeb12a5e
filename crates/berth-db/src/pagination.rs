use berth_types::api::non_empty;

use crate::RepoError;

/// How `list_bookings` bounds its result. Exactly one mode applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `LIMIT limit OFFSET offset`
    Offset { limit: u32, offset: u32 },
    /// `LIMIT limit OFFSET limit * (page - 1)`
    Page { limit: u32, page: u32 },
    /// `LIMIT limit`
    Limit(u32),
    /// No bound.
    All,
}

impl Pagination {
    /// Pick the mode from raw query parameters. Empty strings count as absent.
    ///
    /// Precedence is fixed: limit+offset, then limit+page, then limit alone,
    /// then nothing. Without `limit`, `page` and `offset` are ignored and are
    /// not even parsed. Only the parameters of the chosen mode are parsed.
    pub fn from_params(
        limit: Option<&str>,
        page: Option<&str>,
        offset: Option<&str>,
    ) -> Result<Self, RepoError> {
        let Some(limit) = non_empty(limit) else {
            return Ok(Self::All);
        };
        let limit = parse_param("limit", limit)?;

        if let Some(offset) = non_empty(offset) {
            return Ok(Self::Offset {
                limit,
                offset: parse_param("offset", offset)?,
            });
        }
        if let Some(page) = non_empty(page) {
            let page = parse_param("page", page)?;
            if page == 0 {
                return Err(RepoError::PageOutOfRange);
            }
            return Ok(Self::Page { limit, page });
        }
        Ok(Self::Limit(limit))
    }

    /// `(limit, offset)` to bind into the query, or `None` for every row.
    pub fn limit_offset(&self) -> Option<(i64, i64)> {
        match *self {
            Self::Offset { limit, offset } => Some((i64::from(limit), i64::from(offset))),
            Self::Page { limit, page } => {
                let limit = i64::from(limit);
                Some((limit, limit * (i64::from(page) - 1)))
            }
            Self::Limit(limit) => Some((i64::from(limit), 0)),
            Self::All => None,
        }
    }
}

fn parse_param(name: &'static str, value: &str) -> Result<u32, RepoError> {
    value.parse().map_err(|source| RepoError::InvalidParam {
        name,
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Empty strings stand for absent parameters.
    fn mode(limit: &str, page: &str, offset: &str) -> Result<Pagination, RepoError> {
        Pagination::from_params(Some(limit), Some(page), Some(offset))
    }

    #[test]
    fn absent_and_empty_are_the_same() {
        assert_eq!(Pagination::from_params(None, None, None).unwrap(), Pagination::All);
        assert_eq!(
            Pagination::from_params(Some("3"), None, Some("")).unwrap(),
            Pagination::Limit(3)
        );
    }

    #[test]
    fn offset_beats_page() {
        let p = mode("2", "5", "3").unwrap();
        assert_eq!(p, Pagination::Offset { limit: 2, offset: 3 });
        assert_eq!(p.limit_offset(), Some((2, 3)));
    }

    #[test]
    fn page_mode() {
        let p = mode("3", "2", "").unwrap();
        assert_eq!(p, Pagination::Page { limit: 3, page: 2 });
        assert_eq!(p.limit_offset(), Some((3, 3)));
        assert_eq!(mode("10", "1", "").unwrap().limit_offset(), Some((10, 0)));
    }

    #[test]
    fn limit_only() {
        let p = mode("4", "", "").unwrap();
        assert_eq!(p, Pagination::Limit(4));
        assert_eq!(p.limit_offset(), Some((4, 0)));
    }

    #[test]
    fn page_or_offset_without_limit_is_ignored() {
        assert_eq!(mode("", "2", "").unwrap(), Pagination::All);
        assert_eq!(mode("", "", "7").unwrap(), Pagination::All);
        assert_eq!(mode("", "junk", "junk").unwrap(), Pagination::All);
        assert_eq!(Pagination::All.limit_offset(), None);
    }

    #[test]
    fn non_numeric_values_are_client_errors() {
        for (l, p, o) in [("ten", "", ""), ("2", "", "x"), ("2", "second", ""), ("-1", "", "")] {
            let err = mode(l, p, o).unwrap_err();
            assert!(matches!(err, RepoError::InvalidParam { .. }), "{err}");
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn unused_params_are_not_parsed() {
        // offset mode never looks at page
        assert_eq!(mode("2", "junk", "1").unwrap(), Pagination::Offset { limit: 2, offset: 1 });
    }

    #[test]
    fn page_zero_is_rejected() {
        let err = mode("5", "0", "").unwrap_err();
        assert!(matches!(err, RepoError::PageOutOfRange));
    }
}
