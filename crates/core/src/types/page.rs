//! Offset pagination and sorting for customer listings.

use serde::Serialize;

/// Errors produced while reading pagination parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PageRequestError {
    /// `page` is not a non-negative integer.
    #[error("page must be a non-negative integer")]
    InvalidPage,
    /// `size` is not an integer in range.
    #[error("size must be between 1 and {max}")]
    InvalidSize {
        /// Largest accepted page size.
        max: u32,
    },
    /// `sort` names an unknown field or direction.
    #[error("sort must be one of name, created_at, birth_date, id optionally followed by ,asc or ,desc")]
    InvalidSort,
}

impl PageRequestError {
    /// Name of the query parameter this error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidPage => "page",
            Self::InvalidSize { .. } => "size",
            Self::InvalidSort => "sort",
        }
    }
}

/// Column a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    CreatedAt,
    BirthDate,
    Id,
}

impl SortField {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "created_at" | "createdAt" => Some(Self::CreatedAt),
            "birth_date" | "birthDate" => Some(Self::BirthDate),
            "id" => Some(Self::Id),
            _ => None,
        }
    }

    /// Column name in the `customers` table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CreatedAt => "created_at",
            Self::BirthDate => "birth_date",
            Self::Id => "id",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Ordering of a listing. Defaults to `name` ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    /// Parse `field[,asc|desc]` (direction is case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `PageRequestError::InvalidSort` for unknown fields or directions.
    pub fn parse(s: &str) -> Result<Self, PageRequestError> {
        let (field, direction) = match s.split_once(',') {
            Some((field, direction)) => (field.trim(), Some(direction.trim())),
            None => (s.trim(), None),
        };

        let field = SortField::parse(field).ok_or(PageRequestError::InvalidSort)?;
        let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(_) => return Err(PageRequestError::InvalidSort),
        };

        Ok(Self { field, direction })
    }
}

/// A request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: Self::DEFAULT_SIZE,
            sort: Sort::default(),
        }
    }
}

impl PageRequest {
    /// Page size used when none is given.
    pub const DEFAULT_SIZE: u32 = 20;

    /// Largest page size a caller may request.
    pub const MAX_SIZE: u32 = 100;

    /// Build a page request from already-typed values.
    ///
    /// # Errors
    ///
    /// Returns `PageRequestError::InvalidSize` if `size` is 0 or above [`Self::MAX_SIZE`].
    pub const fn new(page: u32, size: u32, sort: Sort) -> Result<Self, PageRequestError> {
        if size == 0 || size > Self::MAX_SIZE {
            return Err(PageRequestError::InvalidSize {
                max: Self::MAX_SIZE,
            });
        }
        Ok(Self { page, size, sort })
    }

    /// Build a page request from raw query-string values, collecting every problem.
    ///
    /// Missing or blank values fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns one `PageRequestError` per invalid parameter.
    pub fn from_query(
        page: Option<&str>,
        size: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Self, Vec<PageRequestError>> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }

        let mut errors = Vec::new();

        let page = match present(page) {
            None => 0,
            Some(v) => v.parse::<u32>().unwrap_or_else(|_| {
                errors.push(PageRequestError::InvalidPage);
                0
            }),
        };

        let size = match present(size) {
            None => Self::DEFAULT_SIZE,
            Some(v) => match v.parse::<u32>() {
                Ok(n) if (1..=Self::MAX_SIZE).contains(&n) => n,
                _ => {
                    errors.push(PageRequestError::InvalidSize {
                        max: Self::MAX_SIZE,
                    });
                    Self::DEFAULT_SIZE
                }
            },
        };

        let sort = match present(sort) {
            None => Sort::default(),
            Some(v) => Sort::parse(v).unwrap_or_else(|e| {
                errors.push(e);
                Sort::default()
            }),
        };

        if errors.is_empty() {
            Ok(Self { page, size, sort })
        } else {
            Err(errors)
        }
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Requested ordering.
    #[must_use]
    pub const fn sort(&self) -> Sort {
        self.sort
    }

    /// Number of items to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Assemble a page from its items and the total number of matches.
    #[must_use]
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size());
        Self {
            content,
            page: request.page(),
            size: request.size(),
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }

    /// Transform every item, keeping the totals.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
