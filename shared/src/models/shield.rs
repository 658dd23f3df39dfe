//! Shield Model (billboard / plaque records)

use serde::{Deserialize, Serialize};

/// Records shown per admin list page
pub const PAGE_SIZE: u32 = 20;

/// Shield entity
///
/// `paid_at` is set iff `paid` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Shield {
    pub id: i64,
    pub street: String,
    pub client: String,
    pub amount: f64,
    pub paid: bool,
    /// Creation time (Unix millis, UTC)
    pub created_at: i64,
    /// Payment time (Unix millis, UTC)
    pub paid_at: Option<i64>,
    /// Absolute URL (hosted storage) or bare filename (local storage)
    pub photo_url: Option<String>,
}

impl Shield {
    /// Whether the photo reference points at a remote host
    pub fn has_remote_photo(&self) -> bool {
        self.photo_url
            .as_deref()
            .is_some_and(|u| u.starts_with("http://") || u.starts_with("https://"))
    }
}

/// Create shield payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldCreate {
    pub street: String,
    pub client: String,
    pub amount: f64,
    pub photo_url: Option<String>,
}

/// Sortable columns of the admin list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    #[serde(rename = "date_created")]
    CreatedAt,
    Amount,
    Paid,
    #[serde(rename = "paid_date")]
    PaidAt,
}

impl SortField {
    /// Parse a query-string value; unknown values fall back to creation date
    pub fn from_param(value: &str) -> Self {
        match value {
            "amount" => Self::Amount,
            "paid" => Self::Paid,
            "paid_date" => Self::PaidAt,
            _ => Self::CreatedAt,
        }
    }

    /// Query-string value
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::CreatedAt => "date_created",
            Self::Amount => "amount",
            Self::Paid => "paid",
            Self::PaidAt => "paid_date",
        }
    }

    /// Column name in the `shields` table
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Amount => "amount",
            Self::Paid => "paid",
            Self::PaidAt => "paid_at",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse a query-string value; anything but `asc` is descending
    pub fn from_param(value: &str) -> Self {
        if value.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn flip(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// One page of a sorted listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of records across all pages
    pub total: i64,
    /// 1-indexed page number
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        let total = self.total.max(0) as u64;
        total.div_ceil(self.page_size as u64) as u32
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}
