pub mod filter;
pub mod hierarchy;
pub mod pagination;
pub mod query;
pub mod sort;

use serde::{Deserialize, Serialize};

pub use filter::{UserFilters, filter};
pub use hierarchy::{Forest, HierarchyNode, NodeRef, build};
pub use pagination::{PageRequest, PaginationState, paginate, total_pages};
pub use sort::{SortDirection, SortField, UserSorting, sort};

use crate::models::UserRecord;

/// Everything that decides what a listing shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    pub pagination: PageRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting: Option<UserSorting>,
    #[serde(default)]
    pub filters: UserFilters,
}

impl ListParams {
    pub fn to_query(&self) -> String {
        query::encode(self.pagination, self.sorting.as_ref(), &self.filters)
    }

    pub fn from_query(raw: &str) -> Self {
        let (pagination, sorting, filters) = query::decode(raw);
        Self {
            pagination,
            sorting,
            filters,
        }
    }
}

/// Filter then sort, the order every listing applies them in.
pub fn shape(records: &[UserRecord], params: &ListParams) -> Vec<UserRecord> {
    let filtered = filter(records, &params.filters);
    sort(&filtered, params.sorting.as_ref())
}
