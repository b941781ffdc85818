//! Query cost budgeting.
//!
//! The remote API rejects any single request whose query cost exceeds
//! [`QUERY_COST_CEILING`]. A listing costs [`BASE_COST`] plus a fixed cost
//! per requested item, where the per-item cost depends on which fields the
//! query selects:
//!
//! ```text
//! flat      100 + 2 (id, updatedAt)         * 4900 = 9900
//! paginated 100 + 3 (id, updatedAt, cursor) * 3200 = 9700
//! ```
//!
//! The page limits are fixed values, not derived from the formula.

/// Maximum query cost the server accepts per request.
pub const QUERY_COST_CEILING: u32 = 10_000;

/// Fixed cost of a listing request regardless of size.
pub const BASE_COST: u32 = 100;

/// Most items a single flat listing may request.
pub const BUNDLE_LIMIT: usize = 4_900;

/// Most items a single paginated listing page may request.
pub const PAGE_LIMIT: usize = 3_200;

/// Most items per page when every item carries its full projection.
pub const FULL_PAGE_LIMIT: usize = 100;

/// The field selection of a listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingShape {
    /// One request returning `nodes { id updatedAt }`.
    Flat,
    /// Chained requests returning `edges { node { id updatedAt } cursor }`.
    Paginated,
    /// Chained requests returning full documents plus a cursor.
    FullPaginated,
}

impl ListingShape {
    /// Cost charged per requested item.
    pub const fn per_item_cost(self) -> u32 {
        match self {
            ListingShape::Flat => 2,
            ListingShape::Paginated => 3,
            // content, summary and nested connections dominate
            ListingShape::FullPaginated => 90,
        }
    }

    /// Most items one request of this shape may ask for.
    pub const fn page_limit(self) -> usize {
        match self {
            ListingShape::Flat => BUNDLE_LIMIT,
            ListingShape::Paginated => PAGE_LIMIT,
            ListingShape::FullPaginated => FULL_PAGE_LIMIT,
        }
    }

    /// Whether requests of this shape carry a cursor.
    pub const fn is_paginated(self) -> bool {
        !matches!(self, ListingShape::Flat)
    }

    /// Query cost of one request for `items` items.
    pub fn request_cost(self, items: usize) -> u64 {
        u64::from(BASE_COST) + u64::from(self.per_item_cost()) * items as u64
    }
}

/// Applies a caller limit to a remote count.
///
/// A limit of zero means "no limit".
pub fn effective_total(count: usize, limit: usize) -> usize {
    if limit > 0 && limit < count {
        limit
    } else {
        count
    }
}

/// An ordered list of page sizes for one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    shape: ListingShape,
    pages: Vec<usize>,
}

impl PagePlan {
    /// Plans a listing of `{id, updatedAt}` stubs.
    ///
    /// Totals that fit in one flat request get a single flat page; anything
    /// larger is paginated.
    pub fn for_listing(count: usize, limit: usize) -> Self {
        let total = effective_total(count, limit);
        let shape = if total > BUNDLE_LIMIT {
            ListingShape::Paginated
        } else {
            ListingShape::Flat
        };
        Self::new(total, 0, shape)
    }

    /// Splits the effective total into pages no larger than the shape allows.
    pub fn new(count: usize, limit: usize, shape: ListingShape) -> Self {
        let mut rest = effective_total(count, limit);
        let mut pages = Vec::with_capacity(rest.div_ceil(shape.page_limit()));
        while rest > 0 {
            let take = rest.min(shape.page_limit());
            pages.push(take);
            rest -= take;
        }
        Self { shape, pages }
    }

    /// The listing shape every page uses.
    pub fn shape(&self) -> ListingShape {
        self.shape
    }

    /// Page sizes in request order.
    pub fn pages(&self) -> &[usize] {
        &self.pages
    }

    /// Sum of all page sizes.
    pub fn total(&self) -> usize {
        self.pages.iter().sum()
    }

    /// Returns true if nothing needs to be requested.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn limits_fit_under_ceiling() {
        for shape in [
            ListingShape::Flat,
            ListingShape::Paginated,
            ListingShape::FullPaginated,
        ] {
            assert!(shape.request_cost(shape.page_limit()) <= u64::from(QUERY_COST_CEILING));
        }
        assert_eq!(ListingShape::Flat.request_cost(BUNDLE_LIMIT), 9_900);
        assert_eq!(ListingShape::Paginated.request_cost(PAGE_LIMIT), 9_700);
    }

    #[test]
    fn large_count_is_paginated() {
        let plan = PagePlan::for_listing(10_500, 0);
        assert_eq!(plan.shape(), ListingShape::Paginated);
        assert_eq!(plan.pages(), &[3200, 3200, 3200, 900]);
    }

    #[test]
    fn small_count_is_flat() {
        let plan = PagePlan::for_listing(3_000, 0);
        assert_eq!(plan.shape(), ListingShape::Flat);
        assert_eq!(plan.pages(), &[3000]);

        let plan = PagePlan::for_listing(BUNDLE_LIMIT, 0);
        assert_eq!(plan.shape(), ListingShape::Flat);
        assert_eq!(plan.pages(), &[BUNDLE_LIMIT]);

        let plan = PagePlan::for_listing(BUNDLE_LIMIT + 1, 0);
        assert_eq!(plan.shape(), ListingShape::Paginated);
        assert_eq!(plan.pages(), &[PAGE_LIMIT, BUNDLE_LIMIT + 1 - PAGE_LIMIT]);
    }

    #[test]
    fn limit_takes_precedence() {
        let plan = PagePlan::for_listing(10_500, 5_000);
        assert_eq!(plan.shape(), ListingShape::Paginated);
        assert_eq!(plan.pages(), &[3200, 1800]);

        let plan = PagePlan::for_listing(10_500, 10);
        assert_eq!(plan.shape(), ListingShape::Flat);
        assert_eq!(plan.pages(), &[10]);

        // a limit above the count changes nothing
        assert_eq!(effective_total(20, 50), 20);
    }

    #[test]
    fn empty_plan() {
        let plan = PagePlan::for_listing(0, 0);
        assert!(plan.is_empty());
        assert_eq!(plan.total(), 0);
    }

    #[test]
    fn full_pages() {
        let plan = PagePlan::new(250, 0, ListingShape::FullPaginated);
        assert_eq!(plan.pages(), &[100, 100, 50]);
    }

    proptest! {
        #[test]
        fn plan_sums_to_effective_total(count in 0usize..40_000, limit in 0usize..40_000) {
            let plan = PagePlan::for_listing(count, limit);
            let expected = if limit > 0 { count.min(limit) } else { count };
            prop_assert_eq!(plan.total(), expected);

            if plan.shape().is_paginated() {
                prop_assert!(plan.pages().iter().all(|&p| p > 0 && p <= PAGE_LIMIT));
            } else {
                prop_assert!(plan.pages().len() <= 1);
                prop_assert!(plan.pages().iter().all(|&p| p <= BUNDLE_LIMIT));
            }
        }
    }
}
