/// One response from a paged API.
///
/// Any subset of fields may be present, so a single physical request can answer the total
/// count, the page size, and a page of items at once. A typical web API that returns
/// `{ total, per_page, page, items }` maps onto [`PageResult::full_page`].
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageResult<T> {
    pub total_item_count: Option<usize>,
    pub items_per_page: Option<usize>,
    /// 1-based.
    pub page_number: Option<usize>,
    pub page: Option<Vec<T>>,
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self {
            total_item_count: None,
            items_per_page: None,
            page_number: None,
            page: None,
        }
    }
}

impl<T> PageResult<T> {
    pub fn new(
        total_item_count: Option<usize>,
        items_per_page: Option<usize>,
        page_number: Option<usize>,
        page: Option<Vec<T>>,
    ) -> Self {
        Self {
            total_item_count,
            items_per_page,
            page_number,
            page,
        }
    }

    /// A result that only reports the total number of items.
    pub fn total(total_item_count: usize) -> Self {
        Self::default().with_total(total_item_count)
    }

    /// A result that only reports the page size.
    pub fn page_size(items_per_page: usize) -> Self {
        Self::default().with_items_per_page(items_per_page)
    }

    /// A result that only carries the items of one page.
    pub fn items(page_number: usize, items: Vec<T>) -> Self {
        Self::default().with_page(page_number, items)
    }

    /// A result that answers everything at once.
    pub fn full_page(
        total_item_count: usize,
        items_per_page: usize,
        page_number: usize,
        items: Vec<T>,
    ) -> Self {
        Self::new(
            Some(total_item_count),
            Some(items_per_page),
            Some(page_number),
            Some(items),
        )
    }

    pub fn with_total(mut self, total_item_count: usize) -> Self {
        self.total_item_count = Some(total_item_count);
        self
    }

    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = Some(items_per_page);
        self
    }

    pub fn with_page(mut self, page_number: usize, items: Vec<T>) -> Self {
        self.page_number = Some(page_number);
        self.page = Some(items);
        self
    }
}
