pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Most pages [`Paging::All`] walks before giving up.
pub const MAX_PAGES: u32 = 1000;

/// Which pages of a listing to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Paging {
    /// Keep requesting pages until a short page comes back.
    #[default]
    All,
    /// A single page, 1-based.
    Page { page: u32, page_size: u32 },
}

impl Paging {
    pub fn single(page: u32, page_size: u32) -> Self {
        Self::Page {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        match self {
            Paging::All => DEFAULT_PAGE_SIZE,
            Paging::Page { page_size, .. } => *page_size,
        }
    }

    pub fn first_page(&self) -> u32 {
        match self {
            Paging::All => 1,
            Paging::Page { page, .. } => *page,
        }
    }

    /// The page to request after `page` came back with `fetched` items.
    pub fn next_page(&self, page: u32, fetched: usize) -> Option<u32> {
        match self {
            Paging::Page { .. } => None,
            Paging::All if fetched < self.page_size() as usize => None,
            Paging::All => Some(page + 1),
        }
    }
}
