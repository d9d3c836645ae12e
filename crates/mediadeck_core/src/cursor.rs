/// Parameters of one collection page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub query: Option<String>,
}

/// Per-view pagination state.
///
/// `has_more` only ever goes from true to false; a view that wants to
/// retry after exhaustion or failure must be recreated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    page_index: u32,
    page_size: u32,
    has_more: bool,
    is_fetching: bool,
}

impl PageCursor {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_index: 1,
            page_size,
            has_more: true,
            is_fetching: false,
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    /// Starts a fetch for the current page, or returns `None` when exhausted
    /// or already in flight. Duplicate calls are dropped, not queued.
    pub fn begin(&mut self) -> Option<u32> {
        if !self.has_more || self.is_fetching {
            return None;
        }
        self.is_fetching = true;
        Some(self.page_index)
    }

    /// Records a successful batch of `received` items.
    pub fn complete(&mut self, received: usize) {
        if !self.is_fetching {
            return;
        }
        self.is_fetching = false;
        self.page_index += 1;
        if received == 0 || received < self.page_size as usize {
            self.has_more = false;
        }
    }

    /// Records a failed fetch. No retry: the cursor is exhausted for good.
    pub fn fail(&mut self) {
        if !self.is_fetching {
            return;
        }
        self.is_fetching = false;
        self.has_more = false;
    }
}
