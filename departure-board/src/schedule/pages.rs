//! Platform pagination.

/// A station's platforms split into fixed-size pages.
///
/// The last page may be shorter. Order is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlatformPages {
    pages: Vec<Vec<String>>,
}

impl PlatformPages {
    /// Chunk `platforms` into pages of `per_page` (treated as at least 1).
    ///
    /// ```
    /// use departure_board::schedule::PlatformPages;
    ///
    /// let platforms: Vec<String> = (1..=6).map(|p| p.to_string()).collect();
    /// let pages = PlatformPages::new(&platforms, 4);
    ///
    /// assert_eq!(pages.len(), 2);
    /// assert_eq!(pages.page(0), ["1", "2", "3", "4"]);
    /// assert_eq!(pages.page(1), ["5", "6"]);
    /// assert_eq!(pages.next_index(1), 0);
    /// ```
    pub fn new(platforms: &[String], per_page: usize) -> Self {
        Self {
            pages: platforms
                .chunks(per_page.max(1))
                .map(<[String]>::to_vec)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Platforms on page `index`; empty if there is no such page.
    pub fn page(&self, index: usize) -> &[String] {
        self.pages.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    /// The page after `index`, wrapping to the first.
    pub fn next_index(&self, index: usize) -> usize {
        if self.pages.is_empty() {
            0
        } else {
            (index + 1) % self.pages.len()
        }
    }

    /// Whether there is anything to rotate between.
    pub fn rotates(&self) -> bool {
        self.pages.len() > 1
    }
}
