use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ALLOWED_PAGE_SIZES: [u32; 5] = [5, 10, 25, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(u32);

impl PageSize {
    pub const DEFAULT: PageSize = PageSize(25);

    pub fn new(value: u32) -> Result<Self, CoreError> {
        if ALLOWED_PAGE_SIZES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidPageSize(value))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Next allowed size up; saturates at the largest.
    pub fn larger(self) -> Self {
        ALLOWED_PAGE_SIZES
            .iter()
            .copied()
            .find(|size| *size > self.0)
            .map(Self)
            .unwrap_or(self)
    }

    /// Next allowed size down; saturates at the smallest.
    pub fn smaller(self) -> Self {
        ALLOWED_PAGE_SIZES
            .iter()
            .rev()
            .copied()
            .find(|size| *size < self.0)
            .map(Self)
            .unwrap_or(self)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for PageSize {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.0
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let size = u64::from(page_size);
    let pages = total.div_ceil(size);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{total_pages, PageSize};
    use crate::error::CoreError;

    #[test]
    fn only_allowed_sizes_are_accepted() {
        assert_eq!(PageSize::new(50).unwrap().get(), 50);
        assert_eq!(PageSize::new(20).unwrap_err(), CoreError::InvalidPageSize(20));
        assert_eq!(PageSize::default().get(), 25);
    }

    #[test]
    fn stepping_saturates_at_the_ends() {
        let smallest = PageSize::new(5).unwrap();
        let largest = PageSize::new(100).unwrap();
        assert_eq!(smallest.smaller(), smallest);
        assert_eq!(smallest.larger().get(), 10);
        assert_eq!(largest.larger(), largest);
        assert_eq!(largest.smaller().get(), 50);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(15, 5), 3);
        assert_eq!(total_pages(16, 5), 4);
        assert_eq!(total_pages(0, 25), 0);
        assert_eq!(total_pages(1, 25), 1);
    }
}
