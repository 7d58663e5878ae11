//! Fixed-capacity, sorted, deduplicated set of line offsets, used both for a
//! request's own offset list and for a secondary config's offset subset.
//!
//! Lookup is a linear scan rather than `binary_search`: the sets involved are
//! at most 64 entries, so a branch-free scan is cheaper and simpler than a
//! sorted search, and it's what offset-to-bit-position translation below the
//! kernel boundary wants anyway.

use heapless::Vec as HVec;

use crate::uapi::v2::GPIO_LINES_MAX;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct OffsetSet(HVec<u32, GPIO_LINES_MAX>);

impl OffsetSet {
    pub const fn empty() -> Self {
        Self(HVec::new())
    }

    /// Copy `offsets`, clamp its length to 64, sort ascending, and remove
    /// adjacent duplicates. Excess entries beyond 64 are silently dropped.
    pub fn normalize(offsets: &[u32]) -> Self {
        let mut v: HVec<u32, GPIO_LINES_MAX> = offsets.iter().copied().take(GPIO_LINES_MAX).collect();
        v.sort_unstable();
        v.dedup();
        Self(v)
    }

    /// Copy `offsets` verbatim: same order, duplicates kept, only clamped to
    /// 64 entries. A request's own offset list is not a set, its position
    /// encodes the kernel bit index, so reordering it would silently remap
    /// which bit controls which line.
    pub fn truncated(offsets: &[u32]) -> Self {
        Self(offsets.iter().copied().take(GPIO_LINES_MAX).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Position of `offset` within this set, by linear scan.
    pub fn find_idx(&self, offset: u32) -> Option<usize> {
        self.0.iter().position(|&o| o == offset)
    }

    pub fn to_fixed_array(&self) -> (u32, [u32; GPIO_LINES_MAX]) {
        let mut out = [0u32; GPIO_LINES_MAX];
        out[..self.0.len()].copy_from_slice(&self.0);
        (self.0.len() as u32, out)
    }
}

impl FromIterator<u32> for OffsetSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let collected: HVec<u32, GPIO_LINES_MAX> = iter.into_iter().take(GPIO_LINES_MAX).collect();
        Self::normalize(&collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_sorts_and_dedups() {
        let s = OffsetSet::normalize(&[5, 3, 5, 1, 3]);
        assert_eq!(s.as_slice(), &[1, 3, 5]);
    }

    #[test]
    fn normalize_clamps_to_64() {
        let many: Vec<u32> = (0..100).collect();
        let s = OffsetSet::normalize(&many);
        assert_eq!(s.len(), GPIO_LINES_MAX);
        assert_eq!(s.as_slice()[GPIO_LINES_MAX - 1], (GPIO_LINES_MAX - 1) as u32);
    }

    #[test]
    fn find_idx_linear_scan() {
        let s = OffsetSet::normalize(&[7, 2, 9]);
        assert_eq!(s.find_idx(9), Some(2));
        assert_eq!(s.find_idx(100), None);
    }

    #[test]
    fn truncated_preserves_order_and_duplicates() {
        let s = OffsetSet::truncated(&[7, 2, 2, 4]);
        assert_eq!(s.as_slice(), &[7, 2, 2, 4]);
    }

    #[test]
    fn truncated_clamps_to_64() {
        let many: Vec<u32> = (0..100).rev().collect();
        let s = OffsetSet::truncated(&many);
        assert_eq!(s.len(), GPIO_LINES_MAX);
        assert_eq!(s.as_slice()[0], 99);
        assert_eq!(s.as_slice()[GPIO_LINES_MAX - 1], 99 - (GPIO_LINES_MAX as u32 - 1));
    }
}
