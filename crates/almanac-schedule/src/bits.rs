//! Fixed-width bit helpers shared by the parser and the timeout search.
//!
//! Every mask stores value `v` of a field at bit `v - base`, where `base` is
//! the field's lowest value (0 for time fields, 1 for months and days).

/// First year a `year` attribute may name.
pub const MIN_YEAR: i32 = 1000;
/// Last year a `year` attribute may name; searches never go past it.
pub const MAX_YEAR: i32 = 9999;

const YEAR_WORDS: usize = ((MAX_YEAR - MIN_YEAR + 1) as usize).div_ceil(64);

/// Sets bit `index`.
pub(crate) fn add_bit(mask: u64, index: u32) -> u64 {
    mask | (1 << index)
}

/// Sets every bit in `low..=high`.
pub(crate) fn add_bits(mask: u64, low: u32, high: u32) -> u64 {
    debug_assert!(low <= high && high < 64);
    let width = high - low + 1;
    let run = if width == 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    };
    mask | (run << low)
}

/// Lowest set bit at or above `from`.
pub(crate) fn higher(mask: u64, from: u32) -> Option<u32> {
    if from >= 64 {
        return None;
    }
    let rest = mask & (u64::MAX << from);
    (rest != 0).then(|| rest.trailing_zeros())
}

/// Lowest set bit at or above `from` that does not exceed `max`.
pub(crate) fn higher_within(mask: u64, from: u32, max: u32) -> Option<u32> {
    higher(mask, from).filter(|&bit| bit <= max)
}

/// Lowest set bit; 0 for an empty mask so callers always get a valid index.
pub(crate) fn first(mask: u64) -> u32 {
    higher(mask, 0).unwrap_or(0)
}

/// Iterates the indexes of the set bits, lowest first.
pub(crate) fn ones(mut mask: u64) -> impl Iterator<Item = u32> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let bit = mask.trailing_zeros();
        mask &= mask - 1;
        Some(bit)
    })
}

/// Set of years in `MIN_YEAR..=MAX_YEAR`, addressed by offset from `MIN_YEAR`.
#[derive(Clone, PartialEq, Eq)]
pub struct YearSet {
    words: Box<[u64]>,
}

impl YearSet {
    pub(crate) fn new() -> Self {
        Self {
            words: vec![0; YEAR_WORDS].into_boxed_slice(),
        }
    }

    fn offset(year: i32) -> Option<usize> {
        (MIN_YEAR..=MAX_YEAR)
            .contains(&year)
            .then(|| (year - MIN_YEAR) as usize)
    }

    pub(crate) fn insert(&mut self, year: i32) {
        if let Some(offset) = Self::offset(year) {
            self.words[offset / 64] |= 1 << (offset % 64);
        }
    }

    pub(crate) fn insert_range(&mut self, low: i32, high: i32) {
        for year in low..=high {
            self.insert(year);
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        Self::offset(year).is_some_and(|offset| self.words[offset / 64] & (1 << (offset % 64)) != 0)
    }

    /// Smallest included year strictly greater than `year`.
    pub fn next_after(&self, year: i32) -> Option<i32> {
        if year >= MAX_YEAR {
            return None;
        }
        let from = (year.max(MIN_YEAR - 1) + 1 - MIN_YEAR) as usize;
        let mut word = from / 64;
        let mut bits = self.words[word] & (u64::MAX << (from % 64));
        loop {
            if bits != 0 {
                let offset = word * 64 + bits.trailing_zeros() as usize;
                return Some(MIN_YEAR + offset as i32);
            }
            word += 1;
            bits = *self.words.get(word)?;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            ones(word).map(move |bit| MIN_YEAR + (index * 64) as i32 + bit as i32)
        })
    }
}

impl std::fmt::Debug for YearSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
