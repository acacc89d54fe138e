//! Geometry and column width computation for views.

use crate::grid::item::FixedPosition;

/// Position and size of a view, in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge.
    pub x: u16,
    /// Top edge.
    pub y: u16,
    /// Width.
    pub width: u16,
    /// Height.
    pub height: u16,
}

impl Rect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0, 0, 80, 24)
    }
}

/// Which dimensions follow the host size, minus fixed offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoSize {
    /// Width follows the host.
    pub auto_width: bool,
    /// Height follows the host.
    pub auto_height: bool,
    /// Columns left free on the right.
    pub offset_w: u16,
    /// Lines left free at the bottom.
    pub offset_h: u16,
}

impl AutoSize {
    /// Both dimensions follow the host.
    #[must_use]
    pub fn full() -> Self {
        Self { auto_width: true, auto_height: true, offset_w: 0, offset_h: 0 }
    }

    /// Returns true if any dimension follows the host.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.auto_width || self.auto_height
    }

    /// Resizes `rect` to fit a host of `host` (width, height); returns true if it changed.
    pub fn apply(&self, rect: &mut Rect, host: (u16, u16)) -> bool {
        let before = *rect;
        if self.auto_width {
            rect.width = host.0.saturating_sub(rect.x).saturating_sub(self.offset_w).max(1);
        }
        if self.auto_height {
            rect.height = host.1.saturating_sub(rect.y).saturating_sub(self.offset_h).max(1);
        }
        before != *rect
    }
}

/// Sizing inputs of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WidthRequest {
    /// Smallest acceptable width.
    pub(crate) base: u16,
    /// Share of the width left after fixed-width columns.
    pub(crate) percent: u16,
}

impl WidthRequest {
    pub(crate) fn new(min_size: u16, title_len: usize, percent: u16) -> Self {
        let title = u16::try_from(title_len).unwrap_or(u16::MAX).saturating_add(4);
        Self { base: min_size.max(title), percent }
    }
}

/// Computes column widths for a view `total` cells wide.
///
/// Fixed-width columns (percent 0) get their base width. Percent columns get
/// their share of what remains, never less than their base; any width still
/// unused is spread over the percent columns.
pub(crate) fn column_widths(requests: &[WidthRequest], total: u16) -> Vec<u16> {
    let fixed: u32 = requests.iter().filter(|r| r.percent == 0).map(|r| u32::from(r.base)).sum();
    let remaining = u32::from(total).saturating_sub(fixed);
    let mut widths: Vec<u16> = requests
        .iter()
        .map(|r| {
            if r.percent == 0 {
                r.base
            } else {
                let share = remaining * u32::from(r.percent) / 100;
                r.base.max(u16::try_from(share).unwrap_or(u16::MAX))
            }
        })
        .collect();

    let used: u32 = widths.iter().map(|w| u32::from(*w)).sum();
    let flexible: Vec<usize> = (0..requests.len()).filter(|i| requests[*i].percent > 0).collect();
    if let Some(count) = u32::try_from(flexible.len()).ok().filter(|n| *n > 0) {
        let leftover = u32::from(total).saturating_sub(used);
        let each = leftover / count;
        let extra = leftover % count;
        for (n, index) in flexible.into_iter().enumerate() {
            let bonus = each + u32::from((n as u32) < extra);
            widths[index] = widths[index].saturating_add(u16::try_from(bonus).unwrap_or(u16::MAX));
        }
    }
    widths
}

/// Inserts pinned items into a flowing order.
///
/// Start-pinned items land `offset` places from the front, end-pinned items
/// `offset` places from the back, both clamped to the list.
pub(crate) fn place_fixed<K: Copy>(mut flowing: Vec<K>, mut fixed: Vec<(K, FixedPosition)>) -> Vec<K> {
    fixed.sort_by_key(|(_, pos)| (pos.at_end, pos.offset));
    for (key, pos) in fixed {
        let len = flowing.len();
        let index = if pos.at_end { len - pos.offset.min(len) } else { pos.offset.min(len) };
        flowing.insert(index, key);
    }
    flowing
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_columns_keep_base_width() {
        let requests = [WidthRequest::new(8, 3, 0), WidthRequest::new(0, 4, 0)];
        assert_eq!(column_widths(&requests, 100), vec![8, 8]);
    }

    #[test]
    fn test_percent_columns_share_remaining_width() {
        let requests = [WidthRequest::new(10, 2, 0), WidthRequest::new(0, 2, 50), WidthRequest::new(0, 2, 50)];
        let widths = column_widths(&requests, 50);
        assert_eq!(widths, vec![10, 20, 20]);
    }

    #[test]
    fn test_leftover_goes_to_percent_columns() {
        let requests = [WidthRequest::new(0, 1, 0), WidthRequest::new(0, 1, 10), WidthRequest::new(0, 1, 10)];
        let widths = column_widths(&requests, 20);
        assert_eq!(widths.iter().map(|w| u32::from(*w)).sum::<u32>(), 20);
        assert_eq!(widths[0], 5);
        assert!(widths[1] >= 5 && widths[2] >= 5);
    }

    #[test]
    fn test_min_size_floor_wins_over_percent() {
        let requests = [WidthRequest::new(30, 1, 10)];
        assert_eq!(column_widths(&requests, 20), vec![30]);
    }

    #[test]
    fn test_place_fixed() {
        let placed = place_fixed(
            vec!['a', 'b', 'c'],
            vec![('x', FixedPosition::end(0)), ('y', FixedPosition::end(1)), ('s', FixedPosition::start(0))],
        );
        assert_eq!(placed, vec!['s', 'a', 'b', 'c', 'y', 'x']);
    }

    #[test]
    fn test_auto_size_apply() {
        let mut rect = Rect::new(2, 1, 10, 10);
        let auto = AutoSize { offset_h: 3, ..AutoSize::full() };
        assert!(auto.apply(&mut rect, (100, 40)));
        assert_eq!(rect, Rect::new(2, 1, 98, 36));
        assert!(!auto.apply(&mut rect, (100, 40)));
    }

    proptest! {
        #[test]
        fn prop_widths_never_below_base(bases in proptest::collection::vec((0u16..40, 0u16..60), 1..8), total in 0u16..300) {
            let requests: Vec<WidthRequest> = bases.iter().map(|(b, p)| WidthRequest { base: *b, percent: *p }).collect();
            let widths = column_widths(&requests, total);
            for (w, r) in widths.iter().zip(&requests) {
                prop_assert!(*w >= r.base);
            }
        }
    }
}
