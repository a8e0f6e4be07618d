//! Fill-level arithmetic for pantry items.
//!
//! A fill level of 1.0 is one unopened package; 2.5 is two unopened packages
//! plus a half-used one. Both functions are pure and never consult the
//! database.

use crate::structs::{StockItem, StockItemRow};

pub fn is_low_stock(fill_level: f64, threshold: f64) -> bool {
    fill_level <= threshold
}

/// Renders a fill level as a human-readable phrase, e.g. "2 whole, 1 half".
///
/// Negative input is rejected at the form boundary and is not handled here.
pub fn fill_status(fill_level: f64) -> String {
    let whole = fill_level.floor() as i64;
    let remainder = fill_level - whole as f64;

    let whole_text = if whole > 0 {
        format!("{} whole", whole)
    } else {
        String::new()
    };

    if remainder == 0.0 {
        if whole == 0 {
            return "Empty/consumed".to_owned();
        }
        return whole_text;
    }

    let remainder_text = if remainder > 0.75 {
        "1 nearly full"
    } else if remainder > 0.5 {
        "1 more than half"
    } else if remainder == 0.5 {
        "1 half"
    } else if remainder > 0.25 {
        "1 less than half"
    } else {
        "1 running low (less than 1/4)"
    };

    if whole > 0 {
        format!("{}, {}", whole_text, remainder_text)
    } else {
        remainder_text.to_owned()
    }
}

impl StockItem {
    pub fn is_low_stock(&self) -> bool {
        is_low_stock(self.fill_level, self.low_stock_threshold)
    }

    pub fn status_text(&self) -> String {
        fill_status(self.fill_level)
    }
}

impl StockItemRow {
    pub fn is_low_stock(&self) -> bool {
        is_low_stock(self.fill_level, self.low_stock_threshold)
    }

    pub fn status_text(&self) -> String {
        fill_status(self.fill_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_stock_at_or_below_threshold() {
        assert!(is_low_stock(0.0, 0.25));
        assert!(is_low_stock(0.25, 0.25));
        assert!(!is_low_stock(0.26, 0.25));
        assert!(!is_low_stock(3.0, 1.0));
        assert!(is_low_stock(1.0, 1.0));
    }

    #[test]
    fn empty_package() {
        assert_eq!(fill_status(0.0), "Empty/consumed");
    }

    #[test]
    fn whole_packages_only() {
        assert_eq!(fill_status(1.0), "1 whole");
        assert_eq!(fill_status(2.0), "2 whole");
        assert_eq!(fill_status(7.0), "7 whole");
    }

    #[test]
    fn half_package() {
        assert_eq!(fill_status(0.5), "1 half");
        assert_eq!(fill_status(2.5), "2 whole, 1 half");
    }

    #[test]
    fn nearly_full_remainder() {
        assert_eq!(fill_status(0.9), "1 nearly full");
        assert_eq!(fill_status(2.9), "2 whole, 1 nearly full");
        assert_eq!(fill_status(0.76), "1 nearly full");
    }

    #[test]
    fn more_than_half_remainder() {
        assert_eq!(fill_status(0.75), "1 more than half");
        assert_eq!(fill_status(0.6), "1 more than half");
        assert_eq!(fill_status(1.6), "1 whole, 1 more than half");
    }

    #[test]
    fn less_than_half_remainder() {
        assert_eq!(fill_status(0.3), "1 less than half");
        assert_eq!(fill_status(3.3), "3 whole, 1 less than half");
    }

    #[test]
    fn running_low_remainder() {
        assert_eq!(fill_status(0.2), "1 running low (less than 1/4)");
        assert_eq!(fill_status(0.25), "1 running low (less than 1/4)");
        assert_eq!(fill_status(1.1), "1 whole, 1 running low (less than 1/4)");
    }

    #[test]
    fn renderer_is_deterministic() {
        assert_eq!(fill_status(1.4), fill_status(1.4));
    }

    #[test]
    fn item_methods_delegate() {
        let item = StockItem {
            id: 1,
            name: "Flour".to_owned(),
            fill_level: 0.2,
            low_stock_threshold: 0.25,
            package_note: None,
            category_id: 1,
            user_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(item.is_low_stock());
        assert_eq!(item.status_text(), "1 running low (less than 1/4)");
    }
}
