//! Classifies category names as fixed (recurring) or variable spending.

/// Canonical category names treated as recurring fixed costs.
///
/// A category is fixed when it contains, or is contained by, one of these
/// names. Matching in both directions lets abbreviated labels like
/// "サブスク" and longer ones like "住宅ローン返済" land in the same
/// bucket without a mapping table.
pub const FIXED_CATEGORIES: [&str; 6] = [
    "家賃",
    "水道光熱費",
    "通信費",
    "保険料",
    "サブスク",
    "ローン返済",
];

/// Whether `category` names a recurring fixed cost rather than
/// discretionary spending.
pub fn is_fixed_category(category: &str) -> bool {
    FIXED_CATEGORIES
        .iter()
        .any(|fixed| category.contains(fixed) || fixed.contains(category))
}
