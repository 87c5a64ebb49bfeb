//! Food-text calorie estimation
//!
//! Turns a free-text meal description ("米饭150g 炸鸡", "2 eggs and toast")
//! into a bounded calorie range. Matching is alias-substring based against
//! the static food table; each matched food gets its own quantity scan in a
//! small window around the match, and per-food ranges sum into the meal
//! total. A meal is a sum of foods, so composition is additive.

use serde::Serialize;

use super::range::{bounded_range, range_from_bounds, CalorieRange};
use super::table::{Density, FoodCategory, FoodEntry, FoodTable};
use super::units;

/// Characters of context scanned on each side of a matched alias.
/// Keeping the window small stops one food's quantity from bleeding into
/// a neighbour's estimate.
const QUANTITY_WINDOW_CHARS: usize = 18;

/// Uncertainty tiers by quantity specificity
const U_EXPLICIT_KCAL: f64 = 0.05;
const U_EXPLICIT_MEASURE: f64 = 0.08;
const U_COUNT: f64 = 0.12;
const U_COUNT_VOLUMETRIC: f64 = 0.22;
const U_DEFAULT_EACH: f64 = 0.20;
const U_DEFAULT: f64 = 0.25;
const U_DEFAULT_VOLUMETRIC: f64 = 0.28;
const U_BARE_NUMBER: f64 = 0.35;

/// Aggregate uncertainty band when several foods sum
const U_AGGREGATE_MIN: f64 = 0.10;
const U_AGGREGATE_MAX: f64 = 0.45;

/// Calorie-unit tokens accepted after a number, longest first
const KCAL_TOKENS: &[&str] = &[
    "kcals", "kcal", "calories", "calorie", "cals", "cal", "卡路里", "大卡", "千卡", "卡",
];
const GRAM_TOKENS: &[&str] = &["grams", "gram", "克", "g"];
const ML_TOKENS: &[&str] = &["毫升", "ml"];

/// Small number words accepted before a count unit
const NUMBER_WORDS: &[(&str, f64)] = &[
    ("half", 0.5),
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("半", 0.5),
    ("两", 2.0),
    ("一", 1.0),
    ("二", 2.0),
    ("三", 3.0),
    ("四", 4.0),
    ("五", 5.0),
    ("六", 6.0),
    ("七", 7.0),
    ("八", 8.0),
    ("九", 9.0),
    ("十", 10.0),
];

/// How a quantity was determined for a matched food
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QuantityMatch {
    /// The text states the calories outright
    ExplicitKcal(f64),
    /// An explicit gram weight
    ExplicitGrams(f64),
    /// An explicit milliliter volume
    ExplicitMl(f64),
    /// A count paired with a unit word ("2 bowls", "三个")
    CountWithUnit { count: f64, unit: String },
    /// Nothing found; the food's configured default portion applies
    DefaultPortion,
}

/// One food recognized in the text, with its contribution
#[derive(Debug, Clone, Serialize)]
pub struct MatchedFood {
    pub name: String,
    pub quantity: QuantityMatch,
    pub range: CalorieRange,
    pub category: FoodCategory,
}

/// A successful food-text estimate
#[derive(Debug, Clone, Serialize)]
pub struct FoodEstimate {
    pub range: CalorieRange,
    pub matches: Vec<MatchedFood>,
    /// Human-readable account of what was recognized
    pub explanation: String,
    /// Which foods would most benefit from an explicit weight/volume
    pub followups: Vec<String>,
}

/// Estimate calories for a free-text food description
///
/// Returns `None` when the text carries no usable signal (no stated
/// calories, no known food, no bare number) - that is a normal outcome for
/// normal input, not an error.
pub fn estimate_food_text(table: &FoodTable, text: &str) -> Option<FoodEstimate> {
    let lower = text.to_lowercase();
    if lower.trim().is_empty() {
        return None;
    }

    // The user already did the estimation; never second-guess a stated value.
    if let Some(kcal) = number_followed_by(&lower, KCAL_TOKENS) {
        let range = bounded_range(kcal, U_EXPLICIT_KCAL);
        return Some(FoodEstimate {
            range,
            matches: Vec::new(),
            explanation: format!("direct calorie entry: {} kcal", range.mid),
            followups: Vec::new(),
        });
    }

    let hits = find_alias_hits(table, &lower);
    if hits.is_empty() {
        return estimate_from_bare_number(&lower);
    }

    let mut matches = Vec::with_capacity(hits.len());
    for hit in &hits {
        let entry = &table.entries()[hit.entry_idx];
        let (window, alias_rel_start) = blanked_window(&lower, hit.start, hit.end);
        let mut quantity = extract_quantity(&window);

        // A counted food with a bare number right before its name
        // ("2 eggs", "两鸡蛋") is a count, not a default portion.
        if quantity == QuantityMatch::DefaultPortion {
            if let Density::PerEach(_) = entry.density {
                if let Some(count) = number_ending_at(&window, alias_rel_start) {
                    quantity = QuantityMatch::CountWithUnit {
                        count,
                        unit: entry.default_unit.clone(),
                    };
                }
            }
        }

        let (mid, uncertainty) = convert_quantity(entry, &quantity, &window);
        matches.push(MatchedFood {
            name: entry.name.clone(),
            range: bounded_range(mid, uncertainty),
            quantity,
            category: entry.category,
        });
    }

    let range = aggregate_ranges(&matches);
    let explanation = build_explanation(table, &hits, &matches);
    let followups = build_followups(&matches);

    Some(FoodEstimate {
        range,
        matches,
        explanation,
        followups,
    })
}

// ============================================================================
// Alias matching
// ============================================================================

struct AliasHit {
    entry_idx: usize,
    start: usize,
    end: usize,
}

/// Find one alias hit per food, suppressing overlaps
///
/// When two matched aliases overlap in the text (e.g. 蛋 inside 蛋糕), the
/// longer alias wins - the shorter one is an artifact of substring matching,
/// not a second food.
fn find_alias_hits(table: &FoodTable, lower: &str) -> Vec<AliasHit> {
    let mut hits: Vec<AliasHit> = Vec::new();
    for (entry_idx, entry) in table.entries().iter().enumerate() {
        let mut best: Option<(usize, usize)> = None;
        for alias in &entry.aliases {
            if let Some((start, end)) = find_with_boundaries(lower, alias) {
                let longer = best.map(|(s, e)| end - start > e - s).unwrap_or(true);
                if longer {
                    best = Some((start, end));
                }
            }
        }
        if let Some((start, end)) = best {
            hits.push(AliasHit {
                entry_idx,
                start,
                end,
            });
        }
    }

    hits.sort_by_key(|h| std::cmp::Reverse(h.end - h.start));
    let mut kept: Vec<AliasHit> = Vec::new();
    for hit in hits {
        let disjoint = kept
            .iter()
            .all(|k| hit.end <= k.start || hit.start >= k.end);
        if disjoint {
            kept.push(hit);
        }
    }
    kept.sort_by_key(|h| h.start);
    kept
}

/// Find the first occurrence of `alias` in `s` that sits on word boundaries
///
/// Boundary checks only apply to ASCII aliases; CJK text has no word
/// separators to check against.
fn find_with_boundaries(s: &str, alias: &str) -> Option<(usize, usize)> {
    let ascii_alias = alias.bytes().all(|b| b.is_ascii());
    for (pos, m) in s.match_indices(alias) {
        let end = pos + m.len();
        if ascii_alias {
            let before_ok = s[..pos]
                .chars()
                .next_back()
                .map(|c| !c.is_ascii_alphabetic())
                .unwrap_or(true);
            let after_ok = s[end..]
                .chars()
                .next()
                .map(|c| !c.is_ascii_alphabetic())
                .unwrap_or(true);
            if !(before_ok && after_ok) {
                continue;
            }
        }
        return Some((pos, end));
    }
    None
}

/// Extract the scan window around a match, with the alias itself blanked out
///
/// Blanking stops the alias from feeding the method-keyword scan: 炸鸡
/// already prices in the frying, it must not also collect the 炸 multiplier.
/// Returns the window plus the alias start offset within it.
fn blanked_window(lower: &str, start: usize, end: usize) -> (String, usize) {
    let w_start = step_chars_back(lower, start, QUANTITY_WINDOW_CHARS);
    let w_end = step_chars_forward(lower, end, QUANTITY_WINDOW_CHARS);

    let mut bytes = lower.as_bytes()[w_start..w_end].to_vec();
    for b in &mut bytes[(start - w_start)..(end - w_start)] {
        *b = b' ';
    }
    (
        String::from_utf8_lossy(&bytes).into_owned(),
        start - w_start,
    )
}

fn step_chars_back(s: &str, mut idx: usize, chars: usize) -> usize {
    for _ in 0..chars {
        if idx == 0 {
            break;
        }
        idx -= 1;
        while idx > 0 && !s.is_char_boundary(idx) {
            idx -= 1;
        }
    }
    idx
}

fn step_chars_forward(s: &str, mut idx: usize, chars: usize) -> usize {
    for _ in 0..chars {
        if idx >= s.len() {
            break;
        }
        idx += 1;
        while idx < s.len() && !s.is_char_boundary(idx) {
            idx += 1;
        }
    }
    idx
}

// ============================================================================
// Quantity extraction
// ============================================================================

/// Scan a window for a quantity, most specific source first
fn extract_quantity(window: &str) -> QuantityMatch {
    if let Some(kcal) = number_followed_by(window, KCAL_TOKENS) {
        return QuantityMatch::ExplicitKcal(kcal);
    }
    if let Some(grams) = number_followed_by(window, GRAM_TOKENS) {
        return QuantityMatch::ExplicitGrams(grams);
    }
    if let Some(ml) = number_followed_by(window, ML_TOKENS) {
        return QuantityMatch::ExplicitMl(ml);
    }
    if let Some((count, unit)) = find_count_with_unit(window) {
        return QuantityMatch::CountWithUnit { count, unit };
    }
    QuantityMatch::DefaultPortion
}

/// Find a number (numeral or digit run) immediately followed by one of the
/// given unit tokens, allowing whitespace in between
fn number_followed_by(s: &str, tokens: &[&str]) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        // consume the digit run (one optional decimal point)
        let start = i;
        let mut seen_dot = false;
        while i < bytes.len()
            && (bytes[i].is_ascii_digit() || (bytes[i] == b'.' && !seen_dot))
        {
            if bytes[i] == b'.' {
                seen_dot = true;
            }
            i += 1;
        }
        let number: Option<f64> = s[start..i].trim_end_matches('.').parse().ok();

        let mut rest = i;
        while rest < bytes.len() && bytes[rest] == b' ' {
            rest += 1;
        }
        if let Some(n) = number {
            for token in tokens {
                if s[rest..].starts_with(token) && token_boundary_ok(s, rest + token.len(), token) {
                    if n.is_finite() {
                        return Some(n);
                    }
                }
            }
        }
    }
    None
}

/// An ASCII unit token must not continue into a longer word ("g" in "grilled")
fn token_boundary_ok(s: &str, end: usize, token: &str) -> bool {
    if !token.bytes().all(|b| b.is_ascii()) {
        return true;
    }
    s[end..]
        .chars()
        .next()
        .map(|c| !c.is_ascii_alphabetic())
        .unwrap_or(true)
}

/// Find a count paired with a unit word ("2 bowls", "三个", "半碗")
fn find_count_with_unit(window: &str) -> Option<(f64, String)> {
    for unit in units::count_unit_words() {
        for (pos, m) in window.match_indices(unit) {
            let end = pos + m.len();
            if unit.bytes().all(|b| b.is_ascii()) {
                let before_ok = window[..pos]
                    .chars()
                    .next_back()
                    .map(|c| !c.is_ascii_alphabetic())
                    .unwrap_or(true);
                let after_ok = window[end..]
                    .chars()
                    .next()
                    .map(|c| !c.is_ascii_alphabetic())
                    .unwrap_or(true);
                if !(before_ok && after_ok) {
                    continue;
                }
            }
            if let Some(count) = number_ending_at(window, pos) {
                return Some((count, unit.to_string()));
            }
        }
    }
    None
}

/// Parse the number (digit run or number word) ending just before `end`
fn number_ending_at(s: &str, end: usize) -> Option<f64> {
    let prefix = s[..end].trim_end();

    // Digit run, e.g. "2" or "1.5". A run continuing a time or date
    // ("8:00", "01-05") is not a quantity.
    let bytes = prefix.as_bytes();
    let mut i = prefix.len();
    while i > 0 && (bytes[i - 1].is_ascii_digit() || bytes[i - 1] == b'.') {
        i -= 1;
    }
    let continues_timestamp = i > 0 && matches!(bytes[i - 1], b':' | b'-' | b'/');
    if i < prefix.len() && !continues_timestamp {
        if let Ok(n) = prefix[i..].trim_matches('.').parse::<f64>() {
            if n.is_finite() && n > 0.0 {
                return Some(n);
            }
        }
    }

    // Number word, e.g. "two" or "三" or "半"
    for (word, value) in NUMBER_WORDS {
        if prefix.ends_with(word) {
            if word.bytes().all(|b| b.is_ascii()) {
                let word_start = prefix.len() - word.len();
                let before_ok = prefix[..word_start]
                    .chars()
                    .next_back()
                    .map(|c| !c.is_ascii_alphabetic())
                    .unwrap_or(true);
                if !before_ok {
                    continue;
                }
            }
            return Some(*value);
        }
    }
    None
}

// ============================================================================
// Quantity -> calories conversion
// ============================================================================

/// Convert a quantity match into a calorie midpoint and uncertainty tier
///
/// One exhaustive match over the quantity-specificity tags; cooking-method
/// multipliers apply to everything except a directly stated kcal value.
fn convert_quantity(entry: &FoodEntry, quantity: &QuantityMatch, window: &str) -> (f64, f64) {
    let (mid, uncertainty) = match quantity {
        QuantityMatch::ExplicitKcal(kcal) => return (*kcal, U_EXPLICIT_KCAL),
        QuantityMatch::ExplicitGrams(grams) => (mass_to_kcal(entry, *grams), U_EXPLICIT_MEASURE),
        QuantityMatch::ExplicitMl(ml) => (mass_to_kcal(entry, *ml), U_EXPLICIT_MEASURE),
        QuantityMatch::CountWithUnit { count, unit } => {
            let mid = match entry.density {
                Density::PerEach(kcal_each) => count * kcal_each,
                Density::Per100g(d) | Density::Per100Ml(d) => {
                    let per_unit = match units::unit_portion(unit) {
                        Some(portion) => portion.amount,
                        None => {
                            tracing::warn!(
                                "No weight for unit '{}'; using {}'s default portion",
                                unit,
                                entry.name
                            );
                            entry.default_portion
                        }
                    };
                    count * per_unit * d / 100.0
                }
            };
            let u = if units::is_volumetric(unit) {
                U_COUNT_VOLUMETRIC
            } else {
                U_COUNT
            };
            (mid, u)
        }
        QuantityMatch::DefaultPortion => {
            let base = match entry.density {
                Density::Per100g(d) | Density::Per100Ml(d) => entry.default_portion * d / 100.0,
                Density::PerEach(kcal_each) => entry.default_portion * kcal_each,
            };
            // Size qualifiers only scale defaults; a measured quantity
            // already says how much there was.
            let mid = base * portion_qualifier(window);
            let u = match entry.density {
                Density::PerEach(_) => U_DEFAULT_EACH,
                _ if units::is_volumetric(&entry.default_unit) => U_DEFAULT_VOLUMETRIC,
                _ => U_DEFAULT,
            };
            (mid, u)
        }
    };

    (mid * method_multiplier(window), uncertainty)
}

/// Grams (or ml, interchangeable here) to kilocalories for one entry
fn mass_to_kcal(entry: &FoodEntry, amount: f64) -> f64 {
    match entry.density {
        Density::Per100g(d) | Density::Per100Ml(d) => amount * d / 100.0,
        // A weight stated for a counted food: price it per nominal item
        Density::PerEach(kcal_each) => kcal_each * amount / entry.nominal_item_grams(),
    }
}

/// Combined cooking-method multiplier from keywords in the window
///
/// At most one factor per method family; families compose multiplicatively
/// ("奶油炸鸡块" is both fried and creamed).
fn method_multiplier(window: &str) -> f64 {
    let mut multiplier = 1.0;

    if contains_any(window, &["stir-fried", "stir fried", "炒"]) {
        multiplier *= 1.12;
    } else if contains_any(window, &["pan-fried", "pan fried", "煎"]) {
        multiplier *= 1.15;
    } else if contains_any(window, &["deep-fried", "deep fried", "fried", "炸"]) {
        multiplier *= 1.25;
    }

    if contains_any(window, &["红烧", "糖醋", "braised", "sweet and sour"]) {
        multiplier *= 1.10;
    }

    if contains_any(window, &["奶油", "芝士", "cream", "cheese"]) {
        multiplier *= 1.12;
    }

    multiplier
}

/// Portion-size qualifier for default portions
fn portion_qualifier(window: &str) -> f64 {
    if contains_any(window, &["大份", "大", "large", "big"]) {
        1.20
    } else if contains_any(window, &["小份", "小", "small"]) {
        0.85
    } else if contains_any(window, &["半", "half"]) {
        0.60
    } else {
        1.0
    }
}

fn contains_any(s: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| s.contains(n))
}

// ============================================================================
// Aggregation
// ============================================================================

/// Sum per-food ranges into the meal total
///
/// A single match keeps its own uncertainty tier; once foods sum, the
/// aggregate uncertainty is the combined range's relative half-width
/// clamped into [0.10, 0.45].
fn aggregate_ranges(matches: &[MatchedFood]) -> CalorieRange {
    if matches.len() == 1 {
        return matches[0].range;
    }

    let low: f64 = matches.iter().map(|m| f64::from(m.range.low)).sum();
    let high: f64 = matches.iter().map(|m| f64::from(m.range.high)).sum();
    range_from_bounds(low, high, U_AGGREGATE_MIN, U_AGGREGATE_MAX)
}

fn estimate_from_bare_number(lower: &str) -> Option<FoodEstimate> {
    let guess = first_number(lower)?;
    let range = bounded_range(guess, U_BARE_NUMBER);
    if range.mid == 0 {
        return None;
    }
    Some(FoodEstimate {
        range,
        matches: Vec::new(),
        explanation: format!(
            "no known foods matched; treated {} as a rough calorie guess",
            range.mid
        ),
        followups: vec!["name the foods or add an explicit kcal value to narrow this".to_string()],
    })
}

fn first_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            let mut seen_dot = false;
            while i < bytes.len()
                && (bytes[i].is_ascii_digit() || (bytes[i] == b'.' && !seen_dot))
            {
                if bytes[i] == b'.' {
                    seen_dot = true;
                }
                i += 1;
            }
            if let Ok(n) = s[start..i].trim_end_matches('.').parse::<f64>() {
                if n.is_finite() {
                    return Some(n);
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

fn build_explanation(table: &FoodTable, hits: &[AliasHit], matches: &[MatchedFood]) -> String {
    let parts: Vec<String> = hits
        .iter()
        .zip(matches)
        .map(|(hit, m)| {
            let entry = &table.entries()[hit.entry_idx];
            format!(
                "{}: {} = {} kcal ({}-{})",
                m.name,
                describe_quantity(&m.quantity, entry),
                m.range.mid,
                m.range.low,
                m.range.high
            )
        })
        .collect();
    parts.join("; ")
}

fn describe_quantity(quantity: &QuantityMatch, entry: &FoodEntry) -> String {
    match quantity {
        QuantityMatch::ExplicitKcal(kcal) => format!("{:.0} kcal stated", kcal),
        QuantityMatch::ExplicitGrams(grams) => format!("{:.0} g", grams),
        QuantityMatch::ExplicitMl(ml) => format!("{:.0} ml", ml),
        QuantityMatch::CountWithUnit { count, unit } => format!("{} {}", count, unit),
        QuantityMatch::DefaultPortion => format!(
            "default portion ({} {})",
            entry.default_portion, entry.default_unit
        ),
    }
}

/// Follow-up hints for foods that fell back to a default portion,
/// oils and sauces first - they are the usual blind spot.
fn build_followups(matches: &[MatchedFood]) -> Vec<String> {
    let mut defaulted: Vec<&MatchedFood> = matches
        .iter()
        .filter(|m| m.quantity == QuantityMatch::DefaultPortion)
        .collect();
    defaulted.sort_by_key(|m| m.category.followup_priority());
    defaulted
        .iter()
        .take(3)
        .map(|m| format!("add a weight or volume for {} to narrow the range", m.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::table::FoodTable;

    fn table() -> FoodTable {
        FoodTable::builtin()
    }

    #[test]
    fn test_direct_kcal_short_circuit_cjk() {
        let est = estimate_food_text(&table(), "炸鸡200kcal").unwrap();
        assert_eq!(est.range.mid, 200);
        assert_eq!(est.range.uncertainty, 0.05);
        assert!(est.matches.is_empty());
    }

    #[test]
    fn test_direct_kcal_short_circuit_english() {
        let est = estimate_food_text(&table(), "chicken 200 kcal").unwrap();
        assert_eq!(est.range.mid, 200);
        assert_eq!(est.range.uncertainty, 0.05);
    }

    #[test]
    fn test_direct_kcal_cjk_unit_word() {
        let est = estimate_food_text(&table(), "午饭大概350大卡").unwrap();
        assert_eq!(est.range.mid, 350);
        assert_eq!(est.range.uncertainty, 0.05);
    }

    #[test]
    fn test_explicit_grams() {
        // 150 g of rice at 130 kcal/100g
        let est = estimate_food_text(&table(), "米饭150g").unwrap();
        assert_eq!(est.range.mid, 195);
        assert!((est.range.uncertainty - 0.08).abs() < 1e-9);
        assert_eq!(est.matches.len(), 1);
        assert_eq!(est.matches[0].quantity, QuantityMatch::ExplicitGrams(150.0));
    }

    #[test]
    fn test_explicit_ml() {
        // 200 ml of milk at 64 kcal/100ml
        let est = estimate_food_text(&table(), "牛奶200ml").unwrap();
        assert_eq!(est.range.mid, 128);
        assert_eq!(est.matches[0].quantity, QuantityMatch::ExplicitMl(200.0));
    }

    #[test]
    fn test_grams_not_confused_with_kg_or_words() {
        // "eggs" must not read as a gram token
        let est = estimate_food_text(&table(), "2个鸡蛋").unwrap();
        assert_eq!(
            est.matches[0].quantity,
            QuantityMatch::CountWithUnit {
                count: 2.0,
                unit: "个".to_string()
            }
        );
        assert_eq!(est.range.mid, 150);
    }

    #[test]
    fn test_count_with_number_word() {
        let est = estimate_food_text(&table(), "三个鸡蛋").unwrap();
        assert_eq!(est.range.mid, 225);
    }

    #[test]
    fn test_half_bowl_is_a_count() {
        // 半碗米饭: 0.5 bowl x 300 g x 1.30 = 195
        let est = estimate_food_text(&table(), "半碗米饭").unwrap();
        assert_eq!(est.range.mid, 195);
        assert!((est.range.uncertainty - 0.22).abs() < 1e-9);
    }

    #[test]
    fn test_english_count_with_unit() {
        let est = estimate_food_text(&table(), "two bowls of rice").unwrap();
        // 2 x 300 g x 1.30
        assert_eq!(est.range.mid, 780);
    }

    #[test]
    fn test_count_before_counted_food_name() {
        // "2 eggs": the number binds to the counted food itself
        let est = estimate_food_text(&table(), "2 eggs and toast").unwrap();
        assert_eq!(est.matches.len(), 2);
        let egg = est.matches.iter().find(|m| m.name == "egg").unwrap();
        assert_eq!(egg.range.mid, 150);
        assert_eq!(
            egg.quantity,
            QuantityMatch::CountWithUnit {
                count: 2.0,
                unit: "个".to_string()
            }
        );
    }

    #[test]
    fn test_time_prefix_is_not_a_count() {
        // "8:00" must not read as 0 (or 800) of anything
        let est = estimate_food_text(&table(), "8:00 eggs").unwrap();
        let egg = est.matches.iter().find(|m| m.name == "egg").unwrap();
        assert_eq!(egg.quantity, QuantityMatch::DefaultPortion);
        assert_eq!(egg.range.mid, 75);
    }

    #[test]
    fn test_default_portions_sum_additively() {
        let combined = estimate_food_text(&table(), "米饭 鸡胸").unwrap();
        let rice = estimate_food_text(&table(), "米饭").unwrap();
        let chicken = estimate_food_text(&table(), "鸡胸").unwrap();

        assert_eq!(combined.matches.len(), 2);
        assert_eq!(combined.range.low, rice.range.low + chicken.range.low);
        assert_eq!(combined.range.high, rice.range.high + chicken.range.high);
        let mid = (f64::from(combined.range.low) + f64::from(combined.range.high)) / 2.0;
        assert!((f64::from(combined.range.mid) - mid.round()).abs() <= 1.0);
    }

    #[test]
    fn test_aggregate_uncertainty_clamped() {
        let est = estimate_food_text(&table(), "米饭 鸡胸 牛奶").unwrap();
        assert!(est.range.uncertainty >= 0.10);
        assert!(est.range.uncertainty <= 0.45);
    }

    #[test]
    fn test_method_multiplier_pan_fried() {
        // 煎鸡胸: 150 g default x 1.65 x 1.15
        let est = estimate_food_text(&table(), "煎鸡胸").unwrap();
        assert_eq!(est.range.mid, (150.0 * 1.65f64 * 1.15).round() as u32);
    }

    #[test]
    fn test_fried_alias_does_not_double_count_method() {
        // 炸鸡's own alias contains 炸; the multiplier must come only from
        // context outside the alias.
        let est = estimate_food_text(&table(), "炸鸡").unwrap();
        assert_eq!(est.range.mid, (150.0 * 2.90f64).round() as u32);
    }

    #[test]
    fn test_method_families_compose() {
        // cheese + pan-fried compose; 150 x 1.65 x 1.15 x 1.12
        let est = estimate_food_text(&table(), "芝士煎鸡胸").unwrap();
        assert_eq!(
            est.range.mid,
            (150.0 * 1.65f64 * 1.15 * 1.12).round() as u32
        );
    }

    #[test]
    fn test_soy_sauce_is_not_oil() {
        // 酱油 must resolve to the sauce entry, not sauce + oil
        let est = estimate_food_text(&table(), "酱油").unwrap();
        assert_eq!(est.matches.len(), 1);
        assert_eq!(est.matches[0].name, "sauce");
    }

    #[test]
    fn test_size_qualifier_scales_default_only() {
        let large = estimate_food_text(&table(), "大份鸡胸").unwrap();
        assert_eq!(large.range.mid, (150.0 * 1.65f64 * 1.20).round() as u32);

        // Explicit grams ignore the qualifier
        let measured = estimate_food_text(&table(), "大份鸡胸200g").unwrap();
        assert_eq!(measured.range.mid, (200.0 * 1.65f64).round() as u32);
    }

    #[test]
    fn test_bare_half_qualifier() {
        let est = estimate_food_text(&table(), "鸡胸 half").unwrap();
        assert_eq!(est.range.mid, (150.0 * 1.65f64 * 0.60).round() as u32);
    }

    #[test]
    fn test_overlapping_aliases_keep_longer() {
        // 蛋糕 is cake, not egg + cake
        let est = estimate_food_text(&table(), "蛋糕").unwrap();
        assert_eq!(est.matches.len(), 1);
        assert_eq!(est.matches[0].name, "cake");
    }

    #[test]
    fn test_instant_noodles_not_also_noodles() {
        let est = estimate_food_text(&table(), "方便面").unwrap();
        assert_eq!(est.matches.len(), 1);
        assert_eq!(est.matches[0].name, "instant noodles");
    }

    #[test]
    fn test_ascii_alias_word_boundary() {
        // "price" must not match "rice"
        assert!(estimate_food_text(&table(), "the price was high").is_none());
    }

    #[test]
    fn test_bare_number_fallback() {
        let est = estimate_food_text(&table(), "随便吃了点 350").unwrap();
        assert_eq!(est.range.mid, 350);
        assert!((est.range.uncertainty - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_no_signal_returns_none() {
        assert!(estimate_food_text(&table(), "").is_none());
        assert!(estimate_food_text(&table(), "just a walk outside").is_none());
    }

    #[test]
    fn test_followups_flag_oils_first() {
        let est = estimate_food_text(&table(), "米饭 油 鸡胸").unwrap();
        assert!(!est.followups.is_empty());
        assert!(est.followups[0].contains("cooking oil"));
    }

    #[test]
    fn test_explanation_lists_matches() {
        let est = estimate_food_text(&table(), "米饭150g").unwrap();
        assert!(est.explanation.contains("rice"));
        assert!(est.explanation.contains("150 g"));
    }
}
