//! Heuristic auto-categorization
//!
//! Assigns a category to an imported transaction from its description. The
//! layers run in a fixed order and the first hit wins:
//!
//! 1. keyword table (substrings per category, in category-set order)
//! 2. broader regex patterns per category
//! 3. merchant-name table (whole-word merchant tokens)
//! 4. structural cleanup of processor prefixes and trailing noise, then
//!    layers 1-3 again on the cleaned token, then coarse merchant families
//! 5. fuzzy family words ("groceries", "dining", ...)
//! 6. `Other Income` / `Other Expense`
//!
//! Every layer only proposes categories that exist in the caller's set for
//! the transaction type, so the result is stable for a given input and set.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::category::{fallback_category, reserved_type};
use crate::models::{CategorySet, TransactionType};

/// Which layer produced a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Supplied,
    Keyword,
    Pattern,
    Merchant,
    Structural,
    Family,
    Fallback,
}

const KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Salary",
        &["payroll", "salary", "paycheck", "direct dep", "wages", "pay stub"],
    ),
    (
        "Freelance",
        &["freelance", "invoice", "upwork", "fiverr", "consulting", "contract work"],
    ),
    (
        "Investment",
        &[
            "dividend",
            "interest paid",
            "capital gain",
            "brokerage",
            "vanguard",
            "fidelity",
            "schwab",
            "robinhood",
        ],
    ),
    (
        "Other Income",
        &["refund", "cashback", "cash back", "reimbursement", "rebate"],
    ),
    (
        "Savings Withdrawal",
        &["transfer from savings", "savings withdrawal", "from savings"],
    ),
    (
        "Dining Out",
        &[
            "restaurant",
            "cafe",
            "coffee",
            "starbucks",
            "mcdonald",
            "burger",
            "pizza",
            "grill",
            "diner",
            "bistro",
            "taco",
            "sushi",
            "doordash",
            "grubhub",
            "uber eats",
            "chipotle",
        ],
    ),
    (
        "Entertainment",
        &[
            "netflix",
            "spotify",
            "hulu",
            "disney+",
            "cinema",
            "movie",
            "theater",
            "theatre",
            "concert",
            "ticketmaster",
            "playstation",
            "xbox",
        ],
    ),
    (
        "Groceries",
        &[
            "grocery",
            "supermarket",
            "whole foods",
            "trader joe",
            "safeway",
            "kroger",
            "aldi",
            "publix",
            "wegmans",
            "costco",
            "farmers market",
        ],
    ),
    (
        "Healthcare",
        &[
            "pharmacy",
            "walgreens",
            "cvs",
            "doctor",
            "dental",
            "dentist",
            "clinic",
            "hospital",
            "medical",
            "optometr",
        ],
    ),
    (
        "Rent/Mortgage",
        &["mortgage", "landlord", "rent payment", "property mgmt", "apartment"],
    ),
    (
        "Savings Deposit",
        &["transfer to savings", "savings deposit", "to savings"],
    ),
    (
        "Shopping",
        &[
            "amazon", "amzn", "walmart", "target", "best buy", "ebay", "etsy", "ikea", "home depot",
        ],
    ),
    (
        "Transport",
        &[
            "uber", "lyft", "taxi", "shell", "chevron", "exxon", "gas station", "fuel", "parking",
            "transit", "metro", "subway", "toll", "airline",
        ],
    ),
    (
        "Utilities",
        &[
            "electric",
            "water bill",
            "utility",
            "utilities",
            "internet",
            "comcast",
            "xfinity",
            "verizon",
            "at&t",
            "t-mobile",
            "gas bill",
            "phone bill",
        ],
    ),
];

const PATTERNS: &[(&str, &str)] = &[
    ("Salary", r"\bdirect\s+dep(osit)?\b|\bpay(roll)?\s*(run|cheque|check)\b"),
    ("Freelance", r"\b(client|project|gig|commission)s?\b"),
    ("Investment", r"\b(div(idend)?s?|stocks?|etfs?|crypto|int\s+pd)\b"),
    ("Other Income", r"\b(returns?|credit\s+adj\w*)\b"),
    (
        "Dining Out",
        r"\b(bar|pub|kitchen|eatery|cantina|bbq|wings?|noodles?|ramen|pho|bakery|deli)\b",
    ),
    (
        "Entertainment",
        r"\b(games?|gaming|cinemas?|arcade|bowling|museum|zoo|tickets?)\b",
    ),
    ("Groceries", r"\b(grocer\w*|produce|fresh\s+market|food\s+mart)\b"),
    (
        "Healthcare",
        r"\b(rx|urgent\s+care|labs?|physio\w*|ortho\w*|pediatr\w*)\b",
    ),
    ("Rent/Mortgage", r"\brent\b|\blease\b"),
    ("Shopping", r"\b(store|shop|outlet|boutique|retail)\b"),
    (
        "Transport",
        r"\b(gas|petrol|car\s+wash|rideshare|train|bus|airport|auto\s+repair)\b",
    ),
    (
        "Utilities",
        r"\b(power|energy|telecom|wireless|broadband|sewer|trash|waste)\b",
    ),
];

const MERCHANTS: &[(&str, &str)] = &[
    ("gusto", "Salary"),
    ("adp", "Salary"),
    ("paychex", "Salary"),
    ("stripe", "Freelance"),
    ("coinbase", "Investment"),
    ("whataburger", "Dining Out"),
    ("chick fil a", "Dining Out"),
    ("wendys", "Dining Out"),
    ("dunkin", "Dining Out"),
    ("panera", "Dining Out"),
    ("kfc", "Dining Out"),
    ("shake shack", "Dining Out"),
    ("heb", "Groceries"),
    ("h e b", "Groceries"),
    ("sprouts", "Groceries"),
    ("food lion", "Groceries"),
    ("meijer", "Groceries"),
    ("bp", "Transport"),
    ("sunoco", "Transport"),
    ("valero", "Transport"),
    ("wawa", "Transport"),
    ("amtrak", "Transport"),
    ("delta air", "Transport"),
    ("spectrum", "Utilities"),
    ("duke energy", "Utilities"),
    ("nordstrom", "Shopping"),
    ("macys", "Shopping"),
    ("tj maxx", "Shopping"),
    ("rite aid", "Healthcare"),
    ("kaiser", "Healthcare"),
    ("amc", "Entertainment"),
    ("regal", "Entertainment"),
    ("hbo", "Entertainment"),
];

const PROCESSOR_PREFIXES: &[&str] = &[
    "sq *",
    "sq*",
    "tst*",
    "tst *",
    "pos debit ",
    "pos ",
    "debit card purchase ",
    "checkcard ",
    "purchase ",
    "ach ",
    "paypal *",
    "pp*",
];

const NOISE: &[&str] = &[
    // phone numbers
    r"\(?\d{3}\)?[-. ]\d{3}[-. ]\d{4}",
    // state code followed by MM/DD
    r"\b[a-z]{2}\s+\d{1,2}/\d{1,2}(/\d{2,4})?\b",
    // bare dates
    r"\b\d{1,2}/\d{1,2}(/\d{2,4})?\b",
    // masked card numbers
    r"(x{2,}|\*{2,})\d{4}",
    // store numbers
    r"#?\b\d{3,}\b",
];

const FOOD_FAMILY: &[&str] = &["food", "eat", "eats", "chicken", "burrito", "donut", "bagel"];
const FUEL_FAMILY: &[&str] = &["fuel", "oil", "petro", "station", "gasoline"];
const RETAIL_FAMILY: &[&str] = &["mart", "market", "outlet", "depot", "warehouse", "supply"];

const FAMILIES: &[(&str, &str)] = &[
    ("dining", "Dining Out"),
    ("restaurant", "Dining Out"),
    ("transport", "Transport"),
    ("transportation", "Transport"),
    ("travel", "Transport"),
    ("utilities", "Utilities"),
    ("utility", "Utilities"),
    ("groceries", "Groceries"),
    ("grocery", "Groceries"),
    ("entertainment", "Entertainment"),
    ("shopping", "Shopping"),
    ("healthcare", "Healthcare"),
    ("medical", "Healthcare"),
    ("housing", "Rent/Mortgage"),
    ("salary", "Salary"),
    ("freelance", "Freelance"),
    ("investment", "Investment"),
];

fn compile(patterns: impl Iterator<Item = &'static str>) -> Vec<Regex> {
    patterns
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                log::error!("skipping invalid categorization pattern {:?}: {}", p, e);
                None
            }
        })
        .collect()
}

fn category_patterns() -> &'static [(&'static str, Regex)] {
    static RE: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RE.get_or_init(|| {
        PATTERNS
            .iter()
            .filter_map(|(category, pattern)| {
                compile(std::iter::once(*pattern))
                    .pop()
                    .map(|re| (*category, re))
            })
            .collect()
    })
}

fn noise_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| compile(NOISE.iter().copied()))
}

fn whitespace() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| compile(std::iter::once(r"\s+")))
}

/// Pick a category for one transaction
///
/// `supplied` (e.g. a category column in the CSV) wins when it names a
/// category that exists for `kind`.
pub fn categorize(
    description: &str,
    kind: TransactionType,
    supplied: Option<&str>,
    categories: &CategorySet,
) -> String {
    categorize_explained(description, kind, supplied, categories).0
}

/// Like [`categorize`], also reporting which layer decided
pub fn categorize_explained(
    description: &str,
    kind: TransactionType,
    supplied: Option<&str>,
    categories: &CategorySet,
) -> (String, MatchSource) {
    if let Some(name) = supplied.map(str::trim).filter(|s| !s.is_empty()) {
        if categories.allows(kind, name) {
            return (name.to_string(), MatchSource::Supplied);
        }
        log::debug!("supplied category {:?} is not a {} category", name, kind);
    }

    let text = description.trim().to_lowercase();
    let valid = |c: &str| categories.allows(kind, c);

    let result = match_layers(&text, kind, categories)
        .or_else(|| {
            let cleaned = clean_merchant(&text);
            let found = if cleaned.is_empty() || cleaned == text {
                coarse_family(&text, kind, &valid)
            } else {
                match_layers(&cleaned, kind, categories)
                    .map(|(c, _)| c)
                    .or_else(|| coarse_family(&cleaned, kind, &valid))
            };
            found.map(|c| (c, MatchSource::Structural))
        })
        .or_else(|| fuzzy_family(&text, &valid).map(|c| (c, MatchSource::Family)));

    let (category, source) = result.unwrap_or_else(|| {
        (
            fallback_category(kind).to_string(),
            MatchSource::Fallback,
        )
    });

    log::debug!(
        "categorized {:?} as {} ({:?})",
        description,
        category,
        source
    );
    (category, source)
}

/// Layers 1-3 against already lower-cased text
fn match_layers(
    text: &str,
    kind: TransactionType,
    categories: &CategorySet,
) -> Option<(String, MatchSource)> {
    keyword_match(text, kind, categories)
        .map(|c| (c, MatchSource::Keyword))
        .or_else(|| pattern_match(text, kind, categories).map(|c| (c, MatchSource::Pattern)))
        .or_else(|| merchant_match(text, kind, categories).map(|c| (c, MatchSource::Merchant)))
}

fn keywords_for(category: &str) -> &'static [&'static str] {
    KEYWORDS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

/// Categories of `kind` a description may be matched to, in set order
fn candidates<'a>(
    kind: TransactionType,
    categories: &'a CategorySet,
) -> impl Iterator<Item = &'a String> {
    categories
        .for_type(kind)
        .iter()
        .filter(move |c| reserved_type(c).map_or(true, |t| t == kind))
}

fn keyword_match(text: &str, kind: TransactionType, categories: &CategorySet) -> Option<String> {
    candidates(kind, categories)
        .find(|category| {
            let own_name = category.to_lowercase();
            keywords_for(category).iter().any(|k| text.contains(k))
                || (own_name.len() >= 4 && text.contains(&own_name))
        })
        .cloned()
}

fn pattern_match(text: &str, kind: TransactionType, categories: &CategorySet) -> Option<String> {
    let patterns = category_patterns();
    candidates(kind, categories)
        .find(|category| {
            patterns
                .iter()
                .any(|(name, re)| name == category && re.is_match(text))
        })
        .cloned()
}

fn merchant_match(text: &str, kind: TransactionType, categories: &CategorySet) -> Option<String> {
    let words = words(text);
    MERCHANTS
        .iter()
        .find(|(merchant, category)| {
            categories.allows(kind, category) && contains_phrase(&words, merchant)
        })
        .map(|(_, category)| category.to_string())
}

/// Strip processor prefixes and trailing noise to recover the merchant token
pub fn clean_merchant(text: &str) -> String {
    let mut cleaned = text.trim().to_lowercase();

    while let Some(prefix) = PROCESSOR_PREFIXES
        .iter()
        .find(|p| cleaned.starts_with(*p))
    {
        cleaned = cleaned[prefix.len()..].trim_start().to_string();
    }

    for re in noise_patterns() {
        cleaned = re.replace_all(&cleaned, " ").into_owned();
    }

    let cleaned = whitespace()
        .iter()
        .fold(cleaned, |acc, re| re.replace_all(&acc, " ").into_owned());

    cleaned
        .trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '#' || c == '-')
        .to_string()
}

fn coarse_family(
    text: &str,
    kind: TransactionType,
    valid: &dyn Fn(&str) -> bool,
) -> Option<String> {
    if kind != TransactionType::Expense {
        return None;
    }

    let words = words(text);
    let has = |family: &[&str]| family.iter().any(|f| words.iter().any(|w| w == f));

    [
        (FOOD_FAMILY, "Dining Out"),
        (FUEL_FAMILY, "Transport"),
        (RETAIL_FAMILY, "Shopping"),
    ]
    .iter()
    .find(|(family, category)| valid(*category) && has(*family))
    .map(|(_, category)| category.to_string())
}

fn fuzzy_family(text: &str, valid: &dyn Fn(&str) -> bool) -> Option<String> {
    let words = words(text);
    FAMILIES
        .iter()
        .find(|(family, category)| {
            valid(*category) && words.iter().any(|w| is_close(w, family))
        })
        .map(|(_, category)| category.to_string())
}

/// Same word up to one edit, for words long enough that a typo is plausible
fn is_close(word: &str, target: &str) -> bool {
    if word == target {
        return true;
    }
    word.chars().count() >= 5 && levenshtein(word, target) <= 1
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            current[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(current[j] + 1);
        }
        prev = current;
    }

    prev[b.len()]
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_phrase(words: &[String], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }
    words
        .windows(needle.len())
        .any(|window| window.iter().zip(&needle).all(|(w, n)| w == n))
}
