//! Normalization of raw provider tables into [`BondRecord`]s.
//!
//! Price rows are renamed, typed and filtered to future maturities; coupon-rate
//! rows are renamed, filtered to war-bond ISINs and their percent strings
//! parsed. The two are inner-joined on ISIN, so instruments missing from either
//! table (discount bonds without a coupon-rate row) drop out.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::{debug, info};

use super::provider::DataError;
use super::table::promote_header_row;
use crate::domain::BondRecord;

pub const PRICE_COLUMN_MAPPING: [(&str, &str); 3] = [
    ("ISIN", "isin"),
    ("Дата погашення", "maturity_date"),
    (
        "Справедлива вартість одного цінного папера з урахуванням накопиченого купонного доходу, у валюті номіналу",
        "price",
    ),
];

pub const COUPON_RATE_COLUMN_MAPPING: [(&str, &str); 2] = [
    ("ISIN код військових облігацій", "isin"),
    ("Ставка", "coupon_rate"),
];

/// Rename price columns, coerce types and keep maturities strictly after `today`.
///
/// Output columns: `isin` (str), `maturity_date` (date), `price` (f64).
pub fn clean_price_table(raw: &DataFrame, today: NaiveDate) -> Result<DataFrame, DataError> {
    let df = rename_and_select(raw, &PRICE_COLUMN_MAPPING)?;
    let isins = string_column(&df, "isin")?;
    let dates = string_column(&df, "maturity_date")?;
    let prices = string_column(&df, "price")?;

    let mut seen = HashSet::new();
    let mut out_isin = Vec::new();
    let mut out_date = Vec::new();
    let mut out_price = Vec::new();

    for row in 0..df.height() {
        let isin = isins.get(row).unwrap_or_default().trim();
        if isin.is_empty() {
            continue;
        }

        let raw_date = dates.get(row).unwrap_or_default();
        let maturity_date =
            parse_date(raw_date).ok_or_else(|| invalid("maturity_date", row, raw_date))?;
        if maturity_date <= today {
            continue;
        }

        let raw_price = prices.get(row).unwrap_or_default();
        let price = parse_decimal(raw_price)
            .filter(|p| *p > 0.0)
            .ok_or_else(|| invalid("price", row, raw_price))?;
        if !seen.insert(isin.to_string()) {
            debug!(isin, "duplicate price row dropped");
            continue;
        }

        out_isin.push(isin.to_string());
        out_date.push(maturity_date);
        out_price.push(price);
    }

    info!(kept = out_isin.len(), total = df.height(), "price table cleaned");
    Ok(DataFrame::new(vec![
        Column::new("isin".into(), out_isin),
        Column::new("maturity_date".into(), out_date),
        Column::new("price".into(), out_price),
    ])?)
}

/// Promote the header row, rename coupon-rate columns, keep ISINs starting
/// with `isin_prefix` and parse rates to fractions.
///
/// Output columns: `isin` (str), `coupon_rate` (f64).
pub fn clean_coupon_rate_table(raw: &DataFrame, isin_prefix: &str) -> Result<DataFrame, DataError> {
    let promoted = promote_header_row(raw)?;
    let df = rename_and_select(&promoted, &COUPON_RATE_COLUMN_MAPPING)?;
    let isins = string_column(&df, "isin")?;
    let rates = string_column(&df, "coupon_rate")?;

    let mut seen = HashSet::new();
    let mut out_isin = Vec::new();
    let mut out_rate = Vec::new();

    for row in 0..df.height() {
        let isin = isins.get(row).unwrap_or_default().trim();
        if isin.is_empty() || !isin.starts_with(isin_prefix) {
            continue;
        }

        let raw_rate = rates.get(row).unwrap_or_default();
        let rate = parse_percent(raw_rate).ok_or_else(|| invalid("coupon_rate", row, raw_rate))?;

        if !seen.insert(isin.to_string()) {
            debug!(isin, "duplicate coupon-rate row dropped");
            continue;
        }
        out_isin.push(isin.to_string());
        out_rate.push(rate);
    }

    info!(kept = out_isin.len(), total = df.height(), "coupon-rate table cleaned");
    Ok(DataFrame::new(vec![
        Column::new("isin".into(), out_isin),
        Column::new("coupon_rate".into(), out_rate),
    ])?)
}

/// Inner-join cleaned price and coupon-rate frames on `isin`.
///
/// Records come back sorted by ISIN so repeated runs over the same snapshot
/// compare equal.
pub fn join_bond_records(price: &DataFrame, coupon: &DataFrame) -> Result<Vec<BondRecord>, DataError> {
    let joined = price
        .clone()
        .lazy()
        .inner_join(coupon.clone().lazy(), col("isin"), col("isin"))
        .collect()?;

    let isins = joined.column("isin")?.str()?;
    let dates = joined.column("maturity_date")?.date()?;
    let prices = joined.column("price")?.f64()?;
    let rates = joined.column("coupon_rate")?.f64()?;

    let mut records: Vec<BondRecord> = isins
        .into_iter()
        .zip(dates.as_date_iter())
        .zip(prices.into_iter().zip(rates.into_iter()))
        .filter_map(|((isin, maturity_date), (price, coupon_rate))| {
            Some(BondRecord {
                isin: isin?.to_string(),
                maturity_date: maturity_date?,
                price: price?,
                coupon_rate,
            })
        })
        .collect();
    records.sort_by(|a, b| a.isin.cmp(&b.isin));

    info!(
        records = records.len(),
        priced = price.height(),
        rated = coupon.height(),
        "bond records joined"
    );
    Ok(records)
}

/// Full normalization: clean both raw tables and join them.
pub fn bond_records(
    price_raw: &DataFrame,
    coupon_raw: &DataFrame,
    today: NaiveDate,
    isin_prefix: &str,
) -> Result<Vec<BondRecord>, DataError> {
    let price = clean_price_table(price_raw, today)?;
    let coupon = clean_coupon_rate_table(coupon_raw, isin_prefix)?;
    join_bond_records(&price, &coupon)
}

/// Parse a locale percent string such as `"19,50%"` into a fraction (`0.195`).
pub fn parse_percent(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_end_matches('%');
    parse_decimal(trimmed).map(|v| v / 100.0)
}

/// Parse a number written with either a decimal comma or a decimal point.
///
/// Spaces (including non-breaking ones) are digit grouping. When both `,` and
/// `.` appear, the last one is the decimal separator and the other groups
/// digits; a separator repeated on its own groups digits. A lone comma
/// followed by exactly three digits (`"1,000"`) could be either, so it is
/// rejected.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    if compact.is_empty() {
        return None;
    }

    let commas = compact.matches(',').count();
    let dots = compact.matches('.').count();
    let normalized = match (commas, dots) {
        (0, 0) | (0, 1) => compact,
        (1, 0) => {
            if is_ambiguous_grouping(&compact) {
                return None;
            }
            compact.replace(',', ".")
        }
        (_, 0) => compact.replace(',', ""),
        (0, _) => compact.replace('.', ""),
        _ => {
            let decimal = compact.rfind([',', '.'])?;
            let (decimal, grouping) = if compact[decimal..].starts_with(',') {
                (',', '.')
            } else {
                ('.', ',')
            };
            if compact.matches(decimal).count() != 1 {
                return None;
            }
            compact.replace(grouping, "").replace(decimal, ".")
        }
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `"1,000"` or `"-12,500"`: a thousands group or three decimals.
fn is_ambiguous_grouping(compact: &str) -> bool {
    let Some((int_part, frac)) = compact.split_once(',') else {
        return false;
    };
    let int_digits = int_part.trim_start_matches(['-', '+']);
    frac.len() == 3
        && frac.bytes().all(|b| b.is_ascii_digit())
        && (1..=3).contains(&int_digits.len())
        && int_digits.bytes().all(|b| b.is_ascii_digit())
        && !int_digits.starts_with('0')
}

/// Parse `YYYY-MM-DD`, `DD.MM.YYYY`, or an ISO datetime into a date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                .ok()
                .map(|dt| dt.date())
        })
}

fn rename_and_select(df: &DataFrame, mapping: &[(&str, &str)]) -> Result<DataFrame, DataError> {
    for (from, _) in mapping {
        if df.get_column_index(from).is_none() {
            return Err(DataError::MissingColumn((*from).to_string()));
        }
    }
    let mut selected = df.select(mapping.iter().map(|(from, _)| *from))?;
    for (from, to) in mapping {
        selected.rename(from, (*to).into())?;
    }
    Ok(selected)
}

fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked, DataError> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column.str()?.clone())
}

fn invalid(column: &str, row: usize, value: &str) -> DataError {
    DataError::InvalidValue {
        column: column.to_string(),
        row,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICE_HEADER: &str = PRICE_COLUMN_MAPPING[2].0;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn raw_prices() -> DataFrame {
        df!(
            "ISIN" => &["UA4000227045", "UA4000200000", "UA4000227235", "XS2010028343"],
            "Дата погашення" => &["2025-05-21", "2024-06-01", "2026-02-11", "2027-09-01"],
            PRICE_HEADER => &["1012.34", "999,10", "987,65", "410.5"],
            "Валюта" => &["UAH", "UAH", "UAH", "USD"],
        )
        .unwrap()
    }

    fn raw_coupons() -> DataFrame {
        df!(
            "column_0" => &["№", "1", "2", "3"],
            "column_1" => &["ISIN код військових облігацій", "UA4000227045", "UA4000227235", "XS0000000001"],
            "column_2" => &["Ставка", "19,50%", "19,70%", "abc"],
        )
        .unwrap()
    }

    #[test]
    fn percent_strings_parse_to_fractions() {
        assert_eq!(parse_percent("19,50%"), Some(0.195));
        assert_eq!(parse_percent(" 20 % "), Some(0.2));
        assert_eq!(parse_percent("abc"), None);
        assert_eq!(parse_percent(""), None);
    }

    #[test]
    fn decimals_accept_comma_and_grouping() {
        assert_eq!(parse_decimal("987,65"), Some(987.65));
        assert_eq!(parse_decimal("1\u{a0}012,5"), Some(1012.5));
        assert_eq!(parse_decimal("1,012.5"), Some(1012.5));
        assert_eq!(parse_decimal("NaN"), None);
    }

    #[test]
    fn decimals_use_last_separator_when_mixed() {
        assert_eq!(parse_decimal("1.012,50"), Some(1012.5));
        assert_eq!(parse_decimal("1,012.50"), Some(1012.5));
        assert_eq!(parse_decimal("1.000.000,25"), Some(1_000_000.25));
        assert_eq!(parse_decimal("1,000,000"), Some(1_000_000.0));
        assert_eq!(parse_decimal("1.2.3,4,5"), None);
    }

    #[test]
    fn lone_comma_before_three_digits_is_rejected() {
        assert_eq!(parse_decimal("1,000"), None);
        assert_eq!(parse_decimal("-12,500"), None);
        assert_eq!(parse_decimal("0,125"), Some(0.125));
        assert_eq!(parse_decimal("1012,500"), Some(1012.5));
        assert_eq!(parse_decimal("1,25"), Some(1.25));
    }

    #[test]
    fn dates_accept_iso_and_dotted() {
        let expected = NaiveDate::from_ymd_opt(2025, 5, 21);
        assert_eq!(parse_date("2025-05-21"), expected);
        assert_eq!(parse_date("21.05.2025"), expected);
        assert_eq!(parse_date("2025-05-21 00:00:00"), expected);
        assert_eq!(parse_date("2025-05-21T00:00:00"), expected);
        assert_eq!(parse_date("someday"), None);
    }

    #[test]
    fn price_table_keeps_only_future_maturities() {
        let cleaned = clean_price_table(&raw_prices(), today()).unwrap();
        assert_eq!(cleaned.height(), 3);
        assert_eq!(
            cleaned.get_column_names().iter().map(|n| n.as_str()).collect::<Vec<_>>(),
            vec!["isin", "maturity_date", "price"]
        );
        let isins = cleaned.column("isin").unwrap().str().unwrap();
        assert!(isins.into_iter().all(|i| i != Some("UA4000200000")));
        let prices = cleaned.column("price").unwrap().f64().unwrap();
        assert_eq!(prices.get(1), Some(987.65));
    }

    #[test]
    fn price_table_requires_mapped_columns() {
        let raw = raw_prices().drop("Дата погашення").unwrap();
        let err = clean_price_table(&raw, today()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == "Дата погашення"));
    }

    #[test]
    fn unparsable_price_is_an_error() {
        let raw = df!(
            "ISIN" => &["UA4000227045"],
            "Дата погашення" => &["2025-05-21"],
            PRICE_HEADER => &["n/a"],
        )
        .unwrap();
        let err = clean_price_table(&raw, today()).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { ref column, row: 0, .. } if column == "price"));
    }

    #[test]
    fn matured_row_with_blank_price_is_dropped() {
        let raw = df!(
            "ISIN" => &["UA4000227045", "UA4000200000"],
            "Дата погашення" => &["2025-05-21", "2024-05-01"],
            PRICE_HEADER => &["1012,34", ""],
        )
        .unwrap();
        let cleaned = clean_price_table(&raw, today()).unwrap();
        assert_eq!(cleaned.height(), 1);
        let isins = cleaned.column("isin").unwrap().str().unwrap();
        assert_eq!(isins.get(0), Some("UA4000227045"));
    }

    #[test]
    fn numeric_price_column_is_accepted() {
        let raw = df!(
            "ISIN" => &["UA4000227045", ""],
            "Дата погашення" => &["2025-05-21", ""],
            PRICE_HEADER => &[1012.5, 0.0],
        )
        .unwrap();
        let cleaned = clean_price_table(&raw, today()).unwrap();
        assert_eq!(cleaned.height(), 1);
        assert_eq!(cleaned.column("price").unwrap().f64().unwrap().get(0), Some(1012.5));
    }

    #[test]
    fn coupon_table_filters_to_prefix() {
        let cleaned = clean_coupon_rate_table(&raw_coupons(), "UA").unwrap();
        assert_eq!(cleaned.height(), 2);
        let isins = cleaned.column("isin").unwrap().str().unwrap();
        assert!(isins.into_iter().all(|i| i.unwrap().starts_with("UA")));
        let rates = cleaned.column("coupon_rate").unwrap().f64().unwrap();
        assert_eq!(rates.get(0), Some(0.195));
        assert!((rates.get(1).unwrap() - 0.197).abs() < 1e-12);
    }

    #[test]
    fn coupon_table_drops_duplicate_isins() {
        let raw = df!(
            "column_0" => &["ISIN код військових облігацій", "UA4000227045", "UA4000227045"],
            "column_1" => &["Ставка", "19,50%", "18,00%"],
        )
        .unwrap();
        let cleaned = clean_coupon_rate_table(&raw, "UA").unwrap();
        assert_eq!(cleaned.height(), 1);
        assert_eq!(cleaned.column("coupon_rate").unwrap().f64().unwrap().get(0), Some(0.195));
    }

    #[test]
    fn join_keeps_only_matched_isins() {
        let records = bond_records(&raw_prices(), &raw_coupons(), today(), "UA").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].isin, "UA4000227045");
        assert_eq!(records[0].maturity_date, NaiveDate::from_ymd_opt(2025, 5, 21).unwrap());
        assert_eq!(records[0].price, 1012.34);
        assert_eq!(records[0].coupon_rate, Some(0.195));
        assert_eq!(records[1].isin, "UA4000227235");
        assert!((records[1].coupon_rate.unwrap() - 0.197).abs() < 1e-12);
    }

    #[test]
    fn normalization_is_idempotent() {
        let first = bond_records(&raw_prices(), &raw_coupons(), today(), "UA").unwrap();
        let second = bond_records(&raw_prices(), &raw_coupons(), today(), "UA").unwrap();
        assert_eq!(first, second);
    }
}
