//! Period summary report
//!
//! Recomputes operating and savings totals, category breakdowns and chart
//! series from the flat transaction log for one reporting period.
//!
//! Savings categories feed two sets of totals: a savings deposit
//! is an operating expense and also moves the savings balance up; a
//! withdrawal is operating income and moves it down.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use crate::error::{TallyError, TallyResult};
use crate::export::csv::escape_csv;
use crate::models::{
    DateRange, Money, PeriodSelector, RangeError, Transaction, TransactionType, SAVINGS_DEPOSIT,
    SAVINGS_WITHDRAWAL,
};

/// Whether the period resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Ok,
    InvalidRange,
}

/// One row of a category breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub amount: Money,
    /// Share of the breakdown total, one decimal place
    pub percentage: f64,
}

/// Labels and values for a pie/doughnut chart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<Money>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Savings balance at the end of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavingsPoint {
    pub date: NaiveDate,
    pub balance: Money,
}

/// Everything the report views need for one period
#[derive(Debug, Clone)]
pub struct ReportResult {
    pub status: ReportStatus,
    pub period_label: String,
    /// Resolved bounds; `None` for an invalid custom range
    pub range: Option<DateRange>,
    pub range_error: Option<RangeError>,

    pub total_income: Money,
    pub total_expenses: Money,
    pub net_balance: Money,

    pub savings_deposits: Money,
    pub savings_withdrawals: Money,
    pub net_savings_change: Money,

    /// Sorted by amount, largest first
    pub income_by_category: Vec<CategoryShare>,
    /// Sorted by amount, largest first; includes savings deposits
    pub expense_by_category: Vec<CategoryShare>,
    /// Expense breakdown without savings deposits
    pub expense_chart: ChartSeries,
    /// One point per day with savings activity, ascending
    pub savings_series: Vec<SavingsPoint>,

    /// Transactions inside the period, oldest first
    pub transactions: Vec<Transaction>,
}

impl ReportResult {
    fn zeroed(status: ReportStatus, period_label: String) -> Self {
        Self {
            status,
            period_label,
            range: None,
            range_error: None,
            total_income: Money::zero(),
            total_expenses: Money::zero(),
            net_balance: Money::zero(),
            savings_deposits: Money::zero(),
            savings_withdrawals: Money::zero(),
            net_savings_change: Money::zero(),
            income_by_category: Vec::new(),
            expense_by_category: Vec::new(),
            expense_chart: ChartSeries::default(),
            savings_series: Vec::new(),
            transactions: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == ReportStatus::Ok
    }
}

/// Which totals a transaction feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    SavingsDeposit,
    SavingsWithdrawal,
    Income,
    Expense,
}

/// Category decides before type
fn bucket_of(txn: &Transaction) -> Bucket {
    if txn.category == SAVINGS_DEPOSIT {
        Bucket::SavingsDeposit
    } else if txn.category == SAVINGS_WITHDRAWAL {
        Bucket::SavingsWithdrawal
    } else if txn.kind == TransactionType::Income {
        Bucket::Income
    } else {
        Bucket::Expense
    }
}

/// Build the report for `selector` as seen on `today`
///
/// An unresolvable custom range yields a zeroed result with
/// `ReportStatus::InvalidRange`. Transactions whose date does not parse are
/// left out.
pub fn generate_report(
    transactions: &[Transaction],
    selector: &PeriodSelector,
    today: NaiveDate,
) -> ReportResult {
    let label = selector.label(today);
    let range = match selector.resolve(today) {
        Ok(range) => range,
        Err(e) => {
            log::debug!("report period rejected: {}", e);
            let mut result = ReportResult::zeroed(ReportStatus::InvalidRange, label);
            result.range_error = Some(e);
            return result;
        }
    };
    log::debug!("report period {} resolved to {}", selector.kind(), range);

    let mut in_range: Vec<(NaiveDate, &Transaction)> = transactions
        .iter()
        .filter_map(|t| t.parsed_date().map(|d| (d, t)))
        .filter(|(d, _)| range.contains(*d))
        .collect();
    in_range.sort_by_key(|(d, _)| *d);

    let mut result = ReportResult::zeroed(ReportStatus::Ok, label);
    result.range = Some(range);

    let mut income_map: HashMap<&str, Money> = HashMap::new();
    let mut expense_map: HashMap<&str, Money> = HashMap::new();
    let mut savings_by_day: BTreeMap<NaiveDate, Money> = BTreeMap::new();
    let mut savings_balance = Money::zero();

    for &(date, txn) in &in_range {
        let bucket = bucket_of(txn);
        match bucket {
            Bucket::SavingsDeposit => {
                result.savings_deposits += txn.amount;
                savings_balance += txn.amount;
                result.total_expenses += txn.amount;
                *expense_map.entry(&txn.category).or_default() += txn.amount;
            }
            Bucket::SavingsWithdrawal => {
                result.savings_withdrawals += txn.amount;
                savings_balance -= txn.amount;
                result.total_income += txn.amount;
                *income_map.entry(&txn.category).or_default() += txn.amount;
            }
            Bucket::Income => {
                result.total_income += txn.amount;
                *income_map.entry(&txn.category).or_default() += txn.amount;
            }
            Bucket::Expense => {
                result.total_expenses += txn.amount;
                *expense_map.entry(&txn.category).or_default() += txn.amount;
            }
        }

        if matches!(bucket, Bucket::SavingsDeposit | Bucket::SavingsWithdrawal) {
            savings_by_day.insert(date, savings_balance);
        }
    }

    result.net_balance = result.total_income - result.total_expenses;
    result.net_savings_change = result.savings_deposits - result.savings_withdrawals;

    result.income_by_category = breakdown(income_map);
    result.expense_by_category = breakdown(expense_map);
    for share in result
        .expense_by_category
        .iter()
        .filter(|s| s.category != SAVINGS_DEPOSIT)
    {
        result.expense_chart.labels.push(share.category.clone());
        result.expense_chart.values.push(share.amount);
    }

    result.savings_series = savings_by_day
        .into_iter()
        .map(|(date, balance)| SavingsPoint { date, balance })
        .collect();
    result.transactions = in_range.into_iter().map(|(_, t)| t.clone()).collect();

    result
}

/// Sort a category map by amount (ties by name) and attach percentages
fn breakdown(totals: HashMap<&str, Money>) -> Vec<CategoryShare> {
    let mut rows: Vec<(&str, Money)> = totals.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let amounts: Vec<Money> = rows.iter().map(|(_, m)| *m).collect();
    let tenths = percentage_tenths(&amounts);

    rows.into_iter()
        .zip(tenths)
        .map(|((category, amount), t)| CategoryShare {
            category: category.to_string(),
            amount,
            percentage: t as f64 / 10.0,
        })
        .collect()
}

/// Each amount's share of the total in tenths of a percent
///
/// Every share is rounded on its own, half away from zero, so a table may
/// sum to 99.9 or 100.1. All zeros when the total is not positive.
pub fn percentage_tenths(amounts: &[Money]) -> Vec<u32> {
    let total: i128 = amounts.iter().map(|m| m.cents() as i128).sum();
    if total <= 0 {
        return vec![0; amounts.len()];
    }

    amounts
        .iter()
        .map(|amount| {
            let scaled = amount.cents().max(0) as i128 * 1000;
            ((2 * scaled + total) / (2 * total)) as u32
        })
        .collect()
}

impl ReportResult {
    /// Format the report for terminal display, amounts prefixed with `currency`
    pub fn format_terminal(&self, currency: &str) -> String {
        let money = |amount: &Money| amount.format_with_symbol(currency);
        let mut output = String::new();

        output.push_str(&format!("Report: {}\n", self.period_label));
        if let Some(range) = &self.range {
            output.push_str(&format!("Period: {}\n", range));
        }
        output.push_str(&"=".repeat(60));
        output.push('\n');

        if let Some(e) = &self.range_error {
            output.push_str(&format!("Invalid date range: {}\n", e));
            return output;
        }

        output.push_str(&format!("{:<24} {:>14}\n", "Total Income:", money(&self.total_income)));
        output.push_str(&format!("{:<24} {:>14}\n", "Total Expenses:", money(&self.total_expenses)));
        output.push_str(&format!("{:<24} {:>14}\n", "Net Balance:", money(&self.net_balance)));
        output.push('\n');
        output.push_str(&format!("{:<24} {:>14}\n", "Savings Deposits:", money(&self.savings_deposits)));
        output.push_str(&format!(
            "{:<24} {:>14}\n",
            "Savings Withdrawals:", money(&self.savings_withdrawals)
        ));
        output.push_str(&format!(
            "{:<24} {:>14}\n",
            "Net Savings Change:", money(&self.net_savings_change)
        ));

        for (title, rows) in [
            ("Income by Category", &self.income_by_category),
            ("Expenses by Category", &self.expense_by_category),
        ] {
            output.push_str(&format!("\n{}\n", title));
            output.push_str(&"-".repeat(60));
            output.push('\n');
            if rows.is_empty() {
                output.push_str("  (none)\n");
            }
            for row in rows {
                output.push_str(&format!(
                    "  {:<32} {:>14} {:>7.1}%\n",
                    row.category,
                    money(&row.amount),
                    row.percentage
                ));
            }
        }

        if !self.savings_series.is_empty() {
            output.push_str("\nSavings Balance\n");
            output.push_str(&"-".repeat(60));
            output.push('\n');
            for point in &self.savings_series {
                output.push_str(&format!(
                    "  {:<32} {:>14}\n",
                    point.date.format("%m/%d").to_string(),
                    money(&point.balance)
                ));
            }
        }

        output.push_str(&format!("\nTransactions: {}\n", self.transactions.len()));
        output
    }

    /// Export the breakdowns and savings series as CSV
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> TallyResult<()> {
        let io = |e: std::io::Error| TallyError::Export(e.to_string());

        writeln!(writer, "Section,Label,Amount,Percentage").map_err(io)?;
        for (section, value) in [
            ("Total", ("Income", self.total_income)),
            ("Total", ("Expenses", self.total_expenses)),
            ("Total", ("Net Balance", self.net_balance)),
            ("Savings", ("Deposits", self.savings_deposits)),
            ("Savings", ("Withdrawals", self.savings_withdrawals)),
            ("Savings", ("Net Change", self.net_savings_change)),
        ] {
            writeln!(writer, "{},{},{:.2},", section, value.0, value.1.as_f64()).map_err(io)?;
        }

        for (section, rows) in [
            ("Income", &self.income_by_category),
            ("Expense", &self.expense_by_category),
        ] {
            for row in rows {
                writeln!(
                    writer,
                    "{},{},{:.2},{:.1}",
                    section,
                    escape_csv(&row.category),
                    row.amount.as_f64(),
                    row.percentage
                )
                .map_err(io)?;
            }
        }

        for point in &self.savings_series {
            writeln!(
                writer,
                "Savings Balance,{},{:.2},",
                point.date,
                point.balance.as_f64()
            )
            .map_err(io)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(id: i64, on: &str, kind: TransactionType, category: &str, cents: i64) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            kind,
            date: on.to_string(),
            description: format!("txn {}", id),
            amount: Money::from_cents(cents),
            category: category.to_string(),
        }
    }

    fn sample() -> Vec<Transaction> {
        use TransactionType::*;
        vec![
            txn(1, "2024-01-03", Income, "Salary", 300_000),
            txn(2, "2024-01-05", Expense, "Groceries", 20_000),
            txn(3, "2024-01-02", Expense, "Rent/Mortgage", 120_000),
            txn(4, "2024-01-10", Expense, SAVINGS_DEPOSIT, 50_000),
            txn(5, "2024-01-20", Income, SAVINGS_WITHDRAWAL, 10_000),
            txn(6, "2024-02-01", Expense, "Dining Out", 4_000),
            txn(7, "not-a-date", Expense, "Groceries", 99_999),
        ]
    }

    #[test]
    fn test_all_time_report() {
        let report = generate_report(&sample(), &PeriodSelector::All, date(2024, 3, 1));

        assert!(report.is_valid());
        assert_eq!(report.period_label, "All Time");
        assert_eq!(report.total_income, Money::from_cents(310_000));
        assert_eq!(report.total_expenses, Money::from_cents(194_000));
        assert_eq!(report.net_balance, Money::from_cents(116_000));
        assert_eq!(report.savings_deposits, Money::from_cents(50_000));
        assert_eq!(report.savings_withdrawals, Money::from_cents(10_000));
        assert_eq!(report.net_savings_change, Money::from_cents(40_000));

        // unparseable date skipped, the rest ascending by date
        let ids: Vec<i64> = report.transactions.iter().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![3, 1, 2, 4, 5, 6]);
    }

    #[test]
    fn test_breakdowns_and_chart() {
        let report = generate_report(&sample(), &PeriodSelector::All, date(2024, 3, 1));

        let expense: Vec<&str> = report
            .expense_by_category
            .iter()
            .map(|s| s.category.as_str())
            .collect();
        assert_eq!(
            expense,
            vec!["Rent/Mortgage", SAVINGS_DEPOSIT, "Groceries", "Dining Out"]
        );
        assert_eq!(
            report.expense_chart.labels,
            vec!["Rent/Mortgage", "Groceries", "Dining Out"]
        );
        assert_eq!(report.expense_chart.values[0], Money::from_cents(120_000));

        let income: Vec<&str> = report
            .income_by_category
            .iter()
            .map(|s| s.category.as_str())
            .collect();
        assert_eq!(income, vec!["Salary", SAVINGS_WITHDRAWAL]);
    }

    #[test]
    fn test_percentages_sum_to_one_hundred() {
        let report = generate_report(&sample(), &PeriodSelector::All, date(2024, 3, 1));
        for rows in [&report.income_by_category, &report.expense_by_category] {
            let tenths: f64 = rows.iter().map(|r| r.percentage * 10.0).sum();
            assert!((tenths.round() as i64 - 1000).abs() <= 1);
        }

        let thirds = percentage_tenths(&[Money::from_cents(100); 3]);
        assert_eq!(thirds, vec![333, 333, 333]);
        // 61.8557, 25.7732, 10.3093, 2.0619
        let shares = percentage_tenths(&[1200_00, 500_00, 200_00, 40_00].map(Money::from_cents));
        assert_eq!(shares, vec![619, 258, 103, 21]);
        assert_eq!(percentage_tenths(&[Money::from_cents(1), Money::from_cents(7)]), vec![125, 875]);
        assert_eq!(percentage_tenths(&[Money::zero(), Money::zero()]), vec![0, 0]);
        assert!(percentage_tenths(&[]).is_empty());
    }

    #[test]
    fn test_bucketing_conservation() {
        let txns = sample();
        let report = generate_report(&txns, &PeriodSelector::All, date(2024, 3, 1));

        let mut income = 0;
        let mut expense = 0;
        let mut deposits = 0;
        let mut withdrawals = 0;
        for t in txns.iter().filter(|t| t.parsed_date().is_some()) {
            let cents = t.amount.cents();
            if t.category == SAVINGS_DEPOSIT {
                deposits += cents;
                expense += cents;
            } else if t.category == SAVINGS_WITHDRAWAL {
                withdrawals += cents;
                income += cents;
            } else if t.is_income() {
                income += cents;
            } else {
                expense += cents;
            }
        }

        assert_eq!(report.total_income.cents(), income);
        assert_eq!(report.total_expenses.cents(), expense);
        assert_eq!(report.savings_deposits.cents(), deposits);
        assert_eq!(report.savings_withdrawals.cents(), withdrawals);

        let breakdown_total: Money = report
            .income_by_category
            .iter()
            .chain(&report.expense_by_category)
            .map(|s| s.amount)
            .sum();
        assert_eq!(breakdown_total.cents(), income + expense);
    }

    #[test]
    fn test_same_day_savings_collapse() {
        use TransactionType::*;
        let txns = vec![
            txn(1, "2024-01-01", Expense, SAVINGS_DEPOSIT, 10_000),
            txn(2, "2024-01-01", Income, SAVINGS_WITHDRAWAL, 3_000),
            txn(3, "2024-01-04", Expense, SAVINGS_DEPOSIT, 500),
        ];
        let report = generate_report(&txns, &PeriodSelector::All, date(2024, 2, 1));

        assert_eq!(
            report.savings_series,
            vec![
                SavingsPoint {
                    date: date(2024, 1, 1),
                    balance: Money::from_cents(7_000),
                },
                SavingsPoint {
                    date: date(2024, 1, 4),
                    balance: Money::from_cents(7_500),
                },
            ]
        );
    }

    #[test]
    fn test_savings_balance_can_go_negative() {
        let txns = vec![txn(
            1,
            "2024-01-01",
            TransactionType::Income,
            SAVINGS_WITHDRAWAL,
            2_500,
        )];
        let report = generate_report(&txns, &PeriodSelector::All, date(2024, 2, 1));
        assert_eq!(report.savings_series[0].balance, Money::from_cents(-2_500));
        assert_eq!(report.net_savings_change, Money::from_cents(-2_500));
    }

    #[test]
    fn test_custom_range_rejection() {
        let selector = PeriodSelector::custom("2024-02-01", "2024-01-01");
        let report = generate_report(&sample(), &selector, date(2024, 3, 1));

        assert_eq!(report.status, ReportStatus::InvalidRange);
        assert_eq!(report.period_label, "Invalid Custom Range");
        assert!(report.total_income.is_zero());
        assert!(report.total_expenses.is_zero());
        assert!(report.expense_chart.is_empty());
        assert!(report.savings_series.is_empty());
        assert!(report.transactions.is_empty());
        assert!(matches!(report.range_error, Some(RangeError::Inverted { .. })));

        let missing = PeriodSelector::Custom {
            start: Some("2024-01-01".into()),
            end: None,
        };
        assert_eq!(
            generate_report(&sample(), &missing, date(2024, 3, 1)).status,
            ReportStatus::InvalidRange
        );
    }

    #[test]
    fn test_custom_range_is_inclusive() {
        let selector = PeriodSelector::custom("2024-01-03", "2024-01-10");
        let report = generate_report(&sample(), &selector, date(2024, 3, 1));

        let ids: Vec<i64> = report.transactions.iter().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert_eq!(report.period_label, "Custom: 01/03/24 - 01/10/24");
    }

    #[test]
    fn test_relative_periods() {
        // 2024-01-24 is a Wednesday
        let today = date(2024, 1, 24);
        let txns = sample();

        let weekly = generate_report(&txns, &PeriodSelector::Weekly, today);
        assert_eq!(weekly.range.unwrap().start, date(2024, 1, 21));
        assert!(weekly.transactions.is_empty());

        let biweekly = generate_report(&txns, &PeriodSelector::Biweekly, today);
        assert_eq!(biweekly.range.unwrap().start, date(2024, 1, 11));
        assert_eq!(biweekly.transactions.len(), 1);

        let monthly = generate_report(&txns, &PeriodSelector::Monthly, today);
        assert_eq!(monthly.period_label, "This Month");
        // 2024-02-01 is after today
        assert_eq!(monthly.transactions.len(), 5);
    }

    #[test]
    fn test_empty_log() {
        let report = generate_report(&[], &PeriodSelector::Monthly, date(2024, 1, 24));
        assert!(report.is_valid());
        assert!(report.income_by_category.is_empty());
        assert!(report.net_balance.is_zero());
        assert!(report.format_terminal("$").contains("(none)"));
    }

    #[test]
    fn test_format_and_export() {
        let report = generate_report(&sample(), &PeriodSelector::All, date(2024, 3, 1));

        let text = report.format_terminal("€");
        assert!(text.contains("Report: All Time"));
        assert!(text.contains("€3,100.00"));
        assert!(text.contains("Rent/Mortgage"));
        assert!(text.contains("Savings Balance"));

        let mut csv = Vec::new();
        report.export_csv(&mut csv).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        assert!(csv.starts_with("Section,Label,Amount,Percentage\n"));
        assert!(csv.contains("Total,Income,3100.00,"));
        assert!(csv.contains("Expense,Rent/Mortgage,1200.00,61.9"));
        assert!(csv.contains("Expense,Savings Deposit,500.00,25.8"));
        assert!(csv.contains("Savings Balance,2024-01-20,400.00,"));
    }
}
