//! Budget display formatting

use crate::services::{Allocation, BudgetComparison};

/// Format allocation percentages with their total
pub fn format_allocations(allocations: &[Allocation]) -> String {
    let mut output = String::new();
    output.push_str(&format!("{:28} {:>6}\n", "Category", "Share"));
    output.push_str(&"-".repeat(35));
    output.push('\n');

    for allocation in allocations {
        output.push_str(&format!(
            "{:28} {:>5}%\n",
            allocation.category, allocation.percentage
        ));
    }

    let total: u32 = allocations.iter().map(|a| a.percentage as u32).sum();
    output.push_str(&"-".repeat(35));
    output.push('\n');
    output.push_str(&format!("{:28} {:>5}%\n", "Total", total));
    if total > 100 {
        output.push_str(&format!(
            "Warning: allocations exceed 100% of income by {} points\n",
            total - 100
        ));
    }

    output
}

/// Format allocation vs. spending for a period
pub fn format_comparison(rows: &[BudgetComparison]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:24} {:>6} {:>12} {:>12} {:>7}\n",
        "Category", "Budget", "Target", "Spent", "Actual"
    ));
    output.push_str(&"-".repeat(65));
    output.push('\n');

    for row in rows {
        let flag = if row.is_over() { "  over" } else { "" };
        output.push_str(&format!(
            "{:24} {:>5}% {:>12} {:>12} {:>6.1}%{}\n",
            row.category, row.allocated_percent, row.target, row.spent, row.actual_percent, flag
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;

    #[test]
    fn test_allocations_over_budget_warning() {
        let allocations = vec![
            Allocation {
                category: "Groceries".into(),
                percentage: 60,
            },
            Allocation {
                category: "Rent/Mortgage".into(),
                percentage: 50,
            },
        ];
        let output = format_allocations(&allocations);
        assert!(output.contains("Total"));
        assert!(output.contains("110%"));
        assert!(output.contains("exceed 100% of income by 10 points"));
    }

    #[test]
    fn test_comparison_flags_overspending() {
        let rows = vec![BudgetComparison {
            category: "Dining Out".into(),
            allocated_percent: 5,
            target: Money::from_cents(10_000),
            spent: Money::from_cents(12_000),
            actual_percent: 6.0,
        }];
        let output = format_comparison(&rows);
        assert!(output.contains("Dining Out"));
        assert!(output.contains("$120.00"));
        assert!(output.contains("6.0%  over"));
    }
}
