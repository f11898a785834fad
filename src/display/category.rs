//! Category display formatting

use crate::models::CategorySet;

/// Format both category lists, marking the reserved savings categories
pub fn format_category_lists(categories: &CategorySet) -> String {
    let mut output = String::new();

    for (title, names) in [("Income", &categories.income), ("Expense", &categories.expense)] {
        output.push_str(&format!("{} categories\n", title));
        if names.is_empty() {
            output.push_str("  (none)\n");
        }
        for (i, name) in names.iter().enumerate() {
            let prefix = if i == names.len() - 1 { "└── " } else { "├── " };
            let marker = if crate::models::category::is_reserved(name) {
                " (reserved)"
            } else {
                ""
            };
            output.push_str(&format!("  {}{}{}\n", prefix, name, marker));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_both_types() {
        let output = format_category_lists(&CategorySet::default());
        assert!(output.starts_with("Income categories\n"));
        assert!(output.contains("Expense categories\n"));
        assert!(output.contains("Savings Deposit (reserved)"));
        assert!(output.contains("── Salary\n"));
    }

    #[test]
    fn test_empty_list() {
        let output = format_category_lists(&CategorySet::empty());
        assert!(output.contains("  (none)\n"));
    }
}
