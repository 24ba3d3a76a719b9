/// Format a rupee amount with Indian digit grouping: `1234567` -> `12,34,567`.
pub fn format_inr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let sign = if amount < 0 { "-" } else { "" };

    if digits.len() <= 3 {
        return format!("{sign}{digits}");
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    groups.push(rest);
    groups.reverse();

    format!("{sign}{},{tail}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::format_inr;

    #[test]
    fn groups_lakhs_and_crores() {
        assert_eq!(format_inr(800), "800");
        assert_eq!(format_inr(4000), "4,000");
        assert_eq!(format_inr(45000), "45,000");
        assert_eq!(format_inr(1234567), "12,34,567");
        assert_eq!(format_inr(123456789), "12,34,56,789");
        assert_eq!(format_inr(-150000), "-1,50,000");
    }
}
