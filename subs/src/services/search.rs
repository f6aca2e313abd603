use db::models::subscriber::Subscriber;

/// Records whose name, email, referral code, phone or TradingView id
/// contains `term`, ignoring case. Order is preserved; an empty term keeps everything.
pub fn filter<'a>(records: &'a [Subscriber], term: &str) -> Vec<&'a Subscriber> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| {
            record
                .searchable_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
