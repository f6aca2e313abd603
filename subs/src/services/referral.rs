/// Referral code for the record created after `existing_count` others.
///
/// Codes are `REF` followed by the sequence number padded to four digits;
/// past 9999 the number simply grows wider.
pub fn allocate(existing_count: usize) -> String {
    format!("REF{:04}", existing_count + 1)
}

/// First sequential code, starting from `existing_count`, that `is_taken` rejects.
///
/// Deleting records shrinks the count, so the plain sequence can land on
/// a code that is still held by a later record.
pub fn allocate_unused(existing_count: usize, is_taken: impl Fn(&str) -> bool) -> String {
    let mut count = existing_count;
    loop {
        let code = allocate(count);
        if !is_taken(&code) {
            return code;
        }
        count += 1;
    }
}
