use uuid::Uuid;

const ID_LEN: usize = 12;

/// Short opaque identifier for receipts and line items.
///
/// Nothing tracks issued ids; uniqueness rests on 48 random bits, which is
/// plenty for one operator's lifetime of receipts but is not a guarantee.
pub fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_short_hex() {
        let id = generate_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn ids_do_not_repeat_in_practice() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
