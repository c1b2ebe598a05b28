use crate::models::Record;

/// Keep matching rows, preserving their relative order
pub fn filter<T, P>(items: &[T], predicate: P) -> Vec<T>
where
    T: Clone,
    P: Fn(&T) -> bool,
{
    items.iter().filter(|item| predicate(*item)).cloned().collect()
}

/// Case-insensitive substring match on one field
pub fn contains<T: Record>(field: &str, needle: &str) -> impl Fn(&T) -> bool {
    let field = field.to_string();
    let needle = needle.to_lowercase();
    move |item: &T| {
        item.field(&field)
            .map(|v| v.to_string().to_lowercase().contains(&needle))
            .unwrap_or(false)
    }
}

/// Case-insensitive substring match across several fields; an empty needle matches all
pub fn search<T: Record>(fields: &[&str], needle: &str) -> impl Fn(&T) -> bool {
    let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    let needle = needle.trim().to_lowercase();
    move |item: &T| {
        needle.is_empty()
            || fields.iter().any(|f| {
                item.field(f)
                    .map(|v| v.to_string().to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
    }
}
