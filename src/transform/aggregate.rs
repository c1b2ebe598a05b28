use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Average,
    Sum,
    Count,
}

/// Group rows and reduce one numeric value per group.
///
/// Rows whose value is `None` are skipped, and a group with no values never
/// appears in the output, so an average never divides by zero.
pub fn aggregate<T, K, G, V>(items: &[T], group_key: G, value: V, reducer: Reducer) -> BTreeMap<K, f64>
where
    K: Ord,
    G: Fn(&T) -> K,
    V: Fn(&T) -> Option<f64>,
{
    let mut groups: BTreeMap<K, (f64, u64)> = BTreeMap::new();
    for item in items {
        let Some(v) = value(item) else { continue };
        let entry = groups.entry(group_key(item)).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(key, (sum, count))| {
            let reduced = match reducer {
                Reducer::Average => sum / count as f64,
                Reducer::Sum => sum,
                Reducer::Count => count as f64,
            };
            (key, reduced)
        })
        .collect()
}

pub fn average_by<T, K, G, V>(items: &[T], group_key: G, value: V) -> BTreeMap<K, f64>
where
    K: Ord,
    G: Fn(&T) -> K,
    V: Fn(&T) -> Option<f64>,
{
    aggregate(items, group_key, value, Reducer::Average)
}

pub fn sum_by<T, K, G, V>(items: &[T], group_key: G, value: V) -> BTreeMap<K, f64>
where
    K: Ord,
    G: Fn(&T) -> K,
    V: Fn(&T) -> Option<f64>,
{
    aggregate(items, group_key, value, Reducer::Sum)
}
