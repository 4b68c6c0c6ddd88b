//! Normalizes backend enumeration into a bounded identifier set.
//!
//! Directories, containers and tables may hold entries that were not written
//! by us (temp files, unrelated blobs, hand-inserted rows). Only names that
//! are canonical identifiers survive; everything else is dropped silently.

use data_model::RecordId;

/// Treats `Some(0)` the same as `None`: no bound.
pub fn effective_limit(limit: Option<usize>) -> Option<usize> {
    limit.filter(|l| *l > 0)
}

/// Accumulates identifiers from raw entry names until the limit is reached.
#[derive(Debug)]
pub struct IdCollector {
    ids: Vec<RecordId>,
    limit: Option<usize>,
}

impl IdCollector {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            ids: Vec::new(),
            limit: effective_limit(limit),
        }
    }

    /// Offers a raw entry name. Returns true if it was kept.
    pub fn offer(&mut self, name: &str) -> bool {
        if self.is_full() {
            return false;
        }
        match RecordId::from_canonical(name) {
            Some(id) => {
                self.ids.push(id);
                true
            }
            None => false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.ids.len() >= limit)
    }

    /// How many more identifiers fit, `None` when unbounded.
    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.ids.len()))
    }

    pub fn into_ids(self) -> Vec<RecordId> {
        self.ids
    }
}

pub fn collect_ids<I, S>(names: I, limit: Option<usize>) -> Vec<RecordId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut collector = IdCollector::new(limit);
    for name in names {
        if collector.is_full() {
            break;
        }
        collector.offer(name.as_ref());
    }
    collector.into_ids()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_names_are_dropped() {
        let a = RecordId::new();
        let b = RecordId::new();
        let names = vec![
            a.to_string(),
            "README.md".to_string(),
            format!(".{}.tmp", b),
            b.to_string(),
            b.to_string().to_uppercase(),
            format!("nested/{}", a),
        ];
        assert_eq!(collect_ids(&names, None), vec![a, b]);
    }

    #[test]
    fn test_limit_bounds_result() {
        let ids: Vec<RecordId> = (0..5).map(|_| RecordId::new()).collect();
        let names: Vec<String> = ids.iter().map(|id| id.to_string()).collect();

        assert_eq!(collect_ids(&names, Some(2)), ids[..2].to_vec());
        assert_eq!(collect_ids(&names, Some(0)).len(), 5);
        assert_eq!(collect_ids(&names, Some(10)).len(), 5);
    }

    #[test]
    fn test_collector_stops_when_full() {
        let mut collector = IdCollector::new(Some(1));
        assert_eq!(collector.remaining(), Some(1));
        assert!(!collector.offer("junk"));
        assert!(collector.offer(&RecordId::new().to_string()));
        assert!(collector.is_full());
        assert_eq!(collector.remaining(), Some(0));
        assert!(!collector.offer(&RecordId::new().to_string()));
        assert_eq!(collector.into_ids().len(), 1);

        let unbounded = IdCollector::new(Some(0));
        assert_eq!(unbounded.remaining(), None);
        assert!(!unbounded.is_full());
    }
}
