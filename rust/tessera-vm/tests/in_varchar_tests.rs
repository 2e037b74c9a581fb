//! Set-membership evaluation over a varchar column, the way an expression
//! layer consumes the memory: constant and deferred values are resolved once
//! in `init`, then every row is probed through a zero-copy varchar view.

use std::collections::HashSet;

use tessera_vm::{
    MemoryConfig, PagedMemory, ReadableMemory, Utf8View, WritableMemory,
    encoding::VARCHAR_HEADER_SIZE,
};

/// A varchar column: record data plus one `i64` offset per row.
struct VarcharColumn {
    data: PagedMemory,
    index: PagedMemory,
    rows: u64,
}

impl VarcharColumn {
    fn new(page_size: u64) -> VarcharColumn {
        let config = MemoryConfig::default().with_page_size(page_size);
        VarcharColumn {
            data: PagedMemory::new(&config).unwrap(),
            index: PagedMemory::new(&config).unwrap(),
            rows: 0,
        }
    }

    fn append(&mut self, value: Option<&str>) {
        let offset = self.data.size();
        self.data.put_varchar(offset, value).unwrap();
        self.index.put_long(self.rows * 8, offset as i64).unwrap();
        self.rows += 1;
    }

    fn value(&self, row: u64) -> Option<Utf8View<'_>> {
        let offset = self.index.get_long(row * 8) as u64;
        let header = self.data.get_varchar_header(offset);
        self.data
            .get_varchar_a(offset + VARCHAR_HEADER_SIZE, header.size(), header.is_ascii())
    }
}

#[derive(Default)]
struct Utf8Set {
    values: HashSet<Vec<u8>>,
    has_null: bool,
}

impl Utf8Set {
    fn add(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.values.insert(s.as_bytes().to_vec());
            }
            None => self.has_null = true,
        }
    }

    fn contains(&self, value: Option<Utf8View<'_>>) -> bool {
        match value {
            Some(v) => match v.as_str() {
                Some(s) => self.values.contains(s.as_bytes()),
                None => self.values.contains(&*v.bytes().to_bytes()),
            },
            None => self.has_null,
        }
    }

    fn clear(&mut self) {
        self.values.clear();
        self.has_null = false;
    }
}

enum Arg {
    Constant(Option<&'static str>),
    Deferred(usize),
}

struct InVarchar {
    set: Utf8Set,
    deferred: Vec<usize>,
    deferred_set: Utf8Set,
}

impl InVarchar {
    fn new(args: &[Arg]) -> InVarchar {
        let mut set = Utf8Set::default();
        let mut deferred = Vec::new();
        for arg in args {
            match arg {
                Arg::Constant(value) => set.add(*value),
                Arg::Deferred(slot) => deferred.push(*slot),
            }
        }
        InVarchar {
            set,
            deferred,
            deferred_set: Utf8Set::default(),
        }
    }

    /// Resolves deferred values against the bind variables of one execution.
    fn init(&mut self, binds: &[Option<&str>]) {
        self.deferred_set.clear();
        for &slot in &self.deferred {
            self.deferred_set.add(binds[slot]);
        }
    }

    fn eval(&self, value: Option<Utf8View<'_>>) -> bool {
        self.set.contains(value) || self.deferred_set.contains(value)
    }
}

fn matching_rows(column: &VarcharColumn, predicate: &InVarchar) -> Vec<u64> {
    (0..column.rows)
        .filter(|&row| predicate.eval(column.value(row)))
        .collect()
}

fn sample_column() -> VarcharColumn {
    let mut column = VarcharColumn::new(64);
    for value in [
        Some("apple"),
        None,
        Some("banana"),
        Some(""),
        Some("cherry-with-a-long-name"),
        Some("dürüm"),
        Some("apple"),
        Some("elderberry-also-quite-long"),
    ] {
        column.append(value);
    }
    column
}

#[test]
fn test_constant_set() {
    let column = sample_column();
    let mut predicate = InVarchar::new(&[Arg::Constant(Some("apple")), Arg::Constant(Some("dürüm"))]);
    predicate.init(&[]);
    assert_eq!(matching_rows(&column, &predicate), vec![0, 5, 6]);
}

#[test]
fn test_null_and_empty_are_distinct() {
    let column = sample_column();
    let mut predicate = InVarchar::new(&[Arg::Constant(None)]);
    predicate.init(&[]);
    assert_eq!(matching_rows(&column, &predicate), vec![1]);

    let mut predicate = InVarchar::new(&[Arg::Constant(Some(""))]);
    predicate.init(&[]);
    assert_eq!(matching_rows(&column, &predicate), vec![3]);
}

#[test]
fn test_deferred_values_resolved_per_execution() {
    let column = sample_column();
    let mut predicate = InVarchar::new(&[
        Arg::Constant(Some("banana")),
        Arg::Deferred(0),
        Arg::Deferred(1),
    ]);

    predicate.init(&[Some("cherry-with-a-long-name"), None]);
    assert_eq!(matching_rows(&column, &predicate), vec![1, 2, 4]);

    // Re-initialization replaces the previous deferred values.
    predicate.init(&[Some("elderberry-also-quite-long"), Some("nope")]);
    assert_eq!(matching_rows(&column, &predicate), vec![2, 7]);
}

#[test]
fn test_split_values_match() {
    let column = sample_column();
    let split_rows: Vec<u64> = (0..column.rows)
        .filter(|&row| column.value(row).is_some_and(|v| v.as_split().is_some()))
        .collect();
    assert!(!split_rows.is_empty());

    for row in split_rows {
        let expected = column.value(row).unwrap().to_string();
        let mut predicate = InVarchar::new(&[Arg::Deferred(0)]);
        predicate.init(&[Some(expected.as_str())]);
        assert!(matching_rows(&column, &predicate).contains(&row), "row {row}");
    }
}
