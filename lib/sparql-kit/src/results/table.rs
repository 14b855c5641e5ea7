use crate::results::native::{NativeSolutions, NativeValue};
use serde::Serialize;

/// A row oriented table of results.
///
/// SELECT results have one column per projected variable, in head order, and one row per
/// solution. ASK results have a single `boolean` column holding a single value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    /// Unbound cells are `None`.
    pub rows: Vec<Vec<Option<NativeValue>>>,
}

impl Table {
    pub fn from_boolean(value: bool) -> Self {
        Self {
            columns: vec!["boolean".to_owned()],
            rows: vec![vec![Some(NativeValue::Boolean(value))]],
        }
    }

    pub fn from_solutions(solutions: NativeSolutions) -> Self {
        let rows = solutions
            .bindings
            .iter()
            .map(|binding| {
                solutions
                    .variables
                    .iter()
                    .map(|variable| binding.get(variable).cloned())
                    .collect()
            })
            .collect();
        Self {
            columns: solutions.variables,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The cells of a column, if it exists.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = Option<&NativeValue>>> {
        let index = self.columns.iter().position(|column| column == name)?;
        Some(self.rows.iter().map(move |row| row.get(index)?.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::native::NativeBinding;

    #[test]
    fn boolean_table_has_one_cell() {
        let table = Table::from_boolean(true);
        assert_eq!(table.columns, ["boolean"]);
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.column("boolean").unwrap().collect::<Vec<_>>(),
            [Some(&NativeValue::Boolean(true))]
        );
    }

    #[test]
    fn unbound_variables_are_empty_cells() {
        let mut first = NativeBinding::default();
        first.push("a".to_owned(), NativeValue::Integer(1));
        first.push("b".to_owned(), NativeValue::Integer(2));
        let mut second = NativeBinding::default();
        second.push("b".to_owned(), NativeValue::Integer(3));
        let table = Table::from_solutions(NativeSolutions {
            variables: vec!["a".to_owned(), "b".to_owned()],
            bindings: vec![first, second],
        });
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[1],
            [None, Some(NativeValue::Integer(3))]
        );
        assert!(table.column("c").is_none());
    }
}
