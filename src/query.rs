//! Per-column read requests.

use std::{fmt, sync::Arc};

use bigread_predicate::Predicate;

use crate::{
    error::ReaderError,
    filter::Filter,
    types::{DesiredType, TypeTag},
};

/// What a bulk read wants from one column: whether its value is returned,
/// as which type, and an optional filter restricting the emitted rows.
///
/// A column that is not projected always carries the [`TypeTag::Unit`] type.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryColumn {
    project: bool,
    desired: DesiredType,
    filter: Option<Arc<Filter>>,
}

impl QueryColumn {
    /// Returns the column's value as `desired`, without filtering.
    pub fn projected(desired: impl Into<DesiredType>) -> Result<Self, ReaderError> {
        Self::new(true, desired.into(), None)
    }

    /// Filters on the column without returning its value.
    pub fn filtered(filter: impl Into<Arc<Filter>>) -> Self {
        Self {
            project: false,
            desired: DesiredType::unit(),
            filter: Some(filter.into()),
        }
    }

    /// Returns the column's value as `desired` and filters on it.
    pub fn projected_with_filter(
        desired: impl Into<DesiredType>,
        filter: impl Into<Arc<Filter>>,
    ) -> Result<Self, ReaderError> {
        Self::new(true, desired.into(), Some(filter.into()))
    }

    /// General constructor. A projected column must name a real type; an
    /// unprojected one has its type replaced by `Unit`.
    pub fn new(
        project: bool,
        desired: DesiredType,
        filter: Option<Arc<Filter>>,
    ) -> Result<Self, ReaderError> {
        if project && desired.tag == TypeTag::Unit {
            return Err(ReaderError::MissingArgument {
                name: "desired_type",
            });
        }
        Ok(Self {
            project,
            desired: if project { desired } else { DesiredType::unit() },
            filter,
        })
    }

    pub fn project(&self) -> bool {
        self.project
    }

    pub fn desired(&self) -> DesiredType {
        self.desired
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_deref()
    }
}

impl fmt::Display for QueryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "project={}, desired_type={}, filter=",
            self.project, self.desired
        )?;
        match &self.filter {
            Some(filter) => write!(f, "{filter}"),
            None => f.write_str("none"),
        }
    }
}

/// A query column after validation: the filter has been translated and bound
/// to the column's type, ready for a storage engine.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnAttributes {
    pub project: bool,
    pub desired: DesiredType,
    pub predicate: Option<Predicate>,
}
