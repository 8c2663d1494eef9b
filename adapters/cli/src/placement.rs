use std::str::FromStr;

use wave_defence_core::CellCoord;

/// Tower build request given on the command line as `TYPE@X,Y`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TowerRequest {
    /// Tower template name.
    pub(crate) tower_type: String,
    /// Cell to build on.
    pub(crate) cell: CellCoord,
}

/// Errors produced while parsing a [`TowerRequest`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum TowerRequestError {
    /// The `@` separating type and cell is missing or the type is empty.
    #[error("expected TYPE@X,Y, got '{0}'")]
    MissingType(String),
    /// The cell coordinates could not be parsed.
    #[error("could not parse cell '{0}'")]
    InvalidCell(String),
}

impl FromStr for TowerRequest {
    type Err = TowerRequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (tower_type, cell) = value
            .trim()
            .split_once('@')
            .filter(|(tower_type, _)| !tower_type.trim().is_empty())
            .ok_or_else(|| TowerRequestError::MissingType(value.to_owned()))?;

        let (column, row) = cell
            .split_once(',')
            .ok_or_else(|| TowerRequestError::InvalidCell(cell.to_owned()))?;
        let column = column
            .trim()
            .parse::<u32>()
            .map_err(|_| TowerRequestError::InvalidCell(cell.to_owned()))?;
        let row = row
            .trim()
            .parse::<u32>()
            .map_err(|_| TowerRequestError::InvalidCell(cell.to_owned()))?;

        Ok(Self {
            tower_type: tower_type.trim().to_owned(),
            cell: CellCoord::new(column, row),
        })
    }
}
