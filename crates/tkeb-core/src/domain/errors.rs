use crate::field::StaggerLocation;

pub type BudgetResult<T> = Result<T, BudgetError>;

/// Fatal precondition violations for a diagnostic step.
///
/// Any of these aborts the current step before a single profile is
/// published. Numerically suspect but structurally valid results are
/// reported through `ConsistencyWarning` instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BudgetError {
    #[error(
        "field '{field}' spans {field_levels} vertical levels but the grid expects {grid_levels} at {location:?}"
    )]
    VerticalExtentMismatch {
        field: String,
        location: StaggerLocation,
        field_levels: usize,
        grid_levels: usize,
    },
    #[error(
        "field '{field}' is missing halo data in {direction}: interpolation needs {required} ghost cells, field carries {available}"
    )]
    MissingHalo {
        field: String,
        direction: &'static str,
        required: usize,
        available: usize,
    },
    #[error(
        "field '{field}' tile is {field_itot}x{field_jtot} points but the snapshot tile is {itot}x{jtot}"
    )]
    TileShapeMismatch {
        field: String,
        field_itot: usize,
        field_jtot: usize,
        itot: usize,
        jtot: usize,
    },
    #[error("vertical derivative requested at level {level}, valid levels are 0..{levels}")]
    LevelOutOfBounds { level: usize, levels: usize },
    #[error("horizontal reduction has zero contributing points")]
    EmptyReduction,
    #[error("collective reduction desynchronized: {detail}")]
    ReductionDesync { detail: String },
    #[error("grid level {index} is not strictly increasing: {current} after {previous}")]
    NonMonotonicGrid {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("grid needs at least 2 vertical levels, got {levels}")]
    InsufficientLevels { levels: usize },
    #[error("parameter '{field}' must be finite and positive, got {value}")]
    InvalidParameter { field: &'static str, value: f64 },
    #[error("diagnostic step needs a positive time increment, got {dt}")]
    InvalidTimeStep { dt: f64 },
}

#[cfg(test)]
mod tests {
    use super::BudgetError;

    #[test]
    fn errors_render_actionable_messages() {
        let error = BudgetError::MissingHalo {
            field: "u".to_string(),
            direction: "x",
            required: 1,
            available: 0,
        };
        assert_eq!(
            error.to_string(),
            "field 'u' is missing halo data in x: interpolation needs 1 ghost cells, field carries 0"
        );

        let error = BudgetError::EmptyReduction;
        assert_eq!(
            error.to_string(),
            "horizontal reduction has zero contributing points"
        );
    }
}
