use thiserror::Error;

#[derive(Error, Debug)]
pub enum MagCoordsError {
    #[error("Argument `{argument}` has length {len}, expected 1 or {expected}")]
    ShapeMismatch {
        argument: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("All date/time components must have the same length, got {lengths:?}")]
    ArityMismatch { lengths: Vec<usize> },

    #[error("Invalid conversion direction flag: {0} (expected 0 = geo->mag or 1 = mag->geo)")]
    InvalidDirection(i32),

    #[error("Invalid epoch: {0}")]
    InvalidEpoch(String),

    #[error("Time conversion error: {0}")]
    HifitimeError(#[from] hifitime::HifitimeError),

    #[error("Coordinate frame not supported by the tracer: {0}")]
    UnsupportedFrame(String),

    #[error("Invalid field-line tracing parameters: {0}")]
    InvalidTraceParams(String),

    #[error("Field-line trace requested without any start point")]
    EmptyTraceRequest,

    #[error("Engine initialization failed: {0}")]
    EngineInit(String),

    #[error(
        "Conversion undefined at lat={lat}, lon={lon}, height={height} km (field line does not reach this height)"
    )]
    ConversionUndefined { lat: f64, lon: f64, height: f64 },

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Coefficient table parsing error: {0}")]
    CsvError(#[from] csv::Error),
}

pub type MagCoordsResult<T> = Result<T, MagCoordsError>;

impl PartialEq for MagCoordsError {
    fn eq(&self, other: &Self) -> bool {
        use MagCoordsError::*;
        match (self, other) {
            (
                ShapeMismatch {
                    argument: a1,
                    len: l1,
                    expected: e1,
                },
                ShapeMismatch {
                    argument: a2,
                    len: l2,
                    expected: e2,
                },
            ) => a1 == a2 && l1 == l2 && e1 == e2,
            (ArityMismatch { lengths: a }, ArityMismatch { lengths: b }) => a == b,
            (InvalidDirection(a), InvalidDirection(b)) => a == b,
            (InvalidEpoch(a), InvalidEpoch(b)) => a == b,
            (UnsupportedFrame(a), UnsupportedFrame(b)) => a == b,
            (EngineInit(a), EngineInit(b)) => a == b,
            (InvalidTraceParams(a), InvalidTraceParams(b)) => a == b,
            (
                ConversionUndefined {
                    lat: la1,
                    lon: lo1,
                    height: h1,
                },
                ConversionUndefined {
                    lat: la2,
                    lon: lo2,
                    height: h2,
                },
            ) => la1 == la2 && lo1 == lo2 && h1 == h2,

            // Wrapped foreign errors are not comparable: equal when the variant matches
            (HifitimeError(_), HifitimeError(_)) => true,
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (EmptyTraceRequest, EmptyTraceRequest) => true,

            _ => false,
        }
    }
}
