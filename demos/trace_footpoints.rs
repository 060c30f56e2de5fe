use std::env;

use magcoords::engine::tracer::DipoleTracer;
use magcoords::magcoords_errors::MagCoordsError;
use magcoords::time::ModelEpoch;
use magcoords::trace::params::TraceParams;
use magcoords::trace::{trace, StartPoint};
use tracing_subscriber::EnvFilter;

/// Trace a fan of field lines along one meridian, just above the surface.
///
/// Usage:
///   trace_footpoints [LONGITUDE] [--params <json>]
/// Example:
///   RUST_LOG=magcoords=debug trace_footpoints 20 --params '{"max_steps": 2000}'
fn main() -> Result<(), MagCoordsError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let params = match args.iter().position(|a| a == "--params") {
        Some(pos) if pos + 1 < args.len() => {
            let json = args.remove(pos + 1);
            args.remove(pos);
            serde_json::from_str::<TraceParams>(&json)
                .map_err(|e| MagCoordsError::InvalidTraceParams(e.to_string()))?
        }
        _ => TraceParams::default(),
    };
    params.validate()?;
    let lon = args
        .first()
        .and_then(|a| a.parse::<f64>().ok())
        .unwrap_or(0.0);

    let points: Vec<StartPoint> = (1..=8)
        .map(|i| StartPoint::new(10.0 * i as f64, lon, 6372.0))
        .collect();

    let epoch = ModelEpoch::from_gregorian(2012, 7, 1, 0, 0, 0)?;
    let mut engine = DipoleTracer::default();
    let result = trace(&mut engine, &points, Some(epoch), &params)?;

    println!("{result}");
    for (i, point) in result.points.iter().enumerate() {
        println!(
            "point {i}: {} + {} points along the field line",
            point.north.path.len(),
            point.south.path.len()
        );
    }
    Ok(())
}
