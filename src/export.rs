//! Rendering of the trajectory log for external consumers.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::simulator::TrajectorySample;

#[derive(Debug, Serialize)]
struct CsvRow {
    timestamp: f64,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

impl From<&TrajectorySample> for CsvRow {
    fn from(s: &TrajectorySample) -> Self {
        Self {
            timestamp: s.timestamp,
            x: s.position.x,
            y: s.position.y,
            vx: s.velocity.x,
            vy: s.velocity.y,
        }
    }
}

/// Write samples as CSV with a `timestamp,x,y,vx,vy` header
pub fn write_csv<W: Write>(samples: &[TrajectorySample], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for sample in samples {
        wtr.serialize(CsvRow::from(sample))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_json(samples: &[TrajectorySample]) -> Result<String> {
    Ok(serde_json::to_string_pretty(samples)?)
}

/// Fixed-width text table of the samples
pub fn render_table(samples: &[TrajectorySample]) -> String {
    let mut out = String::new();
    out.push_str("┌──────────┬──────────┬──────────┬──────────┬──────────┐\n");
    out.push_str("│ Time (s) │  X (m)   │  Y (m)   │ Vx (m/s) │ Vy (m/s) │\n");
    out.push_str("├──────────┼──────────┼──────────┼──────────┼──────────┤\n");
    for s in samples {
        out.push_str(&format!(
            "│ {:>8.4} │ {:>8.2} │ {:>8.4} │ {:>8.2} │ {:>8.3} │\n",
            s.timestamp, s.position.x, s.position.y, s.velocity.x, s.velocity.y
        ));
    }
    out.push_str("└──────────┴──────────┴──────────┴──────────┴──────────┘\n");
    out
}
